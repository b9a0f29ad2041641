use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle of a battle. `Victory` and `Defeat` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BattleStatus {
    Pending,
    InProgress,
    Victory,
    Defeat,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattleStatus::Victory | BattleStatus::Defeat)
    }
}

/// Status tags carried by combatants. Tags are a set: no stacks, no intensity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEffect {
    Poison,
    Burn,
    Stun,
    Blind,
    Guard,
    Regen,
}
