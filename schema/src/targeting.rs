use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetType {
    EnemySingle,
    EnemyAll,
    AllySingle,
    Party,
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    SelfTarget,
}

impl TargetType {
    /// Target types that aim at the caster's own side.
    pub fn is_supportive(self) -> bool {
        matches!(
            self,
            TargetType::AllySingle | TargetType::Party | TargetType::SelfTarget
        )
    }

    /// Multi-target types exist in the catalog but have no resolution rule.
    pub fn is_supported(self) -> bool {
        !matches!(self, TargetType::EnemyAll | TargetType::Party)
    }
}

/// Which arena a combatant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitKind {
    Party,
    Enemy,
}

impl UnitKind {
    /// Prefix used when breaking initiative ties.
    pub fn order_prefix(self) -> &'static str {
        match self {
            UnitKind::Party => "p_",
            UnitKind::Enemy => "e_",
        }
    }
}
