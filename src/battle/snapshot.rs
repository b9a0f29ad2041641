//! Serializable projection of a battle for clients.

use crate::battle::state::{Battle, TurnRef};
use crate::character::{Character, Party, Stats};
use crate::enemy::Enemy;
use crate::{BattleStatus, Element, StatusEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantView {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub xp: u64,
    pub stats: Stats,
    pub status_effects: Vec<StatusEffect>,
}

impl From<&Character> for CombatantView {
    fn from(member: &Character) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            class_name: member.class_name.clone(),
            level: member.level,
            xp: member.experience,
            stats: member.stats,
            status_effects: member.status_effects.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    pub stats: Stats,
    pub status_effects: Vec<StatusEffect>,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id.clone(),
            name: enemy.name.clone(),
            element: enemy.element,
            stats: enemy.stats,
            status_effects: enemy.status_effects.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSnapshot {
    pub id: String,
    pub state: BattleStatus,
    pub party: Vec<CombatantView>,
    pub enemies: Vec<EnemyView>,
    pub turn_order: Vec<TurnRef>,
    pub active: Option<TurnRef>,
    /// The newest log lines, oldest first.
    pub log: Vec<String>,
}

impl BattleSnapshot {
    pub fn capture(battle: &Battle, party: &Party, log_window: usize) -> Self {
        let skip = battle.log.len().saturating_sub(log_window);
        Self {
            id: battle.id.clone(),
            state: battle.state,
            party: party.members.iter().map(CombatantView::from).collect(),
            enemies: battle.enemies.iter().map(EnemyView::from).collect(),
            turn_order: battle.turn_order.clone(),
            active: battle.active_ref().cloned(),
            log: battle.log[skip..].to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
