use crate::character::{Combatant, Party};
use crate::enemy::Enemy;
use crate::{BattleStatus, StatusEffect, TargetType, UnitKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points at a combatant by side and id. Never a direct reference, so a unit
/// leaving the schedule cannot leave a dangling pointer behind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TurnRef {
    pub kind: UnitKind,
    pub id: String,
}

impl TurnRef {
    pub fn party(id: &str) -> Self {
        Self {
            kind: UnitKind::Party,
            id: id.to_string(),
        }
    }

    pub fn enemy(id: &str) -> Self {
        Self {
            kind: UnitKind::Enemy,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for TurnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Index into one of the two combatant arenas (`Party.members` or
/// `Battle.enemies`). Arenas never shrink during a battle, so handles stay
/// valid while a resolution is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitHandle {
    Party(usize),
    Enemy(usize),
}

impl UnitHandle {
    pub fn kind(self) -> UnitKind {
        match self {
            UnitHandle::Party(_) => UnitKind::Party,
            UnitHandle::Enemy(_) => UnitKind::Enemy,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ActionFailureReason {
    /// The acting unit or its target could not be resolved.
    MissingUnit,
    /// A unit other than the active one tried to act.
    NotActiveUnit { unit: String },
    UnknownAbility { ability_id: String },
    InsufficientMp { unit: String, ability: String },
    /// Multi-target abilities have no resolution rule.
    UnsupportedTargetType { ability: String, target_type: TargetType },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted {
        enemies: Vec<String>,
    },
    AbilityResolved {
        source: String,
        ability: String,
        target: String,
        healed: bool,
        hp_change: Option<i64>,
        status: Option<StatusEffect>,
    },
    Fled {
        unit: String,
    },
    ActionFailed {
        reason: ActionFailureReason,
    },
    CommandRejected {
        reason: String,
    },
    Victory,
    Defeat,
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::BattleStarted { enemies } => {
                write!(f, "Battle started against {}.", enemies.join(", "))
            }
            BattleEvent::AbilityResolved {
                source,
                ability,
                target,
                healed,
                hp_change,
                status,
            } => {
                let verb = if *healed { "cast" } else { "used" };
                write!(f, "{} {} {} on {}", source, verb, ability, target)?;
                if let Some(change) = hp_change {
                    if *change >= 0 {
                        write!(f, " +{} HP", change)?;
                    } else {
                        write!(f, " {} HP", change)?;
                    }
                }
                if let Some(status) = status {
                    write!(f, " ({})", status)?;
                }
                Ok(())
            }
            BattleEvent::Fled { unit } => write!(f, "{} fled the battle.", unit),
            BattleEvent::ActionFailed { reason } => match reason {
                ActionFailureReason::MissingUnit => write!(f, "Action failed: missing source/target."),
                ActionFailureReason::NotActiveUnit { unit } => {
                    write!(f, "Action failed: it is not {}'s turn.", unit)
                }
                ActionFailureReason::UnknownAbility { ability_id } => {
                    write!(f, "Action failed: unknown ability {}.", ability_id)
                }
                ActionFailureReason::InsufficientMp { unit, ability } => {
                    write!(f, "Action failed: {} lacks the MP for {}.", unit, ability)
                }
                ActionFailureReason::UnsupportedTargetType { ability, target_type } => {
                    write!(f, "Action failed: {} targets {}, which cannot be resolved.", ability, target_type)
                }
            },
            BattleEvent::CommandRejected { reason } => write!(f, "Rejected: {}", reason),
            BattleEvent::Victory => write!(f, "Victory!"),
            BattleEvent::Defeat => write!(f, "Defeat."),
        }
    }
}

/// One encounter. Owns its enemies; the party is owned elsewhere and only
/// referenced through `party_id`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Battle {
    pub id: String,
    pub party_id: String,
    pub enemies: Vec<Enemy>,
    pub turn_order: Vec<TurnRef>,
    pub active_turn_index: usize,
    pub log: Vec<String>,
    pub state: BattleStatus,
}

impl Battle {
    pub fn new(id: String, party_id: String, enemies: Vec<Enemy>) -> Self {
        Self {
            id,
            party_id,
            enemies,
            turn_order: Vec::new(),
            active_turn_index: 0,
            log: Vec::new(),
            state: BattleStatus::Pending,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == BattleStatus::InProgress
    }

    pub fn active_ref(&self) -> Option<&TurnRef> {
        self.turn_order.get(self.active_turn_index)
    }

    /// Append an event to the battle log.
    pub fn record(&mut self, event: BattleEvent) {
        let line = event.to_string();
        tracing::debug!(battle = %self.id, "{}", line);
        self.log.push(line);
    }

    /// Keep only the newest `max_lines` log entries.
    pub fn trim_log(&mut self, max_lines: usize) {
        if self.log.len() > max_lines {
            let excess = self.log.len() - max_lines;
            self.log.drain(..excess);
        }
    }

    pub fn enemy_index(&self, id: &str) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == id)
    }

    pub fn all_enemies_defeated(&self) -> bool {
        !self.enemies.iter().any(|enemy| enemy.is_alive())
    }
}

/// Resolves a `{kind, id}` pair into an arena handle.
pub fn resolve_unit(battle: &Battle, party: &Party, kind: UnitKind, id: &str) -> Option<UnitHandle> {
    match kind {
        UnitKind::Party => party.member_index(id).map(UnitHandle::Party),
        UnitKind::Enemy => battle.enemy_index(id).map(UnitHandle::Enemy),
    }
}

pub fn resolve_turn_ref(battle: &Battle, party: &Party, turn_ref: &TurnRef) -> Option<UnitHandle> {
    resolve_unit(battle, party, turn_ref.kind, &turn_ref.id)
}

/// Looks an id up in the live roster: party members first, then enemies.
/// Fallen combatants stay in their arena but are not targetable.
pub fn find_living_unit(battle: &Battle, party: &Party, id: &str) -> Option<UnitHandle> {
    [UnitKind::Party, UnitKind::Enemy]
        .into_iter()
        .filter_map(|kind| resolve_unit(battle, party, kind, id))
        .find(|handle| unit(battle, party, *handle).is_some_and(|u| u.is_alive()))
}

pub fn unit<'a>(battle: &'a Battle, party: &'a Party, handle: UnitHandle) -> Option<&'a dyn Combatant> {
    match handle {
        UnitHandle::Party(index) => party.members.get(index).map(|m| m as &dyn Combatant),
        UnitHandle::Enemy(index) => battle.enemies.get(index).map(|e| e as &dyn Combatant),
    }
}

pub fn unit_mut<'a>(
    battle: &'a mut Battle,
    party: &'a mut Party,
    handle: UnitHandle,
) -> Option<&'a mut dyn Combatant> {
    match handle {
        UnitHandle::Party(index) => party.members.get_mut(index).map(|m| m as &mut dyn Combatant),
        UnitHandle::Enemy(index) => battle.enemies.get_mut(index).map(|e| e as &mut dyn Combatant),
    }
}

/// Whether the unit a turn reference points at still stands.
pub fn is_ref_alive(battle: &Battle, party: &Party, turn_ref: &TurnRef) -> bool {
    resolve_turn_ref(battle, party, turn_ref)
        .and_then(|handle| unit(battle, party, handle))
        .is_some_and(|u| u.is_alive())
}

#[cfg(test)]
mod event_formatting_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn damage_line_shows_negative_hp() {
        let event = BattleEvent::AbilityResolved {
            source: "Aria".to_string(),
            ability: "Attack".to_string(),
            target: "Slime".to_string(),
            healed: false,
            hp_change: Some(-14),
            status: None,
        };
        assert_eq!(event.to_string(), "Aria used Attack on Slime -14 HP");
    }

    #[test]
    fn unsupported_target_type_failure_line() {
        let event = BattleEvent::ActionFailed {
            reason: ActionFailureReason::UnsupportedTargetType {
                ability: "Inferno Wave".to_string(),
                target_type: TargetType::EnemyAll,
            },
        };
        assert_eq!(
            event.to_string(),
            "Action failed: Inferno Wave targets enemy_all, which cannot be resolved."
        );
    }

    #[test]
    fn heal_line_uses_cast_and_plus_sign() {
        let event = BattleEvent::AbilityResolved {
            source: "Sable".to_string(),
            ability: "Sage Mend".to_string(),
            target: "Aria".to_string(),
            healed: true,
            hp_change: Some(23),
            status: None,
        };
        assert_eq!(event.to_string(), "Sable cast Sage Mend on Aria +23 HP");
    }

    #[test]
    fn status_only_line_has_no_hp_segment() {
        let event = BattleEvent::AbilityResolved {
            source: "Sable".to_string(),
            ability: "Toxic Mist".to_string(),
            target: "Slime".to_string(),
            healed: false,
            hp_change: None,
            status: Some(StatusEffect::Poison),
        };
        assert_eq!(event.to_string(), "Sable used Toxic Mist on Slime (POISON)");
    }

    #[test]
    fn terminal_lines() {
        assert_eq!(BattleEvent::Victory.to_string(), "Victory!");
        assert_eq!(BattleEvent::Defeat.to_string(), "Defeat.");
    }

    #[test]
    fn trim_log_keeps_newest_lines() {
        let mut battle = Battle::new("b".to_string(), "p".to_string(), vec![]);
        for i in 0..10 {
            battle.log.push(format!("line {}", i));
        }
        battle.trim_log(3);
        assert_eq!(battle.log, vec!["line 7", "line 8", "line 9"]);
    }
}
