//! Decision policies for enemy turns.

use crate::ability_data::BASIC_ATTACK;
use crate::battle::state::Battle;
use crate::character::Party;
use crate::player::AbilityCommand;

/// A trait for any system that can pick an enemy's action.
pub trait EnemyBehavior {
    /// Returns the command the given enemy performs, or `None` if it has
    /// nothing to do.
    fn choose_command(&self, enemy_id: &str, battle: &Battle, party: &Party) -> Option<AbilityCommand>;
}

/// The fixed policy: basic attack on the first living party member, in
/// party list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLivingTarget;

impl EnemyBehavior for FirstLivingTarget {
    fn choose_command(&self, enemy_id: &str, _battle: &Battle, party: &Party) -> Option<AbilityCommand> {
        let target = party.living_members().next()?;
        Some(AbilityCommand::new(enemy_id, Some(&target.id), BASIC_ATTACK))
    }
}
