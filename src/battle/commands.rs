use crate::battle::state::{unit_mut, Battle, BattleEvent, UnitHandle};
use crate::character::Party;
use crate::{BattleStatus, StatusEffect};

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    SpendMp { unit: UnitHandle, amount: u32 },
    DealDamage { target: UnitHandle, amount: u32 },
    Heal { target: UnitHandle, amount: u32 },
    AddStatus { target: UnitHandle, status: StatusEffect },
    SetState(BattleStatus),
    EmitEvent(BattleEvent),
}

/// Error types for command execution
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("no combatant for handle {0:?}")]
    MissingUnit(UnitHandle),
}

/// Execute a single command. Stats are re-clamped after every mutation.
pub fn execute_command(
    command: BattleCommand,
    battle: &mut Battle,
    party: &mut Party,
) -> Result<(), ExecutionError> {
    match command {
        BattleCommand::SpendMp { unit, amount } => {
            with_unit(battle, party, unit, |u| u.stats_mut().spend_mp(amount))
        }
        BattleCommand::DealDamage { target, amount } => with_unit(battle, party, target, |u| {
            let lost = u.stats_mut().take_damage(amount);
            tracing::debug!(unit = u.id(), lost, hp = u.stats().hp, "damage applied");
        }),
        BattleCommand::Heal { target, amount } => with_unit(battle, party, target, |u| {
            let gained = u.stats_mut().heal(amount);
            tracing::debug!(unit = u.id(), gained, hp = u.stats().hp, "healing applied");
        }),
        BattleCommand::AddStatus { target, status } => with_unit(battle, party, target, |u| {
            if !u.add_status(status) {
                tracing::debug!(unit = u.id(), %status, "status already present");
            }
        }),
        BattleCommand::SetState(state) => {
            battle.state = state;
            Ok(())
        }
        BattleCommand::EmitEvent(event) => {
            battle.record(event);
            Ok(())
        }
    }
}

pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    battle: &mut Battle,
    party: &mut Party,
) -> Result<(), ExecutionError> {
    for command in commands {
        execute_command(command, battle, party)?;
    }
    Ok(())
}

fn with_unit<F>(
    battle: &mut Battle,
    party: &mut Party,
    handle: UnitHandle,
    operation: F,
) -> Result<(), ExecutionError>
where
    F: FnOnce(&mut dyn crate::character::Combatant),
{
    let target = unit_mut(battle, party, handle).ok_or(ExecutionError::MissingUnit(handle))?;
    operation(target);
    Ok(())
}
