use crate::ability_data::{get_ability, FLEE};
use crate::battle::ai::{EnemyBehavior, FirstLivingTarget};
use crate::battle::calculators::calculate_ability_outcome;
use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::state::{
    is_ref_alive, resolve_turn_ref, resolve_unit, unit, ActionFailureReason, Battle, BattleEvent,
    TurnRef,
};
use crate::battle::turn_order::compute_initial_order;
use crate::battle::validation::{command_target, validate_command, CommandRejection};
use crate::character::{Combatant, Party};
use crate::enemy::Enemy;
use crate::errors::BattleStateError;
use crate::player::AbilityCommand;
use crate::{BattleStatus, UnitKind};
use std::collections::HashSet;

/// What happened to a command handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The ability resolved and the turn may advance.
    Resolved,
    /// The acting unit fled; the battle is over.
    Fled,
    /// Soft failure. A line was logged and nothing else changed.
    Failed(ActionFailureReason),
    /// The battle was not in progress.
    Ignored,
}

/// Creates a battle between `party` and `enemies` and runs any enemy turns
/// that come before the first party turn.
///
/// An empty party, no enemies, or an id shared by two combatants is a caller
/// bug and rejects construction.
pub fn start_battle(
    id: String,
    party: &mut Party,
    enemies: Vec<Enemy>,
) -> Result<Battle, BattleStateError> {
    if party.members.is_empty() {
        return Err(BattleStateError::EmptyParty(party.id.clone()));
    }
    if enemies.is_empty() {
        return Err(BattleStateError::NoEnemies);
    }
    let mut seen = HashSet::new();
    let ids = party
        .members
        .iter()
        .map(|member| member.id.as_str())
        .chain(enemies.iter().map(|enemy| enemy.id.as_str()));
    for combatant_id in ids {
        if !seen.insert(combatant_id) {
            return Err(BattleStateError::DuplicateCombatantId(combatant_id.to_string()));
        }
    }

    let turn_order = compute_initial_order(party, &enemies);
    let mut battle = Battle::new(id, party.id.clone(), enemies);
    battle.turn_order = turn_order;
    battle.record(BattleEvent::BattleStarted {
        enemies: battle.enemies.iter().map(|enemy| enemy.name.clone()).collect(),
    });

    battle.state = BattleStatus::InProgress;
    settle(&mut battle, party);
    let order: Vec<String> = battle.turn_order.iter().map(TurnRef::to_string).collect();
    tracing::info!(
        battle = %battle.id,
        party = %battle.party_id,
        state = %battle.state,
        order = ?order,
        "battle created"
    );

    run_enemy_turns(&mut battle, party, &FirstLivingTarget);
    Ok(battle)
}

/// Applies one ability use. Does not advance the turn.
pub fn execute_ability(battle: &mut Battle, party: &mut Party, command: &AbilityCommand) -> Resolution {
    if !battle.is_in_progress() {
        return Resolution::Ignored;
    }

    if command.ability_id == FLEE {
        let name = [UnitKind::Party, UnitKind::Enemy]
            .into_iter()
            .find_map(|kind| {
                resolve_unit(battle, party, kind, &command.source_id)
                    .and_then(|handle| unit(battle, party, handle))
                    .map(|u| u.name().to_string())
            })
            .unwrap_or_else(|| command.source_id.clone());
        let commands = vec![
            BattleCommand::EmitEvent(BattleEvent::Fled { unit: name }),
            BattleCommand::SetState(BattleStatus::Defeat),
        ];
        if let Err(e) = execute_command_batch(commands, battle, party) {
            tracing::warn!(battle = %battle.id, "flee failed: {}", e);
        }
        tracing::info!(battle = %battle.id, "party fled");
        return Resolution::Fled;
    }

    let Some(active) = battle.active_ref().cloned() else {
        return fail(battle, ActionFailureReason::MissingUnit);
    };
    if active.id != command.source_id {
        return fail(
            battle,
            ActionFailureReason::NotActiveUnit {
                unit: command.source_id.clone(),
            },
        );
    }

    let Ok(ability) = get_ability(&command.ability_id) else {
        return fail(
            battle,
            ActionFailureReason::UnknownAbility {
                ability_id: command.ability_id.clone(),
            },
        );
    };
    if !ability.target_type.is_supported() {
        return fail(
            battle,
            ActionFailureReason::UnsupportedTargetType {
                ability: ability.name.clone(),
                target_type: ability.target_type,
            },
        );
    }

    let source = resolve_turn_ref(battle, party, &active)
        .filter(|handle| unit(battle, party, *handle).is_some_and(|u| u.is_alive()));
    let target = source.and_then(|source| {
        command_target(battle, party, source, ability.target_type, command.target_id.as_deref())
    });
    let (Some(source), Some(target)) = (source, target) else {
        return fail(battle, ActionFailureReason::MissingUnit);
    };

    if let Some(caster) = unit(battle, party, source) {
        if ability.mp_cost > 0 && caster.stats().mp < ability.mp_cost {
            let reason = ActionFailureReason::InsufficientMp {
                unit: caster.name().to_string(),
                ability: ability.name.clone(),
            };
            return fail(battle, reason);
        }
    }

    let commands = calculate_ability_outcome(battle, party, source, target, ability);
    if let Err(e) = execute_command_batch(commands, battle, party) {
        tracing::warn!(battle = %battle.id, "ability resolution aborted: {}", e);
        return fail(battle, ActionFailureReason::MissingUnit);
    }

    settle(battle, party);
    Resolution::Resolved
}

fn fail(battle: &mut Battle, reason: ActionFailureReason) -> Resolution {
    tracing::warn!(battle = %battle.id, ?reason, "action failed");
    battle.record(BattleEvent::ActionFailed {
        reason: reason.clone(),
    });
    Resolution::Failed(reason)
}

/// Prune, recompute, and log the terminal line if the state just changed.
fn settle(battle: &mut Battle, party: &Party) {
    prune_dead(battle, party);
    let before = battle.state;
    let after = recompute_state(battle, party);
    if after != before {
        match after {
            BattleStatus::Victory => battle.record(BattleEvent::Victory),
            BattleStatus::Defeat => battle.record(BattleEvent::Defeat),
            _ => {}
        }
        tracing::info!(battle = %battle.id, state = %after, "battle ended");
    }
}

/// Drops fallen units from the schedule while keeping the active reference
/// pointed at the same unit. If the active unit itself fell, the index is
/// left just before its successor so the next advance lands there.
pub fn prune_dead(battle: &mut Battle, party: &Party) {
    let alive: Vec<bool> = battle
        .turn_order
        .iter()
        .map(|turn_ref| is_ref_alive(battle, party, turn_ref))
        .collect();
    if alive.iter().all(|a| *a) {
        return;
    }

    let old_index = battle.active_turn_index;
    let active_alive = alive.get(old_index).copied().unwrap_or(false);
    let survivors_before = alive.iter().take(old_index).filter(|a| **a).count();

    let order = std::mem::take(&mut battle.turn_order);
    battle.turn_order = order
        .into_iter()
        .zip(alive)
        .filter_map(|(turn_ref, alive)| alive.then_some(turn_ref))
        .collect();

    let len = battle.turn_order.len();
    battle.active_turn_index = if len == 0 {
        0
    } else if active_alive {
        survivors_before
    } else {
        (survivors_before + len - 1) % len
    };
    tracing::debug!(battle = %battle.id, remaining = len, "pruned fallen units");
}

/// Party wipe is checked first, so a mutual knockout is a defeat. Terminal
/// states never change.
pub fn recompute_state(battle: &mut Battle, party: &Party) -> BattleStatus {
    if battle.is_in_progress() {
        if party.is_wiped_out() {
            battle.state = BattleStatus::Defeat;
        } else if battle.all_enemies_defeated() {
            battle.state = BattleStatus::Victory;
        }
    }
    battle.state
}

/// Moves the active index to the next living unit.
pub fn advance_turn(battle: &mut Battle, party: &Party) {
    if !battle.is_in_progress() {
        return;
    }
    settle(battle, party);
    if !battle.is_in_progress() {
        return;
    }

    let len = battle.turn_order.len();
    if len == 0 {
        return;
    }
    // Pruning should leave nobody dead in the schedule; skip them anyway.
    for _ in 0..len {
        battle.active_turn_index = (battle.active_turn_index + 1) % len;
        if battle
            .active_ref()
            .is_some_and(|turn_ref| is_ref_alive(battle, party, turn_ref))
        {
            break;
        }
    }
    if let Some(active) = battle.active_ref() {
        tracing::debug!(battle = %battle.id, active = %active, "turn advanced");
    }
}

/// Resolves enemy turns until a party member is up or the battle ends.
pub fn run_enemy_turns(battle: &mut Battle, party: &mut Party, behavior: &dyn EnemyBehavior) {
    while battle.is_in_progress() {
        let Some(active) = battle.active_ref().cloned() else {
            break;
        };
        if active.kind != UnitKind::Enemy {
            break;
        }
        match behavior.choose_command(&active.id, battle, party) {
            Some(command) => {
                let resolution = execute_ability(battle, party, &command);
                tracing::debug!(battle = %battle.id, enemy = %active.id, ?resolution, "enemy acted");
            }
            None => tracing::debug!(battle = %battle.id, enemy = %active.id, "enemy passes"),
        }
        advance_turn(battle, party);
    }
}

/// Validate, execute, advance, then let the enemies act.
///
/// A rejected command leaves the battle untouched. A soft failure during
/// execution logs a line and keeps the same unit active.
pub fn process_command(
    battle: &mut Battle,
    party: &mut Party,
    player_id: &str,
    command: &AbilityCommand,
    behavior: &dyn EnemyBehavior,
) -> Result<Resolution, CommandRejection> {
    validate_command(battle, party, player_id, command)?;

    let resolution = execute_ability(battle, party, command);
    if resolution == Resolution::Resolved {
        advance_turn(battle, party);
        run_enemy_turns(battle, party, behavior);
    }
    Ok(resolution)
}
