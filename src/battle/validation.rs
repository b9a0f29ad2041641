//! Authorization of inbound ability commands. Pure checks, no mutation.

use crate::ability_data::get_ability;
use crate::battle::state::{find_living_unit, resolve_turn_ref, unit, Battle, UnitHandle};
use crate::character::Party;
use crate::player::AbilityCommand;
use crate::{TargetType, UnitKind};
use thiserror::Error;

/// Why a command was refused. Never fatal; the reason is shown to the
/// acting client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandRejection {
    #[error("battle is not in progress")]
    NotInProgress,
    #[error("it is not a party member's turn")]
    NotPartyTurn,
    #[error("player {0} does not control this party")]
    NotPartyOwner(String),
    #[error("it is not {0}'s turn")]
    NotYourTurn(String),
    #[error("unknown ability {0}")]
    UnknownAbility(String),
    #[error("{unit} needs {required} MP but has {available}")]
    InsufficientMp {
        unit: String,
        required: u32,
        available: u32,
    },
    #[error("{0} abilities are not supported")]
    UnsupportedTargetType(TargetType),
    #[error("no target given")]
    MissingTarget,
    #[error("target {0} not found")]
    TargetNotFound(String),
    #[error("{ability} must target {expected}")]
    WrongTargetKind { ability: String, expected: UnitKind },
}

/// Checks a command against the battle. Short-circuits on the first failed
/// check. On success the command is safe to hand to the executor.
pub fn validate_command(
    battle: &Battle,
    party: &Party,
    player_id: &str,
    command: &AbilityCommand,
) -> Result<(), CommandRejection> {
    if !battle.is_in_progress() {
        return Err(CommandRejection::NotInProgress);
    }

    let active = battle
        .active_ref()
        .filter(|active| active.kind == UnitKind::Party)
        .ok_or(CommandRejection::NotPartyTurn)?;

    if party.id != battle.party_id || party.owner_id != player_id {
        return Err(CommandRejection::NotPartyOwner(player_id.to_string()));
    }

    if command.source_id != active.id {
        return Err(CommandRejection::NotYourTurn(command.source_id.clone()));
    }

    let ability = get_ability(&command.ability_id)
        .map_err(|_| CommandRejection::UnknownAbility(command.ability_id.clone()))?;

    let source_handle =
        resolve_turn_ref(battle, party, active).ok_or(CommandRejection::NotPartyTurn)?;
    let source = unit(battle, party, source_handle).ok_or(CommandRejection::NotPartyTurn)?;
    if ability.mp_cost > 0 && source.stats().mp < ability.mp_cost {
        return Err(CommandRejection::InsufficientMp {
            unit: source.name().to_string(),
            required: ability.mp_cost,
            available: source.stats().mp,
        });
    }

    let target = match ability.target_type {
        TargetType::SelfTarget => source_handle,
        _ => {
            let target_id = command
                .target_id
                .as_deref()
                .ok_or(CommandRejection::MissingTarget)?;
            find_living_unit(battle, party, target_id)
                .ok_or_else(|| CommandRejection::TargetNotFound(target_id.to_string()))?
        }
    };

    let expected = match ability.target_type {
        TargetType::EnemySingle => Some(UnitKind::Enemy),
        TargetType::AllySingle => Some(UnitKind::Party),
        TargetType::SelfTarget => None,
        TargetType::EnemyAll | TargetType::Party => {
            return Err(CommandRejection::UnsupportedTargetType(ability.target_type));
        }
    };
    match expected {
        Some(kind) if target.kind() != kind => Err(CommandRejection::WrongTargetKind {
            ability: ability.name.clone(),
            expected: kind,
        }),
        _ => Ok(()),
    }
}

/// Where the command's effect lands, once validated. Multi-target types
/// have no single landing point and resolve to `None`.
pub fn command_target(
    battle: &Battle,
    party: &Party,
    source: UnitHandle,
    target_type: TargetType,
    target_id: Option<&str>,
) -> Option<UnitHandle> {
    match target_type {
        TargetType::SelfTarget => Some(source),
        TargetType::EnemySingle | TargetType::AllySingle => {
            target_id.and_then(|id| find_living_unit(battle, party, id))
        }
        TargetType::EnemyAll | TargetType::Party => None,
    }
}
