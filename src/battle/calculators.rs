use crate::ability_data::{Ability, EffectKind};
use crate::battle::commands::BattleCommand;
use crate::battle::state::{unit, Battle, BattleEvent, UnitHandle};
use crate::character::{Party, Stats};
use crate::Element;

/// Mitigation weight applied to the defender's defense or spirit.
const MITIGATION_FACTOR: f64 = 0.6;
/// Magic contribution to healing.
const HEAL_MAGIC_FACTOR: f64 = 1.1;

/// `max(1, floor((power + magic * 1.1) * multiplier))`
pub fn heal_amount(power: u32, source: &Stats, multiplier: f64) -> u32 {
    let raw = (power as f64 + source.magic as f64 * HEAL_MAGIC_FACTOR) * multiplier;
    raw.floor().max(1.0) as u32
}

/// Physical abilities pit strength against defense, elemental ones magic
/// against spirit. Always at least 1.
pub fn damage_amount(ability: &Ability, source: &Stats, target: &Stats, multiplier: f64) -> u32 {
    let (offense, mitigation) = if ability.is_physical() {
        (source.strength, target.defense)
    } else {
        (source.magic, target.spirit)
    };
    let offense = offense as f64 + ability.power as f64;
    let mitigation = mitigation as f64 * MITIGATION_FACTOR;
    ((offense - mitigation) * multiplier).floor().max(1.0) as u32
}

pub fn element_multiplier(ability: &Ability, target_element: Option<Element>) -> f64 {
    Element::multiplier(Some(ability.element), target_element)
}

/// Works out everything one ability use does to the battle, as a batch of
/// commands. Reads state only; the caller executes the batch.
///
/// Returns an empty batch if either handle does not resolve.
pub fn calculate_ability_outcome(
    battle: &Battle,
    party: &Party,
    source: UnitHandle,
    target: UnitHandle,
    ability: &Ability,
) -> Vec<BattleCommand> {
    let (Some(caster), Some(defender)) = (unit(battle, party, source), unit(battle, party, target))
    else {
        return Vec::new();
    };

    let mut commands = Vec::new();
    if ability.mp_cost > 0 {
        commands.push(BattleCommand::SpendMp {
            unit: source,
            amount: ability.mp_cost,
        });
    }

    let multiplier = element_multiplier(ability, defender.element());
    let hp_change = match ability.effect {
        EffectKind::Heal => {
            let amount = heal_amount(ability.power, caster.stats(), multiplier);
            commands.push(BattleCommand::Heal { target, amount });
            Some(amount as i64)
        }
        EffectKind::Damage => {
            let amount = damage_amount(ability, caster.stats(), defender.stats(), multiplier);
            commands.push(BattleCommand::DealDamage { target, amount });
            Some(-(amount as i64))
        }
        EffectKind::StatusOnly | EffectKind::NoOp => None,
    };

    if let Some(status) = ability.status_effect {
        commands.push(BattleCommand::AddStatus { target, status });
    }

    commands.push(BattleCommand::EmitEvent(BattleEvent::AbilityResolved {
        source: caster.name().to_string(),
        ability: ability.name.clone(),
        target: defender.name().to_string(),
        healed: ability.effect == EffectKind::Heal,
        hp_change,
        status: ability.status_effect,
    }));

    commands
}
