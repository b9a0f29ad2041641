use crate::errors::{AbilityDataError, AbilityDataResult};
use crate::{Element, StatusEffect, TargetType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Id of the fixed enemy action and the plain party attack.
pub const BASIC_ATTACK: &str = "basic_attack";
/// Id of the special-cased escape action.
pub const FLEE: &str = "flee";

static BUILTIN_CATALOG: &str = include_str!("../data/abilities.ron");

// Global ability catalog - parsed once on first access
static ABILITY_CATALOG: LazyLock<AbilityCatalog> = LazyLock::new(|| {
    AbilityCatalog::from_ron_str(BUILTIN_CATALOG).expect("embedded ability catalog must be valid")
});

/// How an ability changes its target, derived once from its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
    StatusOnly,
    NoOp,
}

impl EffectKind {
    pub fn classify(
        target_type: TargetType,
        power: u32,
        status_effect: Option<StatusEffect>,
    ) -> EffectKind {
        match (power, status_effect) {
            (0, Some(_)) => EffectKind::StatusOnly,
            (0, None) => EffectKind::NoOp,
            _ if target_type.is_supportive() => EffectKind::Heal,
            _ => EffectKind::Damage,
        }
    }
}

/// Catalog entry as written in the data file.
#[derive(Debug, Clone, Deserialize)]
struct AbilityDefinition {
    id: String,
    name: String,
    element: Element,
    mp_cost: u32,
    target_type: TargetType,
    power: u32,
    status_effect: Option<StatusEffect>,
    class_restriction: Option<Vec<String>>,
    level_requirement: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub element: Element,
    pub mp_cost: u32,
    pub target_type: TargetType,
    pub power: u32,
    pub status_effect: Option<StatusEffect>,
    pub class_restriction: Option<Vec<String>>,
    pub level_requirement: u32,
    pub effect: EffectKind,
}

impl From<AbilityDefinition> for Ability {
    fn from(def: AbilityDefinition) -> Self {
        let effect = EffectKind::classify(def.target_type, def.power, def.status_effect);
        Ability {
            id: def.id,
            name: def.name,
            element: def.element,
            mp_cost: def.mp_cost,
            target_type: def.target_type,
            power: def.power,
            status_effect: def.status_effect,
            class_restriction: def.class_restriction,
            level_requirement: def.level_requirement,
            effect,
        }
    }
}

impl Ability {
    /// Physical techniques carry no crystal element.
    pub fn is_physical(&self) -> bool {
        self.element.is_null()
    }

    /// Element used for scaling. `None` for physical techniques.
    pub fn scaling_element(&self) -> Option<Element> {
        (!self.is_physical()).then_some(self.element)
    }

    pub fn usable_by(&self, class_name: &str, level: u32) -> bool {
        let class_ok = self
            .class_restriction
            .as_ref()
            .map_or(true, |classes| classes.iter().any(|c| c == class_name));
        class_ok && level >= self.level_requirement
    }
}

/// Read-only table of abilities keyed by id.
#[derive(Debug, Clone)]
pub struct AbilityCatalog {
    abilities: HashMap<String, Ability>,
    // Declaration order, for stable listings.
    order: Vec<String>,
}

impl AbilityCatalog {
    pub fn from_ron_str(source: &str) -> AbilityDataResult<Self> {
        let definitions: Vec<AbilityDefinition> = ron::from_str(source)
            .map_err(|e| AbilityDataError::MalformedData(e.to_string()))?;

        let mut abilities = HashMap::with_capacity(definitions.len());
        let mut order = Vec::with_capacity(definitions.len());
        for def in definitions {
            if def.id.is_empty() {
                return Err(AbilityDataError::MalformedData(format!(
                    "ability '{}' has an empty id",
                    def.name
                )));
            }
            if abilities.contains_key(&def.id) {
                return Err(AbilityDataError::DuplicateAbility(def.id));
            }
            order.push(def.id.clone());
            abilities.insert(def.id.clone(), Ability::from(def));
        }

        Ok(Self { abilities, order })
    }

    pub fn get(&self, id: &str) -> AbilityDataResult<&Ability> {
        self.abilities
            .get(id)
            .ok_or_else(|| AbilityDataError::AbilityNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.order.iter().filter_map(|id| self.abilities.get(id))
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

/// The process-wide catalog.
pub fn catalog() -> &'static AbilityCatalog {
    &ABILITY_CATALOG
}

/// Get ability data for a specific id from the global catalog
pub fn get_ability(id: &str) -> AbilityDataResult<&'static Ability> {
    catalog().get(id)
}

pub fn all_abilities() -> impl Iterator<Item = &'static Ability> {
    catalog().iter()
}

/// Abilities a character of this class and level may pick from.
/// Multi-target abilities are listed too; the validator rejects them.
pub fn abilities_available_to(class_name: &str, level: u32) -> Vec<&'static Ability> {
    all_abilities()
        .filter(|ability| ability.usable_by(class_name, level))
        .collect()
}
