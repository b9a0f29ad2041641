use crate::{Element, StatusEffect};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub strength: u32,
    pub defense: u32,
    pub magic: u32,
    pub speed: u32,
    pub spirit: u32,
    pub luck: u32,
}

impl Stats {
    /// Full-health stats with the given caps.
    pub fn new(max_hp: u32, max_mp: u32) -> Self {
        Stats {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            ..Stats::default()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Re-establishes `hp <= max_hp` and `mp <= max_mp`.
    pub fn clamp(&mut self) {
        self.hp = self.hp.min(self.max_hp);
        self.mp = self.mp.min(self.max_mp);
    }

    /// Apply damage and return the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        self.clamp();
        before - self.hp
    }

    /// Restore HP up to the cap and return the HP actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp.min(self.max_hp);
        self.hp = self.hp.saturating_add(amount);
        self.clamp();
        self.hp - before
    }

    /// Spend MP, flooring at zero.
    pub fn spend_mp(&mut self, amount: u32) {
        self.mp = self.mp.saturating_sub(amount);
        self.clamp();
    }
}

/// Anything that can stand in a battle line. Party members and enemies live
/// in different arenas but resolve through this common view.
pub trait Combatant {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn stats(&self) -> &Stats;
    fn stats_mut(&mut self) -> &mut Stats;
    fn status_effects(&self) -> &BTreeSet<StatusEffect>;
    fn status_effects_mut(&mut self) -> &mut BTreeSet<StatusEffect>;
    /// Element used for elemental scaling when this unit is targeted.
    fn element(&self) -> Option<Element>;

    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }

    /// Adds a status tag. Returns false if it was already present.
    fn add_status(&mut self, status: StatusEffect) -> bool {
        self.status_effects_mut().insert(status)
    }
}

/// A party member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub experience: u64,
    pub stats: Stats,
    pub status_effects: BTreeSet<StatusEffect>,
    /// Equipped items by slot. Opaque to the engine.
    pub equipment: BTreeMap<String, String>,
    /// Fixed element. Takes precedence over `crystal_resonance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    /// Elemental affinity weights, used only to infer an element.
    pub crystal_resonance: BTreeMap<Element, f64>,
}

impl Character {
    pub fn new(id: &str, name: &str, class_name: &str, level: u32, stats: Stats) -> Self {
        Character {
            id: id.to_string(),
            name: name.to_string(),
            class_name: class_name.to_string(),
            level,
            experience: 0,
            stats,
            status_effects: BTreeSet::new(),
            equipment: BTreeMap::new(),
            element: None,
            crystal_resonance: BTreeMap::new(),
        }
    }

    /// The strongest resonance weight wins. Equal weights resolve to the
    /// lexicographically smallest element name; non-positive weights are
    /// ignored.
    pub fn inferred_element(&self) -> Option<Element> {
        self.crystal_resonance
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .max_by_key(|(element, weight)| (OrderedFloat(**weight), Reverse(element.to_string())))
            .map(|(element, _)| *element)
    }
}

impl Combatant for Character {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    fn status_effects(&self) -> &BTreeSet<StatusEffect> {
        &self.status_effects
    }

    fn status_effects_mut(&mut self) -> &mut BTreeSet<StatusEffect> {
        &mut self.status_effects
    }

    fn element(&self) -> Option<Element> {
        self.element.or_else(|| self.inferred_element())
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Lv.{} {}) HP: {}/{} MP: {}/{}",
            self.name,
            self.level,
            self.class_name,
            self.stats.hp,
            self.stats.max_hp,
            self.stats.mp,
            self.stats.max_mp
        )?;
        if !self.status_effects.is_empty() {
            let tags: Vec<String> = self.status_effects.iter().map(|s| s.to_string()).collect();
            write!(f, " [{}]", tags.join(", "))?;
        }
        Ok(())
    }
}

/// A player's party. Owned by the session layer; battles only reference it
/// by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    /// Player who controls this party.
    pub owner_id: String,
    pub members: Vec<Character>,
}

impl Party {
    pub fn new(id: &str, owner_id: &str, members: Vec<Character>) -> Self {
        Party {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            members,
        }
    }

    pub fn member(&self, id: &str) -> Option<&Character> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn member_index(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|member| member.id == id)
    }

    pub fn living_members(&self) -> impl Iterator<Item = &Character> {
        self.members.iter().filter(|member| member.is_alive())
    }

    pub fn is_wiped_out(&self) -> bool {
        self.living_members().next().is_none()
    }
}
