use crate::character::{Combatant, Stats};
use crate::{Element, StatusEffect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A per-battle enemy record, spawned from a world template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub element: Option<Element>,
    pub stats: Stats,
    pub status_effects: BTreeSet<StatusEffect>,
}

impl Enemy {
    pub fn new(id: &str, name: &str, element: Option<Element>, stats: Stats) -> Self {
        Enemy {
            id: id.to_string(),
            name: name.to_string(),
            element,
            stats,
            status_effects: BTreeSet::new(),
        }
    }
}

impl Combatant for Enemy {
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
        self.element
    }
}

/// Quest hook carried by a world enemy. A victory against a `boss`-tagged
/// target is reported to the quest system by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTarget {
    pub id: String,
    pub tags: Vec<String>,
}

impl StoryTarget {
    pub fn is_boss(&self) -> bool {
        self.tags.iter().any(|tag| tag == "boss")
    }
}

/// A world object that can be engaged in battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyTemplate {
    /// World object id. Spawned enemies take this id.
    pub id: String,
    pub name: String,
    pub element: Option<Element>,
    pub stats: Stats,
    pub story_target: Option<StoryTarget>,
}

impl EnemyTemplate {
    /// Fresh, full-health enemy for a new battle.
    pub fn spawn(&self) -> Enemy {
        let mut stats = self.stats;
        stats.hp = stats.max_hp;
        stats.mp = stats.max_mp;
        Enemy::new(&self.id, &self.name, self.element, stats)
    }

    pub fn boss_target(&self) -> Option<&StoryTarget> {
        self.story_target.as_ref().filter(|target| target.is_boss())
    }
}
