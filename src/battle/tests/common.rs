use crate::battle::engine::start_battle;
use crate::battle::state::Battle;
use crate::character::{Character, Party, Stats};
use crate::enemy::Enemy;
use crate::player::AbilityCommand;
use crate::Element;

pub const TEST_PLAYER: &str = "player-1";
pub const TEST_PARTY: &str = "party-1";

/// A builder for test combatants with zeroed stats.
///
/// # Example
/// ```ignore
/// let aria = TestUnitBuilder::new("aria", "Aria")
///     .with_strength(10)
///     .with_speed(9)
///     .build_character();
/// ```
pub struct TestUnitBuilder {
    id: String,
    name: String,
    class_name: String,
    level: u32,
    element: Option<Element>,
    stats: Stats,
}

impl TestUnitBuilder {
    /// 30 HP, 20 MP, every other stat zero.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            class_name: "Warrior".to_string(),
            level: 1,
            element: None,
            stats: Stats::new(30, 20),
        }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    /// Sets both current and max HP.
    pub fn with_max_hp(mut self, max_hp: u32) -> Self {
        self.stats.max_hp = max_hp;
        self.stats.hp = max_hp;
        self
    }

    /// Sets current HP only. Call after `with_max_hp`.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.stats.hp = hp;
        self
    }

    pub fn with_mp(mut self, mp: u32) -> Self {
        self.stats.mp = mp;
        self
    }

    pub fn with_strength(mut self, strength: u32) -> Self {
        self.stats.strength = strength;
        self
    }

    pub fn with_defense(mut self, defense: u32) -> Self {
        self.stats.defense = defense;
        self
    }

    pub fn with_magic(mut self, magic: u32) -> Self {
        self.stats.magic = magic;
        self
    }

    pub fn with_spirit(mut self, spirit: u32) -> Self {
        self.stats.spirit = spirit;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.stats.speed = speed;
        self
    }

    /// Explicit element for enemies; for characters this becomes the only
    /// resonance weight.
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn build_character(self) -> Character {
        let mut character = Character::new(&self.id, &self.name, &self.class_name, self.level, self.stats);
        if let Some(element) = self.element {
            character.crystal_resonance.insert(element, 1.0);
        }
        character
    }

    pub fn build_enemy(self) -> Enemy {
        Enemy::new(&self.id, &self.name, self.element, self.stats)
    }
}

pub fn create_test_party(members: Vec<Character>) -> Party {
    Party::new(TEST_PARTY, TEST_PLAYER, members)
}

/// Starts a battle, panicking on construction errors.
pub fn create_test_battle(party: &mut Party, enemies: Vec<Enemy>) -> Battle {
    match start_battle("battle-test".to_string(), party, enemies) {
        Ok(battle) => battle,
        Err(err) => panic!("Failed to create test battle: {}", err),
    }
}

pub fn ability(source: &str, target: Option<&str>, ability_id: &str) -> AbilityCommand {
    AbilityCommand::new(source, target, ability_id)
}
