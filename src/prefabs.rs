use crate::character::{Character, Party, Stats};
use crate::enemy::{EnemyTemplate, StoryTarget};
use crate::Element;

/// A predefined party member for guest sessions and the demo.
#[derive(Debug, Clone)]
pub struct PrefabMember {
    pub id: &'static str,
    pub name: &'static str,
    pub class_name: &'static str,
    pub level: u32,
    pub stats: Stats,
    pub resonance: &'static [(Element, f64)],
    /// slot -> item id
    pub equipment: &'static [(&'static str, &'static str)],
}

impl PrefabMember {
    pub fn build(&self) -> Character {
        let mut character = Character::new(self.id, self.name, self.class_name, self.level, self.stats);
        character.crystal_resonance.extend(self.resonance.iter().copied());
        character.equipment.extend(
            self.equipment
                .iter()
                .map(|(slot, item)| (slot.to_string(), item.to_string())),
        );
        character
    }
}

fn stats(max_hp: u32, max_mp: u32, strength: u32, defense: u32, magic: u32, spirit: u32, speed: u32) -> Stats {
    Stats {
        strength,
        defense,
        magic,
        spirit,
        speed,
        luck: 5,
        ..Stats::new(max_hp, max_mp)
    }
}

/// Warrior, sage and ranger.
pub fn get_prefab_members() -> Vec<PrefabMember> {
    vec![
        PrefabMember {
            id: "aria",
            name: "Aria",
            class_name: "Warrior",
            level: 4,
            stats: stats(64, 12, 14, 8, 3, 4, 9),
            resonance: &[(Element::Earth, 0.6), (Element::Fire, 0.2)],
            equipment: &[("weapon", "bronze-axe"), ("armor", "scale-mail")],
        },
        PrefabMember {
            id: "sable",
            name: "Sable",
            class_name: "Sage",
            level: 4,
            stats: stats(42, 40, 4, 4, 13, 9, 7),
            resonance: &[(Element::Light, 0.8)],
            equipment: &[("weapon", "ash-staff"), ("armor", "linen-robe")],
        },
        PrefabMember {
            id: "kell",
            name: "Kell",
            class_name: "Ranger",
            level: 4,
            stats: stats(50, 18, 11, 6, 6, 5, 12),
            resonance: &[(Element::Wind, 0.5), (Element::Water, 0.5)],
            equipment: &[("weapon", "yew-bow")],
        },
    ]
}

pub fn demo_party(party_id: &str, owner_id: &str) -> Party {
    let members = get_prefab_members().iter().map(PrefabMember::build).collect();
    Party::new(party_id, owner_id, members)
}

/// World enemies for the demo map. `cinder-wyrm` is the act boss.
pub fn get_enemy_templates() -> Vec<EnemyTemplate> {
    vec![
        EnemyTemplate {
            id: "slime-1".to_string(),
            name: "Moss Slime".to_string(),
            element: Some(Element::Earth),
            stats: stats(30, 0, 7, 3, 0, 2, 4),
            story_target: None,
        },
        EnemyTemplate {
            id: "bat-1".to_string(),
            name: "Dusk Bat".to_string(),
            element: Some(Element::Shadow),
            stats: stats(22, 0, 8, 2, 0, 3, 14),
            story_target: None,
        },
        EnemyTemplate {
            id: "cinder-wyrm".to_string(),
            name: "Cinder Wyrm".to_string(),
            element: Some(Element::Fire),
            stats: stats(120, 30, 16, 9, 12, 8, 8),
            story_target: Some(StoryTarget {
                id: "quest-cinder-wyrm".to_string(),
                tags: vec!["boss".to_string(), "act-1".to_string()],
            }),
        },
    ]
}
