use serde::{Deserialize, Serialize};

/// A single ability use requested for the active party member.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbilityCommand {
    pub source_id: String,
    /// Ignored for self-targeted abilities.
    #[serde(default)]
    pub target_id: Option<String>,
    pub ability_id: String,
}

impl AbilityCommand {
    pub fn new(source_id: &str, target_id: Option<&str>, ability_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            target_id: target_id.map(str::to_string),
            ability_id: ability_id.to_string(),
        }
    }
}

/// Inbound command from a client, tagged by `type`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerCommand {
    Ability(AbilityCommand),
}

impl PlayerCommand {
    pub fn ability(source_id: &str, target_id: Option<&str>, ability_id: &str) -> Self {
        PlayerCommand::Ability(AbilityCommand::new(source_id, target_id, ability_id))
    }
}
