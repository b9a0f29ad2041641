use crate::battle::engine::start_battle;
use crate::battle::state::Battle;
use crate::character::Party;
use crate::enemy::Enemy;
use crate::errors::BattleStateError;
use std::collections::HashMap;

/// Owns every live battle, keyed by battle id, plus the side table from
/// battle id to the party it was created for. Parties themselves stay with
/// the caller.
#[derive(Debug, Default)]
pub struct BattleStore {
    battles: HashMap<String, Battle>,
    parties: HashMap<String, String>,
    next_id: u64,
}

impl BattleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a battle and stores it. Returns the new battle id.
    pub fn create_battle(
        &mut self,
        party: &mut Party,
        enemies: Vec<Enemy>,
    ) -> Result<String, BattleStateError> {
        self.next_id += 1;
        let id = format!("battle-{}", self.next_id);
        let battle = start_battle(id.clone(), party, enemies)?;
        self.parties.insert(id.clone(), party.id.clone());
        self.battles.insert(id.clone(), battle);
        Ok(id)
    }

    pub fn get(&self, battle_id: &str) -> Result<&Battle, BattleStateError> {
        self.battles
            .get(battle_id)
            .ok_or_else(|| BattleStateError::BattleNotFound(battle_id.to_string()))
    }

    pub fn get_mut(&mut self, battle_id: &str) -> Result<&mut Battle, BattleStateError> {
        self.battles
            .get_mut(battle_id)
            .ok_or_else(|| BattleStateError::BattleNotFound(battle_id.to_string()))
    }

    /// Id of the party a battle was created for.
    pub fn party_of(&self, battle_id: &str) -> Option<&str> {
        self.parties.get(battle_id).map(String::as_str)
    }

    /// Id of the stored battle referencing `party_id`, if any.
    pub fn battle_for_party(&self, party_id: &str) -> Option<&str> {
        self.parties
            .iter()
            .find(|(_, pid)| pid.as_str() == party_id)
            .map(|(battle_id, _)| battle_id.as_str())
    }

    /// Drops a battle and its party link. Finished battles are never removed
    /// automatically.
    pub fn remove(&mut self, battle_id: &str) -> Option<Battle> {
        self.parties.remove(battle_id);
        let removed = self.battles.remove(battle_id);
        if removed.is_some() {
            tracing::debug!(battle = battle_id, "battle removed from store");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }
}
