//! The layer around the engine: owns parties and world enemies, routes
//! player commands to battles, and tears battles down once they end.

use crate::battle::ai::FirstLivingTarget;
use crate::battle::engine::process_command;
use crate::battle::snapshot::BattleSnapshot;
use crate::battle::state::BattleEvent;
use crate::battle::store::BattleStore;
use crate::character::Party;
use crate::config::ServerConfig;
use crate::enemy::EnemyTemplate;
use crate::errors::{BattleResult, BattleStateError, SessionError};
use crate::player::PlayerCommand;
use crate::BattleStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome notification for the quest system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryEvent {
    #[serde(rename_all = "camelCase")]
    Defeat { target_id: String },
}

impl StoryEvent {
    pub fn target_id(&self) -> &str {
        match self {
            StoryEvent::Defeat { target_id } => target_id,
        }
    }
}

/// Reply to an engage or a submitted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub snapshot: BattleSnapshot,
    pub story_events: Vec<StoryEvent>,
}

#[derive(Debug, Default)]
pub struct GameSession {
    config: ServerConfig,
    store: BattleStore,
    parties: HashMap<String, Party>,
    /// player id -> party id
    player_parties: HashMap<String, String>,
    world_enemies: HashMap<String, EnemyTemplate>,
    /// Enemy locks: world object id -> battle id.
    engaged: HashMap<String, String>,
}

impl GameSession {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn register_party(&mut self, party: Party) -> Result<(), SessionError> {
        if self.parties.contains_key(&party.id) {
            return Err(SessionError::DuplicateParty(party.id));
        }
        self.player_parties.insert(party.owner_id.clone(), party.id.clone());
        self.parties.insert(party.id.clone(), party);
        Ok(())
    }

    /// Places an engageable enemy in the world, replacing any template with
    /// the same object id.
    pub fn spawn_enemy(&mut self, template: EnemyTemplate) {
        self.world_enemies.insert(template.id.clone(), template);
    }

    pub fn party(&self, party_id: &str) -> Option<&Party> {
        self.parties.get(party_id)
    }

    pub fn party_for_player(&self, player_id: &str) -> Option<&Party> {
        self.player_parties
            .get(player_id)
            .and_then(|party_id| self.parties.get(party_id))
    }

    /// World enemies that can still be engaged or are in battle.
    pub fn world_enemies(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.world_enemies.values()
    }

    pub fn is_engaged(&self, object_id: &str) -> bool {
        self.engaged.contains_key(object_id)
    }

    pub fn active_battles(&self) -> usize {
        self.store.len()
    }

    /// Starts a battle between the player's party and the given world
    /// enemies, locking them until the battle ends.
    pub fn engage(&mut self, player_id: &str, enemy_object_ids: &[&str]) -> BattleResult<SubmitOutcome> {
        let party_id = self
            .player_parties
            .get(player_id)
            .cloned()
            .ok_or_else(|| SessionError::NoPartyForPlayer(player_id.to_string()))?;
        if self.store.battle_for_party(&party_id).is_some() {
            return Err(SessionError::PartyAlreadyInBattle(party_id).into());
        }

        let mut enemies = Vec::with_capacity(enemy_object_ids.len());
        for object_id in enemy_object_ids {
            let template = self
                .world_enemies
                .get(*object_id)
                .ok_or_else(|| SessionError::UnknownEnemy(object_id.to_string()))?;
            if self.is_engaged(object_id) {
                return Err(SessionError::EnemyAlreadyEngaged(object_id.to_string()).into());
            }
            enemies.push(template.spawn());
        }

        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or_else(|| SessionError::PartyNotFound(party_id.clone()))?;
        let battle_id = self.store.create_battle(party, enemies)?;
        for object_id in enemy_object_ids {
            self.engaged.insert(object_id.to_string(), battle_id.clone());
        }
        tracing::info!(player = player_id, battle = %battle_id, "player engaged {} enemies", enemy_object_ids.len());

        self.finish_update(&battle_id, true, None)
    }

    /// Routes a client command to its battle. Rejections are not errors;
    /// only a missing battle or party is.
    pub fn submit_command(
        &mut self,
        battle_id: &str,
        player_id: &str,
        command: PlayerCommand,
    ) -> BattleResult<SubmitOutcome> {
        let battle = self.store.get_mut(battle_id)?;
        let party_id = battle.party_id.clone();
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or_else(|| BattleStateError::PartyMismatch {
                battle_id: battle_id.to_string(),
                party_id: party_id.clone(),
            })?;

        let PlayerCommand::Ability(command) = command;
        match process_command(battle, party, player_id, &command, &FirstLivingTarget) {
            Ok(resolution) => {
                tracing::debug!(battle = battle_id, ?resolution, "command processed");
                self.finish_update(battle_id, true, None)
            }
            Err(rejection) => {
                tracing::warn!(battle = battle_id, player = player_id, "command rejected: {}", rejection);
                if self.config.record_rejections {
                    battle.record(BattleEvent::CommandRejected {
                        reason: rejection.to_string(),
                    });
                }
                self.finish_update(battle_id, false, Some(rejection.to_string()))
            }
        }
    }

    pub fn snapshot(&self, battle_id: &str) -> BattleResult<BattleSnapshot> {
        let battle = self.store.get(battle_id)?;
        let party = self.parties.get(&battle.party_id).ok_or_else(|| {
            BattleStateError::PartyMismatch {
                battle_id: battle_id.to_string(),
                party_id: battle.party_id.clone(),
            }
        })?;
        Ok(BattleSnapshot::capture(battle, party, self.config.client_log_window))
    }

    /// Trims the log, captures the client view, and tears the battle down
    /// if it has ended.
    fn finish_update(
        &mut self,
        battle_id: &str,
        accepted: bool,
        rejection: Option<String>,
    ) -> BattleResult<SubmitOutcome> {
        let state = {
            let battle = self.store.get_mut(battle_id)?;
            battle.trim_log(self.config.log_retention);
            battle.state
        };
        let snapshot = self.snapshot(battle_id)?;

        let mut story_events = Vec::new();
        if state.is_terminal() {
            story_events = self.teardown(battle_id, state);
        }

        Ok(SubmitOutcome {
            accepted,
            rejection,
            snapshot,
            story_events,
        })
    }

    /// Removes a finished battle, releases its enemy locks, and reports boss
    /// defeats on victory.
    fn teardown(&mut self, battle_id: &str, state: BattleStatus) -> Vec<StoryEvent> {
        let released: Vec<String> = self
            .engaged
            .iter()
            .filter(|(_, locked_by)| locked_by.as_str() == battle_id)
            .map(|(object_id, _)| object_id.clone())
            .collect();
        for object_id in &released {
            self.engaged.remove(object_id);
        }

        let mut story_events = Vec::new();
        if state == BattleStatus::Victory {
            let mut defeated: Vec<&EnemyTemplate> = released
                .iter()
                .filter_map(|object_id| self.world_enemies.get(object_id))
                .collect();
            defeated.sort_by(|a, b| a.id.cmp(&b.id));
            story_events = defeated
                .into_iter()
                .filter_map(EnemyTemplate::boss_target)
                .map(|target| StoryEvent::Defeat {
                    target_id: target.id.clone(),
                })
                .collect();
            // Defeated world enemies do not come back.
            for object_id in &released {
                self.world_enemies.remove(object_id);
            }
        }

        self.store.remove(battle_id);
        tracing::info!(battle = battle_id, state = %state, released = released.len(), "battle torn down");
        story_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, Stats};
    use crate::enemy::StoryTarget;
    use pretty_assertions::assert_eq;

    fn hero() -> Character {
        Character::new(
            "aria",
            "Aria",
            "Warrior",
            5,
            Stats {
                strength: 30,
                speed: 10,
                ..Stats::new(40, 10)
            },
        )
    }

    fn template(id: &str, name: &str, hp: u32, boss: bool) -> EnemyTemplate {
        EnemyTemplate {
            id: id.to_string(),
            name: name.to_string(),
            element: None,
            stats: Stats::new(hp, 0),
            story_target: boss.then(|| StoryTarget {
                id: format!("quest-{}", id),
                tags: vec!["boss".to_string()],
            }),
        }
    }

    fn session(config: ServerConfig) -> GameSession {
        let mut session = GameSession::new(config);
        session
            .register_party(Party::new("party-1", "player-1", vec![hero()]))
            .unwrap();
        session.spawn_enemy(template("wyrm", "Wyrm", 20, true));
        session.spawn_enemy(template("rat", "Rat", 20, false));
        session
    }

    fn attack(target: &str) -> PlayerCommand {
        PlayerCommand::ability("aria", Some(target), "basic_attack")
    }

    #[test]
    fn boss_victory_emits_story_event_and_tears_down() {
        let mut session = session(ServerConfig::default());
        let start = session.engage("player-1", &["wyrm"]).unwrap();
        assert!(session.is_engaged("wyrm"));

        let outcome = session
            .submit_command(&start.snapshot.id, "player-1", attack("wyrm"))
            .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.snapshot.state, BattleStatus::Victory);
        assert_eq!(
            outcome.story_events,
            vec![StoryEvent::Defeat {
                target_id: "quest-wyrm".to_string(),
            }]
        );
        assert_eq!(session.active_battles(), 0);
        assert!(!session.is_engaged("wyrm"));
    }

    #[test]
    fn ordinary_victory_has_no_story_events() {
        let mut session = session(ServerConfig::default());
        let start = session.engage("player-1", &["rat"]).unwrap();
        let outcome = session
            .submit_command(&start.snapshot.id, "player-1", attack("rat"))
            .unwrap();
        assert_eq!(outcome.snapshot.state, BattleStatus::Victory);
        assert!(outcome.story_events.is_empty());
    }

    #[test]
    fn fleeing_releases_enemies_without_story_events() {
        let mut session = session(ServerConfig::default());
        let start = session.engage("player-1", &["wyrm"]).unwrap();
        let outcome = session
            .submit_command(
                &start.snapshot.id,
                "player-1",
                PlayerCommand::ability("aria", None, "flee"),
            )
            .unwrap();

        assert_eq!(outcome.snapshot.state, BattleStatus::Defeat);
        assert!(outcome.story_events.is_empty());
        assert!(!session.is_engaged("wyrm"));
        // the wyrm is still out there
        assert!(session.engage("player-1", &["wyrm"]).is_ok());
    }

    #[test]
    fn rejection_is_logged_for_the_client() {
        let mut session = session(ServerConfig::default());
        let start = session.engage("player-1", &["wyrm"]).unwrap();
        let outcome = session
            .submit_command(
                &start.snapshot.id,
                "player-1",
                PlayerCommand::ability("aria", Some("wyrm"), "meteor"),
            )
            .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.rejection.as_deref(), Some("unknown ability meteor"));
        assert_eq!(
            outcome.snapshot.log.last().map(String::as_str),
            Some("Rejected: unknown ability meteor")
        );
        assert_eq!(outcome.snapshot.state, BattleStatus::InProgress);
    }

    #[test]
    fn rejections_can_stay_out_of_the_log() {
        let config = ServerConfig {
            record_rejections: false,
            ..ServerConfig::default()
        };
        let mut session = session(config);
        let start = session.engage("player-1", &["wyrm"]).unwrap();
        let outcome = session
            .submit_command(&start.snapshot.id, "player-2", attack("wyrm"))
            .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.snapshot.log, start.snapshot.log);
    }

    #[test]
    fn log_is_trimmed_and_windowed() {
        let config = ServerConfig {
            log_retention: 3,
            client_log_window: 2,
            ..ServerConfig::default()
        };
        let mut session = session(config);
        let start = session.engage("player-1", &["wyrm"]).unwrap();
        for _ in 0..5 {
            session
                .submit_command(
                    &start.snapshot.id,
                    "player-1",
                    PlayerCommand::ability("aria", Some("wyrm"), "meteor"),
                )
                .unwrap();
        }

        let snapshot = session.snapshot(&start.snapshot.id).unwrap();
        assert_eq!(snapshot.log.len(), 2);
    }

    #[test]
    fn engaged_enemies_are_locked() {
        let mut session = session(ServerConfig::default());
        session
            .register_party(Party::new(
                "party-2",
                "player-2",
                vec![Character::new("bo", "Bo", "Monk", 1, Stats::new(20, 0))],
            ))
            .unwrap();

        session.engage("player-1", &["wyrm"]).unwrap();
        assert!(matches!(
            session.engage("player-2", &["wyrm"]),
            Err(crate::errors::BattleEngineError::Session(
                SessionError::EnemyAlreadyEngaged(_)
            ))
        ));
        assert!(matches!(
            session.engage("player-1", &["rat"]),
            Err(crate::errors::BattleEngineError::Session(
                SessionError::PartyAlreadyInBattle(_)
            ))
        ));
    }

    #[test]
    fn unknown_battle_is_a_hard_error() {
        let mut session = session(ServerConfig::default());
        assert!(matches!(
            session.submit_command("battle-404", "player-1", attack("wyrm")),
            Err(crate::errors::BattleEngineError::BattleState(
                BattleStateError::BattleNotFound(_)
            ))
        ));
        assert!(matches!(
            session.engage("player-1", &["dragon"]),
            Err(crate::errors::BattleEngineError::Session(SessionError::UnknownEnemy(_)))
        ));
    }
}
