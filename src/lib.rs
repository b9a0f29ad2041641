//! Crystal Battle Engine
//!
//! Deterministic, turn-based party-versus-enemies combat for a small
//! multiplayer game server. The engine owns turn order, command validation,
//! ability resolution and victory/defeat detection; the session layer around
//! it owns parties, world enemies and battle teardown.

// --- MODULE DECLARATIONS ---
pub mod ability_data;
pub mod battle;
pub mod character;
pub mod config;
pub mod enemy;
pub mod errors;
pub mod mcp_interface;
pub mod player;
pub mod prefabs;
pub mod session;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{BattleStatus, Element, StatusEffect, TargetType, UnitKind};

// --- From this crate's modules (`src/`) ---

// Core battle engine functions and state.
pub use battle::engine::{
    advance_turn, execute_ability, process_command, prune_dead, recompute_state, run_enemy_turns,
    start_battle, Resolution,
};
pub use battle::snapshot::BattleSnapshot;
pub use battle::state::{Battle, BattleEvent, TurnRef, UnitHandle};
pub use battle::store::BattleStore;
pub use battle::turn_order::compute_initial_order;
pub use battle::validation::{validate_command, CommandRejection};

// Combatants and commands.
pub use character::{Character, Combatant, Party, Stats};
pub use enemy::{Enemy, EnemyTemplate, StoryTarget};
pub use player::{AbilityCommand, PlayerCommand};

// Catalog access.
pub use ability_data::{abilities_available_to, all_abilities, get_ability, Ability, EffectKind};

pub use config::ServerConfig;
pub use session::{GameSession, StoryEvent, SubmitOutcome};

// Crate-specific error and result types.
pub use errors::{
    AbilityDataError, AbilityDataResult, BattleEngineError, BattleResult, BattleStateError,
    ConfigError, SessionError,
};
