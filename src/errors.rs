use thiserror::Error;

/// Main error type for the Crystal Battle engine
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// Error related to ability catalog lookup or loading
    #[error("Ability data error: {0}")]
    AbilityData(#[from] AbilityDataError),
    /// Error related to invalid battle construction or lookup
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// Error raised by the session layer around the engine
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Error loading server configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to ability catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbilityDataError {
    /// The specified ability was not found in the catalog
    #[error("Ability not found: {0}")]
    AbilityNotFound(String),
    /// Two catalog entries share an id
    #[error("Duplicate ability id: {0}")]
    DuplicateAbility(String),
    /// Catalog data is malformed or incomplete
    #[error("Malformed ability data: {0}")]
    MalformedData(String),
}

/// Structural misuse of the engine. These indicate a caller bug, not a
/// gameplay event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    #[error("Battle not found: {0}")]
    BattleNotFound(String),
    #[error("Party {0} has no members")]
    EmptyParty(String),
    #[error("A battle needs at least one enemy")]
    NoEnemies,
    #[error("Combatant id {0} appears more than once")]
    DuplicateCombatantId(String),
    #[error("Party {party_id} does not belong to battle {battle_id}")]
    PartyMismatch { battle_id: String, party_id: String },
}

/// Errors raised by the session layer that owns parties and world enemies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Player {0} has no party")]
    NoPartyForPlayer(String),
    #[error("Party not found: {0}")]
    PartyNotFound(String),
    #[error("Party {0} is already registered")]
    DuplicateParty(String),
    #[error("Party {0} is already in a battle")]
    PartyAlreadyInBattle(String),
    #[error("Unknown enemy object: {0}")]
    UnknownEnemy(String),
    #[error("Enemy {0} is already engaged in another battle")]
    EnemyAlreadyEngaged(String),
}

/// Errors loading `ServerConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using AbilityDataError
pub type AbilityDataResult<T> = Result<T, AbilityDataError>;
