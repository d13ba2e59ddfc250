//! Error types.
//!
//! - [`BoardError`]: internal consistency failures while building a board
//! - [`SetupError`]: problems the application must fix before play starts
//! - [`ProtocolError`]: a caller or agent broke the tick/cancel contract

use thiserror::Error;

/// Board construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Board is already finalized")]
    AlreadyFinalized,

    #[error("Route {route} borders more than two tiles")]
    RouteOverflow { route: usize },

    #[error("Routes out of order at index {index}")]
    RoutesUnsorted { index: usize },

    #[error("Duplicate route between vertices {from} and {to}")]
    DuplicateRoute { from: usize, to: usize },

    #[error("Unknown island {id}")]
    UnknownIsland { id: u16 },
}

/// Errors raised before any ticking begins
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Board must be finalized before play")]
    BoardNotFinalized,

    #[error("Need at least {min} players, got {count}")]
    TooFewPlayers { count: usize, min: usize },

    #[error("At most {max} players are supported, got {count}")]
    TooManyPlayers { count: usize, max: usize },

    #[error("Player in seat {index} has id {found}")]
    PlayerNumbering { index: usize, found: u8 },

    #[error("Snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error("Malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Contract violations on the tick/cancel boundary. The engine is left as it
/// was before the failing call; callers should treat these as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Decision stack is empty")]
    EmptyStack,

    #[error("Game is over")]
    GameOver,

    #[error("Expected {expected} agents, got {found}")]
    AgentCount { expected: usize, found: usize },

    #[error("{state} cannot be cancelled")]
    NotCancellable { state: &'static str },

    #[error("Agent chose a value that was not offered in {state}")]
    ChoiceNotOffered { state: &'static str },

    #[error("Option set does not match {state}")]
    MismatchedOptions { state: &'static str },

    #[error("Invalid die value {value}")]
    InvalidDice { value: u8 },
}
