//! Tradewinds - a rules engine for Catan-family board games
//!
//! This crate provides the core game logic for Tradewinds, including:
//! - Hex geometry and the board graph of tiles, vertices and routes
//! - Player state, resources and development cards
//! - A stack-driven turn engine that polls players for decisions
//! - Legality queries, bots and serializable snapshots
//!
//! # Architecture
//!
//! The engine owns no I/O. Callers hand it one [`PlayerAgent`] per seat and
//! an [`EffectSink`] for events, then call [`Engine::tick`] until a game is
//! won. It can be compiled to:
//! - Native Rust for simulations and servers
//! - WebAssembly for browser play (feature `wasm`)
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and corner geometry
//! - [`board`]: Board graph, route caches, islands and distances
//! - [`player`]: Player state, hands and the card deck
//! - [`rules`]: Rule toggles and costs
//! - [`engine`]: The turn engine
//! - [`legality`]: What a player may do right now
//! - [`agent`]: The decision interface players implement
//! - [`bot`]: Computer players
//! - [`snapshot`]: Save and resume games

pub mod actions;
pub mod agent;
pub mod board;
pub mod bot;
pub mod dice;
pub mod engine;
pub mod error;
pub mod hex;
pub mod legality;
pub mod player;
pub mod rules;
pub mod snapshot;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{AttackOutcome, EffectSink, GameEvent, MoveKind, TracingSink};
pub use agent::{Choice, EnumValue, PlayerAgent, ScriptedAgent};
pub use board::{
    Board, Occupant, PlayerId, Resource, RouteCategory, RouteIndex, RoutePiece, TileIndex, TileKind,
    VertexIndex,
};
pub use bot::{Bot, BotDifficulty};
pub use dice::DiceSequence;
pub use engine::{Engine, Frame, Options, State, TickOutcome};
pub use error::{BoardError, ProtocolError, SetupError};
pub use hex::HexCoord;
pub use player::{DevelopmentCard, Player, PlayerColor, ResourceHand};
pub use rules::Rules;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
