//! Serializable game snapshots.
//!
//! A snapshot holds everything [`Engine::restore`] needs to continue a game
//! exactly where it stopped, including the decision stack and the dice
//! sequence, so a restored game rolls the same numbers as the original.

use crate::board::{Board, PlayerId};
use crate::dice::DiceSequence;
use crate::engine::{Engine, Frame};
use crate::error::SetupError;
use crate::player::{Deck, Player};
use crate::rules::Rules;
use serde::{Deserialize, Serialize};

/// Bumped whenever the layout below changes
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub rules: Rules,
    pub board: Board,
    pub players: Vec<Player>,
    /// Bottom of the stack first
    pub frames: Vec<Frame>,
    pub current: PlayerId,
    pub turn: PlayerId,
    pub round: u32,
    pub setup_complete: bool,
    pub dice: DiceSequence,
    pub deck: Deck,
    pub last_roll: Option<(u8, u8)>,
    pub longest_route: Option<PlayerId>,
    pub largest_army: Option<PlayerId>,
    pub winner: Option<PlayerId>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot, rejecting versions this build does not know
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SetupError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn restore(self) -> Result<Engine, SetupError> {
        Engine::restore(self)
    }
}
