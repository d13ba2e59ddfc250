//! Simulation settings read from the environment.

use std::path::PathBuf;
use thiserror::Error;
use tradewinds_core::board::MAX_PLAYERS;
use tradewinds_core::engine::MIN_PLAYERS;
use tradewinds_core::{Board, Rules};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("player count must be between {min} and {max}, got {count}")]
    PlayerCount { count: usize, min: usize, max: usize },

    #[error("unknown board {0:?} (expected standard or archipelago)")]
    UnknownBoard(String),

    #[error("cannot read rules file {path:?}: {source}")]
    RulesFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid rules: {0}")]
    Rules(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    Standard,
    Archipelago,
}

impl BoardKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "standard" => Ok(BoardKind::Standard),
            "archipelago" => Ok(BoardKind::Archipelago),
            other => Err(ConfigError::UnknownBoard(other.to_string())),
        }
    }

    pub fn build(self, seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        match self {
            BoardKind::Standard => Board::standard_with_rng(&mut rng),
            BoardKind::Archipelago => Board::archipelago_with_rng(&mut rng),
        }
    }

    /// Rules used when no rules file is given
    pub fn default_rules(self) -> Rules {
        match self {
            BoardKind::Standard => Rules::default(),
            BoardKind::Archipelago => Rules::seafarers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub players: usize,
    pub seed: u64,
    pub board: BoardKind,
    pub rules: Rules,
    pub max_ticks: usize,
    /// Where to write the final snapshot, if anywhere
    pub snapshot: Option<PathBuf>,
}

impl SimConfig {
    /// Read `TRADEWINDS_*` variables, falling back to a four player
    /// standard game.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let players = number(&lookup, "TRADEWINDS_PLAYERS", 4)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(ConfigError::PlayerCount {
                count: players,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }
        let seed = number(&lookup, "TRADEWINDS_SEED", rand::random::<u64>())?;
        let board = match lookup("TRADEWINDS_BOARD") {
            Some(value) => BoardKind::parse(value.trim())?,
            None => BoardKind::Standard,
        };
        let rules = match lookup("TRADEWINDS_RULES") {
            Some(path) => {
                let path = PathBuf::from(path);
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::RulesFile { path, source })?;
                Rules::from_json(&json)?
            }
            None => board.default_rules(),
        };

        Ok(Self {
            players,
            seed,
            board,
            rules,
            max_ticks: number(&lookup, "TRADEWINDS_MAX_TICKS", 500_000)?,
            snapshot: lookup("TRADEWINDS_SNAPSHOT").map(PathBuf::from),
        })
    }
}

fn number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::from_lookup(lookup(&[("TRADEWINDS_SEED", "7")])).unwrap();
        assert_eq!(config.players, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.board, BoardKind::Standard);
        assert_eq!(config.rules, Rules::default());
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn test_archipelago_uses_seafarers_rules() {
        let config = SimConfig::from_lookup(lookup(&[("TRADEWINDS_BOARD", "archipelago")])).unwrap();
        assert_eq!(config.board, BoardKind::Archipelago);
        assert_eq!(config.rules, Rules::seafarers());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SimConfig::from_lookup(lookup(&[("TRADEWINDS_PLAYERS", "9")])),
            Err(ConfigError::PlayerCount { count: 9, .. })
        ));
        assert!(matches!(
            SimConfig::from_lookup(lookup(&[("TRADEWINDS_SEED", "abc")])),
            Err(ConfigError::NotANumber {
                var: "TRADEWINDS_SEED",
                ..
            })
        ));
        assert!(matches!(
            SimConfig::from_lookup(lookup(&[("TRADEWINDS_BOARD", "moon")])),
            Err(ConfigError::UnknownBoard(_))
        ));
    }
}
