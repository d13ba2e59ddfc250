//! Tradewinds headless simulator.
//!
//! Plays one bot-only game with settings from `TRADEWINDS_*` environment
//! variables and prints a JSON summary to stdout.

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tradewinds_core::{Bot, BotDifficulty, EffectSink, Engine, GameEvent, Player, PlayerId, TickOutcome, TracingSink};

mod config;

use config::SimConfig;

/// Counts events on their way to the log
#[derive(Debug, Default)]
struct CountingSink {
    inner: TracingSink,
    events: usize,
    sevens: usize,
}

impl EffectSink for CountingSink {
    fn emit(&mut self, event: &GameEvent) {
        self.events += 1;
        if let GameEvent::DiceRolled { total: 7, .. } = event {
            self.sevens += 1;
        }
        self.inner.emit(event);
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    players: usize,
    rounds: u32,
    ticks: usize,
    events: usize,
    sevens: usize,
    winner: Option<PlayerId>,
    victory_points: Vec<u32>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SimConfig::from_env()?;
    info!(
        players = config.players,
        seed = config.seed,
        board = ?config.board,
        "starting simulation"
    );

    let board = config.board.build(config.seed);
    let seats: Vec<Player> = (0..config.players)
        .map(|i| Player::new(i as PlayerId, format!("Bot {}", i + 1)))
        .collect();
    let mut engine = Engine::new(board, config.rules.clone(), seats, config.seed)?;
    let mut agents: Vec<Bot> = (0..config.players)
        .map(|i| Bot::with_seed(i as PlayerId, BotDifficulty::Medium, config.seed.wrapping_add(i as u64)))
        .collect();

    let mut sink = CountingSink::default();
    let mut ticks = 0;
    while ticks < config.max_ticks {
        ticks += 1;
        match engine.tick(&mut agents, &mut sink)? {
            TickOutcome::GameOver { .. } => break,
            TickOutcome::Pending => warn!(player = engine.current_player(), "bot did not answer"),
            _ => {}
        }
    }
    if engine.winner().is_none() {
        warn!(ticks, round = engine.round(), "tick limit reached without a winner");
    }

    if let Some(path) = &config.snapshot {
        std::fs::write(path, engine.snapshot().to_json()?)?;
        info!(path = %path.display(), "snapshot written");
    }

    let summary = Summary {
        seed: config.seed,
        players: config.players,
        rounds: engine.round(),
        ticks,
        events: sink.events,
        sevens: sink.sevens,
        winner: engine.winner(),
        victory_points: (0..config.players)
            .map(|p| engine.victory_points(p as PlayerId))
            .collect(),
    };
    info!(winner = ?summary.winner, rounds = summary.rounds, ticks, "simulation finished");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
