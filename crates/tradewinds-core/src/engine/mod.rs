//! Pushdown turn engine.
//!
//! Play is a LIFO stack of [`Frame`]s. Each call to [`Engine::tick`] handles
//! exactly the frame on top:
//! - a transition state pops itself, does its work and may push successors
//! - a wait state asks the current player's agent to pick from a legal
//!   option set, and stays on top until it gets an answer
//!
//! "Do X, then Y, then Z" is written by pushing Z, then Y, then X. The
//! [`Engine::push_sequence`] helper takes states in run order and does the
//! reversing.
//!
//! Two player indices are tracked. `turn` is whose turn it is; `current` is
//! whose hand is being read or written right now. They differ while
//! opponents discard, pick gold or retreat a displaced knight.

mod achievements;
mod decisions;
mod frame;
mod transitions;

pub use frame::{Frame, Options, PickReason, State, Undo};

use crate::actions::{EffectSink, GameEvent};
use crate::agent::PlayerAgent;
use crate::board::{Board, PlayerId, MAX_PLAYERS};
use crate::dice::DiceSequence;
use crate::error::{ProtocolError, SetupError};
use crate::legality;
use crate::player::{Deck, DevelopmentCard, Player};
use crate::rules::Rules;
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
use tracing::debug;

/// Fewest seats a game can start with
pub const MIN_PLAYERS: usize = 2;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A transition state ran
    Advanced,
    /// The agent has not answered yet; tick again later
    Pending,
    /// The agent answered and the choice was applied
    Decided,
    /// A wait state had no legal options and was dropped
    Skipped,
    GameOver { winner: PlayerId },
}

/// The turn engine: board, players, rules and the decision stack
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    rules: Rules,
    players: Vec<Player>,
    stack: Vec<Frame>,
    current: PlayerId,
    turn: PlayerId,
    round: u32,
    setup_complete: bool,
    dice: DiceSequence,
    deck: Deck,
    last_roll: Option<(u8, u8)>,
    longest_route: Option<PlayerId>,
    largest_army: Option<PlayerId>,
    winner: Option<PlayerId>,
    /// Buffered until the end of the tick
    events: Vec<GameEvent>,
}

impl Engine {
    /// Seat `players` at `board` under `rules`. Dice, steals and the card
    /// deck all draw from a sequence seeded with `seed`.
    pub fn new(board: Board, rules: Rules, players: Vec<Player>, seed: u64) -> Result<Self, SetupError> {
        validate_setup(&board, &players)?;

        let mut board = board;
        board.set_road_block(rules.road_block);
        let mut dice = DiceSequence::new(seed);
        let deck = Deck::new(DevelopmentCard::deck_for(rules.cities_and_knights), &mut dice);

        debug!(players = players.len(), seed, "engine created");
        Ok(Self {
            board,
            rules,
            players,
            stack: vec![Frame::new(State::StartRound), Frame::new(State::BeginSetup)],
            current: 0,
            turn: 0,
            round: 0,
            setup_complete: false,
            dice,
            deck,
            last_roll: None,
            longest_route: None,
            largest_army: None,
            winner: None,
            events: Vec::new(),
        })
    }

    // ==================== Query Methods ====================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Whose hand is being read or written
    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    /// Whose turn it is
    pub fn turn_player(&self) -> PlayerId {
        self.turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    pub fn last_roll(&self) -> Option<(u8, u8)> {
        self.last_roll
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn longest_route_holder(&self) -> Option<PlayerId> {
        self.longest_route
    }

    pub fn largest_army_holder(&self) -> Option<PlayerId> {
        self.largest_army
    }

    pub fn cards_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Option<&State> {
        self.stack.last().map(|f| &f.state)
    }

    /// Whether [`Engine::cancel`] would succeed
    pub fn can_cancel(&self) -> bool {
        self.top().map_or(false, State::is_cancellable)
    }

    pub fn victory_points(&self, player: PlayerId) -> u32 {
        self.player(player)
            .map_or(0, |p| legality::victory_points(&self.board, &self.rules, p))
    }

    // ==================== Scenario Setup ====================

    /// Direct board access for editors and scenario setup. Edits bypass
    /// the legality rules.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    // ==================== Driving ====================

    /// Process the top frame.
    ///
    /// Errors leave the engine exactly as it was before the call.
    pub fn tick<A: PlayerAgent>(
        &mut self,
        agents: &mut [A],
        sink: &mut dyn EffectSink,
    ) -> Result<TickOutcome, ProtocolError> {
        if self.winner.is_some() {
            return Err(ProtocolError::GameOver);
        }
        if agents.len() != self.players.len() {
            return Err(ProtocolError::AgentCount {
                expected: self.players.len(),
                found: agents.len(),
            });
        }
        let transition = match self.stack.last() {
            Some(frame) => frame.state.is_transition(),
            None => return Err(ProtocolError::EmptyStack),
        };

        let outcome = if transition {
            self.step_transition(agents)?
        } else {
            self.step_decision(agents)?
        };

        for event in self.events.drain(..) {
            sink.emit(&event);
        }
        match self.winner {
            Some(winner) => Ok(TickOutcome::GameOver { winner }),
            None => Ok(outcome),
        }
    }

    /// Tick until an agent is pending, the game ends or `max_ticks` ticks
    /// have run.
    pub fn run<A: PlayerAgent>(
        &mut self,
        agents: &mut [A],
        sink: &mut dyn EffectSink,
        max_ticks: usize,
    ) -> Result<TickOutcome, ProtocolError> {
        let mut outcome = TickOutcome::Advanced;
        for _ in 0..max_ticks {
            outcome = self.tick(agents, sink)?;
            if matches!(outcome, TickOutcome::Pending | TickOutcome::GameOver { .. }) {
                break;
            }
        }
        Ok(outcome)
    }

    /// Back out of the top frame, undoing what entering it cost.
    pub fn cancel(&mut self) -> Result<(), ProtocolError> {
        match self.stack.last() {
            None => return Err(ProtocolError::EmptyStack),
            Some(frame) if !frame.state.is_cancellable() => {
                return Err(ProtocolError::NotCancellable {
                    state: frame.state.name(),
                })
            }
            Some(_) => {}
        }
        if let Some(frame) = self.stack.pop() {
            debug!(state = frame.state.name(), depth = self.stack.len(), "cancelled");
            if let Some(undo) = frame.undo {
                self.apply_undo(undo);
            }
        }
        Ok(())
    }

    // ==================== Persistence ====================

    /// Capture everything needed to resume this game
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            rules: self.rules.clone(),
            board: self.board.clone(),
            players: self.players.clone(),
            frames: self.stack.clone(),
            current: self.current,
            turn: self.turn,
            round: self.round,
            setup_complete: self.setup_complete,
            dice: self.dice.clone(),
            deck: self.deck.clone(),
            last_roll: self.last_roll,
            longest_route: self.longest_route,
            largest_army: self.largest_army,
            winner: self.winner,
        }
    }

    /// Rebuild a runnable engine from a snapshot
    pub fn restore(snapshot: Snapshot) -> Result<Self, SetupError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SetupError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        validate_setup(&snapshot.board, &snapshot.players)?;
        Ok(Self {
            board: snapshot.board,
            rules: snapshot.rules,
            players: snapshot.players,
            stack: snapshot.frames,
            current: snapshot.current,
            turn: snapshot.turn,
            round: snapshot.round,
            setup_complete: snapshot.setup_complete,
            dice: snapshot.dice,
            deck: snapshot.deck,
            last_roll: snapshot.last_roll,
            longest_route: snapshot.longest_route,
            largest_army: snapshot.largest_army,
            winner: snapshot.winner,
            events: Vec::new(),
        })
    }

    // ==================== Stack Helpers ====================

    fn push(&mut self, state: State) {
        self.push_frame(Frame::new(state));
    }

    fn push_frame(&mut self, frame: Frame) {
        debug!(state = frame.state.name(), depth = self.stack.len() + 1, "push");
        self.stack.push(frame);
    }

    /// Push states so that the first one runs first
    fn push_sequence(&mut self, states: Vec<State>) {
        for state in states.into_iter().rev() {
            self.push(state);
        }
    }

    fn apply_undo(&mut self, undo: Undo) {
        match undo {
            Undo::Refund { player, cost } => {
                if let Some(p) = self.players.get_mut(player as usize) {
                    p.resources.add_hand(&cost);
                }
            }
            Undo::RestoreShip { route, piece } => self.board.set_route_piece(route, piece),
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn seat_count(&self) -> PlayerId {
        self.players.len() as PlayerId
    }

    fn current_mut(&mut self) -> &mut Player {
        &mut self.players[self.current as usize]
    }
}

fn validate_setup(board: &Board, players: &[Player]) -> Result<(), SetupError> {
    if !board.is_finalized() {
        return Err(SetupError::BoardNotFinalized);
    }
    if players.len() < MIN_PLAYERS {
        return Err(SetupError::TooFewPlayers {
            count: players.len(),
            min: MIN_PLAYERS,
        });
    }
    if players.len() > MAX_PLAYERS {
        return Err(SetupError::TooManyPlayers {
            count: players.len(),
            max: MAX_PLAYERS,
        });
    }
    for (index, player) in players.iter().enumerate() {
        if player.id as usize != index {
            return Err(SetupError::PlayerNumbering {
                index,
                found: player.id,
            });
        }
    }
    Ok(())
}
