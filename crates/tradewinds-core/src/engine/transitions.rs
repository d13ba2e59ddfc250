//! Transition states: deterministic work that pops itself.

use super::{Engine, Frame, PickReason, State, TickOutcome};
use crate::actions::GameEvent;
use crate::agent::PlayerAgent;
use crate::board::{PlayerId, Resource, RoutePiece, TileIndex, TileKind};
use crate::error::ProtocolError;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

impl Engine {
    pub(super) fn step_transition<A: PlayerAgent>(
        &mut self,
        agents: &mut [A],
    ) -> Result<TickOutcome, ProtocolError> {
        let frame = self.stack.pop().ok_or(ProtocolError::EmptyStack)?;
        debug!(state = frame.state.name(), depth = self.stack.len(), "transition");
        if let Err(err) = self.run_transition(&frame, agents) {
            self.stack.push(frame);
            return Err(err);
        }
        Ok(TickOutcome::Advanced)
    }

    /// Fallible work must fail before anything is mutated.
    fn run_transition<A: PlayerAgent>(
        &mut self,
        frame: &Frame,
        agents: &mut [A],
    ) -> Result<(), ProtocolError> {
        let n = self.seat_count();
        match frame.state {
            State::StartRound => self.start_round(),
            State::BeginSetup => self.begin_setup(),
            State::FinishSetup => {
                self.setup_complete = true;
                self.current = 0;
                info!(round = self.round, "opening complete");
            }
            State::SetPlayer(p) => self.current = p,
            State::NextPlayer => self.current = (self.current + 1) % n,
            State::PreviousPlayer => self.current = (self.current + n - 1) % n,
            State::TakeTurn(p) => {
                self.turn = p;
                self.current = p;
                self.push_sequence(vec![
                    State::BeginTurn,
                    State::RollDice,
                    State::CheckWinner,
                    State::TurnMenu,
                    State::EndTurn,
                ]);
            }
            State::BeginTurn => self.begin_turn(),
            State::RollDice => self.roll_dice(agents)?,
            State::EndTurn => self.end_turn(),
            State::DrawCard => self.draw_card(),
            State::UpdateLongestRoute => self.update_longest_route(),
            State::UpdateLargestArmy => self.update_largest_army(),
            State::CheckWinner => self.check_winner(),
            other => warn!(state = other.name(), "wait state run as a transition"),
        }
        Ok(())
    }

    fn start_round(&mut self) {
        self.round += 1;
        debug!(round = self.round, "round started");
        let turns = (0..self.seat_count()).map(State::TakeTurn).collect();
        self.push(State::StartRound);
        self.push_sequence(turns);
    }

    /// Snake order: forward, backward, forward... Only the last round pays
    /// out starting resources.
    fn begin_setup(&mut self) {
        let n = self.seat_count();
        let rounds = self.rules.setup_rounds;
        let mut states = vec![State::SetPlayer(0)];
        for round in 0..rounds {
            let forward = round % 2 == 0;
            let grants_resources = round + 1 == rounds;
            for i in 0..n {
                if i > 0 {
                    states.push(if forward {
                        State::NextPlayer
                    } else {
                        State::PreviousPlayer
                    });
                }
                states.push(State::SetupSettlement { grants_resources });
            }
        }
        states.push(State::FinishSetup);
        self.push_sequence(states);
    }

    fn begin_turn(&mut self) {
        if !(self.rules.seafarers && self.rules.pirate_patrol) {
            return;
        }
        let from = self.board.pirate();
        if let Some(to) = self.board.advance_pirate() {
            self.emit(GameEvent::PirateMoved {
                player: None,
                from,
                to,
            });
            if self.rules.pirate_raids {
                self.raid(to);
            }
        }
    }

    /// Damage every road along the pirate's tile
    fn raid(&mut self, tile: TileIndex) {
        let mut damaged = Vec::new();
        for route in self.board.sides_of(tile) {
            if let RoutePiece::Road(owner) = self.board.route(route).piece {
                self.board.set_route_piece(route, RoutePiece::DamagedRoad(owner));
                damaged.push(route);
            }
        }
        if !damaged.is_empty() {
            self.emit(GameEvent::RoadsDamaged {
                tile,
                routes: damaged,
            });
            self.push(State::UpdateLongestRoute);
        }
    }

    fn roll_dice<A: PlayerAgent>(&mut self, agents: &mut [A]) -> Result<(), ProtocolError> {
        let mut supplied = [0u8; 2];
        let given = agents
            .get_mut(self.current as usize)
            .map_or(false, |agent| agent.supply_dice(&mut supplied));
        let roll = if given {
            if let Some(&value) = supplied.iter().find(|d| !(1..=6).contains(*d)) {
                return Err(ProtocolError::InvalidDice { value });
            }
            (supplied[0], supplied[1])
        } else {
            (self.dice.next_die(), self.dice.next_die())
        };

        let total = roll.0 + roll.1;
        self.last_roll = Some(roll);
        debug!(player = self.current, total, "dice rolled");
        self.emit(GameEvent::DiceRolled {
            player: self.current,
            roll,
            total,
        });

        if total == 7 {
            self.resolve_seven();
        } else {
            self.produce(total);
        }
        Ok(())
    }

    /// Discards, then the bandit. Each discarded card is its own frame,
    /// taken under the discarding player's seat.
    fn resolve_seven(&mut self) {
        let limit = self.rules.discard_limit;
        let mut states = Vec::new();
        for player in &self.players {
            let held = player.resources.total();
            if held > limit {
                states.push(State::SetPlayer(player.id));
                states.extend(std::iter::repeat(State::Discard).take((held / 2) as usize));
            }
        }
        if !states.is_empty() {
            states.push(State::SetPlayer(self.current));
        }
        states.push(self.bandit_state());
        self.push_sequence(states);
    }

    /// Robber only, or a robber/pirate choice on seafaring boards
    pub(super) fn bandit_state(&self) -> State {
        if self.rules.seafarers && self.board.pirate().is_some() {
            State::ChooseBandit
        } else {
            State::MoveRobber
        }
    }

    fn produce(&mut self, roll: u8) {
        let mut totals: BTreeMap<(PlayerId, Resource), u32> = BTreeMap::new();
        let mut gold = Vec::new();

        for tile in self.board.producing_tiles(roll) {
            let kind = self.board.tile(tile).kind;
            for v in self.board.corners(tile) {
                let occupant = self.board.vertex(v).occupant;
                let Some(owner) = occupant.structure_owner() else {
                    continue;
                };
                match kind {
                    TileKind::Resource(r) => *totals.entry((owner, r)).or_default() += occupant.production(),
                    TileKind::Gold => gold.extend(std::iter::repeat(owner).take(occupant.production() as usize)),
                    _ => {}
                }
            }
        }

        self.credit(totals);
        self.push_gold_picks(gold);
    }

    /// Pay out and report resource totals
    pub(super) fn credit(&mut self, totals: BTreeMap<(PlayerId, Resource), u32>) {
        if totals.is_empty() {
            return;
        }
        for (&(player, resource), &amount) in &totals {
            if let Some(p) = self.players.get_mut(player as usize) {
                p.resources.add(resource, amount);
            }
        }
        self.emit(GameEvent::ResourcesDistributed {
            distributions: totals.into_iter().map(|((p, r), n)| (p, r, n)).collect(),
        });
    }

    /// One pick frame per gold card, each under its owner's seat
    pub(super) fn push_gold_picks(&mut self, owners: Vec<PlayerId>) {
        if owners.is_empty() {
            return;
        }
        let mut states = Vec::with_capacity(owners.len() * 2 + 1);
        for owner in owners {
            states.push(State::SetPlayer(owner));
            states.push(State::PickResource {
                reason: PickReason::Gold,
            });
        }
        states.push(State::SetPlayer(self.current));
        self.push_sequence(states);
    }

    fn end_turn(&mut self) {
        let player = self.turn;
        if let Some(p) = self.players.get_mut(player as usize) {
            p.end_turn();
        }
        self.board.unlock_routes(player);
        let next_player = (player + 1) % self.seat_count();
        self.emit(GameEvent::TurnEnded {
            player,
            next_player,
        });
    }

    fn draw_card(&mut self) {
        let player = self.current;
        match self.deck.draw(&mut self.dice) {
            Some(card) => {
                self.current_mut().new_cards.push(card);
                self.emit(GameEvent::DevelopmentCardPurchased { player });
            }
            None => {
                warn!(player, "development deck exhausted, refunding");
                let cost = self.rules.card_cost.clone();
                self.current_mut().resources.add_hand(&cost);
            }
        }
    }

    /// Only the turn player can win, and only on their own turn
    fn check_winner(&mut self) {
        let player = self.turn;
        let victory_points = self.victory_points(player);
        if victory_points < self.rules.points_to_win {
            return;
        }
        info!(player, victory_points, round = self.round, "game won");
        self.winner = Some(player);
        self.stack.clear();
        self.emit(GameEvent::GameWon {
            player,
            victory_points,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ScriptedAgent;
    use crate::board::{Board, Occupant};
    use crate::player::{Player, ResourceHand};
    use crate::rules::Rules;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(rules: Rules) -> (Engine, Vec<ScriptedAgent>) {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(21));
        let players = (0..3).map(|i| Player::new(i, format!("P{i}"))).collect();
        let engine = Engine::new(board, rules, players, 4).unwrap();
        let agents = (0..3).map(|_| ScriptedAgent::with_fallback()).collect();
        (engine, agents)
    }

    fn finish_setup(engine: &mut Engine, agents: &mut [ScriptedAgent]) {
        while !engine.is_setup_complete() {
            engine.tick(agents, &mut ()).unwrap();
        }
        for agent in agents.iter_mut() {
            agent.set_fallback(false);
        }
    }

    #[test]
    fn test_round_boundary_depth_is_one() {
        let (mut engine, mut agents) = engine(Rules::default());
        let mut boundaries = 0;
        for _ in 0..2000 {
            if engine.top() == Some(&State::StartRound) {
                assert_eq!(engine.depth(), 1);
                boundaries += 1;
            }
            match engine.tick(&mut agents, &mut ()) {
                Ok(TickOutcome::GameOver { .. }) => break,
                Ok(_) => {}
                Err(err) => panic!("{err}"),
            }
        }
        assert!(boundaries >= 2);
    }

    #[test]
    fn test_last_opening_round_pays_out() {
        let (mut engine, mut agents) = engine(Rules::default());
        let mut events: Vec<GameEvent> = Vec::new();
        while !engine.is_setup_complete() {
            engine.tick(&mut agents, &mut events).unwrap();
        }
        let paid: u32 = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ResourcesDistributed { distributions } => {
                    Some(distributions.iter().map(|d| d.2).sum::<u32>())
                }
                _ => None,
            })
            .sum();
        let held: u32 = engine.players().iter().map(|p| p.resources.total()).sum();
        assert_eq!(paid, held);
        assert!(held > 0);
    }

    #[test]
    fn test_supplied_dice_produce() {
        let (mut engine, mut agents) = engine(Rules::default());
        finish_setup(&mut engine, &mut agents);
        let before: Vec<ResourceHand> = engine.players().iter().map(|p| p.resources.clone()).collect();

        let roll = (2..=12)
            .filter(|&n| n != 7)
            .find(|&n| {
                engine.board().producing_tiles(n).iter().any(|&t| {
                    !engine.board().structure_owners_around(t).is_empty()
                })
            })
            .unwrap();
        agents[0].push_dice(roll - roll / 2, roll / 2);
        engine.run(&mut agents, &mut (), 20).unwrap();

        assert_eq!(engine.last_roll().map(|(a, b)| a + b), Some(roll));
        let after: u32 = engine.players().iter().map(|p| p.resources.total()).sum();
        let total_before: u32 = before.iter().map(|h| h.total()).sum();
        assert!(after > total_before);
    }

    #[test]
    fn test_invalid_dice_rejected() {
        let (mut engine, mut agents) = engine(Rules::default());
        finish_setup(&mut engine, &mut agents);
        agents[0].push_dice(0, 9);
        engine.tick(&mut agents, &mut ()).unwrap();
        engine.tick(&mut agents, &mut ()).unwrap();
        engine.tick(&mut agents, &mut ()).unwrap();
        assert_eq!(engine.top(), Some(&State::RollDice));
        let depth = engine.depth();
        assert_eq!(
            engine.tick(&mut agents, &mut ()),
            Err(ProtocolError::InvalidDice { value: 0 })
        );
        assert_eq!(engine.top(), Some(&State::RollDice));
        assert_eq!(engine.depth(), depth);
    }

    #[test]
    fn test_seven_makes_big_hands_discard() {
        let (mut engine, mut agents) = engine(Rules::default());
        finish_setup(&mut engine, &mut agents);
        engine.player_mut(1).unwrap().resources = ResourceHand::with_amounts(3, 3, 3, 0, 0);
        engine.player_mut(2).unwrap().resources = ResourceHand::with_amounts(1, 1, 1, 1, 1);
        agents[0].push_dice(3, 4);
        for agent in &mut agents {
            agent.set_fallback(true);
        }

        let mut events: Vec<GameEvent> = Vec::new();
        while engine.top() != Some(&State::TurnMenu) {
            engine.tick(&mut agents, &mut events).unwrap();
        }
        let discards = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CardsDiscarded { player: 1, .. }))
            .count();
        assert_eq!(discards, 4);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RobberMoved { player: 0, .. })));
        assert_eq!(engine.current_player(), 0);
        assert!(engine.player(2).unwrap().resources.total() <= 5);
    }

    #[test]
    fn test_pirate_patrol_and_raid() {
        let board = Board::archipelago_with_rng(&mut StdRng::seed_from_u64(2));
        let rules = Rules::full();
        let players = (0..2).map(|i| Player::new(i, format!("P{i}"))).collect();
        let mut engine = Engine::new(board, rules, players, 1).unwrap();

        let start = engine.board().pirate().unwrap();
        let next = engine.board().tile(start).patrol_next.unwrap();
        let road = engine.board().sides_of(next)[0];
        engine.board_mut().set_route_piece(road, RoutePiece::Road(1));

        let mut events: Vec<GameEvent> = Vec::new();
        engine.turn = 0;
        engine.begin_turn();
        events.extend(engine.events.drain(..));

        assert_eq!(engine.board().pirate(), Some(next));
        assert_eq!(engine.board().route(road).piece, RoutePiece::DamagedRoad(1));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::RoadsDamaged { tile, .. } if *tile == next)));
        assert_eq!(engine.top(), Some(&State::UpdateLongestRoute));
    }

    #[test]
    fn test_gold_production_asks_owner() {
        let (mut engine, mut agents) = engine(Rules::default());
        finish_setup(&mut engine, &mut agents);
        let (tile, v) = (0..engine.board().tiles().len())
            .filter(|&t| engine.board().tile(t).kind.is_land() && engine.board().robber() != Some(t))
            .find_map(|t| {
                engine
                    .board()
                    .corners(t)
                    .into_iter()
                    .find(|&v| engine.board().vertex(v).occupant.structure_owner().is_some())
                    .map(|v| (t, v))
            })
            .unwrap();
        let owner = engine.board().vertex(v).occupant.structure_owner().unwrap();
        for t in engine.board().producing_tiles(12) {
            engine.board_mut().set_number(t, None);
        }
        engine.board_mut().set_tile_kind(tile, TileKind::Gold);
        engine.board_mut().set_number(tile, Some(12));
        assert_eq!(engine.board().producing_tiles(12), vec![tile]);

        engine.stack.clear();
        engine.push(State::EndTurn);
        engine.current = 0;
        engine.produce(12);
        assert_eq!(engine.top(), Some(&State::SetPlayer(owner)));
        let expected = engine
            .board()
            .corners(tile)
            .iter()
            .filter_map(|&c| {
                let o = engine.board().vertex(c).occupant;
                o.structure_owner().map(|_| o.production() as usize)
            })
            .sum::<usize>();
        let picks = engine
            .frames()
            .iter()
            .filter(|f| matches!(f.state, State::PickResource { reason: PickReason::Gold }))
            .count();
        assert_eq!(picks, expected);
        assert!(matches!(
            engine.board().vertex(v).occupant,
            Occupant::Settlement(_) | Occupant::City(_)
        ));
    }
}
