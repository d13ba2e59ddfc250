//! AI bot players.
//!
//! This module provides two difficulty levels:
//! - Easy: Random legal choices
//! - Medium: Basic heuristics (good spots first, cities, robber on the leader)

use crate::actions::MoveKind;
use crate::agent::{
    Bandit, CardMode, EnumValue, PlayerAgent, PlayerMode, RouteMode, TileMode, ValueMode,
    VertexMode,
};
use crate::board::{
    Board, DistanceTables, Occupant, PlayerId, Resource, RouteCategory, RouteIndex, TileIndex,
    VertexIndex,
};
use crate::engine::Engine;
use crate::legality;
use crate::player::{DevelopmentCard, ResourceHand};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// A bot player for one seat
#[derive(Debug, Clone)]
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
    /// Built on first use; only consulted for steering routes
    distances: Option<DistanceTables>,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
            distances: None,
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
            distances: None,
        }
    }

    fn easy(&self) -> bool {
        self.difficulty == BotDifficulty::Easy
    }

    fn random<T: Copy>(&mut self, options: &[T]) -> Option<T> {
        options.choose(&mut self.rng).copied()
    }

    /// Highest score wins; ties go to the earlier option
    fn best_by<T: Copy>(options: &[T], score: impl Fn(T) -> i32) -> Option<T> {
        let mut best: Option<(T, i32)> = None;
        for &option in options {
            let s = score(option);
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((option, s));
            }
        }
        best.map(|(option, _)| option)
    }

    /// Pick from the three best spots with some randomness
    fn rank_settlement_spots(&mut self, board: &Board, options: &[VertexIndex]) -> Option<VertexIndex> {
        let mut scored: Vec<(VertexIndex, i32)> = options
            .iter()
            .map(|&v| (v, score_vertex(board, v)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let top: Vec<VertexIndex> = scored.iter().take(3).map(|(v, _)| *v).collect();
        self.random(&top)
    }

    /// Route that brings us closest to the best unclaimed settlement spot
    fn rank_route_spots(&mut self, board: &Board, options: &[RouteIndex]) -> Option<RouteIndex> {
        let target = Self::best_by(&legality::setup_settlement_spots(board), |v| {
            score_vertex(board, v)
        });
        let Some(target) = target else {
            return self.random(options);
        };
        let tables = self
            .distances
            .get_or_insert_with(|| DistanceTables::build(board));
        Self::best_by(options, |r| {
            let route = board.route(r);
            let near = [route.from, route.to]
                .into_iter()
                .filter_map(|v| tables.distance(v, target))
                .min();
            near.map_or(i32::MIN, |d| -(d as i32))
        })
    }

    /// Hurt whoever is ahead; never block our own tiles when avoidable
    fn rank_bandit_spots(&self, view: &Engine, options: &[TileIndex], pirate: bool) -> Option<TileIndex> {
        let board = view.board();
        Self::best_by(options, |t| {
            let owners: BTreeSet<PlayerId> = if pirate {
                board.ship_owners_around(t)
            } else {
                board.structure_owners_around(t)
            };
            let mut score = board.tile(t).number.map_or(0, pips);
            for owner in owners {
                if owner == self.player_id {
                    score -= 20;
                } else {
                    score += 2 * view.victory_points(owner) as i32;
                }
            }
            score
        })
    }

    fn hand(view: &Engine, player: PlayerId) -> ResourceHand {
        view.player(player)
            .map(|p| p.resources.clone())
            .unwrap_or_default()
    }

    /// The resource we hold most of (or least of, when `most` is false)
    fn by_holding(&self, view: &Engine, options: &[EnumValue], most: bool) -> Option<EnumValue> {
        let hand = Self::hand(view, self.player_id);
        Self::best_by(options, |value| {
            let held = value.resource().map_or(0, |r| hand.get(r) as i32);
            if most {
                held
            } else {
                -held
            }
        })
    }

    fn choose_menu(&mut self, view: &Engine, options: &[MoveKind]) -> Option<MoveKind> {
        let has = |kind: MoveKind| options.contains(&kind);
        let player = view.player(self.player_id)?;

        for kind in [
            MoveKind::BuildCity,
            MoveKind::BuildSettlement,
            MoveKind::BuildMetropolis,
            MoveKind::RepairRoad,
            MoveKind::Attack,
            MoveKind::PlayCard,
        ] {
            if has(kind) {
                return Some(kind);
            }
        }

        for kind in [
            MoveKind::BuildKnight,
            MoveKind::ActivateKnight,
            MoveKind::PromoteKnight,
            MoveKind::MoveKnight,
        ] {
            if has(kind) && self.rng.gen_bool(0.3) {
                return Some(kind);
            }
        }

        // Roads and ships with 30% chance
        if has(MoveKind::BuildRoad) && self.rng.gen_bool(0.3) {
            return Some(MoveKind::BuildRoad);
        }
        if has(MoveKind::BuildShip) && self.rng.gen_bool(0.3) {
            return Some(MoveKind::BuildShip);
        }

        // Buy dev cards with 20% chance
        if has(MoveKind::BuyCard) && self.rng.gen_bool(0.2) {
            return Some(MoveKind::BuyCard);
        }

        // Trade down before a seven can take half the hand
        if has(MoveKind::TradeWithBank) && player.resources.total() > view.rules().discard_limit {
            return Some(MoveKind::TradeWithBank);
        }

        if has(MoveKind::EndTurn) {
            return Some(MoveKind::EndTurn);
        }
        self.random(options)
    }
}

/// Dot count of a number token: 6 and 8 are best, 2 and 12 worst
fn pips(number: u8) -> i32 {
    6 - (7 - number as i32).abs()
}

/// Production value of a vertex plus a bonus for resource variety
fn score_vertex(board: &Board, vertex: VertexIndex) -> i32 {
    let mut score = 0;
    let mut kinds = BTreeSet::new();
    for &t in &board.vertex(vertex).tiles {
        let tile = board.tile(t);
        if !tile.kind.produces() {
            continue;
        }
        if let Some(n) = tile.number {
            score += pips(n);
        }
        if let Some(r) = tile.kind.resource() {
            kinds.insert(r);
        }
    }
    score + kinds.len() as i32
}

impl PlayerAgent for Bot {
    fn choose_move(&mut self, view: &Engine, options: &[MoveKind]) -> Option<MoveKind> {
        if self.easy() {
            return self.random(options);
        }
        self.choose_menu(view, options)
    }

    fn choose_vertex(
        &mut self,
        view: &Engine,
        options: &[VertexIndex],
        mode: VertexMode,
    ) -> Option<VertexIndex> {
        if self.easy() {
            return self.random(options);
        }
        let board = view.board();
        match mode {
            VertexMode::SetupSettlement | VertexMode::Settlement => {
                self.rank_settlement_spots(board, options)
            }
            VertexMode::City | VertexMode::Metropolis => {
                Self::best_by(options, |v| score_vertex(board, v))
            }
            // Stand next to a fortress or the robber when possible
            VertexMode::KnightDestination | VertexMode::Knight => Self::best_by(options, |v| {
                let vertex = board.vertex(v);
                let fortress = vertex
                    .neighbors
                    .iter()
                    .any(|&n| matches!(board.vertex(n).occupant, Occupant::PirateFortress { .. }));
                let robber = board.robber().map_or(false, |t| vertex.tiles.contains(&t));
                i32::from(fortress) * 2 + i32::from(robber)
            }),
            VertexMode::ActivateKnight
            | VertexMode::PromoteKnight
            | VertexMode::KnightSource
            | VertexMode::Displace
            | VertexMode::AttackTarget => self.random(options),
        }
    }

    fn choose_route(
        &mut self,
        view: &Engine,
        options: &[RouteIndex],
        mode: RouteMode,
    ) -> Option<RouteIndex> {
        if self.easy() {
            return self.random(options);
        }
        match mode {
            RouteMode::SetupRoute
            | RouteMode::Road
            | RouteMode::Ship
            | RouteMode::FreeRoute
            | RouteMode::ShipDestination => self.rank_route_spots(view.board(), options),
            RouteMode::ShipSource | RouteMode::Warship | RouteMode::Repair => self.random(options),
        }
    }

    fn choose_tile(&mut self, view: &Engine, options: &[TileIndex], mode: TileMode) -> Option<TileIndex> {
        if self.easy() {
            return self.random(options);
        }
        match mode {
            TileMode::Robber => self.rank_bandit_spots(view, options, false),
            TileMode::Pirate => self.rank_bandit_spots(view, options, true),
            TileMode::Merchant => {
                let hand = Self::hand(view, self.player_id);
                Self::best_by(options, |t| {
                    let tile = view.board().tile(t);
                    let held = tile.kind.resource().map_or(0, |r| hand.get(r) as i32);
                    held + tile.number.map_or(0, pips)
                })
            }
        }
    }

    /// Steal from the richest opponent
    fn choose_player(
        &mut self,
        view: &Engine,
        options: &[PlayerId],
        _mode: PlayerMode,
    ) -> Option<PlayerId> {
        if self.easy() {
            return self.random(options);
        }
        Self::best_by(options, |p| Self::hand(view, p).total() as i32)
    }

    fn choose_card(
        &mut self,
        view: &Engine,
        options: &[DevelopmentCard],
        _mode: CardMode,
    ) -> Option<DevelopmentCard> {
        if self.easy() {
            return self.random(options);
        }
        // Knights first when the robber sits on one of our tiles
        let blocked = view
            .board()
            .robber()
            .map_or(false, |t| view.board().structure_owners_around(t).contains(&self.player_id));
        if blocked && options.contains(&DevelopmentCard::Knight) {
            return Some(DevelopmentCard::Knight);
        }
        options.first().copied()
    }

    fn choose_enum(&mut self, view: &Engine, mode: ValueMode, options: &[EnumValue]) -> Option<EnumValue> {
        if self.easy() {
            return self.random(options);
        }
        match mode {
            ValueMode::Discard | ValueMode::BankGive => self.by_holding(view, options, true),
            ValueMode::Gold | ValueMode::Plenty | ValueMode::BankReceive => {
                self.by_holding(view, options, false)
            }
            ValueMode::Monopoly => Self::best_by(options, |value| {
                let Some(r) = value.resource() else {
                    return 0;
                };
                view.players()
                    .iter()
                    .filter(|p| p.id != self.player_id)
                    .map(|p| p.resources.get(r) as i32)
                    .sum()
            }),
            ValueMode::Bandit => {
                let robber = EnumValue::Bandit(Bandit::Robber);
                if options.contains(&robber) {
                    Some(robber)
                } else {
                    options.first().copied()
                }
            }
        }
    }

    fn choose_route_category(
        &mut self,
        _view: &Engine,
        options: &[RouteCategory],
    ) -> Option<RouteCategory> {
        if options.contains(&RouteCategory::Road) {
            Some(RouteCategory::Road)
        } else {
            self.random(options)
        }
    }
}

/// Resources a bot would give up first
pub fn discard_order(hand: &ResourceHand) -> Vec<Resource> {
    let mut held = hand.held();
    held.sort_by_key(|&r| std::cmp::Reverse(hand.get(r)));
    held
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::engine::TickOutcome;
    use crate::player::Player;
    use crate::rules::Rules;
    use pretty_assertions::assert_eq;

    fn engine(players: u8, rules: Rules, board: Board) -> Engine {
        let seats = (0..players).map(|i| Player::new(i, format!("Bot {i}"))).collect();
        Engine::new(board, rules, seats, 77).unwrap()
    }

    fn bots(players: u8, difficulty: BotDifficulty) -> Vec<Bot> {
        (0..players)
            .map(|i| Bot::with_seed(i, difficulty, 100 + i as u64))
            .collect()
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(0, BotDifficulty::Medium);
        assert_eq!(bot.player_id, 0);
        assert_eq!(bot.difficulty, BotDifficulty::Medium);
    }

    #[test]
    fn test_pips() {
        assert_eq!(pips(6), 5);
        assert_eq!(pips(8), 5);
        assert_eq!(pips(2), 1);
        assert_eq!(pips(12), 1);
    }

    #[test]
    fn test_medium_prefers_city() {
        let mut engine = engine(2, Rules::default(), Board::standard());
        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 1);
        let options = [MoveKind::EndTurn, MoveKind::BuildRoad, MoveKind::BuildCity];
        assert_eq!(bot.choose_move(&engine, &options), Some(MoveKind::BuildCity));

        engine.player_mut(0).unwrap().resources = ResourceHand::new();
        assert_eq!(bot.choose_move(&engine, &[MoveKind::EndTurn]), Some(MoveKind::EndTurn));
    }

    #[test]
    fn test_medium_settles_on_good_spots() {
        let board = Board::standard();
        let engine = engine(2, Rules::default(), board.clone());
        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 3);
        let spots = legality::setup_settlement_spots(&board);
        let best = spots.iter().map(|&v| score_vertex(&board, v)).max().unwrap();

        let mut scores: Vec<i32> = spots.iter().map(|&v| score_vertex(&board, v)).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        let third = scores[2];

        let pick = bot
            .choose_vertex(&engine, &spots, VertexMode::SetupSettlement)
            .unwrap();
        assert!(score_vertex(&board, pick) >= third);
        assert!(score_vertex(&board, pick) <= best);
    }

    #[test]
    fn test_steals_from_richest() {
        let mut engine = engine(3, Rules::default(), Board::standard());
        engine.player_mut(1).unwrap().resources = ResourceHand::with_amounts(1, 0, 0, 0, 0);
        engine.player_mut(2).unwrap().resources = ResourceHand::with_amounts(2, 2, 0, 0, 0);
        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 1);
        assert_eq!(bot.choose_player(&engine, &[1, 2], PlayerMode::Victim), Some(2));
    }

    #[test]
    fn test_discards_most_held() {
        let mut engine = engine(2, Rules::default(), Board::standard());
        engine.player_mut(0).unwrap().resources = ResourceHand::with_amounts(1, 5, 2, 0, 0);
        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 1);
        let options: Vec<EnumValue> = [Resource::Brick, Resource::Lumber, Resource::Ore]
            .into_iter()
            .map(EnumValue::Resource)
            .collect();
        assert_eq!(
            bot.choose_enum(&engine, ValueMode::Discard, &options),
            Some(EnumValue::Resource(Resource::Lumber))
        );
        assert_eq!(
            bot.choose_enum(&engine, ValueMode::Plenty, &options),
            Some(EnumValue::Resource(Resource::Brick))
        );
        assert_eq!(
            discard_order(&engine.player(0).unwrap().resources),
            vec![Resource::Lumber, Resource::Ore, Resource::Brick]
        );
    }

    #[test]
    fn test_easy_bots_keep_the_game_moving() {
        let mut engine = engine(3, Rules::default(), Board::standard());
        let mut agents = bots(3, BotDifficulty::Easy);
        let outcome = engine.run(&mut agents, &mut (), 5_000).unwrap();
        assert_ne!(outcome, TickOutcome::Pending);
        assert!(engine.is_setup_complete());
        assert!(engine.round() > 1);
    }

    #[test]
    fn test_medium_bots_play_a_whole_game() {
        let mut engine = engine(4, Rules::default(), Board::standard());
        let mut agents = bots(4, BotDifficulty::Medium);
        let outcome = engine.run(&mut agents, &mut (), 200_000).unwrap();
        assert_eq!(outcome, TickOutcome::GameOver { winner: engine.winner().unwrap() });
        let winner = engine.winner().unwrap();
        assert!(engine.victory_points(winner) >= engine.rules().points_to_win);
    }
}
