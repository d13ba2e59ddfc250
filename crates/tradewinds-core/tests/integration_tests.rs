//! Integration tests for the Tradewinds engine.
//!
//! These tests drive whole games and board mutations through the public API.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tradewinds_core::legality;
use tradewinds_core::*;

fn seats(n: u8) -> Vec<Player> {
    (0..n).map(|i| Player::new(i, format!("Player {}", i + 1))).collect()
}

fn standard_engine(n: u8, seed: u64) -> Engine {
    let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(seed));
    Engine::new(board, Rules::default(), seats(n), seed).unwrap()
}

/// A simple path of `length` roads over land routes, avoiding `used` vertices
fn find_path(board: &Board, used: &[bool], length: usize) -> Vec<RouteIndex> {
    fn extend(
        board: &Board,
        at: VertexIndex,
        visited: &mut Vec<bool>,
        path: &mut Vec<RouteIndex>,
        length: usize,
    ) -> bool {
        if path.len() == length {
            return true;
        }
        for &r in board.routes_at(at) {
            let next = board.route(r).other_end(at);
            if !board.route(r).land || visited[next] {
                continue;
            }
            visited[next] = true;
            path.push(r);
            if extend(board, next, visited, path, length) {
                return true;
            }
            path.pop();
            visited[next] = false;
        }
        false
    }

    for start in 0..board.vertices().len() {
        if used[start] || !board.vertex(start).land {
            continue;
        }
        let mut visited = used.to_vec();
        visited[start] = true;
        let mut path = Vec::new();
        if extend(board, start, &mut visited, &mut path, length) {
            return path;
        }
    }
    panic!("no free path of length {length}");
}

fn lay_path(engine: &mut Engine, used: &mut [bool], player: PlayerId, length: usize) {
    let path = find_path(engine.board(), used, length);
    for r in path {
        let (from, to) = (engine.board().route(r).from, engine.board().route(r).to);
        used[from] = true;
        used[to] = true;
        engine.board_mut().set_route_piece(r, RoutePiece::Road(player));
    }
}

fn structures(board: &Board, player: PlayerId) -> usize {
    board.count_occupants(|o| o.structure_owner() == Some(player))
}

// ==================== Board ====================

#[test]
fn test_generated_boards_are_consistent() {
    for seed in 0..5 {
        let boards = [
            Board::standard_with_rng(&mut StdRng::seed_from_u64(seed)),
            Board::archipelago_with_rng(&mut StdRng::seed_from_u64(seed)),
        ];
        for board in &boards {
            let keys: Vec<_> = board.routes().iter().map(|r| r.key()).collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]), "seed {seed}");

            for vertex in board.vertices() {
                let expected = if vertex.tiles.len() == 1 { 2 } else { 3 };
                assert_eq!(vertex.neighbors.len(), expected);
            }
        }
    }
}

#[test]
fn test_route_cache_tracks_owners_only() {
    let mut engine = standard_engine(3, 1);
    let mut used = vec![false; engine.board().vertices().len()];
    lay_path(&mut engine, &mut used, 0, 3);
    lay_path(&mut engine, &mut used, 2, 2);

    let board = engine.board_mut();
    assert_eq!(board.longest_route(0), 3);
    assert_eq!(board.longest_route(1), 0);
    assert_eq!(board.longest_route(2), 2);

    // Hand one of player 0's roads to player 1
    let taken = (0..board.routes().len())
        .find(|&r| board.route(r).piece == RoutePiece::Road(0))
        .unwrap();
    board.set_route_piece(taken, RoutePiece::Road(1));

    assert_eq!(board.cached_route_length(0), None);
    assert_eq!(board.cached_route_length(1), None);
    assert_eq!(board.cached_route_length(2), Some(2));
    assert_eq!(board.longest_route(2), 2);
    assert_eq!(board.longest_route(1), 1);
}

#[test]
fn test_island_discovery_is_stable() {
    let mut board = Board::archipelago_with_rng(&mut StdRng::seed_from_u64(4));
    let count = board.discover_islands();
    assert!(count > 1);

    let islands: Vec<_> = board.islands().to_vec();
    for island in &islands {
        for &tile in &island.tiles {
            assert_eq!(board.discover_island_at(tile), Some(island.id));
        }
    }
    assert_eq!(board.discover_islands(), count);
    assert_eq!(board.islands(), islands.as_slice());
}

// ==================== Turn Engine ====================

#[test]
fn test_stack_is_flat_between_rounds() {
    let mut engine = standard_engine(3, 9);
    let mut agents: Vec<Bot> = (0..3)
        .map(|i| Bot::with_seed(i, BotDifficulty::Medium, 40 + i as u64))
        .collect();

    let mut boundaries = 0;
    for _ in 0..20_000 {
        if engine.top() == Some(&State::StartRound) {
            assert_eq!(engine.depth(), 1, "round {}", engine.round());
            boundaries += 1;
        }
        if let TickOutcome::GameOver { .. } = engine.tick(&mut agents, &mut ()).unwrap() {
            break;
        }
    }
    assert!(boundaries >= 3);
}

#[test]
fn test_cancel_restores_cost_and_board() {
    let mut engine = standard_engine(2, 3);
    let mut agents: Vec<ScriptedAgent> = (0..2).map(|_| ScriptedAgent::with_fallback()).collect();
    while !engine.is_setup_complete() {
        engine.tick(&mut agents, &mut ()).unwrap();
    }
    for agent in &mut agents {
        agent.set_fallback(false);
    }
    agents[0].push_dice(1, 2);
    while engine.top() != Some(&State::TurnMenu) {
        engine.tick(&mut agents, &mut ()).unwrap();
    }

    let hand = ResourceHand::with_amounts(0, 0, 4, 3, 0);
    engine.player_mut(0).unwrap().resources = hand.clone();
    let board_before = engine.board().clone();
    let depth_before = engine.depth();

    agents[0].push(Choice::Move(MoveKind::BuildCity));
    assert_eq!(engine.tick(&mut agents, &mut ()).unwrap(), TickOutcome::Decided);
    assert_eq!(engine.top(), Some(&State::PlaceCity));
    assert_eq!(
        engine.player(0).unwrap().resources,
        ResourceHand::with_amounts(0, 0, 1, 1, 0)
    );

    engine.cancel().unwrap();
    assert_eq!(engine.player(0).unwrap().resources, hand);
    assert_eq!(engine.board(), &board_before);

    // The winner check queued under the action still runs, then the menu is back
    assert_eq!(engine.top(), Some(&State::CheckWinner));
    assert_eq!(engine.tick(&mut agents, &mut ()).unwrap(), TickOutcome::Advanced);
    assert_eq!(engine.depth(), depth_before);
    assert_eq!(engine.top(), Some(&State::TurnMenu));
}

#[test]
fn test_cancel_refused_outside_wait_states() {
    let mut engine = standard_engine(2, 3);
    assert!(matches!(
        engine.cancel(),
        Err(ProtocolError::NotCancellable { .. })
    ));
    assert_eq!(engine.depth(), 2);
}

#[test]
fn test_longest_route_changes_hands() {
    let mut engine = standard_engine(3, 2);
    let mut used = vec![false; engine.board().vertices().len()];
    let mut events: Vec<GameEvent> = Vec::new();
    let mut agents: Vec<ScriptedAgent> = (0..3).map(|_| ScriptedAgent::new()).collect();

    lay_path(&mut engine, &mut used, 0, 5);
    engine.update_longest_route();
    assert_eq!(engine.longest_route_holder(), Some(0));

    lay_path(&mut engine, &mut used, 1, 5);
    engine.update_longest_route();
    assert_eq!(engine.longest_route_holder(), Some(0));

    lay_path(&mut engine, &mut used, 2, 6);
    engine.update_longest_route();
    assert_eq!(engine.longest_route_holder(), Some(2));
    assert!(!engine.player(0).unwrap().has_longest_route);
    assert!(engine.player(2).unwrap().has_longest_route);

    // Queued title events reach the sink on the next tick
    engine.tick(&mut agents, &mut events).unwrap();
    let changes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::LongestRouteChanged { current, length, .. } => Some((*current, *length)),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![(Some(0), 5), (Some(2), 6)]);
}

#[test]
fn test_opening_settlement_and_road() {
    let mut engine = standard_engine(3, 6);
    let mut agents: Vec<ScriptedAgent> = (0..3).map(|_| ScriptedAgent::new()).collect();

    let board = engine.board().clone();
    let spot = legality::setup_settlement_spots(&board)[0];
    let player = engine.player(0).unwrap().clone();
    let road = legality::setup_route_spots(&board, engine.rules(), &player, spot)[0];
    let others: Vec<(usize, u32)> = (1..3)
        .map(|p| (structures(&board, p), board.clone().longest_route(p)))
        .collect();

    agents[0].extend([Choice::Vertex(spot), Choice::Route(road)]);
    let outcome = engine.run(&mut agents, &mut (), 100).unwrap();
    assert_eq!(outcome, TickOutcome::Pending);
    assert_eq!(engine.current_player(), 1);

    let board = engine.board();
    assert_eq!(board.vertex(spot).occupant, Occupant::Settlement(0));
    assert_eq!(board.route(road).piece, RoutePiece::Road(0));
    assert_eq!(board.cached_route_length(0), Some(1));
    for (p, (count, length)) in (1..3).zip(others) {
        assert_eq!(structures(board, p), count);
        assert_eq!(board.cached_route_length(p), Some(length));
    }
    assert_eq!(engine.player(1).unwrap().settlements_remaining, 5);
}

// ==================== Whole Games ====================

#[test]
fn test_mixed_seats_play_a_whole_game() {
    let mut engine = standard_engine(3, 21);
    let mut agents: Vec<Box<dyn PlayerAgent>> = vec![
        Box::new(Bot::with_seed(0, BotDifficulty::Medium, 1)),
        Box::new(Bot::with_seed(1, BotDifficulty::Medium, 2)),
        Box::new(Bot::with_seed(2, BotDifficulty::Medium, 3)),
    ];
    let mut events: Vec<GameEvent> = Vec::new();

    let outcome = engine.run(&mut agents, &mut events, 200_000).unwrap();
    let winner = engine.winner().unwrap();
    assert_eq!(outcome, TickOutcome::GameOver { winner });
    assert!(engine.victory_points(winner) >= engine.rules().points_to_win);
    assert!(matches!(events.last(), Some(GameEvent::GameWon { .. })));
    assert_eq!(engine.tick(&mut agents, &mut ()), Err(ProtocolError::GameOver));
}

#[test]
fn test_saved_game_resumes() {
    let mut engine = standard_engine(2, 8);
    let mut agents: Vec<ScriptedAgent> = (0..2).map(|_| ScriptedAgent::with_fallback()).collect();
    engine.run(&mut agents, &mut (), 500).unwrap();

    let json = engine.snapshot().to_json().unwrap();
    let mut resumed = Snapshot::from_json(&json).unwrap().restore().unwrap();
    assert_eq!(resumed.snapshot(), engine.snapshot());

    let mut twins = agents.clone();
    let mut a: Vec<GameEvent> = Vec::new();
    let mut b: Vec<GameEvent> = Vec::new();
    engine.run(&mut agents, &mut a, 500).unwrap();
    resumed.run(&mut twins, &mut b, 500).unwrap();
    assert_eq!(a, b);
}
