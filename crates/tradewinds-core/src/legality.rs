//! Move legality.
//!
//! Pure functions of board, rules and player state that produce option
//! sets. The engine hands these sets to agents unchanged, so anything they
//! return must be a legal choice; nothing downstream re-checks it.
//!
//! Results are sorted by index, which keeps repeated polling stable.

use crate::actions::MoveKind;
use crate::board::{
    Board, Occupant, PlayerId, Resource, RouteCategory, RouteIndex, RoutePiece, TileIndex,
    TileKind, VertexIndex,
};
use crate::player::{DevelopmentCard, Player};
use crate::rules::Rules;
use std::collections::{BTreeSet, VecDeque};

/// Points a player currently holds, hidden cards included
pub fn victory_points(board: &Board, rules: &Rules, player: &Player) -> u32 {
    let merchant = match board.merchant() {
        Some((_, owner)) if owner == player.id => 1,
        _ => 0,
    };
    board.structure_points(player.id) + player.bonus_victory_points(rules.achievement_points) + merchant
}

// ==================== Settlements ====================

/// Open land vertices with no building next door
fn spaced(board: &Board, vertex: VertexIndex) -> bool {
    let v = board.vertex(vertex);
    v.occupant.is_open()
        && v.land
        && v.neighbors
            .iter()
            .all(|&n| !board.vertex(n).occupant.is_building())
}

/// Opening placements: the spacing rule only
pub fn setup_settlement_spots(board: &Board) -> Vec<VertexIndex> {
    (0..board.vertices().len())
        .filter(|&v| spaced(board, v))
        .collect()
}

/// Spaced vertices touching one of the player's roads or ships
pub fn settlement_spots(board: &Board, player: PlayerId) -> Vec<VertexIndex> {
    (0..board.vertices().len())
        .filter(|&v| {
            spaced(board, v)
                && board
                    .routes_at(v)
                    .iter()
                    .any(|&r| board.route(r).piece.owner() == Some(player))
        })
        .collect()
}

pub fn city_spots(board: &Board, player: PlayerId) -> Vec<VertexIndex> {
    vertices_matching(board, |o| *o == Occupant::Settlement(player))
}

/// Cities that may become metropolises, empty once the board limit is hit
pub fn metropolis_spots(board: &Board, rules: &Rules, player: PlayerId) -> Vec<VertexIndex> {
    let built = board.count_occupants(|o| matches!(o, Occupant::Metropolis(_)));
    if built as u32 >= rules.metropolis_limit {
        return Vec::new();
    }
    vertices_matching(board, |o| *o == Occupant::City(player))
}

fn vertices_matching(board: &Board, pred: impl Fn(&Occupant) -> bool) -> Vec<VertexIndex> {
    (0..board.vertices().len())
        .filter(|&v| pred(&board.vertex(v).occupant))
        .collect()
}

// ==================== Roads and Ships ====================

fn hostile_knight(board: &Board, player: PlayerId, vertex: VertexIndex) -> bool {
    matches!(board.vertex(vertex).occupant.knight_owner(), Some(owner) if owner != player)
}

/// Whether a new route of `category` may grow out of `vertex`
fn extends_from(
    board: &Board,
    player: PlayerId,
    vertex: VertexIndex,
    category: RouteCategory,
    ignore: Option<RouteIndex>,
) -> bool {
    match board.vertex(vertex).occupant.structure_owner() {
        Some(owner) => owner == player,
        None => board.routes_at(vertex).iter().any(|&r| {
            let piece = board.route(r).piece;
            Some(r) != ignore && piece.owner() == Some(player) && piece.category() == Some(category)
        }),
    }
}

/// Whether an open route can take a piece of `category` for `player`.
/// `ignore` treats one of the player's routes as already lifted.
fn route_fits(
    board: &Board,
    player: PlayerId,
    route: RouteIndex,
    category: RouteCategory,
    ignore: Option<RouteIndex>,
) -> bool {
    let r = board.route(route);
    if r.piece != RoutePiece::Open || r.closed || Some(route) == ignore {
        return false;
    }
    let terrain = match category {
        RouteCategory::Road => r.land,
        RouteCategory::Ship => r.water && !r.attacked,
    };
    terrain
        && !hostile_knight(board, player, r.from)
        && !hostile_knight(board, player, r.to)
        && (extends_from(board, player, r.from, category, ignore)
            || extends_from(board, player, r.to, category, ignore))
}

pub fn road_spots(board: &Board, player: PlayerId) -> Vec<RouteIndex> {
    (0..board.routes().len())
        .filter(|&r| route_fits(board, player, r, RouteCategory::Road, None))
        .collect()
}

/// Open water routes for a new ship; `ignore` excludes a ship being moved
pub fn ship_spots(board: &Board, player: PlayerId, ignore: Option<RouteIndex>) -> Vec<RouteIndex> {
    (0..board.routes().len())
        .filter(|&r| route_fits(board, player, r, RouteCategory::Ship, ignore))
        .collect()
}

/// Piece categories a player could put on `route` right now
pub fn route_categories(
    board: &Board,
    rules: &Rules,
    player: &Player,
    route: RouteIndex,
) -> Vec<RouteCategory> {
    let mut categories = Vec::with_capacity(2);
    if player.roads_remaining > 0 && route_fits(board, player.id, route, RouteCategory::Road, None) {
        categories.push(RouteCategory::Road);
    }
    if rules.seafarers
        && player.ships_remaining > 0
        && route_fits(board, player.id, route, RouteCategory::Ship, None)
    {
        categories.push(RouteCategory::Ship);
    }
    categories
}

/// Routes leaving the settlement just placed in the opening
pub fn setup_route_spots(
    board: &Board,
    rules: &Rules,
    player: &Player,
    from: VertexIndex,
) -> Vec<RouteIndex> {
    let mut spots: Vec<RouteIndex> = board
        .routes_at(from)
        .iter()
        .copied()
        .filter(|&r| !route_categories(board, rules, player, r).is_empty())
        .collect();
    spots.sort_unstable();
    spots
}

/// Roads or ships for a road-building card
pub fn free_route_spots(board: &Board, rules: &Rules, player: &Player) -> Vec<RouteIndex> {
    (0..board.routes().len())
        .filter(|&r| !route_categories(board, rules, player, r).is_empty())
        .collect()
}

/// Whether `vertex` is a loose end of the player's shipping line at `route`
fn loose_end(board: &Board, player: PlayerId, vertex: VertexIndex, route: RouteIndex) -> bool {
    board.vertex(vertex).occupant.structure_owner() != Some(player)
        && !board.routes_at(vertex).iter().any(|&r| {
            let piece = board.route(r).piece;
            r != route && piece.is_ship() && piece.owner() == Some(player)
        })
}

/// Where a ship lifted from `from` could go
pub fn ship_destinations(board: &Board, player: PlayerId, from: RouteIndex) -> Vec<RouteIndex> {
    ship_spots(board, player, Some(from))
}

/// Ships at the open end of a line that were not built this turn and are
/// not under pirate attack
pub fn movable_ships(board: &Board, player: PlayerId) -> Vec<RouteIndex> {
    (0..board.routes().len())
        .filter(|&r| {
            let route = board.route(r);
            route.piece.is_ship()
                && route.piece.owner() == Some(player)
                && !route.locked
                && !route.attacked
                && (loose_end(board, player, route.from, r) || loose_end(board, player, route.to, r))
                && !ship_destinations(board, player, r).is_empty()
        })
        .collect()
}

/// Plain ships that can be armed
pub fn warship_candidates(board: &Board, player: PlayerId) -> Vec<RouteIndex> {
    routes_holding(board, RoutePiece::Ship(player))
}

pub fn damaged_roads(board: &Board, player: PlayerId) -> Vec<RouteIndex> {
    routes_holding(board, RoutePiece::DamagedRoad(player))
}

fn routes_holding(board: &Board, piece: RoutePiece) -> Vec<RouteIndex> {
    (0..board.routes().len())
        .filter(|&r| board.route(r).piece == piece)
        .collect()
}

// ==================== Knights ====================

/// Open land vertices on the player's route network
pub fn knight_build_spots(board: &Board, player: PlayerId) -> Vec<VertexIndex> {
    (0..board.vertices().len())
        .filter(|&v| {
            let vertex = board.vertex(v);
            vertex.occupant.is_open()
                && vertex.land
                && vertex
                    .routes
                    .iter()
                    .any(|&r| board.route(r).piece.owner() == Some(player))
        })
        .collect()
}

pub fn inactive_knights(board: &Board, player: PlayerId) -> Vec<VertexIndex> {
    vertices_matching(board, |o| {
        matches!(o, Occupant::Knight { owner, active: false, .. } if *owner == player)
    })
}

pub fn promotable_knights(board: &Board, rules: &Rules, player: PlayerId) -> Vec<VertexIndex> {
    vertices_matching(board, |o| {
        matches!(o, Occupant::Knight { owner, level, .. } if *owner == player && *level < rules.max_knight_level)
    })
}

/// Vertices reachable from `from` along the player's roads. Walking stops
/// at anything but open vertices and the player's own structures.
fn walk_roads(board: &Board, player: PlayerId, from: VertexIndex) -> BTreeSet<VertexIndex> {
    let mut seen = BTreeSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(v) = queue.pop_front() {
        let occupant = board.vertex(v).occupant;
        let passable = occupant.is_open() || occupant.structure_owner() == Some(player);
        if v != from && !passable {
            continue;
        }
        for &r in board.routes_at(v) {
            let piece = board.route(r).piece;
            if piece.owner() != Some(player) || piece.category() != Some(RouteCategory::Road) {
                continue;
            }
            let next = board.route(r).other_end(v);
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen.remove(&from);
    seen
}

/// Where the knight on `from` may move: open vertices on its owner's
/// roads, or vertices held by a weaker hostile knight (which gets pushed
/// away). With `knight_extra_hop` one step off the network onto open land
/// is also allowed.
pub fn knight_destinations(
    board: &Board,
    rules: &Rules,
    player: PlayerId,
    from: VertexIndex,
) -> Vec<VertexIndex> {
    let level = match board.vertex(from).occupant {
        Occupant::Knight { owner, level, .. } if owner == player => level,
        _ => return Vec::new(),
    };
    let reach = walk_roads(board, player, from);
    let mut out: BTreeSet<VertexIndex> = reach
        .iter()
        .copied()
        .filter(|&v| match board.vertex(v).occupant {
            Occupant::Open => true,
            Occupant::Knight { owner, level: other, .. } => owner != player && other < level,
            _ => false,
        })
        .collect();

    if rules.knight_extra_hop {
        let bases: Vec<VertexIndex> = std::iter::once(from)
            .chain(reach.iter().copied().filter(|&v| board.vertex(v).occupant.is_open()))
            .collect();
        for v in bases {
            for &r in board.routes_at(v) {
                let route = board.route(r);
                if !route.land || route.piece != RoutePiece::Open || route.closed {
                    continue;
                }
                let next = route.other_end(v);
                if next != from && board.vertex(next).occupant.is_open() && board.vertex(next).land {
                    out.insert(next);
                }
            }
        }
    }
    out.into_iter().collect()
}

/// Active knights with somewhere to go
pub fn movable_knights(board: &Board, rules: &Rules, player: PlayerId) -> Vec<VertexIndex> {
    vertices_matching(board, |o| {
        matches!(o, Occupant::Knight { owner, active: true, .. } if *owner == player)
    })
    .into_iter()
    .filter(|&v| !knight_destinations(board, rules, player, v).is_empty())
    .collect()
}

/// Retreat spots for `owner`'s knight pushed off `from`
pub fn displacement_spots(board: &Board, owner: PlayerId, from: VertexIndex) -> Vec<VertexIndex> {
    walk_roads(board, owner, from)
        .into_iter()
        .filter(|&v| board.vertex(v).occupant.is_open())
        .collect()
}

/// The player's active knights next to `fortress`
pub fn attackers(board: &Board, player: PlayerId, fortress: VertexIndex) -> Vec<VertexIndex> {
    let mut knights: Vec<VertexIndex> = board
        .vertex(fortress)
        .neighbors
        .iter()
        .copied()
        .filter(|&n| {
            matches!(board.vertex(n).occupant, Occupant::Knight { owner, active: true, .. } if owner == player)
        })
        .collect();
    knights.sort_unstable();
    knights
}

pub fn attack_targets(board: &Board, player: PlayerId) -> Vec<VertexIndex> {
    vertices_matching(board, |o| matches!(o, Occupant::PirateFortress { .. }))
        .into_iter()
        .filter(|&v| !attackers(board, player, v).is_empty())
        .collect()
}

// ==================== Robber, Pirate and Merchant ====================

/// Whether `victim` is shielded from a bandit on `tile`
fn protected(board: &Board, rules: &Rules, players: &[Player], victim: PlayerId, tile: TileIndex) -> bool {
    let low_score = rules.friendly_robber_points > 0
        && players
            .get(victim as usize)
            .map_or(false, |p| victory_points(board, rules, p) <= rules.friendly_robber_points);
    let guarded = rules.cities_and_knights
        && board.corners(tile).iter().any(|&v| {
            matches!(board.vertex(v).occupant, Occupant::Knight { owner, active: true, .. } if owner == victim)
        });
    low_score || guarded
}

/// Drop tiles where every opponent present is protected. If that leaves
/// nothing, the unfiltered list stands.
fn without_protected(
    board: &Board,
    rules: &Rules,
    players: &[Player],
    current: PlayerId,
    tiles: Vec<TileIndex>,
    owners: impl Fn(TileIndex) -> BTreeSet<PlayerId>,
) -> Vec<TileIndex> {
    if rules.friendly_robber_points == 0 && !rules.cities_and_knights {
        return tiles;
    }
    let filtered: Vec<TileIndex> = tiles
        .iter()
        .copied()
        .filter(|&t| {
            let victims: Vec<PlayerId> = owners(t).into_iter().filter(|&p| p != current).collect();
            victims.is_empty() || victims.iter().any(|&p| !protected(board, rules, players, p, t))
        })
        .collect();
    if filtered.is_empty() {
        tiles
    } else {
        filtered
    }
}

pub fn robber_tiles(board: &Board, rules: &Rules, players: &[Player], current: PlayerId) -> Vec<TileIndex> {
    let tiles = (0..board.tiles().len())
        .filter(|&t| board.tile(t).kind.is_land() && board.robber() != Some(t))
        .collect();
    without_protected(board, rules, players, current, tiles, |t| {
        board.structure_owners_around(t)
    })
}

pub fn pirate_tiles(board: &Board, rules: &Rules, players: &[Player], current: PlayerId) -> Vec<TileIndex> {
    let tiles = (0..board.tiles().len())
        .filter(|&t| board.tile(t).kind.is_water() && board.pirate() != Some(t))
        .collect();
    without_protected(board, rules, players, current, tiles, |t| board.ship_owners_around(t))
}

fn with_cards(players: &[Player], current: PlayerId, owners: BTreeSet<PlayerId>) -> Vec<PlayerId> {
    owners
        .into_iter()
        .filter(|&p| {
            p != current
                && players
                    .get(p as usize)
                    .map_or(false, |player| player.resources.total() > 0)
        })
        .collect()
}

/// Opponents with cards and a structure on the robber's tile
pub fn robber_victims(board: &Board, players: &[Player], current: PlayerId, tile: TileIndex) -> Vec<PlayerId> {
    with_cards(players, current, board.structure_owners_around(tile))
}

/// Opponents with cards and a plain ship next to the pirate. Warships are
/// left alone.
pub fn pirate_victims(board: &Board, players: &[Player], current: PlayerId, tile: TileIndex) -> Vec<PlayerId> {
    let owners = board
        .sides_of(tile)
        .into_iter()
        .filter_map(|r| match board.route(r).piece {
            RoutePiece::Ship(p) => Some(p),
            _ => None,
        })
        .collect();
    with_cards(players, current, owners)
}

/// Resource tiles next to one of the player's structures
pub fn merchant_tiles(board: &Board, player: PlayerId) -> Vec<TileIndex> {
    (0..board.tiles().len())
        .filter(|&t| {
            matches!(board.tile(t).kind, TileKind::Resource(_))
                && board.structure_owners_around(t).contains(&player)
        })
        .collect()
}

// ==================== Trade and Cards ====================

/// Cards of `resource` the bank wants for one card back
pub fn bank_rate(board: &Board, rules: &Rules, player: PlayerId, resource: Resource) -> u32 {
    let ports = board.ports_of(player);
    let mut rate = rules.bank_rate;
    if ports.contains(&None) {
        rate = rate.min(3);
    }
    if ports.contains(&Some(resource)) {
        rate = rate.min(2);
    }
    if let Some((tile, owner)) = board.merchant() {
        if owner == player && board.tile(tile).kind.resource() == Some(resource) {
            rate = rate.min(2);
        }
    }
    rate.max(1)
}

/// Resources the player holds enough of to trade away
pub fn bank_offers(board: &Board, rules: &Rules, player: &Player) -> Vec<Resource> {
    Resource::ALL
        .into_iter()
        .filter(|&r| player.resources.get(r) >= bank_rate(board, rules, player.id, r))
        .collect()
}

/// Cards in hand that would have an effect if played now
pub fn playable_cards(board: &Board, rules: &Rules, player: &Player) -> Vec<DevelopmentCard> {
    player
        .playable_cards()
        .into_iter()
        .filter(|card| match card {
            DevelopmentCard::RoadBuilding => !free_route_spots(board, rules, player).is_empty(),
            DevelopmentCard::Merchant => {
                rules.cities_and_knights && !merchant_tiles(board, player.id).is_empty()
            }
            _ => true,
        })
        .collect()
}

// ==================== Turn Menu ====================

/// Entries of the turn menu the player can afford and carry out
pub fn available_moves(board: &Board, rules: &Rules, player: &Player, deck_exhausted: bool) -> Vec<MoveKind> {
    let p = player.id;
    let ck = rules.cities_and_knights;
    let sea = rules.seafarers;

    MoveKind::ALL
        .into_iter()
        .filter(|&kind| {
            if let Some(cost) = kind.cost(rules) {
                if !player.resources.can_afford(cost) {
                    return false;
                }
            }
            match kind {
                MoveKind::EndTurn => true,
                MoveKind::BuildRoad => player.roads_remaining > 0 && !road_spots(board, p).is_empty(),
                MoveKind::BuildShip => {
                    sea && player.ships_remaining > 0 && !ship_spots(board, p, None).is_empty()
                }
                MoveKind::BuildSettlement => {
                    player.settlements_remaining > 0 && !settlement_spots(board, p).is_empty()
                }
                MoveKind::BuildCity => player.cities_remaining > 0 && !city_spots(board, p).is_empty(),
                MoveKind::BuildMetropolis => ck && !metropolis_spots(board, rules, p).is_empty(),
                MoveKind::BuildKnight => {
                    ck && player.knights_remaining > 0 && !knight_build_spots(board, p).is_empty()
                }
                MoveKind::ActivateKnight => ck && !inactive_knights(board, p).is_empty(),
                MoveKind::PromoteKnight => ck && !promotable_knights(board, rules, p).is_empty(),
                MoveKind::MoveKnight => ck && !movable_knights(board, rules, p).is_empty(),
                MoveKind::Attack => ck && !attack_targets(board, p).is_empty(),
                MoveKind::MoveShip => sea && !movable_ships(board, p).is_empty(),
                MoveKind::UpgradeWarship => sea && !warship_candidates(board, p).is_empty(),
                MoveKind::RepairRoad => !damaged_roads(board, p).is_empty(),
                MoveKind::BuyCard => !deck_exhausted,
                MoveKind::PlayCard => !playable_cards(board, rules, player).is_empty(),
                MoveKind::TradeWithBank => !bank_offers(board, rules, player).is_empty(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ResourceHand;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Board {
        Board::standard_with_rng(&mut StdRng::seed_from_u64(11))
    }

    /// A land vertex with three land tiles around it
    fn inland(board: &Board) -> VertexIndex {
        (0..board.vertices().len())
            .find(|&v| {
                let vertex = board.vertex(v);
                vertex.tiles.len() == 3 && vertex.land && !vertex.water
            })
            .unwrap()
    }

    #[test]
    fn test_setup_spots_respect_spacing() {
        let mut board = board();
        let all = setup_settlement_spots(&board);
        let v = inland(&board);
        assert!(all.contains(&v));

        board.set_occupant(v, Occupant::Settlement(0));
        let after = setup_settlement_spots(&board);
        assert!(!after.contains(&v));
        for &n in &board.vertex(v).neighbors {
            assert!(!after.contains(&n));
        }
        assert_eq!(after.len(), all.len() - 1 - board.vertex(v).neighbors.len());
    }

    #[test]
    fn test_settlement_needs_own_route() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        assert!(settlement_spots(&board, 0).is_empty());

        let r1 = board.routes_at(v)[0];
        let mid = board.route(r1).other_end(v);
        board.set_route_piece(r1, RoutePiece::Road(0));
        let r2 = *board
            .routes_at(mid)
            .iter()
            .find(|&&r| r != r1)
            .unwrap();
        let far = board.route(r2).other_end(mid);
        board.set_route_piece(r2, RoutePiece::Road(0));

        let spots = settlement_spots(&board, 0);
        assert!(!spots.contains(&mid));
        assert!(spots.contains(&far) || !spaced(&board, far));
        assert!(settlement_spots(&board, 1).is_empty());
    }

    #[test]
    fn test_road_spots_grow_from_structures_and_roads() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        let mut expected: Vec<RouteIndex> = board.routes_at(v).to_vec();
        expected.sort();
        assert_eq!(road_spots(&board, 0), expected);
        assert!(road_spots(&board, 1).is_empty());
        assert!(ship_spots(&board, 0, None).is_empty());
    }

    #[test]
    fn test_no_roads_into_a_fortress() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        let blocked = board.routes_at(v)[0];
        let fortress = board.route(blocked).other_end(v);
        board.place_fortress(fortress, 2);

        let spots = road_spots(&board, 0);
        assert!(!spots.contains(&blocked));
        assert_eq!(spots.len(), board.routes_at(v).len() - 1);
    }

    #[test]
    fn test_hostile_knight_blocks_roads() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        let r = board.routes_at(v)[0];
        let far = board.route(r).other_end(v);
        board.set_occupant(
            far,
            Occupant::Knight {
                owner: 1,
                level: 1,
                active: false,
            },
        );
        assert!(!road_spots(&board, 0).contains(&r));
    }

    #[test]
    fn test_opposing_structure_stops_extension() {
        let mut board = board();
        let v = inland(&board);
        let r = board.routes_at(v)[0];
        board.set_route_piece(r, RoutePiece::Road(0));
        board.set_occupant(v, Occupant::Settlement(1));
        for &other in board.routes_at(v) {
            if other != r {
                assert!(!road_spots(&board, 0).contains(&other));
            }
        }
    }

    #[test]
    fn test_robber_tiles_skip_current_and_water() {
        let board = board();
        let players = vec![Player::new(0, "A"), Player::new(1, "B")];
        let tiles = robber_tiles(&board, &Rules::default(), &players, 0);
        assert_eq!(tiles.len(), 18);
        assert!(!tiles.contains(&board.robber().unwrap()));
        assert!(tiles.iter().all(|&t| board.tile(t).kind.is_land()));
    }

    #[test]
    fn test_friendly_robber_filters_low_scores() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(1));
        let players = vec![Player::new(0, "A"), Player::new(1, "B")];
        let rules = Rules {
            friendly_robber_points: 2,
            ..Rules::default()
        };
        let tiles = robber_tiles(&board, &rules, &players, 0);
        for &t in &board.vertex(v).tiles {
            assert!(!tiles.contains(&t), "tile {t} shields a one-point player");
        }
    }

    #[test]
    fn test_victims_need_cards() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(1));
        let tile = board.vertex(v).tiles[0];
        let mut players = vec![Player::new(0, "A"), Player::new(1, "B")];
        assert!(robber_victims(&board, &players, 0, tile).is_empty());

        players[1].resources.add(Resource::Wool, 1);
        assert_eq!(robber_victims(&board, &players, 0, tile), vec![1]);
        assert!(robber_victims(&board, &players, 1, tile).is_empty());
    }

    #[test]
    fn test_bank_rate_uses_ports() {
        let mut board = board();
        let generic = (0..board.tiles().len())
            .find(|&t| board.tile(t).kind == TileKind::Port(None))
            .unwrap();
        let rules = Rules::default();
        assert_eq!(bank_rate(&board, &rules, 0, Resource::Ore), 4);

        let corner = *board
            .corners(generic)
            .iter()
            .find(|&&v| board.vertex(v).land)
            .unwrap();
        board.set_occupant(corner, Occupant::Settlement(0));
        assert_eq!(bank_rate(&board, &rules, 0, Resource::Ore), 3);
        assert_eq!(bank_rate(&board, &rules, 1, Resource::Ore), 4);
    }

    #[test]
    fn test_bank_offers() {
        let board = board();
        let mut player = Player::new(0, "A");
        player.resources = ResourceHand::with_amounts(4, 3, 0, 0, 5);
        assert_eq!(
            bank_offers(&board, &Rules::default(), &player),
            vec![Resource::Brick, Resource::Wool]
        );
    }

    #[test]
    fn test_knight_walk_follows_own_roads() {
        let mut board = board();
        let v = inland(&board);
        let r = board.routes_at(v)[0];
        let far = board.route(r).other_end(v);
        board.set_route_piece(r, RoutePiece::Road(0));
        board.set_occupant(
            v,
            Occupant::Knight {
                owner: 0,
                level: 2,
                active: true,
            },
        );
        let rules = Rules::default();
        assert_eq!(knight_destinations(&board, &rules, 0, v), vec![far]);

        board.set_occupant(
            far,
            Occupant::Knight {
                owner: 1,
                level: 1,
                active: false,
            },
        );
        assert_eq!(knight_destinations(&board, &rules, 0, v), vec![far]);
        assert!(displacement_spots(&board, 1, far).is_empty());

        board.set_occupant(
            far,
            Occupant::Knight {
                owner: 1,
                level: 2,
                active: false,
            },
        );
        assert!(knight_destinations(&board, &rules, 0, v).is_empty());
    }

    #[test]
    fn test_extra_hop_leaves_network() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(
            v,
            Occupant::Knight {
                owner: 0,
                level: 1,
                active: true,
            },
        );
        let rules = Rules {
            knight_extra_hop: true,
            ..Rules::default()
        };
        let mut expected = board.vertex(v).neighbors.clone();
        expected.sort();
        assert_eq!(knight_destinations(&board, &rules, 0, v), expected);
        assert!(knight_destinations(&board, &Rules::default(), 0, v).is_empty());
    }

    #[test]
    fn test_attack_targets_need_active_knight() {
        let mut board = board();
        let v = inland(&board);
        let n = board.vertex(v).neighbors[0];
        board.place_fortress(v, 2);
        board.set_occupant(
            n,
            Occupant::Knight {
                owner: 0,
                level: 1,
                active: false,
            },
        );
        assert!(attack_targets(&board, 0).is_empty());

        board.set_occupant(
            n,
            Occupant::Knight {
                owner: 0,
                level: 1,
                active: true,
            },
        );
        assert_eq!(attack_targets(&board, 0), vec![v]);
        assert_eq!(attackers(&board, 0, v), vec![n]);
    }

    #[test]
    fn test_menu_without_resources() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        let player = Player::new(0, "A");
        assert_eq!(
            available_moves(&board, &Rules::default(), &player, false),
            vec![MoveKind::EndTurn]
        );
    }

    #[test]
    fn test_menu_offers_affordable_builds() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::Settlement(0));
        let mut player = Player::new(0, "A");
        player.resources = ResourceHand::with_amounts(1, 1, 3, 2, 0);
        let moves = available_moves(&board, &Rules::default(), &player, false);
        assert_eq!(
            moves,
            vec![MoveKind::EndTurn, MoveKind::BuildRoad, MoveKind::BuildCity]
        );
    }

    #[test]
    fn test_victory_points_include_merchant() {
        let mut board = board();
        let v = inland(&board);
        board.set_occupant(v, Occupant::City(0));
        let player = Player::new(0, "A");
        let rules = Rules::default();
        assert_eq!(victory_points(&board, &rules, &player), 2);
        board.place_merchant(board.vertex(v).tiles[0], 0);
        assert_eq!(victory_points(&board, &rules, &player), 3);
    }
}
