//! Board graph: tiles, vertices, routes and islands.
//!
//! This module contains:
//! - Resource and tile types
//! - Vertex occupants (structures, knights, fortresses) and route pieces
//! - The `Board` container with its topology queries and mutation primitives
//!
//! Topology algorithms live in submodules:
//! - `generate`: hex/rect flood generation and the stock layouts
//! - `routes`: finalization, route derivation and lookup
//! - `longest`: per-player longest-route search with cache
//! - `islands`: island flood fill, merging and discovery bits
//! - `distance`: land/water shortest-distance tables

mod distance;
mod generate;
mod islands;
mod longest;
mod routes;

pub use distance::DistanceTables;

use crate::hex::{HexCoord, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Player identifier (0-based seat number)
pub type PlayerId = u8;
/// Index into [`Board::tiles`]
pub type TileIndex = usize;
/// Index into [`Board::vertices`]
pub type VertexIndex = usize;
/// Index into [`Board::routes`]
pub type RouteIndex = usize;
/// 1-based island number; `None` on a tile means "not part of an island"
pub type IslandId = u16;

/// Upper bound on seats; sizes the per-player caches and discovery bitsets.
pub const MAX_PLAYERS: usize = 8;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Brick => "brick",
            Resource::Lumber => "lumber",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        }
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Open sea
    Water,
    /// Sea with a harbor; `None` is a 3:1 generic port, `Some` a 2:1 port
    Port(Option<Resource>),
    /// Land without production
    Desert,
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Produces one resource of the owner's choice
    Gold,
    /// Hidden until explored
    Undiscovered,
    /// Generator scaffolding, removed by [`Board::finalize`]
    Placeholder,
}

impl TileKind {
    /// Land tiles take settlements and roads
    pub fn is_land(&self) -> bool {
        matches!(self, TileKind::Resource(_) | TileKind::Desert | TileKind::Gold)
    }

    /// Water tiles take ships and the pirate
    pub fn is_water(&self) -> bool {
        matches!(self, TileKind::Water | TileKind::Port(_))
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Resource(r) => Some(*r),
            _ => None,
        }
    }

    /// Whether a matching roll yields anything here
    pub fn produces(&self) -> bool {
        matches!(self, TileKind::Resource(_) | TileKind::Gold)
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    pub kind: TileKind,
    /// Dice number that triggers production (2-12)
    pub number: Option<u8>,
    pub island: Option<IslandId>,
    /// Next tile on the pirate patrol
    pub patrol_next: Option<TileIndex>,
    /// Corner vertices in [`HexCoord::corners`] order
    pub corners: [VertexIndex; 6],
}

impl Tile {
    /// The six sides as corner pairs
    pub fn sides(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex)> + '_ {
        (0..6).map(move |i| (self.corners[i], self.corners[(i + 1) % 6]))
    }
}

/// What sits on a vertex. Owner and type always change together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Occupant {
    #[default]
    Open,
    Settlement(PlayerId),
    City(PlayerId),
    Metropolis(PlayerId),
    Knight {
        owner: PlayerId,
        level: u8,
        active: bool,
    },
    /// Neutral stronghold that knights can attack
    PirateFortress { strength: u8 },
}

impl Occupant {
    /// Owner of a structure or knight
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Occupant::Settlement(p) | Occupant::City(p) | Occupant::Metropolis(p) => Some(*p),
            Occupant::Knight { owner, .. } => Some(*owner),
            Occupant::Open | Occupant::PirateFortress { .. } => None,
        }
    }

    /// Owner when the occupant is a settlement, city or metropolis
    pub fn structure_owner(&self) -> Option<PlayerId> {
        match self {
            Occupant::Settlement(p) | Occupant::City(p) | Occupant::Metropolis(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Occupant::Open)
    }

    /// Settlements, cities, metropolises and fortresses all count for spacing
    pub fn is_building(&self) -> bool {
        self.structure_owner().is_some() || matches!(self, Occupant::PirateFortress { .. })
    }

    pub fn knight_owner(&self) -> Option<PlayerId> {
        match self {
            Occupant::Knight { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    /// Victory points this occupant is worth to its owner
    pub fn victory_points(&self) -> u32 {
        match self {
            Occupant::Settlement(_) => 1,
            Occupant::City(_) => 2,
            Occupant::Metropolis(_) => 4,
            _ => 0,
        }
    }

    /// Resources received per producing neighbour tile
    pub fn production(&self) -> u32 {
        match self {
            Occupant::Settlement(_) => 1,
            Occupant::City(_) | Occupant::Metropolis(_) => 2,
            _ => 0,
        }
    }
}

/// A corner shared by up to three tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Point,
    pub occupant: Occupant,
    pub neighbors: Vec<VertexIndex>,
    pub tiles: Vec<TileIndex>,
    pub routes: Vec<RouteIndex>,
    /// Touches at least one land tile
    pub land: bool,
    /// Touches at least one water tile
    pub water: bool,
}

impl Vertex {
    fn at(point: Point) -> Self {
        Self {
            point,
            occupant: Occupant::Open,
            neighbors: Vec::with_capacity(3),
            tiles: Vec::with_capacity(3),
            routes: Vec::with_capacity(3),
            land: false,
            water: false,
        }
    }
}

/// Road-like or ship-like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteCategory {
    Road,
    Ship,
}

/// What sits on a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoutePiece {
    #[default]
    Open,
    Road(PlayerId),
    Ship(PlayerId),
    /// Upgraded ship, immune to pirate theft
    Warship(PlayerId),
    /// Road hit by a pirate raid; does not count for length until repaired
    DamagedRoad(PlayerId),
}

impl RoutePiece {
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            RoutePiece::Open => None,
            RoutePiece::Road(p)
            | RoutePiece::Ship(p)
            | RoutePiece::Warship(p)
            | RoutePiece::DamagedRoad(p) => Some(*p),
        }
    }

    pub fn category(&self) -> Option<RouteCategory> {
        match self {
            RoutePiece::Open => None,
            RoutePiece::Road(_) | RoutePiece::DamagedRoad(_) => Some(RouteCategory::Road),
            RoutePiece::Ship(_) | RoutePiece::Warship(_) => Some(RouteCategory::Ship),
        }
    }

    /// Whether this piece extends its owner's longest route
    pub fn counts_for_length(&self) -> bool {
        matches!(
            self,
            RoutePiece::Road(_) | RoutePiece::Ship(_) | RoutePiece::Warship(_)
        )
    }

    pub fn is_ship(&self) -> bool {
        self.category() == Some(RouteCategory::Ship)
    }
}

/// An edge between two vertices; `from < to` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: VertexIndex,
    pub to: VertexIndex,
    pub piece: RoutePiece,
    /// Bordering tiles (one on the board edge, otherwise two)
    pub tiles: [Option<TileIndex>; 2],
    pub land: bool,
    pub water: bool,
    /// Borders the pirate's tile
    pub attacked: bool,
    /// Ship built this turn; may not move until the turn ends
    pub locked: bool,
    /// Touches a pirate fortress; unusable until it falls
    pub closed: bool,
}

impl Route {
    fn between(a: VertexIndex, b: VertexIndex) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
            piece: RoutePiece::Open,
            tiles: [None, None],
            land: false,
            water: false,
            attacked: false,
            locked: false,
            closed: false,
        }
    }

    /// Canonical sort key
    pub fn key(&self) -> (VertexIndex, VertexIndex) {
        (self.from, self.to)
    }

    /// The endpoint opposite `vertex`
    pub fn other_end(&self, vertex: VertexIndex) -> VertexIndex {
        if vertex == self.from {
            self.to
        } else {
            self.from
        }
    }

    pub fn touches_tile(&self, tile: TileIndex) -> bool {
        self.tiles.contains(&Some(tile))
    }

    pub fn bordering_tiles(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.tiles.iter().flatten().copied()
    }
}

/// A connected land mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub id: IslandId,
    pub tiles: BTreeSet<TileIndex>,
    /// Routes with land on one side and water on the other
    pub shoreline: BTreeSet<RouteIndex>,
    /// Bit `p` set once player `p` has settled here
    pub discovered: u32,
}

impl Island {
    pub fn is_discovered_by(&self, player: PlayerId) -> bool {
        self.discovered & (1u32 << player) != 0
    }
}

/// A face-down tile waiting in the exploration stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HiddenTile {
    pub kind: TileKind,
    pub number: Option<u8>,
}

/// Per-game state restored by [`Board::reset`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Baseline {
    robber: Option<TileIndex>,
    pirate: Option<TileIndex>,
    occupants: Vec<(VertexIndex, Occupant)>,
    hidden: Vec<TileIndex>,
    exploration: Vec<HiddenTile>,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
    vertices: Vec<Vertex>,
    routes: Vec<Route>,
    islands: Vec<Island>,
    robber: Option<TileIndex>,
    pirate: Option<TileIndex>,
    merchant: Option<(TileIndex, PlayerId)>,
    /// `None` means dirty
    route_lengths: [Option<u32>; MAX_PLAYERS],
    /// Hostile knights and fortresses also break routes
    road_block: bool,
    /// Drawn from the back
    exploration: Vec<HiddenTile>,
    finalized: bool,
    baseline: Baseline,
}

impl Board {
    fn empty() -> Self {
        Self {
            tiles: Vec::new(),
            vertices: Vec::new(),
            routes: Vec::new(),
            islands: Vec::new(),
            robber: None,
            pirate: None,
            merchant: None,
            route_lengths: [None; MAX_PLAYERS],
            road_block: false,
            exploration: Vec::new(),
            finalized: false,
            baseline: Baseline::default(),
        }
    }

    // ==================== Query Methods ====================

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn tile(&self, tile: TileIndex) -> &Tile {
        &self.tiles[tile]
    }

    pub fn vertex(&self, vertex: VertexIndex) -> &Vertex {
        &self.vertices[vertex]
    }

    pub fn route(&self, route: RouteIndex) -> &Route {
        &self.routes[route]
    }

    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get((id as usize).checked_sub(1)?)
    }

    /// Tile at a hex coordinate
    pub fn tile_at(&self, coord: HexCoord) -> Option<TileIndex> {
        self.tiles.iter().position(|t| t.coord == coord)
    }

    /// Corner vertices of a tile
    pub fn corners(&self, tile: TileIndex) -> [VertexIndex; 6] {
        self.tiles[tile].corners
    }

    /// Routes incident to a vertex
    pub fn routes_at(&self, vertex: VertexIndex) -> &[RouteIndex] {
        &self.vertices[vertex].routes
    }

    /// Tiles bordering a route
    pub fn tiles_of_route(&self, route: RouteIndex) -> impl Iterator<Item = TileIndex> + '_ {
        self.routes[route].bordering_tiles()
    }

    /// The six sides of a tile as route indices
    pub fn sides_of(&self, tile: TileIndex) -> Vec<RouteIndex> {
        self.tiles[tile]
            .sides()
            .filter_map(|(a, b)| self.route_between(a, b))
            .collect()
    }

    pub fn robber(&self) -> Option<TileIndex> {
        self.robber
    }

    pub fn pirate(&self) -> Option<TileIndex> {
        self.pirate
    }

    pub fn merchant(&self) -> Option<(TileIndex, PlayerId)> {
        self.merchant
    }

    pub fn road_block(&self) -> bool {
        self.road_block
    }

    pub fn exploration_remaining(&self) -> usize {
        self.exploration.len()
    }

    /// Owners of settlements, cities and metropolises around a tile
    pub fn structure_owners_around(&self, tile: TileIndex) -> BTreeSet<PlayerId> {
        self.tiles[tile]
            .corners
            .iter()
            .filter_map(|&v| self.vertices[v].occupant.structure_owner())
            .collect()
    }

    /// Owners of ships along a tile's sides
    pub fn ship_owners_around(&self, tile: TileIndex) -> BTreeSet<PlayerId> {
        self.sides_of(tile)
            .into_iter()
            .filter_map(|r| {
                let piece = self.routes[r].piece;
                if piece.is_ship() {
                    piece.owner()
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of vertices holding an occupant of the given shape for a player
    pub fn count_occupants(&self, pred: impl Fn(&Occupant) -> bool) -> usize {
        self.vertices.iter().filter(|v| pred(&v.occupant)).count()
    }

    /// Victory points from structures on the board
    pub fn structure_points(&self, player: PlayerId) -> u32 {
        self.vertices
            .iter()
            .filter(|v| v.occupant.structure_owner() == Some(player))
            .map(|v| v.occupant.victory_points())
            .sum()
    }

    /// Harbors reachable from a player's structures
    pub fn ports_of(&self, player: PlayerId) -> BTreeSet<Option<Resource>> {
        let mut ports = BTreeSet::new();
        for vertex in &self.vertices {
            if vertex.occupant.structure_owner() != Some(player) {
                continue;
            }
            for &t in &vertex.tiles {
                if let TileKind::Port(port) = self.tiles[t].kind {
                    ports.insert(port);
                }
            }
        }
        ports
    }

    /// Tiles producing on a roll, skipping the robber's tile
    pub fn producing_tiles(&self, roll: u8) -> Vec<TileIndex> {
        (0..self.tiles.len())
            .filter(|&t| {
                let tile = &self.tiles[t];
                tile.number == Some(roll) && tile.kind.produces() && self.robber != Some(t)
            })
            .collect()
    }

    // ==================== Mutation Methods ====================

    /// Replace a vertex occupant. Owners of the routes touching it lose
    /// their cached lengths, since the vertex may now break or join them.
    pub fn set_occupant(&mut self, vertex: VertexIndex, occupant: Occupant) {
        let old = std::mem::replace(&mut self.vertices[vertex].occupant, occupant);
        if old == occupant {
            return;
        }
        for i in 0..self.vertices[vertex].routes.len() {
            let route = self.vertices[vertex].routes[i];
            if let Some(owner) = self.routes[route].piece.owner() {
                self.invalidate_route_length(owner);
            }
        }
    }

    /// Replace a route piece, dirtying the cache for the old and new owner.
    pub fn set_route_piece(&mut self, route: RouteIndex, piece: RoutePiece) {
        let old = std::mem::replace(&mut self.routes[route].piece, piece);
        if let Some(owner) = old.owner() {
            self.invalidate_route_length(owner);
        }
        if let Some(owner) = piece.owner() {
            self.invalidate_route_length(owner);
        }
    }

    pub fn set_route_locked(&mut self, route: RouteIndex, locked: bool) {
        self.routes[route].locked = locked;
    }

    /// Unlock every ship a player built this turn
    pub fn unlock_routes(&mut self, player: PlayerId) {
        for route in &mut self.routes {
            if route.piece.owner() == Some(player) {
                route.locked = false;
            }
        }
    }

    /// Open or close every route touching a vertex
    pub fn set_routes_closed(&mut self, vertex: VertexIndex, closed: bool) {
        for &r in &self.vertices[vertex].routes {
            self.routes[r].closed = closed;
        }
    }

    pub fn set_tile_kind(&mut self, tile: TileIndex, kind: TileKind) {
        self.tiles[tile].kind = kind;
        if self.finalized {
            self.refresh_adjacency_flags();
        }
    }

    pub fn set_number(&mut self, tile: TileIndex, number: Option<u8>) {
        self.tiles[tile].number = number;
    }

    pub fn place_robber(&mut self, tile: TileIndex) {
        debug!(tile, "robber placed");
        self.robber = Some(tile);
    }

    /// Move the pirate and recompute which routes it attacks
    pub fn place_pirate(&mut self, tile: TileIndex) {
        debug!(tile, "pirate placed");
        self.pirate = Some(tile);
        for route in &mut self.routes {
            route.attacked = route.touches_tile(tile);
        }
    }

    pub fn place_merchant(&mut self, tile: TileIndex, owner: PlayerId) {
        self.merchant = Some((tile, owner));
    }

    /// Put a pirate fortress on a vertex. Its routes stay closed until it
    /// is captured.
    pub fn place_fortress(&mut self, vertex: VertexIndex, strength: u8) {
        self.set_occupant(vertex, Occupant::PirateFortress { strength });
        self.set_routes_closed(vertex, true);
    }

    /// Link tiles into a closed patrol loop, replacing any previous patrol
    pub fn set_patrol(&mut self, tiles: &[TileIndex]) {
        for tile in &mut self.tiles {
            tile.patrol_next = None;
        }
        for (i, &t) in tiles.iter().enumerate() {
            self.tiles[t].patrol_next = Some(tiles[(i + 1) % tiles.len()]);
        }
    }

    /// Step the pirate to the next tile on its patrol
    pub fn advance_pirate(&mut self) -> Option<TileIndex> {
        let next = self.tiles[self.pirate?].patrol_next?;
        self.place_pirate(next);
        Some(next)
    }

    /// Toggle the road-block variant; every cached length becomes dirty
    pub fn set_road_block(&mut self, enabled: bool) {
        if self.road_block != enabled {
            self.road_block = enabled;
            self.route_lengths = [None; MAX_PLAYERS];
        }
    }

    /// Replace the exploration stack (drawn from the back)
    pub fn set_exploration(&mut self, stack: Vec<HiddenTile>) {
        self.exploration = stack;
    }

    /// Turn an undiscovered tile face up. Returns the revealed kind.
    ///
    /// Revealed land joins (or merges) islands; an empty stack yields water.
    pub fn reveal_tile(&mut self, tile: TileIndex) -> Option<TileKind> {
        if self.tiles[tile].kind != TileKind::Undiscovered {
            return None;
        }
        let hidden = self.exploration.pop().unwrap_or(HiddenTile {
            kind: TileKind::Water,
            number: None,
        });
        self.tiles[tile].kind = hidden.kind;
        self.tiles[tile].number = hidden.number;
        self.refresh_adjacency_flags();
        if hidden.kind.is_land() {
            self.discover_island_at(tile);
        }
        self.rebuild_shorelines();
        debug!(tile, kind = ?hidden.kind, "tile revealed");
        Some(hidden.kind)
    }

    /// Record the current markers, fortresses and hidden tiles as the
    /// state [`Board::reset`] returns to.
    pub fn save_baseline(&mut self) {
        self.baseline = Baseline {
            robber: self.robber,
            pirate: self.pirate,
            occupants: self
                .vertices
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.occupant.is_open())
                .map(|(i, v)| (i, v.occupant))
                .collect(),
            hidden: (0..self.tiles.len())
                .filter(|&t| self.tiles[t].kind == TileKind::Undiscovered)
                .collect(),
            exploration: self.exploration.clone(),
        };
    }

    /// Clear every per-game field while keeping topology.
    pub fn reset(&mut self) {
        for vertex in &mut self.vertices {
            vertex.occupant = Occupant::Open;
        }
        for route in &mut self.routes {
            route.piece = RoutePiece::Open;
            route.locked = false;
            route.attacked = false;
            route.closed = false;
        }
        for i in 0..self.baseline.occupants.len() {
            let (v, occupant) = self.baseline.occupants[i];
            self.vertices[v].occupant = occupant;
            if let Occupant::PirateFortress { .. } = occupant {
                self.set_routes_closed(v, true);
            }
        }
        for &t in &self.baseline.hidden {
            self.tiles[t].kind = TileKind::Undiscovered;
            self.tiles[t].number = None;
        }
        self.exploration = self.baseline.exploration.clone();
        self.robber = self.baseline.robber;
        self.pirate = None;
        if let Some(pirate) = self.baseline.pirate {
            self.place_pirate(pirate);
        }
        self.merchant = None;
        self.route_lengths = [None; MAX_PLAYERS];
        if self.finalized {
            self.refresh_adjacency_flags();
            self.rebuild_islands();
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
