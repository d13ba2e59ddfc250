//! Board generation.
//!
//! Cells are flooded outward from a start cell. Each new cell reuses the
//! corner vertices of already placed neighbours (matched by position) so the
//! result is one connected planar graph. Every cell starts as water; layouts
//! then assign kinds and numbers, mark unused cells as placeholders and call
//! [`Board::finalize`].

use super::{Board, HiddenTile, Resource, Tile, TileIndex, TileKind, Vertex, VertexIndex};
use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Number tokens for the 18 producing tiles of the standard layout
const STANDARD_NUMBERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Number tokens for the face-up producing tiles of the archipelago
const ARCHIPELAGO_NUMBERS: [u8; 12] = [3, 4, 5, 6, 8, 9, 10, 11, 4, 5, 9, 10];

/// Strength of the archipelago's pirate fortress
const FORTRESS_STRENGTH: u8 = 3;

impl Board {
    /// Hexagon of cells within `radius` steps of the origin
    pub fn generate_hex(radius: u32) -> Self {
        let origin = HexCoord::default();
        Self::flood(origin, |c| origin.distance_to(&c) <= radius)
    }

    /// `cols` x `rows` block of cells in odd-row offset layout
    pub fn generate_rect(cols: u32, rows: u32) -> Self {
        Self::flood(HexCoord::from_offset(0, 0), |c| {
            let (col, row) = c.to_offset();
            (0..cols as i32).contains(&col) && (0..rows as i32).contains(&row)
        })
    }

    fn flood(start: HexCoord, inside: impl Fn(HexCoord) -> bool) -> Self {
        let mut board = Self::empty();
        let mut placed: HashMap<HexCoord, TileIndex> = HashMap::new();
        let mut pending = vec![start];

        while let Some(coord) = pending.pop() {
            if placed.contains_key(&coord) || !inside(coord) {
                continue;
            }
            let tile = board.add_cell(coord, &placed);
            placed.insert(coord, tile);
            pending.extend(coord.neighbors().into_iter().rev());
        }

        board
    }

    fn add_cell(&mut self, coord: HexCoord, placed: &HashMap<HexCoord, TileIndex>) -> TileIndex {
        let neighbours: Vec<TileIndex> = coord
            .neighbors()
            .iter()
            .filter_map(|n| placed.get(n).copied())
            .collect();

        let mut corners = [0; 6];
        for (slot, point) in corners.iter_mut().zip(coord.corners()) {
            let shared = neighbours
                .iter()
                .flat_map(|&t| self.tiles[t].corners)
                .find(|&v| self.vertices[v].point.close_to(&point));
            *slot = match shared {
                Some(v) => v,
                None => {
                    self.vertices.push(Vertex::at(point));
                    self.vertices.len() - 1
                }
            };
        }

        for i in 0..6 {
            self.link(corners[i], corners[(i + 1) % 6]);
        }

        self.tiles.push(Tile {
            coord,
            kind: TileKind::Water,
            number: None,
            island: None,
            patrol_next: None,
            corners,
        });
        self.tiles.len() - 1
    }

    /// Record symmetric adjacency between two corners
    pub(super) fn link(&mut self, a: VertexIndex, b: VertexIndex) {
        if !self.vertices[a].neighbors.contains(&b) {
            self.vertices[a].neighbors.push(b);
            self.vertices[b].neighbors.push(a);
        }
    }

    fn coord_index(&self) -> HashMap<HexCoord, TileIndex> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.coord, i))
            .collect()
    }

    // ==================== Stock Layouts ====================

    /// Standard layout with randomized tiles, numbers and harbors
    pub fn standard() -> Self {
        let mut rng = rand::thread_rng();
        Self::standard_with_rng(&mut rng)
    }

    /// Standard layout: 19 land tiles inside a water frame carrying 9 harbors.
    pub fn standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut board = Self::generate_hex(3);
        let index = board.coord_index();
        let origin = HexCoord::default();

        let land: Vec<HexCoord> = (0..=2).flat_map(|r| origin.ring(r)).collect();

        // 4 lumber, 4 grain, 4 wool, 3 ore, 3 brick, 1 desert
        let mut kinds: Vec<TileKind> = [
            (Resource::Lumber, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
            (Resource::Ore, 3),
            (Resource::Brick, 3),
        ]
        .iter()
        .flat_map(|&(r, n)| std::iter::repeat(TileKind::Resource(r)).take(n))
        .chain(std::iter::once(TileKind::Desert))
        .collect();
        kinds.shuffle(rng);

        let producing: Vec<HexCoord> = land
            .iter()
            .zip(&kinds)
            .filter(|(_, k)| k.produces())
            .map(|(c, _)| *c)
            .collect();
        let numbers = assign_numbers_avoiding_adjacent_68(&producing, &STANDARD_NUMBERS, rng);

        for (coord, kind) in land.iter().zip(kinds) {
            board.tiles[index[coord]].kind = kind;
        }
        for (coord, number) in producing.iter().zip(numbers) {
            board.tiles[index[coord]].number = Some(number);
        }

        // 4 generic and 5 specific harbors on every other frame tile
        let mut ports: Vec<TileKind> = std::iter::repeat(TileKind::Port(None))
            .take(4)
            .chain(Resource::ALL.iter().map(|&r| TileKind::Port(Some(r))))
            .collect();
        ports.shuffle(rng);
        for (coord, port) in origin.ring(3).into_iter().step_by(2).zip(ports) {
            board.tiles[index[&coord]].kind = port;
        }

        board
            .finalize()
            .expect("standard layout is internally consistent");
        if let Some(desert) = (0..board.tiles.len()).find(|&t| board.tiles[t].kind == TileKind::Desert)
        {
            board.place_robber(desert);
        }
        board.discover_islands();
        board.save_baseline();
        board
    }

    /// Seafaring layout: a home island ringed by a pirate patrol lane, with
    /// outer islands and face-down tiles beyond it.
    ///
    /// - rings 0-1: home island
    /// - ring 2: open water with two generic harbors; the pirate patrols it
    /// - ring 3: three two-tile islands (one gold, one fortified, one with
    ///   the desert), three undiscovered pairs, water between
    /// - ring 4: water frame
    pub fn archipelago_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut board = Self::generate_hex(4);
        let index = board.coord_index();
        let origin = HexCoord::default();

        let home: Vec<HexCoord> = (0..=1).flat_map(|r| origin.ring(r)).collect();
        let lane = origin.ring(2);
        let outer = origin.ring(3);

        let mut home_kinds = vec![
            TileKind::Resource(Resource::Brick),
            TileKind::Resource(Resource::Lumber),
            TileKind::Resource(Resource::Ore),
            TileKind::Resource(Resource::Grain),
            TileKind::Resource(Resource::Wool),
            TileKind::Resource(Resource::Lumber),
            TileKind::Resource(Resource::Grain),
        ];
        home_kinds.shuffle(rng);

        let mut land: Vec<(HexCoord, TileKind)> = home.into_iter().zip(home_kinds).collect();
        land.extend([
            (outer[0], TileKind::Resource(Resource::Brick)),
            (outer[1], TileKind::Gold),
            (outer[6], TileKind::Resource(Resource::Ore)),
            (outer[7], TileKind::Resource(Resource::Lumber)),
            (outer[12], TileKind::Desert),
            (outer[13], TileKind::Resource(Resource::Wool)),
        ]);

        let producing: Vec<HexCoord> = land
            .iter()
            .filter(|(_, k)| k.produces())
            .map(|(c, _)| *c)
            .collect();
        let numbers = assign_numbers_avoiding_adjacent_68(&producing, &ARCHIPELAGO_NUMBERS, rng);

        for &(coord, kind) in &land {
            board.tiles[index[&coord]].kind = kind;
        }
        for (coord, number) in producing.iter().zip(numbers) {
            board.tiles[index[coord]].number = Some(number);
        }
        for i in [3, 4, 9, 10, 15, 16] {
            board.tiles[index[&outer[i]]].kind = TileKind::Undiscovered;
        }
        board.tiles[index[&lane[1]]].kind = TileKind::Port(None);
        board.tiles[index[&lane[7]]].kind = TileKind::Port(None);

        let mut hidden = vec![
            HiddenTile { kind: TileKind::Resource(Resource::Grain), number: Some(5) },
            HiddenTile { kind: TileKind::Resource(Resource::Ore), number: Some(9) },
            HiddenTile { kind: TileKind::Resource(Resource::Brick), number: Some(10) },
            HiddenTile { kind: TileKind::Gold, number: Some(4) },
            HiddenTile { kind: TileKind::Water, number: None },
            HiddenTile { kind: TileKind::Water, number: None },
        ];
        hidden.shuffle(rng);

        board
            .finalize()
            .expect("archipelago layout is internally consistent");
        board.set_exploration(hidden);

        let fortified = (index[&outer[6]], index[&outer[7]]);
        let shared = board.tiles[fortified.0]
            .corners
            .into_iter()
            .find(|v| board.tiles[fortified.1].corners.contains(v));
        if let Some(vertex) = shared {
            board.place_fortress(vertex, FORTRESS_STRENGTH);
        }

        board.place_robber(index[&outer[12]]);
        let patrol: Vec<TileIndex> = lane.iter().map(|c| index[c]).collect();
        board.set_patrol(&patrol);
        board.place_pirate(patrol[6]);
        board.discover_islands();
        board.save_baseline();
        board
    }
}

/// Deal `numbers` onto `coords` so that no 6 or 8 touches another 6 or 8,
/// falling back to a plain shuffle if no such deal turns up.
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    coords: &[HexCoord],
    numbers: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    const MAX_ATTEMPTS: usize = 100;

    for _ in 0..MAX_ATTEMPTS {
        let mut shuffled = numbers.to_vec();
        shuffled.shuffle(rng);
        if is_valid_number_placement(coords, &shuffled) {
            return shuffled;
        }
    }

    let mut shuffled = numbers.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

fn is_valid_number_placement(coords: &[HexCoord], numbers: &[u8]) -> bool {
    let hot: Vec<HexCoord> = coords
        .iter()
        .zip(numbers)
        .filter(|(_, n)| matches!(**n, 6 | 8))
        .map(|(c, _)| *c)
        .collect();
    hot.iter()
        .all(|a| hot.iter().all(|b| a == b || a.distance_to(b) > 1))
}
