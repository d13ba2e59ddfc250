//! Shortest distances over the land and water route graphs.
//!
//! Bots use these to steer roads and ships toward target vertices. Paths
//! that need both graphs change over at a launch vertex (one touching land
//! and water). The engine itself never consults these tables.

use super::{Board, VertexIndex};
use std::collections::VecDeque;

/// All-pairs breadth-first search results for one graph
#[derive(Debug, Clone)]
struct Table {
    dist: Vec<Vec<Option<u32>>>,
    /// First vertex after the source on a shortest path
    next: Vec<Vec<Option<VertexIndex>>>,
}

impl Table {
    fn build(board: &Board, usable: impl Fn(usize) -> bool) -> Self {
        let n = board.vertices().len();
        let mut dist = vec![vec![None; n]; n];
        let mut next = vec![vec![None; n]; n];

        for source in 0..n {
            let dist = &mut dist[source];
            let next = &mut next[source];
            dist[source] = Some(0);
            let mut queue = VecDeque::from([source]);

            while let Some(v) = queue.pop_front() {
                let here = dist[v].unwrap_or(0);
                for &r in board.routes_at(v) {
                    if !usable(r) {
                        continue;
                    }
                    let u = board.route(r).other_end(v);
                    if dist[u].is_some() {
                        continue;
                    }
                    dist[u] = Some(here + 1);
                    next[u] = if v == source { Some(u) } else { next[v] };
                    queue.push_back(u);
                }
            }
        }

        Self { dist, next }
    }
}

/// Land and water distance tables for a board
#[derive(Debug, Clone)]
pub struct DistanceTables {
    land: Table,
    water: Table,
    launch: Vec<VertexIndex>,
}

impl DistanceTables {
    pub fn build(board: &Board) -> Self {
        let land = Table::build(board, |r| {
            let route = board.route(r);
            route.land && !route.closed
        });
        let water = Table::build(board, |r| {
            let route = board.route(r);
            route.water && !route.closed
        });
        let launch = (0..board.vertices().len())
            .filter(|&v| board.vertex(v).land && board.vertex(v).water)
            .collect();
        Self {
            land,
            water,
            launch,
        }
    }

    pub fn land_distance(&self, a: VertexIndex, b: VertexIndex) -> Option<u32> {
        self.land.dist[a][b]
    }

    pub fn water_distance(&self, a: VertexIndex, b: VertexIndex) -> Option<u32> {
        self.water.dist[a][b]
    }

    /// Vertices where a path can switch between land and water
    pub fn launch_vertices(&self) -> &[VertexIndex] {
        &self.launch
    }

    /// Shortest distance using either graph, changing over at most once.
    pub fn distance(&self, a: VertexIndex, b: VertexIndex) -> Option<u32> {
        self.best_path(a, b).map(|(d, _)| d)
    }

    /// First step from `a` on the shortest path to `b`
    pub fn next_hop(&self, a: VertexIndex, b: VertexIndex) -> Option<VertexIndex> {
        self.best_path(a, b).and_then(|(_, hop)| hop)
    }

    fn best_path(&self, a: VertexIndex, b: VertexIndex) -> Option<(u32, Option<VertexIndex>)> {
        let mut best: Option<(u32, Option<VertexIndex>)> = None;
        let mut consider = |d: Option<u32>, hop: Option<VertexIndex>| {
            if let Some(d) = d {
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, hop));
                }
            }
        };

        consider(self.land.dist[a][b], self.land.next[a][b]);
        consider(self.water.dist[a][b], self.water.next[a][b]);

        for &l in &self.launch {
            let via_land = sum(self.land.dist[a][l], self.water.dist[l][b]);
            let hop = if a == l { self.water.next[l][b] } else { self.land.next[a][l] };
            consider(via_land, hop);

            let via_water = sum(self.water.dist[a][l], self.land.dist[l][b]);
            let hop = if a == l { self.land.next[l][b] } else { self.water.next[a][l] };
            consider(via_water, hop);
        }

        best
    }
}

fn sum(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    Some(a? + b?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_neighbours_are_one_step() {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(3));
        let tables = DistanceTables::build(&board);
        for (r, route) in board.routes().iter().enumerate() {
            assert_eq!(tables.distance(route.from, route.to), Some(1), "route {r}");
            assert_eq!(tables.distance(route.from, route.from), Some(0));
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(3));
        let tables = DistanceTables::build(&board);
        for a in (0..board.vertices().len()).step_by(7) {
            for b in (0..board.vertices().len()).step_by(5) {
                assert_eq!(tables.distance(a, b), tables.distance(b, a));
            }
        }
    }

    #[test]
    fn test_next_hop_moves_closer() {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(3));
        let tables = DistanceTables::build(&board);
        let (a, b) = (0, board.vertices().len() - 1);
        let d = tables.distance(a, b).unwrap();
        assert!(d > 1);
        let hop = tables.next_hop(a, b).unwrap();
        assert!(board.vertex(a).neighbors.contains(&hop));
        assert_eq!(tables.distance(hop, b), Some(d - 1));
    }

    #[test]
    fn test_outer_rim_is_water_only() {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(3));
        let tables = DistanceTables::build(&board);
        let rim = (0..board.vertices().len())
            .find(|&v| !board.vertex(v).land)
            .unwrap();
        let inland = (0..board.vertices().len())
            .find(|&v| !board.vertex(v).water)
            .unwrap();
        assert_eq!(tables.land_distance(rim, inland), None);
        assert!(tables.distance(rim, inland).is_some());
        assert!(!tables.launch_vertices().is_empty());
    }
}
