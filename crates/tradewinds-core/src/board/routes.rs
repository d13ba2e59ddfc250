//! Finalization and route derivation.

use super::{Board, Route, RouteIndex, TileIndex, TileKind, VertexIndex};
use crate::error::BoardError;
use std::collections::HashMap;
use tracing::debug;

impl Board {
    /// Prepare a generated board for play.
    ///
    /// Removes placeholder cells, rebuilds vertex adjacency and tile
    /// membership, derives the sorted route list and computes land/water
    /// flags. Runs once per board.
    pub fn finalize(&mut self) -> Result<(), BoardError> {
        if self.finalized {
            return Err(BoardError::AlreadyFinalized);
        }

        self.trim_placeholders();
        self.rebuild_adjacency();
        self.compute_memberships();
        self.derive_routes()?;
        self.refresh_adjacency_flags();
        self.finalized = true;
        self.save_baseline();

        debug!(
            tiles = self.tiles.len(),
            vertices = self.vertices.len(),
            routes = self.routes.len(),
            "board finalized"
        );
        Ok(())
    }

    /// Drop placeholder tiles and any vertex no longer on a tile
    fn trim_placeholders(&mut self) {
        let keep: Vec<bool> = self
            .tiles
            .iter()
            .map(|t| t.kind != TileKind::Placeholder)
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        let mut tile_map: Vec<Option<TileIndex>> = Vec::with_capacity(keep.len());
        let mut next = 0;
        for &k in &keep {
            tile_map.push(k.then(|| {
                next += 1;
                next - 1
            }));
        }

        let mut used = vec![false; self.vertices.len()];
        for (tile, _) in self.tiles.iter().zip(&keep).filter(|(_, k)| **k) {
            for &v in &tile.corners {
                used[v] = true;
            }
        }
        let mut vertex_map: Vec<Option<VertexIndex>> = Vec::with_capacity(used.len());
        let mut next = 0;
        for &u in &used {
            vertex_map.push(u.then(|| {
                next += 1;
                next - 1
            }));
        }

        let mut index = 0;
        self.tiles.retain(|_| {
            index += 1;
            keep[index - 1]
        });
        let mut index = 0;
        self.vertices.retain(|_| {
            index += 1;
            used[index - 1]
        });

        for tile in &mut self.tiles {
            for v in &mut tile.corners {
                *v = vertex_map[*v].unwrap_or(*v);
            }
            tile.patrol_next = tile.patrol_next.and_then(|t| tile_map[t]);
        }
        self.robber = self.robber.and_then(|t| tile_map[t]);
        self.pirate = self.pirate.and_then(|t| tile_map[t]);
    }

    /// Adjacency comes from the sides of the tiles that remain
    fn rebuild_adjacency(&mut self) {
        for vertex in &mut self.vertices {
            vertex.neighbors.clear();
        }
        for t in 0..self.tiles.len() {
            let corners = self.tiles[t].corners;
            for i in 0..6 {
                self.link(corners[i], corners[(i + 1) % 6]);
            }
        }
    }

    fn compute_memberships(&mut self) {
        for vertex in &mut self.vertices {
            vertex.tiles.clear();
        }
        for (t, tile) in self.tiles.iter().enumerate() {
            for &v in &tile.corners {
                self.vertices[v].tiles.push(t);
            }
        }
    }

    fn derive_routes(&mut self) -> Result<(), BoardError> {
        let mut routes: Vec<Route> = Vec::new();
        let mut seen: HashMap<(VertexIndex, VertexIndex), usize> = HashMap::new();

        for (t, tile) in self.tiles.iter().enumerate() {
            for (a, b) in tile.sides() {
                let key = (a.min(b), a.max(b));
                let slot = *seen.entry(key).or_insert_with(|| {
                    routes.push(Route::between(a, b));
                    routes.len() - 1
                });
                let route = &mut routes[slot];
                match route.tiles.iter_mut().find(|s| s.is_none()) {
                    Some(free) => *free = Some(t),
                    None => return Err(BoardError::RouteOverflow { route: slot }),
                }
            }
        }

        routes.sort_by_key(Route::key);
        verify_route_order(&routes)?;

        for vertex in &mut self.vertices {
            vertex.routes.clear();
        }
        for (r, route) in routes.iter().enumerate() {
            self.vertices[route.from].routes.push(r);
            self.vertices[route.to].routes.push(r);
        }
        self.routes = routes;
        Ok(())
    }

    /// Recompute land/water flags on vertices and routes from tile kinds.
    pub(crate) fn refresh_adjacency_flags(&mut self) {
        for vertex in &mut self.vertices {
            vertex.land = vertex.tiles.iter().any(|&t| self.tiles[t].kind.is_land());
            vertex.water = vertex.tiles.iter().any(|&t| self.tiles[t].kind.is_water());
        }
        for route in &mut self.routes {
            let land = route.bordering_tiles().any(|t| self.tiles[t].kind.is_land());
            route.land = land;
            let water = route.bordering_tiles().any(|t| self.tiles[t].kind.is_water());
            route.water = water;
        }
    }

    /// Route joining two vertices, found by binary search
    pub fn route_between(&self, a: VertexIndex, b: VertexIndex) -> Option<RouteIndex> {
        let key = (a.min(b), a.max(b));
        self.routes.binary_search_by_key(&key, Route::key).ok()
    }
}

/// Routes must be strictly increasing by canonical endpoint pair.
fn verify_route_order(routes: &[Route]) -> Result<(), BoardError> {
    for (i, pair) in routes.windows(2).enumerate() {
        let (a, b) = (pair[0].key(), pair[1].key());
        if a == b {
            return Err(BoardError::DuplicateRoute { from: a.0, to: a.1 });
        }
        if a > b {
            return Err(BoardError::RoutesUnsorted { index: i + 1 });
        }
    }
    Ok(())
}
