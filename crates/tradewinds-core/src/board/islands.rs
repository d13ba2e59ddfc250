//! Island discovery.
//!
//! Islands are connected groups of land tiles. Ids are 1-based and dense:
//! removing an island shifts every later id down by one, along with the
//! tile references that point at them.

use super::{Board, Island, IslandId, PlayerId, RouteIndex, TileIndex, VertexIndex};
use crate::error::BoardError;
use std::collections::BTreeSet;
use tracing::info;

impl Board {
    /// Island containing `tile`, flood-filling a new one if needed.
    ///
    /// Repeated calls on the same land mass return the same id. When the
    /// fill reaches tiles of existing islands (new land bridged them) those
    /// islands are removed and replaced by one merged island that keeps
    /// their discovery bits.
    pub fn discover_island_at(&mut self, tile: TileIndex) -> Option<IslandId> {
        if !self.tiles[tile].kind.is_land() {
            return None;
        }
        if let Some(id) = self.tiles[tile].island {
            return Some(id);
        }

        let members = self.flood_land(tile);
        let absorbed: BTreeSet<IslandId> =
            members.iter().filter_map(|&t| self.tiles[t].island).collect();

        let mut discovered = 0;
        for &id in absorbed.iter().rev() {
            if let Ok(island) = self.remove_island(id) {
                discovered |= island.discovered;
            }
        }

        let id = (self.islands.len() + 1) as IslandId;
        for &t in &members {
            self.tiles[t].island = Some(id);
        }
        let shoreline = self.shoreline_of(&members);
        info!(island = id, tiles = members.len(), "island discovered");
        self.islands.push(Island {
            id,
            tiles: members,
            shoreline,
            discovered,
        });
        Some(id)
    }

    /// Assign every land tile to an island. Returns the island count.
    pub fn discover_islands(&mut self) -> usize {
        for t in 0..self.tiles.len() {
            self.discover_island_at(t);
        }
        self.islands.len()
    }

    /// Forget all islands and rediscover them from tile kinds.
    pub(crate) fn rebuild_islands(&mut self) {
        self.islands.clear();
        for tile in &mut self.tiles {
            tile.island = None;
        }
        self.discover_islands();
    }

    /// Remove an island, renumbering the ones after it.
    pub fn remove_island(&mut self, id: IslandId) -> Result<Island, BoardError> {
        let index = (id as usize)
            .checked_sub(1)
            .filter(|&i| i < self.islands.len())
            .ok_or(BoardError::UnknownIsland { id })?;

        let removed = self.islands.remove(index);
        for island in &mut self.islands[index..] {
            island.id -= 1;
        }
        for tile in &mut self.tiles {
            tile.island = match tile.island {
                Some(i) if i == id => None,
                Some(i) if i > id => Some(i - 1),
                other => other,
            };
        }
        Ok(removed)
    }

    /// Islands touching a vertex
    pub fn islands_at(&self, vertex: VertexIndex) -> BTreeSet<IslandId> {
        self.vertices[vertex]
            .tiles
            .iter()
            .filter_map(|&t| self.tiles[t].island)
            .collect()
    }

    /// Set a player's discovery bit. Returns true the first time.
    pub fn mark_discovered(&mut self, id: IslandId, player: PlayerId) -> bool {
        let Some(island) = (id as usize)
            .checked_sub(1)
            .and_then(|i| self.islands.get_mut(i))
        else {
            return false;
        };
        let bit = 1u32 << player;
        let first = island.discovered & bit == 0;
        island.discovered |= bit;
        first
    }

    /// Recompute shorelines after tile kinds change
    pub(crate) fn rebuild_shorelines(&mut self) {
        for i in 0..self.islands.len() {
            let shoreline = self.shoreline_of(&self.islands[i].tiles);
            self.islands[i].shoreline = shoreline;
        }
    }

    /// Land tiles reachable from `start` through shared corners
    fn flood_land(&self, start: TileIndex) -> BTreeSet<TileIndex> {
        let mut members = BTreeSet::new();
        let mut pending = vec![start];
        while let Some(t) = pending.pop() {
            if !self.tiles[t].kind.is_land() || !members.insert(t) {
                continue;
            }
            for &v in &self.tiles[t].corners {
                pending.extend(self.vertices[v].tiles.iter().filter(|n| !members.contains(*n)));
            }
        }
        members
    }

    fn shoreline_of(&self, tiles: &BTreeSet<TileIndex>) -> BTreeSet<RouteIndex> {
        tiles
            .iter()
            .flat_map(|&t| self.sides_of(t))
            .filter(|&r| self.routes[r].land && self.routes[r].water)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileKind;
    use crate::hex::HexCoord;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn archipelago() -> Board {
        Board::archipelago_with_rng(&mut StdRng::seed_from_u64(8))
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let mut board = archipelago();
        let home = board.tile_at(HexCoord::new(0, 0)).unwrap();
        let neighbour = board.tile_at(HexCoord::new(1, 0)).unwrap();
        let before = board.island(1).unwrap().tiles.clone();

        let a = board.discover_island_at(home);
        let b = board.discover_island_at(neighbour);
        assert_eq!(a, Some(1));
        assert_eq!(a, b);
        assert_eq!(board.island(1).unwrap().tiles, before);
        assert_eq!(board.islands().len(), 4);
    }

    #[test]
    fn test_water_has_no_island() {
        let mut board = archipelago();
        let lane = board.tile_at(HexCoord::default().ring(2)[0]).unwrap();
        assert_eq!(board.discover_island_at(lane), None);
    }

    #[test]
    fn test_standard_shoreline() {
        let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(8));
        let island = board.island(1).unwrap();
        assert_eq!(island.tiles.len(), 19);
        assert_eq!(island.shoreline.len(), 30);
    }

    #[test]
    fn test_remove_island_renumbers() {
        let mut board = archipelago();
        let last = board.islands().len() as IslandId;
        let moved: Vec<TileIndex> = board.island(last).unwrap().tiles.iter().copied().collect();

        let removed = board.remove_island(2).unwrap();
        assert_eq!(removed.id, 2);
        assert_eq!(board.islands().len(), 3);
        for (i, island) in board.islands().iter().enumerate() {
            assert_eq!(island.id as usize, i + 1);
        }
        for t in moved {
            assert_eq!(board.tile(t).island, Some(last - 1));
        }
        for t in removed.tiles {
            assert_eq!(board.tile(t).island, None);
        }
        assert_eq!(
            board.remove_island(9),
            Err(BoardError::UnknownIsland { id: 9 })
        );
    }

    #[test]
    fn test_bridging_land_merges_islands() {
        let mut board = Board::generate_hex(1);
        board.finalize().unwrap();
        let west = board.tile_at(HexCoord::new(-1, 0)).unwrap();
        let east = board.tile_at(HexCoord::new(1, 0)).unwrap();
        let middle = board.tile_at(HexCoord::new(0, 0)).unwrap();
        board.set_tile_kind(west, TileKind::Desert);
        board.set_tile_kind(east, TileKind::Desert);
        assert_eq!(board.discover_islands(), 2);
        board.mark_discovered(2, 3);

        board.set_tile_kind(middle, TileKind::Desert);
        let merged = board.discover_island_at(middle).unwrap();
        assert_eq!(merged, 1);
        assert_eq!(board.islands().len(), 1);
        let island = board.island(1).unwrap();
        assert_eq!(island.tiles.len(), 3);
        assert!(island.is_discovered_by(3));
    }

    #[test]
    fn test_mark_discovered_once() {
        let mut board = archipelago();
        assert!(board.mark_discovered(1, 2));
        assert!(!board.mark_discovered(1, 2));
        assert!(board.island(1).unwrap().is_discovered_by(2));
        assert!(!board.island(1).unwrap().is_discovered_by(0));
    }
}
