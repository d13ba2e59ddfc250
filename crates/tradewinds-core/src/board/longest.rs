//! Longest-route search.
//!
//! A route may visit a vertex more than once but never reuse an edge, so the
//! search marks visited routes rather than vertices. The search is
//! exponential in the worst case; results are cached per player and only
//! recomputed after that player's routes (or the vertices they pass through)
//! change.

use super::{Board, PlayerId, RouteIndex, VertexIndex, MAX_PLAYERS};

impl Board {
    /// Longest continuous route for a player, recomputed only when dirty.
    pub fn longest_route(&mut self, player: PlayerId) -> u32 {
        let slot = player as usize;
        if let Some(length) = self.route_lengths[slot] {
            return length;
        }
        let length = self.compute_longest_route(player);
        self.route_lengths[slot] = Some(length);
        length
    }

    /// Cached value, `None` while dirty
    pub fn cached_route_length(&self, player: PlayerId) -> Option<u32> {
        self.route_lengths.get(player as usize).copied().flatten()
    }

    pub(super) fn invalidate_route_length(&mut self, player: PlayerId) {
        if (player as usize) < MAX_PLAYERS {
            self.route_lengths[player as usize] = None;
        }
    }

    /// Uncached search.
    ///
    /// For every vertex, each owned incident route starts an arm. The best
    /// path through the vertex joins one arm with the best arm that avoids
    /// the first arm's routes; a single arm covers paths ending there.
    pub fn compute_longest_route(&self, player: PlayerId) -> u32 {
        let mut walk = Walk::new(self, player);
        let mut best = 0;

        for vertex in 0..self.vertices.len() {
            let starts: Vec<RouteIndex> = self.vertices[vertex]
                .routes
                .iter()
                .copied()
                .filter(|&r| walk.owns(r))
                .collect();

            for &first in &starts {
                let arm = walk.arm(vertex, first);
                best = best.max(arm.len());

                if walk.breaks_at(vertex) {
                    continue;
                }
                for &r in &arm {
                    walk.visited[r] = true;
                }
                for &second in &starts {
                    if walk.visited[second] || !walk.may_switch(vertex, first, second) {
                        continue;
                    }
                    let other = walk.arm(vertex, second);
                    best = best.max(arm.len() + other.len());
                }
                for &r in &arm {
                    walk.visited[r] = false;
                }
            }
        }

        best as u32
    }
}

/// Depth-first search state for one player
struct Walk<'a> {
    board: &'a Board,
    player: PlayerId,
    visited: Vec<bool>,
    trail: Vec<RouteIndex>,
    best: Vec<RouteIndex>,
}

impl<'a> Walk<'a> {
    fn new(board: &'a Board, player: PlayerId) -> Self {
        Self {
            board,
            player,
            visited: vec![false; board.routes.len()],
            trail: Vec::new(),
            best: Vec::new(),
        }
    }

    fn owns(&self, route: RouteIndex) -> bool {
        let piece = self.board.routes[route].piece;
        piece.owner() == Some(self.player) && piece.counts_for_length()
    }

    /// A hostile occupant splits the route at this vertex. Opposing
    /// structures always do; knights and fortresses only under road-block.
    fn breaks_at(&self, vertex: VertexIndex) -> bool {
        let occupant = &self.board.vertices[vertex].occupant;
        if let Some(owner) = occupant.structure_owner() {
            return owner != self.player;
        }
        if !self.board.road_block {
            return false;
        }
        match occupant.knight_owner() {
            Some(owner) => owner != self.player,
            None => occupant.is_building(),
        }
    }

    /// Roads and ships only join where the player has a structure.
    fn may_switch(&self, vertex: VertexIndex, from: RouteIndex, to: RouteIndex) -> bool {
        let a = self.board.routes[from].piece.category();
        let b = self.board.routes[to].piece.category();
        a == b || self.board.vertices[vertex].occupant.structure_owner() == Some(self.player)
    }

    /// Longest trail leaving `vertex` through `first`, honouring routes
    /// already marked visited.
    fn arm(&mut self, vertex: VertexIndex, first: RouteIndex) -> Vec<RouteIndex> {
        self.best.clear();
        self.trail.clear();
        self.visited[first] = true;
        self.trail.push(first);
        let next = self.board.routes[first].other_end(vertex);
        self.extend(next, first);
        self.trail.pop();
        self.visited[first] = false;
        std::mem::take(&mut self.best)
    }

    fn extend(&mut self, vertex: VertexIndex, came: RouteIndex) {
        if self.trail.len() > self.best.len() {
            self.best.clone_from(&self.trail);
        }
        if self.breaks_at(vertex) {
            return;
        }
        let board = self.board;
        for &route in &board.vertices[vertex].routes {
            if self.visited[route] || !self.owns(route) || !self.may_switch(vertex, came, route) {
                continue;
            }
            self.visited[route] = true;
            self.trail.push(route);
            self.extend(board.routes[route].other_end(vertex), route);
            self.trail.pop();
            self.visited[route] = false;
        }
    }
}
