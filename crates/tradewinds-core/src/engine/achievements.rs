//! Longest route and largest army.
//!
//! Both titles follow one rule: the holder keeps the title on a tie, and
//! nobody takes it from a tie among challengers.

use super::Engine;
use crate::actions::GameEvent;
use crate::board::PlayerId;
use tracing::info;

/// Who should hold a title given each seat's score
pub(crate) fn award(holder: Option<PlayerId>, scores: &[u32], minimum: u32) -> Option<PlayerId> {
    let best = scores.iter().copied().max()?;
    if best < minimum {
        return None;
    }
    let leaders: Vec<PlayerId> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score == best)
        .map(|(i, _)| i as PlayerId)
        .collect();
    match holder {
        Some(h) if leaders.contains(&h) => Some(h),
        _ if leaders.len() == 1 => Some(leaders[0]),
        _ => None,
    }
}

impl Engine {
    /// Recompute every player's longest route and move the title if needed.
    /// Lengths come from the board's cache when it is still valid.
    pub fn update_longest_route(&mut self) {
        let lengths: Vec<u32> = (0..self.seat_count())
            .map(|p| self.board.longest_route(p))
            .collect();
        let next = award(self.longest_route, &lengths, self.rules.longest_route_min);
        if next == self.longest_route {
            return;
        }

        let previous = self.longest_route;
        for player in &mut self.players {
            player.has_longest_route = Some(player.id) == next;
        }
        self.longest_route = next;
        let length = next.map_or(0, |p| lengths[p as usize]);
        info!(?previous, current = ?next, length, "longest route changed");
        self.emit(GameEvent::LongestRouteChanged {
            previous,
            current: next,
            length,
        });
    }

    pub fn update_largest_army(&mut self) {
        let armies: Vec<u32> = self.players.iter().map(|p| p.played_knights).collect();
        let next = award(self.largest_army, &armies, self.rules.largest_army_min);
        if next == self.largest_army {
            return;
        }

        let previous = self.largest_army;
        for player in &mut self.players {
            player.has_largest_army = Some(player.id) == next;
        }
        self.largest_army = next;
        let knights = next.map_or(0, |p| armies[p as usize]);
        info!(?previous, current = ?next, knights, "largest army changed");
        self.emit(GameEvent::LargestArmyChanged {
            previous,
            current: next,
            knights,
        });
    }
}
