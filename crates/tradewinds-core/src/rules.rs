//! Rule parameters.
//!
//! A flat, read-only set of tunables. The engine only ever reads it. Every
//! field has a default, so a JSON file naming a handful of fields is a valid
//! rules file.

use crate::player::{costs, ResourceHand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub points_to_win: u32,
    /// Snake rounds in the opening; the last one grants starting resources
    pub setup_rounds: u32,
    /// A 7 makes every player holding more than this discard half
    pub discard_limit: u32,
    /// Bank exchange rate without a harbor
    pub bank_rate: u32,
    pub longest_route_min: u32,
    pub largest_army_min: u32,
    /// Worth of each achievement marker
    pub achievement_points: u32,
    /// Points for the first settlement on a newly reached island
    pub island_bonus: u32,

    /// Ships, pirate, harbors on islands
    pub seafarers: bool,
    /// Knights, metropolises, fortresses, merchant
    pub cities_and_knights: bool,
    /// Hostile knights and fortresses also break routes
    pub road_block: bool,
    /// Knights may take one extra step onto open land past their roads
    pub knight_extra_hop: bool,
    /// The pirate advances along its patrol every turn
    pub pirate_patrol: bool,
    /// A patrolling pirate damages roads along its new tile
    pub pirate_raids: bool,
    /// Players at or below this many points cannot be robbed (0 disables)
    pub friendly_robber_points: u32,

    pub max_knight_level: u8,
    /// Metropolises allowed on the whole board
    pub metropolis_limit: u32,
    /// Die plus knight strength needed to take a fortress outright
    pub attack_capture: u32,
    /// Die plus knight strength needed to weaken a fortress
    pub attack_weaken: u32,

    pub road_cost: ResourceHand,
    pub ship_cost: ResourceHand,
    pub settlement_cost: ResourceHand,
    pub city_cost: ResourceHand,
    pub metropolis_cost: ResourceHand,
    pub card_cost: ResourceHand,
    pub knight_cost: ResourceHand,
    pub activate_cost: ResourceHand,
    pub promote_cost: ResourceHand,
    pub warship_cost: ResourceHand,
    pub repair_cost: ResourceHand,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            points_to_win: 10,
            setup_rounds: 2,
            discard_limit: 7,
            bank_rate: 4,
            longest_route_min: 5,
            largest_army_min: 3,
            achievement_points: 2,
            island_bonus: 2,
            seafarers: false,
            cities_and_knights: false,
            road_block: false,
            knight_extra_hop: false,
            pirate_patrol: false,
            pirate_raids: false,
            friendly_robber_points: 0,
            max_knight_level: 3,
            metropolis_limit: 3,
            attack_capture: 9,
            attack_weaken: 6,
            road_cost: costs::road(),
            ship_cost: costs::ship(),
            settlement_cost: costs::settlement(),
            city_cost: costs::city(),
            metropolis_cost: costs::metropolis(),
            card_cost: costs::development_card(),
            knight_cost: costs::knight(),
            activate_cost: costs::activate_knight(),
            promote_cost: costs::promote_knight(),
            warship_cost: costs::warship(),
            repair_cost: costs::repair(),
        }
    }
}

impl Rules {
    /// Seafaring rules with a patrolling pirate
    pub fn seafarers() -> Self {
        Self {
            seafarers: true,
            pirate_patrol: true,
            points_to_win: 12,
            ..Self::default()
        }
    }

    /// Everything switched on
    pub fn full() -> Self {
        Self {
            cities_and_knights: true,
            road_block: true,
            pirate_raids: true,
            points_to_win: 13,
            ..Self::seafarers()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let rules = Rules::from_json(r#"{"points_to_win": 8, "seafarers": true}"#).unwrap();
        assert_eq!(rules.points_to_win, 8);
        assert!(rules.seafarers);
        assert_eq!(rules.discard_limit, 7);
        assert_eq!(rules.road_cost, costs::road());
    }

    #[test]
    fn test_cost_override() {
        let rules =
            Rules::from_json(r#"{"road_cost": {"brick": 2, "lumber": 1, "ore": 0, "grain": 0, "wool": 0}}"#)
                .unwrap();
        assert_eq!(rules.road_cost, ResourceHand::with_amounts(2, 1, 0, 0, 0));
    }

    #[test]
    fn test_presets() {
        assert!(Rules::seafarers().pirate_patrol);
        let full = Rules::full();
        assert!(full.seafarers && full.cities_and_knights && full.road_block);
    }
}
