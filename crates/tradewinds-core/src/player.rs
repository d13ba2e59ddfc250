//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, development cards, pieces and achievements
//! - ResourceHand for managing resource counts
//! - Development card types and the draw/discard deck
//! - Default building costs

use crate::board::{PlayerId, Resource};
use crate::dice::DiceSequence;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
    Green,
    Brown,
    Purple,
    Teal,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 8 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            3 => PlayerColor::White,
            4 => PlayerColor::Green,
            5 => PlayerColor::Brown,
            6 => PlayerColor::Purple,
            _ => PlayerColor::Teal,
        }
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP while held
    VictoryPoint,
    /// Build 2 roads or ships for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All players must give you all of one resource type
    Monopoly,
    /// Place the merchant: 2:1 trades in the tile's resource
    Merchant,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards)
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(27);
        // 14 Knights
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        // 5 Victory Points
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        // 2 each of the progress cards
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }

    /// Standard deck plus two merchants when knights are in play
    pub fn deck_for(cities_and_knights: bool) -> Vec<DevelopmentCard> {
        let mut deck = Self::standard_deck();
        if cities_and_knights {
            deck.extend(std::iter::repeat(DevelopmentCard::Merchant).take(2));
        }
        deck
    }

    /// Whether this card can be played (VP cards are never "played")
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevelopmentCard::VictoryPoint)
    }
}

/// Draw pile and discard pile. An empty draw pile is refilled by
/// shuffling the discards back in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    draw: Vec<DevelopmentCard>,
    discard: Vec<DevelopmentCard>,
}

impl Deck {
    pub fn new(mut cards: Vec<DevelopmentCard>, dice: &mut DiceSequence) -> Self {
        cards.shuffle(dice);
        Self {
            draw: cards,
            discard: Vec::new(),
        }
    }

    /// Cards left to draw before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.draw.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.draw.is_empty() && self.discard.is_empty()
    }

    pub fn draw(&mut self, dice: &mut DiceSequence) -> Option<DevelopmentCard> {
        if self.draw.is_empty() {
            self.draw = std::mem::take(&mut self.discard);
            self.draw.shuffle(dice);
        }
        self.draw.pop()
    }

    pub fn discard(&mut self, card: DevelopmentCard) {
        self.discard.push(card);
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Brick => self.brick = count,
            Resource::Lumber => self.lumber = count,
            Resource::Ore => self.ore = count,
            Resource::Grain => self.grain = count,
            Resource::Wool => self.wool = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for r in Resource::ALL {
            self.add(r, other.get(r));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost, clamping at zero. Callers check `can_afford` first.
    pub fn subtract(&mut self, cost: &ResourceHand) {
        for r in Resource::ALL {
            self.set(r, self.get(r).saturating_sub(cost.get(r)));
        }
    }

    /// Try to subtract, returning false if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.subtract(cost);
        true
    }

    /// Remove every card of one resource, returning how many
    pub fn take_all(&mut self, resource: Resource) -> u32 {
        let count = self.get(resource);
        self.set(resource, 0);
        count
    }

    /// Remove the `n`th card counting through brick, lumber, ore, grain,
    /// wool. Used for robber theft with an index from the dice sequence.
    pub fn take_nth(&mut self, mut n: u32) -> Option<Resource> {
        for r in Resource::ALL {
            let count = self.get(r);
            if n < count {
                self.set(r, count - 1);
                return Some(r);
            }
            n -= count;
        }
        None
    }

    /// Resources with at least one card
    pub fn held(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|&r| self.get(r) > 0)
            .collect()
    }
}

/// Default building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a ship: 1 lumber, 1 wool
    pub fn ship() -> ResourceHand {
        ResourceHand::with_amounts(0, 1, 0, 0, 1)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    /// Cost to upgrade a city to a metropolis: 3 ore, 2 grain, 2 wool
    pub fn metropolis() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 2)
    }

    /// Cost to buy a development card: 1 ore, 1 grain, 1 wool
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }

    /// Cost to recruit a knight: 1 ore, 1 wool
    pub fn knight() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 0, 1)
    }

    /// Cost to activate a knight: 1 grain
    pub fn activate_knight() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 1, 0)
    }

    /// Cost to promote a knight: 1 ore, 1 wool
    pub fn promote_knight() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 0, 1)
    }

    /// Cost to arm a ship: 1 ore, 1 lumber
    pub fn warship() -> ResourceHand {
        ResourceHand::with_amounts(0, 1, 1, 0, 0)
    }

    /// Cost to repair a raided road: 1 brick
    pub fn repair() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 0, 0)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Seat number, equal to the player's index in the engine
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    /// Development cards in hand (playable)
    pub cards: Vec<DevelopmentCard>,
    /// Development cards bought this turn (can't be played same turn)
    pub new_cards: Vec<DevelopmentCard>,
    /// Number of knights played (for Largest Army)
    pub played_knights: u32,
    /// Only one development card may be played per turn
    pub card_played_this_turn: bool,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub roads_remaining: u32,
    pub ships_remaining: u32,
    pub knights_remaining: u32,
    /// Island discovery bonuses
    pub bonus_points: u32,
    pub has_longest_route: bool,
    pub has_largest_army: bool,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: PlayerColor::for_player(id),
            resources: ResourceHand::new(),
            cards: Vec::new(),
            new_cards: Vec::new(),
            played_knights: 0,
            card_played_this_turn: false,
            settlements_remaining: 5,
            cities_remaining: 4,
            roads_remaining: 15,
            ships_remaining: 15,
            knights_remaining: 6,
            bonus_points: 0,
            has_longest_route: false,
            has_largest_army: false,
        }
    }

    /// Points not coming from board structures: achievements, VP cards and
    /// island bonuses.
    pub fn bonus_victory_points(&self, achievement_points: u32) -> u32 {
        let mut vp = self.bonus_points;

        if self.has_longest_route {
            vp += achievement_points;
        }
        if self.has_largest_army {
            vp += achievement_points;
        }

        vp + self.hidden_vp()
    }

    /// Hidden VP (VP cards that opponents can't see)
    pub fn hidden_vp(&self) -> u32 {
        self.cards
            .iter()
            .chain(&self.new_cards)
            .filter(|c| matches!(c, DevelopmentCard::VictoryPoint))
            .count() as u32
    }

    pub fn card_count(&self) -> usize {
        self.cards.len() + self.new_cards.len()
    }

    /// Distinct cards that may be played right now
    pub fn playable_cards(&self) -> Vec<DevelopmentCard> {
        if self.card_played_this_turn {
            return Vec::new();
        }
        let mut cards: Vec<DevelopmentCard> = self
            .cards
            .iter()
            .copied()
            .filter(DevelopmentCard::is_playable)
            .collect();
        cards.sort();
        cards.dedup();
        cards
    }

    /// Remove a card from the playable hand
    pub fn take_card(&mut self, card: DevelopmentCard) -> bool {
        match self.cards.iter().position(|c| *c == card) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Called at end of turn - move bought cards to playable pile
    pub fn end_turn(&mut self) {
        self.cards.append(&mut self.new_cards);
        self.card_played_this_turn = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::with_amounts(2, 2, 2, 2, 2);
        let cost = ResourceHand::with_amounts(1, 1, 1, 1, 1);
        assert!(hand.can_afford(&cost));

        let expensive = ResourceHand::with_amounts(3, 0, 0, 0, 0);
        assert!(!hand.can_afford(&expensive));
    }

    #[test]
    fn test_resource_hand_subtract() {
        let mut hand = ResourceHand::with_amounts(3, 3, 3, 3, 3);
        let cost = ResourceHand::with_amounts(1, 1, 1, 1, 1);
        hand.subtract(&cost);
        assert_eq!(hand, ResourceHand::with_amounts(2, 2, 2, 2, 2));
        assert!(!hand.try_subtract(&ResourceHand::single(Resource::Ore, 3)));
    }

    #[test]
    fn test_take_nth_walks_resource_order() {
        let mut hand = ResourceHand::with_amounts(1, 0, 2, 0, 1);
        assert_eq!(hand.take_nth(2), Some(Resource::Ore));
        assert_eq!(hand, ResourceHand::with_amounts(1, 0, 1, 0, 1));
        assert_eq!(hand.take_nth(3), None);
        assert_eq!(hand.take_nth(0), Some(Resource::Brick));
        assert_eq!(hand.held(), vec![Resource::Ore, Resource::Wool]);
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::ship().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
        assert_eq!(costs::development_card().total(), 3);
    }

    #[test]
    fn test_deck_sizes() {
        assert_eq!(DevelopmentCard::standard_deck().len(), 25);
        let knights = DevelopmentCard::standard_deck()
            .iter()
            .filter(|c| matches!(c, DevelopmentCard::Knight))
            .count();
        assert_eq!(knights, 14);
        assert_eq!(DevelopmentCard::deck_for(true).len(), 27);
    }

    #[test]
    fn test_deck_reshuffles_discards() {
        let mut dice = DiceSequence::new(1);
        let mut deck = Deck::new(vec![DevelopmentCard::Monopoly], &mut dice);
        assert_eq!(deck.draw(&mut dice), Some(DevelopmentCard::Monopoly));
        assert_eq!(deck.draw(&mut dice), None);

        deck.discard(DevelopmentCard::Monopoly);
        assert!(!deck.is_exhausted());
        assert_eq!(deck.draw(&mut dice), Some(DevelopmentCard::Monopoly));
        assert!(deck.is_exhausted());
    }

    #[test]
    fn test_deck_order_follows_seed() {
        let deal = |seed: u64| {
            let mut dice = DiceSequence::new(seed);
            let mut deck = Deck::new(DevelopmentCard::standard_deck(), &mut dice);
            let cards: Vec<_> = std::iter::from_fn(|| deck.draw(&mut dice)).collect();
            (cards, dice)
        };
        let (cards, dice) = deal(21);
        let (again, dice_again) = deal(21);
        assert_eq!(cards.len(), 25);
        assert_eq!(cards, again);
        assert_eq!(dice, dice_again);
        assert_ne!(cards, DevelopmentCard::standard_deck());
    }

    #[test]
    fn test_player_victory_points() {
        let mut player = Player::new(0, "Test");
        assert_eq!(player.bonus_victory_points(2), 0);

        player.has_longest_route = true;
        assert_eq!(player.bonus_victory_points(2), 2);

        player.has_largest_army = true;
        assert_eq!(player.bonus_victory_points(2), 4);

        player.new_cards.push(DevelopmentCard::VictoryPoint);
        assert_eq!(player.bonus_victory_points(2), 5);

        player.bonus_points = 2;
        assert_eq!(player.bonus_victory_points(2), 7);
    }

    #[test]
    fn test_dev_card_bought_this_turn() {
        let mut player = Player::new(0, "Test");
        player.new_cards.push(DevelopmentCard::Knight);
        assert!(player.playable_cards().is_empty());

        player.end_turn();
        assert_eq!(player.playable_cards(), vec![DevelopmentCard::Knight]);
        assert!(player.new_cards.is_empty());

        player.card_played_this_turn = true;
        assert!(player.playable_cards().is_empty());
    }

    #[test]
    fn test_playable_cards_skip_victory_points() {
        let mut player = Player::new(1, "Test");
        player.cards = vec![
            DevelopmentCard::VictoryPoint,
            DevelopmentCard::Knight,
            DevelopmentCard::Knight,
            DevelopmentCard::Monopoly,
        ];
        assert_eq!(
            player.playable_cards(),
            vec![DevelopmentCard::Knight, DevelopmentCard::Monopoly]
        );
        assert!(player.take_card(DevelopmentCard::Knight));
        assert_eq!(player.cards.len(), 3);
    }
}
