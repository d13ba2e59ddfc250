//! Turn menu moves and the events that result from play.
//!
//! This module defines:
//! - `MoveKind`, the entries of the turn menu, with their cost lookup
//! - `GameEvent`, everything the engine reports to the embedding application
//! - `EffectSink`, the fire-and-forget receiver for those events

use crate::board::{IslandId, Occupant, PlayerId, Resource, RouteIndex, RoutePiece, TileIndex, TileKind, VertexIndex};
use crate::player::{DevelopmentCard, ResourceHand};
use crate::rules::Rules;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Entries a player can pick from the turn menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveKind {
    EndTurn,

    // ==================== Building ====================
    BuildRoad,
    BuildShip,
    BuildSettlement,
    BuildCity,
    BuildMetropolis,

    // ==================== Knights ====================
    BuildKnight,
    ActivateKnight,
    PromoteKnight,
    MoveKnight,
    Attack,

    // ==================== Ships ====================
    MoveShip,
    UpgradeWarship,
    RepairRoad,

    // ==================== Cards and Trade ====================
    BuyCard,
    PlayCard,
    TradeWithBank,
}

impl MoveKind {
    pub const ALL: [MoveKind; 17] = [
        MoveKind::EndTurn,
        MoveKind::BuildRoad,
        MoveKind::BuildShip,
        MoveKind::BuildSettlement,
        MoveKind::BuildCity,
        MoveKind::BuildMetropolis,
        MoveKind::BuildKnight,
        MoveKind::ActivateKnight,
        MoveKind::PromoteKnight,
        MoveKind::MoveKnight,
        MoveKind::Attack,
        MoveKind::MoveShip,
        MoveKind::UpgradeWarship,
        MoveKind::RepairRoad,
        MoveKind::BuyCard,
        MoveKind::PlayCard,
        MoveKind::TradeWithBank,
    ];

    /// Resources paid up front when the move is picked
    pub fn cost(self, rules: &Rules) -> Option<&ResourceHand> {
        match self {
            MoveKind::BuildRoad => Some(&rules.road_cost),
            MoveKind::BuildShip => Some(&rules.ship_cost),
            MoveKind::BuildSettlement => Some(&rules.settlement_cost),
            MoveKind::BuildCity => Some(&rules.city_cost),
            MoveKind::BuildMetropolis => Some(&rules.metropolis_cost),
            MoveKind::BuildKnight => Some(&rules.knight_cost),
            MoveKind::ActivateKnight => Some(&rules.activate_cost),
            MoveKind::PromoteKnight => Some(&rules.promote_cost),
            MoveKind::UpgradeWarship => Some(&rules.warship_cost),
            MoveKind::RepairRoad => Some(&rules.repair_cost),
            MoveKind::BuyCard => Some(&rules.card_cost),
            MoveKind::EndTurn
            | MoveKind::MoveKnight
            | MoveKind::Attack
            | MoveKind::MoveShip
            | MoveKind::PlayCard
            | MoveKind::TradeWithBank => None,
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            MoveKind::EndTurn => "End turn",
            MoveKind::BuildRoad => "Build road",
            MoveKind::BuildShip => "Build ship",
            MoveKind::BuildSettlement => "Build settlement",
            MoveKind::BuildCity => "Build city",
            MoveKind::BuildMetropolis => "Build metropolis",
            MoveKind::BuildKnight => "Recruit knight",
            MoveKind::ActivateKnight => "Activate knight",
            MoveKind::PromoteKnight => "Promote knight",
            MoveKind::MoveKnight => "Move knight",
            MoveKind::Attack => "Attack fortress",
            MoveKind::MoveShip => "Move ship",
            MoveKind::UpgradeWarship => "Arm ship",
            MoveKind::RepairRoad => "Repair road",
            MoveKind::BuyCard => "Buy development card",
            MoveKind::PlayCard => "Play development card",
            MoveKind::TradeWithBank => "Trade with bank",
        }
    }
}

/// How a fortress attack ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Captured,
    Weakened,
    Repelled,
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a roll or an opening placement
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    // ==================== Building ====================
    SettlementBuilt {
        player: PlayerId,
        vertex: VertexIndex,
    },

    CityBuilt {
        player: PlayerId,
        vertex: VertexIndex,
    },

    MetropolisBuilt {
        player: PlayerId,
        vertex: VertexIndex,
    },

    /// A road or ship was laid
    RouteBuilt {
        player: PlayerId,
        route: RouteIndex,
        piece: RoutePiece,
    },

    ShipMoved {
        player: PlayerId,
        from: RouteIndex,
        to: RouteIndex,
    },

    WarshipUpgraded {
        player: PlayerId,
        route: RouteIndex,
    },

    RoadRepaired {
        player: PlayerId,
        route: RouteIndex,
    },

    /// The pirate damaged roads along its new tile
    RoadsDamaged {
        tile: TileIndex,
        routes: Vec<RouteIndex>,
    },

    // ==================== Knights ====================
    KnightBuilt {
        player: PlayerId,
        vertex: VertexIndex,
    },

    KnightActivated {
        player: PlayerId,
        vertex: VertexIndex,
    },

    KnightPromoted {
        player: PlayerId,
        vertex: VertexIndex,
        level: u8,
    },

    KnightMoved {
        player: PlayerId,
        from: VertexIndex,
        to: VertexIndex,
    },

    /// A knight was pushed off its vertex; `to` is `None` when it had
    /// nowhere to go and left the board
    KnightDisplaced {
        owner: PlayerId,
        from: VertexIndex,
        to: Option<VertexIndex>,
    },

    FortressAttacked {
        player: PlayerId,
        vertex: VertexIndex,
        roll: u8,
        strength: u32,
        outcome: AttackOutcome,
    },

    /// A piece was removed from a vertex
    StructureDestroyed {
        vertex: VertexIndex,
        occupant: Occupant,
    },

    // ==================== Cards ====================
    DevelopmentCardPurchased {
        player: PlayerId,
    },

    CardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },

    MonopolyPlayed {
        player: PlayerId,
        resource: Resource,
        total_stolen: u32,
    },

    /// A free resource was taken from the bank (gold or year of plenty)
    ResourcePicked {
        player: PlayerId,
        resource: Resource,
    },

    // ==================== Markers ====================
    RobberMoved {
        player: PlayerId,
        from: Option<TileIndex>,
        to: TileIndex,
    },

    PirateMoved {
        player: Option<PlayerId>,
        from: Option<TileIndex>,
        to: TileIndex,
    },

    MerchantPlaced {
        player: PlayerId,
        tile: TileIndex,
    },

    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    CardsDiscarded {
        player: PlayerId,
        resource: Resource,
    },

    MaritimeTradeCompleted {
        player: PlayerId,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },

    // ==================== Exploration ====================
    TileRevealed {
        player: PlayerId,
        tile: TileIndex,
        kind: TileKind,
    },

    IslandDiscovered {
        player: PlayerId,
        island: IslandId,
        bonus: u32,
    },

    // ==================== Achievements ====================
    LongestRouteChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        knights: u32,
    },

    // ==================== Game Flow ====================
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

/// Receiver for engine events. Sinks only observe; they never see the
/// engine itself.
pub trait EffectSink {
    fn emit(&mut self, event: &GameEvent);
}

impl EffectSink for Vec<GameEvent> {
    fn emit(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// Drops everything
impl EffectSink for () {
    fn emit(&mut self, _event: &GameEvent) {}
}

/// Logs every event at `info`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EffectSink for TracingSink {
    fn emit(&mut self, event: &GameEvent) {
        info!(?event, "game event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_costs_follow_rules() {
        let mut rules = Rules::default();
        assert_eq!(MoveKind::BuildRoad.cost(&rules), Some(&rules.road_cost));
        assert_eq!(MoveKind::EndTurn.cost(&rules), None);
        assert_eq!(MoveKind::TradeWithBank.cost(&rules), None);

        rules.city_cost = ResourceHand::single(Resource::Ore, 1);
        assert_eq!(
            MoveKind::BuildCity.cost(&rules),
            Some(&ResourceHand::single(Resource::Ore, 1))
        );
    }

    #[test]
    fn test_every_move_has_label() {
        for kind in MoveKind::ALL {
            assert!(!kind.label().is_empty());
        }
        let mut sorted = MoveKind::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), MoveKind::ALL.len());
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<GameEvent> = Vec::new();
        let event = GameEvent::DevelopmentCardPurchased { player: 1 };
        sink.emit(&event);
        ().emit(&event);
        TracingSink.emit(&event);
        assert_eq!(sink, vec![event]);
    }
}
