//! Decision frames.
//!
//! A frame pairs a state tag (with its payload) with the option set handed
//! to the agent and the undo action that runs if the frame is cancelled.

use crate::actions::MoveKind;
use crate::agent::{
    Bandit, CardMode, Choice, EnumValue, PlayerMode, RouteMode, TileMode, ValueMode, VertexMode,
};
use crate::board::{
    Occupant, PlayerId, Resource, RouteCategory, RouteIndex, RoutePiece, TileIndex, VertexIndex,
};
use crate::player::{DevelopmentCard, ResourceHand};
use serde::{Deserialize, Serialize};

/// Why a free resource is being picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickReason {
    Gold,
    Plenty,
}

/// State tags. Each is either a transition (does its work and pops) or a
/// wait state (asks the current player's agent for a choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    // ==================== Transitions ====================
    /// Re-pushes itself under one `TakeTurn` per player
    StartRound,
    /// Lays out the snake-order opening
    BeginSetup,
    FinishSetup,
    SetPlayer(PlayerId),
    NextPlayer,
    PreviousPlayer,
    TakeTurn(PlayerId),
    BeginTurn,
    RollDice,
    EndTurn,
    DrawCard,
    UpdateLongestRoute,
    UpdateLargestArmy,
    CheckWinner,

    // ==================== Opening ====================
    SetupSettlement { grants_resources: bool },
    SetupRoute { from: VertexIndex },
    ChooseRouteCategory { route: RouteIndex },

    // ==================== Turn ====================
    TurnMenu,
    PlaceSettlement,
    PlaceCity,
    PlaceMetropolis,
    PlaceRoad,
    PlaceShip,
    PlaceFreeRoute,
    MoveShipSource,
    MoveShipDestination { from: RouteIndex, piece: RoutePiece },
    UpgradeWarship,
    RepairRoad,

    // ==================== Knights ====================
    PlaceKnight,
    ActivateKnight,
    PromoteKnight,
    MoveKnightSource,
    MoveKnightDestination { from: VertexIndex },
    DisplaceKnight { knight: Occupant, from: VertexIndex },
    ChooseAttackTarget,

    // ==================== Bandits and Cards ====================
    ChooseBandit,
    MoveRobber,
    MovePirate,
    ChooseVictim { bandit: Bandit, tile: TileIndex },
    Discard,
    PickResource { reason: PickReason },
    ChooseMonopoly,
    ChooseCard,
    PlaceMerchant,
    BankGive,
    BankReceive { gave: Resource, count: u32 },
}

/// What kind of answer a wait state expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prompt {
    Move,
    Vertex(VertexMode),
    Route(RouteMode),
    Tile(TileMode),
    Player(PlayerMode),
    Card(CardMode),
    Value(ValueMode),
    Category,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::StartRound => "StartRound",
            State::BeginSetup => "BeginSetup",
            State::FinishSetup => "FinishSetup",
            State::SetPlayer(_) => "SetPlayer",
            State::NextPlayer => "NextPlayer",
            State::PreviousPlayer => "PreviousPlayer",
            State::TakeTurn(_) => "TakeTurn",
            State::BeginTurn => "BeginTurn",
            State::RollDice => "RollDice",
            State::EndTurn => "EndTurn",
            State::DrawCard => "DrawCard",
            State::UpdateLongestRoute => "UpdateLongestRoute",
            State::UpdateLargestArmy => "UpdateLargestArmy",
            State::CheckWinner => "CheckWinner",
            State::SetupSettlement { .. } => "SetupSettlement",
            State::SetupRoute { .. } => "SetupRoute",
            State::ChooseRouteCategory { .. } => "ChooseRouteCategory",
            State::TurnMenu => "TurnMenu",
            State::PlaceSettlement => "PlaceSettlement",
            State::PlaceCity => "PlaceCity",
            State::PlaceMetropolis => "PlaceMetropolis",
            State::PlaceRoad => "PlaceRoad",
            State::PlaceShip => "PlaceShip",
            State::PlaceFreeRoute => "PlaceFreeRoute",
            State::MoveShipSource => "MoveShipSource",
            State::MoveShipDestination { .. } => "MoveShipDestination",
            State::UpgradeWarship => "UpgradeWarship",
            State::RepairRoad => "RepairRoad",
            State::PlaceKnight => "PlaceKnight",
            State::ActivateKnight => "ActivateKnight",
            State::PromoteKnight => "PromoteKnight",
            State::MoveKnightSource => "MoveKnightSource",
            State::MoveKnightDestination { .. } => "MoveKnightDestination",
            State::DisplaceKnight { .. } => "DisplaceKnight",
            State::ChooseAttackTarget => "ChooseAttackTarget",
            State::ChooseBandit => "ChooseBandit",
            State::MoveRobber => "MoveRobber",
            State::MovePirate => "MovePirate",
            State::ChooseVictim { .. } => "ChooseVictim",
            State::Discard => "Discard",
            State::PickResource { .. } => "PickResource",
            State::ChooseMonopoly => "ChooseMonopoly",
            State::ChooseCard => "ChooseCard",
            State::PlaceMerchant => "PlaceMerchant",
            State::BankGive => "BankGive",
            State::BankReceive { .. } => "BankReceive",
        }
    }

    pub fn is_transition(&self) -> bool {
        self.prompt().is_none()
    }

    /// Frames a player may back out of
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            State::PlaceSettlement
                | State::PlaceCity
                | State::PlaceMetropolis
                | State::PlaceRoad
                | State::PlaceShip
                | State::MoveShipSource
                | State::MoveShipDestination { .. }
                | State::UpgradeWarship
                | State::RepairRoad
                | State::PlaceKnight
                | State::ActivateKnight
                | State::PromoteKnight
                | State::MoveKnightSource
                | State::MoveKnightDestination { .. }
                | State::ChooseAttackTarget
                | State::ChooseCard
                | State::BankGive
                | State::BankReceive { .. }
        )
    }

    pub(crate) fn prompt(&self) -> Option<Prompt> {
        let prompt = match self {
            State::StartRound
            | State::BeginSetup
            | State::FinishSetup
            | State::SetPlayer(_)
            | State::NextPlayer
            | State::PreviousPlayer
            | State::TakeTurn(_)
            | State::BeginTurn
            | State::RollDice
            | State::EndTurn
            | State::DrawCard
            | State::UpdateLongestRoute
            | State::UpdateLargestArmy
            | State::CheckWinner => return None,

            State::SetupSettlement { .. } => Prompt::Vertex(VertexMode::SetupSettlement),
            State::SetupRoute { .. } => Prompt::Route(RouteMode::SetupRoute),
            State::ChooseRouteCategory { .. } => Prompt::Category,
            State::TurnMenu => Prompt::Move,
            State::PlaceSettlement => Prompt::Vertex(VertexMode::Settlement),
            State::PlaceCity => Prompt::Vertex(VertexMode::City),
            State::PlaceMetropolis => Prompt::Vertex(VertexMode::Metropolis),
            State::PlaceRoad => Prompt::Route(RouteMode::Road),
            State::PlaceShip => Prompt::Route(RouteMode::Ship),
            State::PlaceFreeRoute => Prompt::Route(RouteMode::FreeRoute),
            State::MoveShipSource => Prompt::Route(RouteMode::ShipSource),
            State::MoveShipDestination { .. } => Prompt::Route(RouteMode::ShipDestination),
            State::UpgradeWarship => Prompt::Route(RouteMode::Warship),
            State::RepairRoad => Prompt::Route(RouteMode::Repair),
            State::PlaceKnight => Prompt::Vertex(VertexMode::Knight),
            State::ActivateKnight => Prompt::Vertex(VertexMode::ActivateKnight),
            State::PromoteKnight => Prompt::Vertex(VertexMode::PromoteKnight),
            State::MoveKnightSource => Prompt::Vertex(VertexMode::KnightSource),
            State::MoveKnightDestination { .. } => Prompt::Vertex(VertexMode::KnightDestination),
            State::DisplaceKnight { .. } => Prompt::Vertex(VertexMode::Displace),
            State::ChooseAttackTarget => Prompt::Vertex(VertexMode::AttackTarget),
            State::ChooseBandit => Prompt::Value(ValueMode::Bandit),
            State::MoveRobber => Prompt::Tile(TileMode::Robber),
            State::MovePirate => Prompt::Tile(TileMode::Pirate),
            State::ChooseVictim { .. } => Prompt::Player(PlayerMode::Victim),
            State::Discard => Prompt::Value(ValueMode::Discard),
            State::PickResource {
                reason: PickReason::Gold,
            } => Prompt::Value(ValueMode::Gold),
            State::PickResource {
                reason: PickReason::Plenty,
            } => Prompt::Value(ValueMode::Plenty),
            State::ChooseMonopoly => Prompt::Value(ValueMode::Monopoly),
            State::ChooseCard => Prompt::Card(CardMode::Play),
            State::PlaceMerchant => Prompt::Tile(TileMode::Merchant),
            State::BankGive => Prompt::Value(ValueMode::BankGive),
            State::BankReceive { .. } => Prompt::Value(ValueMode::BankReceive),
        };
        Some(prompt)
    }
}

/// The legal answers cached on a wait frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Options {
    Moves(Vec<MoveKind>),
    Vertices(Vec<VertexIndex>),
    Routes(Vec<RouteIndex>),
    Tiles(Vec<TileIndex>),
    Players(Vec<PlayerId>),
    Cards(Vec<DevelopmentCard>),
    Values(Vec<EnumValue>),
    Categories(Vec<RouteCategory>),
}

impl Options {
    pub fn len(&self) -> usize {
        match self {
            Options::Moves(v) => v.len(),
            Options::Vertices(v) => v.len(),
            Options::Routes(v) => v.len(),
            Options::Tiles(v) => v.len(),
            Options::Players(v) => v.len(),
            Options::Cards(v) => v.len(),
            Options::Values(v) => v.len(),
            Options::Categories(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `choice` is one of the offered values
    pub fn contains(&self, choice: &Choice) -> bool {
        match (self, choice) {
            (Options::Moves(v), Choice::Move(c)) => v.contains(c),
            (Options::Vertices(v), Choice::Vertex(c)) => v.contains(c),
            (Options::Routes(v), Choice::Route(c)) => v.contains(c),
            (Options::Tiles(v), Choice::Tile(c)) => v.contains(c),
            (Options::Players(v), Choice::Player(c)) => v.contains(c),
            (Options::Cards(v), Choice::Card(c)) => v.contains(c),
            (Options::Values(v), Choice::Value(c)) => v.contains(c),
            (Options::Categories(v), Choice::Category(c)) => v.contains(c),
            _ => false,
        }
    }

    /// Resources offered, wrapped for [`Options::Values`]
    pub(crate) fn resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        Options::Values(resources.into_iter().map(EnumValue::Resource).collect())
    }
}

/// Reverses whatever was done when a cancellable frame was pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Undo {
    /// Give back a cost paid to enter the frame
    Refund { player: PlayerId, cost: ResourceHand },
    /// Put a lifted ship back where it was
    RestoreShip { route: RouteIndex, piece: RoutePiece },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub state: State,
    /// Filled the first time the frame is polled
    pub options: Option<Options>,
    pub undo: Option<Undo>,
}

impl Frame {
    pub fn new(state: State) -> Self {
        Self {
            state,
            options: None,
            undo: None,
        }
    }

    pub fn with_undo(state: State, undo: Undo) -> Self {
        Self {
            state,
            options: None,
            undo: Some(undo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cancellable_states_are_waits() {
        let states = [
            State::PlaceRoad,
            State::MoveShipDestination {
                from: 0,
                piece: RoutePiece::Ship(0),
            },
            State::BankReceive {
                gave: Resource::Ore,
                count: 4,
            },
            State::ChooseCard,
        ];
        for state in states {
            assert!(state.is_cancellable(), "{}", state.name());
            assert!(!state.is_transition(), "{}", state.name());
        }
    }

    #[test]
    fn test_transitions_have_no_prompt() {
        for state in [State::StartRound, State::RollDice, State::SetPlayer(2), State::CheckWinner] {
            assert!(state.is_transition());
            assert!(!state.is_cancellable());
        }
        assert!(!State::TurnMenu.is_transition());
        assert!(!State::TurnMenu.is_cancellable());
        assert!(!State::Discard.is_cancellable());
    }

    #[test]
    fn test_options_contains_checks_kind() {
        let options = Options::Vertices(vec![3, 5]);
        assert!(options.contains(&Choice::Vertex(5)));
        assert!(!options.contains(&Choice::Vertex(4)));
        assert!(!options.contains(&Choice::Route(5)));
        assert_eq!(options.len(), 2);

        let values = Options::resources([Resource::Ore]);
        assert!(values.contains(&Choice::Value(EnumValue::Resource(Resource::Ore))));
        assert!(!Options::Moves(Vec::new()).contains(&Choice::Move(MoveKind::EndTurn)));
    }
}
