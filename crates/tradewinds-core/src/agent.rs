//! The player capability interface.
//!
//! The engine never decides anything on a player's behalf. Whenever a wait
//! state is on top of the stack it hands the current player's agent the
//! exact set of legal options and asks for one of them. An agent may answer
//! `None` ("not yet"); the engine then asks again with the same options on
//! the next tick. Answering with something outside the option set is a
//! protocol violation.
//!
//! This module contains:
//! - `PlayerAgent`, the trait the engine polls
//! - Mode enums telling an agent why it is being asked
//! - `Choice`, a tagged answer used by scripted play and the engine itself
//! - `ScriptedAgent`, a queue of canned answers

use crate::actions::MoveKind;
use crate::board::{PlayerId, Resource, RouteCategory, RouteIndex, TileIndex, VertexIndex};
use crate::engine::Engine;
use crate::player::DevelopmentCard;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ==================== Modes ====================

/// Why a vertex is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexMode {
    SetupSettlement,
    Settlement,
    City,
    Metropolis,
    Knight,
    ActivateKnight,
    PromoteKnight,
    KnightSource,
    KnightDestination,
    /// New home for a knight that was pushed off its vertex
    Displace,
    AttackTarget,
}

/// Why a route is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteMode {
    SetupRoute,
    Road,
    Ship,
    /// Road or ship from a road-building card
    FreeRoute,
    ShipSource,
    ShipDestination,
    Warship,
    Repair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileMode {
    Robber,
    Pirate,
    Merchant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    Victim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardMode {
    Play,
}

/// Why an enumerated value is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueMode {
    Discard,
    Gold,
    Plenty,
    Monopoly,
    Bandit,
    BankGive,
    BankReceive,
}

/// Which marker a rolled 7 moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bandit {
    Robber,
    Pirate,
}

/// Values offered through [`PlayerAgent::choose_enum`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumValue {
    Resource(Resource),
    Bandit(Bandit),
}

impl EnumValue {
    pub fn resource(self) -> Option<Resource> {
        match self {
            EnumValue::Resource(r) => Some(r),
            EnumValue::Bandit(_) => None,
        }
    }
}

/// One answer of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    Move(MoveKind),
    Vertex(VertexIndex),
    Route(RouteIndex),
    Tile(TileIndex),
    Player(PlayerId),
    Card(DevelopmentCard),
    Value(EnumValue),
    Category(RouteCategory),
}

// ==================== Capability Trait ====================

/// Something that makes decisions for one seat.
///
/// Every method receives a read-only view of the engine and the legal
/// options, and returns `None` while it is still thinking.
pub trait PlayerAgent {
    fn choose_move(&mut self, view: &Engine, options: &[MoveKind]) -> Option<MoveKind>;

    fn choose_vertex(
        &mut self,
        view: &Engine,
        options: &[VertexIndex],
        mode: VertexMode,
    ) -> Option<VertexIndex>;

    fn choose_route(
        &mut self,
        view: &Engine,
        options: &[RouteIndex],
        mode: RouteMode,
    ) -> Option<RouteIndex>;

    fn choose_tile(&mut self, view: &Engine, options: &[TileIndex], mode: TileMode)
        -> Option<TileIndex>;

    fn choose_player(
        &mut self,
        view: &Engine,
        options: &[PlayerId],
        mode: PlayerMode,
    ) -> Option<PlayerId>;

    fn choose_card(
        &mut self,
        view: &Engine,
        options: &[DevelopmentCard],
        mode: CardMode,
    ) -> Option<DevelopmentCard>;

    fn choose_enum(
        &mut self,
        view: &Engine,
        mode: ValueMode,
        options: &[EnumValue],
    ) -> Option<EnumValue>;

    fn choose_route_category(
        &mut self,
        view: &Engine,
        options: &[RouteCategory],
    ) -> Option<RouteCategory>;

    /// Fill `dice` with fixed values instead of drawing from the engine's
    /// sequence. Returns whether it did.
    fn supply_dice(&mut self, dice: &mut [u8]) -> bool {
        let _ = dice;
        false
    }
}

impl<T: PlayerAgent + ?Sized> PlayerAgent for Box<T> {
    fn choose_move(&mut self, view: &Engine, options: &[MoveKind]) -> Option<MoveKind> {
        (**self).choose_move(view, options)
    }

    fn choose_vertex(
        &mut self,
        view: &Engine,
        options: &[VertexIndex],
        mode: VertexMode,
    ) -> Option<VertexIndex> {
        (**self).choose_vertex(view, options, mode)
    }

    fn choose_route(
        &mut self,
        view: &Engine,
        options: &[RouteIndex],
        mode: RouteMode,
    ) -> Option<RouteIndex> {
        (**self).choose_route(view, options, mode)
    }

    fn choose_tile(
        &mut self,
        view: &Engine,
        options: &[TileIndex],
        mode: TileMode,
    ) -> Option<TileIndex> {
        (**self).choose_tile(view, options, mode)
    }

    fn choose_player(
        &mut self,
        view: &Engine,
        options: &[PlayerId],
        mode: PlayerMode,
    ) -> Option<PlayerId> {
        (**self).choose_player(view, options, mode)
    }

    fn choose_card(
        &mut self,
        view: &Engine,
        options: &[DevelopmentCard],
        mode: CardMode,
    ) -> Option<DevelopmentCard> {
        (**self).choose_card(view, options, mode)
    }

    fn choose_enum(
        &mut self,
        view: &Engine,
        mode: ValueMode,
        options: &[EnumValue],
    ) -> Option<EnumValue> {
        (**self).choose_enum(view, mode, options)
    }

    fn choose_route_category(
        &mut self,
        view: &Engine,
        options: &[RouteCategory],
    ) -> Option<RouteCategory> {
        (**self).choose_route_category(view, options)
    }

    fn supply_dice(&mut self, dice: &mut [u8]) -> bool {
        (**self).supply_dice(dice)
    }
}

// ==================== Scripted Agent ====================

/// Replays queued choices in order.
///
/// When the front of the queue does not fit the question being asked, the
/// agent answers "not yet", or the first offered option if fallback is on.
/// The wasm wrapper uses one of these as a mailbox for a human player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedAgent {
    choices: VecDeque<Choice>,
    dice: VecDeque<(u8, u8)>,
    fallback: bool,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent that takes the first option whenever its queue has nothing
    /// suitable
    pub fn with_fallback() -> Self {
        Self {
            fallback: true,
            ..Self::default()
        }
    }

    pub fn set_fallback(&mut self, fallback: bool) {
        self.fallback = fallback;
    }

    pub fn push(&mut self, choice: Choice) {
        self.choices.push_back(choice);
    }

    pub fn extend(&mut self, choices: impl IntoIterator<Item = Choice>) {
        self.choices.extend(choices);
    }

    /// Queue a fixed roll for the next dice request
    pub fn push_dice(&mut self, first: u8, second: u8) {
        self.dice.push_back((first, second));
    }

    /// Choices not yet consumed
    pub fn queued(&self) -> usize {
        self.choices.len()
    }

    pub fn clear(&mut self) {
        self.choices.clear();
        self.dice.clear();
    }

    fn answer<T: Copy>(&mut self, options: &[T], pick: impl Fn(&Choice) -> Option<T>) -> Option<T> {
        if let Some(value) = self.choices.front().and_then(&pick) {
            self.choices.pop_front();
            return Some(value);
        }
        if self.fallback {
            options.first().copied()
        } else {
            None
        }
    }
}

impl PlayerAgent for ScriptedAgent {
    fn choose_move(&mut self, _view: &Engine, options: &[MoveKind]) -> Option<MoveKind> {
        self.answer(options, |c| match c {
            Choice::Move(m) => Some(*m),
            _ => None,
        })
    }

    fn choose_vertex(
        &mut self,
        _view: &Engine,
        options: &[VertexIndex],
        _mode: VertexMode,
    ) -> Option<VertexIndex> {
        self.answer(options, |c| match c {
            Choice::Vertex(v) => Some(*v),
            _ => None,
        })
    }

    fn choose_route(
        &mut self,
        _view: &Engine,
        options: &[RouteIndex],
        _mode: RouteMode,
    ) -> Option<RouteIndex> {
        self.answer(options, |c| match c {
            Choice::Route(r) => Some(*r),
            _ => None,
        })
    }

    fn choose_tile(
        &mut self,
        _view: &Engine,
        options: &[TileIndex],
        _mode: TileMode,
    ) -> Option<TileIndex> {
        self.answer(options, |c| match c {
            Choice::Tile(t) => Some(*t),
            _ => None,
        })
    }

    fn choose_player(
        &mut self,
        _view: &Engine,
        options: &[PlayerId],
        _mode: PlayerMode,
    ) -> Option<PlayerId> {
        self.answer(options, |c| match c {
            Choice::Player(p) => Some(*p),
            _ => None,
        })
    }

    fn choose_card(
        &mut self,
        _view: &Engine,
        options: &[DevelopmentCard],
        _mode: CardMode,
    ) -> Option<DevelopmentCard> {
        self.answer(options, |c| match c {
            Choice::Card(card) => Some(*card),
            _ => None,
        })
    }

    fn choose_enum(
        &mut self,
        _view: &Engine,
        _mode: ValueMode,
        options: &[EnumValue],
    ) -> Option<EnumValue> {
        self.answer(options, |c| match c {
            Choice::Value(v) => Some(*v),
            _ => None,
        })
    }

    fn choose_route_category(
        &mut self,
        _view: &Engine,
        options: &[RouteCategory],
    ) -> Option<RouteCategory> {
        self.answer(options, |c| match c {
            Choice::Category(k) => Some(*k),
            _ => None,
        })
    }

    fn supply_dice(&mut self, dice: &mut [u8]) -> bool {
        if dice.len() < 2 {
            return false;
        }
        match self.dice.pop_front() {
            Some((a, b)) => {
                dice[0] = a;
                dice[1] = b;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut agent = ScriptedAgent::new();
        agent.extend([Choice::Vertex(4), Choice::Route(9)]);

        assert_eq!(
            agent.answer(&[1, 4], |c| match c {
                Choice::Route(r) => Some(*r),
                _ => None,
            }),
            None
        );
        assert_eq!(
            agent.answer(&[1, 4], |c| match c {
                Choice::Vertex(v) => Some(*v),
                _ => None,
            }),
            Some(4)
        );
        assert_eq!(agent.queued(), 1);
    }

    #[test]
    fn test_fallback_takes_first_option() {
        let mut agent = ScriptedAgent::with_fallback();
        let pick = |c: &Choice| match c {
            Choice::Tile(t) => Some(*t),
            _ => None,
        };
        assert_eq!(agent.answer(&[7, 3], pick), Some(7));
        assert_eq!(agent.answer(&[] as &[usize], pick), None);
    }

    #[test]
    fn test_supplied_dice() {
        let mut agent = ScriptedAgent::new();
        let mut dice = [0u8; 2];
        assert!(!agent.supply_dice(&mut dice));

        agent.push_dice(3, 4);
        assert!(agent.supply_dice(&mut dice));
        assert_eq!(dice, [3, 4]);
        assert!(!agent.supply_dice(&mut dice));
    }

    #[test]
    fn test_enum_value_resource() {
        assert_eq!(EnumValue::Resource(Resource::Ore).resource(), Some(Resource::Ore));
        assert_eq!(EnumValue::Bandit(Bandit::Pirate).resource(), None);
    }
}
