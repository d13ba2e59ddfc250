//! Wait states: option sets, polling agents, applying choices.
//!
//! This module contains:
//! - Option set computation for every wait state
//! - Agent polling and validation of the answer
//! - The effect of each accepted choice on board, hands and stack

use super::frame::Prompt;
use super::{Engine, Frame, Options, PickReason, State, TickOutcome, Undo};
use crate::actions::{AttackOutcome, GameEvent, MoveKind};
use crate::agent::{Bandit, Choice, EnumValue, PlayerAgent};
use crate::board::{
    Occupant, PlayerId, Resource, RouteCategory, RouteIndex, RoutePiece, TileKind, VertexIndex,
};
use crate::error::ProtocolError;
use crate::legality;
use crate::player::{DevelopmentCard, ResourceHand};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

impl Engine {
    pub(super) fn step_decision<A: PlayerAgent>(
        &mut self,
        agents: &mut [A],
    ) -> Result<TickOutcome, ProtocolError> {
        let (state, cached) = match self.stack.last() {
            Some(frame) => (frame.state, frame.options.clone()),
            None => return Err(ProtocolError::EmptyStack),
        };
        let fresh = cached.is_none();
        let options = match cached {
            Some(options) => options,
            None => {
                let options = self.options_for(&state);
                trace!(state = state.name(), count = options.len(), "options computed");
                options
            }
        };

        if options.is_empty() {
            warn!(state = state.name(), player = self.current, "no legal options, skipping");
            if let Some(Frame {
                undo: Some(undo), ..
            }) = self.stack.pop()
            {
                self.apply_undo(undo);
            }
            return Ok(TickOutcome::Skipped);
        }

        let found = agents.len();
        let agent = agents
            .get_mut(self.current as usize)
            .ok_or(ProtocolError::AgentCount {
                expected: self.players.len(),
                found,
            })?;
        let Some(choice) = self.poll(agent, &state, &options)? else {
            if fresh {
                if let Some(frame) = self.stack.last_mut() {
                    frame.options = Some(options);
                }
            }
            return Ok(TickOutcome::Pending);
        };
        if !options.contains(&choice) {
            return Err(ProtocolError::ChoiceNotOffered { state: state.name() });
        }

        self.stack.pop();
        debug!(state = state.name(), player = self.current, ?choice, "decided");
        self.apply_choice(state, choice);
        Ok(TickOutcome::Decided)
    }

    fn poll(
        &self,
        agent: &mut dyn PlayerAgent,
        state: &State,
        options: &Options,
    ) -> Result<Option<Choice>, ProtocolError> {
        let mismatch = ProtocolError::MismatchedOptions { state: state.name() };
        let Some(prompt) = state.prompt() else {
            return Err(mismatch);
        };
        let choice = match (prompt, options) {
            (Prompt::Move, Options::Moves(o)) => agent.choose_move(self, o).map(Choice::Move),
            (Prompt::Vertex(mode), Options::Vertices(o)) => {
                agent.choose_vertex(self, o, mode).map(Choice::Vertex)
            }
            (Prompt::Route(mode), Options::Routes(o)) => {
                agent.choose_route(self, o, mode).map(Choice::Route)
            }
            (Prompt::Tile(mode), Options::Tiles(o)) => agent.choose_tile(self, o, mode).map(Choice::Tile),
            (Prompt::Player(mode), Options::Players(o)) => {
                agent.choose_player(self, o, mode).map(Choice::Player)
            }
            (Prompt::Card(mode), Options::Cards(o)) => agent.choose_card(self, o, mode).map(Choice::Card),
            (Prompt::Value(mode), Options::Values(o)) => {
                agent.choose_enum(self, mode, o).map(Choice::Value)
            }
            (Prompt::Category, Options::Categories(o)) => {
                agent.choose_route_category(self, o).map(Choice::Category)
            }
            _ => return Err(mismatch),
        };
        Ok(choice)
    }

    // ==================== Option Sets ====================

    /// Legal answers for a wait state, in ascending order
    pub(crate) fn options_for(&self, state: &State) -> Options {
        let board = &self.board;
        let rules = &self.rules;
        let p = self.current;
        let Some(player) = self.player(p) else {
            return Options::Moves(Vec::new());
        };

        match *state {
            State::SetupSettlement { .. } => Options::Vertices(legality::setup_settlement_spots(board)),
            State::SetupRoute { from } => {
                Options::Routes(legality::setup_route_spots(board, rules, player, from))
            }
            State::ChooseRouteCategory { route } => {
                Options::Categories(legality::route_categories(board, rules, player, route))
            }
            State::TurnMenu => Options::Moves(legality::available_moves(
                board,
                rules,
                player,
                self.deck.is_exhausted(),
            )),
            State::PlaceSettlement => Options::Vertices(legality::settlement_spots(board, p)),
            State::PlaceCity => Options::Vertices(legality::city_spots(board, p)),
            State::PlaceMetropolis => Options::Vertices(legality::metropolis_spots(board, rules, p)),
            State::PlaceRoad => Options::Routes(legality::road_spots(board, p)),
            State::PlaceShip => Options::Routes(legality::ship_spots(board, p, None)),
            State::PlaceFreeRoute => Options::Routes(legality::free_route_spots(board, rules, player)),
            State::MoveShipSource => Options::Routes(legality::movable_ships(board, p)),
            State::MoveShipDestination { from, .. } => {
                Options::Routes(legality::ship_destinations(board, p, from))
            }
            State::UpgradeWarship => Options::Routes(legality::warship_candidates(board, p)),
            State::RepairRoad => Options::Routes(legality::damaged_roads(board, p)),
            State::PlaceKnight => Options::Vertices(legality::knight_build_spots(board, p)),
            State::ActivateKnight => Options::Vertices(legality::inactive_knights(board, p)),
            State::PromoteKnight => Options::Vertices(legality::promotable_knights(board, rules, p)),
            State::MoveKnightSource => Options::Vertices(legality::movable_knights(board, rules, p)),
            State::MoveKnightDestination { from } => {
                Options::Vertices(legality::knight_destinations(board, rules, p, from))
            }
            State::DisplaceKnight { knight, from } => {
                let owner = knight.knight_owner().unwrap_or(p);
                Options::Vertices(legality::displacement_spots(board, owner, from))
            }
            State::ChooseAttackTarget => Options::Vertices(legality::attack_targets(board, p)),
            State::ChooseBandit => {
                let mut values = vec![EnumValue::Bandit(Bandit::Robber)];
                if board.pirate().is_some()
                    && !legality::pirate_tiles(board, rules, &self.players, p).is_empty()
                {
                    values.push(EnumValue::Bandit(Bandit::Pirate));
                }
                Options::Values(values)
            }
            State::MoveRobber => Options::Tiles(legality::robber_tiles(board, rules, &self.players, p)),
            State::MovePirate => Options::Tiles(legality::pirate_tiles(board, rules, &self.players, p)),
            State::ChooseVictim { bandit, tile } => Options::Players(match bandit {
                Bandit::Robber => legality::robber_victims(board, &self.players, p, tile),
                Bandit::Pirate => legality::pirate_victims(board, &self.players, p, tile),
            }),
            State::Discard => Options::resources(player.resources.held()),
            State::PickResource { .. } | State::ChooseMonopoly => Options::resources(Resource::ALL),
            State::ChooseCard => Options::Cards(legality::playable_cards(board, rules, player)),
            State::PlaceMerchant => Options::Tiles(legality::merchant_tiles(board, p)),
            State::BankGive => Options::resources(legality::bank_offers(board, rules, player)),
            State::BankReceive { gave, .. } => {
                Options::resources(Resource::ALL.into_iter().filter(|&r| r != gave))
            }
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
            | State::CheckWinner => Options::Moves(Vec::new()),
        }
    }

    // ==================== Applying Choices ====================

    fn apply_choice(&mut self, state: State, choice: Choice) {
        let p = self.current;
        match (state, choice) {
            (State::SetupSettlement { grants_resources }, Choice::Vertex(v)) => {
                self.settle(v);
                if grants_resources {
                    self.grant_opening(v);
                }
                self.push(State::SetupRoute { from: v });
            }
            (State::SetupRoute { .. } | State::PlaceFreeRoute, Choice::Route(r)) => {
                self.choose_route_piece(r)
            }
            (State::ChooseRouteCategory { route }, Choice::Category(category)) => {
                self.lay_route(route, piece_for(category, p))
            }
            (State::TurnMenu, Choice::Move(kind)) => self.begin_move(kind),

            (State::PlaceSettlement, Choice::Vertex(v)) => self.settle(v),
            (State::PlaceCity, Choice::Vertex(v)) => {
                self.board.set_occupant(v, Occupant::City(p));
                let player = self.current_mut();
                player.cities_remaining = player.cities_remaining.saturating_sub(1);
                player.settlements_remaining += 1;
                self.emit(GameEvent::CityBuilt { player: p, vertex: v });
            }
            (State::PlaceMetropolis, Choice::Vertex(v)) => {
                self.board.set_occupant(v, Occupant::Metropolis(p));
                self.current_mut().cities_remaining += 1;
                info!(player = p, vertex = v, "metropolis built");
                self.emit(GameEvent::MetropolisBuilt { player: p, vertex: v });
            }
            (State::PlaceRoad, Choice::Route(r)) => self.lay_route(r, RoutePiece::Road(p)),
            (State::PlaceShip, Choice::Route(r)) => self.lay_route(r, RoutePiece::Ship(p)),

            (State::MoveShipSource, Choice::Route(from)) => {
                let piece = self.board.route(from).piece;
                self.board.set_route_piece(from, RoutePiece::Open);
                self.push_frame(Frame::with_undo(
                    State::MoveShipDestination { from, piece },
                    Undo::RestoreShip { route: from, piece },
                ));
            }
            (State::MoveShipDestination { from, piece }, Choice::Route(to)) => {
                self.board.set_route_piece(to, piece);
                self.board.set_route_locked(to, true);
                self.emit(GameEvent::ShipMoved { player: p, from, to });
                self.push(State::UpdateLongestRoute);
                self.explore_route(to);
            }
            (State::UpgradeWarship, Choice::Route(r)) => {
                self.board.set_route_piece(r, RoutePiece::Warship(p));
                self.emit(GameEvent::WarshipUpgraded { player: p, route: r });
            }
            (State::RepairRoad, Choice::Route(r)) => {
                self.board.set_route_piece(r, RoutePiece::Road(p));
                self.emit(GameEvent::RoadRepaired { player: p, route: r });
                self.push(State::UpdateLongestRoute);
            }

            (State::PlaceKnight, Choice::Vertex(v)) => {
                self.board.set_occupant(
                    v,
                    Occupant::Knight {
                        owner: p,
                        level: 1,
                        active: false,
                    },
                );
                let player = self.current_mut();
                player.knights_remaining = player.knights_remaining.saturating_sub(1);
                self.emit(GameEvent::KnightBuilt { player: p, vertex: v });
                self.push(State::UpdateLongestRoute);
            }
            (State::ActivateKnight, Choice::Vertex(v)) => {
                if let Occupant::Knight { owner, level, .. } = self.board.vertex(v).occupant {
                    self.board.set_occupant(
                        v,
                        Occupant::Knight {
                            owner,
                            level,
                            active: true,
                        },
                    );
                    self.emit(GameEvent::KnightActivated { player: p, vertex: v });
                }
            }
            (State::PromoteKnight, Choice::Vertex(v)) => {
                if let Occupant::Knight {
                    owner,
                    level,
                    active,
                } = self.board.vertex(v).occupant
                {
                    let level = level + 1;
                    self.board.set_occupant(
                        v,
                        Occupant::Knight {
                            owner,
                            level,
                            active,
                        },
                    );
                    self.emit(GameEvent::KnightPromoted {
                        player: p,
                        vertex: v,
                        level,
                    });
                }
            }
            (State::MoveKnightSource, Choice::Vertex(from)) => {
                self.push(State::MoveKnightDestination { from })
            }
            (State::MoveKnightDestination { from }, Choice::Vertex(to)) => self.move_knight(from, to),
            (State::DisplaceKnight { knight, from }, Choice::Vertex(to)) => {
                self.board.set_occupant(to, knight);
                self.emit(GameEvent::KnightDisplaced {
                    owner: knight.knight_owner().unwrap_or(p),
                    from,
                    to: Some(to),
                });
                self.push(State::UpdateLongestRoute);
            }
            (State::ChooseAttackTarget, Choice::Vertex(v)) => self.attack(v),

            (State::ChooseBandit, Choice::Value(EnumValue::Bandit(bandit))) => self.push(match bandit {
                Bandit::Robber => State::MoveRobber,
                Bandit::Pirate => State::MovePirate,
            }),
            (State::MoveRobber, Choice::Tile(tile)) => {
                let from = self.board.robber();
                self.board.place_robber(tile);
                self.emit(GameEvent::RobberMoved {
                    player: p,
                    from,
                    to: tile,
                });
                if !legality::robber_victims(&self.board, &self.players, p, tile).is_empty() {
                    self.push(State::ChooseVictim {
                        bandit: Bandit::Robber,
                        tile,
                    });
                }
            }
            (State::MovePirate, Choice::Tile(tile)) => {
                let from = self.board.pirate();
                self.board.place_pirate(tile);
                self.emit(GameEvent::PirateMoved {
                    player: Some(p),
                    from,
                    to: tile,
                });
                if !legality::pirate_victims(&self.board, &self.players, p, tile).is_empty() {
                    self.push(State::ChooseVictim {
                        bandit: Bandit::Pirate,
                        tile,
                    });
                }
            }
            (State::ChooseVictim { .. }, Choice::Player(victim)) => self.steal(victim),

            (State::Discard, Choice::Value(EnumValue::Resource(resource))) => {
                self.current_mut()
                    .resources
                    .subtract(&ResourceHand::single(resource, 1));
                self.emit(GameEvent::CardsDiscarded {
                    player: p,
                    resource,
                });
            }
            (State::PickResource { .. }, Choice::Value(EnumValue::Resource(resource))) => {
                self.current_mut().resources.add(resource, 1);
                self.emit(GameEvent::ResourcePicked {
                    player: p,
                    resource,
                });
            }
            (State::ChooseMonopoly, Choice::Value(EnumValue::Resource(resource))) => {
                self.monopolize(resource)
            }
            (State::ChooseCard, Choice::Card(card)) => self.play_card(card),
            (State::PlaceMerchant, Choice::Tile(tile)) => {
                self.board.place_merchant(tile, p);
                self.emit(GameEvent::MerchantPlaced { player: p, tile });
            }
            (State::BankGive, Choice::Value(EnumValue::Resource(gave))) => {
                let count = legality::bank_rate(&self.board, &self.rules, p, gave);
                self.push(State::BankReceive { gave, count });
            }
            (State::BankReceive { gave, count }, Choice::Value(EnumValue::Resource(received))) => {
                let hand = &mut self.current_mut().resources;
                hand.subtract(&ResourceHand::single(gave, count));
                hand.add(received, 1);
                self.emit(GameEvent::MaritimeTradeCompleted {
                    player: p,
                    gave,
                    gave_count: count,
                    received,
                });
            }
            (state, choice) => {
                warn!(state = state.name(), ?choice, "choice does not fit state");
            }
        }
    }

    /// Pay for a menu entry and push its frames. The entry's frame sits on
    /// top of a win check and a fresh menu.
    fn begin_move(&mut self, kind: MoveKind) {
        let next = match kind {
            MoveKind::EndTurn => return,
            MoveKind::BuildRoad => State::PlaceRoad,
            MoveKind::BuildShip => State::PlaceShip,
            MoveKind::BuildSettlement => State::PlaceSettlement,
            MoveKind::BuildCity => State::PlaceCity,
            MoveKind::BuildMetropolis => State::PlaceMetropolis,
            MoveKind::BuildKnight => State::PlaceKnight,
            MoveKind::ActivateKnight => State::ActivateKnight,
            MoveKind::PromoteKnight => State::PromoteKnight,
            MoveKind::MoveKnight => State::MoveKnightSource,
            MoveKind::Attack => State::ChooseAttackTarget,
            MoveKind::MoveShip => State::MoveShipSource,
            MoveKind::UpgradeWarship => State::UpgradeWarship,
            MoveKind::RepairRoad => State::RepairRoad,
            MoveKind::BuyCard => State::DrawCard,
            MoveKind::PlayCard => State::ChooseCard,
            MoveKind::TradeWithBank => State::BankGive,
        };

        self.push(State::TurnMenu);
        self.push(State::CheckWinner);
        let player = self.current;
        let frame = match kind.cost(&self.rules).cloned() {
            Some(cost) => {
                self.current_mut().resources.subtract(&cost);
                if next.is_cancellable() {
                    Frame::with_undo(next, Undo::Refund { player, cost })
                } else {
                    Frame::new(next)
                }
            }
            None => Frame::new(next),
        };
        self.push_frame(frame);
    }

    // ==================== Building ====================

    /// Put a settlement on `v` for the current player
    fn settle(&mut self, v: VertexIndex) {
        let player = self.current;
        self.board.set_occupant(v, Occupant::Settlement(player));
        let hand = self.current_mut();
        hand.settlements_remaining = hand.settlements_remaining.saturating_sub(1);
        self.emit(GameEvent::SettlementBuilt { player, vertex: v });
        self.push(State::UpdateLongestRoute);
        self.explore_around(v);
        self.discover_islands(v);
    }

    /// Opening bonus: one card per adjacent resource tile
    fn grant_opening(&mut self, v: VertexIndex) {
        let player = self.current;
        let kinds: Vec<TileKind> = self
            .board
            .vertex(v)
            .tiles
            .iter()
            .map(|&t| self.board.tile(t).kind)
            .collect();
        let mut totals = BTreeMap::new();
        let mut gold = Vec::new();
        for kind in kinds {
            match kind {
                TileKind::Resource(r) => *totals.entry((player, r)).or_default() += 1,
                TileKind::Gold => gold.push(player),
                _ => {}
            }
        }
        self.credit(totals);
        self.push_gold_picks(gold);
    }

    /// First settlement on an island discovers it. Bonus points only count
    /// once the opening is over.
    fn discover_islands(&mut self, v: VertexIndex) {
        let player = self.current;
        for island in self.board.islands_at(v) {
            if !self.board.mark_discovered(island, player) {
                continue;
            }
            let bonus = if self.setup_complete {
                self.rules.island_bonus
            } else {
                0
            };
            if bonus > 0 {
                self.current_mut().bonus_points += bonus;
                info!(player, island, bonus, "island discovered");
            }
            self.emit(GameEvent::IslandDiscovered {
                player,
                island,
                bonus,
            });
        }
    }

    /// Lay a road or ship, or ask which when both fit
    fn choose_route_piece(&mut self, route: RouteIndex) {
        let p = self.current;
        let categories = match self.player(p) {
            Some(player) => legality::route_categories(&self.board, &self.rules, player, route),
            None => Vec::new(),
        };
        match categories.as_slice() {
            [] => warn!(player = p, route, "no piece fits route"),
            [category] => self.lay_route(route, piece_for(*category, p)),
            _ => self.push(State::ChooseRouteCategory { route }),
        }
    }

    fn lay_route(&mut self, route: RouteIndex, piece: RoutePiece) {
        let player = self.current;
        self.board.set_route_piece(route, piece);
        let hand = self.current_mut();
        if piece.is_ship() {
            hand.ships_remaining = hand.ships_remaining.saturating_sub(1);
            self.board.set_route_locked(route, true);
        } else {
            hand.roads_remaining = hand.roads_remaining.saturating_sub(1);
        }
        self.emit(GameEvent::RouteBuilt {
            player,
            route,
            piece,
        });
        self.push(State::UpdateLongestRoute);
        self.explore_route(route);
    }

    fn explore_route(&mut self, route: RouteIndex) {
        let (from, to) = (self.board.route(route).from, self.board.route(route).to);
        self.explore_around(from);
        self.explore_around(to);
    }

    /// Turn over hidden tiles touching `v`. A revealed resource tile pays
    /// the explorer one card; gold lets them pick one.
    fn explore_around(&mut self, v: VertexIndex) {
        let player = self.current;
        let tiles = self.board.vertex(v).tiles.clone();
        for tile in tiles {
            let Some(kind) = self.board.reveal_tile(tile) else {
                continue;
            };
            self.emit(GameEvent::TileRevealed { player, tile, kind });
            match kind {
                TileKind::Resource(r) => self.credit(BTreeMap::from([((player, r), 1)])),
                TileKind::Gold => self.push_gold_picks(vec![player]),
                _ => {}
            }
        }
    }

    // ==================== Knights ====================

    /// Move a knight along its owner's roads. A weaker knight standing on
    /// `to` is pushed off and its owner picks where it retreats to.
    fn move_knight(&mut self, from: VertexIndex, to: VertexIndex) {
        let Occupant::Knight { owner, level, .. } = self.board.vertex(from).occupant else {
            warn!(vertex = from, "no knight to move");
            return;
        };
        let displaced = self.board.vertex(to).occupant;
        self.board.set_occupant(from, Occupant::Open);
        self.board.set_occupant(
            to,
            Occupant::Knight {
                owner,
                level,
                active: false,
            },
        );
        self.emit(GameEvent::KnightMoved {
            player: owner,
            from,
            to,
        });
        self.push(State::UpdateLongestRoute);

        let Some(victim) = displaced.knight_owner() else {
            return;
        };
        if legality::displacement_spots(&self.board, victim, to).is_empty() {
            if let Some(p) = self.players.get_mut(victim as usize) {
                p.knights_remaining += 1;
            }
            self.emit(GameEvent::KnightDisplaced {
                owner: victim,
                from: to,
                to: None,
            });
        } else {
            self.push_sequence(vec![
                State::SetPlayer(victim),
                State::DisplaceKnight {
                    knight: displaced,
                    from: to,
                },
                State::SetPlayer(self.current),
            ]);
        }
    }

    /// Every adjacent active knight joins in and is spent. Their levels
    /// plus one die decide the outcome; a failed attack costs the
    /// strongest attacker a level.
    fn attack(&mut self, fortress: VertexIndex) {
        let player = self.current;
        let Occupant::PirateFortress { strength } = self.board.vertex(fortress).occupant else {
            warn!(vertex = fortress, "no fortress to attack");
            return;
        };

        let mut score = 0u32;
        let mut strongest: Option<(VertexIndex, u8)> = None;
        for knight in legality::attackers(&self.board, player, fortress) {
            if let Occupant::Knight { owner, level, .. } = self.board.vertex(knight).occupant {
                score += level as u32;
                self.board.set_occupant(
                    knight,
                    Occupant::Knight {
                        owner,
                        level,
                        active: false,
                    },
                );
                if strongest.map_or(true, |(_, best)| level > best) {
                    strongest = Some((knight, level));
                }
            }
        }

        let roll = self.dice.next_die();
        let total = score + roll as u32;
        let outcome = if total >= self.rules.attack_capture
            || (total >= self.rules.attack_weaken && strength <= 1)
        {
            AttackOutcome::Captured
        } else if total >= self.rules.attack_weaken {
            AttackOutcome::Weakened
        } else {
            AttackOutcome::Repelled
        };
        info!(player, vertex = fortress, total, ?outcome, "fortress attacked");
        self.emit(GameEvent::FortressAttacked {
            player,
            vertex: fortress,
            roll,
            strength: strength as u32,
            outcome,
        });

        match outcome {
            AttackOutcome::Captured => {
                self.board.set_routes_closed(fortress, false);
                self.settle(fortress);
            }
            AttackOutcome::Weakened => self.board.place_fortress(fortress, strength - 1),
            AttackOutcome::Repelled => {
                let Some((knight, level)) = strongest else {
                    return;
                };
                if level > 1 {
                    self.board.set_occupant(
                        knight,
                        Occupant::Knight {
                            owner: player,
                            level: level - 1,
                            active: false,
                        },
                    );
                } else {
                    let occupant = self.board.vertex(knight).occupant;
                    self.board.set_occupant(knight, Occupant::Open);
                    self.current_mut().knights_remaining += 1;
                    self.emit(GameEvent::StructureDestroyed {
                        vertex: knight,
                        occupant,
                    });
                    self.push(State::UpdateLongestRoute);
                }
            }
        }
    }

    // ==================== Cards and Theft ====================

    /// Take one card at random from `victim`
    fn steal(&mut self, victim: PlayerId) {
        let thief = self.current;
        let held = self.player(victim).map_or(0, |p| p.resources.total());
        let resource = if held == 0 {
            None
        } else {
            let index = self.dice.gen_range(0..held);
            self.players
                .get_mut(victim as usize)
                .and_then(|p| p.resources.take_nth(index))
        };
        if let Some(r) = resource {
            self.current_mut().resources.add(r, 1);
        }
        debug!(thief, victim, ?resource, "stole");
        self.emit(GameEvent::ResourceStolen {
            thief,
            victim,
            resource,
        });
    }

    fn monopolize(&mut self, resource: Resource) {
        let player = self.current;
        let total_stolen: u32 = self
            .players
            .iter_mut()
            .filter(|p| p.id != player)
            .map(|p| p.resources.take_all(resource))
            .sum();
        self.current_mut().resources.add(resource, total_stolen);
        self.emit(GameEvent::MonopolyPlayed {
            player,
            resource,
            total_stolen,
        });
    }

    fn play_card(&mut self, card: DevelopmentCard) {
        let player = self.current;
        if !self.current_mut().take_card(card) {
            warn!(player, ?card, "card not in hand");
            return;
        }
        self.current_mut().card_played_this_turn = true;
        self.deck.discard(card);
        self.emit(GameEvent::CardPlayed { player, card });

        match card {
            DevelopmentCard::Knight => {
                self.current_mut().played_knights += 1;
                let bandit = self.bandit_state();
                self.push_sequence(vec![bandit, State::UpdateLargestArmy]);
            }
            DevelopmentCard::RoadBuilding => {
                self.push_sequence(vec![State::PlaceFreeRoute, State::PlaceFreeRoute])
            }
            DevelopmentCard::YearOfPlenty => {
                let pick = State::PickResource {
                    reason: PickReason::Plenty,
                };
                self.push_sequence(vec![pick, pick]);
            }
            DevelopmentCard::Monopoly => self.push(State::ChooseMonopoly),
            DevelopmentCard::Merchant => self.push(State::PlaceMerchant),
            DevelopmentCard::VictoryPoint => {}
        }
    }
}

fn piece_for(category: RouteCategory, player: PlayerId) -> RoutePiece {
    match category {
        RouteCategory::Road => RoutePiece::Road(player),
        RouteCategory::Ship => RoutePiece::Ship(player),
    }
}
