//! WebAssembly bindings for the turn engine.
//!
//! JavaScript drives the game by polling: call `tick` (or `run`) until the
//! engine is pending, read the prompt, answer it with `submitChoice`, then
//! tick again. Bot seats answer on their own.

use wasm_bindgen::prelude::*;

use crate::actions::{GameEvent, MoveKind};
use crate::agent::{
    CardMode, Choice, EnumValue, PlayerAgent, PlayerMode, RouteMode, ScriptedAgent, TileMode,
    ValueMode, VertexMode,
};
use crate::board::{Board, PlayerId, RouteCategory, RouteIndex, TileIndex, VertexIndex};
use crate::bot::{Bot, BotDifficulty};
use crate::engine::{Engine, TickOutcome};
use crate::player::{DevelopmentCard, Player};
use crate::rules::Rules;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Who answers for a seat
enum Seat {
    /// Answers come from `submitChoice`
    Human(ScriptedAgent),
    Bot(Bot),
}

impl Seat {
    fn agent(&mut self) -> &mut dyn PlayerAgent {
        match self {
            Seat::Human(mailbox) => mailbox,
            Seat::Bot(bot) => bot,
        }
    }
}

impl PlayerAgent for Seat {
    fn choose_move(&mut self, view: &Engine, options: &[MoveKind]) -> Option<MoveKind> {
        self.agent().choose_move(view, options)
    }

    fn choose_vertex(&mut self, view: &Engine, options: &[VertexIndex], mode: VertexMode) -> Option<VertexIndex> {
        self.agent().choose_vertex(view, options, mode)
    }

    fn choose_route(&mut self, view: &Engine, options: &[RouteIndex], mode: RouteMode) -> Option<RouteIndex> {
        self.agent().choose_route(view, options, mode)
    }

    fn choose_tile(&mut self, view: &Engine, options: &[TileIndex], mode: TileMode) -> Option<TileIndex> {
        self.agent().choose_tile(view, options, mode)
    }

    fn choose_player(&mut self, view: &Engine, options: &[PlayerId], mode: PlayerMode) -> Option<PlayerId> {
        self.agent().choose_player(view, options, mode)
    }

    fn choose_card(
        &mut self,
        view: &Engine,
        options: &[DevelopmentCard],
        mode: CardMode,
    ) -> Option<DevelopmentCard> {
        self.agent().choose_card(view, options, mode)
    }

    fn choose_enum(&mut self, view: &Engine, mode: ValueMode, options: &[EnumValue]) -> Option<EnumValue> {
        self.agent().choose_enum(view, mode, options)
    }

    fn choose_route_category(&mut self, view: &Engine, options: &[RouteCategory]) -> Option<RouteCategory> {
        self.agent().choose_route_category(view, options)
    }

    fn supply_dice(&mut self, dice: &mut [u8]) -> bool {
        self.agent().supply_dice(dice)
    }
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: Engine,
    seats: Vec<Seat>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game. `board_kind` is `"standard"` or `"archipelago"`;
    /// an empty `rules_json` picks the board's usual rules.
    #[wasm_bindgen(constructor)]
    pub fn new(player_names_json: &str, board_kind: &str, rules_json: &str, seed: u64) -> Result<WasmGame, JsValue> {
        let names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let (board, default_rules) = match board_kind {
            "archipelago" => (Board::archipelago_with_rng(&mut rng), Rules::seafarers()),
            _ => (Board::standard_with_rng(&mut rng), Rules::default()),
        };
        let rules = if rules_json.trim().is_empty() {
            default_rules
        } else {
            Rules::from_json(rules_json).map_err(|e| JsValue::from_str(&format!("Invalid rules: {}", e)))?
        };

        let players: Vec<Player> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();
        let seats = players.iter().map(|_| Seat::Human(ScriptedAgent::new())).collect();
        let engine = Engine::new(board, rules, players, seed).map_err(js_error)?;
        Ok(WasmGame { engine, seats })
    }

    /// Hand a seat to a bot: "Easy" or "Medium"
    #[wasm_bindgen(js_name = setBot)]
    pub fn set_bot(&mut self, player: u8, difficulty: &str) -> Result<(), JsValue> {
        let difficulty = match difficulty {
            "Easy" => BotDifficulty::Easy,
            _ => BotDifficulty::Medium,
        };
        let seat = self
            .seats
            .get_mut(player as usize)
            .ok_or_else(|| JsValue::from_str("No such player"))?;
        *seat = Seat::Bot(Bot::new(player, difficulty));
        Ok(())
    }

    /// Queue an answer for a human seat
    #[wasm_bindgen(js_name = submitChoice)]
    pub fn submit_choice(&mut self, player: u8, choice_json: &str) -> Result<(), JsValue> {
        let choice: Choice = serde_json::from_str(choice_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid choice JSON: {}", e)))?;
        match self.seats.get_mut(player as usize) {
            Some(Seat::Human(mailbox)) => {
                mailbox.push(choice);
                Ok(())
            }
            Some(Seat::Bot(_)) => Err(JsValue::from_str("Seat is played by a bot")),
            None => Err(JsValue::from_str("No such player")),
        }
    }

    /// Fix the next roll for a human seat (physical dice)
    #[wasm_bindgen(js_name = supplyDice)]
    pub fn supply_dice(&mut self, player: u8, first: u8, second: u8) -> Result<(), JsValue> {
        match self.seats.get_mut(player as usize) {
            Some(Seat::Human(mailbox)) => {
                mailbox.push_dice(first, second);
                Ok(())
            }
            _ => Err(JsValue::from_str("Not a human seat")),
        }
    }

    /// Process one frame; returns the events it produced as JSON
    pub fn tick(&mut self) -> Result<String, JsValue> {
        let mut events: Vec<GameEvent> = Vec::new();
        self.engine.tick(&mut self.seats, &mut events).map_err(js_error)?;
        serde_json::to_string(&events).map_err(js_error)
    }

    /// Tick until someone must answer or the game ends
    pub fn run(&mut self, max_ticks: usize) -> Result<String, JsValue> {
        let mut events: Vec<GameEvent> = Vec::new();
        self.engine
            .run(&mut self.seats, &mut events, max_ticks)
            .map_err(js_error)?;
        serde_json::to_string(&events).map_err(js_error)
    }

    /// Whether the last tick is waiting on a human
    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.engine
            .frames()
            .last()
            .map_or(false, |frame| frame.options.is_some())
    }

    /// The top frame (state and offered options) as JSON
    #[wasm_bindgen(js_name = getPrompt)]
    pub fn get_prompt(&self) -> String {
        match self.engine.frames().last() {
            Some(frame) => serde_json::to_string(frame).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    #[wasm_bindgen(js_name = canCancel)]
    pub fn can_cancel(&self) -> bool {
        self.engine.can_cancel()
    }

    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.engine.cancel().map_err(js_error)
    }

    /// Get the current player ID
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.engine.current_player()
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.engine.winner().is_some()
    }

    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.engine.winner()
    }

    #[wasm_bindgen(js_name = getVictoryPoints)]
    pub fn get_victory_points(&self, player: u8) -> u32 {
        self.engine.victory_points(player)
    }

    #[wasm_bindgen(js_name = getDiceRoll)]
    pub fn get_dice_roll(&self) -> Option<Vec<u8>> {
        self.engine.last_roll().map(|(a, b)| vec![a, b])
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        serde_json::to_string(self.engine.board()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, player: u8) -> String {
        match self.engine.player(player) {
            Some(p) => serde_json::to_string(p).unwrap_or_else(|_| "{}".to_string()),
            None => "null".to_string(),
        }
    }

    /// Save the whole game as a snapshot
    #[wasm_bindgen(js_name = saveGame)]
    pub fn save_game(&self) -> Result<String, JsValue> {
        self.engine.snapshot().to_json().map_err(js_error)
    }

    /// Resume a saved game; every seat comes back as a human mailbox
    #[wasm_bindgen(js_name = loadGame)]
    pub fn load_game(snapshot_json: &str) -> Result<WasmGame, JsValue> {
        let engine = crate::snapshot::Snapshot::from_json(snapshot_json)
            .and_then(|s| s.restore())
            .map_err(js_error)?;
        let seats = engine
            .players()
            .iter()
            .map(|_| Seat::Human(ScriptedAgent::new()))
            .collect();
        Ok(WasmGame { engine, seats })
    }
}

impl WasmGame {
    /// Outcome of one tick, for native callers
    pub fn step(&mut self, sink: &mut Vec<GameEvent>) -> Result<TickOutcome, crate::error::ProtocolError> {
        self.engine.tick(&mut self.seats, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_human_seat_waits_for_mailbox() {
        let mut game = WasmGame::new(r#"["Ana", "Bo"]"#, "standard", "", 3).unwrap();
        let mut events = Vec::new();
        let mut outcome = TickOutcome::Advanced;
        for _ in 0..50 {
            outcome = game.step(&mut events).unwrap();
            if outcome == TickOutcome::Pending {
                break;
            }
        }
        assert_eq!(outcome, TickOutcome::Pending);
        assert!(game.is_pending());
        assert!(game.submit_choice(0, "{\"Vertex\": 0}").is_ok());
    }

    #[test]
    fn test_bot_seats_play_on() {
        let mut game = WasmGame::new(r#"["Ana", "Bo"]"#, "standard", "", 3).unwrap();
        game.set_bot(0, "Medium").unwrap();
        game.set_bot(1, "Easy").unwrap();
        game.run(500).unwrap();
        assert!(game.engine.is_setup_complete());
    }
}
