use std::time::Duration;

use crate::config::{Difficulty, EngineConfig};
use crate::engine::{evaluate, AiEngine};
use crate::game::Game;
use crate::moves::{Move, Position};
use crate::piece::{Color, PieceType};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct MoveJson {
    from: [i32; 2],
    to: [i32; 2],
}

#[derive(Serialize)]
struct BoardState {
    size: usize,
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    game_over: bool,
    winner: Option<String>,
    legal_moves: Vec<MoveJson>,
    last_move: Option<MoveJson>,
    evaluation: i32,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn piece_type_to_string(pt: PieceType) -> String {
    match pt {
        PieceType::King => "King".to_string(),
        PieceType::Rook => "Rook".to_string(),
        PieceType::Bishop => "Bishop".to_string(),
        PieceType::Knight => "Knight".to_string(),
        PieceType::Pawn => "Pawn".to_string(),
    }
}

fn color_to_string(c: Color) -> String {
    match c {
        Color::White => "White".to_string(),
        Color::Black => "Black".to_string(),
    }
}

fn move_to_json(m: &Move) -> MoveJson {
    MoveJson {
        from: [m.from.row, m.from.col],
        to: [m.to.row, m.to.col],
    }
}

fn build_board_state(game: &Game, last_move: Option<Move>) -> BoardState {
    let board = game.board();
    let size = board.size() as i32;
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..size)
        .map(|r| {
            (0..size)
                .map(|c| {
                    board.piece_at(r, c).map(|p| SquarePiece {
                        piece_type: piece_type_to_string(p.piece_type),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    BoardState {
        size: board.size(),
        squares,
        current_turn: color_to_string(game.current_turn()),
        game_over: game.is_over(),
        winner: game.winner().map(color_to_string),
        legal_moves: game.legal_moves().iter().map(move_to_json).collect(),
        last_move: last_move.as_ref().map(move_to_json),
        evaluation: evaluate(board, game.current_turn()),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Timestamp baked in by build.rs, shown in the page footer.
#[wasm_bindgen]
pub fn build_info() -> String {
    crate::BUILD_TIMESTAMP.to_string()
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    engine: AiEngine,
    last_move: Option<Move>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(size: usize) -> WebGame {
        WebGame {
            game: Game::new(size),
            engine: AiEngine::new(EngineConfig::default()),
            last_move: None,
        }
    }

    /// Replace the engine settings with a JSON config. Returns an error
    /// message on failure and keeps the previous settings.
    pub fn set_config(&mut self, json: &str) -> Option<String> {
        match EngineConfig::from_json_str(json) {
            Ok(config) => {
                self.engine = AiEngine::new(config);
                None
            }
            Err(e) => Some(e.to_string()),
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game, self.last_move))
    }

    pub fn make_move(&mut self, from_row: i32, from_col: i32, to_row: i32, to_col: i32) -> JsValue {
        let mv = Move::new(Position::new(from_row, from_col), Position::new(to_row, to_col));
        match self.game.commit(mv) {
            Ok(_) => {
                self.last_move = Some(mv);
                to_js(&build_board_state(&self.game, self.last_move))
            }
            Err(e) => to_js(&MoveResult {
                board_state: None,
                error: Some(e.to_string()),
            }),
        }
    }

    /// Let the engine play for the side to move. Runs synchronously; the
    /// page should call this from a worker if it must stay responsive.
    pub fn make_ai_move(&mut self, difficulty: &str, budget_ms: u32) -> JsValue {
        let difficulty = match difficulty.parse::<Difficulty>() {
            Ok(d) => d,
            Err(e) => {
                return to_js(&MoveResult {
                    board_state: None,
                    error: Some(e.to_string()),
                })
            }
        };

        if !self.game.is_over() {
            let ticket = self.game.request_search();
            let budget = Duration::from_millis(u64::from(budget_ms));
            if let Some(mv) =
                self.engine
                    .choose_move(self.game.board(), ticket.color, difficulty, budget)
            {
                if self.game.publish(ticket, mv).is_ok() {
                    self.last_move = Some(mv);
                }
            }
        }
        to_js(&build_board_state(&self.game, self.last_move))
    }

    pub fn get_legal_moves_for_square(&self, row: i32, col: i32) -> JsValue {
        let targets: Vec<[i32; 2]> = self
            .game
            .destinations_from(Position::new(row, col))
            .iter()
            .map(|p| [p.row, p.col])
            .collect();
        to_js(&targets)
    }
}
