//! The authoritative game: one board, whose turn it is, and who has won.
//!
//! Every committed move goes through [`Game::commit`], whether it came from a
//! player or from the engine. Engine moves arrive through [`Game::publish`]
//! together with the [`SearchTicket`] the search was started with, so a result
//! that no longer fits the game (the player moved first, or a newer search
//! was started) is refused instead of applied.

use log::{info, warn};
use thiserror::Error;

use crate::board::Board;
use crate::moves::{Move, Position};
use crate::piece::{Color, Piece, PieceType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,

    #[error("no {color:?} piece on {pos}")]
    NotYourPiece { pos: Position, color: Color },

    #[error("illegal move {0}")]
    Illegal(Move),

    #[error("stale search result for {color:?} (generation {generation})")]
    StaleSearch { color: Color, generation: u64 },
}

/// Identifies one search request: the side it was started for and the
/// generation counter at that time. Only the newest ticket can be published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    pub color: Color,
    pub generation: u64,
}

/// What a committed move did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mv: Move,
    pub captured: Option<Piece>,
    /// Set when the move captured the opposing king.
    pub winner: Option<Color>,
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    current_turn: Color,
    winner: Option<Color>,
    ply: u32,
    generation: u64,
}

impl Game {
    /// A fresh game on a `size`×`size` board. White moves first.
    pub fn new(size: usize) -> Self {
        Game::from_board(Board::with_initial_position(size), Color::White)
    }

    pub fn from_board(board: Board, to_move: Color) -> Self {
        Game {
            board,
            current_turn: to_move,
            winner: None,
            ply: 0,
            generation: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Number of moves committed so far.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        self.board.generate_moves(self.current_turn)
    }

    /// Where the side to move's piece on `pos` can go. Empty for an empty
    /// square, an enemy piece, or a finished game.
    pub fn destinations_from(&self, pos: Position) -> Vec<Position> {
        if self.is_over() {
            return Vec::new();
        }
        match self.board.piece_at(pos.row, pos.col) {
            Some(p) if p.color == self.current_turn => p.possible_moves(pos, &self.board),
            _ => Vec::new(),
        }
    }

    /// Play `mv` for the side to move. Capturing the king ends the game;
    /// otherwise the turn passes. Any outstanding search becomes stale.
    pub fn commit(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        match self.board.piece_at(mv.from.row, mv.from.col) {
            Some(p) if p.color == self.current_turn => {}
            _ => {
                return Err(MoveError::NotYourPiece {
                    pos: mv.from,
                    color: self.current_turn,
                })
            }
        }
        if !self.board.generate_moves(self.current_turn).contains(&mv) {
            return Err(MoveError::Illegal(mv));
        }

        let captured = self.board.move_piece(mv.from, mv.to);
        self.ply += 1;
        self.generation += 1;

        let winner = match captured {
            Some(p) if p.piece_type == PieceType::King => {
                info!("{:?} captured the king with {mv} after {} plies", self.current_turn, self.ply);
                self.winner = Some(self.current_turn);
                self.winner
            }
            _ => {
                self.current_turn = self.current_turn.opposite();
                None
            }
        };

        Ok(MoveOutcome { mv, captured, winner })
    }

    /// Start a new search request for the side to move. Earlier tickets
    /// become stale.
    pub fn request_search(&mut self) -> SearchTicket {
        self.generation += 1;
        SearchTicket {
            color: self.current_turn,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        !self.is_over() && ticket.generation == self.generation && ticket.color == self.current_turn
    }

    /// Commit an engine move, unless the ticket it was searched under is no
    /// longer current. A stale result leaves the game untouched.
    pub fn publish(&mut self, ticket: SearchTicket, mv: Move) -> Result<MoveOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if !self.is_current(ticket) {
            warn!(
                "discarding stale {:?} search result {mv} (generation {}, now {})",
                ticket.color, ticket.generation, self.generation
            );
            return Err(MoveError::StaleSearch {
                color: ticket.color,
                generation: ticket.generation,
            });
        }
        self.commit(mv)
    }
}
