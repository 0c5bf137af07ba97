use std::fmt;

use serde::{Deserialize, Serialize};

use crate::moves::{Move, Position};
use crate::piece::{Color, Piece, PieceType};

/// A square grid of cells, each holding at most one piece.
///
/// Row 0 is Black's back rank and row `size - 1` is White's. A piece's
/// position is the index of the cell holding it; nothing else records it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    size: usize,
    squares: Vec<Vec<Option<Piece>>>,
}

impl Board {
    /// Create an empty `size`×`size` board. Call `setup_initial_position`
    /// to place the pieces.
    pub fn new(size: usize) -> Self {
        Board {
            size,
            squares: vec![vec![None; size]; size],
        }
    }

    /// Convenience for `new` followed by `setup_initial_position`.
    pub fn with_initial_position(size: usize) -> Self {
        let mut board = Board::new(size);
        board.setup_initial_position();
        board
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Place the starting army for this board size.
    ///
    /// 5×5: R N K N R with pawns on the odd files.
    /// 7×7: R N B K B N R with pawns on the odd files.
    /// Anything else: just the two kings, centred on the back ranks.
    pub fn setup_initial_position(&mut self) {
        for row in &mut self.squares {
            row.fill(None);
        }

        let back_rank: &[PieceType] = match self.size {
            5 => &[
                PieceType::Rook,
                PieceType::Knight,
                PieceType::King,
                PieceType::Knight,
                PieceType::Rook,
            ],
            7 => &[
                PieceType::Rook,
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::King,
                PieceType::Bishop,
                PieceType::Knight,
                PieceType::Rook,
            ],
            _ => {
                let mid = (self.size / 2) as i32;
                let last = self.size as i32 - 1;
                self.set_piece(Position::new(0, mid), Some(Piece::new(PieceType::King, Color::Black)));
                self.set_piece(Position::new(last, mid), Some(Piece::new(PieceType::King, Color::White)));
                return;
            }
        };

        let last = self.size as i32 - 1;
        for (c, &pt) in back_rank.iter().enumerate() {
            let c = c as i32;
            self.set_piece(Position::new(0, c), Some(Piece::new(pt, Color::Black)));
            self.set_piece(Position::new(last, c), Some(Piece::new(pt, Color::White)));
        }
        for c in (1..last).step_by(2) {
            self.set_piece(Position::new(1, c), Some(Piece::new(PieceType::Pawn, Color::Black)));
            self.set_piece(Position::new(last - 1, c), Some(Piece::new(PieceType::Pawn, Color::White)));
        }
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.is_valid(self.size as i32)
    }

    pub fn piece_at(&self, row: i32, col: i32) -> Option<Piece> {
        if !self.is_valid_position(Position::new(row, col)) {
            return None;
        }
        self.squares[row as usize][col as usize]
    }

    /// Overwrite a cell. Off-board positions are ignored.
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        if self.is_valid_position(pos) {
            self.squares[pos.row as usize][pos.col as usize] = piece;
        }
    }

    /// The centre cell used by the engine's positional terms. Both axes use
    /// `(size - 1) / 2`.
    pub fn center(&self) -> Position {
        let c = (self.size as i32 - 1) / 2;
        Position::new(c, c)
    }

    /// All occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| {
                cell.map(|p| (Position::new(r as i32, c as i32), p))
            })
        })
    }

    /// Every move available to `color`, scanning the grid row by row. The
    /// order is stable so searches over the same position are reproducible.
    pub fn generate_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, piece) in self.pieces() {
            if piece.color != color {
                continue;
            }
            for to in piece.possible_moves(from, self) {
                moves.push(Move::new(from, to));
            }
        }
        moves
    }

    /// Move the piece at `from` to `to` without any legality check and return
    /// whatever stood on `to`. Only pass moves produced by `generate_moves`
    /// for the current position.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let (fr, fc) = (mv.from.row as usize, mv.from.col as usize);
        let (tr, tc) = (mv.to.row as usize, mv.to.col as usize);
        let piece = self.squares[fr][fc].take();
        std::mem::replace(&mut self.squares[tr][tc], piece)
    }

    /// Reverse `apply(mv)`, putting `captured` back on the destination.
    pub fn undo(&mut self, mv: &Move, captured: Option<Piece>) {
        let (fr, fc) = (mv.from.row as usize, mv.from.col as usize);
        let (tr, tc) = (mv.to.row as usize, mv.to.col as usize);
        let piece = std::mem::replace(&mut self.squares[tr][tc], captured);
        self.squares[fr][fc] = piece;
    }

    /// Commit a move. Unlike `apply`, both endpoints are bounds-checked; an
    /// invalid endpoint makes this a no-op returning `None`.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        if !self.is_valid_position(from) || !self.is_valid_position(to) {
            return None;
        }
        self.apply(&Move::new(from, to))
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.pieces()
            .any(|(_, p)| p.piece_type == PieceType::King && p.color == color)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.squares {
            let line: String = row
                .iter()
                .map(|cell| cell.map(|p| p.symbol()).unwrap_or('.'))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
