use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::Position;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row step of a pawn of this color. White marches toward row 0.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum PieceType {
    King,
    Rook,
    Knight,
    Bishop,
    Pawn,
}

impl PieceType {
    /// Single-letter symbol, uppercase.
    pub fn symbol(self) -> char {
        match self {
            PieceType::King => 'K',
            PieceType::Rook => 'R',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Pawn => 'P',
        }
    }
}

const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// A piece is only its type and color. Where it stands is whatever grid cell
/// holds it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }

    /// Board symbol: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        let c = self.piece_type.symbol();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Destinations reachable by this piece standing on `origin`.
    pub fn possible_moves(&self, origin: Position, board: &Board) -> Vec<Position> {
        let mut moves = Vec::new();
        match self.piece_type {
            PieceType::King => self.step_moves(origin, board, &KING_STEPS, &mut moves),
            PieceType::Knight => self.step_moves(origin, board, &KNIGHT_JUMPS, &mut moves),
            PieceType::Rook => self.sliding_moves(origin, board, &ORTHOGONAL, &mut moves),
            PieceType::Bishop => self.sliding_moves(origin, board, &DIAGONAL, &mut moves),
            PieceType::Pawn => self.pawn_moves(origin, board, &mut moves),
        }
        moves
    }

    /// A target is admissible when it is on the board and not held by a
    /// piece of our own color.
    pub fn can_move(&self, target: Position, board: &Board) -> bool {
        if !board.is_valid_position(target) {
            return false;
        }
        match board.piece_at(target.row, target.col) {
            Some(p) => p.color != self.color,
            None => true,
        }
    }

    fn step_moves(
        &self,
        origin: Position,
        board: &Board,
        offsets: &[(i32, i32)],
        moves: &mut Vec<Position>,
    ) {
        for &(dr, dc) in offsets {
            let target = origin.offset(dr, dc);
            if self.can_move(target, board) {
                moves.push(target);
            }
        }
    }

    fn sliding_moves(
        &self,
        origin: Position,
        board: &Board,
        directions: &[(i32, i32)],
        moves: &mut Vec<Position>,
    ) {
        for &(dr, dc) in directions {
            let mut target = origin.offset(dr, dc);
            while board.is_valid_position(target) {
                if let Some(p) = board.piece_at(target.row, target.col) {
                    if p.color != self.color {
                        moves.push(target);
                    }
                    break;
                }
                moves.push(target);
                target = target.offset(dr, dc);
            }
        }
    }

    // One step forward onto an empty square, or one step diagonally forward
    // onto an enemy. No double step, promotion or en passant.
    fn pawn_moves(&self, origin: Position, board: &Board, moves: &mut Vec<Position>) {
        let dir = self.color.pawn_direction();

        let forward = origin.offset(dir, 0);
        if board.is_valid_position(forward) && board.piece_at(forward.row, forward.col).is_none() {
            moves.push(forward);
        }

        for dc in [-1, 1] {
            let target = origin.offset(dir, dc);
            if let Some(p) = board.piece_at(target.row, target.col) {
                if p.color != self.color {
                    moves.push(target);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: usize, pieces: &[(i32, i32, PieceType, Color)]) -> Board {
        let mut board = Board::new(size);
        for &(r, c, pt, color) in pieces {
            board.set_piece(Position::new(r, c), Some(Piece::new(pt, color)));
        }
        board
    }

    fn sorted(mut v: Vec<Position>) -> Vec<Position> {
        v.sort_by_key(|p| (p.row, p.col));
        v
    }

    #[test]
    fn king_in_corner_has_three_moves() {
        let board = board_with(5, &[(0, 0, PieceType::King, Color::White)]);
        let king = Piece::new(PieceType::King, Color::White);
        let moves = sorted(king.possible_moves(Position::new(0, 0), &board));
        assert_eq!(moves, vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]);
    }

    #[test]
    fn king_captures_enemy_but_not_friend() {
        let board = board_with(
            5,
            &[
                (2, 2, PieceType::King, Color::White),
                (1, 2, PieceType::Pawn, Color::White),
                (3, 2, PieceType::Pawn, Color::Black),
            ],
        );
        let king = Piece::new(PieceType::King, Color::White);
        let moves = king.possible_moves(Position::new(2, 2), &board);
        assert_eq!(moves.len(), 7);
        assert!(!moves.contains(&Position::new(1, 2)), "own pawn square must be excluded");
        assert!(moves.contains(&Position::new(3, 2)), "enemy pawn square is a capture");
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let board = board_with(
            5,
            &[
                (2, 2, PieceType::Knight, Color::White),
                (1, 2, PieceType::Pawn, Color::White),
                (2, 1, PieceType::Pawn, Color::White),
                (2, 3, PieceType::Pawn, Color::White),
                (3, 2, PieceType::Pawn, Color::White),
            ],
        );
        let knight = Piece::new(PieceType::Knight, Color::White);
        assert_eq!(knight.possible_moves(Position::new(2, 2), &board).len(), 8);
    }

    #[test]
    fn rook_ray_stops_before_friendly_blocker() {
        // Friendly blocker three squares to the right: only the two empties.
        let board = board_with(
            7,
            &[
                (3, 0, PieceType::Rook, Color::White),
                (3, 3, PieceType::Knight, Color::White),
            ],
        );
        let rook = Piece::new(PieceType::Rook, Color::White);
        let moves = rook.possible_moves(Position::new(3, 0), &board);
        let along_row: Vec<_> = moves.iter().filter(|p| p.row == 3).copied().collect();
        assert_eq!(sorted(along_row), vec![Position::new(3, 1), Position::new(3, 2)]);
    }

    #[test]
    fn rook_ray_includes_enemy_blocker() {
        let board = board_with(
            7,
            &[
                (3, 0, PieceType::Rook, Color::White),
                (3, 3, PieceType::Knight, Color::Black),
            ],
        );
        let rook = Piece::new(PieceType::Rook, Color::White);
        let moves = rook.possible_moves(Position::new(3, 0), &board);
        let along_row: Vec<_> = moves.iter().filter(|p| p.row == 3).copied().collect();
        assert_eq!(
            sorted(along_row),
            vec![Position::new(3, 1), Position::new(3, 2), Position::new(3, 3)]
        );
    }

    #[test]
    fn bishop_follows_the_same_blocking_rule() {
        for (blocker, expect_capture) in [(Color::Black, true), (Color::White, false)] {
            let board = board_with(
                7,
                &[
                    (6, 0, PieceType::Bishop, Color::White),
                    (3, 3, PieceType::Pawn, blocker),
                ],
            );
            let bishop = Piece::new(PieceType::Bishop, Color::White);
            let moves = sorted(bishop.possible_moves(Position::new(6, 0), &board));
            let mut expected = vec![Position::new(4, 2), Position::new(5, 1)];
            if expect_capture {
                expected.insert(0, Position::new(3, 3));
            }
            assert_eq!(moves, expected, "blocker color {blocker:?}");
        }
    }

    #[test]
    fn pawn_moves_forward_only_onto_empty_square() {
        let board = board_with(
            5,
            &[
                (3, 1, PieceType::Pawn, Color::White),
                (2, 1, PieceType::Pawn, Color::Black),
            ],
        );
        let pawn = Piece::new(PieceType::Pawn, Color::White);
        assert!(pawn.possible_moves(Position::new(3, 1), &board).is_empty());
    }

    #[test]
    fn pawn_captures_diagonally_only_onto_enemies() {
        let board = board_with(
            5,
            &[
                (1, 1, PieceType::Pawn, Color::Black),
                (2, 0, PieceType::Rook, Color::White),
                (2, 2, PieceType::Rook, Color::Black),
            ],
        );
        let pawn = Piece::new(PieceType::Pawn, Color::Black);
        let moves = sorted(pawn.possible_moves(Position::new(1, 1), &board));
        assert_eq!(moves, vec![Position::new(2, 0), Position::new(2, 1)]);
    }

    #[test]
    fn pawn_on_last_row_has_no_moves() {
        let board = board_with(5, &[(0, 2, PieceType::Pawn, Color::White)]);
        let pawn = Piece::new(PieceType::Pawn, Color::White);
        assert!(pawn.possible_moves(Position::new(0, 2), &board).is_empty());
    }

    #[test]
    fn can_move_rejects_off_board_and_friendly() {
        let board = board_with(
            5,
            &[
                (0, 0, PieceType::King, Color::White),
                (0, 1, PieceType::Rook, Color::White),
                (1, 0, PieceType::Rook, Color::Black),
            ],
        );
        let king = Piece::new(PieceType::King, Color::White);
        assert!(!king.can_move(Position::new(-1, 0), &board));
        assert!(!king.can_move(Position::new(0, 5), &board));
        assert!(!king.can_move(Position::new(0, 1), &board));
        assert!(king.can_move(Position::new(1, 0), &board));
        assert!(king.can_move(Position::new(1, 1), &board));
    }

    #[test]
    fn symbols_are_case_coded_by_color() {
        assert_eq!(Piece::new(PieceType::Knight, Color::White).symbol(), 'N');
        assert_eq!(Piece::new(PieceType::Knight, Color::Black).symbol(), 'n');
    }
}
