// =============================================================================
// Mini-chess AI Engine
//
// Iterative-deepening negamax with alpha-beta pruning under a wall-clock
// deadline. Each iteration searches one ply deeper than the last; only an
// iteration that finishes every root move before the deadline may replace
// the best move found so far. Every node checks the deadline on entry and
// falls back to the static evaluation once it has passed, so cancellation is
// cooperative and never unwinds through the board.
//
// The search runs on its own clone of the board and uses apply/undo to walk
// the tree, so the caller's board is never touched.
//
// Coordinate system: row 0 = Black's back rank. Scores are integers, positive
// = good for the side whose point of view is being taken.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::board::Board;
use crate::config::{Difficulty, EngineConfig};
use crate::moves::{Move, Position};
use crate::piece::{Color, PieceType};

/// Platform-appropriate monotonic clock in milliseconds.
/// Uses js_sys::Date::now() in WASM builds, std::time::Instant natively.
fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::sync::OnceLock;
        use std::time::Instant;
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// An absolute point in time after which the search must wind down.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at_ms: f64,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Deadline {
            at_ms: now_ms() + budget.as_secs_f64() * 1000.0,
        }
    }

    pub fn passed(&self) -> bool {
        now_ms() >= self.at_ms
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Score of a position where the opponent's king is gone. Dominates any
/// material or positional total.
pub const WIN_SCORE: i32 = 100_000;

/// Finite stand-in for infinity. Must stay negatable.
const SCORE_BOUND: i32 = 1_000_000;

const MOBILITY_WEIGHT: i32 = 5;

// =============================================================================
// Evaluation
// =============================================================================

pub fn piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::King => 10_000,
        PieceType::Rook => 500,
        PieceType::Bishop => 330,
        PieceType::Knight => 300,
        PieceType::Pawn => 100,
    }
}

/// 20 on the centre cell, minus 5 per step of Manhattan distance from it.
/// Goes negative near the corners of the 7×7 board.
fn center_bonus(board: &Board, pos: Position) -> i32 {
    20 - 5 * pos.distance(board.center())
}

/// Static evaluation from `perspective`'s point of view: material plus centre
/// bonus for every piece (own pieces count positive, enemy pieces negative),
/// plus a mobility term. Exactly zero-sum:
/// `evaluate(b, White) == -evaluate(b, Black)`.
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    let mut score = 0;
    for (pos, piece) in board.pieces() {
        let sign = if piece.color == perspective { 1 } else { -1 };
        score += sign * (piece_value(piece.piece_type) + center_bonus(board, pos));
    }

    let mine = board.generate_moves(perspective).len() as i32;
    let theirs = board.generate_moves(perspective.opposite()).len() as i32;
    score + MOBILITY_WEIGHT * (mine - theirs)
}

// =============================================================================
// Move ordering
// =============================================================================

/// `color`'s moves with captures first, then by closeness of the destination
/// to the centre. The sort is stable, so ties keep generation order.
pub fn ordered_moves(board: &Board, color: Color) -> Vec<Move> {
    let center = board.center();
    let mut moves = board.generate_moves(color);
    moves.sort_by_key(|mv| {
        let is_capture = board.piece_at(mv.to.row, mv.to.col).is_some();
        (!is_capture, mv.to.distance(center))
    });
    moves
}

// =============================================================================
// Search
// =============================================================================

/// Outcome of a `search` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    /// Best root move of the deepest completed iteration.
    pub best: Option<Move>,
    /// Score of `best` from the searching side's point of view.
    pub score: i32,
    /// Deepest iteration that completed. 0 when none did.
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Move selection for the computer-controlled side. Holds configuration only;
/// nothing carries over from one call to the next.
#[derive(Clone, Debug, Default)]
pub struct AiEngine {
    config: EngineConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl AiEngine {
    pub fn new(config: EngineConfig) -> Self {
        AiEngine { config, cancel: None }
    }

    /// Abort the search early once `flag` is raised, exactly as if the
    /// deadline had passed.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Pick a move for `color`, or `None` if it has no moves or not even a
    /// one-ply search finished within `time_budget`.
    pub fn choose_move(
        &self,
        board: &Board,
        color: Color,
        difficulty: Difficulty,
        time_budget: Duration,
    ) -> Option<Move> {
        self.search(board, color, difficulty, time_budget).best
    }

    /// Iterative deepening up to the difficulty's depth. Each depth restarts
    /// from the root; a depth cut short by the deadline is thrown away.
    pub fn search(
        &self,
        board: &Board,
        color: Color,
        difficulty: Difficulty,
        time_budget: Duration,
    ) -> SearchReport {
        let started = now_ms();
        let max_depth = self.config.max_depth(difficulty);
        let mut search = Search {
            board: board.clone(),
            deadline: Deadline::after(time_budget),
            cancel: self.cancel.as_deref(),
            nodes: 0,
            timed_out: false,
        };

        let mut report = SearchReport {
            best: None,
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
        };

        for depth in 1..=max_depth {
            if search.out_of_time() {
                trace!("out of time before depth {depth}");
                break;
            }

            let (best, score) = search.root(depth, color);
            if search.timed_out {
                trace!("depth {depth} interrupted, keeping depth {}", report.depth);
                break;
            }
            let Some(mv) = best else {
                break;
            };

            report.best = Some(mv);
            report.score = score;
            report.depth = depth;
            debug!(
                "{color:?} depth {depth}: {mv} score {score} ({} nodes)",
                search.nodes
            );

            if score >= WIN_SCORE {
                break;
            }
        }

        report.nodes = search.nodes;
        report.elapsed = Duration::from_secs_f64(((now_ms() - started) / 1000.0).max(0.0));
        report
    }
}

/// State of one `search` call: the scratch board plus the limits every node
/// checks.
struct Search<'a> {
    board: Board,
    deadline: Deadline,
    cancel: Option<&'a AtomicBool>,
    nodes: u64,
    /// Set once any node saw the deadline. Results after that are unsound.
    timed_out: bool,
}

impl Search<'_> {
    fn out_of_time(&mut self) -> bool {
        if !self.timed_out {
            let cancelled = self.cancel.is_some_and(|c| c.load(Ordering::Relaxed));
            self.timed_out = cancelled || self.deadline.passed();
        }
        self.timed_out
    }

    /// Search every root move to `depth` plies. The first move to strictly
    /// beat the running alpha is kept, so earlier moves win ties.
    fn root(&mut self, depth: u32, color: Color) -> (Option<Move>, i32) {
        let moves = ordered_moves(&self.board, color);
        let mut alpha = -SCORE_BOUND;
        let beta = SCORE_BOUND;
        let mut best = None;

        for mv in &moves {
            if self.out_of_time() {
                break;
            }
            let captured = self.board.apply(mv);
            let value = -self.negamax(depth - 1, color.opposite(), -beta, -alpha);
            self.board.undo(mv, captured);
            if value > alpha {
                alpha = value;
                best = Some(*mv);
            }
        }

        (best, alpha)
    }

    /// Negamax with alpha-beta pruning. The score is from the point of view
    /// of `color`, the side to move at this node; each recursive call negates
    /// the child's score.
    fn negamax(&mut self, depth: u32, color: Color, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;

        if self.out_of_time() {
            return evaluate(&self.board, color);
        }

        if !self.board.has_king(color.opposite()) {
            return WIN_SCORE;
        }
        if !self.board.has_king(color) {
            return -WIN_SCORE;
        }

        if depth == 0 {
            return evaluate(&self.board, color);
        }

        let moves = ordered_moves(&self.board, color);
        if moves.is_empty() {
            return evaluate(&self.board, color);
        }

        let mut best: Option<i32> = None;
        for mv in &moves {
            if self.out_of_time() {
                break;
            }
            let captured = self.board.apply(mv);
            let score = -self.negamax(depth - 1, color.opposite(), -beta, -alpha);
            self.board.undo(mv, captured);

            let value = best.map_or(score, |b| b.max(score));
            best = Some(value);
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }

        // Timed out before the first child: nothing better than the static view.
        best.unwrap_or_else(|| evaluate(&self.board, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn place(board: &mut Board, row: i32, col: i32, pt: PieceType, color: Color) {
        board.set_piece(Position::new(row, col), Some(Piece::new(pt, color)));
    }

    fn mv(from: (i32, i32), to: (i32, i32)) -> Move {
        Move::new(Position::new(from.0, from.1), Position::new(to.0, to.1))
    }

    /// 5×5 with two kings and one rook per side.
    fn reduced_board() -> Board {
        let mut board = Board::new(5);
        place(&mut board, 0, 2, PieceType::King, Color::Black);
        place(&mut board, 0, 0, PieceType::Rook, Color::Black);
        place(&mut board, 4, 2, PieceType::King, Color::White);
        place(&mut board, 4, 4, PieceType::Rook, Color::White);
        board
    }

    fn engine() -> AiEngine {
        AiEngine::new(EngineConfig::default())
    }

    #[test]
    fn evaluation_is_zero_sum() {
        let mut boards = vec![
            Board::with_initial_position(5),
            Board::with_initial_position(7),
            reduced_board(),
        ];
        // A few lopsided positions as well.
        let mut b = Board::with_initial_position(7);
        b.move_piece(Position::new(6, 0), Position::new(0, 0));
        b.move_piece(Position::new(1, 3), Position::new(3, 3));
        boards.push(b);

        for board in &boards {
            assert_eq!(
                evaluate(board, Color::White),
                -evaluate(board, Color::Black),
                "\n{board}"
            );
        }
    }

    #[test]
    fn symmetric_start_evaluates_to_zero() {
        for size in [5, 7] {
            let board = Board::with_initial_position(size);
            assert_eq!(evaluate(&board, Color::White), 0, "size {size}");
        }
    }

    #[test]
    fn evaluation_counts_material_centre_and_mobility() {
        let mut board = Board::new(5);
        place(&mut board, 2, 2, PieceType::King, Color::White);
        // Lone king on the centre: 10000 + 20 + 5 * 8 moves.
        assert_eq!(evaluate(&board, Color::White), 10_000 + 20 + 40);
        // Black sees exactly the negation.
        assert_eq!(evaluate(&board, Color::Black), -(10_000 + 20 + 40));
    }

    #[test]
    fn extra_material_scores_positive() {
        let mut board = reduced_board();
        board.set_piece(Position::new(0, 0), None);
        assert!(evaluate(&board, Color::White) > 0);
        assert!(evaluate(&board, Color::Black) < 0);
    }

    #[test]
    fn ordering_puts_captures_first_then_central_targets() {
        let mut board = Board::new(5);
        place(&mut board, 4, 0, PieceType::Rook, Color::White);
        place(&mut board, 0, 0, PieceType::Knight, Color::Black);
        let moves = ordered_moves(&board, Color::White);

        assert_eq!(moves[0], mv((4, 0), (0, 0)), "the capture comes first");
        let center = board.center();
        let quiet: Vec<i32> = moves[1..].iter().map(|m| m.to.distance(center)).collect();
        let mut sorted = quiet.clone();
        sorted.sort();
        assert_eq!(quiet, sorted);
    }

    #[test]
    fn ordering_is_a_permutation_of_generation() {
        let board = Board::with_initial_position(7);
        let mut ordered = ordered_moves(&board, Color::Black);
        let mut generated = board.generate_moves(Color::Black);
        let key = |m: &Move| (m.from.row, m.from.col, m.to.row, m.to.col);
        ordered.sort_by_key(key);
        generated.sort_by_key(key);
        assert_eq!(ordered, generated);
    }

    #[test]
    fn reduced_board_yields_a_legal_move() {
        let board = reduced_board();
        for color in [Color::White, Color::Black] {
            let chosen = engine()
                .choose_move(&board, color, Difficulty::Easy, Duration::from_secs(5))
                .expect("a move within the budget");
            assert!(board.generate_moves(color).contains(&chosen), "{chosen} is not legal");
        }
    }

    #[test]
    fn takes_a_hanging_king() {
        // White rook on the black king's file with nothing in between.
        let mut board = Board::new(5);
        place(&mut board, 0, 2, PieceType::King, Color::Black);
        place(&mut board, 0, 0, PieceType::Rook, Color::Black);
        place(&mut board, 4, 0, PieceType::King, Color::White);
        place(&mut board, 3, 2, PieceType::Rook, Color::White);

        let report = engine().search(&board, Color::White, Difficulty::Medium, Duration::from_secs(5));
        assert_eq!(report.best, Some(mv((3, 2), (0, 2))));
        assert!(report.score >= WIN_SCORE);
        assert_eq!(report.depth, 1, "a proven win stops the deepening");
    }

    #[test]
    fn does_not_walk_into_a_capture() {
        // White king on (2,2) may step to row 1 where the black rook on
        // (1,0) would take it. A two-ply search must avoid those squares.
        let mut board = Board::new(5);
        place(&mut board, 2, 2, PieceType::King, Color::White);
        place(&mut board, 1, 0, PieceType::Rook, Color::Black);
        place(&mut board, 4, 4, PieceType::King, Color::Black);

        let chosen = engine()
            .choose_move(&board, Color::White, Difficulty::Easy, Duration::from_secs(5))
            .expect("a move");
        assert_ne!(chosen.to.row, 1, "stepped onto the rook's rank: {chosen}");
    }

    #[test]
    fn completes_every_depth_with_a_generous_budget() {
        let board = reduced_board();
        let report = engine().search(&board, Color::White, Difficulty::Easy, Duration::from_secs(30));
        assert_eq!(report.depth, 2);
        assert!(report.nodes > 0);
    }

    #[test]
    fn search_is_reproducible() {
        let board = Board::with_initial_position(5);
        let a = engine().search(&board, Color::White, Difficulty::Easy, Duration::from_secs(30));
        let b = engine().search(&board, Color::White, Difficulty::Easy, Duration::from_secs(30));
        assert_eq!(a.best, b.best);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
    }

    #[test]
    fn caller_board_is_untouched() {
        let board = Board::with_initial_position(7);
        let before = board.clone();
        engine().choose_move(&board, Color::Black, Difficulty::Easy, Duration::from_millis(200));
        assert_eq!(board, before);
    }

    #[test]
    fn zero_budget_returns_nothing() {
        let board = reduced_board();
        let report = engine().search(&board, Color::White, Difficulty::Hard, Duration::ZERO);
        assert_eq!(report.best, None);
        assert_eq!(report.depth, 0);
    }

    #[test]
    fn raised_cancel_flag_returns_nothing() {
        let flag = Arc::new(AtomicBool::new(true));
        let engine = engine().with_cancel_flag(flag);
        let board = reduced_board();
        assert_eq!(
            engine.choose_move(&board, Color::White, Difficulty::Easy, Duration::from_secs(5)),
            None
        );
    }

    #[test]
    fn no_pieces_no_move() {
        let mut board = Board::new(5);
        place(&mut board, 0, 0, PieceType::King, Color::Black);
        assert_eq!(
            engine().choose_move(&board, Color::White, Difficulty::Easy, Duration::from_secs(1)),
            None
        );
    }

    #[test]
    fn short_budget_on_hard_still_answers() {
        // Hard asks for depth 8; the budget ends the deepening well before
        // that, but the shallow depths finish and supply a move.
        let board = Board::with_initial_position(5);
        let report = engine().search(&board, Color::White, Difficulty::Hard, Duration::from_millis(300));
        let best = report.best.expect("depth 1 fits in 300ms");
        assert!(board.generate_moves(Color::White).contains(&best));
        assert!(report.depth >= 1 && report.depth < 8);
    }

    #[test]
    fn kept_move_matches_a_full_search_at_the_completed_depth() {
        // Whatever depth a short budget reaches, its move and score are the
        // ones an unhurried search capped at that depth returns.
        let board = Board::with_initial_position(7);
        for budget_ms in [20, 60, 150] {
            let hurried = engine().search(&board, Color::White, Difficulty::Hard, Duration::from_millis(budget_ms));
            if hurried.depth == 0 {
                continue;
            }
            let capped = EngineConfig {
                hard_depth: hurried.depth,
                ..EngineConfig::default()
            };
            let full = AiEngine::new(capped).search(&board, Color::White, Difficulty::Hard, Duration::from_secs(60));
            assert_eq!(full.depth, hurried.depth, "budget {budget_ms}ms");
            assert_eq!(full.best, hurried.best, "budget {budget_ms}ms");
            assert_eq!(full.score, hurried.score, "budget {budget_ms}ms");
        }
    }
}
