use std::io::Write;
use std::time::Duration;

use minichess::config::{Difficulty, EngineConfig};
use minichess::engine::AiEngine;
use minichess::game::Game;
use minichess::piece::Color;

const BOARD_SIZES: [usize; 2] = [5, 7];
const MAX_PLIES: u32 = 120;
const GAMES_PER_MATCHUP: usize = 4;
const MOVE_BUDGET: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
struct MatchResult {
    a_wins: u32,
    b_wins: u32,
    unfinished: u32,
}

fn play_game(engine: &AiEngine, size: usize, white: Difficulty, black: Difficulty) -> Option<Color> {
    let mut game = Game::new(size);
    while !game.is_over() && game.ply() < MAX_PLIES {
        let difficulty = if game.current_turn() == Color::White { white } else { black };
        let ticket = game.request_search();
        let mv = engine.choose_move(game.board(), ticket.color, difficulty, MOVE_BUDGET)?;
        if game.publish(ticket, mv).is_err() {
            break;
        }
    }
    game.winner()
}

/// Play `GAMES_PER_MATCHUP` games, half with A as White and half with B as
/// White.
fn run_matchup(engine: &AiEngine, size: usize, a: Difficulty, b: Difficulty) -> MatchResult {
    let mut result = MatchResult::default();
    let half = GAMES_PER_MATCHUP / 2;

    for _ in 0..half {
        match play_game(engine, size, a, b) {
            Some(Color::White) => result.a_wins += 1,
            Some(Color::Black) => result.b_wins += 1,
            None => result.unfinished += 1,
        }
    }
    for _ in 0..half {
        match play_game(engine, size, b, a) {
            Some(Color::White) => result.b_wins += 1,
            Some(Color::Black) => result.a_wins += 1,
            None => result.unfinished += 1,
        }
    }

    println!(
        "  {a} vs {b}: {a} wins {}, {b} wins {}, unfinished {} (out of {})",
        result.a_wins,
        result.b_wins,
        result.unfinished,
        half * 2
    );
    std::io::stdout().flush().ok();
    result
}

fn main() {
    env_logger::init();
    let engine = AiEngine::new(EngineConfig::default());

    println!("=== Difficulty matchups ===");
    println!(
        "Games per matchup: {GAMES_PER_MATCHUP}, max plies per game: {MAX_PLIES}, {MOVE_BUDGET:?} per move\n"
    );

    for size in BOARD_SIZES {
        println!("--- {size}x{size} ---\n");
        let mut net: Vec<(Difficulty, i32)> = Difficulty::ALL.iter().map(|&d| (d, 0)).collect();

        for (i, &a) in Difficulty::ALL.iter().enumerate() {
            for &b in &Difficulty::ALL[i + 1..] {
                let result = run_matchup(&engine, size, a, b);
                let diff = result.a_wins as i32 - result.b_wins as i32;
                for (d, score) in net.iter_mut() {
                    if *d == a {
                        *score += diff;
                    } else if *d == b {
                        *score -= diff;
                    }
                }
            }
        }

        net.sort_by(|x, y| y.1.cmp(&x.1));
        println!("\n  Net wins:");
        for (d, score) in &net {
            println!("  {score:>+4}  {d}");
        }
        println!();
    }
}
