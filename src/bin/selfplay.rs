use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use rand::seq::SliceRandom;

use minichess::config::{Difficulty, EngineConfig};
use minichess::game::Game;
use minichess::piece::Color;
use minichess::worker::Searcher;

/// Play one engine-vs-engine game and print the board after every ply.
#[derive(Parser, Debug)]
struct Args {
    /// Board size (5 and 7 have full armies, anything else only kings).
    #[arg(long, default_value_t = 5)]
    size: usize,

    #[arg(long, default_value = "medium")]
    white: Difficulty,

    #[arg(long, default_value = "medium")]
    black: Difficulty,

    /// Thinking time per move. Defaults to the config's budget.
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Stop after this many plies without a king capture.
    #[arg(long, default_value_t = 100)]
    max_plies: u32,

    /// Play this many random plies first so repeated runs differ.
    #[arg(long, default_value_t = 0)]
    random_openings: u32,

    /// JSON engine config.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let budget = args
        .budget_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.time_budget());

    println!(
        "minichess selfplay (built {}): {}x{}, white {} vs black {}, {budget:?} per move",
        minichess::BUILD_TIMESTAMP,
        args.size,
        args.size,
        args.white,
        args.black
    );

    let mut game = Game::new(args.size);
    let mut rng = rand::thread_rng();
    for _ in 0..args.random_openings {
        let moves = game.legal_moves();
        let Some(&mv) = moves.choose(&mut rng) else {
            break;
        };
        game.commit(mv)?;
        println!("random {mv}");
        if game.is_over() {
            break;
        }
    }
    println!("{}", game.board());

    let mut searcher = Searcher::new(config);
    while !game.is_over() && game.ply() < args.max_plies {
        let to_move = game.current_turn();
        let difficulty = match to_move {
            Color::White => args.white,
            Color::Black => args.black,
        };

        let pending = searcher.spawn(&mut game, difficulty, budget)?;
        let Some(result) = pending.wait() else {
            break;
        };
        let Some(mv) = result.report.best else {
            println!("{to_move:?} has no move");
            break;
        };

        let outcome = game.publish(result.ticket, mv)?;
        println!(
            "{:>3}. {to_move:?} {mv}  score {} depth {} nodes {} in {:?}",
            game.ply(),
            result.report.score,
            result.report.depth,
            result.report.nodes,
            result.report.elapsed
        );
        if let Some(captured) = outcome.captured {
            println!("     captures {:?}", captured.piece_type);
        }
        println!("{}", game.board());
    }

    match game.winner() {
        Some(color) => println!("{color:?} wins after {} plies", game.ply()),
        None => println!("No result after {} plies", game.ply()),
    }
    info!("selfplay finished");
    Ok(())
}
