//! Background searches.
//!
//! A search runs on its own thread against a clone of the game's board and
//! sends its report back over a channel. The game is never shared with the
//! thread; the result is applied later through [`Game::publish`], which
//! refuses it if the game moved on in the meantime.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::config::{Difficulty, EngineConfig};
use crate::engine::{AiEngine, SearchReport};
use crate::game::{Game, SearchTicket};

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub ticket: SearchTicket,
    pub report: SearchReport,
}

/// Handle to a search running in the background.
pub struct PendingSearch {
    ticket: SearchTicket,
    rx: Receiver<SearchResult>,
    cancel: Arc<AtomicBool>,
}

impl PendingSearch {
    pub fn ticket(&self) -> SearchTicket {
        self.ticket
    }

    /// The result, if the search has finished.
    pub fn try_result(&self) -> Option<SearchResult> {
        self.rx.try_recv().ok()
    }

    /// Block until the search finishes.
    pub fn wait(self) -> Option<SearchResult> {
        self.rx.recv().ok()
    }

    /// Ask the search to stop at its next node. It still reports whatever
    /// its completed depths found.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Starts background searches, cancelling the previous one each time.
#[derive(Default)]
pub struct Searcher {
    config: EngineConfig,
    outstanding: Option<Arc<AtomicBool>>,
}

impl Searcher {
    pub fn new(config: EngineConfig) -> Self {
        Searcher {
            config,
            outstanding: None,
        }
    }

    /// Search for the side to move in `game`. Takes a fresh ticket from the
    /// game, which makes any earlier ticket stale.
    pub fn spawn(
        &mut self,
        game: &mut Game,
        difficulty: Difficulty,
        time_budget: Duration,
    ) -> io::Result<PendingSearch> {
        if let Some(previous) = self.outstanding.take() {
            debug!("cancelling superseded search");
            previous.store(true, Ordering::Relaxed);
        }

        let ticket = game.request_search();
        let board = game.board().clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let engine = AiEngine::new(self.config.clone()).with_cancel_flag(Arc::clone(&cancel));
        let (tx, rx) = mpsc::channel();

        debug!(
            "spawning {difficulty} search for {:?} (generation {}, budget {time_budget:?})",
            ticket.color, ticket.generation
        );
        thread::Builder::new()
            .name(format!("search-{}", ticket.generation))
            .spawn(move || {
                let report = engine.search(&board, ticket.color, difficulty, time_budget);
                // The receiver may already be gone if the result is no longer wanted.
                let _ = tx.send(SearchResult { ticket, report });
            })?;

        self.outstanding = Some(Arc::clone(&cancel));
        Ok(PendingSearch { ticket, rx, cancel })
    }
}
