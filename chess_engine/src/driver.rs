//! Iterative-deepening driver with aspiration windows (spec §4.9/§4.10).
//!
//! Grounded in `pleco_searcher/thread_search.rs`'s `ThreadSearcher::search_root`: widen the
//! window and re-search whenever the previous depth's score falls outside `[alpha, beta]`,
//! growing `delta` by `delta/4 + 5` each failed attempt, falling back to an infinite window
//! once the aspiration loop has retried too many times at one depth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_core::piece_move::Move;
use chess_core::position::Position;

use crate::search::{Search, SearchLimits, SearchResult, DRAW_VALUE, INFINITY, MAX_PLY};
use crate::tt::TranspositionTable;

/// Above this many failed aspiration re-searches at a single depth, widen to +/-infinity
/// rather than keep inching the window outward.
const ASPIRATION_RETRY_CAP: u32 = 4;
const INITIAL_ASPIRATION_DELTA: i32 = 18;

/// One completed depth of iterative deepening, reported to the caller as it becomes available.
#[derive(Clone, Debug)]
pub struct Iteration {
    pub depth: i32,
    pub value: i32,
    pub best_move: Option<Move>,
    pub pv: Vec<Move>,
    pub nodes: u64,
}

/// Drives repeated calls into [`Search`] at increasing depth, starting a new aspiration
/// window from the previous iteration's score once depth 5 is reached. Borrows the
/// transposition table rather than owning it, since the table outlives any one `go` and is
/// shared by [`crate::engine::Engine`] across searches.
pub struct Driver<'a> {
    tt: &'a TranspositionTable,
    stop: Arc<AtomicBool>,
}

impl<'a> Driver<'a> {
    pub fn new(tt: &'a TranspositionTable, stop: Arc<AtomicBool>) -> Driver<'a> {
        Driver { tt, stop }
    }

    pub fn tt(&self) -> &TranspositionTable {
        self.tt
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Iterates from depth 1 up to `max_depth` (or until `node_limit`/the stop flag fires),
    /// invoking `on_iteration` after each completed depth. `repetition_history` is the list
    /// of ancestor Zobrist keys (most recent game moves) used for draw-by-repetition checks.
    pub fn search(
        &self,
        pos: &Position,
        max_depth: i32,
        node_limit: Option<u64>,
        repetition_history: &[u64],
        mut on_iteration: impl FnMut(&Iteration),
    ) -> Option<Iteration> {
        let limits = SearchLimits { stop: self.stop.clone(), node_limit };
        let mut search = Search::new(self.tt, &limits, repetition_history);

        let mut last_completed: Option<Iteration> = None;
        let mut prev_score = DRAW_VALUE;
        let max_depth = max_depth.min(MAX_PLY as i32);

        for depth in 1..=max_depth {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            search.new_search();
            self.tt.new_generation();

            let (mut alpha, mut beta, mut delta) = if depth >= 5 {
                (
                    (prev_score - INITIAL_ASPIRATION_DELTA).max(-INFINITY),
                    (prev_score + INITIAL_ASPIRATION_DELTA).min(INFINITY),
                    INITIAL_ASPIRATION_DELTA,
                )
            } else {
                (-INFINITY, INFINITY, INITIAL_ASPIRATION_DELTA)
            };

            let mut retries = 0;
            let result = loop {
                let attempt = search.search_root(pos, depth, alpha, beta);
                let Some(result) = attempt else {
                    break None;
                };

                if result.value <= alpha && alpha > -INFINITY {
                    retries += 1;
                    if retries > ASPIRATION_RETRY_CAP {
                        alpha = -INFINITY;
                        beta = INFINITY;
                    } else {
                        beta = (alpha + beta) / 2;
                        alpha = (result.value - delta).max(-INFINITY);
                        delta += delta / 4 + 5;
                    }
                } else if result.value >= beta && beta < INFINITY {
                    retries += 1;
                    if retries > ASPIRATION_RETRY_CAP {
                        alpha = -INFINITY;
                        beta = INFINITY;
                    } else {
                        beta = (result.value + delta).min(INFINITY);
                        delta += delta / 4 + 5;
                    }
                } else {
                    break Some(result);
                }
            };

            let Some(result) = result else { break };

            prev_score = result.value;
            let iteration = to_iteration(depth, &result);
            on_iteration(&iteration);
            last_completed = Some(iteration);
        }

        last_completed
    }
}

fn to_iteration(depth: i32, result: &SearchResult) -> Iteration {
    Iteration {
        depth,
        value: result.value,
        best_move: result.best_move,
        pv: result.pv.clone(),
        nodes: result.nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::fen;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn deepens_until_max_depth_and_reports_every_iteration() {
        let tt = TranspositionTable::new(1);
        let driver = Driver::new(&tt, Arc::new(AtomicBool::new(false)));
        let pos = fen::parse("k7/8/KQ6/8/8/8/8/8 w - - 0 1").unwrap();
        let mut depths_seen = Vec::new();
        let result = driver.search(&pos, 3, None, &[], |it| depths_seen.push(it.depth));
        assert_eq!(depths_seen, vec![1, 2, 3]);
        assert!(result.unwrap().best_move.is_some());
    }

    #[test]
    fn stop_flag_halts_before_max_depth() {
        let tt = TranspositionTable::new(1);
        let stop = Arc::new(AtomicBool::new(true));
        let driver = Driver::new(&tt, stop);
        let pos = Position::startpos();
        let result = driver.search(&pos, 10, None, &[], |_| {});
        assert!(result.is_none());
    }

    #[test]
    fn node_limit_eventually_stops_deepening() {
        let tt = TranspositionTable::new(1);
        let driver = Driver::new(&tt, Arc::new(AtomicBool::new(false)));
        let pos = Position::startpos();
        let mut max_depth_seen = 0;
        driver.search(&pos, 60, Some(5_000), &[], |it| max_depth_seen = it.depth);
        assert!(max_depth_seen < 60);
    }
}
