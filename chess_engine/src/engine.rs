//! Protocol command surface (spec §6.3), the boundary an external driver program talks to.
//!
//! Grounded in `pleco_searcher::threadpool::ThreadPool::go`/`_PlecoSearcher` (board +
//! thread-pool ownership, `tt_size`/`clear_tt` as the resize/clear entry points) generalized
//! from "fire a thread pool and block" to "drive one `Driver` call per `go`", since this
//! crate's concurrency model is the single-search-thread-plus-external-stop-flag one spec §5
//! describes rather than the teacher's lazy-SMP thread pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_core::fen;
use chess_core::piece_move::{Move, MoveList};
use chess_core::position::Position;
use chess_core::movegen;

use crate::driver::{Driver, Iteration};
use crate::error::EngineError;
use crate::time::{Budget, ClockMode, Deadline, NodesPerSecond};
use crate::tt::TranspositionTable;

const DEFAULT_TT_MEGABYTES: usize = 16;

/// One ply of game history, kept so `undo`/`redo` can walk back and forth and so the search
/// can seed its repetition path.
struct HistoryEntry {
    position: Position,
    mv: Move,
}

/// Owns the position, game history, transposition table and clock state behind the
/// protocol surface in spec §6.3. Search itself is delegated to a fresh [`Driver`] per `go`.
pub struct Engine {
    root: Position,
    undone: Vec<HistoryEntry>,
    played: Vec<HistoryEntry>,
    force_mode: bool,
    depth_limit: i32,
    move_time: Option<std::time::Duration>,
    clock: Option<ClockMode>,
    nps: Option<NodesPerSecond>,
    tt: TranspositionTable,
    stop: Arc<AtomicBool>,
    last_hint: Option<Move>,
}

pub const MAX_SEARCH_DEPTH: i32 = 100;

impl Engine {
    pub fn new() -> Engine {
        Engine {
            root: Position::startpos(),
            undone: Vec::new(),
            played: Vec::new(),
            force_mode: false,
            depth_limit: MAX_SEARCH_DEPTH,
            move_time: None,
            clock: None,
            nps: None,
            tt: TranspositionTable::new(DEFAULT_TT_MEGABYTES),
            stop: Arc::new(AtomicBool::new(false)),
            last_hint: None,
        }
    }

    /// `new`: reset to the standard opening position, computer plays black, clear history
    /// and any depth cap.
    pub fn new_game(&mut self) {
        self.root = Position::startpos();
        self.played.clear();
        self.undone.clear();
        self.force_mode = false;
        self.depth_limit = MAX_SEARCH_DEPTH;
        self.last_hint = None;
    }

    /// `setboard <FEN>`: replace the position, discarding history.
    pub fn set_board(&mut self, input: &str) -> Result<(), EngineError> {
        let pos = fen::parse(input)?;
        self.root = pos;
        self.played.clear();
        self.undone.clear();
        self.last_hint = None;
        Ok(())
    }

    pub fn current_fen(&self) -> String {
        fen::print(&self.root)
    }

    pub fn position(&self) -> &Position {
        &self.root
    }

    /// `force`: disable automatic move-making.
    pub fn force(&mut self) {
        self.force_mode = true;
    }

    pub fn force_mode(&self) -> bool {
        self.force_mode
    }

    /// Plays `mv` in the current position, pushing it onto history and clearing any redo
    /// stack (a fresh move invalidates whatever was undone before it).
    pub fn play(&mut self, mv: Move) {
        let new_root = self.root.make_move(mv);
        let previous = std::mem::replace(&mut self.root, new_root);
        self.played.push(HistoryEntry { position: previous, mv });
        self.undone.clear();
    }

    /// `undo`: walk the game history back by one ply.
    pub fn undo(&mut self) -> bool {
        match self.played.pop() {
            Some(entry) => {
                let current = std::mem::replace(&mut self.root, entry.position);
                self.undone.push(HistoryEntry { position: current, mv: entry.mv });
                true
            }
            None => false,
        }
    }

    /// `redo`: walk the game history forward by one ply.
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(entry) => {
                let previous = std::mem::replace(&mut self.root, entry.position);
                self.played.push(HistoryEntry { position: previous, mv: entry.mv });
                true
            }
            None => false,
        }
    }

    /// `sd N`: set the iterative-deepening depth cap.
    pub fn set_depth(&mut self, depth: i32) {
        self.depth_limit = depth.clamp(1, MAX_SEARCH_DEPTH);
    }

    /// `st N`: fixed seconds-per-move, overriding tournament-clock timing.
    pub fn set_move_time(&mut self, seconds: u64) {
        self.move_time = Some(std::time::Duration::from_secs(seconds));
        self.clock = None;
    }

    /// `level MPS BASE INC`: tournament clock, base time in seconds and increment in seconds.
    pub fn set_level(&mut self, moves_per_session: u32, base_seconds: u64, increment_seconds: u64) {
        self.move_time = None;
        self.clock = Some(ClockMode::Tournament {
            remaining: std::time::Duration::from_secs(base_seconds),
            increment: std::time::Duration::from_secs(increment_seconds),
            moves_left: if moves_per_session > 0 { Some(moves_per_session) } else { None },
        });
    }

    /// `time N` / `otim N`: update our remaining time (centiseconds); the opponent's clock
    /// is accepted by the protocol surface but unused by the core, per spec §4.11.
    pub fn update_clock(&mut self, our_remaining_centiseconds: u64) {
        let remaining = std::time::Duration::from_millis(our_remaining_centiseconds * 10);
        self.clock = Some(match self.clock {
            Some(ClockMode::Tournament { increment, moves_left, .. }) => {
                ClockMode::Tournament { remaining, increment, moves_left }
            }
            _ => ClockMode::Tournament { remaining, increment: std::time::Duration::ZERO, moves_left: None },
        });
    }

    pub fn set_nodes_per_second(&mut self, nps: u64) {
        self.nps = Some(NodesPerSecond(nps));
    }

    /// `memory N`: resize the TT, rounding down to a power of two as [`TranspositionTable`]
    /// already does internally.
    pub fn resize_tt(&mut self, megabytes: usize) {
        self.tt = TranspositionTable::new(megabytes);
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// `hint`: the best move from the previous search, if one has completed.
    pub fn hint(&self) -> Option<Move> {
        self.last_hint
    }

    /// `perft N`: node-count of the legal-move tree to depth N from the current position.
    pub fn perft(&self, depth: u32) -> u64 {
        perft(&self.root, depth)
    }

    fn repetition_keys(&self) -> Vec<u64> {
        self.played.iter().map(|e| e.position.key[0]).collect()
    }

    fn budget(&self) -> Budget {
        if let Some(move_time) = self.move_time {
            crate::time::budget_for(ClockMode::FixedPerMove(move_time), self.nps)
        } else if let Some(clock) = self.clock {
            crate::time::budget_for(clock, self.nps)
        } else {
            crate::time::budget_for(ClockMode::Infinite, self.nps)
        }
    }

    /// `go`: enable move-making for the side to move and search, returning every completed
    /// iteration via `on_iteration` (for a show-thinking callback) and the final best move.
    /// Leaves the move unplayed; the caller decides whether to call [`Engine::play`] with it
    /// (the distinction the protocol draws between `force` and normal play).
    pub fn go(&mut self, mut on_iteration: impl FnMut(&Iteration)) -> Option<Move> {
        self.force_mode = false;
        self.stop.store(false, Ordering::Relaxed);

        let timed = self.clock.is_some() || self.move_time.is_some();
        let budget = self.budget();
        let deadline = Deadline::from_budget(&budget);
        let repetition = self.repetition_keys();
        let driver = Driver::new(&self.tt, self.stop.clone());
        let stop = self.stop.clone();

        let result = driver.search(&self.root, self.depth_limit, budget.node_limit, &repetition, |iteration| {
            on_iteration(iteration);
            if timed && deadline.expired() {
                stop.store(true, Ordering::Relaxed);
            }
        });

        self.last_hint = result.as_ref().and_then(|it| it.best_move);
        result.and_then(|it| it.best_move)
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut list = MoveList::new();
    movegen::generate(pos, &mut list);
    if depth == 1 {
        return list.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in list.as_slice() {
        let child = pos.make_move(*mv);
        nodes += perft(&child, depth - 1);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_resets_to_startpos() {
        let mut engine = Engine::new();
        engine.set_board("8/8/8/8/8/8/8/k6K w - - 0 1").unwrap();
        engine.new_game();
        assert_eq!(engine.current_fen(), fen::print(&Position::startpos()));
    }

    #[test]
    fn undo_redo_round_trips_through_history() {
        let mut engine = Engine::new();
        let mut list = MoveList::new();
        movegen::generate(&engine.root, &mut list);
        let mv = list.as_slice()[0];
        let fen_before = engine.current_fen();
        engine.play(mv);
        assert_ne!(engine.current_fen(), fen_before);
        assert!(engine.undo());
        assert_eq!(engine.current_fen(), fen_before);
        assert!(engine.redo());
        assert_ne!(engine.current_fen(), fen_before);
    }

    #[test]
    fn perft_depth_one_matches_legal_move_count() {
        let engine = Engine::new();
        let mut list = MoveList::new();
        movegen::generate(&engine.root, &mut list);
        assert_eq!(engine.perft(1), list.len() as u64);
    }

    #[test]
    fn perft_depth_two_matches_startpos_reference_value() {
        let engine = Engine::new();
        assert_eq!(engine.perft(2), 400);
    }

    #[test]
    fn set_depth_clamps_to_valid_range() {
        let mut engine = Engine::new();
        engine.set_depth(1000);
        assert_eq!(engine.depth_limit, MAX_SEARCH_DEPTH);
        engine.set_depth(0);
        assert_eq!(engine.depth_limit, 1);
    }
}
