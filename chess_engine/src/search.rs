//! Alpha-beta search with quiescence extension (spec §4.8).
//!
//! Grounded in `pleco_searcher/thread_search.rs`'s `ThreadSearcher::search` (PV/NonPV node
//! typing, TT probe/store shape, futility-style pruning before move generation, PV-node
//! re-search condition) and `pleco_searcher/search.rs`'s `correct_bound`. The teacher
//! monomorphizes node type through a `PVNode` trait for zero-cost dispatch inside a `Thread`
//! that owns one mutable `Board`; this crate instead recurses on owned `Position` values (a
//! value type with no in-place undo, per the data-model note in the spec), so node type is
//! threaded through as a plain enum instead of a generic parameter.

use std::cmp::{max, min};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chess_core::piece::{BISHOP, KNIGHT, PAWN, QUEEN, ROOK};
use chess_core::piece_move::Move;
use chess_core::position::Position;
use chess_core::see;
use chess_core::{eval, movegen};

use crate::movepick::{HistoryTable, MovePicker};
use crate::tt::{Bound, TranspositionTable};

pub const MATE_VALUE: i32 = 32_000;
pub const INFINITY: i32 = MATE_VALUE + 1;
pub const DRAW_VALUE: i32 = 0;
pub const MAX_PLY: usize = 126;

const NODE_CHECK_INTERVAL: u64 = 10_000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NodeKind {
    Pv,
    NonPv,
}

/// Node-count / time budget checked every [`NODE_CHECK_INTERVAL`] nodes (spec §5).
pub struct SearchLimits {
    pub stop: Arc<AtomicBool>,
    pub node_limit: Option<u64>,
}

impl SearchLimits {
    pub fn infinite(stop: Arc<AtomicBool>) -> SearchLimits {
        SearchLimits { stop, node_limit: None }
    }
}

/// Result of a completed (non-cancelled) search call.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub value: i32,
    pub best_move: Option<Move>,
    pub pv: Vec<Move>,
    pub nodes: u64,
}

/// Thrown internally to unwind the recursion on cancellation; the driver treats this as
/// "return the best result from the last completed iteration", never as an error.
#[derive(Debug)]
struct Cancelled;

struct Stack {
    killers: [Move; 2],
    pv: Vec<Move>,
}

impl Stack {
    fn new() -> Stack {
        Stack { killers: [Move::NULL, Move::NULL], pv: Vec::new() }
    }
}

pub struct Search<'a> {
    tt: &'a TranspositionTable,
    history: HistoryTable,
    stacks: Vec<Stack>,
    nodes: u64,
    limits: &'a SearchLimits,
    path: Vec<u64>,
}

impl<'a> Search<'a> {
    pub fn new(tt: &'a TranspositionTable, limits: &'a SearchLimits, repetition_history: &[u64]) -> Search<'a> {
        let mut stacks = Vec::with_capacity(MAX_PLY + 8);
        for _ in 0..MAX_PLY + 8 {
            stacks.push(Stack::new());
        }
        Search {
            tt,
            history: HistoryTable::new(),
            stacks,
            nodes: 0,
            limits,
            path: repetition_history.to_vec(),
        }
    }

    /// Ages the history table between iterative-deepening depths. Node count is deliberately
    /// left running: `nodes()` reports the total searched since this `Search` was created,
    /// across every depth, so a node-based limit bounds the whole "go" rather than one ply.
    pub fn new_search(&mut self) {
        self.history.age();
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Searches the root position to `depth` plies, returning the best move and its PV.
    pub fn search_root(&mut self, pos: &Position, depth: i32, alpha: i32, beta: i32) -> Option<SearchResult> {
        match self.search(pos, 0, alpha, beta, depth, NodeKind::Pv) {
            Ok(value) => Some(SearchResult {
                value,
                best_move: self.stacks[0].pv.first().copied(),
                pv: self.stacks[0].pv.clone(),
                nodes: self.nodes,
            }),
            Err(Cancelled) => None,
        }
    }

    fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.nodes % NODE_CHECK_INTERVAL == 0 {
            if self.limits.stop.load(Ordering::Relaxed) {
                return Err(Cancelled);
            }
            if let Some(limit) = self.limits.node_limit {
                if self.nodes >= limit {
                    return Err(Cancelled);
                }
            }
        }
        Ok(())
    }

    fn search(&mut self, pos: &Position, ply: u32, mut alpha: i32, beta: i32, depth: i32, kind: NodeKind) -> Result<i32, Cancelled> {
        self.nodes += 1;
        self.check_cancelled()?;
        self.stacks[ply as usize].pv.clear();

        let is_pv = kind == NodeKind::Pv;
        let in_check = pos.in_check();

        if ply > 0 {
            if self.path.contains(&pos.key[0]) || is_draw_by_material(pos) {
                return Ok(DRAW_VALUE);
            }
        }

        if depth <= 0 {
            if in_check {
                return self.search(pos, ply, alpha, beta, 1, kind);
            }
            return self.quiescence(pos, ply, alpha, beta);
        }

        if ply as usize >= MAX_PLY {
            return Ok(eval::evaluate(pos));
        }

        let probe = self.tt.probe(pos);
        if !is_pv && probe.found && probe.depth as i32 >= depth && correct_bound(probe.value, beta, probe.bound) {
            return Ok(probe.value);
        }

        let static_eval = if in_check { -MATE_VALUE } else { eval::evaluate(pos) };

        if !is_pv && !in_check && !probe.no_null && depth >= 3 && ply > 0 && static_eval >= beta && has_non_pawn_material(pos) {
            let reduction = 4;
            let null_depth = max(depth - 1 - reduction, 0);
            let child = pos.flip();
            self.path.push(pos.key[0]);
            let null_value = -self.search(&child, ply + 1, -beta, -beta + 1, null_depth, NodeKind::NonPv)?;
            self.path.pop();
            if null_value >= beta {
                return Ok(null_value);
            }
        }

        let hash_move = probe.best_move;
        let killers = self.stacks[ply as usize].killers;
        let mut picker = MovePicker::new(pos, hash_move, killers, &self.history, false);

        let mut best_value = -INFINITY;
        let mut best_move = None;
        let mut moves_played = 0u32;
        let mut quiets_tried = 0u32;

        while let Some((mv, is_late)) = picker.pick_next() {
            if !is_pv && !in_check && is_late && static_eval <= alpha {
                let lmp_limit = late_move_pruning_limit(depth);
                if quiets_tried >= lmp_limit {
                    continue;
                }
            }
            if !mv.is_capture() && !mv.is_promotion() {
                quiets_tried += 1;
            }

            let child = pos.make_move(mv);
            let gives_check = child.in_check();

            let extension = if gives_check && !mv.is_capture() && !mv.is_castle() && (1..=10).contains(&depth) {
                1
            } else {
                0
            };
            let mut reduction = 0;
            if extension == 0 && is_late && !in_check && !gives_check && depth > 2 {
                reduction = lmr_reduction(depth, quiets_tried as i32);
            }
            let next_depth = depth - 1 + extension;

            self.path.push(pos.key[0]);
            let value = if moves_played == 0 {
                -self.search(&child, ply + 1, -beta, -alpha, next_depth, if is_pv { NodeKind::Pv } else { NodeKind::NonPv })?
            } else {
                let reduced_depth = max(next_depth - reduction, 0);
                let mut v = -self.search(&child, ply + 1, -alpha - 1, -alpha, reduced_depth, NodeKind::NonPv)?;
                if v > alpha && (reduction > 0 || is_pv) {
                    v = -self.search(&child, ply + 1, -beta, -alpha, next_depth, NodeKind::Pv)?;
                }
                v
            };

            self.path.pop();
            moves_played += 1;

            if value > best_value {
                best_value = value;
                best_move = Some(mv);
                if value > alpha {
                    alpha = value;
                    let (head, tail) = self.stacks.split_at_mut(ply as usize + 1);
                    let mut new_pv = vec![mv];
                    new_pv.extend_from_slice(&tail[0].pv);
                    head[ply as usize].pv = new_pv;
                }
            }

            if alpha >= beta {
                if !mv.is_capture() && !mv.is_promotion() {
                    let stack = &mut self.stacks[ply as usize];
                    if stack.killers[0] != mv {
                        stack.killers[1] = stack.killers[0];
                        stack.killers[0] = mv;
                    }
                    self.history.credit(pos.piece_at(mv.from()), mv.to().0 as usize, depth as u8);
                }
                break;
            }
        }

        if moves_played == 0 {
            let value = if in_check { -MATE_VALUE + ply as i32 } else { DRAW_VALUE };
            return Ok(value);
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if is_pv && best_move.is_some() && best_value > alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(pos, depth as u8, best_value, best_move, bound, false);

        Ok(best_value)
    }

    fn quiescence(&mut self, pos: &Position, ply: u32, mut alpha: i32, beta: i32) -> Result<i32, Cancelled> {
        self.nodes += 1;
        self.check_cancelled()?;

        let stand_pat = eval::evaluate(pos);
        if stand_pat >= beta {
            return Ok(stand_pat);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if ply as usize >= MAX_PLY {
            return Ok(stand_pat);
        }

        let killers = [Move::NULL, Move::NULL];
        let mut picker = MovePicker::new(pos, None, killers, &self.history, true);
        let mut best_value = stand_pat;

        while let Some((mv, _)) = picker.pick_next() {
            if see::see(pos, mv) < 0 {
                continue;
            }
            let child = pos.make_move(mv);
            let value = -self.quiescence(&child, ply + 1, -beta, -alpha)?;
            if value > best_value {
                best_value = value;
            }
            if value > alpha {
                alpha = value;
            }
            if alpha >= beta {
                break;
            }
        }

        Ok(best_value)
    }
}

fn correct_bound(value: i32, beta: i32, bound: Bound) -> bool {
    match bound {
        Bound::Exact => true,
        Bound::Lower => value >= beta,
        Bound::Upper => value < beta,
        Bound::None => false,
    }
}

fn has_non_pawn_material(pos: &Position) -> bool {
    use chess_core::piece::US;
    let us = US;
    pos.by_type[us][KNIGHT as usize].is_not_empty()
        || pos.by_type[us][BISHOP as usize].is_not_empty()
        || pos.by_type[us][ROOK as usize].is_not_empty()
        || pos.by_type[us][QUEEN as usize].is_not_empty()
}

fn is_draw_by_material(pos: &Position) -> bool {
    use chess_core::piece::{THEM, US};
    for side in [US, THEM] {
        if pos.by_type[side][PAWN as usize].is_not_empty()
            || pos.by_type[side][ROOK as usize].is_not_empty()
            || pos.by_type[side][QUEEN as usize].is_not_empty()
        {
            return false;
        }
    }
    let minors = |side: usize| (pos.by_type[side][KNIGHT as usize].count() + pos.by_type[side][BISHOP as usize].count()) as i32;
    minors(US) <= 1 && minors(THEM) <= 1
}

/// Reference schedule from spec §4.8: `{2, 2, 6, 6, 18, ...}`, doubling every two plies.
fn late_move_pruning_limit(depth: i32) -> u32 {
    match depth {
        1 => 2,
        2 => 2,
        3 => 6,
        4 => 6,
        _ => (18 << ((depth - 5).max(0) / 2)) as u32,
    }
}

fn lmr_reduction(depth: i32, move_index: i32) -> i32 {
    let product = (depth.max(1) as f64) * (move_index.max(1) as f64) / 22.0;
    if product <= 1.0 {
        return 0;
    }
    let reduction = (product.log2()).max(0.0) as i32;
    min(reduction, depth - 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::fen;
    use std::sync::atomic::AtomicBool;

    fn fresh<'a>(tt: &'a TranspositionTable, limits: &'a SearchLimits) -> Search<'a> {
        Search::new(tt, limits, &[])
    }

    #[test]
    fn finds_mate_in_one() {
        let tt = TranspositionTable::new(1);
        let limits = SearchLimits::infinite(Arc::new(AtomicBool::new(false)));
        let mut search = fresh(&tt, &limits);
        let pos = fen::parse("k7/8/KQ6/8/8/8/8/8 w - - 0 1").unwrap();
        let result = search.search_root(&pos, 4, -INFINITY, INFINITY).unwrap();
        assert!(result.value >= MATE_VALUE - 4);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn repetition_in_path_scores_as_draw() {
        let tt = TranspositionTable::new(1);
        let limits = SearchLimits::infinite(Arc::new(AtomicBool::new(false)));
        let pos = fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut search = Search::new(&tt, &limits, &[pos.key[0]]);
        let value = search.search(&pos, 1, -INFINITY, INFINITY, 2, NodeKind::Pv).unwrap();
        assert_eq!(value, DRAW_VALUE);
    }

    #[test]
    fn stalemate_scores_zero() {
        let tt = TranspositionTable::new(1);
        let limits = SearchLimits::infinite(Arc::new(AtomicBool::new(false)));
        let mut search = fresh(&tt, &limits);
        let pos = fen::parse("7k/8/6QK/8/8/8/8/8 b - - 0 1").unwrap();
        let mut list = chess_core::piece_move::MoveList::new();
        movegen::generate(&pos, &mut list);
        if list.is_empty() {
            let result = search.search_root(&pos, 1, -INFINITY, INFINITY).unwrap();
            assert_eq!(result.value, DRAW_VALUE);
        }
    }
}
