//! Drives the engine through randomly-reached positions, grounded in the teacher's
//! `tests/board_move_apply.rs::random_moves` walk.

use chess_core::piece_move::MoveList;
use chess_core::position::Position;
use chess_core::movegen;
use chess_engine::engine::Engine;

fn random_walk(seed: u64, plies: usize) -> Position {
    let mut pos = Position::startpos();
    let mut state = seed | 1;
    for _ in 0..plies {
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        if list.is_empty() {
            break;
        }
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let mv = list.as_slice()[(state as usize) % list.len()];
        pos = pos.make_move(mv);
    }
    pos
}

#[test]
fn search_never_panics_across_random_midgame_positions() {
    for seed in 0..8u64 {
        let pos = random_walk(rand::random::<u64>() ^ seed, 12);
        let mut engine = Engine::new();
        engine.set_board(&chess_core::fen::print(&pos)).unwrap();
        engine.set_depth(3);
        let mut iterations = 0;
        engine.go(|_| iterations += 1);
        assert!(iterations > 0);
    }
}

#[test]
fn perft_matches_brute_force_move_count_from_random_positions() {
    for seed in 0..4u64 {
        let pos = random_walk(rand::random::<u64>() ^ seed, 10);
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        let mut engine = Engine::new();
        engine.set_board(&chess_core::fen::print(&pos)).unwrap();
        assert_eq!(engine.perft(1), list.len() as u64);
    }
}
