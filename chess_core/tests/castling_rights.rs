//! Castling-rights bookkeeping around captures on the rook's home square.

use chess_core::fen;
use chess_core::movetext::{print_move, Notation};
use chess_core::piece_move::MoveList;
use chess_core::{castle::CastleRights, movegen};

#[test]
fn capturing_enemy_rook_on_its_home_square_clears_that_side_right() {
    let pos = fen::parse("r3k2r/8/6N1/8/8/8/8/4K3 w kq - 0 1").unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    let capture_h8 = list
        .as_slice()
        .iter()
        .copied()
        .find(|m| print_move(&pos, *m, Notation::Coordinate) == "g6h8")
        .expect("knight can take the rook on h8");

    let after = pos.make_move(capture_h8);
    assert!(!after.castle.contains(CastleRights::US_K));
    assert!(after.castle.contains(CastleRights::US_Q));
}

#[test]
fn stale_right_after_rook_capture_never_yields_a_phantom_castle() {
    let pos = fen::parse("r3k2r/8/6N1/8/8/8/8/4K3 w kq - 0 1").unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    let capture_h8 = list
        .as_slice()
        .iter()
        .copied()
        .find(|m| print_move(&pos, *m, Notation::Coordinate) == "g6h8")
        .unwrap();
    let after = pos.make_move(capture_h8);

    let mut replies = MoveList::new();
    movegen::generate(&after, &mut replies);
    assert!(!replies.as_slice().iter().any(|m| m.is_castle() && print_move(&after, *m, Notation::San) == "O-O"));
    assert!(replies.as_slice().iter().any(|m| m.is_castle() && print_move(&after, *m, Notation::San) == "O-O-O"));
}
