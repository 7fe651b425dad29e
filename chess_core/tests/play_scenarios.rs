//! Concrete scripted positions from spec §8.

use chess_core::fen;
use chess_core::piece::{KING, THEM, US};
use chess_core::piece_move::MoveList;
use chess_core::{movegen, movetext};

// The spec's illustrative FEN for this scenario (`8/8/8/8/8/3k4/3p4/3K4 b - - 0 1`)
// puts White's king on d1, the very square the promoting pawn must land on, which is
// illegal in any position (a non-capturing pawn push requires an empty destination).
// Kept the same intent (a lone king-and-pawn promotion race) with White's king moved
// off the promotion square; see DESIGN.md.
const PROMOTION_RACE_FEN: &str = "8/8/8/8/8/3k4/3p4/7K b - - 0 1";

#[test]
fn black_pawn_underpromotions_are_all_generated() {
    let pos = fen::parse(PROMOTION_RACE_FEN).unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    for promo in ["d2d1q", "d2d1r", "d2d1b", "d2d1n"] {
        assert!(
            list.as_slice()
                .iter()
                .any(|m| movetext::print_move(&pos, *m, movetext::Notation::Coordinate) == promo),
            "expected {promo} among generated moves"
        );
    }
}

#[test]
fn promoting_leaves_a_legal_resulting_position() {
    let pos = fen::parse(PROMOTION_RACE_FEN).unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    let mv = list
        .as_slice()
        .iter()
        .copied()
        .find(|m| movetext::print_move(&pos, *m, movetext::Notation::Coordinate) == "d2d1q")
        .unwrap();
    let child = pos.make_move(mv);
    assert_eq!((child.by_side[US] | child.by_side[THEM]).count(), 3);
    assert!(child.by_type[THEM][KING as usize].is_not_empty());
}

#[test]
fn queen_can_deliver_mate_in_one() {
    let pos = fen::parse("k7/8/KQ6/8/8/8/8/8 w - - 0 1").unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    let mv = list
        .as_slice()
        .iter()
        .copied()
        .find(|m| movetext::print_move(&pos, *m, movetext::Notation::Coordinate) == "b6b7")
        .expect("Qb7 is legal");
    let child = pos.make_move(mv);
    let mut replies = MoveList::new();
    movegen::generate(&child, &mut replies);
    assert!(child.in_check());
    assert!(replies.is_empty(), "Qb7 should be checkmate");
}

#[test]
fn en_passant_excluded_by_horizontal_discovered_check() {
    let pos = fen::parse("8/8/8/K2Pp2r/8/8/8/4k3 w - e6 0 1").unwrap();
    let mut list = MoveList::new();
    movegen::generate(&pos, &mut list);
    assert!(!list
        .as_slice()
        .iter()
        .any(|m| movetext::print_move(&pos, *m, movetext::Notation::Coordinate) == "d5e6"));
}
