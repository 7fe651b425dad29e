//! Node-count perft tests against the standard reference positions (spec §8).

use chess_core::fen;
use chess_core::position::Position;
use chess_core::{movegen, piece_move::MoveList};

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

#[test]
fn startpos_perft() {
    let pos = Position::startpos();
    assert_eq!(perft(&pos, 1), 20);
    assert_eq!(perft(&pos, 2), 400);
    assert_eq!(perft(&pos, 3), 8902);
    assert_eq!(perft(&pos, 4), 197281);
}

#[test]
#[ignore = "expensive: run with `cargo test -- --ignored` for full-depth confidence"]
fn startpos_perft_depth_5() {
    let pos = Position::startpos();
    assert_eq!(perft(&pos, 5), 4865609);
}

#[test]
fn kiwipete_perft() {
    let pos = fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(perft(&pos, 1), 48);
    assert_eq!(perft(&pos, 2), 2039);
    assert_eq!(perft(&pos, 3), 97862);
}

#[test]
#[ignore = "expensive: run with `cargo test -- --ignored` for full-depth confidence"]
fn kiwipete_perft_depth_4() {
    let pos = fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(perft(&pos, 4), 4085603);
}

#[test]
fn endgame_position_3_perft() {
    let pos = fen::parse("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(perft(&pos, 1), 14);
    assert_eq!(perft(&pos, 2), 191);
    assert_eq!(perft(&pos, 3), 2812);
    assert_eq!(perft(&pos, 4), 43238);
}

#[test]
#[ignore = "expensive: run with `cargo test -- --ignored` for full-depth confidence"]
fn endgame_position_3_perft_depth_5() {
    let pos = fen::parse("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(perft(&pos, 5), 674624);
}

#[test]
fn position_4_mirrored_perft() {
    let pos = fen::parse("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1").unwrap();
    assert_eq!(perft(&pos, 1), 6);
    assert_eq!(perft(&pos, 2), 264);
    assert_eq!(perft(&pos, 3), 9467);
}

#[test]
#[ignore = "expensive: run with `cargo test -- --ignored` for full-depth confidence"]
fn position_4_mirrored_perft_depth_4() {
    let pos = fen::parse("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1").unwrap();
    assert_eq!(perft(&pos, 4), 422333);
}
