//! Thin console driver, grounded in the teacher's `src/main.rs` (a loop alternating two
//! searchers over a `Board`), adapted to play the engine against itself move by move
//! instead of pitting two bot implementations against each other, since this crate
//! exposes one engine behind the protocol surface rather than a library of bots.

use chess_core::movegen;
use chess_core::movetext::{self, Notation};
use chess_core::piece_move::MoveList;
use chess_engine::engine::Engine;

fn main() {
    let mut engine = Engine::new();
    engine.set_depth(6);

    let mut ply = 0;
    while ply < 100 {
        println!("{}", engine.current_fen());

        let mut list = MoveList::new();
        movegen::generate(engine.position(), &mut list);
        if list.is_empty() {
            println!("no legal moves, game over");
            break;
        }

        let Some(best) = engine.go(|iteration| {
            println!("info depth {} score {} nodes {}", iteration.depth, iteration.value, iteration.nodes);
        }) else {
            println!("search produced no move");
            break;
        };

        println!("bestmove {}", movetext::print_move(engine.position(), best, Notation::Coordinate));
        engine.play(best);
        ply += 1;
    }
}
