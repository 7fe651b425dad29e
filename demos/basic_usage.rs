use chess_core::movetext::{self, Notation};
use chess_engine::engine::Engine;

fn main() {
    let mut engine = Engine::new();
    engine.set_depth(5);

    let root = engine.position().clone();
    let best = engine.go(|iteration| {
        println!("depth {} score {} nodes {}", iteration.depth, iteration.value, iteration.nodes);
    });

    if let Some(mv) = best {
        println!("played {}", movetext::print_move(&root, mv, Notation::Coordinate));
        engine.play(mv);
        println!("{}", engine.current_fen());
    }
}
