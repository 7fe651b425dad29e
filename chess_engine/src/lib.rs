//! Transposition table, move ordering, alpha-beta search, and the iterative-deepening
//! driver and protocol surface built on top of `chess_core`.

#![allow(dead_code)]

pub mod driver;
pub mod engine;
pub mod error;
pub mod movepick;
pub mod search;
pub mod time;
pub mod tt;

pub use driver::{Driver, Iteration};
pub use engine::Engine;
pub use error::EngineError;
pub use tt::TranspositionTable;
