//! Bitboard chess position model, legal move generation, and static evaluation.
//!
//! The board is always held from the side-to-move's own perspective: "us" is the side
//! about to move, "them" is the opponent, and "us" always moves north. A move applies
//! in place and then flips the whole position (mirrors every square, swaps the two
//! per-side halves of every array) so the next ply sees the same orientation again.
//! See [`position::Position`] for the full rationale.
//!
//! # Examples
//!
//! ```
//! use chess_core::position::Position;
//! use chess_core::{movegen, piece_move::MoveList};
//!
//! let pos = Position::startpos();
//! let mut list = MoveList::new();
//! movegen::generate(&pos, &mut list);
//! assert_eq!(list.len(), 20);
//! ```

#![allow(dead_code)]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

pub mod bit_twiddles;
pub mod bitboard;
pub mod castle;
pub mod error;
pub mod eval;
pub mod fen;
pub mod movegen;
pub mod movetext;
pub mod piece;
pub mod piece_move;
pub mod position;
pub mod see;
pub mod sq;
pub mod tables;
pub mod zobrist;

pub use bitboard::BitBoard;
pub use castle::CastleRights;
pub use error::{CoreError, FenError};
pub use piece_move::{Move, MoveList};
pub use position::Position;
pub use sq::{File, Rank, Sq};
