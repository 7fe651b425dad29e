//! Precomputed Zobrist random keys (spec §2.11).
//!
//! Generated once at startup with a fixed-seed PRNG (so hash values are stable across
//! runs, which matters for reproducing perft/search node counts), then read-only for
//! the program's lifetime — the same "initialize once behind `lazy_static!`" pattern
//! used for the attack tables in [`crate::tables`].

use lazy_static::lazy_static;

use crate::piece::PIECE_TYPE_CNT;
use crate::sq::SQ_CNT;

/// A small xorshift64* PRNG; deterministic and dependency-free, grounded in the
/// teacher's own `pleco::tools::prng::PRNG` (also a from-scratch xorshift variant).
struct Prng(u64);

impl Prng {
    fn new(seed: u64) -> Self {
        Prng(seed | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

pub struct ZobristTables {
    /// `piece_square[side][piece_type][square]`
    pub piece_square: [[[u64; SQ_CNT]; PIECE_TYPE_CNT]; 2],
    /// One toggle per castling right: us-king, us-queen, them-king, them-queen.
    pub castle: [u64; 4],
    /// One toggle per file, used only when an en-passant capture is actually available.
    pub ep_file: [u64; 8],
    /// Toggled whenever the side to move changes (keeps `key[0]`/`key[1]` symmetric).
    pub side: u64,
}

fn build() -> ZobristTables {
    let mut rng = Prng::new(0x9E37_79B9_7F4A_7C15);
    let mut piece_square = [[[0u64; SQ_CNT]; PIECE_TYPE_CNT]; 2];
    for side in piece_square.iter_mut() {
        for pt in side.iter_mut() {
            for sq in pt.iter_mut() {
                *sq = rng.next();
            }
        }
    }
    let mut castle = [0u64; 4];
    for c in castle.iter_mut() {
        *c = rng.next();
    }
    let mut ep_file = [0u64; 8];
    for e in ep_file.iter_mut() {
        *e = rng.next();
    }
    ZobristTables {
        piece_square,
        castle,
        ep_file,
        side: rng.next(),
    }
}

lazy_static! {
    pub static ref ZOBRIST: ZobristTables = build();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_enough() {
        let mut seen = std::collections::HashSet::new();
        for side in &ZOBRIST.piece_square {
            for pt in side {
                for &k in pt {
                    assert!(seen.insert(k), "duplicate zobrist key");
                }
            }
        }
    }

    #[test]
    fn side_key_nonzero() {
        assert_ne!(ZOBRIST.side, 0);
    }
}
