//! Castling-rights bitflags, kept as a dedicated small type rather than four loose
//! booleans so loss-of-rights can be expressed as a mask clear in one place.

use bitflags::bitflags;

bitflags! {
    /// Rights are always tagged `us`/`them`, matching the side-relative board: after a
    /// move flips the position, `US_K`/`US_Q` and `THEM_K`/`THEM_Q` swap meaning, not
    /// position.
    pub struct CastleRights: u8 {
        const US_K   = 0b0001;
        const US_Q   = 0b0010;
        const THEM_K = 0b0100;
        const THEM_Q = 0b1000;
        const US_ALL   = Self::US_K.bits | Self::US_Q.bits;
        const THEM_ALL = Self::THEM_K.bits | Self::THEM_Q.bits;
    }
}

impl CastleRights {
    /// Swaps the us/them halves — called whenever the board is flipped.
    #[inline]
    pub fn flip(self) -> CastleRights {
        let us = (self.bits & Self::US_ALL.bits) << 2;
        let them = (self.bits & Self::THEM_ALL.bits) >> 2;
        CastleRights::from_bits_truncate(us | them)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_swaps_sides() {
        let rights = CastleRights::US_K | CastleRights::THEM_Q;
        let flipped = rights.flip();
        assert!(flipped.contains(CastleRights::THEM_K));
        assert!(flipped.contains(CastleRights::US_Q));
        assert_eq!(flipped.flip(), rights);
    }
}
