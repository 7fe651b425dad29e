//! Shared transposition table (spec §3.6, §4.6).
//!
//! Grounded in the teacher's `src/tt.rs` `Entry`/`Cluster`/`NodeBound` design, but replaces
//! its `Unique<Cluster>` raw heap allocation with a safe `Vec<AtomicU64>` bucket table: every
//! slot is a single packed word, read and written with relaxed atomic loads/stores so that a
//! torn read can only ever manifest as a hash mismatch (a miss), never a wrong value, per
//! spec §5.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use chess_core::movegen;
use chess_core::piece_move::{Move, MoveList};
use chess_core::position::Position;
use chess_core::sq::Sq;

/// Entries sharing a bucket; linearly scanned on probe and store.
pub const BUCKET_SIZE: usize = 8;

const BYTES_PER_MB: usize = 1024 * 1024;

const GEN_SHIFT: u32 = 0;
const GEN_BITS: u32 = 4;
const GEN_MASK: u64 = (1 << GEN_BITS) - 1;
const NO_NULL_SHIFT: u32 = GEN_SHIFT + GEN_BITS;
const BOUND_SHIFT: u32 = NO_NULL_SHIFT + 1;
const BOUND_MASK: u64 = 0b11;
const DEPTH_SHIFT: u32 = BOUND_SHIFT + 2;
const DEPTH_BITS: u32 = 7;
const DEPTH_MASK: u64 = (1 << DEPTH_BITS) - 1;
const TO_SHIFT: u32 = DEPTH_SHIFT + DEPTH_BITS;
const FROM_SHIFT: u32 = TO_SHIFT + 6;
const SQ_MASK: u64 = 0x3F;
const VALUE_SHIFT: u32 = FROM_SHIFT + 6;
const VALUE_MASK: u64 = 0xFFFF;
const HASH_SHIFT: u32 = VALUE_SHIFT + 16;

/// Designates how a stored value relates to the search window that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Bound {
    None = 0,
    Lower = 1,
    Upper = 2,
    Exact = 3,
}

impl Bound {
    fn from_bits(bits: u64) -> Bound {
        match bits {
            1 => Bound::Lower,
            2 => Bound::Upper,
            3 => Bound::Exact,
            _ => Bound::None,
        }
    }
}

/// A decoded, legality-checked probe result.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    pub found: bool,
    pub value: i32,
    pub depth: u8,
    pub bound: Bound,
    pub no_null: bool,
    pub best_move: Option<Move>,
}

impl Probe {
    fn miss() -> Probe {
        Probe {
            found: false,
            value: 0,
            depth: 0,
            bound: Bound::None,
            no_null: false,
            best_move: None,
        }
    }
}

fn prev_power_of_two(x: usize) -> usize {
    if x <= 1 {
        1
    } else {
        1 << (usize::BITS - 1 - x.leading_zeros())
    }
}

fn hash_upper(key: u64) -> u64 {
    key >> HASH_SHIFT
}

fn pack(hash_upper: u64, value: i32, from: Sq, to: Sq, depth: u8, bound: Bound, no_null: bool, generation: u8) -> u64 {
    (hash_upper << HASH_SHIFT)
        | (((value as i16 as u16) as u64 & VALUE_MASK) << VALUE_SHIFT)
        | ((from.0 as u64 & SQ_MASK) << FROM_SHIFT)
        | ((to.0 as u64 & SQ_MASK) << TO_SHIFT)
        | ((depth as u64 & DEPTH_MASK) << DEPTH_SHIFT)
        | (((bound as u64) & BOUND_MASK) << BOUND_SHIFT)
        | ((no_null as u64) << NO_NULL_SHIFT)
        | ((generation as u64 & GEN_MASK) << GEN_SHIFT)
}

struct Decoded {
    hash_upper: u64,
    value: i32,
    from: Sq,
    to: Sq,
    depth: u8,
    bound: Bound,
    no_null: bool,
    generation: u8,
}

fn unpack(word: u64) -> Decoded {
    Decoded {
        hash_upper: word >> HASH_SHIFT,
        value: (((word >> VALUE_SHIFT) & VALUE_MASK) as u16) as i16 as i32,
        from: Sq(((word >> FROM_SHIFT) & SQ_MASK) as u8),
        to: Sq(((word >> TO_SHIFT) & SQ_MASK) as u8),
        depth: ((word >> DEPTH_SHIFT) & DEPTH_MASK) as u8,
        bound: Bound::from_bits((word >> BOUND_SHIFT) & BOUND_MASK),
        no_null: (word >> NO_NULL_SHIFT) & 1 != 0,
        generation: ((word >> GEN_SHIFT) & GEN_MASK) as u8,
    }
}

/// Generation distance modulo the 4-bit counter, saturating at the counter's period.
fn generations_behind(entry_gen: u8, current_gen: u8) -> i32 {
    (current_gen.wrapping_sub(entry_gen) & (GEN_MASK as u8)) as i32
}

fn protection_score(d: &Decoded, current_gen: u8) -> i32 {
    let exact_bonus = if d.bound == Bound::Exact { 2 } else { 0 };
    d.depth as i32 + exact_bonus - 2 * generations_behind(d.generation, current_gen)
}

/// Shared, concurrently probed hash table from Zobrist key to cached search result.
pub struct TranspositionTable {
    slots: Vec<AtomicU64>,
    bucket_mask: u64,
    generation: AtomicU32,
}

impl TranspositionTable {
    /// Allocates a table of roughly `mb_size` megabytes, rounded down to the largest power
    /// of two number of buckets that fits.
    pub fn new(mb_size: usize) -> TranspositionTable {
        let bytes_budget = mb_size.max(1) * BYTES_PER_MB;
        let bucket_bytes = BUCKET_SIZE * std::mem::size_of::<u64>();
        let num_buckets = prev_power_of_two((bytes_budget / bucket_bytes).max(1));
        TranspositionTable::with_buckets(num_buckets)
    }

    fn with_buckets(num_buckets: usize) -> TranspositionTable {
        let num_buckets = num_buckets.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(num_buckets * BUCKET_SIZE);
        slots.resize_with(num_buckets * BUCKET_SIZE, || AtomicU64::new(0));
        TranspositionTable {
            slots,
            bucket_mask: (num_buckets - 1) as u64,
            generation: AtomicU32::new(0),
        }
    }

    pub fn size_megabytes(&self) -> usize {
        (self.slots.len() * std::mem::size_of::<u64>()) / BYTES_PER_MB
    }

    fn bucket_start(&self, key: u64) -> usize {
        ((key & self.bucket_mask) as usize) * BUCKET_SIZE
    }

    /// Advances the generation counter; reduces the protection of every surviving entry.
    pub fn new_generation(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn generation(&self) -> u8 {
        (self.generation.load(Ordering::Relaxed) & GEN_MASK as u32) as u8
    }

    /// Probes for `position`'s hash. A stale move hint (one that is no longer legal in
    /// `position`) is silently dropped rather than returned.
    pub fn probe(&self, position: &Position) -> Probe {
        let key = position.key[0];
        let wanted = hash_upper(key);
        let start = self.bucket_start(key);
        for slot in &self.slots[start..start + BUCKET_SIZE] {
            let word = slot.load(Ordering::Relaxed);
            if word == 0 {
                continue;
            }
            let d = unpack(word);
            if d.hash_upper == wanted {
                let best_move = reconstruct_move(position, d.from, d.to);
                return Probe {
                    found: true,
                    value: d.value,
                    depth: d.depth,
                    bound: d.bound,
                    no_null: d.no_null,
                    best_move,
                };
            }
        }
        Probe::miss()
    }

    /// Stores a search result, preferring to update an existing same-position entry and
    /// otherwise replacing the least-protected slot in the bucket.
    pub fn store(&self, position: &Position, depth: u8, value: i32, best_move: Option<Move>, bound: Bound, no_null: bool) {
        let key = position.key[0];
        let wanted = hash_upper(key);
        let start = self.bucket_start(key);
        let bucket = &self.slots[start..start + BUCKET_SIZE];
        let current_gen = self.generation();

        let (from, to) = best_move.map(|m| (m.from(), m.to())).unwrap_or((Sq(0), Sq(0)));

        for slot in bucket {
            let word = slot.load(Ordering::Relaxed);
            if word == 0 {
                slot.store(pack(wanted, value, from, to, depth, bound, no_null, current_gen), Ordering::Relaxed);
                return;
            }
            let d = unpack(word);
            if d.hash_upper == wanted {
                let (keep_from, keep_to) = if best_move.is_some() { (from, to) } else { (d.from, d.to) };
                slot.store(pack(wanted, value, keep_from, keep_to, depth, bound, no_null, current_gen), Ordering::Relaxed);
                return;
            }
        }

        let mut victim = &bucket[0];
        let mut victim_score = protection_score(&unpack(victim.load(Ordering::Relaxed)), current_gen);
        for slot in &bucket[1..] {
            let score = protection_score(&unpack(slot.load(Ordering::Relaxed)), current_gen);
            if score < victim_score {
                victim = slot;
                victim_score = score;
            }
        }
        victim.store(pack(wanted, value, from, to, depth, bound, no_null, current_gen), Ordering::Relaxed);
    }

    /// Zeroes every slot without resizing.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

fn reconstruct_move(position: &Position, from: Sq, to: Sq) -> Option<Move> {
    if from.0 == to.0 {
        return None;
    }
    let mut list = MoveList::new();
    movegen::generate(position, &mut list);
    list.as_slice().iter().copied().find(|m| m.matches_from_to(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::position::Position;

    #[test]
    fn probe_on_empty_table_misses() {
        let tt = TranspositionTable::new(1);
        let pos = Position::startpos();
        assert!(!tt.probe(&pos).found);
    }

    #[test]
    fn store_then_probe_round_trips() {
        let tt = TranspositionTable::new(1);
        let pos = Position::startpos();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        let mv = list.as_slice()[0];
        tt.store(&pos, 4, 37, Some(mv), Bound::Exact, false);
        let probe = tt.probe(&pos);
        assert!(probe.found);
        assert_eq!(probe.value, 37);
        assert_eq!(probe.depth, 4);
        assert_eq!(probe.bound, Bound::Exact);
        assert_eq!(probe.best_move, Some(mv));
    }

    #[test]
    fn stale_hint_is_dropped_not_returned() {
        // Build the table, store an entry under the startpos key with a bogus move hint,
        // then probe from a different position that happens to collide in the same bucket
        // is out of scope here; instead verify a hint whose (from, to) is not a legal move
        // in the probed position is silently treated as absent.
        let tt = TranspositionTable::with_buckets(1);
        let pos = Position::startpos();
        let bogus_from = Sq(0);
        let bogus_to = Sq(1);
        let word = pack(hash_upper(pos.key[0]), 0, bogus_from, bogus_to, 1, Bound::Exact, false, 0);
        tt.slots[0].store(word, Ordering::Relaxed);
        let probe = tt.probe(&pos);
        assert!(probe.found);
        assert!(probe.best_move.is_none());
    }

    #[test]
    fn new_generation_lowers_protection_of_old_entries() {
        let tt = TranspositionTable::with_buckets(1);
        let pos = Position::startpos();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        for (i, mv) in list.as_slice().iter().take(BUCKET_SIZE).enumerate() {
            tt.store(&pos, (i + 1) as u8, 0, Some(*mv), Bound::Exact, false);
        }
        tt.new_generation();
        tt.new_generation();
        // A fresh, shallow entry for an unrelated key should now be able to evict one of
        // the prior generation's entries rather than growing the table.
        assert_eq!(tt.slots.len(), BUCKET_SIZE);
    }
}
