//! Static evaluation (spec §4.5): a centipawn score from the side-to-move's
//! perspective, built as a weighted sum of orthogonal terms over the precomputed
//! bitboards [`Position`] already carries.

use crate::bitboard::BitBoard;
use crate::castle::CastleRights;
use crate::piece::{BISHOP, KNIGHT, PAWN, QUEEN, ROOK, THEM, US};
use crate::position::{Position, PIECE_VALUE};
use crate::sq::{File, Rank, Sq};
use crate::tables::{DARK_SQUARES, FILE_BB, KNIGHT_ATTACKS, LIGHT_SQUARES, RANK_BB};

const MOBILITY_WEIGHT: i32 = 2;
const FREE_SQUARE_BONUS: i32 = 1;
const CENTER_BONUS: i32 = 12;
const ROOK_OPEN_FILE_BONUS: i32 = 20;
const ROOK_HALF_OPEN_FILE_BONUS: i32 = 10;
const ROOK_BATTERY_BONUS: i32 = 15;
const ROOK_TRAPPED_PENALTY: i32 = 40;
const BISHOP_PAIR_BONUS: i32 = 30;
const BISHOP_TRAPPED_PENALTY: i32 = 80;
const KNIGHT_OUTPOST_BONUS: i32 = 18;
const KNIGHT_RIM_PENALTY: i32 = 8;
const KNIGHT_CORNERED_PENALTY: i32 = 25;
const ISOLATED_PAWN_PENALTY: i32 = 12;
const DOUBLED_PAWN_PENALTY: i32 = 10;
const PAWN_CHAIN_BONUS: i32 = 6;
const BLOCKED_PAWN_PENALTY: i32 = 6;
const BACKWARD_PAWN_PENALTY: i32 = 8;
const PASSED_PAWN_RANK_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];
const PASSED_PAWN_ADVANCED_DEFENDED_BONUS: i32 = 20;
const KING_SHIELD_BONUS: i32 = 8;
const KING_OPEN_FILE_PENALTY: i32 = 15;
const KING_SEMI_OPEN_FILE_PENALTY: i32 = 8;
const PAWN_STORM_PENALTY: i32 = 6;
const CASTLED_KING_BONUS: i32 = 15;
const CASTLE_RIGHTS_BONUS: i32 = 6;
const HANGING_PIECE_WEIGHT: i32 = 1;

/// Squares where a bishop boxed in by its own advance (or retreat) and an enemy pawn on the
/// escape diagonal has no safe square to move to: (bishop file/rank, blocking enemy-pawn
/// file/rank), always in the us-relative frame.
const TRAPPED_BISHOP_PATTERNS: [(File, Rank, File, Rank); 4] = [
    (File::A, Rank::R7, File::B, Rank::R6),
    (File::H, Rank::R7, File::G, Rank::R6),
    (File::A, Rank::R2, File::B, Rank::R3),
    (File::H, Rank::R2, File::G, Rank::R3),
];

/// Returns a centipawn score from `pos`'s side-to-move's perspective. Never returns a
/// value anywhere near a mate score; those are produced only by the search.
pub fn evaluate(pos: &Position) -> i32 {
    material(pos)
        + mobility(pos)
        + center_control(pos)
        + rook_placement(pos)
        + bishop_placement(pos)
        + knight_placement(pos)
        + pawn_structure(pos)
        + passed_pawns(pos)
        + king_safety(pos)
        + threats(pos)
}

fn material(pos: &Position) -> i32 {
    pos.material[US] - pos.material[THEM]
}

fn mobility(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let mob = pos.attacks[side].count() as i32;
        score += sign * mob * MOBILITY_WEIGHT;
        let enemy_half = if side == US { RANK_BB[4..8].iter().fold(BitBoard::EMPTY, |a, &b| a | b) } else { RANK_BB[0..4].iter().fold(BitBoard::EMPTY, |a, &b| a | b) };
        if pos.by_side[crate::piece::opposite(side)].is_not_empty() {
            score += sign * (pos.attacks[side] & enemy_half).count() as i32;
        }
        let undefended = pos.attacks[side] & !pos.attacks[crate::piece::opposite(side)] & !pos.by_side[side];
        score += sign * undefended.count() as i32 * FREE_SQUARE_BONUS;
    }
    score
}

fn center_control(pos: &Position) -> i32 {
    let center = Sq::make(crate::sq::File::D, crate::sq::Rank::R4).to_bb()
        | Sq::make(crate::sq::File::E, crate::sq::Rank::R4).to_bb()
        | Sq::make(crate::sq::File::D, crate::sq::Rank::R5).to_bb()
        | Sq::make(crate::sq::File::E, crate::sq::Rank::R5).to_bb();
    let total_material = pos.material[US] + pos.material[THEM];
    let scale = if total_material > 0 { (total_material.min(6000)) as i32 } else { 1 };
    let us_center = (pos.by_type[US][PAWN as usize] & center).count() as i32;
    let them_center = (pos.by_type[THEM][PAWN as usize] & center).count() as i32;
    (us_center - them_center) * CENTER_BONUS * scale / 6000
}

fn rook_placement(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let rooks = pos.by_type[side][ROOK as usize];
        let mut iter = rooks;
        while let Some(sq) = iter.pop_some_lsb() {
            let file = FILE_BB[sq.file_idx() as usize];
            let any_pawns = pos.by_type[US][PAWN as usize] | pos.by_type[THEM][PAWN as usize];
            let open = (file & any_pawns).is_empty();
            if pos.half_open_files[side].test_sq(sq) {
                if open {
                    score += sign * ROOK_OPEN_FILE_BONUS;
                } else {
                    score += sign * ROOK_HALF_OPEN_FILE_BONUS;
                }
            }
        }
        for file_idx in 0..8usize {
            if (rooks & FILE_BB[file_idx]).count() >= 2 {
                score += sign * ROOK_BATTERY_BONUS;
            }
        }
        score -= sign * rook_trapped_penalty(pos, side, rooks);
    }
    score
}

/// A rook still sitting in its starting corner, boxed in by its own king, with the
/// castling right that would have freed it already gone.
fn rook_trapped_penalty(pos: &Position, side: usize, rooks: BitBoard) -> i32 {
    let king = pos.king_sq[side];
    if !king.is_ok() {
        return 0;
    }
    let home_rank = if side == US { 0u8 } else { 7u8 };
    if king.rank_idx() != home_rank {
        return 0;
    }
    let rooks_home = rooks & RANK_BB[home_rank as usize];
    let (kingside_right, queenside_right) = if side == US {
        (CastleRights::US_K, CastleRights::US_Q)
    } else {
        (CastleRights::THEM_K, CastleRights::THEM_Q)
    };
    let king_file = king.file_idx();
    let home_rank_enum = Rank::ALL[home_rank as usize];
    let kingside_trapped = !pos.castle.contains(kingside_right)
        && (king_file == 5 || king_file == 6)
        && rooks_home.test_sq(Sq::make(File::H, home_rank_enum));
    let queenside_trapped = !pos.castle.contains(queenside_right)
        && (king_file == 1 || king_file == 2)
        && rooks_home.test_sq(Sq::make(File::A, home_rank_enum));
    if kingside_trapped || queenside_trapped {
        ROOK_TRAPPED_PENALTY
    } else {
        0
    }
}

fn bishop_placement(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let bishops = pos.by_type[side][BISHOP as usize];
        if bishops.more_than_one() {
            let pawns = pos.by_type[side][PAWN as usize].count() as i32;
            score += sign * (BISHOP_PAIR_BONUS + (8 - pawns).max(0));
        }
        let on_dark = (bishops & DARK_SQUARES).count() as i32;
        let on_light = (bishops & LIGHT_SQUARES).count() as i32;
        let own_pawns_dark = (pos.by_type[side][PAWN as usize] & DARK_SQUARES).count() as i32;
        let own_pawns_light = (pos.by_type[side][PAWN as usize] & LIGHT_SQUARES).count() as i32;
        score -= sign * (on_dark * own_pawns_dark / 8 + on_light * own_pawns_light / 8);
        score -= sign * bishop_trapped_penalty(pos, side);
    }
    score
}

/// A bishop stuck on a7/h7/a2/h2 (us-relative; mirrored for "them") with the escape
/// diagonal blocked by an enemy pawn and no other square to run to.
fn bishop_trapped_penalty(pos: &Position, side: usize) -> i32 {
    let enemy = crate::piece::opposite(side);
    let bishops = pos.by_type[side][BISHOP as usize];
    let enemy_pawns = pos.by_type[enemy][PAWN as usize];
    let mut penalty = 0;
    for &(bishop_file, bishop_rank, pawn_file, pawn_rank) in &TRAPPED_BISHOP_PATTERNS {
        let bishop_sq = Sq::make(bishop_file, bishop_rank);
        let pawn_sq = Sq::make(pawn_file, pawn_rank);
        let (bishop_sq, pawn_sq) = if side == US { (bishop_sq, pawn_sq) } else { (bishop_sq.mirror_rank(), pawn_sq.mirror_rank()) };
        if bishops.test_sq(bishop_sq) && enemy_pawns.test_sq(pawn_sq) {
            penalty += BISHOP_TRAPPED_PENALTY;
        }
    }
    penalty
}

fn knight_placement(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let enemy = crate::piece::opposite(side);
        let mut knights = pos.by_type[side][KNIGHT as usize];
        while let Some(sq) = knights.pop_some_lsb() {
            let defended_by_pawn = pos.attacks_by_type[side][PAWN as usize].test_sq(sq);
            let challengeable = pos.pawn_attack_reach[enemy].test_sq(sq);
            if defended_by_pawn && !challengeable {
                score += sign * KNIGHT_OUTPOST_BONUS;
            }

            let file_idx = sq.file_idx();
            if file_idx == 0 || file_idx == 7 {
                score -= sign * KNIGHT_RIM_PENALTY;
            }

            let deep = if side == US { sq.rank_idx() >= 6 } else { sq.rank_idx() <= 1 };
            if deep {
                let escape = KNIGHT_ATTACKS[sq.idx()] & !pos.by_side[side] & !pos.pawn_attack_reach[enemy];
                if escape.is_empty() {
                    score -= sign * KNIGHT_CORNERED_PENALTY;
                }
            }
        }
    }
    score
}

fn pawn_structure(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let enemy = crate::piece::opposite(side);
        let pawns = pos.by_type[side][PAWN as usize];
        let enemy_pawns = pos.by_type[enemy][PAWN as usize];
        for file_idx in 0..8usize {
            let file_pawns = pawns & FILE_BB[file_idx];
            let count = file_pawns.count() as i32;
            if count == 0 {
                continue;
            }
            if count > 1 {
                score -= sign * DOUBLED_PAWN_PENALTY * (count - 1);
            }
            let west = if file_idx > 0 { pawns & FILE_BB[file_idx - 1] } else { BitBoard::EMPTY };
            let east = if file_idx < 7 { pawns & FILE_BB[file_idx + 1] } else { BitBoard::EMPTY };
            if west.is_empty() && east.is_empty() {
                score -= sign * ISOLATED_PAWN_PENALTY;
            }
        }

        let mut iter = pawns;
        while let Some(sq) = iter.pop_some_lsb() {
            let file_idx = sq.file_idx() as usize;
            let rank_idx = sq.rank_idx();

            let behind_rank = if side == US { rank_idx.checked_sub(1) } else { Some(rank_idx + 1).filter(|&r| r < 8) };
            if let Some(behind_rank) = behind_rank {
                let mut chained = false;
                if file_idx > 0 && pawns.test_sq(Sq::make(File::ALL[file_idx - 1], Rank::ALL[behind_rank as usize])) {
                    chained = true;
                }
                if file_idx < 7 && pawns.test_sq(Sq::make(File::ALL[file_idx + 1], Rank::ALL[behind_rank as usize])) {
                    chained = true;
                }
                if chained {
                    score += sign * PAWN_CHAIN_BONUS;
                }
            }

            let ahead_rank = if side == US { rank_idx + 1 } else { rank_idx.wrapping_sub(1) };
            let ahead_sq = if ahead_rank < 8 { Some(Sq::make(File::ALL[file_idx], Rank::ALL[ahead_rank as usize])) } else { None };
            if let Some(ahead_sq) = ahead_sq {
                if enemy_pawns.test_sq(ahead_sq) {
                    score -= sign * BLOCKED_PAWN_PENALTY;
                }
            }

            let home_pawn_rank = if side == US { 1u8 } else { 6u8 };
            if rank_idx != home_pawn_rank {
                let mut supported_from_behind = false;
                for neighbor_file in [file_idx.checked_sub(1), Some(file_idx + 1).filter(|&f| f < 8)].into_iter().flatten() {
                    let neighbor_pawns = pawns & FILE_BB[neighbor_file];
                    let behind = if side == US { neighbor_pawns & forward_ranks(rank_idx, false) } else { neighbor_pawns & forward_ranks(rank_idx, true) };
                    if behind.is_not_empty() {
                        supported_from_behind = true;
                    }
                }
                if !supported_from_behind {
                    if let Some(ahead_sq) = ahead_sq {
                        if pos.pawn_attack_reach[enemy].test_sq(ahead_sq) {
                            score -= sign * BACKWARD_PAWN_PENALTY;
                        }
                    }
                }
            }
        }
    }
    score
}

fn passed_pawns(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let enemy = crate::piece::opposite(side);
        let mut pawns = pos.by_type[side][PAWN as usize];
        while let Some(sq) = pawns.pop_some_lsb() {
            let file_idx = sq.file_idx() as usize;
            let mut span = FILE_BB[file_idx];
            if file_idx > 0 {
                span |= FILE_BB[file_idx - 1];
            }
            if file_idx < 7 {
                span |= FILE_BB[file_idx + 1];
            }
            let ahead = if side == US {
                span & forward_ranks(sq.rank_idx(), true)
            } else {
                span & forward_ranks(sq.rank_idx(), false)
            };
            if (pos.by_type[enemy][PAWN as usize] & ahead).is_empty() {
                let rank = if side == US { sq.rank_idx() } else { 7 - sq.rank_idx() };
                score += sign * PASSED_PAWN_RANK_BONUS[rank as usize];
                if rank >= 5 && pos.attackers_of(sq, side).is_not_empty() {
                    score += sign * PASSED_PAWN_ADVANCED_DEFENDED_BONUS;
                }
            }
        }
    }
    score
}

fn forward_ranks(rank_idx: u8, north: bool) -> BitBoard {
    let mut bb = BitBoard::EMPTY;
    if north {
        for r in (rank_idx as usize + 1)..8 {
            bb |= RANK_BB[r];
        }
    } else {
        for r in 0..rank_idx as usize {
            bb |= RANK_BB[r];
        }
    }
    bb
}

fn king_safety(pos: &Position) -> i32 {
    let mut score = 0;
    for side in [US, THEM] {
        let sign = if side == US { 1 } else { -1 };
        let enemy = crate::piece::opposite(side);
        let king = pos.king_sq[side];
        if !king.is_ok() {
            continue;
        }
        let enemy_pawn_material = pos.by_type[enemy][PAWN as usize].count() as i32 * PIECE_VALUE[PAWN as usize];
        let scale = (pos.material[enemy] - enemy_pawn_material).clamp(0, 6000);

        let file_idx = king.file_idx() as usize;
        let mut shield_files = FILE_BB[file_idx];
        if file_idx > 0 {
            shield_files |= FILE_BB[file_idx - 1];
        }
        if file_idx < 7 {
            shield_files |= FILE_BB[file_idx + 1];
        }

        let shield_rank = if side == US { king.rank_idx() + 1 } else { king.rank_idx().wrapping_sub(1) };
        if shield_rank < 8 {
            let shield = pos.by_type[side][PAWN as usize] & shield_files & RANK_BB[shield_rank as usize];
            score += sign * shield.count() as i32 * KING_SHIELD_BONUS * scale / 6000;
        }

        let ring = crate::tables::KING_ATTACKS[king.idx()];
        let pressure = (pos.attacks[enemy] & ring).count() as i32;
        score -= sign * pressure * scale / 6000;

        let any_pawns = pos.by_type[US][PAWN as usize] | pos.by_type[THEM][PAWN as usize];
        for file in 0..8usize {
            if (shield_files & FILE_BB[file]).is_empty() {
                continue;
            }
            let own_pawn_on_file = (pos.by_type[side][PAWN as usize] & FILE_BB[file]).is_not_empty();
            let file_has_any_pawn = (any_pawns & FILE_BB[file]).is_not_empty();
            if !file_has_any_pawn {
                score -= sign * KING_OPEN_FILE_PENALTY * scale / 6000;
            } else if !own_pawn_on_file {
                score -= sign * KING_SEMI_OPEN_FILE_PENALTY * scale / 6000;
            }
        }

        let mut storming_pawns = pos.by_type[enemy][PAWN as usize] & shield_files;
        let mut storm = 0i32;
        while let Some(sq) = storming_pawns.pop_some_lsb() {
            if sq.rank_idx().abs_diff(king.rank_idx()) <= 3 {
                storm += 1;
            }
        }
        score -= sign * storm * PAWN_STORM_PENALTY * scale / 6000;

        let home_rank = if side == US { 0u8 } else { 7u8 };
        let castled = king.rank_idx() == home_rank && (king.file_idx() == 6 || king.file_idx() == 2);
        if castled {
            score += sign * CASTLED_KING_BONUS;
        } else {
            let (kingside_right, queenside_right) = if side == US {
                (CastleRights::US_K, CastleRights::US_Q)
            } else {
                (CastleRights::THEM_K, CastleRights::THEM_Q)
            };
            if pos.castle.contains(kingside_right) || pos.castle.contains(queenside_right) {
                score += sign * CASTLE_RIGHTS_BONUS;
            }
        }
    }
    score
}

fn threats(pos: &Position) -> i32 {
    let mut us_loss = 0i32;
    for v in pos.hanging_value.iter() {
        us_loss += *v as i32;
    }
    let flipped = pos.flip();
    let mut them_loss = 0i32;
    for v in flipped.hanging_value.iter() {
        them_loss += *v as i32;
    }
    (them_loss - us_loss) * HANGING_PIECE_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    #[test]
    fn startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn extra_queen_is_a_large_advantage() {
        let pos = fen::parse("4k3/8/8/8/8/8/8/QQQQK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > PIECE_VALUE[QUEEN as usize] * 3);
    }
}
