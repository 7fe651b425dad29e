//! Legal move generation (spec §4.3).
//!
//! Works entirely off the bitboards [`crate::position::Position`] already maintains
//! (`king_attackers`, `pinned`, `king_danger`), so generation itself never has to
//! walk rays to discover check/pin state — only to apply it.

use crate::bitboard::BitBoard;
use crate::piece::{code_type, piece_code, BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK, THEM, US};
use crate::piece_move::{Move, MoveList, MoveType};
use crate::position::Position;
use crate::sq::{File, Sq};
use crate::tables::{self, KING_ATTACKS, KNIGHT_ATTACKS, LINE_BB, PAWN_ATTACKS, RANK_BB};

const PROMOTION_PIECES: [u8; 4] = [QUEEN, ROOK, BISHOP, KNIGHT];

/// Every strictly legal move, terminated implicitly by `list`'s own length.
pub fn generate(position: &Position, list: &mut MoveList) {
    generate_impl(position, list, false);
}

/// Captures, en-passant, and queen promotions only (spec §4.3: used inside quiescence).
pub fn generate_captures(position: &Position, list: &mut MoveList) {
    generate_impl(position, list, true);
}

fn generate_impl(position: &Position, list: &mut MoveList, captures_only: bool) {
    let checker_count = position.checkers.count();

    if checker_count >= 2 {
        generate_king_moves(position, list, captures_only);
        return;
    }

    let target_mask = if checker_count == 1 {
        position.king_attackers
    } else if captures_only {
        position.by_side[THEM]
    } else {
        BitBoard::ALL
    };

    generate_pawn_moves(position, list, target_mask, captures_only);
    generate_piece_moves(position, list, KNIGHT, target_mask, captures_only);
    generate_piece_moves(position, list, BISHOP, target_mask, captures_only);
    generate_piece_moves(position, list, ROOK, target_mask, captures_only);
    generate_piece_moves(position, list, QUEEN, target_mask, captures_only);
    generate_king_moves(position, list, captures_only);

    if checker_count == 0 && !captures_only {
        generate_castling(position, list);
    }
}

fn pin_restriction(position: &Position, from: Sq) -> BitBoard {
    if position.pinned[US].test_sq(from) {
        LINE_BB[position.king_sq[US].idx()][from.idx()]
    } else {
        BitBoard::ALL
    }
}

fn generate_piece_moves(
    position: &Position,
    list: &mut MoveList,
    piece_type: u8,
    target_mask: BitBoard,
    captures_only: bool,
) {
    let mut pieces = position.by_type[US][piece_type as usize];
    while let Some(from) = pieces.pop_some_lsb() {
        let reach = match piece_type {
            KNIGHT => KNIGHT_ATTACKS[from.idx()],
            BISHOP => tables::sliding_attacks(from, position.all_occ, false),
            ROOK => tables::sliding_attacks(from, position.all_occ, true),
            QUEEN => {
                tables::sliding_attacks(from, position.all_occ, true)
                    | tables::sliding_attacks(from, position.all_occ, false)
            }
            _ => unreachable!(),
        };
        let allowed = reach & !position.by_side[US] & target_mask & pin_restriction(position, from);
        let mut dests = if captures_only {
            allowed & position.by_side[THEM]
        } else {
            allowed
        };
        while let Some(to) = dests.pop_some_lsb() {
            let captured = position.piece_at(to);
            list.push(Move::new(
                from,
                to,
                piece_code(piece_type, US),
                captured,
                MoveType::General,
            ));
        }
    }
}

fn generate_king_moves(position: &Position, list: &mut MoveList, captures_only: bool) {
    let from = position.king_sq[US];
    let allowed = KING_ATTACKS[from.idx()] & !position.by_side[US] & !position.king_danger;
    let mut dests = if captures_only {
        allowed & position.by_side[THEM]
    } else {
        allowed
    };
    while let Some(to) = dests.pop_some_lsb() {
        let captured = position.piece_at(to);
        list.push(Move::new(from, to, piece_code(KING, US), captured, MoveType::General));
    }
}

fn generate_castling(position: &Position, list: &mut MoveList) {
    use crate::castle::CastleRights;
    let rank = position.king_sq[US].rank();
    let king_from = Sq::make(File::E, rank);
    if position.king_sq[US] != king_from {
        return;
    }

    if position.castle.contains(CastleRights::US_K) {
        let f = Sq::make(File::F, rank);
        let g = Sq::make(File::G, rank);
        let h = Sq::make(File::H, rank);
        let rook_present = position.by_type[US][ROOK as usize].test_sq(h);
        let path_clear = (position.all_occ & (f.to_bb() | g.to_bb())).is_empty();
        let path_safe = !position.king_danger.test_sq(f) && !position.king_danger.test_sq(g);
        if rook_present && path_clear && path_safe {
            list.push(Move::new(
                king_from,
                g,
                piece_code(KING, US),
                crate::piece::EMPTY,
                MoveType::CastleKingSide,
            ));
        }
    }
    if position.castle.contains(CastleRights::US_Q) {
        let d = Sq::make(File::D, rank);
        let c = Sq::make(File::C, rank);
        let b = Sq::make(File::B, rank);
        let a = Sq::make(File::A, rank);
        let rook_present = position.by_type[US][ROOK as usize].test_sq(a);
        let path_clear = (position.all_occ & (d.to_bb() | c.to_bb() | b.to_bb())).is_empty();
        let path_safe = !position.king_danger.test_sq(d) && !position.king_danger.test_sq(c);
        if rook_present && path_clear && path_safe {
            list.push(Move::new(
                king_from,
                c,
                piece_code(KING, US),
                crate::piece::EMPTY,
                MoveType::CastleQueenSide,
            ));
        }
    }
}

fn push_pawn_move(list: &mut MoveList, from: Sq, to: Sq, captured: u8, on_last_rank: bool, mt: MoveType, captures_only: bool) {
    if on_last_rank {
        for &pt in &PROMOTION_PIECES {
            if captures_only && pt != QUEEN {
                continue;
            }
            list.push(Move::new(from, to, piece_code(pt, US), captured, MoveType::Promotion));
        }
    } else {
        list.push(Move::new(from, to, piece_code(PAWN, US), captured, mt));
    }
}

fn generate_pawn_moves(position: &Position, list: &mut MoveList, target_mask: BitBoard, captures_only: bool) {
    let pawns = position.by_type[US][PAWN as usize];
    let empty = !position.all_occ;
    let last_rank = RANK_BB[7];

    let single = pawns.shift_n() & empty;
    let mut promo = single & last_rank & target_mask;
    while let Some(to) = promo.pop_some_lsb() {
        let from = Sq(to.0 - 8);
        if pin_restriction(position, from).test_sq(to) {
            push_pawn_move(list, from, to, crate::piece::EMPTY, true, MoveType::Promotion, captures_only);
        }
    }

    if !captures_only {
        let mut quiet = single & !last_rank & target_mask;
        while let Some(to) = quiet.pop_some_lsb() {
            let from = Sq(to.0 - 8);
            if pin_restriction(position, from).test_sq(to) {
                push_pawn_move(list, from, to, crate::piece::EMPTY, false, MoveType::General, false);
            }
        }

        let third_rank_pawns = pawns & RANK_BB[1];
        let mut double = ((third_rank_pawns.shift_n() & empty).shift_n()) & empty & target_mask;
        while let Some(to) = double.pop_some_lsb() {
            let from = Sq(to.0 - 16);
            if pin_restriction(position, from).test_sq(to) {
                list.push(Move::new(
                    from,
                    to,
                    piece_code(PAWN, US),
                    crate::piece::EMPTY,
                    MoveType::PawnDoublePush,
                ));
            }
        }
    }

    let mut cap_nw = pawns.shift_nw() & position.by_side[THEM] & target_mask;
    while let Some(to) = cap_nw.pop_some_lsb() {
        let from = to - 9;
        if pin_restriction(position, from).test_sq(to) {
            let captured = position.piece_at(to);
            push_pawn_move(list, from, to, captured, to.rank_idx() == 7, MoveType::General, captures_only);
        }
    }
    let mut cap_ne = pawns.shift_ne() & position.by_side[THEM] & target_mask;
    while let Some(to) = cap_ne.pop_some_lsb() {
        let from = to - 7;
        if pin_restriction(position, from).test_sq(to) {
            let captured = position.piece_at(to);
            push_pawn_move(list, from, to, captured, to.rank_idx() == 7, MoveType::General, captures_only);
        }
    }

    generate_en_passant(position, list, target_mask);
}

fn generate_en_passant(position: &Position, list: &mut MoveList, target_mask: BitBoard) {
    if !position.ep_square_effective.is_ok() {
        return;
    }
    let victim = position.ep_square_effective;
    let to = position.ep_capture_to();
    if !target_mask.test_sq(to) && !target_mask.test_sq(victim) {
        // The capture is only useful against check if it removes the checker or
        // blocks the checking ray; neither the landing square nor the victim square
        // being in the mask means it's not a legal reply to the current check.
        return;
    }
    let mut attackers = PAWN_ATTACKS[THEM][to.idx()] & position.by_type[US][PAWN as usize];
    while let Some(from) = attackers.pop_some_lsb() {
        if !pin_restriction(position, from).test_sq(to) {
            continue;
        }
        if would_expose_king_horizontally(position, from, victim) {
            continue;
        }
        list.push(Move::new(
            from,
            to,
            piece_code(PAWN, US),
            piece_code(PAWN, THEM),
            MoveType::EnPassant,
        ));
    }
}

/// The famous en-passant pin corner case: removing both the capturing and captured
/// pawn from the same rank can uncover a horizontal rook/queen attack on the king
/// that a normal per-piece pin test never sees, since neither pawn alone was pinned.
fn would_expose_king_horizontally(position: &Position, from: Sq, victim: Sq) -> bool {
    let king = position.king_sq[US];
    if king.rank_idx() != from.rank_idx() {
        return false;
    }
    let occ_after = (position.all_occ & !from.to_bb() & !victim.to_bb()) | position.ep_capture_to().to_bb();
    let attackers = tables::sliding_attacks(king, occ_after, true) & position.rooks_queens(THEM);
    attackers.is_not_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    fn count_moves(fen_str: &str) -> usize {
        let pos = fen::parse(fen_str).unwrap();
        let mut list = MoveList::new();
        generate(&pos, &mut list);
        list.len()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        assert_eq!(count_moves(fen::STARTPOS), 20);
    }

    #[test]
    fn single_check_restricts_to_capture_or_block_or_king_move() {
        // White king on e1 in check from a rook on e8; only blocking/capturing/king moves legal.
        let pos = fen::parse("4r3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate(&pos, &mut list);
        for mv in list.as_slice() {
            let child = pos.make_move(*mv);
            assert!(!child.attackers_of(child.king_sq[THEM], US).is_not_empty());
        }
    }

    #[test]
    fn pinned_piece_cannot_leave_pin_ray() {
        // Black rook on e8 pins the white knight on e4 against the king on e1.
        let pos = fen::parse("4r3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate(&pos, &mut list);
        assert!(list
            .as_slice()
            .iter()
            .all(|m| code_type(position_piece(&pos, m.from())) != KNIGHT));
    }

    fn position_piece(pos: &Position, sq: Sq) -> u8 {
        pos.piece_at(sq)
    }
}
