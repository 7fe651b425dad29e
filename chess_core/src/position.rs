//! [`Position`]: the central board-and-state value type (spec §3.4).
//!
//! Everything here is always expressed from the side-to-move's perspective: "us" is
//! index 0, "them" is index 1, and "us" always moves north. A move flips the position
//! (mirrors the board, swaps the two halves of every per-side array) so the next ply
//! sees the same orientation again. Attack, pin, and king-danger bitboards are
//! recomputed from scratch on every [`Position::make_move`] rather than patched
//! incrementally — see DESIGN.md for why that trade was made here.

use crate::bitboard::BitBoard;
use crate::castle::CastleRights;
use crate::error::CoreError;
use crate::piece::{
    code_flip_side, code_is_empty, code_side, code_type, piece_code, PieceCode, BISHOP, EMPTY,
    KING, KNIGHT, PAWN, PIECE_TYPE_CNT, QUEEN, ROOK, THEM, US,
};
use crate::piece_move::{Move, MoveList, MoveType};
use crate::sq::{File, Rank, Sq, NO_SQ, SQ_CNT};
use crate::tables::{self, FILE_BB, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use crate::zobrist::ZOBRIST;

pub const PIECE_VALUE: [i32; PIECE_TYPE_CNT] = [100, 300, 300, 500, 930, 0];

/// A full board-reset description, as accepted by [`Position::reset`] and produced by
/// [`crate::fen::parse`].
#[derive(Clone)]
pub struct SetupDescription {
    /// Square codes from White's point of view, a1..h8 in the usual rank-major order.
    pub board: [PieceCode; 64],
    pub white_to_move: bool,
    pub white_k: bool,
    pub white_q: bool,
    pub black_k: bool,
    pub black_q: bool,
    /// The en-passant "passed-over" square in absolute (White-relative) terms, if any.
    pub ep_square: Option<Sq>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

#[derive(Clone)]
pub struct Position {
    pub board: [PieceCode; SQ_CNT],
    pub by_side: [BitBoard; 2],
    pub by_type: [[BitBoard; PIECE_TYPE_CNT]; 2],
    pub all_occ: BitBoard,
    pub king_sq: [Sq; 2],

    pub attacks_by_type: [[BitBoard; PIECE_TYPE_CNT]; 2],
    pub attacks: [BitBoard; 2],
    /// Sliding-piece attack union computed as if the enemy king were removed from the
    /// board, so squares behind the king that a slider still covers register as
    /// king-danger squares too.
    pub slider_reach: [BitBoard; 2],

    /// Squares a move must land on to answer check: the checking piece(s) themselves,
    /// plus (for a single slider checker) the squares between it and the king.
    pub king_attackers: BitBoard,
    /// The checking piece(s) only, used to tell single- from double-check apart.
    pub checkers: BitBoard,
    pub king_danger: BitBoard,
    pub pinned: [BitBoard; 2],

    pub half_open_files: [BitBoard; 2],
    pub pawn_attack_reach: [BitBoard; 2],

    pub ep_square: Sq,
    pub ep_square_effective: Sq,

    pub castle: CastleRights,

    pub material: [i32; 2],
    pub key: [u64; 2],

    pub hanging_value: [i8; SQ_CNT],
    pub hanging_map: BitBoard,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    /// Tracked only so output layers (FEN, move text) can re-derive absolute colors;
    /// never consulted by move generation, search, or evaluation.
    pub white_to_move: bool,
}

impl Position {
    pub fn reset(desc: &SetupDescription) -> Result<Position, CoreError> {
        let (us, them) = if desc.white_to_move { (0, 1) } else { (1, 0) };

        // The setup is given in White-absolute terms; re-key every square into
        // us/them as we copy it in, now that `us`/`them` are known.
        let mut rel_board = [EMPTY; SQ_CNT];
        let mut rel_by_side = [BitBoard::EMPTY; 2];
        let mut rel_by_type = [[BitBoard::EMPTY; PIECE_TYPE_CNT]; 2];
        let mut king_cnt = [0u8; 2];
        let mut king_sq_abs = [NO_SQ; 2];
        let mut pawn_cnt = [0u8; 2];

        for file in 0..8u8 {
            for rank in 0..8u8 {
                let abs_sq = Sq(rank * 8 + (7 - file));
                let code = desc.board[abs_sq.idx()];
                if code_is_empty(code) {
                    continue;
                }
                let abs_side = code_side(code);
                let pt = code_type(code);
                if pt == PAWN && (rank == 0 || rank == 7) {
                    return Err(CoreError::InvalidSetup("pawn on back rank"));
                }
                if pt == KING {
                    king_cnt[abs_side] += 1;
                    king_sq_abs[abs_side] = abs_sq;
                }
                if pt == PAWN {
                    pawn_cnt[abs_side] += 1;
                }
                let rel_side = if abs_side == us { US } else { THEM };
                // The board is always stored so that "us" moves north: when Black is
                // to move, every square is mirrored, not just relabeled.
                let rel_sq = if us == 0 { abs_sq } else { abs_sq.mirror_rank() };
                rel_board[rel_sq.idx()] = piece_code(pt, rel_side);
                rel_by_side[rel_side].set_sq(rel_sq);
                rel_by_type[rel_side][pt as usize].set_sq(rel_sq);
            }
        }

        if king_cnt[0] != 1 || king_cnt[1] != 1 {
            return Err(CoreError::InvalidSetup("each side must have exactly one king"));
        }
        if pawn_cnt[0] > 8 || pawn_cnt[1] > 8 {
            return Err(CoreError::InvalidSetup("too many pawns"));
        }
        if king_sq_abs[0].distance(king_sq_abs[1]) <= 1 {
            return Err(CoreError::InvalidSetup("kings adjacent"));
        }

        let mut castle = CastleRights::empty();
        let (us_k, us_q, them_k, them_q) = if us == 0 {
            (desc.white_k, desc.white_q, desc.black_k, desc.black_q)
        } else {
            (desc.black_k, desc.black_q, desc.white_k, desc.white_q)
        };
        if us_k {
            castle |= CastleRights::US_K;
        }
        if us_q {
            castle |= CastleRights::US_Q;
        }
        if them_k {
            castle |= CastleRights::THEM_K;
        }
        if them_q {
            castle |= CastleRights::THEM_Q;
        }

        let ep_square = match desc.ep_square {
            Some(passed_over) => {
                // Convert the classic "passed-over" FEN square (White-absolute terms)
                // into our own convention: the square the double-pushed pawn actually
                // landed on, expressed in the same us/them-mirrored frame as the board.
                let landed_abs = if us == 0 {
                    Sq(passed_over.0 - 8)
                } else {
                    Sq(passed_over.0 + 8)
                };
                if us == 0 {
                    landed_abs
                } else {
                    landed_abs.mirror_rank()
                }
            }
            None => NO_SQ,
        };

        let mut pos = Position {
            board: rel_board,
            by_side: rel_by_side,
            by_type: rel_by_type,
            all_occ: BitBoard::EMPTY,
            king_sq: [NO_SQ; 2],
            attacks_by_type: [[BitBoard::EMPTY; PIECE_TYPE_CNT]; 2],
            attacks: [BitBoard::EMPTY; 2],
            slider_reach: [BitBoard::EMPTY; 2],
            king_attackers: BitBoard::EMPTY,
            checkers: BitBoard::EMPTY,
            king_danger: BitBoard::EMPTY,
            pinned: [BitBoard::EMPTY; 2],
            half_open_files: [BitBoard::EMPTY; 2],
            pawn_attack_reach: [BitBoard::EMPTY; 2],
            ep_square,
            ep_square_effective: NO_SQ,
            castle,
            material: [0; 2],
            key: [0; 2],
            hanging_value: [0; SQ_CNT],
            hanging_map: BitBoard::EMPTY,
            halfmove_clock: desc.halfmove_clock,
            fullmove_number: desc.fullmove_number,
            white_to_move: desc.white_to_move,
        };
        pos.recompute_derived();

        if pos.attackers_of(pos.king_sq[THEM], US).is_not_empty() {
            return Err(CoreError::InvalidSetup("side not to move is in check"));
        }
        Ok(pos)
    }

    pub fn startpos() -> Position {
        crate::fen::parse(crate::fen::STARTPOS).expect("startpos FEN is well-formed")
    }

    #[inline]
    pub fn piece_at(&self, sq: Sq) -> PieceCode {
        self.board[sq.idx()]
    }

    #[inline]
    pub fn all_kings(&self) -> BitBoard {
        self.by_type[US][KING as usize] | self.by_type[THEM][KING as usize]
    }

    #[inline]
    pub fn all_knights(&self) -> BitBoard {
        self.by_type[US][KNIGHT as usize] | self.by_type[THEM][KNIGHT as usize]
    }

    #[inline]
    pub fn rooks_queens(&self, side: usize) -> BitBoard {
        self.by_type[side][ROOK as usize] | self.by_type[side][QUEEN as usize]
    }

    #[inline]
    pub fn bishops_queens(&self, side: usize) -> BitBoard {
        self.by_type[side][BISHOP as usize] | self.by_type[side][QUEEN as usize]
    }

    #[inline]
    pub fn knights_bishops(&self, side: usize) -> BitBoard {
        self.by_type[side][KNIGHT as usize] | self.by_type[side][BISHOP as usize]
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.king_attackers.is_not_empty()
    }

    #[inline]
    pub fn ep_capture_to(&self) -> Sq {
        if self.ep_square_effective.is_ok() {
            Sq(self.ep_square_effective.0 + 8)
        } else {
            NO_SQ
        }
    }

    /// Attackers of `sq` belonging to `side`, given the *current* occupancy, with the
    /// enemy king never treated as transparent (use [`Position::slider_reach`] for that
    /// variant).
    pub fn attackers_of(&self, sq: Sq, side: usize) -> BitBoard {
        self.attackers_of_with_occ(sq, side, self.all_occ)
    }

    pub fn attackers_of_with_occ(&self, sq: Sq, side: usize, occ: BitBoard) -> BitBoard {
        let mut out = BitBoard::EMPTY;
        out |= PAWN_ATTACKS[crate::piece::opposite(side)][sq.idx()] & self.by_type[side][PAWN as usize];
        out |= KNIGHT_ATTACKS[sq.idx()] & self.by_type[side][KNIGHT as usize];
        out |= KING_ATTACKS[sq.idx()] & self.by_type[side][KING as usize];
        out |= tables::sliding_attacks(sq, occ, true)
            & (self.by_type[side][ROOK as usize] | self.by_type[side][QUEEN as usize]);
        out |= tables::sliding_attacks(sq, occ, false)
            & (self.by_type[side][BISHOP as usize] | self.by_type[side][QUEEN as usize]);
        out
    }

    pub fn all_attackers_of(&self, sq: Sq, occ: BitBoard) -> BitBoard {
        self.attackers_of_with_occ(sq, US, occ) | self.attackers_of_with_occ(sq, THEM, occ)
    }

    /// Vertically mirrors the board and swaps sides, used to serialize the board
    /// White-relative for FEN/text output (spec §4.2 `flip`).
    pub fn flip(&self) -> Position {
        let mut board = [EMPTY; SQ_CNT];
        let mut by_side = [BitBoard::EMPTY; 2];
        let mut by_type = [[BitBoard::EMPTY; PIECE_TYPE_CNT]; 2];
        for i in 0..SQ_CNT {
            let code = self.board[i];
            if code_is_empty(code) {
                continue;
            }
            let dst = Sq(i as u8).mirror_rank();
            let flipped_code = code_flip_side(code);
            board[dst.idx()] = flipped_code;
            let side = code_side(flipped_code);
            by_side[side].set_sq(dst);
            by_type[side][code_type(flipped_code) as usize].set_sq(dst);
        }

        let ep_square = if self.ep_square.is_ok() {
            self.ep_square.mirror_rank()
        } else {
            NO_SQ
        };

        let mut pos = Position {
            board,
            by_side,
            by_type,
            all_occ: BitBoard::EMPTY,
            king_sq: [NO_SQ; 2],
            attacks_by_type: [[BitBoard::EMPTY; PIECE_TYPE_CNT]; 2],
            attacks: [BitBoard::EMPTY; 2],
            slider_reach: [BitBoard::EMPTY; 2],
            king_attackers: BitBoard::EMPTY,
            checkers: BitBoard::EMPTY,
            king_danger: BitBoard::EMPTY,
            pinned: [BitBoard::EMPTY; 2],
            half_open_files: [BitBoard::EMPTY; 2],
            pawn_attack_reach: [BitBoard::EMPTY; 2],
            ep_square,
            ep_square_effective: NO_SQ,
            castle: self.castle.flip(),
            material: [self.material[THEM], self.material[US]],
            key: [self.key[THEM], self.key[US]],
            hanging_value: [0; SQ_CNT],
            hanging_map: BitBoard::EMPTY,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            white_to_move: !self.white_to_move,
        };
        pos.recompute_derived();
        pos
    }

    /// Recomputes every derived field from `board`/`by_side`/`by_type` alone. Called
    /// after `reset`, `flip`, and every `make_move` — see the module doc comment for
    /// why this crate favors correctness-by-recompute over incremental maintenance.
    fn recompute_derived(&mut self) {
        self.all_occ = self.by_side[US] | self.by_side[THEM];
        self.king_sq[US] = self.by_type[US][KING as usize].bit_scan();
        self.king_sq[THEM] = self.by_type[THEM][KING as usize].bit_scan();

        self.material = [0, 0];
        for side in [US, THEM] {
            for pt in 0..PIECE_TYPE_CNT as u8 {
                if pt == KING {
                    continue;
                }
                let count = self.by_type[side][pt as usize].count() as i32;
                self.material[side] += count * PIECE_VALUE[pt as usize];
            }
        }

        for side in [US, THEM] {
            let mut by_type_atk = [BitBoard::EMPTY; PIECE_TYPE_CNT];
            let occ_no_king =
                self.all_occ & !self.by_type[crate::piece::opposite(side)][KING as usize];
            for sq in PieceSquares::new(self.by_type[side][PAWN as usize]).iter() {
                by_type_atk[PAWN as usize] |= PAWN_ATTACKS[side][sq.idx()];
            }
            for sq in PieceSquares::new(self.by_type[side][KNIGHT as usize]).iter() {
                by_type_atk[KNIGHT as usize] |= KNIGHT_ATTACKS[sq.idx()];
            }
            for sq in PieceSquares::new(self.by_type[side][KING as usize]).iter() {
                by_type_atk[KING as usize] |= KING_ATTACKS[sq.idx()];
            }
            let mut slider_union = BitBoard::EMPTY;
            for sq in PieceSquares::new(self.by_type[side][BISHOP as usize]).iter() {
                let a = tables::sliding_attacks(sq, occ_no_king, false);
                by_type_atk[BISHOP as usize] |= a;
                slider_union |= a;
            }
            for sq in PieceSquares::new(self.by_type[side][ROOK as usize]).iter() {
                let a = tables::sliding_attacks(sq, occ_no_king, true);
                by_type_atk[ROOK as usize] |= a;
                slider_union |= a;
            }
            for sq in PieceSquares::new(self.by_type[side][QUEEN as usize]).iter() {
                let a = tables::sliding_attacks(sq, occ_no_king, true)
                    | tables::sliding_attacks(sq, occ_no_king, false);
                by_type_atk[QUEEN as usize] |= a;
                slider_union |= a;
            }
            self.attacks_by_type[side] = by_type_atk;
            self.slider_reach[side] = slider_union;
            self.attacks[side] = by_type_atk.iter().fold(BitBoard::EMPTY, |a, &b| a | b);
        }

        self.king_danger = self.attacks[THEM] | self.slider_reach[THEM];

        let king = self.king_sq[US];
        self.king_attackers = BitBoard::EMPTY;
        let direct = self.attackers_of(king, THEM);
        self.checkers = direct;
        for attacker in PieceSquares::new(direct).iter() {
            self.king_attackers.set_sq(attacker);
            self.king_attackers |= tables::BETWEEN_BB[king.idx()][attacker.idx()];
        }

        for side in [US, THEM] {
            self.pinned[side] = self.compute_pins(side);
        }

        self.half_open_files = [BitBoard::EMPTY; 2];
        for side in [US, THEM] {
            for (file_idx, &file_bb) in FILE_BB.iter().enumerate() {
                if (self.by_type[side][PAWN as usize] & file_bb).is_empty() {
                    self.half_open_files[side] |= FILE_BB[file_idx];
                }
            }
        }

        for side in [US, THEM] {
            let pawns = self.by_type[side][PAWN as usize];
            let spans = if side == US {
                pawns.fill_north(BitBoard::ALL)
            } else {
                pawns.fill_south(BitBoard::ALL)
            };
            self.pawn_attack_reach[side] = spans.shift_e() | spans.shift_w();
        }

        self.ep_square_effective = if self.ep_square.is_ok() {
            let victim = self.ep_square;
            let capture_to = Sq(victim.0 + 8);
            let capturers = PAWN_ATTACKS[THEM][capture_to.idx()] & self.by_type[US][PAWN as usize];
            if capturers.is_not_empty() {
                victim
            } else {
                NO_SQ
            }
        } else {
            NO_SQ
        };

        self.key = self.compute_hash();

        self.hanging_map = BitBoard::EMPTY;
        self.hanging_value = [0; SQ_CNT];
        for sq in PieceSquares::new(self.by_side[US]).iter() {
            let loss = crate::see::hanging_loss(self, sq);
            if loss > 0 {
                self.hanging_value[sq.idx()] = loss.min(i8::MAX as i32) as i8;
                self.hanging_map.set_sq(sq);
            }
        }
    }

    fn compute_pins(&self, side: usize) -> BitBoard {
        let king = self.king_sq[side];
        if !king.is_ok() {
            return BitBoard::EMPTY;
        }
        let enemy = crate::piece::opposite(side);
        let mut pinned = BitBoard::EMPTY;
        let rook_xray = tables::sliding_attacks(king, self.by_side[side], true);
        let bishop_xray = tables::sliding_attacks(king, self.by_side[side], false);
        let candidates = (rook_xray & self.rooks_queens(enemy)) | (bishop_xray & self.bishops_queens(enemy));
        for pinner in PieceSquares::new(candidates).iter() {
            let between = tables::BETWEEN_BB[king.idx()][pinner.idx()] & self.by_side[side];
            if between.count() == 1 {
                pinned |= between;
            }
        }
        pinned
    }

    fn compute_hash(&self) -> [u64; 2] {
        let mut h = 0u64;
        for side in [US, THEM] {
            for pt in 0..PIECE_TYPE_CNT {
                for sq in PieceSquares::new(self.by_type[side][pt]).iter() {
                    h ^= ZOBRIST.piece_square[side][pt][sq.idx()];
                }
            }
        }
        if self.castle.contains(CastleRights::US_K) {
            h ^= ZOBRIST.castle[0];
        }
        if self.castle.contains(CastleRights::US_Q) {
            h ^= ZOBRIST.castle[1];
        }
        if self.castle.contains(CastleRights::THEM_K) {
            h ^= ZOBRIST.castle[2];
        }
        if self.castle.contains(CastleRights::THEM_Q) {
            h ^= ZOBRIST.castle[3];
        }
        if self.ep_square_effective.is_ok() {
            h ^= ZOBRIST.ep_file[self.ep_square_effective.file_idx() as usize];
        }
        [h, h ^ ZOBRIST.side]
    }

    pub fn is_move_irreversible(&self, mv: Move) -> bool {
        if mv.is_capture() {
            return true;
        }
        if code_type(self.piece_at(mv.from())) == PAWN {
            return true;
        }
        if code_type(self.piece_at(mv.from())) == KING {
            return self.castle.contains(CastleRights::US_K) || self.castle.contains(CastleRights::US_Q);
        }
        let from_bb = mv.from().to_bb();
        if self.castle.contains(CastleRights::US_Q) && (from_bb & tables::FILE_A & tables::RANK_1).is_not_empty() {
            return true;
        }
        if self.castle.contains(CastleRights::US_K) && (from_bb & tables::FILE_H & tables::RANK_1).is_not_empty() {
            return true;
        }
        false
    }

    pub fn is_legal_move(&self, mv: Move) -> bool {
        let mut list = MoveList::new();
        crate::movegen::generate(self, &mut list);
        list.contains(mv)
    }

    /// Applies `mv` to a clone of `self`, flipping the board so the result is, again,
    /// side-relative with the mover now "them". Panics only on internal inconsistency
    /// (an out-of-range square); illegality is the caller's responsibility — callers
    /// are expected to only ever pass moves drawn from [`crate::movegen::generate`].
    pub fn make_move(&self, mv: Move) -> Position {
        let mut board = self.board;
        let mut by_side = self.by_side;
        let mut by_type = self.by_type;

        let from = mv.from();
        let to = mv.to();
        let moving_code = board[from.idx()];
        let moving_type = code_type(moving_code);

        by_type[US][moving_type as usize].clear_sq(from);
        by_side[US].clear_sq(from);
        board[from.idx()] = EMPTY;

        if mv.is_en_passant() {
            let victim = Sq(to.0 - 8);
            by_type[THEM][PAWN as usize].clear_sq(victim);
            by_side[THEM].clear_sq(victim);
            board[victim.idx()] = EMPTY;
        } else if mv.is_capture() {
            let captured = board[to.idx()];
            by_type[THEM][code_type(captured) as usize].clear_sq(to);
            by_side[THEM].clear_sq(to);
        }

        let result_code = mv.result_piece();
        let result_type = code_type(result_code);
        by_type[US][result_type as usize].set_sq(to);
        by_side[US].set_sq(to);
        board[to.idx()] = result_code;

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(mv.move_type(), from);
            by_type[US][ROOK as usize].clear_sq(rook_from);
            by_type[US][ROOK as usize].set_sq(rook_to);
            by_side[US].clear_sq(rook_from);
            by_side[US].set_sq(rook_to);
            board[rook_from.idx()] = EMPTY;
            board[rook_to.idx()] = piece_code(ROOK, US);
        }

        let mut castle = self.castle;
        if moving_type == KING {
            castle.remove(CastleRights::US_K | CastleRights::US_Q);
        }
        if from == Sq::make(File::A, Rank::R1) || to == Sq::make(File::A, Rank::R1) {
            castle.remove(CastleRights::US_Q);
        }
        if from == Sq::make(File::H, Rank::R1) || to == Sq::make(File::H, Rank::R1) {
            castle.remove(CastleRights::US_K);
        }
        if to == Sq::make(File::A, Rank::R8) {
            castle.remove(CastleRights::THEM_Q);
        }
        if to == Sq::make(File::H, Rank::R8) {
            castle.remove(CastleRights::THEM_K);
        }

        let ep_square = if mv.is_double_push() { to } else { NO_SQ };

        let halfmove_clock = if mv.is_capture() || moving_type == PAWN {
            0
        } else {
            self.halfmove_clock + 1
        };
        let fullmove_number = if self.white_to_move {
            self.fullmove_number
        } else {
            self.fullmove_number + 1
        };

        let unflipped = Position {
            board,
            by_side,
            by_type,
            all_occ: BitBoard::EMPTY,
            king_sq: [NO_SQ; 2],
            attacks_by_type: [[BitBoard::EMPTY; PIECE_TYPE_CNT]; 2],
            attacks: [BitBoard::EMPTY; 2],
            slider_reach: [BitBoard::EMPTY; 2],
            king_attackers: BitBoard::EMPTY,
            checkers: BitBoard::EMPTY,
            king_danger: BitBoard::EMPTY,
            pinned: [BitBoard::EMPTY; 2],
            half_open_files: [BitBoard::EMPTY; 2],
            pawn_attack_reach: [BitBoard::EMPTY; 2],
            ep_square,
            ep_square_effective: NO_SQ,
            castle,
            material: [0; 2],
            key: [0; 2],
            hanging_value: [0; SQ_CNT],
            hanging_map: BitBoard::EMPTY,
            halfmove_clock,
            fullmove_number,
            white_to_move: self.white_to_move,
        };
        unflipped.flip()
    }
}

fn castle_rook_squares(mt: MoveType, king_from: Sq) -> (Sq, Sq) {
    let rank = king_from.rank();
    match mt {
        MoveType::CastleKingSide => (Sq::make(File::H, rank), Sq::make(File::F, rank)),
        MoveType::CastleQueenSide => (Sq::make(File::A, rank), Sq::make(File::D, rank)),
        _ => unreachable!("castle_rook_squares called on a non-castle move"),
    }
}

/// Thin helper to iterate the set squares of a bitboard without consuming it, since
/// `BitBoard`'s own `Iterator` impl is by-value (pop-based).
struct PieceSquares(BitBoard);

impl PieceSquares {
    fn new(bb: BitBoard) -> PieceSquares {
        PieceSquares(bb)
    }

    fn iter(&self) -> PieceSquaresIter {
        PieceSquaresIter(self.0)
    }
}

struct PieceSquaresIter(BitBoard);

impl Iterator for PieceSquaresIter {
    type Item = Sq;
    fn next(&mut self) -> Option<Sq> {
        self.0.pop_some_lsb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_invariants() {
        let pos = Position::startpos();
        assert_eq!(pos.by_side[US].count(), 16);
        assert_eq!(pos.by_side[THEM].count(), 16);
        assert!((pos.by_side[US] & pos.by_side[THEM]).is_empty());
        assert_eq!(pos.by_side[US] | pos.by_side[THEM], pos.all_occ);
        assert!(!pos.in_check());
        assert_eq!(pos.material[US], pos.material[THEM]);
    }

    #[test]
    fn flip_is_involution_on_startpos() {
        let pos = Position::startpos();
        let twice = pos.flip().flip();
        assert_eq!(twice.board, pos.board);
        assert_eq!(twice.white_to_move, pos.white_to_move);
    }

    #[test]
    fn black_to_move_setup_is_mirrored_not_just_relabeled() {
        // White has an extra pawn on e4 (rank 4 from White's view); reset with Black to
        // move must still store it as "them"'s pawn sitting five ranks from Black's own
        // baseline, i.e. mirrored to rank 5 in the internal (us-relative) frame.
        let desc = SetupDescription {
            board: {
                let mut b = [EMPTY; SQ_CNT];
                b[Sq::make(File::E, Rank::R1).idx()] = piece_code(KING, 0);
                b[Sq::make(File::E, Rank::R8).idx()] = piece_code(KING, 1);
                b[Sq::make(File::E, Rank::R4).idx()] = piece_code(PAWN, 0);
                b
            },
            white_to_move: false,
            white_k: false,
            white_q: false,
            black_k: false,
            black_q: false,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };
        let pos = Position::reset(&desc).unwrap();
        let them_pawn = pos.by_type[THEM][PAWN as usize];
        assert_eq!(them_pawn.count(), 1);
        let sq = them_pawn.bit_scan();
        assert_eq!(sq.rank(), Rank::R5);
        assert_eq!(sq.file(), File::E);
    }

    #[test]
    fn make_move_flips_side_to_move() {
        let pos = Position::startpos();
        let mut list = MoveList::new();
        crate::movegen::generate(&pos, &mut list);
        let mv = list.as_slice()[0];
        let child = pos.make_move(mv);
        assert_ne!(child.white_to_move, pos.white_to_move);
        assert!((child.by_side[US] & child.by_side[THEM]).is_empty());
    }
}
