//! FEN parsing and printing (spec §6.1).
//!
//! A round trip is not guaranteed to be byte-identical: the en-passant square is
//! re-normalized to [`Position`]'s "effective" definition (dropped if no pawn could
//! actually recapture), matching the reference implementation's own behavior.

use crate::error::{CoreError, FenError};
use crate::piece::{piece_char, piece_type_from_char, EMPTY};
use crate::position::{Position, SetupDescription};
use crate::sq::{File, Rank, Sq};

pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn parse(fen: &str) -> Result<Position, CoreError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::WrongSectionCount(fields.len()).into());
    }

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()).into());
    }

    let mut board = [EMPTY; 64];
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            let side = if c.is_uppercase() { 0usize } else { 1usize };
            let pt = piece_type_from_char(c).ok_or(FenError::UnrecognizedPiece(c))?;
            if file >= 8 {
                return Err(FenError::UnrecognizedPiece(c).into());
            }
            let sq = Sq(rank * 8 + (7 - file));
            board[sq.idx()] = crate::piece::piece_code(pt, side);
            file += 1;
        }
    }

    let white_to_move = match fields[1] {
        "w" => true,
        "b" => false,
        _ => return Err(FenError::UnrecognizedSideToMove.into()),
    };

    let rights = fields[2];
    let white_k = rights.contains('K');
    let white_q = rights.contains('Q');
    let black_k = rights.contains('k');
    let black_q = rights.contains('q');

    let ep_square = match fields[3] {
        "-" => None,
        s => Some(parse_square(s).ok_or(FenError::UnreadableEpSquare)?),
    };

    let halfmove_clock = fields
        .get(4)
        .map(|s| s.parse::<u16>().map_err(|_| FenError::UnreadableCounter))
        .transpose()?
        .unwrap_or(0);
    let fullmove_number = fields
        .get(5)
        .map(|s| s.parse::<u16>().map_err(|_| FenError::UnreadableCounter))
        .transpose()?
        .unwrap_or(1);

    let desc = SetupDescription {
        board,
        white_to_move,
        white_k,
        white_q,
        black_k,
        black_q,
        ep_square,
        halfmove_clock,
        fullmove_number,
    };
    Position::reset(&desc)
}

/// Prints `pos` as a FEN string, always from White's point of view (flips first if
/// `pos` has Black to move).
pub fn print(pos: &Position) -> String {
    let white_view = if pos.white_to_move { pos.clone() } else { pos.flip() };

    let mut out = String::new();
    for rank_from_top in 0..8u8 {
        let rank = 7 - rank_from_top;
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let sq = Sq(rank * 8 + (7 - file));
            let code = white_view.piece_at(sq);
            if crate::piece::code_is_empty(code) {
                empty_run += 1;
                continue;
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
                empty_run = 0;
            }
            let c = piece_char(crate::piece::code_type(code));
            out.push(if crate::piece::code_side(code) == 0 { c } else { c.to_ascii_lowercase() });
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }
        if rank_from_top != 7 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(if pos.white_to_move { 'w' } else { 'b' });

    out.push(' ');
    // `white_view` always has White to move, so its own castle rights are already
    // White-relative: `US_*` is White's, `THEM_*` is Black's.
    use crate::castle::CastleRights;
    let mut any_rights = false;
    for (flag, letter) in [
        (CastleRights::US_K, 'K'),
        (CastleRights::US_Q, 'Q'),
        (CastleRights::THEM_K, 'k'),
        (CastleRights::THEM_Q, 'q'),
    ] {
        if white_view.castle.contains(flag) {
            out.push(letter);
            any_rights = true;
        }
    }
    if !any_rights {
        out.push('-');
    }

    out.push(' ');
    if white_view.ep_square_effective.is_ok() {
        out.push_str(&white_view.ep_capture_to().to_string());
    } else {
        out.push('-');
    }

    out.push(' ');
    out.push_str(&pos.halfmove_clock.to_string());
    out.push(' ');
    out.push_str(&pos.fullmove_number.to_string());
    out
}

fn parse_square(s: &str) -> Option<Sq> {
    let mut chars = s.chars();
    let file = File::from_char(chars.next()?)?;
    let rank = Rank::from_char(chars.next()?)?;
    Some(Sq::make(file, rank))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_roundtrips() {
        let pos = parse(STARTPOS).unwrap();
        assert_eq!(print(&pos), STARTPOS);
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(parse("not a fen").is_err());
        assert!(parse("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn black_to_move_roundtrips() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2";
        let pos = parse(fen).unwrap();
        assert_eq!(print(&pos), fen);
    }
}
