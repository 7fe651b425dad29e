//! Move-text codecs (spec §6.2): coordinate ("LAN") and SAN, both consumed on input
//! and either produced on output. Squares in a [`Move`] are stored in the position's
//! own us/them-relative frame; every function here first converts to or from the
//! absolute (White-relative) board square a human or GUI actually reads.

use crate::error::CoreError;
use crate::movegen;
use crate::piece::{code_type, piece_char, piece_type_from_char, KING, PAWN};
use crate::piece_move::{Move, MoveList, MoveType};
use crate::position::Position;
use crate::sq::{File, Rank, Sq};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notation {
    Coordinate,
    San,
}

/// Converts a square from `pos`'s internal (us-relative) frame to the absolute board
/// square a human reads, and back again (the transform is its own inverse).
fn to_absolute(pos: &Position, sq: Sq) -> Sq {
    if pos.white_to_move {
        sq
    } else {
        sq.mirror_rank()
    }
}

fn from_absolute(pos: &Position, sq: Sq) -> Sq {
    to_absolute(pos, sq)
}

/// Renders `mv` (assumed legal in `pos`) in the requested notation.
pub fn print_move(pos: &Position, mv: Move, notation: Notation) -> String {
    match notation {
        Notation::Coordinate => print_coordinate(pos, mv),
        Notation::San => print_san(pos, mv),
    }
}

fn print_coordinate(pos: &Position, mv: Move) -> String {
    let from = to_absolute(pos, mv.from());
    let to = to_absolute(pos, mv.to());
    let mut s = format!("{from}{to}");
    if mv.is_promotion() {
        s.push(piece_char(code_type(mv.result_piece())).to_ascii_lowercase());
    }
    s
}

fn print_san(pos: &Position, mv: Move) -> String {
    let mut s = match mv.move_type() {
        MoveType::CastleKingSide => "O-O".to_string(),
        MoveType::CastleQueenSide => "O-O-O".to_string(),
        _ => print_san_body(pos, mv),
    };

    let child = pos.make_move(mv);
    let mut replies = MoveList::new();
    movegen::generate(&child, &mut replies);
    if child.in_check() {
        if replies.is_empty() {
            s.push('#');
        } else {
            s.push('+');
        }
    }
    s
}

fn print_san_body(pos: &Position, mv: Move) -> String {
    let moving_type = code_type(pos.piece_at(mv.from()));
    let to = to_absolute(pos, mv.to());
    let mut s = String::new();

    if moving_type == PAWN {
        if mv.is_capture() {
            s.push_str(&from_absolute(pos, mv.from()).file().to_string());
            s.push('x');
        }
        s.push_str(&to.to_string());
        if mv.is_promotion() {
            s.push('=');
            s.push(piece_char(code_type(mv.result_piece())));
        }
        if mv.is_en_passant() {
            s.push_str(" e.p.");
        }
        return s;
    }

    s.push(piece_char(moving_type));
    s.push_str(&disambiguation(pos, mv, moving_type));
    if mv.is_capture() {
        s.push('x');
    }
    s.push_str(&to.to_string());
    s
}

/// File/rank/both disambiguation among every other legal move of the same piece type
/// landing on the same destination square.
fn disambiguation(pos: &Position, mv: Move, moving_type: u8) -> String {
    if moving_type == KING {
        return String::new();
    }
    let mut list = MoveList::new();
    movegen::generate(pos, &mut list);

    let mut same_file = false;
    let mut same_rank = false;
    let mut ambiguous = false;
    for other in list.as_slice() {
        if other.to() != mv.to() || other.from() == mv.from() {
            continue;
        }
        if code_type(pos.piece_at(other.from())) != moving_type {
            continue;
        }
        ambiguous = true;
        if other.from().file() == mv.from().file() {
            same_file = true;
        }
        if other.from().rank() == mv.from().rank() {
            same_rank = true;
        }
    }

    if !ambiguous {
        return String::new();
    }
    let from = from_absolute(pos, mv.from());
    if !same_file {
        from.file().to_string()
    } else if !same_rank {
        from.rank().to_string()
    } else {
        from.to_string()
    }
}

/// Parses `text` (coordinate or SAN, either accepted) against the legal moves of
/// `pos`, returning the matching [`Move`].
pub fn read_move(pos: &Position, text: &str) -> Result<Move, CoreError> {
    let text = text.trim();
    let mut list = MoveList::new();
    movegen::generate(pos, &mut list);

    if let Some(mv) = read_coordinate(pos, text, &list) {
        return Ok(mv);
    }
    for mv in list.as_slice() {
        if print_san(pos, *mv) == text {
            return Ok(*mv);
        }
    }
    Err(CoreError::InvalidMoveText)
}

fn read_coordinate(pos: &Position, text: &str, list: &MoveList) -> Option<Move> {
    let stripped = text.strip_suffix(" e.p.").unwrap_or(text);
    let bytes: Vec<char> = stripped.chars().collect();
    if bytes.len() != 4 && bytes.len() != 5 {
        return None;
    }
    let from_abs = Sq::make(File::from_char(bytes[0])?, Rank::from_char(bytes[1])?);
    let to_abs = Sq::make(File::from_char(bytes[2])?, Rank::from_char(bytes[3])?);
    let promo = if bytes.len() == 5 {
        Some(piece_type_from_char(bytes[4])?)
    } else {
        None
    };

    let from = from_absolute(pos, from_abs);
    let to = from_absolute(pos, to_abs);
    list.as_slice()
        .iter()
        .copied()
        .find(|m| {
            m.from() == from
                && m.to() == to
                && match promo {
                    Some(pt) => m.is_promotion() && code_type(m.result_piece()) == pt,
                    None => !m.is_promotion(),
                }
        })
        .or_else(|| {
            // A promotion letter is optional on input even though every promotion
            // defaults to queen when one isn't given.
            if promo.is_none() {
                list.as_slice()
                    .iter()
                    .copied()
                    .find(|m| m.from() == from && m.to() == to && m.is_queen_promotion())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    #[test]
    fn coordinate_round_trip_every_legal_move() {
        let pos = Position::startpos();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        for mv in list.as_slice() {
            let text = print_move(&pos, *mv, Notation::Coordinate);
            assert_eq!(read_move(&pos, &text).unwrap(), *mv);
        }
    }

    #[test]
    fn san_round_trip_every_legal_move() {
        let pos = fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        for mv in list.as_slice() {
            let text = print_move(&pos, *mv, Notation::San);
            assert_eq!(read_move(&pos, &text).unwrap(), *mv);
        }
    }

    #[test]
    fn black_to_move_coordinate_uses_absolute_squares() {
        let pos = fen::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        let mv = list
            .as_slice()
            .iter()
            .copied()
            .find(|m| print_move(&pos, *m, Notation::Coordinate) == "e7e5")
            .expect("e7e5 is legal for Black");
        assert_eq!(read_move(&pos, "e7e5").unwrap(), mv);
    }

    #[test]
    fn castling_prints_as_o_o() {
        let pos = fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        let mv = list.as_slice().iter().copied().find(|m| m.is_castle() && print_move(&pos, *m, Notation::San) == "O-O").unwrap();
        assert_eq!(print_move(&pos, mv, Notation::San), "O-O");
    }

    #[test]
    fn checkmate_gets_hash_suffix() {
        // Fool's mate: Qd8-h4# is the only move under test here.
        let pos = fen::parse("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 3").unwrap();
        let mut list = MoveList::new();
        movegen::generate(&pos, &mut list);
        let mate = list
            .as_slice()
            .iter()
            .copied()
            .find(|m| print_move(&pos, *m, Notation::Coordinate) == "d8h4")
            .expect("Qh4 is legal");
        assert_eq!(print_move(&pos, mate, Notation::San), "Qh4#");
    }
}
