//! Error types for `chess_core`, following the teacher's crate-per-layer `failure`-style
//! enum (one variant per rejected-input shape) rather than a single opaque string.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    InvalidSetup(&'static str),
    InvalidFen(FenError),
    InvalidMoveText,
    IllegalMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenError {
    WrongSectionCount(usize),
    WrongRankCount(usize),
    UnrecognizedPiece(char),
    UnrecognizedSideToMove,
    UnreadableEpSquare,
    UnreadableCounter,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidSetup(why) => write!(f, "invalid position setup: {why}"),
            CoreError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            CoreError::InvalidMoveText => write!(f, "unparseable move text"),
            CoreError::IllegalMove => write!(f, "move is not legal in this position"),
        }
    }
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::WrongSectionCount(n) => write!(f, "expected 6 space-separated fields, got {n}"),
            FenError::WrongRankCount(n) => write!(f, "expected 8 ranks, got {n}"),
            FenError::UnrecognizedPiece(c) => write!(f, "unrecognized piece letter '{c}'"),
            FenError::UnrecognizedSideToMove => write!(f, "side to move must be 'w' or 'b'"),
            FenError::UnreadableEpSquare => write!(f, "unreadable en-passant square"),
            FenError::UnreadableCounter => write!(f, "unreadable halfmove/fullmove counter"),
        }
    }
}

impl std::error::Error for CoreError {}
impl std::error::Error for FenError {}

impl From<FenError> for CoreError {
    fn from(e: FenError) -> CoreError {
        CoreError::InvalidFen(e)
    }
}
