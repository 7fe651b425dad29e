//! Error type for `chess_engine`, wrapping `chess_core::CoreError` the way the teacher's
//! own layering wraps lower-level failures in a higher-level variant.

use std::fmt;

use chess_core::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    Core(CoreError),
    TtAllocation { requested_mb: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Core(e) => write!(f, "{e}"),
            EngineError::TtAllocation { requested_mb } => {
                write!(f, "could not allocate a {requested_mb} MB transposition table")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> EngineError {
        EngineError::Core(e)
    }
}
