//! Error types surfaced at the construction boundaries of the crate:
//! FEN parsing and NNUE weight loading. Anything that goes wrong after
//! construction is an internal invariant violation and panics instead.

use thiserror::Error;

/// Errors produced while parsing a FEN string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece character '{0}' in board field")]
    BadPiece(char),

    #[error("rank {0} of the board field does not describe exactly eight files")]
    BadRankWidth(u8),

    #[error("board field must describe exactly eight ranks")]
    BadRankCount,

    #[error("invalid side-to-move field '{0}'")]
    BadSideToMove(String),

    #[error("invalid castling character '{0}'")]
    BadCastling(char),

    #[error("invalid en-passant square '{0}'")]
    BadEnPassant(String),
}

/// Errors produced while loading or registering NNUE weights.
#[derive(Error, Debug)]
pub enum NnueError {
    #[error("failed to read weight file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse weight file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("weight tensor '{field}' has wrong shape: expected {expected}, got {got}")]
    Shape {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("an NNUE network is already registered")]
    AlreadyRegistered,
}
