//! Position core of a chess engine: bitboard state, make/unmake with
//! incremental Zobrist hashing, FEN I/O, and an efficiently updatable
//! neural network (NNUE) evaluator kept in sync with every board mutation.
//!
//! Move generation, search, and any front-end live outside this crate and
//! drive the position exclusively through [`Board`].

pub mod bitboard;
pub mod board;
pub mod errors;
pub mod eval;
pub mod moves;
pub mod nnue;
pub mod position;
pub mod zobrist;

pub use bitboard::{Bitboard, Color, Piece};
pub use board::{Board, START_FEN};
pub use errors::{FenError, NnueError};
pub use moves::RevertToken;
pub use nnue::{Network, Nnue};
pub use position::BitboardMap;
