//! Feature index encoding for NNUE inputs.
//!
//! A placement (piece, color, square) maps to `color * 384 + piece * 64 +
//! square` seen from white. Black's point of view swaps the colors and
//! mirrors the square across the ranks, so the same position read from
//! either side lands on the same weights.

use crate::bitboard::{Color, Piece};

use super::INPUT_SIZE;

/// Feature index of a placement from white's perspective.
#[inline]
pub fn feature_index_white(piece: Piece, color: Color, sq: u8) -> usize {
    let color_offset = match color {
        Color::White => 0,
        Color::Black => 384,
    };
    let idx = color_offset + piece.index() * 64 + sq as usize;
    debug_assert!(idx < INPUT_SIZE);
    idx
}

/// Feature index of a placement from black's perspective: own pieces come
/// first and the square is flipped vertically.
#[inline]
pub fn feature_index_black(piece: Piece, color: Color, sq: u8) -> usize {
    let color_offset = match color {
        Color::Black => 0,
        Color::White => 384,
    };
    let flipped = sq ^ 56;
    let idx = color_offset + piece.index() * 64 + flipped as usize;
    debug_assert!(idx < INPUT_SIZE);
    idx
}
