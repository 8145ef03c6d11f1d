/// Material values and tapered piece-square tables.
///
/// The position keeps two running scores, one weighted for the early game
/// and one for the late game, so a higher evaluation layer can blend them
/// by remaining material. Both are maintained incrementally: every piece
/// placed on or removed from the board contributes the per-square delta
/// returned by [`tapered_term`].

use crate::bitboard::{Color, Piece, PIECE_COUNT};

// ============================================================
// Material values (centipawns)
// ============================================================
pub const PAWN_VALUE: i32   = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32   = 500;
pub const QUEEN_VALUE: i32  = 900;
pub const KING_VALUE: i32   = 0; // King has no material value

pub const PIECE_VALUES: [i32; PIECE_COUNT] = [
    PAWN_VALUE, KNIGHT_VALUE, BISHOP_VALUE, ROOK_VALUE, QUEEN_VALUE, KING_VALUE
];

// ============================================================
// Piece-Square Tables (from white's perspective, flipped for black)
// Index: square (a1=0 through h8=63)
// Values in centipawns, [early, late]
// ============================================================

type PstPair = [i32; 2]; // [early game, late game]

#[rustfmt::skip]
const PAWN_PST: [PstPair; 64] = [
    [ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],  // rank 1 (no pawns)
    [ 2,-1],[ 4,-1],[ 0,-1],[-6,-1],[-6,-1],[ 0,-1],[ 4,-1],[ 2,-1],  // rank 2
    [ 1, 0],[ 2, 0],[-2, 0],[ 4, 1],[ 4, 1],[-2, 0],[ 2, 0],[ 1, 0],  // rank 3
    [ 0, 4],[ 1, 4],[ 5, 2],[14, 2],[14, 2],[ 5, 2],[ 1, 4],[ 0, 4],  // rank 4
    [ 4,10],[ 9,10],[13, 7],[20, 4],[20, 4],[13, 7],[ 9,10],[ 4,10],  // rank 5
    [ 8,22],[14,22],[20,16],[26,12],[26,12],[20,16],[14,22],[ 8,22],  // rank 6
    [12,45],[18,45],[24,38],[32,32],[32,32],[24,38],[18,45],[12,45],  // rank 7
    [ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],[ 0, 0],  // rank 8 (no pawns)
];

#[rustfmt::skip]
const KNIGHT_PST: [PstPair; 64] = [
    [-48,-28],[-28,-18],[-18,-12],[-12, -8],[-12, -8],[-18,-12],[-28,-18],[-48,-28],
    [-28,-18],[ -8, -4],[  2,  1],[  6,  6],[  6,  6],[  2,  1],[ -8, -4],[-28,-18],
    [-18, -8],[  6,  6],[ 14,  9],[ 18, 13],[ 18, 13],[ 14,  9],[  6,  6],[-18, -8],
    [-12, -4],[  8,  9],[ 18, 13],[ 24, 18],[ 24, 18],[ 18, 13],[  8,  9],[-12, -4],
    [-12, -4],[  8,  9],[ 18, 13],[ 24, 18],[ 24, 18],[ 18, 13],[  8,  9],[-12, -4],
    [-18, -8],[  6,  6],[ 14,  9],[ 18, 13],[ 18, 13],[ 14,  9],[  6,  6],[-18, -8],
    [-28,-18],[ -8, -4],[  2,  1],[  6,  6],[  6,  6],[  2,  1],[ -8, -4],[-28,-18],
    [-48,-28],[-28,-18],[-18,-12],[-12, -8],[-12, -8],[-18,-12],[-28,-18],[-48,-28],
];

#[rustfmt::skip]
const BISHOP_PST: [PstPair; 64] = [
    [-12, -9],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[-12, -9],
    [ -4, -4],[  6,  0],[  3,  0],[  4,  0],[  4,  0],[  3,  0],[  6,  0],[ -4, -4],
    [ -4, -4],[  6,  1],[  9,  4],[  7,  4],[  7,  4],[  9,  4],[  6,  1],[ -4, -4],
    [ -4,  0],[  3,  4],[  7,  9],[ 11,  9],[ 11,  9],[  7,  9],[  3,  4],[ -4,  0],
    [ -4,  0],[  4,  4],[  9,  9],[ 11,  9],[ 11,  9],[  9,  9],[  4,  4],[ -4,  0],
    [ -4, -4],[  9,  1],[  9,  4],[  4,  4],[  4,  4],[  9,  4],[  9,  1],[ -4, -4],
    [ -4, -4],[  7,  0],[  3,  0],[  2,  0],[  2,  0],[  3,  0],[  7,  0],[ -4, -4],
    [-12, -9],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[ -8, -4],[-12, -9],
];

#[rustfmt::skip]
const ROOK_PST: [PstPair; 64] = [
    [ -3,  0],[ -1,  0],[  3,  0],[  6,  0],[  6,  0],[  3,  0],[ -1,  0],[ -3,  0],
    [ -6,  0],[ -3,  0],[  0,  0],[  2,  0],[  2,  0],[  0,  0],[ -3,  0],[ -6,  0],
    [ -6,  0],[ -3,  0],[ -1,  0],[  0,  0],[  0,  0],[ -1,  0],[ -3,  0],[ -6,  0],
    [ -6,  0],[ -3,  0],[ -1,  2],[  0,  2],[  0,  2],[ -1,  2],[ -3,  0],[ -6,  0],
    [ -6,  1],[ -3,  1],[ -1,  4],[  0,  4],[  0,  4],[ -1,  4],[ -3,  1],[ -6,  1],
    [  0,  2],[  2,  2],[  4,  4],[  7,  4],[  7,  4],[  4,  4],[  2,  2],[  0,  2],
    [  9,  8],[ 11,  8],[ 14,  9],[ 17,  9],[ 17,  9],[ 14,  9],[ 11,  8],[  9,  8],
    [  4,  6],[  4,  6],[  6,  8],[  6,  8],[  6,  8],[  6,  8],[  4,  6],[  4,  6],
];

#[rustfmt::skip]
const QUEEN_PST: [PstPair; 64] = [
    [-14,-18],[ -9, -9],[ -4, -4],[  1,  0],[  1,  0],[ -4, -4],[ -9, -9],[-14,-18],
    [ -9, -9],[ -1, -4],[  4,  0],[  4,  0],[  4,  0],[  4,  0],[ -1, -4],[ -9, -9],
    [ -4, -4],[  4,  0],[  6,  4],[  6,  4],[  6,  4],[  6,  4],[  4,  0],[ -4, -4],
    [  1,  0],[  4,  4],[  6,  9],[  9,  9],[  9,  9],[  6,  9],[  4,  4],[  1,  0],
    [ -2,  0],[  4,  4],[  6,  9],[  9,  9],[  9,  9],[  6,  9],[  4,  4],[ -2,  0],
    [ -4, -4],[  1,  0],[  6,  4],[  4,  4],[  4,  4],[  6,  4],[  1,  0],[ -4, -4],
    [ -9, -9],[ -4, -4],[ -1,  0],[ -1,  0],[ -1,  0],[ -1,  0],[ -4, -4],[ -9, -9],
    [-14,-18],[ -9, -9],[ -4, -4],[ -4,  0],[ -4,  0],[ -4, -4],[ -9, -9],[-14,-18],
];

#[rustfmt::skip]
const KING_PST: [PstPair; 64] = [
    [ 22,-48],[ 32,-28],[ 12,-18],[ -4,-18],[ -4,-18],[ 12,-18],[ 32,-28],[ 22,-48],
    [ 18,-28],[ 18,-13],[  2, -9],[ -9, -9],[ -9, -9],[  2, -9],[ 18,-13],[ 18,-28],
    [ -9,-18],[-14, -9],[-18,  1],[-22, 11],[-22, 11],[-18,  1],[-14, -9],[ -9,-18],
    [-22,-13],[-28, -4],[-32, 11],[-38, 21],[-38, 21],[-32, 11],[-28, -4],[-22,-13],
    [-38,-13],[-42, -4],[-48, 11],[-52, 21],[-52, 21],[-48, 11],[-42, -4],[-38,-13],
    [-32,-18],[-38, -9],[-48,  1],[-52, 11],[-52, 11],[-48,  1],[-38, -9],[-32,-18],
    [-22,-28],[-32,-13],[-42, -9],[-48, -9],[-48, -9],[-42, -9],[-32,-13],[-22,-28],
    [-18,-48],[-28,-28],[-38,-18],[-48,-18],[-48,-18],[-38,-18],[-28,-28],[-18,-48],
];

const PST: [[PstPair; 64]; PIECE_COUNT] = [
    PAWN_PST, KNIGHT_PST, BISHOP_PST, ROOK_PST, QUEEN_PST, KING_PST
];

/// Flip a square vertically (for accessing PST from black's perspective)
#[inline]
fn flip_sq(sq: u8) -> u8 {
    sq ^ 56
}

/// The (early, late) contribution of one piece placement, signed so white
/// placements add and black placements subtract.
#[inline]
pub fn tapered_term(piece: Piece, color: Color, sq: u8) -> (i32, i32) {
    let pst_sq = match color {
        Color::White => sq,
        Color::Black => flip_sq(sq),
    };
    let entry = PST[piece.index()][pst_sq as usize];
    let early = PIECE_VALUES[piece.index()] + entry[0];
    let late = PIECE_VALUES[piece.index()] + entry[1];
    match color {
        Color::White => (early, late),
        Color::Black => (-early, -late),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::sq;

    #[test]
    fn test_mirrored_placements_cancel() {
        // A white piece and a black piece on vertically mirrored squares
        // contribute equal and opposite scores.
        for piece in Piece::ALL {
            let (we, wl) = tapered_term(piece, Color::White, sq::C3);
            let (be, bl) = tapered_term(piece, Color::Black, sq::C6);
            assert_eq!(we + be, 0, "{:?} early", piece);
            assert_eq!(wl + bl, 0, "{:?} late", piece);
        }
    }

    #[test]
    fn test_material_dominates() {
        let (e, l) = tapered_term(Piece::Queen, Color::White, sq::D1);
        assert!(e > 800 && l > 800);
        let (e, l) = tapered_term(Piece::Pawn, Color::Black, sq::E7);
        assert!(e < -80 && l < -80);
    }

    #[test]
    fn test_advanced_pawn_gains() {
        let (e2, l2) = tapered_term(Piece::Pawn, Color::White, sq::E2);
        let (e7, l7) = tapered_term(Piece::Pawn, Color::White, sq::E7);
        assert!(e7 > e2);
        assert!(l7 > l2);
    }
}
