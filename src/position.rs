/// The raw position state: per-piece bitboards with every derived cache
/// (occupancy, per-square index, Zobrist hash, tapered material scores)
/// maintained in lockstep by the three primitive mutations.

use crate::bitboard::*;
use crate::eval;
use crate::zobrist;

/// Castling rights encoded as 4 bits
pub const WK_CASTLE: u8 = 0b0001; // White kingside
pub const WQ_CASTLE: u8 = 0b0010; // White queenside
pub const BK_CASTLE: u8 = 0b0100; // Black kingside
pub const BQ_CASTLE: u8 = 0b1000; // Black queenside
pub const ALL_CASTLES: u8 = 0b1111;

#[inline]
pub fn kingside_flag(color: Color) -> u8 {
    match color {
        Color::White => WK_CASTLE,
        Color::Black => BK_CASTLE,
    }
}

#[inline]
pub fn queenside_flag(color: Color) -> u8 {
    match color {
        Color::White => WQ_CASTLE,
        Color::Black => BQ_CASTLE,
    }
}

/// The complete position state
#[derive(Clone)]
pub struct BitboardMap {
    /// Bitboards for each piece type per color: pieces[color][piece]
    pub pieces: [[Bitboard; PIECE_COUNT]; COLOR_COUNT],
    /// Combined occupancy per color
    pub occupancy: [Bitboard; COLOR_COUNT],
    /// Per-square cache of what sits where, kept in sync with the bitboards
    pub square_index: [Option<(Piece, Color)>; 64],

    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: u8,
    /// En passant target square (if any)
    pub ep_square: Option<u8>,

    /// Zobrist hash of the current position
    pub hash: u64,

    /// Running material + piece-square score, early-game weighting
    pub md_early: i32,
    /// Running material + piece-square score, late-game weighting
    pub md_late: i32,
}

impl BitboardMap {
    /// Create an empty position
    pub fn new() -> Self {
        BitboardMap {
            pieces: [[0; PIECE_COUNT]; COLOR_COUNT],
            occupancy: [0; COLOR_COUNT],
            square_index: [None; 64],
            side: Color::White,
            castling: 0,
            ep_square: None,
            hash: 0,
            md_early: 0,
            md_late: 0,
        }
    }

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn at(&self, sq: u8) -> Option<(Piece, Color)> {
        self.square_index[sq as usize]
    }

    /// Place a piece on an empty square. Updates bitboards, occupancy, the
    /// square index, the hash, and the material scores.
    pub fn put_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        debug_assert!(
            self.square_index[sq as usize].is_none(),
            "put_piece: {} is occupied",
            square_to_name(sq)
        );
        let bb = square_mask(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupancy[color.index()] |= bb;
        self.square_index[sq as usize] = Some((piece, color));
        self.hash ^= zobrist::keys().piece_keys[color.index()][piece.index()][sq as usize];
        let (early, late) = eval::tapered_term(piece, color, sq);
        self.md_early += early;
        self.md_late += late;
    }

    /// Remove the given piece from a square. Exact inverse of `put_piece`.
    pub fn remove_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        debug_assert_eq!(
            self.square_index[sq as usize],
            Some((piece, color)),
            "remove_piece: {} does not hold that piece",
            square_to_name(sq)
        );
        let bb = square_mask(sq);
        self.pieces[color.index()][piece.index()] &= !bb;
        self.occupancy[color.index()] &= !bb;
        self.square_index[sq as usize] = None;
        self.hash ^= zobrist::keys().piece_keys[color.index()][piece.index()][sq as usize];
        let (early, late) = eval::tapered_term(piece, color, sq);
        self.md_early -= early;
        self.md_late -= late;
    }

    /// Move a piece, capturing whatever occupies the destination. The
    /// capture (if any) is removed first, then the mover is lifted from
    /// `from` and placed on `to`, so all caches stay consistent throughout.
    pub fn move_piece(
        &mut self,
        piece: Piece,
        color: Color,
        target: Option<(Piece, Color)>,
        from: u8,
        to: u8,
    ) {
        if let Some((t_piece, t_color)) = target {
            self.remove_piece(t_piece, t_color, to);
        }
        self.remove_piece(piece, color, from);
        self.put_piece(piece, color, to);
    }

    /// Non-capturing move of whatever sits on `from`, keyed off the square
    /// index. Used when unwinding the rook leg of a castle.
    pub fn slide(&mut self, from: u8, to: u8) {
        let (piece, color) = self.square_index[from as usize]
            .unwrap_or_else(|| panic!("slide: {} is empty", square_to_name(from)));
        self.remove_piece(piece, color, from);
        self.put_piece(piece, color, to);
    }

    /// Compute the full Zobrist hash from scratch. The incrementally
    /// maintained `hash` must always agree with this.
    pub fn compute_hash(&self) -> u64 {
        let keys = zobrist::keys();
        let mut h: u64 = 0;

        for color in 0..COLOR_COUNT {
            for piece in 0..PIECE_COUNT {
                let mut bb = self.pieces[color][piece];
                while bb != 0 {
                    let sq = pop_square(&mut bb);
                    h ^= keys.piece_keys[color][piece][sq as usize];
                }
            }
        }

        h ^= keys.castling(self.castling);

        if let Some(ep) = self.ep_square {
            h ^= keys.ep_keys[file_index(ep) as usize];
        }

        if matches!(self.side, Color::Black) {
            h ^= keys.side_key;
        }

        h
    }

    /// Recompute the tapered material scores from scratch. The running
    /// `md_early`/`md_late` must always agree with this.
    pub fn compute_material(&self) -> (i32, i32) {
        let mut early = 0;
        let mut late = 0;
        for color in Color::ALL {
            for piece in Piece::ALL {
                let mut bb = self.pieces[color.index()][piece.index()];
                while bb != 0 {
                    let sq = pop_square(&mut bb);
                    let (e, l) = eval::tapered_term(piece, color, sq);
                    early += e;
                    late += l;
                }
            }
        }
        (early, late)
    }
}

impl Default for BitboardMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(map: &BitboardMap) {
        for color in 0..COLOR_COUNT {
            let mut union: Bitboard = 0;
            for piece in 0..PIECE_COUNT {
                assert_eq!(union & map.pieces[color][piece], 0, "piece boards overlap");
                union |= map.pieces[color][piece];
            }
            assert_eq!(union, map.occupancy[color], "occupancy out of sync");
        }
        assert_eq!(map.occupancy[0] & map.occupancy[1], 0, "colors overlap");
        for sq in 0u8..64 {
            let from_boards = Color::ALL.iter().find_map(|&c| {
                Piece::ALL
                    .iter()
                    .find(|&&p| has_bit(map.pieces[c.index()][p.index()], sq))
                    .map(|&p| (p, c))
            });
            assert_eq!(map.square_index[sq as usize], from_boards, "square index out of sync");
        }
        assert_eq!(map.hash, map.compute_hash(), "hash out of sync");
        assert_eq!(
            (map.md_early, map.md_late),
            map.compute_material(),
            "material scores out of sync"
        );
    }

    #[test]
    fn test_put_remove_roundtrip() {
        let mut map = BitboardMap::new();
        map.put_piece(Piece::Knight, Color::White, sq::F3);
        map.put_piece(Piece::Pawn, Color::Black, sq::D5);
        assert_consistent(&map);
        assert_eq!(map.at(sq::F3), Some((Piece::Knight, Color::White)));

        map.remove_piece(Piece::Knight, Color::White, sq::F3);
        map.remove_piece(Piece::Pawn, Color::Black, sq::D5);
        assert_consistent(&map);
        assert_eq!(map.hash, 0);
        assert_eq!(map.md_early, 0);
        assert_eq!(map.md_late, 0);
    }

    #[test]
    fn test_move_piece_capture() {
        let mut map = BitboardMap::new();
        map.put_piece(Piece::Rook, Color::White, sq::A1);
        map.put_piece(Piece::Queen, Color::Black, sq::A8);
        let target = map.at(sq::A8);
        map.move_piece(Piece::Rook, Color::White, target, sq::A1, sq::A8);
        assert_consistent(&map);
        assert_eq!(map.at(sq::A8), Some((Piece::Rook, Color::White)));
        assert_eq!(map.at(sq::A1), None);
        assert_eq!(map.occupancy[Color::Black.index()], 0);
    }

    #[test]
    fn test_slide() {
        let mut map = BitboardMap::new();
        map.put_piece(Piece::Rook, Color::Black, sq::F8);
        map.slide(sq::F8, sq::H8);
        assert_consistent(&map);
        assert_eq!(map.at(sq::H8), Some((Piece::Rook, Color::Black)));
    }
}
