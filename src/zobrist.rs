/// Zobrist hashing for position fingerprints.
/// Each (piece, color, square) triple gets a random 64-bit key.
/// Additional keys for each castling right, the en passant file, and
/// the side to move.

use crate::bitboard::{COLOR_COUNT, PIECE_COUNT};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::OnceLock;

pub struct ZobristKeys {
    pub piece_keys: [[[u64; 64]; PIECE_COUNT]; COLOR_COUNT],
    pub castle_keys: [u64; 4],     // one key per right, indexed by flag bit
    pub ep_keys: [u64; 8],         // en passant file (0-7)
    pub side_key: u64,             // XOR when it's black's turn
}

impl ZobristKeys {
    /// Combined contribution of a castling-rights byte: the XOR of the
    /// key for every set flag. Folding this before and after a rights
    /// change keeps the hash incremental.
    #[inline]
    pub fn castling(&self, rights: u8) -> u64 {
        let mut h = 0u64;
        for (bit, key) in self.castle_keys.iter().enumerate() {
            if rights & (1 << bit) != 0 {
                h ^= key;
            }
        }
        h
    }
}

static ZOBRIST: OnceLock<ZobristKeys> = OnceLock::new();

/// Get a reference to the global Zobrist keys, generating them on first
/// access. The seed is fixed, so every process derives the same table.
#[inline]
pub fn keys() -> &'static ZobristKeys {
    ZOBRIST.get_or_init(generate)
}

fn generate() -> ZobristKeys {
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);

    let mut keys = ZobristKeys {
        piece_keys: [[[0u64; 64]; PIECE_COUNT]; COLOR_COUNT],
        castle_keys: [0u64; 4],
        ep_keys: [0u64; 8],
        side_key: 0,
    };

    for color in 0..COLOR_COUNT {
        for piece in 0..PIECE_COUNT {
            for sq in 0..64 {
                keys.piece_keys[color][piece][sq] = rng.r#gen();
            }
        }
    }

    for i in 0..4 {
        keys.castle_keys[i] = rng.r#gen();
    }

    for i in 0..8 {
        keys.ep_keys[i] = rng.r#gen();
    }

    keys.side_key = rng.r#gen();

    keys
}
