/// Revert tokens: the snapshot taken by `make_move` that lets
/// `unmake_move` reverse exactly one move.

use crate::bitboard::{Color, Piece};

/// Everything needed to undo a single move: the squares involved, what was
/// captured (if anything), which special-move path was taken, and the
/// metadata the move clobbered (castling rights, en passant target, side
/// to move).
///
/// En passant captures leave `captured_piece` unset and record only
/// `captured_color`; normal captures set both. `secondary_from`/`secondary_to`
/// describe the rook leg of a castle.
#[derive(Debug, Clone, Copy)]
pub struct RevertToken {
    pub from: u8,
    pub to: u8,
    pub captured_piece: Option<Piece>,
    pub captured_color: Option<Color>,
    pub was_en_passant: bool,
    pub was_promotion: bool,
    pub secondary_from: Option<u8>,
    pub secondary_to: Option<u8>,
    /// Castling rights before the move.
    pub castling: u8,
    /// En passant target before the move.
    pub ep_square: Option<u8>,
    /// Side to move before the move.
    pub side: Color,
}

impl RevertToken {
    /// Snapshot the metadata of the position about to be mutated. Capture
    /// and special-move fields are filled in as the move unfolds.
    pub(crate) fn snapshot(from: u8, to: u8, castling: u8, ep_square: Option<u8>, side: Color) -> Self {
        RevertToken {
            from,
            to,
            captured_piece: None,
            captured_color: None,
            was_en_passant: false,
            was_promotion: false,
            secondary_from: None,
            secondary_to: None,
            castling,
            ep_square,
            side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::sq;

    #[test]
    fn test_snapshot_defaults() {
        let t = RevertToken::snapshot(sq::E2, sq::E4, 0b1111, Some(sq::D6), Color::White);
        assert_eq!(t.from, sq::E2);
        assert_eq!(t.to, sq::E4);
        assert_eq!(t.castling, 0b1111);
        assert_eq!(t.ep_square, Some(sq::D6));
        assert_eq!(t.side, Color::White);
        assert!(t.captured_piece.is_none());
        assert!(!t.was_en_passant);
        assert!(!t.was_promotion);
        assert!(t.secondary_from.is_none());
    }
}
