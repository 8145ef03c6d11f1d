/// Board facade over the raw position state.
/// Supports make/unmake driven by revert tokens, with optional NNUE
/// coupling, and FEN parse/emit.

use std::fmt;

use crate::bitboard::*;
use crate::errors::FenError;
use crate::moves::RevertToken;
use crate::nnue::Nnue;
use crate::position::*;
use crate::zobrist;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The public board type. Owns the position state and drives all
/// incremental updates; callers supply pseudo-legal moves and are
/// responsible for legality with respect to their own king.
#[derive(Clone)]
pub struct Board {
    pub map: BitboardMap,
}

impl Board {
    /// Create an empty board
    pub fn empty() -> Self {
        Board {
            map: BitboardMap::new(),
        }
    }

    /// Create a board from the starting position
    pub fn start_pos() -> Self {
        Self::from_fen(START_FEN).expect("Invalid start FEN")
    }

    /// Parse a FEN string into a Board. The first four fields are
    /// required; trailing halfmove/fullmove clocks are accepted and
    /// ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::FieldCount(fields.len()));
        }
        let mut board = Board::empty();

        // The board field is eight rank descriptors, rank 8 first, each a
        // mix of piece letters and digit runs of empty squares.
        let descriptors: Vec<&str> = fields[0].split('/').collect();
        if descriptors.len() != 8 {
            return Err(FenError::BadRankCount);
        }
        for (i, descriptor) in descriptors.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in descriptor.chars() {
                match ch {
                    '1'..='8' => file += ch as u8 - b'0',
                    _ => {
                        let (piece, color) =
                            Piece::from_fen_char(ch).ok_or(FenError::BadPiece(ch))?;
                        if file > 7 {
                            return Err(FenError::BadRankWidth(rank + 1));
                        }
                        board.map.put_piece(piece, color, square_at(file, rank));
                        file += 1;
                    }
                }
                if file > 8 {
                    return Err(FenError::BadRankWidth(rank + 1));
                }
            }
            if file != 8 {
                return Err(FenError::BadRankWidth(rank + 1));
            }
        }

        // Active color
        board.map.side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        // Surviving castling rights, or "-"
        if fields[2] != "-" {
            for ch in fields[2].chars() {
                let flag = match ch {
                    'K' => WK_CASTLE,
                    'Q' => WQ_CASTLE,
                    'k' => BK_CASTLE,
                    'q' => BQ_CASTLE,
                    _ => return Err(FenError::BadCastling(ch)),
                };
                board.map.castling |= flag;
            }
        }

        // En passant target, or "-"
        if fields[3] != "-" {
            let ep = square_from_name(fields[3])
                .ok_or_else(|| FenError::BadEnPassant(fields[3].to_string()))?;
            board.map.ep_square = Some(ep);
        }

        // put_piece folded the piece keys already; fold the metadata keys
        let keys = zobrist::keys();
        board.map.hash ^= keys.castling(board.map.castling);
        if let Some(ep) = board.map.ep_square {
            board.map.hash ^= keys.ep_keys[file_index(ep) as usize];
        }
        if matches!(board.map.side, Color::Black) {
            board.map.hash ^= keys.side_key;
        }

        Ok(board)
    }

    /// Emit the four core FEN fields.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0u8..8).rev() {
            let mut run = 0u32;
            for file in 0..8 {
                match self.map.at(square_at(file, rank)) {
                    Some((piece, color)) => {
                        if run > 0 {
                            placement.push(char::from_digit(run, 10).unwrap());
                            run = 0;
                        }
                        placement.push(piece.fen_char(color));
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                placement.push(char::from_digit(run, 10).unwrap());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let stm = match self.map.side {
            Color::White => 'w',
            Color::Black => 'b',
        };

        let mut rights = String::new();
        for (flag, letter) in [
            (WK_CASTLE, 'K'),
            (WQ_CASTLE, 'Q'),
            (BK_CASTLE, 'k'),
            (BQ_CASTLE, 'q'),
        ] {
            if self.map.castling & flag != 0 {
                rights.push(letter);
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }

        let ep = match self.map.ep_square {
            Some(sq) => square_to_name(sq),
            None => "-".to_string(),
        };

        format!("{} {} {} {}", placement, stm, rights, ep)
    }

    // ============================================================
    // Queries
    // ============================================================

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn at(&self, sq: u8) -> Option<(Piece, Color)> {
        self.map.at(sq)
    }

    /// Is the square empty?
    #[inline]
    pub fn empty_at(&self, sq: u8) -> bool {
        self.map.at(sq).is_none()
    }

    /// All occupied squares
    #[inline]
    pub fn all_occupied(&self) -> Bitboard {
        self.map.occupancy[0] | self.map.occupancy[1]
    }

    /// Occupancy of one color
    #[inline]
    pub fn occupancy_of(&self, color: Color) -> Bitboard {
        self.map.occupancy[color.index()]
    }

    /// Bitboard of one piece type of one color
    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.map.pieces[color.index()][piece.index()]
    }

    /// Get the king square for a color
    #[inline]
    pub fn king_of(&self, color: Color) -> u8 {
        first_square(self.map.pieces[color.index()][Piece::King.index()])
    }

    /// Castling rights of one color as (queenside, kingside)
    #[inline]
    pub fn castling_rights_of(&self, color: Color) -> (bool, bool) {
        (
            self.map.castling & queenside_flag(color) != 0,
            self.map.castling & kingside_flag(color) != 0,
        )
    }

    #[inline]
    pub fn color_to_move(&self) -> Color {
        self.map.side
    }

    #[inline]
    pub fn ep_target(&self) -> Option<u8> {
        self.map.ep_square
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.map.hash
    }

    /// Compute the full Zobrist hash from scratch
    pub fn compute_hash(&self) -> u64 {
        self.map.compute_hash()
    }

    /// Running material + piece-square score, early-game weighting
    #[inline]
    pub fn material_eval_early(&self) -> i32 {
        self.map.md_early
    }

    /// Running material + piece-square score, late-game weighting
    #[inline]
    pub fn material_eval_late(&self) -> i32 {
        self.map.md_late
    }

    /// Place a piece on an empty square (board setup)
    pub fn insert_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        self.map.put_piece(piece, color, sq);
    }

    /// Remove a piece from a square (board setup)
    pub fn remove_piece(&mut self, piece: Piece, color: Color, sq: u8) {
        self.map.remove_piece(piece, color, sq);
    }

    // ============================================================
    // Make / unmake
    // ============================================================

    /// Make a pseudo-legal move on the board. `promotion` names the piece
    /// a pawn reaching the last rank becomes. Returns the token that
    /// reverses the move.
    pub fn make_move(&mut self, from: u8, to: u8, promotion: Option<Piece>) -> RevertToken {
        self.do_move(from, to, promotion, None)
    }

    /// Make a move and keep the NNUE accumulator in sync: a fresh frame is
    /// pushed, then every square toggled by the move is mirrored into it.
    pub fn make_move_nnue(
        &mut self,
        from: u8,
        to: u8,
        promotion: Option<Piece>,
        nnue: &mut Nnue,
    ) -> RevertToken {
        nnue.push();
        self.do_move(from, to, promotion, Some(nnue))
    }

    fn do_move(
        &mut self,
        from: u8,
        to: u8,
        promotion: Option<Piece>,
        mut nnue: Option<&mut Nnue>,
    ) -> RevertToken {
        let keys = zobrist::keys();

        let (piece_f, color_f) = self
            .map
            .at(from)
            .unwrap_or_else(|| panic!("make_move: {} is empty", square_to_name(from)));
        debug_assert_eq!(color_f, self.map.side, "make_move: mover is not the side to move");
        let target = self.map.at(to);

        let mut token =
            RevertToken::snapshot(from, to, self.map.castling, self.map.ep_square, self.map.side);

        if let Some((piece_t, color_t)) = target {
            token.captured_piece = Some(piece_t);
            token.captured_color = Some(color_t);
            if let Some(n) = nnue.as_deref_mut() {
                n.deactivate(piece_t, color_t, to);
            }
        }

        // En passant capture: the victim sits one rank behind the target
        // square, not on it.
        if piece_f == Piece::Pawn && self.map.ep_square == Some(to) {
            let them = color_f.opposite();
            let ep_piece_sq = match color_f {
                Color::White => to - 8,
                Color::Black => to + 8,
            };
            self.map.remove_piece(Piece::Pawn, them, ep_piece_sq);
            token.was_en_passant = true;
            token.captured_color = Some(them);
            if let Some(n) = nnue.as_deref_mut() {
                n.deactivate(Piece::Pawn, them, ep_piece_sq);
            }
        }

        // Retire the old en passant target, then set a new one on a
        // double pawn push.
        if let Some(ep) = self.map.ep_square {
            self.map.hash ^= keys.ep_keys[file_index(ep) as usize];
        }
        self.map.ep_square = None;
        if piece_f == Piece::Pawn && to.abs_diff(from) == 16 {
            let ep = match color_f {
                Color::White => from + 8,
                Color::Black => from - 8,
            };
            self.map.ep_square = Some(ep);
            self.map.hash ^= keys.ep_keys[file_index(ep) as usize];
        }

        // Primary mutation
        self.map.move_piece(piece_f, color_f, target, from, to);
        if let Some(n) = nnue.as_deref_mut() {
            n.deactivate(piece_f, color_f, from);
            n.activate(piece_f, color_f, to);
        }

        // Promotion: swap the arrived pawn for the promoted piece
        if let Some(promo) = promotion {
            debug_assert!(piece_f == Piece::Pawn && !matches!(promo, Piece::Pawn | Piece::King));
            self.map.remove_piece(Piece::Pawn, color_f, to);
            self.map.put_piece(promo, color_f, to);
            token.was_promotion = true;
            if let Some(n) = nnue.as_deref_mut() {
                n.deactivate(Piece::Pawn, color_f, to);
                n.activate(promo, color_f, to);
            }
        }

        // Castling rights: fold the old set out, adjust, fold the new set in
        self.map.hash ^= keys.castling(self.map.castling);
        if piece_f == Piece::Rook {
            match file_index(from) {
                0 => self.map.castling &= !queenside_flag(color_f),
                7 => self.map.castling &= !kingside_flag(color_f),
                _ => {}
            }
        }
        if piece_f == Piece::King {
            self.map.castling &= !(kingside_flag(color_f) | queenside_flag(color_f));
            if to.abs_diff(from) == 2 {
                // Castle: move the rook leg as well
                let (sec_from, sec_to) = if to > from {
                    (to + 1, to - 1)
                } else {
                    (to - 2, to + 1)
                };
                match self.map.at(sec_from) {
                    Some((Piece::Rook, c)) if c == color_f => {}
                    other => panic!(
                        "castling: expected own rook on {}, found {:?}",
                        square_to_name(sec_from),
                        other
                    ),
                }
                self.map.move_piece(Piece::Rook, color_f, None, sec_from, sec_to);
                token.secondary_from = Some(sec_from);
                token.secondary_to = Some(sec_to);
                if let Some(n) = nnue.as_deref_mut() {
                    n.deactivate(Piece::Rook, color_f, sec_from);
                    n.activate(Piece::Rook, color_f, sec_to);
                }
            }
        }
        if let Some((Piece::Rook, _)) = target {
            // A rook captured on its home corner takes the right with it
            match to {
                sq::H1 => self.map.castling &= !WK_CASTLE,
                sq::A1 => self.map.castling &= !WQ_CASTLE,
                sq::H8 => self.map.castling &= !BK_CASTLE,
                sq::A8 => self.map.castling &= !BQ_CASTLE,
                _ => {}
            }
        }
        self.map.hash ^= keys.castling(self.map.castling);

        // Flip side
        self.map.side = self.map.side.opposite();
        self.map.hash ^= keys.side_key;

        token
    }

    /// Unmake a move, restoring the previous board state exactly
    pub fn unmake_move(&mut self, token: &RevertToken) {
        let keys = zobrist::keys();

        self.map.hash ^= keys.castling(self.map.castling);
        self.map.castling = token.castling;
        self.map.hash ^= keys.castling(self.map.castling);

        if let Some(ep) = self.map.ep_square {
            self.map.hash ^= keys.ep_keys[file_index(ep) as usize];
        }
        self.map.ep_square = token.ep_square;
        if let Some(ep) = self.map.ep_square {
            self.map.hash ^= keys.ep_keys[file_index(ep) as usize];
        }

        self.map.side = token.side;
        self.map.hash ^= keys.side_key;

        let (from, to) = (token.from, token.to);

        // Demote the promoted piece back to a pawn before walking it home
        if token.was_promotion {
            let (promo, color) = self
                .map
                .at(to)
                .unwrap_or_else(|| panic!("unmake: promoted piece missing on {}", square_to_name(to)));
            self.map.remove_piece(promo, color, to);
            self.map.put_piece(Piece::Pawn, color, to);
        }

        let (piece, color) = self
            .map
            .at(to)
            .unwrap_or_else(|| panic!("unmake: moved piece missing on {}", square_to_name(to)));
        self.map.move_piece(piece, color, None, to, from);

        if token.was_en_passant {
            let cap_color = token
                .captured_color
                .expect("unmake: en passant token without captured color");
            let cap_sq = match cap_color {
                Color::White => to + 8,
                Color::Black => to - 8,
            };
            self.map.put_piece(Piece::Pawn, cap_color, cap_sq);
            return;
        }

        if let Some(cap) = token.captured_piece {
            let cap_color = token
                .captured_color
                .expect("unmake: capture token without captured color");
            self.map.put_piece(cap, cap_color, to);
            return;
        }

        if let (Some(sec_from), Some(sec_to)) = (token.secondary_from, token.secondary_to) {
            // Slide the castled rook back
            self.map.slide(sec_to, sec_from);
        }
    }

    /// Unmake a move made through `make_move_nnue`: pop the accumulator
    /// frame the make pushed, then restore the position.
    pub fn unmake_move_nnue(&mut self, token: &RevertToken, nnue: &mut Nnue) {
        nnue.pop();
        self.unmake_move(token);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::start_pos()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8 {
                match self.map.at(square_at(file, rank)) {
                    Some((piece, color)) => write!(f, "{} ", piece.fen_char(color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f, "  FEN: {}", self.to_fen())?;
        write!(f, "  Hash: 0x{:016X}", self.map.hash)
    }
}
