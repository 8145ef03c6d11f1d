//! The NNUE evaluator: a collaborator holding the network reference and
//! the accumulator stack for one searcher. The board calls `activate`/
//! `deactivate` for every square a move toggles; `evaluate` runs the
//! output layer over the live frame.

use crate::bitboard::{pop_square, Color, Piece};
use crate::board::Board;

use super::accumulator::{Accumulator, AccumulatorStack};
use super::features::{feature_index_black, feature_index_white};
use super::network::Network;
use super::{EVAL_SCALE, HIDDEN_SIZE, QA, QAB};

pub struct Nnue<'n> {
    net: &'n Network,
    stack: AccumulatorStack,
}

impl<'n> Nnue<'n> {
    pub fn new(net: &'n Network) -> Self {
        Nnue {
            net,
            stack: AccumulatorStack::new(),
        }
    }

    /// Drop all frames and rebase on the root
    pub fn reset(&mut self) {
        self.stack.reset();
    }

    /// Open a frame for the move about to be made
    pub fn push(&mut self) {
        self.stack.push();
    }

    /// Discard the frame of the move being unmade
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// The live frame
    #[inline]
    pub fn top(&self) -> &Accumulator {
        self.stack.top()
    }

    /// Current ply depth
    #[inline]
    pub fn ply(&self) -> usize {
        self.stack.ply()
    }

    /// Rebuild the live frame from scratch: clear it, then fold in every
    /// placement on the board from both perspectives.
    pub fn refresh(&mut self, board: &Board) {
        let net = self.net;
        let acc = self.stack.top_mut();
        acc.clear();

        for color in Color::ALL {
            for piece in Piece::ALL {
                let mut bb = board.pieces_of(piece, color);
                while bb != 0 {
                    let sq = pop_square(&mut bb);
                    let wi = feature_index_white(piece, color, sq);
                    let bi = feature_index_black(piece, color, sq);
                    Accumulator::mark(&mut acc.white_active, wi);
                    Accumulator::mark(&mut acc.black_active, bi);
                    add_slice(&mut acc.white, net.feature_slice(wi));
                    add_slice(&mut acc.black, net.feature_slice(bi));
                }
            }
        }
    }

    /// Fold a placement into the live frame
    pub fn activate(&mut self, piece: Piece, color: Color, sq: u8) {
        let net = self.net;
        let wi = feature_index_white(piece, color, sq);
        let bi = feature_index_black(piece, color, sq);
        let acc = self.stack.top_mut();
        Accumulator::mark(&mut acc.white_active, wi);
        Accumulator::mark(&mut acc.black_active, bi);
        add_slice(&mut acc.white, net.feature_slice(wi));
        add_slice(&mut acc.black, net.feature_slice(bi));
    }

    /// Fold a placement out of the live frame
    pub fn deactivate(&mut self, piece: Piece, color: Color, sq: u8) {
        let net = self.net;
        let wi = feature_index_white(piece, color, sq);
        let bi = feature_index_black(piece, color, sq);
        let acc = self.stack.top_mut();
        Accumulator::unmark(&mut acc.white_active, wi);
        Accumulator::unmark(&mut acc.black_active, bi);
        sub_slice(&mut acc.white, net.feature_slice(wi));
        sub_slice(&mut acc.black, net.feature_slice(bi));
    }

    /// Run the output layer over the live frame. The side to move's
    /// perspective fills the first half of the concatenation. Returns
    /// centipawns from the side to move's point of view.
    pub fn evaluate(&self, side: Color) -> i32 {
        let net = self.net;
        let acc = self.stack.top();
        let (own, other) = match side {
            Color::White => (&acc.white, &acc.black),
            Color::Black => (&acc.black, &acc.white),
        };

        let mut output: i64 = 0;
        for i in 0..HIDDEN_SIZE {
            let v = (own[i] as i32 + net.ft_bias[i] as i32).clamp(0, QA);
            output += v as i64 * net.out_weights[i] as i64;
        }
        for i in 0..HIDDEN_SIZE {
            let v = (other[i] as i32 + net.ft_bias[i] as i32).clamp(0, QA);
            output += v as i64 * net.out_weights[HIDDEN_SIZE + i] as i64;
        }

        ((output + net.out_bias as i64) * EVAL_SCALE as i64 / QAB as i64) as i32
    }
}

#[inline]
fn add_slice(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16]) {
    for (a, &w) in acc.iter_mut().zip(weights) {
        *a += w;
    }
}

#[inline]
fn sub_slice(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16]) {
    for (a, &w) in acc.iter_mut().zip(weights) {
        *a -= w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::sq;
    use crate::nnue::INPUT_SIZE;

    /// Deterministic small-valued network for exercising the update paths.
    fn test_network() -> Network {
        let mut ft_weights = Vec::with_capacity(INPUT_SIZE);
        let mut ft_weights_flat = Vec::with_capacity(INPUT_SIZE * HIDDEN_SIZE);
        for i in 0..INPUT_SIZE {
            let mut row = [0i16; HIDDEN_SIZE];
            for (j, w) in row.iter_mut().enumerate() {
                *w = ((i * 31 + j * 7) % 13) as i16 - 6;
            }
            ft_weights_flat.extend_from_slice(&row);
            ft_weights.push(row);
        }
        let mut ft_bias = [0i16; HIDDEN_SIZE];
        for (j, b) in ft_bias.iter_mut().enumerate() {
            *b = (j % 11) as i16 - 5;
        }
        let mut out_weights = [0i16; 2 * HIDDEN_SIZE];
        for (i, w) in out_weights.iter_mut().enumerate() {
            *w = (i % 9) as i16 - 4;
        }
        Network {
            ft_weights,
            ft_weights_flat,
            ft_bias,
            out_weights,
            out_bias: 123,
        }
    }

    fn assert_frames_equal(a: &Accumulator, b: &Accumulator) {
        assert_eq!(a.white, b.white, "white perspective differs");
        assert_eq!(a.black, b.black, "black perspective differs");
        assert_eq!(a.white_active, b.white_active, "white activations differ");
        assert_eq!(a.black_active, b.black_active, "black activations differ");
    }

    /// The live frame must equal what a from-scratch refresh produces.
    fn assert_coherent(nnue: &Nnue, board: &Board, net: &Network) {
        let mut fresh = Nnue::new(net);
        fresh.refresh(board);
        assert_frames_equal(nnue.top(), fresh.top());
    }

    #[test]
    fn test_activate_deactivate_cancel() {
        let net = test_network();
        let mut nnue = Nnue::new(&net);
        let before = *nnue.top();
        nnue.activate(Piece::Queen, Color::Black, sq::D8);
        nnue.deactivate(Piece::Queen, Color::Black, sq::D8);
        assert_frames_equal(nnue.top(), &before);
    }

    #[test]
    fn test_incremental_tracks_refresh_through_a_game() {
        let net = test_network();
        let mut board = Board::start_pos();
        let mut nnue = Nnue::new(&net);
        nnue.refresh(&board);
        let root = *nnue.top();

        let script: [(u8, u8); 9] = [
            (sq::E2, sq::E4),
            (sq::D7, sq::D5),
            (sq::E4, sq::D5), // capture
            (sq::D8, sq::D5),
            (sq::G1, sq::F3),
            (sq::B8, sq::C6),
            (sq::F1, sq::E2),
            (sq::C8, sq::G4),
            (sq::E1, sq::G1), // castle
        ];

        let mut tokens = Vec::new();
        for (from, to) in script {
            tokens.push(board.make_move_nnue(from, to, None, &mut nnue));
            assert_coherent(&nnue, &board, &net);
        }
        assert_eq!(nnue.ply(), script.len());

        for token in tokens.iter().rev() {
            board.unmake_move_nnue(token, &mut nnue);
            assert_coherent(&nnue, &board, &net);
        }
        assert_eq!(nnue.ply(), 0);
        assert_frames_equal(nnue.top(), &root);
    }

    #[test]
    fn test_en_passant_keeps_accumulator_coherent() {
        let net = test_network();
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6").unwrap();
        let mut nnue = Nnue::new(&net);
        nnue.refresh(&board);
        let root = *nnue.top();

        let token = board.make_move_nnue(sq::E5, sq::D6, None, &mut nnue);
        assert_coherent(&nnue, &board, &net);

        board.unmake_move_nnue(&token, &mut nnue);
        assert_frames_equal(nnue.top(), &root);
    }

    #[test]
    fn test_promotion_keeps_accumulator_coherent() {
        let net = test_network();
        let mut board = Board::from_fen("8/P7/8/8/8/8/8/4k2K w - -").unwrap();
        let mut nnue = Nnue::new(&net);
        nnue.refresh(&board);
        let root = *nnue.top();

        let token = board.make_move_nnue(sq::A7, sq::A8, Some(Piece::Queen), &mut nnue);
        assert_coherent(&nnue, &board, &net);

        board.unmake_move_nnue(&token, &mut nnue);
        assert_coherent(&nnue, &board, &net);
        assert_frames_equal(nnue.top(), &root);
    }

    #[test]
    fn test_symmetric_position_evaluates_alike() {
        // The start position mirrors across the board, so both sides must
        // see the same score no matter whose turn it is.
        let net = test_network();
        let board = Board::start_pos();
        let mut nnue = Nnue::new(&net);
        nnue.refresh(&board);
        assert_eq!(nnue.evaluate(Color::White), nnue.evaluate(Color::Black));
    }

    #[test]
    fn test_evaluate_uses_live_frame() {
        let net = test_network();
        let mut board = Board::start_pos();
        let mut nnue = Nnue::new(&net);
        nnue.refresh(&board);

        let before = nnue.evaluate(Color::White);
        let token = board.make_move_nnue(sq::E2, sq::E4, None, &mut nnue);
        let after = nnue.evaluate(board.color_to_move());
        board.unmake_move_nnue(&token, &mut nnue);
        assert_eq!(nnue.evaluate(Color::White), before);
        // The after-move score came from the pushed frame, not the root
        let mut fresh = Nnue::new(&net);
        let mut replay = Board::start_pos();
        replay.make_move(sq::E2, sq::E4, None);
        fresh.refresh(&replay);
        assert_eq!(after, fresh.evaluate(replay.color_to_move()));
    }
}
