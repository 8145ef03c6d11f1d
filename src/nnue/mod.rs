//! NNUE (Efficiently Updatable Neural Network) evaluation module.
//!
//! Architecture:
//!   Input:  768 piece-square features (color x piece x square)
//!   Layer1: 768 -> HIDDEN_SIZE per perspective, accumulated incrementally
//!   Concat: 2 x HIDDEN_SIZE, side to move first, clipped ReLU
//!   Output: 2*HIDDEN_SIZE -> 1 (linear), dequantized to centipawns
//!
//! Weights are quantized to 16-bit integers at load time. The per-ply
//! accumulator frames live in a fixed-depth stack so make/unmake never
//! allocates; unmake restores the evaluator by popping.

pub mod accumulator;
pub mod evaluator;
pub mod features;
pub mod network;

// ─── Shared constants ────────────────────────────────────────

/// Input feature count (2 colors x 6 pieces x 64 squares)
pub const INPUT_SIZE: usize = 768;
/// Hidden layer size (per perspective)
pub const HIDDEN_SIZE: usize = 256;
/// Feature layer quantization factor
pub const QA: i32 = 255;
/// Output layer quantization factor
pub const QB: i32 = 64;
/// Combined quantization factor of the output value (QA * QB)
pub const QAB: i32 = QA * QB;
/// Centipawn scale of the dequantized output
pub const EVAL_SCALE: i32 = 400;
/// Accumulator stack depth: maximum search plus quiescence ply
pub const ACC_STACK_DEPTH: usize = 80;

// ─── Public API re-exports ──────────────────────────────────

pub use accumulator::{Accumulator, AccumulatorStack};
pub use evaluator::Nnue;
pub use features::{feature_index_black, feature_index_white};
pub use network::{is_active, load_and_register, register, registered, Network};
