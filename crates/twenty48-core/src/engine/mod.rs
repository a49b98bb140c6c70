//! Engine module: 4x4 2048 board, slide/merge/spawn operations.
//!
//! - `Board` is the 4x4 grid of tile values with useful methods.
//! - Free functions mirror the methods when convenient (e.g., `slide`).
//! - Line and rotation internals live in `ops` to keep things tidy.

mod ops;
pub mod state;

pub use state::{Board, BoardError, MAX_TILE, Move, MoveOutcome, ParseMoveError, SIZE};

pub use ops::{count_empty, highest_tile, insert_random_tile, make_move, slide};
