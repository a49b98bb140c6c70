//! 2048 core: the board engine, a single-player game session and the
//! high-score record shared by the score service and its clients.

pub mod engine;
pub mod record;
pub mod session;

pub use engine::{Board, Move, MoveOutcome};
pub use record::ScoreRecord;
pub use session::{GameSession, SubmitError};
