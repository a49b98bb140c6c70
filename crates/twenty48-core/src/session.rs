use rand::Rng;

use crate::engine::{Board, Move, MoveOutcome};
use crate::record::ScoreRecord;

/// Why the current session cannot be submitted as a high score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("enter a name before submitting")]
    MissingName,

    #[error("score must be positive to submit")]
    NoScore,
}

/// State of one player's game: the board, the running score and the name
/// the score will be submitted under.
///
/// Board and score only change together, through [`GameSession::apply_move`]
/// or [`GameSession::restart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    score: u64,
    name: String,
}

impl GameSession {
    /// Start a fresh game with an empty name.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_parts(Board::new_game(rng), 0, String::new())
    }

    pub fn from_parts(board: Board, score: u64, name: impl Into<String>) -> Self {
        Self {
            board,
            score,
            name: name.into(),
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Apply one move. The new board (with its spawned tile) and the score
    /// delta are committed only when the slide changed the grid.
    pub fn apply_move<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> MoveOutcome {
        let outcome = self.board.make_move(dir, rng);
        if outcome.changed {
            self.board = outcome.board;
            self.score = self.score.saturating_add(outcome.score_delta);
        }
        outcome
    }

    /// Throw the current board away and deal a new one; the name is kept.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.board = Board::new_game(rng);
        self.score = 0;
    }

    /// The record to submit for this session.
    pub fn submission(&self) -> Result<ScoreRecord, SubmitError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SubmitError::MissingName);
        }
        if self.score == 0 {
            return Err(SubmitError::NoScore);
        }
        Ok(ScoreRecord::new(name, self.score))
    }
}
