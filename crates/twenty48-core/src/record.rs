use serde::{Deserialize, Serialize};

/// One submitted high score, `{"name": ..., "score": ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
