use std::path::Path;

use rusqlite::{Connection, params};
use twenty48_core::ScoreRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("score {0} does not fit in the database")]
    ScoreOutOfRange(u64),

    #[error("stored score {0} is negative")]
    NegativeScore(i64),
}

/// Append-only high-score table in a SQLite database.
///
/// Schema:
/// - scores(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, score INTEGER)
pub struct ScoreStore {
    conn: Connection,
}

impl ScoreStore {
    /// Create or open the database at `path`, ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::with_connection(conn)
    }

    /// Throwaway store, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS scores_by_score ON scores (score DESC, id ASC);
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Store one record as given.
    pub fn append(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        let score =
            i64::try_from(record.score).map_err(|_| StoreError::ScoreOutOfRange(record.score))?;
        self.conn.execute(
            "INSERT INTO scores (name, score) VALUES (?1, ?2)",
            params![record.name, score],
        )?;
        Ok(())
    }

    /// All records, highest score first; equal scores keep submission order.
    pub fn list(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, score FROM scores ORDER BY score DESC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (name, score) = row?;
            let score = u64::try_from(score).map_err(|_| StoreError::NegativeScore(score))?;
            records.push(ScoreRecord { name, score });
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get::<_, i64>(0))?;
        Ok(n.max(0) as u64)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
