use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ops;

/// Side length of the square board.
pub const SIZE: usize = 4;

/// Largest tile reachable on a 4x4 board (2^17).
pub const MAX_TILE: Tile = 1 << 17;

pub(crate) type Tile = u32;
pub(crate) type Line = [Tile; SIZE];
pub(crate) type Grid = [Line; SIZE];
pub(crate) type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown move '{0}' (expected up/down/left/right or w/s/a/d)")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" => Ok(Move::Up),
            "down" | "s" => Ok(Move::Down),
            "left" | "l" | "a" => Ok(Move::Left),
            "right" | "r" | "d" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// Rejected raw grid passed to [`Board::from_rows`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("tile {value} at ({row}, {col}) is not a power of two of at least 2")]
    InvalidTile { row: usize, col: usize, value: Tile },

    #[error("tile {value} at ({row}, {col}) exceeds the largest reachable tile {max}", max = MAX_TILE)]
    TileOutOfRange { row: usize, col: usize, value: Tile },
}

/// Result of sliding a board in one direction.
///
/// `changed` is a cell-by-cell comparison of the input and output grids; when it
/// is false, `board` is the input board and `score_delta` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub score_delta: Score,
    pub changed: bool,
}

/// 4x4 2048 board of tile values, row-major, `0` for an empty cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) Grid);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Build a board from raw rows, checking every tile is 0 or a power of two
    /// between 2 and [`MAX_TILE`]. A 1 never appears in play and is rejected.
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self, BoardError> {
        for (row, line) in rows.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if !value.is_power_of_two() || value == 1 {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                if value > MAX_TILE {
                    return Err(BoardError::TileOutOfRange { row, col, value });
                }
            }
        }
        Ok(Board(rows))
    }

    /// Copy of the rows, top to bottom.
    #[inline]
    pub fn rows(&self) -> [[Tile; SIZE]; SIZE] {
        self.0
    }

    /// Tile value at (`row`, `col`); panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    /// Fresh game board: an empty grid with two tiles spawned.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let b = Board::new_game(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Board::EMPTY.with_random_tile(rng).with_random_tile(rng)
    }

    /// Slide/merge tiles in `dir` without spawning a new tile.
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let out = b.slide(Move::Left);
    /// assert_eq!(out.board.rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(out.score_delta, 8);
    /// ```
    #[inline]
    pub fn slide(self, dir: Move) -> MoveOutcome {
        ops::slide(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty cell, using the provided RNG.
    /// A full board is returned unchanged.
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        ops::insert_random_tile(self, rng)
    }

    /// Perform a move then insert a random tile if the move changed the board, using the provided RNG.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> MoveOutcome {
        ops::make_move(self, dir, rng)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize {
        ops::count_empty(self)
    }

    /// Return the highest tile value (e.g., 2048) present on the board, 0 when empty.
    #[inline]
    pub fn highest_tile(self) -> Tile {
        ops::highest_tile(self)
    }

    /// Iterate over tile values in row-major order.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter { grid: self.0, idx: 0 }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(SIZE * 8 - 1);
        for (idx, line) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{separator}")?;
            }
            let cells: Vec<String> = line.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Iterator over board tiles in row-major order.
pub struct TilesIter {
    grid: Grid,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = Tile;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= SIZE * SIZE {
            return None;
        }
        let v = self.grid[self.idx / SIZE][self.idx % SIZE];
        self.idx += 1;
        Some(v)
    }
}
