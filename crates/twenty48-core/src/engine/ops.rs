use rand::Rng;

use super::state::{Board, Grid, Line, Move, MoveOutcome, SIZE, Score, Tile};

/// Perform a move then insert a random tile if the move changed the board.
pub fn make_move<R: Rng + ?Sized>(board: Board, direction: Move, rng: &mut R) -> MoveOutcome {
    let outcome = slide(board, direction);
    if !outcome.changed {
        return outcome;
    }
    MoveOutcome {
        board: insert_random_tile(outcome.board, rng),
        ..outcome
    }
}

/// Slide/merge tiles in the given direction. No randomness.
///
/// Every direction is reduced to "left" on rows: right mirrors each row, up
/// and down rotate the grid so columns become rows and rotate back afterwards.
pub fn slide(board: Board, direction: Move) -> MoveOutcome {
    let grid = board.0;
    let (moved, score_delta) = match direction {
        Move::Left => slide_rows(grid),
        Move::Right => {
            let (g, s) = slide_rows(mirror(grid));
            (mirror(g), s)
        }
        Move::Up => {
            let (g, s) = slide_rows(rotate_left(grid));
            (rotate_right(g), s)
        }
        Move::Down => {
            let (g, s) = slide_rows(rotate_right(grid));
            (rotate_left(g), s)
        }
    };
    if moved == grid {
        return MoveOutcome {
            board,
            score_delta: 0,
            changed: false,
        };
    }
    MoveOutcome {
        board: Board(moved),
        score_delta,
        changed: true,
    }
}

/// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
/// No-op on a full board.
pub fn insert_random_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board {
    let empty: Vec<(usize, usize)> = (0..SIZE)
        .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
        .filter(|&(row, col)| board.0[row][col] == 0)
        .collect();
    if empty.is_empty() {
        return board;
    }
    let (row, col) = empty[rng.gen_range(0..empty.len())];
    let mut grid = board.0;
    grid[row][col] = generate_random_tile(rng);
    Board(grid)
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> usize {
    board.tiles().filter(|&v| v == 0).count()
}

pub fn highest_tile(board: Board) -> Tile {
    board.tiles().max().unwrap_or(0)
}

fn slide_rows(grid: Grid) -> (Grid, Score) {
    let mut out = [[0; SIZE]; SIZE];
    let mut score = 0;
    for (dst, line) in out.iter_mut().zip(grid) {
        let (moved, line_score) = slide_line(line);
        *dst = moved;
        score += line_score;
    }
    (out, score)
}

/// Compact, merge once left to right, compact again.
pub(crate) fn slide_line(line: Line) -> (Line, Score) {
    let mut tiles: Vec<Tile> = line.into_iter().filter(|&v| v != 0).collect();
    let mut score = 0;
    let mut i = 0;
    while i + 1 < tiles.len() {
        if tiles[i] == tiles[i + 1] {
            tiles[i] *= 2;
            tiles[i + 1] = 0;
            score += Score::from(tiles[i]);
            // the merged tile and its partner are both consumed
            i += 2;
        } else {
            i += 1;
        }
    }
    let mut out = [0; SIZE];
    for (dst, v) in out.iter_mut().zip(tiles.into_iter().filter(|&v| v != 0)) {
        *dst = v;
    }
    (out, score)
}

fn mirror(grid: Grid) -> Grid {
    grid.map(|mut line| {
        line.reverse();
        line
    })
}

/// Counter-clockwise: row `i` of the result is column `SIZE - 1 - i` read top to bottom.
pub(crate) fn rotate_left(grid: Grid) -> Grid {
    std::array::from_fn(|i| std::array::from_fn(|j| grid[j][SIZE - 1 - i]))
}

/// Clockwise: row `i` of the result is column `i` read bottom to top.
pub(crate) fn rotate_right(grid: Grid) -> Grid {
    std::array::from_fn(|i| std::array::from_fn(|j| grid[SIZE - 1 - j][i]))
}

pub(crate) fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{x:^7}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::{StdRng, mock::StepRng};

    fn board(rows: [[Tile; 4]; 4]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn column(b: Board, col: usize) -> [Tile; 4] {
        std::array::from_fn(|row| b.get(row, col))
    }

    #[test]
    fn it_slide_line() {
        assert_eq!(slide_line([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
        assert_eq!(slide_line([2, 4, 2, 4]), ([2, 4, 2, 4], 0));
        assert_eq!(slide_line([2, 2, 4, 4]), ([4, 8, 0, 0], 12));
        assert_eq!(slide_line([2, 0, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(slide_line([0, 0, 0, 2]), ([2, 0, 0, 0], 0));
        assert_eq!(slide_line([4, 4, 4, 0]), ([8, 4, 0, 0], 8));
    }

    #[test]
    fn merges_do_not_chain() {
        assert_eq!(slide_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(slide_line([4, 2, 2, 0]), ([4, 4, 0, 0], 4));
        assert_eq!(slide_line([8, 4, 4, 8]), ([8, 8, 8, 0], 8));
    }

    #[test]
    fn test_slide_left() {
        let game = board([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        let out = slide(game, Move::Left);
        assert!(out.changed);
        assert_eq!(
            out.board.rows(),
            [[2, 4, 8, 16], [2, 16, 4, 0], [8, 0, 0, 0], [2, 4, 0, 0]]
        );
        assert_eq!(out.score_delta, 16 + 8);
    }

    #[test]
    fn test_slide_right() {
        let game = board([[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        let out = slide(game, Move::Right);
        assert_eq!(
            out.board.rows(),
            [[2, 4, 8, 16], [0, 2, 16, 4], [0, 0, 0, 8], [0, 0, 2, 4]]
        );
        assert_eq!(out.score_delta, 24);
        // right merges from the far end first
        let out = slide(board([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]), Move::Right);
        assert_eq!(out.board.rows()[0], [0, 0, 2, 4]);
    }

    #[test]
    fn test_slide_up() {
        let game = board([[0, 2, 0, 0], [2, 2, 0, 0], [2, 4, 0, 0], [4, 4, 0, 0]]);
        let out = slide(game, Move::Up);
        assert_eq!(column(out.board, 0), [4, 4, 0, 0]);
        assert_eq!(column(out.board, 1), [4, 8, 0, 0]);
        assert_eq!(out.score_delta, 4 + 4 + 8);
    }

    #[test]
    fn test_slide_down() {
        let game = board([[0, 2, 0, 0], [2, 2, 0, 0], [2, 4, 0, 0], [4, 4, 0, 0]]);
        let out = slide(game, Move::Down);
        assert_eq!(column(out.board, 0), [0, 0, 4, 4]);
        assert_eq!(column(out.board, 1), [0, 0, 4, 8]);
        assert_eq!(out.score_delta, 16);
    }

    #[test]
    fn unchanged_slide_is_rejected() {
        let game = board([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let first = slide(game, Move::Left);
        assert!(first.changed);
        assert_eq!(first.board.rows()[0], [2, 0, 0, 0]);

        let second = slide(first.board, Move::Left);
        assert!(!second.changed);
        assert_eq!(second.score_delta, 0);
        assert_eq!(second.board, first.board);

        let mut rng = StdRng::seed_from_u64(3);
        let third = make_move(first.board, Move::Left, &mut rng);
        assert!(!third.changed);
        assert_eq!(third.board, first.board);
        assert_eq!(count_empty(third.board), 15);
    }

    #[test]
    fn rotations_are_inverse() {
        let grid = [[2, 4, 8, 16], [32, 64, 128, 256], [0, 2, 0, 4], [8, 0, 0, 2]];
        assert_eq!(rotate_right(rotate_left(grid)), grid);
        assert_eq!(rotate_left(rotate_right(grid)), grid);
        assert_eq!(rotate_left(grid)[0], [16, 256, 4, 2]);
        assert_eq!(rotate_right(grid)[0], [8, 0, 32, 2]);
    }

    #[test]
    fn accepted_move_spawns_one_tile() {
        let mut rng = StdRng::seed_from_u64(11);
        let game = board([[2, 2, 0, 0], [0, 0, 4, 0], [0; 4], [0; 4]]);
        for dir in Move::ALL {
            let pre = slide(game, dir);
            let out = make_move(game, dir, &mut rng);
            assert!(out.changed);
            assert_eq!(out.score_delta, pre.score_delta);
            assert_eq!(count_empty(out.board), count_empty(pre.board) - 1);
            let spawned: Vec<Tile> = pre
                .board
                .tiles()
                .zip(out.board.tiles())
                .filter(|(before, after)| before != after)
                .map(|(before, after)| {
                    assert_eq!(before, 0);
                    after
                })
                .collect();
            assert_eq!(spawned.len(), 1);
            assert!(spawned[0] == 2 || spawned[0] == 4);
        }
    }

    #[test]
    fn spawn_picks_empty_cell_and_weighted_value() {
        // StepRng(0, 0) always yields zero: first empty cell, value 2
        let mut rng = StepRng::new(0, 0);
        let game = board([[2, 0, 4, 0], [0; 4], [0; 4], [0; 4]]);
        let out = insert_random_tile(game, &mut rng);
        assert_eq!(out.rows()[0], [2, 2, 4, 0]);

        let mut twos = 0;
        let mut fours = 0;
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2000 {
            match generate_random_tile(&mut rng) {
                2 => twos += 1,
                4 => fours += 1,
                other => panic!("unexpected tile {other}"),
            }
        }
        assert!(fours > 100 && fours < 320, "fours = {fours}");
        assert!(twos > fours);
    }

    #[test]
    fn full_board_spawn_is_noop() {
        let full = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(insert_random_tile(full, &mut rng), full);
        for dir in Move::ALL {
            assert!(!make_move(full, dir, &mut rng).changed);
        }
    }

    #[test]
    fn it_test_insert_random_tile() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game = Board::EMPTY;
        for _ in 0..16 {
            game = insert_random_tile(game, &mut rng);
        }
        assert_eq!(count_empty(game), 0);
        assert!(game.tiles().all(|v| v == 2 || v == 4));
    }

    #[test]
    fn new_game_has_two_tiles() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let game = Board::new_game(&mut rng);
            let tiles: Vec<Tile> = game.tiles().filter(|&v| v != 0).collect();
            assert_eq!(tiles.len(), 2);
            assert!(tiles.iter().all(|&v| v == 2 || v == 4));
        }
    }

    #[test]
    fn it_highest_tile() {
        assert_eq!(highest_tile(Board::EMPTY), 0);
        let game = board([[2, 0, 0, 0], [0, 1024, 0, 0], [0; 4], [0, 0, 0, 64]]);
        assert_eq!(highest_tile(game), 1024);
    }
}
