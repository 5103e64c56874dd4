/// Move rules — truth-table driven.
///
/// Pure functions over a Grid. `resolve_move` mutates the grid it is
/// handed; `simulate_move` works on a value copy and leaves the input alone.
///
/// ## Shift Truth Table
///
/// One tile at `src` tries to step one cell toward `dst`:
/// ┌────────────────────────┬───────────┬────────────────────────┐
/// │ Condition              │ Result    │ Notes                  │
/// ├────────────────────────┼───────────┼────────────────────────┤
/// │ dst off grid           │ (skipped) │ never reaches here     │
/// │ dst empty              │ MOVED     │ src cleared            │
/// │ dst value == src value │ MERGED    │ dst = sum, src cleared │
/// │ sum overflows u32      │ BLOCKED   │ no change              │
/// │ Otherwise              │ BLOCKED   │ no change              │
/// └────────────────────────┴───────────┴────────────────────────┘
///
/// ## Passes
///
/// A pass scans every cell row-major (y outer, x inner, ascending) and
/// applies the shift to each non-empty cell. A move repeats passes until
/// one leaves the grid exactly as it found it.
///
/// Merged tiles are not marked: a tile produced by a merge can merge again
/// in a later pass of the same move. `[2,2,4,_]` moved left ends as
/// `[8,_,_,_]`, where classic 2048 would stop at `[4,4,_,_]`.

use super::direction::Direction;
use super::grid::Grid;
use super::tile::Tile;

/// Outcome of a single shift.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shift {
    Moved,
    Merged(u32),
    Blocked,
}

/// A merge that happened during a move: where, and the resulting value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Merge {
    pub x: usize,
    pub y: usize,
    pub value: u32,
}

// ══════════════════════════════════════════════════════════════
// Shift / pass / move
// ══════════════════════════════════════════════════════════════

/// Shift the tile at `src` one cell onto `dst`. See truth table above.
pub fn shift_one_item_to(grid: &mut Grid, src: (usize, usize), dst: (usize, usize)) -> Shift {
    let from = grid.get(src.0, src.1);
    let to = grid.get(dst.0, dst.1);

    let merged = !to.is_empty();
    match from.combine_into(to) {
        Some(result) => {
            grid.set(dst.0, dst.1, result);
            grid.set(src.0, src.1, Tile::Empty);
            match (merged, result) {
                (true, Tile::Value(v)) => Shift::Merged(v),
                _ => Shift::Moved,
            }
        }
        None => Shift::Blocked,
    }
}

/// One row-major pass. Appends any merges to `merges`.
pub fn step_pass(grid: &mut Grid, dir: Direction, merges: &mut Vec<Merge>) {
    let size = grid.size();
    for y in 0..size {
        for x in 0..size {
            if grid.get(x, y).is_empty() { continue; }
            let Some(dst) = grid.neighbor(x, y, dir) else { continue };
            if let Shift::Merged(value) = shift_one_item_to(grid, (x, y), dst) {
                merges.push(Merge { x: dst.0, y: dst.1, value });
            }
        }
    }
}

/// Repeat passes until a fixed point. Returns every merge performed.
pub fn resolve_move(grid: &mut Grid, dir: Direction) -> Vec<Merge> {
    let mut merges = Vec::new();
    loop {
        let before = grid.clone();
        step_pass(grid, dir, &mut merges);
        if *grid == before {
            return merges;
        }
    }
}

/// The grid `dir` would produce, without spawning. `grid` is untouched.
pub fn simulate_move(grid: &Grid, dir: Direction) -> Grid {
    let mut copy = grid.clone();
    resolve_move(&mut copy, dir);
    copy
}

/// Would any of the four moves change the grid?
pub fn has_legal_move(grid: &Grid) -> bool {
    Direction::ALL
        .iter()
        .any(|&dir| simulate_move(grid, dir) != *grid)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn moved(rows: &[&[u32]], dir: Direction) -> Grid {
        simulate_move(&Grid::from_rows(rows), dir)
    }

    // ── Single shifts ──

    #[test]
    fn shift_into_empty_moves() {
        let mut g = Grid::from_rows(&[[0, 2], [0, 0]]);
        assert_eq!(shift_one_item_to(&mut g, (1, 0), (0, 0)), Shift::Moved);
        assert_eq!(g, Grid::from_rows(&[[2, 0], [0, 0]]));
    }

    #[test]
    fn shift_into_equal_merges() {
        let mut g = Grid::from_rows(&[[4, 4], [0, 0]]);
        assert_eq!(shift_one_item_to(&mut g, (1, 0), (0, 0)), Shift::Merged(8));
        assert_eq!(g, Grid::from_rows(&[[8, 0], [0, 0]]));
    }

    #[test]
    fn shift_into_different_is_blocked() {
        let mut g = Grid::from_rows(&[[2, 4], [0, 0]]);
        assert_eq!(shift_one_item_to(&mut g, (1, 0), (0, 0)), Shift::Blocked);
        assert_eq!(g, Grid::from_rows(&[[2, 4], [0, 0]]));
    }

    // ── Whole moves ──

    #[test]
    fn single_merge_left() {
        let g = moved(&[&[2, 2, 0], &[0, 0, 0], &[0, 0, 0]], Direction::Left);
        assert_eq!(g, Grid::from_rows(&[[4, 0, 0], [0, 0, 0], [0, 0, 0]]));
    }

    #[test]
    fn three_equal_tiles_left() {
        let g = moved(
            &[&[2, 2, 2, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            Direction::Left,
        );
        assert_eq!(g.get(0, 0), Tile::Value(4));
        assert_eq!(g.get(1, 0), Tile::Value(2));
        assert!(g.get(2, 0).is_empty());
        assert!(g.get(3, 0).is_empty());
    }

    #[test]
    fn merged_tile_merges_again_in_same_move() {
        let g = moved(
            &[&[2, 2, 4, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            Direction::Left,
        );
        assert_eq!(g.get(0, 0), Tile::Value(8));
        assert_eq!(g.tile_count(), 1);
    }

    #[test]
    fn three_equal_tiles_right_follow_scan_order() {
        // Scan runs left to right, so the leftmost pair merges first.
        let g = moved(
            &[&[2, 2, 2, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            Direction::Right,
        );
        assert_eq!(g, Grid::from_rows(&[[0, 0, 4, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]));
    }

    #[test]
    fn slides_all_the_way_down() {
        let g = moved(&[&[0, 8, 0], &[0, 0, 0], &[0, 0, 0]], Direction::Down);
        assert_eq!(g, Grid::from_rows(&[[0, 0, 0], [0, 0, 0], [0, 8, 0]]));
    }

    #[test]
    fn up_with_tiles_in_top_row_is_noop() {
        let rows: &[&[u32]] = &[&[2, 4, 2], &[0, 0, 0], &[0, 0, 0]];
        assert_eq!(moved(rows, Direction::Up), Grid::from_rows(rows));
    }

    #[test]
    fn resolve_move_reports_merges() {
        let mut g = Grid::from_rows(&[[2, 2], [4, 4]]);
        let merges = resolve_move(&mut g, Direction::Left);
        assert_eq!(
            merges,
            vec![Merge { x: 0, y: 0, value: 4 }, Merge { x: 0, y: 1, value: 8 }]
        );
    }

    #[test]
    fn simulate_leaves_input_untouched() {
        let g = Grid::from_rows(&[[0, 2], [0, 2]]);
        let snapshot = g.clone();
        let _ = simulate_move(&g, Direction::Left);
        assert_eq!(g, snapshot);
    }

    // ── Legal moves ──

    #[test]
    fn checkerboard_has_no_legal_move() {
        let g = Grid::from_rows(&[[2, 4, 2], [4, 2, 4], [2, 4, 2]]);
        assert!(!has_legal_move(&g));
    }

    #[test]
    fn adjacent_pair_is_a_legal_move() {
        let g = Grid::from_rows(&[[2, 4, 2], [4, 2, 4], [2, 4, 4]]);
        assert!(has_legal_move(&g));
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        proptest::collection::vec(0u32..5, 16).prop_map(|cells| {
            let rows: Vec<Vec<u32>> = cells
                .chunks(4)
                .map(|r| r.iter().map(|&e| if e == 0 { 0 } else { 1 << e }).collect())
                .collect();
            Grid::from_rows(&rows[..])
        })
    }

    fn arb_dir() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    fn total(g: &Grid) -> u64 {
        let mut sum = 0u64;
        for y in 0..g.size() {
            for x in 0..g.size() {
                sum += g.get(x, y).value().unwrap_or(0) as u64;
            }
        }
        sum
    }

    proptest! {
        #[test]
        fn moving_twice_equals_moving_once(g in arb_grid(), dir in arb_dir()) {
            let once = simulate_move(&g, dir);
            let twice = simulate_move(&once, dir);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn moves_conserve_total_value(g in arb_grid(), dir in arb_dir()) {
            let after = simulate_move(&g, dir);
            prop_assert_eq!(total(&g), total(&after));
            prop_assert!(after.tile_count() <= g.tile_count());
        }
    }
}
