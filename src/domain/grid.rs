/// Grid: the N×N board.
///
/// Cells are stored row-major in a flat Vec, addressed as `(x, y)` with
/// `x` the column and `y` the row, both in `0..size`. The size is fixed
/// at construction; only cell contents change afterwards.
///
/// Out-of-range access is a programming error and panics. Move resolution
/// only ever asks for neighbors through `neighbor()`, which filters the
/// off-grid step before any access happens.

use std::fmt;

use super::direction::Direction;
use super::tile::Tile;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "grid size must be positive");
        Grid {
            size,
            cells: vec![Tile::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> Tile {
        self.cells[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        let idx = self.index(x, y);
        self.cells[idx] = tile;
    }

    /// Coordinates of every empty cell, row-major (y outer, x inner).
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_empty())
            .map(|(i, _)| (i % self.size, i / self.size))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|t| !t.is_empty())
    }

    /// Number of non-empty cells.
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|t| !t.is_empty()).count()
    }

    /// Largest value on the board, 0 for an empty board.
    pub fn max_value(&self) -> u32 {
        self.cells.iter().filter_map(|t| t.value()).max().unwrap_or(0)
    }

    /// The cell one step from `(x, y)` in `dir`, or None if that step
    /// leaves the grid.
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = dir.delta();
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        let n = self.size as i64;
        if nx < 0 || ny < 0 || nx >= n || ny >= n {
            None
        } else {
            Some((nx as usize, ny as usize))
        }
    }

    /// Build a grid from rows of values, 0 meaning empty.
    #[cfg(test)]
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Self {
        let mut grid = Grid::new(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(row.len(), grid.size, "rows must form a square");
            for (x, &v) in row.iter().enumerate() {
                grid.set(x, y, Tile::from(Some(v)));
            }
        }
        grid
    }

    // ── Internal ──

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.size && y < self.size,
            "cell ({x}, {y}) out of range for {0}x{0} grid",
            self.size
        );
        y * self.size + x
    }
}

/// Compact text form, one row per line, `.` for empty cells.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                if x > 0 {
                    write!(f, " ")?;
                }
                match self.get(x, y) {
                    Tile::Empty => write!(f, "{:>5}", ".")?,
                    Tile::Value(v) => write!(f, "{v:>5}")?,
                }
            }
            if y + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_grid_is_empty() {
        let g = Grid::new(3);
        assert_eq!(g.size(), 3);
        assert_eq!(g.empty_cells().len(), 9);
        assert_eq!(g.tile_count(), 0);
        assert_eq!(g.max_value(), 0);
    }

    #[test]
    fn set_then_get() {
        let mut g = Grid::new(4);
        g.set(3, 1, Tile::Value(8));
        assert_eq!(g.get(3, 1), Tile::Value(8));
        assert_eq!(g.get(1, 3), Tile::Empty);
        g.set(3, 1, Tile::Empty);
        assert!(g.get(3, 1).is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        Grid::new(3).get(3, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_out_of_range_panics() {
        Grid::new(3).set(0, 5, Tile::Value(2));
    }

    #[test]
    fn equality_compares_size_and_cells() {
        let a = Grid::from_rows(&[[2, 0], [0, 4]]);
        let b = Grid::from_rows(&[[2, 0], [0, 4]]);
        let c = Grid::from_rows(&[[2, 0], [4, 0]]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(Grid::new(2), Grid::new(3));
    }

    #[test]
    fn empty_cells_are_row_major() {
        let g = Grid::from_rows(&[[0, 2, 0], [2, 2, 2], [0, 0, 2]]);
        assert_eq!(g.empty_cells(), vec![(0, 0), (2, 0), (0, 2), (1, 2)]);
    }

    #[test]
    fn neighbor_stops_at_edges() {
        let g = Grid::new(3);
        assert_eq!(g.neighbor(0, 0, Direction::Up), None);
        assert_eq!(g.neighbor(0, 0, Direction::Left), None);
        assert_eq!(g.neighbor(2, 2, Direction::Down), None);
        assert_eq!(g.neighbor(2, 2, Direction::Right), None);
        assert_eq!(g.neighbor(1, 1, Direction::Up), Some((1, 0)));
        assert_eq!(g.neighbor(1, 1, Direction::Right), Some((2, 1)));
    }

    #[test]
    fn full_grid_reports_full() {
        let g = Grid::from_rows(&[[2, 4], [8, 16]]);
        assert!(g.is_full());
        assert!(g.empty_cells().is_empty());
        assert_eq!(g.max_value(), 16);
    }

    #[test]
    fn display_marks_empty_cells() {
        let g = Grid::from_rows(&[[2, 0], [0, 128]]);
        assert_eq!(g.to_string(), "    2     .\n    .   128");
    }

    proptest! {
        #[test]
        fn empty_cells_match_get(cells in proptest::collection::vec(0u32..4, 16)) {
            let rows: Vec<Vec<u32>> = cells.chunks(4).map(|r| r.iter().map(|&v| if v == 0 { 0 } else { 1 << v }).collect()).collect();
            let g = Grid::from_rows(&rows[..]);
            let empties = g.empty_cells();
            prop_assert_eq!(empties.len(), 16 - g.tile_count());
            for y in 0..4 {
                for x in 0..4 {
                    prop_assert_eq!(empties.contains(&(x, y)), g.get(x, y).is_empty());
                }
            }
        }
    }
}
