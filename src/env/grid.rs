use std::str::FromStr;

use crate::error::{Error, Result};

/// Character separating rows in a layout string
pub const ROW_DELIMITER: char = '|';

/// A small maze with one goal and one penalty cell, 7 wide and 5 tall
pub const DEFAULT_LAYOUT: &str = "       | ###  -| # #  +| # ####|       ";

pub const FREE: char = ' ';
pub const WALL: char = '#';
pub const GOAL: char = '+';
pub const PENALTY: char = '-';

/// Marker used when drawing the agent, never stored in a grid by this crate
pub const AGENT: char = 'A';

/// A rectangular map of single character cells
///
/// The shape is fixed at construction. Lookups outside the map yield `None` rather than an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<char>>,
    width: usize,
}

impl Grid {
    /// Parse a layout whose rows are separated by [`ROW_DELIMITER`]
    ///
    /// Every row must be as long as the first one.
    pub fn parse(layout: &str) -> Result<Self> {
        let cells: Vec<Vec<char>> = layout
            .split(ROW_DELIMITER)
            .map(|row| row.chars().collect())
            .collect();

        let width = cells[0].len();
        if width == 0 {
            return Err(Error::EmptyLayout);
        }

        if let Some((row, found)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(Error::MalformedLayout {
                row,
                expected: width,
                found,
            });
        }

        Ok(Self { cells, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(x, y)` lies on the map
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.contains(x, y)
            .then(|| self.cells[y as usize][x as usize])
    }

    /// Overwrite a single cell, ignoring positions off the map
    pub fn put(&mut self, x: i32, y: i32, value: char) {
        if self.contains(x, y) {
            self.cells[y as usize][x as usize] = value;
        }
    }

    /// **Panics** if `y` is not a row of the grid
    pub fn row(&self, y: usize) -> &[char] {
        &self.cells[y]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Positions of all free, non-terminal cells in row-major order
    pub fn free_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell == FREE)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }

    pub fn has_free_cell(&self) -> bool {
        self.free_cells().next().is_some()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::parse(DEFAULT_LAYOUT).expect("Default layout is rectangular")
    }
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_shape() {
        let grid = Grid::default();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.get(6, 2), Some(GOAL));
        assert_eq!(grid.get(6, 1), Some(PENALTY));
        assert_eq!(grid.get(1, 1), Some(WALL));
        assert_eq!(grid.get(0, 0), Some(FREE));
        assert_eq!(grid.row(3), &[' ', '#', ' ', '#', '#', '#', '#']);
    }

    #[test]
    fn out_of_bounds_is_absent() {
        let grid = Grid::default();
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, -1), None);
        assert_eq!(grid.get(7, 0), None);
        assert_eq!(grid.get(0, 5), None);
    }

    #[test]
    fn put_writes_in_bounds_only() {
        let mut grid = Grid::parse("  |  ").unwrap();
        grid.put(1, 1, AGENT);
        assert_eq!(grid.get(1, 1), Some(AGENT));

        let before = grid.clone();
        grid.put(2, 0, AGENT);
        grid.put(-1, 1, AGENT);
        assert_eq!(grid, before, "Out of bounds writes are ignored");
    }

    #[test]
    fn rejects_ragged_rows() {
        assert_eq!(
            Grid::parse("   |  |   "),
            Err(Error::MalformedLayout {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!("".parse::<Grid>(), Err(Error::EmptyLayout));
    }

    #[test]
    fn free_cells_skip_walls_and_terminals() {
        let grid = Grid::parse(" #+|- A").unwrap();
        let free: Vec<_> = grid.free_cells().collect();
        assert_eq!(free, vec![(0, 0), (1, 1)]);
        assert!(grid.has_free_cell());
        assert!(!Grid::parse("+").unwrap().has_free_cell());
    }
}
