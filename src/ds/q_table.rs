use std::{
    fmt,
    ops::{Index, IndexMut},
};

use strum::VariantArray;

use crate::{
    env::{Action, Grid, Pos},
    error::{Error, Result},
};

/// A dense action-value table for a rectangular grid
///
/// Values are stored action-major, then row by row, matching the order in which the table is printed.
/// Every entry starts at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl QTable {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![0.0; Action::COUNT * width * height],
            width,
            height,
        }
    }

    /// A zeroed table with one row of values per cell of `grid`
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Ensure the table has exactly one entry per cell of `grid`
    pub fn check_fits(&self, grid: &Grid) -> Result<()> {
        if self.width == grid.width() && self.height == grid.height() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                grid_width: grid.width(),
                grid_height: grid.height(),
                table_width: self.width,
                table_height: self.height,
            })
        }
    }

    /// **Panics** if `pos` is outside the table
    fn offset(&self, pos: Pos, action: Action) -> usize {
        let (x, y) = pos;
        assert!(
            x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height,
            "Position ({x}, {y}) is outside a {}x{} table",
            self.width,
            self.height,
        );
        (action.index() * self.height + y as usize) * self.width + x as usize
    }

    pub fn get(&self, pos: Pos, action: Action) -> f32 {
        self[(pos, action)]
    }

    pub fn set(&mut self, pos: Pos, action: Action, value: f32) {
        self[(pos, action)] = value;
    }

    /// The values of every action at `pos`, in [`Action`] order
    pub fn row(&self, pos: Pos) -> [f32; Action::COUNT] {
        std::array::from_fn(|i| self[(pos, Action::VARIANTS[i])])
    }

    /// Largest value over all actions at `pos`, whether or not they are legal there
    pub fn max(&self, pos: Pos) -> f32 {
        self.row(pos).into_iter().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Iterate over `(pos, action, value)` for every entry
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Action, f32)> + '_ {
        let (w, h) = (self.width, self.height);
        self.values.iter().enumerate().map(move |(i, &value)| {
            let action = Action::VARIANTS[i / (w * h)];
            let cell = i % (w * h);
            (((cell % w) as i32, (cell / w) as i32), action, value)
        })
    }
}

impl Index<(Pos, Action)> for QTable {
    type Output = f32;

    fn index(&self, (pos, action): (Pos, Action)) -> &Self::Output {
        &self.values[self.offset(pos, action)]
    }
}

impl IndexMut<(Pos, Action)> for QTable {
    fn index_mut(&mut self, (pos, action): (Pos, Action)) -> &mut Self::Output {
        let offset = self.offset(pos, action);
        &mut self.values[offset]
    }
}

/// One block per action: its name, then a line per grid row
///
/// Entries are printed with two decimals, exact zeros as `----`.
impl fmt::Display for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &action in Action::VARIANTS {
            writeln!(f, "{action}")?;
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    let value = self[((x, y), action)];
                    if value == 0.0 {
                        write!(f, "---- ")?;
                    } else {
                        write!(f, "{value:.2} ")?;
                    }
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
