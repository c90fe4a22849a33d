use thiserror::Error;

/// Errors raised while building a grid world or running episodes in it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("layout is empty")]
    EmptyLayout,

    #[error("malformed layout: row {row} has {found} cells, expected {expected}")]
    MalformedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid has no free cell to start an episode from")]
    NoFreeCell,

    #[error(
        "table is {table_width}x{table_height} but the grid is {grid_width}x{grid_height}"
    )]
    DimensionMismatch {
        grid_width: usize,
        grid_height: usize,
        table_width: usize,
        table_height: usize,
    },

    #[error("no terminal cell reached within {limit} steps of the episode started at ({x}, {y})")]
    StepLimitExceeded { limit: u32, x: i32, y: i32 },
}

pub type Result<T> = std::result::Result<T, Error>;
