//! The grid world: a map of cells, the four moves, and the agent's position with the rules for
//! legality, reward and termination derived from the cells.

mod action;
pub mod grid;
pub mod render;
mod state;

pub use action::Action;
pub use grid::Grid;
pub use state::{State, GOAL_REWARD, PENALTY_REWARD};

/// `(x, y)` coordinates in a grid, `x` growing rightwards and `y` downwards
pub type Pos = (i32, i32);
