//! Tabular Q-learning in a small grid world
//!
//! An agent repeatedly starts on a random free cell of a [`Grid`](env::Grid), wanders by uniformly
//! random legal moves until it steps onto a goal (`+`) or penalty (`-`) cell, and updates its
//! action-value table after every move.

/// Implemented RL algorithms
pub mod algo;

/// Data structures
pub mod ds;

/// Grid world environment
pub mod env;

/// Error types
pub mod error;

/// Live training dashboard
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};
