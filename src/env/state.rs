use std::fmt;

use super::{
    grid::{FREE, GOAL, PENALTY},
    render, Action, Grid, Pos,
};

/// Reward for stepping onto a goal cell
pub const GOAL_REWARD: f32 = 10.0;

/// Reward for stepping onto a penalty cell
pub const PENALTY_REWARD: f32 = -10.0;

/// The agent's position in a [`Grid`]
///
/// Copying a state yields an independent position over the same grid, so a successor can be explored
/// without touching the state it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct State<'g> {
    grid: &'g Grid,
    x: i32,
    y: i32,
}

impl<'g> State<'g> {
    pub fn new(grid: &'g Grid, x: i32, y: i32) -> Self {
        Self { grid, x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// The cell under the agent, or `None` if the agent is off the map
    pub fn cell(&self) -> Option<char> {
        self.grid.get(self.x, self.y)
    }

    /// Whether `action` leads onto a cell the agent may occupy
    ///
    /// Only the destination matters: it must be on the map and free or terminal.
    pub fn is_legal(&self, action: Action) -> bool {
        let (dx, dy) = action.offset();
        matches!(
            self.grid.get(self.x + dx, self.y + dy),
            Some(FREE | GOAL | PENALTY)
        )
    }

    /// The legal subset of `actions`, in the order given
    pub fn legal_actions(&self, actions: &[Action]) -> Vec<Action> {
        actions
            .iter()
            .copied()
            .filter(|&a| self.is_legal(a))
            .collect()
    }

    /// Reward for arriving at the current cell, or `None` if the agent is off the map
    pub fn reward(&self) -> Option<f32> {
        self.cell().map(|cell| match cell {
            GOAL => GOAL_REWARD,
            PENALTY => PENALTY_REWARD,
            _ => 0.0,
        })
    }

    /// Whether the current cell ends an episode
    pub fn at_end(&self) -> bool {
        self.reward() != Some(0.0)
    }

    /// Move by the action's offset
    ///
    /// Legality is not checked, callers should consult [`State::is_legal`] first.
    pub fn execute(mut self, action: Action) -> Self {
        let (dx, dy) = action.offset();
        self.x += dx;
        self.y += dy;
        self
    }
}

impl fmt::Display for State<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::grid_with_agent(self.grid, Some(self.pos())))
    }
}
