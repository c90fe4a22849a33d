use strum::{Display, EnumIter, FromRepr, VariantArray};

/// A move of one cell in one of the four compass directions
///
/// The discriminant doubles as the action's index in a [`QTable`](crate::ds::QTable),
/// and [`Action::VARIANTS`] lists the moves in that same order.
#[derive(EnumIter, VariantArray, FromRepr, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Action {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Action {
    /// Number of distinct actions
    pub const COUNT: usize = 4;

    /// The `(dx, dy)` offset applied to a position by this action
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}
