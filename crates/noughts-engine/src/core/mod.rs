pub use self::{board_state::*, cell::*, symmetry::*};

pub(crate) mod board_state;
pub(crate) mod cell;
pub(crate) mod symmetry;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Number of distinct ranks, from the empty board (0) to the full board (9).
pub const RANK_COUNT: usize = CELL_COUNT + 1;
