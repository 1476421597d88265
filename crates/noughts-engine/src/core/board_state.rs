use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{IllegalMoveError, InvalidCellError};

use super::{
    CELL_COUNT,
    cell::{Cell, Player},
    symmetry::Symmetry,
};

/// Rows, columns and diagonals of the 3×3 board.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Legal moves of a board, in ascending cell order.
pub type LegalMoves = ArrayVec<usize, CELL_COUNT>;

/// Immutable configuration of the board.
///
/// A board state is considered equivalent to the seven other configurations
/// obtained by rotating or reflecting its baseline cells, so `==` compares
/// equivalence classes rather than raw cells. Everything derived from the cells
/// (rank, victory, legal moves and the symmetric configurations) is computed once
/// at construction.
///
/// Moves are always expressed against the baseline configuration;
/// [`adjust_move_to_config`](Self::adjust_move_to_config) translates them into one
/// of the alternate configurations.
///
/// # Example
///
/// ```
/// use noughts_engine::{BoardState, Player};
///
/// let board = BoardState::try_from([1, 0, 0, 2, 0, 0, 0, 0, 0]).unwrap();
/// let rotated = BoardState::try_from([0, 0, 0, 0, 0, 0, 1, 2, 0]).unwrap();
/// assert_eq!(board, rotated);
/// assert_eq!(board.rank(), 2);
///
/// let next = board.after_move(Player::One, 4).unwrap();
/// assert_eq!(next.rank(), 3);
/// assert!(board.after_move(Player::One, 0).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "[u8; CELL_COUNT]", try_from = "[u8; CELL_COUNT]")]
pub struct BoardState {
    configurations: [[Cell; CELL_COUNT]; Symmetry::COUNT],
    rank: u8,
    victory: (bool, bool),
    legal_moves: LegalMoves,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardState {
    #[must_use]
    pub fn new(cells: [Cell; CELL_COUNT]) -> Self {
        let configurations = Symmetry::ALL.map(|s| s.apply(&cells));
        let legal_moves = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(i, _)| i)
            .collect::<LegalMoves>();
        #[expect(clippy::cast_possible_truncation)]
        let rank = (CELL_COUNT - legal_moves.len()) as u8;
        let victory = (has_line(&cells, Player::One), has_line(&cells, Player::Two));
        Self {
            configurations,
            rank,
            victory,
            legal_moves,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new([Cell::Empty; CELL_COUNT])
    }

    /// Baseline cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.configurations[Symmetry::IDENTITY.index()]
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells().get(index).copied()
    }

    /// Cells of this board as seen through `symmetry`.
    #[must_use]
    pub fn configuration(&self, symmetry: Symmetry) -> &[Cell; CELL_COUNT] {
        &self.configurations[symmetry.index()]
    }

    /// Number of occupied cells, in `0..=9`.
    #[must_use]
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Empty cells in ascending order.
    #[must_use]
    pub fn legal_moves(&self) -> &[usize] {
        &self.legal_moves
    }

    /// Whether player 1 and player 2 (in that order) have three in a row.
    #[must_use]
    pub fn player_victory(&self) -> (bool, bool) {
        self.victory
    }

    /// The player holding a line, if any.
    ///
    /// Boards holding lines for both players are not reachable in play; for those
    /// player 1 is reported.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        match self.victory {
            (true, _) => Some(Player::One),
            (false, true) => Some(Player::Two),
            (false, false) => None,
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        usize::from(self.rank) == CELL_COUNT
    }

    /// Whether the game is over on this board, by a win or a full board.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.victory.0 || self.victory.1 || self.is_full()
    }

    /// Player to move when player 1 opened the game.
    #[must_use]
    pub fn next_player(&self) -> Player {
        if self.rank % 2 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    /// Returns the board after `player` takes cell `cell`.
    ///
    /// The new board always has a rank one higher than this one, so it can never
    /// be equivalent to this board.
    pub fn after_move(&self, player: Player, cell: usize) -> Result<Self, IllegalMoveError> {
        match self.cell(cell) {
            Some(Cell::Empty) => Ok(self.place(player, cell)),
            _ => Err(IllegalMoveError { cell }),
        }
    }

    /// Returns the boards reachable by every legal move of `player`.
    pub fn successors(&self, player: Player) -> impl Iterator<Item = Self> + '_ {
        self.legal_moves
            .iter()
            .map(move |&cell| self.place(player, cell))
    }

    pub(crate) fn place(&self, player: Player, cell: usize) -> Self {
        debug_assert!(self.cells()[cell].is_empty());
        let mut cells = *self.cells();
        cells[cell] = player.into();
        Self::new(cells)
    }

    /// Translates a move on the baseline configuration into the cell it occupies
    /// in the configuration produced by `symmetry`.
    ///
    /// If `self.matching_config(&other) == Some(symmetry)`, then playing
    /// `baseline_move` on `self` and the adjusted move on `other` yields equivalent
    /// boards.
    pub fn adjust_move_to_config(
        &self,
        baseline_move: usize,
        symmetry: Symmetry,
    ) -> Result<usize, IllegalMoveError> {
        if baseline_move >= CELL_COUNT {
            return Err(IllegalMoveError {
                cell: baseline_move,
            });
        }
        Ok(symmetry.target_cell(baseline_move))
    }

    /// Finds the symmetry under which this board's configuration equals the
    /// baseline of `other`.
    ///
    /// Returns `None` when the boards are not equivalent.
    #[must_use]
    pub fn matching_config(&self, other: &Self) -> Option<Symmetry> {
        if self.rank != other.rank {
            return None;
        }
        Symmetry::ALL
            .into_iter()
            .find(|&s| self.configuration(s) == other.cells())
    }
}

fn has_line(cells: &[Cell; CELL_COUNT], player: Player) -> bool {
    WINNING_LINES
        .iter()
        .any(|line| line.iter().all(|&i| cells[i].is_taken_by(player)))
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.matching_config(other).is_some()
    }
}

impl Eq for BoardState {}

impl From<[Cell; CELL_COUNT]> for BoardState {
    fn from(cells: [Cell; CELL_COUNT]) -> Self {
        Self::new(cells)
    }
}

impl TryFrom<[u8; CELL_COUNT]> for BoardState {
    type Error = InvalidCellError;

    fn try_from(codes: [u8; CELL_COUNT]) -> Result<Self, Self::Error> {
        let mut cells = [Cell::Empty; CELL_COUNT];
        for (cell, code) in cells.iter_mut().zip(codes) {
            *cell = Cell::from_code(code)?;
        }
        Ok(Self::new(cells))
    }
}

impl From<BoardState> for [u8; CELL_COUNT] {
    fn from(board: BoardState) -> Self {
        board.cells().map(Cell::code)
    }
}

/// Formats the baseline as three rows separated by `/`, e.g. `x.o/.x./..o`.
impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells().chunks(3).enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}
