use std::fmt;

use super::CELL_COUNT;

/// Cell permutations for the eight symmetries of the 3×3 board.
///
/// With cells numbered
///
/// ```text
/// 0 1 2
/// 3 4 5
/// 6 7 8
/// ```
///
/// row `k` lists, for each position of the transformed configuration, the baseline
/// cell it is read from: `configuration[p] = baseline[SYMMETRY_TABLE[k][p]]`.
pub const SYMMETRY_TABLE: [[usize; CELL_COUNT]; Symmetry::COUNT] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8],
    [2, 5, 8, 1, 4, 7, 0, 3, 6],
    [8, 7, 6, 5, 4, 3, 2, 1, 0],
    [6, 3, 0, 7, 4, 1, 8, 5, 2],
    [2, 1, 0, 5, 4, 3, 8, 7, 6],
    [6, 7, 8, 3, 4, 5, 0, 1, 2],
    [8, 5, 2, 7, 4, 1, 6, 3, 0],
    [0, 3, 6, 1, 4, 7, 2, 5, 8],
];

const INVERSE_TABLE: [[usize; CELL_COUNT]; Symmetry::COUNT] = invert(&SYMMETRY_TABLE);

const fn invert(
    table: &[[usize; CELL_COUNT]; Symmetry::COUNT],
) -> [[usize; CELL_COUNT]; Symmetry::COUNT] {
    let mut inverse = [[0; CELL_COUNT]; Symmetry::COUNT];
    let mut k = 0;
    while k < Symmetry::COUNT {
        let mut p = 0;
        while p < CELL_COUNT {
            inverse[k][table[k][p]] = p;
            p += 1;
        }
        k += 1;
    }
    inverse
}

const NAMES: [&str; Symmetry::COUNT] = [
    "identity",
    "rotate-ccw",
    "rotate-180",
    "rotate-cw",
    "flip-horizontal",
    "flip-vertical",
    "anti-transpose",
    "transpose",
];

/// One element of the dihedral group of the square, indexing [`SYMMETRY_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symmetry(u8);

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAMES[self.index()])
    }
}

impl Symmetry {
    pub const COUNT: usize = 8;
    pub const IDENTITY: Self = Self(0);
    pub const ALL: [Self; Self::COUNT] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    /// Returns the symmetry at `index`, or `None` when `index >= 8`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Baseline cell that ends up at `position` of the transformed configuration.
    #[must_use]
    pub const fn source_cell(self, position: usize) -> usize {
        SYMMETRY_TABLE[self.index()][position]
    }

    /// Position in the transformed configuration that baseline `cell` moves to.
    #[must_use]
    pub const fn target_cell(self, cell: usize) -> usize {
        INVERSE_TABLE[self.index()][cell]
    }

    /// Applies this symmetry to a row-major cell array.
    #[must_use]
    pub fn apply<T>(self, cells: &[T; CELL_COUNT]) -> [T; CELL_COUNT]
    where
        T: Copy,
    {
        std::array::from_fn(|p| cells[self.source_cell(p)])
    }
}
