use crate::InvalidCellError;

/// One of the two players.
///
/// [`Player::One`] is the side whose policy is being evolved; [`Player::Two`] is the
/// adversary.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Player {
    #[display("player 1")]
    One,
    #[display("player 2")]
    Two,
}

impl Player {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Numeric code used in the serialized board format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Contents of a single board cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Player),
}

impl Cell {
    /// Decodes a cell from its serialized code: `0` empty, `1` player 1, `2` player 2.
    pub const fn from_code(code: u8) -> Result<Self, InvalidCellError> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Taken(Player::One)),
            2 => Ok(Self::Taken(Player::Two)),
            _ => Err(InvalidCellError { code }),
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Taken(player) => player.code(),
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Taken(Player::One) => 'x',
            Self::Taken(Player::Two) => 'o',
        }
    }

    #[must_use]
    pub fn is_taken_by(self, player: Player) -> bool {
        self == Self::from(player)
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        Self::Taken(player)
    }
}
