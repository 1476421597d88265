//! Board model and canonicalization registry for 3×3 tic-tac-toe.
//!
//! - [`core`] holds the immutable [`BoardState`] value, its cells and the eight
//!   board [`Symmetry`] transforms.
//! - [`engine`] holds the [`BoardStateDomain`], which assigns every class of
//!   symmetry-equivalent boards a stable [`Address`].
//!
//! # Example
//!
//! ```
//! use noughts_engine::{BoardState, BoardStateDomain, Player};
//!
//! let mut domain = BoardStateDomain::new();
//! let corner = BoardState::empty().after_move(Player::One, 0).unwrap();
//! let other_corner = BoardState::empty().after_move(Player::One, 8).unwrap();
//!
//! assert_eq!(corner, other_corner);
//! assert_eq!(
//!     domain.state_to_address(&corner),
//!     domain.state_to_address(&other_corner),
//! );
//! assert_eq!(domain.known_state_count(), 1);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("move {cell} is illegal on this board")]
pub struct IllegalMoveError {
    pub cell: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid cell code {code} (expected 0, 1 or 2)")]
pub struct InvalidCellError {
    pub code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("address {address} is not registered in the domain")]
pub struct UnknownAddressError {
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DomainLoadError {
    #[display("domain has {count} rank buckets, expected at most 10")]
    TooManyRanks { count: usize },
    #[display("board at {address} has rank {actual}")]
    RankMismatch { address: Address, actual: u8 },
    #[display("board at {address} is equivalent to an earlier board of the same rank")]
    DuplicateClass { address: Address },
}
