//! Canonicalization of board states.
//!
//! The game tree of tic-tac-toe contains many boards that differ only by a
//! rotation or a reflection. [`BoardStateDomain`] collapses each such class into a
//! single canonical [`BoardState`](crate::BoardState) and hands out a stable
//! [`Address`] for it:
//!
//! 1. A board is looked up in the bucket for its rank
//! 2. The bucket is scanned for an equivalent board (symmetry-aware `==`)
//! 3. If none is found the board becomes the canonical member of a new class
//!
//! Addresses are `(rank, index)` pairs. Indices are assigned in discovery order and
//! never change, so the same domain must be shared by every genome and every
//! evaluation of a run.
//!
//! # Example
//!
//! ```
//! use noughts_engine::{Address, BoardState, BoardStateDomain};
//!
//! let mut domain = BoardStateDomain::new();
//! let board = BoardState::try_from([1, 0, 0, 2, 0, 0, 0, 0, 0]).unwrap();
//! let rotated = BoardState::try_from([0, 0, 0, 0, 0, 0, 1, 2, 0]).unwrap();
//!
//! let address = domain.state_to_address(&board);
//! assert_eq!(address, Address::new(2, 0));
//! assert_eq!(domain.state_to_address(&rotated), address);
//!
//! let canonical = domain.address_to_state(address).unwrap();
//! assert_eq!(canonical.cells(), board.cells());
//! ```

pub use self::domain::*;

mod domain;
