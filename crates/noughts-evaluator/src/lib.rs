//! Policy representation and fitness evaluation for tic-tac-toe policies.
//!
//! This crate implements the two layers between the board model
//! (`noughts-engine`) and the genetic algorithm (`noughts-training`):
//!
//! 1. **Policy** ([`policy`]) - A [`Genome`](policy::Genome) is a sparse table
//!    mapping canonical board addresses to the cell player 1 plays there.
//!
//! 2. **Policy Evaluation** ([`policy_evaluator`]) - Scores a genome by walking the
//!    whole game tree against an adversary that tries every reply, once with the
//!    policy moving first and once with the adversary moving first.
//!
//! # Architecture
//!
//! ```text
//! Policy Evaluator (fitness for training)
//!     ↓ looks up actions in
//! Genome (address → action)
//!     ↓ addresses resolved by
//! Board State Domain (noughts-engine)
//! ```
//!
//! # Design Principles
//!
//! ## Canonical Addresses Only
//!
//! Genes are keyed by the address of a canonical board, and actions are expressed
//! against that canonical board. Boards reached through different move orders or
//! in a rotated orientation resolve to the same gene.
//!
//! ## Explicit Domain
//!
//! Every operation that canonicalizes takes the
//! [`BoardStateDomain`](noughts_engine::BoardStateDomain) as an argument. Genes from
//! different domains are not interchangeable.
//!
//! ## Lazy Policy Extension
//!
//! A genome does not have to cover every board. The evaluator fills in missing
//! genes with random legal actions and returns the extended genome alongside its
//! score.
//!
//! # Example
//!
//! ```
//! use noughts_engine::BoardStateDomain;
//! use noughts_evaluator::{
//!     policy::Genome,
//!     policy_evaluator::{GenomeEvaluator, Margin, PolicyEvaluator},
//! };
//!
//! let mut rng = rand::rng();
//! let mut domain = BoardStateDomain::new();
//! let genome = Genome::random(20, &mut domain, &mut rng);
//!
//! let evaluator = PolicyEvaluator::new(Margin);
//! let evaluation = evaluator.evaluate(genome, &mut domain, &mut rng).unwrap();
//! assert!(evaluation.genome.len() >= 1);
//! ```

use noughts_engine::{Address, IllegalMoveError, UnknownAddressError};

pub mod policy;
pub mod policy_evaluator;

/// Contract violation while building, mutating or following a policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum PolicyError {
    #[display("{_0}")]
    IllegalMove(IllegalMoveError),
    #[display("{_0}")]
    UnknownAddress(UnknownAddressError),
    #[from(ignore)]
    #[display("board at {address} is final and has no action to take")]
    FinalState { address: Address },
}
