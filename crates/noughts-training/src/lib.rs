//! Training system for evolving tic-tac-toe policies with a genetic algorithm.
//!
//! This crate evolves [`Genome`](noughts_evaluator::policy::Genome)s, sparse tables
//! mapping canonical boards to the move player 1 makes there, so that they maximize
//! the fitness computed by the evaluator crate.
//!
//! # How Training Works
//!
//! 1. **Population** - Create individuals whose genomes hold a few random genes
//! 2. **Evaluation** - Each genome plays the whole game tree against every possible
//!    opponent, growing a gene for each board it had not covered yet
//! 3. **Fitness** - A scoring policy turns the win/loss/draw tallies into a score
//! 4. **Selection** - Parents are drawn by tournament or roulette
//! 5. **Reproduction** - Next generation through mapping crossover and change-action
//!    mutation
//! 6. **Repeat** - Continue for a fixed number of generations
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm
//!     ↓ evolves
//! Genomes (individuals)
//!     ↓ played by
//! Policy Evaluator (noughts-evaluator)
//!     ↓ canonicalizes through
//! Board State Domain (noughts-engine)
//!     ↓ produces
//! Fitness Score
//!     ↓ guides
//! Selection & Reproduction
//! ```
//!
//! # Genetic Algorithm Parameters
//!
//! - **Population size** - Number of individuals per generation
//! - **Initial gene count** - Random genes drawn per initial genome
//! - **Elite count** - Number of top individuals preserved unchanged
//! - **Crossover rate** - Probability of crossing a parent pair
//! - **Mutation rate** - Probability of mutating a child
//! - **Gene mutation rate** - Probability of re-drawing each gene of a mutated child
//!
//! See the [`genetic`] module for the algorithm and [`operators`] for the selection,
//! crossover and mutation operators.

pub mod genetic;
pub mod operators;
