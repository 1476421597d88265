//! Policy evaluation: fitness of a genome against an exhaustive adversary.
//!
//! The policy always plays player 1. Player 2 is not a fixed opponent but every
//! possible opponent at once: after each policy move all legal replies are
//! explored, so a genome is scored over the complete game tree it induces.
//!
//! # How It Works
//!
//! A genome is played through two depth-first traversals over an explicit stack
//! (the *fringe*), one per [`Opening`]:
//!
//! 1. **Pop** a board from the fringe
//! 2. **Terminal** boards are tallied as a win, loss or draw for player 1
//! 3. **Live** boards are canonicalized, and the genome's action for the address is
//!    played as player 1 on the canonical board (a random legal action is
//!    synthesized and stored when the genome has no gene there)
//! 4. **Reply** - a terminal result is pushed back so it is tallied once, otherwise
//!    every player 2 reply to it is pushed
//!
//! Each traversal yields a [`Tally`], which a [`ScoringPolicy`] turns into a
//! score. The fitness is the sum of both scores.
//!
//! # Scoring Policies
//!
//! ```text
//! Margin:       score = wins - losses
//! NonLossRatio: score = (leaves - losses) / leaves
//! ```
//!
//! [`Margin`] rewards forcing wins as well as avoiding losses. [`NonLossRatio`]
//! only cares about not losing and is bounded to `[0, 1]` per traversal.
//!
//! # Usage
//!
//! ```
//! use noughts_engine::BoardStateDomain;
//! use noughts_evaluator::{
//!     policy::Genome,
//!     policy_evaluator::{GenomeEvaluator, NonLossRatio, PolicyEvaluator},
//! };
//!
//! let mut rng = rand::rng();
//! let mut domain = BoardStateDomain::new();
//!
//! let evaluator = PolicyEvaluator::new(NonLossRatio);
//! let evaluation = evaluator.evaluate(Genome::new(), &mut domain, &mut rng).unwrap();
//!
//! // every board the policy had to move on now has a gene
//! assert_eq!(evaluation.genome.len(), evaluation.synthesized);
//! assert!((0.0..=2.0).contains(&evaluation.fitness));
//! ```

use std::fmt;

use noughts_engine::{BoardState, BoardStateDomain, Player};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    PolicyError,
    policy::{Genome, PolicyGene},
};

/// Which player moves first in a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Opening {
    #[display("policy first")]
    PolicyFirst,
    #[display("opponent first")]
    OpponentFirst,
}

impl Opening {
    pub const ALL: [Self; 2] = [Self::PolicyFirst, Self::OpponentFirst];

    /// Boards the traversal starts from.
    #[must_use]
    pub fn initial_fringe(self) -> Vec<BoardState> {
        match self {
            Self::PolicyFirst => vec![BoardState::empty()],
            Self::OpponentFirst => BoardState::empty().successors(Player::Two).collect(),
        }
    }
}

/// Outcomes of the terminal leaves of one traversal, from player 1's view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Tally {
    #[must_use]
    pub fn leaves(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Counts a terminal board.
    pub fn record(&mut self, state: &BoardState) {
        debug_assert!(state.is_final());
        match state.winner() {
            Some(Player::One) => self.wins += 1,
            Some(Player::Two) => self.losses += 1,
            None => self.draws += 1,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wins, {} losses, {} draws",
            self.wins, self.losses, self.draws
        )
    }
}

/// Turns the tally of one traversal into a score (higher is better).
pub trait ScoringPolicy: fmt::Debug + Send + Sync {
    fn score(&self, tally: &Tally) -> f32;
}

/// `wins - losses`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Margin;

impl ScoringPolicy for Margin {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, tally: &Tally) -> f32 {
        tally.wins as f32 - tally.losses as f32
    }
}

/// Share of leaves that are not losses; `0.0` for a traversal without leaves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonLossRatio;

impl ScoringPolicy for NonLossRatio {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, tally: &Tally) -> f32 {
        let leaves = tally.leaves();
        if leaves == 0 {
            return 0.0;
        }
        (leaves - tally.losses) as f32 / leaves as f32
    }
}

/// Result of evaluating a genome.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The evaluated genome, extended with every synthesized gene.
    pub genome: Genome,
    pub fitness: f32,
    pub policy_first: Tally,
    pub opponent_first: Tally,
    /// Number of genes added during the evaluation.
    pub synthesized: usize,
}

/// Computes the fitness of a genome.
///
/// The genome is taken by value and handed back in the [`Evaluation`], since
/// evaluation may extend it.
pub trait GenomeEvaluator: fmt::Debug + Send + Sync {
    fn evaluate(
        &self,
        genome: Genome,
        domain: &mut BoardStateDomain,
        rng: &mut dyn RngCore,
    ) -> Result<Evaluation, PolicyError>;
}

/// Evaluates a genome with both openings and sums the scores of `S`.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator<S> {
    scoring: S,
}

impl<S> PolicyEvaluator<S> {
    pub const fn new(scoring: S) -> Self {
        Self { scoring }
    }
}

impl<S> GenomeEvaluator for PolicyEvaluator<S>
where
    S: ScoringPolicy,
{
    fn evaluate(
        &self,
        mut genome: Genome,
        domain: &mut BoardStateDomain,
        rng: &mut dyn RngCore,
    ) -> Result<Evaluation, PolicyError> {
        let (policy_first, synthesized_first) =
            traverse(&mut genome, domain, Opening::PolicyFirst, rng)?;
        let (opponent_first, synthesized_second) =
            traverse(&mut genome, domain, Opening::OpponentFirst, rng)?;
        let fitness = self.scoring.score(&policy_first) + self.scoring.score(&opponent_first);
        Ok(Evaluation {
            genome,
            fitness,
            policy_first,
            opponent_first,
            synthesized: synthesized_first + synthesized_second,
        })
    }
}

/// Plays `genome` against every player 2 reply starting from `opening`.
///
/// Returns the tally and the number of genes synthesized into `genome`.
pub fn traverse<R>(
    genome: &mut Genome,
    domain: &mut BoardStateDomain,
    opening: Opening,
    rng: &mut R,
) -> Result<(Tally, usize), PolicyError>
where
    R: Rng + ?Sized,
{
    let mut tally = Tally::default();
    let mut synthesized = 0;
    let mut fringe = opening.initial_fringe();

    while let Some(state) = fringe.pop() {
        if state.is_final() {
            tally.record(&state);
            continue;
        }

        let (address, canonical) = domain.canonicalize(&state);
        let action = match genome.get(address) {
            Some(gene) => gene.action(),
            None => {
                let gene = PolicyGene::random_for(address, canonical, rng)?;
                genome.insert(gene);
                synthesized += 1;
                gene.action()
            }
        };
        let after = canonical.after_move(Player::One, action)?;
        if after.is_final() {
            fringe.push(after);
            continue;
        }

        let (_, canonical) = domain.canonicalize(&after);
        fringe.extend(canonical.successors(Player::Two));
    }

    log::debug!("{opening}: {tally} ({synthesized} genes synthesized)");
    Ok((tally, synthesized))
}
