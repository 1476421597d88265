//! Genetic algorithm implementation for evolving policy genomes.
//!
//! This module implements a genetic algorithm (GA) that evolves populations of
//! [`Genome`]s to maximize the fitness computed by a
//! [`GenomeEvaluator`].
//!
//! # Algorithm Overview
//!
//! The genetic algorithm follows this cycle:
//!
//! 1. **Evaluate Fitness** - Each genome is played through the full game tree and scored
//! 2. **Elite Selection** - Top performers are carried over unchanged
//! 3. **Parent Selection** - Pairs of parents are drawn by tournament or roulette
//! 4. **Crossover** - With probability `crossover_rate`, parents exchange genes
//! 5. **Mutation** - With probability `mutation_rate`, a child re-draws some actions
//!
//! # Key Components
//!
//! - [`Individual`] - A genome and its fitness score
//! - [`PopulationBuilder`] - Creates the initial population against a bound domain
//! - [`Population`] - Individuals plus the board state domain they are keyed by
//! - [`PopulationEvolver`] - Controls evolution parameters (selection, crossover, mutation)
//! - [`HallOfFame`] - Best individuals seen over the whole run
//!
//! # Shared Domain
//!
//! Genes refer to boards by address, so every genome of a population must be keyed
//! by the same [`BoardStateDomain`]. The population owns that domain, lends it to the
//! evaluator for canonicalization and to the mutation operator for legality checks,
//! and hands it on to the next generation.
//!
//! # Example
//!
//! ```
//! use noughts_engine::BoardStateDomain;
//! use noughts_evaluator::policy_evaluator::{Margin, PolicyEvaluator};
//! use noughts_training::{
//!     genetic::{PopulationBuilder, PopulationEvolver},
//!     operators::{CrossoverKind, Selection},
//! };
//!
//! let mut rng = rand::rng();
//! let mut population = PopulationBuilder::new(10, 20)
//!     .domain(BoardStateDomain::new())
//!     .build(&mut rng)
//!     .unwrap();
//!
//! let evaluator = PolicyEvaluator::new(Margin);
//! let evolver = PopulationEvolver {
//!     elite_count: 1,
//!     selection: Selection::Tournament { size: 2 },
//!     crossover: CrossoverKind::TwoPoint,
//!     crossover_rate: 0.5,
//!     mutation_rate: 0.1,
//!     gene_mutation_rate: 0.05,
//! };
//!
//! for _generation in 0..3 {
//!     population.evaluate_fitness(&evaluator, &mut rng).unwrap();
//!     population = evolver.evolve(population, &mut rng).unwrap();
//! }
//! population.evaluate_fitness(&evaluator, &mut rng).unwrap();
//! assert!(population.best_individual().is_some());
//! ```
//!
//! # Current Limitations
//!
//! - **Sequential evaluation**: Every evaluation may register new boards, so the domain
//!   is borrowed mutably and individuals are evaluated one after another
//! - **No automatic parameter adaptation**: Rates are fixed for the whole run
//! - **Single-objective only**: Fitness is a single scalar

use std::mem;

use noughts_engine::BoardStateDomain;
use noughts_evaluator::{PolicyError, policy::Genome, policy_evaluator::GenomeEvaluator};
use noughts_stats::descriptive::DescriptiveStats;
use rand::{Rng, RngCore};

use crate::operators::{self, CrossoverKind, Selection};

/// A single individual in the genetic algorithm population.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    fitness: f32,
}

impl Individual {
    /// Creates an individual that has not been evaluated yet.
    ///
    /// Its fitness is `f32::MIN` until the population is evaluated.
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self::with_fitness(genome, f32::MIN)
    }

    #[must_use]
    pub fn with_fitness(genome: Genome, fitness: f32) -> Self {
        Self { genome, fitness }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Returns the fitness score for this individual (higher is better).
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Error returned by [`PopulationBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BuildPopulationError {
    #[display("board state domain is not initialized")]
    NotInitialized,
}

/// Creates the initial population.
///
/// The domain must be bound explicitly with [`domain`](Self::domain). It may be a
/// fresh domain or one reloaded from an earlier run, in which case its addresses are
/// preserved.
#[derive(Debug, Clone)]
pub struct PopulationBuilder {
    size: usize,
    initial_gene_count: usize,
    domain: Option<BoardStateDomain>,
}

impl PopulationBuilder {
    /// # Arguments
    ///
    /// * `size` - Number of individuals in the population
    /// * `initial_gene_count` - Number of random genes drawn per genome
    #[must_use]
    pub fn new(size: usize, initial_gene_count: usize) -> Self {
        Self {
            size,
            initial_gene_count,
            domain: None,
        }
    }

    #[must_use]
    pub fn domain(mut self, domain: BoardStateDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Builds `size` individuals with random genomes.
    pub fn build<R>(self, rng: &mut R) -> Result<Population, BuildPopulationError>
    where
        R: Rng + ?Sized,
    {
        let Some(mut domain) = self.domain else {
            return Err(BuildPopulationError::NotInitialized);
        };
        let individuals = (0..self.size)
            .map(|_| Individual::new(Genome::random(self.initial_gene_count, &mut domain, rng)))
            .collect();
        log::debug!(
            "built population of {} ({} boards known)",
            self.size,
            domain.known_state_count()
        );
        Ok(Population {
            domain,
            individuals,
        })
    }
}

/// A population of individuals sharing one board state domain.
#[derive(Debug, Clone)]
pub struct Population {
    domain: BoardStateDomain,
    individuals: Vec<Individual>,
}

impl Population {
    /// Returns all individuals in this population.
    ///
    /// After [`evaluate_fitness`](Self::evaluate_fitness) they are sorted best first.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn domain(&self) -> &BoardStateDomain {
        &self.domain
    }

    #[must_use]
    pub fn best_individual(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Ends the run, keeping only the domain the genomes were keyed by.
    #[must_use]
    pub fn into_domain(self) -> BoardStateDomain {
        self.domain
    }

    /// Evaluates every individual and sorts them by fitness, best first.
    ///
    /// Genomes are replaced by the extended genomes returned by the evaluator.
    pub fn evaluate_fitness<E, R>(&mut self, evaluator: &E, rng: &mut R) -> Result<(), PolicyError>
    where
        E: GenomeEvaluator + ?Sized,
        R: RngCore,
    {
        let mut synthesized = 0;
        for ind in &mut self.individuals {
            let genome = mem::take(&mut ind.genome);
            let evaluation = evaluator.evaluate(genome, &mut self.domain, &mut *rng)?;
            ind.genome = evaluation.genome;
            ind.fitness = evaluation.fitness;
            synthesized += evaluation.synthesized;
        }
        log::debug!(
            "evaluated {} individuals, {synthesized} genes synthesized ({} boards known)",
            self.individuals.len(),
            self.domain.known_state_count()
        );

        // sort by fitness descending
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(())
    }

    /// Computes descriptive statistics for fitness across all individuals.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }

    /// Computes descriptive statistics for the number of genes per genome.
    #[must_use]
    pub fn compute_genome_size_stats(&self) -> Option<DescriptiveStats> {
        #[expect(clippy::cast_precision_loss)]
        let sizes = self.individuals.iter().map(|ind| ind.genome.len() as f32);
        DescriptiveStats::new(sizes)
    }
}

/// Controls genetic algorithm evolution parameters.
///
/// Rates are probabilities and must lie in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Parent selection strategy
    pub selection: Selection,
    /// Crossover operator applied to parent pairs
    pub crossover: CrossoverKind,
    /// Probability of crossing a parent pair
    pub crossover_rate: f64,
    /// Probability of mutating a child
    pub mutation_rate: f64,
    /// Probability of mutating each gene of a mutated child
    pub gene_mutation_rate: f64,
}

impl PopulationEvolver {
    /// Evolves the population to create the next generation.
    ///
    /// 1. Preserves top `elite_count` individuals unchanged
    /// 2. Fills the rest with children of selected parent pairs, crossed with
    ///    probability `crossover_rate` and each mutated with probability
    ///    `mutation_rate`
    ///
    /// The population must be sorted by fitness, best first. The new population has
    /// the same size and takes over the domain.
    pub fn evolve<R>(&self, population: Population, rng: &mut R) -> Result<Population, PolicyError>
    where
        R: Rng + ?Sized,
    {
        let Population {
            domain,
            individuals,
        } = population;
        debug_assert!(individuals.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let size = individuals.len();
        let mut next_individuals = Vec::with_capacity(size);

        // elite selection
        let elite_count = self.elite_count.min(size);
        next_individuals.extend(individuals[..elite_count].iter().cloned());

        let mut mutated_genes = 0;
        while next_individuals.len() < size {
            let (Some(p1), Some(p2)) = (
                self.selection.select(&individuals, rng),
                self.selection.select(&individuals, rng),
            ) else {
                break;
            };

            let (c1, c2) = if rng.random_bool(self.crossover_rate) {
                operators::crossover(self.crossover, &p1.genome, &p2.genome, rng)
            } else {
                (p1.genome.clone(), p2.genome.clone())
            };
            for mut child in [c1, c2] {
                if next_individuals.len() == size {
                    break;
                }
                if rng.random_bool(self.mutation_rate) {
                    mutated_genes +=
                        operators::mutate(&mut child, self.gene_mutation_rate, &domain, rng)?;
                }
                next_individuals.push(Individual::new(child));
            }
        }
        log::debug!("evolved {size} individuals, {mutated_genes} genes mutated");

        Ok(Population {
            domain,
            individuals: next_individuals,
        })
    }
}

/// Best distinct individuals seen across generations, best first.
#[derive(Debug, Clone)]
pub struct HallOfFame {
    capacity: usize,
    members: Vec<Individual>,
}

impl HallOfFame {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: Vec::with_capacity(capacity),
        }
    }

    /// Offers every individual of an evaluated population.
    ///
    /// Individuals whose genome is already a member are skipped.
    pub fn update(&mut self, population: &Population) {
        for ind in population.individuals() {
            if self.members.iter().any(|m| m.genome == ind.genome) {
                continue;
            }
            let worst = self.members.last().map(Individual::fitness);
            if self.members.len() < self.capacity || worst.is_some_and(|w| ind.fitness > w) {
                let pos = self.members.partition_point(|m| m.fitness >= ind.fitness);
                self.members.insert(pos, ind.clone());
                self.members.truncate(self.capacity);
            }
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.members.first()
    }
}
