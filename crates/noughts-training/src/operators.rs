//! Genetic operators on policy genomes.
//!
//! This module provides the selection, crossover and mutation operators used by
//! [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver).
//!
//! # Operations
//!
//! - **Selection**: [`Selection`] picks parents by tournament or fitness-proportionate
//!   roulette
//! - **Crossover**: [`crossover`] exchanges genes between two genomes
//! - **Mutation**: [`mutate`] re-draws the action of randomly chosen genes
//!
//! # Mapping Crossover
//!
//! Genomes are sparse maps, so two parents usually have different lengths and cover
//! different addresses. Crossover views each parent as its gene list in address order
//! and exchanges list positions, the way list crossovers do:
//!
//! ```text
//! parent 1: a1 a2 | a3
//! parent 2: b1 b2 | b3 b4 b5
//!
//! child 1:  a1 a2 | b3 b4 b5
//! child 2:  b1 b2 | a3
//! ```
//!
//! The children are rebuilt as maps from their gene lists. When a child ends up with
//! two genes for the same address, the gene that comes later in its list wins.
//!
//! Cut points are drawn within the shorter parent, so the tail of the longer parent
//! moves along with the exchanged segment for one-point crossover and stays in place
//! for two-point and uniform crossover.

use noughts_engine::BoardStateDomain;
use noughts_evaluator::{PolicyError, policy::Genome};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::genetic::Individual;

/// Probability of exchanging each position in uniform crossover.
const UNIFORM_SWAP_PROBABILITY: f64 = 0.5;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Best of `size` individuals drawn without replacement.
    Tournament { size: usize },
    /// Fitness-proportionate selection.
    ///
    /// Fitness values are shifted so the worst individual has weight zero. When every
    /// individual has the same fitness the draw is uniform.
    Roulette,
}

impl Selection {
    /// Selects one individual, or `None` when `individuals` is empty.
    ///
    /// Tournament selection with `size == 0` behaves like `size == 1`.
    pub fn select<'a, R>(
        &self,
        individuals: &'a [Individual],
        rng: &mut R,
    ) -> Option<&'a Individual>
    where
        R: Rng + ?Sized,
    {
        match *self {
            Self::Tournament { size } => individuals
                .choose_multiple(rng, size.max(1))
                .max_by(|a, b| a.fitness().total_cmp(&b.fitness())),
            Self::Roulette => {
                let worst = individuals
                    .iter()
                    .map(Individual::fitness)
                    .min_by(f32::total_cmp)?;
                individuals
                    .choose_weighted(rng, |ind| ind.fitness() - worst)
                    .ok()
                    .or_else(|| individuals.choose(rng))
            }
        }
    }
}

/// Crossover operator.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum CrossoverKind {
    OnePoint,
    #[default]
    TwoPoint,
    Uniform,
}

/// Crosses two genomes, returning two children.
///
/// Parents that are too short for the operator are returned unchanged: one-point and
/// two-point crossover need both parents to have at least two genes.
pub fn crossover<R>(kind: CrossoverKind, p1: &Genome, p2: &Genome, rng: &mut R) -> (Genome, Genome)
where
    R: Rng + ?Sized,
{
    let size = usize::min(p1.len(), p2.len());
    match kind {
        CrossoverKind::OnePoint => {
            if size < 2 {
                return (p1.clone(), p2.clone());
            }
            let cut = rng.random_range(1..size);
            exchange(p1, p2, |i| i >= cut)
        }
        CrossoverKind::TwoPoint => {
            if size < 2 {
                return (p1.clone(), p2.clone());
            }
            let start = rng.random_range(1..=size);
            let mut end = rng.random_range(1..size);
            let (start, end) = if end >= start {
                end += 1;
                (start, end)
            } else {
                (end, start)
            };
            exchange(p1, p2, |i| (start..end).contains(&i))
        }
        CrossoverKind::Uniform => {
            let swapped = (0..size)
                .filter(|_| rng.random_bool(UNIFORM_SWAP_PROBABILITY))
                .collect::<Vec<_>>();
            exchange(p1, p2, |i| swapped.binary_search(&i).is_ok())
        }
    }
}

/// Builds two children, giving child 1 the gene of parent 2 at every swapped
/// position and vice versa.
fn exchange<F>(p1: &Genome, p2: &Genome, swapped: F) -> (Genome, Genome)
where
    F: Fn(usize) -> bool,
{
    let genes1 = p1.genes().copied().collect::<Vec<_>>();
    let genes2 = p2.genes().copied().collect::<Vec<_>>();
    let len = usize::max(genes1.len(), genes2.len());

    let mut child1 = Vec::with_capacity(len);
    let mut child2 = Vec::with_capacity(len);
    for i in 0..len {
        let (own1, own2) = (genes1.get(i).copied(), genes2.get(i).copied());
        let (to1, to2) = if swapped(i) {
            (own2, own1)
        } else {
            (own1, own2)
        };
        child1.extend(to1);
        child2.extend(to2);
    }
    (child1.into_iter().collect(), child2.into_iter().collect())
}

/// Change-action mutation.
///
/// Each gene is picked with probability `gene_rate` and given a uniformly random
/// legal action of its board (possibly the same action). Returns the number of
/// picked genes.
pub fn mutate<R>(
    genome: &mut Genome,
    gene_rate: f64,
    domain: &BoardStateDomain,
    rng: &mut R,
) -> Result<usize, PolicyError>
where
    R: Rng + ?Sized,
{
    let mut mutated = 0;
    for gene in genome.genes_mut() {
        if !rng.random_bool(gene_rate) {
            continue;
        }
        let state = domain.address_to_state(gene.address())?;
        let &action = state
            .legal_moves()
            .choose(rng)
            .ok_or(PolicyError::FinalState {
                address: gene.address(),
            })?;
        gene.set_action(action, domain)?;
        mutated += 1;
    }
    Ok(mutated)
}

#[cfg(test)]
mod tests {
    use noughts_engine::{Address, BoardState};
    use noughts_evaluator::policy::PolicyGene;
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    /// Domain holding the empty board and all of its successors, so that addresses
    /// `(0, 0)`, `(1, 0)`, `(1, 1)` and `(1, 2)` exist.
    fn small_domain() -> BoardStateDomain {
        let mut domain = BoardStateDomain::new();
        let empty = BoardState::empty();
        domain.state_to_address(&empty);
        for state in empty.successors(empty.next_player()) {
            domain.state_to_address(&state);
        }
        domain
    }

    fn gene(domain: &BoardStateDomain, rank: u8, index: usize, action: usize) -> PolicyGene {
        PolicyGene::new(Address::new(rank, index), action, domain).unwrap()
    }

    fn actions(genome: &Genome) -> Vec<(Address, usize)> {
        genome.genes().map(|g| (g.address(), g.action())).collect()
    }

    fn individual(fitness: f32) -> Individual {
        Individual::with_fitness(Genome::new(), fitness)
    }

    #[test]
    fn test_exchange_later_gene_wins() {
        let domain = small_domain();
        // address order (0,0) < (1,0) < (1,1) < (1,2)
        let p1: Genome = [gene(&domain, 0, 0, 0), gene(&domain, 1, 0, 1)]
            .into_iter()
            .collect();
        let p2: Genome = [
            gene(&domain, 1, 0, 8),
            gene(&domain, 1, 1, 8),
            gene(&domain, 1, 2, 8),
        ]
        .into_iter()
        .collect();

        // cut at 1: child1 = [(0,0):0, (1,1):8, (1,2):8], child2 = [(1,0):8, (1,0):1]
        let (c1, c2) = exchange(&p1, &p2, |i| i >= 1);
        assert_eq!(
            actions(&c1),
            [
                (Address::new(0, 0), 0),
                (Address::new(1, 1), 8),
                (Address::new(1, 2), 8),
            ]
        );
        assert_eq!(actions(&c2), [(Address::new(1, 0), 1)]);
    }

    #[test]
    fn test_short_parents_are_copied() {
        let domain = small_domain();
        let p1: Genome = [gene(&domain, 0, 0, 4)].into_iter().collect();
        let p2: Genome = [gene(&domain, 1, 0, 1), gene(&domain, 1, 1, 2)]
            .into_iter()
            .collect();
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        for kind in [CrossoverKind::OnePoint, CrossoverKind::TwoPoint] {
            let (c1, c2) = crossover(kind, &p1, &p2, &mut rng);
            assert_eq!(c1, p1);
            assert_eq!(c2, p2);
        }
        let (c1, c2) = crossover(CrossoverKind::Uniform, &Genome::new(), &p2, &mut rng);
        assert!(c1.is_empty());
        assert_eq!(c2, p2);
    }

    #[test]
    fn test_crossover_kind_from_str() {
        assert_eq!(
            "onepoint".parse::<CrossoverKind>().unwrap(),
            CrossoverKind::OnePoint
        );
        assert_eq!(
            "TwoPoint".parse::<CrossoverKind>().unwrap(),
            CrossoverKind::TwoPoint
        );
        assert_eq!(
            "uniform".parse::<CrossoverKind>().unwrap(),
            CrossoverKind::Uniform
        );
        assert!("blx".parse::<CrossoverKind>().is_err());
    }

    #[test]
    fn test_mutate_keeps_actions_legal() {
        let mut domain = BoardStateDomain::new();
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let mut genome = Genome::random(40, &mut domain, &mut rng);
        let addresses = genome.addresses().collect::<Vec<_>>();

        let mutated = mutate(&mut genome, 1.0, &domain, &mut rng).unwrap();
        assert_eq!(mutated, genome.len());
        assert_eq!(genome.addresses().collect::<Vec<_>>(), addresses);
        genome.validate(&domain).unwrap();

        let before = genome.clone();
        assert_eq!(mutate(&mut genome, 0.0, &domain, &mut rng).unwrap(), 0);
        assert_eq!(genome, before);
    }

    #[test]
    fn test_mutate_rejects_unknown_address() {
        let domain = small_domain();
        let mut genome: Genome = [gene(&domain, 1, 2, 0)].into_iter().collect();
        let result = mutate(&mut genome, 1.0, &BoardStateDomain::new(), &mut rand::rng());
        assert!(matches!(result, Err(PolicyError::UnknownAddress(_))));
    }

    #[test]
    fn test_tournament_picks_best_of_all() {
        let individuals = [individual(1.0), individual(5.0), individual(3.0)];
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let selection = Selection::Tournament { size: 3 };
        for _ in 0..20 {
            let selected = selection.select(&individuals, &mut rng).unwrap();
            assert!((selected.fitness() - 5.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_roulette_never_picks_worst() {
        let individuals = [individual(-2.0), individual(0.0), individual(6.0)];
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        for _ in 0..100 {
            let selected = Selection::Roulette.select(&individuals, &mut rng).unwrap();
            assert!(selected.fitness() > -2.0);
        }
    }

    #[test]
    fn test_roulette_uniform_on_equal_fitness() {
        let individuals = [individual(1.0), individual(1.0)];
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        assert!(Selection::Roulette.select(&individuals, &mut rng).is_some());
    }

    #[test]
    fn test_select_from_empty() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert!(Selection::Roulette.select(&[], &mut rng).is_none());
        let tournament = Selection::Tournament { size: 2 };
        assert!(tournament.select(&[], &mut rng).is_none());
    }

    fn kind_strategy() -> impl Strategy<Value = CrossoverKind> {
        prop_oneof![
            Just(CrossoverKind::OnePoint),
            Just(CrossoverKind::TwoPoint),
            Just(CrossoverKind::Uniform),
        ]
    }

    proptest! {
        #[test]
        fn crossover_children_come_from_parents(
            seed in any::<u64>(),
            n1 in 0_usize..30,
            n2 in 0_usize..30,
            kind in kind_strategy(),
        ) {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let mut domain = BoardStateDomain::new();
            let p1 = Genome::random(n1, &mut domain, &mut rng);
            let p2 = Genome::random(n2, &mut domain, &mut rng);

            let (c1, c2) = crossover(kind, &p1, &p2, &mut rng);
            prop_assert!(c1.len() + c2.len() <= p1.len() + p2.len());
            for gene in c1.genes().chain(c2.genes()) {
                prop_assert!(
                    p1.get(gene.address()) == Some(gene) || p2.get(gene.address()) == Some(gene)
                );
            }
            c1.validate(&domain).unwrap();
            c2.validate(&domain).unwrap();
        }
    }
}
