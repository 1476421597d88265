//! Policy genes and genomes.
//!
//! A [`PolicyGene`] says "when the board canonicalizes to this address, play this
//! cell". A [`Genome`] is a set of genes with at most one gene per address, and is
//! the individual evolved by the genetic algorithm.
//!
//! Actions are cell indices on the *canonical* board stored in the
//! [`BoardStateDomain`], so a gene is only meaningful together with the domain that
//! produced its address.

use std::{collections::BTreeMap, fmt};

use noughts_engine::{Address, BoardState, BoardStateDomain};
use rand::{
    Rng,
    seq::{IndexedRandom as _, IteratorRandom as _},
};
use serde::{Deserialize, Serialize};

use crate::PolicyError;

/// Highest rank at which random genes are generated; rank 9 boards are always full.
const MAX_RANDOM_RANK: u8 = 8;

/// A single state-action pair of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGene {
    address: Address,
    action: usize,
}

impl PolicyGene {
    /// Creates a gene after checking that `action` is legal on the board at `address`.
    pub fn new(
        address: Address,
        action: usize,
        domain: &BoardStateDomain,
    ) -> Result<Self, PolicyError> {
        let state = domain.address_to_state(address)?;
        check_action(state, action)?;
        Ok(Self { address, action })
    }

    /// Creates a gene for a random live board.
    ///
    /// A target rank is drawn uniformly from `0..=8` and reached by random
    /// alternating play from the empty board, player 1 first. Final boards are
    /// rejected and the walk is repeated. The surviving board is registered in
    /// `domain`, and the action is drawn uniformly from the legal moves of its
    /// canonical board.
    pub fn new_random<R>(domain: &mut BoardStateDomain, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        loop {
            let target_rank = rng.random_range(0..=MAX_RANDOM_RANK);
            let mut state = BoardState::empty();
            while state.rank() < target_rank {
                let Some(next) = state.successors(state.next_player()).choose(rng) else {
                    break;
                };
                state = next;
            }
            if state.is_final() {
                continue;
            }

            let (address, canonical) = domain.canonicalize(&state);
            if let Ok(gene) = Self::random_for(address, canonical, rng) {
                return gene;
            }
        }
    }

    /// Creates a gene with a uniformly random legal action on `state`, which must be
    /// the canonical board registered at `address`.
    pub fn random_for<R>(
        address: Address,
        state: &BoardState,
        rng: &mut R,
    ) -> Result<Self, PolicyError>
    where
        R: Rng + ?Sized,
    {
        if state.is_final() {
            return Err(PolicyError::FinalState { address });
        }
        let &action = state
            .legal_moves()
            .choose(rng)
            .ok_or(PolicyError::FinalState { address })?;
        Ok(Self { address, action })
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn action(&self) -> usize {
        self.action
    }

    /// Replaces the action, keeping it legal for this gene's board.
    pub fn set_action(
        &mut self,
        action: usize,
        domain: &BoardStateDomain,
    ) -> Result<(), PolicyError> {
        let state = domain.address_to_state(self.address)?;
        check_action(state, action)?;
        self.action = action;
        Ok(())
    }
}

fn check_action(state: &BoardState, action: usize) -> Result<(), PolicyError> {
    if state.legal_moves().contains(&action) {
        Ok(())
    } else {
        Err(noughts_engine::IllegalMoveError { cell: action }.into())
    }
}

impl fmt::Display for PolicyGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.action)
    }
}

/// A policy table: one gene per canonical address.
///
/// Genes are kept in address order. Serialized as a list of genes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<PolicyGene>", from = "Vec<PolicyGene>")]
pub struct Genome {
    genes: BTreeMap<Address, PolicyGene>,
}

impl Genome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a genome from `count` calls to [`PolicyGene::new_random`].
    ///
    /// Genes landing on the same address replace each other, so the genome may end
    /// up with fewer than `count` genes.
    pub fn random<R>(count: usize, domain: &mut BoardStateDomain, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        (0..count)
            .map(|_| PolicyGene::new_random(domain, rng))
            .collect()
    }

    /// Inserts `gene`, returning the gene it replaced at the same address.
    pub fn insert(&mut self, gene: PolicyGene) -> Option<PolicyGene> {
        self.genes.insert(gene.address, gene)
    }

    #[must_use]
    pub fn get(&self, address: Address) -> Option<&PolicyGene> {
        self.genes.get(&address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Iterates over genes in address order.
    pub fn genes(&self) -> impl ExactSizeIterator<Item = &PolicyGene> + '_ {
        self.genes.values()
    }

    /// Iterates mutably over genes in address order.
    ///
    /// Only the action of a gene can be changed, so the address keys stay valid.
    pub fn genes_mut(&mut self) -> impl ExactSizeIterator<Item = &mut PolicyGene> + '_ {
        self.genes.values_mut()
    }

    pub fn addresses(&self) -> impl ExactSizeIterator<Item = Address> + '_ {
        self.genes.keys().copied()
    }

    /// Checks every gene against `domain`.
    pub fn validate(&self, domain: &BoardStateDomain) -> Result<(), PolicyError> {
        for gene in self.genes() {
            let state = domain.address_to_state(gene.address)?;
            check_action(state, gene.action)?;
        }
        Ok(())
    }
}

/// Later genes replace earlier genes with the same address.
impl FromIterator<PolicyGene> for Genome {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = PolicyGene>,
    {
        let mut genome = Self::new();
        genome.extend(iter);
        genome
    }
}

impl Extend<PolicyGene> for Genome {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = PolicyGene>,
    {
        for gene in iter {
            self.insert(gene);
        }
    }
}

impl From<Vec<PolicyGene>> for Genome {
    fn from(genes: Vec<PolicyGene>) -> Self {
        genes.into_iter().collect()
    }
}

impl From<Genome> for Vec<PolicyGene> {
    fn from(genome: Genome) -> Self {
        genome.genes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(2048)
    }

    fn board(codes: [u8; 9]) -> BoardState {
        BoardState::try_from(codes).unwrap()
    }

    #[test]
    fn test_display() {
        let mut domain = BoardStateDomain::new();
        domain.state_to_address(&board([1, 0, 0, 2, 0, 0, 0, 0, 0]));
        let address = domain.state_to_address(&board([1, 0, 0, 0, 2, 0, 0, 0, 0]));
        let gene = PolicyGene::new(address, 2, &domain).unwrap();
        assert_eq!(gene.to_string(), "(2, 1): 2");
    }

    #[test]
    fn test_new_checks_action() {
        let mut domain = BoardStateDomain::new();
        let address = domain.state_to_address(&board([1, 0, 0, 2, 0, 0, 0, 0, 0]));
        assert!(PolicyGene::new(address, 4, &domain).is_ok());
        assert_eq!(
            PolicyGene::new(address, 0, &domain).unwrap_err(),
            PolicyError::IllegalMove(noughts_engine::IllegalMoveError { cell: 0 })
        );
        let unknown = Address::new(5, 0);
        assert_eq!(
            PolicyGene::new(unknown, 0, &domain).unwrap_err(),
            PolicyError::UnknownAddress(noughts_engine::UnknownAddressError { address: unknown })
        );
    }

    #[test]
    fn test_random_genes_reference_live_boards() {
        let mut domain = BoardStateDomain::new();
        let mut rng = rng();
        for _ in 0..100 {
            let gene = PolicyGene::new_random(&mut domain, &mut rng);
            let state = domain.address_to_state(gene.address()).unwrap();
            assert!(!state.is_final(), "{state}");
            assert!(state.rank() <= MAX_RANDOM_RANK);
            assert!(state.legal_moves().contains(&gene.action()));
            assert!(state.after_move(state.next_player(), gene.action()).is_ok());
        }
    }

    #[test]
    fn test_random_for_rejects_final_board() {
        let mut domain = BoardStateDomain::new();
        let (address, state) = domain.canonicalize(&board([1, 1, 1, 2, 2, 0, 0, 0, 0]));
        assert_eq!(
            PolicyGene::random_for(address, state, &mut rng()).unwrap_err(),
            PolicyError::FinalState { address }
        );
    }

    #[test]
    fn test_set_action() {
        let mut domain = BoardStateDomain::new();
        let mut rng = rng();
        let mut gene = PolicyGene::new_random(&mut domain, &mut rng);
        let state = domain.address_to_state(gene.address()).unwrap().clone();
        for &action in state.legal_moves() {
            gene.set_action(action, &domain).unwrap();
            assert_eq!(gene.action(), action);
        }
        let occupied = (0..9).find(|cell| !state.legal_moves().contains(cell));
        if let Some(occupied) = occupied {
            let before = gene.action();
            assert!(gene.set_action(occupied, &domain).is_err());
            assert_eq!(gene.action(), before);
        }
    }

    #[test]
    fn test_random_genome_matches_domain() {
        let mut domain = BoardStateDomain::new();
        let genome = Genome::random(20, &mut domain, &mut rng());
        assert!(!genome.is_empty());
        assert!(genome.len() <= 20);
        assert_eq!(genome.len(), domain.known_state_count());
        genome.validate(&domain).unwrap();
    }

    #[test]
    fn test_later_genes_replace_earlier() {
        let mut domain = BoardStateDomain::new();
        let address = domain.state_to_address(&BoardState::empty());
        let genome: Genome = [
            PolicyGene::new(address, 0, &domain).unwrap(),
            PolicyGene::new(address, 4, &domain).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(genome.len(), 1);
        assert_eq!(genome.get(address).map(PolicyGene::action), Some(4));
    }

    #[test]
    fn test_genes_are_in_address_order() {
        let mut domain = BoardStateDomain::new();
        let genome = Genome::random(50, &mut domain, &mut rng());
        let addresses: Vec<Address> = genome.addresses().collect();
        assert!(addresses.is_sorted());
        assert!(genome.genes().map(PolicyGene::address).eq(addresses));
    }

    #[test]
    fn test_validate_detects_foreign_domain() {
        let mut domain = BoardStateDomain::new();
        let genome = Genome::random(20, &mut domain, &mut rng());
        assert!(genome.validate(&BoardStateDomain::new()).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut domain = BoardStateDomain::new();
        let genome = Genome::random(10, &mut domain, &mut rng());
        let json = serde_json::to_string(&genome).unwrap();
        let back: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, genome);
    }

    proptest! {
        #[test]
        fn random_genomes_are_valid(seed in any::<u64>(), count in 0_usize..40) {
            let mut domain = BoardStateDomain::new();
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let genome = Genome::random(count, &mut domain, &mut rng);
            prop_assert!(genome.len() <= count);
            prop_assert_eq!(genome.len(), domain.known_state_count());
            prop_assert!(genome.validate(&domain).is_ok());
            for gene in genome.genes() {
                prop_assert!(!domain.address_to_state(gene.address()).unwrap().is_final());
            }
        }
    }
}
