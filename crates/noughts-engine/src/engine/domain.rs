use serde::{Deserialize, Serialize};

use crate::{
    DomainLoadError, UnknownAddressError,
    core::{BoardState, RANK_COUNT},
};

/// Stable identifier of a class of equivalent boards within a [`BoardStateDomain`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({rank}, {index})")]
pub struct Address {
    pub rank: u8,
    pub index: usize,
}

impl Address {
    #[must_use]
    pub const fn new(rank: u8, index: usize) -> Self {
        Self { rank, index }
    }
}

/// Registry of every canonical board discovered so far.
///
/// Each rank owns a bucket of mutually non-equivalent boards; a board's position in
/// its bucket is its address index. The domain only ever grows.
///
/// Serialized as one list of boards per rank, so a dumped domain reloads with the
/// same addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<BoardState>>", try_from = "Vec<Vec<BoardState>>")]
pub struct BoardStateDomain {
    ranks: [Vec<BoardState>; RANK_COUNT],
}

impl BoardStateDomain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the address of `state`, registering it as a new canonical board when
    /// no equivalent board is known yet.
    ///
    /// The lookup is a linear scan of the rank bucket.
    pub fn state_to_address(&mut self, state: &BoardState) -> Address {
        if let Some(address) = self.find_address(state) {
            return address;
        }
        let rank = state.rank();
        let bucket = &mut self.ranks[usize::from(rank)];
        bucket.push(state.clone());
        let address = Address::new(rank, bucket.len() - 1);
        log::trace!("registered canonical board {state} at {address}");
        address
    }

    /// Registers `state` like [`state_to_address`](Self::state_to_address) and also
    /// returns the canonical board of its class.
    ///
    /// The canonical board may be a rotated or reflected variant of `state`.
    pub fn canonicalize(&mut self, state: &BoardState) -> (Address, &BoardState) {
        let address = self.state_to_address(state);
        (
            address,
            &self.ranks[usize::from(address.rank)][address.index],
        )
    }

    /// Returns the address of `state` without registering it.
    #[must_use]
    pub fn find_address(&self, state: &BoardState) -> Option<Address> {
        let rank = state.rank();
        self.ranks[usize::from(rank)]
            .iter()
            .position(|known| known == state)
            .map(|index| Address::new(rank, index))
    }

    /// Returns the canonical board registered at `address`.
    pub fn address_to_state(&self, address: Address) -> Result<&BoardState, UnknownAddressError> {
        self.ranks
            .get(usize::from(address.rank))
            .and_then(|bucket| bucket.get(address.index))
            .ok_or(UnknownAddressError { address })
    }

    /// Total number of canonical boards across all ranks.
    #[must_use]
    pub fn known_state_count(&self) -> usize {
        self.ranks.iter().map(Vec::len).sum()
    }

    /// Number of canonical boards of the given rank.
    #[must_use]
    pub fn rank_len(&self, rank: u8) -> usize {
        self.ranks.get(usize::from(rank)).map_or(0, Vec::len)
    }

    /// Iterates over all canonical boards in address order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, &BoardState)> + '_ {
        self.ranks.iter().enumerate().flat_map(|(rank, bucket)| {
            #[expect(clippy::cast_possible_truncation)]
            let rank = rank as u8;
            bucket
                .iter()
                .enumerate()
                .map(move |(index, state)| (Address::new(rank, index), state))
        })
    }

    /// Registers every board reachable from the empty board.
    ///
    /// Players alternate with player 1 moving first, and play stops at final boards.
    /// Subtrees of boards whose class is already known are skipped, since equivalent
    /// boards have equivalent successors.
    ///
    /// Returns the number of newly registered boards.
    pub fn register_reachable(&mut self) -> usize {
        let initial_count = self.known_state_count();
        let mut visited = Self::new();
        let mut fringe = vec![BoardState::empty()];
        while let Some(state) = fringe.pop() {
            let before = visited.known_state_count();
            visited.state_to_address(&state);
            if visited.known_state_count() == before {
                continue;
            }
            self.state_to_address(&state);
            if state.is_final() {
                continue;
            }
            fringe.extend(state.successors(state.next_player()));
        }
        let registered = self.known_state_count() - initial_count;
        log::debug!(
            "registered {registered} reachable boards ({} known)",
            self.known_state_count()
        );
        registered
    }
}

impl From<BoardStateDomain> for Vec<Vec<BoardState>> {
    fn from(domain: BoardStateDomain) -> Self {
        let mut ranks = Vec::from(domain.ranks);
        while ranks.last().is_some_and(Vec::is_empty) {
            ranks.pop();
        }
        ranks
    }
}

impl TryFrom<Vec<Vec<BoardState>>> for BoardStateDomain {
    type Error = DomainLoadError;

    fn try_from(buckets: Vec<Vec<BoardState>>) -> Result<Self, Self::Error> {
        if buckets.len() > RANK_COUNT {
            return Err(DomainLoadError::TooManyRanks {
                count: buckets.len(),
            });
        }
        let mut domain = Self::new();
        for (rank, bucket) in buckets.into_iter().enumerate() {
            #[expect(clippy::cast_possible_truncation)]
            let rank = rank as u8;
            for (index, state) in bucket.into_iter().enumerate() {
                let address = Address::new(rank, index);
                if state.rank() != rank {
                    return Err(DomainLoadError::RankMismatch {
                        address,
                        actual: state.rank(),
                    });
                }
                if domain.state_to_address(&state) != address {
                    return Err(DomainLoadError::DuplicateClass { address });
                }
            }
        }
        Ok(domain)
    }
}
