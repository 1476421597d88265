use std::path::PathBuf;

use noughts_engine::{BoardStateDomain, RANK_COUNT};
use noughts_evaluator::policy_evaluator::Tally;
use serde::Serialize;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EnumerateArg {
    /// Also write the enumerated board state domain to this file
    #[arg(long)]
    domain_output: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct EnumerationReport {
    canonical_boards: usize,
    boards_per_rank: [usize; RANK_COUNT],
    final_boards: usize,
    /// Outcomes of the final boards, from player 1's view.
    outcomes: Tally,
}

impl EnumerationReport {
    fn new(domain: &BoardStateDomain) -> Self {
        let mut boards_per_rank = [0; RANK_COUNT];
        let mut final_boards = 0;
        let mut outcomes = Tally::default();
        for (address, state) in domain.iter() {
            boards_per_rank[usize::from(address.rank)] += 1;
            if state.is_final() {
                final_boards += 1;
                outcomes.record(state);
            }
        }
        Self {
            canonical_boards: domain.known_state_count(),
            boards_per_rank,
            final_boards,
            outcomes,
        }
    }
}

pub(crate) fn run(arg: &EnumerateArg) -> anyhow::Result<()> {
    let EnumerateArg {
        domain_output,
        output,
    } = arg;

    let mut domain = BoardStateDomain::new();
    domain.register_reachable();
    let report = EnumerationReport::new(&domain);

    log::info!("Canonical boards: {}", report.canonical_boards);
    for (rank, count) in report.boards_per_rank.iter().enumerate() {
        log::info!("  Rank {rank}: {count}");
    }
    log::info!(
        "Final boards: {} ({})",
        report.final_boards,
        report.outcomes
    );

    if let Some(path) = domain_output {
        Output::save_json(&domain, Some(path.clone()))?;
        log::info!("Domain saved to {}", path.display());
    }
    Output::save_json(&report, output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachable_board_counts() {
        let mut domain = BoardStateDomain::new();
        domain.register_reachable();
        let report = EnumerationReport::new(&domain);
        assert_eq!(
            report,
            EnumerationReport {
                canonical_boards: 765,
                boards_per_rank: [1, 3, 12, 38, 108, 174, 204, 153, 57, 15],
                final_boards: 138,
                outcomes: Tally {
                    wins: 91,
                    losses: 44,
                    draws: 3,
                },
            }
        );
    }
}
