use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use noughts_engine::BoardStateDomain;
use noughts_evaluator::{
    policy::Genome,
    policy_evaluator::{GenomeEvaluator, Margin, NonLossRatio, PolicyEvaluator, Tally},
};
use noughts_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum ScoringKind {
    #[default]
    Margin,
    NonLossRatio,
}

impl ScoringKind {
    pub fn evaluator(self) -> Box<dyn GenomeEvaluator> {
        match self {
            Self::Margin => Box::new(PolicyEvaluator::new(Margin)),
            Self::NonLossRatio => Box::new(PolicyEvaluator::new(NonLossRatio)),
        }
    }
}

/// A trained policy together with the domain its addresses refer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub fitness: f32,
    pub scoring: ScoringKind,
    pub seed: u64,
    pub policy_first: Tally,
    pub opponent_first: Tally,
    pub history: Vec<GenerationSummary>,
    pub domain: BoardStateDomain,
    pub genes: Genome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub fitness: DescriptiveStats,
    pub genome_size: DescriptiveStats,
    pub known_boards: usize,
}

impl PolicyModel {
    /// Reads a model and checks that every gene is legal in its domain.
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let model: Self = util::read_json_file("policy model", path)?;
        model.genes.validate(&model.domain).with_context(|| {
            format!(
                "Policy model genes do not match its domain: {}",
                path.display()
            )
        })?;
        Ok(model)
    }
}
