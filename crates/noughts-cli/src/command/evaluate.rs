use std::path::PathBuf;

use anyhow::Context as _;
use noughts_evaluator::policy_evaluator::Tally;
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::{
    schema::policy_model::{PolicyModel, ScoringKind},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Policy model JSON written by `train`
    #[arg(long)]
    model: PathBuf,
    /// Scoring to apply instead of the one the model was trained with
    #[arg(long)]
    scoring: Option<ScoringKind>,
    /// Seed for genes synthesized on boards the model does not cover
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct EvaluationReport {
    name: String,
    scoring: ScoringKind,
    fitness: f32,
    policy_first: Tally,
    opponent_first: Tally,
    genes: usize,
    synthesized: usize,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        model,
        scoring,
        seed,
        output,
    } = arg;
    let PolicyModel {
        name,
        scoring: trained_scoring,
        mut domain,
        genes,
        ..
    } = PolicyModel::open(model)?;
    let scoring = scoring.unwrap_or(trained_scoring);

    let mut rng = Pcg64Mcg::seed_from_u64(*seed);
    let evaluation = scoring
        .evaluator()
        .evaluate(genes, &mut domain, &mut rng)
        .with_context(|| format!("Failed to evaluate policy model: {}", model.display()))?;
    if evaluation.synthesized > 0 {
        log::warn!(
            "Model does not cover every board; {} genes were synthesized",
            evaluation.synthesized
        );
    }

    let report = EvaluationReport {
        name,
        scoring,
        fitness: evaluation.fitness,
        policy_first: evaluation.policy_first,
        opponent_first: evaluation.opponent_first,
        genes: evaluation.genome.len(),
        synthesized: evaluation.synthesized,
    };
    log::info!(
        "{}: fitness {:.3} ({scoring:?})",
        report.name,
        report.fitness
    );
    log::info!("  Policy first:   {}", report.policy_first);
    log::info!("  Opponent first: {}", report.opponent_first);
    Output::save_json(&report, output.clone())
}
