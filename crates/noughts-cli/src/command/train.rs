use std::path::PathBuf;

use anyhow::{Context as _, ensure};
use chrono::Utc;
use noughts_engine::BoardStateDomain;
use noughts_training::{
    genetic::{HallOfFame, PopulationBuilder, PopulationEvolver},
    operators::{CrossoverKind, Selection},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    schema::policy_model::{GenerationSummary, PolicyModel, ScoringKind},
    util::{self, Output},
};

const POPULATION_SIZE: usize = 100;
const GENERATIONS: usize = 100;
const INITIAL_GENE_COUNT: usize = 20;

const ELITE_COUNT: usize = 1;
const HALL_OF_FAME_SIZE: usize = 1;
const TOURNAMENT_SIZE: usize = 2;

const CROSSOVER_RATE: f64 = 0.5;
const MUTATION_RATE: f64 = 0.1;
const GENE_MUTATION_RATE: f64 = 0.05;

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum SelectionKind {
    #[default]
    Tournament,
    Roulette,
}

/// Training parameters.
///
/// Every field is optional: flags left unset fall back to the `--config` file, then
/// to the built-in defaults.
#[derive(Default, Debug, Clone, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TrainConfig {
    /// Number of individuals per generation [default: 100]
    #[arg(long)]
    population_size: Option<usize>,
    /// Number of generations [default: 100]
    #[arg(long)]
    generations: Option<usize>,
    /// Random genes drawn per initial genome [default: 20]
    #[arg(long)]
    initial_gene_count: Option<usize>,
    /// Individuals carried over unchanged each generation [default: 1]
    #[arg(long)]
    elite_count: Option<usize>,
    /// Best individuals remembered across generations [default: 1]
    #[arg(long)]
    hall_of_fame_size: Option<usize>,
    /// Parent selection: tournament or roulette [default: tournament]
    #[arg(long)]
    selection: Option<SelectionKind>,
    /// Individuals per tournament [default: 2]
    #[arg(long)]
    tournament_size: Option<usize>,
    /// Crossover: onepoint, twopoint or uniform [default: twopoint]
    #[arg(long)]
    crossover: Option<CrossoverKind>,
    /// Probability of crossing a parent pair [default: 0.5]
    #[arg(long)]
    crossover_rate: Option<f64>,
    /// Probability of mutating a child [default: 0.1]
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Probability of mutating each gene of a mutated child [default: 0.05]
    #[arg(long)]
    gene_mutation_rate: Option<f64>,
    /// Fitness scoring: margin or nonlossratio [default: margin]
    #[arg(long)]
    scoring: Option<ScoringKind>,
    /// Random seed [default: drawn from the OS]
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct TrainParams {
    population_size: usize,
    generations: usize,
    initial_gene_count: usize,
    hall_of_fame_size: usize,
    scoring: ScoringKind,
    seed: u64,
    evolver: PopulationEvolver,
}

impl TrainConfig {
    /// Fills every unset field from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            population_size: self.population_size.or(fallback.population_size),
            generations: self.generations.or(fallback.generations),
            initial_gene_count: self.initial_gene_count.or(fallback.initial_gene_count),
            elite_count: self.elite_count.or(fallback.elite_count),
            hall_of_fame_size: self.hall_of_fame_size.or(fallback.hall_of_fame_size),
            selection: self.selection.or(fallback.selection),
            tournament_size: self.tournament_size.or(fallback.tournament_size),
            crossover: self.crossover.or(fallback.crossover),
            crossover_rate: self.crossover_rate.or(fallback.crossover_rate),
            mutation_rate: self.mutation_rate.or(fallback.mutation_rate),
            gene_mutation_rate: self.gene_mutation_rate.or(fallback.gene_mutation_rate),
            scoring: self.scoring.or(fallback.scoring),
            seed: self.seed.or(fallback.seed),
        }
    }

    fn resolve(self) -> anyhow::Result<TrainParams> {
        let population_size = self.population_size.unwrap_or(POPULATION_SIZE);
        let generations = self.generations.unwrap_or(GENERATIONS);
        let tournament_size = self.tournament_size.unwrap_or(TOURNAMENT_SIZE);
        let crossover_rate = self.crossover_rate.unwrap_or(CROSSOVER_RATE);
        let mutation_rate = self.mutation_rate.unwrap_or(MUTATION_RATE);
        let gene_mutation_rate = self.gene_mutation_rate.unwrap_or(GENE_MUTATION_RATE);
        let hall_of_fame_size = self.hall_of_fame_size.unwrap_or(HALL_OF_FAME_SIZE);

        ensure!(population_size > 0, "population size must be positive");
        ensure!(generations > 0, "generation count must be positive");
        ensure!(tournament_size > 0, "tournament size must be positive");
        ensure!(hall_of_fame_size > 0, "hall of fame size must be positive");
        for (name, rate) in [
            ("crossover rate", crossover_rate),
            ("mutation rate", mutation_rate),
            ("gene mutation rate", gene_mutation_rate),
        ] {
            ensure!(
                (0.0..=1.0).contains(&rate),
                "{name} must be within [0, 1], got {rate}"
            );
        }

        let selection = match self.selection.unwrap_or_default() {
            SelectionKind::Tournament => Selection::Tournament {
                size: tournament_size,
            },
            SelectionKind::Roulette => Selection::Roulette,
        };
        Ok(TrainParams {
            population_size,
            generations,
            initial_gene_count: self.initial_gene_count.unwrap_or(INITIAL_GENE_COUNT),
            hall_of_fame_size,
            scoring: self.scoring.unwrap_or_default(),
            seed: self.seed.unwrap_or_else(|| rand::rng().random()),
            evolver: PopulationEvolver {
                elite_count: self.elite_count.unwrap_or(ELITE_COUNT),
                selection,
                crossover: self.crossover.unwrap_or_default(),
                crossover_rate,
                mutation_rate,
                gene_mutation_rate,
            },
        })
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    config: TrainConfig,
    /// JSON file with training parameters
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
    /// Board state domain JSON to start from instead of an empty domain
    #[arg(long)]
    domain: Option<PathBuf>,
    /// Model name
    #[arg(long, default_value = "policy")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        config_path,
        domain,
        name,
        output,
    } = arg;
    let file_config = match config_path {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainConfig::default(),
    };
    let params = config.clone().or(file_config).resolve()?;
    let domain = match domain {
        Some(path) => util::read_json_file("board state domain", path)?,
        None => BoardStateDomain::new(),
    };

    let model = train(name, &params, domain)?;
    Output::save_json(&model, output.clone())?;

    log::info!("Model saved successfully");
    if let Some(path) = &output {
        log::info!("  Path: {}", path.display());
    }
    log::info!("  Name: {}", model.name);
    log::info!("  Trained at: {}", model.trained_at);
    log::info!("  Fitness: {:.3}", model.fitness);
    log::info!("  Policy first: {}", model.policy_first);
    log::info!("  Opponent first: {}", model.opponent_first);
    log::info!("  Genes: {}", model.genes.len());

    Ok(())
}

fn train(
    name: &str,
    params: &TrainParams,
    domain: BoardStateDomain,
) -> anyhow::Result<PolicyModel> {
    log::info!("Training {name} with {params:?}");
    let mut rng = Pcg64Mcg::seed_from_u64(params.seed);
    let evaluator = params.scoring.evaluator();

    let mut population = PopulationBuilder::new(params.population_size, params.initial_gene_count)
        .domain(domain)
        .build(&mut rng)?;
    let mut hall_of_fame = HallOfFame::new(params.hall_of_fame_size);
    let mut history = Vec::with_capacity(params.generations);

    for generation in 0..params.generations {
        population
            .evaluate_fitness(evaluator.as_ref(), &mut rng)
            .with_context(|| format!("Failed to evaluate generation #{generation}"))?;
        hall_of_fame.update(&population);

        if let (Some(fitness), Some(genome_size)) = (
            population.compute_fitness_stats(),
            population.compute_genome_size_stats(),
        ) {
            log::info!("Generation #{generation}:");
            log::info!("  Fitness:     {fitness}");
            log::info!("  Genome size: {genome_size:.1}");
            history.push(GenerationSummary {
                generation,
                fitness,
                genome_size,
                known_boards: population.domain().known_state_count(),
            });
        }

        if generation + 1 < params.generations {
            population = params
                .evolver
                .evolve(population, &mut rng)
                .with_context(|| format!("Failed to evolve generation #{generation}"))?;
        }
    }

    for (i, ind) in hall_of_fame.members().iter().enumerate() {
        log::info!(
            "Hall of fame {i:2}: {:.3} ({} genes)",
            ind.fitness(),
            ind.genome().len()
        );
    }
    let best = hall_of_fame
        .best()
        .context("Hall of fame is empty")?
        .genome()
        .clone();

    let mut domain = population.into_domain();
    let evaluation = evaluator
        .evaluate(best, &mut domain, &mut rng)
        .context("Failed to evaluate the best policy")?;
    if evaluation.synthesized > 0 {
        log::warn!(
            "Best policy needed {} new genes on re-evaluation",
            evaluation.synthesized
        );
    }

    Ok(PolicyModel {
        name: name.to_owned(),
        trained_at: Utc::now(),
        fitness: evaluation.fitness,
        scoring: params.scoring,
        seed: params.seed,
        policy_first: evaluation.policy_first,
        opponent_first: evaluation.opponent_first,
        history,
        domain,
        genes: evaluation.genome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TrainConfig {
        TrainConfig {
            population_size: Some(6),
            generations: Some(3),
            initial_gene_count: Some(10),
            seed: Some(7),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let params = TrainConfig::default().resolve().unwrap();
        assert_eq!(params.population_size, 100);
        assert_eq!(params.generations, 100);
        assert_eq!(params.initial_gene_count, 20);
        assert_eq!(params.hall_of_fame_size, 1);
        assert_eq!(params.scoring, ScoringKind::Margin);
        assert_eq!(params.evolver.elite_count, 1);
        assert_eq!(params.evolver.selection, Selection::Tournament { size: 2 });
        assert_eq!(params.evolver.crossover, CrossoverKind::TwoPoint);
        assert!((params.evolver.crossover_rate - 0.5).abs() < f64::EPSILON);
        assert!((params.evolver.mutation_rate - 0.1).abs() < f64::EPSILON);
        assert!((params.evolver.gene_mutation_rate - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flags_take_precedence_over_file() {
        let file: TrainConfig = serde_json::from_str(
            r#"{"population_size": 50, "selection": "Roulette", "crossover": "Uniform"}"#,
        )
        .unwrap();
        let flags = TrainConfig {
            population_size: Some(8),
            ..TrainConfig::default()
        };
        let params = flags.or(file).resolve().unwrap();
        assert_eq!(params.population_size, 8);
        assert_eq!(params.evolver.selection, Selection::Roulette);
        assert_eq!(params.evolver.crossover, CrossoverKind::Uniform);
    }

    #[test]
    fn test_unknown_config_field_is_rejected() {
        let result = serde_json::from_str::<TrainConfig>(r#"{"populaton_size": 50}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        for config in [
            TrainConfig {
                population_size: Some(0),
                ..TrainConfig::default()
            },
            TrainConfig {
                generations: Some(0),
                ..TrainConfig::default()
            },
            TrainConfig {
                mutation_rate: Some(1.5),
                ..TrainConfig::default()
            },
            TrainConfig {
                crossover_rate: Some(-0.1),
                ..TrainConfig::default()
            },
            TrainConfig {
                hall_of_fame_size: Some(0),
                ..TrainConfig::default()
            },
        ] {
            assert!(config.resolve().is_err());
        }
    }

    #[test]
    fn test_train_is_reproducible() {
        let params = small_config().resolve().unwrap();
        let first = train("test", &params, BoardStateDomain::new()).unwrap();
        let second = train("test", &params, BoardStateDomain::new()).unwrap();

        assert_eq!(first.history.len(), 3);
        assert_eq!(first.genes, second.genes);
        assert!((first.fitness - second.fitness).abs() < f32::EPSILON);
        first.genes.validate(&first.domain).unwrap();
        assert!(first.fitness >= first.history[0].fitness.max);
    }

    #[test]
    fn test_model_roundtrip() {
        let params = small_config().resolve().unwrap();
        let model = train("roundtrip", &params, BoardStateDomain::new()).unwrap();
        let path = std::env::temp_dir().join(format!("noughts-model-{}.json", std::process::id()));
        Output::save_json(&model, Some(path.clone())).unwrap();

        let loaded = PolicyModel::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.name, "roundtrip");
        assert_eq!(loaded.genes, model.genes);
        assert_eq!(
            loaded.domain.known_state_count(),
            model.domain.known_state_count()
        );
    }
}
