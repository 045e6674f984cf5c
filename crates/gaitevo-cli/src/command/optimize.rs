use std::path::PathBuf;

use chrono::Utc;
use rand::{Rng, SeedableRng as _, rngs::ThreadRng};
use rand_pcg::Pcg64;

use gaitevo_evaluator::{BenchmarkEvaluation, Objective};
use gaitevo_evolution::{
    Evaluation, EvolutionState, PoolConfig, PoolEvolution, Population,
    checkpoint::CheckpointStore,
};

use crate::{schema::BestModel, util::Output};

/// Benchmark evaluator settings, shared by all subcommands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluatorArg {
    /// Benchmark surface standing in for the robot trial
    #[arg(long, default_value = "sphere")]
    pub(crate) objective: Objective,
    /// Half-width of the per-gene constraint box
    #[arg(long, default_value_t = 5.0)]
    pub(crate) bound: f64,
    /// Standard deviation of the fitness measurement noise
    #[arg(long, default_value_t = 0.1)]
    pub(crate) noise_sigma: f64,
}

impl EvaluatorArg {
    pub(crate) fn build(&self) -> BenchmarkEvaluation<ThreadRng> {
        BenchmarkEvaluation::new(self.objective, self.bound, self.noise_sigma, rand::rng())
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct OptimizeArg {
    /// Number of controller weights per genome
    #[arg(long, default_value_t = 8)]
    genome_len: usize,
    /// Number of pool slots
    #[arg(long, default_value_t = 12)]
    population: usize,
    /// Total number of trials to run
    #[arg(long, default_value_t = 240)]
    max_trials: usize,
    /// Probability of a refreshing trial in steady state
    #[arg(long, default_value_t = 0.2)]
    moving_rate: f64,
    /// Skew strength toward better-ranked parents
    #[arg(long, default_value_t = 1.5)]
    selection_bias: f64,
    /// Initial per-gene mutation step size
    #[arg(long, default_value_t = 0.1)]
    mutation_rate: f64,
    /// Initial step size applied to the mutation rate itself
    #[arg(long, default_value_t = 0.01)]
    meta_mutation_rate: f64,
    /// Seed for the optimizer's random source (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Checkpoint file location
    #[arg(long, default_value = "gaitevo-pool.json")]
    checkpoint: PathBuf,
    /// Where to write the best-model JSON (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    evaluator: EvaluatorArg,
}

pub(crate) fn run(arg: &OptimizeArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("optimizer seed: {seed}");
    let mut rng = Pcg64::seed_from_u64(seed);

    let population = Population::random(
        &mut rng,
        arg.population,
        arg.genome_len,
        arg.mutation_rate,
        arg.meta_mutation_rate,
    );
    let config = PoolConfig {
        max_trials: arg.max_trials,
        current_trial: 0,
        moving_rate: arg.moving_rate,
        selection_bias: arg.selection_bias,
    };
    let store = CheckpointStore::new(arg.checkpoint.clone());
    let mut pool = PoolEvolution::new(population, arg.evaluator.build(), config, store, rng)?;

    run_loop(&mut pool, arg.evaluator.objective, arg.output.clone())
}

/// Drives trials to completion and exports the best individual.
pub(crate) fn run_loop<E, R>(
    pool: &mut PoolEvolution<E, R>,
    objective: Objective,
    output: Option<PathBuf>,
) -> anyhow::Result<()>
where
    E: Evaluation,
    R: Rng,
{
    loop {
        match pool.execute_trial()? {
            EvolutionState::Running => {
                if pool.has_new_best_individual() {
                    log::info!(
                        "trial {}: new best individual F={:+.4}",
                        pool.current_trial(),
                        pool.best_individual().fitness().get_value_or_default()
                    );
                }
            }
            EvolutionState::Finished => break,
            EvolutionState::Aborted => anyhow::bail!(
                "evaluation aborted at trial {}; resume from {}",
                pool.current_trial(),
                pool.checkpoint_path().display()
            ),
            state @ (EvolutionState::Playback | EvolutionState::Stopped) => {
                unreachable!("execute_trial returned {state:?}")
            }
        }
    }

    let fitness = pool.fitness_stats();
    eprintln!("Run finished after {} trials.", pool.current_trial());
    eprintln!(
        "  Fitness: min {:+.4}, avg {:+.4}, max {:+.4}",
        fitness.min, fitness.avg, fitness.max
    );
    eprintln!("  Mean mutation rate: {:.6}", pool.mutation_stats().avg);

    let best = pool.best_individual();
    eprintln!(
        "  Best: F={:+.4} over {} samples",
        best.fitness().get_value_or_default(),
        best.fitness().evaluations()
    );
    eprintln!("  Genome: {:.4?}", best.genome());

    let model = BestModel {
        objective: format!("{objective:?}"),
        finished_at: Utc::now(),
        trials: pool.current_trial(),
        fitness: best.fitness().get_value_or_default(),
        fitness_samples: best.fitness().evaluations(),
        mutation_rate: best.mutation_rate(),
        genome: best.genome().to_vec(),
    };
    Output::save_json(&model, output)?;

    Ok(())
}
