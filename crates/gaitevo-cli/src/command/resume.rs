use std::path::PathBuf;

use anyhow::Context as _;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use gaitevo_evolution::{PoolEvolution, checkpoint::CheckpointStore};

use crate::command::optimize::{self, EvaluatorArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ResumeArg {
    /// Checkpoint file to continue from
    #[arg(long, default_value = "gaitevo-pool.json")]
    checkpoint: PathBuf,
    /// Seed for the optimizer's random source (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write the best-model JSON (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    evaluator: EvaluatorArg,
}

pub(crate) fn run(arg: &ResumeArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("optimizer seed: {seed}");
    let rng = Pcg64::seed_from_u64(seed);

    let store = CheckpointStore::new(arg.checkpoint.clone());
    let mut pool = PoolEvolution::resume(arg.evaluator.build(), store, rng)
        .with_context(|| format!("cannot resume from {}", arg.checkpoint.display()))?;
    log::info!(
        "resuming at trial {} of {}",
        pool.current_trial(),
        pool.max_trials()
    );

    optimize::run_loop(&mut pool, arg.evaluator.objective, arg.output.clone())
}
