use std::path::PathBuf;

use anyhow::Context as _;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use gaitevo_evolution::{EvolutionState, PoolEvolution, checkpoint::CheckpointStore};

use crate::command::optimize::EvaluatorArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlaybackArg {
    /// Checkpoint file holding the individuals to replay
    #[arg(long, default_value = "gaitevo-pool.json")]
    checkpoint: PathBuf,
    #[clap(flatten)]
    evaluator: EvaluatorArg,
}

pub(crate) fn run(arg: &PlaybackArg) -> anyhow::Result<()> {
    let store = CheckpointStore::new(arg.checkpoint.clone());
    // Playback only reads the pool, so a fixed seed is fine.
    let mut pool = PoolEvolution::resume(arg.evaluator.build(), store, Pcg64::seed_from_u64(0))
        .with_context(|| format!("cannot load checkpoint {}", arg.checkpoint.display()))?;

    for slot in 0..pool.population().size() {
        let state = pool.playback();
        let individual = &pool.population()[slot];
        eprintln!(
            "  {slot:2}: F={:+.4} over {} samples",
            individual.fitness().get_value_or_default(),
            individual.fitness().evaluations()
        );
        match state {
            EvolutionState::Playback => {}
            EvolutionState::Stopped => break,
            _ => anyhow::bail!(
                "evaluation aborted during playback of slot {slot} from {}",
                arg.checkpoint.display()
            ),
        }
    }
    Ok(())
}
