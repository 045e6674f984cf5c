//! Pool-based steady-state evolutionary optimizer for noisy fitness trials.
//!
//! This crate searches over fixed-length real-valued parameter vectors
//! ("genomes", typically robot motor-controller weights) whose fitness can
//! only be measured by running an expensive, stochastic trial. It differs
//! from a textbook generational GA in three ways that matter for that
//! setting:
//!
//! - **Generation-free pool**: a fixed-size population updated one
//!   individual per trial. A challenger bred by crossover may only replace a
//!   strictly worse member ([`population::replacement_candidate`]), so the
//!   best fitness never regresses.
//! - **Noise-aware fitness**: repeated measurements of the same individual
//!   are leaky-averaged ([`fitness::FitnessValue`]) instead of overwritten,
//!   and dedicated *refreshing trials* re-measure members so lucky scores
//!   decay toward the truth.
//! - **Crash safety**: the full optimizer state checkpoints atomically once
//!   per population cycle ([`checkpoint`]) and a run resumes exactly where
//!   it died ([`pool::PoolEvolution::resume`]).
//!
//! The trial itself lives behind the [`evaluation::Evaluation`] trait; the
//! optimizer neither knows nor cares whether a genome drives a physical
//! robot, a simulator, or a synthetic benchmark.
//!
//! # Example
//!
//! ```
//! use gaitevo_evolution::{
//!     checkpoint::CheckpointStore,
//!     evaluation::Evaluation,
//!     fitness::FitnessValue,
//!     pool::{EvolutionState, PoolConfig, PoolEvolution},
//!     population::Population,
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! struct Paraboloid;
//!
//! impl Evaluation for Paraboloid {
//!     fn evaluate(&mut self, fitness: &mut FitnessValue, genome: &[f64], _seed: f64) -> bool {
//!         fitness.set_value(-genome.iter().map(|g| g * g).sum::<f64>());
//!         true
//!     }
//! }
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let mut rng = Pcg64::seed_from_u64(42);
//! let population = Population::random(&mut rng, 8, 4, 0.1, 0.01);
//! let config = PoolConfig {
//!     max_trials: 64,
//!     current_trial: 0,
//!     moving_rate: 0.2,
//!     selection_bias: 1.5,
//! };
//! let store = CheckpointStore::new(dir.path().join("pool.json"));
//! let mut pool = PoolEvolution::new(population, Paraboloid, config, store, rng)?;
//!
//! loop {
//!     match pool.execute_trial()? {
//!         EvolutionState::Running => {}
//!         _ => break,
//!     }
//! }
//! println!("best: {:?}", pool.best_individual().genome());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checkpoint;
pub mod evaluation;
pub mod fitness;
pub mod individual;
pub mod pool;
pub mod population;
pub mod selection;

pub use self::{
    evaluation::Evaluation,
    fitness::FitnessValue,
    individual::Individual,
    pool::{EvolutionState, PoolConfig, PoolEvolution},
    population::Population,
};
