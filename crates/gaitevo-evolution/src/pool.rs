//! Pool-based, generation-free evolution of controller weight genomes.
//!
//! One trial at a time, the optimizer either seeds an initial slot,
//! crossbreeds two biased-selected parents into a challenger, or refreshes a
//! randomly chosen member against the noisy evaluator. Replacement is
//! elitism-preserving: a challenger can only evict a strictly worse member,
//! found by the bottom-up search in [`crate::population`]. State is
//! checkpointed once per population cycle so a run survives process death.

use log::{debug, info, warn};
use rand::Rng;

use gaitevo_stats::SampleStats;

use crate::{
    checkpoint::{CheckpointError, CheckpointStore, PoolCheckpoint},
    evaluation::Evaluation,
    individual::Individual,
    population::{Population, replacement_candidate},
    selection::biased_index,
};

/// Where a run currently stands, as reported by the trial-driving calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    /// More trials to go.
    Running,
    /// `max_trials` reached; the final checkpoint is on disk.
    Finished,
    /// The evaluator failed to produce a result; the run halted with the
    /// population untouched by the failed trial.
    Aborted,
    /// Mid-playback, more stored individuals to go.
    Playback,
    /// Playback walked the whole pool.
    Stopped,
}

/// Run parameters, validated at construction.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Total number of trials for this run. Must exceed 1.
    pub max_trials: usize,
    /// Trial counter to start from; 0 for a fresh run.
    pub current_trial: usize,
    /// Probability of a refreshing trial in steady state (0 = always
    /// crossover, 1 = always refresh).
    pub moving_rate: f64,
    /// Strength of the skew toward better-ranked parents. Must be positive.
    pub selection_bias: f64,
}

/// Rejected run parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max trials must be greater than 1, got {0}")]
    MaxTrialsTooSmall(usize),
    #[error("current trial {current_trial} exceeds max trials {max_trials}")]
    CurrentTrialOutOfRange {
        current_trial: usize,
        max_trials: usize,
    },
    #[error("moving rate must lie within [0, 1], got {0}")]
    MovingRateOutOfRange(f64),
    #[error("selection bias must be positive, got {0}")]
    SelectionBiasNotPositive(f64),
}

/// Failures surfaced by the trial loop.
///
/// Evaluation failures are not errors here; they abort the run through
/// [`EvolutionState::Aborted`]. Errors are reserved for broken run
/// parameters and checkpoint persistence.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("checkpoint holds a run that never started, nothing to resume")]
    NothingToResume,
}

/// Steady-state evolutionary optimizer over a fixed-size pool.
///
/// Drives one trial per [`execute_trial`](Self::execute_trial) call:
///
/// - trials `0..population_size` seed every slot with its first evaluation;
/// - afterwards each trial is a crossover trial with probability
///   `1 - moving_rate` (breed, mutate, evaluate, attempt elitism-preserving
///   replacement) or a refreshing trial otherwise (re-evaluate one member to
///   wash estimate staleness out of the noisy fitness signal).
///
/// The optimizer owns its random source, so a run is fully reproducible from
/// a seed, and checkpoints itself through the supplied [`CheckpointStore`]
/// every completed population cycle.
#[derive(Debug)]
pub struct PoolEvolution<E, R> {
    population: Population,
    evaluation: E,
    rng: R,
    store: CheckpointStore,
    max_trials: usize,
    current_trial: usize,
    moving_rate: f64,
    selection_bias: f64,
    best_individual_has_changed: bool,
    current_playback_idx: usize,
    fitness_stats: SampleStats,
    mutation_stats: SampleStats,
}

impl<E, R> PoolEvolution<E, R>
where
    E: Evaluation,
    R: Rng,
{
    /// Creates an optimizer for a fresh (or externally restored) run.
    pub fn new(
        population: Population,
        evaluation: E,
        config: PoolConfig,
        store: CheckpointStore,
        rng: R,
    ) -> Result<Self, ConfigError> {
        if config.max_trials <= 1 {
            return Err(ConfigError::MaxTrialsTooSmall(config.max_trials));
        }
        if config.current_trial > config.max_trials {
            return Err(ConfigError::CurrentTrialOutOfRange {
                current_trial: config.current_trial,
                max_trials: config.max_trials,
            });
        }
        if !(0.0..=1.0).contains(&config.moving_rate) {
            return Err(ConfigError::MovingRateOutOfRange(config.moving_rate));
        }
        if config.selection_bias <= 0.0 {
            return Err(ConfigError::SelectionBiasNotPositive(config.selection_bias));
        }
        debug!(
            "created pool evolution: {} slots, {} trials",
            population.size(),
            config.max_trials
        );
        Ok(Self {
            population,
            evaluation,
            rng,
            store,
            max_trials: config.max_trials,
            current_trial: config.current_trial,
            moving_rate: config.moving_rate,
            selection_bias: config.selection_bias,
            best_individual_has_changed: false,
            current_playback_idx: 0,
            fitness_stats: SampleStats::new(),
            mutation_stats: SampleStats::new(),
        })
    }

    /// Reconstructs an optimizer from the last checkpoint.
    ///
    /// Restores the population and trial counter, re-sorts by fitness, and
    /// extends `max_trials` by the already-completed multiple of the original
    /// run length so the continued run gets a full allotment of new trials.
    pub fn resume(evaluation: E, store: CheckpointStore, rng: R) -> Result<Self, EvolutionError> {
        let checkpoint = store.load()?;
        if checkpoint.current_trial == 0 {
            return Err(EvolutionError::NothingToResume);
        }
        let population = checkpoint.restore_population()?;

        let mut max_trials = checkpoint.max_trials;
        let completed = checkpoint.current_trial - (checkpoint.current_trial % max_trials);
        if completed > 0 {
            warn!(
                "max trials increased from {max_trials} to {}",
                max_trials + completed
            );
            max_trials += completed;
        }

        let config = PoolConfig {
            max_trials,
            current_trial: checkpoint.current_trial,
            moving_rate: checkpoint.moving_rate,
            selection_bias: checkpoint.selection_bias,
        };
        let mut this = Self::new(population, evaluation, config, store, rng)?;
        this.population.sort_by_fitness();
        info!("ready to resume at trial {}", this.current_trial);
        Ok(this)
    }

    /// Runs one trial and reports where the run stands afterwards.
    ///
    /// An evaluation failure yields `Ok(Aborted)` and leaves the population
    /// and statistics exactly as the previous trial left them; only
    /// checkpoint persistence failures surface as `Err`.
    pub fn execute_trial(&mut self) -> Result<EvolutionState, EvolutionError> {
        let size = self.population.size();
        let is_initial = self.current_trial < size;

        if self.current_trial % size == 0 {
            self.evaluation
                .prepare_evaluation(self.current_trial, self.max_trials);
        }

        debug!("T: {}", self.current_trial);
        let result = if is_initial {
            self.initial_trial()
        } else if self.rng.random_range(0.0..1.0) > self.moving_rate {
            self.crossover_trial()
        } else {
            self.refreshing_trial()
        };

        if !result {
            return Ok(EvolutionState::Aborted);
        }

        if !is_initial {
            self.update_population_statistics();
        }

        self.current_trial += 1;
        if self.current_trial < self.max_trials {
            if self.current_trial % size == 0 {
                self.save_state()?;
            }
            Ok(EvolutionState::Running)
        } else {
            self.save_state()?;
            Ok(EvolutionState::Finished)
        }
    }

    /// Re-evaluates one stored individual for behavior reproduction.
    ///
    /// Walks the pool in slot order across repeated calls, updating only the
    /// visited individual's own fitness sample. No mutation, no
    /// replacement, no re-sorting, no checkpointing.
    pub fn playback(&mut self) -> EvolutionState {
        let slot = self.current_playback_idx;
        info!("playback individual {slot}");

        let mut candidate = self.population[slot].clone();
        if !self.evaluate_individual(&mut candidate) {
            return EvolutionState::Aborted;
        }
        self.population[slot] = candidate;
        self.recompute_statistics();

        self.current_playback_idx += 1;
        if self.current_playback_idx < self.population.size() {
            EvolutionState::Playback
        } else {
            EvolutionState::Stopped
        }
    }

    /// Seeding trial: evaluate the slot addressed by the trial counter, so
    /// every slot holds at least one sample before steady state begins.
    fn initial_trial(&mut self) -> bool {
        debug!("[initial trial]");
        assert!(self.current_trial < self.population.size());
        let slot = self.current_trial;

        let mut candidate = self.population[slot].clone();
        if self.evaluate_individual(&mut candidate) {
            self.population[slot] = candidate;
            true
        } else {
            false
        }
    }

    /// Crossover trial: breed a challenger and let it fight for a slot.
    fn crossover_trial(&mut self) -> bool {
        let size = self.population.size();
        let mother = biased_index(size, self.selection_bias, &mut self.rng);
        let father = biased_index(size, self.selection_bias, &mut self.rng);
        debug!("[cross {mother:2} + {father:2}]");

        let mut child = Individual::from_crossover(
            &self.population[mother],
            &self.population[father],
            &mut self.rng,
        );
        child.mutate(&mut self.rng);

        if !self.evaluate_individual(&mut child) {
            return false;
        }

        let replace_idx = replacement_candidate(&child, &self.population);
        if child.fitness > self.population[replace_idx].fitness {
            assert!(
                self.population[replace_idx].fitness.evaluations() > 0,
                "replacing slot {replace_idx} before it was ever evaluated"
            );
            debug!(
                "[> {:+.3}] replace {replace_idx:2}",
                self.population[replace_idx].fitness.get_value()
            );
            self.best_individual_has_changed |= replace_idx == self.population.best_index();
            self.population[replace_idx] = child;
        } else {
            debug!(
                "[< {:+.3}] discard",
                self.population[replace_idx].fitness.get_value_or_default()
            );
        }
        true
    }

    /// Refreshing trial: re-evaluate one member to counter estimate
    /// staleness: a member that once scored well by measurement luck
    /// regresses toward its true fitness over repeated refreshes.
    fn refreshing_trial(&mut self) -> bool {
        let slot = self.rng.random_range(0..self.population.size());
        let mut candidate = self.population[slot].clone();
        debug!(
            "[refresh {slot:2} ({} samples)]",
            candidate.fitness.evaluations()
        );

        if self.evaluate_individual(&mut candidate) {
            // A failed trial must leave the pool untouched, so the clone is
            // only written back on success.
            self.population[slot] = candidate;
            true
        } else {
            false
        }
    }

    /// Constrain, evaluate, log. Returns false on evaluator failure.
    fn evaluate_individual(&mut self, individual: &mut Individual) -> bool {
        self.evaluation.constrain(&mut individual.genome);
        let seed = self.rng.random_range(0.0..1.0);
        if self
            .evaluation
            .evaluate(&mut individual.fitness, &individual.genome, seed)
        {
            debug!("F={:+.3}", individual.fitness.get_value_or_default());
            true
        } else {
            info!("evaluation aborted without result");
            false
        }
    }

    /// Re-sorts the pool and refreshes the running statistics.
    fn update_population_statistics(&mut self) {
        let last_best = self.population.best_individual().fitness.get_value();
        self.population.sort_by_fitness();
        let best = self.population.best_individual().fitness.get_value();
        self.best_individual_has_changed |= last_best != best;

        self.recompute_statistics();

        if (self.current_trial + 1) % self.population.size() == 0 {
            info!(
                "max:{:+.4}, avg:{:+.4}, min:{:+.4}",
                self.fitness_stats.max, self.fitness_stats.avg, self.fitness_stats.min
            );
        }
    }

    /// Min/avg/max fitness and mean mutation rate over evaluated slots.
    /// Slots that never saw a sample are excluded, never counted as zero.
    fn recompute_statistics(&mut self) {
        self.fitness_stats.reset();
        self.mutation_stats.reset();
        for (slot, individual) in self.population.iter().enumerate() {
            if individual.fitness.evaluations() > 0 {
                self.fitness_stats.add_sample(individual.fitness.get_value());
                self.mutation_stats.add_sample(individual.mutation_rate);
            } else {
                debug!("slot {slot} not evaluated yet, skipping");
            }
        }
        self.fitness_stats.update_average();
        self.mutation_stats.update_average();
    }

    fn save_state(&self) -> Result<(), CheckpointError> {
        let checkpoint = PoolCheckpoint::capture(
            &self.population,
            self.current_trial,
            self.max_trials,
            self.moving_rate,
            self.selection_bias,
        );
        self.store.save(&checkpoint)
    }

    /// The individual in the best-fitness slot under the current ordering.
    #[must_use]
    pub fn best_individual(&self) -> &Individual {
        self.population.best_individual()
    }

    /// Edge-triggered "a new best individual appeared" flag; reading clears it.
    pub fn has_new_best_individual(&mut self) -> bool {
        std::mem::take(&mut self.best_individual_has_changed)
    }

    #[must_use]
    pub fn current_trial(&self) -> usize {
        self.current_trial
    }

    #[must_use]
    pub fn max_trials(&self) -> usize {
        self.max_trials
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Location of the run's checkpoint file.
    #[must_use]
    pub fn checkpoint_path(&self) -> &std::path::Path {
        self.store.path()
    }

    #[must_use]
    pub fn evaluation(&self) -> &E {
        &self.evaluation
    }

    /// Fitness statistics from the most recent steady-state trial.
    #[must_use]
    pub fn fitness_stats(&self) -> &SampleStats {
        &self.fitness_stats
    }

    /// Mutation-rate statistics from the most recent steady-state trial.
    #[must_use]
    pub fn mutation_stats(&self) -> &SampleStats {
        &self.mutation_stats
    }
}
