//! Durable snapshots of the optimizer state.
//!
//! Trials can be arbitrarily expensive, so the pool checkpoints itself once
//! per population cycle. The on-disk format is a JSON document carrying the
//! full population (genomes, smoothed fitness with sample counts, mutation
//! rates) plus the trial counter and run configuration, which is everything
//! `resume` needs to continue as if the process had never died.
//!
//! Schema structs are kept separate from the domain types so the wire format
//! can stay stable while the in-memory representation moves.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{fitness::FitnessValue, individual::Individual, population::Population};

/// Errors raised while saving, loading, or validating a checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint i/o failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint at {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("checkpoint holds {size} individuals, need at least 2")]
    PopulationTooSmall { size: usize },
    #[error("individual {index} has genome length {found}, expected {expected}")]
    GenomeLengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("individual {index} has {evaluations} evaluations but no fitness value")]
    FitnessInvariant { index: usize, evaluations: usize },
    #[error(
        "individual {index} has non-positive mutation rates ({mutation_rate}, {meta_mutation_rate})"
    )]
    RateNotPositive {
        index: usize,
        mutation_rate: f64,
        meta_mutation_rate: f64,
    },
    #[error("checkpoint trial counter {current_trial} exceeds max trials {max_trials}")]
    TrialCounterOutOfRange {
        current_trial: usize,
        max_trials: usize,
    },
}

/// One individual on the wire. Unset fitness is `value: None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub genome: Vec<f64>,
    pub fitness: Option<f64>,
    pub evaluations: usize,
    pub mutation_rate: f64,
    pub meta_mutation_rate: f64,
}

impl IndividualRecord {
    fn capture(individual: &Individual) -> Self {
        let evaluations = individual.fitness.evaluations();
        Self {
            genome: individual.genome.clone(),
            fitness: (evaluations > 0).then_some(individual.fitness.get_value()),
            evaluations,
            mutation_rate: individual.mutation_rate,
            meta_mutation_rate: individual.meta_mutation_rate,
        }
    }

    fn restore(&self, index: usize) -> Result<Individual, CheckpointError> {
        // NaN must fail too, hence the negated comparison.
        let rates_valid = self.mutation_rate > 0.0 && self.meta_mutation_rate > 0.0;
        if !rates_valid {
            return Err(CheckpointError::RateNotPositive {
                index,
                mutation_rate: self.mutation_rate,
                meta_mutation_rate: self.meta_mutation_rate,
            });
        }
        let fitness = match (self.fitness, self.evaluations) {
            (None, 0) => FitnessValue::new(),
            (Some(value), evaluations) if evaluations > 0 => {
                FitnessValue::from_parts(value, evaluations)
            }
            (_, evaluations) => {
                return Err(CheckpointError::FitnessInvariant { index, evaluations });
            }
        };
        Ok(Individual {
            genome: self.genome.clone(),
            fitness,
            mutation_rate: self.mutation_rate,
            meta_mutation_rate: self.meta_mutation_rate,
        })
    }
}

/// Full optimizer snapshot: population, trial counter, run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolCheckpoint {
    pub population: Vec<IndividualRecord>,
    pub current_trial: usize,
    pub max_trials: usize,
    pub moving_rate: f64,
    pub selection_bias: f64,
}

impl PoolCheckpoint {
    /// Captures a snapshot of the running optimizer state.
    #[must_use]
    pub fn capture(
        population: &Population,
        current_trial: usize,
        max_trials: usize,
        moving_rate: f64,
        selection_bias: f64,
    ) -> Self {
        Self {
            population: population.iter().map(IndividualRecord::capture).collect(),
            current_trial,
            max_trials,
            moving_rate,
            selection_bias,
        }
    }

    /// Rebuilds the population, validating the checkpoint invariants:
    /// at least two individuals, uniform genome length, sample counts
    /// consistent with fitness presence, positive mutation rates, and a
    /// trial counter within range.
    pub fn restore_population(&self) -> Result<Population, CheckpointError> {
        if self.population.len() < 2 {
            return Err(CheckpointError::PopulationTooSmall {
                size: self.population.len(),
            });
        }
        if self.current_trial > self.max_trials {
            return Err(CheckpointError::TrialCounterOutOfRange {
                current_trial: self.current_trial,
                max_trials: self.max_trials,
            });
        }
        let expected = self.population[0].genome.len();
        let individuals = self
            .population
            .iter()
            .enumerate()
            .map(|(index, record)| {
                if record.genome.len() != expected {
                    return Err(CheckpointError::GenomeLengthMismatch {
                        index,
                        expected,
                        found: record.genome.len(),
                    });
                }
                record.restore(index)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Population::from_individuals(individuals))
    }
}

/// File-backed checkpoint storage with atomic replacement.
///
/// `save` never truncates the live checkpoint in place: the snapshot is
/// written to a sibling temp file and renamed over the target, so a crash
/// mid-write leaves the previous checkpoint valid.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the live checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkpoint exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Durably writes a snapshot, replacing any previous one atomically.
    pub fn save(&self, checkpoint: &PoolCheckpoint) -> Result<(), CheckpointError> {
        let tmp_path = self.path.with_extension("tmp");
        let io_err = |source| CheckpointError::Io {
            path: tmp_path.clone(),
            source,
        };

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, checkpoint).map_err(|source| {
            CheckpointError::Parse {
                path: tmp_path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;
        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;

        fs::rename(&tmp_path, &self.path).map_err(|source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("checkpoint written to {}", self.path.display());
        Ok(())
    }

    /// Reads the most recent snapshot.
    pub fn load(&self) -> Result<PoolCheckpoint, CheckpointError> {
        let file = File::open(&self.path).map_err(|source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CheckpointError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn sample_population() -> Population {
        let mut rng = Pcg64::seed_from_u64(0xc4ec);
        let mut population = Population::random(&mut rng, 4, 6, 0.1, 0.01);
        population[0].fitness.set_value(1.0);
        population[0].fitness.set_value(2.0);
        population[1].fitness.set_value(-0.5);
        // Slot 2 and 3 stay unevaluated.
        population
    }

    fn assert_populations_equal(a: &Population, b: &Population) {
        assert_eq!(a.size(), b.size());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.genome(), y.genome());
            assert_eq!(x.fitness().get_value(), y.fitness().get_value());
            assert_eq!(x.fitness().evaluations(), y.fitness().evaluations());
            assert_eq!(x.mutation_rate(), y.mutation_rate());
            assert_eq!(x.meta_mutation_rate(), y.meta_mutation_rate());
        }
    }

    mod round_trip {
        use super::*;

        #[test]
        fn test_in_memory_round_trip_preserves_state() {
            let population = sample_population();
            let checkpoint = PoolCheckpoint::capture(&population, 17, 100, 0.25, 1.5);

            let json = serde_json::to_string(&checkpoint).unwrap();
            let parsed: PoolCheckpoint = serde_json::from_str(&json).unwrap();

            assert_eq!(parsed.current_trial, 17);
            assert_eq!(parsed.max_trials, 100);
            assert_eq!(parsed.moving_rate, 0.25);
            assert_eq!(parsed.selection_bias, 1.5);
            assert_populations_equal(&population, &parsed.restore_population().unwrap());
        }

        #[test]
        fn test_unset_fitness_round_trips_as_unset() {
            let population = sample_population();
            let checkpoint = PoolCheckpoint::capture(&population, 2, 8, 0.0, 1.0);
            assert_eq!(checkpoint.population[2].fitness, None);
            assert_eq!(checkpoint.population[2].evaluations, 0);

            let restored = checkpoint.restore_population().unwrap();
            assert_eq!(restored[2].fitness().evaluations(), 0);
            assert_eq!(restored[2].fitness().get_value(), f64::MIN);
        }

        #[test]
        fn test_on_disk_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let store = CheckpointStore::new(dir.path().join("pool.json"));
            let population = sample_population();
            let checkpoint = PoolCheckpoint::capture(&population, 5, 40, 0.1, 2.0);

            assert!(!store.exists());
            store.save(&checkpoint).unwrap();
            assert!(store.exists());

            let loaded = store.load().unwrap();
            assert_eq!(loaded.current_trial, 5);
            assert_populations_equal(&population, &loaded.restore_population().unwrap());
        }

        #[test]
        fn test_save_leaves_no_temp_file_behind() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("pool.json");
            let store = CheckpointStore::new(&path);
            let checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            store.save(&checkpoint).unwrap();
            assert!(!path.with_extension("tmp").exists());
        }

        #[test]
        fn test_save_replaces_previous_checkpoint() {
            let dir = tempfile::tempdir().unwrap();
            let store = CheckpointStore::new(dir.path().join("pool.json"));
            let population = sample_population();

            store
                .save(&PoolCheckpoint::capture(&population, 4, 40, 0.1, 2.0))
                .unwrap();
            store
                .save(&PoolCheckpoint::capture(&population, 8, 40, 0.1, 2.0))
                .unwrap();
            assert_eq!(store.load().unwrap().current_trial, 8);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_rejects_undersized_population() {
            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population.truncate(1);
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::PopulationTooSmall { size: 1 })
            ));
        }

        #[test]
        fn test_rejects_mixed_genome_lengths() {
            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population[1].genome.push(0.0);
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::GenomeLengthMismatch { index: 1, .. })
            ));
        }

        #[test]
        fn test_rejects_evaluations_without_fitness() {
            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population[0].fitness = None;
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::FitnessInvariant { index: 0, .. })
            ));
        }

        #[test]
        fn test_rejects_non_positive_mutation_rate() {
            // A restored rate must be usable as a Gaussian sigma right away;
            // letting a bad one through would only surface trials later,
            // when crossover or mutation touches the slot.
            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population[0].mutation_rate = -0.5;
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::RateNotPositive { index: 0, .. })
            ));

            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population[2].meta_mutation_rate = 0.0;
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::RateNotPositive { index: 2, .. })
            ));

            let mut checkpoint = PoolCheckpoint::capture(&sample_population(), 0, 8, 0.0, 1.0);
            checkpoint.population[1].mutation_rate = f64::NAN;
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::RateNotPositive { index: 1, .. })
            ));
        }

        #[test]
        fn test_rejects_trial_counter_beyond_max() {
            let checkpoint = PoolCheckpoint::capture(&sample_population(), 9, 8, 0.0, 1.0);
            assert!(matches!(
                checkpoint.restore_population(),
                Err(CheckpointError::TrialCounterOutOfRange { .. })
            ));
        }

        #[test]
        fn test_load_missing_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let store = CheckpointStore::new(dir.path().join("absent.json"));
            assert!(matches!(store.load(), Err(CheckpointError::Io { .. })));
        }
    }
}
