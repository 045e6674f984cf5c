use rand::Rng;
use rand_distr::Normal;

use crate::fitness::FitnessValue;

/// Smallest admissible mutation rate.
///
/// Self-adaptation perturbs the mutation rate itself, which could otherwise
/// drive it to zero or below and freeze the search permanently.
pub const MUTATION_RATE_FLOOR: f64 = 1.0e-10;

/// One candidate solution: a fixed-length genome plus its noisy fitness
/// estimate and a self-adaptive mutation-rate pair.
///
/// The genome encodes motor-controller weights as plain `f64`s; its length is
/// fixed at construction and identical across the whole population. The
/// mutation rate is part of the evolving state (evolution-strategy style
/// step-size control): [`mutate`](Self::mutate) perturbs the genome scaled by
/// `mutation_rate` and then perturbs `mutation_rate` itself scaled by
/// `meta_mutation_rate`, so step sizes that produce surviving offspring
/// propagate with them.
///
/// Fields are crate-visible so the crossover constructor and the trial loop
/// can reach the fitness internals directly; external consumers go through
/// the read accessors.
#[derive(Debug, Clone)]
pub struct Individual {
    pub(crate) genome: Vec<f64>,
    pub(crate) fitness: FitnessValue,
    pub(crate) mutation_rate: f64,
    pub(crate) meta_mutation_rate: f64,
}

impl Individual {
    /// Creates an individual with a uniform random genome in `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `genome_len` is zero or either rate is not positive.
    #[must_use]
    pub fn random<R>(
        rng: &mut R,
        genome_len: usize,
        mutation_rate: f64,
        meta_mutation_rate: f64,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(genome_len > 0, "genome must not be empty");
        assert!(mutation_rate > 0.0, "mutation rate must be positive");
        assert!(meta_mutation_rate > 0.0, "meta mutation rate must be positive");
        let genome = (0..genome_len).map(|_| rng.random_range(-1.0..=1.0)).collect();
        Self {
            genome,
            fitness: FitnessValue::new(),
            mutation_rate,
            meta_mutation_rate,
        }
    }

    /// Crossover construction: a child bred from two parents.
    ///
    /// Every genome position is drawn from one parent chosen by fair coin
    /// (uniform crossover), so the operator is symmetric in
    /// (`mother`, `father`). The child's mutation-rate pair is the geometric
    /// mean of the parents' rates rather than a verbatim copy, which keeps
    /// the step sizes themselves under selection. The child's fitness starts
    /// unset.
    ///
    /// # Panics
    ///
    /// Panics if the parents' genome lengths differ.
    #[must_use]
    pub fn from_crossover<R>(mother: &Self, father: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            mother.genome.len(),
            father.genome.len(),
            "parents must have equal genome length"
        );
        let genome = mother
            .genome
            .iter()
            .zip(&father.genome)
            .map(|(&m, &f)| if rng.random_bool(0.5) { m } else { f })
            .collect();
        Self {
            genome,
            fitness: FitnessValue::new(),
            mutation_rate: (mother.mutation_rate * father.mutation_rate).sqrt(),
            meta_mutation_rate: (mother.meta_mutation_rate * father.meta_mutation_rate).sqrt(),
        }
    }

    /// Perturbs the genome and the mutation rate in place.
    ///
    /// Each gene receives independent zero-mean Gaussian noise with standard
    /// deviation `mutation_rate`; afterwards `mutation_rate` receives noise
    /// with standard deviation `meta_mutation_rate` and is clamped to
    /// [`MUTATION_RATE_FLOOR`].
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let gene_noise = Normal::new(0.0, self.mutation_rate).unwrap();
        for gene in &mut self.genome {
            *gene += rng.sample(gene_noise);
        }
        let rate_noise = Normal::new(0.0, self.meta_mutation_rate).unwrap();
        self.mutation_rate = (self.mutation_rate + rng.sample(rate_noise)).max(MUTATION_RATE_FLOOR);
    }

    /// Overwrites the genome from an externally supplied seed vector.
    ///
    /// # Panics
    ///
    /// Panics if the seed length differs from the genome length; a mismatched
    /// seed is a programming error, not a runtime condition.
    pub fn initialize_from_seed(&mut self, seed: &[f64]) {
        assert_eq!(
            seed.len(),
            self.genome.len(),
            "seed length {} does not match genome length {}",
            seed.len(),
            self.genome.len()
        );
        self.genome.copy_from_slice(seed);
    }

    /// The genome being optimized.
    #[must_use]
    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    /// The smoothed fitness estimate.
    #[must_use]
    pub fn fitness(&self) -> &FitnessValue {
        &self.fitness
    }

    /// Current self-adaptive mutation step size.
    #[must_use]
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Step size applied to the mutation rate itself.
    #[must_use]
    pub fn meta_mutation_rate(&self) -> f64 {
        self.meta_mutation_rate
    }

    /// Genome length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genome.len()
    }

    /// Always false: empty genomes are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genome.is_empty()
    }
}
