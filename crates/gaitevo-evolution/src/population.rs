use std::ops::{Index, IndexMut};

use rand::Rng;

use crate::individual::Individual;

/// Fixed-capacity ordered pool of individuals.
///
/// The pool is created once at full size and never grows or shrinks;
/// steady-state evolution replaces members one slot at a time.
/// [`sort_by_fitness`](Self::sort_by_fitness) orders ascending, so index 0
/// holds the worst individual and the last index the best. Indices stay
/// stable between a sort and the next mutation of a slot within one trial,
/// which is all the replacement search relies on.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates a pool of random individuals.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not at least 2 (a pool of one cannot select two
    /// parents) or if the individual constraints are violated.
    #[must_use]
    pub fn random<R>(
        rng: &mut R,
        size: usize,
        genome_len: usize,
        mutation_rate: f64,
        meta_mutation_rate: f64,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(size > 1, "population needs at least two individuals");
        let individuals = (0..size)
            .map(|_| Individual::random(rng, genome_len, mutation_rate, meta_mutation_rate))
            .collect();
        Self { individuals }
    }

    /// Builds a pool from existing individuals (checkpoint restore path).
    ///
    /// # Panics
    ///
    /// Panics if fewer than two individuals are given or their genome
    /// lengths differ.
    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        assert!(
            individuals.len() > 1,
            "population needs at least two individuals"
        );
        let genome_len = individuals[0].len();
        assert!(
            individuals.iter().all(|ind| ind.len() == genome_len),
            "all genomes must have equal length"
        );
        Self { individuals }
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    /// Iterates the pool in slot order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    /// Re-orders ascending by fitness: worst at index 0, best at the end.
    pub fn sort_by_fitness(&mut self) {
        self.individuals
            .sort_by(|a, b| a.fitness.cmp_value(&b.fitness));
    }

    /// The individual in the best-fitness slot.
    ///
    /// Meaningful after [`sort_by_fitness`](Self::sort_by_fitness); between
    /// sorts it simply returns the last slot.
    #[must_use]
    pub fn best_individual(&self) -> &Individual {
        self.individuals
            .last()
            .expect("population is never empty")
    }

    /// Index of the best-fitness slot.
    #[must_use]
    pub fn best_index(&self) -> usize {
        self.individuals.len() - 1
    }
}

impl Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Individual {
        &self.individuals[index]
    }
}

impl IndexMut<usize> for Population {
    fn index_mut(&mut self, index: usize) -> &mut Individual {
        &mut self.individuals[index]
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}

/// Bottom-up replacement search over an ascending-sorted population.
///
/// Scans from the worst slot upward and returns the best-ranked slot whose
/// fitness is still strictly lower than the challenger's. This is a
/// one-sided tournament with two guarantees: an individual better than the
/// challenger is never evicted, and among the eligible (worse) slots the one
/// closest in rank to the challenger is evicted, which disturbs the fitness
/// distribution the least.
///
/// When several eligible slots share that challenger-adjacent fitness, the
/// lowest index among them is returned. When no slot qualifies (the
/// challenger is worse than everyone) the worst slot 0 is returned as a
/// bookkeeping default; callers must still compare fitness before
/// overwriting.
#[must_use]
pub fn replacement_candidate(challenger: &Individual, population: &Population) -> usize {
    let mut candidate = 0;
    for index in 0..population.size() {
        if population[index].fitness < challenger.fitness {
            // Ties share a fitness value; keep the first slot of the run.
            if index == 0 || population[index].fitness != population[candidate].fitness {
                candidate = index;
            }
        } else {
            break;
        }
    }
    candidate
}
