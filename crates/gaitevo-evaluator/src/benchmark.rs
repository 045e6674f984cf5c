use std::f64::consts::PI;

use rand::Rng;
use rand_distr::Normal;

use gaitevo_evolution::{Evaluation, FitnessValue};

/// Test surface to optimize over. All are classic minimization problems
/// with their optimum at the origin; fitness is the negated cost, so the
/// optimizer (a maximizer) drives genomes toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Objective {
    /// Sum of squares. Smooth, unimodal, the easy case.
    Sphere,
    /// Curved narrow valley; punishes coordinate-wise search.
    Rosenbrock,
    /// Highly multimodal cosine-modulated bowl.
    Rastrigin,
}

impl Objective {
    /// Cost of a genome (lower is better).
    #[must_use]
    pub fn cost(self, genome: &[f64]) -> f64 {
        match self {
            Self::Sphere => genome.iter().map(|g| g * g).sum(),
            Self::Rosenbrock => genome
                .windows(2)
                .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
                .sum(),
            Self::Rastrigin => {
                #[expect(clippy::cast_precision_loss)]
                let offset = 10.0 * genome.len() as f64;
                offset
                    + genome
                        .iter()
                        .map(|g| g * g - 10.0 * (2.0 * PI * g).cos())
                        .sum::<f64>()
            }
        }
    }
}

/// Noisy benchmark trial: negated objective cost plus Gaussian measurement
/// noise, with box constraints on the genome.
///
/// The noise generator is owned by the evaluation itself, separate from the
/// optimizer's random source, so reproducibility of the *search* does not
/// depend on reproducibility of the *measurement noise*. This mirrors a real
/// robot trial where the noise is the world's.
#[derive(Debug)]
pub struct BenchmarkEvaluation<R> {
    objective: Objective,
    noise: Option<Normal<f64>>,
    bound: f64,
    rng: R,
}

impl<R> BenchmarkEvaluation<R>
where
    R: Rng,
{
    /// Creates a benchmark trial runner.
    ///
    /// `bound` is the half-width of the symmetric box `[-bound, bound]`
    /// applied per gene in [`Evaluation::constrain`]; `noise_sigma` is the
    /// standard deviation of the measurement noise (0 for a noiseless
    /// surface).
    ///
    /// # Panics
    ///
    /// Panics if `bound` is not positive or `noise_sigma` is negative.
    #[must_use]
    pub fn new(objective: Objective, bound: f64, noise_sigma: f64, rng: R) -> Self {
        assert!(bound > 0.0, "constraint bound must be positive");
        assert!(noise_sigma >= 0.0, "noise sigma must not be negative");
        let noise = (noise_sigma > 0.0).then(|| Normal::new(0.0, noise_sigma).unwrap());
        Self {
            objective,
            noise,
            bound,
            rng,
        }
    }

    /// The surface this evaluation measures.
    #[must_use]
    pub fn objective(&self) -> Objective {
        self.objective
    }
}

impl<R> Evaluation for BenchmarkEvaluation<R>
where
    R: Rng,
{
    fn constrain(&self, genome: &mut [f64]) {
        for gene in genome {
            *gene = gene.clamp(-self.bound, self.bound);
        }
    }

    fn evaluate(&mut self, fitness: &mut FitnessValue, genome: &[f64], _random_seed: f64) -> bool {
        let mut sample = -self.objective.cost(genome);
        if let Some(noise) = self.noise {
            sample += self.rng.sample(noise);
        }
        fitness.set_value(sample);
        true
    }

    fn prepare_evaluation(&mut self, current_trial: usize, max_trials: usize) {
        log::debug!("benchmark cycle starting at trial {current_trial}/{max_trials}");
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn test_rng() -> Pcg64 {
        Pcg64::seed_from_u64(0xb13d)
    }

    mod objective {
        use super::*;

        #[test]
        fn test_all_surfaces_have_zero_cost_at_optimum() {
            assert_eq!(Objective::Sphere.cost(&[0.0; 4]), 0.0);
            assert_eq!(Objective::Rosenbrock.cost(&[1.0; 4]), 0.0);
            assert!(Objective::Rastrigin.cost(&[0.0; 4]).abs() < 1e-12);
        }

        #[test]
        fn test_sphere_cost_grows_with_distance() {
            assert_eq!(Objective::Sphere.cost(&[1.0, 2.0]), 5.0);
            assert!(Objective::Sphere.cost(&[3.0, 0.0]) > Objective::Sphere.cost(&[1.0, 0.0]));
        }

        #[test]
        fn test_objective_parses_from_str() {
            assert_eq!("sphere".parse::<Objective>().unwrap(), Objective::Sphere);
            assert_eq!(
                "rastrigin".parse::<Objective>().unwrap(),
                Objective::Rastrigin
            );
            assert!("paraboloid".parse::<Objective>().is_err());
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn test_noiseless_sample_is_negated_cost() {
            let mut eval = BenchmarkEvaluation::new(Objective::Sphere, 5.0, 0.0, test_rng());
            let mut fitness = FitnessValue::new();
            assert!(eval.evaluate(&mut fitness, &[1.0, 2.0], 0.5));
            assert_eq!(fitness.get_value(), -5.0);
            assert_eq!(fitness.evaluations(), 1);
        }

        #[test]
        fn test_noise_perturbs_repeated_measurements() {
            let mut eval = BenchmarkEvaluation::new(Objective::Sphere, 5.0, 0.5, test_rng());
            let mut first = FitnessValue::new();
            let mut second = FitnessValue::new();
            eval.evaluate(&mut first, &[1.0, 1.0], 0.0);
            eval.evaluate(&mut second, &[1.0, 1.0], 0.0);
            assert_ne!(first.get_value(), second.get_value());
        }

        #[test]
        fn test_constrain_clamps_and_is_idempotent() {
            let eval = BenchmarkEvaluation::new(Objective::Sphere, 2.0, 0.0, test_rng());
            let mut genome = [-7.0, 0.5, 3.0];
            eval.constrain(&mut genome);
            assert_eq!(genome, [-2.0, 0.5, 2.0]);

            let once = genome;
            eval.constrain(&mut genome);
            assert_eq!(genome, once);
        }

        #[test]
        #[should_panic(expected = "constraint bound must be positive")]
        fn test_non_positive_bound_rejected() {
            let _ = BenchmarkEvaluation::new(Objective::Sphere, 0.0, 0.0, test_rng());
        }
    }
}
