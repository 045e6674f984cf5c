use crate::fitness::FitnessValue;

/// External fitness trial for one genome.
///
/// The optimizer drives the trial loop; everything behind this trait (the
/// robot or simulator, its transport, the controller built from the genome)
/// is the implementor's business. A trial is a blocking call and may take
/// arbitrarily long.
pub trait Evaluation {
    /// Repairs the genome in place before evaluation, e.g. clamping weights
    /// to actuator-valid ranges. Must be idempotent: constraining an already
    /// constrained genome is a no-op. The default does nothing.
    fn constrain(&self, genome: &mut [f64]) {
        let _ = genome;
    }

    /// Runs one trial and writes exactly one fitness sample via
    /// `fitness.set_value(..)`.
    ///
    /// `random_seed` is a uniform draw in `[0, 1)` from the optimizer's RNG,
    /// available to randomize trial conditions reproducibly. Returns `false`
    /// when the trial could not produce a usable result; in that case no
    /// sample may be written.
    fn evaluate(&mut self, fitness: &mut FitnessValue, genome: &[f64], random_seed: f64) -> bool;

    /// Hook invoked once per full population cycle, before that cycle's
    /// first evaluation. The default does nothing.
    fn prepare_evaluation(&mut self, current_trial: usize, max_trials: usize) {
        let _ = (current_trial, max_trials);
    }
}
