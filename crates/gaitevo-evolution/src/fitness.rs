use std::cmp::Ordering;

/// Leak rate of the exponential moving average applied to repeated samples.
///
/// Each new sample contributes 10% to the smoothed estimate, so an individual
/// that once scored well by measurement luck regresses toward its true
/// fitness over repeated re-evaluations without discarding its history.
pub const LEAK_RATE: f64 = 0.1;

const UNSET: f64 = f64::MIN;

/// A scalar fitness estimate that absorbs repeated noisy measurements.
///
/// Fitness trials on a physical or simulated robot are stochastic: the same
/// genome scores differently on every run. Instead of keeping only the most
/// recent measurement, `FitnessValue` leaky-averages all samples it has seen
/// (see [`LEAK_RATE`]). A fresh value is *unset*: it reports the worst
/// possible fitness and zero evaluations until the first sample arrives.
///
/// Ordering and equality consider the smoothed value only; the sample count
/// is bookkeeping, not part of the comparison.
///
/// # Examples
///
/// ```
/// use gaitevo_evolution::fitness::FitnessValue;
///
/// let mut fitness = FitnessValue::new();
/// assert_eq!(fitness.evaluations(), 0);
///
/// fitness.set_value(1.0);
/// assert_eq!(fitness.get_value(), 1.0);
///
/// fitness.set_value(2.0);
/// assert_eq!(fitness.get_value(), 0.1 * 2.0 + 0.9 * 1.0);
/// assert_eq!(fitness.evaluations(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FitnessValue {
    value: f64,
    evaluations: usize,
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self::new()
    }
}

impl FitnessValue {
    /// Creates an unset fitness value (worst possible, zero evaluations).
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: UNSET,
            evaluations: 0,
        }
    }

    /// Rebuilds a fitness value from checkpointed parts.
    ///
    /// Callers must uphold the invariant `evaluations == 0` iff the value is
    /// unset; the checkpoint loader validates this before calling.
    pub(crate) fn from_parts(value: f64, evaluations: usize) -> Self {
        debug_assert!(evaluations > 0);
        Self { value, evaluations }
    }

    /// Current smoothed estimate, or the unset sentinel (`f64::MIN`).
    #[must_use]
    pub fn get_value(&self) -> f64 {
        self.value
    }

    /// Like [`get_value`](Self::get_value), but 0.0 when unset.
    ///
    /// For display only. Never use this for ordering: an unset value must
    /// compare below every real measurement, not like a zero score.
    #[must_use]
    pub fn get_value_or_default(&self) -> f64 {
        if self.evaluations > 0 { self.value } else { 0.0 }
    }

    /// Absorbs one fitness sample.
    ///
    /// The first sample is taken verbatim; every later sample is folded in
    /// with the leaky average `value = LEAK_RATE * sample + (1 - LEAK_RATE) * value`.
    pub fn set_value(&mut self, sample: f64) {
        if self.evaluations > 0 {
            log::debug!(
                "averaging fitness: {:+.3} <- sample {sample:+.3}",
                self.value
            );
            self.value = LEAK_RATE * sample + (1.0 - LEAK_RATE) * self.value;
        } else {
            self.value = sample;
        }
        self.evaluations += 1;
    }

    /// Returns to the unset state, discarding all absorbed samples.
    pub fn reset(&mut self) {
        self.value = UNSET;
        self.evaluations = 0;
    }

    /// Number of samples absorbed so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Total order on the smoothed value, suitable for sorting.
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl PartialEq for FitnessValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for FitnessValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_is_worst_with_zero_evaluations() {
        let fitness = FitnessValue::new();
        assert_eq!(fitness.evaluations(), 0);
        assert_eq!(fitness.get_value(), f64::MIN);
        assert_eq!(fitness.get_value_or_default(), 0.0);
    }

    #[test]
    fn test_first_sample_taken_verbatim() {
        let mut fitness = FitnessValue::new();
        fitness.set_value(-0.25);
        assert_eq!(fitness.get_value(), -0.25);
        assert_eq!(fitness.evaluations(), 1);
    }

    #[test]
    fn test_leaky_average_recurrence() {
        // get_value() must equal the recurrence applied in call order.
        let samples = [1.0, 0.0, 4.0, -2.0, 0.5];
        let mut fitness = FitnessValue::new();
        let mut expected = samples[0];
        fitness.set_value(samples[0]);
        for &sample in &samples[1..] {
            fitness.set_value(sample);
            expected = LEAK_RATE * sample + (1.0 - LEAK_RATE) * expected;
        }
        assert_eq!(fitness.get_value(), expected);
        assert_eq!(fitness.evaluations(), samples.len());
    }

    #[test]
    fn test_reset_discards_history() {
        let mut fitness = FitnessValue::new();
        fitness.set_value(3.0);
        fitness.set_value(5.0);
        fitness.reset();
        assert_eq!(fitness.evaluations(), 0);
        assert_eq!(fitness.get_value(), f64::MIN);

        // A sample after reset is taken verbatim again.
        fitness.set_value(7.0);
        assert_eq!(fitness.get_value(), 7.0);
    }

    #[test]
    fn test_ordering_ignores_sample_count() {
        let mut a = FitnessValue::new();
        let mut b = FitnessValue::new();
        a.set_value(1.0);
        b.set_value(1.0);
        b.set_value(1.0);
        assert_eq!(a, b);

        b.set_value(10.0);
        assert!(b > a);
        assert!(a < b);
    }

    #[test]
    fn test_unset_orders_below_any_measurement() {
        let unset = FitnessValue::new();
        let mut measured = FitnessValue::new();
        measured.set_value(-1.0e9);
        assert!(unset < measured);
    }
}
