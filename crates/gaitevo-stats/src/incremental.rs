/// Incremental min/avg/max accumulator over a stream of `f64` samples.
///
/// Samples are fed one at a time with [`add_sample`](Self::add_sample);
/// [`update_average`](Self::update_average) derives the mean from the
/// accumulated sum. The accumulator is reusable: [`reset`](Self::reset)
/// returns it to the empty state.
///
/// An empty accumulator reports `min = f64::MAX`, `max = f64::MIN` and
/// `avg = 0.0`; callers that care must check [`num_samples`](Self::num_samples).
///
/// # Examples
///
/// ```
/// use gaitevo_stats::SampleStats;
///
/// let mut stats = SampleStats::new();
/// for sample in [3.0, 1.0, 2.0] {
///     stats.add_sample(sample);
/// }
/// stats.update_average();
/// assert_eq!(stats.min, 1.0);
/// assert_eq!(stats.max, 3.0);
/// assert_eq!(stats.avg, 2.0);
/// assert_eq!(stats.num_samples(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SampleStats {
    /// Smallest sample seen since the last reset.
    pub min: f64,
    /// Largest sample seen since the last reset.
    pub max: f64,
    /// Mean of all samples, valid after [`update_average`](Self::update_average).
    pub avg: f64,
    sum: f64,
    num_samples: usize,
}

impl Default for SampleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStats {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
            avg: 0.0,
            sum: 0.0,
            num_samples: 0,
        }
    }

    /// Returns the accumulator to the empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one sample into the accumulator.
    pub fn add_sample(&mut self, sample: f64) {
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
        self.sum += sample;
        self.num_samples += 1;
    }

    /// Derives the mean from the samples accumulated so far.
    ///
    /// Leaves `avg` at 0.0 when no samples have been added.
    #[expect(clippy::cast_precision_loss)]
    pub fn update_average(&mut self) {
        if self.num_samples > 0 {
            self.avg = self.sum / self.num_samples as f64;
        }
    }

    /// Number of samples accumulated since the last reset.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator() {
        let mut stats = SampleStats::new();
        stats.update_average();
        assert_eq!(stats.num_samples(), 0);
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.min, f64::MAX);
        assert_eq!(stats.max, f64::MIN);
    }

    #[test]
    fn test_single_sample() {
        let mut stats = SampleStats::new();
        stats.add_sample(-0.5);
        stats.update_average();
        assert_eq!(stats.min, -0.5);
        assert_eq!(stats.max, -0.5);
        assert_eq!(stats.avg, -0.5);
        assert_eq!(stats.num_samples(), 1);
    }

    #[test]
    fn test_min_max_track_extremes() {
        let mut stats = SampleStats::new();
        for sample in [0.0, -3.0, 7.0, 2.0] {
            stats.add_sample(sample);
        }
        assert_eq!(stats.min, -3.0);
        assert_eq!(stats.max, 7.0);
    }

    #[test]
    fn test_reset_clears_previous_samples() {
        let mut stats = SampleStats::new();
        stats.add_sample(10.0);
        stats.update_average();
        stats.reset();
        stats.add_sample(2.0);
        stats.add_sample(4.0);
        stats.update_average();
        assert_eq!(stats.avg, 3.0);
        assert_eq!(stats.num_samples(), 2);
    }
}
