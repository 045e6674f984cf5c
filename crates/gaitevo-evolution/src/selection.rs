//! Bias-weighted random parent selection.
//!
//! Steady-state evolution picks parents from the sorted pool with a skew
//! toward the better-ranked end. The skew is a tanh transform of a uniform
//! draw: `tanh(bias * x) / tanh(bias)` maps `[0, 1]` onto itself while
//! bending probability mass toward 1, and a larger `bias` bends harder.
//! With the pool sorted ascending (best at the highest index), mapping the
//! transformed value to an index therefore concentrates selection on the
//! best individuals.

use rand::Rng;

/// Applies the tanh skew to a uniform draw `x` in `[0, 1]`.
///
/// Monotone in `x`; the result stays in `[0, 1]`. A larger `bias` pushes
/// mass toward 1, `bias -> 0` degenerates to the identity (uniform pick).
///
/// # Panics
///
/// Panics if `bias` is not positive.
#[must_use]
pub fn biased_value(x: f64, bias: f64) -> f64 {
    assert!(bias > 0.0, "selection bias must be positive");
    (bias * x).tanh() / bias.tanh()
}

/// Draws a pool index skewed toward the upper (better-ranked) end.
///
/// # Panics
///
/// Panics if `len` is zero or `bias` is not positive.
#[must_use]
pub fn biased_index<R>(len: usize, bias: f64, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(len > 0, "cannot select from an empty pool");
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (biased_value(rng.random_range(0.0..1.0), bias) * len as f64).floor() as usize;
    // x = 1.0 is excluded, but guard the boundary anyway.
    index.min(len - 1)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_biased_value_fixes_endpoints() {
        for bias in [0.1, 1.0, 3.5] {
            assert_eq!(biased_value(0.0, bias), 0.0);
            assert!((biased_value(1.0, bias) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_biased_value_is_monotone() {
        let bias = 2.0;
        let mut previous = 0.0;
        for step in 1..=100 {
            let x = f64::from(step) / 100.0;
            let value = biased_value(x, bias);
            assert!(value > previous);
            previous = value;
        }
    }

    #[test]
    fn test_larger_bias_skews_harder_toward_one() {
        let x = 0.5;
        assert!(biased_value(x, 3.0) > biased_value(x, 1.0));
        assert!(biased_value(x, 1.0) > x * 1.001 - 0.001);
    }

    #[test]
    fn test_biased_index_favors_upper_end() {
        let mut rng = Pcg64::seed_from_u64(7);
        let len = 10;
        let draws = 20_000;
        let upper_half = (0..draws)
            .filter(|_| biased_index(len, 2.0, &mut rng) >= len / 2)
            .count();
        // tanh(2x)/tanh(2) crosses 0.5 well below x = 0.5, so a clear
        // majority of draws must land in the upper half.
        assert!(upper_half > draws * 6 / 10, "upper_half = {upper_half}");
    }

    #[test]
    fn test_biased_index_stays_in_bounds() {
        let mut rng = Pcg64::seed_from_u64(8);
        for _ in 0..10_000 {
            assert!(biased_index(5, 4.0, &mut rng) < 5);
        }
    }

    #[test]
    #[should_panic(expected = "selection bias must be positive")]
    fn test_non_positive_bias_rejected() {
        let _ = biased_value(0.5, 0.0);
    }
}
