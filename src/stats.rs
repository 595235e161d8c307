use serde::Serialize;

/// Mean, median and sample standard deviation of one group's feature values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureStats {
    /// Number of non-missing values the statistics were computed over.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl FeatureStats {
    /// Computes the three statistics over `values`. Sorts a private copy for the median.
    ///
    /// Empty input yields NaN for every statistic; a single value yields NaN std.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = mean(&sorted);
        FeatureStats {
            count: sorted.len(),
            mean,
            median: median_sorted(&sorted),
            std: sample_stddev(&sorted, mean),
        }
    }
}

/// Computes the arithmetic mean of a slice of values. Returns NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of values already sorted ascending; the two middle values are
/// averaged for even lengths. Returns NaN for empty input.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Computes the sample standard deviation (N-1 denominator) given a
/// pre-computed mean. Returns NaN for fewer than two values.
pub fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_mean_normal_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median_sorted(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median_sorted(&[10.0, 20.0]), 15.0);
        assert_eq!(median_sorted(&[1.0, 2.0, 4.0, 100.0]), 3.0);
        assert!(median_sorted(&[]).is_nan());
    }

    #[test]
    fn test_sample_stddev_uses_bessel_correction() {
        assert!(approx(sample_stddev(&[1.0, 2.0, 3.0], 2.0), 1.0));
        assert!(approx(
            sample_stddev(&[10.0, 20.0], 15.0),
            7.0710678118654755
        ));
    }

    #[test]
    fn test_sample_stddev_single_value_is_nan() {
        assert!(sample_stddev(&[42.0], 42.0).is_nan());
    }

    #[test]
    fn test_from_values_unsorted_input() {
        let stats = FeatureStats::from_values(&[3.0, 1.0, 2.0]);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.median, 2.0);
        assert!(approx(stats.std, 1.0));
    }

    #[test]
    fn test_from_values_empty() {
        let stats = FeatureStats::from_values(&[]);

        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.median.is_nan());
        assert!(stats.std.is_nan());
    }
}
