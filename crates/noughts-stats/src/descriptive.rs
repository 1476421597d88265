use std::fmt;

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a non-empty dataset of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values.
    pub count: usize,
    pub min: f32,
    pub max: f32,
    /// Arithmetic mean.
    pub mean: f32,
    /// Middle value, or the midpoint of the two middle values for an even count.
    pub median: f32,
    /// Population variance.
    pub variance: f32,
    pub std_dev: f32,
    /// `std_dev / (max - min)`, or `0.0` when every value is the same.
    ///
    /// Useful as a convergence indicator: it drops as a population's scores
    /// concentrate, independently of the score scale.
    pub normalized_std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// Returns `None` for an empty dataset.
    ///
    /// # Examples
    ///
    /// ```
    /// # use noughts_stats::descriptive::DescriptiveStats;
    /// let sizes = [20.0, 35.0, 27.0];
    /// let stats = DescriptiveStats::new(sizes).unwrap();
    /// assert_eq!(stats.min, 20.0);
    /// assert_eq!(stats.median, 27.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from values sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let mean = sorted_values.iter().sum::<f32>() / n;
        let half = count / 2;
        let median = if count % 2 == 0 {
            f32::midpoint(sorted_values[half - 1], sorted_values[half])
        } else {
            sorted_values[half]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let std_dev = variance.sqrt();
        let range = max - min;
        // relative to the mean, so large constant scores count as a zero range
        let normalized_std_dev = if range <= mean.abs() * f32::EPSILON {
            0.0
        } else {
            std_dev / range
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            normalized_std_dev,
        })
    }
}

impl fmt::Display for DescriptiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        write!(
            f,
            "min {:.p$}, max {:.p$}, mean {:.p$}, median {:.p$}, std dev {:.p$}",
            self.min,
            self.max,
            self.mean,
            self.median,
            self.std_dev,
            p = precision
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty() {
        assert!(DescriptiveStats::new([]).is_none());
        assert!(DescriptiveStats::from_sorted(&[]).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([4.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert!((stats.median - 4.0).abs() < f32::EPSILON);
        assert!(stats.variance.abs() < f32::EPSILON);
        assert!(stats.normalized_std_dev.abs() < f32::EPSILON);
    }

    #[test]
    fn test_even_count_median() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((stats.median - 2.5).abs() < f32::EPSILON);
        assert!((stats.mean - 2.5).abs() < f32::EPSILON);
        assert!((stats.variance - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_constant_values() {
        let stats = DescriptiveStats::new([1000.0; 8]).unwrap();
        assert!(stats.normalized_std_dev.abs() < f32::EPSILON);
        assert!(stats.std_dev.abs() < f32::EPSILON);
    }

    #[test]
    fn test_display() {
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            format!("{stats:.1}"),
            "min 1.0, max 3.0, mean 2.0, median 2.0, std dev 0.8"
        );
    }

    proptest! {
        #[test]
        fn stats_are_bounded(values in prop::collection::vec(-1000.0_f32..1000.0, 1..50)) {
            let stats = DescriptiveStats::new(values.iter().copied()).unwrap();
            prop_assert_eq!(stats.count, values.len());
            prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
            prop_assert!(stats.min - 1e-3 <= stats.mean && stats.mean <= stats.max + 1e-3);
            prop_assert!(stats.variance >= 0.0);
            prop_assert!((0.0..=1.0).contains(&stats.normalized_std_dev));
        }
    }
}
