/// Running first and second moments of a stream of values.
///
/// Stores `(count, sum, sum of squares)` so that accumulators filled
/// independently (for example on different threads) can be combined with
/// [`RunningMoments::merge`] without keeping the raw values around.
///
/// # Examples
///
/// ```
/// # use survtd_stats::descriptive::RunningMoments;
/// let mut a = RunningMoments::default();
/// a.push(1.0);
/// a.push(2.0);
/// let mut b: RunningMoments = [3.0, 4.0, 5.0].into_iter().collect();
/// b.merge(&a);
/// assert_eq!(b.count(), 5);
/// assert_eq!(b.mean(), 3.0);
/// assert_eq!(b.sample_variance(), 2.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl RunningMoments {
    /// Adds a single observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Adds all observations of `other` to `self`.
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    /// Number of observations pushed so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean, `NaN` when empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Unbiased sample variance (denominator `n - 1`).
    ///
    /// Returns `NaN` for fewer than two observations. Small negative values
    /// caused by cancellation are clamped to zero.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        let n = self.count as f64;
        let centered = self.sum_sq - self.sum * self.sum / n;
        (centered / (n - 1.0)).max(0.0)
    }

    /// Population variance (denominator `n`), `NaN` when empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        let n = self.count as f64;
        let centered = self.sum_sq - self.sum * self.sum / n;
        (centered / n).max(0.0)
    }

    #[must_use]
    pub fn population_std_dev(&self) -> f64 {
        self.population_variance().sqrt()
    }

    /// Sample standard deviation.
    #[must_use]
    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// Standard error of the mean: `sample_std_dev / sqrt(n)`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn std_error(&self) -> f64 {
        self.sample_std_dev() / (self.count as f64).sqrt()
    }
}

impl Extend<f64> for RunningMoments {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Self::default();
        moments.extend(iter);
        moments
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_empty_moments() {
        let moments = RunningMoments::default();
        assert_eq!(moments.count(), 0);
        assert!(moments.mean().is_nan());
        assert!(moments.sample_variance().is_nan());
    }

    #[test]
    fn test_single_value_has_no_variance() {
        let moments: RunningMoments = std::iter::once(4.0).collect();
        assert_eq!(moments.mean(), 4.0);
        assert!(moments.sample_variance().is_nan());
    }

    #[test]
    fn test_constant_values() {
        let moments: RunningMoments = std::iter::repeat_n(0.3, 50).collect();
        assert_abs_diff_eq!(moments.mean(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(moments.sample_variance(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moments.std_error(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let values = [0.61, 0.58, 0.66, 0.70, 0.52, 0.64, 0.59];
        let all: RunningMoments = values.iter().copied().collect();

        let mut left: RunningMoments = values[..3].iter().copied().collect();
        let right: RunningMoments = values[3..].iter().copied().collect();
        left.merge(&right);

        assert_eq!(left.count(), all.count());
        assert_abs_diff_eq!(left.mean(), all.mean(), epsilon = 1e-12);
        assert_abs_diff_eq!(left.sample_variance(), all.sample_variance(), epsilon = 1e-12);
    }

    #[test]
    fn test_population_variance() {
        let moments: RunningMoments = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .collect();
        assert_abs_diff_eq!(moments.population_variance(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moments.population_std_dev(), 2.0, epsilon = 1e-12);

        let single: RunningMoments = std::iter::once(4.0).collect();
        assert_eq!(single.population_variance(), 0.0);
        assert!(RunningMoments::default().population_variance().is_nan());
    }

    #[test]
    fn test_std_error() {
        let moments: RunningMoments = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .collect();
        // sample variance = 32 / 7
        assert_abs_diff_eq!(moments.sample_variance(), 32.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            moments.std_error(),
            (32.0_f64 / 7.0).sqrt() / 8.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }
}
