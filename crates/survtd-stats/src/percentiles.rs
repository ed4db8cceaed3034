/// Precomputed quantile values for a dataset.
///
/// Quantile levels are expressed as fractions in `[0, 1]` and values are
/// computed with linear interpolation between order statistics.
///
/// # Examples
///
/// ```
/// use survtd_stats::percentiles::Quantiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let quantiles = Quantiles::new(&values, &[0.25, 0.5, 0.75]);
///
/// assert_eq!(quantiles.get(0.5), Some(3.0));
/// assert_eq!(quantiles.values(), vec![2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Quantiles {
    /// (level, value) pairs in the order the levels were requested.
    values: Vec<(f64, f64)>,
}

impl Quantiles {
    /// Computes quantiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], levels: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = levels
            .iter()
            .map(|&q| (q, compute_quantile(sorted_values, q)))
            .collect();
        Self { values }
    }

    /// Computes quantiles from unsorted values.
    #[must_use]
    pub fn new(values: &[f64], levels: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, levels)
    }

    /// Gets the value at a specific level.
    ///
    /// Returns `None` if the level was not precomputed.
    #[must_use]
    pub fn get(&self, level: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(q, _)| (*q - level).abs() < f64::EPSILON)
            .map(|(_, value)| *value)
    }

    /// Returns the quantile values in request order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().map(|(_, value)| *value).collect()
    }

    /// Returns an iterator over all (level, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single quantile from sorted data.
///
/// Uses linear interpolation between the two closest ranks: position
/// `q * (n - 1)` in the sorted sample.
///
/// # Returns
///
/// The interpolated value. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use survtd_stats::percentiles::compute_quantile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_quantile(&values, 0.5), 2.5);
/// assert_eq!(compute_quantile(&values, 0.0), 1.0);
/// assert_eq!(compute_quantile(&values, 1.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_quantile(sorted_values: &[f64], q: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted_values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted_values.len() - 1);
    let frac = pos - lo as f64;
    sorted_values[lo] + (sorted_values[hi] - sorted_values[lo]) * frac
}
