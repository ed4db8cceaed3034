use serde::Serialize;

use crate::MetricError;

/// Predicted survival curves for a set of subjects on a shared time grid.
///
/// `rows[i][k]` is the survival probability of subject `i` at `times[k]`.
/// Curves are step functions: the value at time `t` is taken from the last
/// grid point not after `t`, and from the first grid point for `t` before
/// the grid.
///
/// # Examples
///
/// ```
/// use survtd_metrics::SurvivalCurves;
///
/// let curves = SurvivalCurves::new(
///     vec![0.0, 1.0, 2.0],
///     vec![vec![1.0, 0.8, 0.5], vec![1.0, 0.9, 0.7]],
/// )
/// .unwrap();
/// assert_eq!(curves.survival_at(0, 1.5), 0.8);
/// assert_eq!(curves.column_at(2.0), vec![0.5, 0.7]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalCurves {
    times: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl SurvivalCurves {
    /// Builds curves, checking that the grid is non-empty and sorted and
    /// that every row covers it.
    pub fn new(times: Vec<f64>, rows: Vec<Vec<f64>>) -> Result<Self, MetricError> {
        if times.is_empty() {
            return Err(MetricError::ShapeMismatch {
                what: "survival grid points (at least)",
                expected: 1,
                actual: 0,
            });
        }
        if !times.is_sorted_by(|a, b| a <= b) {
            return Err(MetricError::UnsortedGrid);
        }
        for row in &rows {
            MetricError::check_len("survival curve length", times.len(), row.len())?;
        }
        Ok(Self { times, rows })
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, subject: usize) -> &[f64] {
        &self.rows[subject]
    }

    #[must_use]
    pub fn n_subjects(&self) -> usize {
        self.rows.len()
    }

    /// Grid index used for lookups at time `t`.
    #[must_use]
    pub fn index_at(&self, t: f64) -> usize {
        self.times.partition_point(|&g| g <= t).saturating_sub(1)
    }

    #[must_use]
    pub fn survival_at(&self, subject: usize, t: f64) -> f64 {
        self.rows[subject][self.index_at(t)]
    }

    /// Survival of every subject at time `t`.
    #[must_use]
    pub fn column_at(&self, t: f64) -> Vec<f64> {
        let idx = self.index_at(t);
        self.rows.iter().map(|row| row[idx]).collect()
    }

    /// Risk score `1 - S(t)` of every subject.
    #[must_use]
    pub fn risk_at(&self, t: f64) -> Vec<f64> {
        self.column_at(t).into_iter().map(|s| 1.0 - s).collect()
    }
}
