use survtd_stats::survival::KaplanMeierCurve;

use crate::{EventTable, MetricError};

/// Censoring survival function `G(t) = P(C > t)` of a reference population.
///
/// Estimated with the reverse Kaplan-Meier estimator and used to build
/// inverse-probability-of-censoring weights (IPCW). `G` is undefined past the
/// largest reference time unless it has already dropped to zero.
#[derive(Debug, Clone)]
pub struct CensoringDistribution {
    curve: KaplanMeierCurve,
    max_time: f64,
}

impl CensoringDistribution {
    /// Fits the censoring distribution of `reference`.
    #[must_use]
    pub fn fit(reference: &EventTable) -> Self {
        let max_time = reference
            .time_range()
            .map_or(f64::NEG_INFINITY, |(_, hi)| hi);
        Self {
            curve: KaplanMeierCurve::reverse_from_data(reference.to_km_data()),
            max_time,
        }
    }

    /// Largest time observed in the reference population.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Evaluates `G(t)`.
    pub fn predict(&self, t: f64) -> Result<f64, MetricError> {
        if t > self.max_time {
            let tail = self.curve.final_survival();
            if tail > 0.0 {
                return Err(MetricError::TimeOutOfRange {
                    time: t,
                    lower: f64::NEG_INFINITY,
                    upper: self.max_time,
                });
            }
            return Ok(0.0);
        }
        Ok(self.curve.survival_at(t))
    }

    /// Inverse-probability-of-censoring weights for `table`.
    ///
    /// Subjects with an observed event get `1 / G(t_i)`; censored subjects
    /// get zero.
    pub fn ipcw(&self, table: &EventTable) -> Result<Vec<f64>, MetricError> {
        table
            .iter()
            .map(|r| {
                if !r.event {
                    return Ok(0.0);
                }
                let g = self.predict(r.time)?;
                if g == 0.0 {
                    return Err(MetricError::insufficient(
                        "censoring survival function is zero at one or more time points",
                    ));
                }
                Ok(1.0 / g)
            })
            .collect()
    }
}
