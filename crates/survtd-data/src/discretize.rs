use serde::{Deserialize, Serialize};
use survtd_evaluator::SurvivalLabel;
use survtd_stats::percentiles::compute_quantile;

use crate::{DataError, SurvivalFrame};

/// Event-duration quantile levels used as evaluation horizons.
pub const HORIZON_LEVELS: [f64; 3] = [0.25, 0.5, 0.75];

/// A survival label mapped onto a time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteLabel {
    pub index: usize,
    pub event: Option<usize>,
}

/// Maps continuous durations onto a strictly increasing grid of cut points.
///
/// An event at `t` goes to the first cut `>= t`. A censored duration goes to
/// the last cut `<= t`. Durations past the last cut are censored there.
///
/// # Examples
///
/// ```
/// use survtd_data::{DiscreteLabel, LabelDiscretizer};
/// use survtd_evaluator::SurvivalLabel;
///
/// let discretizer = LabelDiscretizer::equidistant(5, 8.0).unwrap();
/// assert_eq!(discretizer.cuts(), &[0.0, 2.0, 4.0, 6.0, 8.0]);
///
/// let event = discretizer.transform(SurvivalLabel::event(3.0, 0));
/// assert_eq!(event, DiscreteLabel { index: 2, event: Some(0) });
/// let censored = discretizer.transform(SurvivalLabel::censored(3.0));
/// assert_eq!(censored, DiscreteLabel { index: 1, event: None });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDiscretizer {
    cuts: Vec<f64>,
}

impl LabelDiscretizer {
    /// `n` evenly spaced cuts from `0` to `max_duration`.
    pub fn equidistant(n: usize, max_duration: f64) -> Result<Self, DataError> {
        if !(max_duration.is_finite() && max_duration > 0.0) {
            return Err(DataError::InvalidCuts {
                reason: format!("maximum duration must be positive, got {max_duration}"),
            });
        }
        if n < 2 {
            return Err(DataError::InvalidCuts {
                reason: format!("need at least 2 cuts, got {n}"),
            });
        }
        #[expect(clippy::cast_precision_loss)]
        let step = max_duration / (n - 1) as f64;
        #[expect(clippy::cast_precision_loss)]
        let mut cuts = (0..n).map(|i| i as f64 * step).collect::<Vec<_>>();
        cuts[n - 1] = max_duration;
        Ok(Self { cuts })
    }

    pub fn from_cuts(cuts: Vec<f64>) -> Result<Self, DataError> {
        if cuts.len() < 2 {
            return Err(DataError::InvalidCuts {
                reason: format!("need at least 2 cuts, got {}", cuts.len()),
            });
        }
        if cuts.iter().any(|c| !c.is_finite()) {
            return Err(DataError::InvalidCuts {
                reason: "cuts must be finite".into(),
            });
        }
        if cuts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DataError::InvalidCuts {
                reason: format!("cuts must be strictly increasing: {cuts:?}"),
            });
        }
        Ok(Self { cuts })
    }

    #[must_use]
    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    #[must_use]
    pub fn transform(&self, label: SurvivalLabel) -> DiscreteLabel {
        let last = self.cuts.len() - 1;
        if label.duration > self.cuts[last] {
            return DiscreteLabel {
                index: last,
                event: None,
            };
        }
        let index = match label.event {
            Some(_) => self.cuts.partition_point(|&c| c < label.duration),
            // a censored duration before the first cut stays at index 0
            None => self
                .cuts
                .partition_point(|&c| c <= label.duration)
                .saturating_sub(1),
        };
        DiscreteLabel {
            index,
            event: label.event,
        }
    }

    pub fn transform_all(&self, labels: &[SurvivalLabel]) -> Vec<DiscreteLabel> {
        labels.iter().map(|&l| self.transform(l)).collect()
    }
}

/// Quantiles of the event durations of `frame` at `levels`.
///
/// Fails with [`DataError::NoEvents`] when no row has an observed event.
pub fn horizon_times(frame: &SurvivalFrame, levels: &[f64]) -> Result<Vec<f64>, DataError> {
    let mut durations = frame.event_durations();
    if durations.is_empty() {
        return Err(DataError::NoEvents);
    }
    durations.sort_by(f64::total_cmp);
    Ok(levels
        .iter()
        .map(|&q| compute_quantile(&durations, q))
        .collect())
}
