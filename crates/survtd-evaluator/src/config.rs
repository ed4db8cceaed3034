use serde::{Deserialize, Serialize};
use survtd_metrics::Horizon;

use crate::EvaluationError;

/// Discretization and outcome structure a survival model was built for.
///
/// `duration_index` holds the discretized time boundaries, including both
/// endpoints. Every interior boundary is an evaluation horizon, labelled by
/// the matching entry of `horizons`.
///
/// # Examples
///
/// ```
/// use survtd_evaluator::{ModelConfig, RiskMode};
///
/// let config = ModelConfig {
///     duration_index: vec![0.0, 10.0, 20.0, 30.0, 45.0],
///     horizons: vec!["0.25".into(), "0.5".into(), "0.75".into()],
///     num_event: 1,
/// };
/// config.validate().unwrap();
/// assert_eq!(config.risk_mode(), RiskMode::Single);
///
/// let horizons = config.evaluation_horizons();
/// assert_eq!(horizons[1].label, "0.5");
/// assert_eq!(horizons[1].time, 20.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub duration_index: Vec<f64>,
    pub horizons: Vec<String>,
    pub num_event: usize,
}

/// How many event types a model distinguishes, decided once from its config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskMode {
    Single,
    /// `n > 1` mutually exclusive event types.
    Competing(usize),
}

impl RiskMode {
    #[must_use]
    pub fn num_event(self) -> usize {
        match self {
            RiskMode::Single => 1,
            RiskMode::Competing(n) => n,
        }
    }
}

impl ModelConfig {
    /// Checks the grid, horizon labels and event count against each other.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if self.num_event == 0 {
            return Err(EvaluationError::invalid_config(
                "num_event must be at least 1",
            ));
        }
        if self.duration_index.len() < 2 {
            return Err(EvaluationError::invalid_config(format!(
                "duration_index needs both endpoints, got {} point(s)",
                self.duration_index.len()
            )));
        }
        if !self.duration_index.iter().all(|t| t.is_finite())
            || !self.duration_index.is_sorted_by(|a, b| a < b)
        {
            return Err(EvaluationError::invalid_config(
                "duration_index must be finite and strictly increasing",
            ));
        }
        EvaluationError::check_len(
            "horizon labels",
            self.duration_index.len() - 2,
            self.horizons.len(),
        )
    }

    #[must_use]
    pub fn risk_mode(&self) -> RiskMode {
        if self.num_event > 1 {
            RiskMode::Competing(self.num_event)
        } else {
            RiskMode::Single
        }
    }

    /// Interior grid points paired with their labels, in grid order.
    #[must_use]
    pub fn evaluation_horizons(&self) -> Vec<Horizon> {
        self.horizons
            .iter()
            .zip(self.duration_index.iter().skip(1))
            .map(|(label, &time)| Horizon::new(label.clone(), time))
            .collect()
    }
}
