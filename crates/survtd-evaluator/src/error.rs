use survtd_metrics::MetricError;
use survtd_stats::interval::IntervalError;

/// Failures of an evaluation call.
///
/// Nothing is retried: the first failing horizon, risk or bootstrap
/// iteration aborts the call and its error reaches the caller.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    /// The event/censoring mix prevents metric computation.
    #[display("insufficient data: {reason}")]
    InsufficientData { reason: String },
    /// Too few bootstrap iterations to estimate an interval.
    #[display("bootstrap needs at least 2 samples to estimate an interval, got {nb_bootstrap}")]
    InsufficientSamples { nb_bootstrap: usize },
    #[display("confidence must lie strictly between 0 and 1, got {confidence}")]
    InvalidConfidence { confidence: f64 },
    /// Covariate, label or prediction dimensions disagree.
    #[display("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },
    /// Any other failure of the underlying metric routines.
    #[display("{_0}")]
    Metric(MetricError),
}

impl EvaluationError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn from_interval(err: IntervalError, nb_bootstrap: usize) -> Self {
        match err {
            IntervalError::InvalidConfidence { confidence } => {
                Self::InvalidConfidence { confidence }
            }
            IntervalError::NoDegreesOfFreedom => Self::InsufficientSamples { nb_bootstrap },
        }
    }

    pub(crate) fn check_len(
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

impl From<MetricError> for EvaluationError {
    fn from(err: MetricError) -> Self {
        match err {
            MetricError::InsufficientData { reason } => Self::InsufficientData { reason },
            MetricError::ShapeMismatch {
                what,
                expected,
                actual,
            } => Self::ShapeMismatch {
                what,
                expected,
                actual,
            },
            err => Self::Metric(err),
        }
    }
}
