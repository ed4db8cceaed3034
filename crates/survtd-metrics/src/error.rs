/// Failures raised by the metric routines.
///
/// None of these are recovered inside this crate: a failure for one horizon
/// aborts the whole computation and reaches the caller unchanged.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MetricError {
    /// The event/censoring mix cannot support censoring-weighted estimation.
    #[display("insufficient data: {reason}")]
    InsufficientData { reason: String },
    /// Two inputs that must line up have different lengths.
    #[display("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// No pair of subjects can be ordered under censoring.
    #[display("data has no comparable pairs, cannot estimate concordance index")]
    NoComparablePairs,
    /// An evaluation time lies outside the range the estimator supports.
    #[display("time {time} must lie within [{lower}, {upper})")]
    TimeOutOfRange { time: f64, lower: f64, upper: f64 },
    /// A duration is negative or not finite.
    #[display("duration {duration} of subject {index} is negative or not finite")]
    InvalidDuration { index: usize, duration: f64 },
    /// Survival grid times are not sorted in ascending order.
    #[display("survival grid times must be sorted in ascending order")]
    UnsortedGrid,
}

impl MetricError {
    pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
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
