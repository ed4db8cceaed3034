//! Student-t confidence intervals for a sample mean.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// A closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Distance from the center to either bound.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum IntervalError {
    #[display("confidence level must lie in (0, 1), got {confidence}")]
    InvalidConfidence { confidence: f64 },
    #[display("at least one degree of freedom is required")]
    NoDegreesOfFreedom,
}

/// Checks that `confidence` lies strictly between 0 and 1.
pub fn check_confidence(confidence: f64) -> Result<(), IntervalError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(IntervalError::InvalidConfidence { confidence })
    }
}

/// Computes the two-sided Student-t interval `mean ± t(df, (1 + c) / 2) * std_error`.
///
/// A zero standard error collapses the interval onto the mean. A `NaN` mean
/// or standard error yields `NaN` bounds.
///
/// # Examples
///
/// ```
/// use survtd_stats::interval::t_interval;
///
/// let ci = t_interval(10.0, 1.0, 10_000, 0.95).unwrap();
/// // close to the normal quantile for large df
/// assert!((ci.half_width() - 1.959_964).abs() < 1e-3);
/// ```
pub fn t_interval(
    mean: f64,
    std_error: f64,
    df: usize,
    confidence: f64,
) -> Result<ConfidenceInterval, IntervalError> {
    check_confidence(confidence)?;
    if df == 0 {
        return Err(IntervalError::NoDegreesOfFreedom);
    }
    if std_error == 0.0 {
        return Ok(ConfidenceInterval {
            lower: mean,
            upper: mean,
        });
    }

    #[expect(clippy::cast_precision_loss)]
    let dist =
        StudentsT::new(0.0, 1.0, df as f64).map_err(|_| IntervalError::NoDegreesOfFreedom)?;
    let critical = dist.inverse_cdf(f64::midpoint(1.0, confidence));
    let half_width = critical * std_error;
    Ok(ConfidenceInterval {
        lower: mean - half_width,
        upper: mean + half_width,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_rejects_bad_confidence() {
        for confidence in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                t_interval(0.0, 1.0, 10, confidence),
                Err(IntervalError::InvalidConfidence { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_zero_df() {
        assert_eq!(
            t_interval(0.0, 1.0, 0, 0.95),
            Err(IntervalError::NoDegreesOfFreedom)
        );
    }

    #[test]
    fn test_known_critical_values() {
        // t(0.975, 9) = 2.262157
        let ci = t_interval(0.0, 1.0, 9, 0.95).unwrap();
        assert_abs_diff_eq!(ci.upper, 2.262_157, epsilon = 1e-4);
        assert_abs_diff_eq!(ci.lower, -2.262_157, epsilon = 1e-4);
        // t(0.95, 199) = 1.652547
        let ci = t_interval(1.0, 0.1, 199, 0.90).unwrap();
        assert_abs_diff_eq!(ci.half_width(), 0.165_254_7, epsilon = 1e-4);
        assert!(ci.contains(1.0));
    }

    #[test]
    fn test_zero_std_error_collapses() {
        let ci = t_interval(0.42, 0.0, 5, 0.95).unwrap();
        assert_eq!(ci.lower, 0.42);
        assert_eq!(ci.upper, 0.42);
    }
}
