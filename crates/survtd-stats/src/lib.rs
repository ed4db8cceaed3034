//! Statistical building blocks for survival-model evaluation.
//!
//! This crate provides the small numeric tools the evaluation crates are
//! assembled from:
//!
//! - **Survival analysis**: Kaplan-Meier estimator for right-censored data, in
//!   both the usual form and the reversed form that estimates the censoring
//!   distribution
//! - **Running moments**: mergeable (count, sum, sum of squares) accumulators
//! - **Quantiles**: linear-interpolation quantiles of sorted samples
//! - **Intervals**: two-sided Student-t confidence intervals
//!
//! # Modules
//!
//! - [`survival`]: Kaplan-Meier survival curves
//! - [`descriptive`]: Running moments with sample variance and standard error
//! - [`percentiles`]: Quantile computation and storage
//! - [`interval`]: Student-t confidence intervals
//!
//! # Examples
//!
//! ## Analyzing survival data
//!
//! ```
//! use survtd_stats::survival::KaplanMeierCurve;
//!
//! // Data: (time, is_censored)
//! let data = vec![
//!     (1.5, false), // Event occurred at time 1.5
//!     (2.0, true),  // Censored at time 2.0
//!     (3.0, false), // Event occurred at time 3.0
//! ];
//! let curve = KaplanMeierCurve::from_data(data);
//! assert_eq!(curve.survival_at(0.5), 1.0);
//! ```
//!
//! ## Summarizing a bootstrap distribution
//!
//! ```
//! use survtd_stats::{descriptive::RunningMoments, interval::t_interval};
//!
//! let moments: RunningMoments = [0.70, 0.72, 0.68, 0.71].into_iter().collect();
//! let ci = t_interval(moments.mean(), moments.std_error(), moments.count() - 1, 0.95).unwrap();
//! assert!(ci.lower < moments.mean() && moments.mean() < ci.upper);
//! ```

pub mod descriptive;
pub mod interval;
pub mod percentiles;
pub mod survival;
