//! Evaluation of survival models with time-dependent metrics.
//!
//! A model is scored against a test population at a fixed list of horizons
//! (the interior points of its discretized time grid). Metrics are computed
//! by [`survtd_metrics`], weighted by the censoring distribution of a
//! training population fixed when the evaluator is built.
//!
//! # Architecture
//!
//! ```text
//! Evaluator (facade, risk mode decided once from ModelConfig)
//!     ├── SingleRiskEvaluator      whole-curve C-td + per-horizon metrics
//!     ├── CompetingRiskEvaluator   per-horizon metrics for every event type
//!     └── BootstrapAggregator      resample, re-score, mean and t-interval
//! ```
//!
//! # Metric names
//!
//! | mode            | names                                                          |
//! |-----------------|----------------------------------------------------------------|
//! | single risk     | `C-td-full`, `{h}_Ctd_ipcw`, `{h}_brier`, `{h}_auroc`          |
//! | competing risks | `{h}_ipcw_{r}`, `{h}_brier_{r}`, `{h}_auroc_{r}`               |
//!
//! where `{h}` is a horizon label from [`ModelConfig::horizons`] and `{r}` a
//! zero-based event type.
//!
//! # Models
//!
//! Anything implementing [`SurvivalModel`] can be evaluated.
//! [`KaplanMeierModel`] is a covariate-free baseline, and [`Interpolated`]
//! refines any model's survival curves between grid points.
//!
//! # Failure policy
//!
//! Errors are never recovered: one failing horizon, event type or bootstrap
//! resample aborts the whole evaluation call. Undefined metric values (an
//! AUC without cases, for example) are reported as `NaN` rather than masked.

pub mod bootstrap;
mod baseline;
mod competing_risk;
mod config;
mod error;
mod evaluator;
mod model;
mod record;
pub mod single_risk;
mod test_set;
#[cfg(test)]
mod testing;

pub use self::{
    baseline::KaplanMeierModel,
    bootstrap::BootstrapAggregator,
    competing_risk::CompetingRiskEvaluator,
    config::{ModelConfig, RiskMode},
    error::EvaluationError,
    evaluator::{EvaluationOptions, Evaluator},
    model::{Interpolated, SurvivalModel},
    record::{BootstrapRecord, EvaluationReport, MetricRecord, MetricSummary},
    single_risk::SingleRiskEvaluator,
    test_set::{TestSet, resample_indices},
};
pub use survtd_metrics::SurvivalLabel;
