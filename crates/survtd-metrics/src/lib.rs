//! Time-dependent discrimination and calibration metrics for survival models.
//!
//! Every metric here handles right-censored outcomes by weighting observed
//! events with the inverse probability of remaining uncensored (IPCW), where
//! the censoring distribution is estimated from a reference (training)
//! population.
//!
//! # Metrics
//!
//! - [`concordance::concordance_index_ipcw`] - Uno's concordance, truncated at a horizon
//! - [`auc::cumulative_dynamic_auc`] - cumulative cases vs. dynamic controls AUC
//! - [`brier::brier_score`] - IPCW Brier score
//! - [`concordance::concordance_td_antolini`] - whole-curve concordance over all observed times
//!
//! # Architecture
//!
//! ```text
//! EventTable (train)  ──fit──>  CensoringDistribution
//!                                     │ weights
//! EventTable (test) + SurvivalCurves ─┴─> MetricComputer ──> HorizonMetrics per Horizon
//! ```
//!
//! # Example
//!
//! ```
//! use survtd_metrics::{EventTable, Horizon, MetricComputer, SurvivalCurves};
//!
//! let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (true, 4.0), (false, 6.0)]
//!     .into_iter()
//!     .collect();
//! let test: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 5.0)]
//!     .into_iter()
//!     .collect();
//! let curves = SurvivalCurves::new(
//!     vec![0.0, 2.0, 4.0],
//!     vec![
//!         vec![1.0, 0.3, 0.1],
//!         vec![1.0, 0.6, 0.4],
//!         vec![1.0, 0.5, 0.2],
//!         vec![1.0, 0.9, 0.8],
//!     ],
//! )
//! .unwrap();
//!
//! let computer = MetricComputer::new(&train).unwrap();
//! let metrics = computer.compute(&test, &curves, &[Horizon::new("mid", 2.5)]).unwrap();
//! assert!(metrics[0].concordance_ipcw > 0.5);
//! ```

pub mod auc;
pub mod brier;
mod censoring;
pub mod concordance;
mod computer;
mod curves;
mod error;
mod event_table;

pub use self::{
    censoring::CensoringDistribution,
    computer::{Horizon, HorizonMetrics, MetricComputer, compute_metrics},
    curves::SurvivalCurves,
    error::MetricError,
    event_table::{EventRecord, EventTable, SurvivalLabel},
};
