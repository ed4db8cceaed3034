//! Survival datasets prepared for sequence models.
//!
//! Reads survival tables from CSV, splits them into train, validation and
//! test partitions, standardizes covariates and turns every subject into a
//! sequence of time steps with a discretized target.
//!
//! ```text
//! SurvivalFrame ── split ──> train / val / test frames
//!       │                      │
//!       │                Standardizer (fit on train)
//!       │                LabelDiscretizer (quantile or equidistant grid)
//!       └── horizon_times ───> SequenceData { train, val, test }
//!                                   │
//!                              DataLoader (batches)
//! ```
//!
//! The test partition converts into a [`survtd_evaluator::TestSet`] and its
//! evaluation grid into a [`survtd_evaluator::ModelConfig`].

mod dataset;
pub mod discretize;
mod error;
mod frame;
mod loader;
mod preprocess;
pub mod sequence;
pub mod split;

pub use self::{
    dataset::DatasetKind,
    discretize::{DiscreteLabel, LabelDiscretizer, horizon_times},
    error::DataError,
    frame::{DURATION_COLUMN, EVENT_COLUMN, SurvivalFrame},
    loader::DataLoader,
    preprocess::Standardizer,
    sequence::{Phase, SequenceData, SequenceDataset, SequenceItem, Target},
    split::{DataSplit, split},
};
