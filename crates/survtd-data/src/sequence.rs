//! Sequence datasets for time-dependent survival models.
//!
//! A frame is split into train, validation and test partitions, covariates
//! are standardized on the training partition, and every subject becomes a
//! sequence of `seq_len` steps: the covariate row repeated once per step
//! with a trailing time feature `k / seq_len`.
//!
//! # Time grid
//!
//! With `seq_len == 3` the grid is `[0, tau_25, tau_50, tau_75, max]`, where
//! the taus are quantiles of the event durations, so sequences get one step
//! per grid point (five in total). Any other length uses `seq_len`
//! evenly spaced cuts up to the longest training duration.
//!
//! Training and validation targets are discretized onto that grid. Test
//! targets keep the raw duration for evaluation.

use rand::Rng;
use serde::Serialize;
use survtd_evaluator::{ModelConfig, SurvivalLabel, TestSet};

use crate::{
    DataError, DatasetKind, LabelDiscretizer, Standardizer, SurvivalFrame,
    discretize::{HORIZON_LEVELS, horizon_times},
    split::split,
};

/// Sequence length that selects the quantile time grid.
pub const QUANTILE_GRID_SEQ_LEN: usize = 3;

/// Partition of a prepared dataset, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display, derive_more::FromStr)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[display("train")]
    Train,
    #[display("val")]
    Val,
    #[display("test")]
    Test,
}

/// Prediction target of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Grid index and event type, for training.
    Discrete { index: usize, event: Option<usize> },
    /// Observed duration and event type, for evaluation.
    Raw { duration: f64, event: Option<usize> },
}

/// One subject as a model input sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceItem {
    /// `seq_len` rows of `n_features + 1` values.
    pub steps: Vec<Vec<f64>>,
    pub target: Target,
}

/// One partition of a prepared dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDataset {
    phase: Phase,
    seq_len: usize,
    cuts: Vec<f64>,
    taus: Vec<f64>,
    max_duration: f64,
    num_event: usize,
    columns: Vec<String>,
    n_categorical: usize,
    rows: Vec<Vec<f64>>,
    labels: Vec<SurvivalLabel>,
    targets: Vec<Target>,
}

impl SequenceDataset {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Steps per sequence, equal to the number of grid cuts.
    #[must_use]
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    #[must_use]
    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    /// Event-duration quantiles of the full frame at the horizon levels.
    #[must_use]
    pub fn taus(&self) -> &[f64] {
        &self.taus
    }

    /// Preprocessed covariate column names, categorical columns first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Preprocessed covariate rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Untransformed outcomes.
    #[must_use]
    pub fn labels(&self) -> &[SurvivalLabel] {
        &self.labels
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Covariates per step, without the time feature.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Number of distinct values in each categorical column of this partition.
    #[must_use]
    pub fn n_embeddings(&self) -> Vec<usize> {
        (0..self.n_categorical)
            .map(|c| {
                let mut values = self.rows.iter().map(|row| row[c]).collect::<Vec<_>>();
                values.sort_by(f64::total_cmp);
                values.dedup();
                values.len()
            })
            .collect()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<SequenceItem> {
        let row = self.rows.get(index)?;
        #[expect(clippy::cast_precision_loss)]
        let steps = (0..self.seq_len)
            .map(|k| {
                let mut step = row.clone();
                step.push(k as f64 / self.seq_len as f64);
                step
            })
            .collect();
        Some(SequenceItem {
            steps,
            target: self.targets[index],
        })
    }

    pub fn items(&self) -> impl Iterator<Item = SequenceItem> + '_ {
        (0..self.len()).filter_map(|i| self.item(i))
    }

    /// Evaluation grid `[0, taus.., max duration]` with one horizon per tau.
    pub fn model_config(&self) -> Result<ModelConfig, DataError> {
        let duration_index = std::iter::once(0.0)
            .chain(self.taus.iter().copied())
            .chain(std::iter::once(self.max_duration))
            .collect();
        let config = ModelConfig {
            duration_index,
            horizons: HORIZON_LEVELS.iter().map(|q| q.to_string()).collect(),
            num_event: self.num_event,
        };
        config.validate()?;
        Ok(config)
    }

    /// Preprocessed rows paired with their raw outcomes.
    pub fn test_set(&self) -> Result<TestSet<Vec<f64>>, DataError> {
        Ok(TestSet::new(self.rows.clone(), self.labels.clone())?)
    }
}

/// Train, validation and test sequence datasets built from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceData {
    pub train: SequenceDataset,
    pub val: SequenceDataset,
    pub test: SequenceDataset,
}

impl SequenceData {
    pub fn prepare<R>(
        frame: &SurvivalFrame,
        kind: DatasetKind,
        seq_len: usize,
        rng: &mut R,
    ) -> Result<Self, DataError>
    where
        R: Rng + ?Sized,
    {
        let parts = split(frame, rng)?;
        let taus = horizon_times(frame, &HORIZON_LEVELS)?;
        let max_duration = frame.max_duration();

        let discretizer = if seq_len == QUANTILE_GRID_SEQ_LEN {
            let cuts = std::iter::once(0.0)
                .chain(taus.iter().copied())
                .chain(std::iter::once(max_duration))
                .collect();
            LabelDiscretizer::from_cuts(cuts)?
        } else {
            LabelDiscretizer::equidistant(seq_len, parts.train.max_duration())?
        };
        let standardizer = Standardizer::fit(&parts.train, kind)?;
        log::info!(
            "prepared {} sequences: seq_len={}, taus={:?}",
            kind.name(),
            discretizer.cuts().len(),
            taus
        );

        let shared = Shared {
            discretizer: &discretizer,
            standardizer: &standardizer,
            taus: &taus,
            max_duration,
            num_event: frame.num_event(),
        };
        Ok(Self {
            train: shared.build(Phase::Train, &parts.train)?,
            val: shared.build(Phase::Val, &parts.val)?,
            test: shared.build(Phase::Test, &parts.test)?,
        })
    }

    #[must_use]
    pub fn phase(&self, phase: Phase) -> &SequenceDataset {
        match phase {
            Phase::Train => &self.train,
            Phase::Val => &self.val,
            Phase::Test => &self.test,
        }
    }
}

struct Shared<'a> {
    discretizer: &'a LabelDiscretizer,
    standardizer: &'a Standardizer,
    taus: &'a [f64],
    max_duration: f64,
    num_event: usize,
}

impl Shared<'_> {
    fn build(&self, phase: Phase, frame: &SurvivalFrame) -> Result<SequenceDataset, DataError> {
        let targets = frame
            .labels()
            .iter()
            .map(|&label| match phase {
                Phase::Train | Phase::Val => {
                    let discrete = self.discretizer.transform(label);
                    Target::Discrete {
                        index: discrete.index,
                        event: discrete.event,
                    }
                }
                Phase::Test => Target::Raw {
                    duration: label.duration,
                    event: label.event,
                },
            })
            .collect();
        Ok(SequenceDataset {
            phase,
            seq_len: self.discretizer.cuts().len(),
            cuts: self.discretizer.cuts().to_vec(),
            taus: self.taus.to_vec(),
            max_duration: self.max_duration,
            num_event: self.num_event,
            columns: self.standardizer.output_columns().map(str::to_owned).collect(),
            n_categorical: self.standardizer.n_categorical(),
            rows: self.standardizer.transform(frame)?,
            labels: frame.labels().to_vec(),
            targets,
        })
    }
}
