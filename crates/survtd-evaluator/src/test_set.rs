use rand::Rng;
use survtd_metrics::{EventTable, SurvivalLabel};

use crate::EvaluationError;

/// Covariates and observed outcomes of the population a model is scored on.
///
/// `covariates[i]` and `labels[i]` describe the same subject; resampling
/// keeps the pairs together.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSet<C> {
    covariates: Vec<C>,
    labels: Vec<SurvivalLabel>,
}

impl<C> TestSet<C> {
    /// Pairs covariates with labels, failing with
    /// [`EvaluationError::ShapeMismatch`] when their lengths differ.
    pub fn new(covariates: Vec<C>, labels: Vec<SurvivalLabel>) -> Result<Self, EvaluationError> {
        EvaluationError::check_len("test labels", covariates.len(), labels.len())?;
        Ok(Self { covariates, labels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn covariates(&self) -> &[C] {
        &self.covariates
    }

    #[must_use]
    pub fn labels(&self) -> &[SurvivalLabel] {
        &self.labels
    }

    /// Outcomes where any event type counts as an event.
    pub fn event_table(&self) -> Result<EventTable, EvaluationError> {
        Ok(EventTable::from_labels(&self.labels)?)
    }

    /// Outcomes where only event type `risk` counts as an event.
    pub fn risk_event_table(&self, risk: usize) -> Result<EventTable, EvaluationError> {
        Ok(EventTable::for_risk(&self.labels, risk)?)
    }
}

impl<C> TestSet<C>
where
    C: Clone,
{
    /// Subjects at `indices`, in that order; an index may repeat.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            covariates: indices.iter().map(|&i| self.covariates[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Draws a same-size sample of subjects with replacement.
    #[must_use]
    pub fn resample<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        self.select(&resample_indices(self.len(), rng))
    }
}

/// `n` indices drawn uniformly from `0..n` with replacement.
pub fn resample_indices<R>(n: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    (0..n).map(|_| rng.random_range(0..n)).collect()
}
