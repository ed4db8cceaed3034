//! The contract a survival model fulfils to be evaluated.
//!
//! A model predicts, for every subject, a survival curve on its discretized
//! time grid ([`ModelConfig::duration_index`]). Competing-risks models
//! additionally predict one curve per event type.
//!
//! [`Interpolated`] wraps any model and refines its grid by linear
//! interpolation of the survival function, which is how whole-curve metrics
//! are usually computed for discrete-time models.

use survtd_metrics::SurvivalCurves;

use crate::{EvaluationError, ModelConfig};

/// A fitted model producing survival curves from covariates.
pub trait SurvivalModel {
    /// Covariates of one subject.
    type Covariates;

    fn config(&self) -> &ModelConfig;

    /// Predicts survival curves, one row per subject.
    ///
    /// `batch_size` bounds how many subjects are predicted at once (`None`
    /// predicts everything in one pass). `event` selects the event type for
    /// competing-risks models; `None` asks for overall survival.
    fn predict_surv(
        &self,
        covariates: &[Self::Covariates],
        batch_size: Option<usize>,
        event: Option<usize>,
    ) -> Result<SurvivalCurves, EvaluationError>;

    /// Predicts overall survival for whole-curve metrics.
    fn predict_surv_df(
        &self,
        covariates: &[Self::Covariates],
    ) -> Result<SurvivalCurves, EvaluationError> {
        self.predict_surv(covariates, None, None)
    }

    /// Wraps this model so its curves are refined with `resolution` linear
    /// sub-steps per grid interval.
    fn interpolate(&self, resolution: usize) -> Interpolated<&Self>
    where
        Self: Sized,
    {
        Interpolated::new(self, resolution)
    }
}

impl<M> SurvivalModel for &M
where
    M: SurvivalModel + ?Sized,
{
    type Covariates = M::Covariates;

    fn config(&self) -> &ModelConfig {
        (**self).config()
    }

    fn predict_surv(
        &self,
        covariates: &[Self::Covariates],
        batch_size: Option<usize>,
        event: Option<usize>,
    ) -> Result<SurvivalCurves, EvaluationError> {
        (**self).predict_surv(covariates, batch_size, event)
    }

    fn predict_surv_df(
        &self,
        covariates: &[Self::Covariates],
    ) -> Result<SurvivalCurves, EvaluationError> {
        (**self).predict_surv_df(covariates)
    }
}

/// A model whose survival curves are linearly interpolated between grid points.
///
/// The original grid points are kept, so values at the model's horizons are
/// unchanged.
///
/// # Examples
///
/// ```
/// use survtd_evaluator::{Interpolated, ModelConfig, SurvivalModel};
/// use survtd_metrics::SurvivalCurves;
///
/// struct Halving(ModelConfig);
///
/// impl SurvivalModel for Halving {
///     type Covariates = ();
///
///     fn config(&self) -> &ModelConfig {
///         &self.0
///     }
///
///     fn predict_surv(
///         &self,
///         covariates: &[()],
///         _batch_size: Option<usize>,
///         _event: Option<usize>,
///     ) -> Result<SurvivalCurves, survtd_evaluator::EvaluationError> {
///         let rows = vec![vec![1.0, 0.5]; covariates.len()];
///         Ok(SurvivalCurves::new(self.0.duration_index.clone(), rows)?)
///     }
/// }
///
/// let model = Halving(ModelConfig {
///     duration_index: vec![0.0, 4.0],
///     horizons: vec![],
///     num_event: 1,
/// });
/// let fine = model.interpolate(4).predict_surv(&[()], None, None).unwrap();
/// assert_eq!(fine.times(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
/// assert_eq!(fine.row(0), &[1.0, 0.875, 0.75, 0.625, 0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct Interpolated<M> {
    inner: M,
    resolution: usize,
}

impl<M> Interpolated<M> {
    /// A `resolution` of 0 is treated as 1 (no refinement).
    pub fn new(inner: M, resolution: usize) -> Self {
        Self {
            inner,
            resolution: resolution.max(1),
        }
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M> SurvivalModel for Interpolated<M>
where
    M: SurvivalModel,
{
    type Covariates = M::Covariates;

    fn config(&self) -> &ModelConfig {
        self.inner.config()
    }

    fn predict_surv(
        &self,
        covariates: &[Self::Covariates],
        batch_size: Option<usize>,
        event: Option<usize>,
    ) -> Result<SurvivalCurves, EvaluationError> {
        let curves = self.inner.predict_surv(covariates, batch_size, event)?;
        refine(&curves, self.resolution)
    }

    fn predict_surv_df(
        &self,
        covariates: &[Self::Covariates],
    ) -> Result<SurvivalCurves, EvaluationError> {
        let curves = self.inner.predict_surv_df(covariates)?;
        refine(&curves, self.resolution)
    }
}

fn refine(curves: &SurvivalCurves, resolution: usize) -> Result<SurvivalCurves, EvaluationError> {
    if resolution <= 1 || curves.times().len() < 2 {
        return Ok(curves.clone());
    }
    #[expect(clippy::cast_precision_loss)]
    let fractions = (0..resolution)
        .map(|j| j as f64 / resolution as f64)
        .collect::<Vec<_>>();
    let lerp = |values: &[f64]| -> Vec<f64> {
        values
            .windows(2)
            .flat_map(|w| fractions.iter().map(move |&f| w[0] + f * (w[1] - w[0])))
            .chain(values.last().copied())
            .collect()
    };

    let times = lerp(curves.times());
    let rows = curves.rows().iter().map(|row| lerp(row)).collect();
    Ok(SurvivalCurves::new(times, rows)?)
}
