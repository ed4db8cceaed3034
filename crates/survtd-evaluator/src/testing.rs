//! Synthetic populations and models shared by the tests.

use rand::Rng;
use rand_distr::{Distribution, Exp};
use survtd_metrics::{SurvivalCurves, SurvivalLabel};
use survtd_stats::percentiles::compute_quantile;

use crate::{EvaluationError, ModelConfig, SurvivalModel};

/// End of follow-up: subjects still event-free are censored here.
pub(crate) const FOLLOW_UP: f64 = 3.0;

/// Cause-specific hazards of a subject with covariate `x` in `[0, 1)`.
pub(crate) fn hazards(x: f64, num_event: usize) -> Vec<f64> {
    if num_event == 1 {
        vec![0.2 + 2.0 * x]
    } else {
        (0..num_event)
            .map(|r| if r % 2 == 0 { 0.2 + 2.0 * x } else { 2.2 - 2.0 * x })
            .collect()
    }
}

fn population<R>(rng: &mut R, n: usize, num_event: usize) -> (Vec<f64>, Vec<SurvivalLabel>)
where
    R: Rng + ?Sized,
{
    let censoring = Exp::<f64>::new(0.3).unwrap();
    (0..n)
        .map(|_| {
            let x = rng.random::<f64>();
            let mut label = SurvivalLabel::censored(censoring.sample(&mut *rng).min(FOLLOW_UP));
            for (risk, hazard) in hazards(x, num_event).into_iter().enumerate() {
                let t = Exp::new(hazard).unwrap().sample(&mut *rng);
                if t < label.duration {
                    label = SurvivalLabel::event(t, risk);
                }
            }
            (x, label)
        })
        .unzip()
}

pub(crate) fn single_risk_population<R>(rng: &mut R, n: usize) -> (Vec<f64>, Vec<SurvivalLabel>)
where
    R: Rng + ?Sized,
{
    population(rng, n, 1)
}

pub(crate) fn competing_population<R>(rng: &mut R, n: usize) -> (Vec<f64>, Vec<SurvivalLabel>)
where
    R: Rng + ?Sized,
{
    population(rng, n, 2)
}

/// Grid `[0, q25, q50, q75, max duration]` of event-duration quartiles.
pub(crate) fn config_for(labels: &[SurvivalLabel], num_event: usize) -> ModelConfig {
    let mut event_times = labels
        .iter()
        .filter(|l| l.event.is_some())
        .map(|l| l.duration)
        .collect::<Vec<_>>();
    event_times.sort_by(f64::total_cmp);
    let max_duration = labels.iter().map(|l| l.duration).fold(0.0, f64::max);

    let quantiles = [0.25, 0.5, 0.75];
    let mut duration_index = vec![0.0];
    duration_index.extend(quantiles.iter().map(|&q| compute_quantile(&event_times, q)));
    duration_index.push(max_duration);
    ModelConfig {
        duration_index,
        horizons: quantiles.iter().map(ToString::to_string).collect(),
        num_event,
    }
}

/// Predicts the true exponential survival of each subject.
pub(crate) struct HazardModel {
    config: ModelConfig,
}

impl HazardModel {
    pub(crate) fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl SurvivalModel for HazardModel {
    type Covariates = f64;

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn predict_surv(
        &self,
        covariates: &[f64],
        batch_size: Option<usize>,
        event: Option<usize>,
    ) -> Result<SurvivalCurves, EvaluationError> {
        let batch_size = batch_size.unwrap_or(covariates.len()).max(1);
        let grid = &self.config.duration_index;
        let mut rows = Vec::with_capacity(covariates.len());
        for batch in covariates.chunks(batch_size) {
            rows.extend(batch.iter().map(|&x| {
                let hazards = hazards(x, self.config.num_event);
                let hazard = match event {
                    Some(risk) => hazards[risk],
                    None => hazards.iter().sum(),
                };
                grid.iter().map(|t| (-hazard * t).exp()).collect::<Vec<_>>()
            }));
        }
        Ok(SurvivalCurves::new(grid.clone(), rows)?)
    }
}
