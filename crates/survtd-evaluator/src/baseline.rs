use std::marker::PhantomData;

use survtd_metrics::{EventTable, SurvivalCurves, SurvivalLabel};
use survtd_stats::survival::KaplanMeierCurve;

use crate::{EvaluationError, ModelConfig, SurvivalModel};

/// Covariate-free reference model.
///
/// Predicts the training population's Kaplan-Meier curve, sampled on the
/// configured grid, for every subject. For event type `r` the curve is the
/// cause-specific one, where other event types count as censored.
/// Its discrimination is uninformative by construction, which makes it the
/// floor any fitted model should beat.
#[derive(Debug, Clone)]
pub struct KaplanMeierModel<C> {
    config: ModelConfig,
    overall: Vec<f64>,
    per_risk: Vec<Vec<f64>>,
    _covariates: PhantomData<fn(&C)>,
}

impl<C> KaplanMeierModel<C> {
    pub fn fit(
        config: ModelConfig,
        train_labels: &[SurvivalLabel],
    ) -> Result<Self, EvaluationError> {
        config.validate()?;
        if train_labels.is_empty() {
            return Err(EvaluationError::InsufficientData {
                reason: "cannot fit a Kaplan-Meier curve to an empty population".into(),
            });
        }

        let on_grid = |table: &EventTable| -> Vec<f64> {
            let curve = KaplanMeierCurve::from_data(table.to_km_data());
            config
                .duration_index
                .iter()
                .map(|&t| curve.survival_at(t))
                .collect()
        };
        let overall = on_grid(&EventTable::from_labels(train_labels)?);
        let per_risk = (0..config.num_event)
            .map(|risk| EventTable::for_risk(train_labels, risk).map(|table| on_grid(&table)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            overall,
            per_risk,
            _covariates: PhantomData,
        })
    }

    /// Curve on the configured grid for `event`, or overall survival for `None`.
    pub fn curve(&self, event: Option<usize>) -> Result<&[f64], EvaluationError> {
        match event {
            None => Ok(&self.overall),
            Some(risk) => self.per_risk.get(risk).map(Vec::as_slice).ok_or_else(|| {
                EvaluationError::invalid_config(format!(
                    "event type {risk} requested, model knows {}",
                    self.per_risk.len()
                ))
            }),
        }
    }
}

impl<C> SurvivalModel for KaplanMeierModel<C> {
    type Covariates = C;

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn predict_surv(
        &self,
        covariates: &[C],
        batch_size: Option<usize>,
        event: Option<usize>,
    ) -> Result<SurvivalCurves, EvaluationError> {
        if batch_size == Some(0) {
            return Err(EvaluationError::invalid_config("batch size must be positive"));
        }
        let curve = self.curve(event)?;
        let rows = vec![curve.to_vec(); covariates.len()];
        Ok(SurvivalCurves::new(self.config.duration_index.clone(), rows)?)
    }
}
