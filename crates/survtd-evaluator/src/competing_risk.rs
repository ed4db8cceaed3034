use survtd_metrics::{EventTable, MetricComputer, SurvivalLabel};

use crate::{EvaluationError, MetricRecord, SurvivalModel, TestSet};

/// Scores models with several competing event types.
///
/// Each event type `r` is scored on its own: subjects with another event
/// type count as censored at their event time, and predictions are
/// requested for `r` only. Metric names carry the risk index:
/// `"{h}_ipcw_{r}"`, `"{h}_brier_{r}"` and `"{h}_auroc_{r}"`.
/// No whole-curve concordance is computed.
#[derive(Debug, Clone)]
pub struct CompetingRiskEvaluator {
    computers: Vec<MetricComputer>,
}

impl CompetingRiskEvaluator {
    /// Fixes the cause-specific training populations of `num_event` event types.
    pub fn new(train_labels: &[SurvivalLabel], num_event: usize) -> Result<Self, EvaluationError> {
        let computers = (0..num_event)
            .map(|risk| {
                let train = EventTable::for_risk(train_labels, risk)?;
                MetricComputer::new(&train)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { computers })
    }

    #[must_use]
    pub fn num_event(&self) -> usize {
        self.computers.len()
    }

    pub fn evaluate<M>(
        &self,
        model: &M,
        test_set: &TestSet<M::Covariates>,
        batch_size: Option<usize>,
    ) -> Result<MetricRecord, EvaluationError>
    where
        M: SurvivalModel + ?Sized,
    {
        let config = model.config();
        config.validate()?;
        if config.num_event != self.num_event() {
            return Err(EvaluationError::invalid_config(format!(
                "model predicts {} event type(s), evaluator was built for {}",
                config.num_event,
                self.num_event()
            )));
        }
        let horizons = config.evaluation_horizons();

        let mut record = MetricRecord::new();
        for (risk, computer) in self.computers.iter().enumerate() {
            let test = test_set.risk_event_table(risk)?;
            let curves = model.predict_surv(test_set.covariates(), batch_size, Some(risk))?;
            for metrics in computer.compute(&test, &curves, &horizons)? {
                let label = &metrics.horizon.label;
                log::info!(
                    "risk {risk}, horizon {label}: C-td(ipcw)={:.4} brier={:.4} auroc={:.4}",
                    metrics.concordance_ipcw,
                    metrics.brier,
                    metrics.auroc
                );
                record.insert(format!("{label}_ipcw_{risk}"), metrics.concordance_ipcw);
                record.insert(format!("{label}_brier_{risk}"), metrics.brier);
                record.insert(format!("{label}_auroc_{risk}"), metrics.auroc);
            }
        }
        Ok(record)
    }
}
