use survtd_metrics::{
    EventTable, MetricComputer, SurvivalLabel, concordance::concordance_td_antolini,
};

use crate::{EvaluationError, MetricRecord, SurvivalModel, TestSet};

/// Name of the whole-curve concordance metric.
pub const WHOLE_CURVE_CONCORDANCE: &str = "C-td-full";

/// Scores models with a single event type.
///
/// Produces the whole-curve concordance plus, for every horizon `h`,
/// `"{h}_Ctd_ipcw"`, `"{h}_brier"` and `"{h}_auroc"`.
#[derive(Debug, Clone)]
pub struct SingleRiskEvaluator {
    computer: MetricComputer,
}

impl SingleRiskEvaluator {
    /// Fixes the training population used as the censoring reference.
    pub fn new(train_labels: &[SurvivalLabel]) -> Result<Self, EvaluationError> {
        let train = EventTable::from_labels(train_labels)?;
        Ok(Self {
            computer: MetricComputer::new(&train)?,
        })
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
        let horizons = config.evaluation_horizons();
        let test = test_set.event_table()?;

        let whole_curves = model.predict_surv_df(test_set.covariates())?;
        let mut record = MetricRecord::new();
        record.insert(
            WHOLE_CURVE_CONCORDANCE,
            concordance_td_antolini(&test, &whole_curves)?,
        );

        let curves = model.predict_surv(test_set.covariates(), batch_size, None)?;
        for metrics in self.computer.compute(&test, &curves, &horizons)? {
            let label = &metrics.horizon.label;
            record.insert(format!("{label}_Ctd_ipcw"), metrics.concordance_ipcw);
            record.insert(format!("{label}_brier"), metrics.brier);
            record.insert(format!("{label}_auroc"), metrics.auroc);
        }
        Ok(record)
    }
}
