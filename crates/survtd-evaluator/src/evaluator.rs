use rand::Rng;
use serde::{Deserialize, Serialize};
use survtd_metrics::SurvivalLabel;

use crate::{
    BootstrapAggregator, CompetingRiskEvaluator, EvaluationError, EvaluationReport, MetricRecord,
    ModelConfig, RiskMode, SingleRiskEvaluator, SurvivalModel, TestSet,
    bootstrap::DEFAULT_NB_BOOTSTRAP,
};

/// Knobs of an [`Evaluator::eval`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Confidence level of bootstrap intervals; `None` scores the test set once.
    pub confidence: Option<f64>,
    pub nb_bootstrap: usize,
    /// Prediction batch size; `None` predicts the whole test set at once.
    pub batch_size: Option<usize>,
    /// Worker threads for bootstrap resamples.
    pub threads: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            confidence: None,
            nb_bootstrap: DEFAULT_NB_BOOTSTRAP,
            batch_size: None,
            threads: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum RiskEvaluator {
    Single(SingleRiskEvaluator),
    Competing(CompetingRiskEvaluator),
}

/// Entry point for scoring a model on a test set.
///
/// Whether the single-risk or competing-risks metrics apply is decided once,
/// from the model configuration given at construction, together with the
/// training population that serves as the censoring reference.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64;
/// use survtd_evaluator::{
///     EvaluationOptions, EvaluationReport, Evaluator, KaplanMeierModel, ModelConfig, TestSet,
/// };
/// use survtd_metrics::SurvivalLabel;
///
/// let labels = (1..=40)
///     .map(|i| {
///         let t = f64::from(i);
///         if i % 3 == 0 {
///             SurvivalLabel::censored(t)
///         } else {
///             SurvivalLabel::event(t, 0)
///         }
///     })
///     .collect::<Vec<_>>();
/// let config = ModelConfig {
///     duration_index: vec![0.0, 10.5, 20.5, 30.5, 40.0],
///     horizons: vec!["0.25".into(), "0.5".into(), "0.75".into()],
///     num_event: 1,
/// };
/// let model = KaplanMeierModel::<()>::fit(config.clone(), &labels).unwrap();
/// let evaluator = Evaluator::new(&config, &labels).unwrap();
/// let test_set = TestSet::new(vec![(); labels.len()], labels).unwrap();
///
/// let report = evaluator
///     .eval(&model, &test_set, &EvaluationOptions::default(), &mut Pcg64::seed_from_u64(0))
///     .unwrap();
/// assert!(matches!(report, EvaluationReport::Point(_)));
/// // the baseline cannot rank subjects
/// assert_eq!(report.value("0.5_Ctd_ipcw"), Some(0.5));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    mode: RiskMode,
    inner: RiskEvaluator,
}

impl Evaluator {
    pub fn new(
        config: &ModelConfig,
        train_labels: &[SurvivalLabel],
    ) -> Result<Self, EvaluationError> {
        config.validate()?;
        let mode = config.risk_mode();
        let inner = match mode {
            RiskMode::Single => RiskEvaluator::Single(SingleRiskEvaluator::new(train_labels)?),
            RiskMode::Competing(n) => {
                RiskEvaluator::Competing(CompetingRiskEvaluator::new(train_labels, n)?)
            }
        };
        Ok(Self { mode, inner })
    }

    #[must_use]
    pub fn risk_mode(&self) -> RiskMode {
        self.mode
    }

    /// Scores `model` on `test_set` once.
    pub fn evaluate_once<M>(
        &self,
        model: &M,
        test_set: &TestSet<M::Covariates>,
        batch_size: Option<usize>,
    ) -> Result<MetricRecord, EvaluationError>
    where
        M: SurvivalModel + ?Sized,
    {
        match &self.inner {
            RiskEvaluator::Single(evaluator) => evaluator.evaluate(model, test_set, batch_size),
            RiskEvaluator::Competing(evaluator) => evaluator.evaluate(model, test_set, batch_size),
        }
    }

    /// Scores `model` on `test_set`, with bootstrap intervals when
    /// `options.confidence` is set.
    ///
    /// `rng` is only drawn from when bootstrapping.
    pub fn eval<M, R>(
        &self,
        model: &M,
        test_set: &TestSet<M::Covariates>,
        options: &EvaluationOptions,
        rng: &mut R,
    ) -> Result<EvaluationReport, EvaluationError>
    where
        M: SurvivalModel + Sync + ?Sized,
        M::Covariates: Clone + Sync,
        R: Rng + ?Sized,
    {
        let model_mode = model.config().risk_mode();
        if model_mode != self.mode {
            return Err(EvaluationError::invalid_config(format!(
                "model risk mode {model_mode:?} differs from evaluator risk mode {:?}",
                self.mode
            )));
        }

        let Some(confidence) = options.confidence else {
            let record = self.evaluate_once(model, test_set, options.batch_size)?;
            return Ok(EvaluationReport::Point(record));
        };

        let aggregator = BootstrapAggregator::new(confidence, options.nb_bootstrap)?
            .with_threads(options.threads);
        log::info!(
            "bootstrapping {} resamples of {} subjects at confidence {confidence}",
            aggregator.nb_bootstrap(),
            test_set.len()
        );
        let evaluate = |sample: &TestSet<M::Covariates>| {
            self.evaluate_once(model, sample, options.batch_size)
        };
        let record = if aggregator.threads() > 1 {
            aggregator.aggregate_parallel(rng, test_set, evaluate)?
        } else {
            aggregator.aggregate(rng, test_set, evaluate)?
        };
        Ok(EvaluationReport::Bootstrap(record))
    }
}
