//! Bootstrap confidence intervals for evaluation metrics.
//!
//! The test population is resampled with replacement `nb_bootstrap` times
//! and every resample is scored. Each metric's scores are reduced to a mean
//! and a two-sided Student-t interval with `nb_bootstrap - 1` degrees of
//! freedom and standard error `s / sqrt(nb_bootstrap)`.
//!
//! # Reproducibility
//!
//! Resampling draws from the random source supplied by the caller and never
//! seeds it. Seed it beforehand to make results repeatable.
//! [`BootstrapAggregator::aggregate_parallel`] draws every resample from that
//! source up front, in the same order as [`BootstrapAggregator::aggregate`],
//! so both see the same resamples for the same seed.

use std::{collections::BTreeMap, thread};

use rand::Rng;
use survtd_stats::{
    descriptive::RunningMoments,
    interval::{check_confidence, t_interval},
};

use crate::{
    BootstrapRecord, EvaluationError, MetricRecord, MetricSummary, TestSet,
    test_set::resample_indices,
};

/// Default number of bootstrap resamples.
pub const DEFAULT_NB_BOOTSTRAP: usize = 100;

/// Resamples a test set and summarizes metric distributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapAggregator {
    confidence: f64,
    nb_bootstrap: usize,
    threads: usize,
}

impl BootstrapAggregator {
    /// Fails with [`EvaluationError::InvalidConfidence`] unless
    /// `0 < confidence < 1`, and with [`EvaluationError::InsufficientSamples`]
    /// when `nb_bootstrap <= 1`.
    pub fn new(confidence: f64, nb_bootstrap: usize) -> Result<Self, EvaluationError> {
        check_confidence(confidence)
            .map_err(|err| EvaluationError::from_interval(err, nb_bootstrap))?;
        if nb_bootstrap <= 1 {
            return Err(EvaluationError::InsufficientSamples { nb_bootstrap });
        }
        Ok(Self {
            confidence,
            nb_bootstrap,
            threads: 1,
        })
    }

    /// Sets the worker count used by [`Self::aggregate_parallel`].
    #[must_use]
    pub fn with_threads(self, threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..self
        }
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn nb_bootstrap(&self) -> usize {
        self.nb_bootstrap
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Scores `nb_bootstrap` resamples of `test_set` one after another.
    ///
    /// The first failing resample aborts the aggregation.
    pub fn aggregate<C, R, F>(
        &self,
        rng: &mut R,
        test_set: &TestSet<C>,
        mut evaluate: F,
    ) -> Result<BootstrapRecord, EvaluationError>
    where
        C: Clone,
        R: Rng + ?Sized,
        F: FnMut(&TestSet<C>) -> Result<MetricRecord, EvaluationError>,
    {
        let mut accumulator = MetricAccumulator::default();
        for iteration in 0..self.nb_bootstrap {
            let sample = test_set.resample(rng);
            accumulator.push(&evaluate(&sample)?);
            log::debug!("bootstrap iteration {}/{}", iteration + 1, self.nb_bootstrap);
        }
        accumulator.finish(self.confidence)
    }

    /// Like [`Self::aggregate`], with resamples scored on scoped threads.
    ///
    /// Each worker fills a private accumulator; partial results are merged
    /// in worker order.
    pub fn aggregate_parallel<C, R, F>(
        &self,
        rng: &mut R,
        test_set: &TestSet<C>,
        evaluate: F,
    ) -> Result<BootstrapRecord, EvaluationError>
    where
        C: Clone + Sync,
        R: Rng + ?Sized,
        F: Fn(&TestSet<C>) -> Result<MetricRecord, EvaluationError> + Sync,
    {
        let resamples = (0..self.nb_bootstrap)
            .map(|_| resample_indices(test_set.len(), &mut *rng))
            .collect::<Vec<_>>();
        let chunk_size = self.nb_bootstrap.div_ceil(self.threads);
        let evaluate = &evaluate;

        let partials = thread::scope(|s| {
            let handles = resamples
                .chunks(chunk_size)
                .enumerate()
                .map(|(worker, chunk)| {
                    s.spawn(move || {
                        let mut accumulator = MetricAccumulator::default();
                        for indices in chunk {
                            accumulator.push(&evaluate(&test_set.select(indices))?);
                        }
                        log::debug!(
                            "bootstrap worker {worker} scored {} resamples",
                            chunk.len()
                        );
                        Ok::<_, EvaluationError>(accumulator)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });

        let mut accumulator = MetricAccumulator::default();
        for partial in partials {
            accumulator.merge(partial?);
        }
        accumulator.finish(self.confidence)
    }
}

/// Per-metric running moments of bootstrap scores.
#[derive(Debug, Default)]
struct MetricAccumulator {
    moments: BTreeMap<String, RunningMoments>,
}

impl MetricAccumulator {
    fn push(&mut self, record: &MetricRecord) {
        for (name, value) in record.iter() {
            self.moments.entry(name.to_owned()).or_default().push(value);
        }
    }

    fn merge(&mut self, other: Self) {
        for (name, moments) in other.moments {
            self.moments.entry(name).or_default().merge(&moments);
        }
    }

    fn finish(self, confidence: f64) -> Result<BootstrapRecord, EvaluationError> {
        self.moments
            .into_iter()
            .map(|(name, moments)| {
                let count = moments.count();
                let mean = moments.mean();
                let df = count.saturating_sub(1);
                let interval = t_interval(mean, moments.std_error(), df, confidence)
                    .map_err(|err| EvaluationError::from_interval(err, count))?;
                let summary = MetricSummary {
                    mean,
                    lower: interval.lower,
                    upper: interval.upper,
                };
                Ok((name, summary))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use survtd_metrics::SurvivalLabel;

    use super::*;

    /// Half zeros, half ones: a single draw has variance 0.25.
    fn coin_set(n: usize) -> TestSet<f64> {
        #[expect(clippy::cast_precision_loss)]
        let covariates = (0..n).map(|i| (i % 2) as f64).collect();
        let labels = vec![SurvivalLabel::censored(1.0); n];
        TestSet::new(covariates, labels).unwrap()
    }

    /// Metric: covariate of the first resampled subject.
    fn first_draw(sample: &TestSet<f64>) -> Result<MetricRecord, EvaluationError> {
        let mut record = MetricRecord::new();
        record.insert("draw", sample.covariates()[0]);
        Ok(record)
    }

    /// Metric: mean covariate of the resample.
    fn sample_mean(sample: &TestSet<f64>) -> Result<MetricRecord, EvaluationError> {
        #[expect(clippy::cast_precision_loss)]
        let mean = sample.covariates().iter().sum::<f64>() / sample.len() as f64;
        let mut record = MetricRecord::new();
        record.insert("mean", mean);
        record.insert("constant", 0.5);
        Ok(record)
    }

    #[test]
    fn test_rejects_single_sample() {
        assert_eq!(
            BootstrapAggregator::new(0.95, 1),
            Err(EvaluationError::InsufficientSamples { nb_bootstrap: 1 })
        );
        assert_eq!(
            BootstrapAggregator::new(0.95, 0),
            Err(EvaluationError::InsufficientSamples { nb_bootstrap: 0 })
        );
    }

    #[test]
    fn test_rejects_invalid_confidence() {
        for confidence in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
            assert!(matches!(
                BootstrapAggregator::new(confidence, 10),
                Err(EvaluationError::InvalidConfidence { .. })
            ));
        }
    }

    #[test]
    fn test_half_width_matches_t_approximation() {
        let mut rng = Pcg64::seed_from_u64(2024);
        let aggregator = BootstrapAggregator::new(0.95, 200).unwrap();
        let record = aggregator
            .aggregate(&mut rng, &coin_set(1000), first_draw)
            .unwrap();
        let summary = record.get("draw").unwrap();

        let expected = 1.96 * 0.5 / 200_f64.sqrt();
        let half_width = (summary.upper - summary.lower) / 2.0;
        assert!(
            (half_width - expected).abs() < 0.05 * expected,
            "half width {half_width}, expected about {expected}"
        );
        assert!(summary.lower < summary.mean && summary.mean < summary.upper);
        assert!((summary.mean - 0.5).abs() < 0.15);
    }

    #[test]
    fn test_interval_narrows_with_more_resamples() {
        let set = coin_set(1000);
        let width = |nb_bootstrap| {
            let mut rng = Pcg64::seed_from_u64(5);
            let record = BootstrapAggregator::new(0.9, nb_bootstrap)
                .unwrap()
                .aggregate(&mut rng, &set, first_draw)
                .unwrap();
            let summary = record.get("draw").copied().unwrap();
            summary.upper - summary.lower
        };
        let narrow = width(800);
        let wide = width(50);
        assert!(narrow < wide, "{narrow} should be below {wide}");
        assert!(narrow < 0.5 * wide);
    }

    #[test]
    fn test_constant_metric_collapses_interval() {
        let mut rng = Pcg64::seed_from_u64(1);
        let record = BootstrapAggregator::new(0.95, 10)
            .unwrap()
            .aggregate(&mut rng, &coin_set(20), sample_mean)
            .unwrap();
        let constant = record.get("constant").unwrap();
        assert_abs_diff_eq!(constant.mean, 0.5);
        assert_abs_diff_eq!(constant.lower, 0.5);
        assert_abs_diff_eq!(constant.upper, 0.5);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let set = coin_set(101);
        let aggregator = BootstrapAggregator::new(0.95, 37).unwrap();

        let sequential = aggregator
            .aggregate(&mut Pcg64::seed_from_u64(9), &set, sample_mean)
            .unwrap();
        let parallel = aggregator
            .with_threads(4)
            .aggregate_parallel(&mut Pcg64::seed_from_u64(9), &set, sample_mean)
            .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (name, expected) in sequential.iter() {
            let actual = parallel.get(name).unwrap();
            assert_abs_diff_eq!(actual.mean, expected.mean, epsilon = 1e-12);
            assert_abs_diff_eq!(actual.lower, expected.lower, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.upper, expected.upper, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_failure_aborts_aggregation() {
        let mut rng = Pcg64::seed_from_u64(0);
        let aggregator = BootstrapAggregator::new(0.95, 5).unwrap();
        let mut calls = 0;
        let result = aggregator.aggregate(&mut rng, &coin_set(10), |_| {
            calls += 1;
            if calls == 3 {
                Err(EvaluationError::InsufficientData {
                    reason: "no events".into(),
                })
            } else {
                Ok(MetricRecord::new())
            }
        });
        assert!(matches!(
            result,
            Err(EvaluationError::InsufficientData { .. })
        ));
        assert_eq!(calls, 3);

        let result = aggregator
            .with_threads(2)
            .aggregate_parallel(&mut rng, &coin_set(10), |_| {
                Err(EvaluationError::InsufficientData {
                    reason: "no events".into(),
                })
            });
        assert!(result.is_err());
    }
}
