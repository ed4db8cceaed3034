use serde::{Deserialize, Serialize};

use crate::{
    CensoringDistribution, EventTable, MetricError, SurvivalCurves, auc::cumulative_dynamic_auc,
    brier::brier_score, concordance::concordance_index_ipcw,
};

/// A named evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    /// Human-readable label used in metric names, e.g. `"0.25"`.
    pub label: String,
    /// Evaluation time on the duration scale.
    pub time: f64,
}

impl Horizon {
    pub fn new(label: impl Into<String>, time: f64) -> Self {
        Self {
            label: label.into(),
            time,
        }
    }
}

/// Discrimination and calibration of one set of predictions at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonMetrics {
    pub horizon: Horizon,
    /// IPCW concordance truncated at the horizon.
    pub concordance_ipcw: f64,
    /// IPCW Brier score at the horizon.
    pub brier: f64,
    /// Cumulative/dynamic AUC at the horizon.
    pub auroc: f64,
}

/// Computes per-horizon metrics against a fixed reference population.
///
/// The reference (training) population is checked and its censoring
/// distribution fitted once; [`MetricComputer::compute`] can then be called
/// for any number of test populations.
#[derive(Debug, Clone)]
pub struct MetricComputer {
    censoring: CensoringDistribution,
}

impl MetricComputer {
    /// Prepares a computer for the reference population `train`.
    ///
    /// Fails with [`MetricError::InsufficientData`] when `train` lacks an
    /// observed event, lacks a censored observation, or has fewer than two
    /// distinct event times.
    pub fn new(train: &EventTable) -> Result<Self, MetricError> {
        train.check_censoring_mix("training")?;
        let distinct = train.distinct_event_times();
        if distinct < 2 {
            return Err(MetricError::insufficient(format!(
                "training population has {distinct} distinct event time(s), at least 2 required"
            )));
        }
        Ok(Self {
            censoring: CensoringDistribution::fit(train),
        })
    }

    #[must_use]
    pub fn censoring(&self) -> &CensoringDistribution {
        &self.censoring
    }

    /// Computes concordance, Brier score and AUC at every horizon, in order.
    ///
    /// Risk at a horizon is `1 - S(horizon)` read from `curves`. The first
    /// failing horizon aborts the computation.
    pub fn compute(
        &self,
        test: &EventTable,
        curves: &SurvivalCurves,
        horizons: &[Horizon],
    ) -> Result<Vec<HorizonMetrics>, MetricError> {
        test.check_censoring_mix("test")?;
        MetricError::check_len("survival curves", test.len(), curves.n_subjects())?;
        check_grid(curves, horizons)?;

        let times = horizons.iter().map(|h| h.time).collect::<Vec<_>>();
        let survival = (0..curves.n_subjects())
            .map(|i| times.iter().map(|&t| curves.survival_at(i, t)).collect())
            .collect::<Vec<Vec<f64>>>();
        let briers = brier_score(&self.censoring, test, &survival, &times)?;

        horizons
            .iter()
            .zip(briers)
            .enumerate()
            .map(|(k, (horizon, brier))| {
                let risk = survival.iter().map(|row| 1.0 - row[k]).collect::<Vec<_>>();
                let concordance_ipcw =
                    concordance_index_ipcw(&self.censoring, test, &risk, Some(horizon.time))?;
                let auroc = cumulative_dynamic_auc(&self.censoring, test, &risk, horizon.time)?;
                log::debug!(
                    "horizon {}: C-td(ipcw)={concordance_ipcw:.4} brier={brier:.4} auroc={auroc:.4}",
                    horizon.label
                );
                Ok(HorizonMetrics {
                    horizon: horizon.clone(),
                    concordance_ipcw,
                    brier,
                    auroc,
                })
            })
            .collect()
    }
}

/// Every horizon needs its own grid column, and none may precede the grid.
fn check_grid(curves: &SurvivalCurves, horizons: &[Horizon]) -> Result<(), MetricError> {
    let times = curves.times();
    if horizons.is_empty() || horizons.len() > times.len() {
        return Err(MetricError::ShapeMismatch {
            what: "survival grid columns for horizons",
            expected: horizons.len().max(1),
            actual: times.len(),
        });
    }
    let (first, last) = (times[0], times[times.len() - 1]);
    match horizons.iter().find(|h| h.time.is_nan() || h.time < first) {
        Some(h) => Err(MetricError::TimeOutOfRange {
            time: h.time,
            lower: first,
            upper: last,
        }),
        None => Ok(()),
    }
}

/// One-shot form of [`MetricComputer`]: fits the reference population and
/// scores `test` in a single call.
pub fn compute_metrics(
    train: &EventTable,
    test: &EventTable,
    curves: &SurvivalCurves,
    horizons: &[Horizon],
) -> Result<Vec<HorizonMetrics>, MetricError> {
    MetricComputer::new(train)?.compute(test, curves, horizons)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_distr::{Distribution, Exp};
    use rand_pcg::Pcg64;

    use super::*;

    /// Exponential event and censoring times; returns (table, hazard per subject).
    fn synthetic(rng: &mut Pcg64, n: usize) -> (EventTable, Vec<f64>) {
        let censor = Exp::new(0.3).unwrap();
        let mut hazards = Vec::with_capacity(n);
        let table = (0..n)
            .map(|_| {
                let hazard: f64 = rng.random_range(0.2..2.0);
                hazards.push(hazard);
                let event_time = Exp::new(hazard).unwrap().sample(&mut *rng);
                let censor_time = censor.sample(&mut *rng);
                (event_time <= censor_time, event_time.min(censor_time))
            })
            .collect();
        (table, hazards)
    }

    /// Reference population whose follow-up outlasts any synthetic test subject.
    fn reference(rng: &mut Pcg64, n: usize) -> EventTable {
        let (table, _) = synthetic(rng, n);
        table
            .iter()
            .copied()
            .chain(std::iter::once(crate::EventRecord {
                event: false,
                time: 1000.0,
            }))
            .collect()
    }

    fn curves_for(hazards: &[f64], grid: &[f64]) -> SurvivalCurves {
        let rows = hazards
            .iter()
            .map(|h| grid.iter().map(|t| (-h * t).exp()).collect())
            .collect();
        SurvivalCurves::new(grid.to_vec(), rows).unwrap()
    }

    fn horizons_for(test: &EventTable) -> Vec<Horizon> {
        let mut event_times = test
            .iter()
            .filter(|r| r.event)
            .map(|r| r.time)
            .collect::<Vec<_>>();
        event_times.sort_by(f64::total_cmp);
        [0.25, 0.5, 0.75]
            .into_iter()
            .map(|q| {
                Horizon::new(
                    q.to_string(),
                    survtd_stats::percentiles::compute_quantile(&event_times, q),
                )
            })
            .collect()
    }

    #[test]
    fn test_rejects_degenerate_training_population() {
        let single_time: EventTable = [(true, 1.0), (true, 1.0), (false, 2.0)]
            .into_iter()
            .collect();
        assert!(matches!(
            MetricComputer::new(&single_time),
            Err(MetricError::InsufficientData { .. })
        ));
        let no_censoring: EventTable = [(true, 1.0), (true, 2.0)].into_iter().collect();
        assert!(matches!(
            MetricComputer::new(&no_censoring),
            Err(MetricError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_true_hazards_discriminate() {
        let mut rng = Pcg64::seed_from_u64(7);
        let train = reference(&mut rng, 400);
        let (test, hazards) = synthetic(&mut rng, 200);
        let grid = (0..=200).map(|k| f64::from(k) * 0.05).collect::<Vec<_>>();
        let curves = curves_for(&hazards, &grid);
        let horizons = horizons_for(&test);

        let metrics = compute_metrics(&train, &test, &curves, &horizons).unwrap();
        assert_eq!(metrics.len(), 3);
        for (m, h) in metrics.iter().zip(&horizons) {
            assert_eq!(&m.horizon, h);
            assert!(m.concordance_ipcw > 0.55 && m.concordance_ipcw <= 1.0);
            assert!(m.auroc > 0.55 && m.auroc <= 1.0);
            assert!((0.0..=1.0).contains(&m.brier));
        }
    }

    #[test]
    fn test_constant_prediction_is_uninformative() {
        let mut rng = Pcg64::seed_from_u64(11);
        let train = reference(&mut rng, 300);
        let (test, _) = synthetic(&mut rng, 150);
        let grid = (0..=100).map(|k| f64::from(k) * 0.1).collect::<Vec<_>>();
        let curves = curves_for(&vec![0.8; test.len()], &grid);
        let horizons = horizons_for(&test);

        let metrics = MetricComputer::new(&train)
            .unwrap()
            .compute(&test, &curves, &horizons)
            .unwrap();
        for m in metrics {
            assert_abs_diff_eq!(m.concordance_ipcw, 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(m.auroc, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_grid_must_cover_horizons() {
        let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 4.0)]
            .into_iter()
            .collect();
        let test: EventTable = [(true, 1.0), (false, 3.0)].into_iter().collect();
        let coarse = SurvivalCurves::new(vec![0.0], vec![vec![1.0]; 2]).unwrap();
        let horizons = [Horizon::new("early", 1.0), Horizon::new("late", 2.0)];
        let err = compute_metrics(&train, &test, &coarse, &horizons).unwrap_err();
        assert!(matches!(
            err,
            MetricError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));

        let err = compute_metrics(&train, &test, &coarse, &[]).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { .. }));

        let late_start = SurvivalCurves::new(vec![1.5, 2.5], vec![vec![0.9, 0.5]; 2]).unwrap();
        let err = compute_metrics(&train, &test, &late_start, &[Horizon::new("mid", 1.0)])
            .unwrap_err();
        assert!(matches!(err, MetricError::TimeOutOfRange { time, .. } if time == 1.0));
    }

    #[test]
    fn test_curve_count_must_match() {
        let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 4.0)]
            .into_iter()
            .collect();
        let test: EventTable = [(true, 1.0), (false, 3.0)].into_iter().collect();
        let curves = SurvivalCurves::new(vec![0.0, 2.0], vec![vec![1.0, 0.5]]).unwrap();
        let err = compute_metrics(&train, &test, &curves, &[Horizon::new("mid", 2.0)]).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { .. }));
    }
}
