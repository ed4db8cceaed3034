//! Concordance indices for right-censored data.
//!
//! [`concordance_index_ipcw`] is Uno's estimator: the usual pairwise
//! concordance, with each pair weighted by the squared inverse probability of
//! censoring at the earlier subject's event time. Restricting to subjects
//! observed before a truncation time `tau` gives the time-dependent index
//! reported per horizon.
//!
//! [`concordance_td_antolini`] is the whole-curve index of Antolini et al.,
//! which compares full predicted survival curves instead of a single risk
//! score.

use std::cmp::Ordering;

use crate::{CensoringDistribution, EventTable, MetricError, SurvivalCurves};

/// Risk scores closer than this are treated as tied.
pub const TIED_TOL: f64 = 1e-8;

/// Time-truncated, IPCW-weighted concordance index.
///
/// Higher `risk` must mean earlier expected failure. Test subjects observed
/// at or after `tau` receive zero weight; pass `None` to use every subject.
///
/// # Examples
///
/// ```
/// use survtd_metrics::{CensoringDistribution, EventTable, concordance::concordance_index_ipcw};
///
/// let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 4.0)]
///     .into_iter()
///     .collect();
/// let censoring = CensoringDistribution::fit(&train);
/// let test: EventTable = [(true, 1.0), (true, 2.0), (false, 3.0)].into_iter().collect();
///
/// // perfectly ordered risks
/// let c = concordance_index_ipcw(&censoring, &test, &[0.9, 0.5, 0.1], Some(3.0)).unwrap();
/// assert_eq!(c, 1.0);
/// ```
pub fn concordance_index_ipcw(
    censoring: &CensoringDistribution,
    test: &EventTable,
    risk: &[f64],
    tau: Option<f64>,
) -> Result<f64, MetricError> {
    MetricError::check_len("risk scores", test.len(), risk.len())?;

    let in_window = |t: f64| tau.is_none_or(|tau| t < tau);
    let observed = test
        .iter()
        .filter(|r| in_window(r.time))
        .copied()
        .collect::<EventTable>();
    let mut observed_ipcw = censoring.ipcw(&observed)?.into_iter();

    let weights = test
        .iter()
        .map(|r| {
            if in_window(r.time) {
                observed_ipcw.next().unwrap_or(0.0).powi(2)
            } else {
                0.0
            }
        })
        .collect::<Vec<_>>();

    estimate_concordance_index(test, risk, &weights)
}

/// Weighted Harrell-style concordance shared by the IPCW estimator.
///
/// A pair `(i, j)` is comparable if `i` had an event and either `t_j > t_i`
/// or `t_j == t_i` with `j` censored. Tied risks count one half.
fn estimate_concordance_index(
    table: &EventTable,
    risk: &[f64],
    weights: &[f64],
) -> Result<f64, MetricError> {
    let records = table.records();
    let n = records.len();
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&a, &b| records[a].time.total_cmp(&records[b].time));

    let mut any_comparable = false;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    let mut i = 0;
    while i + 1 < n {
        let time_i = records[order[i]].time;
        let mut end = i + 1;
        while end < n && records[order[end]].time.total_cmp(&time_i) == Ordering::Equal {
            end += 1;
        }

        for &subject in &order[i..end] {
            if !records[subject].event {
                continue;
            }
            // later subjects, plus subjects censored at the same time
            let tied_censored = order[i..end].iter().filter(|&&k| !records[k].event);
            let comparable = order[end..].iter().chain(tied_censored);

            let est_i = risk[subject];
            let w_i = weights[subject];
            let mut n_pairs = 0_u32;
            let mut n_concordant = 0_u32;
            let mut n_ties = 0_u32;
            for &k in comparable {
                n_pairs += 1;
                let est_k = risk[k];
                if (est_k - est_i).abs() <= TIED_TOL {
                    n_ties += 1;
                } else if est_k < est_i {
                    n_concordant += 1;
                }
            }
            if n_pairs > 0 {
                any_comparable = true;
            }
            numerator += w_i * f64::from(n_concordant) + 0.5 * w_i * f64::from(n_ties);
            denominator += w_i * f64::from(n_pairs);
        }
        i = end;
    }

    if !any_comparable {
        return Err(MetricError::NoComparablePairs);
    }
    Ok(numerator / denominator)
}

/// Whole-curve time-dependent concordance (Antolini).
///
/// For an event subject `i` observed at `t_i`, every subject `j` with
/// `t_j > t_i` (or `t_j == t_i` and `j` censored) forms a comparable pair.
/// The pair is concordant when `S_i(t_i) < S_j(t_i)`, both read from the
/// predicted curves at `t_i`. Tied survival values are not concordant.
pub fn concordance_td_antolini(
    test: &EventTable,
    curves: &SurvivalCurves,
) -> Result<f64, MetricError> {
    MetricError::check_len("survival curves", test.len(), curves.n_subjects())?;

    let records = test.records();
    let mut comparable = 0_u64;
    let mut concordant = 0_u64;
    for (i, ri) in records.iter().enumerate() {
        if !ri.event {
            continue;
        }
        let idx = curves.index_at(ri.time);
        let s_i = curves.row(i)[idx];
        for (j, rj) in records.iter().enumerate() {
            if j == i {
                continue;
            }
            let is_comparable = ri.time < rj.time || (ri.time == rj.time && !rj.event);
            if is_comparable {
                comparable += 1;
                if s_i < curves.row(j)[idx] {
                    concordant += 1;
                }
            }
        }
    }

    if comparable == 0 {
        return Err(MetricError::NoComparablePairs);
    }
    #[expect(clippy::cast_precision_loss)]
    Ok(concordant as f64 / comparable as f64)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn train() -> EventTable {
        [
            (true, 1.0),
            (false, 1.5),
            (true, 2.0),
            (true, 3.0),
            (false, 4.0),
            (true, 5.0),
            (false, 6.0),
        ]
        .into_iter()
        .collect()
    }

    fn test_table() -> EventTable {
        [
            (true, 1.0),
            (false, 2.5),
            (true, 3.0),
            (true, 4.0),
            (false, 5.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_constant_risk_is_half() {
        let censoring = CensoringDistribution::fit(&train());
        let c = concordance_index_ipcw(&censoring, &test_table(), &[0.3; 5], Some(4.5)).unwrap();
        assert_abs_diff_eq!(c, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_risk_is_zero() {
        let censoring = CensoringDistribution::fit(&train());
        let risk = [0.1, 0.2, 0.3, 0.4, 0.5];
        let c = concordance_index_ipcw(&censoring, &test_table(), &risk, None).unwrap();
        assert_abs_diff_eq!(c, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unweighted_matches_harrell() {
        // G(t) = 1 everywhere if the reference has censoring only at the end
        let reference: EventTable = [(true, 1.0), (true, 2.0), (false, 10.0)].into_iter().collect();
        let censoring = CensoringDistribution::fit(&reference);
        let test: EventTable = [(true, 1.0), (true, 2.0), (false, 3.0), (true, 4.0)]
            .into_iter()
            .collect();
        // pairs: (0,1) c, (0,2) c, (0,3) d, (1,2) tie, (1,3) d
        let risk = [0.9, 0.5, 0.5, 0.95];
        let c = concordance_index_ipcw(&censoring, &test, &risk, None).unwrap();
        assert_abs_diff_eq!(c, 2.5 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_event_tied_with_censoring_is_comparable() {
        let reference: EventTable = [(true, 1.0), (false, 5.0)].into_iter().collect();
        let censoring = CensoringDistribution::fit(&reference);
        let test: EventTable = [(true, 2.0), (false, 2.0)].into_iter().collect();
        let c = concordance_index_ipcw(&censoring, &test, &[0.8, 0.2], None).unwrap();
        assert_abs_diff_eq!(c, 1.0);
    }

    #[test]
    fn test_no_comparable_pairs() {
        let censoring = CensoringDistribution::fit(&train());
        let test: EventTable = [(false, 1.0), (false, 2.0), (true, 3.0)].into_iter().collect();
        assert_eq!(
            concordance_index_ipcw(&censoring, &test, &[0.1, 0.2, 0.3], None),
            Err(MetricError::NoComparablePairs)
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let censoring = CensoringDistribution::fit(&train());
        assert!(matches!(
            concordance_index_ipcw(&censoring, &test_table(), &[0.1], None),
            Err(MetricError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_antolini_perfect_and_constant() {
        let test: EventTable = [(true, 1.0), (true, 2.0), (false, 3.0)].into_iter().collect();
        let times = vec![0.0, 1.0, 2.0, 3.0];
        let ordered = SurvivalCurves::new(
            times.clone(),
            vec![
                vec![1.0, 0.2, 0.1, 0.0],
                vec![1.0, 0.6, 0.3, 0.2],
                vec![1.0, 0.9, 0.8, 0.7],
            ],
        )
        .unwrap();
        assert_abs_diff_eq!(concordance_td_antolini(&test, &ordered).unwrap(), 1.0);

        let constant = SurvivalCurves::new(times, vec![vec![1.0, 0.7, 0.5, 0.4]; 3]).unwrap();
        assert_abs_diff_eq!(concordance_td_antolini(&test, &constant).unwrap(), 0.0);
    }

    #[test]
    fn test_antolini_compares_at_event_time() {
        // Curves cross: subject 1 is riskier early, subject 0 is riskier late.
        let test: EventTable = [(true, 2.0), (false, 3.0)].into_iter().collect();
        let curves = SurvivalCurves::new(
            vec![0.0, 1.0, 2.0],
            vec![vec![1.0, 0.9, 0.3], vec![1.0, 0.5, 0.4]],
        )
        .unwrap();
        // at t=2: S_0 = 0.3 < S_1 = 0.4
        assert_abs_diff_eq!(concordance_td_antolini(&test, &curves).unwrap(), 1.0);
    }
}
