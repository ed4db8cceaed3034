use crate::{CensoringDistribution, EventTable, MetricError, concordance::TIED_TOL};

/// Checks that every evaluation time lies within the follow-up of `test`:
/// `[min observed time, max observed time)`.
pub(crate) fn check_follow_up(test: &EventTable, times: &[f64]) -> Result<(), MetricError> {
    let (lower, upper) = test
        .time_range()
        .ok_or_else(|| MetricError::insufficient("test population is empty"))?;
    match times.iter().find(|&&t| !(t >= lower && t < upper)) {
        Some(&time) => Err(MetricError::TimeOutOfRange { time, lower, upper }),
        None => Ok(()),
    }
}

/// Cumulative/dynamic AUC at time `t`.
///
/// Cases are subjects with an event at or before `t`, weighted by their
/// inverse probability of censoring; controls are subjects still event-free
/// after `t`. The ROC curve is traced by lowering the risk threshold, keeping
/// one point per distinct risk value, and integrated with the trapezoid rule.
///
/// Returns `NaN` when there are no cases or no controls at `t`.
///
/// # Examples
///
/// ```
/// use survtd_metrics::{CensoringDistribution, EventTable, auc::cumulative_dynamic_auc};
///
/// let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 5.0)]
///     .into_iter()
///     .collect();
/// let censoring = CensoringDistribution::fit(&train);
/// let test: EventTable = [(true, 1.0), (true, 2.0), (false, 3.0), (true, 4.0)]
///     .into_iter()
///     .collect();
///
/// // the two early failures have the highest risks
/// let auc = cumulative_dynamic_auc(&censoring, &test, &[0.9, 0.8, 0.2, 0.1], 2.5).unwrap();
/// assert_eq!(auc, 1.0);
/// ```
pub fn cumulative_dynamic_auc(
    censoring: &CensoringDistribution,
    test: &EventTable,
    risk: &[f64],
    t: f64,
) -> Result<f64, MetricError> {
    MetricError::check_len("risk scores", test.len(), risk.len())?;
    check_follow_up(test, &[t])?;
    let ipcw = censoring.ipcw(test)?;

    let records = test.records();
    let mut order = (0..records.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| risk[b].total_cmp(&risk[a]));

    let n_controls = records.iter().filter(|r| r.time > t).count();

    let mut cumsum_tp = Vec::with_capacity(order.len());
    let mut cumsum_fp = Vec::with_capacity(order.len());
    let (mut tp, mut fp) = (0.0, 0_usize);
    for &k in &order {
        let r = &records[k];
        if r.event && r.time <= t {
            tp += ipcw[k];
        }
        if r.time > t {
            fp += 1;
        }
        cumsum_tp.push(tp);
        cumsum_fp.push(fp);
    }

    #[expect(clippy::cast_precision_loss)]
    let n_controls = n_controls as f64;
    let mut points = vec![(0.0, 0.0)];
    for pos in 0..order.len() {
        // keep only the last position of a run of tied risks
        let tied_with_next = order
            .get(pos + 1)
            .is_some_and(|&next| (risk[next] - risk[order[pos]]).abs() <= TIED_TOL);
        if tied_with_next {
            continue;
        }
        #[expect(clippy::cast_precision_loss)]
        let false_pos = cumsum_fp[pos] as f64 / n_controls;
        let true_pos = cumsum_tp[pos] / tp;
        points.push((false_pos, true_pos));
    }

    Ok(points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[1].1 + w[0].1) / 2.0)
        .sum())
}
