use crate::{CensoringDistribution, EventTable, MetricError, auc::check_follow_up};

/// IPCW Brier score at each of `times`.
///
/// `survival[i][k]` is the predicted probability that subject `i` survives
/// past `times[k]`. Subjects with an event by `t` contribute `S(t)^2 / G(t_i)`,
/// subjects still at risk after `t` contribute `(1 - S(t))^2 / G(t)`, and
/// subjects censored before `t` contribute nothing. A zero censoring
/// probability is treated as an infinite denominator.
///
/// # Examples
///
/// ```
/// use survtd_metrics::{CensoringDistribution, EventTable, brier::brier_score};
///
/// let train: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 5.0)]
///     .into_iter()
///     .collect();
/// let censoring = CensoringDistribution::fit(&train);
/// let test: EventTable = [(true, 1.0), (false, 2.0), (true, 3.0), (false, 4.0)]
///     .into_iter()
///     .collect();
///
/// // an oracle: zero survival for subjects that failed by t, one otherwise
/// let oracle = vec![vec![0.0], vec![1.0], vec![1.0], vec![1.0]];
/// let scores = brier_score(&censoring, &test, &oracle, &[1.5]).unwrap();
/// assert_eq!(scores, vec![0.0]);
/// ```
pub fn brier_score(
    censoring: &CensoringDistribution,
    test: &EventTable,
    survival: &[Vec<f64>],
    times: &[f64],
) -> Result<Vec<f64>, MetricError> {
    MetricError::check_len("survival predictions", test.len(), survival.len())?;
    for row in survival {
        MetricError::check_len("survival prediction times", times.len(), row.len())?;
    }
    check_follow_up(test, times)?;

    let inverse_or_zero = |g: f64| if g == 0.0 { 0.0 } else { 1.0 / g };
    let weight_at_t = times
        .iter()
        .map(|&t| censoring.predict(t).map(inverse_or_zero))
        .collect::<Result<Vec<_>, _>>()?;
    let weight_at_y = test
        .iter()
        .map(|r| censoring.predict(r.time).map(inverse_or_zero))
        .collect::<Result<Vec<_>, _>>()?;

    #[expect(clippy::cast_precision_loss)]
    let n = test.len() as f64;
    let scores = times
        .iter()
        .enumerate()
        .map(|(k, &t)| {
            let total = test
                .iter()
                .zip(survival)
                .zip(&weight_at_y)
                .map(|((r, row), &w_y)| {
                    let s = row[k];
                    if r.event && r.time <= t {
                        s * s * w_y
                    } else if r.time > t {
                        (1.0 - s) * (1.0 - s) * weight_at_t[k]
                    } else {
                        0.0
                    }
                })
                .sum::<f64>();
            total / n
        })
        .collect();
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn censoring() -> CensoringDistribution {
        let train: EventTable = [
            (true, 1.0),
            (false, 2.0),
            (true, 3.0),
            (true, 4.0),
            (false, 6.0),
        ]
        .into_iter()
        .collect();
        CensoringDistribution::fit(&train)
    }

    fn test_table() -> EventTable {
        [(true, 1.0), (false, 2.0), (true, 3.0), (false, 5.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_oracle_scores_zero_at_every_time() {
        let times = [1.5, 3.5];
        let oracle = test_table()
            .iter()
            .map(|r| {
                times
                    .iter()
                    .map(|&t| if r.event && r.time <= t { 0.0 } else { 1.0 })
                    .collect()
            })
            .collect::<Vec<_>>();
        let scores = brier_score(&censoring(), &test_table(), &oracle, &times).unwrap();
        for score in scores {
            assert_abs_diff_eq!(score, 0.0);
        }
    }

    #[test]
    fn test_weighted_terms() {
        // t = 3.5: case 0 (G=1), case 2 (G(3)=0.75), censored 1 drops out,
        // control 3 weighted by 1/G(3.5) = 4/3
        let survival = vec![vec![0.5], vec![0.5], vec![0.2], vec![0.9]];
        let scores = brier_score(&censoring(), &test_table(), &survival, &[3.5]).unwrap();
        let expected = (0.25 + 0.04 / 0.75 + 0.01 / 0.75) / 4.0;
        assert_abs_diff_eq!(scores[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_bounded_for_probabilities() {
        let survival = vec![vec![0.3, 0.1]; 4];
        let scores = brier_score(&censoring(), &test_table(), &survival, &[1.5, 3.5]).unwrap();
        for score in scores {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_shape_checks() {
        let err = brier_score(&censoring(), &test_table(), &[vec![0.5]], &[1.5]).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { .. }));
        let err =
            brier_score(&censoring(), &test_table(), &vec![vec![0.5, 0.4]; 4], &[1.5]).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { .. }));
    }
}
