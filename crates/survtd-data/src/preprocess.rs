use survtd_stats::descriptive::RunningMoments;

use crate::{DataError, DatasetKind, SurvivalFrame};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnScale {
    mean: f64,
    std_dev: f64,
}

/// Covariate preprocessing fitted on a training frame.
///
/// Categorical columns are passed through and placed first, followed by the
/// numeric columns centered and scaled by their population standard
/// deviation. A constant column is only centered.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    leave: Vec<String>,
    standardize: Vec<(String, ColumnScale)>,
}

impl Standardizer {
    pub fn fit(frame: &SurvivalFrame, kind: DatasetKind) -> Result<Self, DataError> {
        if frame.is_empty() {
            return Err(DataError::Empty);
        }
        for name in kind.leave_columns() {
            frame.column_index(name)?;
        }
        let standardize = kind
            .standardize_columns()
            .iter()
            .map(|&name| {
                let values = frame.column_values(name)?;
                Ok((name.to_owned(), ColumnScale::fit(&values)))
            })
            .collect::<Result<Vec<_>, DataError>>()?;
        Ok(Self {
            leave: kind.leave_columns().iter().map(|&c| c.to_owned()).collect(),
            standardize,
        })
    }

    /// Number of leading categorical columns in transformed rows.
    #[must_use]
    pub fn n_categorical(&self) -> usize {
        self.leave.len()
    }

    /// Column names of transformed rows.
    pub fn output_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.leave
            .iter()
            .map(String::as_str)
            .chain(self.standardize.iter().map(|(name, _)| name.as_str()))
    }

    pub fn transform(&self, frame: &SurvivalFrame) -> Result<Vec<Vec<f64>>, DataError> {
        let leave_idx = self
            .leave
            .iter()
            .map(|name| frame.column_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        let scaled_idx = self
            .standardize
            .iter()
            .map(|(name, scale)| Ok((frame.column_index(name)?, *scale)))
            .collect::<Result<Vec<_>, DataError>>()?;

        let rows = frame
            .rows()
            .iter()
            .map(|row| {
                leave_idx
                    .iter()
                    .map(|&i| row[i])
                    .chain(scaled_idx.iter().map(|&(i, scale)| scale.apply(row[i])))
                    .collect()
            })
            .collect();
        Ok(rows)
    }
}

impl ColumnScale {
    fn fit(values: &[f64]) -> Self {
        let moments: RunningMoments = values.iter().copied().collect();
        let (mean, variance) = (moments.mean(), moments.population_variance());
        // Sum-of-squares cancellation leaves a residue on constant columns.
        let std_dev = if variance > 1e-12 * mean * mean {
            variance.sqrt()
        } else {
            1.0
        };
        Self { mean, std_dev }
    }

    fn apply(self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use survtd_evaluator::SurvivalLabel;

    use super::*;

    fn gbsg_frame(rows: Vec<Vec<f64>>) -> SurvivalFrame {
        let columns = (0..7).map(|i| format!("x{i}")).collect();
        let labels = vec![SurvivalLabel::censored(1.0); rows.len()];
        SurvivalFrame::new(columns, rows, labels).unwrap()
    }

    #[test]
    fn test_categorical_first_then_scaled() {
        let train = gbsg_frame(vec![
            vec![1.0, 0.0, 2.0, 10.0, 5.0, 0.0, 7.0],
            vec![0.0, 1.0, 3.0, 20.0, 5.0, 2.0, 7.0],
        ]);
        let standardizer = Standardizer::fit(&train, DatasetKind::Gbsg).unwrap();
        assert_eq!(standardizer.n_categorical(), 3);
        assert_eq!(
            standardizer.output_columns().collect::<Vec<_>>(),
            ["x0", "x1", "x2", "x3", "x4", "x5", "x6"]
        );

        let rows = standardizer.transform(&train).unwrap();
        assert_eq!(&rows[0][..3], &[1.0, 0.0, 2.0]);
        // population std of [10, 20] is 5
        assert_abs_diff_eq!(rows[0][3], -1.0);
        assert_abs_diff_eq!(rows[1][3], 1.0);
        // constant columns are centered only
        assert_abs_diff_eq!(rows[0][4], 0.0);
        assert_abs_diff_eq!(rows[1][6], 0.0);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train = gbsg_frame(vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
        ]);
        let test = gbsg_frame(vec![vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0]]);
        let standardizer = Standardizer::fit(&train, DatasetKind::Gbsg).unwrap();
        let rows = standardizer.transform(&test).unwrap();
        assert_abs_diff_eq!(rows[0][3], 4.0);
    }

    #[test]
    fn test_scale_matches_running_moments() {
        let values = [61.0, 48.5, 72.25, 55.0, 66.75];
        let moments: RunningMoments = values.iter().copied().collect();
        let scale = ColumnScale::fit(&values);
        assert_abs_diff_eq!(scale.mean, moments.mean(), epsilon = 1e-12);
        assert_abs_diff_eq!(scale.std_dev, moments.population_std_dev(), epsilon = 1e-12);

        // a single row and an inexact constant column are only centered
        assert_eq!(ColumnScale::fit(&[3.5]).std_dev, 1.0);
        let constant = ColumnScale::fit(&[0.3; 50]);
        assert_eq!(constant.std_dev, 1.0);
        assert_abs_diff_eq!(constant.apply(0.3), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_layout_column() {
        let frame = gbsg_frame(vec![vec![0.0; 7]]);
        assert!(matches!(
            Standardizer::fit(&frame, DatasetKind::Support),
            Err(DataError::MissingColumn { .. })
        ));
    }
}
