use std::{fs::File, io, path::Path};

use survtd_evaluator::SurvivalLabel;

use crate::DataError;

pub const DURATION_COLUMN: &str = "duration";
pub const EVENT_COLUMN: &str = "event";

/// A survival table: named covariate columns plus one outcome per row.
///
/// In CSV form the outcome lives in the `duration` and `event` columns. An
/// event code of `0` marks a censored row and `k >= 1` an event of type
/// `k - 1`. Competing-risk tables may instead carry one 0/1 indicator column
/// `event_<r>` per event type. Every other column is a numeric covariate.
///
/// # Examples
///
/// ```
/// use survtd_data::SurvivalFrame;
///
/// let csv = "x0,x1,duration,event\n1.5,0,10.0,1\n2.5,1,4.0,0\n";
/// let frame = SurvivalFrame::from_reader(csv.as_bytes()).unwrap();
/// assert_eq!(frame.len(), 2);
/// assert_eq!(frame.columns(), &["x0", "x1"]);
/// assert_eq!(frame.column_values("x0").unwrap(), vec![1.5, 2.5]);
/// assert_eq!(frame.labels()[0].event, Some(0));
/// assert_eq!(frame.labels()[1].event, None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<SurvivalLabel>,
}

impl SurvivalFrame {
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<f64>>,
        labels: Vec<SurvivalLabel>,
    ) -> Result<Self, DataError> {
        if rows.len() != labels.len() {
            return Err(DataError::RowCount {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(DataError::RowWidth {
                row,
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            labels,
        })
    }

    pub fn from_path<P>(path: P) -> Result<Self, DataError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).map_err(csv::Error::from)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader<R>(reader: R) -> Result<Self, DataError>
    where
        R: io::Read,
    {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect::<Vec<_>>();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn {
                    name: name.to_owned(),
                })
        };
        let duration_idx = position(DURATION_COLUMN)?;
        let outcome = match position(EVENT_COLUMN) {
            Ok(idx) => Outcome::Code(idx),
            Err(err) => {
                let indicators = risk_indicator_columns(&headers);
                if indicators.is_empty() {
                    return Err(err);
                }
                Outcome::Indicators(indicators)
            }
        };
        let covariate_idx = (0..headers.len())
            .filter(|&i| i != duration_idx && !outcome.uses(i))
            .collect::<Vec<_>>();

        let mut rows = vec![];
        let mut labels = vec![];
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let field = |i: usize| -> Result<f64, DataError> {
                let raw = record.get(i).unwrap_or_default().trim();
                raw.parse::<f64>().map_err(|_| DataError::InvalidValue {
                    row,
                    column: headers[i].clone(),
                    value: raw.to_owned(),
                })
            };
            let invalid = |i: usize| DataError::InvalidValue {
                row,
                column: headers[i].clone(),
                value: record.get(i).unwrap_or_default().trim().to_owned(),
            };

            let duration = field(duration_idx)?;
            if !duration.is_finite() || duration < 0.0 {
                return Err(invalid(duration_idx));
            }
            let event = match &outcome {
                Outcome::Code(idx) => {
                    let code = field(*idx)?;
                    if !(code >= 0.0 && code.fract() == 0.0) {
                        return Err(invalid(*idx));
                    }
                    event_from_code(code)
                }
                Outcome::Indicators(indicators) => {
                    let mut event = None;
                    for &(risk, idx) in indicators {
                        let flag = field(idx)?;
                        if flag != 0.0 && flag != 1.0 {
                            return Err(invalid(idx));
                        }
                        if flag == 1.0 && event.is_none() {
                            event = Some(risk);
                        }
                    }
                    event
                }
            };

            rows.push(covariate_idx.iter().map(|&i| field(i)).collect::<Result<_, _>>()?);
            labels.push(SurvivalLabel { duration, event });
        }
        if rows.is_empty() {
            return Err(DataError::Empty);
        }

        let columns = covariate_idx.iter().map(|&i| headers[i].clone()).collect();
        Ok(Self {
            columns,
            rows,
            labels,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Covariate column names, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    #[must_use]
    pub fn labels(&self) -> &[SurvivalLabel] {
        &self.labels
    }

    pub fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::MissingColumn {
                name: name.to_owned(),
            })
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<f64>, DataError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Rows at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Row with the largest duration (the first one on ties).
    #[must_use]
    pub fn argmax_duration(&self) -> Option<usize> {
        self.labels
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, l)| match best {
                Some((_, d)) if d >= l.duration => best,
                _ => Some((i, l.duration)),
            })
            .map(|(i, _)| i)
    }

    #[must_use]
    pub fn max_duration(&self) -> f64 {
        self.labels.iter().map(|l| l.duration).fold(0.0, f64::max)
    }

    /// Durations of rows with an observed event of any type.
    #[must_use]
    pub fn event_durations(&self) -> Vec<f64> {
        self.labels
            .iter()
            .filter(|l| l.event.is_some())
            .map(|l| l.duration)
            .collect()
    }

    /// Number of event types, at least 1.
    #[must_use]
    pub fn num_event(&self) -> usize {
        self.labels
            .iter()
            .filter_map(|l| l.event)
            .max()
            .map_or(1, |max| max + 1)
    }
}

/// Where a CSV table keeps its event information.
enum Outcome {
    /// Single column of event codes.
    Code(usize),
    /// `(event type, column)` of each `event_<r>` indicator.
    Indicators(Vec<(usize, usize)>),
}

impl Outcome {
    fn uses(&self, column: usize) -> bool {
        match self {
            Outcome::Code(idx) => *idx == column,
            Outcome::Indicators(indicators) => indicators.iter().any(|&(_, idx)| idx == column),
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn event_from_code(code: f64) -> Option<usize> {
    (code > 0.0).then(|| code as usize - 1)
}

fn risk_indicator_columns(headers: &[String]) -> Vec<(usize, usize)> {
    let mut indicators = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let risk = name.strip_prefix(EVENT_COLUMN)?.strip_prefix('_')?;
            Some((risk.parse().ok()?, idx))
        })
        .collect::<Vec<_>>();
    indicators.sort_unstable();
    indicators
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_around_outcome() {
        let csv = "duration,x0,event,x1\n3.0,1,2,7\n1.0,2,0,8\n";
        let frame = SurvivalFrame::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(frame.columns(), &["x0", "x1"]);
        assert_eq!(frame.rows(), &[vec![1.0, 7.0], vec![2.0, 8.0]]);
        assert_eq!(frame.labels()[0], SurvivalLabel::event(3.0, 1));
        assert_eq!(frame.labels()[1], SurvivalLabel::censored(1.0));
        assert_eq!(frame.num_event(), 2);
    }

    #[test]
    fn test_risk_indicator_columns() {
        let csv = "x0,duration,event_1,event_0\n0.5,3.0,1,0\n0.7,2.0,0,1\n0.9,4.0,0,0\n";
        let frame = SurvivalFrame::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(frame.columns(), &["x0"]);
        assert_eq!(frame.labels()[0], SurvivalLabel::event(3.0, 1));
        assert_eq!(frame.labels()[1], SurvivalLabel::event(2.0, 0));
        assert_eq!(frame.labels()[2], SurvivalLabel::censored(4.0));
        assert_eq!(frame.num_event(), 2);

        let err = SurvivalFrame::from_reader("duration,event_0\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { column, .. } if column == "event_0"));
    }

    #[test]
    fn test_missing_outcome_column() {
        let err = SurvivalFrame::from_reader("x0,duration\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { name } if name == "event"));
    }

    #[test]
    fn test_invalid_values() {
        let read = |csv: &str| SurvivalFrame::from_reader(csv.as_bytes()).unwrap_err();

        let err = read("x0,duration,event\nabc,1,0\n");
        assert!(matches!(err, DataError::InvalidValue { row: 0, .. }));

        let err = read("x0,duration,event\n1,-1,0\n");
        assert!(matches!(err, DataError::InvalidValue { column, .. } if column == "duration"));

        let err = read("x0,duration,event\n1,1,0.5\n");
        assert!(matches!(err, DataError::InvalidValue { column, .. } if column == "event"));

        let err = read("x0,duration,event\n");
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn test_argmax_and_select() {
        let labels = vec![
            SurvivalLabel::event(2.0, 0),
            SurvivalLabel::censored(9.0),
            SurvivalLabel::censored(9.0),
        ];
        let frame =
            SurvivalFrame::new(vec!["x0".into()], vec![vec![0.0], vec![1.0], vec![2.0]], labels)
                .unwrap();
        assert_eq!(frame.argmax_duration(), Some(1));
        assert_eq!(frame.max_duration(), 9.0);
        assert_eq!(frame.event_durations(), vec![2.0]);

        let picked = frame.select(&[2, 0]);
        assert_eq!(picked.rows(), &[vec![2.0], vec![0.0]]);
        assert_eq!(picked.labels()[1], SurvivalLabel::event(2.0, 0));
    }

    #[test]
    fn test_new_checks_shapes() {
        let err = SurvivalFrame::new(vec!["x0".into()], vec![vec![0.0, 1.0]], vec![
            SurvivalLabel::censored(1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::RowWidth { row: 0, .. }));
    }
}
