use survtd_evaluator::EvaluationError;

/// Failures while reading or preparing a survival dataset.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DataError {
    #[display("failed to read CSV data: {_0}")]
    Csv(csv::Error),
    #[display("unknown dataset '{name}', expected one of support, metabric, gbsg")]
    UnknownDataset { name: String },
    #[display("missing column '{name}'")]
    MissingColumn { name: String },
    #[display("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[display("{rows} covariate rows but {labels} labels")]
    RowCount { rows: usize, labels: usize },
    #[display("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("dataset has no rows")]
    Empty,
    #[display("dataset has no observed event, cannot derive horizons")]
    NoEvents,
    #[display("invalid time grid: {reason}")]
    InvalidCuts { reason: String },
    #[display("{_0}")]
    Evaluation(EvaluationError),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<EvaluationError> for DataError {
    fn from(err: EvaluationError) -> Self {
        Self::Evaluation(err)
    }
}
