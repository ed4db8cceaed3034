use crate::DataError;

/// Benchmark datasets with a known covariate layout.
///
/// Parsed case-insensitively from its variant name.
///
/// # Examples
///
/// ```
/// use survtd_data::DatasetKind;
///
/// let kind = DatasetKind::from_name("METABRIC").unwrap();
/// assert_eq!(kind, DatasetKind::Metabric);
/// assert_eq!(kind.leave_columns(), &["x4", "x5", "x6", "x7"]);
/// assert!(DatasetKind::from_name("flchain").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum DatasetKind {
    Support,
    Metabric,
    Gbsg,
}

impl DatasetKind {
    pub const ALL: [Self; 3] = [Self::Support, Self::Metabric, Self::Gbsg];

    pub fn from_name(name: &str) -> Result<Self, DataError> {
        name.trim()
            .parse()
            .map_err(|_| DataError::UnknownDataset {
                name: name.to_owned(),
            })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Support => "support",
            DatasetKind::Metabric => "metabric",
            DatasetKind::Gbsg => "gbsg",
        }
    }

    /// Numeric columns that are standardized.
    #[must_use]
    pub fn standardize_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Support => &["x0", "x7", "x8", "x9", "x10", "x11", "x12", "x13"],
            DatasetKind::Metabric => &["x0", "x1", "x2", "x3", "x8"],
            DatasetKind::Gbsg => &["x3", "x4", "x5", "x6"],
        }
    }

    /// Categorical columns passed through unchanged.
    #[must_use]
    pub fn leave_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Support => &["x1", "x2", "x3", "x4", "x5", "x6"],
            DatasetKind::Metabric => &["x4", "x5", "x6", "x7"],
            DatasetKind::Gbsg => &["x0", "x1", "x2"],
        }
    }
}
