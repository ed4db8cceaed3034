use std::collections::{BTreeMap, btree_map};

use serde::Serialize;

/// Metric values of one evaluation run, keyed by metric name.
///
/// Names are horizon-qualified (`"0.5_brier"`) and, for competing risks,
/// risk-qualified (`"0.5_brier_1"`). Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricRecord(BTreeMap<String, f64>);

impl MetricRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl Extend<(String, f64)> for MetricRecord {
    fn extend<T: IntoIterator<Item = (String, f64)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<(String, f64)> for MetricRecord {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MetricRecord {
    type Item = (String, f64);
    type IntoIter = btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Bootstrap mean of one metric with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Bootstrap summaries keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BootstrapRecord(BTreeMap<String, MetricSummary>);

impl BootstrapRecord {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricSummary> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricSummary)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record of the bootstrap means only.
    #[must_use]
    pub fn means(&self) -> MetricRecord {
        self.0.iter().map(|(k, s)| (k.clone(), s.mean)).collect()
    }
}

impl FromIterator<(String, MetricSummary)> for BootstrapRecord {
    fn from_iter<T: IntoIterator<Item = (String, MetricSummary)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of an evaluation call: point estimates, or bootstrap summaries
/// when a confidence level was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "metrics", rename_all = "snake_case")]
pub enum EvaluationReport {
    Point(MetricRecord),
    Bootstrap(BootstrapRecord),
}

impl EvaluationReport {
    /// Point value, or bootstrap mean, of metric `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        match self {
            EvaluationReport::Point(record) => record.get(name),
            EvaluationReport::Bootstrap(record) => record.get(name).map(|s| s.mean),
        }
    }
}
