use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::MetricError;

/// One subject's observed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `true` if the event was observed, `false` if the subject was censored.
    pub event: bool,
    /// Observed time: event time or censoring time.
    pub time: f64,
}

/// Observed outcome of one subject, possibly with one of several event types.
///
/// `event` is `None` for a censored subject and `Some(r)` (zero-based) when
/// an event of type `r` was observed at `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalLabel {
    pub duration: f64,
    pub event: Option<usize>,
}

impl SurvivalLabel {
    #[must_use]
    pub fn event(duration: f64, event_type: usize) -> Self {
        Self {
            duration,
            event: Some(event_type),
        }
    }

    #[must_use]
    pub fn censored(duration: f64) -> Self {
        Self {
            duration,
            event: None,
        }
    }
}

/// Ordered outcomes of a population, one record per subject.
///
/// Used both for the population being scored and as the reference population
/// whose censoring distribution weights the metrics.
///
/// # Examples
///
/// ```
/// use survtd_metrics::EventTable;
///
/// let table: EventTable = [(true, 3.0), (false, 5.0), (true, 1.0)].into_iter().collect();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.event_count(), 2);
/// assert_eq!(table.distinct_event_times(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    records: Vec<EventRecord>,
}

impl EventTable {
    /// Builds a table, rejecting negative or non-finite durations.
    pub fn new(records: Vec<EventRecord>) -> Result<Self, MetricError> {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !r.time.is_finite() || r.time < 0.0)
        {
            return Err(MetricError::InvalidDuration {
                index,
                duration: record.time,
            });
        }
        Ok(Self { records })
    }

    /// Table where any observed event counts as an event.
    pub fn from_labels(labels: &[SurvivalLabel]) -> Result<Self, MetricError> {
        Self::new(
            labels
                .iter()
                .map(|l| EventRecord {
                    event: l.event.is_some(),
                    time: l.duration,
                })
                .collect(),
        )
    }

    /// Cause-specific table for event type `risk`.
    ///
    /// Subjects with an event of another type are treated as censored at
    /// their event time.
    pub fn for_risk(labels: &[SurvivalLabel], risk: usize) -> Result<Self, MetricError> {
        Self::new(
            labels
                .iter()
                .map(|l| EventRecord {
                    event: l.event == Some(risk),
                    time: l.duration,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.records.iter()
    }

    /// Observed times in subject order.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    /// Event indicators in subject order.
    #[must_use]
    pub fn events(&self) -> Vec<bool> {
        self.records.iter().map(|r| r.event).collect()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.records.iter().filter(|r| r.event).count()
    }

    #[must_use]
    pub fn censored_count(&self) -> usize {
        self.len() - self.event_count()
    }

    /// Number of distinct times at which an event was observed.
    #[must_use]
    pub fn distinct_event_times(&self) -> usize {
        let mut times = self
            .records
            .iter()
            .filter(|r| r.event)
            .map(|r| r.time)
            .collect::<Vec<_>>();
        times.sort_by(f64::total_cmp);
        times.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        times.len()
    }

    /// Smallest and largest observed time, `None` for an empty table.
    #[must_use]
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.records.iter().map(|r| r.time);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Data in the `(time, is_censored)` form the Kaplan-Meier estimator expects.
    #[must_use]
    pub fn to_km_data(&self) -> Vec<(f64, bool)> {
        self.records.iter().map(|r| (r.time, !r.event)).collect()
    }

    /// Checks that the table holds at least one observed event and one
    /// censored observation.
    ///
    /// `role` names the population in the error message.
    pub fn check_censoring_mix(&self, role: &str) -> Result<(), MetricError> {
        if self.event_count() == 0 {
            return Err(MetricError::insufficient(format!(
                "{role} population has no observed event"
            )));
        }
        if self.censored_count() == 0 {
            return Err(MetricError::insufficient(format!(
                "{role} population has no censored observation"
            )));
        }
        Ok(())
    }
}

impl FromIterator<EventRecord> for EventTable {
    /// Collects records without validation; use [`EventTable::new`] for
    /// untrusted durations.
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(bool, f64)> for EventTable {
    fn from_iter<I: IntoIterator<Item = (bool, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(event, time)| EventRecord { event, time })
            .collect()
    }
}
