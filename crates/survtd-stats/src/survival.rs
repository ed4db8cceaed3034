use std::cmp::Ordering;

/// Kaplan-Meier survival curve for survival analysis.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the study period).
///
/// # Fields
///
/// The curve stores parallel vectors representing the survival function at discrete time points:
/// - Time points where the survival probability drops
/// - Survival probability at each time point
/// - Number of subjects at risk at each time point
/// - Number of events counted at each time point
#[derive(Debug, Clone)]
pub struct KaplanMeierCurve {
    /// Time points where events occurred.
    pub times: Vec<f64>,
    /// Survival probability at each corresponding time point.
    /// Values range from 0.0 (no survival) to 1.0 (complete survival).
    pub survival_prob: Vec<f64>,
    /// Number of subjects at risk at each time point.
    pub at_risk: Vec<usize>,
    /// Number of events that occurred at each time point.
    pub events: Vec<usize>,
}

/// Per-time tallies of a sorted sample: (time, at risk, events, censored).
fn tally(mut data: Vec<(f64, bool)>) -> Vec<(f64, usize, usize, usize)> {
    data.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total = data.len();
    let mut counts = vec![];
    let mut i = 0;
    while i < data.len() {
        let current_time = data[i].0;
        let at_risk = total - i;
        let mut event_count = 0;
        let mut censored_count = 0;
        let mut j = i;
        while j < data.len() && data[j].0.total_cmp(&current_time) == Ordering::Equal {
            if data[j].1 {
                censored_count += 1;
            } else {
                event_count += 1;
            }
            j += 1;
        }
        counts.push((current_time, at_risk, event_count, censored_count));
        i = j;
    }
    counts
}

impl KaplanMeierCurve {
    fn empty() -> Self {
        Self {
            times: vec![],
            survival_prob: vec![],
            at_risk: vec![],
            events: vec![],
        }
    }

    /// Computes the Kaplan-Meier survival curve from survival data.
    ///
    /// # Arguments
    ///
    /// * `data` - A vector of tuples where each tuple contains:
    ///   - `time`: The time at which the observation occurred
    ///   - `is_censored`: `true` if the observation was censored (event did not occur),
    ///     `false` if the event occurred
    ///
    /// # Returns
    ///
    /// A `KaplanMeierCurve` with survival probabilities calculated at each event time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survtd_stats::survival::KaplanMeierCurve;
    /// let data = vec![
    ///     (10.0, false), // Event at time 10
    ///     (20.0, true),  // Censored at time 20
    ///     (30.0, false), // Event at time 30
    /// ];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// assert_eq!(curve.times, vec![10.0, 30.0]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(data: Vec<(f64, bool)>) -> Self {
        if data.is_empty() {
            return Self::empty();
        }

        let mut curve = Self::empty();
        let mut current_survival = 1.0;
        for (time, at_risk, event_count, _) in tally(data) {
            if event_count > 0 {
                let survival_rate = 1.0 - (event_count as f64 / at_risk as f64);
                current_survival *= survival_rate;

                curve.times.push(time);
                curve.survival_prob.push(current_survival);
                curve.at_risk.push(at_risk);
                curve.events.push(event_count);
            }
        }
        curve
    }

    /// Computes the reverse Kaplan-Meier curve, which estimates the censoring
    /// distribution `G(t) = P(C > t)`.
    ///
    /// Censored observations play the role of events. When an event and a
    /// censoring share a time point, the event is assumed to happen first, so
    /// subjects with an event at `t` are no longer at risk of being censored
    /// at `t`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survtd_stats::survival::KaplanMeierCurve;
    /// let data = vec![(1.0, false), (2.0, true), (3.0, false), (4.0, true)];
    /// let censoring = KaplanMeierCurve::reverse_from_data(data);
    /// assert_eq!(censoring.times, vec![2.0, 4.0]);
    /// assert!((censoring.survival_at(2.0) - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(censoring.survival_at(4.0), 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn reverse_from_data(data: Vec<(f64, bool)>) -> Self {
        if data.is_empty() {
            return Self::empty();
        }

        let mut curve = Self::empty();
        let mut current_survival = 1.0;
        for (time, at_risk, event_count, censored_count) in tally(data) {
            let at_risk = at_risk - event_count;
            if censored_count > 0 && at_risk > 0 {
                current_survival *= 1.0 - (censored_count as f64 / at_risk as f64);

                curve.times.push(time);
                curve.survival_prob.push(current_survival);
                curve.at_risk.push(at_risk);
                curve.events.push(censored_count);
            }
        }
        curve
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the time at which the survival probability
    /// drops to or below 50%. If the survival probability never reaches 50%,
    /// this method returns `None`.
    ///
    /// Linear interpolation is used between time points for more accurate estimates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survtd_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false), (30.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// if let Some(median) = curve.median_survival() {
    ///     println!("Median survival time: {}", median);
    /// }
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&s| s <= 0.5)?;
        if i == 0 {
            return Some(self.times[0]);
        }
        // Linear interpolation between points
        let t0 = self.times[i - 1];
        let t1 = self.times[i];
        let s0 = self.survival_prob[i - 1];
        let s1 = self.survival_prob[i];
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Returns the survival probability at a specific time.
    ///
    /// This method uses a step function: the survival probability remains constant
    /// between event times and decreases only when an event occurs.
    ///
    /// # Returns
    ///
    /// The survival probability at the specified time. Returns `1.0` if the time
    /// is before the first event, or the last known survival probability if the
    /// time is after the last event.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survtd_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0);  // Before first event
    /// assert_eq!(curve.survival_at(15.0), 0.5); // After first event
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        // Number of event times <= target time
        let idx = self.times.partition_point(|&t| t <= time);
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }

    /// Returns the survival probability after the last event time, or `1.0`
    /// for an empty curve.
    #[must_use]
    pub fn final_survival(&self) -> f64 {
        self.survival_prob.last().copied().unwrap_or(1.0)
    }
}
