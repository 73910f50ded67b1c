//! Classified panel data ready for display.
//!
//! This module turns a batch of regression results into the list of
//! classifications the UI renders, together with per-state counts.

use std::time::Instant;

use chrono::{DateTime, Utc};

use trendwatch_types::{Classification, ResultBatch, State, Warning};

use super::classify::{classify_with_horizon, ClassifyError, Horizon};

/// Number of classifications in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateCounts {
    pub ok: usize,
    pub warning: usize,
    pub critical: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.ok + self.warning + self.critical
    }

    /// The worst state present, `Ok` when empty.
    pub fn worst(&self) -> State {
        if self.critical > 0 {
            State::Critical
        } else if self.warning > 0 {
            State::Warning
        } else {
            State::Ok
        }
    }
}

/// Complete classified data for one refresh.
#[derive(Debug, Clone)]
pub struct PanelData {
    /// One entry per matched result, in result order.
    pub classifications: Vec<Classification>,
    pub now: DateTime<Utc>,
    pub barrier: DateTime<Utc>,
    pub last_updated: Instant,
}

impl PanelData {
    /// Classify a batch against the given warnings.
    ///
    /// This is the conversion method used by every data source.
    pub fn from_batch(
        warnings: &[Warning],
        batch: &ResultBatch,
        now: DateTime<Utc>,
        time_proximity_days: u32,
    ) -> Result<Self, ClassifyError> {
        let horizon = Horizon::new(now, time_proximity_days);
        let classifications = classify_with_horizon(warnings, batch, &horizon)?;

        Ok(Self {
            classifications,
            now: horizon.now,
            barrier: horizon.barrier,
            last_updated: Instant::now(),
        })
    }

    /// Count classifications per state.
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for c in &self.classifications {
            match c.state {
                State::Ok => counts.ok += 1,
                State::Warning => counts.warning += 1,
                State::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// Classifications that are not ok, critical first then by earliest crossing.
    pub fn alerts(&self) -> Vec<&Classification> {
        let mut alerts: Vec<&Classification> = self
            .classifications
            .iter()
            .filter(|c| c.state != State::Ok)
            .collect();

        alerts.sort_by(|a, b| b.state.cmp(&a.state).then_with(|| a.lower.cmp(&b.lower)));
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trendwatch_types::{Intercepts, Operator, RegressionResult, SeriesResult};

    const DAY: f64 = 86_400.0;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn batch() -> (Vec<Warning>, ResultBatch) {
        let t = now().timestamp() as f64;
        let warnings = vec![
            Warning::new(0, "ok", 100.0, Operator::Gte),
            Warning::new(1, "warn-late", 100.0, Operator::Gte),
            Warning::new(2, "crit", 100.0, Operator::Gte),
            Warning::new(3, "warn-soon", 100.0, Operator::Gte),
        ];
        let result = |id, lower: f64, last| {
            SeriesResult::new(
                format!("target-{}", id),
                RegressionResult::builder(id)
                    .slope(1.0)
                    .r_squared(0.5)
                    .intercepts(Intercepts::new(lower, lower + DAY, lower + 2.0 * DAY))
                    .last(last)
                    .build(),
            )
        };
        let batch = vec![
            result(0, t + 400.0 * DAY, 10.0),
            result(1, t + 20.0 * DAY, 10.0),
            result(2, t + 20.0 * DAY, 150.0),
            result(3, t + 5.0 * DAY, 10.0),
        ];
        (warnings, batch)
    }

    #[test]
    fn counts_by_state() {
        let (warnings, batch) = batch();
        let data = PanelData::from_batch(&warnings, &batch, now(), 60).unwrap();

        let counts = data.counts();
        assert_eq!(counts.ok, 1);
        assert_eq!(counts.warning, 2);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.worst(), State::Critical);
    }

    #[test]
    fn alerts_are_sorted_critical_first_then_soonest() {
        let (warnings, batch) = batch();
        let data = PanelData::from_batch(&warnings, &batch, now(), 60).unwrap();

        let ids: Vec<_> = data.alerts().iter().map(|c| c.warning_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn empty_batch_is_ok() {
        let data = PanelData::from_batch(&[], &Vec::new(), now(), 60).unwrap();
        assert!(data.classifications.is_empty());
        assert_eq!(data.counts().worst(), State::Ok);
    }
}
