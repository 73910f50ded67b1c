//! Historical state tracking for trend strips and escalation detection.

use std::collections::{HashMap, VecDeque};
use trendwatch_types::{State, WarningId};

use super::panel::PanelData;

/// Maximum number of refreshes to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// A warning whose state got worse between two refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    pub warning_id: WarningId,
    pub alias: String,
    pub from: State,
    pub to: State,
}

/// Tracks classified states over successive refreshes.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// State per warning, oldest first.
    pub states: HashMap<WarningId, VecDeque<State>>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refresh and return the warnings that escalated since the previous one.
    pub fn record(&mut self, data: &PanelData) -> Vec<Escalation> {
        let mut escalations = Vec::new();

        for c in &data.classifications {
            let states = self.states.entry(c.warning_id).or_default();
            if let Some(&previous) = states.back() {
                if c.state > previous {
                    escalations.push(Escalation {
                        warning_id: c.warning_id,
                        alias: c.alias.clone(),
                        from: previous,
                        to: c.state,
                    });
                }
            }
            states.push_back(c.state);
            if states.len() > MAX_HISTORY_SIZE {
                states.pop_front();
            }
        }

        escalations
    }

    /// The most recent `n` states for a warning, oldest first.
    pub fn recent_states(&self, warning_id: WarningId, n: usize) -> Vec<State> {
        let Some(states) = self.states.get(&warning_id) else {
            return Vec::new();
        };
        states.iter().skip(states.len().saturating_sub(n)).copied().collect()
    }

    /// Forget a warning that was removed from the panel.
    pub fn forget(&mut self, warning_id: WarningId) {
        self.states.remove(&warning_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use chrono::{TimeZone, Utc};
    use trendwatch_types::{Classification, Stars};

    fn data(states: &[(WarningId, State)]) -> PanelData {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PanelData {
            classifications: states
                .iter()
                .map(|&(id, state)| Classification {
                    warning_id: id,
                    alias: format!("t{}", id),
                    lower: now,
                    upper: now,
                    hue: 120,
                    stars: Stars::default(),
                    slope: 0.0,
                    r_squared: 0.0,
                    now,
                    barrier: now,
                    state,
                })
                .collect(),
            now,
            barrier: now,
            last_updated: Instant::now(),
        }
    }

    #[test]
    fn records_states_in_order() {
        let mut history = History::new();
        history.record(&data(&[(1, State::Ok)]));
        history.record(&data(&[(1, State::Warning)]));
        history.record(&data(&[(1, State::Ok)]));

        assert_eq!(
            history.recent_states(1, 8),
            vec![State::Ok, State::Warning, State::Ok]
        );
        assert_eq!(history.recent_states(1, 2), vec![State::Warning, State::Ok]);
        assert!(history.recent_states(2, 8).is_empty());
    }

    #[test]
    fn reports_escalations_only() {
        let mut history = History::new();
        assert!(history.record(&data(&[(1, State::Critical), (2, State::Ok)])).is_empty());

        let escalations = history.record(&data(&[(1, State::Warning), (2, State::Critical)]));
        assert_eq!(
            escalations,
            vec![Escalation {
                warning_id: 2,
                alias: "t2".to_string(),
                from: State::Ok,
                to: State::Critical,
            }]
        );
    }

    #[test]
    fn caps_history_size() {
        let mut history = History::new();
        for _ in 0..(MAX_HISTORY_SIZE + 10) {
            history.record(&data(&[(1, State::Ok)]));
        }
        assert_eq!(history.states[&1].len(), MAX_HISTORY_SIZE);
        assert_eq!(history.recent_states(1, usize::MAX).len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn forget_drops_warning() {
        let mut history = History::new();
        history.record(&data(&[(1, State::Ok)]));
        history.forget(1);
        assert!(history.recent_states(1, 8).is_empty());
    }
}
