//! Ordered decision table for warning state.
//!
//! Rules are evaluated top to bottom and the first one that applies sets
//! the state. When none applies the target is [`State::Ok`].
//!
//! | # | Rule                    | State    |
//! |---|-------------------------|----------|
//! | 1 | threshold exceeded      | Critical |
//! | 2 | latest crossing passed  | Critical |
//! | 3 | earliest crossing passed| Critical |
//! | 4 | latest before barrier   | Warning  |
//! | 5 | earliest before barrier | Warning  |
//!
//! Rules 2 to 5 only apply while the trend is moving towards the threshold.

use chrono::{DateTime, Utc};

use trendwatch_types::State;

/// Inputs the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facts {
    /// The current value already breaches the threshold.
    pub exceeded: bool,
    /// The slope points towards a breach.
    pub moving_towards: bool,
    /// Earliest projected crossing.
    pub earliest: DateTime<Utc>,
    /// Latest projected crossing.
    pub latest: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub barrier: DateTime<Utc>,
}

/// A single row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Facts) -> bool,
    pub state: State,
}

fn exceeded(f: &Facts) -> bool {
    f.exceeded
}

fn latest_passed(f: &Facts) -> bool {
    f.latest < f.now && f.moving_towards
}

fn earliest_passed(f: &Facts) -> bool {
    f.earliest < f.now && f.moving_towards
}

fn latest_before_barrier(f: &Facts) -> bool {
    f.latest < f.barrier && f.moving_towards
}

fn earliest_before_barrier(f: &Facts) -> bool {
    f.earliest < f.barrier && f.moving_towards
}

/// The decision table, in precedence order.
pub static RULES: [Rule; 5] = [
    Rule {
        name: "threshold exceeded",
        applies: exceeded,
        state: State::Critical,
    },
    Rule {
        name: "latest crossing passed",
        applies: latest_passed,
        state: State::Critical,
    },
    Rule {
        name: "earliest crossing passed",
        applies: earliest_passed,
        state: State::Critical,
    },
    Rule {
        name: "latest crossing before barrier",
        applies: latest_before_barrier,
        state: State::Warning,
    },
    Rule {
        name: "earliest crossing before barrier",
        applies: earliest_before_barrier,
        state: State::Warning,
    },
];

/// The first rule that applies, if any.
pub fn matching_rule(facts: &Facts) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.applies)(facts))
}

/// Evaluate the table.
pub fn evaluate(facts: &Facts) -> State {
    matching_rule(facts).map_or(State::Ok, |rule| rule.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> Facts {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Facts {
            exceeded: false,
            moving_towards: true,
            earliest: now + Duration::days(100),
            latest: now + Duration::days(200),
            now,
            barrier: now + Duration::days(60),
        }
    }

    #[test]
    fn far_crossing_is_ok() {
        assert_eq!(evaluate(&base()), State::Ok);
        assert!(matching_rule(&base()).is_none());
    }

    #[test]
    fn exceeded_wins_even_when_moving_away() {
        let facts = Facts {
            exceeded: true,
            moving_towards: false,
            ..base()
        };
        assert_eq!(evaluate(&facts), State::Critical);
        assert_eq!(matching_rule(&facts).unwrap().name, "threshold exceeded");
    }

    #[test]
    fn exceeded_wins_over_warning_rules() {
        let now = base().now;
        let facts = Facts {
            exceeded: true,
            earliest: now + Duration::days(10),
            ..base()
        };
        assert_eq!(evaluate(&facts), State::Critical);
    }

    #[test]
    fn passed_crossing_is_critical() {
        let now = base().now;
        let facts = Facts {
            earliest: now - Duration::days(1),
            ..base()
        };
        assert_eq!(matching_rule(&facts).unwrap().name, "earliest crossing passed");

        let facts = Facts {
            earliest: now - Duration::days(2),
            latest: now - Duration::days(1),
            ..base()
        };
        assert_eq!(matching_rule(&facts).unwrap().name, "latest crossing passed");
        assert_eq!(evaluate(&facts), State::Critical);
    }

    #[test]
    fn crossing_inside_barrier_is_warning() {
        let now = base().now;
        let facts = Facts {
            earliest: now + Duration::days(30),
            ..base()
        };
        assert_eq!(evaluate(&facts), State::Warning);
        assert_eq!(
            matching_rule(&facts).unwrap().name,
            "earliest crossing before barrier"
        );

        let facts = Facts {
            earliest: now + Duration::days(10),
            latest: now + Duration::days(30),
            ..base()
        };
        assert_eq!(
            matching_rule(&facts).unwrap().name,
            "latest crossing before barrier"
        );
    }

    #[test]
    fn moving_away_ignores_crossings() {
        let now = base().now;
        let facts = Facts {
            moving_towards: false,
            earliest: now - Duration::days(5),
            latest: now + Duration::days(5),
            ..base()
        };
        assert_eq!(evaluate(&facts), State::Ok);
    }

    #[test]
    fn crossing_exactly_at_barrier_is_ok() {
        let b = base();
        let facts = Facts {
            earliest: b.barrier,
            latest: b.barrier,
            ..b
        };
        assert_eq!(evaluate(&facts), State::Ok);
    }
}
