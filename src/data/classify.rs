//! Threshold classification of regression results.
//!
//! Turns one [`SeriesResult`] per warning into a [`Classification`]. The
//! state comes from the decision table in [`super::rules`]; everything here
//! is pure, so classifying the same inputs twice gives identical output.

use chrono::{DateTime, Days, Utc};
use thiserror::Error;
use tracing::debug;

use trendwatch_types::{
    Classification, Operator, RegressionResult, SeriesResult, Warning, WarningId,
    DEFAULT_HUE,
};

use super::rules::{self, Facts};
use super::stars::scale_to_stars;

/// Errors raised while classifying a batch.
///
/// Any error fails the whole batch; no partial results are produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("warning {id}: intercepts are not finite")]
    NonFiniteIntercepts { id: WarningId },

    #[error("warning {id}: intercept {seconds} is outside the supported time range")]
    InterceptOutOfRange { id: WarningId, seconds: f64 },
}

/// The reference instants a batch is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub now: DateTime<Utc>,
    /// `now` plus the proximity window.
    pub barrier: DateTime<Utc>,
}

impl Horizon {
    /// Build a horizon `time_proximity_days` days past `now`.
    pub fn new(now: DateTime<Utc>, time_proximity_days: u32) -> Self {
        let barrier = now
            .checked_add_days(Days::new(u64::from(time_proximity_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { now, barrier }
    }
}

/// True when the slope points towards breaching the threshold.
pub fn moving_towards(warning: &Warning, result: &RegressionResult) -> bool {
    match warning.op {
        Operator::Gte => result.slope > 0.0,
        Operator::Lte => result.slope < 0.0,
    }
}

/// True when the current fitted value already breaches the threshold.
pub fn threshold_exceeded(warning: &Warning, result: &RegressionResult) -> bool {
    match warning.op {
        Operator::Gte => result.last >= warning.threshold,
        Operator::Lte => result.last <= warning.threshold,
    }
}

/// Convert unix seconds to an instant, keeping millisecond precision.
fn to_instant(id: WarningId, seconds: f64) -> Result<DateTime<Utc>, ClassifyError> {
    let millis = (seconds * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(ClassifyError::InterceptOutOfRange { id, seconds });
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or(ClassifyError::InterceptOutOfRange { id, seconds })
}

/// Classify one series against the warning it answers.
pub fn classify_series(
    warning: &Warning,
    series: &SeriesResult,
    horizon: &Horizon,
) -> Result<Classification, ClassifyError> {
    let result = &series.result;

    if !result.intercepts.is_finite() {
        return Err(ClassifyError::NonFiniteIntercepts { id: result.id });
    }
    let earliest = to_instant(result.id, result.intercepts.earliest())?;
    let latest = to_instant(result.id, result.intercepts.latest())?;

    let facts = Facts {
        exceeded: threshold_exceeded(warning, result),
        moving_towards: moving_towards(warning, result),
        earliest,
        latest,
        now: horizon.now,
        barrier: horizon.barrier,
    };

    let state = rules::evaluate(&facts);
    debug!(
        "Warning {} ({}) -> {:?} via {}",
        warning.id,
        series.target,
        state,
        rules::matching_rule(&facts).map_or("no rule", |r| r.name)
    );

    Ok(Classification {
        warning_id: warning.id,
        alias: series.target.clone(),
        lower: earliest,
        upper: latest,
        hue: DEFAULT_HUE,
        stars: scale_to_stars(result.r_squared),
        slope: result.slope,
        r_squared: (result.r_squared * 1000.0).round() / 1000.0,
        now: horizon.now,
        barrier: horizon.barrier,
        state,
    })
}

/// Classify a batch against a precomputed horizon.
///
/// Output follows the order of `results`. Results whose id matches no
/// warning are dropped.
pub fn classify_with_horizon(
    warnings: &[Warning],
    results: &[SeriesResult],
    horizon: &Horizon,
) -> Result<Vec<Classification>, ClassifyError> {
    let mut out = Vec::with_capacity(results.len());

    for series in results {
        let Some(warning) = warnings.iter().find(|w| w.id == series.result.id) else {
            debug!(
                "Dropping result for unknown warning id {} ({})",
                series.result.id, series.target
            );
            continue;
        };
        out.push(classify_series(warning, series, horizon)?);
    }

    Ok(out)
}

/// Classify a batch at `now` with a proximity window of `time_proximity_days`.
///
/// ```
/// use chrono::Utc;
/// use trendwatch::data::classify::classify;
/// use trendwatch_types::{Intercepts, Operator, RegressionResult, SeriesResult, State, Warning};
///
/// let now = Utc::now();
/// let ts = now.timestamp() as f64;
/// let warnings = vec![Warning::new(0, "disk.used", 100.0, Operator::Gte)];
/// let results = vec![SeriesResult::new(
///     "disk.used",
///     RegressionResult::builder(0)
///         .slope(2.0)
///         .r_squared(0.6)
///         .intercepts(Intercepts::new(ts - 86400.0, ts + 86400.0, ts + 3.0 * 86400.0))
///         .last(95.0)
///         .build(),
/// )];
///
/// let out = classify(&warnings, &results, now, 1).unwrap();
/// assert_eq!(out[0].state, State::Critical);
/// ```
pub fn classify(
    warnings: &[Warning],
    results: &[SeriesResult],
    now: DateTime<Utc>,
    time_proximity_days: u32,
) -> Result<Vec<Classification>, ClassifyError> {
    classify_with_horizon(warnings, results, &Horizon::new(now, time_proximity_days))
}
