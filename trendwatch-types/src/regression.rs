//! Regression statistics returned by the metrics backend.

use crate::WarningId;

/// Projected threshold crossings in unix seconds.
///
/// Each value is the time at which one line of the regression band
/// (lower bound, central trend, upper bound) crosses the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intercepts {
    pub lower: f64,
    pub trend: f64,
    pub upper: f64,
}

impl Intercepts {
    pub fn new(lower: f64, trend: f64, upper: f64) -> Self {
        Self {
            lower,
            trend,
            upper,
        }
    }

    fn points(&self) -> [f64; 3] {
        [self.lower, self.trend, self.upper]
    }

    /// The earliest of the three crossings.
    pub fn earliest(&self) -> f64 {
        self.points().into_iter().fold(f64::INFINITY, f64::min)
    }

    /// The latest of the three crossings.
    pub fn latest(&self) -> f64 {
        self.points().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    /// True when every crossing is a finite number.
    pub fn is_finite(&self) -> bool {
        self.points().iter().all(|p| p.is_finite())
    }
}

/// Least-squares regression for one warning target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionResult {
    /// Id of the warning this result answers. The backend may echo it
    /// as a number or as a numeric string.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_id"))]
    pub id: WarningId,
    /// Slope of the fitted trend line (units per second).
    pub slope: f64,
    /// Goodness of fit in `[0, 1]`.
    pub r_squared: f64,
    pub intercepts: Intercepts,
    /// Current fitted value of the metric.
    pub last: f64,
}

impl RegressionResult {
    /// Create a builder for a result answering warning `id`.
    pub fn builder(id: WarningId) -> RegressionResultBuilder {
        RegressionResultBuilder::new(id)
    }
}

#[cfg(feature = "serde")]
fn deserialize_id<'de, D>(deserializer: D) -> Result<WarningId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(f64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= WarningId::MAX as f64 => {
            Ok(n as WarningId)
        }
        RawId::Number(n) => Err(D::Error::custom(format!("invalid warning id {}", n))),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid warning id '{}'", s))),
    }
}

/// Builder for `RegressionResult`.
#[derive(Debug)]
pub struct RegressionResultBuilder {
    id: WarningId,
    slope: f64,
    r_squared: f64,
    intercepts: Intercepts,
    last: f64,
}

impl RegressionResultBuilder {
    pub fn new(id: WarningId) -> Self {
        Self {
            id,
            slope: 0.0,
            r_squared: 0.0,
            intercepts: Intercepts::default(),
            last: 0.0,
        }
    }

    pub fn slope(mut self, slope: f64) -> Self {
        self.slope = slope;
        self
    }

    pub fn r_squared(mut self, r_squared: f64) -> Self {
        self.r_squared = r_squared;
        self
    }

    pub fn intercepts(mut self, intercepts: Intercepts) -> Self {
        self.intercepts = intercepts;
        self
    }

    pub fn last(mut self, last: f64) -> Self {
        self.last = last;
        self
    }

    pub fn build(self) -> RegressionResult {
        RegressionResult {
            id: self.id,
            slope: self.slope,
            r_squared: self.r_squared,
            intercepts: self.intercepts,
            last: self.last,
        }
    }
}

/// One series returned by the backend: the echoed alias plus its regression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesResult {
    /// Series alias as reported by the backend.
    pub target: String,
    pub result: RegressionResult,
}

impl SeriesResult {
    pub fn new(target: impl Into<String>, result: RegressionResult) -> Self {
        Self {
            target: target.into(),
            result,
        }
    }
}

/// All series answered by one query.
pub type ResultBatch = Vec<SeriesResult>;
