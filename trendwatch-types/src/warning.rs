//! Warning definitions - what the user asked to be warned about.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of a warning, unique within a panel.
pub type WarningId = u32;

/// Comparison applied between a metric and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Operator {
    /// Breach when the metric is greater than or equal to the threshold.
    #[default]
    Gte,
    /// Breach when the metric is less than or equal to the threshold.
    Lte,
}

impl Operator {
    /// The wire name used in configuration (`gte` / `lte`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gte => "gte",
            Operator::Lte => "lte",
        }
    }

    /// The comparison symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gte => ">=",
            Operator::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator '{0}', expected gte, lte, >= or <=")]
pub struct ParseOperatorError(String);

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gte" | ">=" => Ok(Operator::Gte),
            "lte" | "<=" => Ok(Operator::Lte),
            other => Err(ParseOperatorError(other.to_string())),
        }
    }
}

/// A user-defined threshold on a metric target.
///
/// The `target` is a metric expression understood by the backend
/// (e.g. `servers.web1.disk.used_percent`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    /// Panel-unique identifier, echoed back by the backend.
    pub id: WarningId,
    /// Metric expression to project.
    pub target: String,
    /// Threshold value the projection is compared against.
    pub threshold: f64,
    /// Direction of the breach.
    #[cfg_attr(feature = "serde", serde(default))]
    pub op: Operator,
}

impl Warning {
    /// Create a warning.
    pub fn new(id: WarningId, target: impl Into<String>, threshold: f64, op: Operator) -> Self {
        Self {
            id,
            target: target.into(),
            threshold,
            op,
        }
    }

    /// A blank warning as produced by "add warning" before the user fills it in.
    pub fn blank(id: WarningId) -> Self {
        Self::new(id, "", 0.0, Operator::Gte)
    }

    /// Short human readable description, e.g. `disk.used >= 90`.
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.target, self.op.symbol(), self.threshold)
    }
}
