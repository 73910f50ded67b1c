//! Classification output - what the renderer shows for each target.

use chrono::{DateTime, Utc};

use crate::WarningId;

/// Hue attached to every classification. Renderers colour by `state`.
pub const DEFAULT_HUE: u16 = 120;

/// Outcome of comparing a trend against its threshold.
///
/// Ordered by severity so `max()` yields the worst state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum State {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl State {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            State::Ok => "OK",
            State::Warning => "WARN",
            State::Critical => "CRIT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            State::Ok => "Ok",
            State::Warning => "Warning",
            State::Critical => "Critical",
        }
    }
}

/// Confidence rating on a five star scale, in half star steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stars {
    /// Rating rounded to the nearest half star.
    pub actual: f64,
    /// Number of whole stars.
    pub whole: u8,
    /// 1 when a half star follows the whole ones, otherwise 0.
    pub half: u8,
}

impl Stars {
    /// Render as a fixed width string of five glyphs.
    pub fn glyphs(&self) -> String {
        let mut out = String::with_capacity(15);
        for _ in 0..self.whole {
            out.push('★');
        }
        if self.half == 1 {
            out.push('⯪');
        }
        let used = self.whole as usize + self.half as usize;
        for _ in used..5 {
            out.push('☆');
        }
        out
    }
}

/// Classified state of one warning target at a point in time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    /// Warning this classification belongs to.
    pub warning_id: WarningId,
    /// Series alias reported by the backend.
    pub alias: String,
    /// Earliest projected crossing.
    pub lower: DateTime<Utc>,
    /// Latest projected crossing.
    pub upper: DateTime<Utc>,
    pub hue: u16,
    pub stars: Stars,
    pub slope: f64,
    /// r² rounded to three decimals.
    pub r_squared: f64,
    pub now: DateTime<Utc>,
    /// End of the proximity window.
    pub barrier: DateTime<Utc>,
    pub state: State,
}
