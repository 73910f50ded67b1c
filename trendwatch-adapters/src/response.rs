//! Parsing render API responses.
//!
//! The backend answers each `leastSquaresIntercept` target with a series
//! whose first datapoint value is the regression object:
//!
//! ```json
//! [
//!   {
//!     "target": "leastSquaresIntercept(disk.used,90,60,0)",
//!     "datapoints": [[{ "id": 0, "slope": 0.2, "r_squared": 0.7,
//!                       "intercepts": { "lower": 1, "trend": 2, "upper": 3 },
//!                       "last": 81.0 }, 1700000000]]
//!   }
//! ]
//! ```

use serde::Deserialize;
use tracing::debug;

use trendwatch_types::{RegressionResult, ResultBatch, SeriesResult};

use crate::AdapterError;

#[derive(Debug, Deserialize)]
struct RenderSeries {
    target: String,
    #[serde(default)]
    datapoints: Vec<(serde_json::Value, serde_json::Value)>,
}

/// Parse a render response body into one `SeriesResult` per series.
///
/// Only the first datapoint of a series is read; later datapoints may have
/// any shape. Series without a regression datapoint are skipped. A malformed
/// first regression object fails the whole batch.
pub fn parse_render_response(body: &[u8]) -> Result<ResultBatch, AdapterError> {
    let series: Vec<RenderSeries> = serde_json::from_slice(body)?;

    let mut batch = ResultBatch::with_capacity(series.len());
    for s in series {
        let first = match s.datapoints.into_iter().next() {
            Some((value, _)) => serde_json::from_value::<Option<RegressionResult>>(value)?,
            None => None,
        };
        match first {
            Some(result) => batch.push(SeriesResult::new(s.target, result)),
            None => debug!("Series {} has no regression datapoint, skipping", s.target),
        }
    }

    Ok(batch)
}
