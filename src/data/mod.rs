//! Classification of regression results and the data derived from it.
//!
//! This module turns the regression statistics returned by the backend
//! into ok / warning / critical states suitable for display.
//!
//! ## Submodules
//!
//! - [`classify`]: The threshold classifier (direction, exceedance, batch entry points)
//! - [`rules`]: Ordered decision table mapping facts to a state
//! - [`stars`]: r² to star rating
//! - [`panel`]: Classified data for one refresh ([`PanelData`])
//! - [`history`]: State history for trend strips and escalation detection
//! - [`duration`]: Parsing interval strings and formatting relative times
//!
//! ## Data Flow
//!
//! ```text
//! ResultBatch (parsed render response)
//!        │
//!        ▼
//! PanelData::from_batch()
//!        │
//!        ├──▶ Classification (state from rules, stars from r²)
//!        │
//!        └──▶ History::record() (trend strips, escalations)
//! ```

pub mod classify;
pub mod duration;
pub mod history;
pub mod panel;
pub mod rules;
pub mod stars;

pub use classify::{classify, ClassifyError, Horizon};
pub use history::{Escalation, History};
pub use panel::{PanelData, StateCounts};
