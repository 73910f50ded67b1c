//! # trendwatch-types
//!
//! Core types for threshold trend warnings. This crate defines the schema
//! shared between the query layer (which asks a metrics backend for
//! least-squares projections) and the classifier and renderer that turn
//! those projections into ok / warning / critical states.
//!
//! ## Design Goals
//!
//! - **Small and plain**: only data types and the arithmetic that belongs to them
//! - **Optional serialization**: enable the `serde` feature for JSON config and exports
//! - **Backend agnostic**: any backend that can return slope, r² and intercepts fits
//!
//! ## Features
//!
//! - `serde`: serialization via serde (also enables `chrono/serde`)
//!
//! ## Example
//!
//! ```rust
//! use trendwatch_types::{Intercepts, Operator, RegressionResult, Warning};
//!
//! let warning = Warning::new(0, "servers.web1.disk.used", 90.0, Operator::Gte);
//! let result = RegressionResult::builder(0)
//!     .slope(0.4)
//!     .r_squared(0.72)
//!     .intercepts(Intercepts::new(1_700_000_000.0, 1_700_100_000.0, 1_700_200_000.0))
//!     .last(81.5)
//!     .build();
//!
//! assert_eq!(result.id, warning.id);
//! assert_eq!(result.intercepts.earliest(), 1_700_000_000.0);
//! ```

mod classification;
mod regression;
mod warning;

pub use classification::*;
pub use regression::*;
pub use warning::*;
