//! # trendwatch-adapters
//!
//! Query builders and backend adapters for fetching least-squares trend
//! projections.
//!
//! Every warning becomes one `leastSquaresIntercept(...)` target. The backend
//! answers each target with a single datapoint carrying the regression
//! statistics, which [`parse_render_response`] turns into
//! [`SeriesResult`]s ready for classification.
//!
//! ## Supported Backends
//!
//! - **Graphite** (`graphite` feature) - POSTs to the render API and parses
//!   its JSON output
//!
//! ## Quick Start (Graphite)
//!
//! ```rust,ignore
//! use trendwatch_adapters::graphite::GraphiteAdapter;
//! use trendwatch_adapters::MetricsQuery;
//! use trendwatch_types::{Operator, Warning};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = GraphiteAdapter::builder()
//!         .endpoint("http://graphite.local")
//!         .build()?;
//!
//!     let warnings = vec![Warning::new(0, "servers.web1.disk.used", 90.0, Operator::Gte)];
//!     let query = MetricsQuery::for_warnings(&warnings, 60);
//!
//!     let batch = adapter.fetch(&query).await?;
//!     println!("Fetched {} series", batch.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod query;
pub mod response;

#[cfg(feature = "graphite")]
pub mod graphite;

pub use error::AdapterError;
pub use query::{target_for, MetricsQuery};
pub use response::parse_render_response;

// Re-export types for convenience
pub use trendwatch_types::{RegressionResult, ResultBatch, SeriesResult, Warning};
