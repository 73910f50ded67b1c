//! Data source abstraction for receiving regression results.
//!
//! This module provides a trait-based abstraction for receiving result
//! batches from various sources (a saved render response on disk, a
//! background task querying the backend, or any in-memory producer).

mod channel;
mod file;
#[cfg(feature = "graphite")]
mod remote;

pub use channel::{ChannelSource, FetchOutcome};
pub use file::FileSource;
#[cfg(feature = "graphite")]
pub use remote::{spawn_query_loop, RemoteSource};

use std::fmt::Debug;

use trendwatch_adapters::MetricsQuery;
use trendwatch_types::ResultBatch;

/// Trait for receiving regression results from various sources.
///
/// # Example
///
/// ```
/// use trendwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("render.json");
/// if let Some(batch) = source.poll() {
///     println!("Got {} series", batch.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest batch.
    ///
    /// Returns `Some(batch)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<ResultBatch>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the last poll or fetch failed.
    fn error(&self) -> Option<&str>;

    /// Replace the query a backend-driven source runs.
    ///
    /// Called when the panel's warnings change. Sources that only replay
    /// stored results ignore it.
    fn set_query(&mut self, _query: MetricsQuery) {}
}
