//! Channel-based data source.
//!
//! Receives result batches via a tokio watch channel. The producer (usually
//! the background query loop) pushes either a batch or the error message
//! from a failed fetch.

use tokio::sync::watch;

use trendwatch_types::ResultBatch;

use super::DataSource;

/// What a producer pushes through the channel.
pub type FetchOutcome = Result<ResultBatch, String>;

/// A data source that receives result batches via a channel.
///
/// # Example
///
/// ```
/// use trendwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("graphite: http://localhost:8080");
/// tx.send(Ok(Vec::new())).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<FetchOutcome>,
    description: String,
    last_error: Option<String>,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source. The value already in the channel is
    /// returned by the first poll.
    ///
    /// `source_description` names where batches come from
    /// (e.g. "graphite: http://graphite.local").
    pub fn new(receiver: watch::Receiver<FetchOutcome>, source_description: &str) -> Self {
        Self {
            receiver,
            description: source_description.to_string(),
            last_error: None,
            initial_returned: false,
        }
    }

    /// Create a channel pair. Polling yields nothing until the first send,
    /// so the panel stays in its loading state until a real outcome arrives.
    pub fn create(source_description: &str) -> (watch::Sender<FetchOutcome>, Self) {
        let (tx, rx) = watch::channel(Ok(ResultBatch::new()));
        let source = Self {
            initial_returned: true,
            ..Self::new(rx, source_description)
        };
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<ResultBatch> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }

        match &*self.receiver.borrow_and_update() {
            Ok(batch) => {
                self.last_error = None;
                Some(batch.clone())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendwatch_types::{RegressionResult, SeriesResult};

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert_eq!(source.description(), "test");

        // Nothing sent yet
        assert!(source.poll().is_none());
        assert!(source.error().is_none());

        tx.send(Ok(vec![SeriesResult::new(
            "disk",
            RegressionResult::builder(0).build(),
        )]))
        .unwrap();

        let batch = source.poll().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].target, "disk");

        // No change, so poll returns None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_new_returns_current_value() {
        let (_tx, rx) = watch::channel(Ok(vec![SeriesResult::new(
            "disk",
            RegressionResult::builder(0).build(),
        )]));
        let mut source = ChannelSource::new(rx, "test");
        assert_eq!(source.poll().unwrap().len(), 1);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_error_then_recovery() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();

        tx.send(Err("Request timed out".to_string())).unwrap();
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Request timed out"));

        tx.send(Ok(Vec::new())).unwrap();
        assert!(source.poll().is_some());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_channel_source_sender_dropped() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();
        drop(tx);

        assert!(source.poll().is_none());
    }
}
