//! Backend-querying data source.
//!
//! A background task runs the render query on a fixed interval and pushes
//! each outcome into a [`ChannelSource`]. The query itself lives in a watch
//! channel so the panel can change its warnings without restarting the task;
//! a new query is fetched immediately.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use trendwatch_adapters::graphite::GraphiteAdapter;
use trendwatch_adapters::MetricsQuery;
use trendwatch_types::ResultBatch;

use super::{ChannelSource, DataSource, FetchOutcome};

/// A data source fed by a periodic Graphite query.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trendwatch::{DataSource, PanelConfig, RemoteSource};
/// use trendwatch_adapters::graphite::GraphiteAdapter;
///
/// # tokio_test::block_on(async {
/// let panel = PanelConfig::default();
/// let adapter = GraphiteAdapter::builder()
///     .endpoint("http://127.0.0.1:9")
///     .build()
///     .unwrap();
/// let source = RemoteSource::spawn(adapter, panel.query(), Duration::from_secs(30));
/// assert!(source.description().starts_with("graphite: "));
/// # });
/// ```
#[derive(Debug)]
pub struct RemoteSource {
    inner: ChannelSource,
    queries: watch::Sender<MetricsQuery>,
    task: JoinHandle<()>,
}

impl RemoteSource {
    /// Start querying. Must be called from within a tokio runtime.
    pub fn spawn(adapter: GraphiteAdapter, query: MetricsQuery, interval: Duration) -> Self {
        let description = format!("graphite: {}", adapter.endpoint());
        let (results_tx, inner) = ChannelSource::create(&description);
        let (queries, queries_rx) = watch::channel(query);

        info!("Querying {} every {:?}", adapter.endpoint(), interval);
        let task = tokio::spawn(query_loop(adapter, queries_rx, results_tx, interval));

        Self {
            inner,
            queries,
            task,
        }
    }
}

impl Drop for RemoteSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl DataSource for RemoteSource {
    fn poll(&mut self) -> Option<ResultBatch> {
        self.inner.poll()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn error(&self) -> Option<&str> {
        self.inner.error()
    }

    fn set_query(&mut self, query: MetricsQuery) {
        self.queries.send_replace(query);
    }
}

/// Spawn a query loop feeding a new [`RemoteSource`].
pub fn spawn_query_loop(
    adapter: GraphiteAdapter,
    query: MetricsQuery,
    interval: Duration,
) -> RemoteSource {
    RemoteSource::spawn(adapter, query, interval)
}

async fn query_loop(
    adapter: GraphiteAdapter,
    mut queries: watch::Receiver<MetricsQuery>,
    results: watch::Sender<FetchOutcome>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = queries.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!("Query changed, fetching now");
            }
        }

        let query = queries.borrow_and_update().clone();
        let outcome = match adapter.fetch(&query).await {
            Ok(batch) => {
                debug!("Fetched {} series", batch.len());
                Ok(batch)
            }
            Err(e) => {
                warn!("Fetch from {} failed: {}", adapter.endpoint(), e);
                Err(e.to_string())
            }
        };

        if results.send(outcome).is_err() {
            // Source dropped
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use trendwatch_types::{Operator, Warning};

    async fn poll_until<F>(source: &mut RemoteSource, mut done: F)
    where
        F: FnMut(&mut RemoteSource) -> bool,
    {
        for _ in 0..200 {
            if done(source) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("source never reached the expected state");
    }

    /// An address nothing listens on.
    async fn closed_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn empty_query_yields_empty_batch() {
        let adapter = GraphiteAdapter::builder()
            .endpoint(closed_endpoint().await)
            .build()
            .unwrap();
        let mut source =
            spawn_query_loop(adapter, MetricsQuery::for_warnings(&[], 60), Duration::from_secs(60));

        assert!(source.description().starts_with("graphite: http://127.0.0.1"));
        poll_until(&mut source, |s| s.poll().is_some()).await;
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn query_change_triggers_fetch_and_reports_errors() {
        let adapter = GraphiteAdapter::builder()
            .endpoint(closed_endpoint().await)
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let mut source =
            spawn_query_loop(adapter, MetricsQuery::for_warnings(&[], 60), Duration::from_secs(60));
        poll_until(&mut source, |s| s.poll().is_some()).await;

        let warnings = vec![Warning::new(0, "disk.used", 90.0, Operator::Gte)];
        source.set_query(MetricsQuery::for_warnings(&warnings, 60));

        poll_until(&mut source, |s| {
            s.poll();
            s.error().is_some()
        })
        .await;
    }
}
