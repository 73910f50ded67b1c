//! Graphite adapter using the render HTTP API.
//!
//! Each warning target is sent as a `target` form parameter to
//! `<endpoint>/render` with `format=json`. The response is parsed with
//! [`parse_render_response`](crate::parse_render_response).
//!
//! ## Example
//!
//! ```rust,no_run
//! use trendwatch_adapters::graphite::GraphiteAdapter;
//! use trendwatch_adapters::MetricsQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = GraphiteAdapter::builder()
//!         .endpoint("http://graphite.local:8080")
//!         .build()?;
//!
//!     let query = MetricsQuery::for_warnings(&[], 60);
//!     for series in adapter.fetch(&query).await? {
//!         println!("{}: slope {}", series.target, series.result.slope);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use trendwatch_types::ResultBatch;

use crate::{parse_render_response, AdapterError, MetricsQuery};

/// Graphite adapter for fetching regression results.
#[derive(Debug, Clone)]
pub struct GraphiteAdapter {
    client: Client,
    endpoint: String,
}

impl GraphiteAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> GraphiteAdapterBuilder {
        GraphiteAdapterBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one render query and parse the regression results.
    ///
    /// An empty query returns an empty batch without contacting the server.
    pub async fn fetch(&self, query: &MetricsQuery) -> Result<ResultBatch, AdapterError> {
        if query.is_empty() {
            return Ok(ResultBatch::new());
        }

        let url = format!("{}/render", self.endpoint);
        debug!("Querying {} with {} targets", url, query.targets.len());

        let response = self
            .client
            .post(&url)
            .form(&query.form_params())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        parse_render_response(&body)
    }
}

/// Builder for GraphiteAdapter.
#[derive(Debug, Default)]
pub struct GraphiteAdapterBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl GraphiteAdapterBuilder {
    /// Set the Graphite base URL (e.g., "http://localhost:8080").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<GraphiteAdapter, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        Ok(GraphiteAdapter {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use trendwatch_types::{Operator, Warning};

    /// Serve a single canned HTTP response. The task yields the request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    /// Read headers and the full body as announced by Content-Length.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    #[test]
    fn test_builder_defaults() {
        let adapter = GraphiteAdapter::builder().build().unwrap();
        assert_eq!(adapter.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let adapter = GraphiteAdapter::builder()
            .endpoint("http://graphite.local/")
            .build()
            .unwrap();
        assert_eq!(adapter.endpoint(), "http://graphite.local");
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        let adapter = GraphiteAdapter::builder()
            .endpoint("http://127.0.0.1:1")
            .build()
            .unwrap();
        let batch = adapter.fetch(&MetricsQuery::for_warnings(&[], 60)).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parses_render_response() {
        let body = r#"[{"target":"leastSquaresIntercept(a,5,60,0)","datapoints":[[{"id":0,"slope":1,"r_squared":0.5,"intercepts":{"lower":1,"trend":2,"upper":3},"last":4},1]]}]"#;
        let (endpoint, server) = serve_once("200 OK", body).await;

        let adapter = GraphiteAdapter::builder().endpoint(endpoint).build().unwrap();
        let warnings = vec![Warning::new(0, "a", 5.0, Operator::Gte)];
        let batch = adapter
            .fetch(&MetricsQuery::for_warnings(&warnings, 60))
            .await
            .unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].result.last, 4.0);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /render"));
        assert!(request.contains("format=json"));
    }

    #[tokio::test]
    async fn test_fetch_reports_http_status() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "boom").await;

        let adapter = GraphiteAdapter::builder().endpoint(endpoint).build().unwrap();
        let warnings = vec![Warning::new(0, "a", 5.0, Operator::Gte)];
        let err = adapter
            .fetch(&MetricsQuery::for_warnings(&warnings, 60))
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::Http(_)));
        let _ = server.await;
    }
}
