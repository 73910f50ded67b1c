//! # trendwatch
//!
//! A terminal monitor and library that warns before a metric crosses its
//! threshold.
//!
//! Each watched target has a warning: a threshold and a direction (`>=` or
//! `<=`). The backend fits a least-squares trend to the target's recent
//! history and projects when the trend will cross the threshold. trendwatch
//! turns those projections into ok / warning / critical states and shows
//! them in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(classify)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | RemoteSource | ChannelSource  │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`config`]**: The panel of warnings and query settings ([`PanelConfig`])
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for saved render responses, a periodic Graphite query, and channel-based input
//! - **[`data`]**: The classifier and everything derived from it ([`PanelData`], [`History`])
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a Graphite server
//! trendwatch --graphite http://graphite.local:8080 --warn "servers.web1.disk.used >= 90"
//!
//! # Replay a saved render response with warnings from a config file
//! trendwatch --config panel.toml --file render.json
//! ```
//!
//! ### Classifying directly
//!
//! ```
//! use chrono::Utc;
//! use trendwatch::{classify, PanelConfig};
//! use trendwatch_types::{Operator, ResultBatch};
//!
//! let mut panel = PanelConfig::default();
//! panel.add_warning("servers.web1.disk.used", 90.0, Operator::Gte);
//!
//! let batch = ResultBatch::new();
//! let out = classify(&panel.warnings, &batch, Utc::now(), panel.time_proximity_days).unwrap();
//! assert!(out.is_empty());
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use trendwatch::{App, ChannelSource, PanelConfig};
//!
//! let (tx, source) = ChannelSource::create("custom producer");
//! let app = App::new(Box::new(source), PanelConfig::default());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

pub use app::App;
pub use config::PanelConfig;
pub use data::{classify, ClassifyError, Escalation, History, PanelData, StateCounts};
#[cfg(feature = "graphite")]
pub use source::{spawn_query_loop, RemoteSource};
pub use source::{ChannelSource, DataSource, FetchOutcome, FileSource};
