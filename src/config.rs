//! Panel configuration.
//!
//! A panel is the set of warnings being watched plus the settings used to
//! query the backend. It is loaded in layers: built-in defaults, then an
//! optional config file (TOML, JSON or YAML, chosen by extension), then
//! `TRENDWATCH_*` environment variables.
//!
//! ```toml
//! endpoint = "http://graphite.local:8080"
//! time_proximity_days = 30
//!
//! [[warnings]]
//! id = 0
//! target = "servers.web1.disk.used_percent"
//! threshold = 90
//! op = "gte"
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use trendwatch_adapters::MetricsQuery;
use trendwatch_types::{Operator, Warning, WarningId};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "TRENDWATCH";

/// Persisted settings for one panel of warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Backend kind. Only `graphite` is understood.
    pub datasource: String,
    /// Backend base URL.
    pub endpoint: String,
    pub warnings: Vec<Warning>,
    /// Crossings closer than this many days are warnings.
    pub time_proximity_days: u32,
    /// Last warning id handed out, `None` before the first one.
    pub counter: Option<WarningId>,
    /// Start of the fitted range.
    pub from: String,
    /// End of the fitted range.
    pub until: String,
    pub max_data_points: u32,
    /// Backend cache lifetime in seconds.
    pub cache_timeout: Option<u64>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            datasource: "graphite".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            warnings: Vec::new(),
            time_proximity_days: 60,
            counter: None,
            from: "-7d".to_string(),
            until: "now".to_string(),
            max_data_points: 1000,
            cache_timeout: None,
        }
    }
}

impl PanelConfig {
    /// Load from an optional file plus `TRENDWATCH_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading panel config from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let config = builder.add_source(env.try_parsing(true)).build()?;
        let mut panel: PanelConfig = config.try_deserialize()?;
        panel.normalize()?;

        debug!(
            "Panel has {} warnings, proximity {} days",
            panel.warnings.len(),
            panel.time_proximity_days
        );
        Ok(panel)
    }

    /// Reject duplicate ids and keep the counter ahead of every id in use.
    fn normalize(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for w in &self.warnings {
            if !seen.insert(w.id) {
                bail!("Duplicate warning id {} in panel config", w.id);
            }
        }

        if let Some(max_id) = self.warnings.iter().map(|w| w.id).max() {
            if self.counter.map_or(true, |c| c < max_id) {
                self.counter = Some(max_id);
            }
        }
        Ok(())
    }

    /// Hand out a blank warning with the next id. Ids are never reused.
    pub fn new_warning(&mut self) -> Warning {
        let id = self.counter.map_or(0, |c| c + 1);
        self.counter = Some(id);
        Warning::blank(id)
    }

    /// Append a warning and return its id.
    pub fn add_warning(
        &mut self,
        target: impl Into<String>,
        threshold: f64,
        op: Operator,
    ) -> WarningId {
        let mut warning = self.new_warning();
        warning.target = target.into();
        warning.threshold = threshold;
        warning.op = op;

        let id = warning.id;
        self.warnings.push(warning);
        id
    }

    /// Remove a warning. Returns false if no warning had that id.
    pub fn remove_warning(&mut self, id: WarningId) -> bool {
        let before = self.warnings.len();
        self.warnings.retain(|w| w.id != id);
        self.warnings.len() != before
    }

    pub fn warning(&self, id: WarningId) -> Option<&Warning> {
        self.warnings.iter().find(|w| w.id == id)
    }

    /// Build the render query for the current warnings.
    pub fn query(&self) -> MetricsQuery {
        MetricsQuery::for_warnings(&self.warnings, self.time_proximity_days)
            .range(&self.from, &self.until)
            .max_data_points(self.max_data_points)
            .cache_timeout(self.cache_timeout)
    }
}

/// Parse a warning spec such as `servers.web1.disk >= 90`.
pub fn parse_warning_spec(spec: &str) -> Result<(String, f64, Operator)> {
    for symbol in [">=", "<="] {
        if let Some((target, threshold)) = spec.split_once(symbol) {
            let target = target.trim();
            if target.is_empty() {
                bail!("Missing target in warning '{}'", spec);
            }
            let threshold: f64 = threshold.trim().parse()?;
            let op: Operator = symbol.parse()?;
            return Ok((target.to_string(), threshold, op));
        }
    }
    bail!("Warning '{}' must look like '<target> >= <threshold>' or '<target> <= <threshold>'", spec)
}
