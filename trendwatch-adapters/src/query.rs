//! Building render queries from warnings.

use trendwatch_types::Warning;

/// Name of the backend function that projects threshold crossings.
pub const INTERCEPT_FUNCTION: &str = "leastSquaresIntercept";

/// Build the backend target expression for a warning.
///
/// The warning id is passed through so the backend can echo it back,
/// which is how results are matched to warnings.
///
/// ```
/// use trendwatch_adapters::target_for;
/// use trendwatch_types::{Operator, Warning};
///
/// let w = Warning::new(3, "disk.used", 90.0, Operator::Gte);
/// assert_eq!(target_for(&w, 60), "leastSquaresIntercept(disk.used,90,60,3)");
/// ```
pub fn target_for(warning: &Warning, time_proximity_days: u32) -> String {
    format!(
        "{}({},{},{},{})",
        INTERCEPT_FUNCTION, warning.target, warning.threshold, time_proximity_days, warning.id
    )
}

/// A render request for one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsQuery {
    /// Start of the fitted range (e.g. `-7d`).
    pub from: String,
    /// End of the fitted range (e.g. `now`).
    pub until: String,
    /// One target per warning, in configuration order.
    pub targets: Vec<String>,
    /// Output format; always `json` for regression results.
    pub format: String,
    pub max_data_points: u32,
    /// Backend cache lifetime in seconds.
    pub cache_timeout: Option<u64>,
}

impl MetricsQuery {
    /// Build a query with one target per warning and default range settings.
    pub fn for_warnings(warnings: &[Warning], time_proximity_days: u32) -> Self {
        Self {
            from: "-7d".to_string(),
            until: "now".to_string(),
            targets: warnings
                .iter()
                .map(|w| target_for(w, time_proximity_days))
                .collect(),
            format: "json".to_string(),
            max_data_points: 1000,
            cache_timeout: None,
        }
    }

    /// Set the fitted time range.
    pub fn range(mut self, from: impl Into<String>, until: impl Into<String>) -> Self {
        self.from = from.into();
        self.until = until.into();
        self
    }

    pub fn max_data_points(mut self, max: u32) -> Self {
        self.max_data_points = max;
        self
    }

    pub fn cache_timeout(mut self, secs: Option<u64>) -> Self {
        self.cache_timeout = secs;
        self
    }

    /// True when there is nothing to ask the backend for.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Form parameters for the render API. Targets repeat the `target` key.
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = self
            .targets
            .iter()
            .map(|t| ("target", t.clone()))
            .collect();
        params.push(("from", self.from.clone()));
        params.push(("until", self.until.clone()));
        params.push(("format", self.format.clone()));
        params.push(("maxDataPoints", self.max_data_points.to_string()));
        if let Some(timeout) = self.cache_timeout {
            params.push(("cacheTimeout", timeout.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendwatch_types::Operator;

    #[test]
    fn target_formats_fractional_threshold() {
        let w = Warning::new(12, "sumSeries(a.*.b)", 0.75, Operator::Lte);
        assert_eq!(
            target_for(&w, 7),
            "leastSquaresIntercept(sumSeries(a.*.b),0.75,7,12)"
        );
    }

    #[test]
    fn query_has_one_target_per_warning_in_order() {
        let warnings = vec![
            Warning::new(0, "a", 1.0, Operator::Gte),
            Warning::new(5, "b", 2.0, Operator::Lte),
        ];
        let q = MetricsQuery::for_warnings(&warnings, 30);
        assert_eq!(
            q.targets,
            vec![
                "leastSquaresIntercept(a,1,30,0)".to_string(),
                "leastSquaresIntercept(b,2,30,5)".to_string(),
            ]
        );
        assert_eq!(q.format, "json");
        assert!(!q.is_empty());
    }

    #[test]
    fn form_params_repeat_target_and_skip_missing_cache_timeout() {
        let warnings = vec![
            Warning::new(0, "a", 1.0, Operator::Gte),
            Warning::new(1, "b", 2.0, Operator::Gte),
        ];
        let q = MetricsQuery::for_warnings(&warnings, 60).range("-30d", "now");
        let params = q.form_params();

        assert_eq!(params.iter().filter(|(k, _)| *k == "target").count(), 2);
        assert!(params.contains(&("from", "-30d".to_string())));
        assert!(params.contains(&("maxDataPoints", "1000".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "cacheTimeout"));

        let params = q.cache_timeout(Some(120)).form_params();
        assert!(params.contains(&("cacheTimeout", "120".to_string())));
    }

    #[test]
    fn empty_warnings_give_empty_query() {
        assert!(MetricsQuery::for_warnings(&[], 60).is_empty());
    }
}
