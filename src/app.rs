//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{info, warn};

use trendwatch_types::{Classification, ResultBatch, Warning, WarningId};

use crate::config::PanelConfig;
use crate::data::{History, PanelData};
use crate::source::DataSource;
use crate::ui::warnings::{sort_classifications_by, SortColumn};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Warning detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every classified warning.
    Warnings,
    /// Only warnings in the warning or critical state.
    Alerts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Warnings => View::Alerts,
            View::Alerts => View::Warnings,
        }
    }

    /// Cycle to the previous view. With two views this is the same as `next`.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Warnings => "Warnings",
            View::Alerts => "Alerts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub panel: PanelConfig,
    last_batch: Option<ResultBatch>,
    pub data: Option<PanelData>,
    pub history: History,
    /// Panel-level error. Set whenever the rendered data was cleared.
    pub load_error: Option<String>,

    // Navigation state
    pub selected_index: usize,
    pub selected_alert_index: usize,

    // Sorting (Warnings view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App watching the given panel.
    pub fn new(source: Box<dyn DataSource>, panel: PanelConfig) -> Self {
        Self::with_theme(source, panel, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (no terminal probing).
    pub fn with_theme(source: Box<dyn DataSource>, panel: PanelConfig, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Warnings,
            show_help: false,
            show_detail_overlay: false,
            source,
            panel,
            last_batch: None,
            data: None,
            history: History::new(),
            load_error: None,
            selected_index: 0,
            selected_alert_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: false, // Default descending (critical first)
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source and classify anything new.
    ///
    /// Returns Ok(true) if new data was rendered, Ok(false) if nothing
    /// changed or the source reported an error, and Err if the batch could
    /// not be classified. Either failure clears the rendered data. History
    /// is left alone; it advances once per [`App::refresh`].
    pub fn reload_data(&mut self) -> Result<bool> {
        self.reload(false)
    }

    /// One refresh cycle: reload from the source, or classify the last
    /// batch again at the current time when nothing new arrived. Records
    /// exactly one history entry per warning when classification succeeds.
    pub fn refresh(&mut self) -> Result<()> {
        if self.reload(true)? || self.source.error().is_some() {
            return Ok(());
        }
        self.classify_last(true)
    }

    /// Classify the last received batch again at the current time without
    /// recording history.
    pub fn reclassify(&mut self) -> Result<()> {
        self.classify_last(false)
    }

    fn reload(&mut self, record: bool) -> Result<bool> {
        let polled = self.source.poll();

        if let Some(err) = self.source.error() {
            if self.load_error.as_deref() != Some(err) {
                warn!("Source error: {}", err);
            }
            self.load_error = Some(err.to_string());
            self.data = None;
            return Ok(false);
        }

        let Some(batch) = polled else {
            return Ok(false);
        };
        self.last_batch = Some(batch);
        self.classify_last(record)?;
        Ok(true)
    }

    fn classify_last(&mut self, record: bool) -> Result<()> {
        let Some(batch) = &self.last_batch else {
            return Ok(());
        };

        let data = match PanelData::from_batch(
            &self.panel.warnings,
            batch,
            Utc::now(),
            self.panel.time_proximity_days,
        ) {
            Ok(data) => data,
            Err(e) => {
                warn!("Classification failed: {}", e);
                self.load_error = Some(e.to_string());
                self.data = None;
                return Err(e.into());
            }
        };

        if record {
            self.record_history(&data);
        }

        self.data = Some(data);
        self.load_error = None;
        self.clamp_selection();
        Ok(())
    }

    fn record_history(&mut self, data: &PanelData) {
        let escalations = self.history.record(data);
        for e in &escalations {
            info!(
                "Warning {} ({}) escalated {} -> {}",
                e.warning_id,
                e.alias,
                e.from.label(),
                e.to.label()
            );
        }
        if let Some(worst) = escalations.iter().max_by_key(|e| e.to) {
            let more = escalations.len() - 1;
            let mut msg = format!("{} is now {}", worst.alias, worst.to.label());
            if more > 0 {
                msg.push_str(&format!(" (+{} more)", more));
            }
            self.set_status_message(msg);
        }
    }

    fn clamp_selection(&mut self) {
        let warnings = self.visible_classifications().len();
        let alerts = self.visible_alerts().len();
        self.selected_index = self.selected_index.min(warnings.saturating_sub(1));
        self.selected_alert_index = self.selected_alert_index.min(alerts.saturating_sub(1));
    }

    /// Classifications shown in the Warnings view, filtered and sorted.
    pub fn visible_classifications(&self) -> Vec<&Classification> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut rows: Vec<&Classification> = data
            .classifications
            .iter()
            .filter(|c| self.matches_filter(&c.alias))
            .collect();
        sort_classifications_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    /// Non-ok classifications shown in the Alerts view, filtered.
    pub fn visible_alerts(&self) -> Vec<&Classification> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.alerts()
            .into_iter()
            .filter(|c| self.matches_filter(&c.alias))
            .collect()
    }

    fn visible_count(&self) -> usize {
        match self.current_view {
            View::Warnings => self.visible_classifications().len(),
            View::Alerts => self.visible_alerts().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Warnings => &mut self.selected_index,
            View::Alerts => &mut self.selected_alert_index,
        }
    }

    /// The classification under the cursor in the current view.
    pub fn selected_classification(&self) -> Option<&Classification> {
        match self.current_view {
            View::Warnings => self.visible_classifications().get(self.selected_index).copied(),
            View::Alerts => self.visible_alerts().get(self.selected_alert_index).copied(),
        }
    }

    /// The warning behind the selected row.
    pub fn selected_warning(&self) -> Option<&Warning> {
        let id = self.selected_classification()?.warning_id;
        self.panel.warning(id)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_count().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.visible_count().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Open the detail overlay for the selected warning.
    pub fn enter_detail(&mut self) {
        if self.selected_classification().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay first, then return to Warnings.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Warnings {
            self.current_view = View::Warnings;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Warnings view only).
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Warnings {
            self.sort_column = self.sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Warnings {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a target matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Remove the warning under the cursor from the panel.
    ///
    /// The source is handed the new query and the last batch is classified
    /// again, so the row disappears immediately.
    pub fn remove_selected_warning(&mut self) -> Option<WarningId> {
        let id = self.selected_classification()?.warning_id;
        self.remove_warning(id).then_some(id)
    }

    /// Remove a warning by id. Returns false if the panel had no such warning.
    pub fn remove_warning(&mut self, id: WarningId) -> bool {
        let Some(target) = self.panel.warning(id).map(|w| w.target.clone()) else {
            return false;
        };
        self.panel.remove_warning(id);
        self.history.forget(id);
        self.source.set_query(self.panel.query());
        self.show_detail_overlay = false;

        info!("Removed warning {} ({})", id, target);
        self.set_status_message(format!("Removed warning on {}", target));

        // The remaining warnings were classifiable before, so this only
        // drops the removed row.
        let _ = self.reclassify();
        true
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            bail!("No data to export");
        };
        write_export(data, &self.panel, path)
    }
}

/// Build the JSON export for one refresh.
pub fn export_json(data: &PanelData, panel: &PanelConfig) -> Result<serde_json::Value> {
    let counts = data.counts();
    Ok(serde_json::json!({
        "summary": {
            "total": counts.total(),
            "ok": counts.ok,
            "warning": counts.warning,
            "critical": counts.critical,
            "now": data.now,
            "barrier": data.barrier,
            "time_proximity_days": panel.time_proximity_days,
        },
        "warnings": panel.warnings,
        "classifications": serde_json::to_value(&data.classifications)?,
    }))
}

/// Write the JSON export to `path`.
pub fn write_export(data: &PanelData, panel: &PanelConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_json(data, panel)?)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use trendwatch_adapters::MetricsQuery;
    use trendwatch_types::{Intercepts, Operator, RegressionResult, SeriesResult, State};

    const DAY: f64 = 86_400.0;

    /// Scripted source: each poll pops the next outcome.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        outcomes: Vec<Result<ResultBatch, String>>,
        error: Option<String>,
        queries: Arc<Mutex<Vec<MetricsQuery>>>,
    }

    impl DataSource for ScriptedSource {
        fn poll(&mut self) -> Option<ResultBatch> {
            if self.outcomes.is_empty() {
                return None;
            }
            match self.outcomes.remove(0) {
                Ok(batch) => {
                    self.error = None;
                    Some(batch)
                }
                Err(e) => {
                    self.error = Some(e);
                    None
                }
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }

        fn error(&self) -> Option<&str> {
            self.error.as_deref()
        }

        fn set_query(&mut self, query: MetricsQuery) {
            self.queries.lock().unwrap().push(query);
        }
    }

    fn panel() -> PanelConfig {
        let mut panel = PanelConfig::default();
        panel.add_warning("disk.used", 100.0, Operator::Gte);
        panel.add_warning("mem.free", 10.0, Operator::Lte);
        panel.add_warning("cpu.load", 5.0, Operator::Gte);
        panel
    }

    fn series(id: WarningId, alias: &str, slope: f64, lower_days: f64, last: f64) -> SeriesResult {
        let t = Utc::now().timestamp() as f64;
        let lower = t + lower_days * DAY;
        SeriesResult::new(
            alias,
            RegressionResult::builder(id)
                .slope(slope)
                .r_squared(0.5)
                .intercepts(Intercepts::new(lower, lower + DAY, lower + 2.0 * DAY))
                .last(last)
                .build(),
        )
    }

    fn batch() -> ResultBatch {
        vec![
            series(0, "disk.used", 1.0, -1.0, 50.0),   // critical
            series(1, "mem.free", -1.0, 10.0, 50.0),   // warning
            series(2, "cpu.load", -1.0, 300.0, 1.0),   // ok
        ]
    }

    fn app_with(outcomes: Vec<Result<ResultBatch, String>>) -> App {
        let source = ScriptedSource {
            outcomes,
            ..Default::default()
        };
        App::with_theme(Box::new(source), panel(), Theme::dark())
    }

    #[test]
    fn view_cycles() {
        assert_eq!(View::Warnings.next(), View::Alerts);
        assert_eq!(View::Alerts.next(), View::Warnings);
        assert_eq!(View::Warnings.prev(), View::Alerts);
        assert_eq!(View::Alerts.label(), "Alerts");
    }

    #[test]
    fn reload_classifies_batch() {
        let mut app = app_with(vec![Ok(batch())]);
        assert!(app.reload_data().unwrap());

        let data = app.data.as_ref().unwrap();
        let states: Vec<_> = data.classifications.iter().map(|c| c.state).collect();
        assert_eq!(states, vec![State::Critical, State::Warning, State::Ok]);
        assert!(app.load_error.is_none());

        // Nothing new
        assert!(!app.reload_data().unwrap());
        assert!(app.data.is_some());
    }

    #[test]
    fn source_error_clears_data() {
        let mut app = app_with(vec![Ok(batch()), Err("Request timed out".to_string())]);
        app.reload_data().unwrap();
        assert!(app.data.is_some());

        assert!(!app.reload_data().unwrap());
        assert!(app.data.is_none());
        assert_eq!(app.load_error.as_deref(), Some("Request timed out"));
    }

    #[test]
    fn malformed_batch_fails_whole_refresh() {
        let mut bad = batch();
        bad[1].result.intercepts.lower = f64::NAN;
        let mut app = app_with(vec![Ok(batch()), Ok(bad)]);
        app.reload_data().unwrap();

        assert!(app.reload_data().is_err());
        assert!(app.data.is_none());
        assert!(app.load_error.as_deref().unwrap().contains("warning 1"));
    }

    #[test]
    fn refresh_reclassifies_without_new_data() {
        let mut app = app_with(vec![Ok(batch())]);
        app.refresh().unwrap();
        let first = app.data.as_ref().unwrap().now;

        app.refresh().unwrap();
        assert!(app.data.as_ref().unwrap().now >= first);
        assert_eq!(app.history.recent_states(0, 8).len(), 2);
    }

    #[test]
    fn history_advances_once_per_refresh() {
        let mut app = app_with(vec![Ok(batch())]);

        // A batch picked up between ticks renders but is not recorded
        assert!(app.reload_data().unwrap());
        assert!(app.history.recent_states(0, 8).is_empty());

        app.refresh().unwrap();
        assert_eq!(app.history.recent_states(0, 8).len(), 1);

        assert!(app.remove_warning(2));
        assert_eq!(app.history.recent_states(0, 8).len(), 1);

        app.refresh().unwrap();
        assert_eq!(app.history.recent_states(0, 8).len(), 2);
    }

    #[test]
    fn recovers_after_error() {
        let mut app = app_with(vec![Err("down".to_string()), Ok(batch())]);
        app.reload_data().unwrap();
        assert!(app.load_error.is_some());

        assert!(app.reload_data().unwrap());
        assert!(app.load_error.is_none());
        assert_eq!(app.data.as_ref().unwrap().classifications.len(), 3);
    }

    #[test]
    fn escalation_sets_status_message() {
        let mut calm = batch();
        calm[2] = series(2, "cpu.load", -1.0, 300.0, 1.0);
        let mut worse = batch();
        worse[2] = series(2, "cpu.load", 1.0, -1.0, 1.0);

        let mut app = app_with(vec![Ok(calm), Ok(worse)]);
        app.refresh().unwrap();
        assert!(app.get_status_message().is_none());

        app.refresh().unwrap();
        assert_eq!(app.get_status_message(), Some("cpu.load is now Critical"));
    }

    #[test]
    fn alerts_view_selects_non_ok_only() {
        let mut app = app_with(vec![Ok(batch())]);
        app.reload_data().unwrap();
        app.set_view(View::Alerts);

        assert_eq!(app.visible_alerts().len(), 2);
        app.select_last();
        assert_eq!(app.selected_alert_index, 1);
        assert_eq!(app.selected_classification().unwrap().alias, "mem.free");
        app.select_next();
        assert_eq!(app.selected_alert_index, 1);
    }

    #[test]
    fn filter_narrows_rows() {
        let mut app = app_with(vec![Ok(batch())]);
        app.reload_data().unwrap();
        app.select_last();

        for c in "MEM".chars() {
            app.filter_push(c);
        }
        let rows = app.visible_classifications();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].alias, "mem.free");
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn remove_selected_warning_updates_panel_and_query() {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let source = ScriptedSource {
            outcomes: vec![Ok(batch())],
            queries: queries.clone(),
            ..Default::default()
        };
        let mut app = App::with_theme(Box::new(source), panel(), Theme::dark());
        app.reload_data().unwrap();

        // Default sort is by state, critical first
        app.select_last();
        let removed = app.remove_selected_warning().unwrap();
        assert_eq!(removed, 2);

        assert!(app.panel.warning(2).is_none());
        assert_eq!(app.data.as_ref().unwrap().classifications.len(), 2);
        assert!(app.history.recent_states(2, 8).is_empty());

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].targets.len(), 2);

        // Ids are not reused after removal
        assert_eq!(app.panel.new_warning().id, 3);
    }

    #[test]
    fn export_writes_json() {
        let mut app = app_with(vec![Ok(batch())]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        assert!(app.export_state(&path).is_err());

        app.reload_data().unwrap();
        app.export_state(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["summary"]["critical"], 1);
        assert_eq!(json["classifications"][0]["state"], "critical");
        assert_eq!(json["warnings"].as_array().unwrap().len(), 3);
    }
}
