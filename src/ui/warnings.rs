//! Warnings view rendering.
//!
//! One row per classified warning with its state, projected crossing
//! window, confidence and recent history.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use trendwatch_types::Classification;

use crate::app::App;
use crate::data::duration::format_relative;

use super::render_trend;

/// Number of refreshes shown in the trend column.
const TREND_WIDTH: usize = 8;

/// Columns the Warnings table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    State,
    /// Series alias, alphabetically.
    Target,
    /// Earliest projected crossing.
    Crossing,
    /// Goodness of fit.
    Confidence,
    Slope,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::State => SortColumn::Target,
            SortColumn::Target => SortColumn::Crossing,
            SortColumn::Crossing => SortColumn::Confidence,
            SortColumn::Confidence => SortColumn::Slope,
            SortColumn::Slope => SortColumn::State,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::State => "state",
            SortColumn::Target => "target",
            SortColumn::Crossing => "crossing",
            SortColumn::Confidence => "confidence",
            SortColumn::Slope => "slope",
        }
    }
}

/// Render the Warnings view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let rows_data = app.visible_classifications();

    let header = Row::new(vec![
        Cell::from(format_header("Target", SortColumn::Target, app)),
        Cell::from(format_header("Crossing", SortColumn::Crossing, app)),
        Cell::from("Until"),
        Cell::from(format_header("Confidence", SortColumn::Confidence, app)),
        Cell::from(format_header("Slope", SortColumn::Slope, app)),
        Cell::from("Trend"),
        Cell::from(format_header("State", SortColumn::State, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|c| {
            let status_style = app.theme.status_style(c.state);
            let trend = app.history.recent_states(c.warning_id, TREND_WIDTH);

            Row::new(vec![
                Cell::from(c.alias.clone()),
                Cell::from(format_relative(c.lower, data.now)).style(status_style),
                Cell::from(format_relative(c.upper, data.now)),
                Cell::from(c.stars.glyphs()).style(Style::default().fg(app.theme.stars)),
                Cell::from(format!("{:+.3e}", c.slope)),
                Cell::from(render_trend(&trend, TREND_WIDTH)),
                Cell::from(c.state.symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),  // Target
        Constraint::Fill(1),  // Crossing
        Constraint::Fill(1),  // Until
        Constraint::Min(10),  // Stars
        Constraint::Min(10),  // Slope
        Constraint::Min(8),   // Trend
        Constraint::Min(6),   // State
    ];

    let selected = app.selected_index.min(rows_data.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows_data.is_empty() {
        format!(" [{}/{}]", selected + 1, rows_data.len())
    } else {
        String::new()
    };

    let title = format!(
        " Warnings ({}/{}) [s:sort {}{}]{}{} ",
        rows_data.len(),
        data.classifications.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort rows by the given column and direction.
///
/// Ties fall back to the alias so the order is stable between refreshes.
pub fn sort_classifications_by(rows: &mut [&Classification], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::State => a.state.cmp(&b.state),
            SortColumn::Target => a.alias.cmp(&b.alias),
            SortColumn::Crossing => a.lower.cmp(&b.lower),
            SortColumn::Confidence => a.r_squared.total_cmp(&b.r_squared),
            SortColumn::Slope => a.slope.total_cmp(&b.slope),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.alias.cmp(&b.alias)
        } else {
            primary
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trendwatch_types::{State, Stars};

    fn row(alias: &str, state: State, r_squared: f64, lower_offset: i64) -> Classification {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Classification {
            warning_id: 0,
            alias: alias.to_string(),
            lower: now + chrono::Duration::days(lower_offset),
            upper: now,
            hue: 120,
            stars: Stars::default(),
            slope: r_squared - 0.5,
            r_squared,
            now,
            barrier: now,
            state,
        }
    }

    #[test]
    fn sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::State);
    }

    #[test]
    fn sorts_by_state_then_alias() {
        let a = row("b", State::Critical, 0.1, 0);
        let b = row("a", State::Critical, 0.2, 0);
        let c = row("c", State::Ok, 0.3, 0);
        let mut rows = vec![&c, &a, &b];

        sort_classifications_by(&mut rows, SortColumn::State, false);
        let aliases: Vec<_> = rows.iter().map(|r| r.alias.as_str()).collect();
        assert_eq!(aliases, vec!["a", "b", "c"]);
    }

    #[test]
    fn sorts_by_confidence_and_crossing() {
        let a = row("a", State::Ok, 0.7, 3);
        let b = row("b", State::Ok, 0.2, 1);
        let mut rows = vec![&a, &b];

        sort_classifications_by(&mut rows, SortColumn::Confidence, true);
        assert_eq!(rows[0].alias, "b");

        sort_classifications_by(&mut rows, SortColumn::Crossing, false);
        assert_eq!(rows[0].alias, "a");
    }
}
