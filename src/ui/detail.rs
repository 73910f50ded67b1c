//! Detail overlay rendering.
//!
//! Displays a modal overlay with the full classification of the selected
//! warning and its state history.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::app::App;
use crate::data::duration::format_relative;

use super::render_trend;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;
/// Refreshes shown in the history strip.
const HISTORY_WIDTH: usize = 40;

/// Render the warning detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(c) = app.selected_classification() else {
        return;
    };

    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 24);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Header
        Constraint::Min(8),    // Projection
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // Header
    let state_style = app.theme.status_style(c.state);
    let rule_text = match app.selected_warning() {
        Some(w) => w.describe(),
        None => "(warning removed)".to_string(),
    };

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", c.alias),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Rule: "),
            Span::styled(rule_text, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("    Status: "),
            Span::styled(
                format!("{} {}", c.state.symbol(), c.state.label()),
                state_style.add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(format!(" Warning #{} ", c.warning_id))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // Projection
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let history = app.history.recent_states(c.warning_id, HISTORY_WIDTH);
    let body = vec![
        Line::from(vec![
            Span::raw(" Earliest crossing: "),
            Span::styled(format_instant(c.lower), bold),
            Span::raw(format!("  ({})", format_relative(c.lower, c.now))),
        ]),
        Line::from(vec![
            Span::raw(" Latest crossing:   "),
            Span::styled(format_instant(c.upper), bold),
            Span::raw(format!("  ({})", format_relative(c.upper, c.now))),
        ]),
        Line::from(vec![
            Span::raw(" Barrier:           "),
            Span::raw(format_instant(c.barrier)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Slope: "),
            Span::styled(format!("{:+.6e}/s", c.slope), bold),
            Span::raw("    r²: "),
            Span::styled(format!("{:.3}", c.r_squared), bold),
            Span::raw("    "),
            Span::styled(c.stars.glyphs(), Style::default().fg(app.theme.stars)),
            Span::raw(format!(" ({:.1})", c.stars.actual)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" History: "),
            Span::styled(render_trend(&history, HISTORY_WIDTH), state_style),
        ]),
    ];

    let projection = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Projection ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(projection, chunks[1]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Esc:close  d:remove warning ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
