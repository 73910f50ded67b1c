//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with the panel overview.
///
/// Displays: worst-state indicator, counts by state, proximity window.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let status = if app.load_error.is_some() {
            Span::styled("| No data", Style::default().fg(app.theme.critical))
        } else {
            Span::raw("| Loading...")
        };
        let line = Line::from(vec![
            Span::styled(" TRENDWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            status,
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let counts = data.counts();

    let dim = Style::default().add_modifier(Modifier::DIM);
    let count_span = |n: usize, style: Style| {
        if n > 0 {
            Span::styled(n.to_string(), style)
        } else {
            Span::styled("0", dim)
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(counts.worst())),
        Span::styled("TRENDWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(counts.ok.to_string(), Style::default().fg(app.theme.ok)),
        Span::raw(" ok "),
        count_span(counts.warning, Style::default().fg(app.theme.warning)),
        Span::raw(" warn "),
        count_span(
            counts.critical,
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" crit │ "),
        Span::styled(
            counts.total().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" targets │ "),
        Span::raw(format!("window {}d", app.panel.time_proximity_days)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let alert_count = app
        .data
        .as_ref()
        .map(|d| d.alerts().len())
        .unwrap_or(0);

    let titles: Vec<Line> = vec![
        Line::from(" 1:Warnings "),
        Line::from(format!(" 2:Alerts ({}) ", alert_count)),
    ];

    let selected = match app.current_view {
        View::Warnings => 0,
        View::Alerts => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the panel error when data was cleared, otherwise the source,
/// time since last update and available controls. Temporary status
/// messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | q:quit r:retry", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();

        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            match app.current_view {
                View::Warnings => "/:search s:sort Tab:switch Enter:detail d:remove ?:help q:quit",
                View::Alerts => "/:search Tab:switch Enter:detail d:remove ?:help q:quit",
            }
        };

        format!(
            " {} | {} | Updated {:.1}s ago | {}",
            app.current_view.label(),
            app.source_description(),
            elapsed.as_secs_f64(),
            controls,
        )
    } else {
        format!(" {} | Loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Warnings & Alerts"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from("  d         Remove selected warning"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
