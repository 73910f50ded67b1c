use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use trendwatch_types::State;

use crate::app::App;
use crate::data::duration::format_relative;

/// Render the alerts view: warning and critical targets, critical first
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let alerts = app.visible_alerts();
    if alerts.is_empty() && data.counts().worst() == State::Ok {
        render_all_clear(frame, app, area);
        return;
    }

    let critical_count = alerts.iter().filter(|c| c.state == State::Critical).count();
    let warning_count = alerts.len() - critical_count;

    let header = Row::new(vec![
        Cell::from("State"),
        Cell::from("Target"),
        Cell::from("Crossing"),
        Cell::from("Confidence"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|c| {
            let style = app.theme.status_style(c.state);
            // Past crossings read as "crossed 2h ago"
            let crossing = if c.lower <= data.now {
                format!("crossed {}", format_relative(c.lower, data.now))
            } else {
                format_relative(c.lower, data.now)
            };
            Row::new(vec![
                Cell::from(c.state.symbol()).style(style),
                Cell::from(c.alias.clone()),
                Cell::from(crossing).style(style),
                Cell::from(format!("{} {:.2}", c.stars.glyphs(), c.r_squared))
                    .style(Style::default().fg(app.theme.stars)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(6),  // State
        Constraint::Fill(3), // Target
        Constraint::Fill(1), // Crossing
        Constraint::Min(16), // Confidence
    ];

    let selected = app.selected_alert_index.min(alerts.len().saturating_sub(1));

    let title = format!(
        " Alerts: {} critical, {} warning (barrier {}) ",
        critical_count,
        warning_count,
        format_relative(data.barrier, data.now)
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

fn render_all_clear(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Alerts ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.ok));

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("    ✓ ", Style::default().fg(app.theme.ok)),
            Span::styled(
                "All targets ok",
                Style::default().fg(app.theme.ok).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!(
                "      No threshold crossings projected within {} days.",
                app.panel.time_proximity_days
            ),
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
