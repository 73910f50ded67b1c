//! Terminal rendering with ratatui.
//!
//! - [`warnings`]: sortable table of every classified warning
//! - [`alerts`]: non-ok warnings, critical first
//! - [`detail`]: overlay for the selected warning
//! - [`common`]: header, tabs, status bar and help overlay
//! - [`theme`]: light/dark color themes

pub mod alerts;
pub mod common;
pub mod detail;
pub mod theme;
pub mod warnings;

pub use theme::Theme;
pub use warnings::SortColumn;

use trendwatch_types::State;

/// Glyph per state for the history strip.
pub(crate) fn trend_glyph(state: State) -> char {
    match state {
        State::Ok => '▁',
        State::Warning => '▄',
        State::Critical => '█',
    }
}

/// Render the most recent states as a fixed width strip.
pub(crate) fn render_trend(states: &[State], width: usize) -> String {
    let mut out: String = states.iter().map(|&s| trend_glyph(s)).collect();
    let len = states.len();
    if len < width {
        out.insert_str(0, &" ".repeat(width - len));
    }
    out
}
