use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Where the `e` key writes its export
pub const EXPORT_PATH: &str = "trendwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow scrolling through warnings while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            KeyCode::Char('d') => remove_selected(app),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Warnings),
        KeyCode::Char('2') => app.set_view(View::Alerts),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => {
            let _ = app.refresh();
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('d') => remove_selected(app),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

fn remove_selected(app: &mut App) {
    if app.remove_selected_warning().is_none() {
        app.set_status_message("No warning selected".to_string());
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Content rows start after header, tabs and table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                let count = match app.current_view {
                    View::Warnings => app.visible_classifications().len(),
                    View::Alerts => app.visible_alerts().len(),
                };
                if item_row < count {
                    match app.current_view {
                        View::Warnings => app.selected_index = item_row,
                        View::Alerts => app.selected_alert_index = item_row,
                    }
                }
            }

            // Tab clicks (row 1, after header)
            if clicked_row == 1 {
                // Approximate tab positions: Warnings (0-12), Alerts (13-28)
                if mouse.column < 13 {
                    app.set_view(View::Warnings);
                } else if mouse.column < 29 {
                    app.set_view(View::Alerts);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => {
            app.go_back();
        }

        _ => {}
    }
}
