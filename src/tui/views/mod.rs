// Views module - screen-level rendering logic
//
// One screen: title tabs, search bar, the active entity list, an optional
// logs panel and the status bar. Modals stack on top, the toast above them.

mod list;
mod modal;

use super::app::App;
use crate::tui::components::{logs_panel, status_bar, title_bar};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

/// Height of the logs panel when it is shown
const LOGS_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(5),
    ];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    title_bar::render(f, chunks[0], app);
    list::render_search(f, chunks[1], app);
    list::render_list(f, chunks[2], app);
    if app.show_logs {
        logs_panel::render(f, chunks[3], app);
    }
    status_bar::render(f, chunks[chunks.len() - 1], app);

    // Bottom of the stack first so the top modal ends up drawn last
    for open in &app.modals {
        modal::render(f, open, app);
    }

    if let Some(ref toast) = app.toast {
        toast.render(f, f.area(), &app.theme);
    }

    app.clear_expired_toast();
}
