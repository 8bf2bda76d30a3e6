//! Logs panel component
//!
//! Tail of the in-memory log buffer. The buffer is shared with the tracing
//! layer, so the panel only reads the newest entries that fit each frame.

use crate::logging::LogEntry;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// `HH:MM:SS LEVEL target: message`
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "{} {:<5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.short_target(),
        entry.message
    )
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(" Logs (L to hide) ");

    if app.log_buffer.is_empty() {
        let empty = Paragraph::new("No log entries yet")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let entries = app.log_buffer.recent(visible);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let style = Style::default().fg(app.theme.log_color(entry.level));
            ListItem::new(Line::from(Span::styled(format_log_entry(entry), style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
