// Status bar component
//
// Backend, loading state of the active list and the most useful keys.

use crate::paging::Phase;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn status_text(app: &App) -> String {
    let pane = app.active_pane();
    let state = match pane.phase() {
        Phase::InitialLoading => format!("{} loading", app.spinner_char()),
        Phase::LoadingMore => format!("{} loading more", app.spinner_char()),
        Phase::Error => "✗ error".to_string(),
        Phase::Idle if !pane.has_loaded() => "not loaded".to_string(),
        Phase::Idle => format!("{} {}", pane.item_count(), pane.kind().plural()),
    };

    format!(
        " {} │ {} │ / search · Enter open · n new · r refresh · Tab switch · ? help · q quit",
        app.client.base_url(), state
    )
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let status = Paragraph::new(status_text(app))
        .style(Style::default().fg(app.theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SchoolClient;
    use crate::config::Config;
    use crate::logging::LogBuffer;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_status_shows_backend_and_unloaded_list() {
        let client = Arc::new(SchoolClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap());
        let (tx, _rx) = mpsc::channel(1);
        let app = App::new(client, LogBuffer::new(), Config::default(), tx);

        let text = status_text(&app);
        assert!(text.starts_with(" http://127.0.0.1:9 │ not loaded │"), "{text}");
    }
}
