// Title bar component
//
// App name plus the three entity tabs, with the active tab highlighted.

use crate::entity::EntityKind;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = EntityKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let pane = app.pane(*kind);
            let count = if pane.has_loaded() {
                format!(" ({})", pane.item_count())
            } else {
                String::new()
            };
            Line::from(format!("{} {}{}", i + 1, kind.title(), count))
        })
        .collect();
    let selected = EntityKind::ALL
        .iter()
        .position(|k| *k == app.active)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(app.theme.muted))
        .highlight_style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title(Span::styled(
                    " polis ",
                    Style::default()
                        .fg(app.theme.title)
                        .add_modifier(Modifier::BOLD),
                ))
                .title_top(Line::from(" ? ").right_aligned()),
        );

    f.render_widget(tabs, area);
}
