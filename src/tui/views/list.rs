// List view: search bar and the paged entity list of the active tab

use crate::paging::Phase;
use crate::tui::app::{App, RowView};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let pane = app.active_pane();
    let search = pane.search();

    let border = if search.focused {
        app.theme.highlight
    } else {
        app.theme.border
    };
    let line = if search.focused {
        Line::from(vec![
            Span::styled(search.text.as_str(), Style::default().fg(app.theme.foreground)),
            Span::styled("▏", Style::default().fg(app.theme.highlight)),
        ])
    } else if search.text.is_empty() {
        Line::from(Span::styled(
            "Press / to search",
            Style::default().fg(app.theme.muted),
        ))
    } else {
        Line::from(Span::styled(
            search.text.as_str(),
            Style::default().fg(app.theme.foreground),
        ))
    };

    let title = format!(" Search {} ", pane.kind().plural());
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

pub fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let pane = app.active_pane();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(format!(" {} ", pane.kind().title()));

    // Nothing to show yet: spinner, empty state or a retry hint
    if pane.item_count() == 0 {
        let message = match pane.phase() {
            Phase::InitialLoading => format!("{} Loading {}…", app.spinner_char(), pane.kind().plural()),
            _ if pane.shows_no_results() => "No results".to_string(),
            // The error itself went out as a toast
            _ => "Could not load. Press r to retry.".to_string(),
        };
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = pane
        .rows()
        .into_iter()
        .map(|row| match row {
            RowView::Item { id, label } => {
                let id = id.map(|id| format!("{id:>5}  ")).unwrap_or_else(|| "    -  ".to_string());
                ListItem::new(Line::from(vec![
                    Span::styled(id, Style::default().fg(app.theme.muted)),
                    Span::styled(label, Style::default().fg(app.theme.foreground)),
                ]))
            }
            RowView::LoadingFooter => ListItem::new(Line::from(Span::styled(
                format!("{} Loading more…", app.spinner_char()),
                Style::default().fg(app.theme.muted),
            ))),
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(app.theme.selection)
            .fg(app.theme.selection_fg)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default().with_selected(Some(pane.selected()));
    f.render_stateful_widget(list, area, &mut state);
}
