// Modal overlay rendering
//
// Every modal is a bordered box drawn over a cleared area:
// - Help: keyboard shortcuts
// - Detail: one entity's fields plus its actions
// - Editor: create/edit form
// - Picker: choose the other side of an association
// - Confirm: delete confirmation

use crate::tui::app::App;
use crate::tui::modal::{ConfirmModal, DetailModal, EditorModal, Modal, PickerModal};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, modal: &Modal, app: &App) {
    match modal {
        Modal::Help => render_help(f, app),
        Modal::Detail(detail) => render_detail(f, app, detail),
        Modal::Editor(editor) => render_editor(f, app, editor),
        Modal::Picker(picker) => render_picker(f, app, picker),
        Modal::Confirm(confirm) => render_confirm(f, app, confirm),
    }
}

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn modal_block<'a>(app: &App, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight))
        .title(title)
        .style(Style::default().bg(app.theme.background))
}

fn hint_line<'a>(app: &App, text: &'a str) -> Line<'a> {
    Line::from(Span::styled(text, Style::default().fg(app.theme.muted))).centered()
}

fn render_help(f: &mut Frame, app: &App) {
    let key_style = Style::default().fg(app.theme.highlight);
    let desc_style = Style::default().fg(app.theme.foreground);
    let header_style = Style::default()
        .fg(app.theme.title)
        .add_modifier(Modifier::BOLD);

    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<14}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Lists", header_style)),
        kb("Tab, 1/2/3", "Switch Teachers / Courses / Students"),
        kb("↑/↓, j/k", "Move selection (loads more at the end)"),
        kb("Home/End", "First / last row"),
        kb("/", "Search (Enter applies, Esc leaves)"),
        kb("Ctrl+U", "Clear search"),
        kb("r", "Refresh list"),
        Line::raw(""),
        Line::from(Span::styled("  Records", header_style)),
        kb("Enter", "Open detail"),
        kb("n", "New record"),
        kb("e", "Edit selected record"),
        kb("d (in detail)", "Delete"),
        kb("a/u (in detail)", "Assign / unassign"),
        kb("s/x (course)", "Enroll / remove student"),
        Line::raw(""),
        Line::from(Span::styled("  Other", header_style)),
        kb("L", "Toggle logs"),
        kb("?", "This help"),
        kb("q", "Quit"),
    ]);

    let area = centered_rect(60, 26, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content).block(modal_block(app, " Help ")),
        area,
    );
}

fn render_detail(f: &mut Frame, app: &App, detail: &DetailModal) {
    let title = format!(" {} #{} ", detail.kind.label(), detail.id);
    let block = modal_block(app, title).title_bottom(hint_line(app, detail.hints()));

    let content = match (&detail.entity, &detail.error) {
        (_, Some(error)) => Text::from(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(app.theme.error),
        ))),
        (Some(entity), None) => {
            let label_style = Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD);
            let lines: Vec<Line> = entity
                .detail_lines()
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<14}"), label_style),
                        Span::styled(value, Style::default().fg(app.theme.foreground)),
                    ])
                })
                .collect();
            Text::from(lines)
        }
        (None, None) => Text::from(Line::from(Span::styled(
            format!("{} Loading…", app.spinner_char()),
            Style::default().fg(app.theme.muted),
        ))),
    };

    let area = centered_rect(72, 20, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll, 0))
            .block(block),
        area,
    );
}

fn render_editor(f: &mut Frame, app: &App, editor: &EditorModal) {
    let labels = editor.form.labels();
    let mut lines: Vec<Line> = Vec::new();

    for (i, label) in labels.iter().enumerate() {
        let value = editor.form.field(i).unwrap_or_default();
        let focused = i == editor.focus;
        let label_style = if focused {
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        let mut spans = vec![
            Span::styled(format!("{label:<15}"), label_style),
            Span::styled(value.to_string(), Style::default().fg(app.theme.foreground)),
        ];
        if focused && !editor.outcome.is_loading() {
            spans.push(Span::styled("▏", Style::default().fg(app.theme.highlight)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    if editor.outcome.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{} Saving…", app.spinner_char()),
            Style::default().fg(app.theme.muted),
        )));
    }
    for error in editor.errors() {
        for part in error.lines() {
            lines.push(Line::from(Span::styled(
                part.to_string(),
                Style::default().fg(app.theme.error),
            )));
        }
    }

    let height = (lines.len() as u16 + 2).max(8);
    let area = centered_rect(64, height, f.area());
    let block = modal_block(app, editor.title())
        .title_bottom(hint_line(app, " Tab next · Enter/Ctrl+S save · Esc cancel "));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn render_picker(f: &mut Frame, app: &App, picker: &PickerModal) {
    let area = centered_rect(60, 18, f.area());
    let block = modal_block(app, format!(" {} ", picker.purpose.title()))
        .title_bottom(hint_line(app, " ↑/↓ choose · Enter confirm · Esc cancel "));
    f.render_widget(Clear, area);

    let message = if picker.loading {
        Some((
            format!("{} Loading…", app.spinner_char()),
            app.theme.muted,
        ))
    } else if let Some(ref error) = picker.error {
        Some((error.clone(), app.theme.error))
    } else if picker.items.is_empty() {
        Some(("Nothing to choose from.".to_string(), app.theme.muted))
    } else {
        None
    };

    if let Some((text, color)) = message {
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(color))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|entity| ListItem::new(entity.row_label()))
        .collect();
    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(app.theme.foreground))
        .highlight_style(
            Style::default()
                .bg(app.theme.selection)
                .fg(app.theme.selection_fg),
        );
    let mut state = ListState::default().with_selected(Some(picker.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_confirm(f: &mut Frame, app: &App, confirm: &ConfirmModal) {
    let area = centered_rect(56, 7, f.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.error))
        .title(" Confirm ")
        .style(Style::default().bg(app.theme.background));

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(confirm.prompt.as_str()).centered(),
        Line::raw(""),
        hint_line(app, "y delete · n cancel"),
    ]);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(app.theme.foreground))
            .block(block),
        area,
    );
}
