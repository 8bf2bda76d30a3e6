// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, finished requests)
// - Key dispatch to modals, the search bar and the lists

pub mod app;
pub mod components;
pub mod modal;
pub mod theme;
pub mod views;

use crate::api::SchoolClient;
use crate::config::Config;
use crate::editor::AnyForm;
use crate::entity::EntityKind;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, AppMessage};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop and restores the terminal even
/// when the loop fails.
pub async fn run_tui(client: Arc<SchoolClient>, log_buffer: LogBuffer, config: Config) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::channel(256);
    let mut app = App::new(client, log_buffer, config, tx);
    app.start();

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on whichever comes first: a key, the animation tick, or a finished
/// request reporting back through the channel.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppMessage>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(message) = rx.recv() => {
                app.handle_message(message);
            }
        }

        app.surface_list_errors();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Layered dispatch: modal, then search bar, then list keys
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if !app.modals.is_empty() {
        app.handle_modal_key(key_event);
        return;
    }

    if app.active_pane().search().focused {
        handle_search_key(app, key_event);
        return;
    }

    handle_list_key(app, key_event);
}

fn handle_search_key(app: &mut App, key_event: KeyEvent) {
    let active = app.active;
    match key_event.code {
        KeyCode::Enter => app.submit_search(),
        KeyCode::Esc => app.pane_mut(active).search_mut().focused = false,
        KeyCode::Char('u') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_search()
        }
        KeyCode::Backspace => {
            app.pane_mut(active).search_mut().text.pop();
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.pane_mut(active).search_mut().text.push(c);
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key_event: KeyEvent) {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        match key_event.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('u') => app.clear_search(),
            _ => {}
        }
        return;
    }

    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modals.push(modal::Modal::Help),
        KeyCode::Char('L') => app.show_logs = !app.show_logs,

        KeyCode::Tab | KeyCode::Right => app.set_tab(app.active.next()),
        KeyCode::BackTab | KeyCode::Left => app.set_tab(app.active.prev()),
        KeyCode::Char('1') => app.set_tab(EntityKind::Teacher),
        KeyCode::Char('2') => app.set_tab(EntityKind::Course),
        KeyCode::Char('3') => app.set_tab(EntityKind::Student),

        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-10),
        KeyCode::PageDown => app.move_selection(10),
        KeyCode::Home | KeyCode::Char('g') => app.move_selection(isize::MIN),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),

        KeyCode::Char('/') => {
            let active = app.active;
            app.pane_mut(active).search_mut().focused = true;
        }
        KeyCode::Char('r') => app.refresh_active(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('n') => app.open_editor(AnyForm::create(app.active)),
        KeyCode::Char('e') => {
            if let Some(entity) = app.active_pane().selected_entity() {
                app.open_editor(AnyForm::edit(&entity));
            }
        }
        _ => {}
    }
}
