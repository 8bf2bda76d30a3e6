// Colors and border style for the TUI
//
// One palette built on the terminal's ANSI colors, so it follows whatever
// scheme the user's terminal already has.

use crate::logging::LogLevel;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub title: Color,
    pub status_bar: Color,
    pub selection: Color,
    pub selection_fg: Color,
    pub success: Color,
    pub error: Color,
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            highlight: Color::Cyan,
            title: Color::LightCyan,
            status_bar: Color::Gray,
            selection: Color::Cyan,
            selection_fg: Color::Black,
            success: Color::Green,
            error: Color::Red,
            border_type: BorderType::Rounded,
        }
    }
}

impl Theme {
    pub fn log_color(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Error => self.error,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Info => self.foreground,
            LogLevel::Debug | LogLevel::Trace => self.muted,
        }
    }
}
