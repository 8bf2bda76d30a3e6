//! Toast notification component
//!
//! A non-blocking overlay that auto-dismisses. Renders in the bottom-right
//! corner on top of all other content, modals included.

use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Widest a toast may grow before its text wraps
const MAX_WIDTH: u16 = 60;

pub struct Toast {
    pub message: String,
    error: bool,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    /// Informational toast, shown for 2 seconds
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
            created_at: Instant::now(),
            duration: Duration::from_secs(2),
        }
    }

    /// Error toast, shown longer and in the error color
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            duration: Duration::from_secs(4),
            ..Self::new(message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let longest = self
            .message
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0) as u16;
        let width = (longest + 4)
            .min(MAX_WIDTH)
            .min(area.width.saturating_sub(4));
        let inner = width.saturating_sub(4).max(1);
        let lines: u16 = self
            .message
            .lines()
            .map(|line| (UnicodeWidthStr::width(line) as u16).div_ceil(inner).max(1))
            .sum();
        let height = (lines + 2).min(area.height.saturating_sub(2));

        let x = area.right().saturating_sub(width + 2);
        let y = area.bottom().saturating_sub(height + 2);
        let toast_area = Rect::new(x, y, width, height);

        let color = if self.is_error() {
            theme.error
        } else {
            theme.success
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.background));

        let text = Paragraph::new(self.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme.foreground))
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(text, toast_area);
    }
}
