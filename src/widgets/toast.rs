//! Toast notification widget.
//!
//! A non-blocking notice that appears in the corner of the screen and
//! closes on its own. Used for skipped effects and unavailable pages.

use crate::styles::theme;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Toasts kept waiting behind the visible one.
const MAX_QUEUED: usize = 4;

/// Toast notification variant for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    /// Info notification (primary)
    Info,
    /// Warning notification (amber), used for skipped effects
    Warning,
    /// Error notification (critical red)
    Error,
}

impl ToastVariant {
    /// Get the icon for this variant
    pub fn icon(&self) -> &'static str {
        match self {
            ToastVariant::Info => "\u{2139}",    // ℹ
            ToastVariant::Warning => "\u{26A0}", // ⚠
            ToastVariant::Error => "\u{2718}",   // ✘
        }
    }

    /// Get the border color for this variant
    pub fn color(&self) -> Color {
        let t = theme();
        match self {
            ToastVariant::Info => t.primary,
            ToastVariant::Warning => t.warning,
            ToastVariant::Error => t.critical,
        }
    }
}

/// Toast notification data
#[derive(Debug, Clone)]
pub struct Toast {
    /// The message to display
    pub message: String,
    /// The variant (info, warning, error)
    pub variant: ToastVariant,
    /// When the toast became visible
    pub created_at: Instant,
    /// How long to show the toast
    pub duration: Duration,
}

impl Toast {
    /// Create a new toast notification
    pub fn new(message: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            message: message.into(),
            variant,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    /// Create an info toast
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Info)
    }

    /// Create a warning toast
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Warning)
    }

    /// Create an error toast
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Error)
    }

    /// Set a custom duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the toast has expired
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Toast widget for rendering a toast notification
///
/// Renders in the bottom-right corner of the given area, above the footer.
pub struct ToastWidget<'a> {
    toast: &'a Toast,
}

impl<'a> ToastWidget<'a> {
    /// Create a new toast widget
    pub fn new(toast: &'a Toast) -> Self {
        Self { toast }
    }

    /// Calculate the toast area (bottom-right corner)
    fn calculate_area(area: Rect) -> Rect {
        let toast_width = 44u16.min(area.width.saturating_sub(4));
        let toast_height = 3u16.min(area.height);

        // Above the footer
        let x = area.x + area.width.saturating_sub(toast_width + 2);
        let y = area.y + area.height.saturating_sub(toast_height + 3);

        Rect::new(x, y, toast_width, toast_height)
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let toast_area = Self::calculate_area(area);
        let t = theme();

        Widget::render(Clear, toast_area, buf);

        let message = format!(" {} {} ", self.toast.variant.icon(), self.toast.message);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.toast.variant.color()));

        let paragraph = Paragraph::new(message)
            .block(block)
            .style(t.text_style().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });

        Widget::render(paragraph, toast_area, buf);
    }
}

/// Shows one toast at a time; later toasts wait their turn.
#[derive(Debug, Default)]
pub struct ToastManager {
    current: Option<Toast>,
    queue: VecDeque<Toast>,
}

impl ToastManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `toast` now, or queue it behind the visible one.
    pub fn push(&mut self, toast: Toast) {
        if self.current.is_none() {
            self.current = Some(toast);
            return;
        }
        if self.queue.len() == MAX_QUEUED {
            self.queue.pop_front();
        }
        self.queue.push_back(toast);
    }

    /// Push an info toast
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::info(message));
    }

    /// Push a warning toast
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Toast::warning(message));
    }

    /// Push an error toast
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::error(message));
    }

    /// Drop the expired toast, promote the next one, and report whether a
    /// toast is visible.
    pub fn tick(&mut self) -> bool {
        if self.current.as_ref().is_some_and(Toast::is_expired) {
            self.current = self.queue.pop_front().map(|mut next| {
                next.created_at = Instant::now();
                next
            });
        }
        self.current.is_some()
    }

    /// The visible toast, if any
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Number of toasts waiting behind the visible one
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Render the visible toast over `area`
    pub fn render(&self, frame: &mut ratatui::Frame, area: Rect) {
        if let Some(toast) = self.current() {
            frame.render_widget(ToastWidget::new(toast), area);
        }
    }
}
