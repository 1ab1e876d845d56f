//! Text input widget for rendering [`TextInput`] instances.
//!
//! Handles the bordered block, placeholder text, the disabled state used
//! while a chat query is processing, and cursor placement when focused.

use crate::styles::theme;
use crate::utils::TextInput;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// A widget for rendering a [`TextInput`] with consistent styling.
///
/// # Example
/// ```
/// use neurostream::widgets::TextInputWidget;
/// use neurostream::utils::TextInput;
///
/// let mut input = TextInput::new();
/// input.set_text("status report");
/// let widget = TextInputWidget::new(&input)
///     .title("Query")
///     .placeholder("Ask the core...")
///     .focused(true);
/// // frame.render_widget(widget, area);
/// ```
pub struct TextInputWidget<'a> {
    input: &'a TextInput,
    title: Option<&'a str>,
    placeholder: Option<&'a str>,
    focused: bool,
    disabled: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput) -> Self {
        Self {
            input,
            title: None,
            placeholder: None,
            focused: false,
            disabled: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn display_text(&self) -> &str {
        let text = self.input.text();
        if text.is_empty() {
            self.placeholder.unwrap_or("")
        } else {
            text
        }
    }

    fn text_style(&self) -> Style {
        let t = theme();
        if self.disabled || self.input.text().is_empty() {
            t.muted_style()
        } else {
            t.text_style()
        }
    }

    fn border_style(&self) -> Style {
        let t = theme();
        if self.focused && !self.disabled {
            t.border_focused_style()
        } else {
            t.border_style()
        }
    }

    fn create_block(&self) -> Block<'a> {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.border_style());
        if let Some(title) = self.title {
            block = block.title(format!(" {title} "));
        }
        block
    }

    /// Cursor cell inside `area`, when the cursor should be shown.
    fn cursor_position(&self, area: Rect) -> Option<Position> {
        if !self.focused || self.disabled {
            return None;
        }
        let inner = self.create_block().inner(area);
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        // keep the cursor in view on long lines
        let cursor = u16::try_from(self.input.cursor()).unwrap_or(u16::MAX);
        let x = inner.x + cursor.min(inner.width - 1);
        Some(Position::new(x, inner.y))
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.create_block();
        let inner = block.inner(area);
        let cursor = u16::try_from(self.input.cursor()).unwrap_or(u16::MAX);
        let scroll = cursor.saturating_sub(inner.width.saturating_sub(1));

        Paragraph::new(self.display_text())
            .block(block)
            .style(self.text_style())
            .scroll((0, scroll))
            .render(area, buf);
    }
}

/// Render a [`TextInputWidget`] and place the terminal cursor.
///
/// The `Widget` trait has no access to the frame cursor, hence the extension.
pub trait TextInputWidgetExt {
    fn render_text_input_widget(&mut self, widget: TextInputWidget, area: Rect);
}

impl TextInputWidgetExt for Frame<'_> {
    fn render_text_input_widget(&mut self, widget: TextInputWidget, area: Rect) {
        let cursor = widget.cursor_position(area);
        self.render_widget(widget, area);
        if let Some(position) = cursor {
            self.set_cursor_position(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> TextInput {
        let mut input = TextInput::new();
        input.set_text(text);
        input
    }

    #[test]
    fn test_display_text_empty_with_placeholder() {
        let input = TextInput::new();
        let widget = TextInputWidget::new(&input).placeholder("Ask the core...");
        assert_eq!(widget.display_text(), "Ask the core...");
    }

    #[test]
    fn test_display_text_normal() {
        let input = input("hello");
        assert_eq!(TextInputWidget::new(&input).display_text(), "hello");
    }

    #[test]
    fn test_no_cursor_when_disabled() {
        let input = input("hello");
        let widget = TextInputWidget::new(&input).focused(true).disabled(true);
        assert_eq!(widget.cursor_position(Rect::new(0, 0, 20, 3)), None);
    }

    #[test]
    fn test_cursor_follows_text() {
        let input = input("hello");
        let widget = TextInputWidget::new(&input).focused(true);
        assert_eq!(
            widget.cursor_position(Rect::new(0, 0, 20, 3)),
            Some(Position::new(6, 1))
        );
    }

    #[test]
    fn test_cursor_clamped_to_box() {
        let input = input("a much longer line than the box");
        let widget = TextInputWidget::new(&input).focused(true);
        assert_eq!(
            widget.cursor_position(Rect::new(0, 0, 10, 3)),
            Some(Position::new(8, 1))
        );
    }
}
