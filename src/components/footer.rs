use crate::styles::theme;
use anyhow::Result;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Common footer component
///
/// Key hint bar shared by the splash, hub and content pages.
pub struct Footer;

impl Footer {
    /// Render a footer with the given text
    ///
    /// # Arguments
    /// * `frame` - The frame to render to
    /// * `area` - The area to render the footer in
    /// * `text` - `label: keys` pairs separated by ` | `
    ///
    /// # Returns
    /// The height used (2 lines: 1 for border, 1 for text)
    pub fn render(frame: &mut Frame, area: Rect, text: &str) -> Result<u16> {
        let t = theme();
        let footer_block = Block::default()
            .borders(Borders::TOP)
            .border_style(t.border_style())
            .border_type(BorderType::Rounded);

        let footer_inner = footer_block.inner(area);
        let footer = Paragraph::new(Self::hint_line(text)).alignment(Alignment::Center);

        frame.render_widget(footer_block, area);
        frame.render_widget(footer, footer_inner);

        Ok(2)
    }

    /// Style `label: keys` pairs, keys highlighted.
    ///
    /// Parts without a `: ` separator are shown as plain text.
    fn hint_line(text: &str) -> Line<'_> {
        let t = theme();
        let mut spans = Vec::new();
        for (i, part) in text.split(" | ").enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", t.muted_style()));
            }
            // Split on ": " to separate label from keys
            if let Some((label, keys)) = part.split_once(": ") {
                spans.push(Span::styled(format!("{label}: "), t.title_style()));
                spans.push(Span::styled(keys, t.warning_style().add_modifier(Modifier::BOLD)));
            } else {
                spans.push(Span::styled(part, t.text_style()));
            }
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_line_splits_pairs() {
        let line = Footer::hint_line("Open: 1-5 | Quit: q");
        let text: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, vec!["Open: ", "1-5", " | ", "Quit: ", "q"]);
    }

    #[test]
    fn test_hint_line_plain_part() {
        let line = Footer::hint_line("processing");
        assert_eq!(line.spans.len(), 1);
    }
}
