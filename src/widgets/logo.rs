//! The [`NeuroStreamLogo`] widget renders the activation banner.
use crate::styles::theme;
use indoc::indoc;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::Widget;

/// A widget that renders the NeuroStream banner
///
/// Comes in two sizes: `Full` (3 lines, box drawing characters) and
/// `Compact` (1 line) for terminals too narrow for the full banner.
///
/// # Examples
///
/// ```rust
/// use neurostream::widgets::NeuroStreamLogo;
///
/// # fn draw(frame: &mut ratatui::Frame) {
/// frame.render_widget(NeuroStreamLogo::fitting(frame.area().width), frame.area());
/// # }
/// ```
///
/// Renders:
///
/// ```text
/// ╔╗╔╔═╗╦ ╦╦═╗╔═╗╔═╗╔╦╗╦═╗╔═╗╔═╗╔╦╗
/// ║║║║╣ ║ ║╠╦╝║ ║╚═╗ ║ ╠╦╝║╣ ╠═╣║║║
/// ╝╚╝╚═╝╚═╝╩╚═╚═╝╚═╝ ╩ ╩╚═╚═╝╩ ╩╩ ╩
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NeuroStreamLogo {
    size: Size,
    opacity: Option<f32>,
}

/// The size of the logo
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    #[default]
    Full,
    Compact,
}

impl NeuroStreamLogo {
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            opacity: None,
        }
    }

    /// The largest logo that fits in `width` cells.
    pub const fn fitting(width: u16) -> Self {
        if width >= Size::Full.width() {
            Self::new(Size::Full)
        } else {
            Self::new(Size::Compact)
        }
    }

    /// Fade the logo toward the background.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub const fn width(&self) -> u16 {
        self.size.width()
    }

    pub const fn height(&self) -> u16 {
        self.size.height()
    }
}

impl Widget for NeuroStreamLogo {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let t = theme();
        let style = match self.opacity {
            Some(opacity) => Style::default().fg(t.faded(t.primary, opacity)),
            None => t.title_style(),
        };
        Text::raw(self.size.as_str()).style(style).render(area, buf);
    }
}

impl Size {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Full => indoc! {"
                ╔╗╔╔═╗╦ ╦╦═╗╔═╗╔═╗╔╦╗╦═╗╔═╗╔═╗╔╦╗
                ║║║║╣ ║ ║╠╦╝║ ║╚═╗ ║ ╠╦╝║╣ ╠═╣║║║
                ╝╚╝╚═╝╚═╝╩╚═╚═╝╚═╝ ╩ ╩╚═╚═╝╩ ╩╩ ╩
            "},
            Self::Compact => "// NEUROSTREAM //",
        }
    }

    /// Returns the width of the logo in terminal cells
    pub const fn width(self) -> u16 {
        match self {
            Self::Full => 33,
            Self::Compact => 17,
        }
    }

    /// Returns the height of the logo in lines
    pub const fn height(self) -> u16 {
        match self {
            Self::Full => 3,
            Self::Compact => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_sizes_match_art() {
        for size in [Size::Full, Size::Compact] {
            let lines: Vec<&str> = size.as_str().lines().collect();
            assert_eq!(lines.len(), size.height() as usize);
            for line in lines {
                assert_eq!(line.chars().count(), size.width() as usize);
            }
        }
    }

    #[test]
    fn test_fitting_falls_back_to_compact() {
        assert_eq!(NeuroStreamLogo::fitting(80).height(), 3);
        assert_eq!(NeuroStreamLogo::fitting(20).height(), 1);
    }

    #[test]
    fn render_full() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 33, 3));
        NeuroStreamLogo::new(Size::Full).render(buf.area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "╔");
        assert_eq!(buf[(32, 2)].symbol(), "╩");
    }
}
