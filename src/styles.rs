//! Neon palette and style helpers.
//!
//! The palette lives in a global so widgets can style themselves without
//! threading a theme through every render call.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Global theme instance (supports runtime updates)
static THEME: RwLock<Theme> = RwLock::new(Theme::neon());

/// Install the global theme (call once at startup, or to update at runtime)
pub fn init_theme(theme_type: ThemeType) {
    let mut theme = THEME.write().unwrap_or_else(PoisonError::into_inner);
    *theme = Theme::new(theme_type);
}

/// Get the current theme
pub fn theme() -> Theme {
    THEME.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Theme selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    #[default]
    Neon,
    /// No colors at all, modifiers only (`NO_COLOR=1`)
    Mono,
}

impl FromStr for ThemeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "mono" | "nocolor" | "no-color" | "no_color" => ThemeType::Mono,
            _ => ThemeType::Neon,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub theme_type: ThemeType,

    /// Titles, focused borders, data cores
    pub primary: Color,
    /// Connectors and secondary accents
    pub secondary: Color,
    /// Chat responses
    pub accent: Color,

    pub success: Color,
    pub warning: Color,
    /// Critical log entries and chat failures
    pub critical: Color,

    pub text: Color,
    pub text_muted: Color,
    pub border: Color,

    /// Storm overlay tint
    pub storm: Color,
    /// Lightning flash
    pub lightning: Color,
}

impl Theme {
    pub fn new(theme_type: ThemeType) -> Self {
        match theme_type {
            ThemeType::Neon => Self::neon(),
            ThemeType::Mono => Self::mono(),
        }
    }

    pub const fn neon() -> Self {
        Self {
            theme_type: ThemeType::Neon,
            primary: Color::Rgb(0, 255, 255),
            secondary: Color::Rgb(255, 0, 255),
            accent: Color::Rgb(57, 255, 20),
            success: Color::Rgb(57, 255, 20),
            warning: Color::Rgb(255, 200, 0),
            critical: Color::Rgb(255, 40, 80),
            text: Color::Rgb(220, 230, 255),
            text_muted: Color::Rgb(110, 120, 150),
            border: Color::Rgb(60, 70, 110),
            storm: Color::Rgb(40, 50, 90),
            lightning: Color::Rgb(240, 245, 255),
        }
    }

    pub const fn mono() -> Self {
        Self {
            theme_type: ThemeType::Mono,
            primary: Color::Reset,
            secondary: Color::Reset,
            accent: Color::Reset,
            success: Color::Reset,
            warning: Color::Reset,
            critical: Color::Reset,
            text: Color::Reset,
            text_muted: Color::Reset,
            border: Color::Reset,
            storm: Color::Reset,
            lightning: Color::Reset,
        }
    }

    fn is_mono(&self) -> bool {
        self.theme_type == ThemeType::Mono
    }

    pub fn title_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::BOLD);
        }
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        if self.is_mono() {
            return Style::default();
        }
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::DIM);
        }
        Style::default().fg(self.text_muted)
    }

    pub fn accent_style(&self) -> Style {
        if self.is_mono() {
            return Style::default();
        }
        Style::default().fg(self.accent)
    }

    pub fn critical_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        Style::default()
            .fg(self.critical)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::BOLD);
        }
        Style::default().fg(self.warning)
    }

    pub fn success_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::BOLD);
        }
        Style::default().fg(self.success)
    }

    pub fn border_style(&self) -> Style {
        if self.is_mono() {
            return Style::default();
        }
        Style::default().fg(self.border)
    }

    pub fn border_focused_style(&self) -> Style {
        if self.is_mono() {
            return Style::default().add_modifier(Modifier::BOLD);
        }
        Style::default().fg(self.primary)
    }

    /// Data core box, brighter when hovered
    pub fn core_style(&self, hovered: bool) -> Style {
        match (self.is_mono(), hovered) {
            (true, true) => Style::default().add_modifier(Modifier::REVERSED),
            (true, false) => Style::default(),
            (false, true) => Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            (false, false) => Style::default().fg(self.primary),
        }
    }

    pub fn connector_color(&self) -> Color {
        self.secondary
    }

    /// Fade a color toward the terminal background by `opacity`.
    pub fn faded(&self, color: Color, opacity: f32) -> Color {
        match color {
            Color::Rgb(r, g, b) if !self.is_mono() => {
                let scale = |c: u8| (f32::from(c) * opacity.clamp(0.0, 1.0)) as u8;
                Color::Rgb(scale(r), scale(g), scale(b))
            }
            other => other,
        }
    }

    /// Particle color for a hue in `0.0..1.0` at 90% saturation.
    pub fn hue_color(&self, hue: f32, bright: bool) -> Color {
        if self.is_mono() {
            return Color::Reset;
        }
        let lightness = if bright { 0.8 } else { 0.6 };
        let (r, g, b) = hsl_to_rgb(hue, 0.9, lightness);
        Color::Rgb(r, g, b)
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(1.0)) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}
