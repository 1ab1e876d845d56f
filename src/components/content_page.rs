use crate::components::component::{normalized_pointer, Component, ComponentAction, View};
use crate::components::footer::Footer;
use crate::effects::scroll_scale::SCALE_GAIN;
use crate::page::{page_info, PageController, PageId};
use crate::stage::{ScrollSurface, Surface};
use crate::styles::theme;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Points};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

const FOOTER_HINTS: &str = "Back: Esc/Backspace | Quit: q";
const SCROLL_FOOTER_HINTS: &str = "Scroll: ↑↓/PgUp/PgDn/wheel | Back: Esc/Backspace | Quit: q";
const BACK_LABEL: &str = "◀ RETURN TO HUB";

/// Dots on the cloud band around the globe.
const CLOUD_DOTS: usize = 48;
const GLOBE_RADIUS: f64 = 0.3;

/// Archive entries revealed while scrolling the deep archive page.
const ARCHIVE_LINES: &[&str] = &[
    "0x00  boot sequence recorded",
    "0x1F  first synaptic handshake",
    "0x2A  emotion bands calibrated",
    "0x3C  visualizer swarm seeded",
    "0x4E  anomaly sighted at the edge of the map",
    "0x5B  storm front logged over the hub",
    "0x6D  signal gain exceeds design limits",
    "0x7F  archive sealed",
];

/// A content page: title, body, a back affordance, and whatever the page's
/// effects draw (particles, flock, scaled headline).
#[derive(Debug, Clone)]
pub struct ContentPageComponent {
    page: PageId,
    /// Area of the back affordance from the last render.
    back_area: Rect,
    /// Area drawn by the page, for pointer normalization.
    body_area: Rect,
}

impl ContentPageComponent {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            back_area: Rect::default(),
            body_area: Rect::default(),
        }
    }

    pub fn page(&self) -> &PageId {
        &self.page
    }

    /// Spread a headline with spaces as it grows.
    pub fn scaled_headline(text: &str, scale: f32) -> String {
        let max = ScrollSurface::BASE_SCALE + SCALE_GAIN;
        let steps = ((scale - ScrollSurface::BASE_SCALE) / (max - ScrollSurface::BASE_SCALE)
            * 3.0)
            .round()
            .clamp(0.0, 3.0) as usize;
        if steps == 0 {
            return text.to_string();
        }
        let gap = " ".repeat(steps);
        text.chars()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(&gap)
    }

    fn render_particles(frame: &mut Frame, area: Rect, controller: &PageController, opacity: f32) {
        let Some(scene) = controller.particles() else {
            return;
        };
        let t = theme();
        let aspect = f64::from(area.width.max(1)) / (f64::from(area.height.max(1)) * 2.0);

        let mut near: Vec<(f64, f64, Color)> = Vec::new();
        for p in scene.projected() {
            near.push((p.x, p.y, t.faded(t.hue_color(p.hue, p.near), opacity)));
        }

        let globe = f64::from(scene.globe_rotation());
        let cloud = f64::from(scene.cloud_rotation());
        let band: Vec<(f64, f64)> = (0..CLOUD_DOTS)
            .map(|i| {
                let angle = cloud + i as f64 / CLOUD_DOTS as f64 * std::f64::consts::TAU;
                (
                    angle.cos() * GLOBE_RADIUS * 1.4 / aspect,
                    angle.sin() * GLOBE_RADIUS * 0.35,
                )
            })
            .collect();
        let meridian: Vec<(f64, f64)> = (0..16)
            .map(|i| {
                let lat = (i as f64 / 15.0 - 0.5) * std::f64::consts::PI;
                (
                    lat.cos() * globe.sin() * GLOBE_RADIUS / aspect,
                    lat.sin() * GLOBE_RADIUS,
                )
            })
            .collect();
        let globe_color = t.faded(t.primary, opacity);
        let cloud_color = t.faded(t.text_muted, opacity);

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(move |ctx| {
                for &(x, y, color) in &near {
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                }
                ctx.layer();
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: GLOBE_RADIUS,
                    color: globe_color,
                });
                ctx.draw(&Points {
                    coords: &meridian,
                    color: globe_color,
                });
                ctx.draw(&Points {
                    coords: &band,
                    color: cloud_color,
                });
            });
        frame.render_widget(canvas, area);
    }

    fn render_flock(frame: &mut Frame, area: Rect, controller: &PageController, opacity: f32) {
        let Some(flock) = controller.flock() else {
            return;
        };
        let t = theme();
        let (width, height) = flock.bounds();
        let boids: Vec<(f64, f64)> = flock.boids().iter().map(|b| (b.x, height - b.y)).collect();
        let color = t.faded(t.secondary, opacity);
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(move |ctx| {
                ctx.draw(&Points {
                    coords: &boids,
                    color,
                });
            });
        frame.render_widget(canvas, area);
    }

    fn render_archive(frame: &mut Frame, area: Rect, controller: &PageController, opacity: f32) {
        let t = theme();
        let surface = controller.stage().scroll_text();
        let headline = Self::scaled_headline("SIGNAL AMPLIFIED", surface.scale);
        let mut style = t.title_style();
        if let Some(fg) = style.fg {
            style = style.fg(t.faded(fg, opacity));
        }
        if surface.scale > ScrollSurface::BASE_SCALE + SCALE_GAIN / 2.0 {
            style = style.add_modifier(Modifier::REVERSED);
        }

        // leading blank rows give the reader room to scroll into the archive
        let mut lines: Vec<Line> = vec![Line::from(""); usize::from(area.height / 2)];
        lines.push(Line::styled(headline, style).alignment(Alignment::Center));
        lines.push(Line::from(""));
        for entry in ARCHIVE_LINES {
            lines.push(Line::styled(*entry, t.text_style()).alignment(Alignment::Center));
            lines.push(Line::from(""));
        }
        let paragraph = Paragraph::new(lines).scroll((surface.offset / 3, 0));
        frame.render_widget(paragraph, area);
    }
}

impl Component for ContentPageComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, view: &View<'_>) -> Result<()> {
        let t = theme();
        let controller = view.controller;
        let opacity = controller
            .stage()
            .opacity(&Surface::Page(self.page.clone()))
            .unwrap_or(0.0);
        let (title, body) = page_info(&self.page).map_or((self.page.as_str(), ""), |info| {
            (info.title, info.body)
        });

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(area);

        let mut title_style = t.title_style();
        if let Some(fg) = title_style.fg {
            title_style = title_style.fg(t.faded(fg, opacity));
        }
        let header = Paragraph::new(title)
            .style(title_style)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_type(BorderType::Double)
                    .border_style(t.border_style()),
            );
        frame.render_widget(header, chunks[0]);

        let mut body_style = t.text_style();
        if let Some(fg) = body_style.fg {
            body_style = body_style.fg(t.faded(fg, opacity));
        }
        frame.render_widget(
            Paragraph::new(body)
                .style(body_style)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[1],
        );

        self.body_area = chunks[2];
        if self.page == PageId::MYSTERY {
            Self::render_particles(frame, chunks[2], controller, opacity);
        } else if self.page == PageId::SCROLL_TEXT {
            Self::render_archive(frame, chunks[2], controller, opacity);
        } else if self.page == PageId::IMAGE_HOVER {
            Self::render_flock(frame, chunks[2], controller, opacity);
        }

        let back_width = (BACK_LABEL.chars().count() as u16).min(chunks[3].width);
        self.back_area = Rect::new(chunks[3].x + 1, chunks[3].y, back_width, 1);
        frame.render_widget(
            Paragraph::new(BACK_LABEL).style(t.warning_style()),
            self.back_area,
        );

        let hints = if self.page == PageId::SCROLL_TEXT {
            SCROLL_FOOTER_HINTS
        } else {
            FOOTER_HINTS
        };
        Footer::render(frame, chunks[4], hints)?;
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, _view: &View<'_>) -> Result<ComponentAction> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    ComponentAction::Navigate(PageId::HOME)
                }
                KeyCode::Char('q') => ComponentAction::Quit,
                KeyCode::Down | KeyCode::Char('j') => ComponentAction::Scroll(1),
                KeyCode::Up | KeyCode::Char('k') => ComponentAction::Scroll(-1),
                KeyCode::PageDown | KeyCode::Char(' ') => ComponentAction::Scroll(10),
                KeyCode::PageUp => ComponentAction::Scroll(-10),
                _ => ComponentAction::None,
            }),
            Event::Mouse(mouse) => Ok(match mouse.kind {
                MouseEventKind::ScrollDown => ComponentAction::Scroll(3),
                MouseEventKind::ScrollUp => ComponentAction::Scroll(-3),
                MouseEventKind::Moved => {
                    let (x, y) = normalized_pointer(self.body_area, mouse.column, mouse.row);
                    ComponentAction::pointer(x, y)
                }
                MouseEventKind::Down(MouseButton::Left)
                    if self
                        .back_area
                        .contains(Position::new(mouse.column, mouse.row)) =>
                {
                    ComponentAction::Navigate(PageId::HOME)
                }
                _ => ComponentAction::None,
            }),
            _ => Ok(ComponentAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_unscaled_at_base() {
        assert_eq!(
            ContentPageComponent::scaled_headline("SIGNAL", ScrollSurface::BASE_SCALE),
            "SIGNAL"
        );
    }

    #[test]
    fn test_headline_spreads_at_full_scale() {
        let full = ScrollSurface::BASE_SCALE + SCALE_GAIN;
        assert_eq!(ContentPageComponent::scaled_headline("AB", full), "A   B");
    }

    #[test]
    fn test_back_keys_return_home() {
        use crossterm::event::{KeyEvent, KeyModifiers};
        use crate::chat::ChatPanel;
        use crate::effects::VirtualAudio;
        use crate::page::controller::ControllerOptions;

        let controller = PageController::new(
            Rect::new(0, 0, 80, 24),
            Box::new(VirtualAudio::new()),
            ControllerOptions::default(),
        );
        let chat = ChatPanel::new(20, 30);
        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: false,
        };
        let mut page = ContentPageComponent::new(PageId::EMOTIONS);
        for code in [KeyCode::Esc, KeyCode::Backspace] {
            let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
            assert_eq!(
                page.handle_event(&event, &view).unwrap(),
                ComponentAction::Navigate(PageId::HOME)
            );
        }
    }
}
