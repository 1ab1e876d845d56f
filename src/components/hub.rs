use crate::chat::ChatPanel;
use crate::components::component::{Component, ComponentAction, View};
use crate::components::footer::Footer;
use crate::geometry::HubLayout;
use crate::page::{PageId, CORES};
use crate::stage::{Stage, Surface};
use crate::styles::{theme, Theme};
use crate::widgets::{TextInputWidget, TextInputWidgetExt};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap};

const FOOTER_HINTS: &str = "Select: ←→ | Open: Enter/1-5 | Chat: Tab | Quit: q";
const CHAT_FOOTER_HINTS: &str = "Send: Enter | Leave chat: Esc";
const PROCESSING_FOOTER_HINTS: &str = "Receiving transmission... | Leave chat: Esc";

/// The hub: data cores joined by connectors, the flock and storm behind
/// them, and the chat console below.
#[derive(Debug, Default)]
pub struct HubComponent {
    /// Core highlighted by the keyboard.
    selected: usize,
    /// Core under the mouse pointer.
    hovered: Option<&'static str>,
}

impl HubComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_page(&self) -> PageId {
        CORES[self.selected % CORES.len()].page_id()
    }

    fn page_for_core(core_id: &str) -> Option<PageId> {
        CORES
            .iter()
            .find(|info| info.core_id == core_id)
            .map(|info| info.page_id())
    }

    fn label_for_core(core_id: &str) -> &'static str {
        CORES
            .iter()
            .find(|info| info.core_id == core_id)
            .map_or("", |info| info.label)
    }

    fn select_offset(&mut self, delta: isize) {
        let len = CORES.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    fn render_backdrop(frame: &mut Frame, area: Rect, view: &View<'_>, opacity: f32) {
        let t = theme();
        let stage = view.controller.stage();
        let width = f64::from(area.width.max(1));
        let height = f64::from(area.height.max(1));

        let storm = stage.storm_overlay();
        let flash = stage.lightning_flash();
        let background = if flash > 0.05 {
            t.faded(t.lightning, flash * 0.5)
        } else {
            t.faded(t.storm, storm)
        };

        let connectors = stage.connectors();
        let connector_color = t.faded(t.connector_color(), opacity);
        let boids: Vec<(f64, f64)> = view
            .controller
            .flock()
            .filter(|_| stage.container(&PageId::HOME).is_some_and(|c| c.visible))
            .map(|flock| flock.boids().iter().map(|b| (b.x, height - b.y)).collect())
            .unwrap_or_default();
        let boid_color = t.faded(t.text_muted, opacity);

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(background)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(move |ctx| {
                ctx.draw(&Points {
                    coords: &boids,
                    color: boid_color,
                });
                ctx.layer();
                for segment in connectors {
                    let end = segment.end();
                    ctx.draw(&CanvasLine::new(
                        segment.start.x,
                        height - segment.start.y,
                        end.x,
                        height - end.y,
                        connector_color,
                    ));
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_cores(&self, frame: &mut Frame, stage: &Stage, t: &Theme, opacity: f32) {
        for (i, affordance) in stage.affordances().iter().enumerate() {
            let highlighted = self.hovered == Some(affordance.core_id) || i == self.selected;
            let mut style = t.core_style(highlighted);
            if let Some(fg) = style.fg {
                style = style.fg(t.faded(fg, opacity));
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(style);
            let label = Paragraph::new(Self::label_for_core(affordance.core_id))
                .style(style)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(Clear, affordance.rect);
            frame.render_widget(label, affordance.rect);
        }
    }

    fn render_chat(frame: &mut Frame, area: Rect, chat: &ChatPanel, focused: bool) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                t.border_focused_style()
            } else {
                t.border_style()
            })
            .title(Span::styled(" NEUROSTREAM AI CORE ", t.title_style()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        let input = TextInputWidget::new(chat.input())
            .title("Query")
            .placeholder("Ask the core...")
            .focused(focused)
            .disabled(chat.is_processing());
        frame.render_text_input_widget(input, chunks[0]);

        let response = chat.response();
        let body = if response.is_empty() && chat.is_processing() {
            Paragraph::new("PROCESSING...").style(t.muted_style())
        } else {
            Paragraph::new(response).style(t.accent_style())
        };
        frame.render_widget(body.wrap(Wrap { trim: false }), chunks[1]);
    }

    fn render_log(frame: &mut Frame, area: Rect, chat: &ChatPanel) {
        let t = theme();
        let items: Vec<ListItem> = chat
            .log()
            .entries()
            .map(|entry| {
                let style = if entry.is_critical() {
                    t.critical_style()
                } else {
                    t.text_style()
                };
                ListItem::new(entry.render()).style(style)
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(t.border_style())
                .title(Span::styled(" SYSTEM LOG ", t.title_style())),
        );
        frame.render_widget(list, area);
    }
}

impl Component for HubComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, view: &View<'_>) -> Result<()> {
        let t = theme();
        let layout = HubLayout::compute(area);
        let stage = view.controller.stage();
        let opacity = stage
            .opacity(&Surface::Page(PageId::HOME))
            .unwrap_or(0.0);

        Self::render_backdrop(frame, layout.cores, view, opacity);
        self.render_cores(frame, stage, &t, opacity);
        Self::render_chat(frame, layout.chat, view.chat, view.chat_focused);
        Self::render_log(frame, layout.logs, view.chat);

        let hints = match (view.chat_focused, view.chat.is_processing()) {
            (true, true) => PROCESSING_FOOTER_HINTS,
            (true, false) => CHAT_FOOTER_HINTS,
            (false, _) => FOOTER_HINTS,
        };
        Footer::render(frame, layout.footer, hints)?;
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, view: &View<'_>) -> Result<ComponentAction> {
        let stage = view.controller.stage();
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if view.chat_focused {
                    return Ok(match key.code {
                        KeyCode::Esc | KeyCode::Tab => ComponentAction::FocusChat(false),
                        KeyCode::Enter => ComponentAction::Submit,
                        _ => ComponentAction::EditInput(*key),
                    });
                }
                Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => ComponentAction::Quit,
                    KeyCode::Tab | KeyCode::Char('/' | 'i') => ComponentAction::FocusChat(true),
                    KeyCode::Left | KeyCode::Up | KeyCode::Char('h' | 'k') => {
                        self.select_offset(-1);
                        ComponentAction::Update
                    }
                    KeyCode::Right | KeyCode::Down | KeyCode::Char('l' | 'j') => {
                        self.select_offset(1);
                        ComponentAction::Update
                    }
                    KeyCode::Enter => ComponentAction::Navigate(self.selected_page()),
                    KeyCode::Char(c @ '1'..='9') => {
                        let index = c as usize - '1' as usize;
                        match CORES.get(index) {
                            Some(info) => {
                                self.selected = index;
                                ComponentAction::Navigate(info.page_id())
                            }
                            None => ComponentAction::None,
                        }
                    }
                    _ => ComponentAction::None,
                })
            }
            Event::Mouse(mouse) => {
                let hit = stage.affordance_at(mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Moved => {
                        let hovered = hit.map(|a| a.core_id);
                        if hovered == self.hovered {
                            return Ok(ComponentAction::None);
                        }
                        self.hovered = hovered;
                        Ok(ComponentAction::Update)
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(page) = hit.and_then(|a| Self::page_for_core(a.core_id)) {
                            return Ok(ComponentAction::Navigate(page));
                        }
                        let chat = HubLayout::compute(stage.viewport()).chat;
                        let inside = chat.contains(Position::new(mouse.column, mouse.row));
                        if inside != view.chat_focused {
                            Ok(ComponentAction::FocusChat(inside))
                        } else {
                            Ok(ComponentAction::None)
                        }
                    }
                    _ => Ok(ComponentAction::None),
                }
            }
            _ => Ok(ComponentAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::VirtualAudio;
    use crate::page::controller::ControllerOptions;
    use crate::page::PageController;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};

    fn controller() -> PageController {
        PageController::new(
            Rect::new(0, 0, 120, 40),
            Box::new(VirtualAudio::new()),
            ControllerOptions {
                seed: Some(1),
                ..ControllerOptions::default()
            },
        )
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_number_keys_open_cores() {
        let controller = controller();
        let chat = ChatPanel::new(20, 30);
        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: false,
        };
        let mut hub = HubComponent::new();
        let action = hub.handle_event(&key(KeyCode::Char('5')), &view).unwrap();
        assert_eq!(action, ComponentAction::Navigate(PageId::MYSTERY));
    }

    #[test]
    fn test_arrow_keys_wrap_selection() {
        let mut hub = HubComponent::new();
        hub.select_offset(-1);
        assert_eq!(hub.selected_page(), CORES[CORES.len() - 1].page_id());
        hub.select_offset(1);
        assert_eq!(hub.selected_page(), PageId::HYPER_NEXUS);
    }

    #[test]
    fn test_click_on_core_navigates() {
        let controller = controller();
        let chat = ChatPanel::new(20, 30);
        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: false,
        };
        let core = controller.stage().affordances()[1].clone();
        let mut hub = HubComponent::new();
        let action = hub
            .handle_event(&click(core.rect.x + 1, core.rect.y + 1), &view)
            .unwrap();
        assert_eq!(action, ComponentAction::Navigate(PageId::EMOTIONS));
    }

    #[test]
    fn test_chat_focus_routes_keys_to_input() {
        let controller = controller();
        let chat = ChatPanel::new(20, 30);
        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: true,
        };
        let mut hub = HubComponent::new();
        assert_eq!(
            hub.handle_event(&key(KeyCode::Char('q')), &view).unwrap(),
            ComponentAction::EditInput(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))
        );
        assert_eq!(
            hub.handle_event(&key(KeyCode::Enter), &view).unwrap(),
            ComponentAction::Submit
        );
        assert_eq!(
            hub.handle_event(&key(KeyCode::Esc), &view).unwrap(),
            ComponentAction::FocusChat(false)
        );
    }
}
