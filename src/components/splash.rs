use crate::components::component::{Component, ComponentAction, View};
use crate::components::footer::Footer;
use crate::page::ControllerState;
use crate::styles::theme;
use crate::widgets::NeuroStreamLogo;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const PROMPT: &str = "SYSTEM DORMANT // PRESS ENTER TO ACTIVATE";
const ACTIVATING: &str = "ACTIVATING NEURAL LINK...";

/// The activation splash shown until the user wakes the system.
#[derive(Debug, Default)]
pub struct SplashComponent;

impl SplashComponent {
    pub fn new() -> Self {
        Self
    }
}

impl Component for SplashComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, view: &View<'_>) -> Result<()> {
        let t = theme();
        let opacity = view.controller.stage().splash().opacity;
        let dormant = *view.controller.state() == ControllerState::Dormant;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(area);

        let logo = NeuroStreamLogo::fitting(chunks[0].width).opacity(opacity);
        let block_height = logo.height() + 2;
        let top = chunks[0].y + chunks[0].height.saturating_sub(block_height) / 2;
        let logo_area = Rect::new(
            chunks[0].x + chunks[0].width.saturating_sub(logo.width()) / 2,
            top,
            logo.width().min(chunks[0].width),
            logo.height().min(chunks[0].height),
        );
        frame.render_widget(logo, logo_area);

        let prompt_area = Rect::new(
            chunks[0].x,
            (top + logo.height() + 1).min(chunks[0].bottom().saturating_sub(1)),
            chunks[0].width,
            1,
        );
        let (text, color) = if dormant {
            (PROMPT, t.warning)
        } else {
            (ACTIVATING, t.text_muted)
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(t.faded(color, opacity)))
                .alignment(Alignment::Center),
            prompt_area,
        );

        if dormant {
            Footer::render(frame, chunks[1], "Activate: Enter/click | Quit: q")?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, view: &View<'_>) -> Result<ComponentAction> {
        let dormant = *view.controller.state() == ControllerState::Dormant;
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(match key.code {
                KeyCode::Char('q') | KeyCode::Esc => ComponentAction::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ComponentAction::Quit
                }
                KeyCode::Enter | KeyCode::Char(' ') if dormant => ComponentAction::Activate,
                _ => ComponentAction::None,
            }),
            Event::Mouse(mouse)
                if dormant && mouse.kind == MouseEventKind::Down(MouseButton::Left) =>
            {
                Ok(ComponentAction::Activate)
            }
            _ => Ok(ComponentAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatPanel;
    use crate::effects::VirtualAudio;
    use crate::page::controller::ControllerOptions;
    use crate::page::PageController;
    use crossterm::event::KeyEvent;

    #[test]
    fn test_enter_activates_only_while_dormant() {
        let mut controller = PageController::new(
            Rect::new(0, 0, 80, 24),
            Box::new(VirtualAudio::new()),
            ControllerOptions::default(),
        );
        let chat = ChatPanel::new(20, 30);
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let mut splash = SplashComponent::new();

        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: false,
        };
        assert_eq!(
            splash.handle_event(&enter, &view).unwrap(),
            ComponentAction::Activate
        );

        controller.activate(0);
        let view = View {
            controller: &controller,
            chat: &chat,
            chat_focused: false,
        };
        assert_eq!(
            splash.handle_event(&enter, &view).unwrap(),
            ComponentAction::None
        );
    }
}
