use crate::chat::{ChatDispatcher, ChatPanel, GeminiClient};
use crate::components::{
    Component, ComponentAction, ContentPageComponent, HubComponent, SplashComponent, View,
};
use crate::config::Config;
use crate::effects::{AudioEngine, DeviceAudio, VirtualAudio};
use crate::page::{NavigateOutcome, PageController, PageId};
use crate::tui::Tui;
use crate::widgets::ToastManager;
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Which component owns the screen this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Splash,
    Hub,
    Page(PageId),
    /// Between hiding one page and showing the next.
    Blank,
}

/// Open the output device when audio is enabled.
///
/// Without a device, audio is switched off so sound effects are skipped, and
/// the voice bookkeeping runs on `VirtualAudio`.
fn open_audio(enabled: &mut bool, toasts: &mut ToastManager) -> Box<dyn AudioEngine> {
    if !*enabled {
        return Box::new(VirtualAudio::new());
    }
    match DeviceAudio::open() {
        Ok(device) => Box::new(device),
        Err(e) => {
            warn!("{e}; continuing without sound");
            toasts.warning(format!("{e}. Sound is off"));
            *enabled = false;
            Box::new(VirtualAudio::new())
        }
    }
}

/// Main application state
pub struct App {
    tui: Tui,
    /// Kept alive for the chat dispatcher's spawned requests.
    _runtime: Runtime,
    dispatcher: ChatDispatcher,
    controller: PageController,
    chat: ChatPanel,
    toasts: ToastManager,
    splash: SplashComponent,
    hub: HubComponent,
    content: Option<ContentPageComponent>,
    chat_focused: bool,
    should_quit: bool,
    started: Instant,
    frame_interval: Duration,
    skip_splash: bool,
}

impl App {
    pub fn new(config: &Config, skip_splash: bool) -> Result<Self> {
        let (width, height) =
            crossterm::terminal::size().context("Failed to read terminal size")?;
        let tui = Tui::new()?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;

        let client =
            GeminiClient::new(config.client_settings()).context("Failed to create chat client")?;
        if config.api_key().is_none() {
            info!("No API key configured; chat queries will fail until one is set");
        }
        let dispatcher = ChatDispatcher::new(client, runtime.handle().clone());

        let mut options = config.controller_options();
        if skip_splash {
            options.activation_fade_ms = 0;
        }
        let mut toasts = ToastManager::new();
        let audio = open_audio(&mut options.effects.capabilities.audio, &mut toasts);
        let controller = PageController::new(Rect::new(0, 0, width, height), audio, options);

        Ok(Self {
            tui,
            _runtime: runtime,
            dispatcher,
            controller,
            chat: ChatPanel::new(config.log.max_entries, config.timing.typewriter_ms),
            toasts,
            splash: SplashComponent::new(),
            hub: HubComponent::new(),
            content: None,
            chat_focused: false,
            should_quit: false,
            started: Instant::now(),
            frame_interval: Duration::from_millis(config.timing.frame_ms.max(1)),
            skip_splash,
        })
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn run(&mut self) -> Result<()> {
        self.tui.enter()?;
        if self.skip_splash {
            self.controller.activate(self.now_ms());
        }

        loop {
            self.update();
            self.draw()?;

            if self.should_quit {
                break;
            }

            if let Some(event) = self.tui.poll_event(self.frame_interval)? {
                self.handle_event(&event)?;
            }
        }

        self.controller.shutdown(self.now_ms());
        self.tui.exit()?;
        info!("NeuroStream exited");
        Ok(())
    }

    /// Advance the controller and chat to the current time.
    fn update(&mut self) {
        let now = self.now_ms();
        self.controller.tick(now);

        while let Some(result) = self.dispatcher.try_recv() {
            if result.is_err() {
                self.toasts.error("AI core unreachable");
            }
            self.chat.receive(result, now);
        }
        self.chat.tick(now);

        for notice in self.controller.take_notices() {
            self.toasts.warning(notice);
        }
        self.toasts.tick();
    }

    fn screen(&self) -> Screen {
        let stage = self.controller.stage();
        if stage.splash().visible {
            return Screen::Splash;
        }
        match stage.visible_pages().first() {
            Some(page) if page.is_home() => Screen::Hub,
            Some(page) => Screen::Page((*page).clone()),
            None => Screen::Blank,
        }
    }

    fn draw(&mut self) -> Result<()> {
        let screen = self.screen();
        if let Screen::Page(page) = &screen {
            if self.content.as_ref().map(ContentPageComponent::page) != Some(page) {
                self.content = Some(ContentPageComponent::new(page.clone()));
            }
        }

        let view = View {
            controller: &self.controller,
            chat: &self.chat,
            chat_focused: self.chat_focused,
        };
        let splash = &mut self.splash;
        let hub = &mut self.hub;
        let content = &mut self.content;
        let toasts = &self.toasts;

        let mut result = Ok(());
        self.tui.terminal_mut().draw(|frame| {
            let area = frame.area();
            result = match &screen {
                Screen::Splash => splash.render(frame, area, &view),
                Screen::Hub => hub.render(frame, area, &view),
                Screen::Page(_) => content
                    .as_mut()
                    .map_or(Ok(()), |page| page.render(frame, area, &view)),
                Screen::Blank => Ok(()),
            };
            toasts.render(frame, area);
        })?;
        result
    }

    fn handle_event(&mut self, event: &Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press
                && key.code == KeyCode::Char('c')
                && key.modifiers.contains(KeyModifiers::CONTROL)
            {
                self.should_quit = true;
                return Ok(());
            }
        }
        if let Event::Resize(width, height) = *event {
            self.controller.handle_resize(width, height);
            return Ok(());
        }

        let view = View {
            controller: &self.controller,
            chat: &self.chat,
            chat_focused: self.chat_focused,
        };
        let action = match self.screen() {
            Screen::Splash => self.splash.handle_event(event, &view)?,
            Screen::Hub => self.hub.handle_event(event, &view)?,
            Screen::Page(_) => match self.content.as_mut() {
                Some(page) => page.handle_event(event, &view)?,
                None => ComponentAction::None,
            },
            Screen::Blank => ComponentAction::None,
        };
        self.apply(action);
        Ok(())
    }

    fn apply(&mut self, action: ComponentAction) {
        let now = self.now_ms();
        match action {
            ComponentAction::None | ComponentAction::Update => {}
            ComponentAction::Quit => self.should_quit = true,
            ComponentAction::Activate => {
                if self.controller.activate(now) {
                    self.controller.play_click();
                }
            }
            ComponentAction::Navigate(page) => {
                let outcome = self.controller.navigate(page, now);
                debug!(?outcome, "Navigation requested");
                if matches!(outcome, NavigateOutcome::Started | NavigateOutcome::Queued) {
                    self.controller.play_click();
                }
                if outcome == NavigateOutcome::Started {
                    self.chat_focused = false;
                }
            }
            ComponentAction::FocusChat(focused) => self.chat_focused = focused,
            ComponentAction::EditInput(key) => {
                if !self.chat.is_processing() {
                    self.chat.input_mut().handle_key(key);
                }
            }
            ComponentAction::Submit => {
                if let Some(query) = self.chat.submit_input() {
                    self.dispatcher.dispatch(query);
                }
            }
            ComponentAction::Scroll(delta) => {
                self.controller.handle_scroll(delta);
            }
            ComponentAction::Pointer { x, y } => self.controller.set_pointer(
                x as f32 / ComponentAction::POINTER_SCALE,
                y as f32 / ComponentAction::POINTER_SCALE,
            ),
        }
    }
}
