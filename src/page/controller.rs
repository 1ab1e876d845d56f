//! Page navigation and effect lifecycle.
//!
//! All continuations are tween or timer events observed in [`PageController::tick`];
//! nothing runs behind the controller's back. The outgoing page is fully
//! released before anything for the incoming page is acquired.

use super::{EffectKind, EffectTable, PageId};
use crate::effects::{AudioEngine, EffectContext, EffectHandle, EffectOptions};
use crate::effects::{FlockVisual, Instrument, NoteLength, ParticleScene};
use crate::engine::{Animator, FrameLoop, Timers, TweenEvent, TweenId};
use crate::stage::{Stage, Surface};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

pub const DEFAULT_FADE_MS: u64 = 500;
pub const DEFAULT_ACTIVATION_FADE_MS: u64 = 1000;

/// Tunables for a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// Page fade-out and fade-in duration.
    pub fade_ms: u64,
    /// Splash fade-out duration.
    pub activation_fade_ms: u64,
    pub effects: EffectOptions,
    /// Fixed RNG seed; random when `None`.
    pub seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            fade_ms: DEFAULT_FADE_MS,
            activation_fade_ms: DEFAULT_ACTIVATION_FADE_MS,
            effects: EffectOptions::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The outgoing page is fading out.
    FadingOut { from: PageId, tween: TweenId },
    /// The incoming page is fading in.
    FadingIn { tween: TweenId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// Splash shown, home inert.
    Dormant,
    /// Splash fading out.
    Activating { tween: TweenId },
    Stable(PageId),
    Transitioning { to: PageId, phase: Phase },
}

/// What a navigation request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    Started,
    /// Deferred until the running transition completes.
    Queued,
    AlreadyActive,
    NotActivated,
}

/// The engine pieces effects operate on.
struct Scene {
    stage: Stage,
    animator: Animator,
    timers: Timers,
    audio: Box<dyn AudioEngine>,
    rng: SmallRng,
}

impl Scene {
    fn ctx(&mut self, now_ms: u64) -> EffectContext<'_> {
        EffectContext {
            now_ms,
            stage: &mut self.stage,
            animator: &mut self.animator,
            timers: &mut self.timers,
            audio: self.audio.as_mut(),
            rng: &mut self.rng,
        }
    }
}

enum Step {
    FinishActivation,
    FinishFadeOut,
    AcquireEffects,
    FinishTransition,
}

pub struct PageController {
    state: ControllerState,
    queued: Option<PageId>,
    table: EffectTable,
    options: ControllerOptions,
    scene: Scene,
    live: Vec<EffectHandle>,
    /// Effects freed by the most recent teardown, in release order.
    released: Vec<EffectKind>,
    notices: Vec<String>,
}

impl PageController {
    pub fn new(viewport: Rect, audio: Box<dyn AudioEngine>, options: ControllerOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            state: ControllerState::Dormant,
            queued: None,
            table: EffectTable::default(),
            options,
            scene: Scene {
                stage: Stage::new(viewport),
                animator: Animator::new(),
                timers: Timers::new(),
                audio,
                rng,
            },
            live: Vec::new(),
            released: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Replace the page-to-effects table.
    pub fn with_table(mut self, table: EffectTable) -> Self {
        self.table = table;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_activated(&self) -> bool {
        !matches!(
            self.state,
            ControllerState::Dormant | ControllerState::Activating { .. }
        )
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.state,
            ControllerState::Activating { .. } | ControllerState::Transitioning { .. }
        )
    }

    /// The page currently shown, if the system is activated.
    pub fn active_page(&self) -> Option<&PageId> {
        match &self.state {
            ControllerState::Dormant | ControllerState::Activating { .. } => None,
            ControllerState::Stable(page) => Some(page),
            ControllerState::Transitioning {
                phase: Phase::FadingOut { from, .. },
                ..
            } => Some(from),
            ControllerState::Transitioning {
                to,
                phase: Phase::FadingIn { .. },
            } => Some(to),
        }
    }

    pub fn queued(&self) -> Option<&PageId> {
        self.queued.as_ref()
    }

    pub fn stage(&self) -> &Stage {
        &self.scene.stage
    }

    /// Stage access for hosts that add or remove page containers.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.scene.stage
    }

    pub fn audio(&self) -> &dyn AudioEngine {
        self.scene.audio.as_ref()
    }

    pub fn table(&self) -> &EffectTable {
        &self.table
    }

    /// Kinds of the live effect handles, in acquisition order.
    pub fn live_effects(&self) -> Vec<EffectKind> {
        self.live.iter().map(EffectHandle::kind).collect()
    }

    pub fn flock(&self) -> Option<&FlockVisual> {
        self.live.iter().find_map(|effect| match effect {
            EffectHandle::Flock(_, flock) => Some(flock),
            _ => None,
        })
    }

    pub fn particles(&self) -> Option<&ParticleScene> {
        self.live.iter().find_map(|effect| match effect {
            EffectHandle::Particles(scene) => Some(scene),
            _ => None,
        })
    }

    /// Handle to the particle frame loop while the particle page is live.
    pub fn particle_loop(&self) -> Option<FrameLoop> {
        self.particles().and_then(ParticleScene::frame_loop)
    }

    /// Drain warnings raised since the last call.
    /// Effects freed by the most recent teardown, in release order.
    pub fn released(&self) -> &[EffectKind] {
        &self.released
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    fn notice(&mut self, message: String) {
        self.notices.push(message);
    }

    /// Dismiss the splash and enter home. Only valid while dormant.
    pub fn activate(&mut self, now_ms: u64) -> bool {
        if self.state != ControllerState::Dormant {
            return false;
        }
        info!("System activation");
        self.scene.audio.resume();
        let tween = self.scene.animator.animate_opacity(
            Surface::Splash,
            0.0,
            self.options.activation_fade_ms,
            now_ms,
        );
        self.state = ControllerState::Activating { tween };
        true
    }

    /// Request a transition to `target`.
    pub fn navigate(&mut self, target: PageId, now_ms: u64) -> NavigateOutcome {
        match &self.state {
            ControllerState::Dormant => {
                debug!(page = %target, "Navigation before activation ignored");
                NavigateOutcome::NotActivated
            }
            ControllerState::Activating { .. } | ControllerState::Transitioning { .. } => {
                debug!(page = %target, "Navigation queued");
                self.queued = Some(target);
                NavigateOutcome::Queued
            }
            ControllerState::Stable(current) if *current == target => {
                NavigateOutcome::AlreadyActive
            }
            ControllerState::Stable(current) => {
                let from = current.clone();
                info!(from = %from, to = %target, "Navigating");
                let tween = self.scene.animator.animate_opacity(
                    Surface::Page(from.clone()),
                    0.0,
                    self.options.fade_ms,
                    now_ms,
                );
                self.state = ControllerState::Transitioning {
                    to: target,
                    phase: Phase::FadingOut { from, tween },
                };
                NavigateOutcome::Started
            }
        }
    }

    /// Advance tweens, timers and per-frame effects to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        let events = self.scene.animator.tick(now_ms, &mut self.scene.stage);
        for event in events {
            self.on_tween_event(event, now_ms);
        }

        let fired = self.scene.timers.tick(now_ms);
        let mut ctx = self.scene.ctx(now_ms);
        for id in fired {
            for effect in &mut self.live {
                if effect.on_timer(id, &mut ctx) {
                    break;
                }
            }
        }
        for effect in &mut self.live {
            effect.on_frame(&mut ctx);
        }
    }

    fn on_tween_event(&mut self, event: TweenEvent, now_ms: u64) {
        let step = match (&self.state, event) {
            (ControllerState::Activating { tween }, TweenEvent::Completed(id)) if *tween == id => {
                Step::FinishActivation
            }
            (
                ControllerState::Transitioning {
                    phase: Phase::FadingOut { tween, .. },
                    ..
                },
                TweenEvent::Completed(id),
            ) if *tween == id => Step::FinishFadeOut,
            (
                ControllerState::Transitioning {
                    phase: Phase::FadingIn { tween },
                    ..
                },
                TweenEvent::Started(id),
            ) if *tween == id => Step::AcquireEffects,
            (
                ControllerState::Transitioning {
                    phase: Phase::FadingIn { tween },
                    ..
                },
                TweenEvent::Completed(id),
            ) if *tween == id => Step::FinishTransition,
            _ => return,
        };

        match step {
            Step::FinishActivation => {
                self.scene.stage.hide_splash();
                self.begin_entry(PageId::HOME, now_ms);
            }
            Step::FinishFadeOut => self.finish_fade_out(now_ms),
            Step::AcquireEffects => self.acquire_effects(now_ms),
            Step::FinishTransition => self.finish_transition(now_ms),
        }
    }

    fn finish_fade_out(&mut self, now_ms: u64) {
        let ControllerState::Transitioning {
            to,
            phase: Phase::FadingOut { from, .. },
        } = &self.state
        else {
            return;
        };
        let (from, to) = (from.clone(), to.clone());

        self.scene.stage.hide(&from);
        self.release_effects(now_ms);
        if from.is_home() {
            self.scene.stage.clear_connectors();
        }
        self.begin_entry(to, now_ms);
    }

    /// Show `target` and start fading it in.
    fn begin_entry(&mut self, target: PageId, now_ms: u64) {
        let target = if self.scene.stage.has_container(&target) {
            target
        } else {
            warn!(page = %target, "Page container missing, returning home");
            self.notice(format!("Page '{target}' is unavailable"));
            PageId::HOME
        };

        self.scene.stage.show(&target);
        if target.is_home() {
            let drawn = self.scene.stage.redraw_connectors();
            debug!(connectors = drawn, "Connectors drawn");
        }
        let tween = self.scene.animator.animate_opacity(
            Surface::Page(target.clone()),
            1.0,
            self.options.fade_ms,
            now_ms,
        );
        self.state = ControllerState::Transitioning {
            to: target,
            phase: Phase::FadingIn { tween },
        };
    }

    fn acquire_effects(&mut self, now_ms: u64) {
        let ControllerState::Transitioning { to, .. } = &self.state else {
            return;
        };
        let target = to.clone();

        if !self.live.is_empty() {
            warn!(count = self.live.len(), "Stale effects released before entry");
            self.release_effects(now_ms);
        }

        let bounds = self.scene.stage.bounds_for(&target);
        let mut ctx = self.scene.ctx(now_ms);
        for &kind in self.table.effects_for(&target) {
            match EffectHandle::acquire(kind, &self.options.effects, bounds, &mut ctx) {
                Ok(handle) => {
                    debug!(page = %target, effect = kind.name(), "Effect started");
                    self.live.push(handle);
                }
                Err(e) => {
                    warn!(page = %target, "{e}");
                    self.notices.push(e.to_string());
                }
            }
        }
    }

    fn finish_transition(&mut self, now_ms: u64) {
        let ControllerState::Transitioning { to, .. } = &self.state else {
            return;
        };
        let page = to.clone();
        info!(page = %page, "Page active");
        self.state = ControllerState::Stable(page);

        if let Some(next) = self.queued.take() {
            self.navigate(next, now_ms);
        }
    }

    /// Release live effects in reverse acquisition order.
    fn release_effects(&mut self, now_ms: u64) {
        if self.live.is_empty() {
            return;
        }
        self.released.clear();
        let mut ctx = self.scene.ctx(now_ms);
        while let Some(mut effect) = self.live.pop() {
            effect.release(&mut ctx);
            debug!(effect = effect.kind().name(), "Effect released");
            self.released.push(effect.kind());
        }
    }

    /// Resize the stage and every live effect.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        let viewport = Rect::new(0, 0, width, height);
        self.scene.stage.set_viewport(viewport);

        if let Some(page) = self.active_page().cloned() {
            let bounds = self.scene.stage.bounds_for(&page);
            for effect in &mut self.live {
                effect.resize(bounds);
                effect.on_scroll(&mut self.scene.stage);
            }
            if page.is_home() {
                self.scene.stage.redraw_connectors();
            }
        }
    }

    /// Scroll the scroll-text page. Ignored unless that page is active.
    pub fn handle_scroll(&mut self, delta: i32) -> bool {
        if self.active_page() != Some(&PageId::SCROLL_TEXT) {
            return false;
        }
        self.scene.stage.scroll_text_mut().scroll_by(delta);
        for effect in &mut self.live {
            effect.on_scroll(&mut self.scene.stage);
        }
        true
    }

    /// Forward a normalized pointer position to the particle scene.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        for effect in &mut self.live {
            effect.set_pointer(x, y);
        }
    }

    pub fn play_click(&mut self) {
        if self.options.effects.capabilities.audio && self.scene.audio.is_running() {
            self.scene
                .audio
                .trigger_attack_release(Instrument::Click, &["C4"], NoteLength::Eighth);
        }
    }

    /// Release everything. Used when the application exits.
    pub fn shutdown(&mut self, now_ms: u64) {
        self.release_effects(now_ms);
        self.queued = None;
    }
}

impl std::fmt::Debug for PageController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("state", &self.state)
            .field("queued", &self.queued)
            .field("live", &self.live_effects())
            .finish_non_exhaustive()
    }
}
