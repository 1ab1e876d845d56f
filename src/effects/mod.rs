//! Page-scoped audio-visual effects.
//!
//! Every effect is a resource-holding handle: acquiring it may create voices,
//! timers, tweens or a frame loop, and `release` frees all of them. Release is
//! idempotent, so a handle can be released from any path without tracking
//! whether some other path already did.

pub mod ambient;
pub mod audio;
pub mod device;
pub mod flock;
pub mod particles;
pub mod scroll_scale;
pub mod storm;

pub use ambient::AmbientLoop;
pub use audio::{
    AudioEngine, AudioEvent, Instrument, NoteLength, VirtualAudio, VoiceId, VoiceKind,
};
pub use device::{DeviceAudio, DeviceError};
pub use flock::{FlockParams, FlockVisual};
pub use particles::ParticleScene;
pub use scroll_scale::{ScrollScaleBinding, ScrollTrigger};
pub use storm::StormEffect;

use crate::engine::{Animator, FrameLoop, TimerId, Timers};
use crate::page::{EffectKind, FlockDensity};
use crate::stage::Stage;
use ratatui::layout::Rect;
use rand::rngs::SmallRng;
use thiserror::Error;

/// Everything an effect may touch while it runs.
pub struct EffectContext<'a> {
    pub now_ms: u64,
    pub stage: &'a mut Stage,
    pub animator: &'a mut Animator,
    pub timers: &'a mut Timers,
    pub audio: &'a mut dyn AudioEngine,
    pub rng: &'a mut SmallRng,
}

/// Which optional collaborators are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub audio: bool,
    pub flocking: bool,
    pub particles: bool,
    pub scroll_trigger: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            audio: true,
            flocking: true,
            particles: true,
            scroll_trigger: true,
        }
    }
}

/// Tunables applied when effects are acquired.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOptions {
    pub capabilities: Capabilities,
    pub flock_low: u16,
    pub flock_high: u16,
    pub particle_count: usize,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            flock_low: 3,
            flock_high: 15,
            particle_count: particles::DEFAULT_PARTICLE_COUNT,
        }
    }
}

impl EffectOptions {
    pub fn flock_quantity(&self, density: FlockDensity) -> u16 {
        match density {
            FlockDensity::Low => self.flock_low,
            FlockDensity::High => self.flock_high,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EffectError {
    #[error("{effect} skipped: {capability} is not available")]
    Unavailable {
        effect: &'static str,
        capability: &'static str,
    },
}

/// A live effect owned by the active page.
#[derive(Debug)]
pub enum EffectHandle {
    Ambient(AmbientLoop),
    Storm(StormEffect),
    Flock(FlockDensity, FlockVisual),
    Particles(ParticleScene),
    ScrollScale(ScrollScaleBinding),
}

impl EffectHandle {
    /// Acquire and start an effect inside `bounds`.
    pub fn acquire(
        kind: EffectKind,
        options: &EffectOptions,
        bounds: Rect,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Self, EffectError> {
        let caps = options.capabilities;
        let unavailable = |capability| EffectError::Unavailable {
            effect: kind.name(),
            capability,
        };

        match kind {
            EffectKind::AmbientSound => {
                if !caps.audio {
                    return Err(unavailable("audio engine"));
                }
                Ok(Self::Ambient(AmbientLoop::start(ctx)))
            }
            EffectKind::Storm => Ok(Self::Storm(StormEffect::start(ctx, caps.audio))),
            EffectKind::Flock(density) => {
                if !caps.flocking {
                    return Err(unavailable("flocking visual"));
                }
                let params = FlockParams::with_quantity(options.flock_quantity(density));
                Ok(Self::Flock(
                    density,
                    FlockVisual::create(bounds, params, ctx.rng),
                ))
            }
            EffectKind::ParticleScene => {
                if !caps.particles {
                    return Err(unavailable("particle renderer"));
                }
                let mut scene =
                    ParticleScene::init(bounds, options.particle_count, caps.audio, ctx.rng);
                scene.start(FrameLoop::new());
                Ok(Self::Particles(scene))
            }
            EffectKind::ScrollScale => {
                if !caps.scroll_trigger {
                    return Err(unavailable("scroll trigger"));
                }
                Ok(Self::ScrollScale(ScrollScaleBinding::bind(ctx.stage)))
            }
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Ambient(_) => EffectKind::AmbientSound,
            Self::Storm(_) => EffectKind::Storm,
            Self::Flock(density, _) => EffectKind::Flock(*density),
            Self::Particles(_) => EffectKind::ParticleScene,
            Self::ScrollScale(_) => EffectKind::ScrollScale,
        }
    }

    /// Free every resource the effect holds. Safe to call repeatedly.
    pub fn release(&mut self, ctx: &mut EffectContext<'_>) {
        match self {
            Self::Ambient(ambient) => ambient.release(ctx),
            Self::Storm(storm) => storm.release(ctx),
            Self::Flock(_, flock) => flock.destroy(),
            Self::Particles(scene) => scene.release(),
            Self::ScrollScale(binding) => binding.release(ctx.stage),
        }
    }

    pub fn is_released(&self) -> bool {
        match self {
            Self::Ambient(ambient) => ambient.is_released(),
            Self::Storm(storm) => storm.is_released(),
            Self::Flock(_, flock) => flock.is_destroyed(),
            Self::Particles(scene) => !scene.is_running(),
            Self::ScrollScale(binding) => !binding.is_bound(),
        }
    }

    /// Route a fired timer. Returns true if this effect owned it.
    pub fn on_timer(&mut self, id: TimerId, ctx: &mut EffectContext<'_>) -> bool {
        match self {
            Self::Ambient(ambient) => ambient.on_timer(id, ctx),
            Self::Storm(storm) => storm.on_timer(id, ctx),
            _ => false,
        }
    }

    /// Advance per-frame simulations.
    pub fn on_frame(&mut self, ctx: &mut EffectContext<'_>) {
        match self {
            Self::Flock(_, flock) => flock.step(),
            Self::Particles(scene) => {
                scene.frame(ctx);
            }
            _ => {}
        }
    }

    pub fn resize(&mut self, bounds: Rect) {
        match self {
            Self::Flock(_, flock) => flock.resize(bounds),
            Self::Particles(scene) => scene.resize(bounds),
            _ => {}
        }
    }

    pub fn on_scroll(&mut self, stage: &mut Stage) {
        if let Self::ScrollScale(binding) = self {
            binding.update(stage);
        }
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        if let Self::Particles(scene) = self {
            scene.set_pointer(x, y);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rand::SeedableRng;

    /// Owned pieces of an [`EffectContext`] for effect unit tests.
    pub struct Rig {
        pub stage: Stage,
        pub animator: Animator,
        pub timers: Timers,
        pub audio: VirtualAudio,
        pub rng: SmallRng,
    }

    impl Rig {
        pub fn new() -> Self {
            let mut audio = VirtualAudio::new();
            audio.resume();
            Self {
                stage: Stage::new(Rect::new(0, 0, 120, 40)),
                animator: Animator::new(),
                timers: Timers::new(),
                audio,
                rng: SmallRng::seed_from_u64(7),
            }
        }

        pub fn ctx(&mut self, now_ms: u64) -> EffectContext<'_> {
            EffectContext {
                now_ms,
                stage: &mut self.stage,
                animator: &mut self.animator,
                timers: &mut self.timers,
                audio: &mut self.audio,
                rng: &mut self.rng,
            }
        }

        /// Advance tweens and route fired timers into `effect`.
        pub fn advance<F>(&mut self, now_ms: u64, mut on_timer: F)
        where
            F: FnMut(TimerId, &mut EffectContext<'_>),
        {
            self.animator.tick(now_ms, &mut self.stage);
            let fired = self.timers.tick(now_ms);
            let mut ctx = self.ctx(now_ms);
            for id in fired {
                on_timer(id, &mut ctx);
            }
        }
    }
}
