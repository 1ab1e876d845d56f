//! Storm overlay, lightning strikes and the continuous rumble.

use super::audio::{Instrument, NoteLength, VoiceId, VoiceKind};
use super::EffectContext;
use crate::engine::TimerId;
use crate::stage::Surface;
use rand::Rng;
use tracing::{debug, trace};

pub const OVERLAY_OPACITY: f32 = 0.2;
pub const OVERLAY_FADE_IN_MS: u64 = 1000;
pub const OVERLAY_FADE_OUT_MS: u64 = 500;
pub const STRIKE_PERIOD_MS: u64 = 6000;
/// Random delay before a scheduled strike, in ms.
pub const STRIKE_DELAY_MS: std::ops::Range<u64> = 1000..6000;
pub const FLASH_OPACITY: f32 = 0.8;
pub const FLASH_ON_MS: u64 = 50;
pub const FLASH_HOLD_MS: u64 = 100;
pub const FLASH_OFF_MS: u64 = 200;

#[derive(Debug)]
pub struct StormEffect {
    interval: Option<TimerId>,
    pending_strikes: Vec<TimerId>,
    pending_fades: Vec<TimerId>,
    rumble: Option<VoiceId>,
    with_audio: bool,
    released: bool,
    strikes: u32,
}

impl StormEffect {
    pub fn start(ctx: &mut EffectContext<'_>, with_audio: bool) -> Self {
        ctx.animator.animate_opacity(
            Surface::StormOverlay,
            OVERLAY_OPACITY,
            OVERLAY_FADE_IN_MS,
            ctx.now_ms,
        );
        let interval = ctx.timers.set_interval(STRIKE_PERIOD_MS, ctx.now_ms);

        let rumble = with_audio.then(|| {
            let voice = ctx.audio.create_voice(VoiceKind::Rumble);
            ctx.audio.trigger_attack(voice);
            voice
        });
        debug!(with_audio, "Storm started");

        Self {
            interval: Some(interval),
            pending_strikes: Vec::new(),
            pending_fades: Vec::new(),
            rumble,
            with_audio,
            released: false,
            strikes: 0,
        }
    }

    /// Strikes flashed so far.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn on_timer(&mut self, id: TimerId, ctx: &mut EffectContext<'_>) -> bool {
        if self.interval == Some(id) {
            let delay = ctx.rng.random_range(STRIKE_DELAY_MS);
            self.pending_strikes
                .push(ctx.timers.set_timeout(delay, ctx.now_ms));
            return true;
        }
        if take(&mut self.pending_strikes, id) {
            self.strike(ctx);
            return true;
        }
        if take(&mut self.pending_fades, id) {
            ctx.animator
                .animate_opacity(Surface::LightningFlash, 0.0, FLASH_OFF_MS, ctx.now_ms);
            return true;
        }
        false
    }

    fn strike(&mut self, ctx: &mut EffectContext<'_>) {
        self.strikes += 1;
        trace!(strike = self.strikes, "Lightning");
        ctx.animator.animate_opacity(
            Surface::LightningFlash,
            FLASH_OPACITY,
            FLASH_ON_MS,
            ctx.now_ms,
        );
        self.pending_fades
            .push(ctx.timers.set_timeout(FLASH_ON_MS + FLASH_HOLD_MS, ctx.now_ms));

        if self.with_audio && ctx.audio.is_running() {
            ctx.audio
                .trigger_attack_release(Instrument::NoiseBurst, &[], NoteLength::Eighth);
            ctx.audio
                .trigger_attack_release(Instrument::Boom, &["A3"], NoteLength::Sixteenth);
        }
    }

    pub fn release(&mut self, ctx: &mut EffectContext<'_>) {
        if self.released {
            return;
        }
        self.released = true;

        ctx.animator.animate_opacity(
            Surface::StormOverlay,
            0.0,
            OVERLAY_FADE_OUT_MS,
            ctx.now_ms,
        );
        ctx.animator
            .animate_opacity(Surface::LightningFlash, 0.0, 0, ctx.now_ms);

        if let Some(interval) = self.interval.take() {
            ctx.timers.cancel(interval);
        }
        for id in self.pending_strikes.drain(..).chain(self.pending_fades.drain(..)) {
            ctx.timers.cancel(id);
        }
        if let Some(voice) = self.rumble.take() {
            ctx.audio.trigger_release(voice);
            ctx.audio.dispose(voice);
        }
        debug!(strikes = self.strikes, "Storm stopped");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

fn take(pending: &mut Vec<TimerId>, id: TimerId) -> bool {
    match pending.iter().position(|&p| p == id) {
        Some(index) => {
            pending.swap_remove(index);
            true
        }
        None => false,
    }
}
