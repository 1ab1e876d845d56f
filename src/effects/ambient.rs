//! Looping ambient chord on the home page.

use super::audio::{NoteLength, VoiceId, VoiceKind};
use super::EffectContext;
use crate::engine::TimerId;
use tracing::debug;

pub const AMBIENT_CHORD: [&str; 3] = ["C2", "G2", "C3"];
pub const AMBIENT_PERIOD_MS: u64 = 4000;

#[derive(Debug)]
pub struct AmbientLoop {
    voice: Option<VoiceId>,
    interval: Option<TimerId>,
}

impl AmbientLoop {
    /// Create the pad, start the transport and play the first chord.
    pub fn start(ctx: &mut EffectContext<'_>) -> Self {
        let voice = ctx.audio.create_voice(VoiceKind::AmbientPad);
        ctx.audio.start_transport();
        ctx.audio
            .trigger_voice(voice, &AMBIENT_CHORD, NoteLength::Quarter);
        let interval = ctx.timers.set_interval(AMBIENT_PERIOD_MS, ctx.now_ms);
        debug!(voice, "Ambient loop started");

        Self {
            voice: Some(voice),
            interval: Some(interval),
        }
    }

    pub fn on_timer(&mut self, id: TimerId, ctx: &mut EffectContext<'_>) -> bool {
        if self.interval != Some(id) {
            return false;
        }
        if let Some(voice) = self.voice {
            ctx.audio
                .trigger_voice(voice, &AMBIENT_CHORD, NoteLength::Quarter);
        }
        true
    }

    pub fn release(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(interval) = self.interval.take() {
            ctx.timers.cancel(interval);
        }
        if let Some(voice) = self.voice.take() {
            ctx.audio.stop_transport();
            ctx.audio.dispose(voice);
            debug!(voice, "Ambient loop stopped");
        }
    }

    pub fn is_released(&self) -> bool {
        self.voice.is_none() && self.interval.is_none()
    }
}
