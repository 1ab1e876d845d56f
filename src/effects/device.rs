//! Audio engine on the default output device.
//!
//! Every voice and one-shot gets its own rodio `Sink`. Sounds are synthesized
//! on the fly: summed sines for the pad, click and boom, filtered noise for the
//! rumble and the lightning burst.

use crate::effects::audio::{
    note_frequency, AudioEngine, Instrument, NoteLength, VoiceId, VoiceKind,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const SAMPLE_RATE: u32 = 44_100;

/// Quarter note length at the transport tempo (120 bpm).
const QUARTER_SECS: f32 = 0.5;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("No audio output device: {0}")]
    Stream(#[from] rodio::StreamError),
}

fn note_secs(length: NoteLength) -> f32 {
    match length {
        NoteLength::Quarter => QUARTER_SECS,
        NoteLength::Eighth => QUARTER_SECS / 2.0,
        NoteLength::Sixteenth => QUARTER_SECS / 4.0,
    }
}

fn frequencies(notes: &[&str]) -> Vec<f32> {
    notes.iter().filter_map(|note| note_frequency(note)).collect()
}

/// Summed sine partials with a short attack and an exponential decay.
#[derive(Debug, Clone)]
pub struct Tone {
    freqs: Vec<f32>,
    gain: f32,
    /// Decay rate per second.
    decay: f32,
    /// Downward pitch sweep per second, as a fraction of the start frequency.
    sweep: f32,
    index: u64,
    len: u64,
}

impl Tone {
    pub fn new(freqs: Vec<f32>, secs: f32, gain: f32, decay: f32) -> Self {
        Self {
            freqs,
            gain,
            decay,
            sweep: 0.0,
            index: 0,
            len: (secs.max(0.0) * SAMPLE_RATE as f32) as u64,
        }
    }

    pub fn with_sweep(mut self, sweep: f32) -> Self {
        self.sweep = sweep;
        self
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.len || self.freqs.is_empty() {
            return None;
        }
        let t = self.index as f32 / SAMPLE_RATE as f32;
        self.index += 1;

        let envelope = (t / 0.005).min(1.0) * (-t * self.decay).exp();
        let pitch = (1.0 - self.sweep * t).max(0.25);
        let sum: f32 = self
            .freqs
            .iter()
            .map(|freq| (TAU * freq * pitch * t).sin())
            .sum();
        Some(sum / self.freqs.len() as f32 * envelope * self.gain)
    }
}

impl Source for Tone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(self.len as f32 / SAMPLE_RATE as f32))
    }
}

/// White noise, or brown noise when `brown` is set. Endless unless `len` is set.
#[derive(Debug, Clone)]
pub struct Noise {
    rng: SmallRng,
    brown: bool,
    last: f32,
    gain: f32,
    decay: f32,
    index: u64,
    len: Option<u64>,
}

impl Noise {
    pub fn brown(gain: f32) -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            brown: true,
            last: 0.0,
            gain,
            decay: 0.0,
            index: 0,
            len: None,
        }
    }

    pub fn burst(secs: f32, gain: f32, decay: f32) -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            brown: false,
            last: 0.0,
            gain,
            decay,
            index: 0,
            len: Some((secs.max(0.0) * SAMPLE_RATE as f32) as u64),
        }
    }
}

impl Iterator for Noise {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.len.is_some_and(|len| self.index >= len) {
            return None;
        }
        let t = self.index as f32 / SAMPLE_RATE as f32;
        self.index += 1;

        let white: f32 = self.rng.random_range(-1.0..=1.0);
        let sample = if self.brown {
            // Leaky integrator keeps the walk bounded.
            self.last = (self.last + 0.02 * white) / 1.02;
            self.last * 3.5
        } else {
            white
        };
        Some(sample * self.gain * (-t * self.decay).exp())
    }
}

impl Source for Noise {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        self.len
            .map(|len| Duration::from_secs_f32(len as f32 / SAMPLE_RATE as f32))
    }
}

struct DeviceVoice {
    kind: VoiceKind,
    sink: Sink,
}

/// Plays voices and one-shots through the default output device.
pub struct DeviceAudio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    running: bool,
    transport: bool,
    next_voice: VoiceId,
    voices: BTreeMap<VoiceId, DeviceVoice>,
}

impl DeviceAudio {
    /// Open the default output device.
    pub fn open() -> Result<Self, DeviceError> {
        let (stream, handle) = OutputStream::try_default()?;
        debug!("Audio output device opened");
        Ok(Self {
            _stream: stream,
            handle,
            running: false,
            transport: false,
            next_voice: 0,
            voices: BTreeMap::new(),
        })
    }

    fn sink(&self) -> Option<Sink> {
        match Sink::try_new(&self.handle) {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!("Failed to open audio sink: {e}");
                None
            }
        }
    }
}

impl AudioEngine for DeviceAudio {
    fn resume(&mut self) {
        if !self.running {
            debug!("Audio engine resumed");
            self.running = true;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn trigger_attack_release(
        &mut self,
        instrument: Instrument,
        notes: &[&str],
        length: NoteLength,
    ) {
        if !self.running {
            return;
        }
        let Some(sink) = self.sink() else {
            return;
        };
        let secs = note_secs(length);
        match instrument {
            Instrument::Click => sink.append(Tone::new(frequencies(notes), secs, 0.2, 30.0)),
            Instrument::Boom => {
                sink.append(Tone::new(frequencies(notes), secs * 4.0, 0.5, 8.0).with_sweep(1.5));
            }
            Instrument::NoiseBurst => sink.append(Noise::burst(secs * 2.0, 0.3, 10.0)),
        }
        sink.detach();
    }

    fn create_voice(&mut self, kind: VoiceKind) -> VoiceId {
        self.next_voice += 1;
        let id = self.next_voice;
        if let Some(sink) = self.sink() {
            sink.pause();
            if kind == VoiceKind::Rumble {
                sink.append(Noise::brown(0.4));
            }
            self.voices.insert(id, DeviceVoice { kind, sink });
            debug!(voice = id, ?kind, "Voice created");
        }
        id
    }

    fn trigger_voice(&mut self, voice: VoiceId, notes: &[&str], length: NoteLength) {
        if !self.running {
            return;
        }
        if let Some(v) = self.voices.get(&voice) {
            // Pad notes ring well past their nominal length.
            v.sink
                .append(Tone::new(frequencies(notes), note_secs(length) * 6.0, 0.15, 1.0));
            v.sink.play();
        }
    }

    fn trigger_attack(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.play();
        }
    }

    fn trigger_release(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.pause();
        }
    }

    fn dispose(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.remove(&voice) {
            v.sink.stop();
            debug!(voice, kind = ?v.kind, "Voice disposed");
        }
    }

    fn start_transport(&mut self) {
        self.transport = true;
    }

    fn stop_transport(&mut self) {
        self.transport = false;
    }

    fn is_transport_running(&self) -> bool {
        self.transport
    }

    fn live_voices(&self) -> Vec<VoiceKind> {
        self.voices.values().map(|v| v.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_length_and_bounds() {
        let tone = Tone::new(vec![261.6, 329.6, 392.0], 0.25, 0.5, 4.0);
        assert_eq!(
            tone.total_duration(),
            Some(Duration::from_secs_f32(0.25))
        );
        let samples: Vec<f32> = tone.collect();
        assert_eq!(samples.len(), (0.25 * SAMPLE_RATE as f32) as usize);
        assert!(samples.iter().all(|s| s.abs() <= 0.5 + 1e-6));
        assert!(samples.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_tone_without_notes_is_silent() {
        assert_eq!(Tone::new(Vec::new(), 1.0, 1.0, 0.0).count(), 0);
    }

    #[test]
    fn test_burst_ends_and_rumble_does_not() {
        assert_eq!(
            Noise::burst(0.1, 0.3, 10.0).count(),
            (0.1 * SAMPLE_RATE as f32) as usize
        );

        let rumble = Noise::brown(0.4);
        assert_eq!(rumble.total_duration(), None);
        let samples: Vec<f32> = rumble.take(SAMPLE_RATE as usize).collect();
        assert_eq!(samples.len(), SAMPLE_RATE as usize);
        assert!(samples.iter().all(|s| s.abs() <= 0.4 * 3.5 + 1e-6));
    }

    #[test]
    fn test_instrument_frequencies_follow_notes() {
        let freqs = frequencies(&["A3", "bogus", "A4"]);
        assert_eq!(freqs.len(), 2);
        assert!((freqs[0] - 220.0).abs() < 1e-3);
        assert!((note_secs(NoteLength::Eighth) - 0.25).abs() < 1e-6);
    }
}
