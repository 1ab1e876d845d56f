//! Audio engine seam.
//!
//! The controller owns exactly one engine. `DeviceAudio` (see `device.rs`)
//! plays through the default output device. `VirtualAudio` keeps the same
//! voice and transport bookkeeping plus an ordered event log, but produces no
//! sound; it backs the tests and machines without an output device.

use std::collections::BTreeMap;
use tracing::{debug, trace};

pub type VoiceId = u64;

/// One-shot instruments played through `trigger_attack_release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Instrument {
    /// UI click synth.
    Click,
    /// Low membrane hit used by lightning and the particle stream.
    Boom,
    /// Short white-noise burst.
    NoiseBurst,
}

/// Continuous voices that must be explicitly released and disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    /// Polyphonic pad carrying the ambient chord.
    AmbientPad,
    /// Brown-noise storm rumble.
    Rumble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLength {
    Quarter,
    Eighth,
    Sixteenth,
}

impl NoteLength {
    pub fn notation(&self) -> &'static str {
        match self {
            NoteLength::Quarter => "4n",
            NoteLength::Eighth => "8n",
            NoteLength::Sixteenth => "16n",
        }
    }
}

/// One entry in the virtual engine's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    VoiceCreated(VoiceKind),
    VoiceAttack(VoiceKind),
    VoiceReleased(VoiceKind),
    VoiceDisposed(VoiceKind),
    OneShot(Instrument),
    TransportStarted,
    TransportStopped,
}

pub trait AudioEngine {
    /// Unlock output. Must be called from a user gesture before first use.
    fn resume(&mut self);

    fn is_running(&self) -> bool;

    /// Play a one-shot instrument.
    fn trigger_attack_release(
        &mut self,
        instrument: Instrument,
        notes: &[&str],
        length: NoteLength,
    );

    /// Create a continuous voice. It stays silent until `trigger_attack`.
    fn create_voice(&mut self, kind: VoiceKind) -> VoiceId;

    /// Play notes on a previously created voice.
    fn trigger_voice(&mut self, voice: VoiceId, notes: &[&str], length: NoteLength);

    fn trigger_attack(&mut self, voice: VoiceId);

    fn trigger_release(&mut self, voice: VoiceId);

    /// Free a voice. Disposing an unknown voice is a no-op.
    fn dispose(&mut self, voice: VoiceId);

    fn start_transport(&mut self);

    fn stop_transport(&mut self);

    fn is_transport_running(&self) -> bool;

    /// Kinds of every voice created and not yet disposed.
    fn live_voices(&self) -> Vec<VoiceKind>;

    /// Voice and transport events in the order they happened, if recorded.
    fn events(&self) -> &[AudioEvent] {
        &[]
    }
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    kind: VoiceKind,
    sounding: bool,
}

/// Voice-tracking engine without an output device.
#[derive(Debug, Default)]
pub struct VirtualAudio {
    running: bool,
    transport: bool,
    next_voice: VoiceId,
    voices: BTreeMap<VoiceId, Voice>,
    one_shots: BTreeMap<Instrument, u64>,
    events: Vec<AudioEvent>,
}

impl VirtualAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times a one-shot instrument has played.
    pub fn one_shots(&self, instrument: Instrument) -> u64 {
        self.one_shots.get(&instrument).copied().unwrap_or(0)
    }

    /// Whether a voice is between attack and release.
    pub fn is_sounding(&self, voice: VoiceId) -> bool {
        self.voices.get(&voice).is_some_and(|v| v.sounding)
    }
}

impl AudioEngine for VirtualAudio {
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
        trace!(?instrument, ?notes, length = length.notation(), "one-shot");
        *self.one_shots.entry(instrument).or_insert(0) += 1;
        self.events.push(AudioEvent::OneShot(instrument));
    }

    fn create_voice(&mut self, kind: VoiceKind) -> VoiceId {
        self.next_voice += 1;
        let id = self.next_voice;
        self.voices.insert(
            id,
            Voice {
                kind,
                sounding: false,
            },
        );
        self.events.push(AudioEvent::VoiceCreated(kind));
        debug!(voice = id, ?kind, "Voice created");
        id
    }

    fn trigger_voice(&mut self, voice: VoiceId, notes: &[&str], length: NoteLength) {
        if self.running && self.voices.contains_key(&voice) {
            trace!(voice, ?notes, length = length.notation(), "voice note");
        }
    }

    fn trigger_attack(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.sounding = true;
            self.events.push(AudioEvent::VoiceAttack(v.kind));
        }
    }

    fn trigger_release(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.sounding = false;
            self.events.push(AudioEvent::VoiceReleased(v.kind));
        }
    }

    fn dispose(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.remove(&voice) {
            self.events.push(AudioEvent::VoiceDisposed(v.kind));
            debug!(voice, kind = ?v.kind, "Voice disposed");
        }
    }

    fn start_transport(&mut self) {
        if !self.transport {
            self.transport = true;
            self.events.push(AudioEvent::TransportStarted);
        }
    }

    fn stop_transport(&mut self) {
        if self.transport {
            self.transport = false;
            self.events.push(AudioEvent::TransportStopped);
        }
    }

    fn is_transport_running(&self) -> bool {
        self.transport
    }

    fn live_voices(&self) -> Vec<VoiceKind> {
        self.voices.values().map(|v| v.kind).collect()
    }

    fn events(&self) -> &[AudioEvent] {
        &self.events
    }
}

/// Frequency in Hz of a scientific-pitch note name such as `C4` or `F#2`.
pub fn note_frequency(note: &str) -> Option<f32> {
    let mut chars = note.chars();
    let semitone: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (shift, octave) = if let Some(octave) = rest.strip_prefix('#') {
        (1, octave)
    } else if let Some(octave) = rest.strip_prefix('b') {
        (-1, octave)
    } else {
        (0, rest)
    };
    let octave: i32 = octave.parse().ok()?;
    let midi = (octave + 1) * 12 + semitone + shift;
    Some(440.0 * 2f32.powf((midi - 69) as f32 / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shots_require_resume() {
        let mut audio = VirtualAudio::new();
        audio.trigger_attack_release(Instrument::Click, &["C4"], NoteLength::Eighth);
        assert_eq!(audio.one_shots(Instrument::Click), 0);

        audio.resume();
        audio.trigger_attack_release(Instrument::Click, &["C4"], NoteLength::Eighth);
        assert_eq!(audio.one_shots(Instrument::Click), 1);
    }

    #[test]
    fn test_voice_lifecycle() {
        let mut audio = VirtualAudio::new();
        let rumble = audio.create_voice(VoiceKind::Rumble);
        assert!(!audio.is_sounding(rumble));
        audio.trigger_attack(rumble);
        assert!(audio.is_sounding(rumble));
        audio.trigger_release(rumble);
        audio.dispose(rumble);
        audio.dispose(rumble);
        assert!(audio.live_voices().is_empty());
        assert_eq!(
            audio.events(),
            &[
                AudioEvent::VoiceCreated(VoiceKind::Rumble),
                AudioEvent::VoiceAttack(VoiceKind::Rumble),
                AudioEvent::VoiceReleased(VoiceKind::Rumble),
                AudioEvent::VoiceDisposed(VoiceKind::Rumble),
            ]
        );
    }

    #[test]
    fn test_transport_events_only_on_change() {
        let mut audio = VirtualAudio::new();
        audio.start_transport();
        audio.start_transport();
        audio.stop_transport();
        audio.stop_transport();
        assert_eq!(
            audio.events(),
            &[AudioEvent::TransportStarted, AudioEvent::TransportStopped]
        );
    }

    #[test]
    fn test_note_frequency() {
        assert!((note_frequency("A4").unwrap() - 440.0).abs() < 1e-3);
        assert!((note_frequency("A3").unwrap() - 220.0).abs() < 1e-3);
        assert!((note_frequency("C4").unwrap() - 261.626).abs() < 1e-2);
        assert!((note_frequency("C#4").unwrap() - 277.183).abs() < 1e-2);
        assert!((note_frequency("C2").unwrap() - 65.406).abs() < 1e-2);
        assert_eq!(note_frequency("H2"), None);
        assert_eq!(note_frequency("C"), None);
    }
}
