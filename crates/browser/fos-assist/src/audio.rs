//! Audio Sequencer
//!
//! Short synthesized alert sequences. Each alert is a list of
//! `(offset, tone)` pairs; the first tone plays at once and the rest are
//! staggered through the timer queue.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::store::TieredStore;
use crate::timers::{TimerQueue, TimerTask};

/// Synthesis error
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio synthesis unavailable: {0}")]
    Unavailable(String),

    #[error("Audio context closed")]
    ContextClosed,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
}

/// One synthesized tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub duration_ms: u64,
    pub waveform: Waveform,
    pub volume: f64,
}

impl Tone {
    pub fn new(frequency: f64, duration_ms: u64, waveform: Waveform, volume: f64) -> Self {
        Self { frequency, duration_ms, waveform, volume: volume.clamp(0.0, 1.0) }
    }

    pub fn sine(frequency: f64, duration_ms: u64) -> Self {
        Self::new(frequency, duration_ms, Waveform::Sine, 0.3)
    }

    pub fn square(frequency: f64, duration_ms: u64) -> Self {
        Self::new(frequency, duration_ms, Waveform::Square, 0.2)
    }
}

/// A tone placed on the context timeline with its gain ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEnvelope {
    pub tone: Tone,
    pub start_ms: u64,
    pub attack_ms: u64,
}

impl ToneEnvelope {
    pub fn new(tone: Tone, start_ms: u64, attack_ms: u64) -> Self {
        // Attack cannot outlast the tone itself
        let attack_ms = attack_ms.min(tone.duration_ms);
        Self { tone, start_ms, attack_ms }
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms + self.tone.duration_ms
    }

    /// Linear-ramp breakpoints: silence, peak, silence
    pub fn gain_points(&self) -> [(u64, f64); 3] {
        [
            (self.start_ms, 0.0),
            (self.start_ms + self.attack_ms, self.tone.volume),
            (self.end_ms(), 0.0),
        ]
    }

    /// Gain at time `t_ms` by linear interpolation
    pub fn gain_at(&self, t_ms: u64) -> f64 {
        let [(t0, _), (t1, peak), (t2, _)] = self.gain_points();
        if t_ms <= t0 || t_ms >= t2 {
            0.0
        } else if t_ms <= t1 {
            peak * (t_ms - t0) as f64 / (t1 - t0).max(1) as f64
        } else {
            peak * (t2 - t_ms) as f64 / (t2 - t1).max(1) as f64
        }
    }
}

/// Named alert sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    Success,
    Error,
    Info,
}

impl Alert {
    /// `(offset_ms, tone)` pairs, played sequentially
    pub fn sequence(&self) -> Vec<(u64, Tone)> {
        match self {
            Self::Success => vec![
                (0, Tone::sine(523.25, 150)),
                (150, Tone::sine(659.25, 150)),
                (300, Tone::sine(783.99, 200)),
            ],
            Self::Error => vec![
                (0, Tone::square(440.0, 100)),
                (100, Tone::square(349.23, 150)),
                (250, Tone::square(261.63, 200)),
            ],
            Self::Info => vec![(0, Tone::sine(600.0, 150))],
        }
    }
}

/// Synthesis engine behind the sequencer
pub trait AudioBackend: std::fmt::Debug {
    /// Construct the synthesis context
    fn open(&mut self) -> Result<(), AudioError>;
    /// Unlock a suspended context
    fn resume(&mut self) -> Result<(), AudioError>;
    fn schedule(&mut self, envelope: &ToneEnvelope) -> Result<(), AudioError>;
}

/// Backend for environments without synthesis
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable("no synthesis engine".into()))
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Err(AudioError::ContextClosed)
    }

    fn schedule(&mut self, _envelope: &ToneEnvelope) -> Result<(), AudioError> {
        Err(AudioError::ContextClosed)
    }
}

/// Headless backend that keeps every scheduled envelope.
///
/// Clones share the log, so a host can keep one handle and give the other
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    played: Rc<RefCell<Vec<ToneEnvelope>>>,
    opens: Rc<Cell<u32>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<ToneEnvelope> {
        self.played.borrow().clone()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.played.borrow().iter().map(|e| e.tone.frequency).collect()
    }

    /// How many times a context was constructed
    pub fn opens(&self) -> u32 {
        self.opens.get()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl AudioBackend for RecordingBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        self.opens.set(self.opens.get() + 1);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn schedule(&mut self, envelope: &ToneEnvelope) -> Result<(), AudioError> {
        self.played.borrow_mut().push(*envelope);
        Ok(())
    }
}

/// Lifecycle of the shared synthesis context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Not constructed yet
    Unopened,
    Running,
    /// Construction failed; audio is off for the session
    Unavailable,
}

/// Audio alert sequencer
#[derive(Debug)]
pub struct AudioSequencer {
    backend: Box<dyn AudioBackend>,
    state: ContextState,
    enabled: bool,
    attack_ms: u64,
}

impl AudioSequencer {
    pub fn new(backend: Box<dyn AudioBackend>, attack_ms: u64) -> Self {
        Self { backend, state: ContextState::Unopened, enabled: true, attack_ms }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Read the stored preference; anything but `"false"` means on
    pub fn load_preference(&mut self, store: &TieredStore, key: &str) {
        self.enabled = store.get(key).as_deref() != Some("false");
        tracing::debug!("Audio alerts {}", if self.enabled { "enabled" } else { "muted" });
    }

    pub fn store_preference(&self, store: &mut TieredStore, key: &str) {
        store.set(key, if self.enabled { "true" } else { "false" });
    }

    /// Construct or resume the context. Called on user activation and
    /// before every alert. Returns whether synthesis is usable.
    pub fn prime(&mut self) -> bool {
        match self.state {
            ContextState::Unavailable => false,
            ContextState::Unopened => match self.backend.open() {
                Ok(()) => {
                    self.state = ContextState::Running;
                    tracing::debug!("Audio context constructed");
                    true
                }
                Err(e) => {
                    tracing::warn!("Disabling audio alerts: {}", e);
                    self.state = ContextState::Unavailable;
                    false
                }
            },
            ContextState::Running => match self.backend.resume() {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("Audio context resume failed: {}", e);
                    false
                }
            },
        }
    }

    /// Play `alert` unless muted. Returns the number of tones started or
    /// scheduled.
    pub fn play_alert(&mut self, alert: Alert, timers: &mut TimerQueue) -> usize {
        if !self.enabled || !self.prime() {
            return 0;
        }
        let sequence = alert.sequence();
        let count = sequence.len();
        for (offset, tone) in sequence {
            if offset == 0 {
                self.play_tone(tone, timers.now_ms());
            } else {
                timers.schedule(offset, TimerTask::PlayTone(tone));
            }
        }
        count
    }

    /// Start one enveloped tone at `now_ms`. Staggered tones land here
    /// from the timer queue and are not cancelled by a later mute.
    pub fn play_tone(&mut self, tone: Tone, now_ms: u64) -> bool {
        if self.state != ContextState::Running {
            return false;
        }
        let envelope = ToneEnvelope::new(tone, now_ms, self.attack_ms);
        match self.backend.schedule(&envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Dropping tone {} Hz: {}", tone.frequency, e);
                false
            }
        }
    }
}
