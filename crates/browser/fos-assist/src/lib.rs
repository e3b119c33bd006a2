//! fOS Assist
//!
//! Drop-in accessibility augmentation for fOS pages.
//!
//! Features:
//! - Settings record persisted through a durable/session/memory fallback store
//! - Idempotent feature applicators (contrast, text size, color schemes,
//!   focus, motion, simplified language, reading guide, tab order)
//! - Screen-reader profile guess and structural repairs
//! - Synthesized alert tones on an injectable clock
//! - Single live announcement region
//! - Settings panel injection or binding to host markup
//! - Alt+Shift keyboard shortcuts

pub mod announcer;
pub mod audio;
pub mod config;
pub mod controls;
pub mod engine;
pub mod features;
pub mod overlay;
pub mod screen_reader;
pub mod settings;
pub mod simple_language;
pub mod store;
pub mod timers;

pub use announcer::{Announcer, Politeness};
pub use audio::{
    Alert, AudioBackend, AudioError, AudioSequencer, ContextState, RecordingBackend, SilentBackend, Tone,
    ToneEnvelope, Waveform,
};
pub use config::{AssistConfig, ControlIds};
pub use controls::{BindOutcome, Control, ControlsBinder};
pub use engine::{Assist, AssistBuilder};
pub use features::FeatureEngine;
pub use overlay::{ReadingGuide, TabOrderIndicator};
pub use screen_reader::{Environment, PlatformFamily, ScreenReaderProfiler};
pub use settings::{
    ColorScheme, LoadOutcome, ScreenReaderMode, SettingKey, SettingValue, Settings, SettingsModel, TextSize,
};
pub use store::{FileTier, SessionTier, StorageError, StorageTier, TierKind, TieredStore};
pub use timers::{TimerQueue, TimerTask};

use fos_dom::DomError;

/// Something only the host can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Rebuild the engine from scratch (page reload)
    Reload,
}

/// Accessibility engine error
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Malformed settings snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("No control bound for {0}")]
    UnboundControl(&'static str),

    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
