//! Settings Model
//!
//! The canonical record of every feature's value, and its snapshot
//! persistence through the [`TieredStore`].
//!
//! The record is total: a snapshot is merged over the defaults key by key,
//! so a missing or malformed field falls back to its default instead of
//! leaving a hole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{TierKind, TieredStore};
use crate::{AssistError, HostRequest};

/// Color-vision simulation/compensation scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Monochrome,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        Self::Default,
        Self::Protanopia,
        Self::Deuteranopia,
        Self::Tritanopia,
        Self::Monochrome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Protanopia => "protanopia",
            Self::Deuteranopia => "deuteranopia",
            Self::Tritanopia => "tritanopia",
            Self::Monochrome => "monochrome",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default colors",
            Self::Protanopia => "Protanopia",
            Self::Deuteranopia => "Deuteranopia",
            Self::Tritanopia => "Tritanopia",
            Self::Monochrome => "Monochrome",
        }
    }
}

/// Screen reader the page is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenReaderMode {
    #[default]
    Auto,
    Nvda,
    Jaws,
    Voiceover,
    Talkback,
    Orca,
    Narrator,
}

impl ScreenReaderMode {
    pub const ALL: [ScreenReaderMode; 7] = [
        Self::Auto,
        Self::Nvda,
        Self::Jaws,
        Self::Voiceover,
        Self::Talkback,
        Self::Orca,
        Self::Narrator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Nvda => "nvda",
            Self::Jaws => "jaws",
            Self::Voiceover => "voiceover",
            Self::Talkback => "talkback",
            Self::Orca => "orca",
            Self::Narrator => "narrator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Auto-detect",
            Self::Nvda => "NVDA",
            Self::Jaws => "JAWS",
            Self::Voiceover => "VoiceOver",
            Self::Talkback => "TalkBack",
            Self::Orca => "Orca",
            Self::Narrator => "Narrator",
        }
    }
}

/// Text size in percent: 100..=200 in steps of 25
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub struct TextSize(u32);

impl TextSize {
    pub const MIN: u32 = 100;
    pub const MAX: u32 = 200;
    pub const STEP: u32 = 25;

    /// Every value in the domain
    pub fn all() -> impl Iterator<Item = TextSize> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP as usize).map(TextSize)
    }

    /// Exact domain check
    pub fn new(percent: u32) -> Result<Self, AssistError> {
        if (Self::MIN..=Self::MAX).contains(&percent) && percent % Self::STEP == 0 {
            Ok(Self(percent))
        } else {
            Err(AssistError::InvalidValue {
                key: SettingKey::TextSize.as_str(),
                value: percent.to_string(),
            })
        }
    }

    /// Clamp into range and snap to the nearest step
    pub fn snapped(percent: i64) -> Self {
        let clamped = percent.clamp(Self::MIN as i64, Self::MAX as i64) as u32;
        let steps = (clamped - Self::MIN + Self::STEP / 2) / Self::STEP;
        Self(Self::MIN + steps * Self::STEP)
    }

    pub fn percent(&self) -> u32 {
        self.0
    }

    pub fn step_up(&self) -> Self {
        Self((self.0 + Self::STEP).min(Self::MAX))
    }

    pub fn step_down(&self) -> Self {
        Self(self.0.saturating_sub(Self::STEP).max(Self::MIN))
    }
}

impl Default for TextSize {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<TextSize> for u32 {
    fn from(size: TextSize) -> u32 {
        size.0
    }
}

impl TryFrom<u32> for TextSize {
    type Error = AssistError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        TextSize::new(percent)
    }
}

/// Feature key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    HighContrast,
    TextSize,
    ColorScheme,
    EnhancedFocus,
    ReduceMotion,
    SimpleLanguage,
    ReadingGuide,
    KeyboardShortcuts,
    TabOrder,
    ScreenReaderMode,
    AnnounceChanges,
    AriaLive,
}

impl SettingKey {
    pub const ALL: [SettingKey; 12] = [
        Self::HighContrast,
        Self::TextSize,
        Self::ColorScheme,
        Self::EnhancedFocus,
        Self::ReduceMotion,
        Self::SimpleLanguage,
        Self::ReadingGuide,
        Self::KeyboardShortcuts,
        Self::TabOrder,
        Self::ScreenReaderMode,
        Self::AnnounceChanges,
        Self::AriaLive,
    ];

    /// Snapshot field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighContrast => "highContrast",
            Self::TextSize => "textSize",
            Self::ColorScheme => "colorScheme",
            Self::EnhancedFocus => "enhancedFocus",
            Self::ReduceMotion => "reduceMotion",
            Self::SimpleLanguage => "simpleLanguage",
            Self::ReadingGuide => "readingGuide",
            Self::KeyboardShortcuts => "keyboardShortcuts",
            Self::TabOrder => "tabOrder",
            Self::ScreenReaderMode => "screenReaderMode",
            Self::AnnounceChanges => "announceChanges",
            Self::AriaLive => "ariaLive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Human-readable feature name used in announcements
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighContrast => "High contrast",
            Self::TextSize => "Text size",
            Self::ColorScheme => "Color scheme",
            Self::EnhancedFocus => "Enhanced focus",
            Self::ReduceMotion => "Reduced motion",
            Self::SimpleLanguage => "Simplified language",
            Self::ReadingGuide => "Reading guide",
            Self::KeyboardShortcuts => "Keyboard shortcuts",
            Self::TabOrder => "Tab order indicator",
            Self::ScreenReaderMode => "Screen reader mode",
            Self::AnnounceChanges => "Change announcements",
            Self::AriaLive => "Live region",
        }
    }

    pub fn is_boolean(&self) -> bool {
        !matches!(self, Self::TextSize | Self::ColorScheme | Self::ScreenReaderMode)
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value from one feature's domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    TextSize(TextSize),
    ColorScheme(ColorScheme),
    ScreenReaderMode(ScreenReaderMode),
}

impl SettingValue {
    /// Parse a control's string value for `key`
    pub fn parse(key: SettingKey, raw: &str) -> Result<Self, AssistError> {
        let invalid = || AssistError::InvalidValue { key: key.as_str(), value: raw.to_string() };
        let raw = raw.trim();
        match key {
            SettingKey::TextSize => {
                let percent: u32 = raw.parse().map_err(|_| invalid())?;
                Ok(Self::TextSize(TextSize::new(percent)?))
            }
            SettingKey::ColorScheme => ColorScheme::parse(raw).map(Self::ColorScheme).ok_or_else(invalid),
            SettingKey::ScreenReaderMode => {
                ScreenReaderMode::parse(raw).map(Self::ScreenReaderMode).ok_or_else(invalid)
            }
            _ => match raw {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }

    /// Decode one snapshot field. Text size may arrive as a number or a
    /// numeric string (select values are strings).
    pub fn from_json(key: SettingKey, value: &Value) -> Result<Self, AssistError> {
        match (key, value) {
            (SettingKey::TextSize, Value::Number(n)) => {
                let percent = n.as_u64().and_then(|p| u32::try_from(p).ok()).ok_or_else(|| {
                    AssistError::InvalidValue { key: key.as_str(), value: n.to_string() }
                })?;
                Ok(Self::TextSize(TextSize::new(percent)?))
            }
            (_, Value::String(s)) if !key.is_boolean() => Self::parse(key, s),
            (_, Value::Bool(b)) if key.is_boolean() => Ok(Self::Bool(*b)),
            _ => Err(AssistError::InvalidValue { key: key.as_str(), value: value.to_string() }),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String form written into select/checkbox controls
    pub fn to_control_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::TextSize(t) => t.percent().to_string(),
            Self::ColorScheme(c) => c.as_str().to_string(),
            Self::ScreenReaderMode(m) => m.as_str().to_string(),
        }
    }
}

/// Settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub high_contrast: bool,
    pub text_size: TextSize,
    pub color_scheme: ColorScheme,
    pub enhanced_focus: bool,
    pub reduce_motion: bool,
    pub simple_language: bool,
    pub reading_guide: bool,
    pub keyboard_shortcuts: bool,
    pub tab_order: bool,
    pub screen_reader_mode: ScreenReaderMode,
    pub announce_changes: bool,
    pub aria_live: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_contrast: false,
            text_size: TextSize::default(),
            color_scheme: ColorScheme::Default,
            enhanced_focus: false,
            reduce_motion: false,
            simple_language: false,
            reading_guide: false,
            keyboard_shortcuts: true,
            tab_order: false,
            screen_reader_mode: ScreenReaderMode::Auto,
            announce_changes: true,
            aria_live: true,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> SettingValue {
        use SettingValue::Bool;
        match key {
            SettingKey::HighContrast => Bool(self.high_contrast),
            SettingKey::TextSize => SettingValue::TextSize(self.text_size),
            SettingKey::ColorScheme => SettingValue::ColorScheme(self.color_scheme),
            SettingKey::EnhancedFocus => Bool(self.enhanced_focus),
            SettingKey::ReduceMotion => Bool(self.reduce_motion),
            SettingKey::SimpleLanguage => Bool(self.simple_language),
            SettingKey::ReadingGuide => Bool(self.reading_guide),
            SettingKey::KeyboardShortcuts => Bool(self.keyboard_shortcuts),
            SettingKey::TabOrder => Bool(self.tab_order),
            SettingKey::ScreenReaderMode => SettingValue::ScreenReaderMode(self.screen_reader_mode),
            SettingKey::AnnounceChanges => Bool(self.announce_changes),
            SettingKey::AriaLive => Bool(self.aria_live),
        }
    }

    /// Type-checked write of one field
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), AssistError> {
        match (key, value) {
            (SettingKey::TextSize, SettingValue::TextSize(t)) => self.text_size = t,
            (SettingKey::ColorScheme, SettingValue::ColorScheme(c)) => self.color_scheme = c,
            (SettingKey::ScreenReaderMode, SettingValue::ScreenReaderMode(m)) => {
                self.screen_reader_mode = m
            }
            (key, SettingValue::Bool(b)) if key.is_boolean() => {
                if let Some(flag) = self.flag_mut(key) {
                    *flag = b;
                }
            }
            (key, value) => {
                return Err(AssistError::InvalidValue {
                    key: key.as_str(),
                    value: value.to_control_string(),
                })
            }
        }
        Ok(())
    }

    fn flag_mut(&mut self, key: SettingKey) -> Option<&mut bool> {
        match key {
            SettingKey::HighContrast => Some(&mut self.high_contrast),
            SettingKey::EnhancedFocus => Some(&mut self.enhanced_focus),
            SettingKey::ReduceMotion => Some(&mut self.reduce_motion),
            SettingKey::SimpleLanguage => Some(&mut self.simple_language),
            SettingKey::ReadingGuide => Some(&mut self.reading_guide),
            SettingKey::KeyboardShortcuts => Some(&mut self.keyboard_shortcuts),
            SettingKey::TabOrder => Some(&mut self.tab_order),
            SettingKey::AnnounceChanges => Some(&mut self.announce_changes),
            SettingKey::AriaLive => Some(&mut self.aria_live),
            SettingKey::TextSize | SettingKey::ColorScheme | SettingKey::ScreenReaderMode => None,
        }
    }

    /// Merge a JSON snapshot over the defaults, field by field.
    ///
    /// Returns the merged record and the keys whose stored value was
    /// rejected. Unknown keys are ignored. Fails only if the snapshot is not
    /// a JSON object at all.
    pub fn from_snapshot(json: &str) -> Result<(Self, Vec<SettingKey>), AssistError> {
        let Value::Object(map) = serde_json::from_str::<Value>(json)? else {
            return Err(AssistError::MalformedSnapshot("top level is not an object".into()));
        };

        let mut settings = Self::default();
        let mut rejected = Vec::new();
        for key in SettingKey::ALL {
            let Some(raw) = map.get(key.as_str()) else {
                continue;
            };
            match SettingValue::from_json(key, raw).and_then(|v| settings.set(key, v)) {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("Ignoring stored {}: {}", key, e);
                    rejected.push(key);
                }
            }
        }
        Ok((settings, rejected))
    }

    pub fn to_snapshot(&self) -> Result<String, AssistError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How `load` resolved the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot stored
    Defaults,
    /// Snapshot merged; lists fields that fell back to defaults
    Restored { rejected: Vec<SettingKey> },
    /// Snapshot unreadable, discarded
    Discarded,
}

/// Owner of the in-memory record
#[derive(Debug)]
pub struct SettingsModel {
    settings: Settings,
    key: String,
}

impl SettingsModel {
    pub fn new(snapshot_key: &str) -> Self {
        Self { settings: Settings::default(), key: snapshot_key.to_string() }
    }

    pub fn snapshot_key(&self) -> &str {
        &self.key
    }

    /// Hydrate from the store. Never fails: any problem leaves defaults.
    pub fn load(&mut self, store: &TieredStore) -> LoadOutcome {
        self.settings = Settings::default();
        let Some(json) = store.get(&self.key) else {
            tracing::debug!("No stored settings, using defaults");
            return LoadOutcome::Defaults;
        };
        match Settings::from_snapshot(&json) {
            Ok((settings, rejected)) => {
                if !rejected.is_empty() {
                    tracing::warn!("Ignoring invalid stored values for {:?}", rejected);
                }
                self.settings = settings;
                LoadOutcome::Restored { rejected }
            }
            Err(e) => {
                tracing::warn!("Discarding malformed settings snapshot: {}", e);
                LoadOutcome::Discarded
            }
        }
    }

    /// Write the full record
    pub fn save(&self, store: &mut TieredStore) -> Result<TierKind, AssistError> {
        let json = self.settings.to_snapshot()?;
        Ok(store.set(&self.key, &json))
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.settings.get(key)
    }

    /// In-memory only; callers save afterwards
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), AssistError> {
        self.settings.set(key, value)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Drop the snapshot and ask the host to restart the session
    pub fn reset_to_defaults(&mut self, store: &mut TieredStore) -> HostRequest {
        store.remove(&self.key);
        self.settings = Settings::default();
        tracing::info!("Settings reset; requesting reload");
        HostRequest::Reload
    }
}
