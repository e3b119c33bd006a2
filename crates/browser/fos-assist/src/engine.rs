//! Assist engine
//!
//! Owns one page session: the document, the settings record, the store
//! and every component that reacts to them. The host forwards input events
//! to [`Assist::handle_event`] and drives deferred work with
//! [`Assist::tick`].

use fos_dom::{Document, DomEvent, EventKind};

use crate::announcer::{Announcer, Politeness};
use crate::audio::{Alert, AudioBackend, AudioSequencer, SilentBackend};
use crate::config::AssistConfig;
use crate::controls::{BindOutcome, Control, ControlsBinder};
use crate::features::FeatureEngine;
use crate::screen_reader::{Environment, ScreenReaderProfiler};
use crate::settings::{ColorScheme, ScreenReaderMode, SettingKey, SettingValue, Settings, SettingsModel, TextSize};
use crate::store::TieredStore;
use crate::timers::{TimerQueue, TimerTask};
use crate::{AssistError, HostRequest};

/// Builder for [`Assist`]
#[derive(Debug)]
pub struct AssistBuilder {
    doc: Document,
    store: TieredStore,
    env: Environment,
    backend: Box<dyn AudioBackend>,
    config: AssistConfig,
}

impl AssistBuilder {
    pub fn store(mut self, store: TieredStore) -> Self {
        self.store = store;
        self
    }

    pub fn environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn audio_backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(mut self, config: AssistConfig) -> Self {
        self.config = config;
        self
    }

    /// Hydrate, reconcile and bind
    pub fn start(self) -> Assist {
        let config = self.config;
        let mut assist = Assist {
            doc: self.doc,
            store: self.store,
            model: SettingsModel::new(&config.settings_key),
            features: FeatureEngine::new(&config),
            profiler: ScreenReaderProfiler::new(self.env, config.voiceover_name_limit),
            announcer: Announcer::new(config.announce_clear_ms),
            audio: AudioSequencer::new(self.backend, config.tone_attack_ms),
            binder: ControlsBinder::new(config.controls.clone()),
            timers: TimerQueue::new(),
            profile: ScreenReaderMode::Auto,
            config,
        };
        assist.bootstrap();
        assist
    }
}

/// Accessibility engine for one page session
#[derive(Debug)]
pub struct Assist {
    doc: Document,
    config: AssistConfig,
    store: TieredStore,
    model: SettingsModel,
    features: FeatureEngine,
    profiler: ScreenReaderProfiler,
    announcer: Announcer,
    audio: AudioSequencer,
    binder: ControlsBinder,
    timers: TimerQueue,
    profile: ScreenReaderMode,
}

impl Assist {
    pub fn builder(doc: Document) -> AssistBuilder {
        AssistBuilder {
            doc,
            store: TieredStore::memory_only(),
            env: Environment::default(),
            backend: Box::new(SilentBackend),
            config: AssistConfig::default(),
        }
    }

    fn bootstrap(&mut self) {
        if let Err(e) = self.announcer.ensure_region(&mut self.doc) {
            tracing::warn!("Live region unavailable: {}", e);
        }
        self.model.load(&self.store);
        self.audio.load_preference(&self.store, &self.config.audio_key);

        let aria_live = self.model.settings().aria_live;
        if let Err(e) = self.announcer.set_live(&mut self.doc, aria_live) {
            tracing::warn!("Could not configure live region: {}", e);
        }
        let settings = self.model.settings().clone();
        self.features.apply_all(&mut self.doc, &settings);

        match self.binder.bind(&mut self.doc) {
            Ok(BindOutcome::Incomplete { missing }) => {
                tracing::debug!("Controls incomplete ({} missing), retrying", missing.len());
                self.schedule_bind_retry(1);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Control binding failed: {}", e),
        }
        self.sync_controls();
        self.refresh_profile();
        tracing::info!("Accessibility engine initialised for {}", self.doc.url());
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    pub fn store(&self) -> &TieredStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        self.model.settings()
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.model.get(key)
    }

    pub fn features(&self) -> &FeatureEngine {
        &self.features
    }

    pub fn controls(&self) -> &ControlsBinder {
        &self.binder
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    /// Text currently in the live region
    pub fn announcement(&self) -> String {
        self.announcer.text(&self.doc)
    }

    pub fn audio(&self) -> &AudioSequencer {
        &self.audio
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.is_enabled()
    }

    /// Profile the page is currently optimized for
    pub fn active_profile(&self) -> ScreenReaderMode {
        self.profile
    }

    /// Milliseconds until the next deferred task, if any
    pub fn next_timer_in(&self) -> Option<u64> {
        self.timers.time_until_next()
    }

    // ---- Public operations ----

    pub fn announce(&mut self, message: &str, politeness: Politeness) {
        if let Err(e) = self.announcer.announce(&mut self.doc, &mut self.timers, message, politeness) {
            tracing::warn!("Announcement dropped: {}", e);
        }
    }

    pub fn play_success_sound(&mut self) {
        self.audio.play_alert(Alert::Success, &mut self.timers);
    }

    pub fn play_error_sound(&mut self) {
        self.audio.play_alert(Alert::Error, &mut self.timers);
    }

    pub fn play_info_sound(&mut self) {
        self.audio.play_alert(Alert::Info, &mut self.timers);
    }

    /// Flip the audio preference; returns the new state
    pub fn toggle_audio_alerts(&mut self) -> bool {
        let enabled = !self.audio.is_enabled();
        self.audio.set_enabled(enabled);
        self.audio.store_preference(&mut self.store, &self.config.audio_key);
        if enabled {
            self.audio.prime();
            self.play_info_sound();
        }
        self.sync_controls();
        self.confirm(if enabled { "Audio alerts enabled" } else { "Audio alerts disabled" });
        enabled
    }

    pub fn toggle_high_contrast(&mut self, enabled: bool) {
        self.commit_logged(SettingKey::HighContrast, SettingValue::Bool(enabled));
    }

    /// Clamp and snap `percent`, then apply; returns the stored size
    pub fn set_text_size(&mut self, percent: i64) -> TextSize {
        let size = TextSize::snapped(percent);
        self.commit_logged(SettingKey::TextSize, SettingValue::TextSize(size));
        size
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.commit_logged(SettingKey::ColorScheme, SettingValue::ColorScheme(scheme));
    }

    /// Set, apply, save and confirm one feature
    pub fn set_setting(&mut self, key: SettingKey, value: SettingValue) -> Result<(), AssistError> {
        self.model.set(key, value)?;
        self.apply_one(key);
        if let Err(e) = self.model.save(&mut self.store) {
            tracing::warn!("Settings not saved: {}", e);
        }
        self.sync_controls();
        self.confirm(&confirmation(key, value));
        Ok(())
    }

    /// [`Assist::set_setting`] from string key and value
    pub fn set_setting_str(&mut self, key: &str, value: &str) -> Result<(), AssistError> {
        let key = SettingKey::parse(key).ok_or_else(|| AssistError::UnknownSetting(key.to_string()))?;
        let value = SettingValue::parse(key, value)?;
        self.set_setting(key, value)
    }

    /// Drop the stored snapshot; the host must rebuild the engine
    pub fn reset_to_defaults(&mut self) -> HostRequest {
        self.model.reset_to_defaults(&mut self.store)
    }

    /// Route a host input event
    pub fn handle_event(&mut self, event: &DomEvent) -> Option<HostRequest> {
        if event.kind.is_user_activation() && self.audio.is_enabled() {
            self.audio.prime();
        }

        match event.kind {
            EventKind::KeyDown if self.is_shortcut(event) => {
                if event.key.as_deref().is_some_and(|key| self.handle_shortcut(key)) {
                    return None;
                }
            }
            EventKind::Click => {
                let control = event.target.and_then(|t| self.binder.resolve(t));
                match control {
                    Some(Control::PanelToggle) => self.toggle_panel(),
                    Some(Control::AudioToggle) => {
                        self.toggle_audio_alerts();
                    }
                    Some(Control::Reset) => return Some(self.reset_to_defaults()),
                    Some(Control::Setting(_)) | None => {}
                }
            }
            EventKind::Change => {
                if let Some(Control::Setting(key)) = event.target.and_then(|t| self.binder.resolve(t)) {
                    self.on_control_change(key);
                }
            }
            _ => {}
        }

        if let Err(e) = self.features.handle_event(&mut self.doc, event) {
            tracing::debug!("Overlay update failed: {}", e);
        }
        None
    }

    /// Advance the clock and run whatever became due
    pub fn tick(&mut self, now_ms: u64) {
        for task in self.timers.advance_to(now_ms) {
            match task {
                TimerTask::ClearAnnouncement { generation } => {
                    if let Err(e) = self.announcer.clear(&mut self.doc, generation) {
                        tracing::debug!("Live region clear failed: {}", e);
                    }
                }
                TimerTask::PlayTone(tone) => {
                    self.audio.play_tone(tone, self.timers.now_ms());
                }
                TimerTask::RetryBind { attempt } => self.retry_bind(attempt),
            }
        }
    }

    // ---- Internals ----

    fn commit_logged(&mut self, key: SettingKey, value: SettingValue) {
        if let Err(e) = self.set_setting(key, value) {
            tracing::warn!("Rejected {}: {}", key, e);
        }
    }

    fn apply_one(&mut self, key: SettingKey) {
        let settings = self.model.settings().clone();
        let result = match key {
            SettingKey::ScreenReaderMode => {
                self.refresh_profile();
                Ok(())
            }
            SettingKey::AriaLive => self.announcer.set_live(&mut self.doc, settings.aria_live),
            _ => self.features.apply(&mut self.doc, key, &settings),
        };
        if let Err(e) = result {
            tracing::warn!("Could not apply {}: {}", key, e);
        }
        // Generated names are derived from visible text
        if key == SettingKey::SimpleLanguage {
            self.refresh_profile();
        }
    }

    fn refresh_profile(&mut self) {
        let mode = self.model.settings().screen_reader_mode;
        match self.profiler.apply_optimizations(&mut self.doc, mode) {
            Ok(profile) => self.profile = profile,
            Err(e) => tracing::warn!("Screen reader optimizations failed: {}", e),
        }
    }

    fn sync_controls(&mut self) {
        let settings = self.model.settings();
        if let Err(e) = self.binder.sync(&mut self.doc, settings, self.audio.is_enabled()) {
            tracing::debug!("Control sync failed: {}", e);
        }
    }

    /// Setting-change confirmation, honoured only with `announceChanges`
    fn confirm(&mut self, message: &str) {
        if self.model.settings().announce_changes {
            self.announce(message, Politeness::Polite);
        }
    }

    fn on_control_change(&mut self, key: SettingKey) {
        let result = self.binder.read(&self.doc, key).and_then(|value| self.set_setting(key, value));
        if let Err(e) = result {
            tracing::warn!("Ignoring {} control change: {}", key, e);
            self.sync_controls();
        }
    }

    fn toggle_panel(&mut self) {
        match self.binder.toggle_panel(&mut self.doc) {
            Ok(open) => tracing::debug!("Panel {}", if open { "opened" } else { "closed" }),
            Err(e) => tracing::debug!("Panel toggle failed: {}", e),
        }
    }

    fn schedule_bind_retry(&mut self, attempt: u32) {
        if attempt <= self.config.bind_retry_attempts {
            self.timers.schedule(self.config.bind_retry_interval_ms, TimerTask::RetryBind { attempt });
        }
    }

    fn retry_bind(&mut self, attempt: u32) {
        match self.binder.bind(&mut self.doc) {
            Ok(BindOutcome::Incomplete { missing }) if attempt < self.config.bind_retry_attempts => {
                tracing::debug!("Bind attempt {}: still missing {:?}", attempt, missing);
                self.schedule_bind_retry(attempt + 1);
            }
            Ok(BindOutcome::Incomplete { missing }) => {
                tracing::warn!("Giving up on controls after {} attempts; missing {:?}", attempt, missing);
            }
            Ok(_) => tracing::debug!("Controls bound on attempt {}", attempt),
            Err(e) => tracing::warn!("Control binding failed: {}", e),
        }
        self.sync_controls();
    }

    fn is_shortcut(&self, event: &DomEvent) -> bool {
        event.modifiers.alt && event.modifiers.shift && self.model.settings().keyboard_shortcuts
    }

    /// Alt+Shift combinations; returns whether `key` was a shortcut
    fn handle_shortcut(&mut self, key: &str) -> bool {
        let settings = self.model.settings().clone();
        match key.to_ascii_lowercase().as_str() {
            "a" => self.toggle_panel(),
            "c" => self.toggle_high_contrast(!settings.high_contrast),
            "+" | "=" => {
                self.set_text_size(settings.text_size.step_up().percent() as i64);
            }
            "-" | "_" => {
                self.set_text_size(settings.text_size.step_down().percent() as i64);
            }
            "0" | ")" => {
                self.set_text_size(TextSize::MIN as i64);
            }
            "r" => self.commit_logged(SettingKey::ReadingGuide, SettingValue::Bool(!settings.reading_guide)),
            "f" => self.commit_logged(SettingKey::EnhancedFocus, SettingValue::Bool(!settings.enhanced_focus)),
            "m" => self.commit_logged(SettingKey::ReduceMotion, SettingValue::Bool(!settings.reduce_motion)),
            "s" => {
                self.toggle_audio_alerts();
            }
            _ => return false,
        }
        true
    }
}

/// Human-readable confirmation for a setting change
fn confirmation(key: SettingKey, value: SettingValue) -> String {
    match value {
        SettingValue::Bool(on) => format!("{} {}", key.label(), if on { "enabled" } else { "disabled" }),
        SettingValue::TextSize(size) => format!("{} {}%", key.label(), size.percent()),
        SettingValue::ColorScheme(scheme) => format!("{}: {}", key.label(), scheme.label()),
        SettingValue::ScreenReaderMode(mode) => format!("{}: {}", key.label(), mode.label()),
    }
}
