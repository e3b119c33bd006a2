//! Assist Configuration

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// Store key holding the JSON settings snapshot
    pub settings_key: String,

    /// Store key holding the `"true"`/`"false"` audio preference
    pub audio_key: String,

    /// Delay before the live region is cleared again
    pub announce_clear_ms: u64,

    /// Linear attack of every alert tone
    pub tone_attack_ms: u64,

    /// Outward margin of the tab-order indicator around the focused box
    pub tab_order_margin: f64,

    /// Height of the reading-guide band
    pub reading_guide_height: f64,

    /// Accessible names derived for VoiceOver are cut to this many chars
    pub voiceover_name_limit: usize,

    /// How many times control binding is retried when markup is incomplete
    pub bind_retry_attempts: u32,

    /// Delay between binding retries
    pub bind_retry_interval_ms: u64,

    /// Ids of every bound control
    pub controls: ControlIds,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            settings_key: "fos-assist.settings".into(),
            audio_key: "fos-assist.audio-enabled".into(),
            announce_clear_ms: 1000,
            tone_attack_ms: 10,
            tab_order_margin: 4.0,
            reading_guide_height: 40.0,
            voiceover_name_limit: 50,
            bind_retry_attempts: 10,
            bind_retry_interval_ms: 100,
            controls: ControlIds::default(),
        }
    }
}

impl AssistConfig {
    pub fn with_settings_key(mut self, key: &str) -> Self {
        self.settings_key = key.to_string();
        self
    }

    pub fn with_audio_key(mut self, key: &str) -> Self {
        self.audio_key = key.to_string();
        self
    }

    pub fn with_bind_retry(mut self, attempts: u32, interval_ms: u64) -> Self {
        self.bind_retry_attempts = attempts;
        self.bind_retry_interval_ms = interval_ms;
        self
    }

    pub fn with_controls(mut self, controls: ControlIds) -> Self {
        self.controls = controls;
        self
    }
}

/// Element ids the controls binder looks for (or injects)
#[derive(Debug, Clone)]
pub struct ControlIds {
    /// Primary toggle; its presence means the host supplies the markup
    pub toggle: String,
    pub panel: String,
    pub high_contrast: String,
    pub text_size: String,
    pub color_scheme: String,
    pub enhanced_focus: String,
    pub reduce_motion: String,
    pub simple_language: String,
    pub reading_guide: String,
    pub keyboard_shortcuts: String,
    pub tab_order: String,
    pub screen_reader_mode: String,
    pub announce_changes: String,
    pub aria_live: String,
    pub audio_toggle: String,
    pub reset: String,
}

impl Default for ControlIds {
    fn default() -> Self {
        Self {
            toggle: "a11y-toggle".into(),
            panel: "a11y-panel".into(),
            high_contrast: "high-contrast".into(),
            text_size: "text-size".into(),
            color_scheme: "color-scheme".into(),
            enhanced_focus: "enhanced-focus".into(),
            reduce_motion: "reduce-motion".into(),
            simple_language: "simple-language".into(),
            reading_guide: "reading-guide".into(),
            keyboard_shortcuts: "keyboard-shortcuts".into(),
            tab_order: "tab-order".into(),
            screen_reader_mode: "screen-reader-mode".into(),
            announce_changes: "announce-changes".into(),
            aria_live: "aria-live".into(),
            audio_toggle: "audio-alerts-toggle".into(),
            reset: "reset-settings".into(),
        }
    }
}
