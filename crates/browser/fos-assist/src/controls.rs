//! Controls Binder
//!
//! Finds the settings controls by id, injecting a default panel when the
//! host supplies none, and maps control state to and from the record.

use fos_dom::{Document, DomError, NodeId};

use crate::config::ControlIds;
use crate::settings::{ColorScheme, ScreenReaderMode, SettingKey, SettingValue, Settings, TextSize};
use crate::AssistError;

/// What a bound element controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    PanelToggle,
    Setting(SettingKey),
    AudioToggle,
    Reset,
}

/// Result of a binding pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// No host markup; the default panel was injected
    Injected,
    /// Every control found
    Bound,
    /// Host markup present but these ids are missing
    Incomplete { missing: Vec<String> },
}

/// Element handles for the controls that were found
#[derive(Debug, Default)]
struct Bindings {
    toggle: Option<NodeId>,
    panel: Option<NodeId>,
    settings: Vec<(SettingKey, NodeId)>,
    audio: Option<NodeId>,
    reset: Option<NodeId>,
}

/// Controls binder
#[derive(Debug)]
pub struct ControlsBinder {
    ids: ControlIds,
    bindings: Bindings,
    injected: bool,
}

impl ControlsBinder {
    pub fn new(ids: ControlIds) -> Self {
        Self { ids, bindings: Bindings::default(), injected: false }
    }

    pub fn ids(&self) -> &ControlIds {
        &self.ids
    }

    pub fn injected(&self) -> bool {
        self.injected
    }

    pub fn panel(&self) -> Option<NodeId> {
        self.bindings.panel
    }

    pub fn toggle(&self) -> Option<NodeId> {
        self.bindings.toggle
    }

    /// Element for a setting's control
    pub fn control_for(&self, key: SettingKey) -> Option<NodeId> {
        self.bindings.settings.iter().find(|(k, _)| *k == key).map(|(_, el)| *el)
    }

    fn setting_id(&self, key: SettingKey) -> &str {
        let ids = &self.ids;
        match key {
            SettingKey::HighContrast => &ids.high_contrast,
            SettingKey::TextSize => &ids.text_size,
            SettingKey::ColorScheme => &ids.color_scheme,
            SettingKey::EnhancedFocus => &ids.enhanced_focus,
            SettingKey::ReduceMotion => &ids.reduce_motion,
            SettingKey::SimpleLanguage => &ids.simple_language,
            SettingKey::ReadingGuide => &ids.reading_guide,
            SettingKey::KeyboardShortcuts => &ids.keyboard_shortcuts,
            SettingKey::TabOrder => &ids.tab_order,
            SettingKey::ScreenReaderMode => &ids.screen_reader_mode,
            SettingKey::AnnounceChanges => &ids.announce_changes,
            SettingKey::AriaLive => &ids.aria_live,
        }
    }

    /// Bind to host markup if the primary toggle exists, otherwise inject
    /// the default panel first
    pub fn bind(&mut self, doc: &mut Document) -> Result<BindOutcome, DomError> {
        if doc.get_element_by_id(&self.ids.toggle).is_none() {
            self.inject_panel(doc)?;
            self.lookup(doc);
            tracing::info!("Accessibility panel injected");
            return Ok(BindOutcome::Injected);
        }
        let missing = self.lookup(doc);
        if missing.is_empty() {
            tracing::debug!("Bound to host-provided controls");
            Ok(BindOutcome::Bound)
        } else {
            Ok(BindOutcome::Incomplete { missing })
        }
    }

    /// Resolve every id; returns the ones not found
    fn lookup(&mut self, doc: &Document) -> Vec<String> {
        let mut missing = Vec::new();
        let mut find = |id: &str| {
            let el = doc.get_element_by_id(id);
            if el.is_none() {
                missing.push(id.to_string());
            }
            el
        };
        let toggle = find(&self.ids.toggle);
        let panel = find(&self.ids.panel);
        let audio = find(&self.ids.audio_toggle);
        let reset = find(&self.ids.reset);
        let settings = SettingKey::ALL
            .into_iter()
            .filter_map(|key| find(self.setting_id(key)).map(|el| (key, el)))
            .collect();
        self.bindings = Bindings { toggle, panel, settings, audio, reset };
        missing
    }

    /// Build the default panel under `<body>`
    pub fn inject_panel(&mut self, doc: &mut Document) -> Result<(), DomError> {
        let body = doc.body();
        let toggle = doc.append_element(body, "button", Some(self.ids.toggle.as_str()))?;
        doc.set_attribute(toggle, "aria-controls", &self.ids.panel)?;
        doc.set_attribute(toggle, "aria-expanded", "false")?;
        doc.set_text_content(toggle, "Accessibility")?;

        let panel = doc.append_element(body, "div", Some(self.ids.panel.as_str()))?;
        doc.set_attribute(panel, "role", "dialog")?;
        doc.set_attribute(panel, "aria-label", "Accessibility settings")?;
        doc.toggle_attribute(panel, "hidden", true)?;

        for key in SettingKey::ALL {
            let id = self.setting_id(key).to_string();
            if key.is_boolean() {
                let label = doc.append_element(panel, "label", None)?;
                let input = doc.append_element(label, "input", Some(id.as_str()))?;
                doc.set_attribute(input, "type", "checkbox")?;
                let text = doc.create_text(key.label());
                doc.append_child(label, text)?;
            } else {
                let label = doc.append_element(panel, "label", None)?;
                doc.set_attribute(label, "for", &id)?;
                doc.set_text_content(label, key.label())?;
                let select = doc.append_element(panel, "select", Some(id.as_str()))?;
                for (value, text) in select_options(key) {
                    let option = doc.append_element(select, "option", None)?;
                    doc.set_attribute(option, "value", &value)?;
                    doc.set_text_content(option, &text)?;
                }
            }
        }

        let audio = doc.append_element(panel, "button", Some(self.ids.audio_toggle.as_str()))?;
        doc.set_text_content(audio, "Audio alerts")?;
        let reset = doc.append_element(panel, "button", Some(self.ids.reset.as_str()))?;
        doc.set_text_content(reset, "Reset settings")?;
        self.injected = true;
        Ok(())
    }

    /// Which control `target` is, if bound
    pub fn resolve(&self, target: NodeId) -> Option<Control> {
        let b = &self.bindings;
        if b.toggle == Some(target) {
            Some(Control::PanelToggle)
        } else if b.audio == Some(target) {
            Some(Control::AudioToggle)
        } else if b.reset == Some(target) {
            Some(Control::Reset)
        } else {
            b.settings.iter().find(|(_, el)| *el == target).map(|(k, _)| Control::Setting(*k))
        }
    }

    /// Current value of a setting's control
    pub fn read(&self, doc: &Document, key: SettingKey) -> Result<SettingValue, AssistError> {
        let el = self.control_for(key).ok_or(AssistError::UnboundControl(key.as_str()))?;
        if key.is_boolean() {
            Ok(SettingValue::Bool(doc.has_attribute(el, "checked")))
        } else {
            let raw = doc.attribute(el, "value").unwrap_or_default();
            SettingValue::parse(key, raw)
        }
    }

    /// Write the record into the controls
    pub fn sync(&self, doc: &mut Document, settings: &Settings, audio_enabled: bool) -> Result<(), DomError> {
        for &(key, el) in &self.bindings.settings {
            match settings.get(key) {
                SettingValue::Bool(on) => doc.toggle_attribute(el, "checked", on)?,
                value => {
                    let value = value.to_control_string();
                    doc.set_attribute(el, "value", &value)?;
                    let options = doc.tree().children(el).to_vec();
                    for option in options {
                        let selected = doc.attribute(option, "value") == Some(value.as_str());
                        if doc.tree().element(option).is_some() {
                            doc.toggle_attribute(option, "selected", selected)?;
                        }
                    }
                }
            }
        }
        if let Some(audio) = self.bindings.audio {
            doc.set_attribute(audio, "aria-pressed", if audio_enabled { "true" } else { "false" })?;
        }
        Ok(())
    }

    pub fn is_panel_open(&self, doc: &Document) -> bool {
        self.bindings
            .panel
            .and_then(|p| doc.class_list(p))
            .is_some_and(|c| c.contains("open"))
    }

    /// Open or close the panel; returns whether it is now open
    pub fn toggle_panel(&self, doc: &mut Document) -> Result<bool, DomError> {
        let Some(panel) = self.bindings.panel else {
            return Ok(false);
        };
        let open = doc.class_list_mut(panel)?.toggle("open", None);
        doc.toggle_attribute(panel, "hidden", !open)?;
        if let Some(toggle) = self.bindings.toggle {
            doc.set_attribute(toggle, "aria-expanded", if open { "true" } else { "false" })?;
        }
        Ok(open)
    }
}

fn select_options(key: SettingKey) -> Vec<(String, String)> {
    match key {
        SettingKey::TextSize => TextSize::all()
            .map(|t| (t.percent().to_string(), format!("{}%", t.percent())))
            .collect(),
        SettingKey::ColorScheme => ColorScheme::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), c.label().to_string()))
            .collect(),
        SettingKey::ScreenReaderMode => ScreenReaderMode::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), m.label().to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_when_toggle_absent() {
        let mut doc = Document::default();
        let mut binder = ControlsBinder::new(ControlIds::default());
        assert_eq!(binder.bind(&mut doc).unwrap(), BindOutcome::Injected);
        assert!(binder.injected());
        for key in SettingKey::ALL {
            assert!(binder.control_for(key).is_some(), "{} not bound", key);
        }
        let panel = binder.panel().unwrap();
        assert!(doc.has_attribute(panel, "hidden"));
    }

    #[test]
    fn test_binds_host_markup() {
        let mut doc = Document::default();
        let body = doc.body();
        doc.append_element(body, "button", Some("a11y-toggle")).unwrap();
        doc.append_element(body, "div", Some("a11y-panel")).unwrap();
        let contrast = doc.append_element(body, "input", Some("high-contrast")).unwrap();

        let mut binder = ControlsBinder::new(ControlIds::default());
        let BindOutcome::Incomplete { missing } = binder.bind(&mut doc).unwrap() else {
            panic!("expected incomplete binding");
        };
        assert!(missing.contains(&"text-size".to_string()));
        assert!(!binder.injected());
        assert_eq!(binder.resolve(contrast), Some(Control::Setting(SettingKey::HighContrast)));
    }

    #[test]
    fn test_sync_and_read() {
        let mut doc = Document::default();
        let mut binder = ControlsBinder::new(ControlIds::default());
        binder.bind(&mut doc).unwrap();
        let settings = Settings {
            tab_order: true,
            color_scheme: ColorScheme::Tritanopia,
            ..Settings::default()
        };
        binder.sync(&mut doc, &settings, false).unwrap();

        let tab = binder.control_for(SettingKey::TabOrder).unwrap();
        assert!(doc.has_attribute(tab, "checked"));
        assert_eq!(binder.read(&doc, SettingKey::TabOrder).unwrap(), SettingValue::Bool(true));
        assert_eq!(
            binder.read(&doc, SettingKey::ColorScheme).unwrap(),
            SettingValue::ColorScheme(ColorScheme::Tritanopia)
        );
        let audio = doc.get_element_by_id("audio-alerts-toggle").unwrap();
        assert_eq!(doc.attribute(audio, "aria-pressed"), Some("false"));
    }

    #[test]
    fn test_toggle_panel() {
        let mut doc = Document::default();
        let mut binder = ControlsBinder::new(ControlIds::default());
        binder.bind(&mut doc).unwrap();
        assert!(binder.toggle_panel(&mut doc).unwrap());
        let panel = binder.panel().unwrap();
        assert!(!doc.has_attribute(panel, "hidden"));
        assert_eq!(doc.attribute(binder.toggle().unwrap(), "aria-expanded"), Some("true"));
        assert!(!binder.toggle_panel(&mut doc).unwrap());
        assert!(doc.has_attribute(panel, "hidden"));
    }

    #[test]
    fn test_read_rejects_bad_select_value() {
        let mut doc = Document::default();
        let mut binder = ControlsBinder::new(ControlIds::default());
        binder.bind(&mut doc).unwrap();
        let select = binder.control_for(SettingKey::TextSize).unwrap();
        doc.set_attribute(select, "value", "130").unwrap();
        assert!(binder.read(&doc, SettingKey::TextSize).is_err());
    }
}
