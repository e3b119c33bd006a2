//! Comprehensive tests for fos-assist
//!
//! End-to-end page sessions: hydration, persistence across rebuilds,
//! profile detection, audio and announcements.

use fos_assist::{
    Assist, AssistConfig, ColorScheme, Environment, FileTier, HostRequest, PlatformFamily, Politeness,
    RecordingBackend, ScreenReaderMode, SessionTier, SettingKey, SettingValue, StorageError, StorageTier,
    TieredStore, Waveform,
};
use fos_dom::{DOMRect, Document, DomEvent};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn start_with(store: TieredStore) -> Assist {
    init_tracing();
    Assist::builder(Document::new("https://example.test/")).store(store).start()
}

/// Durable tier that rejects everything
#[derive(Debug)]
struct DisabledStorage;

impl StorageTier for DisabledStorage {
    fn name(&self) -> &'static str {
        "disabled"
    }
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
    fn set_item(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded(key.into()))
    }
    fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}

#[test]
fn test_fresh_session_defaults() {
    let assist = start_with(TieredStore::memory_only());
    assert_eq!(assist.settings().text_size.percent(), 100);
    assert!(!assist.settings().high_contrast);
    for key in SettingKey::ALL {
        // Every key resolves to a value of its own domain
        let value = assist.get(key);
        assert_eq!(value.as_bool().is_some(), key.is_boolean(), "{}", key);
    }
    assert!(assist.controls().injected());
    assert!(assist.store().get(&assist.config().settings_key).is_none());
}

#[test]
fn test_text_size_persisted() {
    let mut assist = start_with(TieredStore::memory_only());
    assert_eq!(assist.set_text_size(150).percent(), 150);

    let json = assist.store().get(&assist.config().settings_key).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot["textSize"], 150);
    let root = assist.document().document_element();
    assert_eq!(assist.document().style(root, "font-size"), Some("150%"));
}

#[test]
fn test_text_size_clamped_and_snapped() {
    let mut assist = start_with(TieredStore::memory_only());
    assert_eq!(assist.set_text_size(420).percent(), 200);
    assert_eq!(assist.set_text_size(-3).percent(), 100);
    assert_eq!(assist.set_text_size(160).percent(), 150);
}

#[test]
fn test_windows_without_speech_is_nvda() {
    init_tracing();
    let env = Environment::new(PlatformFamily::Windows, false);
    let assist = Assist::builder(Document::default()).environment(env).start();
    assert_eq!(assist.settings().screen_reader_mode, ScreenReaderMode::Auto);
    assert_eq!(assist.active_profile(), ScreenReaderMode::Nvda);
    let root = assist.document().document_element();
    assert!(assist.document().class_list(root).unwrap().contains("sr-nvda"));
}

#[test]
fn test_explicit_profile_overrides_environment() {
    init_tracing();
    let env = Environment::from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)", true);
    let mut assist = Assist::builder(Document::default()).environment(env).start();
    assert_eq!(assist.active_profile(), ScreenReaderMode::Voiceover);
    assist
        .set_setting(SettingKey::ScreenReaderMode, SettingValue::ScreenReaderMode(ScreenReaderMode::Orca))
        .unwrap();
    assert_eq!(assist.active_profile(), ScreenReaderMode::Orca);
    let root = assist.document().document_element();
    let classes = assist.document().class_list(root).unwrap();
    assert!(classes.contains("sr-orca"));
    assert!(!classes.contains("sr-voiceover"));
}

#[test]
fn test_toggle_audio_twice() {
    let session = SessionTier::new();
    let mut assist = start_with(TieredStore::memory_only().with_session(Box::new(session.clone())));
    let key = assist.config().audio_key.clone();
    let original = assist.audio_enabled();

    let after_first = assist.toggle_audio_alerts();
    assert_eq!(after_first, !original);
    assert_eq!(session.get_item(&key).unwrap().as_deref(), Some(after_first.to_string().as_str()));

    let after_second = assist.toggle_audio_alerts();
    assert_eq!(after_second, original);
    assert_eq!(assist.audio_enabled(), original);
    assert_eq!(session.get_item(&key).unwrap().as_deref(), Some(original.to_string().as_str()));
}

#[test]
fn test_audio_reenable_plays_confirmation() {
    init_tracing();
    let backend = RecordingBackend::new();
    let mut assist = Assist::builder(Document::default())
        .audio_backend(Box::new(backend.clone()))
        .start();

    assert!(!assist.toggle_audio_alerts());
    assist.play_success_sound();
    assert!(backend.played().is_empty());

    assert!(assist.toggle_audio_alerts());
    assert_eq!(backend.frequencies(), vec![600.0]);
    assert_eq!(assist.announcement(), "Audio alerts enabled");
    let audio_button = assist.document().get_element_by_id("audio-alerts-toggle").unwrap();
    assert_eq!(assist.document().attribute(audio_button, "aria-pressed"), Some("true"));
}

#[test]
fn test_alert_sequences_on_clock() {
    init_tracing();
    let backend = RecordingBackend::new();
    let mut assist = Assist::builder(Document::default())
        .audio_backend(Box::new(backend.clone()))
        .start();
    assist.handle_event(&DomEvent::pointer_down(5.0, 5.0));
    assert_eq!(backend.opens(), 1);

    assist.play_error_sound();
    assert_eq!(backend.frequencies(), vec![440.0]);
    assist.tick(100);
    assist.tick(249);
    assert_eq!(backend.frequencies(), vec![440.0, 349.23]);
    assist.tick(250);

    let played = backend.played();
    let starts: Vec<u64> = played.iter().map(|e| e.start_ms).collect();
    assert_eq!(starts, vec![0, 100, 250]);
    assert!(played.iter().all(|e| e.tone.waveform == Waveform::Square));
    assert_eq!(played[2].end_ms(), 450);
    assert_eq!(backend.opens(), 1);
}

#[test]
fn test_announce_overwrite_then_clear() {
    let mut assist = start_with(TieredStore::memory_only());
    assist.tick(10_000);
    assist.announce("X", Politeness::Polite);
    assist.tick(10_400);
    assist.announce("Y", Politeness::Assertive);
    assert_eq!(assist.announcement(), "Y");

    assist.tick(11_000);
    assert_eq!(assist.announcement(), "Y");
    assist.tick(11_400);
    assert_eq!(assist.announcement(), "");
}

#[test]
fn test_store_fallback_when_durable_throws() {
    let store = TieredStore::memory_only().with_durable(Box::new(DisabledStorage));
    let mut assist = start_with(store);
    assist.set_color_scheme(ColorScheme::Deuteranopia);
    let json = assist.store().get(&assist.config().settings_key).unwrap();
    assert!(json.contains("deuteranopia"));
}

#[test]
fn test_durable_file_survives_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assist").join("store.json");

    let mut first = start_with(TieredStore::memory_only().with_durable(Box::new(FileTier::new(path.clone()))));
    first.toggle_high_contrast(true);
    first.set_text_size(175);
    drop(first);

    let second = start_with(TieredStore::memory_only().with_durable(Box::new(FileTier::new(path.clone()))));
    assert!(second.settings().high_contrast);
    assert_eq!(second.settings().text_size.percent(), 175);
    let root = second.document().document_element();
    assert!(second.document().class_list(root).unwrap().contains("high-contrast"));

    let high_contrast = second.controls().control_for(SettingKey::HighContrast).unwrap();
    assert!(second.document().has_attribute(high_contrast, "checked"));
}

#[test]
fn test_reset_requests_reload_and_rehydrates_defaults() {
    let session = SessionTier::new();
    let store = || TieredStore::memory_only().with_session(Box::new(session.clone()));

    let mut assist = start_with(store());
    assist.set_color_scheme(ColorScheme::Monochrome);
    assert!(!session.is_empty());

    let reset = assist.document().get_element_by_id("reset-settings").unwrap();
    let request = assist.handle_event(&DomEvent::click(reset));
    assert_eq!(request, Some(HostRequest::Reload));

    let reloaded = start_with(store());
    assert_eq!(reloaded.settings().color_scheme, ColorScheme::Default);
}

#[test]
fn test_host_markup_is_bound_not_injected() {
    init_tracing();
    let mut doc = Document::default();
    let body = doc.body();
    let ids = fos_assist::ControlIds::default();
    doc.append_element(body, "button", Some(ids.toggle.as_str())).unwrap();
    doc.append_element(body, "section", Some(ids.panel.as_str())).unwrap();
    for id in [
        &ids.high_contrast,
        &ids.enhanced_focus,
        &ids.reduce_motion,
        &ids.simple_language,
        &ids.reading_guide,
        &ids.keyboard_shortcuts,
        &ids.tab_order,
        &ids.announce_changes,
        &ids.aria_live,
    ] {
        doc.append_element(body, "input", Some(id.as_str())).unwrap();
    }
    for id in [&ids.text_size, &ids.color_scheme, &ids.screen_reader_mode] {
        doc.append_element(body, "select", Some(id.as_str())).unwrap();
    }
    doc.append_element(body, "button", Some(ids.audio_toggle.as_str())).unwrap();
    doc.append_element(body, "button", Some(ids.reset.as_str())).unwrap();

    let mut assist = Assist::builder(doc).start();
    assert!(!assist.controls().injected());
    assert_eq!(assist.document().elements_by_tag("label").len(), 0);

    let select = assist.document().get_element_by_id(&ids.color_scheme).unwrap();
    assert_eq!(assist.document().attribute(select, "value"), Some("default"));
    assist.document_mut().set_attribute(select, "value", "tritanopia").unwrap();
    assist.handle_event(&DomEvent::change(select));
    assert_eq!(assist.settings().color_scheme, ColorScheme::Tritanopia);
}

#[test]
fn test_tracking_overlays_follow_input() {
    let mut assist = start_with(TieredStore::memory_only());
    assist.set_setting(SettingKey::ReadingGuide, SettingValue::Bool(true)).unwrap();
    assist.set_setting(SettingKey::TabOrder, SettingValue::Bool(true)).unwrap();

    assist.handle_event(&DomEvent::pointer_move(100.0, 220.0));
    let guide = assist.features().reading_guide().overlay().unwrap();
    assert_eq!(assist.document().style(guide, "top"), Some("200px"));

    let doc = assist.document_mut();
    let body = doc.body();
    let field = doc.append_element(body, "input", Some("name")).unwrap();
    doc.set_bounding_rect(field, DOMRect::from_xywh(10.0, 10.0, 200.0, 30.0)).unwrap();
    doc.focus(field).unwrap();
    assist.handle_event(&DomEvent::focus_in(field));

    let indicator = assist.features().tab_order().overlay().unwrap();
    assert_eq!(assist.document().style(indicator, "left"), Some("6px"));
    assert_eq!(assist.document().style(indicator, "width"), Some("208px"));
}

#[test]
fn test_custom_keys() {
    let session = SessionTier::new();
    init_tracing();
    let config = AssistConfig::default().with_settings_key("demo.settings").with_audio_key("demo.audio");
    let mut assist = Assist::builder(Document::default())
        .store(TieredStore::memory_only().with_session(Box::new(session.clone())))
        .config(config)
        .start();
    assist.toggle_high_contrast(true);
    assist.toggle_audio_alerts();
    assert!(session.get_item("demo.settings").unwrap().is_some());
    assert_eq!(session.get_item("demo.audio").unwrap().as_deref(), Some("false"));
}
