//! Feature Application Engine
//!
//! One applicator per feature, each a function of the feature's value and
//! the current page. Applicators are idempotent: running one twice with the
//! same value leaves the same page.

use fos_dom::{Document, DomError, DomEvent};

use crate::config::AssistConfig;
use crate::overlay::{ReadingGuide, TabOrderIndicator};
use crate::settings::{ColorScheme, SettingKey, Settings};
use crate::simple_language;

/// Prefix of the color-scheme marker class on `<html>`
pub const SCHEME_PREFIX: &str = "scheme-";

/// Features reconciled at startup, in order
pub const APPLY_ORDER: [SettingKey; 8] = [
    SettingKey::HighContrast,
    SettingKey::TextSize,
    SettingKey::ColorScheme,
    SettingKey::EnhancedFocus,
    SettingKey::ReduceMotion,
    SettingKey::SimpleLanguage,
    SettingKey::ReadingGuide,
    SettingKey::TabOrder,
];

/// Marker class for a boolean page-root feature
pub fn root_class(key: SettingKey) -> Option<&'static str> {
    match key {
        SettingKey::HighContrast => Some("high-contrast"),
        SettingKey::EnhancedFocus => Some("enhanced-focus"),
        SettingKey::ReduceMotion => Some("reduce-motion"),
        _ => None,
    }
}

/// Feature applicators and the overlay state they own
#[derive(Debug)]
pub struct FeatureEngine {
    reading_guide: ReadingGuide,
    tab_order: TabOrderIndicator,
}

impl FeatureEngine {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            reading_guide: ReadingGuide::new(config.reading_guide_height),
            tab_order: TabOrderIndicator::new(config.tab_order_margin),
        }
    }

    pub fn reading_guide(&self) -> &ReadingGuide {
        &self.reading_guide
    }

    pub fn tab_order(&self) -> &TabOrderIndicator {
        &self.tab_order
    }

    /// Apply one feature from `settings`. Keys without a page effect of
    /// their own are a no-op here.
    pub fn apply(&mut self, doc: &mut Document, key: SettingKey, settings: &Settings) -> Result<(), DomError> {
        let root = doc.document_element();
        match key {
            SettingKey::HighContrast => set_root_class(doc, key, settings.high_contrast)?,
            SettingKey::EnhancedFocus => set_root_class(doc, key, settings.enhanced_focus)?,
            SettingKey::ReduceMotion => set_root_class(doc, key, settings.reduce_motion)?,
            SettingKey::TextSize => {
                doc.set_style(root, "font-size", &format!("{}%", settings.text_size.percent()))?;
            }
            SettingKey::ColorScheme => apply_color_scheme(doc, settings.color_scheme)?,
            SettingKey::SimpleLanguage => {
                if settings.simple_language {
                    simple_language::enable(doc)?;
                } else {
                    simple_language::disable(doc)?;
                }
            }
            SettingKey::ReadingGuide => self.reading_guide.set_enabled(doc, settings.reading_guide)?,
            SettingKey::TabOrder => self.tab_order.set_enabled(doc, settings.tab_order)?,
            SettingKey::KeyboardShortcuts
            | SettingKey::ScreenReaderMode
            | SettingKey::AnnounceChanges
            | SettingKey::AriaLive => return Ok(()),
        }
        tracing::debug!("Applied {} = {}", key, settings.get(key).to_control_string());
        Ok(())
    }

    /// Reconcile every feature. A failing applicator is logged and skipped.
    pub fn apply_all(&mut self, doc: &mut Document, settings: &Settings) -> usize {
        let mut failed = 0;
        for key in APPLY_ORDER {
            if let Err(e) = self.apply(doc, key, settings) {
                tracing::warn!("Could not apply {}: {}", key, e);
                failed += 1;
            }
        }
        failed
    }

    /// Route an input event to the tracking overlays
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> Result<bool, DomError> {
        let guide = self.reading_guide.handle_event(doc, event)?;
        let tab = self.tab_order.handle_event(doc, event)?;
        Ok(guide || tab)
    }
}

fn set_root_class(doc: &mut Document, key: SettingKey, on: bool) -> Result<(), DomError> {
    if let Some(class) = root_class(key) {
        let root = doc.document_element();
        doc.class_list_mut(root)?.toggle(class, Some(on));
    }
    Ok(())
}

/// Marker class for `scheme`; `Default` has none
pub fn scheme_marker(scheme: ColorScheme) -> Option<String> {
    (scheme != ColorScheme::Default).then(|| format!("{}{}", SCHEME_PREFIX, scheme.as_str()))
}

/// Drop our other scheme markers, then add the target one. Host classes
/// sharing the prefix are left alone and a marker already in place keeps
/// its position.
fn apply_color_scheme(doc: &mut Document, scheme: ColorScheme) -> Result<(), DomError> {
    let target = scheme_marker(scheme);
    let ours: Vec<String> = ColorScheme::ALL.into_iter().filter_map(scheme_marker).collect();
    let root = doc.document_element();
    let classes = doc.class_list_mut(root)?;
    classes.remove_where(|c| ours.iter().any(|m| m == c) && target.as_deref() != Some(c));
    if let Some(marker) = &target {
        classes.add(marker);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TextSize;

    fn root_classes(doc: &Document) -> Vec<String> {
        doc.class_list(doc.document_element()).unwrap().iter().map(String::from).collect()
    }

    #[test]
    fn test_contrast_idempotent() {
        let mut doc = Document::default();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        let settings = Settings { high_contrast: true, ..Settings::default() };
        engine.apply(&mut doc, SettingKey::HighContrast, &settings).unwrap();
        engine.apply(&mut doc, SettingKey::HighContrast, &settings).unwrap();
        assert_eq!(root_classes(&doc), vec!["high-contrast"]);

        engine.apply(&mut doc, SettingKey::HighContrast, &Settings::default()).unwrap();
        assert!(root_classes(&doc).is_empty());
    }

    #[test]
    fn test_text_size_style() {
        let mut doc = Document::default();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        let settings = Settings { text_size: TextSize::snapped(175), ..Settings::default() };
        engine.apply(&mut doc, SettingKey::TextSize, &settings).unwrap();
        assert_eq!(doc.style(doc.document_element(), "font-size"), Some("175%"));
    }

    #[test]
    fn test_color_scheme_exclusive() {
        let mut doc = Document::default();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        for scheme in [ColorScheme::Protanopia, ColorScheme::Monochrome] {
            let settings = Settings { color_scheme: scheme, ..Settings::default() };
            engine.apply(&mut doc, SettingKey::ColorScheme, &settings).unwrap();
        }
        assert_eq!(root_classes(&doc), vec!["scheme-monochrome"]);

        engine.apply(&mut doc, SettingKey::ColorScheme, &Settings::default()).unwrap();
        assert!(root_classes(&doc).is_empty());
    }

    #[test]
    fn test_apply_all_defaults_leaves_root_plain() {
        let mut doc = Document::default();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        assert_eq!(engine.apply_all(&mut doc, &Settings::default()), 0);
        assert!(root_classes(&doc).is_empty());
        assert!(!engine.reading_guide().is_active());
        assert!(!engine.tab_order().is_active());
        assert!(doc.listeners().is_empty());
    }

    #[test]
    fn test_apply_all_everything_on() {
        let mut doc = Document::default();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        let settings = Settings {
            high_contrast: true,
            enhanced_focus: true,
            reduce_motion: true,
            reading_guide: true,
            tab_order: true,
            color_scheme: ColorScheme::Deuteranopia,
            ..Settings::default()
        };
        engine.apply_all(&mut doc, &settings);
        engine.apply_all(&mut doc, &settings);
        assert_eq!(
            root_classes(&doc),
            vec!["high-contrast", "scheme-deuteranopia", "enhanced-focus", "reduce-motion"]
        );
        assert_eq!(doc.listeners().len(), 5);
    }

    #[test]
    fn test_scheme_keeps_host_classes() {
        let mut doc = Document::default();
        let root = doc.document_element();
        doc.set_attribute(root, "class", "scheme-brand page").unwrap();
        let mut engine = FeatureEngine::new(&AssistConfig::default());
        for scheme in [ColorScheme::Protanopia, ColorScheme::Tritanopia] {
            let settings = Settings { color_scheme: scheme, ..Settings::default() };
            engine.apply(&mut doc, SettingKey::ColorScheme, &settings).unwrap();
        }
        assert_eq!(root_classes(&doc), vec!["scheme-brand", "page", "scheme-tritanopia"]);

        engine.apply(&mut doc, SettingKey::ColorScheme, &Settings::default()).unwrap();
        assert_eq!(root_classes(&doc), vec!["scheme-brand", "page"]);
    }
}
