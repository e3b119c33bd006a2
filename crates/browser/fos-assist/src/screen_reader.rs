//! Screen-Reader Profiler
//!
//! Best-effort guess at the assistive technology in use, from a platform
//! descriptor rather than any real detection, plus the structural repairs
//! each profile benefits from.

use fos_dom::{Document, DomError, NodeId};

use crate::settings::ScreenReaderMode;

/// Prefix of the profile marker class on `<html>`
pub const MARKER_PREFIX: &str = "sr-";

/// Records the `aria-label` a repair pass wrote, so later passes can
/// refresh it when the visible text changes
pub const GENERATED_ATTR: &str = "data-a11y-generated";

/// Marker class `<html>` carries for `profile`
pub fn profile_marker(profile: ScreenReaderMode) -> String {
    format!("{}{}", MARKER_PREFIX, profile.as_str())
}

/// Operating-system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFamily {
    Windows,
    Apple,
    Android,
    Linux,
    #[default]
    Unknown,
}

impl PlatformFamily {
    /// Classify a user-agent string. Android is checked before Linux since
    /// Android agents mention both.
    pub fn from_user_agent(ua: &str) -> Self {
        if ua.contains("Android") {
            Self::Android
        } else if ua.contains("Windows") {
            Self::Windows
        } else if ["Macintosh", "Mac OS", "iPhone", "iPad", "iPod"].iter().any(|s| ua.contains(s)) {
            Self::Apple
        } else if ua.contains("Linux") || ua.contains("X11") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }
}

/// What the profiler is allowed to know about the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Environment {
    /// Platform speech synthesis present
    pub speech_synthesis: bool,
    pub platform: PlatformFamily,
}

impl Environment {
    pub fn new(platform: PlatformFamily, speech_synthesis: bool) -> Self {
        Self { speech_synthesis, platform }
    }

    pub fn from_user_agent(ua: &str, speech_synthesis: bool) -> Self {
        Self::new(PlatformFamily::from_user_agent(ua), speech_synthesis)
    }
}

/// Resolve the profile. An explicit mode always wins; `auto` is guessed
/// from the environment and never resolves to `auto`.
pub fn detect(mode: ScreenReaderMode, env: &Environment) -> ScreenReaderMode {
    use PlatformFamily::*;
    use ScreenReaderMode as M;

    if mode != M::Auto {
        return mode;
    }
    match (env.speech_synthesis, env.platform) {
        (true, Apple) => M::Voiceover,
        (true, Windows) => M::Narrator,
        (_, Windows) => M::Nvda,
        (_, Apple) => M::Voiceover,
        (_, Android) => M::Talkback,
        (_, Linux) => M::Orca,
        (_, Unknown) => M::Nvda,
    }
}

const INTERACTIVE_TAGS: &[&str] = &["button", "a", "input", "select", "textarea"];
const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "radio", "switch", "tab", "menuitem", "option", "slider", "textbox",
];

fn is_interactive(doc: &Document, el: NodeId) -> bool {
    let Some(data) = doc.tree().element(el) else {
        return false;
    };
    if data.get_attr("type") == Some("hidden") {
        return false;
    }
    INTERACTIVE_TAGS.contains(&data.tag.as_str())
        || data.get_attr("role").is_some_and(|r| INTERACTIVE_ROLES.contains(&r))
}

fn has_accessible_name(doc: &Document, el: NodeId) -> bool {
    ["aria-label", "aria-labelledby"]
        .iter()
        .any(|a| doc.attribute(el, a).is_some_and(|v| !v.trim().is_empty()))
}

/// Name we generated earlier and the host has not replaced since
fn has_generated_name(doc: &Document, el: NodeId) -> bool {
    doc.attribute(el, GENERATED_ATTR).is_some_and(|g| doc.attribute(el, "aria-label") == Some(g))
}

/// Unnamed, or named by an earlier repair pass
fn needs_name(doc: &Document, el: NodeId) -> bool {
    !has_accessible_name(doc, el) || has_generated_name(doc, el)
}

fn set_generated_name(doc: &mut Document, el: NodeId, name: &str) -> Result<(), DomError> {
    doc.set_attribute(el, "aria-label", name)?;
    doc.set_attribute(el, GENERATED_ATTR, name)
}

/// `<label for=..>` pointing at `el`, or a wrapping `<label>`
fn has_label(doc: &Document, el: NodeId) -> bool {
    if let Some(id) = doc.attribute(el, "id") {
        let labelled = doc
            .elements_by_tag("label")
            .into_iter()
            .any(|l| doc.attribute(l, "for") == Some(id));
        if labelled {
            return true;
        }
    }
    let mut cur = doc.tree().parent(el);
    while let Some(p) = cur {
        if doc.tree().element(p).is_some_and(|e| e.tag == "label") {
            return true;
        }
        cur = doc.tree().parent(p);
    }
    false
}

fn fallback_name(tag: &str) -> &'static str {
    match tag {
        "button" => "Button",
        "a" => "Link",
        "input" => "Input field",
        "select" => "Selection list",
        "textarea" => "Text area",
        _ => "Interactive element",
    }
}

/// Name unlabeled interactive controls from their visible text
fn label_controls(doc: &mut Document) -> Result<usize, DomError> {
    let targets: Vec<NodeId> = doc
        .elements()
        .filter(|&el| is_interactive(doc, el) && needs_name(doc, el) && !has_label(doc, el))
        .collect();
    for &el in &targets {
        let text = doc.text_content(el);
        let name = match text.trim() {
            "" => doc
                .attribute(el, "placeholder")
                .map(str::to_string)
                .unwrap_or_else(|| {
                    let tag = doc.tree().element(el).map(|e| e.tag.as_str()).unwrap_or("");
                    fallback_name(tag).to_string()
                }),
            visible => visible.to_string(),
        };
        set_generated_name(doc, el, &name)?;
    }
    Ok(targets.len())
}

/// Name role-bearing elements from a snippet of their text
fn name_roles(doc: &mut Document, limit: usize) -> Result<usize, DomError> {
    let targets: Vec<(NodeId, String)> = doc
        .elements()
        .filter(|&el| {
            doc.has_attribute(el, "role") && !doc.has_attribute(el, "aria-live") && needs_name(doc, el)
        })
        .filter_map(|el| {
            let text = doc.text_content(el);
            let snippet: String = text.trim().chars().take(limit).collect();
            let snippet = snippet.trim_end().to_string();
            (!snippet.is_empty()).then_some((el, snippet))
        })
        .collect();
    for (el, name) in &targets {
        set_generated_name(doc, *el, name)?;
    }
    Ok(targets.len())
}

/// Profile detection and repairs
#[derive(Debug, Clone)]
pub struct ScreenReaderProfiler {
    env: Environment,
    name_limit: usize,
}

impl ScreenReaderProfiler {
    pub fn new(env: Environment, name_limit: usize) -> Self {
        Self { env, name_limit }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn detect(&self, mode: ScreenReaderMode) -> ScreenReaderMode {
        detect(mode, &self.env)
    }

    /// Tag `<html>` with the profile marker and run that profile's repairs.
    /// Safe to repeat: host-named elements are skipped and generated names
    /// are recomputed from the current text.
    pub fn apply_optimizations(
        &self,
        doc: &mut Document,
        mode: ScreenReaderMode,
    ) -> Result<ScreenReaderMode, DomError> {
        let profile = self.detect(mode);
        let root = doc.document_element();
        let target = profile_marker(profile);
        let ours: Vec<String> = ScreenReaderMode::ALL.into_iter().map(profile_marker).collect();
        let classes = doc.class_list_mut(root)?;
        classes.remove_where(|c| ours.iter().any(|m| m == c) && c != target);
        classes.add(&target);

        let repaired = match profile {
            ScreenReaderMode::Nvda | ScreenReaderMode::Jaws => label_controls(doc)?,
            ScreenReaderMode::Voiceover => name_roles(doc, self.name_limit)?,
            _ => 0,
        };
        tracing::debug!("Screen reader profile {} ({} repairs)", profile.as_str(), repaired);
        Ok(profile)
    }
}
