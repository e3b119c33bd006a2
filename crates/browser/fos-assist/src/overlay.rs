//! Tracking overlays
//!
//! The reading guide and the tab-order indicator each own one overlay
//! element, created on first enable and then shown or hidden with the
//! `active` class. While enabled they hold listeners in the document's
//! registry; disabling drops them in the same call.

use fos_dom::{DOMRect, Document, DomError, DomEvent, EventKind, ListenerId, NodeId};

pub const READING_GUIDE_ID: &str = "a11y-reading-guide";
pub const TAB_ORDER_ID: &str = "a11y-tab-order-indicator";

const ACTIVE_CLASS: &str = "active";

/// Find or create an overlay element under `<body>`
fn ensure_overlay(doc: &mut Document, slot: &mut Option<NodeId>, id: &str) -> Result<NodeId, DomError> {
    if let Some(el) = slot.filter(|&el| doc.tree().is_connected(el)) {
        return Ok(el);
    }
    let el = match doc.get_element_by_id(id) {
        Some(el) => el,
        None => {
            let body = doc.body();
            let el = doc.append_element(body, "div", Some(id))?;
            doc.set_attribute(el, "aria-hidden", "true")?;
            el
        }
    };
    *slot = Some(el);
    Ok(el)
}

fn set_listening(doc: &mut Document, held: &mut Vec<ListenerId>, kinds: &[EventKind], owner: &str, on: bool) {
    if on {
        if held.is_empty() {
            held.extend(kinds.iter().map(|&k| doc.listeners_mut().add(k, owner)));
        }
    } else {
        for id in held.drain(..) {
            doc.listeners_mut().remove(id);
        }
    }
}

fn px(v: f64) -> String {
    format!("{}px", v)
}

/// Horizontal band that follows the pointer
#[derive(Debug)]
pub struct ReadingGuide {
    overlay: Option<NodeId>,
    listeners: Vec<ListenerId>,
    height: f64,
}

impl ReadingGuide {
    pub const OWNER: &'static str = "reading-guide";
    const EVENTS: [EventKind; 2] = [EventKind::PointerMove, EventKind::KeyDown];

    pub fn new(height: f64) -> Self {
        Self { overlay: None, listeners: Vec::new(), height }
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn set_enabled(&mut self, doc: &mut Document, on: bool) -> Result<(), DomError> {
        if !on && self.overlay.is_none() {
            set_listening(doc, &mut self.listeners, &Self::EVENTS, Self::OWNER, false);
            return Ok(());
        }
        let el = ensure_overlay(doc, &mut self.overlay, READING_GUIDE_ID)?;
        doc.class_list_mut(el)?.toggle(ACTIVE_CLASS, Some(on));
        doc.set_style(el, "height", &px(self.height))?;
        set_listening(doc, &mut self.listeners, &Self::EVENTS, Self::OWNER, on);
        Ok(())
    }

    /// Centre the band on `y`
    pub fn position(&mut self, doc: &mut Document, y: f64) -> Result<(), DomError> {
        let el = ensure_overlay(doc, &mut self.overlay, READING_GUIDE_ID)?;
        doc.set_style(el, "top", &px(y - self.height / 2.0))
    }

    /// Returns whether the event moved the band
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> Result<bool, DomError> {
        if !doc.listeners().is_listening(event.kind, Self::OWNER) {
            return Ok(false);
        }
        let y = match event.kind {
            EventKind::PointerMove => Some(event.client_y),
            EventKind::KeyDown if matches!(event.key.as_deref(), Some("ArrowUp" | "ArrowDown")) => {
                doc.active_element().map(|el| doc.bounding_rect(el).center_y())
            }
            _ => None,
        };
        match y {
            Some(y) => self.position(doc, y).map(|()| true),
            None => Ok(false),
        }
    }
}

/// Outline around the focused element
#[derive(Debug)]
pub struct TabOrderIndicator {
    overlay: Option<NodeId>,
    listeners: Vec<ListenerId>,
    margin: f64,
}

impl TabOrderIndicator {
    pub const OWNER: &'static str = "tab-order";
    const EVENTS: [EventKind; 3] = [EventKind::FocusIn, EventKind::Scroll, EventKind::Resize];

    pub fn new(margin: f64) -> Self {
        Self { overlay: None, listeners: Vec::new(), margin }
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn set_enabled(&mut self, doc: &mut Document, on: bool) -> Result<(), DomError> {
        if !on && self.overlay.is_none() {
            set_listening(doc, &mut self.listeners, &Self::EVENTS, Self::OWNER, false);
            return Ok(());
        }
        let el = ensure_overlay(doc, &mut self.overlay, TAB_ORDER_ID)?;
        doc.class_list_mut(el)?.toggle(ACTIVE_CLASS, Some(on));
        set_listening(doc, &mut self.listeners, &Self::EVENTS, Self::OWNER, on);
        if on {
            if let Some(focused) = doc.active_element() {
                self.track(doc, focused)?;
            }
        }
        Ok(())
    }

    /// Box `target` with the outward margin
    pub fn track(&mut self, doc: &mut Document, target: NodeId) -> Result<DOMRect, DomError> {
        let el = ensure_overlay(doc, &mut self.overlay, TAB_ORDER_ID)?;
        let rect = doc.bounding_rect(target).inflate(self.margin);
        doc.set_style(el, "left", &px(rect.left()))?;
        doc.set_style(el, "top", &px(rect.top()))?;
        doc.set_style(el, "width", &px(rect.width))?;
        doc.set_style(el, "height", &px(rect.height))?;
        Ok(rect)
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> Result<bool, DomError> {
        if !doc.listeners().is_listening(event.kind, Self::OWNER) {
            return Ok(false);
        }
        let target = match event.kind {
            EventKind::FocusIn => event.target.or(doc.active_element()),
            EventKind::Scroll | EventKind::Resize => doc.active_element(),
            _ => None,
        };
        match target {
            Some(target) => self.track(doc, target).map(|_| true),
            None => Ok(false),
        }
    }
}
