//! Announcer
//!
//! One hidden live region. Each message is cleared again after a short
//! delay so that repeating the same text is announced again.

use fos_dom::{Document, DomError, NodeId};

use crate::timers::{TimerQueue, TimerTask};

/// Id of the live region element
pub const REGION_ID: &str = "a11y-announcer";

/// Live-region priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// Live announcement channel
#[derive(Debug)]
pub struct Announcer {
    region: Option<NodeId>,
    generation: u64,
    clear_ms: u64,
    live: bool,
}

impl Announcer {
    pub fn new(clear_ms: u64) -> Self {
        Self { region: None, generation: 0, clear_ms, live: true }
    }

    pub fn region(&self) -> Option<NodeId> {
        self.region
    }

    /// Find or create the region. Created once per document.
    pub fn ensure_region(&mut self, doc: &mut Document) -> Result<NodeId, DomError> {
        if let Some(region) = self.region.filter(|&r| doc.tree().is_connected(r)) {
            return Ok(region);
        }
        let region = match doc.get_element_by_id(REGION_ID) {
            Some(existing) => existing,
            None => {
                let body = doc.body();
                let region = doc.append_element(body, "div", Some(REGION_ID))?;
                doc.set_attribute(region, "role", "status")?;
                doc.set_attribute(region, "aria-atomic", "true")?;
                doc.class_list_mut(region)?.add("sr-only");
                tracing::debug!("Live region created");
                region
            }
        };
        doc.set_attribute(region, "aria-live", if self.live { "polite" } else { "off" })?;
        self.region = Some(region);
        Ok(region)
    }

    /// With `live` off the region is marked `aria-live="off"`
    pub fn set_live(&mut self, doc: &mut Document, live: bool) -> Result<(), DomError> {
        self.live = live;
        let region = self.ensure_region(doc)?;
        doc.set_attribute(region, "aria-live", if live { "polite" } else { "off" })
    }

    /// Set the priority, then the text, and schedule the clear
    pub fn announce(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        message: &str,
        politeness: Politeness,
    ) -> Result<(), DomError> {
        let region = self.ensure_region(doc)?;
        let priority = if self.live { politeness.as_str() } else { "off" };
        doc.set_attribute(region, "aria-live", priority)?;
        doc.set_text_content(region, message)?;

        self.generation += 1;
        timers.schedule(self.clear_ms, TimerTask::ClearAnnouncement { generation: self.generation });
        tracing::debug!("Announced ({}): {}", priority, message);
        Ok(())
    }

    /// Clear the region if it still holds announcement `generation`
    pub fn clear(&mut self, doc: &mut Document, generation: u64) -> Result<bool, DomError> {
        if generation != self.generation {
            return Ok(false);
        }
        let Some(region) = self.region else {
            return Ok(false);
        };
        doc.set_text_content(region, "")?;
        Ok(true)
    }

    pub fn text(&self, doc: &Document) -> String {
        self.region.map(|r| doc.text_content(r)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_due(announcer: &mut Announcer, doc: &mut Document, timers: &mut TimerQueue, now: u64) {
        for task in timers.advance_to(now) {
            if let TimerTask::ClearAnnouncement { generation } = task {
                announcer.clear(doc, generation).unwrap();
            }
        }
    }

    #[test]
    fn test_single_region() {
        let mut doc = Document::default();
        let mut announcer = Announcer::new(1000);
        let a = announcer.ensure_region(&mut doc).unwrap();
        let b = announcer.ensure_region(&mut doc).unwrap();
        assert_eq!(a, b);
        assert_eq!(doc.attribute(a, "role"), Some("status"));
        assert!(doc.class_list(a).unwrap().contains("sr-only"));
    }

    #[test]
    fn test_message_cleared_after_delay() {
        let mut doc = Document::default();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::new(1000);
        announcer.announce(&mut doc, &mut timers, "Saved", Politeness::Assertive).unwrap();
        let region = announcer.region().unwrap();
        assert_eq!(doc.attribute(region, "aria-live"), Some("assertive"));
        assert_eq!(announcer.text(&doc), "Saved");

        run_due(&mut announcer, &mut doc, &mut timers, 999);
        assert_eq!(announcer.text(&doc), "Saved");
        run_due(&mut announcer, &mut doc, &mut timers, 1000);
        assert_eq!(announcer.text(&doc), "");
    }

    #[test]
    fn test_newer_message_survives_stale_clear() {
        let mut doc = Document::default();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::new(1000);
        announcer.announce(&mut doc, &mut timers, "X", Politeness::Polite).unwrap();
        timers.advance_to(500);
        announcer.announce(&mut doc, &mut timers, "Y", Politeness::Polite).unwrap();

        run_due(&mut announcer, &mut doc, &mut timers, 1000);
        assert_eq!(announcer.text(&doc), "Y");
        run_due(&mut announcer, &mut doc, &mut timers, 1500);
        assert_eq!(announcer.text(&doc), "");
    }

    #[test]
    fn test_live_off() {
        let mut doc = Document::default();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::new(1000);
        announcer.set_live(&mut doc, false).unwrap();
        announcer.announce(&mut doc, &mut timers, "Quiet", Politeness::Assertive).unwrap();
        let region = announcer.region().unwrap();
        assert_eq!(doc.attribute(region, "aria-live"), Some("off"));
    }

    #[test]
    fn test_reuses_host_region() {
        let mut doc = Document::default();
        let body = doc.body();
        let existing = doc.append_element(body, "div", Some(REGION_ID)).unwrap();
        let mut announcer = Announcer::new(1000);
        assert_eq!(announcer.ensure_region(&mut doc).unwrap(), existing);
        assert_eq!(doc.elements().filter(|&n| doc.attribute(n, "id") == Some(REGION_ID)).count(), 1);
    }

    #[test]
    fn test_announce_cycles_keep_page_size() {
        let mut doc = Document::default();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::new(1000);
        announcer.announce(&mut doc, &mut timers, "Ready", Politeness::Polite).unwrap();
        run_due(&mut announcer, &mut doc, &mut timers, 1000);
        let nodes = doc.tree().len();

        for i in 1..=200u64 {
            announcer.announce(&mut doc, &mut timers, &format!("Update {}", i), Politeness::Polite).unwrap();
            run_due(&mut announcer, &mut doc, &mut timers, 1000 + i * 1000);
        }
        assert_eq!(doc.tree().len(), nodes);
        assert_eq!(announcer.text(&doc), "");
    }
}
