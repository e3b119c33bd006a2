//! DOM Events
//!
//! Input events forwarded by the host, and a listener registry recording
//! which components are subscribed to which event kinds.

use crate::NodeId;

/// Event types the page boundary understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerDown,
    KeyDown,
    FocusIn,
    Click,
    Change,
    Scroll,
    Resize,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerMove => "mousemove",
            Self::PointerDown => "mousedown",
            Self::KeyDown => "keydown",
            Self::FocusIn => "focusin",
            Self::Click => "click",
            Self::Change => "change",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }

    /// Events that count as an explicit user activation
    pub fn is_user_activation(&self) -> bool {
        matches!(self, Self::PointerDown | Self::KeyDown | Self::Click)
    }
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn alt_shift() -> Self {
        Self { alt: true, shift: true, ..Default::default() }
    }
}

/// DOM event
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: Option<NodeId>,
    pub client_x: f64,
    pub client_y: f64,
    pub key: Option<String>,
    pub modifiers: Modifiers,
}

impl DomEvent {
    fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            client_x: 0.0,
            client_y: 0.0,
            key: None,
            modifiers: Modifiers::default(),
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self { client_x: x, client_y: y, ..Self::bare(EventKind::PointerMove) }
    }

    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self { client_x: x, client_y: y, ..Self::bare(EventKind::PointerDown) }
    }

    pub fn key_down(key: &str) -> Self {
        Self { key: Some(key.to_string()), ..Self::bare(EventKind::KeyDown) }
    }

    pub fn key_down_with(key: &str, modifiers: Modifiers) -> Self {
        Self { modifiers, ..Self::key_down(key) }
    }

    pub fn focus_in(target: NodeId) -> Self {
        Self { target: Some(target), ..Self::bare(EventKind::FocusIn) }
    }

    pub fn click(target: NodeId) -> Self {
        Self { target: Some(target), ..Self::bare(EventKind::Click) }
    }

    pub fn change(target: NodeId) -> Self {
        Self { target: Some(target), ..Self::bare(EventKind::Change) }
    }

    pub fn scroll() -> Self {
        Self::bare(EventKind::Scroll)
    }

    pub fn resize() -> Self {
        Self::bare(EventKind::Resize)
    }
}

/// Listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

#[derive(Debug, Clone)]
struct Listener {
    id: ListenerId,
    kind: EventKind,
    owner: String,
}

/// Registered listeners, one entry per (kind, owner) subscription
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    next_id: u32,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, owner: &str) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener { id, kind, owner: owner.to_string() });
        tracing::trace!("listener {:?} added: {} for {}", id, kind.name(), owner);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Whether `owner` listens for `kind`
    pub fn is_listening(&self, kind: EventKind, owner: &str) -> bool {
        self.listeners.iter().any(|l| l.kind == kind && l.owner == owner)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }

    pub fn count_owned(&self, owner: &str) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
