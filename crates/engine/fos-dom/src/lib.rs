//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM used as the page boundary for host integrations.
//!
//! Nodes are addressed by [`NodeId`] (an index into the arena) rather than
//! pointers. Geometry is not computed here: the host's layout pushes
//! bounding rects in with [`Document::set_bounding_rect`].

mod classlist;
mod document;
mod events;
mod geometry;
mod node;
mod tree;

pub use classlist::DOMTokenList;
pub use document::Document;
pub use events::{DomEvent, EventKind, ListenerId, ListenerRegistry, Modifiers};
pub use geometry::DOMRect;
pub use node::{ElementData, Node, NodeData};
pub use tree::{Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("No such node: {0:?}")]
    InvalidNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child:?} under {parent:?}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
}
