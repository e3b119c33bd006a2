//! Document - High-level document API

use crate::{DOMRect, DOMTokenList, DomError, DomTree, ListenerRegistry, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    active_element: Option<NodeId>,
    viewport: DOMRect,
    listeners: ListenerRegistry,
}

impl Document {
    /// Create a document with `<html><head/><body/></html>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        // Freshly created nodes under the root cannot form a cycle.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: None,
            viewport: DOMRect::from_xywh(0.0, 0.0, 1280.0, 720.0),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.append_child(parent, child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.remove_child(parent, child)?;
        if let Some(active) = self.active_element {
            if !self.tree.is_connected(active) {
                self.active_element = None;
            }
        }
        Ok(())
    }

    /// Create `<tag id=..>` and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str, id: Option<&str>) -> Result<NodeId, DomError> {
        let el = self.create_element(tag);
        if let Some(id) = id {
            self.set_attribute(el, "id", id)?;
        }
        self.append_child(parent, el)?;
        Ok(el)
    }

    /// First attached element with a matching `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// Every attached element with a matching tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .filter(|&n| self.tree.element(n).is_some_and(|e| e.tag == tag))
            .collect()
    }

    /// Every attached element, in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .descendants(self.tree.root())
            .filter(move |&n| self.tree.element(n).is_some())
    }

    /// Attached elements whose only child is a text node
    pub fn text_leaves(&self) -> Vec<NodeId> {
        self.elements()
            .filter(|&n| match self.tree.children(n) {
                [only] => self.tree.get(*only).is_some_and(|c| c.is_text()),
                _ => false,
            })
            .collect()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id)?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.tree.try_element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.tree.try_element_mut(id)?.remove_attr(name))
    }

    /// Set or remove a boolean attribute such as `checked` or `hidden`
    pub fn toggle_attribute(&mut self, id: NodeId, name: &str, on: bool) -> Result<(), DomError> {
        let el = self.tree.try_element_mut(id)?;
        if on {
            el.set_attr(name, "");
        } else {
            el.remove_attr(name);
        }
        Ok(())
    }

    pub fn class_list(&self, id: NodeId) -> Option<&DOMTokenList> {
        self.tree.element(id).map(|e| &e.classes)
    }

    pub fn class_list_mut(&mut self, id: NodeId) -> Result<&mut DOMTokenList, DomError> {
        Ok(&mut self.tree.try_element_mut(id)?.classes)
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.tree.element(id)?.style(property)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.tree.try_element_mut(id)?.set_style(property, value);
        Ok(())
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.text_content(id)
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.tree.set_text_content(id, text)
    }

    /// `getBoundingClientRect`
    pub fn bounding_rect(&self, id: NodeId) -> DOMRect {
        self.tree.element(id).map(|e| e.rect).unwrap_or_default()
    }

    /// Layout hook: record an element's box
    pub fn set_bounding_rect(&mut self, id: NodeId, rect: DOMRect) -> Result<(), DomError> {
        self.tree.try_element_mut(id)?.rect = rect;
        Ok(())
    }

    pub fn focus(&mut self, id: NodeId) -> Result<(), DomError> {
        if self.tree.element(id).is_none() {
            return Err(DomError::NotAnElement(id));
        }
        self.active_element = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn viewport(&self) -> DOMRect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: DOMRect) {
        self.viewport = viewport;
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
