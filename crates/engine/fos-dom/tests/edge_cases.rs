//! Edge case tests for fos-dom

use fos_dom::{Document, DomError, DomTree, NodeId};

#[test]
fn test_root_cannot_be_appended() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    assert_eq!(
        tree.append_child(div, NodeId::ROOT),
        Err(DomError::HierarchyRequest { parent: div, child: NodeId::ROOT })
    );
}

#[test]
fn test_remove_non_child() {
    let mut doc = Document::default();
    let body = doc.body();
    let head = doc.head();
    let span = doc.append_element(body, "span", None).unwrap();
    assert_eq!(
        doc.remove_child(head, span),
        Err(DomError::NotAChild { parent: head, child: span })
    );
}

#[test]
fn test_empty_text_content_leaves_no_children() {
    let mut doc = Document::default();
    let body = doc.body();
    let p = doc.append_element(body, "p", None).unwrap();
    doc.set_text_content(p, "x").unwrap();
    doc.set_text_content(p, "").unwrap();
    assert!(doc.tree().children(p).is_empty());
    assert_eq!(doc.text_content(p), "");
}

#[test]
fn test_unicode_text() {
    let mut doc = Document::default();
    let body = doc.body();
    let p = doc.append_element(body, "p", None).unwrap();
    doc.set_text_content(p, "Привет 世界 🚀").unwrap();
    assert_eq!(doc.text_content(p), "Привет 世界 🚀");
}

#[test]
fn test_bounding_rect_of_text_is_empty() {
    let mut doc = Document::default();
    let text = doc.create_text("loose");
    assert!(doc.bounding_rect(text).is_empty());
}

#[test]
fn test_duplicate_ids_first_wins() {
    let mut doc = Document::default();
    let body = doc.body();
    let first = doc.append_element(body, "div", Some("dup")).unwrap();
    doc.append_element(body, "div", Some("dup")).unwrap();
    assert_eq!(doc.get_element_by_id("dup"), Some(first));
}
