//! Simplified language
//!
//! Whole-string phrase substitution over leaf text. The original text is
//! kept on the element so disabling can put it back.

use fos_dom::{Document, DomError};

/// Attribute holding the text an element had before substitution
pub const ORIGINAL_ATTR: &str = "data-original-text";

/// Source phrase -> simplified phrase
pub static PHRASES: &[(&str, &str)] = &[
    ("Utilize", "Use"),
    ("Commence", "Start"),
    ("Terminate", "End"),
    ("Facilitate", "Help"),
    ("Subsequently", "Later"),
    ("Approximately", "About"),
    ("Sufficient", "Enough"),
    ("Demonstrate", "Show"),
    ("Additional information", "More info"),
    ("Request assistance", "Get help"),
    ("Authenticate", "Sign in"),
    ("Submit", "Send"),
    ("Verify you are human", "Show you are a person"),
    ("Select all images containing the object", "Pick every picture with this thing"),
    ("Incorrect response. Please try again.", "Wrong answer. Try again."),
    ("Verification successful", "You passed"),
    ("Accessibility options", "Reading help"),
    ("Keyboard navigation", "Using the keyboard"),
];

/// Simplified form of an exact phrase
pub fn simplify(phrase: &str) -> Option<&'static str> {
    PHRASES.iter().find(|(from, _)| *from == phrase).map(|(_, to)| *to)
}

/// Substitute every leaf whose trimmed text is a dictionary key. Elements
/// already carrying [`ORIGINAL_ATTR`] are left alone, so enabling twice is
/// a no-op. Returns the number of substitutions.
pub fn enable(doc: &mut Document) -> Result<usize, DomError> {
    let mut replaced = 0;
    for el in doc.text_leaves() {
        if doc.has_attribute(el, ORIGINAL_ATTR) {
            continue;
        }
        let original = doc.text_content(el);
        if let Some(simple) = simplify(original.trim()) {
            doc.set_attribute(el, ORIGINAL_ATTR, &original)?;
            doc.set_text_content(el, simple)?;
            replaced += 1;
        }
    }
    tracing::debug!("Simplified {} phrases", replaced);
    Ok(replaced)
}

/// Restore every attached element carrying [`ORIGINAL_ATTR`]
pub fn disable(doc: &mut Document) -> Result<usize, DomError> {
    let marked: Vec<_> = doc.elements().filter(|&n| doc.has_attribute(n, ORIGINAL_ATTR)).collect();
    for &el in &marked {
        if let Some(original) = doc.remove_attribute(el, ORIGINAL_ATTR)? {
            doc.set_text_content(el, &original)?;
        }
    }
    Ok(marked.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(texts: &[&str]) -> (Document, Vec<fos_dom::NodeId>) {
        let mut doc = Document::default();
        let body = doc.body();
        let ids = texts
            .iter()
            .map(|t| {
                let p = doc.append_element(body, "p", None).unwrap();
                doc.set_text_content(p, t).unwrap();
                p
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_exact_match_only() {
        let (mut doc, ids) = page(&["  Submit  ", "Submit your form", "Utilize"]);
        assert_eq!(enable(&mut doc).unwrap(), 2);
        assert_eq!(doc.text_content(ids[0]), "Send");
        assert_eq!(doc.text_content(ids[1]), "Submit your form");
        assert_eq!(doc.text_content(ids[2]), "Use");
        assert_eq!(doc.attribute(ids[0], ORIGINAL_ATTR), Some("  Submit  "));
    }

    #[test]
    fn test_restore_exact_original() {
        let (mut doc, ids) = page(&["  Submit  ", "Plain text"]);
        enable(&mut doc).unwrap();
        assert_eq!(disable(&mut doc).unwrap(), 1);
        assert_eq!(doc.text_content(ids[0]), "  Submit  ");
        assert_eq!(doc.text_content(ids[1]), "Plain text");
        assert!(!doc.has_attribute(ids[0], ORIGINAL_ATTR));
    }

    #[test]
    fn test_enable_twice() {
        let (mut doc, ids) = page(&["Commence"]);
        enable(&mut doc).unwrap();
        assert_eq!(enable(&mut doc).unwrap(), 0);
        disable(&mut doc).unwrap();
        assert_eq!(doc.text_content(ids[0]), "Commence");
    }

    #[test]
    fn test_nested_markup_untouched() {
        let mut doc = Document::default();
        let body = doc.body();
        let p = doc.append_element(body, "p", None).unwrap();
        let b = doc.append_element(p, "b", None).unwrap();
        doc.set_text_content(b, "Submit").unwrap();
        let tail = doc.create_text(" now");
        doc.append_child(p, tail).unwrap();
        enable(&mut doc).unwrap();
        assert_eq!(doc.text_content(p), "Send now");
    }

    #[test]
    fn test_dictionary_has_no_chains() {
        for (_, to) in PHRASES {
            assert!(simplify(to).is_none(), "{} is also a source phrase", to);
        }
    }
}
