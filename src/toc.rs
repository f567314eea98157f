//! Table-of-contents post-processing.
//!
//! The compiler always emits the per-page TOC wrapped in a synthetic outer
//! list: `<ul><li>Page title<ul>…sections…</ul></li></ul>`. Hosts want only
//! the inner section list, so this pass extracts the second list element in
//! document order.

use crate::dom::Document;

/// Strip the synthetic outer list from a TOC fragment.
///
/// Returns the serialized second `<ul>` in document order. A fragment with
/// fewer than two lists (a page without sub-sections) is returned unchanged.
pub fn strip_outer_list(toc: &str) -> String {
    let doc = Document::parse(toc);
    let lists = doc.select("ul");

    match lists.get(1) {
        Some(&inner) => doc.serialize(inner),
        None => toc.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str =
        "<ul><li><a href=\"#\">Page</a><ul><li><a href=\"#s1\">Section 1</a></li></ul></li></ul>";

    #[test]
    fn test_strips_outer_wrapper() {
        let stripped = strip_outer_list(WRAPPED);
        assert_eq!(
            stripped,
            "<ul><li><a href=\"#s1\">Section 1</a></li></ul>"
        );
    }

    #[test]
    fn test_single_list_unchanged() {
        let toc = "<ul><li><a href=\"#\">Page</a></li></ul>";
        assert_eq!(strip_outer_list(toc), toc);
    }

    #[test]
    fn test_idempotent_after_stripping() {
        let once = strip_outer_list(WRAPPED);
        assert_eq!(strip_outer_list(&once), once);
    }
}
