//! Serialization of the arena tree back to HTML fragments.
//!
//! The compiler hands us full documents; the host template only wants the
//! inner body content, so [`Document::serialize_body`] strips the outer
//! `<html>`/`<head>`/`<body>` scaffolding the parser added.

use super::{Document, NodeData, NodeId};

/// Elements with no content model; serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Serialize a single node (including its own tag) to an HTML string.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        write_node(self, id, &mut out);
        out
    }

    /// Serialize the children of a node, without the node's own tag.
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            write_node(self, child, &mut out);
        }
        out
    }

    /// Serialize only the inner content of the document's `<body>`.
    ///
    /// Falls back to the whole tree when no body element exists (never the
    /// case for html5ever output, which always synthesizes one).
    pub fn serialize_body(&self) -> String {
        match self.find_by_tag(self.root(), "body") {
            Some(body) => self.serialize_children(body),
            None => self.serialize_children(self.root()),
        }
    }
}

/// Serialize a single node to an HTML string.
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    doc.serialize(id)
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.get(id) else { return };
    match &node.data {
        NodeData::Document => {
            for child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeData::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            let raw = doc
                .parent(id)
                .and_then(|p| doc.tag_name(p))
                .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                out.push(' ');
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            for child in doc.children(id) {
                write_node(doc, child, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Document;

    #[test]
    fn test_body_extraction() {
        let doc = Document::parse("<html><head><title>t</title></head><body><p>x</p></body></html>");
        assert_eq!(doc.serialize_body(), "<p>x</p>");
    }

    #[test]
    fn test_fragment_round_trip() {
        let doc = Document::parse(r#"<div class="note"><p>a <em>b</em></p></div>"#);
        assert_eq!(
            doc.serialize_body(),
            r#"<div class="note"><p>a <em>b</em></p></div>"#
        );
    }

    #[test]
    fn test_void_elements() {
        let doc = Document::parse(r#"<p><img src="x.png">text<br></p>"#);
        assert_eq!(doc.serialize_body(), r#"<p><img src="x.png">text<br></p>"#);
    }

    #[test]
    fn test_escaping() {
        let mut doc = Document::new();
        let p = doc.create_element_with("p", vec![("title", r#"a"b<c"#)]);
        doc.append(doc.root(), p);
        doc.append_text(p, "1 < 2 & 3");
        assert_eq!(
            doc.serialize(p),
            r#"<p title="a&quot;b&lt;c">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn test_serialize_single_node() {
        let doc = Document::parse("<ul><li>a</li></ul>");
        let ul = doc.select("ul")[0];
        assert_eq!(doc.serialize(ul), "<ul><li>a</li></ul>");
    }
}
