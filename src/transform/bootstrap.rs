//! Normalizes compiler-emitted markup for Twitter Bootstrap 2.
//!
//! The external compiler produces plain docutils HTML. Each sub-rewrite
//! below restructures one construct into its Bootstrap equivalent: tables,
//! tabbed configuration blocks, admonition boxes, version badges, inline
//! literals, heading subtitles, and blockquotes.
//!
//! Every sub-rewrite fails open per instance: an element that does not have
//! the expected shape is left untouched and the rest of the page is still
//! processed.

use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::dom::{Document, NodeId};
use crate::transform::Transformer;

/// Admonition kind to alert modifier and icon, in rewrite order.
const ADMONITIONS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("note", None, Some("icon-pencil")),
    ("tip", Some("alert-info"), Some("icon-eye-open")),
    ("warning", Some("alert-error"), Some("icon-warning-sign")),
];

/// Rewrites docutils output into Bootstrap 2 markup.
#[derive(Debug, Default)]
pub struct BootstrapTransformer;

impl BootstrapTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for BootstrapTransformer {
    fn transform(&self, doc: &mut Document, _root_dir: &Path) -> Result<()> {
        clean_up_table_attributes(doc);
        rewrite_configuration_blocks(doc);
        rewrite_literals(doc);
        rewrite_subheaders(doc);
        for &(kind, alert_class, icon_class) in ADMONITIONS {
            rewrite_admonitions(doc, kind, alert_class, icon_class);
        }
        rewrite_version_added(doc);
        rewrite_blockquotes(doc);
        Ok(())
    }
}

/// Drop presentation attributes docutils emits and apply Bootstrap table
/// classes.
fn clean_up_table_attributes(doc: &mut Document) {
    for table in doc.select("table") {
        doc.set_attr(table, "class", "table table-bordered table-striped");
        doc.remove_attr(table, "border");
    }
    for group in doc.select("thead, tbody") {
        doc.remove_attr(group, "valign");
    }
    for cell in doc.select("th, tr") {
        doc.remove_attr(cell, "class");
    }
}

/// Turn configuration-block containers into tab panels.
///
/// The container's list becomes the tab nav; each item's `<div>` becomes a
/// pane under a fresh `div.tab-content`, with ids
/// `configuration-block-<block>-<item>` linking the two.
fn rewrite_configuration_blocks(doc: &mut Document) {
    for (block_index, container) in doc
        .select("div.configuration-block")
        .into_iter()
        .enumerate()
    {
        doc.set_attr(container, "class", "configuration-block tabbable");
        for ul in doc.child_elements(container, "ul") {
            doc.set_attr(ul, "class", "nav nav-tabs");
        }
        if let Some(&first) = doc.select_in(container, "ul > li:first-child").first() {
            doc.set_attr(first, "class", "active");
        }

        let content = doc.create_element_with("div", vec![("class", "tab-content")]);
        doc.append(container, content);

        for (item_index, item) in doc
            .select_in(container, "ul > li")
            .into_iter()
            .enumerate()
        {
            let Some(title) = doc.first_child_element(item, "em") else {
                debug!(block_index, item_index, "configuration block item without label, skipped");
                continue;
            };
            let Some(pane) = doc.first_child_element(item, "div") else {
                debug!(block_index, item_index, "configuration block item without content, skipped");
                continue;
            };

            let id = format!("configuration-block-{block_index}-{item_index}");
            let pane_class = if item_index == 0 {
                "tab-pane active"
            } else {
                "tab-pane"
            };
            doc.set_attr(pane, "class", pane_class);
            doc.set_attr(pane, "id", &id);
            doc.append(content, pane);

            let label = doc.text_content(title);
            doc.clear_children(item);
            let link = doc.create_element("a");
            doc.set_attr(link, "href", &format!("#{id}"));
            doc.set_attr(link, "data-toggle", "tab");
            doc.append_text(link, &label);
            doc.append(item, link);
        }
    }
}

/// Replace `tt.docutils.literal` with `<code>` when the literal holds only
/// text and `span.pre` children; any other shape is left as-is.
fn rewrite_literals(doc: &mut Document) {
    for literal in doc.select("tt.docutils.literal") {
        let Some(text) = literal_text(doc, literal) else {
            continue;
        };
        let code = doc.create_element("code");
        doc.append_text(code, &text);
        doc.insert_before(literal, code);
        doc.detach(literal);
    }
}

fn literal_text(doc: &Document, literal: NodeId) -> Option<String> {
    let children: Vec<_> = doc.children(literal).collect();
    if children.is_empty() {
        return None;
    }

    let mut out = String::new();
    for child in children {
        if let Some(text) = doc.text(child) {
            out.push_str(text);
            continue;
        }
        if doc.tag_name(child) == Some("span") && doc.attr(child, "class") == Some("pre") {
            out.push_str(&doc.text_content(child));
            continue;
        }
        return None;
    }
    Some(out)
}

/// Promote emphasized text directly inside a heading to a subtitle.
fn rewrite_subheaders(doc: &mut Document) {
    for em in doc.select("h1 > em, h2 > em, h3 > em, h4 > em, h5 > em, h6 > em") {
        let small = doc.create_element("small");
        for child in doc.children(em).collect::<Vec<_>>() {
            doc.append(small, child);
        }
        doc.insert_before(em, small);
        doc.detach(em);
    }
}

/// Turn an admonition box into a Bootstrap alert.
///
/// The title paragraph becomes a bold `Title: ` lead-in, the body
/// paragraph's children are hoisted into the box, and both wrappers are
/// removed.
fn rewrite_admonitions(
    doc: &mut Document,
    kind: &str,
    alert_class: Option<&str>,
    icon_class: Option<&str>,
) {
    for admonition in doc.select(&format!("div.admonition.{kind}")) {
        // Resolve the expected shape before mutating anything, so a
        // mismatch leaves the box fully intact.
        let Some(&title) = doc.select_in(admonition, "p.first").first() else {
            debug!(kind, "admonition without title paragraph, skipped");
            continue;
        };
        let Some(&body) = doc.select_in(admonition, "p.last").first() else {
            debug!(kind, "admonition without body paragraph, skipped");
            continue;
        };

        let class = match alert_class {
            Some(alert) => format!("admonition alert {alert}"),
            None => "admonition alert".to_string(),
        };
        doc.set_attr(admonition, "class", &class);

        if let Some(icon) = icon_class {
            let icon_elem = doc.create_element("i");
            doc.set_attr(icon_elem, "class", icon);
            doc.append(admonition, icon_elem);
            doc.append_text(admonition, " ");
        }

        let lead = doc.create_element("strong");
        doc.append(admonition, lead);
        for child in doc.children(title).collect::<Vec<_>>() {
            doc.append(lead, child);
        }
        doc.append_text(lead, ": ");

        for child in doc.children(body).collect::<Vec<_>>() {
            doc.append(admonition, child);
        }

        doc.detach(title);
        doc.detach(body);
    }
}

/// Restyle version-added markers as badges.
///
/// The compiler always appends a two-character separator to the version
/// label; it is stripped and a single space re-inserted after the badge.
fn rewrite_version_added(doc: &mut Document) {
    for marker in doc.select("p.versionadded") {
        let Some(&label) = doc.select_in(marker, "span.versionmodified").first() else {
            debug!("version marker without label span, skipped");
            continue;
        };

        let text = doc.text_content(label);
        let mut chars = text.chars();
        chars.next_back();
        chars.next_back();
        let stripped = chars.as_str().to_string();

        doc.set_attr(label, "class", "label label-success");
        doc.clear_children(label);
        doc.append_text(label, &stripped);

        let space = doc.create_text(" ");
        doc.insert_after(label, space);
    }
}

/// Flatten the wrapper div docutils places inside blockquotes.
///
/// Loose text becomes paragraphs, an attribution child becomes a trailing
/// `<small>` (minus its leading quotation glyph), anything else is hoisted
/// unchanged.
fn rewrite_blockquotes(doc: &mut Document) {
    for wrapper in doc.select("blockquote > div") {
        let Some(quote) = doc.parent(wrapper) else {
            continue;
        };

        for child in doc.children(wrapper).collect::<Vec<_>>() {
            if let Some(text) = doc.text(child).map(|t| t.to_string()) {
                if text.trim().is_empty() {
                    continue;
                }
                let paragraph = doc.create_element("p");
                doc.append_text(paragraph, &text);
                doc.append(quote, paragraph);
                continue;
            }

            if doc.attr(child, "class") == Some("attribution") {
                let small = doc.create_element("small");
                for grandchild in doc.children(child).skip(1).collect::<Vec<_>>() {
                    doc.append(small, grandchild);
                }
                doc.append(quote, small);
                continue;
            }

            doc.append(quote, child);
        }

        doc.detach(wrapper);
    }
}
