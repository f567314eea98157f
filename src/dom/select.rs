//! Minimal selector matching over the arena document.
//!
//! The transformers only ever query by tag name, class, attribute, the
//! descendant/child combinators, and `:first-child`, so this matcher
//! implements exactly that subset instead of a full CSS engine. Selector
//! groups separated by commas are supported (`h1 > em, h2 > em`).

use super::{Document, NodeId};

/// One parsed selector, possibly a comma-separated group.
#[derive(Debug, Clone)]
pub struct Selector {
    groups: Vec<Vec<Step>>,
}

/// A compound selector plus the combinator linking it to the one before it.
#[derive(Debug, Clone)]
struct Step {
    combinator: Combinator,
    compound: Compound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    /// First compound of a group; no ancestor constraint.
    None,
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: direct parent.
    Child,
}

/// Simple selector parts that must all match one element.
#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCheck>,
    first_child: bool,
}

#[derive(Debug, Clone)]
struct AttrCheck {
    name: String,
    value: Option<String>,
}

impl Selector {
    /// Parse a selector string. Returns `None` on syntax this matcher does
    /// not support.
    pub fn parse(input: &str) -> Option<Self> {
        let mut groups = Vec::new();
        for group in input.split(',') {
            groups.push(parse_group(group.trim())?);
        }
        if groups.is_empty() {
            return None;
        }
        Some(Self { groups })
    }

    /// All descendants of `root` matching this selector, in document order.
    pub fn select(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        doc.descendants(root)
            .into_iter()
            .filter(|&id| doc.is_element(id) && self.matches(doc, id, root))
            .collect()
    }

    /// Check whether one element matches, with ancestor constraints scoped
    /// to `root`.
    fn matches(&self, doc: &Document, id: NodeId, root: NodeId) -> bool {
        self.groups
            .iter()
            .any(|steps| matches_steps(doc, id, root, steps))
    }
}

fn matches_steps(doc: &Document, id: NodeId, root: NodeId, steps: &[Step]) -> bool {
    let (last, rest) = match steps.split_last() {
        Some(split) => split,
        None => return false,
    };
    if !matches_compound(doc, id, &last.compound) {
        return false;
    }
    matches_ancestors(doc, id, root, last.combinator, rest)
}

/// Walk up from `id` trying to satisfy the remaining steps (right to left).
fn matches_ancestors(
    doc: &Document,
    id: NodeId,
    root: NodeId,
    combinator: Combinator,
    rest: &[Step],
) -> bool {
    if combinator == Combinator::None {
        return true;
    }
    let (last, prior) = match rest.split_last() {
        Some(split) => split,
        None => return false,
    };

    let mut current = id;
    loop {
        let parent = match doc.parent(current) {
            Some(p) if current != root => p,
            _ => return false,
        };
        if matches_compound(doc, parent, &last.compound)
            && matches_ancestors(doc, parent, root, last.combinator, prior)
        {
            return true;
        }
        if combinator == Combinator::Child {
            return false;
        }
        if parent == root {
            return false;
        }
        current = parent;
    }
}

fn matches_compound(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag
        && doc.tag_name(id) != Some(tag.as_str())
    {
        return false;
    }
    for class in &compound.classes {
        if !doc.has_class(id, class) {
            return false;
        }
    }
    for check in &compound.attrs {
        match (doc.attr(id, &check.name), &check.value) {
            (None, _) => return false,
            (Some(_), None) => {}
            (Some(actual), Some(expected)) => {
                if actual != expected {
                    return false;
                }
            }
        }
    }
    if compound.first_child {
        let parent = match doc.parent(id) {
            Some(p) => p,
            None => return false,
        };
        let first_elem = doc.children(parent).find(|&c| doc.is_element(c));
        if first_elem != Some(id) {
            return false;
        }
    }
    true
}

fn parse_group(input: &str) -> Option<Vec<Step>> {
    if input.is_empty() {
        return None;
    }
    let mut steps = Vec::new();
    let mut pending = Combinator::None;
    for token in tokenize(input) {
        if token == ">" {
            if steps.is_empty() || pending != Combinator::Descendant {
                return None;
            }
            pending = Combinator::Child;
            continue;
        }
        let compound = parse_compound(&token)?;
        steps.push(Step {
            combinator: pending,
            compound,
        });
        pending = Combinator::Descendant;
    }
    if steps.is_empty() { None } else { Some(steps) }
}

/// Split a selector group on whitespace, keeping `>` as its own token even
/// when written without spaces.
fn tokenize(input: &str) -> Vec<String> {
    input
        .replace('>', " > ")
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;

    // Leading tag name (or universal `*`).
    let tag_end = rest
        .find(|c| matches!(c, '.' | '[' | ':'))
        .unwrap_or(rest.len());
    if tag_end > 0 {
        let tag = &rest[..tag_end];
        if tag != "*" {
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
    }

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('.') {
            let end = tail
                .find(|c| matches!(c, '.' | '[' | ':'))
                .unwrap_or(tail.len());
            if end == 0 {
                return None;
            }
            compound.classes.push(tail[..end].to_string());
            rest = &tail[end..];
        } else if let Some(tail) = rest.strip_prefix('[') {
            let end = tail.find(']')?;
            let inner = &tail[..end];
            let check = match inner.split_once('=') {
                Some((name, value)) => AttrCheck {
                    name: name.trim().to_string(),
                    value: Some(value.trim().trim_matches('"').trim_matches('\'').to_string()),
                },
                None => AttrCheck {
                    name: inner.trim().to_string(),
                    value: None,
                },
            };
            if check.name.is_empty() {
                return None;
            }
            compound.attrs.push(check);
            rest = &tail[end + 1..];
        } else if let Some(tail) = rest.strip_prefix(':') {
            let end = tail
                .find(|c| matches!(c, '.' | '[' | ':'))
                .unwrap_or(tail.len());
            if &tail[..end] != "first-child" {
                return None;
            }
            compound.first_child = true;
            rest = &tail[end..];
        } else {
            return None;
        }
    }

    Some(compound)
}
