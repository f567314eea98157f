//! Arena-based document tree for HTML post-processing.
//!
//! The external documentation compiler emits each page body as an HTML
//! string. Transformers need to restructure that markup: move nodes between
//! parents, rewrite attributes, and synthesize new elements. This module
//! provides an arena-allocated tree that html5ever parses into, with the
//! mutation and query surface those passes rely on.
//!
//! All nodes live in a contiguous vector; parent/child/sibling links are
//! indices into it. Detached nodes simply become unreachable from the
//! document root and are skipped during serialization.

mod select;
mod serialize;
mod tree_sink;

pub use select::Selector;
pub use serialize::serialize_node;

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, ns, parse_document};

use tree_sink::ArenaSink;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel value for no node.
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    pub(crate) fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    pub(crate) fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the document tree.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-split class list for fast selector matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (preserved but never matched).
    Comment(String),
    /// Document type declaration.
    Doctype(String),
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the document tree.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub(crate) parent: NodeId,
    pub(crate) first_child: NodeId,
    pub(crate) last_child: NodeId,
    pub(crate) prev_sibling: NodeId,
    pub(crate) next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated document tree.
pub struct Document {
    nodes: Vec<Node>,
    document: NodeId,
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

impl Document {
    /// Create a new empty tree with a document root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        doc.document = doc.alloc(Node::new(NodeData::Document));
        doc
    }

    /// Parse an HTML string into a tree.
    ///
    /// Parsing is permissive: unbalanced or otherwise malformed markup is
    /// repaired the way a browser would, never rejected.
    pub fn parse(html: &str) -> Self {
        let sink = ArenaSink::new();
        parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_document()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn root(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node with no attributes.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with(tag, Vec::new())
    }

    /// Create a new element node with attributes.
    pub fn create_element_with(&mut self, tag: &str, attrs: Vec<(&str, &str)>) -> NodeId {
        let attrs = attrs
            .into_iter()
            .map(|(name, value)| Attribute {
                name: html_name(name),
                value: value.to_string(),
            })
            .collect();
        self.create_element_node(html_name(tag), attrs)
    }

    pub(crate) fn create_element_node(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| split_classes(&a.value))
            .unwrap_or_default();

        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            classes,
        }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    pub(crate) fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub(crate) fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype(name)))
    }

    /// Append a child to a parent node, detaching it from any previous
    /// parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling, detaching it from any previous
    /// parent first.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        self.detach(new_node);

        let parent = self.get(sibling).map_or(NodeId::NONE, |n| n.parent);
        let prev = self.get(sibling).map_or(NodeId::NONE, |n| n.prev_sibling);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node immediately after a sibling.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let next = self.get(sibling).map_or(NodeId::NONE, |n| n.next_sibling);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            let parent = self.get(sibling).map_or(NodeId::NONE, |n| n.parent);
            if parent.is_some() {
                self.append(parent, new_node);
            }
        }
    }

    /// Remove a node from its parent. The node itself (and its subtree)
    /// stays in the arena and can be re-inserted elsewhere.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if parent.is_none() {
            return;
        }

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        }
        if let Some(par) = self.get_mut(parent) {
            if par.first_child == id {
                par.first_child = next;
            }
            if par.last_child == id {
                par.last_child = prev;
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Detach every child of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        loop {
            let child = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
            if child.is_none() {
                break;
            }
            self.detach(child);
        }
    }

    /// Append text to an existing trailing text node, or create a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(existing) = &mut last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_some())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let first = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        Children {
            doc: self,
            current: first,
        }
    }

    /// Child elements of a node with the given tag name, in order.
    pub fn child_elements(&self, parent: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(parent)
            .filter(|&c| self.tag_name(c) == Some(tag))
            .collect()
    }

    /// First child element with the given tag name.
    pub fn first_child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&c| self.tag_name(c) == Some(tag))
    }

    /// All reachable descendants of a node in document order, excluding the
    /// node itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Find the first element with the given tag name under `root` (DFS).
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    /// Run a selector against the whole document.
    ///
    /// Results are in document order. An unparseable selector matches
    /// nothing.
    pub fn select(&self, selector: &str) -> Vec<NodeId> {
        self.select_in(self.document, selector)
    }

    /// Run a selector against the descendants of `root`.
    pub fn select_in(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Some(sel) => sel.select(self, root),
            None => Vec::new(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.doc.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(id)
    }
}

/// Element accessors.
impl Document {
    /// Get element's local tag name.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: &str) {
        let name = html_name(attr_name);
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, classes, .. } = &mut node.data
        {
            if attr_name == "class" {
                *classes = split_classes(value);
            }
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                Some(attr) => attr.value = value.to_string(),
                None => attrs.push(Attribute {
                    name,
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, classes, .. } = &mut node.data
        {
            if attr_name == "class" {
                classes.clear();
            }
            attrs.retain(|a| a.name.local.as_ref() != attr_name);
        }
    }

    /// Get element's classes.
    pub fn classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check whether an element carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get the content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text content of a subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(s) = self.text(id) {
            out.push_str(s);
        }
        for child in self.descendants(id) {
            if let Some(s) = self.text(child) {
                out.push_str(s);
            }
        }
        out
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}
