//! Page and project value types.
//!
//! A [`Page`] is the rendered result of one compiled source file; a
//! [`Project`] is the keyed collection of all pages produced by one
//! generation run. Both are immutable once built.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A titled hyperlink in the page's navigation (prev/next/parents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub link: String,
}

/// One compiled documentation page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Slash-separated, extension-less path relative to the source root.
    /// Uniquely identifies the page within a project.
    path: String,
    title: String,
    /// Transformed HTML body fragment.
    body: String,
    /// Post-processed table-of-contents fragment.
    toc: String,
    display_toc: bool,
    parents: Option<Vec<NavLink>>,
    prev: Option<NavLink>,
    next: Option<NavLink>,
}

impl Page {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path: String,
        title: String,
        body: String,
        toc: String,
        display_toc: bool,
        parents: Option<Vec<NavLink>>,
        prev: Option<NavLink>,
        next: Option<NavLink>,
    ) -> Self {
        Self {
            path,
            title,
            body,
            toc,
            display_toc,
            parents,
            prev,
            next,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// User-visible route for this page: a trailing `/index` collapses to
    /// the parent path and a lone `index` collapses to the root.
    pub fn route(&self) -> &str {
        if self.path == "index" {
            "/"
        } else {
            self.path.strip_suffix("/index").unwrap_or(&self.path)
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn toc(&self) -> &str {
        &self.toc
    }

    pub fn display_toc(&self) -> bool {
        self.display_toc
    }

    pub fn parents(&self) -> Option<&[NavLink]> {
        self.parents.as_deref()
    }

    pub fn prev(&self) -> Option<&NavLink> {
        self.prev.as_ref()
    }

    pub fn next(&self) -> Option<&NavLink> {
        self.next.as_ref()
    }
}

/// The complete set of pages from one generation run, keyed by page path.
///
/// Insertion order is preserved for iteration.
#[derive(Debug, Default, Serialize)]
pub struct Project {
    pages: Vec<Page>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page, replacing any previous page with the same path.
    pub fn add_page(&mut self, page: Page) {
        match self.index.get(page.path()) {
            Some(&i) => self.pages[i] = page,
            None => {
                self.index.insert(page.path().to_string(), self.pages.len());
                self.pages.push(page);
            }
        }
    }

    /// Look up a page by its path key.
    pub fn get(&self, path: &str) -> Option<&Page> {
        self.index.get(path).map(|&i| &self.pages[i])
    }

    /// Iterate over all pages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<'a> IntoIterator for &'a Project {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// Raw per-page JSON artifact as emitted by the external compiler.
#[derive(Debug, Deserialize)]
pub(crate) struct PageArtifact {
    pub title: String,
    pub body: String,
    pub toc: String,
    pub display_toc: bool,
    #[serde(default)]
    pub parents: Option<Vec<NavLink>>,
    #[serde(default)]
    pub prev: Option<NavLink>,
    #[serde(default)]
    pub next: Option<NavLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> Page {
        Page::new(
            path.to_string(),
            "Title".to_string(),
            String::new(),
            String::new(),
            true,
            None,
            None,
            None,
        )
    }

    #[test]
    fn test_route_collapses_index() {
        assert_eq!(page("docs/index").route(), "docs");
        assert_eq!(page("index").route(), "/");
        assert_eq!(page("docs/setup").route(), "docs/setup");
        // Only a whole `index` segment collapses.
        assert_eq!(page("docs/reindex").route(), "docs/reindex");
    }

    #[test]
    fn test_project_lookup_and_order() {
        let mut project = Project::new();
        project.add_page(page("b"));
        project.add_page(page("a"));

        assert_eq!(project.len(), 2);
        assert_eq!(project.get("a").unwrap().path(), "a");
        assert!(project.get("missing").is_none());

        let order: Vec<_> = project.iter().map(Page::path).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_artifact_decodes_nulls() {
        let json = r#"{
            "title": "T",
            "body": "<p>b</p>",
            "toc": "<ul></ul>",
            "display_toc": false,
            "parents": null,
            "prev": null,
            "next": {"title": "N", "link": "n"}
        }"#;
        let artifact: PageArtifact = serde_json::from_str(json).unwrap();
        assert!(artifact.parents.is_none());
        assert!(artifact.prev.is_none());
        assert_eq!(artifact.next.unwrap().link, "n");
    }
}
