//! Link rewriting.
//!
//! The compiler emits hrefs relative to the source tree (`../setup`,
//! `intro.html#section`). Hosts embed pages under their own routing scheme,
//! so every link has to be mapped. The mapping itself is host-defined; this
//! module provides the trait the generator calls and the resolution context
//! it passes along.
//!
//! The full page-path set and the current page are explicit parameters on
//! every call. There is no stateful "set current file" step to forget.

use std::collections::BTreeSet;

/// Resolution context for one page's links.
///
/// Built by the generator: the page set once per run, the current path once
/// per page.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pages: &'a BTreeSet<String>,
    current_page: &'a str,
}

impl<'a> RewriteContext<'a> {
    pub fn new(pages: &'a BTreeSet<String>, current_page: &'a str) -> Self {
        Self {
            pages,
            current_page,
        }
    }

    /// Path of the page whose links are being rewritten.
    pub fn current_page(&self) -> &str {
        self.current_page
    }

    /// All known page paths (extension-less, slash-separated).
    pub fn pages(&self) -> &BTreeSet<String> {
        self.pages
    }

    /// Resolve an href against the current page.
    ///
    /// Splits off any `#fragment`, strips a trailing source extension
    /// (`.rst` or the compiler's `.html` output extension), normalizes
    /// `.`/`..` segments against the current page's directory, and returns
    /// the target page path plus fragment, but only when the target is a
    /// known page. External URLs, fragment-only anchors, and unknown
    /// targets return `None`.
    pub fn resolve(&self, href: &str) -> Option<ResolvedLink> {
        if href.is_empty() || href.starts_with('#') || href.contains("://") {
            return None;
        }
        if href.starts_with("mailto:") || href.starts_with("tel:") {
            return None;
        }

        let (path_part, fragment) = match href.split_once('#') {
            Some((p, f)) => (p, Some(f)),
            None => (href, None),
        };

        let path_part = path_part
            .strip_suffix(".rst")
            .or_else(|| path_part.strip_suffix(".html"))
            .unwrap_or(path_part);

        // Resolve relative to the directory containing the current page.
        let base = match self.current_page.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        };

        let mut segments: Vec<&str> = if path_part.starts_with('/') {
            Vec::new()
        } else {
            base.split('/').filter(|s| !s.is_empty()).collect()
        };

        for segment in path_part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        let mut target = segments.join("/");
        if target.is_empty() {
            target = "index".to_string();
        }

        // A directory-style link points at that directory's index page.
        if !self.pages.contains(&target) {
            let index = format!("{target}/index");
            if self.pages.contains(&index) {
                target = index;
            } else {
                return None;
            }
        }

        Some(ResolvedLink {
            path: target,
            fragment: fragment.map(|f| f.to_string()),
        })
    }
}

/// A successfully resolved internal link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Known page path the href points at.
    pub path: String,
    /// Anchor within the target page, without the `#`.
    pub fragment: Option<String>,
}

/// Maps compiler-emitted hrefs to the host system's routing scheme.
///
/// The generator calls [`rewrite`](LinkRewriter::rewrite) for every body
/// anchor (in document order) and for the `prev`/`next`/`parents` links of
/// every page, substituting the returned value verbatim. Implementations
/// typically call [`RewriteContext::resolve`] and render the result into a
/// host route, passing unresolvable hrefs through untouched.
pub trait LinkRewriter {
    fn rewrite(&self, href: &str, ctx: &RewriteContext<'_>) -> String;
}

impl<F> LinkRewriter for F
where
    F: Fn(&str, &RewriteContext<'_>) -> String,
{
    fn rewrite(&self, href: &str, ctx: &RewriteContext<'_>) -> String {
        self(href, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_resolve_relative() {
        let pages = pages(&["a", "b", "a/index"]);
        let ctx = RewriteContext::new(&pages, "a");

        assert_eq!(ctx.resolve("../b").unwrap().path, "b");
        assert_eq!(ctx.resolve("b").unwrap().path, "b");
        // `index` is not a known page here, so the href stays unresolved.
        assert!(ctx.resolve("./index").is_none());
        assert_eq!(ctx.resolve("./a/index").unwrap().path, "a/index");
    }

    #[test]
    fn test_resolve_within_directory() {
        let pages = pages(&["guide/index", "guide/setup", "index"]);
        let ctx = RewriteContext::new(&pages, "guide/index");

        assert_eq!(ctx.resolve("setup").unwrap().path, "guide/setup");
        assert_eq!(ctx.resolve("../index").unwrap().path, "index");
        // Directory-style link resolves to the directory's index page.
        let ctx_root = RewriteContext::new(&pages, "index");
        assert_eq!(ctx_root.resolve("guide").unwrap().path, "guide/index");
    }

    #[test]
    fn test_resolve_strips_extensions_and_fragments() {
        let pages = pages(&["setup"]);
        let ctx = RewriteContext::new(&pages, "index");

        let resolved = ctx.resolve("setup.html#install").unwrap();
        assert_eq!(resolved.path, "setup");
        assert_eq!(resolved.fragment.as_deref(), Some("install"));
        assert_eq!(ctx.resolve("setup.rst").unwrap().path, "setup");
    }

    #[test]
    fn test_resolve_rejects_external_and_unknown() {
        let pages = pages(&["a"]);
        let ctx = RewriteContext::new(&pages, "a");

        assert!(ctx.resolve("https://example.com/a").is_none());
        assert!(ctx.resolve("mailto:x@example.com").is_none());
        assert!(ctx.resolve("#section").is_none());
        assert!(ctx.resolve("missing").is_none());
    }

    #[test]
    fn test_closure_rewriter() {
        let pages = pages(&["a"]);
        let ctx = RewriteContext::new(&pages, "a");
        let rewriter = |href: &str, ctx: &RewriteContext<'_>| match ctx.resolve(href) {
            Some(resolved) => format!("/docs/{}", resolved.path),
            None => href.to_string(),
        };

        assert_eq!(rewriter.rewrite("a", &ctx), "/docs/a");
        assert_eq!(rewriter.rewrite("#x", &ctx), "#x");
    }
}
