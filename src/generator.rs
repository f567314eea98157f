//! Project generation: compiler invocation and the per-page pipeline.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::model::{NavLink, Page, PageArtifact, Project};
use crate::preprocess::PreProcessor;
use crate::rewrite::{LinkRewriter, RewriteContext};
use crate::toc;
use crate::transform::Transformer;
use crate::util;

/// Extension of the markup source files the compiler consumes.
const SOURCE_EXT: &str = "rst";
/// Extension of the per-page JSON artifacts the compiler emits.
const ARTIFACT_EXT: &str = "fjson";

/// Orchestrates one generation run: invokes the external documentation
/// compiler, then runs the transformer chain and link rewriting over every
/// emitted page.
pub struct ProjectGenerator {
    compiler_path: PathBuf,
    config_dir: PathBuf,
    pre_processors: Vec<Box<dyn PreProcessor>>,
    transformers: Vec<Box<dyn Transformer>>,
    link_rewriter: Option<Box<dyn LinkRewriter>>,
}

impl std::fmt::Debug for ProjectGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectGenerator")
            .field("compiler_path", &self.compiler_path)
            .field("config_dir", &self.config_dir)
            .field("pre_processors", &self.pre_processors.len())
            .field("transformers", &self.transformers.len())
            .field("link_rewriter", &self.link_rewriter.is_some())
            .finish()
    }
}

impl ProjectGenerator {
    /// Create a generator for the given compiler executable and config
    /// directory.
    ///
    /// Both are validated up front: the config directory must exist, and a
    /// bare compiler name is resolved against `PATH`.
    pub fn new(compiler_path: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.is_dir() {
            return Err(Error::InvalidConfiguration(format!(
                "the config path {} does not exist",
                config_dir.display()
            )));
        }

        let compiler_path = compiler_path.into();
        let compiler_path = if compiler_path.components().count() > 1 {
            if !compiler_path.is_file() {
                return Err(Error::InvalidConfiguration(format!(
                    "the compiler {} does not exist",
                    compiler_path.display()
                )));
            }
            compiler_path
        } else {
            which::which(&compiler_path).map_err(|e| {
                Error::InvalidConfiguration(format!(
                    "the compiler {} is not available: {e}",
                    compiler_path.display()
                ))
            })?
        };

        Ok(Self {
            compiler_path,
            config_dir,
            pre_processors: Vec::new(),
            transformers: Vec::new(),
            link_rewriter: None,
        })
    }

    pub fn add_pre_processor(&mut self, pre_processor: Box<dyn PreProcessor>) {
        self.pre_processors.push(pre_processor);
    }

    pub fn add_transformer(&mut self, transformer: Box<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    pub fn set_transformers(&mut self, transformers: Vec<Box<dyn Transformer>>) {
        self.transformers = transformers;
    }

    pub fn set_link_rewriter(&mut self, link_rewriter: Box<dyn LinkRewriter>) {
        self.link_rewriter = Some(link_rewriter);
    }

    /// Compile the source tree at `doc_path` and post-process every page.
    ///
    /// Fails with [`Error::ExternalTool`] when the compiler exits non-zero.
    /// The scratch directories created during the run are removed on every
    /// exit path, success or failure.
    pub fn generate(&mut self, doc_path: impl AsRef<Path>) -> Result<Project> {
        let source_dir = self.prepare(doc_path.as_ref())?;
        let output_dir = TempDir::with_prefix("docweave-out-")?;

        self.run_compiler(source_dir.path(), output_dir.path())?;

        let paths = enumerate_pages(source_dir.path())?;
        let page_set: BTreeSet<String> = paths.iter().cloned().collect();

        let mut project = Project::new();
        for path in &paths {
            let page = self.process_page(path, &page_set, output_dir.path())?;
            project.add_page(page);
        }

        info!(pages = project.len(), "generated project");
        Ok(project)
    }

    /// Copy the source tree into a scratch directory and run the registered
    /// pre-processors over every source file.
    fn prepare(&self, doc_path: &Path) -> Result<TempDir> {
        let scratch = TempDir::with_prefix("docweave-src-")?;

        for entry in WalkDir::new(doc_path).sort_by_file_name() {
            let entry = entry.map_err(io_error)?;
            let relative = entry
                .path()
                .strip_prefix(doc_path)
                .expect("walked path is under its root");
            if relative.as_os_str().is_empty() {
                continue;
            }
            let target = scratch.path().join(relative);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }

        if !self.pre_processors.is_empty() {
            for entry in WalkDir::new(scratch.path()).sort_by_file_name() {
                let entry = entry.map_err(io_error)?;
                if !is_source_file(entry.path()) || !entry.file_type().is_file() {
                    continue;
                }
                let old_content = std::fs::read_to_string(entry.path())?;
                let mut content = old_content.clone();
                for processor in &self.pre_processors {
                    content = processor.process(&content);
                }
                if content != old_content {
                    std::fs::write(entry.path(), content)?;
                }
            }
        }

        Ok(scratch)
    }

    /// Invoke the external compiler once over the whole tree.
    fn run_compiler(&self, source_dir: &Path, output_dir: &Path) -> Result<()> {
        debug!(compiler = %self.compiler_path.display(), "invoking documentation compiler");

        let output = Command::new(&self.compiler_path)
            .arg("-c")
            .arg(&self.config_dir)
            .arg("-b")
            .arg("json")
            .arg(source_dir)
            .arg(output_dir)
            .output()?;

        if !output.status.success() {
            let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
            captured.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::ExternalTool {
                command: self.compiler_path.display().to_string(),
                status: output.status,
                output: captured,
            });
        }

        Ok(())
    }

    /// Decode and post-process one page.
    fn process_page(
        &mut self,
        path: &str,
        page_set: &BTreeSet<String>,
        output_dir: &Path,
    ) -> Result<Page> {
        debug!(path, "processing page");

        let artifact_path = output_dir.join(format!("{path}.{ARTIFACT_EXT}"));
        let bytes = std::fs::read(&artifact_path)?;
        let decoded = util::decode_text(&bytes);
        let artifact: PageArtifact =
            serde_json::from_str(&decoded).map_err(|source| Error::Json {
                path: artifact_path,
                source,
            })?;

        let body = util::normalize_quotes(&artifact.body);
        let toc = toc::strip_outer_list(&artifact.toc);

        let ctx = RewriteContext::new(page_set, path);
        let body = self.post_process_body(&body, output_dir, path, &ctx)?;

        let prev = artifact.prev.map(|p| self.rewrite_nav_link(p, &ctx));
        let next = artifact.next.map(|n| self.rewrite_nav_link(n, &ctx));
        let parents = artifact.parents.map(|parents| {
            parents
                .into_iter()
                .map(|p| self.rewrite_nav_link(p, &ctx))
                .collect()
        });

        Ok(Page::new(
            path.to_string(),
            artifact.title,
            body,
            toc,
            artifact.display_toc,
            parents,
            prev,
            next,
        ))
    }

    /// Parse a body fragment, run the transformer chain and the link
    /// rewriter, and re-serialize the inner body content.
    fn post_process_body(
        &mut self,
        body: &str,
        output_dir: &Path,
        path: &str,
        ctx: &RewriteContext<'_>,
    ) -> Result<String> {
        let mut doc = Document::parse(body);

        for transformer in &mut self.transformers {
            if let Some(path_aware) = transformer.path_aware() {
                path_aware.set_current_path(path);
            }
            transformer.transform(&mut doc, output_dir)?;
        }

        if let Some(rewriter) = &self.link_rewriter {
            for anchor in doc.select("a") {
                let Some(href) = doc.attr(anchor, "href").map(|h| h.to_string()) else {
                    continue;
                };
                doc.set_attr(anchor, "href", &rewriter.rewrite(&href, ctx));
            }
        }

        Ok(doc.serialize_body())
    }

    fn rewrite_nav_link(&self, mut link: NavLink, ctx: &RewriteContext<'_>) -> NavLink {
        if let Some(rewriter) = &self.link_rewriter {
            link.link = rewriter.rewrite(&link.link, ctx);
        }
        link
    }
}

/// Enumerate source pages under `root`: every `.rst` file, keyed by its
/// slash-separated, extension-less path relative to the root.
fn enumerate_pages(root: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io_error)?;
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("walked path is under its root")
            .with_extension("");
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        paths.push(key);
    }
    Ok(paths)
}

fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXT)
}

fn io_error(err: walkdir::Error) -> Error {
    Error::Io(err.into())
}
