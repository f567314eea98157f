//! End-to-end generation tests against a stub documentation compiler.
//!
//! The external compiler is replaced by a small shell script that copies
//! pre-built JSON artifacts into the requested output directory, so the
//! whole pipeline (invocation, enumeration, transformation, link
//! rewriting, assembly) runs for real without sphinx installed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use docweave::{
    BootstrapTransformer, Error, ImageEmbedTransformer, ProjectGenerator, RewriteContext,
};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// On-disk fixtures for one generation run.
struct Fixture {
    _dir: TempDir,
    source: std::path::PathBuf,
    config: std::path::PathBuf,
    compiler: std::path::PathBuf,
}

fn write(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    let config = dir.path().join("config");
    let artifacts = dir.path().join("artifacts");
    std::fs::create_dir_all(&config).unwrap();

    write(&source.join("index.rst"), "Welcome\n=======\n");
    write(&source.join("guide/setup.rst"), "Setup\n=====\n");

    write(
        &artifacts.join("index.fjson"),
        json!({
            "title": "Welcome",
            "body": concat!(
                "<div class=\"section\">",
                "<p>See <a href=\"guide/setup.html\">setup</a> ",
                "or <a href=\"https://example.com\">elsewhere</a>.</p>",
                "<img src=\"_images/logo.png\">",
                "<div class=\"admonition note\">",
                "<p class=\"first admonition-title\">Note</p>",
                "<p class=\"last\">Do X</p></div>",
                "</div>",
            ),
            "toc": concat!(
                "<ul><li><a href=\"#\">Welcome</a>",
                "<ul><li><a href=\"#intro\">Intro</a></li></ul>",
                "</li></ul>",
            ),
            "display_toc": true,
            "parents": null,
            "prev": null,
            "next": {"title": "Setup", "link": "guide/setup.html"},
        })
        .to_string(),
    );

    write(
        &artifacts.join("guide/setup.fjson"),
        json!({
            "title": "Setup",
            "body": "<p>Back to <a href=\"../index.html\">home</a>.</p>",
            "toc": "<ul><li><a href=\"#\">Setup</a></li></ul>",
            "display_toc": false,
            "parents": [{"title": "Welcome", "link": "../index.html"}],
            "prev": {"title": "Welcome", "link": "../index.html"},
            "next": null,
        })
        .to_string(),
    );

    write(&artifacts.join("_images/logo.png"), PNG_BYTES);

    // Stub compiler: <compiler> -c <config> -b json <src> <out>
    let compiler = dir.path().join("fake-sphinx");
    write(
        &compiler,
        format!("#!/bin/sh\ncp -R \"{}/.\" \"$6/\"\n", artifacts.display()),
    );
    let mut perms = std::fs::metadata(&compiler).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&compiler, perms).unwrap();

    Fixture {
        _dir: dir,
        source,
        config,
        compiler,
    }
}

fn generator(fixture: &Fixture) -> ProjectGenerator {
    let mut generator = ProjectGenerator::new(&fixture.compiler, &fixture.config).unwrap();
    generator.add_transformer(Box::new(BootstrapTransformer::new()));
    generator.add_transformer(Box::new(ImageEmbedTransformer::new()));
    generator.set_link_rewriter(Box::new(|href: &str, ctx: &RewriteContext<'_>| {
        match ctx.resolve(href) {
            Some(link) => format!("/docs/{}", link.path),
            None => href.to_string(),
        }
    }));
    generator
}

#[test]
fn test_full_pipeline() {
    let fixture = fixture();
    let project = generator(&fixture).generate(&fixture.source).unwrap();

    assert_eq!(project.len(), 2);
    let order: Vec<_> = project.iter().map(|p| p.path()).collect();
    assert_eq!(order, vec!["guide/setup", "index"]);

    let index = project.get("index").unwrap();
    assert_eq!(index.title(), "Welcome");
    assert_eq!(index.route(), "/");
    assert!(index.display_toc());

    // Body anchors rewritten through the configured rewriter; external
    // links passed through.
    assert!(index.body().contains("<a href=\"/docs/guide/setup\">setup</a>"));
    assert!(index.body().contains("<a href=\"https://example.com\">elsewhere</a>"));

    // Bootstrap transformer ran: admonition became an alert box.
    assert!(index.body().contains("admonition alert"));
    assert!(index.body().contains("<strong>Note: </strong>"));

    // Image inlined from the compiler output directory.
    assert!(index.body().contains("src=\"data:image/png;base64,"));

    // TOC outer wrapper stripped down to the section list.
    assert_eq!(
        index.toc(),
        "<ul><li><a href=\"#intro\">Intro</a></li></ul>"
    );

    // Navigation links rewritten.
    assert_eq!(index.next().unwrap().link, "/docs/guide/setup");

    let setup = project.get("guide/setup").unwrap();
    assert_eq!(setup.route(), "guide/setup");
    assert!(setup.body().contains("<a href=\"/docs/index\">home</a>"));
    assert_eq!(setup.prev().unwrap().link, "/docs/index");
    assert_eq!(setup.parents().unwrap()[0].link, "/docs/index");

    // Single-list TOC is returned unchanged.
    assert_eq!(setup.toc(), "<ul><li><a href=\"#\">Setup</a></li></ul>");
}

#[test]
fn test_no_rewriter_leaves_hrefs_untouched() {
    let fixture = fixture();
    let mut generator = ProjectGenerator::new(&fixture.compiler, &fixture.config).unwrap();
    generator.add_transformer(Box::new(BootstrapTransformer::new()));

    let project = generator.generate(&fixture.source).unwrap();
    let index = project.get("index").unwrap();
    assert!(index.body().contains("<a href=\"guide/setup.html\">setup</a>"));
    assert_eq!(index.next().unwrap().link, "guide/setup.html");
}

#[test]
fn test_failing_compiler_aborts_run() {
    let fixture = fixture();
    write(&fixture.compiler, "#!/bin/sh\necho boom >&2\nexit 1\n");

    let err = generator(&fixture).generate(&fixture.source).unwrap_err();
    match err {
        Error::ExternalTool { status, output, .. } => {
            assert_eq!(status.code(), Some(1));
            assert!(output.contains("boom"));
        }
        other => panic!("expected ExternalTool, got {other:?}"),
    }
}

#[test]
fn test_unsupported_image_type_aborts_run() {
    let fixture = fixture();
    let artifacts = fixture._dir.path().join("artifacts");
    write(&artifacts.join("_images/shot.bmp"), [0u8; 4]);
    write(
        &artifacts.join("index.fjson"),
        json!({
            "title": "Welcome",
            "body": "<img src=\"_images/shot.bmp\">",
            "toc": "<ul></ul>",
            "display_toc": false,
            "parents": null,
            "prev": null,
            "next": null,
        })
        .to_string(),
    );

    let err = generator(&fixture).generate(&fixture.source).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAsset(_)));
}

/// Transformer that records which page path it was given before each call.
struct PathRecorder {
    current: String,
    seen: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl docweave::PathAware for PathRecorder {
    fn set_current_path(&mut self, path: &str) {
        self.current = path.to_string();
    }
}

impl docweave::Transformer for PathRecorder {
    fn transform(&self, _doc: &mut docweave::dom::Document, _root_dir: &Path) -> docweave::Result<()> {
        self.seen.lock().unwrap().push(self.current.clone());
        Ok(())
    }

    fn path_aware(&mut self) -> Option<&mut dyn docweave::PathAware> {
        Some(self)
    }
}

#[test]
fn test_path_aware_transformer_sees_each_page() {
    let fixture = fixture();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

    let mut generator = ProjectGenerator::new(&fixture.compiler, &fixture.config).unwrap();
    generator.add_transformer(Box::new(PathRecorder {
        current: String::new(),
        seen: std::sync::Arc::clone(&seen),
    }));
    generator.generate(&fixture.source).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["guide/setup", "index"]);
}

#[test]
fn test_pre_processor_rewrites_source_text() {
    let fixture = fixture();
    // The stub compiler records what it was given, so the pre-processor's
    // effect on the scratch tree is observable.
    let capture = fixture._dir.path().join("captured");
    write(
        &fixture.compiler,
        format!(
            "#!/bin/sh\ncp \"$5/index.rst\" \"{}\"\ncp -R \"{}/.\" \"$6/\"\n",
            capture.display(),
            fixture._dir.path().join("artifacts").display(),
        ),
    );

    let mut generator = generator(&fixture);
    generator.add_pre_processor(Box::new(|source: &str| {
        source.replace("Welcome", "Greetings")
    }));
    generator.generate(&fixture.source).unwrap();

    let captured = std::fs::read_to_string(&capture).unwrap();
    assert!(captured.contains("Greetings"));
    assert!(!captured.contains("Welcome"));
}
