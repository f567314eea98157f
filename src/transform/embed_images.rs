//! Inlines referenced images directly into the HTML as data URIs.

use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use tracing::warn;

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::transform::Transformer;

/// Relative src rooted at the compiler's `_images/` output directory,
/// with any number of leading `../` segments.
static IMAGE_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.\./)*(_images/.+)$").expect("valid pattern"));

/// Replaces `_images/` references with base64 `data:` URIs so pages embed
/// without a sibling asset directory.
#[derive(Debug, Default)]
pub struct ImageEmbedTransformer;

impl ImageEmbedTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for ImageEmbedTransformer {
    fn transform(&self, doc: &mut Document, root_dir: &Path) -> Result<()> {
        for img in doc.select("img") {
            let Some(src) = doc.attr(img, "src") else {
                continue;
            };
            let Some(relative) = IMAGE_SRC
                .captures(src)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str())
            else {
                continue;
            };

            let path = root_dir.join(relative);
            if !path.is_file() {
                // Broken references are tolerated; the href stays as-is.
                warn!(src = relative, "referenced image not found, skipped");
                continue;
            }

            let mime = mime_for(relative).ok_or_else(|| Error::UnsupportedAsset(relative.to_string()))?;

            let data = std::fs::read(&path)?;
            let encoded = BASE64.encode(data);
            doc.set_attr(img, "src", &format!("data:{mime};base64,{encoded}"));
        }

        Ok(())
    }
}

fn mime_for(path: &str) -> Option<&'static str> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        Some("image/jpeg")
    } else if lower.ends_with(".png") {
        Some("image/png")
    } else if lower.ends_with(".gif") {
        Some("image/gif")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn image_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("_images")).unwrap();
        std::fs::write(dir.path().join("_images/shot.png"), PNG_BYTES).unwrap();
        dir
    }

    #[test]
    fn test_embeds_existing_image() {
        let root = image_root();
        let mut doc = Document::parse(r#"<p><img src="../_images/shot.png"></p>"#);

        ImageEmbedTransformer::new()
            .transform(&mut doc, root.path())
            .unwrap();

        let img = doc.select("img")[0];
        let src = doc.attr(img, "src").unwrap();
        assert!(src.starts_with("data:image/png;base64,"));
        let payload = src.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(BASE64.decode(payload).unwrap(), PNG_BYTES);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let mut doc = Document::parse(r#"<img src="_images/none.png">"#);

        ImageEmbedTransformer::new()
            .transform(&mut doc, root.path())
            .unwrap();

        let img = doc.select("img")[0];
        assert_eq!(doc.attr(img, "src"), Some("_images/none.png"));
    }

    #[test]
    fn test_non_matching_src_untouched() {
        let root = image_root();
        let mut doc = Document::parse(r#"<img src="https://example.com/x.bmp">"#);

        ImageEmbedTransformer::new()
            .transform(&mut doc, root.path())
            .unwrap();

        let img = doc.select("img")[0];
        assert_eq!(doc.attr(img, "src"), Some("https://example.com/x.bmp"));
    }

    #[test]
    fn test_unsupported_extension_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("_images")).unwrap();
        std::fs::write(root.path().join("_images/shot.bmp"), [0u8; 4]).unwrap();
        let mut doc = Document::parse(r#"<img src="_images/shot.bmp">"#);

        let err = ImageEmbedTransformer::new()
            .transform(&mut doc, root.path())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAsset(_)));
    }
}
