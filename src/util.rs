//! Byte decoding and text normalization helpers.

use std::borrow::Cow;

/// Decode artifact bytes to a string.
///
/// Tries UTF-8 first (handles BOM automatically via encoding_rs) and falls
/// back to Windows-1252 when the input is malformed, so single-byte legacy
/// output from the external compiler still decodes instead of aborting the
/// run.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Replace curly apostrophes (U+2018/U+2019) with ASCII quotes.
///
/// The compiler smart-quotes literal text; downstream rewrites compare and
/// concatenate that text, so it is normalized before the body is parsed.
pub fn normalize_quotes(text: &str) -> Cow<'_, str> {
    if !text.contains(['\u{2018}', '\u{2019}']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace(['\u{2018}', '\u{2019}'], "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xE9 is "é" in Windows-1252 but malformed as UTF-8.
        assert_eq!(decode_text(&[0x68, 0xE9]), "hé");
    }

    #[test]
    fn test_normalize_quotes() {
        assert_eq!(normalize_quotes("it\u{2019}s \u{2018}x\u{2019}"), "it's 'x'");
        assert!(matches!(normalize_quotes("plain"), Cow::Borrowed(_)));
    }
}
