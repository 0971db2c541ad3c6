//! Document read/write.
//!
//! Reading tries each configured encoding in order and keeps the first that
//! decodes without error, even if a later one would also succeed. Writing
//! always uses UTF-8.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{ReadError, WriteError};

/// Decoded document text and the encoding label that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub text: String,
    pub encoding: String,
}

/// Reads `path` and decodes it with the first encoding in `encodings` that accepts it.
pub fn read_document(path: &Path, encodings: &[String]) -> Result<DecodedDocument, ReadError> {
    let bytes = fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    for label in encodings {
        if let Some(text) = decode(label, &bytes) {
            tracing::debug!(path = %path.display(), encoding = %label, "decoded document");
            return Ok(DecodedDocument {
                text,
                encoding: label.clone(),
            });
        }
    }
    Err(ReadError::Undecodable {
        path: path.to_path_buf(),
        tried: encodings.to_vec(),
    })
}

/// Writes `text` to `path` as UTF-8.
pub fn write_document(path: &Path, text: &str) -> Result<(), WriteError> {
    fs::write(path, text.as_bytes()).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Strict decode: `None` on any malformed sequence or unknown label.
fn decode(label: &str, bytes: &[u8]) -> Option<String> {
    let normalized = label.trim().to_ascii_lowercase();
    // WHATWG maps latin1 labels to windows-1252; ISO-8859-1 is a 1:1 byte map.
    if matches!(normalized.as_str(), "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1") {
        return Some(bytes.iter().map(|&b| char::from(b)).collect());
    }
    let Some(encoding) = Encoding::for_label(normalized.as_bytes()) else {
        tracing::warn!(encoding = %label, "unknown encoding label, skipped");
        return None;
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalizerConfig;

    fn encodings() -> Vec<String> {
        LocalizerConfig::default().encodings
    }

    #[test]
    fn utf8_wins_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "héllo ![x](https://x.com/i.png)").unwrap();
        let doc = read_document(&path, &encodings()).unwrap();
        assert_eq!(doc.encoding, "utf-8");
        assert_eq!(doc.text, "héllo ![x](https://x.com/i.png)");
    }

    #[test]
    fn gbk_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        // "中文" in GBK; not valid UTF-8.
        fs::write(&path, [0xD6, 0xD0, 0xCE, 0xC4]).unwrap();
        let doc = read_document(&path, &encodings()).unwrap();
        assert_eq!(doc.encoding, "gbk");
        assert_eq!(doc.text, "中文");
    }

    #[test]
    fn latin1_accepts_anything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, [b'a', 0xFF, 0x80]).unwrap();
        let doc = read_document(&path, &["utf-8".to_string(), "latin-1".to_string()]).unwrap();
        assert_eq!(doc.encoding, "latin-1");
        assert_eq!(doc.text, "a\u{ff}\u{80}");
    }

    #[test]
    fn undecodable_with_strict_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, [0xFF, 0xFE, 0xFD]).unwrap();
        let err = read_document(&path, &["utf-8".to_string()]).unwrap_err();
        assert!(matches!(err, ReadError::Undecodable { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("none.md"), &encodings()).unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn write_is_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_document(&path, "中文 ![a](assets/a.png)").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "中文 ![a](assets/a.png)");
    }
}
