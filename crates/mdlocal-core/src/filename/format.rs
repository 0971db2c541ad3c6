//! Image format detection: URL extension, declared content type, magic bytes.

/// Extensions accepted straight from a URL path.
pub const IMAGE_EXTENSIONS: [&str; 8] = [
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".ico",
];

/// Extension used when nothing identifies the format.
pub const FALLBACK_EXTENSION: &str = ".bin";

const CONTENT_TYPES: [(&str, &str); 9] = [
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("image/bmp", ".bmp"),
    ("image/x-icon", ".ico"),
    ("image/vnd.microsoft.icon", ".ico"),
];

/// Prefix signatures checked in order. WebP is handled separately.
const MAGIC: [(&[u8], &str); 8] = [
    (b"\x89PNG\r\n\x1a\n", ".png"),
    (b"\xff\xd8\xff", ".jpg"),
    (b"GIF87a", ".gif"),
    (b"GIF89a", ".gif"),
    (b"<svg", ".svg"),
    (b"<?xml", ".svg"),
    (b"BM", ".bmp"),
    (b"\x00\x00\x01\x00", ".ico"),
];

/// Returns the canonical static form of `ext` if it is a known image extension (case-insensitive).
pub fn known_image_extension(ext: &str) -> Option<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(ext))
}

/// Maps a `Content-Type` value to an extension, ignoring case and `;` parameters.
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim();
    CONTENT_TYPES
        .iter()
        .find(|(ct, _)| ct.eq_ignore_ascii_case(mime))
        .map(|(_, ext)| *ext)
}

/// Identifies the image format from leading bytes.
///
/// A `RIFF` container only counts as WebP when bytes 8..12 are `WEBP`.
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(".webp");
    }
    MAGIC
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, ext)| *ext)
}

/// Picks the extension for a fetched image: URL extension, then content type,
/// then content sniffing, then `.bin`.
pub fn resolve_extension(
    url_ext: Option<&'static str>,
    content_type: Option<&str>,
    bytes: Option<&[u8]>,
) -> &'static str {
    url_ext
        .or_else(|| content_type.and_then(extension_from_content_type))
        .or_else(|| bytes.and_then(sniff_extension))
        .unwrap_or(FALLBACK_EXTENSION)
}
