//! Filename hint extraction from URL path.

/// Stem and extension taken from the last segment of a URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlName {
    /// Segment without its extension; `None` when the path ends in `/` or is empty.
    pub stem: Option<String>,
    /// Lowercased extension including the dot, only when it is a known image extension.
    pub image_ext: Option<&'static str>,
}

/// Splits the last path segment of `url` (percent-decoded) into stem and image extension.
///
/// Returns an empty `UrlName` when the URL cannot be parsed.
pub fn name_from_url(url: &str) -> UrlName {
    let empty = UrlName {
        stem: None,
        image_ext: None,
    };
    let Ok(parsed) = url::Url::parse(url.trim()) else {
        return empty;
    };
    let path = percent_decode(parsed.path());
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return empty;
    }

    let (stem, ext) = split_extension(segment);
    UrlName {
        stem: (!stem.is_empty()).then(|| stem.to_string()),
        image_ext: super::format::known_image_extension(ext),
    }
}

/// Splits at the last `.`, ignoring leading dots (`.hidden` has no extension).
pub(crate) fn split_extension(segment: &str) -> (&str, &str) {
    let lead = segment.len() - segment.trim_start_matches('.').len();
    match segment[lead..].rfind('.') {
        Some(i) => segment.split_at(lead + i),
        None => (segment, ""),
    }
}

/// Percent-decodes a URL path; invalid escapes are kept as-is and invalid UTF-8 is replaced.
pub(crate) fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
