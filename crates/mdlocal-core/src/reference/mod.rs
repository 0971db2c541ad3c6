//! Remote-image reference extraction.
//!
//! Scans document text for the two supported surface syntaxes, bracket style
//! (`![alt](url)`) and `<img src="...">` tags, and returns every reference whose
//! target is an `http://` or `https://` URL, ordered by byte offset.

mod inline;
mod tag;

pub(crate) use tag::replace_src_attribute;

/// Which surface syntax produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// `![ALT](TARGET "optional title")`
    Inline,
    /// `<img ... src="TARGET" ...>`
    Tag,
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Inline => "inline",
            Syntax::Tag => "tag",
        }
    }
}

/// One located remote-image mention.
///
/// `raw_text == text[start..end]` always holds for the text it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub raw_text: String,
    /// Target exactly as written.
    pub url: String,
    /// Alt text, or empty when absent.
    pub alt_text: String,
    pub start: usize,
    pub end: usize,
    pub syntax: Syntax,
}

/// Extracts every remote-image reference from `text`, ascending by `start`.
pub fn extract_references(text: &str) -> Vec<ImageReference> {
    let mut refs = inline::scan(text);
    refs.extend(tag::scan(text));
    refs.retain(|r| is_remote_url(&r.url));
    // Stable, so equal offsets keep scan order.
    refs.sort_by_key(|r| r.start);
    refs
}

/// True for URLs starting with `http://` or `https://` (case-insensitive).
pub fn is_remote_url(url: &str) -> bool {
    let url = url.trim_start();
    starts_with_ignore_case(url, "http://") || starts_with_ignore_case(url, "https://")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
