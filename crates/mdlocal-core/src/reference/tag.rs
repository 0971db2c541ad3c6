//! `<img>` element syntax with a quoted `src` attribute.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ImageReference, Syntax};

static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\s+(?:[^>]*?\s)?src\s*=\s*["']([^"']+)["'][^>]*>"#)
        .expect("img tag pattern")
});

static ALT_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\salt\s*=\s*["']([^"']*)["']"#).expect("alt attribute pattern"));

// Attribute names must follow whitespace so `data-src` / `data-alt` never match.
static SRC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s(src\s*=\s*["'][^"']+["'])"#).expect("src attribute pattern"));

pub(super) fn scan(text: &str) -> Vec<ImageReference> {
    IMG_TAG
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let alt_text = ALT_ATTR
                .captures(whole.as_str())
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            Some(ImageReference {
                raw_text: whole.as_str().to_string(),
                url: caps.get(1)?.as_str().to_string(),
                alt_text: alt_text.to_string(),
                start: whole.start(),
                end: whole.end(),
                syntax: Syntax::Tag,
            })
        })
        .collect()
}

/// Replaces the first `src="..."` / `src='...'` in `tag` with `src="new_src"`.
/// All other attributes are kept byte-for-byte.
pub(crate) fn replace_src_attribute<'a>(tag: &'a str, new_src: &str) -> Cow<'a, str> {
    let Some(attr) = SRC_ATTR.captures(tag).and_then(|c| c.get(1)) else {
        return Cow::Borrowed(tag);
    };
    let mut out = String::with_capacity(tag.len() + new_src.len());
    out.push_str(&tag[..attr.start()]);
    out.push_str("src=\"");
    out.push_str(new_src);
    out.push('"');
    out.push_str(&tag[attr.end()..]);
    Cow::Owned(out)
}
