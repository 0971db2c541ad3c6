//! Bracket-style image syntax: `![alt](target)` with an optional quoted title.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ImageReference, Syntax};

// Alt has no `]`, target has no whitespace or `)`. Captures are verbatim.
static INLINE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).expect("inline image pattern")
});

pub(super) fn scan(text: &str) -> Vec<ImageReference> {
    INLINE_IMAGE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ImageReference {
                raw_text: whole.as_str().to_string(),
                url: caps.get(2)?.as_str().to_string(),
                alt_text: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                start: whole.start(),
                end: whole.end(),
                syntax: Syntax::Inline,
            })
        })
        .collect()
}
