//! Reference rewriting.
//!
//! Substitutions are applied back to front so offsets of references not yet
//! processed stay valid. Bytes outside resolved references are copied as-is.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Component, Path};

use crate::reference::{replace_src_attribute, ImageReference, Syntax};

/// Rewrites every reference whose URL has an entry in `resolved` to point at
/// the mapped local path. Returns `text` unchanged (borrowed) when nothing applies.
pub fn rewrite_references<'a>(
    text: &'a str,
    references: &[ImageReference],
    resolved: &HashMap<String, String>,
) -> Cow<'a, str> {
    let mut applicable: Vec<&ImageReference> = references
        .iter()
        .filter(|r| resolved.contains_key(&r.url))
        .collect();
    if applicable.is_empty() {
        return Cow::Borrowed(text);
    }
    applicable.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = text.to_string();
    // Start of the last applied edit; anything reaching past it overlaps.
    let mut edit_floor = text.len();
    for r in applicable {
        if text.get(r.start..r.end) != Some(r.raw_text.as_str()) {
            tracing::warn!(start = r.start, end = r.end, "reference does not match text, skipped");
            continue;
        }
        if r.end > edit_floor {
            tracing::warn!(start = r.start, end = r.end, "overlapping reference skipped");
            continue;
        }
        let Some(local) = resolved.get(&r.url) else {
            continue;
        };
        let replacement = render_reference(r, &local.replace('\\', "/"));
        out.replace_range(r.start..r.end, &replacement);
        edit_floor = r.start;
    }
    Cow::Owned(out)
}

/// Renders `reference` pointing at `local_path`.
///
/// Inline references are re-emitted as `![alt](path)` (any title is dropped);
/// tags keep every attribute except the replaced `src`.
pub fn render_reference(reference: &ImageReference, local_path: &str) -> String {
    match reference.syntax {
        Syntax::Inline => format!("![{}]({})", reference.alt_text, local_path),
        Syntax::Tag => replace_src_attribute(&reference.raw_text, local_path).into_owned(),
    }
}

/// Path of `asset` as written into `document`: relative to the document's
/// directory when the asset lives below it, otherwise the full path.
/// Always uses forward slashes.
pub fn relative_asset_path(document: &Path, asset: &Path) -> String {
    let doc_dir = document.parent().unwrap_or_else(|| Path::new(""));
    match asset.strip_prefix(doc_dir) {
        Ok(rel) if !doc_dir.as_os_str().is_empty() || asset.is_relative() => join_forward(rel),
        _ => asset.to_string_lossy().replace('\\', "/"),
    }
}

fn join_forward(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
