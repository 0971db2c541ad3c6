//! Portable base-name sanitization.

/// Longest base name kept, in characters.
pub const MAX_BASE_CHARS: usize = 100;

/// Base name used when sanitization leaves nothing.
pub const EMPTY_BASE_NAME: &str = "image";

/// Sanitizes a base name (no extension) so it is valid on Windows and Unix.
///
/// - Replaces `< > : " / \ | ? *` and control characters 0x00-0x1F with `_`
/// - Truncates to 100 characters
/// - Substitutes `image` for an empty result
pub fn sanitize_base_name(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\0'..='\x1f' => '_',
            c => c,
        })
        .take(MAX_BASE_CHARS)
        .collect();

    if out.is_empty() {
        EMPTY_BASE_NAME.to_string()
    } else {
        out
    }
}
