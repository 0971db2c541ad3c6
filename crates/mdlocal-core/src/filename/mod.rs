//! Local filename allocation for downloaded images.
//!
//! Turns a URL (plus the fetched bytes and declared content type, when known)
//! into a filename that is unique within one asset directory. The original
//! file name from the URL is preferred; collisions get a short URL-hash
//! suffix, then a counter.

mod format;
mod path;
mod sanitize;

use std::collections::HashSet;

use sha2::{Digest, Sha256};

pub use format::{
    extension_from_content_type, known_image_extension, resolve_extension, sniff_extension,
    FALLBACK_EXTENSION, IMAGE_EXTENSIONS,
};
pub use path::{name_from_url, UrlName};
pub use sanitize::sanitize_base_name;

/// Hex digits kept from the URL digest.
pub const SHORT_HASH_LEN: usize = 6;

/// First six hex digits of the SHA-256 digest of `text`.
pub fn short_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(SHORT_HASH_LEN);
    hex
}

/// Allocates collision-free names within one directory.
///
/// `allocate` only reads the taken set; every returned name must be passed to
/// `register` before the next `allocate` call, or use `claim` to do both.
#[derive(Debug, Clone, Default)]
pub struct FilenameAllocator {
    taken: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the taken set, typically with the directory's existing entries.
    pub fn with_taken<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    pub fn taken_count(&self) -> usize {
        self.taken.len()
    }

    /// Marks `name` as used. Names are never released.
    pub fn register(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Computes a free filename for `url`. Deterministic for the same inputs and taken set.
    pub fn allocate(&self, url: &str, content: Option<&[u8]>, content_type: Option<&str>) -> String {
        let UrlName { stem, image_ext } = name_from_url(url);
        let extension = resolve_extension(image_ext, content_type, content);
        let base = sanitize_base_name(&stem.unwrap_or_else(|| short_hash(url)));

        let candidate = format!("{base}{extension}");
        if !self.is_taken(&candidate) {
            return candidate;
        }

        let hash = short_hash(url);
        let mut candidate = format!("{base}_{hash}{extension}");
        let mut counter = 1u32;
        while self.is_taken(&candidate) {
            candidate = format!("{base}_{hash}_{counter}{extension}");
            counter += 1;
        }
        candidate
    }

    /// `allocate` followed by `register`.
    pub fn claim(&mut self, url: &str, content: Option<&[u8]>, content_type: Option<&str>) -> String {
        let name = self.allocate(url, content, content_type);
        tracing::debug!(url, name = %name, "allocated asset filename");
        self.register(name.clone());
        name
    }
}
