//! `mdlocal refs` – show the remote image references of one file.

use anyhow::Result;
use mdlocal_core::config::LocalizerConfig;
use mdlocal_core::document::read_document;
use mdlocal_core::reference::extract_references;
use std::path::Path;

pub fn run_refs(cfg: &LocalizerConfig, file: &Path) -> Result<()> {
    let doc = read_document(file, &cfg.encodings)?;
    tracing::debug!(encoding = %doc.encoding, "read document");
    let refs = extract_references(&doc.text);
    if refs.is_empty() {
        println!("No remote images in {}.", file.display());
        return Ok(());
    }
    println!("{:<8} {:<14} {:<20} {}", "SYNTAX", "SPAN", "ALT", "URL");
    for r in refs {
        println!(
            "{:<8} {:<14} {:<20} {}",
            r.syntax.as_str(),
            format!("{}..{}", r.start, r.end),
            r.alt_text,
            r.url
        );
    }
    Ok(())
}
