//! `mdlocal scan` – list the Markdown files under a directory.

use anyhow::Result;
use mdlocal_core::scan::scan_directory;
use std::path::Path;

pub fn run_scan(dir: &Path) -> Result<()> {
    let files = scan_directory(dir)?;
    if files.is_empty() {
        println!("No Markdown files found.");
    }
    for f in &files {
        println!("{}", f.display());
    }
    Ok(())
}
