//! `mdlocal run` – localize every Markdown file under a directory.

use anyhow::{Context, Result};
use mdlocal_core::config::LocalizerConfig;
use mdlocal_core::scan::scan_directory;
use mdlocal_core::{Localizer, Progress, RunSummary};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

/// Error lines printed before the rest are collapsed into a count.
const MAX_ERRORS_SHOWN: usize = 10;

pub fn run_localize(cfg: LocalizerConfig, dir: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        return run_dry(cfg, dir);
    }

    let (progress_tx, progress_rx) = mpsc::channel::<Progress>();
    let printer = thread::spawn(move || {
        for p in progress_rx {
            println!("[{:>3.0}%] {}", p.fraction * 100.0, p.message);
        }
    });

    let localizer = Localizer::new(cfg).with_progress(progress_tx);
    let result = localizer.process_directory(dir);
    // Dropping the localizer closes the channel so the printer drains and exits.
    drop(localizer);
    let _ = printer.join();

    let summary = result.with_context(|| format!("scanning {}", dir.display()))?;
    print!("{}", format_summary(&summary));
    Ok(())
}

fn run_dry(cfg: LocalizerConfig, dir: &Path) -> Result<()> {
    let files = scan_directory(dir)?;
    let localizer = Localizer::new(cfg);
    let mut total = 0usize;
    for path in &files {
        match localizer.references_in(path) {
            Ok(refs) if refs.is_empty() => {}
            Ok(refs) => {
                println!("{}", path.display());
                for r in &refs {
                    println!("  {}", r.url);
                }
                total += refs.len();
            }
            Err(e) => println!("{} (skipped: {})", path.display(), e),
        }
    }
    println!(
        "Dry run: {} remote image(s) in {} Markdown file(s); nothing was downloaded.",
        total,
        files.len()
    );
    Ok(())
}

/// Renders the end-of-run report.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Markdown files scanned:   {}", summary.total_files);
    let _ = writeln!(out, "Markdown files processed: {}", summary.processed_files);
    let _ = writeln!(out, "Images found:             {}", summary.total_images);
    let _ = writeln!(out, "Images downloaded:        {}", summary.downloaded_images);
    let _ = writeln!(out, "Images failed:            {}", summary.failed_images);
    if !summary.errors.is_empty() {
        let _ = writeln!(out, "Errors:");
        for e in summary.errors.iter().take(MAX_ERRORS_SHOWN) {
            let _ = writeln!(out, "  {}", e);
        }
        if summary.errors.len() > MAX_ERRORS_SHOWN {
            let _ = writeln!(
                out,
                "  ... and {} more errors",
                summary.errors.len() - MAX_ERRORS_SHOWN
            );
        }
    }
    out
}
