//! Per-document and per-run orchestration.
//!
//! For each document: read, extract remote references, resolve each distinct
//! URL into the document's asset directory, rewrite the resolved references
//! and write the document back. Per-image and per-document failures are
//! collected as strings; only a failed directory scan aborts a run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};

use crate::config::LocalizerConfig;
use crate::document::{read_document, write_document};
use crate::error::{ReadError, ScanError};
use crate::fetch::{CurlFetcher, Fetcher};
use crate::reference::{extract_references, ImageReference};
use crate::resolver::ImageResolver;
use crate::rewrite::{relative_asset_path, rewrite_references};
use crate::scan::scan_directory;
use crate::storage::{AssetStore, FsAssetStore};

/// Progress message with completion fraction in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub message: String,
    pub fraction: f32,
}

/// Outcome of processing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Remote references found.
    pub references: usize,
    /// References now pointing at a local file (counted per occurrence).
    pub downloaded: usize,
    /// References left untouched because their URL failed (counted per occurrence).
    pub failed: usize,
    /// Whether the document was written back.
    pub rewritten: bool,
    /// One line per failed reference, plus any read or write failure.
    pub errors: Vec<String>,
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_files: usize,
    pub processed_files: usize,
    pub total_images: usize,
    pub downloaded_images: usize,
    pub failed_images: usize,
    pub errors: Vec<String>,
}

impl RunSummary {
    fn absorb(&mut self, report: FileReport) {
        self.processed_files += 1;
        self.downloaded_images += report.downloaded;
        self.failed_images += report.failed;
        self.total_images += report.downloaded + report.failed;
        self.errors.extend(report.errors);
    }
}

/// Runs the localization pipeline over documents.
pub struct Localizer {
    cfg: LocalizerConfig,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn AssetStore>,
    progress: Option<mpsc::Sender<Progress>>,
}

impl Localizer {
    /// Localizer using libcurl and the local filesystem.
    pub fn new(cfg: LocalizerConfig) -> Self {
        let fetcher = Arc::new(CurlFetcher::from_config(&cfg));
        Self::with_collaborators(cfg, fetcher, Arc::new(FsAssetStore))
    }

    pub fn with_collaborators(
        cfg: LocalizerConfig,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            cfg,
            fetcher,
            store,
            progress: None,
        }
    }

    /// Sends progress events to `tx` during `process_directory`.
    pub fn with_progress(mut self, tx: mpsc::Sender<Progress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Processes every Markdown file under `root`.
    pub fn process_directory(&self, root: &Path) -> Result<RunSummary, ScanError> {
        let mut summary = RunSummary::default();

        self.report("scanning for Markdown files...", 0.0);
        let files = scan_directory(root)?;
        summary.total_files = files.len();

        if files.is_empty() {
            self.report("no Markdown files found", 1.0);
            return Ok(summary);
        }
        self.report(format!("found {} Markdown files", files.len()), 0.1);

        let total = files.len() as f32;
        for (i, path) in files.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.report(format!("processing: {name}"), 0.1 + (i as f32 / total) * 0.9);
            summary.absorb(self.process_file(path));
        }

        self.report("done", 1.0);
        tracing::info!(
            files = summary.processed_files,
            downloaded = summary.downloaded_images,
            failed = summary.failed_images,
            "run finished"
        );
        Ok(summary)
    }

    /// Remote references in `path`, without fetching or writing anything.
    pub fn references_in(&self, path: &Path) -> Result<Vec<ImageReference>, ReadError> {
        let doc = read_document(path, &self.cfg.encodings)?;
        Ok(extract_references(&doc.text))
    }

    /// Localizes the images of one document.
    pub fn process_file(&self, path: &Path) -> FileReport {
        let mut report = FileReport {
            path: path.to_path_buf(),
            ..FileReport::default()
        };

        let doc = match read_document(path, &self.cfg.encodings) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "skipping document");
                report.errors.push(e.to_string());
                return report;
            }
        };

        let references = extract_references(&doc.text);
        report.references = references.len();
        if references.is_empty() {
            return report;
        }
        tracing::info!(path = %path.display(), references = references.len(), "localizing document");

        let assets_dir = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.cfg.assets_dir_name);
        let resolver = match ImageResolver::open(
            &assets_dir,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.store),
            self.cfg.fetch_timeout(),
        ) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(dir = %assets_dir.display(), error = %e, "cannot prepare asset directory");
                report.failed = references.len();
                report.errors.push(format!(
                    "cannot create asset directory {}: {}",
                    assets_dir.display(),
                    e
                ));
                return report;
            }
        };

        let mut distinct: Vec<String> = Vec::new();
        for r in &references {
            if !distinct.contains(&r.url) {
                distinct.push(r.url.clone());
            }
        }
        let outcomes: HashMap<String, _> = resolver
            .resolve_all(&distinct, self.cfg.max_concurrent_fetches)
            .into_iter()
            .map(|o| (o.url().to_string(), o))
            .collect();

        let mut replacements: HashMap<String, String> = HashMap::new();
        for r in &references {
            let Some(outcome) = outcomes.get(&r.url) else {
                continue;
            };
            match outcome.local_path() {
                Some(local) => {
                    report.downloaded += 1;
                    replacements
                        .entry(r.url.clone())
                        .or_insert_with(|| relative_asset_path(path, local));
                }
                None => {
                    report.failed += 1;
                    if let Some(detail) = outcome.error_detail() {
                        report.errors.push(detail.to_string());
                    }
                }
            }
        }

        if replacements.is_empty() {
            return report;
        }
        let rewritten = rewrite_references(&doc.text, &references, &replacements);
        match write_document(path, &rewritten) {
            Ok(()) => report.rewritten = true,
            Err(e) => {
                tracing::warn!(error = %e, "document write failed");
                report.errors.push(e.to_string());
            }
        }
        report
    }

    fn report(&self, message: impl Into<String>, fraction: f32) {
        let message = message.into();
        tracing::debug!(fraction, "{}", message);
        if let Some(tx) = &self.progress {
            let _ = tx.send(Progress { message, fraction });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchedImage};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    /// Succeeds for URLs containing "ok", fails with 404 otherwise.
    #[derive(Default)]
    struct StubFetcher {
        calls: AtomicUsize,
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedImage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("ok") {
                Ok(FetchedImage {
                    bytes: PNG.to_vec(),
                    content_type: Some("image/png".to_string()),
                })
            } else {
                Err(FetchError::Http { status: 404 })
            }
        }
    }

    fn localizer(fetcher: Arc<StubFetcher>) -> Localizer {
        Localizer::with_collaborators(LocalizerConfig::default(), fetcher, Arc::new(FsAssetStore))
    }

    #[test]
    fn rewrites_successes_and_keeps_failures() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("post.md");
        fs::write(
            &doc,
            "# Post\n![a](https://ok.com/a.png)\n<img src=\"https://bad.com/b.png\" width=\"3\">\n![a again](https://ok.com/a.png \"t\")\n![local](img/c.png)\n",
        )
        .unwrap();
        let fetcher = Arc::new(StubFetcher::default());
        let report = localizer(Arc::clone(&fetcher)).process_file(&doc);

        assert_eq!(report.references, 3);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 1);
        assert!(report.rewritten);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            report.errors,
            vec!["download failed: https://bad.com/b.png: HTTP 404".to_string()]
        );
        assert_eq!(
            fs::read_to_string(&doc).unwrap(),
            "# Post\n![a](assets/a.png)\n<img src=\"https://bad.com/b.png\" width=\"3\">\n![a again](assets/a.png)\n![local](img/c.png)\n"
        );
        assert_eq!(fs::read(dir.path().join("assets/a.png")).unwrap(), PNG);
    }

    #[test]
    fn document_without_remote_images_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("plain.md");
        fs::write(&doc, "![local](a.png)\n").unwrap();
        let report = localizer(Arc::new(StubFetcher::default())).process_file(&doc);
        assert_eq!(report, FileReport { path: doc.clone(), ..FileReport::default() });
        assert!(!dir.path().join("assets").exists());
    }

    #[test]
    fn all_failures_leave_document_unwritten() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("bad.md");
        fs::write(&doc, "![x](https://bad.com/x.png)").unwrap();
        let report = localizer(Arc::new(StubFetcher::default())).process_file(&doc);
        assert_eq!(report.failed, 1);
        assert!(!report.rewritten);
        assert_eq!(fs::read_to_string(&doc).unwrap(), "![x](https://bad.com/x.png)");
    }

    #[test]
    fn directory_run_aggregates_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("one.md"), "![a](https://ok.com/a.png)").unwrap();
        fs::write(dir.path().join("sub/two.md"), "![b](https://bad.com/b.png) ![c](https://ok.com/c.gif)").unwrap();
        fs::write(dir.path().join("sub/three.md"), "nothing here").unwrap();
        fs::write(dir.path().join("sub/broken.md"), [0xFF, 0xFE, 0x00]).unwrap();

        let mut cfg = LocalizerConfig::default();
        cfg.encodings = vec!["utf-8".to_string()];
        let (tx, rx) = mpsc::channel();
        let loc = Localizer::with_collaborators(cfg, Arc::new(StubFetcher::default()), Arc::new(FsAssetStore))
            .with_progress(tx);

        let summary = loc.process_directory(dir.path()).unwrap();
        drop(loc);
        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.processed_files, 4);
        assert_eq!(summary.downloaded_images, 2);
        assert_eq!(summary.failed_images, 1);
        assert_eq!(summary.total_images, 3);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors.iter().any(|e| e.starts_with("cannot read file:")));
        assert!(dir.path().join("sub/assets/c.gif").exists());

        let events: Vec<Progress> = rx.iter().collect();
        assert_eq!(events.first().map(|p| p.fraction), Some(0.0));
        assert_eq!(events.last().map(|p| p.fraction), Some(1.0));
        assert!(events.windows(2).all(|w| w[0].fraction <= w[1].fraction));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let loc = localizer(Arc::new(StubFetcher::default()));
        assert!(matches!(
            loc.process_directory(&dir.path().join("missing")),
            Err(ScanError::NotFound(_))
        ));
    }

    #[test]
    fn repeated_failing_url_reports_each_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("twice.md");
        fs::write(&doc, "![a](https://x.com/a.png) ![b](https://x.com/a.png)").unwrap();
        let fetcher = Arc::new(StubFetcher::default());
        let report = localizer(Arc::clone(&fetcher)).process_file(&doc);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.errors.len(), report.failed);
        assert!(report
            .errors
            .iter()
            .all(|e| e == "download failed: https://x.com/a.png: HTTP 404"));
    }

    #[test]
    fn blocked_asset_directory_fails_every_reference() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the asset directory should go.
        fs::write(dir.path().join("assets"), "not a directory").unwrap();
        let doc = dir.path().join("post.md");
        let text = "![a](https://ok.com/a.png)\n![b](https://ok.com/b.png)\n![a](https://ok.com/a.png)\n";
        fs::write(&doc, text).unwrap();
        let fetcher = Arc::new(StubFetcher::default());
        let report = localizer(Arc::clone(&fetcher)).process_file(&doc);

        assert_eq!(report.references, 3);
        assert_eq!(report.failed, 3);
        assert_eq!(report.downloaded, 0);
        assert!(!report.rewritten);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("cannot create asset directory"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fs::read_to_string(&doc).unwrap(), text);
    }

    /// Fetches successfully, but first replaces the document with a directory
    /// so writing it back fails.
    struct DocumentClobberingFetcher {
        document: PathBuf,
    }

    impl Fetcher for DocumentClobberingFetcher {
        fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedImage, FetchError> {
            fs::remove_file(&self.document).unwrap();
            fs::create_dir(&self.document).unwrap();
            Ok(FetchedImage {
                bytes: PNG.to_vec(),
                content_type: None,
            })
        }
    }

    #[test]
    fn document_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("post.md");
        fs::write(&doc, "![a](https://ok.com/a.png)").unwrap();
        let fetcher = Arc::new(DocumentClobberingFetcher {
            document: doc.clone(),
        });
        let loc =
            Localizer::with_collaborators(LocalizerConfig::default(), fetcher, Arc::new(FsAssetStore));
        let report = loc.process_file(&doc);

        assert_eq!(report.downloaded, 1);
        assert!(!report.rewritten);
        assert_eq!(report.errors, vec![format!("cannot write file: {}", doc.display())]);
        assert_eq!(fs::read(dir.path().join("assets/a.png")).unwrap(), PNG);
    }
}
