//! mdlocal core: download the remote images referenced by Markdown documents
//! into per-document asset directories and point the references at the local
//! copies, leaving every other byte of the document untouched.

pub mod config;
pub mod logging;

pub mod document;
pub mod error;
pub mod fetch;
pub mod filename;
pub mod localizer;
pub mod reference;
pub mod resolver;
pub mod rewrite;
pub mod scan;
pub mod storage;

pub use error::{ReadError, ScanError, WriteError};
pub use fetch::{CurlFetcher, FetchError, FetchErrorKind, FetchedImage, Fetcher};
pub use filename::FilenameAllocator;
pub use localizer::{FileReport, Localizer, Progress, RunSummary};
pub use reference::{extract_references, ImageReference, Syntax};
pub use resolver::{AllocatorState, FetchOutcome, ImageResolver};
pub use rewrite::rewrite_references;
