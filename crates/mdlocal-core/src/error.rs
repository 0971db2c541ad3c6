//! Typed failures for the document pipeline.
//!
//! Only [`ScanError`] aborts a run. Read and write failures are recovered per
//! document and surface as strings in the run summary; fetch failures live in
//! [`crate::fetch::FetchError`].

use std::path::PathBuf;

use thiserror::Error;

/// The run's root path could not be scanned. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// A document could not be read or decoded. Skips that document only.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read file: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read file: {} (not decodable as any of: {})", .path.display(), .tried.join(", "))]
    Undecodable { path: PathBuf, tried: Vec<String> },
}

/// A rewritten document could not be written back.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write file: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
