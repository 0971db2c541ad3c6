//! Asset directory I/O.
//!
//! Directory creation is idempotent, listing seeds the filename allocator, and
//! writes go to a `.part` temp file that is renamed into place so a failed
//! write never leaves a truncated image under its final name.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.png` → `a.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Storage and directory-listing collaborator used by the image resolver.
pub trait AssetStore: Send + Sync {
    /// Creates `dir` (and parents) if missing.
    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;
    /// Names of the entries already present in `dir`. A missing directory lists as empty.
    fn list(&self, dir: &Path) -> io::Result<Vec<String>>;
    /// Writes `bytes` to `dir/name` and returns the full path.
    fn write(&self, dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// [`AssetStore`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetStore;

impl AssetStore for FsAssetStore {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        entries
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect()
    }

    fn write(&self, dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let final_path = dir.join(name);
        let tp = temp_path(&final_path);
        let result = (|| {
            let mut f = fs::File::create(&tp)?;
            f.write_all(bytes)?;
            f.sync_all()?;
            fs::rename(&tp, &final_path)
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&tp);
            return Err(e);
        }
        Ok(final_path)
    }
}
