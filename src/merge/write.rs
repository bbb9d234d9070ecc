//! Transactional writes of merged files.
//!
//! A target is never left half-written. The new content goes to a temporary
//! file in the target's directory (same filesystem), is fsynced, and is
//! renamed over the target. The original bytes are held in a
//! [`RestoreGuard`] until the write is committed; if any step after the
//! rename fails, the guard puts them back.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::MergeError;

/// Holds a file's original bytes and writes them back on drop unless
/// [`commit`](Self::commit) was called.
#[derive(Debug)]
pub struct RestoreGuard {
    path: PathBuf,
    original: Option<Vec<u8>>,
}

impl RestoreGuard {
    /// Capture the current content of `path`. A missing file captures
    /// nothing (there is nothing to restore).
    ///
    /// # Errors
    /// [`MergeError::Io`] if the file exists but cannot be read.
    pub fn capture(path: &Path) -> Result<Self, MergeError> {
        let original = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(MergeError::io(path, e)),
        };
        Ok(Self {
            path: path.to_owned(),
            original,
        })
    }

    /// The captured bytes, if the file existed.
    #[must_use]
    pub fn original(&self) -> Option<&[u8]> {
        self.original.as_deref()
    }

    /// Keep whatever is on disk now.
    pub fn commit(mut self) {
        self.original = None;
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(bytes) = self.original.take()
            && let Err(e) = fs::write(&self.path, &bytes)
        {
            tracing::error!(path = %self.path.display(), error = %e, "failed to restore original content");
        }
    }
}

/// Replace the content of `path` with `contents`, all or nothing.
///
/// # Errors
/// [`MergeError::Io`] if any step fails; the original content is then still
/// (or again) in place.
pub fn write_transactionally(path: &Path, contents: &str) -> Result<(), MergeError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".codegraft-")
        .tempfile_in(dir)
        .map_err(|e| MergeError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| MergeError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| MergeError::io(tmp.path(), e))?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| MergeError::io(tmp.path(), e))?;
    }

    let guard = RestoreGuard::capture(path)?;
    tmp.persist(path).map_err(|e| MergeError::io(path, e.error))?;
    sync_dir(dir).map_err(|e| MergeError::io(dir, e))?;

    guard.commit();
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        fs::write(&path, "old\n").unwrap();

        write_transactionally(&path, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");

        // No temp files left behind.
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("Foo.java")]);
    }

    #[test]
    fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("New.java");
        write_transactionally(&path, "class New {}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "class New {}\n");
    }

    #[test]
    fn guard_restores_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        fs::write(&path, "original\n").unwrap();

        {
            let guard = RestoreGuard::capture(&path).unwrap();
            assert_eq!(guard.original(), Some(&b"original\n"[..]));
            fs::write(&path, "half-writ").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");
    }

    #[test]
    fn committed_guard_keeps_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        fs::write(&path, "original\n").unwrap();

        let guard = RestoreGuard::capture(&path).unwrap();
        fs::write(&path, "updated\n").unwrap();
        guard.commit();
        assert_eq!(fs::read_to_string(&path).unwrap(), "updated\n");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("Foo.java");
        let err = write_transactionally(&path, "x").unwrap_err();
        assert!(matches!(err, MergeError::Io { .. }));
        assert!(!path.exists());
    }
}
