//! Filesystem helpers with operation + path context on errors.

use std::path::Path;

use crate::{Error, Result};

/// Ensure a directory exists, creating it (recursively) if needed.
pub async fn ensure_dir_all_with_op(op: &'static str, path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io_path(op, path, e))
}

/// Ensure the parent directory of a file path exists.
pub async fn ensure_parent_dir_with_op(op: &'static str, path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_all_with_op(op, parent).await,
        _ => Ok(()),
    }
}

/// Synchronous variant of [`ensure_dir_all_with_op`].
pub fn ensure_dir_all_sync_with_op(op: &'static str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| Error::io_path(op, path, e))
}

/// Write `contents` to `path`, creating parent directories first.
pub async fn write_file(op: &'static str, path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent_dir_with_op(op, path).await?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::io_path(op, path, e))
}
