// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Crash-safe file writes.
//!
//! Files that alias-manager writes are sourced by the user's shell at any
//! moment. A reader must either see the old file or the new file, never a
//! truncated mix of both. So, contents are written to a temporary file in the
//! same directory as the destination, flushed, and renamed over the
//! destination in one step.

use std::{
    fs::{canonicalize, copy, metadata},
    io::{ErrorKind, Result, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write contents to path through a temporary sibling file.
///
/// Creates missing parent directories. If `path` already exists it is
/// resolved first, so a symlinked file keeps its link and the file it points
/// to gets the new contents with its permissions intact.
///
/// # Errors
///
/// - Return [`std::io::Error`] if parent directory cannot be created, the
///   temporary file cannot be written, or it cannot be renamed into place.
///   The previous contents of `path` are left untouched on failure.
pub fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let target = match canonicalize(path.as_ref()) {
        Ok(resolved) => resolved,
        Err(err) if err.kind() == ErrorKind::NotFound => path.as_ref().to_path_buf(),
        Err(err) => return Err(err),
    };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    mkdirp::mkdirp(&parent)?;

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(contents.as_ref())?;

    // INVARIANT: Replacement keeps the mode of the file it replaces.
    if let Ok(current) = metadata(&target) {
        temp.as_file().set_permissions(current.permissions())?;
    }

    temp.as_file().sync_all()?;
    temp.persist(&target).map_err(|error| error.error)?;
    debug!("wrote {:?}", target.display());

    Ok(())
}

/// Copy file to a timestamped sibling `<path>.backup.<unix-secs>`.
///
/// Returns path of the new backup copy.
///
/// # Errors
///
/// - Return [`std::io::Error`] if file cannot be copied.
pub fn backup_copy(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".backup.{stamp}"));
    let backup = PathBuf::from(backup);
    copy(path, &backup)?;

    Ok(backup)
}
