//! Temp-file writes and removal.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::CodegenError;

/// Write `buffer` to `path` atomically.
///
/// The bytes go to a uniquely named sibling first and are renamed over
/// `path`, so readers never observe a partial file. The sibling is removed
/// if any step fails.
pub fn save_buffer(buffer: &[u8], path: &Path) -> Result<(), CodegenError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = path.file_name().map(OsString::from).unwrap_or_default();
    prefix.push(".");

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CodegenError::io("create", path, e))?;
    tmp.write_all(buffer)
        .and_then(|()| tmp.flush())
        .map_err(|e| CodegenError::io("write", tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| CodegenError::io("rename", path, e.error))?;
    Ok(())
}

/// Remove a temp file. A file that is already gone is not an error.
///
/// Returns whether a file was actually removed.
pub fn remove_temp_file(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
pub fn absolute_normalized(path: &Path) -> Result<PathBuf, CodegenError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| CodegenError::io("access", ".", e))?
            .join(path)
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix.
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}
