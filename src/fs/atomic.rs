//! Atomic file replacement.
//!
//! Content is written to a sibling temporary file, synced, and renamed over
//! the target. `std::fs::rename` replaces an existing destination on both
//! POSIX and Windows, so a reader sees either the old file or the new one.
//!
//! On crash a temporary file named `.{filename}.{pid}.tmp` may remain next to
//! the target.

use crate::error::{FleetError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .map_err(|e| FleetError::io("create parent directory", parent, e))?;
    }

    let temp_path = temp_path_for(path)?;

    if let Err(err) = write_and_sync(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FleetError::io("replace", path, e)
    })
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            FleetError::UserError(format!("invalid file path '{}'", target.display()))
        })?;

    // pid-qualified: concurrent runs never share a temp file.
    let temp_name = format!(".{}.{}.tmp", filename, std::process::id());
    Ok(match target.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| FleetError::io("create", path, e))?;
    file.write_all(content)
        .map_err(|e| FleetError::io("write", path, e))?;
    file.sync_all().map_err(|e| FleetError::io("sync", path, e))?;
    Ok(())
}
