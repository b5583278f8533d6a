//! Unity Editor discovery and batch-mode invocation.

mod batch;
pub mod process;
mod scripts;

pub use batch::run_batch_mode;
pub use scripts::{BUILD_METHOD, build_script_path, remove_build_script, write_build_script};

use crate::config::Config;
use crate::error::{FleetError, Result};
use std::path::{Path, PathBuf};

/// Editor executable relative to a `<root>/<version>/` install directory.
pub(crate) fn editor_relative_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("Editor").join("Unity.exe")
    } else if cfg!(target_os = "macos") {
        PathBuf::from("Unity.app/Contents/MacOS/Unity")
    } else {
        PathBuf::from("Editor").join("Unity")
    }
}

/// Find an installed editor under `root`, newest version directory first.
pub fn find_editor_under(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut versions: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    versions.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    versions
        .into_iter()
        .map(|version| version.join(editor_relative_path()))
        .find(|editor| editor.is_file())
}

/// The configured editor, or the newest one found under the search roots.
pub fn locate_editor(config: &Config) -> Result<PathBuf> {
    if config.unity_editor_path.is_file() {
        return Ok(config.unity_editor_path.clone());
    }

    tracing::info!(
        configured = %config.unity_editor_path.display(),
        "configured Unity Editor not found, searching install roots"
    );
    for root in &config.unity_search_roots {
        if let Some(editor) = find_editor_under(root) {
            println!("Using Unity Editor: {}", editor.display());
            return Ok(editor);
        }
    }

    Err(FleetError::UnityError(format!(
        "Unity Editor not found at '{}' or under {} search root(s); set unity_editor_path",
        config.unity_editor_path.display(),
        config.unity_search_roots.len()
    )))
}
