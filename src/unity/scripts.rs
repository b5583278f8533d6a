//! Editor scripts generated into a project before invoking Unity.

use crate::config::CodeOptimization;
use crate::error::{FleetError, Result};
use crate::fs::atomic_write_file;
use std::path::{Path, PathBuf};

const WEBGL_BUILD_TEMPLATE: &str = include_str!("templates/AutoWebGLBuildScript.cs");
const BATCH_PROCESSOR_SOURCE: &str = include_str!("templates/AutoBatchProcessor.cs");

/// `-executeMethod` target of the generated build script.
pub const BUILD_METHOD: &str = "AutoWebGLBuildScript.BuildWebGLWithPlayerSettings";

const BUILD_SCRIPT_NAME: &str = "AutoWebGLBuildScript.cs";

pub fn build_script_path(project: &Path) -> PathBuf {
    project.join("Assets").join("Editor").join(BUILD_SCRIPT_NAME)
}

fn batch_script_path(project: &Path) -> PathBuf {
    project
        .join("Assets")
        .join("Editor")
        .join("BatchScripts")
        .join("AutoBatchProcessor.cs")
}

/// Fill the build template for `output_dir`.
///
/// The path lands inside a C# verbatim string: separators are normalized to
/// `/` and quotes doubled.
pub fn render_build_script(output_dir: &Path, optimization: CodeOptimization) -> String {
    let output_path = output_dir
        .to_string_lossy()
        .replace('\\', "/")
        .replace('"', "\"\"");
    WEBGL_BUILD_TEMPLATE
        .replace("{{OUTPUT_PATH}}", &output_path)
        .replace("{{CODE_OPTIMIZATION}}", optimization.as_unity_name())
}

/// Write `Assets/Editor/AutoWebGLBuildScript.cs` and return its path.
pub fn write_build_script(
    project: &Path,
    output_dir: &Path,
    optimization: CodeOptimization,
) -> Result<PathBuf> {
    let path = build_script_path(project);
    atomic_write_file(&path, &render_build_script(output_dir, optimization))?;
    tracing::debug!(script = %path.display(), "build script written");
    Ok(path)
}

/// Remove the build script and its `.meta`. Returns the files removed.
///
/// Failures are logged, never raised: cleanup runs after every build.
pub fn remove_build_script(project: &Path) -> Vec<PathBuf> {
    let script = build_script_path(project);
    let meta = script.with_file_name(format!("{}.meta", BUILD_SCRIPT_NAME));

    let mut removed = Vec::new();
    for path in [script, meta] {
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// Write `Assets/Editor/BatchScripts/AutoBatchProcessor.cs`.
pub fn write_batch_script(project: &Path) -> Result<PathBuf> {
    let path = batch_script_path(project);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| FleetError::io("create directory", parent, e))?;
    }
    atomic_write_file(&path, BATCH_PROCESSOR_SOURCE)?;
    Ok(path)
}
