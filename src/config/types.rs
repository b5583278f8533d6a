//! Configuration types and defaults for simfleet.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config struct.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// WebGL code optimization mode written into the generated build script.
///
/// Mirrors Unity 6's `WasmCodeOptimization` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CodeOptimization {
    /// Fastest build times, for development.
    BuildTimes,
    /// Optimize for runtime performance.
    #[default]
    RuntimeSpeed,
    /// Runtime performance with link-time optimization.
    #[serde(rename = "RuntimeSpeedLTO")]
    RuntimeSpeedLto,
    /// Optimize for output size.
    DiskSize,
    /// Output size with link-time optimization.
    #[serde(rename = "DiskSizeLTO")]
    DiskSizeLto,
}

impl CodeOptimization {
    /// The identifier Unity expects in `WasmCodeOptimization`.
    pub fn as_unity_name(&self) -> &'static str {
        match self {
            Self::BuildTimes => "BuildTimes",
            Self::RuntimeSpeed => "RuntimeSpeed",
            Self::RuntimeSpeedLto => "RuntimeSpeedLTO",
            Self::DiskSize => "DiskSize",
            Self::DiskSizeLto => "DiskSizeLTO",
        }
    }

    /// Short human-readable description for progress output.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BuildTimes => "Build Times (fast builds)",
            Self::RuntimeSpeed => "Runtime Speed",
            Self::RuntimeSpeedLto => "Runtime Speed with LTO",
            Self::DiskSize => "Disk Size",
            Self::DiskSizeLto => "Disk Size with LTO",
        }
    }
}

/// How strictly the build validator treats missing artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Accept a build when the log reports success and `Build/` is non-empty,
    /// even if some artifact categories are missing.
    #[default]
    Lenient,
    /// Require all four artifact categories unless the log reports both
    /// success and a generated file count.
    Strict,
}

/// Commit message kinds understood by [`super::Config::commit_message`].
pub mod commit_kind {
    pub const PACKAGE_UPDATE: &str = "package_update";
    pub const SYSTEM_MANAGER_UPDATE: &str = "system_manager_update";
    pub const WEBGL_BUILD: &str = "webgl_build";
    pub const AUTO_GENERAL: &str = "auto_general";
    pub const BATCH_PROCESS: &str = "batch_process";
    pub const FULL_AUTOMATION: &str = "full_automation";
}

/// Default commit message templates keyed by kind.
pub fn default_commit_messages() -> BTreeMap<String, String> {
    [
        (
            commit_kind::PACKAGE_UPDATE,
            "FEAT: Update Unity packages and apply automated settings",
        ),
        (
            commit_kind::SYSTEM_MANAGER_UPDATE,
            "FEAT: Add SystemManager methods and extend functionality",
        ),
        (
            commit_kind::WEBGL_BUILD,
            "BUILD: Configure WebGL build and generate output files",
        ),
        (
            commit_kind::AUTO_GENERAL,
            "CHORE: Project update via automation toolkit",
        ),
        (
            commit_kind::BATCH_PROCESS,
            "CHORE: Complete Unity batch-mode processing",
        ),
        (
            commit_kind::FULL_AUTOMATION,
            "FEAT: Full automation pass (packages + settings + build)",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Default Git packages injected into every manifest.
pub fn default_git_packages() -> BTreeMap<String, String> {
    let mut packages = BTreeMap::new();
    packages.insert(
        "com.dannect.toolkit".to_string(),
        "https://github.com/Dannect/SimGround_Package.git".to_string(),
    );
    packages
}

/// Default file-name globs for UTF-8 conversion.
pub fn default_utf8_file_globs() -> Vec<String> {
    vec!["*.cs".to_string()]
}

/// Default directory names skipped while walking `Assets/`.
pub fn default_excluded_dirs() -> Vec<String> {
    ["Library", "Temp", "Logs", "obj", "bin"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Default SystemManager catalog methods inserted by `--add-system-methods`.
pub fn default_system_manager_methods() -> Vec<String> {
    vec!["AllowKeyboardInput".to_string()]
}

pub(super) fn default_git_base_url() -> String {
    "https://github.com/Dannect/".to_string()
}
pub(super) fn default_default_branch() -> String {
    "main".to_string()
}
pub(super) fn default_fallback_branch() -> String {
    "dev".to_string()
}
pub(super) fn default_remote() -> String {
    "origin".to_string()
}
pub(super) fn default_unity_timeout_secs() -> u64 {
    300
}
pub(super) fn default_build_timeout_secs() -> u64 {
    7200
}
pub(super) fn default_build_output_dir() -> PathBuf {
    PathBuf::from("Build")
}
pub(super) fn default_max_workers() -> usize {
    4
}
pub(super) fn default_progress_interval_secs() -> u64 {
    60
}

/// Unity Editor version the default paths point at.
const DEFAULT_UNITY_VERSION: &str = "6000.0.59f2";

pub(super) fn default_unity_editor_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(format!(
            r"C:\Program Files\Unity\Hub\Editor\{}\Editor\Unity.exe",
            DEFAULT_UNITY_VERSION
        ))
    } else if cfg!(target_os = "macos") {
        PathBuf::from(format!(
            "/Applications/Unity/Hub/Editor/{}/Unity.app/Contents/MacOS/Unity",
            DEFAULT_UNITY_VERSION
        ))
    } else {
        PathBuf::from(format!(
            "/opt/unity/hub/editor/{}/Editor/Unity",
            DEFAULT_UNITY_VERSION
        ))
    }
}

pub(super) fn default_unity_search_roots() -> Vec<PathBuf> {
    let roots: &[&str] = if cfg!(windows) {
        &[
            r"C:\Program Files\Unity\Hub\Editor",
            r"C:\Program Files\Unity\Editor",
            r"C:\Program Files (x86)\Unity\Hub\Editor",
            r"C:\Program Files (x86)\Unity\Editor",
        ]
    } else if cfg!(target_os = "macos") {
        &["/Applications/Unity/Hub/Editor"]
    } else {
        &["/opt/unity/hub/editor", "/opt/unity/editor"]
    };
    roots.iter().map(PathBuf::from).collect()
}
