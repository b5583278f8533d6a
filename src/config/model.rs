//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for a simfleet run.
///
/// This struct represents the contents of `simfleet.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Projects
    // =========================================================================
    /// Unity project directories to process, in order.
    pub project_dirs: Vec<PathBuf>,

    /// Base directories whose immediate Unity-project children are added
    /// after `project_dirs`.
    pub scan_dirs: Vec<PathBuf>,

    // =========================================================================
    // Git settings
    // =========================================================================
    /// Prefix for remote URLs; the project name is appended.
    #[serde(default = "default_git_base_url")]
    pub git_base_url: String,

    /// Protected branch that is never a commit target (default: "main").
    #[serde(default = "default_default_branch")]
    pub default_branch: String,

    /// Branch used when no other non-default branch exists (default: "dev").
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,

    /// Name of the remote (default: "origin").
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Commit message templates keyed by kind.
    #[serde(default = "default_commit_messages")]
    pub commit_messages: BTreeMap<String, String>,

    /// Author name passed to `git commit`; git's own config applies when unset.
    #[serde(default)]
    pub git_user_name: Option<String>,

    /// Author email passed to `git commit`; git's own config applies when unset.
    #[serde(default)]
    pub git_user_email: Option<String>,

    // =========================================================================
    // Unity settings
    // =========================================================================
    /// Preferred Unity Editor executable.
    #[serde(default = "default_unity_editor_path")]
    pub unity_editor_path: PathBuf,

    /// Install roots searched when `unity_editor_path` does not exist.
    #[serde(default = "default_unity_search_roots")]
    pub unity_search_roots: Vec<PathBuf>,

    /// Timeout for plain batch-mode runs, in seconds.
    #[serde(default = "default_unity_timeout_secs")]
    pub unity_timeout_secs: u64,

    /// Extra Editor arguments, split with shell quoting rules
    /// (e.g. `-username "a b" -nographics`).
    #[serde(default)]
    pub unity_extra_args: String,

    // =========================================================================
    // Build settings
    // =========================================================================
    /// Central build output directory; each project builds into a subfolder.
    #[serde(default = "default_build_output_dir")]
    pub build_output_dir: PathBuf,

    /// Timeout for a single WebGL build, in seconds.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,

    /// WebGL code optimization mode.
    #[serde(default)]
    pub code_optimization: CodeOptimization,

    /// Build artifact validation policy.
    #[serde(default)]
    pub validation_policy: ValidationPolicy,

    /// Worker pool size for parallel runs.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Seconds between build log polls.
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,

    // =========================================================================
    // Source maintenance
    // =========================================================================
    /// Git packages (name -> URL) injected into `Packages/manifest.json`.
    #[serde(default = "default_git_packages")]
    pub git_packages: BTreeMap<String, String>,

    /// File-name globs converted to UTF-8.
    #[serde(default = "default_utf8_file_globs")]
    pub utf8_file_globs: Vec<String>,

    /// Directory names skipped while walking `Assets/`.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Catalog methods inserted into SystemManager classes.
    #[serde(default = "default_system_manager_methods")]
    pub system_manager_methods: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dirs: Vec::new(),
            scan_dirs: Vec::new(),
            git_base_url: default_git_base_url(),
            default_branch: default_default_branch(),
            fallback_branch: default_fallback_branch(),
            remote: default_remote(),
            commit_messages: default_commit_messages(),
            git_user_name: None,
            git_user_email: None,
            unity_editor_path: default_unity_editor_path(),
            unity_search_roots: default_unity_search_roots(),
            unity_timeout_secs: default_unity_timeout_secs(),
            unity_extra_args: String::new(),
            build_output_dir: default_build_output_dir(),
            build_timeout_secs: default_build_timeout_secs(),
            code_optimization: CodeOptimization::default(),
            validation_policy: ValidationPolicy::default(),
            max_workers: default_max_workers(),
            progress_interval_secs: default_progress_interval_secs(),
            git_packages: default_git_packages(),
            utf8_file_globs: default_utf8_file_globs(),
            excluded_dirs: default_excluded_dirs(),
            system_manager_methods: default_system_manager_methods(),
        }
    }
}
