//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::commit_kind;
use crate::error::{FleetError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "simfleet.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(FleetError::ConfigError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            FleetError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the config for this run.
    ///
    /// An explicit path must exist. Without one, `simfleet.yaml` in the
    /// current directory is used when present, otherwise the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| FleetError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    #[cfg(test)]
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            FleetError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - timeouts, the progress interval and `max_workers` must be positive
    /// - branch names must be non-empty and `fallback_branch` must differ
    ///   from `default_branch`
    /// - `unity_extra_args` must split cleanly (balanced quotes)
    /// - `utf8_file_globs` entries must be non-empty
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("unity_timeout_secs", self.unity_timeout_secs),
            ("build_timeout_secs", self.build_timeout_secs),
            ("progress_interval_secs", self.progress_interval_secs),
            ("max_workers", self.max_workers as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(FleetError::ConfigError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        for (name, value) in [
            ("default_branch", &self.default_branch),
            ("fallback_branch", &self.fallback_branch),
            ("remote", &self.remote),
        ] {
            if value.trim().is_empty() {
                return Err(FleetError::ConfigError(format!("{} must not be empty", name)));
            }
        }

        if self.fallback_branch == self.default_branch {
            return Err(FleetError::ConfigError(format!(
                "fallback_branch must differ from default_branch (both are '{}')",
                self.default_branch
            )));
        }

        self.unity_args()?;

        for glob in &self.utf8_file_globs {
            if glob.trim().is_empty() {
                return Err(FleetError::ConfigError(
                    "utf8_file_globs entries must be non-empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// `unity_extra_args` split into argv entries.
    pub fn unity_args(&self) -> Result<Vec<String>> {
        shell_words::split(&self.unity_extra_args).map_err(|e| {
            FleetError::ConfigError(format!(
                "failed to parse unity_extra_args '{}': {}",
                self.unity_extra_args, e
            ))
        })
    }

    /// Commit message for a kind, falling back to `auto_general`.
    pub fn commit_message(&self, kind: &str) -> String {
        self.commit_messages
            .get(kind)
            .or_else(|| self.commit_messages.get(commit_kind::AUTO_GENERAL))
            .cloned()
            .unwrap_or_else(|| "CHORE: automated project update".to_string())
    }

    /// Output directory for one project's WebGL build.
    pub fn project_build_dir(&self, project_name: &str) -> PathBuf {
        self.build_output_dir.join(project_name)
    }

    /// Directory holding the Unity build logs.
    pub fn build_logs_dir(&self) -> PathBuf {
        self.build_output_dir.join("_Logs")
    }

    /// Timeout for a single WebGL build.
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Timeout for a plain batch-mode run.
    pub fn unity_timeout(&self) -> Duration {
        Duration::from_secs(self.unity_timeout_secs)
    }

    /// Interval between build log polls.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}
