//! Project paths and discovery.

use crate::config::Config;
use std::path::{Path, PathBuf};

/// A configured project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub path: PathBuf,
    pub name: String,
}

impl Project {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = project_name(&path);
        Self { path, name }
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn is_git_repository(&self) -> bool {
        crate::git::is_git_repository(&self.path)
    }

    pub fn is_unity_project(&self) -> bool {
        is_unity_project(&self.path)
    }
}

/// Basename of a project path, ignoring trailing separators.
pub fn project_name(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    let trimmed = lossy.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(trimmed)
        .to_string()
}

/// A directory is a Unity project when it has both `ProjectSettings/` and `Assets/`.
pub fn is_unity_project(path: &Path) -> bool {
    path.join("ProjectSettings").is_dir() && path.join("Assets").is_dir()
}

/// Immediate children of `base` that are Unity projects, sorted by name.
pub fn discover_projects(base: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %base.display(), "cannot scan for projects: {}", e);
            return Vec::new();
        }
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_unity_project(path))
        .collect();
    found.sort();
    found
}

/// Configured projects in order: `project_dirs`, then discoveries from
/// `scan_dirs`. Duplicate paths are listed once.
pub fn resolve_projects(config: &Config) -> Vec<Project> {
    let mut paths: Vec<PathBuf> = config.project_dirs.clone();
    for base in &config.scan_dirs {
        paths.extend(discover_projects(base));
    }

    let mut projects: Vec<Project> = Vec::new();
    for path in paths {
        if !projects.iter().any(|p| p.path == path) {
            projects.push(Project::new(path));
        }
    }
    projects
}
