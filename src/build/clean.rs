//! Removal of per-project build output.

use crate::config::Config;
use crate::fs::{dir_size, format_bytes};
use crate::project::Project;

#[derive(Debug, Default)]
pub struct CleanReport {
    /// Project name and bytes freed.
    pub removed: Vec<(String, u64)>,
    /// Projects with no build output to remove.
    pub absent: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl CleanReport {
    pub fn freed(&self) -> u64 {
        self.removed.iter().map(|(_, bytes)| bytes).sum()
    }
}

/// Remove `<build_output_dir>/<project>` for every project.
pub fn clean_builds(projects: &[Project], config: &Config) -> CleanReport {
    let mut report = CleanReport::default();

    for project in projects {
        let dir = config.project_build_dir(&project.name);
        if !dir.exists() {
            report.absent.push(project.name.clone());
            continue;
        }

        let size = dir_size(&dir);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                println!(
                    "Removed build output: {} ({})",
                    project.name,
                    format_bytes(size)
                );
                report.removed.push((project.name.clone(), size));
            }
            Err(e) => {
                eprintln!("Failed to remove {}: {}", dir.display(), e);
                report.failed.push((project.name.clone(), e.to_string()));
            }
        }
    }

    println!(
        "Cleaned {} build folder(s), freed {}",
        report.removed.len(),
        format_bytes(report.freed())
    );
    report
}
