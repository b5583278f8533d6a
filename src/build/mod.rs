//! WebGL builds across the project fleet.

mod clean;
pub mod monitor;
mod pool;
mod runner;
pub mod validator;

pub use clean::clean_builds;
pub use pool::{clamp_workers, run_pool};
pub use runner::{BuildOutcome, build_project, format_duration};

use crate::config::Config;
use crate::project::Project;
use std::time::{Duration, Instant};

/// Outcomes of a build batch, in project order.
#[derive(Debug)]
pub struct BuildReport {
    pub outcomes: Vec<BuildOutcome>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn print_summary(&self) {
        println!("\n=== WebGL build summary ===");
        println!(
            "Succeeded: {}, failed: {}, total: {}",
            self.succeeded(),
            self.failed(),
            self.outcomes.len()
        );
        println!("Total elapsed: {}", format_duration(self.elapsed));
        for outcome in &self.outcomes {
            let status = if outcome.success { "ok" } else { "FAILED" };
            println!(
                "  {:<6} {} ({})",
                status,
                outcome.name,
                format_duration(outcome.elapsed)
            );
            if let Some(reason) = &outcome.failure {
                println!("         {}", reason);
            }
        }
    }
}

pub fn progress_line(completed: usize, total: usize) -> String {
    let percent = if total == 0 { 100 } else { completed * 100 / total };
    format!("Progress: {}/{} ({}%)", completed, total, percent)
}

/// Build every project, sequentially or on a pool of `workers` threads.
pub fn build_all(projects: &[Project], config: &Config, workers: usize) -> BuildReport {
    build_all_with(projects, workers, |project| build_project(project, config))
}

/// Run `build` for each project. A missing project directory is recorded as
/// a failure with zero duration.
pub fn build_all_with<F>(projects: &[Project], workers: usize, build: F) -> BuildReport
where
    F: Fn(&Project) -> BuildOutcome + Sync,
{
    let started = Instant::now();
    let total = projects.len();
    println!(
        "\n=== WebGL build of {} project(s), {} worker(s) ===",
        total,
        workers.min(total.max(1))
    );

    let outcomes = run_pool(
        projects,
        workers,
        |project| {
            if !project.exists() {
                eprintln!("Project path does not exist: {}", project.path.display());
                return BuildOutcome::failed(
                    &project.name,
                    Duration::ZERO,
                    format!("project path does not exist: {}", project.path.display()),
                );
            }
            build(project)
        },
        |completed, outcome| {
            let status = if outcome.success { "done" } else { "failed" };
            println!("[{}] {} - {}", outcome.name, status, progress_line(completed, total));
        },
    );

    BuildReport {
        outcomes,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(name: &str, success: bool) -> BuildOutcome {
        BuildOutcome {
            name: name.to_string(),
            success,
            elapsed: Duration::from_secs(3),
            failure: (!success).then(|| "validation failed".to_string()),
            log: None,
        }
    }

    #[test]
    fn progress_line_shows_percentage() {
        assert_eq!(progress_line(1, 3), "Progress: 1/3 (33%)");
        assert_eq!(progress_line(3, 3), "Progress: 3/3 (100%)");
    }

    #[test]
    fn missing_projects_fail_without_stopping_the_batch() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("Pendulum");
        std::fs::create_dir_all(&present).unwrap();
        let projects = vec![
            Project::new(temp_dir.path().join("Ghost")),
            Project::new(&present),
        ];

        let report = build_all_with(&projects, 2, |p| outcome(&p.name, true));

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].name, "Ghost");
        assert!(!report.outcomes[0].success);
        assert_eq!(report.outcomes[0].elapsed, Duration::ZERO);
        assert!(report.outcomes[1].success);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn parallel_batch_keeps_project_order() {
        let temp_dir = TempDir::new().unwrap();
        let projects: Vec<Project> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|name| {
                let path = temp_dir.path().join(name);
                std::fs::create_dir_all(&path).unwrap();
                Project::new(path)
            })
            .collect();

        let report = build_all_with(&projects, 3, |p| outcome(&p.name, p.name != "C"));

        let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(report.failed(), 1);
    }
}
