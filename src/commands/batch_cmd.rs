//! `--unity-batch`: run the Editor in batch mode for every project.

use super::summary::BatchSummary;
use crate::build::{format_duration, run_pool};
use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::project::Project;
use crate::unity::run_batch_mode;

fn process(project: &Project, config: &Config) -> Result<()> {
    if !project.exists() {
        return Err(FleetError::UserError(format!(
            "project path does not exist: {}",
            project.path.display()
        )));
    }
    let run = run_batch_mode(&project.path, config)?;
    if run.success {
        println!(
            "[{}] batch mode finished ({})",
            project.name,
            format_duration(run.elapsed)
        );
        Ok(())
    } else if run.timed_out {
        Err(FleetError::UnityError(format!(
            "batch mode timed out after {}s",
            config.unity_timeout_secs
        )))
    } else {
        Err(FleetError::UnityError(match run.exit_code {
            Some(code) => format!("batch mode reported errors (exit code {})", code),
            None => "batch mode was terminated".to_string(),
        }))
    }
}

pub fn cmd_unity_batch(projects: &[Project], config: &Config, workers: usize) -> Result<()> {
    println!(
        "\n=== Unity batch mode for {} project(s), {} worker(s) ===",
        projects.len(),
        workers
    );
    let results = run_pool(
        projects,
        workers,
        |project| process(project, config),
        |completed, _| println!("Progress: {}/{}", completed, projects.len()),
    );

    let mut summary = BatchSummary::new("Unity batch mode");
    for (project, result) in projects.iter().zip(results) {
        summary.record(&project.name, result);
    }
    summary.print();
    summary.into_result()
}
