//! `--add-system-methods` and `--add-hello-world`.
//!
//! Patched projects are committed to their target branch without pushing.

use super::pipeline::{GitStep, publish_step};
use super::summary::BatchSummary;
use crate::config::{Config, commit_kind};
use crate::error::{FleetError, Result};
use crate::project::Project;
use crate::system_manager::{Patch, patch_project};

const HELLO_WORLD_MESSAGE: &str = "FEAT: Add PrintHelloWorld to SystemManager and call it from Start()";

pub fn cmd_add_system_methods(
    projects: &[Project],
    config: &Config,
    message: Option<&str>,
) -> Result<()> {
    let message = message
        .map(str::to_string)
        .unwrap_or_else(|| config.commit_message(commit_kind::SYSTEM_MANAGER_UPDATE));
    run(
        projects,
        config,
        Patch::Methods(&config.system_manager_methods),
        &message,
        "SystemManager methods",
    )
}

pub fn cmd_add_hello_world(
    projects: &[Project],
    config: &Config,
    message: Option<&str>,
) -> Result<()> {
    let message = message.unwrap_or(HELLO_WORLD_MESSAGE);
    run(projects, config, Patch::HelloWorld, message, "SystemManager Hello World")
}

fn run(
    projects: &[Project],
    config: &Config,
    patch: Patch<'_>,
    message: &str,
    title: &str,
) -> Result<()> {
    let mut summary = BatchSummary::new(title);
    for project in projects {
        println!("\n{}", project.name);
        summary.record(&project.name, patch_and_commit(project, config, patch, message));
    }
    summary.print();
    summary.into_result()
}

pub fn patch_and_commit(
    project: &Project,
    config: &Config,
    patch: Patch<'_>,
    message: &str,
) -> Result<()> {
    if !project.exists() {
        return Err(FleetError::UserError(format!(
            "project path does not exist: {}",
            project.path.display()
        )));
    }

    let report = patch_project(&project.path, config, patch)?;
    if report.files.is_empty() && report.failed.is_empty() {
        println!("No SystemManager.cs found");
    }
    for (path, file) in &report.files {
        for added in &file.added {
            println!("Added {} to {}", added, path.display());
        }
        for skipped in &file.skipped {
            println!("Already present: {} in {}", skipped, path.display());
        }
    }
    for (path, reason) in &report.failed {
        eprintln!("  {}: {}", path.display(), reason);
    }

    if report.changed() {
        publish_step(project, config, GitStep::Commit, message)?;
    }
    if !report.failed.is_empty() {
        return Err(FleetError::UserError(format!(
            "{} SystemManager file(s) could not be patched",
            report.failed.len()
        )));
    }
    Ok(())
}
