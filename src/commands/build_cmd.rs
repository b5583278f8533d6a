//! WebGL build and build cleanup commands.

use crate::build::{BuildReport, build_all, clean_builds};
use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::project::Project;

/// Build every project and print the summary.
pub fn cmd_build(projects: &[Project], config: &Config, workers: usize) -> Result<()> {
    println!(
        "Code optimization: {}, validation: {:?}",
        config.code_optimization.description(),
        config.validation_policy
    );
    let report = build_all(projects, config, workers);
    report.print_summary();
    report_result(&report)
}

fn report_result(report: &BuildReport) -> Result<()> {
    if report.all_succeeded() {
        Ok(())
    } else {
        Err(FleetError::UserError(format!(
            "WebGL build: {} of {} project(s) failed",
            report.failed(),
            report.outcomes.len()
        )))
    }
}

/// Remove each project's build output.
pub fn cmd_clean_builds(projects: &[Project], config: &Config) -> Result<()> {
    let report = clean_builds(projects, config);
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(FleetError::IoError(format!(
            "failed to remove build output for {} project(s)",
            report.failed.len()
        )))
    }
}
