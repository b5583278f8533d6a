//! Command implementations for simfleet.
//!
//! This module turns the parsed flags into a [`Mode`] and routes it to the
//! workflow that implements it. Every workflow runs over the configured
//! project list and reports failures per project.

mod batch_cmd;
mod build_cmd;
mod patch_cmd;
mod pipeline;
mod summary;

use crate::build::clamp_workers;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::project::resolve_projects;
use pipeline::{GitStep, Steps};

/// The workflow selected by the command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Maintenance steps, optionally followed by WebGL builds.
    Pipeline { steps: Steps, build: bool },
    /// Commit (and push) only.
    GitOnly(GitStep),
    BuildOnly,
    UnityBatch,
    CleanBuilds,
    AddSystemMethods,
    AddHelloWorld,
}

impl Mode {
    pub fn from_cli(cli: &Cli) -> Self {
        let git_step = if cli.commit_only {
            GitStep::Commit
        } else {
            GitStep::Push
        };

        if cli.clean_builds {
            Mode::CleanBuilds
        } else if cli.add_system_methods {
            Mode::AddSystemMethods
        } else if cli.add_hello_world {
            Mode::AddHelloWorld
        } else if cli.unity_batch {
            Mode::UnityBatch
        } else if cli.build_only {
            Mode::BuildOnly
        } else if cli.git_only {
            Mode::GitOnly(git_step)
        } else {
            Mode::Pipeline {
                steps: Steps {
                    convert: true,
                    packages: true,
                    git: (!cli.skip_git).then_some(git_step),
                },
                build: cli.build,
            }
        }
    }
}

/// Pool size: 1 unless `--parallel`, then `--max-workers` or the config value.
pub fn worker_count(cli: &Cli, config: &Config) -> usize {
    if !cli.parallel {
        if cli.max_workers.is_some() {
            tracing::info!("--max-workers has no effect without --parallel");
        }
        return 1;
    }
    clamp_workers(cli.max_workers.unwrap_or(config.max_workers))
}

/// Dispatch the parsed command line.
///
/// Returns an error when configuration fails or any project failed.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    let projects = resolve_projects(&config);
    if projects.is_empty() {
        return Err(FleetError::UserError(
            "no projects configured; set project_dirs or scan_dirs in the config file".to_string(),
        ));
    }

    let mode = Mode::from_cli(&cli);
    let workers = worker_count(&cli, &config);
    let message = cli.message.as_deref();
    tracing::info!(?mode, projects = projects.len(), workers, "starting");

    match mode {
        Mode::Pipeline { steps, build } => {
            let summary = pipeline::run(&projects, &config, steps, message);
            summary.print();
            if build {
                let built = build_cmd::cmd_build(&projects, &config, workers);
                summary.into_result()?;
                built
            } else {
                summary.into_result()
            }
        }
        Mode::GitOnly(git) => {
            let summary = pipeline::run(&projects, &config, Steps::publish_only(git), message);
            summary.print();
            summary.into_result()
        }
        Mode::BuildOnly => build_cmd::cmd_build(&projects, &config, workers),
        Mode::UnityBatch => batch_cmd::cmd_unity_batch(&projects, &config, workers),
        Mode::CleanBuilds => build_cmd::cmd_clean_builds(&projects, &config),
        Mode::AddSystemMethods => patch_cmd::cmd_add_system_methods(&projects, &config, message),
        Mode::AddHelloWorld => patch_cmd::cmd_add_hello_world(&projects, &config, message),
    }
}
