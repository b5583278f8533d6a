//! CLI argument parsing for simfleet.
//!
//! Uses clap derive macros for declarative argument definitions. Flags
//! select which workflow runs; the workflows themselves live in the
//! `commands` module.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Simfleet: batch maintenance, publishing and WebGL builds for a fleet of
/// Unity projects.
///
/// Without a selector flag every configured project goes through UTF-8
/// conversion, Git package injection and a commit + push to its deepest
/// working branch.
#[derive(Parser, Debug, Default)]
#[command(name = "simfleet")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args([
            "git_only",
            "build_only",
            "unity_batch",
            "clean_builds",
            "add_system_methods",
            "add_hello_world",
        ])
))]
pub struct Cli {
    /// Config file (default: ./simfleet.yaml when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run conversion and package injection without any Git step.
    #[arg(long, conflicts_with_all = ["git_only", "commit_only"])]
    pub skip_git: bool,

    /// Only commit and push pending changes.
    #[arg(long, conflicts_with = "skip_git")]
    pub git_only: bool,

    /// Commit without pushing.
    #[arg(long)]
    pub commit_only: bool,

    /// Only build WebGL players.
    #[arg(long, conflicts_with_all = ["git_only", "build"])]
    pub build_only: bool,

    /// Build WebGL players after publishing.
    #[arg(long)]
    pub build: bool,

    /// Run the Unity Editor in batch mode for every project.
    #[arg(long)]
    pub unity_batch: bool,

    /// Process builds and batch runs on a worker pool.
    #[arg(long)]
    pub parallel: bool,

    /// Worker pool size for --parallel (1-8).
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Remove each project's build output folder.
    #[arg(long)]
    pub clean_builds: bool,

    /// Insert the configured catalog methods into SystemManager classes.
    #[arg(long)]
    pub add_system_methods: bool,

    /// Insert PrintHelloWorld() into SystemManager classes and call it from Start().
    #[arg(long)]
    pub add_hello_world: bool,

    /// Commit message overriding the configured one.
    #[arg(short, long)]
    pub message: Option<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
