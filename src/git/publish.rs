//! Commit and push of a project's pending changes.

use super::branch::{resolve_target_branch, switch_to_branch};
use super::recovery::{is_index_problem, reset_repository_state, retry_with_recovery};
use super::{initialize_git_repository, is_git_repository, pending_changes, run_git};
use crate::config::Config;
use crate::error::FleetError;
use std::path::Path;
use thiserror::Error;

/// Stage-specific publish failures.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The index stayed unusable after the reset sequence.
    #[error("repository index could not be recovered: {0}")]
    IndexCorruption(String),

    #[error("failed to check out branch '{branch}': {message}")]
    CheckoutFailed { branch: String, message: String },

    #[error("failed to stage changes: {0}")]
    StageFailed(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("push to '{branch}' failed: {message}")]
    PushFailed { branch: String, message: String },

    #[error(transparent)]
    Git(#[from] FleetError),
}

impl From<PublishError> for FleetError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Git(inner) => inner,
            other => FleetError::GitError(other.to_string()),
        }
    }
}

/// What a publish call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The working tree was clean; nothing was committed.
    NoChanges,
    /// A commit was made on `branch`.
    Committed { branch: String, recovered: bool },
    /// A commit was made on `branch` and pushed.
    Pushed { branch: String, recovered: bool },
}

/// Commit all pending changes to the resolved target branch.
///
/// A project that is not yet a repository is initialized first. An empty
/// `git status --porcelain` is a no-op success.
pub fn commit_changes(
    repo: &Path,
    config: &Config,
    message: &str,
) -> Result<PublishOutcome, PublishError> {
    if !is_git_repository(repo) {
        initialize_git_repository(repo, config)?;
    }

    let changes = match pending_changes(repo) {
        Ok(changes) => changes,
        Err(e) => {
            tracing::warn!("git status failed, resetting repository state: {}", e);
            reset_repository_state(repo)
                .and_then(|_| pending_changes(repo))
                .map_err(|e| PublishError::IndexCorruption(e.to_string()))?
        }
    };

    if changes.is_empty() {
        return Ok(PublishOutcome::NoChanges);
    }
    tracing::info!(changes = changes.len(), "pending changes");

    let branch = resolve_target_branch(repo, config);
    let mut recovered =
        switch_to_branch(repo, &branch, &config.remote).map_err(|e| {
            PublishError::CheckoutFailed {
                branch: branch.clone(),
                message: e.to_string(),
            }
        })?;

    let staged = retry_with_recovery(
        || run_git(repo, &["add", "."]),
        is_index_problem,
        || reset_repository_state(repo),
    )
    .map_err(|e| PublishError::StageFailed(e.to_string()))?;
    recovered |= staged.recovered;

    let args = commit_args(config, message);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_git(repo, &args).map_err(|e| PublishError::CommitFailed(e.to_string()))?;

    Ok(PublishOutcome::Committed { branch, recovered })
}

fn commit_args(config: &Config, message: &str) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(name) = &config.git_user_name {
        args.push("-c".to_string());
        args.push(format!("user.name={}", name));
    }
    if let Some(email) = &config.git_user_email {
        args.push("-c".to_string());
        args.push(format!("user.email={}", email));
    }
    args.extend(["commit".to_string(), "-m".to_string(), message.to_string()]);
    args
}

/// Push `branch` to the configured remote with upstream tracking.
///
/// Returns `Ok(false)` when the remote branch already contains `HEAD`.
/// A remote branch that does not exist yet is pushed for the first time.
pub fn push_changes(repo: &Path, config: &Config, branch: &str) -> Result<bool, PublishError> {
    let range = format!("{}/{}..HEAD", config.remote, branch);
    match run_git(repo, &["log", &range, "--oneline"]) {
        Ok(output) if output.is_empty() => {
            tracing::info!(branch, "nothing to push");
            return Ok(false);
        }
        Ok(output) => tracing::info!(branch, commits = output.lines().len(), "unpushed commits"),
        Err(e) => tracing::debug!(branch, "no remote branch yet, first push: {}", e),
    }

    run_git(repo, &["push", "-u", &config.remote, branch]).map_err(|e| {
        PublishError::PushFailed {
            branch: branch.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(true)
}

/// Commit pending changes and push them.
pub fn commit_and_push(
    repo: &Path,
    config: &Config,
    message: &str,
) -> Result<PublishOutcome, PublishError> {
    match commit_changes(repo, config, message)? {
        PublishOutcome::Committed { branch, recovered } => {
            push_changes(repo, config, &branch)?;
            Ok(PublishOutcome::Pushed { branch, recovered })
        }
        outcome => Ok(outcome),
    }
}
