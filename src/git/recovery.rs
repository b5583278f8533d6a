//! Reset-and-retry recovery for transient repository-state failures.

use super::run_git;
use crate::error::{FleetError, Result};
use std::fmt::Display;
use std::path::Path;

/// Stderr fragments that identify a failure the reset sequence can clear.
const INDEX_PROBLEM_MARKERS: &[&str] = &[
    "index",
    "resolve",
    "untracked working tree files",
    "would be overwritten",
];

/// A value produced by [`retry_with_recovery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered<T> {
    pub value: T,
    /// True when the value came from the retry after recovery.
    pub recovered: bool,
}

/// Returns true if a git failure looks like index or working-tree state
/// that [`reset_repository_state`] can clear.
pub fn is_index_problem(err: &FleetError) -> bool {
    match err {
        FleetError::GitError(msg) => {
            let msg = msg.to_lowercase();
            INDEX_PROBLEM_MARKERS.iter().any(|marker| msg.contains(marker))
        }
        _ => false,
    }
}

/// Run `op`; on a recoverable failure run `recover` once and retry `op` once.
///
/// Non-recoverable failures are returned as-is without running `recover`.
/// If `recover` itself fails, the original failure is returned.
pub fn retry_with_recovery<T, E, Op, Check, Recover>(
    mut op: Op,
    is_recoverable: Check,
    recover: Recover,
) -> std::result::Result<Recovered<T>, E>
where
    E: Display,
    Op: FnMut() -> std::result::Result<T, E>,
    Check: Fn(&E) -> bool,
    Recover: FnOnce() -> std::result::Result<(), E>,
{
    match op() {
        Ok(value) => Ok(Recovered {
            value,
            recovered: false,
        }),
        Err(err) if is_recoverable(&err) => {
            tracing::warn!("recoverable failure, resetting and retrying: {}", err);
            if let Err(recover_err) = recover() {
                tracing::warn!("recovery failed: {}", recover_err);
                return Err(err);
            }
            op().map(|value| Recovered {
                value,
                recovered: true,
            })
        }
        Err(err) => Err(err),
    }
}

/// Bring a working copy back to a clean index.
///
/// Aborts any in-progress merge or rebase, removes untracked files and
/// resets the index. When `git reset` fails, falls back to
/// `git reset --hard HEAD` followed by another clean.
pub fn reset_repository_state(repo: &Path) -> Result<()> {
    for args in [&["merge", "--abort"][..], &["rebase", "--abort"][..]] {
        if let Err(e) = run_git(repo, args) {
            tracing::debug!("{} skipped: {}", args.join(" "), e);
        }
    }

    if let Err(e) = run_git(repo, &["clean", "-fd"]) {
        tracing::warn!("git clean failed: {}", e);
    }

    if let Err(e) = run_git(repo, &["reset"]) {
        tracing::warn!("git reset failed, falling back to hard reset: {}", e);
        run_git(repo, &["reset", "--hard", "HEAD"])?;
        run_git(repo, &["clean", "-fd"])?;
    }

    Ok(())
}
