//! Target branch selection.
//!
//! Commits never go to the default branch. Among the other branches, the one
//! "deepest" in the implicit branch chain is chosen: most commits, then most
//! recent commit, then first listed.

use super::recovery::{is_index_problem, reset_repository_state, retry_with_recovery};
use super::run_git;
use crate::config::Config;
use crate::error::{FleetError, Result};
use std::path::Path;

/// Commit depth and recency of a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchStats {
    pub commit_count: u64,
    pub last_commit_time: i64,
}

/// Parse the output of `git branch -a` into branch names.
///
/// Current-branch markers and a `remotes/<remote>/` prefix are stripped,
/// symbolic `HEAD -> ...` entries and detached-HEAD lines are dropped, and
/// duplicates are removed keeping the first occurrence.
pub fn parse_branch_listing(stdout: &str, remote: &str) -> Vec<String> {
    let remote_prefix = format!("remotes/{}/", remote);
    let mut branches: Vec<String> = Vec::new();

    for line in stdout.lines() {
        let mut name = line.trim();
        if let Some(rest) = name.strip_prefix("* ").or_else(|| name.strip_prefix("+ ")) {
            name = rest.trim();
        }
        if name.is_empty() || name.starts_with('(') || name.contains("HEAD ->") {
            continue;
        }
        let name = name.strip_prefix(&remote_prefix).unwrap_or(name);
        if !branches.iter().any(|b| b == name) {
            branches.push(name.to_string());
        }
    }

    branches
}

/// All local and remote branch names. Failures yield an empty list.
pub fn list_branches(repo: &Path, remote: &str) -> Vec<String> {
    match run_git(repo, &["branch", "-a"]) {
        Ok(output) => parse_branch_listing(&output.stdout, remote),
        Err(e) => {
            tracing::warn!("could not list branches: {}", e);
            Vec::new()
        }
    }
}

/// Commit count and last commit time of `branch`.
///
/// The name is tried as given and then as `<remote>/<branch>`. A failing
/// count query yields all zeros; a failing time query yields a zero time.
pub fn branch_stats(repo: &Path, branch: &str, remote: &str) -> BranchStats {
    let remote_ref = format!("{}/{}", remote, branch);

    let commit_count = match query_commit_count(repo, branch)
        .or_else(|_| query_commit_count(repo, &remote_ref))
    {
        Ok(count) => count,
        Err(e) => {
            tracing::debug!(branch, "commit count unavailable: {}", e);
            return BranchStats::default();
        }
    };

    let last_commit_time = query_last_commit_time(repo, branch)
        .or_else(|_| query_last_commit_time(repo, &remote_ref))
        .unwrap_or_else(|e| {
            tracing::debug!(branch, "last commit time unavailable: {}", e);
            0
        });

    BranchStats {
        commit_count,
        last_commit_time,
    }
}

fn query_commit_count(repo: &Path, rev: &str) -> Result<u64> {
    let output = run_git(repo, &["rev-list", "--count", rev])?;
    output
        .stdout
        .parse()
        .map_err(|_| FleetError::GitError(format!("unexpected commit count '{}'", output.stdout)))
}

fn query_last_commit_time(repo: &Path, rev: &str) -> Result<i64> {
    let output = run_git(repo, &["log", "-1", "--format=%ct", rev])?;
    output
        .stdout
        .parse()
        .map_err(|_| FleetError::GitError(format!("unexpected commit time '{}'", output.stdout)))
}

/// Pick the deepest candidate, never `default_branch`.
///
/// Higher commit count wins, then the later last commit. On an exact tie
/// the earlier candidate is kept.
pub fn pick_deepest(candidates: &[(String, BranchStats)], default_branch: &str) -> Option<String> {
    let mut best: Option<&(String, BranchStats)> = None;
    for candidate in candidates {
        if candidate.0 == default_branch {
            continue;
        }
        if best.is_none_or(|(_, stats)| candidate.1 > *stats) {
            best = Some(candidate);
        }
    }
    best.map(|(name, _)| name.clone())
}

/// Compute stats for every non-default branch and pick the deepest.
pub fn find_deepest_branch(
    repo: &Path,
    branches: &[String],
    default_branch: &str,
    remote: &str,
) -> Option<String> {
    let candidates: Vec<(String, BranchStats)> = branches
        .iter()
        .filter(|b| b.as_str() != default_branch)
        .map(|b| (b.clone(), branch_stats(repo, b, remote)))
        .collect();

    for (name, stats) in &candidates {
        tracing::info!(
            branch = %name,
            commits = stats.commit_count,
            last_commit = stats.last_commit_time,
            "branch candidate"
        );
    }

    pick_deepest(&candidates, default_branch)
}

/// The branch this repository's changes should be committed to.
///
/// Falls back to `fallback_branch` when no non-default branch exists.
pub fn resolve_target_branch(repo: &Path, config: &Config) -> String {
    let branches = list_branches(repo, &config.remote);
    match find_deepest_branch(repo, &branches, &config.default_branch, &config.remote) {
        Some(branch) => branch,
        None => {
            tracing::info!(
                "no branch besides '{}', using '{}'",
                config.default_branch,
                config.fallback_branch
            );
            config.fallback_branch.clone()
        }
    }
}

/// Returns true if a local branch with this name exists.
pub fn branch_exists(repo: &Path, branch: &str) -> bool {
    let reference = format!("refs/heads/{}", branch);
    run_git(repo, &["show-ref", "--verify", "--quiet", &reference]).is_ok()
}

fn remote_branch_exists(repo: &Path, remote: &str, branch: &str) -> bool {
    let reference = format!("refs/remotes/{}/{}", remote, branch);
    run_git(repo, &["show-ref", "--verify", "--quiet", &reference]).is_ok()
}

fn checkout_args(repo: &Path, branch: &str, remote: &str, force: bool) -> Vec<String> {
    let mut args = vec!["checkout".to_string()];
    if force {
        args.push("-f".to_string());
    }
    if branch_exists(repo, branch) {
        args.push(branch.to_string());
    } else if remote_branch_exists(repo, remote, branch) {
        args.extend([
            "-b".to_string(),
            branch.to_string(),
            "--track".to_string(),
            format!("{}/{}", remote, branch),
        ]);
    } else {
        args.extend(["-b".to_string(), branch.to_string()]);
    }
    args
}

fn checkout(repo: &Path, branch: &str, remote: &str, force: bool) -> Result<()> {
    let args = checkout_args(repo, branch, remote, force);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_git(repo, &args).map(|_| ())
}

/// Check out `branch`, creating it (tracking the remote branch if one
/// exists) when there is no local branch of that name.
///
/// An index-type failure triggers one reset and retry; a retry that still
/// fails makes a final forced checkout. Returns whether recovery was needed.
pub fn switch_to_branch(repo: &Path, branch: &str, remote: &str) -> Result<bool> {
    if let Ok(current) = super::current_branch(repo) {
        tracing::debug!(from = %current, to = branch, "switching branch");
    }
    switch_with(
        branch,
        |force| checkout(repo, branch, remote, force),
        || reset_repository_state(repo),
    )
}

/// Recovery sequence of [`switch_to_branch`] over a `checkout(force)` step.
fn switch_with<C, R>(branch: &str, mut checkout: C, recover: R) -> Result<bool>
where
    C: FnMut(bool) -> Result<()>,
    R: FnOnce() -> Result<()>,
{
    let mut attempt = 0;
    let result = retry_with_recovery(
        || {
            attempt += 1;
            let result = checkout(false);
            if attempt > 1
                && let Err(e) = &result
            {
                tracing::warn!(branch, "checkout retry failed, forcing: {}", e);
                return checkout(true);
            }
            result
        },
        is_index_problem,
        recover,
    )?;
    Ok(result.recovered)
}
