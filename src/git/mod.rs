//! Git command runner and per-project repository operations.
//!
//! Every git invocation goes through [`run_git`]: arguments are passed as an
//! argv array and a non-zero exit status (with stderr) is the only error signal.

mod branch;
mod publish;
mod recovery;

pub use publish::{PublishOutcome, commit_and_push, commit_changes};

use crate::config::Config;
use crate::error::{FleetError, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }

    /// Returns stdout lines as a vector.
    pub fn lines(&self) -> Vec<&str> {
        if self.stdout.is_empty() {
            Vec::new()
        } else {
            self.stdout.lines().collect()
        }
    }
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(FleetError::GitError)` - On launch failure or non-zero exit code
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    tracing::debug!(cwd = %cwd.display(), "git {}", args.join(" "));

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            FleetError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(FleetError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Returns true if `<path>/.git` exists.
pub fn is_git_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Initialize a repository and point `origin` at `<git_base_url><name>`.
///
/// A remote that already exists is left as it is.
pub fn initialize_git_repository(path: &Path, config: &Config) -> Result<()> {
    let name = crate::project::project_name(path);
    run_git(path, &["init"])?;

    let url = format!("{}{}", config.git_base_url, name);
    match run_git(path, &["remote", "add", &config.remote, &url]) {
        Ok(_) => {}
        Err(FleetError::GitError(msg)) if msg.contains("already exists") => {
            tracing::debug!(project = %name, "remote {} already exists", config.remote);
        }
        Err(e) => return Err(e),
    }

    println!("[{}] initialized git repository (remote {})", name, url);
    Ok(())
}

/// Name of the checked-out branch, empty on a detached HEAD.
pub fn current_branch(repo: &Path) -> Result<String> {
    Ok(run_git(repo, &["branch", "--show-current"])?.stdout)
}

/// Lines of `git status --porcelain`, one per pending change.
pub fn pending_changes(repo: &Path) -> Result<Vec<String>> {
    let output = run_git(repo, &["status", "--porcelain"])?;
    Ok(output.lines().into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_repo, git};
    use tempfile::TempDir;

    #[test]
    fn test_run_git_success() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["status"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_git_failure_carries_command_and_stderr() {
        let temp_dir = create_test_repo();
        let err = run_git(temp_dir.path(), &["checkout", "no-such-branch"]).unwrap_err();
        match err {
            FleetError::GitError(msg) => {
                assert!(msg.starts_with("git checkout failed (exit code"));
                assert!(msg.contains("no-such-branch"));
            }
            other => panic!("expected GitError, got {:?}", other),
        }
    }

    #[test]
    fn test_git_output_lines() {
        let output = GitOutput {
            stdout: "A\nB\nC".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.lines(), vec!["A", "B", "C"]);

        let empty = GitOutput {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(empty.is_empty());
        assert!(empty.lines().is_empty());
    }

    #[test]
    fn test_is_git_repository() {
        let repo = create_test_repo();
        assert!(is_git_repository(repo.path()));

        let plain = TempDir::new().unwrap();
        assert!(!is_git_repository(plain.path()));
    }

    #[test]
    fn test_initialize_git_repository_adds_origin() {
        let parent = TempDir::new().unwrap();
        let project = parent.path().join("ScienceLab");
        std::fs::create_dir(&project).unwrap();
        let config = Config::default();

        initialize_git_repository(&project, &config).unwrap();

        assert!(is_git_repository(&project));
        let url = run_git(&project, &["remote", "get-url", "origin"]).unwrap();
        assert_eq!(url.stdout, "https://github.com/Dannect/ScienceLab");
    }

    #[test]
    fn test_initialize_git_repository_tolerates_existing_remote() {
        let parent = TempDir::new().unwrap();
        let project = parent.path().join("Optics");
        std::fs::create_dir(&project).unwrap();
        git(&project, &["init"]);
        git(&project, &["remote", "add", "origin", "https://example.com/other"]);

        initialize_git_repository(&project, &Config::default()).unwrap();

        let url = run_git(&project, &["remote", "get-url", "origin"]).unwrap();
        assert_eq!(url.stdout, "https://example.com/other");
    }

    #[test]
    fn test_current_branch_and_pending_changes() {
        let repo = create_test_repo();
        assert_eq!(current_branch(repo.path()).unwrap(), "main");
        assert!(pending_changes(repo.path()).unwrap().is_empty());

        std::fs::write(repo.path().join("new.txt"), "x").unwrap();
        let changes = pending_changes(repo.path()).unwrap();
        assert_eq!(changes, vec!["?? new.txt".to_string()]);
    }
}
