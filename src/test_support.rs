use crate::config::Config;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Base timestamp for commits made by the helpers below.
pub(crate) const BASE_TIME: i64 = 1_700_000_000;

/// Config with a commit identity, so tests don't depend on global git config.
pub(crate) fn test_config() -> Config {
    Config {
        git_user_name: Some("Test User".to_string()),
        git_user_email: Some("test@example.com".to_string()),
        ..Config::default()
    }
}

/// A repository on `main` with a single commit.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    init_repo(temp_dir.path());
    temp_dir
}

/// Initialize `path` as a repository on `main` with one commit at [`BASE_TIME`].
pub(crate) fn init_repo(path: &Path) {
    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    commit_file(path, "README.md", "# Test\n", BASE_TIME);
}

/// Write a file and commit it with both author and committer dates set.
pub(crate) fn commit_file(repo: &Path, name: &str, content: &str, unix_time: i64) {
    if let Some(parent) = Path::new(name).parent() {
        std::fs::create_dir_all(repo.join(parent)).unwrap();
    }
    std::fs::write(repo.join(name), content).unwrap();
    git(repo, &["add", "."]);

    let date = format!("@{} +0000", unix_time);
    run(
        repo,
        &["commit", "-m", &format!("Add {}", name)],
        &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
    );
}

/// Create `branch` from the current HEAD with `commits` extra commits.
///
/// The last commit is dated `last_time`; earlier ones are one second apart
/// before it. The repository is switched back to `main` afterwards.
pub(crate) fn create_branch_with_commits(
    repo: &Path,
    branch: &str,
    commits: usize,
    last_time: i64,
) {
    git(repo, &["checkout", "-q", "-b", branch]);
    for i in 0..commits {
        let time = last_time - (commits - 1 - i) as i64;
        let file = format!("{}-{}.txt", branch.replace('/', "_"), i);
        commit_file(repo, &file, &format!("{} {}\n", branch, i), time);
    }
    git(repo, &["checkout", "-q", "main"]);
}

/// Create a bare repository, register it as `origin` and push `main` to it.
pub(crate) fn add_bare_origin(repo: &Path) -> TempDir {
    let remote = TempDir::new().unwrap();
    git(remote.path(), &["init", "--bare"]);
    let url = remote.path().to_string_lossy().to_string();
    git(repo, &["remote", "add", "origin", &url]);
    git(repo, &["push", "-q", "-u", "origin", "main"]);
    remote
}

/// Create a minimal Unity project (`Assets/`, `ProjectSettings/`) under `parent`.
pub(crate) fn create_unity_project(parent: &Path, name: &str) -> PathBuf {
    let project = parent.join(name);
    std::fs::create_dir_all(project.join("Assets")).unwrap();
    std::fs::create_dir_all(project.join("ProjectSettings")).unwrap();
    std::fs::write(
        project.join("ProjectSettings").join("ProjectSettings.asset"),
        "%YAML 1.1\n",
    )
    .unwrap();
    project
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) -> String {
    run(repo_dir, args, &[])
}

fn run(repo_dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> String {
    let mut command = Command::new("git");
    command.current_dir(repo_dir).args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Write an executable `/bin/sh` script standing in for the Unity Editor.
///
/// `body` runs with the Editor's argv. The helper executes the script once
/// with `--probe` until the kernel stops reporting it busy, so a freshly
/// written file never fails to launch with ETXTBSY when other tests fork.
#[cfg(unix)]
pub(crate) fn fake_editor(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("FakeUnity");
    let script = format!("#!/bin/sh\n[ \"$1\" = \"--probe\" ] && exit 0\n{}\n", body);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..50 {
        match Command::new(&path).arg("--probe").status() {
            Ok(_) => return path,
            Err(e) if e.raw_os_error() == Some(26) => {
                std::thread::sleep(std::time::Duration::from_millis(20))
            }
            Err(e) => panic!("failed to run fake editor: {}", e),
        }
    }
    panic!("fake editor stayed busy");
}
