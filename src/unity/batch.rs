//! Plain batch-mode runs (`-batchmode -quit -logFile -`).

use super::locate_editor;
use super::process::{collect, drain, spawn, wait_with_timeout};
use super::scripts::write_batch_script;
use crate::config::Config;
use crate::error::{FleetError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of one batch-mode run.
#[derive(Debug)]
pub struct BatchRun {
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Decide a batch run's success from its exit code and captured stdout.
///
/// A non-zero exit still counts as success unless the output mentions an
/// error or exception.
pub fn batch_succeeded(exit_code: Option<i32>, stdout: &str) -> bool {
    match exit_code {
        Some(0) => true,
        Some(_) => {
            let lower = stdout.to_lowercase();
            !lower.contains("error") && !lower.contains("exception")
        }
        None => false,
    }
}

/// Run the Editor in batch mode against `project`.
///
/// A timeout is reported as an unsuccessful run, not an error.
pub fn run_batch_mode(project: &Path, config: &Config) -> Result<BatchRun> {
    if !project.join("ProjectSettings").join("ProjectSettings.asset").is_file() {
        return Err(FleetError::UserError(format!(
            "not a Unity project (ProjectSettings/ProjectSettings.asset missing): {}",
            project.display()
        )));
    }

    let editor = locate_editor(config)?;
    let extra_args = config.unity_args()?;
    write_batch_script(project)?;

    let mut command = Command::new(&editor);
    command
        .arg("-batchmode")
        .arg("-quit")
        .arg("-projectPath")
        .arg(project)
        .arg("-logFile")
        .arg("-")
        .args(&extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::info!(project = %project.display(), "starting Unity batch mode");
    let start = Instant::now();
    let mut child = spawn(&mut command, &editor)?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let (exit_code, timed_out) = wait_with_timeout(&mut child, config.unity_timeout())?;
    let stdout = collect(stdout);
    let stderr = collect(stderr);

    if timed_out {
        tracing::warn!(
            "Unity batch mode timed out after {}s",
            config.unity_timeout_secs
        );
    }
    let success = !timed_out && batch_succeeded(exit_code, &stdout);
    if !success && !stderr.trim().is_empty() {
        eprintln!("{}", stderr.trim_end());
    }

    Ok(BatchRun {
        exit_code,
        timed_out,
        success,
        stdout,
        stderr,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_unity_project;
    use tempfile::TempDir;

    #[test]
    fn zero_exit_is_success() {
        assert!(batch_succeeded(Some(0), "Error: ignored on clean exit"));
    }

    #[test]
    fn nonzero_exit_checks_output() {
        assert!(batch_succeeded(Some(1), "Refreshing assets\nwarning: slow import"));
        assert!(!batch_succeeded(Some(1), "Compiler ERROR in Lab.cs"));
        assert!(!batch_succeeded(Some(1), "NullReferenceException"));
        assert!(!batch_succeeded(None, ""));
    }

    #[test]
    fn non_unity_directory_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            run_batch_mode(temp_dir.path(), &Config::default()),
            Err(FleetError::UserError(ref msg)) if msg.contains("ProjectSettings.asset")
        ));
    }

    #[cfg(unix)]
    mod with_fake_editor {
        use super::*;
        use crate::test_support::fake_editor;

        fn config_for(editor: std::path::PathBuf) -> Config {
            Config {
                unity_editor_path: editor,
                unity_extra_args: "-nographics".to_string(),
                unity_timeout_secs: 30,
                ..Config::default()
            }
        }

        #[test]
        fn batch_run_passes_arguments_and_writes_script() {
            let temp_dir = TempDir::new().unwrap();
            let project = create_unity_project(temp_dir.path(), "Pendulum");
            let editor = fake_editor(temp_dir.path(), "echo \"$@\"");

            let run = run_batch_mode(&project, &config_for(editor)).unwrap();

            assert!(run.success);
            assert_eq!(run.exit_code, Some(0));
            assert_eq!(
                run.stdout.trim(),
                format!("-batchmode -quit -projectPath {} -logFile - -nographics", project.display())
            );
            assert!(
                project
                    .join("Assets/Editor/BatchScripts/AutoBatchProcessor.cs")
                    .is_file()
            );
        }

        #[test]
        fn nonzero_exit_with_exception_fails() {
            let temp_dir = TempDir::new().unwrap();
            let project = create_unity_project(temp_dir.path(), "Circuit");
            let editor = fake_editor(temp_dir.path(), "echo 'Unhandled Exception'\nexit 1");

            let run = run_batch_mode(&project, &config_for(editor)).unwrap();

            assert!(!run.success);
            assert_eq!(run.exit_code, Some(1));
        }

        #[test]
        fn nonzero_exit_with_clean_output_succeeds() {
            let temp_dir = TempDir::new().unwrap();
            let project = create_unity_project(temp_dir.path(), "Lens");
            let editor = fake_editor(temp_dir.path(), "echo 'license check skipped'\nexit 1");

            assert!(run_batch_mode(&project, &config_for(editor)).unwrap().success);
        }
    }
}
