//! One WebGL build: generate the script, run Unity, validate the output.

use super::monitor::ProgressMonitor;
use super::validator::{BuildValidationResult, validate_build_output};
use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::fs::{dir_size, format_bytes};
use crate::project::Project;
use crate::unity::process::{spawn, wait_with_timeout};
use crate::unity::{BUILD_METHOD, locate_editor, remove_build_script, write_build_script};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Log lines printed when a build fails.
const FAILURE_TAIL_LINES: usize = 50;

const RULE: &str = "================================================================================";

/// Result of building one project.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub name: String,
    pub success: bool,
    pub elapsed: Duration,
    pub failure: Option<String>,
    pub log: Option<PathBuf>,
}

impl BuildOutcome {
    pub fn failed(name: &str, elapsed: Duration, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            elapsed,
            failure: Some(reason.into()),
            log: None,
        }
    }
}

/// `1m 5s`, or `42s` under a minute.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// `<build_output_dir>/_Logs/<project>_<YYYYmmdd_HHMMSS>.log`
pub fn build_log_path(config: &Config, project_name: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    config
        .build_logs_dir()
        .join(format!("{}_{}.log", project_name, timestamp))
}

/// The last `count` lines of a log, decoded lossily.
pub fn log_tail(log: &Path, count: usize) -> Vec<String> {
    let Ok(bytes) = std::fs::read(log) else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(count);
    lines[skip..].iter().map(|l| l.to_string()).collect()
}

fn print_log_tail(log: &Path, heading: &str) {
    let tail = log_tail(log, FAILURE_TAIL_LINES);
    if tail.is_empty() {
        return;
    }
    println!("\n{}\n{}\n{}", RULE, heading, RULE);
    for line in tail {
        println!("{}", line);
    }
    println!("{}", RULE);
}

/// Append a `TIMEOUT ERROR` block to the build log.
pub fn append_timeout_block(log: &Path, message: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .map_err(|e| FleetError::io("open", log, e))?;
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    write!(
        file,
        "\n{rule}\nTIMEOUT ERROR: {message}\nTimestamp: {timestamp}\n{rule}\n",
        rule = RULE
    )
    .map_err(|e| FleetError::io("write", log, e))
}

/// Build one project. Never fails: errors become a failed outcome.
///
/// The generated build script is removed whatever the result.
pub fn build_project(project: &Project, config: &Config) -> BuildOutcome {
    let started = Instant::now();
    println!("\n--- {} WebGL build started ---", project.name);

    let result = run_webgl_build(project, config, started);

    let removed = remove_build_script(&project.path);
    if !removed.is_empty() {
        let names: Vec<String> = removed
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        println!("Removed temporary build script: {}", names.join(", "));
    }

    result.unwrap_or_else(|e| {
        eprintln!("[{}] {}", project.name, e);
        BuildOutcome::failed(&project.name, started.elapsed(), e.to_string())
    })
}

fn run_webgl_build(project: &Project, config: &Config, started: Instant) -> Result<BuildOutcome> {
    let editor = locate_editor(config)?;
    let extra_args = config.unity_args()?;

    let build_dir = absolute(&config.project_build_dir(&project.name))?;
    std::fs::create_dir_all(&build_dir)
        .map_err(|e| FleetError::io("create build directory", &build_dir, e))?;
    let logs_dir = config.build_logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .map_err(|e| FleetError::io("create log directory", &logs_dir, e))?;
    let log = absolute(&build_log_path(config, &project.name))?;

    write_build_script(&project.path, &build_dir, config.code_optimization)?;

    let mut command = Command::new(&editor);
    command
        .arg("-batchmode")
        .arg("-quit")
        .arg("-projectPath")
        .arg(&project.path)
        .arg("-buildTarget")
        .arg("WebGL")
        .arg("-executeMethod")
        .arg(BUILD_METHOD)
        .arg("-logFile")
        .arg(&log)
        .args(&extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    println!(
        "Running Unity WebGL build ({}, timeout {}s)",
        config.code_optimization.description(),
        config.build_timeout_secs
    );
    tracing::info!(project = %project.name, log = %log.display(), "starting WebGL build");

    let mut child = spawn(&mut command, &editor)?;
    let monitor = ProgressMonitor::start(&project.name, &log, config.progress_interval(), started);
    let waited = wait_with_timeout(&mut child, config.build_timeout());
    monitor.stop();
    let (exit_code, timed_out) = waited?;
    let elapsed = started.elapsed();

    let mut outcome = BuildOutcome {
        name: project.name.clone(),
        success: false,
        elapsed,
        failure: None,
        log: Some(log.clone()),
    };

    if timed_out {
        let message = format!(
            "Unity WebGL build timed out: {} (exceeded {}s, elapsed {})",
            project.name,
            config.build_timeout_secs,
            format_duration(elapsed)
        );
        println!("FAILED: {}", message);
        if let Err(e) = append_timeout_block(&log, &message) {
            tracing::warn!("failed to record timeout in build log: {}", e);
        }
        print_log_tail(&log, "Log before timeout (last 50 lines):");
        outcome.failure = Some(message);
        return Ok(outcome);
    }

    tracing::debug!(project = %project.name, ?exit_code, "Unity exited");
    let validation = validate_build_output(&build_dir, Some(&log), config.validation_policy);
    if validation.valid {
        report_success(project, &build_dir, &validation, elapsed);
        outcome.success = true;
    } else {
        report_failure(project, &build_dir, &validation, exit_code, elapsed);
        print_log_tail(&log, "Build log (last 50 lines):");
        outcome.failure = Some(format!(
            "build validation failed, missing: {}",
            validation.missing.join(", ")
        ));
    }
    Ok(outcome)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| FleetError::io("resolve", path, e))
}

fn report_success(
    project: &Project,
    build_dir: &Path,
    validation: &BuildValidationResult,
    elapsed: Duration,
) {
    println!(
        "WebGL build succeeded: {} ({})",
        project.name,
        format_duration(elapsed)
    );
    for found in &validation.found {
        println!("   + {}", found);
    }
    let build_folder = build_dir.join("Build");
    if build_folder.is_dir() {
        println!("   Build size: {}", format_bytes(dir_size(&build_folder)));
    }
}

fn report_failure(
    project: &Project,
    build_dir: &Path,
    validation: &BuildValidationResult,
    exit_code: Option<i32>,
    elapsed: Duration,
) {
    let code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
    println!(
        "WebGL build failed: {} (exit code {}, {})",
        project.name,
        code,
        format_duration(elapsed)
    );
    println!("   Missing: {}", validation.missing.join(", "));

    let build_folder = build_dir.join("Build");
    if let Ok(entries) = std::fs::read_dir(&build_folder) {
        for entry in entries.filter_map(|e| e.ok()) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            println!(
                "      - {} ({})",
                entry.file_name().to_string_lossy(),
                format_bytes(size)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn durations_format_with_minutes_when_needed() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "60m 0s");
    }

    #[test]
    fn log_path_is_timestamped_under_logs_dir() {
        let config = Config {
            build_output_dir: PathBuf::from("/builds"),
            ..Config::default()
        };
        let path = build_log_path(&config, "Pendulum");
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(path.parent().unwrap(), Path::new("/builds/_Logs"));
        assert!(name.starts_with("Pendulum_"));
        assert!(name.ends_with(".log"));
        // Pendulum_YYYYmmdd_HHMMSS.log
        assert_eq!(name.len(), "Pendulum_".len() + 15 + ".log".len());
    }

    #[test]
    fn log_tail_returns_last_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("build.log");
        let content: String = (1..=60).map(|i| format!("line {}\n", i)).collect();
        std::fs::write(&log, content).unwrap();

        let tail = log_tail(&log, 50);
        assert_eq!(tail.len(), 50);
        assert_eq!(tail[0], "line 11");
        assert_eq!(tail[49], "line 60");
        assert!(log_tail(&temp_dir.path().join("missing.log"), 50).is_empty());
    }

    #[test]
    fn timeout_block_is_appended() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("build.log");
        std::fs::write(&log, "Building player\n").unwrap();

        append_timeout_block(&log, "Unity WebGL build timed out: Lab").unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.starts_with("Building player\n\n===="));
        assert!(content.contains("TIMEOUT ERROR: Unity WebGL build timed out: Lab\n"));
        assert!(content.contains("Timestamp: "));
    }

    #[test]
    fn missing_editor_fails_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::new(crate::test_support::create_unity_project(
            temp_dir.path(),
            "Pendulum",
        ));
        let config = Config {
            unity_editor_path: temp_dir.path().join("missing"),
            unity_search_roots: Vec::new(),
            build_output_dir: temp_dir.path().join("Build"),
            ..Config::default()
        };

        let outcome = build_project(&project, &config);

        assert!(!outcome.success);
        assert!(outcome.failure.unwrap().contains("Unity Editor not found"));
        assert!(!crate::unity::build_script_path(&project.path).exists());
    }

    #[cfg(unix)]
    mod with_fake_editor {
        use super::*;
        use crate::test_support::{create_unity_project, fake_editor};

        // Records its arguments, checks the generated script exists, then
        // emits a complete WebGL build.
        const SUCCESSFUL_BUILD: &str = r#"echo "$@" > "$(dirname "$0")/args.txt"
while [ $# -gt 0 ]; do
  case "$1" in
    -logFile) log="$2" ;;
    -projectPath) project="$2" ;;
  esac
  shift
done
[ -f "$project/Assets/Editor/AutoWebGLBuildScript.cs" ] || exit 7
out="$(sed -n 's/.*string buildPath = @"\(.*\)";.*/\1/p' "$project/Assets/Editor/AutoWebGLBuildScript.cs")"
mkdir -p "$out/Build"
echo '<html></html>' > "$out/index.html"
for f in Lab.wasm.br Lab.data.br Lab.loader.js Lab.framework.js.br; do echo x > "$out/Build/$f"; done
echo "Building player" >> "$log"
echo "WebGL build succeeded: $out" >> "$log"
exit 1"#;

        fn config_for(temp_dir: &TempDir, editor: PathBuf) -> Config {
            Config {
                unity_editor_path: editor,
                build_output_dir: temp_dir.path().join("Build"),
                build_timeout_secs: 60,
                ..Config::default()
            }
        }

        #[test]
        fn successful_build_is_validated_from_output_not_exit_code() {
            let temp_dir = TempDir::new().unwrap();
            let project = Project::new(create_unity_project(temp_dir.path(), "Lab"));
            let editor = fake_editor(temp_dir.path(), SUCCESSFUL_BUILD);
            let config = config_for(&temp_dir, editor);

            let outcome = build_project(&project, &config);

            assert!(outcome.success, "failure: {:?}", outcome.failure);
            assert!(temp_dir.path().join("Build/Lab/Build/Lab.wasm.br").is_file());
            assert!(!crate::unity::build_script_path(&project.path).exists());

            let args = std::fs::read_to_string(temp_dir.path().join("args.txt")).unwrap();
            assert!(args.contains("-batchmode -quit -projectPath"));
            assert!(args.contains(&format!("-executeMethod {}", BUILD_METHOD)));
            assert!(args.contains("-buildTarget WebGL"));
            assert!(args.contains("/Build/_Logs/Lab_"));
        }

        #[test]
        fn build_without_artifacts_fails_validation() {
            let temp_dir = TempDir::new().unwrap();
            let project = Project::new(create_unity_project(temp_dir.path(), "Empty"));
            let editor = fake_editor(temp_dir.path(), "exit 0");
            let config = config_for(&temp_dir, editor);

            let outcome = build_project(&project, &config);

            assert!(!outcome.success);
            assert!(outcome.failure.unwrap().contains("Build folder"));
        }

        #[test]
        fn timed_out_build_is_killed_and_logged() {
            let temp_dir = TempDir::new().unwrap();
            let project = Project::new(create_unity_project(temp_dir.path(), "Slow"));
            let editor = fake_editor(temp_dir.path(), "exec sleep 30");
            let config = Config {
                build_timeout_secs: 1,
                ..config_for(&temp_dir, editor)
            };

            let start = Instant::now();
            let outcome = build_project(&project, &config);

            assert!(!outcome.success);
            assert!(start.elapsed() < Duration::from_secs(20));
            assert!(outcome.failure.unwrap().contains("timed out"));
            let log = std::fs::read_to_string(outcome.log.unwrap()).unwrap();
            assert!(log.contains("TIMEOUT ERROR"));
            assert!(!crate::unity::build_script_path(&project.path).exists());
        }
    }
}
