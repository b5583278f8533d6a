//! The per-project maintenance pipeline: UTF-8 conversion, package
//! injection and Git publishing.
//!
//! Steps run in order and the first failing step ends that project's run;
//! the batch continues with the next project.

use super::summary::BatchSummary;
use crate::config::{Config, commit_kind};
use crate::encoding::convert_project;
use crate::error::{FleetError, Result};
use crate::git::{PublishOutcome, commit_and_push, commit_changes};
use crate::manifest::inject_packages;
use crate::project::Project;

/// How far the Git step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStep {
    Commit,
    Push,
}

/// Which pipeline steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steps {
    pub convert: bool,
    pub packages: bool,
    pub git: Option<GitStep>,
}

impl Steps {
    pub fn publish_only(git: GitStep) -> Self {
        Self {
            convert: false,
            packages: false,
            git: Some(git),
        }
    }
}

/// Run `steps` over every project.
pub fn run(
    projects: &[Project],
    config: &Config,
    steps: Steps,
    message: Option<&str>,
) -> BatchSummary {
    let title = match (steps.convert || steps.packages, steps.git) {
        (false, Some(GitStep::Commit)) => "Git commit",
        (false, Some(GitStep::Push)) => "Git commit and push",
        (_, None) => "Project maintenance",
        (true, Some(_)) => "Project maintenance and publish",
    };
    let message = message
        .map(str::to_string)
        .unwrap_or_else(|| config.commit_message(commit_kind::PACKAGE_UPDATE));

    let mut summary = BatchSummary::new(title);
    for (index, project) in projects.iter().enumerate() {
        println!("\n[{}/{}] {}", index + 1, projects.len(), project.name);
        summary.record(&project.name, run_project(project, config, steps, &message));
    }
    summary
}

/// Run `steps` for one project.
pub fn run_project(project: &Project, config: &Config, steps: Steps, message: &str) -> Result<()> {
    if !project.exists() {
        return Err(FleetError::UserError(format!(
            "project path does not exist: {}",
            project.path.display()
        )));
    }

    if steps.convert {
        convert_step(project, config)?;
    }
    if steps.packages {
        package_step(project, config)?;
    }
    if let Some(git) = steps.git {
        publish_step(project, config, git, message)?;
    }
    Ok(())
}

fn convert_step(project: &Project, config: &Config) -> Result<()> {
    let report = convert_project(&project.path, config)?;
    println!(
        "UTF-8: {} converted, {} already UTF-8",
        report.converted.len(),
        report.skipped
    );
    for (path, reason) in &report.failed {
        eprintln!("  failed to convert {}: {}", path.display(), reason);
    }
    if !report.failed.is_empty() {
        return Err(FleetError::UserError(format!(
            "{} file(s) could not be converted to UTF-8",
            report.failed.len()
        )));
    }
    Ok(())
}

fn package_step(project: &Project, config: &Config) -> Result<()> {
    let Some(update) = inject_packages(&project.path, &config.git_packages)? else {
        println!("Packages/manifest.json not found, package step skipped");
        return Ok(());
    };
    if update.changed {
        for name in &update.added {
            println!("Package added: {}", name);
        }
        for name in &update.updated {
            println!("Package updated: {}", name);
        }
    } else {
        println!("Packages already up to date ({})", update.unchanged.len());
    }
    Ok(())
}

/// Commit (and optionally push) `project`, printing what happened.
pub fn publish_step(project: &Project, config: &Config, git: GitStep, message: &str) -> Result<()> {
    let outcome = match git {
        GitStep::Commit => commit_changes(&project.path, config, message)?,
        GitStep::Push => commit_and_push(&project.path, config, message)?,
    };
    match outcome {
        PublishOutcome::NoChanges => println!("No changes to commit"),
        PublishOutcome::Committed { branch, recovered } => {
            println!("Committed to {}{}", branch, recovered_note(recovered))
        }
        PublishOutcome::Pushed { branch, recovered } => println!(
            "Committed and pushed to {}/{}{}",
            config.remote,
            branch,
            recovered_note(recovered)
        ),
    }
    Ok(())
}

fn recovered_note(recovered: bool) -> &'static str {
    if recovered { " (after repository reset)" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_bare_origin, create_unity_project, git, init_repo, test_config};
    use tempfile::TempDir;

    const MANIFEST: &str = "{\n    \"dependencies\": {\n        \"com.unity.ugui\": \"2.0.0\"\n    }\n}\n";

    const PENDULUM_SOURCE: &str = "// 진자의 주기를 측정하는 실험입니다. 학생은 줄의 길이를 바꾸면서 주기가 어떻게 변하는지 관찰합니다.\npublic class Pendulum\n{\n    // 진폭이 작을 때 주기는 길이의 제곱근에 비례합니다.\n}\n";

    fn unity_repo(parent: &TempDir, name: &str) -> (Project, TempDir) {
        let path = create_unity_project(parent.path(), name);
        std::fs::create_dir_all(path.join("Packages")).unwrap();
        std::fs::write(path.join("Packages/manifest.json"), MANIFEST).unwrap();
        init_repo(&path);
        let remote = add_bare_origin(&path);
        (Project::new(path), remote)
    }

    fn all_steps() -> Steps {
        Steps {
            convert: true,
            packages: true,
            git: Some(GitStep::Push),
        }
    }

    #[test]
    fn default_pipeline_converts_injects_and_pushes() {
        let temp_dir = TempDir::new().unwrap();
        let (project, remote) = unity_repo(&temp_dir, "Pendulum");
        let (euc_kr, _, _) = encoding_rs::EUC_KR.encode(PENDULUM_SOURCE);
        std::fs::write(project.path.join("Assets/Pendulum.cs"), &euc_kr).unwrap();

        let config = test_config();
        run_project(&project, &config, all_steps(), "FEAT: update").unwrap();

        let source = std::fs::read_to_string(project.path.join("Assets/Pendulum.cs")).unwrap();
        assert_eq!(source, PENDULUM_SOURCE);
        let manifest = std::fs::read_to_string(project.path.join("Packages/manifest.json")).unwrap();
        assert!(manifest.contains("com.dannect.toolkit"));
        assert_eq!(git(&project.path, &["branch", "--show-current"]), "dev");
        assert_eq!(
            git(remote.path(), &["log", "-1", "--format=%s", "dev"]),
            "FEAT: update"
        );
    }

    #[test]
    fn skip_git_leaves_repository_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let (project, _remote) = unity_repo(&temp_dir, "Lens");
        let steps = Steps {
            git: None,
            ..all_steps()
        };

        run_project(&project, &test_config(), steps, "unused").unwrap();

        assert_eq!(git(&project.path, &["branch", "--show-current"]), "main");
        assert!(!git(&project.path, &["status", "--porcelain"]).is_empty());
    }

    #[test]
    fn failing_step_stops_the_project() {
        let temp_dir = TempDir::new().unwrap();
        let (project, remote) = unity_repo(&temp_dir, "Broken");
        std::fs::write(project.path.join("Packages/manifest.json"), "{ not json").unwrap();

        let err = run_project(&project, &test_config(), all_steps(), "FEAT: update").unwrap_err();

        assert!(err.to_string().contains("invalid JSON"));
        assert_eq!(git(&project.path, &["branch", "--show-current"]), "main");
        assert!(git(remote.path(), &["branch", "--list", "dev"]).is_empty());
    }

    #[test]
    fn missing_manifest_skips_packages_and_still_publishes() {
        let temp_dir = TempDir::new().unwrap();
        let (project, remote) = unity_repo(&temp_dir, "NoManifest");
        std::fs::remove_file(project.path.join("Packages/manifest.json")).unwrap();
        std::fs::write(project.path.join("Assets/New.cs"), "class New {}").unwrap();

        run_project(&project, &test_config(), all_steps(), "FEAT: update").unwrap();

        assert!(!project.path.join("Packages/manifest.json").exists());
        assert_eq!(
            git(remote.path(), &["log", "-1", "--format=%s", "dev"]),
            "FEAT: update"
        );
    }

    #[test]
    fn batch_records_missing_projects_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let (project, _remote) = unity_repo(&temp_dir, "Optics");
        let projects = vec![Project::new(temp_dir.path().join("Ghost")), project];
        let steps = Steps {
            git: None,
            ..all_steps()
        };

        let summary = run(&projects, &test_config(), steps, None);

        assert_eq!(summary.succeeded, vec!["Optics".to_string()]);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].1.contains("does not exist"));
    }

    #[test]
    fn commit_only_does_not_push() {
        let temp_dir = TempDir::new().unwrap();
        let (project, remote) = unity_repo(&temp_dir, "Magnet");
        std::fs::write(project.path.join("Assets/New.cs"), "class New {}").unwrap();

        run_project(
            &project,
            &test_config(),
            Steps::publish_only(GitStep::Commit),
            "CHORE: local",
        )
        .unwrap();

        assert_eq!(
            git(&project.path, &["log", "-1", "--format=%s"]),
            "CHORE: local"
        );
        assert!(git(remote.path(), &["branch", "--list", "dev"]).is_empty());
    }
}
