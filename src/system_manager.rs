//! Boilerplate methods for generated `SystemManager.cs` scripts.

use crate::config::Config;
use crate::csharp::{append_to_method_body, has_method, insert_before_class_end, method_calls};
use crate::encoding::{build_globset, matching_files};
use crate::error::{FleetError, Result};
use crate::fs::atomic_write_file;
use std::path::{Path, PathBuf};

pub const SYSTEM_MANAGER_FILE: &str = "SystemManager.cs";
const SYSTEM_MANAGER_CLASS: &str = "SystemManager";

const ALLOW_KEYBOARD_INPUT: &str = r#"    public void AllowKeyboardInput(bool isAllow)
    {
        Debug.Log("AllowKeyboardInput!" + isAllow);
#if UNITY_WEBGL && !UNITY_EDITOR
        WebGLInput.captureAllKeyboardInput = isAllow;
#endif
    }"#;

const PRINT_HELLO_WORLD: &str = r#"    private void PrintHelloWorld()
    {
        Debug.Log("Hello World!");
    }"#;

const HELLO_WORLD_CALL: &str = "PrintHelloWorld();";

/// Source of a catalog method, by name.
pub fn catalog_method(name: &str) -> Option<&'static str> {
    match name {
        "AllowKeyboardInput" => Some(ALLOW_KEYBOARD_INPUT),
        _ => None,
    }
}

/// Which edit to apply to each SystemManager.
#[derive(Debug, Clone, Copy)]
pub enum Patch<'a> {
    /// Insert the named catalog methods that are missing.
    Methods(&'a [String]),
    /// Insert `PrintHelloWorld()` and call it at the end of `Start()`.
    HelloWorld,
}

/// Edits applied to one file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilePatch {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

impl FilePatch {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Insert the missing catalog `methods` into the class.
pub fn add_methods(text: &str, methods: &[String]) -> Result<(String, FilePatch)> {
    let mut text = text.to_string();
    let mut patch = FilePatch::default();

    for name in methods {
        let source = catalog_method(name).ok_or_else(|| {
            FleetError::UserError(format!("unknown SystemManager method '{}'", name))
        })?;
        if has_method(&text, name) {
            patch.skipped.push(name.clone());
            continue;
        }
        text = insert_before_class_end(&text, SYSTEM_MANAGER_CLASS, source)
            .ok_or_else(class_not_found)?;
        patch.added.push(name.clone());
    }

    Ok((text, patch))
}

/// Insert `PrintHelloWorld()` and a call to it at the end of `Start()`.
pub fn add_hello_world(text: &str) -> Result<(String, FilePatch)> {
    let mut text = text.to_string();
    let mut patch = FilePatch::default();

    if has_method(&text, "PrintHelloWorld") {
        patch.skipped.push("PrintHelloWorld".to_string());
    } else {
        text = insert_before_class_end(&text, SYSTEM_MANAGER_CLASS, PRINT_HELLO_WORLD)
            .ok_or_else(class_not_found)?;
        patch.added.push("PrintHelloWorld".to_string());
    }

    if method_calls(&text, "Start", "PrintHelloWorld") {
        patch.skipped.push("Start() call".to_string());
    } else {
        text = append_to_method_body(&text, "Start", HELLO_WORLD_CALL)
            .ok_or_else(|| FleetError::UserError("Start() method not found".to_string()))?;
        patch.added.push("Start() call".to_string());
    }

    Ok((text, patch))
}

fn class_not_found() -> FleetError {
    FleetError::UserError(format!(
        "class {} or its closing brace not found",
        SYSTEM_MANAGER_CLASS
    ))
}

/// Apply `patch` to one file, rewriting it only when something was added.
pub fn patch_file(path: &Path, patch: Patch<'_>) -> Result<FilePatch> {
    let text = std::fs::read_to_string(path).map_err(|e| FleetError::io("read", path, e))?;
    let (patched, report) = match patch {
        Patch::Methods(methods) => add_methods(&text, methods)?,
        Patch::HelloWorld => add_hello_world(&text)?,
    };
    if report.changed() {
        atomic_write_file(path, &patched)?;
    }
    Ok(report)
}

/// Every `SystemManager.cs` under `<project>/Assets`, skipping hidden and
/// excluded directories.
pub fn find_system_managers(project: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let assets = project.join("Assets");
    if !assets.is_dir() {
        return Err(FleetError::UserError(format!(
            "Assets folder not found: {}",
            assets.display()
        )));
    }
    let globs = build_globset(&[SYSTEM_MANAGER_FILE.to_string()])?;
    Ok(matching_files(&assets, &globs, &config.excluded_dirs))
}

/// Per-project patch results.
#[derive(Debug, Default)]
pub struct ProjectPatchReport {
    pub files: Vec<(PathBuf, FilePatch)>,
    pub failed: Vec<(PathBuf, String)>,
}

impl ProjectPatchReport {
    pub fn changed(&self) -> bool {
        self.files.iter().any(|(_, patch)| patch.changed())
    }
}

/// Patch every SystemManager in a project. Per-file failures are collected.
pub fn patch_project(
    project: &Path,
    config: &Config,
    patch: Patch<'_>,
) -> Result<ProjectPatchReport> {
    let mut report = ProjectPatchReport::default();
    for path in find_system_managers(project, config)? {
        match patch_file(&path, patch) {
            Ok(file_patch) => report.files.push((path, file_patch)),
            Err(e) => report.failed.push((path, e.to_string())),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_unity_project;
    use tempfile::TempDir;

    const SCRIPT: &str = "using UnityEngine;\n\npublic class SystemManager : MonoBehaviour\n{\n    void Start()\n    {\n        Debug.Log(\"ready\");\n    }\n}\n";

    fn methods(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn add_methods_inserts_missing_catalog_method() {
        let (patched, patch) = add_methods(SCRIPT, &methods(&["AllowKeyboardInput"])).unwrap();

        assert_eq!(patch.added, vec!["AllowKeyboardInput"]);
        assert!(patched.contains("public void AllowKeyboardInput(bool isAllow)"));
        assert!(patched.contains("WebGLInput.captureAllKeyboardInput = isAllow;"));
        assert!(patched.trim_end().ends_with("#endif\n    }\n}"));
    }

    #[test]
    fn add_methods_skips_existing() {
        let (once, _) = add_methods(SCRIPT, &methods(&["AllowKeyboardInput"])).unwrap();
        let (twice, patch) = add_methods(&once, &methods(&["AllowKeyboardInput"])).unwrap();

        assert!(!patch.changed());
        assert_eq!(patch.skipped, vec!["AllowKeyboardInput"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn add_methods_rejects_unknown_names() {
        let err = add_methods(SCRIPT, &methods(&["Teleport"])).unwrap_err();
        assert!(matches!(err, FleetError::UserError(ref msg) if msg.contains("Teleport")));
    }

    #[test]
    fn add_hello_world_adds_method_and_call() {
        let (patched, patch) = add_hello_world(SCRIPT).unwrap();

        assert_eq!(patch.added, vec!["PrintHelloWorld", "Start() call"]);
        assert!(patched.contains(
            "        Debug.Log(\"ready\");\n\n        PrintHelloWorld();\n    }"
        ));
        assert!(patched.contains("private void PrintHelloWorld()"));

        let (again, patch) = add_hello_world(&patched).unwrap();
        assert!(!patch.changed());
        assert_eq!(again, patched);
    }

    #[test]
    fn add_hello_world_requires_start() {
        let script = "public class SystemManager\n{\n}\n";
        assert!(matches!(
            add_hello_world(script),
            Err(FleetError::UserError(ref msg)) if msg.contains("Start()")
        ));
    }

    #[test]
    fn patch_project_finds_and_rewrites_system_managers() {
        let temp_dir = TempDir::new().unwrap();
        let project = create_unity_project(temp_dir.path(), "Pendulum");
        let scripts = project.join("Assets").join("Scripts");
        let ignored = project.join("Assets").join("Temp");
        std::fs::create_dir_all(&scripts).unwrap();
        std::fs::create_dir_all(&ignored).unwrap();
        std::fs::write(scripts.join(SYSTEM_MANAGER_FILE), SCRIPT).unwrap();
        std::fs::write(ignored.join(SYSTEM_MANAGER_FILE), SCRIPT).unwrap();

        let config = Config::default();
        let names = methods(&["AllowKeyboardInput"]);
        let report = patch_project(&project, &config, Patch::Methods(&names)).unwrap();

        assert!(report.changed());
        assert_eq!(report.files.len(), 1);
        assert!(
            std::fs::read_to_string(scripts.join(SYSTEM_MANAGER_FILE))
                .unwrap()
                .contains("AllowKeyboardInput")
        );
        assert_eq!(
            std::fs::read_to_string(ignored.join(SYSTEM_MANAGER_FILE)).unwrap(),
            SCRIPT
        );

        let second = patch_project(&project, &config, Patch::Methods(&names)).unwrap();
        assert!(!second.changed());
    }

    #[test]
    fn patch_project_collects_file_failures() {
        let temp_dir = TempDir::new().unwrap();
        let project = create_unity_project(temp_dir.path(), "Broken");
        std::fs::write(
            project.join("Assets").join(SYSTEM_MANAGER_FILE),
            "public class Other { }",
        )
        .unwrap();

        let report = patch_project(&project, &Config::default(), Patch::HelloWorld).unwrap();

        assert!(!report.changed());
        assert_eq!(report.failed.len(), 1);
    }
}
