//! WebGL build output validation.
//!
//! Unity's exit code does not reliably reflect the build result, so validity
//! is derived from the build log and the files on disk.

use crate::config::ValidationPolicy;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Log lines that mean Unity reported a successful build.
pub const SUCCESS_MARKERS: [&str; 3] = [
    "WebGL build succeeded",
    "Build result: Succeeded",
    "BuildResult.Succeeded",
];

/// Completion line written by older build scripts that did not log a file count.
pub const COMPLETION_MARKER: &str = "WebGL build complete";

static FILE_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Build folder file count: (\d+)").expect("Invalid file count regex")
});

/// Outcome of validating one project's build directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildValidationResult {
    pub valid: bool,
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

/// What the build log says about the build.
#[derive(Debug, Default, PartialEq, Eq)]
struct LogEvidence {
    reports_success: bool,
    reports_files_generated: bool,
}

fn read_log_evidence(log: &Path, found: &mut Vec<String>) -> LogEvidence {
    let mut evidence = LogEvidence::default();
    let bytes = match std::fs::read(log) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("build log unreadable, skipping log evidence: {}", e);
            return evidence;
        }
    };
    let content = String::from_utf8_lossy(&bytes);

    if let Some(marker) = SUCCESS_MARKERS.iter().find(|m| content.contains(*m)) {
        evidence.reports_success = true;
        found.push(format!("Unity reported build success ({})", marker));
    }

    if let Some(count) = FILE_COUNT_REGEX
        .captures(&content)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        && count > 0
    {
        evidence.reports_files_generated = true;
        found.push(format!("Build folder holds {} file(s) per log", count));
    }

    if !evidence.reports_files_generated && content.contains(COMPLETION_MARKER) {
        evidence.reports_files_generated = true;
        found.push("Build completion message found".to_string());
    }

    evidence
}

/// An artifact category Unity WebGL output must contain.
struct Category {
    label: &'static str,
    /// Substring that selects the files listed for this category.
    marker: &'static str,
    missing_hint: &'static str,
    matches: fn(&str) -> bool,
}

const CATEGORIES: [Category; 4] = [
    Category {
        label: "WebAssembly",
        marker: ".wasm",
        missing_hint: ".wasm or .wasm.br",
        matches: |name| {
            name.contains(".wasm")
                && [".wasm", ".wasm.br", ".wasm.gz"]
                    .iter()
                    .any(|ext| name.ends_with(ext))
        },
    },
    Category {
        label: "Data",
        marker: ".data",
        missing_hint: ".data or .data.br",
        matches: |name| {
            name.contains(".data")
                && [".data", ".data.br", ".data.gz"]
                    .iter()
                    .any(|ext| name.ends_with(ext))
        },
    },
    Category {
        label: "Loader",
        marker: ".loader",
        missing_hint: ".loader.js",
        matches: |name| name.contains(".loader.js") || (name.contains(".loader") && name.contains(".js")),
    },
    Category {
        label: "Framework",
        marker: ".framework",
        missing_hint: ".framework.js or .framework.js.br",
        matches: |name| {
            name.contains(".framework.js") || (name.contains(".framework") && name.contains(".js"))
        },
    },
];

/// Validate `<build_dir>` against the optional build `log`.
///
/// Never fails: problems end up in `missing`.
pub fn validate_build_output(
    build_dir: &Path,
    log: Option<&Path>,
    policy: ValidationPolicy,
) -> BuildValidationResult {
    let mut result = BuildValidationResult::default();

    if !build_dir.exists() {
        result
            .missing
            .push("build directory does not exist".to_string());
        return result;
    }

    let evidence = match log {
        Some(log) if log.exists() => read_log_evidence(log, &mut result.found),
        _ => LogEvidence::default(),
    };
    if evidence.reports_success && evidence.reports_files_generated {
        result.valid = true;
        return result;
    }
    let lenient = policy == ValidationPolicy::Lenient;

    for (label, name) in [("index.html", "index.html"), ("Build folder", "Build")] {
        if build_dir.join(name).exists() {
            result.found.push(label.to_string());
        } else {
            result.missing.push(label.to_string());
        }
    }

    let build_folder = build_dir.join("Build");
    if !build_folder.exists() {
        result.missing.push("Build folder does not exist".to_string());
        return result;
    }

    let names: Vec<String> = match std::fs::read_dir(&build_folder) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(e) => {
            result
                .missing
                .push(format!("Build folder could not be read: {}", e));
            return result;
        }
    };

    if names.is_empty() {
        result.missing.push("Build folder is empty".to_string());
        if evidence.reports_success && lenient {
            result
                .found
                .push("Unity reported build success (waiting for files to flush)".to_string());
            result.valid = true;
        }
        return result;
    }

    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let mut all_present = true;
    for category in &CATEGORIES {
        if lowered.iter().any(|name| (category.matches)(name)) {
            let files: Vec<&str> = names
                .iter()
                .zip(&lowered)
                .filter(|(_, lower)| lower.contains(category.marker))
                .map(|(name, _)| name.as_str())
                .collect();
            result
                .found
                .push(format!("{}: {}", category.label, files.join(", ")));
        } else {
            all_present = false;
            result
                .missing
                .push(format!("{} ({})", category.label, category.missing_hint));
        }
    }

    let lenient_valid = lenient && evidence.reports_success;
    result.valid = all_present || lenient_valid;
    if lenient_valid && !all_present {
        result.found.push(format!(
            "Unity reported success and Build folder holds {} file(s)",
            names.len()
        ));
    }

    result
}
