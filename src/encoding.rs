//! Source file conversion to UTF-8.
//!
//! Unity projects authored on Korean Windows machines often carry C# files in
//! CP949/EUC-KR. Files that already decode as UTF-8 are left alone.

use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::fs::atomic_write;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Per-project conversion counts.
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub converted: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Returns true for ASCII, plain UTF-8 and BOM-marked UTF-8 content.
pub fn is_utf8(bytes: &[u8]) -> bool {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body).is_ok()
}

/// Guess the encoding of non-UTF-8 content.
///
/// A UTF-16 byte order mark wins; otherwise `chardetng` decides.
pub fn detect_encoding(bytes: &[u8]) -> &'static encoding_rs::Encoding {
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(bytes) {
        return encoding;
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode `bytes` to UTF-8 text, or `None` when they already are UTF-8.
///
/// Malformed sequences are replaced with U+FFFD.
pub fn decode_to_utf8(bytes: &[u8]) -> Option<String> {
    if is_utf8(bytes) {
        return None;
    }
    let encoding = detect_encoding(bytes);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "malformed sequences replaced");
    }
    Some(text.into_owned())
}

/// Rewrite one file as UTF-8. Returns whether the file was converted.
pub fn convert_file(path: &Path) -> Result<bool> {
    let bytes = std::fs::read(path).map_err(|e| FleetError::io("read", path, e))?;
    match decode_to_utf8(&bytes) {
        Some(text) => {
            atomic_write(path, text.as_bytes())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            FleetError::ConfigError(format!("invalid glob pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| FleetError::ConfigError(format!("failed to build glob set: {}", e)))
}

/// Returns true for hidden and excluded directories below the walk root.
pub(crate) fn is_skipped_dir(entry: &DirEntry, excluded: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || excluded.iter().any(|e| *e == name)
}

/// Files under `root` whose names match `globs`, skipping hidden and excluded directories.
pub(crate) fn matching_files(root: &Path, globs: &GlobSet, excluded: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, excluded))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && globs.is_match(entry.file_name()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Convert every matching file under `<project>/Assets` to UTF-8.
///
/// A missing `Assets/` fails the step; per-file failures are collected in
/// the report and do not stop the walk.
pub fn convert_project(project: &Path, config: &Config) -> Result<ConversionReport> {
    let assets = project.join("Assets");
    if !assets.is_dir() {
        return Err(FleetError::UserError(format!(
            "Assets folder not found: {}",
            assets.display()
        )));
    }

    let globs = build_globset(&config.utf8_file_globs)?;
    let mut report = ConversionReport::default();

    for path in matching_files(&assets, &globs, &config.excluded_dirs) {
        match convert_file(&path) {
            Ok(true) => {
                tracing::info!(file = %path.display(), "converted to UTF-8");
                report.converted.push(path);
            }
            Ok(false) => report.skipped += 1,
            Err(e) => report.failed.push((path, e.to_string())),
        }
    }

    Ok(report)
}
