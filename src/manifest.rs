//! Git package injection into `Packages/manifest.json`.

use crate::error::{FleetError, Result};
use crate::fs::atomic_write_file;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What [`inject_packages`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestUpdate {
    pub changed: bool,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

pub fn manifest_path(project: &Path) -> PathBuf {
    project.join("Packages").join("manifest.json")
}

/// Add or update `packages` in the manifest's `dependencies` object.
///
/// A missing `dependencies` key is created. Existing keys keep their position.
pub fn apply_packages(
    manifest: &mut Value,
    packages: &BTreeMap<String, String>,
) -> Result<ManifestUpdate> {
    let root = manifest
        .as_object_mut()
        .ok_or_else(|| FleetError::UserError("manifest root is not a JSON object".to_string()))?;

    let dependencies = root
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            FleetError::UserError("manifest \"dependencies\" is not a JSON object".to_string())
        })?;

    let mut update = ManifestUpdate::default();
    for (name, url) in packages {
        match dependencies.get(name) {
            Some(Value::String(current)) if current == url => {
                update.unchanged.push(name.clone());
                continue;
            }
            Some(_) => update.updated.push(name.clone()),
            None => update.added.push(name.clone()),
        }
        dependencies.insert(name.clone(), Value::String(url.clone()));
        update.changed = true;
    }

    Ok(update)
}

/// Serialize a manifest with 4-space indentation and a trailing newline.
pub fn render_manifest(manifest: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(manifest, &mut serializer)
        .map_err(|e| FleetError::UserError(format!("failed to serialize manifest: {}", e)))?;

    let mut text = String::from_utf8(buf)
        .map_err(|e| FleetError::UserError(format!("manifest is not valid UTF-8: {}", e)))?;
    text.push('\n');
    Ok(text)
}

/// Inject `packages` into a project's manifest, rewriting it only on change.
///
/// Returns `Ok(None)` when the project has no manifest.
pub fn inject_packages(
    project: &Path,
    packages: &BTreeMap<String, String>,
) -> Result<Option<ManifestUpdate>> {
    let path = manifest_path(project);
    if !path.is_file() {
        tracing::info!(manifest = %path.display(), "manifest not found, skipping");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| FleetError::io("read", &path, e))?;
    let mut manifest: Value = serde_json::from_str(&content).map_err(|e| {
        FleetError::UserError(format!("invalid JSON in {}: {}", path.display(), e))
    })?;

    let update = apply_packages(&mut manifest, packages)?;
    if update.changed {
        atomic_write_file(&path, &render_manifest(&manifest)?)?;
        tracing::info!(
            manifest = %path.display(),
            added = update.added.len(),
            updated = update.updated.len(),
            "manifest rewritten"
        );
    }
    Ok(Some(update))
}
