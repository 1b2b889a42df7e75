//! Application template bundles.
//!
//! A bundle is a directory of raw pod manifest templates plus a
//! `metadata.yaml` describing the layered execution order. The loader
//! resolves a bundle into a [`TemplateSet`] and a
//! [`DeploymentPlan`](crate::deploy::DeploymentPlan); the deploy core never
//! touches the filesystem itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::deploy::DeploymentPlan;
use crate::error::{Result, TemplateError};

const METADATA_FILE: &str = "metadata.yaml";

/// A named, parameterizable pod manifest.
#[derive(Debug, Clone)]
pub struct ManifestTemplate {
    pub name: String,
    pub text: String,
}

/// The set of templates loaded for one bundle, keyed by template name.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, ManifestTemplate>,
}

impl TemplateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: ManifestTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestTemplate> {
        self.templates.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Bundle metadata as declared in `metadata.yaml`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleMetadata {
    pod_template_executions: Vec<Vec<String>>,
    #[serde(default)]
    smt_level: Option<u32>,
}

/// List the bundle names available under the template directory.
pub fn list_bundles(template_dir: &Path) -> Result<Vec<String>> {
    let mut bundles = Vec::new();
    for entry in std::fs::read_dir(template_dir).map_err(TemplateError::ReadDir)? {
        let entry = entry.map_err(TemplateError::ReadDir)?;
        if entry.path().is_dir() {
            bundles.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    bundles.sort();

    Ok(bundles)
}

/// Resolve a bundle name case-insensitively against the template directory.
pub fn resolve_bundle(template_dir: &Path, name: &str) -> Result<PathBuf> {
    let bundles = list_bundles(template_dir)?;
    let resolved = bundles
        .iter()
        .find(|b| b.eq_ignore_ascii_case(name))
        .ok_or_else(|| TemplateError::UnknownBundle(name.to_string()))?;

    Ok(template_dir.join(resolved))
}

/// Load a bundle's templates and its deployment plan.
pub fn load_bundle(template_dir: &Path, name: &str) -> Result<(TemplateSet, DeploymentPlan)> {
    let bundle_dir = resolve_bundle(template_dir, name)?;

    let metadata_text = std::fs::read_to_string(bundle_dir.join(METADATA_FILE))
        .map_err(TemplateError::ReadMetadata)?;
    let metadata: BundleMetadata =
        serde_yaml::from_str(&metadata_text).map_err(TemplateError::ParseMetadata)?;

    let mut templates = TemplateSet::new();
    for entry in std::fs::read_dir(&bundle_dir).map_err(TemplateError::ReadDir)? {
        let entry = entry.map_err(TemplateError::ReadDir)?;
        let path = entry.path();
        if !path.is_file() || path.file_name() == Some(std::ffi::OsStr::new(METADATA_FILE)) {
            continue;
        }

        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|source| TemplateError::ReadTemplate {
            name: stem.clone(),
            source,
        })?;
        templates.insert(ManifestTemplate { name: stem, text });
    }

    let plan = DeploymentPlan::new(metadata.pod_template_executions, metadata.smt_level);

    Ok((templates, plan))
}
