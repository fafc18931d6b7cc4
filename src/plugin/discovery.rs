//! Plugin discovery sources.
//!
//! A [`CandidateSource`] hands the registry a batch of candidate plugin
//! types. In-memory batches are sources as-is; [`ManifestDirectory`] scans
//! a directory for `*.plugin.json` manifests naming compiled-in types.

use crate::core::{Error, Result};
use crate::plugin::config::DiscoveryConfig;
use crate::plugin::registry::PluginType;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Something that can produce candidate plugin types.
pub trait CandidateSource {
    /// Human-readable source name for logs and errors.
    fn describe(&self) -> String;

    /// Produce the candidates.
    ///
    /// Return [`Error::SourceUnavailable`] when the source itself is
    /// unusable. Individual bad candidates should be skipped or passed on
    /// for the registry to reject, not reported here.
    fn candidates(&self) -> Result<Vec<PluginType>>;
}

impl CandidateSource for [PluginType] {
    fn describe(&self) -> String {
        format!("batch of {} types", self.len())
    }

    fn candidates(&self) -> Result<Vec<PluginType>> {
        Ok(self.to_vec())
    }
}

impl CandidateSource for Vec<PluginType> {
    fn describe(&self) -> String {
        self.as_slice().describe()
    }

    fn candidates(&self) -> Result<Vec<PluginType>> {
        self.as_slice().candidates()
    }
}

/// Compiled-in plugin types addressable by name from manifests.
#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, PluginType>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: &str, plugin_type: PluginType) {
        self.types.insert(name.to_string(), plugin_type);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: &str, plugin_type: PluginType) -> Self {
        self.insert(name, plugin_type);
        self
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&PluginType> {
        self.types.get(name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of catalogued types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// On-disk plugin manifest.
#[derive(Debug, Deserialize)]
struct PluginManifest {
    /// Catalog name of the plugin type
    #[serde(rename = "type")]
    type_name: String,
    /// Disabled manifests are ignored
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Directory of plugin manifests.
///
/// Each manifest is a JSON object such as `{"type": "uppercase"}`. Files
/// starting with the skip prefix are ignored. Manifests that cannot be read
/// or parsed, or that name a type missing from the catalog, are logged and
/// skipped.
#[derive(Clone, Debug)]
pub struct ManifestDirectory {
    dir: PathBuf,
    catalog: TypeCatalog,
    config: DiscoveryConfig,
}

impl ManifestDirectory {
    /// Scan `dir` with the default discovery settings.
    pub fn new(dir: impl Into<PathBuf>, catalog: TypeCatalog) -> Self {
        Self::with_config(dir, catalog, DiscoveryConfig::default())
    }

    /// Scan `dir` with explicit settings.
    pub fn with_config(dir: impl Into<PathBuf>, catalog: TypeCatalog, config: DiscoveryConfig) -> Self {
        Self {
            dir: dir.into(),
            catalog,
            config,
        }
    }

    /// Directory being scanned.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_manifest(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !self.config.skip_prefix.is_empty() && file_name.starts_with(&self.config.skip_prefix) {
            return false;
        }
        file_name.ends_with(&self.config.manifest_suffix) && path.is_file()
    }

    fn manifest_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| Error::source_unavailable(self.describe(), e.to_string()))?;

        let mut paths = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if !self.config.follow_subdirectories {
                    continue;
                }
                let Ok(children) = std::fs::read_dir(&path) else {
                    tracing::warn!(path = %path.display(), "failed to read plugin subdirectory");
                    continue;
                };
                paths.extend(
                    children
                        .flatten()
                        .map(|child| child.path())
                        .filter(|p| self.is_manifest(p)),
                );
            } else if self.is_manifest(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn resolve(&self, path: &Path) -> Option<PluginType> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read plugin manifest");
                return None;
            }
        };

        let manifest: PluginManifest = match serde_json::from_str(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse plugin manifest");
                return None;
            }
        };

        if !manifest.enabled {
            tracing::debug!(path = %path.display(), "plugin manifest disabled, skipping");
            return None;
        }

        match self.catalog.get(&manifest.type_name) {
            Some(plugin_type) => Some(plugin_type.clone()),
            None => {
                tracing::warn!(
                    path = %path.display(),
                    type_name = %manifest.type_name,
                    "plugin manifest names an unknown type"
                );
                None
            }
        }
    }
}

impl CandidateSource for ManifestDirectory {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn candidates(&self) -> Result<Vec<PluginType>> {
        if !self.dir.exists() {
            return Err(Error::source_unavailable(self.describe(), "directory does not exist"));
        }
        if !self.dir.is_dir() {
            return Err(Error::source_unavailable(self.describe(), "not a directory"));
        }

        let candidates: Vec<PluginType> = self
            .manifest_paths()?
            .iter()
            .filter_map(|path| self.resolve(path))
            .collect();

        tracing::debug!(
            path = %self.dir.display(),
            count = candidates.len(),
            "resolved plugin manifests"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{CalculatedFieldTransform, FileWriterAction, UpperCaseTransform};

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with("uppercase", PluginType::transform::<UpperCaseTransform>())
            .with("calculated_field", PluginType::transform::<CalculatedFieldTransform>())
            .with("filewriter", PluginType::action::<FileWriterAction>())
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_batch_source() {
        let batch = vec![PluginType::transform::<UpperCaseTransform>()];
        assert_eq!(batch.candidates().unwrap().len(), 1);
        assert_eq!(batch.describe(), "batch of 1 types");
    }

    #[test]
    fn test_catalog() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("uppercase").unwrap().is::<UpperCaseTransform>());
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["uppercase", "calculated_field", "filewriter"]
        );
    }

    #[test]
    fn test_scan_manifests() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.plugin.json", r#"{"type": "uppercase"}"#);
        write(dir.path(), "b.plugin.json", r#"{"type": "filewriter"}"#);
        write(dir.path(), "_hidden.plugin.json", r#"{"type": "calculated_field"}"#);
        write(dir.path(), "off.plugin.json", r#"{"type": "calculated_field", "enabled": false}"#);
        write(dir.path(), "unknown.plugin.json", r#"{"type": "http_request"}"#);
        write(dir.path(), "broken.plugin.json", "not valid json");
        write(dir.path(), "notes.txt", r#"{"type": "uppercase"}"#);

        let source = ManifestDirectory::new(dir.path(), catalog());
        let candidates = source.candidates().unwrap();

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].is::<UpperCaseTransform>());
        assert!(candidates[1].is::<FileWriterAction>());
    }

    #[test]
    fn test_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("calc");
        std::fs::create_dir(&nested).unwrap();
        write(&nested, "calc.plugin.json", r#"{"type": "calculated_field"}"#);

        let flat = ManifestDirectory::new(dir.path(), catalog());
        assert!(flat.candidates().unwrap().is_empty());

        let config = DiscoveryConfig {
            follow_subdirectories: true,
            ..Default::default()
        };
        let deep = ManifestDirectory::with_config(dir.path(), catalog(), config);
        let candidates = deep.candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].is::<CalculatedFieldTransform>());
    }

    #[test]
    fn test_missing_directory() {
        let source = ManifestDirectory::new("/nonexistent/rhop/plugins", catalog());
        let err = source.candidates().unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plugins");
        std::fs::write(&file, "").unwrap();

        let err = ManifestDirectory::new(&file, catalog()).candidates().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
