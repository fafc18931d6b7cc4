//! File copy action.

use crate::core::{Properties, Value};
use crate::plugin::{ActionPlugin, Plugin, PluginDescriptor, PluginResult};
use std::path::Path;

/// Copies `source` to `destination`.
///
/// Reports failure without touching the destination when the source is
/// missing, or when the destination exists and `overwrite` is not set.
pub struct FileCopyAction {
    descriptor: PluginDescriptor,
    parameters: Properties,
}

impl FileCopyAction {
    /// Plugin identifier.
    pub const ID: &'static str = "rhop.action.filecopy";

    /// Create with a custom name and description.
    pub fn new(name: &str, description: &str) -> Self {
        let description = if description.is_empty() {
            "Copies a file to a destination path"
        } else {
            description
        };
        let mut plugin = Self {
            descriptor: PluginDescriptor::new(name, description),
            parameters: Properties::new(),
        };
        plugin.set_parameter("overwrite", Value::Bool(false));
        plugin
    }

    fn path_parameter(&self, name: &str) -> Option<String> {
        self.get_parameter(name)
            .as_str()
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

impl Default for FileCopyAction {
    fn default() -> Self {
        Self::new("FileCopy", "")
    }
}

impl Plugin for FileCopyAction {
    fn identifier(&self) -> &str {
        Self::ID
    }

    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut PluginDescriptor {
        &mut self.descriptor
    }
}

impl ActionPlugin for FileCopyAction {
    fn parameters(&self) -> &Properties {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut Properties {
        &mut self.parameters
    }

    fn execute(&mut self) -> PluginResult<bool> {
        let (Some(source), Some(destination)) = (
            self.path_parameter("source"),
            self.path_parameter("destination"),
        ) else {
            tracing::warn!(plugin_id = Self::ID, "source and destination parameters are required");
            return Ok(false);
        };

        let source = Path::new(&source);
        let destination = Path::new(&destination);

        if !source.is_file() {
            tracing::warn!(plugin_id = Self::ID, source = %source.display(), "source file not found");
            return Ok(false);
        }

        let overwrite = self.get_parameter("overwrite").as_bool().unwrap_or(false);
        if destination.exists() && !overwrite {
            tracing::warn!(
                plugin_id = Self::ID,
                destination = %destination.display(),
                "destination exists and overwrite is off"
            );
            return Ok(false);
        }

        match std::fs::copy(source, destination) {
            Ok(bytes) => {
                tracing::debug!(plugin_id = Self::ID, bytes, "copied file");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(plugin_id = Self::ID, error = %e, "file copy failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(source: &Path, destination: &Path) -> FileCopyAction {
        let mut plugin = FileCopyAction::default();
        plugin.set_parameter("source", Value::from(source.to_str().unwrap()));
        plugin.set_parameter("destination", Value::from(destination.to_str().unwrap()));
        plugin
    }

    #[test]
    fn test_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let destination = dir.path().join("out.csv");
        std::fs::write(&source, "a,b\n1,2\n").unwrap();

        let mut plugin = action(&source, &destination);
        assert!(plugin.execute().unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_missing_source_has_no_side_effect() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.csv");
        let destination = dir.path().join("out.csv");

        let mut plugin = action(&source, &destination);
        assert!(!plugin.execute().unwrap());
        assert!(!destination.exists());
    }

    #[test]
    fn test_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        let destination = dir.path().join("out.txt");
        std::fs::write(&source, "new").unwrap();
        std::fs::write(&destination, "old").unwrap();

        let mut plugin = action(&source, &destination);
        assert!(!plugin.execute().unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "old");

        plugin.set_parameter("overwrite", Value::Bool(true));
        assert!(plugin.execute().unwrap());
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "new");
    }

    #[test]
    fn test_missing_parameters() {
        let mut plugin = FileCopyAction::default();
        assert!(!plugin.execute().unwrap());
    }
}
