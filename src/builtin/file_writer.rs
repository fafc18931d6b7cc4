//! File writer action.

use crate::core::{now, Properties, Value};
use crate::plugin::{ActionPlugin, Plugin, PluginDescriptor, PluginResult};
use std::fs::OpenOptions;
use std::io::Write;

/// Writes a timestamped message to a file.
///
/// Parameters: `filepath` (text), `message` (any value, rendered as text),
/// `append` (bool, default false).
pub struct FileWriterAction {
    descriptor: PluginDescriptor,
    parameters: Properties,
}

impl FileWriterAction {
    /// Plugin identifier.
    pub const ID: &'static str = "rhop.action.filewriter";

    /// Create with a custom name and description.
    pub fn new(name: &str, description: &str) -> Self {
        let description = if description.is_empty() {
            "Writes a message to a file"
        } else {
            description
        };
        let mut plugin = Self {
            descriptor: PluginDescriptor::new(name, description),
            parameters: Properties::new(),
        };
        plugin.set_parameter("filepath", Value::from("output.txt"));
        plugin.set_parameter("message", Value::from("Hello from rhop!"));
        plugin.set_parameter("append", Value::Bool(false));
        plugin
    }

    fn write(&self, filepath: &str) -> std::io::Result<()> {
        let message = self.get_parameter("message");
        let append = self.get_parameter("append").as_bool().unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(filepath)?;

        writeln!(file, "[{}] {}", now().format("%Y-%m-%d %H:%M:%S"), message)
    }
}

impl Default for FileWriterAction {
    fn default() -> Self {
        Self::new("FileWriter", "")
    }
}

impl Plugin for FileWriterAction {
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

impl ActionPlugin for FileWriterAction {
    fn parameters(&self) -> &Properties {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut Properties {
        &mut self.parameters
    }

    fn execute(&mut self) -> PluginResult<bool> {
        let filepath = self.get_parameter("filepath");
        let Some(filepath) = filepath.as_str().filter(|p| !p.is_empty()) else {
            tracing::warn!(plugin_id = Self::ID, "filepath parameter is required");
            return Ok(false);
        };

        match self.write(filepath) {
            Ok(()) => {
                tracing::debug!(plugin_id = Self::ID, path = filepath, "wrote message");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(plugin_id = Self::ID, path = filepath, error = %e, "failed to write file");
                Ok(false)
            }
        }
    }
}
