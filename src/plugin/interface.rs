//! Plugin interface definition.
//!
//! Defines the identity every plugin carries and the two capability
//! contracts a plugin can implement: [`TransformPlugin`] for row processing
//! inside pipelines and [`ActionPlugin`] for one-shot workflow tasks.

use crate::core::{Category, Properties, Row, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Fault raised from inside a plugin body.
///
/// The core never catches or converts these; they reach the host as-is.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Create a new error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        PluginError::Message(message.into())
    }

    /// Create an invalid-parameter error.
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        PluginError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Attributes shared by every plugin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PluginDescriptor {
    name: String,
    description: String,
    metadata: Properties,
}

impl PluginDescriptor {
    /// Create a descriptor. The name is what hosts display; it is never
    /// generated.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            metadata: Properties::new(),
        }
    }

    /// Plugin display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin description, empty unless provided.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Insert or overwrite a metadata entry.
    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    /// Metadata value for `key`, or [`Value::Null`] when unset.
    pub fn get_metadata(&self, key: &str) -> Value {
        self.get_metadata_or(key, Value::Null)
    }

    /// Metadata value for `key`, or `default` when unset.
    pub fn get_metadata_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.metadata
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// All metadata entries.
    pub fn metadata(&self) -> &Properties {
        &self.metadata
    }
}

/// Identity shared by all plugin capabilities.
pub trait Plugin: Send + Sync {
    /// Globally unique identifier, e.g. `rhop.transform.uppercase`.
    ///
    /// Must return the same value on every call.
    fn identifier(&self) -> &str;

    /// Common attributes.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Mutable access to the common attributes.
    fn descriptor_mut(&mut self) -> &mut PluginDescriptor;

    /// Plugin display name.
    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// Plugin description.
    fn description(&self) -> &str {
        self.descriptor().description()
    }

    /// Insert or overwrite a metadata entry.
    fn set_metadata(&mut self, key: &str, value: Value) {
        self.descriptor_mut().set_metadata(key, value);
    }

    /// Metadata value for `key`, or [`Value::Null`] when unset.
    fn get_metadata(&self, key: &str) -> Value {
        self.descriptor().get_metadata(key)
    }

    /// Metadata value for `key`, or `default` when unset.
    fn get_metadata_or(&self, key: &str, default: Value) -> Value {
        self.descriptor().get_metadata_or(key, default)
    }
}

/// A plugin that processes pipeline rows one at a time.
///
/// Per run the host calls `init` once, `process_row` zero or more times,
/// then `dispose` once (also after a failure). Calling `process_row` after
/// `dispose` is not guarded against.
pub trait TransformPlugin: Plugin {
    /// Transform one row. `Ok(None)` drops the row from the output.
    fn process_row(&mut self, row: Row) -> PluginResult<Option<Row>>;

    /// Acquire resources before the first row.
    fn init(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Release resources after the last row. Must tolerate a partially
    /// failed `init`.
    fn dispose(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Field names this transform expects in each row. Advisory only.
    fn input_fields(&self) -> &[String] {
        &[]
    }

    /// Field names this transform adds to each row. Advisory only.
    fn output_fields(&self) -> &[String] {
        &[]
    }
}

impl dyn TransformPlugin + '_ {
    /// Always [`Category::Transform`].
    pub fn category(&self) -> Category {
        Category::Transform
    }
}

/// A plugin performing one unit of workflow work per `execute` call.
pub trait ActionPlugin: Plugin {
    /// Parameter store, independent from metadata.
    fn parameters(&self) -> &Properties;

    /// Mutable parameter store.
    fn parameters_mut(&mut self) -> &mut Properties;

    /// Run the action. `Ok(false)` reports failure; `Err` is a fault that
    /// propagates to the host unchanged.
    fn execute(&mut self) -> PluginResult<bool>;

    /// Insert or overwrite a parameter.
    fn set_parameter(&mut self, name: &str, value: Value) {
        self.parameters_mut().insert(name.to_string(), value);
    }

    /// Parameter value for `name`, or [`Value::Null`] when unset.
    fn get_parameter(&self, name: &str) -> Value {
        self.get_parameter_or(name, Value::Null)
    }

    /// Parameter value for `name`, or `default` when unset.
    fn get_parameter_or(&self, name: &str, default: Value) -> Value {
        self.parameters().get(name).cloned().unwrap_or(default)
    }

    /// Snapshot of all parameters.
    fn get_parameters(&self) -> Properties {
        self.parameters().clone()
    }
}

impl dyn ActionPlugin + '_ {
    /// Always [`Category::Action`].
    pub fn category(&self) -> Category {
        Category::Action
    }
}

/// A live plugin object of one of the known capabilities.
#[non_exhaustive]
pub enum PluginInstance {
    /// Row transform
    Transform(Box<dyn TransformPlugin>),
    /// Workflow action
    Action(Box<dyn ActionPlugin>),
}

/// Shared handle to a registered live instance.
pub type SharedPlugin = Arc<parking_lot::Mutex<PluginInstance>>;

impl PluginInstance {
    /// Wrap a transform.
    pub fn transform(plugin: impl TransformPlugin + 'static) -> Self {
        PluginInstance::Transform(Box::new(plugin))
    }

    /// Wrap an action.
    pub fn action(plugin: impl ActionPlugin + 'static) -> Self {
        PluginInstance::Action(Box::new(plugin))
    }

    /// Capability category, derived from the variant.
    pub fn category(&self) -> Category {
        match self {
            PluginInstance::Transform(p) => p.category(),
            PluginInstance::Action(p) => p.category(),
        }
    }

    /// Plugin identifier.
    pub fn identifier(&self) -> &str {
        match self {
            PluginInstance::Transform(p) => p.identifier(),
            PluginInstance::Action(p) => p.identifier(),
        }
    }

    /// Common attributes.
    pub fn descriptor(&self) -> &PluginDescriptor {
        match self {
            PluginInstance::Transform(p) => p.descriptor(),
            PluginInstance::Action(p) => p.descriptor(),
        }
    }

    /// Mutable common attributes.
    pub fn descriptor_mut(&mut self) -> &mut PluginDescriptor {
        match self {
            PluginInstance::Transform(p) => p.descriptor_mut(),
            PluginInstance::Action(p) => p.descriptor_mut(),
        }
    }

    /// Borrow as a transform.
    pub fn as_transform(&self) -> Option<&dyn TransformPlugin> {
        match self {
            PluginInstance::Transform(p) => Some(&**p),
            _ => None,
        }
    }

    /// Mutably borrow as a transform.
    pub fn as_transform_mut(&mut self) -> Option<&mut dyn TransformPlugin> {
        match self {
            PluginInstance::Transform(p) => Some(&mut **p),
            _ => None,
        }
    }

    /// Borrow as an action.
    pub fn as_action(&self) -> Option<&dyn ActionPlugin> {
        match self {
            PluginInstance::Action(p) => Some(&**p),
            _ => None,
        }
    }

    /// Mutably borrow as an action.
    pub fn as_action_mut(&mut self) -> Option<&mut dyn ActionPlugin> {
        match self {
            PluginInstance::Action(p) => Some(&mut **p),
            _ => None,
        }
    }

    /// Summary of this instance.
    pub fn summary(&self, type_name: &str) -> PluginSummary {
        let descriptor = self.descriptor();
        PluginSummary {
            id: self.identifier().to_string(),
            name: descriptor.name().to_string(),
            description: descriptor.description().to_string(),
            category: self.category(),
            type_name: type_name.to_string(),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedPlugin {
        Arc::new(parking_lot::Mutex::new(self))
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.identifier())
            .field("category", &self.category())
            .field("name", &self.descriptor().name())
            .finish()
    }
}

/// Plugin information for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
    /// Plugin identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Capability category
    pub category: Category,
    /// Rust type backing the plugin
    pub type_name: String,
}
