//! Builtin Plugins
//!
//! Ready-made plugins shipped with the crate:
//! - Uppercase and calculated-field transforms
//! - File writer and file copy actions

pub mod calculated_field;
pub mod file_copy;
pub mod file_writer;
pub mod uppercase;

pub use calculated_field::CalculatedFieldTransform;
pub use file_copy::FileCopyAction;
pub use file_writer::FileWriterAction;
pub use uppercase::UpperCaseTransform;

use crate::core::Result;
use crate::plugin::{PluginRegistry, PluginType, TypeCatalog};

/// Plugin types for every builtin.
pub fn builtin_types() -> Vec<PluginType> {
    vec![
        PluginType::transform::<UpperCaseTransform>(),
        PluginType::transform::<CalculatedFieldTransform>(),
        PluginType::action::<FileWriterAction>(),
        PluginType::action::<FileCopyAction>(),
    ]
}

/// Catalog mapping manifest `type` names to the builtin plugin types.
pub fn builtin_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with("uppercase", PluginType::transform::<UpperCaseTransform>())
        .with("calculated_field", PluginType::transform::<CalculatedFieldTransform>())
        .with("filewriter", PluginType::action::<FileWriterAction>())
        .with("filecopy", PluginType::action::<FileCopyAction>())
}

/// Register every builtin, returning the identifiers in registration order.
///
/// Stops at the first failure, e.g. when a builtin is already registered.
pub fn register_builtins(registry: &PluginRegistry) -> Result<Vec<String>> {
    builtin_types()
        .into_iter()
        .map(|plugin_type| registry.register(plugin_type))
        .collect()
}
