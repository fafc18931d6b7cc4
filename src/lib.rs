//! # rhop - Plugin registration and lifecycle framework
//!
//! A typed plugin layer for row-oriented ETL pipelines and workflow engines:
//! - **Transforms**: per-row processing with an `init` / `process_row` /
//!   `dispose` lifecycle
//! - **Actions**: parameterized workflow steps reporting success or failure
//! - **Registry**: identifier -> type and identifier -> instance catalogs
//!   with category filtering and batch discovery
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rhop::builtin::{register_builtins, UpperCaseTransform};
//! use rhop::core::{Category, Row, Value};
//! use rhop::plugin::{run_transform, PluginRegistry};
//!
//! let registry = PluginRegistry::new();
//! register_builtins(&registry).unwrap();
//! println!("transforms: {:?}", registry.list_plugins(Some(Category::Transform)));
//!
//! let mut instance = registry
//!     .create_instance(UpperCaseTransform::ID)
//!     .unwrap()
//!     .unwrap();
//! let mut row = Row::new();
//! row.insert("name".to_string(), Value::from("john doe"));
//!
//! let transform = instance.as_transform_mut().unwrap();
//! let rows = run_transform(transform, vec![row]).unwrap();
//! assert_eq!(rows[0]["name"], Value::from("JOHN DOE"));
//! ```

pub mod builtin;
pub mod core;
pub mod monitoring;
pub mod plugin;

pub use core::error::{Error, Result};
pub use plugin::{
    default_registry, register_plugin, ActionPlugin, Plugin, PluginInstance, PluginRegistry,
    PluginType, TransformPlugin,
};
