//! Plugin Module
//!
//! Provides the plugin architecture:
//! - Plugin capabilities (transform, action)
//! - Plugin registry and discovery
//! - Lifecycle drivers

pub mod config;
pub mod discovery;
pub mod interface;
pub mod lifecycle;
pub mod registry;

pub use config::{DiscoveryConfig, RegistryConfig};
pub use discovery::{CandidateSource, ManifestDirectory, TypeCatalog};
pub use interface::{
    ActionPlugin, Plugin, PluginDescriptor, PluginError, PluginInstance, PluginResult,
    PluginSummary, SharedPlugin, TransformPlugin,
};
pub use lifecycle::{
    run_action, run_transform, ActionRun, ActionState, RunStats, TransformRun, TransformState,
};
pub use registry::{
    default_registry, register_plugin, register_plugin_in, PluginRegistry, PluginType,
};
