//! Plugin registry for managing plugins.
//!
//! Maps plugin identifiers to plugin types (factories) and, in a separate
//! namespace, to live instances. Both maps sit behind one lock so a
//! registry can be shared across threads; every failed call leaves them
//! untouched.

use crate::core::{Category, Error, Result};
use crate::plugin::config::RegistryConfig;
use crate::plugin::discovery::{CandidateSource, ManifestDirectory, TypeCatalog};
use crate::plugin::interface::{
    ActionPlugin, PluginInstance, PluginResult, PluginSummary, SharedPlugin, TransformPlugin,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

type Factory = Arc<dyn Fn() -> PluginResult<PluginInstance> + Send + Sync>;

/// A constructible plugin type.
///
/// Carries the capability the type declares and a factory producing a
/// fresh default instance. Two `PluginType`s are equal when they describe
/// the same Rust type.
#[derive(Clone)]
pub struct PluginType {
    type_name: &'static str,
    type_id: TypeId,
    capability: Option<Category>,
    factory: Option<Factory>,
}

impl PluginType {
    /// Transform type built with `T::default()`.
    pub fn transform<T: TransformPlugin + Default + 'static>() -> Self {
        Self::transform_with(|| Ok(T::default()))
    }

    /// Transform type built with a fallible constructor.
    pub fn transform_with<T, F>(ctor: F) -> Self
    where
        T: TransformPlugin + 'static,
        F: Fn() -> PluginResult<T> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            capability: Some(Category::Transform),
            factory: Some(Arc::new(move || ctor().map(PluginInstance::transform))),
        }
    }

    /// Action type built with `T::default()`.
    pub fn action<T: ActionPlugin + Default + 'static>() -> Self {
        Self::action_with(|| Ok(T::default()))
    }

    /// Action type built with a fallible constructor.
    pub fn action_with<T, F>(ctor: F) -> Self
    where
        T: ActionPlugin + 'static,
        F: Fn() -> PluginResult<T> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            capability: Some(Category::Action),
            factory: Some(Arc::new(move || ctor().map(PluginInstance::action))),
        }
    }

    /// A type implementing no plugin capability.
    ///
    /// Scanners may hand these over; registration rejects them.
    pub fn opaque<T: 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            capability: None,
            factory: None,
        }
    }

    /// Fully qualified Rust type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Short type name without the module path.
    pub fn short_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }

    /// Rust type identity.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Declared capability, `None` for opaque types.
    pub fn capability(&self) -> Option<Category> {
        self.capability
    }

    /// Whether this describes `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Construct a fresh default instance.
    ///
    /// Constructor side effects happen on every call, including the
    /// construction `register` and `list_plugins` perform to read the
    /// identifier and category.
    pub fn instantiate(&self) -> Result<PluginInstance> {
        let factory = self.factory.as_ref().ok_or_else(|| Error::InvalidType {
            type_name: self.type_name.to_string(),
            reason: "type implements no plugin capability".to_string(),
        })?;

        let instance = factory().map_err(|source| Error::Construction {
            type_name: self.type_name.to_string(),
            source,
        })?;

        if instance.descriptor().name().is_empty() {
            return Err(Error::InvalidType {
                type_name: self.type_name.to_string(),
                reason: "plugin name must not be empty".to_string(),
            });
        }

        Ok(instance)
    }
}

impl PartialEq for PluginType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for PluginType {}

impl std::fmt::Debug for PluginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginType")
            .field("type_name", &self.type_name)
            .field("capability", &self.capability)
            .finish()
    }
}

#[derive(Default)]
struct RegistryState {
    types: IndexMap<String, PluginType>,
    instances: IndexMap<String, SharedPlugin>,
}

/// Plugin registry.
///
/// The type map and the instance map are independent namespaces: an
/// identifier may appear in both, and removing from one never touches the
/// other.
pub struct PluginRegistry {
    /// Registered types and instances
    state: RwLock<RegistryState>,
    /// Registry configuration
    config: RegistryConfig,
}

impl PluginRegistry {
    /// Create a registry accepting every known category.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            config,
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a plugin type and return its identifier.
    ///
    /// The type's capability must be in the accepted set. A default
    /// instance is constructed to read the identifier before the
    /// uniqueness check.
    pub fn register(&self, plugin_type: PluginType) -> Result<String> {
        let capability = self.check_capability(&plugin_type)?;

        let instance = plugin_type.instantiate()?;
        debug_assert_eq!(instance.category(), capability);
        let id = instance.identifier().to_string();
        drop(instance);

        let mut state = self.state.write();
        if state.types.contains_key(&id) {
            return Err(Error::DuplicateIdentifier(id));
        }

        tracing::debug!(
            plugin_id = %id,
            category = %capability,
            type_name = plugin_type.type_name(),
            "registered plugin type"
        );
        state.types.insert(id.clone(), plugin_type);

        Ok(id)
    }

    /// Register a live instance.
    ///
    /// Only the instance map is checked; the type need not be registered.
    pub fn register_instance(&self, instance: PluginInstance) -> Result<SharedPlugin> {
        let id = instance.identifier().to_string();
        let category = instance.category();

        let mut state = self.state.write();
        if state.instances.contains_key(&id) {
            return Err(Error::DuplicateIdentifier(id));
        }

        let shared = instance.into_shared();
        state.instances.insert(id.clone(), Arc::clone(&shared));
        tracing::debug!(plugin_id = %id, category = %category, "registered plugin instance");

        Ok(shared)
    }

    /// Remove a registered type.
    pub fn unregister(&self, plugin_id: &str) -> Option<PluginType> {
        let removed = self.state.write().types.shift_remove(plugin_id);
        if removed.is_some() {
            tracing::debug!(plugin_id, "unregistered plugin type");
        }
        removed
    }

    /// Remove a registered instance.
    pub fn unregister_instance(&self, plugin_id: &str) -> Option<SharedPlugin> {
        let removed = self.state.write().instances.shift_remove(plugin_id);
        if removed.is_some() {
            tracing::debug!(plugin_id, "unregistered plugin instance");
        }
        removed
    }

    /// Get plugin type by ID.
    pub fn get_plugin_class(&self, plugin_id: &str) -> Option<PluginType> {
        self.state.read().types.get(plugin_id).cloned()
    }

    /// Get plugin instance by ID.
    pub fn get_plugin_instance(&self, plugin_id: &str) -> Option<SharedPlugin> {
        self.state.read().instances.get(plugin_id).cloned()
    }

    /// Construct a fresh instance of a registered type.
    pub fn create_instance(&self, plugin_id: &str) -> Result<Option<PluginInstance>> {
        match self.get_plugin_class(plugin_id) {
            Some(plugin_type) => plugin_type.instantiate().map(Some),
            None => Ok(None),
        }
    }

    /// List registered type identifiers in registration order.
    ///
    /// With a category, each type is constructed and kept only when its
    /// instance reports that category. Types that fail to construct are
    /// left out.
    pub fn list_plugins(&self, category: Option<Category>) -> Vec<String> {
        let entries: Vec<(String, PluginType)> = self
            .state
            .read()
            .types
            .iter()
            .map(|(id, plugin_type)| (id.clone(), plugin_type.clone()))
            .collect();

        let Some(category) = category else {
            return entries.into_iter().map(|(id, _)| id).collect();
        };

        entries
            .into_iter()
            .filter(|(id, plugin_type)| match plugin_type.instantiate() {
                Ok(instance) => instance.category() == category,
                Err(e) => {
                    tracing::warn!(plugin_id = %id, error = %e, "failed to construct plugin for listing");
                    false
                }
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Summary of a registered type.
    pub fn describe(&self, plugin_id: &str) -> Result<Option<PluginSummary>> {
        let Some(plugin_type) = self.get_plugin_class(plugin_id) else {
            return Ok(None);
        };
        let instance = plugin_type.instantiate()?;
        Ok(Some(instance.summary(plugin_type.short_name())))
    }

    /// Register every valid candidate from `source`.
    ///
    /// Candidates that fail validation, construction, or the uniqueness
    /// check are skipped. Only a source that cannot produce candidates at
    /// all fails the call, and then nothing is registered.
    pub fn discover_plugins<S: CandidateSource + ?Sized>(&self, source: &S) -> Result<usize> {
        let candidates = source.candidates()?;
        let total = candidates.len();

        let mut count = 0;
        for candidate in candidates {
            let type_name = candidate.type_name();
            match self.register(candidate) {
                Ok(_) => count += 1,
                Err(Error::DuplicateIdentifier(id)) => {
                    tracing::debug!(plugin_id = %id, type_name, "plugin already registered, skipping");
                }
                Err(e) => {
                    tracing::warn!(type_name, error = %e, "skipping plugin candidate");
                }
            }
        }

        tracing::info!(
            source = %source.describe(),
            candidates = total,
            registered = count,
            "plugin discovery finished"
        );
        Ok(count)
    }

    /// Remove every type and instance.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.types.clear();
        state.instances.clear();
    }

    /// Whether a type is registered under `plugin_id`.
    pub fn contains(&self, plugin_id: &str) -> bool {
        self.state.read().types.contains_key(plugin_id)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.state.read().types.len()
    }

    /// Number of registered instances.
    pub fn instance_count(&self) -> usize {
        self.state.read().instances.len()
    }

    /// True when no types are registered. Instances are not counted; see
    /// [`PluginRegistry::has_instances`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any live instance is registered.
    pub fn has_instances(&self) -> bool {
        self.instance_count() > 0
    }

    /// Manifest directory source using this registry's discovery settings.
    pub fn manifest_source(&self, dir: impl Into<PathBuf>, catalog: TypeCatalog) -> ManifestDirectory {
        ManifestDirectory::with_config(dir, catalog, self.config.discovery.clone())
    }

    fn check_capability(&self, plugin_type: &PluginType) -> Result<Category> {
        match plugin_type.capability() {
            Some(category) if self.config.accepts(category) => Ok(category),
            Some(category) => Err(Error::InvalidType {
                type_name: plugin_type.type_name().to_string(),
                reason: format!("category {} is not accepted by this registry", category),
            }),
            None => Err(Error::InvalidType {
                type_name: plugin_type.type_name().to_string(),
                reason: "type implements no plugin capability".to_string(),
            }),
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("PluginRegistry")
            .field("types", &state.types.keys().collect::<Vec<_>>())
            .field("instances", &state.instances.keys().collect::<Vec<_>>())
            .finish()
    }
}

static DEFAULT_REGISTRY: LazyLock<PluginRegistry> = LazyLock::new(PluginRegistry::new);

/// The process-wide registry.
pub fn default_registry() -> &'static PluginRegistry {
    &DEFAULT_REGISTRY
}

/// Register a type in the process-wide registry and hand it back.
///
/// Call right after defining a plugin type; behaves exactly like
/// [`PluginRegistry::register`].
pub fn register_plugin(plugin_type: PluginType) -> Result<PluginType> {
    register_plugin_in(default_registry(), plugin_type)
}

/// Register a type in `registry` and hand it back.
pub fn register_plugin_in(registry: &PluginRegistry, plugin_type: PluginType) -> Result<PluginType> {
    registry.register(plugin_type.clone())?;
    Ok(plugin_type)
}
