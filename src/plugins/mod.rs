//! Built-in resource plugins and the plugin registry.
//!
//! Each plugin module handles one resource type through the shared
//! [`ResourcePlugin`] contract. The registry is the only name → handler
//! mapping in the system: it is built explicitly at startup (no global
//! state), handed by reference to whoever dispatches, and never mutated
//! afterwards.

pub mod deployment;
pub mod namespace;
pub mod network;
pub mod service;

pub use self::deployment::DeploymentPlugin;
pub use self::namespace::NamespacePlugin;
pub use self::network::NetworkPlugin;
pub use self::service::ServicePlugin;

use std::sync::Arc;

use tracing::debug;

use crate::cluster::KubeObject;
use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{Error, Result};
use crate::plugin::{ResourcePlugin, ResourceRequest};

/// Registry of resource-type handlers.
///
/// Populated once at startup and read-only afterwards; lookups take `&self`
/// and never block.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ResourcePlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Creates a registry with every built-in plugin registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NamespacePlugin));
        registry.register(Arc::new(DeploymentPlugin));
        registry.register(Arc::new(ServicePlugin));
        registry.register(Arc::new(NetworkPlugin::new(network::DEFAULT_CNI)));
        registry
    }

    /// Registers a plugin under its resource-type name.
    ///
    /// Re-registering a name replaces the previous handler.
    pub fn register(&mut self, plugin: Arc<dyn ResourcePlugin>) {
        let resource_type = plugin.resource_type().to_string();
        match self
            .plugins
            .iter()
            .position(|p| p.resource_type() == resource_type)
        {
            Some(i) => self.plugins[i] = plugin,
            None => self.plugins.push(plugin),
        }
        debug!("Registered plugin for resource type '{}'", resource_type);
    }

    /// Gets a plugin by resource-type name.
    pub fn get(&self, resource_type: &str) -> Option<&dyn ResourcePlugin> {
        self.plugins
            .iter()
            .find(|p| p.resource_type() == resource_type)
            .map(|p| p.as_ref())
    }

    /// Returns all registered plugins.
    pub fn all(&self) -> &[Arc<dyn ResourcePlugin>] {
        &self.plugins
    }

    /// Returns the registered resource-type names in registration order.
    pub fn resource_types(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.resource_type()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// =============================================================================
// Shared Plugin Helpers
// =============================================================================

/// Falls back to the default namespace when the request leaves it empty.
pub(crate) fn effective_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}

/// Loads the request's definition file and prepares it for creation.
///
/// Rejects a definition whose kind differs from `expected_kind`, requires
/// `metadata.name`, pins the namespace to the request's, and prefixes the
/// name with the internal VNF identifier.
pub(crate) fn object_from_request(
    request: &ResourceRequest,
    expected_kind: &str,
) -> Result<KubeObject> {
    let mut object = KubeObject::from_yaml_file(&request.yaml_path)?;

    if !object.kind.eq_ignore_ascii_case(expected_kind) {
        return Err(Error::InvalidResource {
            path: request.yaml_path.clone(),
            reason: format!(
                "expected kind '{}', found '{}'",
                expected_kind, object.kind
            ),
        });
    }
    if object.metadata.name.is_empty() {
        return Err(Error::InvalidResource {
            path: request.yaml_path.clone(),
            reason: "metadata.name is required".to_string(),
        });
    }

    object.metadata.namespace = Some(effective_namespace(&request.namespace).to_string());
    object.metadata.name = format!("{}-{}", request.vnf_id, object.metadata.name);
    Ok(object)
}
