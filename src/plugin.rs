//! Resource plugin contract.
//!
//! A plugin implements the lifecycle of exactly one resource type
//! ("deployment", "service", "namespace", "<cni>-network") and is registered
//! in a [`PluginRegistry`](crate::plugins::PluginRegistry) under that name.
//! The lifecycle manager never contains per-kind logic; it resolves the
//! plugin for a manifest entry and dispatches to it.
//!
//! Create and Delete are required capabilities. Get and List are optional:
//! their default bodies fail with `CapabilityNotFound`, so invoking an
//! unimplemented capability is an ordinary runtime error rather than a
//! missing symbol.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::cluster::ClusterClient;
use crate::error::Result;

/// One resource-creation request dispatched to a plugin.
///
/// Built by the lifecycle manager per manifest file: the definition file
/// path, the target namespace, and the internal VNF identifier every created
/// resource name is prefixed with.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// Definition file to create the resource from.
    pub yaml_path: PathBuf,
    /// Target namespace.
    pub namespace: String,
    /// Internal VNF identifier for this instantiation.
    pub vnf_id: String,
}

impl ResourceRequest {
    /// Builds a request.
    pub fn new(
        yaml_path: impl Into<PathBuf>,
        namespace: impl Into<String>,
        vnf_id: impl Into<String>,
    ) -> Self {
        Self {
            yaml_path: yaml_path.into(),
            namespace: namespace.into(),
            vnf_id: vnf_id.into(),
        }
    }
}

/// Handler for one resource type.
///
/// Every method receives the target-cluster client per call, so a single
/// registered plugin serves any number of clusters.
#[async_trait]
pub trait ResourcePlugin: Send + Sync {
    /// Returns the resource-type name this plugin is registered under.
    fn resource_type(&self) -> &str;

    /// Creates one resource from a definition file.
    ///
    /// Returns the created resource name (typically the definition's name
    /// prefixed with the request's VNF identifier).
    async fn create(
        &self,
        request: &ResourceRequest,
        cluster: &dyn ClusterClient,
    ) -> Result<String>;

    /// Deletes one named resource.
    async fn delete(&self, name: &str, namespace: &str, cluster: &dyn ClusterClient)
        -> Result<()>;

    // =========================================================================
    // Optional Capabilities
    // =========================================================================

    /// Fetches one named resource, returning its name when present.
    ///
    /// This is an optional capability - not all plugins implement it.
    async fn get(&self, name: &str, namespace: &str, cluster: &dyn ClusterClient)
        -> Result<String> {
        let _ = (name, namespace, cluster);
        Err(crate::error::Error::CapabilityNotFound {
            plugin: self.resource_type().to_string(),
            capability: "get".to_string(),
        })
    }

    /// Lists resource names of this type in the namespace.
    ///
    /// This is an optional capability - not all plugins implement it.
    async fn list(
        &self,
        limit: usize,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<Vec<String>> {
        let _ = (limit, namespace, cluster);
        Err(crate::error::Error::CapabilityNotFound {
            plugin: self.resource_type().to_string(),
            capability: "list".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalCluster;
    use crate::error::ErrorKind;

    struct MinimalPlugin;

    #[async_trait]
    impl ResourcePlugin for MinimalPlugin {
        fn resource_type(&self) -> &str {
            "minimal"
        }

        async fn create(
            &self,
            request: &ResourceRequest,
            _cluster: &dyn ClusterClient,
        ) -> Result<String> {
            Ok(format!("{}-stub", request.vnf_id))
        }

        async fn delete(
            &self,
            _name: &str,
            _namespace: &str,
            _cluster: &dyn ClusterClient,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn default_get_is_capability_not_found() {
        let plugin = MinimalPlugin;
        let cluster = LocalCluster::new();
        let err = plugin.get("x", "default", &cluster).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapabilityNotFound);
        assert!(err.to_string().contains("minimal"));
        assert!(err.to_string().contains("get"));
    }

    #[tokio::test]
    async fn default_list_is_capability_not_found() {
        let plugin = MinimalPlugin;
        let cluster = LocalCluster::new();
        let err = plugin.list(10, "default", &cluster).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapabilityNotFound);
        assert!(err.to_string().contains("list"));
    }

    #[tokio::test]
    async fn required_methods_dispatch() {
        let plugin = MinimalPlugin;
        let cluster = LocalCluster::new();
        let request = ResourceRequest::new("r.yaml", "default", "r1-default-ab12");
        let name = plugin.create(&request, &cluster).await.unwrap();
        assert_eq!(name, "r1-default-ab12-stub");
    }
}
