//! Namespace resource plugin.
//!
//! Namespaces are cluster-scoped, so every call passes an empty namespace
//! argument to the cluster client, and the object name IS the namespace.
//! Create ignores the request's definition file: the lifecycle manager
//! ensures namespaces synthetically, before any other resource, by calling
//! `get` and falling back to `create` when the namespace is absent.
//!
//! `list` is not implemented; the capability resolves to
//! `CapabilityNotFound`.

use async_trait::async_trait;
use tracing::debug;

use crate::cluster::{ClusterClient, KubeObject};
use crate::constants::validate_namespace;
use crate::error::{Result, ResultExt};
use crate::plugin::{ResourcePlugin, ResourceRequest};

use super::effective_namespace;

/// Cluster-side kind handled by this plugin.
const KIND: &str = "namespace";

/// Handler for the "namespace" resource type.
pub struct NamespacePlugin;

#[async_trait]
impl ResourcePlugin for NamespacePlugin {
    fn resource_type(&self) -> &str {
        "namespace"
    }

    async fn create(
        &self,
        request: &ResourceRequest,
        cluster: &dyn ClusterClient,
    ) -> Result<String> {
        let namespace = effective_namespace(&request.namespace);
        validate_namespace(namespace)?;

        let object = KubeObject::named("v1", "Namespace", namespace);
        cluster
            .create_object("", &object)
            .await
            .with_context(|| format!("creating namespace '{}'", namespace))?;

        debug!("Created namespace '{}'", namespace);
        Ok(namespace.to_string())
    }

    async fn delete(
        &self,
        name: &str,
        _namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<()> {
        cluster
            .delete_object(KIND, "", name)
            .await
            .with_context(|| format!("deleting namespace '{}'", name))
    }

    async fn get(
        &self,
        name: &str,
        _namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<String> {
        let object = cluster.get_object(KIND, "", name).await?;
        Ok(object.metadata.name)
    }
}
