//! Service resource plugin.
//!
//! Same shape as the deployment plugin: addressing comes from the request,
//! everything else from the definition file.

use async_trait::async_trait;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::{Result, ResultExt};
use crate::plugin::{ResourcePlugin, ResourceRequest};

use super::{effective_namespace, object_from_request};

/// Cluster-side kind handled by this plugin.
const KIND: &str = "service";

/// Handler for the "service" resource type.
pub struct ServicePlugin;

#[async_trait]
impl ResourcePlugin for ServicePlugin {
    fn resource_type(&self) -> &str {
        "service"
    }

    async fn create(
        &self,
        request: &ResourceRequest,
        cluster: &dyn ClusterClient,
    ) -> Result<String> {
        let object = object_from_request(request, KIND)?;
        let namespace = effective_namespace(&request.namespace);

        let name = cluster
            .create_object(namespace, &object)
            .await
            .with_context(|| format!("creating service from {}", request.yaml_path.display()))?;

        debug!("Created service '{}' in namespace '{}'", name, namespace);
        Ok(name)
    }

    async fn delete(
        &self,
        name: &str,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<()> {
        let namespace = effective_namespace(namespace);
        cluster
            .delete_object(KIND, namespace, name)
            .await
            .with_context(|| format!("deleting service '{}'", name))
    }

    async fn get(
        &self,
        name: &str,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<String> {
        let namespace = effective_namespace(namespace);
        let object = cluster.get_object(KIND, namespace, name).await?;
        Ok(object.metadata.name)
    }

    async fn list(
        &self,
        limit: usize,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<Vec<String>> {
        let namespace = effective_namespace(namespace);
        cluster.list_objects(KIND, namespace, limit).await
    }
}
