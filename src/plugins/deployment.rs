//! Deployment resource plugin.
//!
//! Creates workload deployments from definition files. The created object
//! keeps everything the file declares except its addressing: the namespace
//! is pinned to the request's and the name is prefixed with the internal
//! VNF identifier, so one definition file can be instantiated many times
//! in the same cluster without collisions.
//!
//! Implements all four capabilities.

use async_trait::async_trait;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::{Result, ResultExt};
use crate::plugin::{ResourcePlugin, ResourceRequest};

use super::{effective_namespace, object_from_request};

/// Cluster-side kind handled by this plugin.
const KIND: &str = "deployment";

/// Handler for the "deployment" resource type.
pub struct DeploymentPlugin;

#[async_trait]
impl ResourcePlugin for DeploymentPlugin {
    fn resource_type(&self) -> &str {
        "deployment"
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
            .with_context(|| {
                format!(
                    "creating deployment from {}",
                    request.yaml_path.display()
                )
            })?;

        debug!("Created deployment '{}' in namespace '{}'", name, namespace);
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
            .with_context(|| format!("deleting deployment '{}'", name))
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
