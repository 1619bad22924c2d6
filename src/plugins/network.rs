//! Virtual network resource plugin.
//!
//! Network objects are backed by a CNI provider, and each provider gets its
//! own registry entry: a `NetworkPlugin` built for provider `ovn4nfv`
//! registers as resource type `ovn4nfv-network`. The definition file names
//! its provider in `spec.cnitype`; a file whose provider differs from the
//! plugin it was routed to is rejected rather than silently created by the
//! wrong backend.
//!
//! Only Create and Delete are implemented; `get` and `list` resolve to
//! `CapabilityNotFound`.

use async_trait::async_trait;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::{Error, Result, ResultExt};
use crate::plugin::{ResourcePlugin, ResourceRequest};

use super::{effective_namespace, object_from_request};

/// CNI provider registered by default.
pub const DEFAULT_CNI: &str = "ovn4nfv";

/// Cluster-side kind handled by this plugin.
const KIND: &str = "network";

/// Handler for one `<cni>-network` resource type.
pub struct NetworkPlugin {
    resource_type: String,
    cni: String,
}

impl NetworkPlugin {
    /// Builds the handler for `cni`, registered as `<cni>-network`.
    pub fn new(cni: &str) -> Self {
        Self {
            resource_type: format!("{}-network", cni),
            cni: cni.to_string(),
        }
    }

    /// The CNI provider this plugin serves.
    pub fn cni(&self) -> &str {
        &self.cni
    }

    fn check_cni(&self, request: &ResourceRequest, object: &crate::cluster::KubeObject) -> Result<()> {
        let declared = object
            .extra
            .get("spec")
            .and_then(|spec| spec.get("cnitype"))
            .and_then(serde_yaml::Value::as_str);

        match declared {
            Some(cni) if cni == self.cni => Ok(()),
            Some(cni) => Err(Error::InvalidResource {
                path: request.yaml_path.clone(),
                reason: format!(
                    "cnitype '{}' does not match plugin '{}'",
                    cni, self.resource_type
                ),
            }),
            None => Err(Error::InvalidResource {
                path: request.yaml_path.clone(),
                reason: "spec.cnitype is required".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ResourcePlugin for NetworkPlugin {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    async fn create(
        &self,
        request: &ResourceRequest,
        cluster: &dyn ClusterClient,
    ) -> Result<String> {
        let object = object_from_request(request, KIND)?;
        self.check_cni(request, &object)?;
        let namespace = effective_namespace(&request.namespace);

        let name = cluster
            .create_object(namespace, &object)
            .await
            .with_context(|| format!("creating network from {}", request.yaml_path.display()))?;

        debug!(
            "Created {} network '{}' in namespace '{}'",
            self.cni, name, namespace
        );
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
            .with_context(|| format!("deleting network '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalCluster;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    const NETWORK_YAML: &str = r#"
apiVersion: k8s.plugin.opnfv.org/v1alpha1
kind: Network
metadata:
  name: management
spec:
  cnitype: ovn4nfv
  subnet: 10.0.0.0/24
"#;

    #[tokio::test]
    async fn create_network_with_matching_cni() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("net.yaml");
        fs::write(&path, NETWORK_YAML).unwrap();

        let cluster = LocalCluster::new();
        let plugin = NetworkPlugin::new("ovn4nfv");
        assert_eq!(plugin.resource_type(), "ovn4nfv-network");

        let request = ResourceRequest::new(&path, "default", "r1-default-0001");
        let name = plugin.create(&request, &cluster).await.unwrap();
        assert_eq!(name, "r1-default-0001-management");
    }

    #[tokio::test]
    async fn create_rejects_foreign_cni() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("net.yaml");
        fs::write(&path, NETWORK_YAML.replace("ovn4nfv", "flannel")).unwrap();

        let cluster = LocalCluster::new();
        let plugin = NetworkPlugin::new("ovn4nfv");
        let request = ResourceRequest::new(&path, "default", "id");

        let err = plugin.create(&request, &cluster).await.unwrap_err();
        assert!(err.to_string().contains("does not match plugin"));
    }

    #[tokio::test]
    async fn get_is_not_a_capability() {
        let cluster = LocalCluster::new();
        let plugin = NetworkPlugin::new("ovn4nfv");
        let err = plugin.get("n", "default", &cluster).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapabilityNotFound);
        assert!(err.to_string().contains("ovn4nfv-network"));
    }
}
