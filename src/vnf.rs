//! Workload bundle lifecycle.
//!
//! [`VnfManager`] drives the two lifecycle operations: instantiating a bundle
//! against a cluster and destroying a previously created resource set. It
//! contains no per-kind logic; every resource is handed to the plugin
//! registered for its manifest type.
//!
//! Instantiation is not transactional. The creation loop aborts on the first
//! failure and reports everything created so far through
//! [`PartialInstantiation`](crate::error::Error::PartialInstantiation); the
//! caller decides whether to feed that partial set back into
//! [`VnfManager::destroy`].

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bundle::Bundle;
use crate::cluster::ClusterClient;
use crate::constants::{validate_name, validate_namespace};
use crate::error::{Error, Result, ResultExt};
use crate::plugin::ResourceRequest;
use crate::plugins::{effective_namespace, PluginRegistry};

/// Created resource names grouped by resource type, in creation order.
pub type ResourceMap = IndexMap<String, Vec<String>>;

/// Identity and inventory of one instantiated bundle.
///
/// The internal identifier is what resource names are prefixed with on the
/// cluster; the short external identifier is what callers quote back when
/// addressing the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnfHandle {
    /// Short random identifier unique per instantiation.
    pub external_id: String,
    /// Internal identifier: `<cloud-region>-<namespace>-<external-id>`.
    pub vnf_id: String,
    /// Cloud region the instance was placed in.
    pub cloud_region: String,
    /// Namespace every namespaced resource was created in.
    pub namespace: String,
    /// Names of all created resources, keyed by resource type.
    pub resources: ResourceMap,
}

/// Generates the short external identifier: two random bytes, hex encoded.
pub fn generate_external_id() -> String {
    let bytes: [u8; 2] = rand::random();
    hex::encode(bytes)
}

/// Derives the internal identifier from its three parts.
pub fn vnf_id(cloud_region: &str, namespace: &str, external_id: &str) -> String {
    format!("{}-{}-{}", cloud_region, namespace, external_id)
}

/// Bundle lifecycle manager.
///
/// Holds the plugin registry and the directory bundles are resolved under.
/// The manager itself is stateless across calls; clusters are passed per
/// operation.
pub struct VnfManager {
    registry: Arc<PluginRegistry>,
    bundle_root: PathBuf,
}

impl VnfManager {
    /// Builds a manager resolving bundle identifiers under `bundle_root`.
    pub fn new(registry: Arc<PluginRegistry>, bundle_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            bundle_root: bundle_root.into(),
        }
    }

    /// Returns the plugin registry this manager dispatches through.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Instantiates a bundle on the target cluster.
    ///
    /// `bundle_id` is resolved under the manager's bundle root; an absolute
    /// path is taken as-is. An empty `namespace` selects the default
    /// namespace. The namespace is created when absent and left alone when
    /// present.
    ///
    /// Resource types are processed in manifest order. For each type, every
    /// listed file is verified to exist before any resource of that type is
    /// created, so a missing file never interleaves with creations of the
    /// same type. The first failure aborts the whole operation; when
    /// resources were already created the error is wrapped in
    /// `PartialInstantiation` carrying their names.
    pub async fn instantiate(
        &self,
        bundle_id: &str,
        cloud_region: &str,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<VnfHandle> {
        validate_name(cloud_region)?;
        let namespace = effective_namespace(namespace).to_string();
        validate_namespace(&namespace)?;

        self.ensure_namespace(&namespace, cluster).await?;

        let external_id = generate_external_id();
        let vnf_id = vnf_id(cloud_region, &namespace, &external_id);
        debug!(%vnf_id, bundle_id, "instantiating bundle");

        let bundle = Bundle::open(self.bundle_root.join(bundle_id))?;

        let mut created = ResourceMap::new();
        if let Err(e) = self
            .create_resources(&bundle, &namespace, &vnf_id, cluster, &mut created)
            .await
        {
            if created.is_empty() {
                return Err(e);
            }
            return Err(Error::PartialInstantiation {
                partial: created,
                source: Box::new(e),
            });
        }

        info!(
            %vnf_id,
            resource_types = created.len(),
            "bundle instantiated"
        );

        Ok(VnfHandle {
            external_id,
            vnf_id,
            cloud_region: cloud_region.to_string(),
            namespace,
            resources: created,
        })
    }

    /// Destroys a previously created resource set.
    ///
    /// Deletes every named resource, type by type in map order, dispatching
    /// each to its plugin. The first failure aborts; already deleted entries
    /// stay deleted. The namespace itself is not removed.
    pub async fn destroy(
        &self,
        resources: &ResourceMap,
        namespace: &str,
        cluster: &dyn ClusterClient,
    ) -> Result<()> {
        let namespace = effective_namespace(namespace);

        for (resource_type, names) in resources {
            let plugin = self
                .registry
                .get(resource_type)
                .ok_or_else(|| Error::PluginNotFound(resource_type.clone()))?;

            for name in names {
                plugin
                    .delete(name, namespace, cluster)
                    .await
                    .with_context(|| format!("deleting {} '{}'", resource_type, name))?;
                debug!(resource_type, name, "resource deleted");
            }
        }

        info!(namespace, resource_types = resources.len(), "resource set destroyed");
        Ok(())
    }

    /// Creates the namespace when it does not exist yet.
    async fn ensure_namespace(&self, namespace: &str, cluster: &dyn ClusterClient) -> Result<()> {
        let plugin = self
            .registry
            .get("namespace")
            .ok_or_else(|| Error::PluginNotFound("namespace".to_string()))?;

        match plugin.get(namespace, "", cluster).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                let request = ResourceRequest::new("", namespace, "");
                plugin
                    .create(&request, cluster)
                    .await
                    .with_context(|| format!("ensuring namespace '{}'", namespace))?;
                debug!(namespace, "namespace created");
                Ok(())
            }
            Err(e) => Err(e.context(format!("checking namespace '{}'", namespace))),
        }
    }

    /// Runs the per-type creation loop, recording every created name.
    async fn create_resources(
        &self,
        bundle: &Bundle,
        namespace: &str,
        vnf_id: &str,
        cluster: &dyn ClusterClient,
        created: &mut ResourceMap,
    ) -> Result<()> {
        for (resource_type, files) in &bundle.manifest().resources {
            bundle.verify_type_files(resource_type)?;

            let plugin = self
                .registry
                .get(resource_type)
                .ok_or_else(|| Error::PluginNotFound(resource_type.clone()))?;

            for file in files {
                let request =
                    ResourceRequest::new(bundle.resource_file(file), namespace, vnf_id);
                let name = plugin
                    .create(&request, cluster)
                    .await
                    .with_context(|| format!("creating {} from '{}'", resource_type, file))?;
                debug!(resource_type, name, "resource created");
                created
                    .entry(resource_type.clone())
                    .or_default()
                    .push(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleBuilder;
    use crate::cluster::LocalCluster;
    use tempfile::TempDir;

    const DEPLOYMENT_YAML: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
";

    fn manager(root: &TempDir) -> VnfManager {
        VnfManager::new(Arc::new(PluginRegistry::with_builtins()), root.path())
    }

    #[test]
    fn external_id_is_four_hex_chars() {
        let id = generate_external_id();
        assert_eq!(id.len(), 4);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn vnf_id_joins_all_three_parts() {
        assert_eq!(vnf_id("region1", "edge", "a1b2"), "region1-edge-a1b2");
    }

    #[tokio::test]
    async fn instantiate_creates_namespace_and_resources() {
        let root = TempDir::new().unwrap();
        BundleBuilder::new()
            .with_resource("deployment", "web.yaml", DEPLOYMENT_YAML)
            .write_to(&root.path().join("demo"))
            .unwrap();

        let cluster = LocalCluster::new();
        let handle = manager(&root)
            .instantiate("demo", "region1", "edge", &cluster)
            .await
            .unwrap();

        assert_eq!(handle.cloud_region, "region1");
        assert_eq!(handle.namespace, "edge");
        assert_eq!(
            handle.vnf_id,
            format!("region1-edge-{}", handle.external_id)
        );
        assert_eq!(
            handle.resources.get("deployment").unwrap(),
            &vec![format!("{}-web", handle.vnf_id)]
        );
        // Namespace plus deployment.
        assert_eq!(cluster.object_count(), 2);
    }

    #[tokio::test]
    async fn destroy_removes_created_resources() {
        let root = TempDir::new().unwrap();
        BundleBuilder::new()
            .with_resource("deployment", "web.yaml", DEPLOYMENT_YAML)
            .write_to(&root.path().join("demo"))
            .unwrap();

        let cluster = LocalCluster::new();
        let mgr = manager(&root);
        let handle = mgr
            .instantiate("demo", "region1", "edge", &cluster)
            .await
            .unwrap();

        mgr.destroy(&handle.resources, &handle.namespace, &cluster)
            .await
            .unwrap();
        // Only the namespace object remains.
        assert_eq!(cluster.object_count(), 1);
    }
}
