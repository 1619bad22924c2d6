//! Tests for the bundle lifecycle manager.
//!
//! Validates instantiation ordering, identity construction, partial-failure
//! reporting, namespace handling, and destroy.

use std::sync::Arc;

use kubemux::{
    BundleBuilder, ClusterClient, Error, ErrorKind, LocalCluster, PluginRegistry, VnfManager,
};
use tempfile::TempDir;

const DEPLOYMENT_WEB: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
";

const DEPLOYMENT_WORKER: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: worker
";

const SERVICE_API: &str = "\
apiVersion: v1
kind: Service
metadata:
  name: api
";

fn manager(root: &TempDir) -> VnfManager {
    VnfManager::new(Arc::new(PluginRegistry::with_builtins()), root.path())
}

fn write_demo_bundle(root: &TempDir) {
    BundleBuilder::new()
        .with_resource("deployment", "web.yaml", DEPLOYMENT_WEB)
        .with_resource("deployment", "worker.yaml", DEPLOYMENT_WORKER)
        .with_resource("service", "api.yaml", SERVICE_API)
        .write_to(&root.path().join("demo"))
        .unwrap();
}

// =============================================================================
// Instantiation Tests
// =============================================================================

#[tokio::test]
async fn test_handle_mirrors_the_manifest() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();

    let handle = manager(&root)
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();

    let types: Vec<&str> = handle.resources.keys().map(String::as_str).collect();
    assert_eq!(types, vec!["deployment", "service"], "manifest order");
    assert_eq!(
        handle.resources.get("deployment").unwrap(),
        &vec![
            format!("{}-web", handle.vnf_id),
            format!("{}-worker", handle.vnf_id)
        ]
    );
    assert_eq!(
        handle.resources.get("service").unwrap(),
        &vec![format!("{}-api", handle.vnf_id)]
    );

    // Every named resource is reachable on the cluster.
    for (resource_type, names) in &handle.resources {
        for name in names {
            cluster
                .get_object(resource_type, "edge", name)
                .await
                .unwrap();
        }
    }
}

#[tokio::test]
async fn test_identity_parts_compose_the_internal_id() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();

    let handle = manager(&root)
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();

    assert_eq!(handle.external_id.len(), 4);
    assert!(handle.external_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(
        handle.vnf_id,
        format!("region1-edge-{}", handle.external_id)
    );
}

#[tokio::test]
async fn test_instances_of_the_same_bundle_do_not_collide() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();
    let mgr = manager(&root);

    let first = mgr
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();
    let second = mgr
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();

    assert_ne!(first.vnf_id, second.vnf_id);
    // One namespace plus two full resource sets of three.
    assert_eq!(cluster.object_count(), 7);
}

#[tokio::test]
async fn test_empty_namespace_defaults() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();

    let handle = manager(&root)
        .instantiate("demo", "region1", "", &cluster)
        .await
        .unwrap();

    assert_eq!(handle.namespace, "default");
    cluster.get_object("namespace", "", "default").await.unwrap();
}

#[tokio::test]
async fn test_existing_namespace_is_reused() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();
    let mgr = manager(&root);

    mgr.instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();
    mgr.instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();

    let namespaces = cluster.list_objects("namespace", "", 0).await.unwrap();
    assert_eq!(namespaces, vec!["edge"], "namespace created exactly once");
}

#[tokio::test]
async fn test_missing_bundle_is_reported_plainly() {
    let root = TempDir::new().unwrap();
    let cluster = LocalCluster::new();

    let err = manager(&root)
        .instantiate("ghost", "region1", "edge", &cluster)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(
        !matches!(err, Error::PartialInstantiation { .. }),
        "nothing was created, so no partial payload"
    );
}

// =============================================================================
// Failure Ordering Tests
// =============================================================================

#[tokio::test]
async fn test_missing_file_aborts_before_its_type_creates_anything() {
    let root = TempDir::new().unwrap();
    let bundle_dir = root.path().join("demo");
    BundleBuilder::new()
        .with_resource("deployment", "web.yaml", DEPLOYMENT_WEB)
        .with_resource("service", "api.yaml", SERVICE_API)
        .write_to(&bundle_dir)
        .unwrap();
    // The manifest still lists api.yaml; the file is gone.
    std::fs::remove_file(bundle_dir.join("api.yaml")).unwrap();

    let cluster = LocalCluster::new();
    let err = manager(&root)
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap_err();

    match err {
        Error::PartialInstantiation { partial, source } => {
            // The earlier type was fully created.
            assert_eq!(partial.get("deployment").unwrap().len(), 1);
            // The failing type never started.
            assert!(partial.get("service").is_none());
            assert_eq!(source.kind(), ErrorKind::NotFound);
            assert!(source.to_string().contains("api.yaml"));
        }
        other => panic!("unexpected error: {}", other),
    }

    // Namespace and deployment only; no service objects.
    assert!(cluster
        .list_objects("service", "edge", 0)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        cluster.list_objects("deployment", "edge", 0).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_unregistered_type_names_the_type() {
    let root = TempDir::new().unwrap();
    BundleBuilder::new()
        .with_resource("statefulset", "db.yaml", "apiVersion: apps/v1\nkind: StatefulSet\nmetadata:\n  name: db\n")
        .write_to(&root.path().join("demo"))
        .unwrap();

    let cluster = LocalCluster::new();
    let err = manager(&root)
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap_err();

    // First type fails, so nothing was created and the error is unwrapped.
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("statefulset"));
    assert!(!matches!(err, Error::PartialInstantiation { .. }));
}

#[tokio::test]
async fn test_unregistered_type_after_successes_reports_partial() {
    let root = TempDir::new().unwrap();
    BundleBuilder::new()
        .with_resource("deployment", "web.yaml", DEPLOYMENT_WEB)
        .with_resource("statefulset", "db.yaml", "apiVersion: apps/v1\nkind: StatefulSet\nmetadata:\n  name: db\n")
        .write_to(&root.path().join("demo"))
        .unwrap();

    let cluster = LocalCluster::new();
    let err = manager(&root)
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap_err();

    match err {
        Error::PartialInstantiation { partial, source } => {
            assert_eq!(partial.get("deployment").unwrap().len(), 1);
            assert!(source.to_string().contains("statefulset"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// =============================================================================
// Destroy Tests
// =============================================================================

#[tokio::test]
async fn test_destroy_removes_every_created_resource() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();
    let mgr = manager(&root);

    let handle = mgr
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();
    assert_eq!(cluster.object_count(), 4);

    mgr.destroy(&handle.resources, &handle.namespace, &cluster)
        .await
        .unwrap();

    // The namespace is deliberately left behind.
    assert_eq!(cluster.object_count(), 1);
    cluster.get_object("namespace", "", "edge").await.unwrap();
}

#[tokio::test]
async fn test_destroy_can_consume_a_partial_set() {
    let root = TempDir::new().unwrap();
    let bundle_dir = root.path().join("demo");
    BundleBuilder::new()
        .with_resource("deployment", "web.yaml", DEPLOYMENT_WEB)
        .with_resource("service", "api.yaml", SERVICE_API)
        .write_to(&bundle_dir)
        .unwrap();
    std::fs::remove_file(bundle_dir.join("api.yaml")).unwrap();

    let cluster = LocalCluster::new();
    let mgr = manager(&root);
    let err = mgr
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap_err();

    let partial = match err {
        Error::PartialInstantiation { partial, .. } => partial,
        other => panic!("unexpected error: {}", other),
    };

    mgr.destroy(&partial, "edge", &cluster).await.unwrap();
    assert_eq!(cluster.object_count(), 1, "only the namespace remains");
}

#[tokio::test]
async fn test_destroy_aborts_on_first_missing_resource() {
    let root = TempDir::new().unwrap();
    write_demo_bundle(&root);
    let cluster = LocalCluster::new();
    let mgr = manager(&root);

    let handle = mgr
        .instantiate("demo", "region1", "edge", &cluster)
        .await
        .unwrap();

    // Delete one deployment out from under the manager.
    let first = handle.resources.get("deployment").unwrap()[0].clone();
    cluster
        .delete_object("deployment", "edge", &first)
        .await
        .unwrap();

    let err = mgr
        .destroy(&handle.resources, &handle.namespace, &cluster)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains(&first));
}
