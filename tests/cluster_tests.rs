//! Tests for the cluster client module.
//!
//! Validates the in-process cluster's addressing rules: case-insensitive
//! kinds, per-namespace name uniqueness, and creation-ordered listings.

use kubemux::{ClusterClient, KubeObject, LocalCluster};

// =============================================================================
// Addressing Tests
// =============================================================================

#[tokio::test]
async fn test_kinds_are_case_insensitive() {
    let cluster = LocalCluster::new();
    let object = KubeObject::named("apps/v1", "Deployment", "web");
    cluster.create_object("edge", &object).await.unwrap();

    let fetched = cluster.get_object("deployment", "edge", "web").await.unwrap();
    assert_eq!(fetched.metadata.name, "web");
    let fetched = cluster.get_object("DEPLOYMENT", "edge", "web").await.unwrap();
    assert_eq!(fetched.kind, "Deployment", "declared kind casing is preserved");
}

#[tokio::test]
async fn test_names_are_unique_per_namespace() {
    let cluster = LocalCluster::new();
    let object = KubeObject::named("apps/v1", "Deployment", "web");

    cluster.create_object("edge", &object).await.unwrap();
    // Same name in another namespace is a different object.
    cluster.create_object("core", &object).await.unwrap();

    let err = cluster.create_object("edge", &object).await.unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(cluster.object_count(), 2);
}

#[tokio::test]
async fn test_cluster_scoped_objects_use_empty_namespace() {
    let cluster = LocalCluster::new();
    let namespace = KubeObject::named("v1", "Namespace", "edge");
    cluster.create_object("", &namespace).await.unwrap();

    let fetched = cluster.get_object("namespace", "", "edge").await.unwrap();
    assert_eq!(fetched.metadata.name, "edge");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let cluster = LocalCluster::new();
    let object = KubeObject::named("v1", "Service", "api");
    cluster.create_object("edge", &object).await.unwrap();

    cluster.delete_object("service", "edge", "api").await.unwrap();
    let err = cluster.get_object("service", "edge", "api").await.unwrap_err();
    assert!(err.is_not_found());

    let err = cluster.delete_object("service", "edge", "api").await.unwrap_err();
    assert!(err.is_not_found(), "double delete should fail");
}

#[tokio::test]
async fn test_list_preserves_creation_order() {
    let cluster = LocalCluster::new();
    for name in ["web", "api", "cache"] {
        let object = KubeObject::named("apps/v1", "Deployment", name);
        cluster.create_object("edge", &object).await.unwrap();
    }

    let names = cluster.list_objects("deployment", "edge", 0).await.unwrap();
    assert_eq!(names, vec!["web", "api", "cache"]);

    let limited = cluster.list_objects("deployment", "edge", 2).await.unwrap();
    assert_eq!(limited, vec!["web", "api"]);
}

#[tokio::test]
async fn test_list_of_empty_namespace_is_empty() {
    let cluster = LocalCluster::new();
    let names = cluster.list_objects("deployment", "nowhere", 0).await.unwrap();
    assert!(names.is_empty());
}

// =============================================================================
// Definition Parsing Tests
// =============================================================================

#[test]
fn test_yaml_preserves_unmodeled_fields() {
    let yaml = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  labels:
    app: web
spec:
  replicas: 3
";
    let object = KubeObject::from_yaml(yaml).unwrap();
    assert_eq!(object.metadata.name, "web");
    assert_eq!(object.metadata.labels.get("app").unwrap(), "web");
    assert!(
        object.extra.contains_key("spec"),
        "spec should survive as an unmodeled field"
    );
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let err = KubeObject::from_yaml(": not yaml : [").unwrap_err();
    assert_eq!(err.kind(), kubemux::ErrorKind::Internal);
}
