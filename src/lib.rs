//! # kubemux
//!
//! **Multi-Cluster Kubernetes Workload Orchestration Layer**
//!
//! This crate instantiates versioned workload bundles onto Kubernetes
//! clusters across cloud regions. It handles bundle-level operations only -
//! scheduling against live inventory and long-running reconciliation are
//! delegated to the surrounding platform.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                            kubemux                             │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │                        VnfManager                        │  │
//! │  │   instantiate(bundle, region, namespace) → VnfHandle     │  │
//! │  │   destroy(resources, namespace)                          │  │
//! │  └────────────────────────────┬─────────────────────────────┘  │
//! │                               │ dispatch by resource type      │
//! │  ┌────────────────────────────┴─────────────────────────────┐  │
//! │  │                      PluginRegistry                      │  │
//! │  │   namespace │ deployment │ service │ <cni>-network       │  │
//! │  └────────────────────────────┬─────────────────────────────┘  │
//! │                               │ create / delete / get / list   │
//! │  ┌────────────────────────────┴─────────────────────────────┐  │
//! │  │                   ClusterClient Trait                    │  │
//! │  │        (LocalCluster: in-process simulation)             │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! ├────────────────────────────────────────────────────────────────┤
//! │   KeyedStore Records              Placement Intent Resolver    │
//! │   projects │ definitions          allOf / anyOf trees          │
//! │   connectivity │ instances        → clusters by name / label   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Instantiation Flow
//!
//! 1. Ensure the target namespace exists (created when absent).
//! 2. Mint the instance identity: a short random external identifier and the
//!    internal `<region>-<namespace>-<external-id>` identifier used as the
//!    resource-name prefix.
//! 3. Open the bundle and walk its manifest in order. For each resource
//!    type: verify every listed file exists, resolve the registered plugin,
//!    then create each resource through it.
//! 4. Return a [`VnfHandle`] naming everything that was created.
//!
//! # Partial Failure
//!
//! Instantiation is not transactional. The first failure aborts the run and,
//! when resources were already created, surfaces as
//! [`Error::PartialInstantiation`] carrying their names. Nothing is rolled
//! back automatically; the caller can hand the partial set to
//! [`VnfManager::destroy`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kubemux::{LocalCluster, PluginRegistry, VnfManager};
//!
//! #[tokio::main]
//! async fn main() -> kubemux::Result<()> {
//!     let registry = Arc::new(PluginRegistry::with_builtins());
//!     let manager = VnfManager::new(registry, "./bundles");
//!
//!     let cluster = LocalCluster::new();
//!     let handle = manager
//!         .instantiate("demo", "region1", "edge", &cluster)
//!         .await?;
//!     println!("created {}", handle.vnf_id);
//!
//!     manager
//!         .destroy(&handle.resources, &handle.namespace, &cluster)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod placement;
pub mod plugin;
pub mod records;
pub mod store;
pub mod vnf;

pub mod plugins;

// Re-exports
pub use bundle::{Bundle, BundleBuilder, ResourceManifest};
pub use cluster::{ClusterClient, KubeObject, LocalCluster, ObjectMeta};
pub use config::Config;
pub use constants::*;
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use placement::{
    resolve, AllOfClause, AnyOfClause, ClusterByLabel, ClusterByName, PlacementIntent,
    ResolvedClusters,
};
pub use plugin::{ResourcePlugin, ResourceRequest};
pub use plugins::PluginRegistry;
pub use records::{
    BundleDefinition, Connectivity, ConnectivityClient, DefinitionClient, InstanceClient,
    InstanceRecord, Project, ProjectClient, VnfDefinition, VnfDefinitionClient,
};
pub use store::{FileStore, KeyedStore, MemStore, StoreBackend};
pub use vnf::{ResourceMap, VnfHandle, VnfManager};
