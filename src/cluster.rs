//! Cluster client seam.
//!
//! The orchestration core never speaks to a Kubernetes API server directly;
//! every plugin receives a [`ClusterClient`] and delegates object
//! create/delete/get/list to it. Wire semantics (auth, retries, server-side
//! validation) belong to the client implementation behind this trait.
//!
//! [`LocalCluster`] is the in-process implementation: it keeps objects in
//! memory with the same name-uniqueness and not-found semantics a real
//! cluster exhibits, and backs both the test suite and the CLI's offline
//! simulation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

// =============================================================================
// Object Model
// =============================================================================

/// Metadata carried by every resource definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name, unique per (kind, namespace).
    #[serde(default)]
    pub name: String,
    /// Namespace stated in the definition file, if any. The request
    /// namespace wins; this field is informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels attached to the object.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// Minimal typed view of a Kubernetes resource definition.
///
/// Only the addressing fields are modeled; everything else (`spec`, `data`,
/// …) rides along untouched in `extra` so a definition survives a
/// parse/serialize round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeObject {
    /// API group/version, e.g. `apps/v1`.
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    /// Object kind, e.g. `Deployment`.
    pub kind: String,
    /// Addressing metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// All remaining fields of the definition, order-preserving.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl KubeObject {
    /// Builds a bare object with no extra fields.
    pub fn named(api_version: &str, kind: &str, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: None,
                labels: HashMap::new(),
            },
            extra: IndexMap::new(),
        }
    }

    /// Parses a definition from YAML text.
    pub fn from_yaml(data: &str) -> Result<Self> {
        serde_yaml::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Reads and parses a definition file.
    ///
    /// A missing file is `ResourceFileMissing`; a parse failure is
    /// `InvalidResource` naming the file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ResourceFileMissing {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        serde_yaml::from_str(&data).map_err(|e| Error::InvalidResource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

// =============================================================================
// Client Contract
// =============================================================================

/// Target-cluster operations the plugins delegate to.
///
/// Kind strings are compared case-insensitively, so the lowercase
/// resource-type names used by the registry address the same objects as the
/// capitalized `kind` fields in definition files. Cluster-scoped kinds
/// (namespaces) use an empty `namespace` argument.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Creates `object` in `namespace`; returns the created name.
    async fn create_object(&self, namespace: &str, object: &KubeObject) -> Result<String>;

    /// Deletes one object by kind and name.
    async fn delete_object(&self, kind: &str, namespace: &str, name: &str) -> Result<()>;

    /// Fetches one object by kind and name.
    async fn get_object(&self, kind: &str, namespace: &str, name: &str) -> Result<KubeObject>;

    /// Lists object names of one kind, in creation order. `limit` of zero
    /// means no limit.
    async fn list_objects(&self, kind: &str, namespace: &str, limit: usize) -> Result<Vec<String>>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// (lowercased kind, namespace) → name → object.
type ObjectTable = HashMap<(String, String), IndexMap<String, KubeObject>>;

/// In-process cluster double.
///
/// Enforces per-(kind, namespace) name uniqueness and distinguishes
/// "object not found" from internal failures, mirroring what plugins see
/// against a live cluster.
pub struct LocalCluster {
    objects: RwLock<ObjectTable>,
}

fn kind_key(kind: &str) -> String {
    kind.to_ascii_lowercase()
}

impl LocalCluster {
    /// Creates an empty cluster.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of stored objects, all kinds and namespaces.
    pub fn object_count(&self) -> usize {
        self.objects
            .read()
            .map(|objects| objects.values().map(IndexMap::len).sum())
            .unwrap_or(0)
    }

    fn lock_poisoned<T>(_: T) -> Error {
        Error::Backend("cluster lock poisoned".to_string())
    }
}

impl Default for LocalCluster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterClient for LocalCluster {
    async fn create_object(&self, namespace: &str, object: &KubeObject) -> Result<String> {
        let name = object.metadata.name.clone();
        if name.is_empty() {
            return Err(Error::InvalidName {
                name,
                reason: "object metadata.name is required".to_string(),
            });
        }

        let kind = kind_key(&object.kind);
        let mut objects = self.objects.write().map_err(Self::lock_poisoned)?;
        let table = objects
            .entry((kind.clone(), namespace.to_string()))
            .or_default();

        if table.contains_key(&name) {
            return Err(Error::ObjectExists { kind, name });
        }

        table.insert(name.clone(), object.clone());
        debug!("Created {}/{} in namespace '{}'", kind, name, namespace);
        Ok(name)
    }

    async fn delete_object(&self, kind: &str, namespace: &str, name: &str) -> Result<()> {
        let kind = kind_key(kind);
        let mut objects = self.objects.write().map_err(Self::lock_poisoned)?;
        let removed = objects
            .get_mut(&(kind.clone(), namespace.to_string()))
            .and_then(|table| table.shift_remove(name));

        match removed {
            Some(_) => {
                debug!("Deleted {}/{} in namespace '{}'", kind, name, namespace);
                Ok(())
            }
            None => Err(Error::ObjectNotFound {
                kind,
                name: name.to_string(),
            }),
        }
    }

    async fn get_object(&self, kind: &str, namespace: &str, name: &str) -> Result<KubeObject> {
        let kind = kind_key(kind);
        let objects = self.objects.read().map_err(Self::lock_poisoned)?;
        objects
            .get(&(kind.clone(), namespace.to_string()))
            .and_then(|table| table.get(name))
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound {
                kind,
                name: name.to_string(),
            })
    }

    async fn list_objects(&self, kind: &str, namespace: &str, limit: usize) -> Result<Vec<String>> {
        let kind = kind_key(kind);
        let objects = self.objects.read().map_err(Self::lock_poisoned)?;
        let names = objects
            .get(&(kind, namespace.to_string()))
            .map(|table| {
                let iter = table.keys().cloned();
                if limit == 0 {
                    iter.collect()
                } else {
                    iter.take(limit).collect()
                }
            })
            .unwrap_or_default();
        Ok(names)
    }
}
