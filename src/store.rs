//! # Keyed Record Storage
//!
//! Generic persistence for orchestrator records. Values are addressed by
//! `(collection, key, tag)`: the collection groups one record family, the
//! key is the canonical JSON form of a small key-identity struct, and the
//! tag names one stored field of the record (`metadata`, `content`).
//! Key equality is exact-string equality on the canonical form.
//!
//! Two interchangeable backends implement the same contract:
//!
//! - [`MemStore`]: document-oriented, in-process. Collections hold one
//!   document per key; document fields are tags.
//! - [`FileStore`]: key-value, on disk. One file per `(key, tag)` in a
//!   sharded directory layout:
//!
//! ```text
//! ~/.kubemux/store/
//! └── projects/
//!     ├── ab/
//!     │   └── abcd1234…/      (sha256 of the canonical key)
//!     │       ├── KEY         (canonical key string)
//!     │       └── metadata    (stored bytes)
//!     └── cd/
//!         └── …
//! ```
//!
//! ## Contract
//!
//! `create` refuses to overwrite an existing slot (`AlreadyExists`);
//! `read` and `delete` of an absent slot fail with `KeyNotFound`, which is
//! distinct from a backend failure; `read_all` scans one tag across a
//! collection, sorted by canonical key. The get-before-create pre-check
//! done by record clients is not atomic with `create`: concurrent creators
//! race, and the loser observes `AlreadyExists` rather than a silent
//! overwrite.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::constants::{validate_collection, validate_tag};
use crate::error::{Error, Result};

/// File holding the canonical key string inside a [`FileStore`] key
/// directory. Uppercase, so it can never collide with a (lowercase) tag.
const KEY_FILE: &str = "KEY";

// =============================================================================
// Serialization Helpers
// =============================================================================

/// Encodes a record into the canonical stored byte form (JSON).
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decodes previously stored bytes into a typed record.
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
}

// =============================================================================
// Store Contract
// =============================================================================

/// Backend-agnostic keyed persistence.
///
/// Both in-tree backends keep the caller-provided bytes verbatim, so a value
/// written through one backend decodes identically through [`unmarshal`]
/// regardless of which backend stored it.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Short backend identifier for logs and diagnostics.
    fn backend_name(&self) -> &str;

    /// Verifies the backend is reachable and usable.
    async fn health_check(&self) -> Result<()>;

    /// Stores `value` under `(collection, key, tag)`.
    ///
    /// Fails with `AlreadyExists` when the slot is occupied.
    async fn create(&self, collection: &str, key: &str, tag: &str, value: &[u8]) -> Result<()>;

    /// Reads the bytes stored under `(collection, key, tag)`.
    ///
    /// Fails with `KeyNotFound` when the slot is empty.
    async fn read(&self, collection: &str, key: &str, tag: &str) -> Result<Vec<u8>>;

    /// Removes the value under `(collection, key, tag)`.
    ///
    /// Fails with `KeyNotFound` when the slot is empty.
    async fn delete(&self, collection: &str, key: &str, tag: &str) -> Result<()>;

    /// Reads every value stored under `tag` in `collection`, keyed by
    /// canonical key string and sorted by it. An absent or empty collection
    /// yields an empty map.
    async fn read_all(&self, collection: &str, tag: &str) -> Result<IndexMap<String, Vec<u8>>>;
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidName {
            name: String::new(),
            reason: "store key cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn check_address(collection: &str, key: &str, tag: &str) -> Result<()> {
    validate_collection(collection)?;
    check_key(key)?;
    validate_tag(tag)
}

// =============================================================================
// Backend Selection
// =============================================================================

/// External backend selection, decoded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process document store; contents vanish with the process.
    Memory,
    /// On-disk key-value store rooted at `root`.
    File { root: PathBuf },
}

/// Opens the store selected by `backend`.
pub fn open(backend: &StoreBackend) -> Result<Arc<dyn KeyedStore>> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemStore::new())),
        StoreBackend::File { root } => Ok(Arc::new(FileStore::with_path(root.clone())?)),
    }
}

// =============================================================================
// In-Memory Document Backend
// =============================================================================

/// Collection → key → tag → bytes.
type Collections = HashMap<String, HashMap<String, HashMap<String, Vec<u8>>>>;

/// Document-oriented in-process backend.
///
/// Each key owns one document whose fields are tags. Used for tests and for
/// single-process deployments that do not need durability.
pub struct MemStore {
    collections: RwLock<Collections>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn guard_poisoned<T>(_: T) -> Error {
        Error::Backend("store lock poisoned".to_string())
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyedStore for MemStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> Result<()> {
        self.collections.read().map_err(Self::guard_poisoned)?;
        Ok(())
    }

    async fn create(&self, collection: &str, key: &str, tag: &str, value: &[u8]) -> Result<()> {
        check_address(collection, key, tag)?;

        let mut collections = self.collections.write().map_err(Self::guard_poisoned)?;
        let document = collections
            .entry(collection.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();

        if document.contains_key(tag) {
            return Err(Error::AlreadyExists {
                key: key.to_string(),
            });
        }

        document.insert(tag.to_string(), value.to_vec());
        debug!("Stored {}/{} ({} bytes)", collection, tag, value.len());
        Ok(())
    }

    async fn read(&self, collection: &str, key: &str, tag: &str) -> Result<Vec<u8>> {
        check_address(collection, key, tag)?;

        let collections = self.collections.read().map_err(Self::guard_poisoned)?;
        collections
            .get(collection)
            .and_then(|documents| documents.get(key))
            .and_then(|document| document.get(tag))
            .cloned()
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
            })
    }

    async fn delete(&self, collection: &str, key: &str, tag: &str) -> Result<()> {
        check_address(collection, key, tag)?;

        let mut collections = self.collections.write().map_err(Self::guard_poisoned)?;
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(key))
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
            })?;

        if document.remove(tag).is_none() {
            return Err(Error::KeyNotFound {
                key: key.to_string(),
            });
        }

        // Drop the document once its last tag is gone.
        if document.is_empty() {
            if let Some(documents) = collections.get_mut(collection) {
                documents.remove(key);
            }
        }

        debug!("Deleted {}/{}", collection, tag);
        Ok(())
    }

    async fn read_all(&self, collection: &str, tag: &str) -> Result<IndexMap<String, Vec<u8>>> {
        validate_collection(collection)?;
        validate_tag(tag)?;

        let collections = self.collections.read().map_err(Self::guard_poisoned)?;
        let mut entries: Vec<(String, Vec<u8>)> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter_map(|(key, document)| {
                        document.get(tag).map(|bytes| (key.clone(), bytes.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().collect())
    }
}

// =============================================================================
// On-Disk Key-Value Backend
// =============================================================================

/// Key-value backend over a sharded directory tree.
///
/// The canonical key string is hashed (SHA-256) to form a filesystem-safe
/// directory name; the first two hex characters shard the collection. Each
/// key directory holds the canonical key in [`KEY_FILE`] plus one file per
/// tag. Writes go through a temp file and an atomic rename.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates if necessary) a store rooted at `root`.
    pub fn with_path(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).map_err(|e| {
            Error::Backend(format!(
                "failed to initialize store at {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("File store initialized at: {}", root.display());
        Ok(Self { root })
    }

    /// Returns the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_dir(&self, collection: &str, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let shard = &hash[..2];
        self.root.join(collection).join(shard).join(hash)
    }

    fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
        // Unique temp name so concurrent writers of the same slot cannot
        // observe each other's partial file; the final rename is atomic.
        let temp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::now_v7()));
        fs::write(&temp_path, data).map_err(|e| Error::Backend(e.to_string()))?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::Backend(e.to_string())
        })
    }
}

#[async_trait]
impl KeyedStore for FileStore {
    fn backend_name(&self) -> &str {
        "file"
    }

    async fn health_check(&self) -> Result<()> {
        let meta = fs::metadata(&self.root).map_err(|e| Error::Backend(e.to_string()))?;
        if !meta.is_dir() {
            return Err(Error::Backend(format!(
                "store root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    async fn create(&self, collection: &str, key: &str, tag: &str, value: &[u8]) -> Result<()> {
        check_address(collection, key, tag)?;

        let dir = self.key_dir(collection, key);
        let tag_path = dir.join(tag);
        if tag_path.exists() {
            return Err(Error::AlreadyExists {
                key: key.to_string(),
            });
        }

        fs::create_dir_all(&dir).map_err(|e| Error::Backend(e.to_string()))?;

        let key_path = dir.join(KEY_FILE);
        if !key_path.exists() {
            Self::write_atomic(&key_path, key.as_bytes())?;
        }
        Self::write_atomic(&tag_path, value)?;

        debug!(
            "Stored {}/{} ({} bytes) at {}",
            collection,
            tag,
            value.len(),
            tag_path.display()
        );
        Ok(())
    }

    async fn read(&self, collection: &str, key: &str, tag: &str) -> Result<Vec<u8>> {
        check_address(collection, key, tag)?;

        let tag_path = self.key_dir(collection, key).join(tag);
        if !tag_path.exists() {
            return Err(Error::KeyNotFound {
                key: key.to_string(),
            });
        }
        fs::read(&tag_path).map_err(|e| Error::Backend(e.to_string()))
    }

    async fn delete(&self, collection: &str, key: &str, tag: &str) -> Result<()> {
        check_address(collection, key, tag)?;

        let dir = self.key_dir(collection, key);
        let tag_path = dir.join(tag);
        if !tag_path.exists() {
            return Err(Error::KeyNotFound {
                key: key.to_string(),
            });
        }
        fs::remove_file(&tag_path).map_err(|e| Error::Backend(e.to_string()))?;

        // Remove the key directory once only the KEY file remains.
        let leftover: Vec<_> = fs::read_dir(&dir)
            .map_err(|e| Error::Backend(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .collect();
        if leftover.len() == 1
            && leftover[0].file_name().to_str() == Some(KEY_FILE)
        {
            let _ = fs::remove_dir_all(&dir);
        }

        debug!("Deleted {}/{}", collection, tag);
        Ok(())
    }

    async fn read_all(&self, collection: &str, tag: &str) -> Result<IndexMap<String, Vec<u8>>> {
        validate_collection(collection)?;
        validate_tag(tag)?;

        let collection_dir = self.root.join(collection);
        if !collection_dir.exists() {
            return Ok(IndexMap::new());
        }

        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        for shard in fs::read_dir(&collection_dir).map_err(|e| Error::Backend(e.to_string()))? {
            let shard = shard.map_err(|e| Error::Backend(e.to_string()))?;
            if !shard.path().is_dir() {
                continue;
            }
            for key_entry in fs::read_dir(shard.path()).map_err(|e| Error::Backend(e.to_string()))?
            {
                let key_dir = key_entry.map_err(|e| Error::Backend(e.to_string()))?.path();
                let key_path = key_dir.join(KEY_FILE);
                let tag_path = key_dir.join(tag);
                if !key_path.exists() || !tag_path.exists() {
                    continue;
                }
                let key = fs::read_to_string(&key_path).map_err(|e| Error::Backend(e.to_string()))?;
                let bytes = fs::read(&tag_path).map_err(|e| Error::Backend(e.to_string()))?;
                entries.push((key, bytes));
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().collect())
    }
}
