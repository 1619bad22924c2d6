//! Persistent record clients.
//!
//! Each client binds one record type to a (collection, tag) address in the
//! keyed store. Keys are small serde structs serialized to canonical JSON, so
//! the same string addresses the record on every backend.
//!
//! Create is check-then-insert and not atomic: two concurrent creates of the
//! same key can race, with the loser failing `AlreadyExists` at the storage
//! layer.

pub mod connectivity;
pub mod definition;
pub mod instance;
pub mod project;
pub mod vnfd;

pub use connectivity::{Connectivity, ConnectivityClient, ConnectivityKey};
pub use definition::{BundleDefinition, DefinitionClient, DefinitionKey};
pub use instance::{InstanceClient, InstanceKey, InstanceRecord};
pub use project::{Project, ProjectClient, ProjectKey};
pub use vnfd::{VnfDefinition, VnfDefinitionClient, VnfDefinitionKey};

use serde::Serialize;

use crate::error::{Error, Result};

/// Canonical string form of a record key: its JSON serialization.
pub(crate) fn key_string<K: Serialize>(key: &K) -> Result<String> {
    Ok(serde_json::to_string(key)?)
}

/// Translates a storage-level not-found into the domain-level record error.
pub(crate) fn not_found_as_record(e: Error, kind: &'static str, name: &str) -> Error {
    if e.is_not_found() {
        Error::RecordNotFound {
            kind,
            name: name.to_string(),
        }
    } else {
        e
    }
}
