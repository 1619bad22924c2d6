//! VNF definition records.
//!
//! A VNF definition describes one deployable network function by name and
//! service type. Records are keyed by a generated UUID so definitions with
//! the same human-readable name can coexist.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{key_string, not_found_as_record};
use crate::constants::{validate_name, COLLECTION_VNF_DEFINITIONS, TAG_METADATA};
use crate::error::{Error, Result};
use crate::store::{self, KeyedStore};

/// One VNF definition record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VnfDefinition {
    /// Record identifier; generated on create when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    /// Human-readable definition name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Network function category, for example "firewall".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_type: String,
}

/// Storage key for a VNF definition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VnfDefinitionKey {
    pub uuid: String,
}

/// Store-backed client for VNF definition records.
pub struct VnfDefinitionClient {
    store: Arc<dyn KeyedStore>,
}

impl VnfDefinitionClient {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Creates a definition, generating its UUID when the caller left it
    /// empty. Returns the stored record.
    pub async fn create(&self, mut definition: VnfDefinition) -> Result<VnfDefinition> {
        validate_name(&definition.name)?;
        if definition.uuid.is_empty() {
            definition.uuid = Uuid::now_v7().to_string();
        }
        let key = key_string(&VnfDefinitionKey {
            uuid: definition.uuid.clone(),
        })?;

        match self.get(&definition.uuid).await {
            Ok(_) => return Err(Error::AlreadyExists { key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let value = store::serialize(&definition)?;
        self.store
            .create(COLLECTION_VNF_DEFINITIONS, &key, TAG_METADATA, &value)
            .await?;
        Ok(definition)
    }

    /// Fetches a definition by UUID.
    pub async fn get(&self, uuid: &str) -> Result<VnfDefinition> {
        let key = key_string(&VnfDefinitionKey {
            uuid: uuid.to_string(),
        })?;
        let bytes = self
            .store
            .read(COLLECTION_VNF_DEFINITIONS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "vnf definition", uuid))?;
        store::unmarshal(&bytes)
    }

    /// Deletes a definition record.
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let key = key_string(&VnfDefinitionKey {
            uuid: uuid.to_string(),
        })?;
        self.store
            .delete(COLLECTION_VNF_DEFINITIONS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "vnf definition", uuid))
    }

    /// Lists all definitions, sorted by key.
    pub async fn list(&self) -> Result<Vec<VnfDefinition>> {
        let entries = self
            .store
            .read_all(COLLECTION_VNF_DEFINITIONS, TAG_METADATA)
            .await?;
        entries.values().map(|bytes| store::unmarshal(bytes)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn client() -> VnfDefinitionClient {
        VnfDefinitionClient::new(Arc::new(MemStore::new()))
    }

    #[tokio::test]
    async fn create_generates_uuid_when_empty() {
        let client = client();
        let stored = client
            .create(VnfDefinition {
                name: "firewall".to_string(),
                service_type: "firewall".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!stored.uuid.is_empty());
        assert_eq!(client.get(&stored.uuid).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn caller_supplied_uuid_is_kept() {
        let client = client();
        let stored = client
            .create(VnfDefinition {
                uuid: "fixed-id".to_string(),
                name: "router".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(stored.uuid, "fixed-id");
    }

    #[tokio::test]
    async fn same_name_different_uuid_coexist() {
        let client = client();
        let a = client
            .create(VnfDefinition {
                name: "fw".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let b = client
            .create(VnfDefinition {
                name: "fw".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(client.list().await.unwrap().len(), 2);
    }
}
