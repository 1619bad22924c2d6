//! Instance records: the durable trace of an instantiation.
//!
//! Stored immediately after a bundle is instantiated, keyed by the internal
//! VNF identifier. The record carries the full handle, so a later destroy can
//! recover the resource inventory without re-reading the bundle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_string, not_found_as_record};
use crate::constants::{COLLECTION_INSTANCES, TAG_METADATA};
use crate::error::{Error, Result};
use crate::store::{self, KeyedStore};
use crate::vnf::VnfHandle;

/// One instance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceRecord {
    /// Identity and resource inventory of the instantiation.
    pub handle: VnfHandle,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// Storage key for an instance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceKey {
    pub vnf_id: String,
}

/// Store-backed client for instance records.
pub struct InstanceClient {
    store: Arc<dyn KeyedStore>,
}

impl InstanceClient {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    fn key(vnf_id: &str) -> Result<String> {
        key_string(&InstanceKey {
            vnf_id: vnf_id.to_string(),
        })
    }

    /// Records an instantiation, stamped with the current time.
    pub async fn create(&self, handle: VnfHandle) -> Result<InstanceRecord> {
        let key = Self::key(&handle.vnf_id)?;

        match self.get(&handle.vnf_id).await {
            Ok(_) => return Err(Error::AlreadyExists { key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let record = InstanceRecord {
            handle,
            created_at: Utc::now(),
        };
        let value = store::serialize(&record)?;
        self.store
            .create(COLLECTION_INSTANCES, &key, TAG_METADATA, &value)
            .await?;
        Ok(record)
    }

    /// Fetches an instance record by internal identifier.
    pub async fn get(&self, vnf_id: &str) -> Result<InstanceRecord> {
        let key = Self::key(vnf_id)?;
        let bytes = self
            .store
            .read(COLLECTION_INSTANCES, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "instance", vnf_id))?;
        store::unmarshal(&bytes)
    }

    /// Deletes an instance record, typically after a destroy.
    pub async fn delete(&self, vnf_id: &str) -> Result<()> {
        let key = Self::key(vnf_id)?;
        self.store
            .delete(COLLECTION_INSTANCES, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "instance", vnf_id))
    }

    /// Lists all instance records, sorted by key.
    pub async fn list(&self) -> Result<Vec<InstanceRecord>> {
        let entries = self.store.read_all(COLLECTION_INSTANCES, TAG_METADATA).await?;
        entries.values().map(|bytes| store::unmarshal(bytes)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnf::ResourceMap;
    use crate::store::MemStore;

    fn handle(vnf_id: &str) -> VnfHandle {
        let mut resources = ResourceMap::new();
        resources.insert(
            "deployment".to_string(),
            vec![format!("{}-web", vnf_id)],
        );
        VnfHandle {
            external_id: "a1b2".to_string(),
            vnf_id: vnf_id.to_string(),
            cloud_region: "region1".to_string(),
            namespace: "edge".to_string(),
            resources,
        }
    }

    #[tokio::test]
    async fn record_preserves_the_handle() {
        let client = InstanceClient::new(Arc::new(MemStore::new()));
        let created = client.create(handle("region1-edge-a1b2")).await.unwrap();

        let fetched = client.get("region1-edge-a1b2").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.handle.resources.get("deployment").unwrap(),
            &vec!["region1-edge-a1b2-web".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_after_destroy_clears_the_record() {
        let client = InstanceClient::new(Arc::new(MemStore::new()));
        client.create(handle("region1-edge-a1b2")).await.unwrap();
        client.delete("region1-edge-a1b2").await.unwrap();
        assert!(client
            .get("region1-edge-a1b2")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn duplicate_instantiation_record_is_rejected() {
        let client = InstanceClient::new(Arc::new(MemStore::new()));
        client.create(handle("region1-edge-a1b2")).await.unwrap();
        let err = client.create(handle("region1-edge-a1b2")).await.unwrap_err();
        assert!(err.is_already_exists());
    }
}
