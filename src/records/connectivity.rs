//! Cloud-region connectivity records.
//!
//! One record per cloud region, holding the credentials needed to reach its
//! cluster. The kubeconfig travels base64-encoded and is stored as given;
//! decoding is the consumer's concern.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{key_string, not_found_as_record};
use crate::constants::{validate_name, COLLECTION_CONNECTIVITY, TAG_METADATA};
use crate::error::{Error, Result};
use crate::store::{self, KeyedStore};

/// One cloud-region connectivity record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Connectivity {
    /// Cloud region the record describes; unique.
    pub cloud_region: String,
    /// Owning operator of the region.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloud_owner: String,
    /// Base64-encoded kubeconfig for the region's cluster.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubeconfig_b64: String,
}

/// Storage key for a connectivity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectivityKey {
    pub cloud_region: String,
}

/// Store-backed client for connectivity records.
pub struct ConnectivityClient {
    store: Arc<dyn KeyedStore>,
}

impl ConnectivityClient {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    fn key(cloud_region: &str) -> Result<String> {
        key_string(&ConnectivityKey {
            cloud_region: cloud_region.to_string(),
        })
    }

    /// Creates a connectivity record, failing when the region already has one.
    pub async fn create(&self, record: Connectivity) -> Result<Connectivity> {
        validate_name(&record.cloud_region)?;
        let key = Self::key(&record.cloud_region)?;

        match self.get(&record.cloud_region).await {
            Ok(_) => return Err(Error::AlreadyExists { key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let value = store::serialize(&record)?;
        self.store
            .create(COLLECTION_CONNECTIVITY, &key, TAG_METADATA, &value)
            .await?;
        Ok(record)
    }

    /// Fetches the record for a cloud region.
    pub async fn get(&self, cloud_region: &str) -> Result<Connectivity> {
        let key = Self::key(cloud_region)?;
        let bytes = self
            .store
            .read(COLLECTION_CONNECTIVITY, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "cloud region", cloud_region))?;
        store::unmarshal(&bytes)
    }

    /// Deletes the record for a cloud region.
    pub async fn delete(&self, cloud_region: &str) -> Result<()> {
        let key = Self::key(cloud_region)?;
        self.store
            .delete(COLLECTION_CONNECTIVITY, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "cloud region", cloud_region))
    }

    /// Lists all connectivity records, sorted by key.
    pub async fn list(&self) -> Result<Vec<Connectivity>> {
        let entries = self
            .store
            .read_all(COLLECTION_CONNECTIVITY, TAG_METADATA)
            .await?;
        entries.values().map(|bytes| store::unmarshal(bytes)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[tokio::test]
    async fn region_record_round_trips() {
        let client = ConnectivityClient::new(Arc::new(MemStore::new()));
        let record = Connectivity {
            cloud_region: "region1".to_string(),
            cloud_owner: "operator-a".to_string(),
            kubeconfig_b64: "YXBpVmVyc2lvbjogdjE=".to_string(),
        };
        client.create(record.clone()).await.unwrap();
        assert_eq!(client.get("region1").await.unwrap(), record);

        client.delete("region1").await.unwrap();
        let err = client.get("region1").await.unwrap_err();
        assert_eq!(err.to_string(), "no such cloud region: region1");
    }

    #[tokio::test]
    async fn one_record_per_region() {
        let client = ConnectivityClient::new(Arc::new(MemStore::new()));
        let record = Connectivity {
            cloud_region: "region1".to_string(),
            ..Default::default()
        };
        client.create(record.clone()).await.unwrap();
        assert!(client.create(record).await.unwrap_err().is_already_exists());
    }
}
