//! Bundle definition records and their packaged content.
//!
//! A bundle definition is versioned: the key is (name, version). Metadata and
//! the uploaded package bytes live under separate tags of the same key, so
//! content can be attached after the record exists and is removed with it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{key_string, not_found_as_record};
use crate::constants::{validate_name, COLLECTION_DEFINITIONS, TAG_CONTENT, TAG_METADATA};
use crate::error::{Error, Result};
use crate::store::{self, KeyedStore};

/// One bundle definition record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BundleDefinition {
    /// Definition name.
    pub name: String,
    /// Definition version; (name, version) is unique.
    pub version: String,
    /// Chart the packaged content was built from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chart_name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Arbitrary labels.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// Storage key for a bundle definition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefinitionKey {
    pub name: String,
    pub version: String,
}

/// Store-backed client for bundle definition records.
pub struct DefinitionClient {
    store: Arc<dyn KeyedStore>,
}

impl DefinitionClient {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    fn key(name: &str, version: &str) -> Result<String> {
        key_string(&DefinitionKey {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Creates a definition, failing when the (name, version) pair exists.
    pub async fn create(&self, definition: BundleDefinition) -> Result<BundleDefinition> {
        validate_name(&definition.name)?;
        validate_name(&definition.version)?;
        let key = Self::key(&definition.name, &definition.version)?;

        match self.get(&definition.name, &definition.version).await {
            Ok(_) => return Err(Error::AlreadyExists { key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let value = store::serialize(&definition)?;
        self.store
            .create(COLLECTION_DEFINITIONS, &key, TAG_METADATA, &value)
            .await?;
        Ok(definition)
    }

    /// Fetches a definition by name and version.
    pub async fn get(&self, name: &str, version: &str) -> Result<BundleDefinition> {
        let key = Self::key(name, version)?;
        let bytes = self
            .store
            .read(COLLECTION_DEFINITIONS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "definition", name))?;
        store::unmarshal(&bytes)
    }

    /// Deletes a definition and any uploaded content.
    pub async fn delete(&self, name: &str, version: &str) -> Result<()> {
        let key = Self::key(name, version)?;
        self.store
            .delete(COLLECTION_DEFINITIONS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "definition", name))?;

        // Content is optional; its absence is not an error here.
        match self.store.delete(COLLECTION_DEFINITIONS, &key, TAG_CONTENT).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Lists all definitions across versions, sorted by key.
    pub async fn list(&self) -> Result<Vec<BundleDefinition>> {
        let entries = self
            .store
            .read_all(COLLECTION_DEFINITIONS, TAG_METADATA)
            .await?;
        entries.values().map(|bytes| store::unmarshal(bytes)).collect()
    }

    /// Attaches packaged content to an existing definition.
    ///
    /// The metadata record must already exist; re-uploading fails with
    /// `AlreadyExists`.
    pub async fn upload_content(&self, name: &str, version: &str, content: &[u8]) -> Result<()> {
        self.get(name, version).await?;
        let key = Self::key(name, version)?;
        self.store
            .create(COLLECTION_DEFINITIONS, &key, TAG_CONTENT, content)
            .await
    }

    /// Fetches the packaged content of a definition.
    pub async fn download_content(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let key = Self::key(name, version)?;
        self.store
            .read(COLLECTION_DEFINITIONS, &key, TAG_CONTENT)
            .await
            .map_err(|e| not_found_as_record(e, "definition content", name))
    }
}
