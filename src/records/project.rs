//! Project records: the top-level grouping for definitions and instances.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{key_string, not_found_as_record};
use crate::constants::{validate_name, COLLECTION_PROJECTS, TAG_METADATA};
use crate::error::{Error, Result};
use crate::store::{self, KeyedStore};

/// One project record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    /// Unique project name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Storage key for a project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectKey {
    pub name: String,
}

/// Store-backed client for project records.
pub struct ProjectClient {
    store: Arc<dyn KeyedStore>,
}

impl ProjectClient {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Creates a project, failing when one with the same name exists.
    pub async fn create(&self, project: Project) -> Result<Project> {
        validate_name(&project.name)?;
        let key = key_string(&ProjectKey {
            name: project.name.clone(),
        })?;

        match self.get(&project.name).await {
            Ok(_) => return Err(Error::AlreadyExists { key }),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let value = store::serialize(&project)?;
        self.store
            .create(COLLECTION_PROJECTS, &key, TAG_METADATA, &value)
            .await?;
        Ok(project)
    }

    /// Fetches a project by name.
    pub async fn get(&self, name: &str) -> Result<Project> {
        let key = key_string(&ProjectKey {
            name: name.to_string(),
        })?;
        let bytes = self
            .store
            .read(COLLECTION_PROJECTS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "project", name))?;
        store::unmarshal(&bytes)
    }

    /// Deletes a project record.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let key = key_string(&ProjectKey {
            name: name.to_string(),
        })?;
        self.store
            .delete(COLLECTION_PROJECTS, &key, TAG_METADATA)
            .await
            .map_err(|e| not_found_as_record(e, "project", name))
    }

    /// Lists all projects, sorted by key.
    pub async fn list(&self) -> Result<Vec<Project>> {
        let entries = self.store.read_all(COLLECTION_PROJECTS, TAG_METADATA).await?;
        entries.values().map(|bytes| store::unmarshal(bytes)).collect()
    }
}
