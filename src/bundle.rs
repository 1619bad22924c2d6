//! Bundle layout and manifest parsing.
//!
//! A bundle ("CSAR") is a directory of resource definition files plus a
//! manifest, `metadata.yaml`, mapping each resource type to the ordered list
//! of files that implement it:
//!
//! ```text
//! demo-bundle/
//! ├── metadata.yaml
//! ├── web-deployment.yaml
//! └── web-service.yaml
//! ```
//!
//! ```yaml
//! resources:
//!   deployment:
//!     - web-deployment.yaml
//!   service:
//!     - web-service.yaml
//! ```
//!
//! Manifest order is load-bearing: instantiation walks resource types in the
//! order the manifest lists them, and files within a type in list order.

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{validate_resource_type, MANIFEST_FILE};
use crate::error::{Error, Result};

// =============================================================================
// Manifest
// =============================================================================

/// Ordered resource-type → file-list mapping parsed from `metadata.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Resource types in manifest order, each with its definition files.
    pub resources: IndexMap<String, Vec<String>>,
}

impl ResourceManifest {
    /// Parses a manifest from YAML text without any file-system checks.
    pub fn from_yaml(data: &str) -> Result<Self> {
        serde_yaml::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Number of resource types listed.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when no resource types are listed.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Total number of files across all resource types.
    pub fn file_count(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    /// Structural checks beyond YAML well-formedness.
    ///
    /// Resource-type names must be registry-valid; file paths must be
    /// non-empty, relative, and must not traverse out of the bundle.
    fn check(&self) -> std::result::Result<(), String> {
        for (resource_type, files) in &self.resources {
            validate_resource_type(resource_type).map_err(|e| e.to_string())?;
            for file in files {
                if file.is_empty() {
                    return Err(format!(
                        "resource type '{}' lists an empty file name",
                        resource_type
                    ));
                }
                let path = Path::new(file);
                if path.is_absolute() {
                    return Err(format!("resource file '{}' must be a relative path", file));
                }
                if path
                    .components()
                    .any(|c| matches!(c, Component::ParentDir))
                {
                    return Err(format!(
                        "resource file '{}' must not traverse outside the bundle",
                        file
                    ));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Bundle Directory
// =============================================================================

/// An opened bundle directory with its parsed, structurally valid manifest.
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
    manifest: ResourceManifest,
}

impl Bundle {
    /// Opens a bundle directory and loads its manifest.
    ///
    /// An absent manifest file is `ManifestNotFound`; a YAML or structural
    /// failure is `InvalidManifest` naming the manifest path.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);

        let data = fs::read_to_string(&manifest_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ManifestNotFound {
                    path: manifest_path.clone(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let manifest: ResourceManifest =
            serde_yaml::from_str(&data).map_err(|e| Error::InvalidManifest {
                path: manifest_path.clone(),
                reason: e.to_string(),
            })?;

        manifest.check().map_err(|reason| Error::InvalidManifest {
            path: manifest_path.clone(),
            reason,
        })?;

        debug!(
            "Opened bundle at {} ({} resource types, {} files)",
            root.display(),
            manifest.len(),
            manifest.file_count()
        );
        Ok(Self { root, manifest })
    }

    /// Returns the bundle directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the parsed manifest.
    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    /// Resolves a manifest-relative file path against the bundle root.
    pub fn resource_file(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Verifies every file listed for `resource_type` exists on disk.
    ///
    /// Called once per resource type before any resource of that type is
    /// created; the first missing file fails with `ResourceFileMissing`.
    pub fn verify_type_files(&self, resource_type: &str) -> Result<()> {
        let files = self
            .manifest
            .resources
            .get(resource_type)
            .ok_or_else(|| {
                Error::Internal(format!(
                    "resource type '{}' not present in manifest",
                    resource_type
                ))
            })?;

        for file in files {
            let path = self.resource_file(file);
            if !path.exists() {
                return Err(Error::ResourceFileMissing { path });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Bundle Builder
// =============================================================================

/// Writes a bundle directory: resource files plus a matching manifest.
///
/// Used by tests and the CLI's simulation path to assemble bundles without
/// hand-editing YAML.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    resources: IndexMap<String, Vec<(String, String)>>,
}

impl BundleBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource file under `resource_type`; manifest order follows
    /// call order.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        file_name: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        self.resources
            .entry(resource_type.into())
            .or_default()
            .push((file_name.into(), contents.into()));
        self
    }

    /// Writes the bundle into `dir` and opens it.
    pub fn write_to(&self, dir: &Path) -> Result<Bundle> {
        fs::create_dir_all(dir)?;

        let mut manifest = ResourceManifest::default();
        for (resource_type, files) in &self.resources {
            let mut names = Vec::with_capacity(files.len());
            for (file_name, contents) in files {
                fs::write(dir.join(file_name), contents)?;
                names.push(file_name.clone());
            }
            manifest.resources.insert(resource_type.clone(), names);
        }

        let yaml =
            serde_yaml::to_string(&manifest).map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(dir.join(MANIFEST_FILE), yaml)?;

        Bundle::open(dir)
    }
}
