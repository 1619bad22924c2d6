//! Process configuration.
//!
//! Configuration is layered: compiled-in defaults, then an optional JSON
//! config file, then environment overrides. All state defaults to
//! subdirectories of `~/.kubemux`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result, ResultExt};
use crate::store::StoreBackend;

/// Environment variable naming the config file.
pub const ENV_CONFIG: &str = "KUBEMUX_CONFIG";
/// Environment override for the bundle root directory.
pub const ENV_BUNDLE_ROOT: &str = "KUBEMUX_BUNDLE_ROOT";
/// Environment override for the default cloud region.
pub const ENV_CLOUD_REGION: &str = "KUBEMUX_CLOUD_REGION";

/// Config file looked up in the working directory when `KUBEMUX_CONFIG` is
/// unset.
const DEFAULT_CONFIG_FILE: &str = "kubemux.json";

/// Resolved process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory bundle identifiers are resolved under.
    pub bundle_root: PathBuf,
    /// Record store backend.
    pub store: StoreBackend,
    /// Cloud region used when the caller does not name one.
    pub cloud_region: String,
}

impl Default for Config {
    fn default() -> Self {
        let base = data_dir();
        Self {
            bundle_root: base.join("bundles"),
            store: StoreBackend::File {
                root: base.join("store"),
            },
            cloud_region: "local".to_string(),
        }
    }
}

/// Base directory for persisted state, `~/.kubemux`.
fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kubemux")
}

impl Config {
    /// Loads configuration.
    ///
    /// A file named by `KUBEMUX_CONFIG` must exist; the fallback
    /// `./kubemux.json` is optional. Environment overrides are applied last.
    pub fn load() -> Result<Config> {
        let (path, required) = match env::var(ENV_CONFIG) {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if path.exists() || required {
            Self::from_file(&path)?
        } else {
            Config::default()
        };

        if let Ok(root) = env::var(ENV_BUNDLE_ROOT) {
            config.bundle_root = PathBuf::from(root);
        }
        if let Ok(region) = env::var(ENV_CLOUD_REGION) {
            config.cloud_region = region;
        }

        Ok(config)
    }

    /// Reads and parses one config file. Fields the file omits keep their
    /// default values.
    pub fn from_file(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path)
            .map_err(Error::Io)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .map_err(Error::from)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}
