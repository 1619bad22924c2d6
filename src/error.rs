//! Error types for the orchestration layer.

use std::path::PathBuf;

use crate::vnf::ResourceMap;

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error classification.
///
/// Wrapping an error with context never changes its kind, so callers can
/// distinguish "not found" from a backend failure no matter how many layers
/// annotated the error on the way up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A plugin, manifest, file, record, or object does not exist.
    NotFound,
    /// A record or object with the same identity already exists.
    AlreadyExists,
    /// A plugin exists but does not implement the requested operation.
    CapabilityNotFound,
    /// A manifest or resource definition failed to parse.
    InvalidManifest,
    /// An identifier or argument failed validation.
    InvalidInput,
    /// An opaque store or transport failure.
    Backend,
    /// An I/O failure.
    Io,
    /// An internal invariant was violated.
    Internal,
}

/// Errors that can occur in the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Plugin Errors
    // =========================================================================
    /// No handler registered for a resource type.
    #[error("no plugin registered for resource type '{0}'")]
    PluginNotFound(String),

    /// Handler registered but missing the requested operation.
    #[error("plugin '{plugin}' does not implement capability '{capability}'")]
    CapabilityNotFound { plugin: String, capability: String },

    // =========================================================================
    // Bundle Errors
    // =========================================================================
    /// Bundle manifest file is absent.
    #[error("manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Bundle manifest failed to parse.
    #[error("invalid manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// A file referenced by the manifest does not exist.
    #[error("resource file missing: {path}")]
    ResourceFileMissing { path: PathBuf },

    /// A resource definition file failed to parse.
    #[error("invalid resource definition at {path}: {reason}")]
    InvalidResource { path: PathBuf, reason: String },

    /// Instantiation aborted partway through the creation loop.
    ///
    /// Carries every resource name created before the failure so the caller
    /// can decide whether to destroy the partial set. Nothing is rolled back
    /// automatically.
    #[error("bundle instantiation aborted: {source}")]
    PartialInstantiation {
        partial: ResourceMap,
        source: Box<Error>,
    },

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// No value stored under (collection, key, tag).
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// A value is already stored under (collection, key, tag).
    #[error("key already exists: {key}")]
    AlreadyExists { key: String },

    /// Opaque store/transport failure.
    #[error("storage backend failure: {0}")]
    Backend(String),

    // =========================================================================
    // Record Errors
    // =========================================================================
    /// Domain-level not-found raised by a record client.
    #[error("no such {kind}: {name}")]
    RecordNotFound { kind: &'static str, name: String },

    // =========================================================================
    // Cluster Errors
    // =========================================================================
    /// Cluster object does not exist.
    #[error("object not found: {kind}/{name}")]
    ObjectNotFound { kind: String, name: String },

    /// Cluster object already exists.
    #[error("object already exists: {kind}/{name}")]
    ObjectExists { kind: String, name: String },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Identifier failed validation.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Operation not supported by this configuration.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // Wrapping
    // =========================================================================
    /// An error annotated with the operation that raised it.
    #[error("{context}: {source}")]
    Context { context: String, source: Box<Error> },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classifies the error, looking through any wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PluginNotFound(_)
            | Error::ManifestNotFound { .. }
            | Error::ResourceFileMissing { .. }
            | Error::KeyNotFound { .. }
            | Error::RecordNotFound { .. }
            | Error::ObjectNotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } | Error::ObjectExists { .. } => ErrorKind::AlreadyExists,
            Error::CapabilityNotFound { .. } => ErrorKind::CapabilityNotFound,
            Error::InvalidManifest { .. } | Error::InvalidResource { .. } => {
                ErrorKind::InvalidManifest
            }
            Error::InvalidName { .. } | Error::NotSupported(_) => ErrorKind::InvalidInput,
            Error::Backend(_) => ErrorKind::Backend,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialization(_) | Error::Internal(_) => ErrorKind::Internal,
            Error::Context { source, .. } => source.kind(),
            Error::PartialInstantiation { source, .. } => source.kind(),
        }
    }

    /// Wraps the error with a short context string naming the operation.
    ///
    /// The original kind is preserved: `e.context(..).kind() == e.kind()`.
    pub fn context(self, context: impl Into<String>) -> Error {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True when the error is NotFound-class at any wrapping depth.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True when the error is AlreadyExists-class at any wrapping depth.
    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }
}

/// Extension for annotating `Result` values with operation context.
pub trait ResultExt<T> {
    /// Wraps the error side with [`Error::context`].
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Wraps the error side with context built only on the error path.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
