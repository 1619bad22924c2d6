//! System-wide constants and identifier validation.
//!
//! Name limits follow the Kubernetes conventions (RFC 1123): resource and
//! instance names are DNS subdomains, namespaces and resource-type names are
//! DNS labels. Store collection and tag names reuse the label rules so every
//! backend can map them onto a path or document field without escaping.

use crate::error::{Error, Result};

// =============================================================================
// Name Limits
// =============================================================================

/// Maximum length for resource and instance names (RFC 1123 DNS subdomain).
pub const MAX_NAME_LEN: usize = 253;

/// Maximum length for namespace names (RFC 1123 DNS label).
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Maximum length for resource-type names registered with the plugin registry.
pub const MAX_RESOURCE_TYPE_LEN: usize = 63;

/// Maximum length for store collection names.
pub const MAX_COLLECTION_LEN: usize = 63;

/// Maximum length for store tag names.
pub const MAX_TAG_LEN: usize = 63;

// =============================================================================
// Bundle Layout
// =============================================================================

/// Manifest file name inside a bundle directory.
pub const MANIFEST_FILE: &str = "metadata.yaml";

/// Namespace used when a request does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

// =============================================================================
// Store Collections and Tags
// =============================================================================

/// Collection holding project records.
pub const COLLECTION_PROJECTS: &str = "projects";

/// Collection holding VNF definition records.
pub const COLLECTION_VNF_DEFINITIONS: &str = "vnfds";

/// Collection holding bundle definition records.
pub const COLLECTION_DEFINITIONS: &str = "definitions";

/// Collection holding cloud connectivity records.
pub const COLLECTION_CONNECTIVITY: &str = "connectivity";

/// Collection holding instantiated-bundle records.
pub const COLLECTION_INSTANCES: &str = "instances";

/// Tag under which record metadata is stored.
pub const TAG_METADATA: &str = "metadata";

/// Tag under which uploaded bundle content is stored.
pub const TAG_CONTENT: &str = "content";

// =============================================================================
// Validation Helpers
// =============================================================================

/// Validates an RFC 1123 style identifier.
///
/// Lowercase alphanumerics and `-`, optionally `.` for subdomain-form names;
/// must start and end with an alphanumeric character.
fn validate_identifier(name: &str, max_len: usize, allow_dots: bool) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "cannot be empty".to_string(),
        });
    }

    if name.len() > max_len {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: format!("exceeds maximum length of {}", max_len),
        });
    }

    let valid_char = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_dots && c == '.')
    };
    if !name.chars().all(valid_char) {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: if allow_dots {
                "must contain only lowercase alphanumeric characters, '-' or '.'".to_string()
            } else {
                "must contain only lowercase alphanumeric characters or '-'".to_string()
            },
        });
    }

    let first = name.chars().next();
    let last = name.chars().last();
    let alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !alnum(first) || !alnum(last) {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "must start and end with an alphanumeric character".to_string(),
        });
    }

    Ok(())
}

/// Validates a resource or instance name (DNS subdomain).
pub fn validate_name(name: &str) -> Result<()> {
    validate_identifier(name, MAX_NAME_LEN, true)
}

/// Validates a namespace name (DNS label).
pub fn validate_namespace(namespace: &str) -> Result<()> {
    validate_identifier(namespace, MAX_NAMESPACE_LEN, false)
}

/// Validates a resource-type name used as a plugin registry key.
pub fn validate_resource_type(resource_type: &str) -> Result<()> {
    validate_identifier(resource_type, MAX_RESOURCE_TYPE_LEN, false)
}

/// Validates a store collection name.
pub fn validate_collection(collection: &str) -> Result<()> {
    validate_identifier(collection, MAX_COLLECTION_LEN, false)
}

/// Validates a store tag name.
///
/// Tags share the label rules; the lowercase restriction keeps them disjoint
/// from the file backend's uppercase key entry.
pub fn validate_tag(tag: &str) -> Result<()> {
    validate_identifier(tag, MAX_TAG_LEN, false)
}
