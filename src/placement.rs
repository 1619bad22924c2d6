//! Placement intent resolution.
//!
//! An intent tree names required clusters ("all of") and acceptable
//! alternatives ("any of"); each entry selects a cluster either directly by
//! name or by label, always scoped to a provider. The resolver flattens the
//! tree into two candidate sets, clusters by name and clusters by label,
//! that a downstream scheduler dereferences against live inventory. It
//! performs no liveness or capacity checks and never deduplicates.
//!
//! Selector exclusivity: within one entry, exactly one of cluster-name and
//! cluster-label may be set. An entry with both or neither contributes
//! nothing and produces no diagnostic. Alternatives nested under a required
//! entry are folded additively into the same two sets; "any one suffices" is
//! enforced downstream, not here.

use serde::{Deserialize, Serialize};

// =============================================================================
// Intent Input
// =============================================================================

/// One alternative selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyOfClause {
    /// Cluster provider the selector is scoped to.
    #[serde(rename = "provider-name", default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,
    /// Concrete cluster name; mutually exclusive with the label.
    #[serde(rename = "cluster-name", default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    /// Cluster label; mutually exclusive with the name.
    #[serde(
        rename = "cluster-label-name",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub cluster_label_name: String,
}

/// One required selector, optionally carrying nested alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllOfClause {
    /// Cluster provider the selector is scoped to.
    #[serde(rename = "provider-name", default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,
    /// Concrete cluster name; mutually exclusive with the label.
    #[serde(rename = "cluster-name", default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    /// Cluster label; mutually exclusive with the name.
    #[serde(
        rename = "cluster-label-name",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub cluster_label_name: String,
    /// Nested alternatives, folded additively.
    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<AnyOfClause>,
}

/// A full placement intent: the required group plus top-level alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementIntent {
    /// Required selectors; every member must be satisfiable.
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<AllOfClause>,
    /// Top-level alternatives; any one member is acceptable.
    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<AnyOfClause>,
}

impl PlacementIntent {
    /// Flattens this intent; see [`resolve`].
    pub fn resolve(&self) -> ResolvedClusters {
        resolve(&self.all_of, &self.any_of)
    }
}

// =============================================================================
// Resolved Output
// =============================================================================

/// A (provider, cluster-name) candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterByName {
    /// Provider the cluster belongs to.
    pub provider: String,
    /// Cluster name.
    pub cluster: String,
}

/// A (provider, cluster-label) candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterByLabel {
    /// Provider the labeled clusters belong to.
    pub provider: String,
    /// Label selecting a set of clusters.
    pub label: String,
}

/// Flattened candidate sets, in first-seen order, duplicates preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedClusters {
    /// Clusters selected directly by name.
    pub by_name: Vec<ClusterByName>,
    /// Cluster sets selected by label.
    pub by_label: Vec<ClusterByLabel>,
}

impl ResolvedClusters {
    /// True when no selector contributed a candidate.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_label.is_empty()
    }

    /// Total number of collected candidates.
    pub fn len(&self) -> usize {
        self.by_name.len() + self.by_label.len()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Folds one selector into the output, applying the exclusivity rule.
fn fold(provider: &str, name: &str, label: &str, out: &mut ResolvedClusters) {
    if label.is_empty() && !name.is_empty() {
        out.by_name.push(ClusterByName {
            provider: provider.to_string(),
            cluster: name.to_string(),
        });
    } else if name.is_empty() && !label.is_empty() {
        out.by_label.push(ClusterByLabel {
            provider: provider.to_string(),
            label: label.to_string(),
        });
    }
    // Both set, or neither: the entry is skipped.
}

/// Flattens the required group and the alternatives into the two candidate
/// sets.
///
/// Order of collection: required entries first (each immediately followed by
/// its nested alternatives), then the top-level alternatives.
pub fn resolve(all_of: &[AllOfClause], any_of: &[AnyOfClause]) -> ResolvedClusters {
    let mut out = ResolvedClusters::default();

    for required in all_of {
        fold(
            &required.provider_name,
            &required.cluster_name,
            &required.cluster_label_name,
            &mut out,
        );
        for alternative in &required.any_of {
            fold(
                &alternative.provider_name,
                &alternative.cluster_name,
                &alternative.cluster_label_name,
                &mut out,
            );
        }
    }

    for alternative in any_of {
        fold(
            &alternative.provider_name,
            &alternative.cluster_name,
            &alternative.cluster_label_name,
            &mut out,
        );
    }

    out
}
