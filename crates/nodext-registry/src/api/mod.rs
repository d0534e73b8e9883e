//! npm registry API response types

use std::collections::HashMap;

use indexmap::IndexMap;
use nodext_core::types::ListOptions;
use serde::{Deserialize, Serialize};

/// Package document ("packument") from the npm registry.
///
/// Requested in the abbreviated install format, which omits `description`
/// and `time`; both are optional here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageMetadataResponse {
    /// Package name
    pub name: String,
    /// Package description
    #[serde(default)]
    pub description: Option<String>,
    /// Tag name to version
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// All versions metadata
    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
    /// Last modification time
    #[serde(default)]
    pub modified: Option<String>,
}

/// Metadata for a specific package version
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionMetadata {
    /// Version string
    pub version: String,
    /// Dependencies
    #[serde(default)]
    pub dependencies: Option<IndexMap<String, String>>,
    /// Optional dependencies (npm also lists these under `dependencies`)
    #[serde(rename = "optionalDependencies", default)]
    pub optional_dependencies: Option<IndexMap<String, String>>,
    /// Dev dependencies
    #[serde(rename = "devDependencies", default)]
    pub dev_dependencies: Option<IndexMap<String, String>>,
    /// Peer dependencies
    #[serde(rename = "peerDependencies", default)]
    pub peer_dependencies: Option<IndexMap<String, String>>,
    /// Deprecation notice
    #[serde(default)]
    pub deprecated: Option<String>,
    /// Distribution information
    #[serde(default)]
    pub dist: Option<DistInfo>,
}

/// Distribution information for package tarball
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistInfo {
    /// Tarball download URL
    pub tarball: String,
    /// SHA-1 checksum (legacy)
    #[serde(default)]
    pub shasum: Option<String>,
    /// Subresource integrity hash (preferred)
    #[serde(default)]
    pub integrity: Option<String>,
}

impl VersionMetadata {
    /// Dependency edges `(name, spec)` followed by a listing.
    ///
    /// `dependencies` are always followed, except entries that are also
    /// optional when optional edges are off. Dev edges are only followed for
    /// the queried root package.
    pub fn edges(&self, options: &ListOptions, is_root: bool) -> Vec<(String, String)> {
        let optional = self.optional_dependencies.as_ref();
        let mut edges: IndexMap<String, String> = IndexMap::new();

        for (name, spec) in self.dependencies.iter().flatten() {
            let is_optional = optional.map(|deps| deps.contains_key(name)).unwrap_or(false);
            if is_optional && !options.optional {
                continue;
            }
            edges.insert(name.clone(), spec.clone());
        }

        if options.optional {
            for (name, spec) in optional.into_iter().flatten() {
                edges.entry(name.clone()).or_insert_with(|| spec.clone());
            }
        }

        if options.peer {
            for (name, spec) in self.peer_dependencies.iter().flatten() {
                edges.entry(name.clone()).or_insert_with(|| spec.clone());
            }
        }

        if options.development && is_root {
            for (name, spec) in self.dev_dependencies.iter().flatten() {
                edges.entry(name.clone()).or_insert_with(|| spec.clone());
            }
        }

        edges.into_iter().collect()
    }
}
