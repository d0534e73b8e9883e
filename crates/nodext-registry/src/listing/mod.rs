//! Flattened dependency listings.
//!
//! [`RemoteLister`] is the capability the remote resolver depends on: given
//! a package and a version spec, return every `name@version` it pulls in.
//! [`RegistryLister`] implements it against an npm registry.

pub mod range;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::try_join_all;
use indexmap::IndexSet;
use nodext_core::error::NodextError;
use nodext_core::types::ListOptions;
use tracing::debug;

use crate::api::{PackageMetadataResponse, VersionMetadata};
use crate::cache::{CacheStats, MetadataCache};
use crate::client::RegistryClient;
use crate::RegistryResult;

/// Remote listing service
pub trait RemoteLister {
    /// List `name@version` tokens for a package and everything it requires.
    ///
    /// The root package itself is part of the result. With `flatten` unset
    /// only its direct dependencies are listed.
    fn list(
        &self,
        name: &str,
        version: &str,
        flatten: bool,
    ) -> impl Future<Output = RegistryResult<Vec<String>>> + Send;
}

/// Registry-backed listing, configured once with the edge classes to follow
#[derive(Debug, Clone)]
pub struct RegistryLister {
    client: RegistryClient,
    cache: Arc<MetadataCache>,
    options: ListOptions,
}

impl RegistryLister {
    /// Create a lister over a client and a shared document cache
    pub fn new(client: RegistryClient, cache: Arc<MetadataCache>, options: ListOptions) -> Self {
        Self {
            client,
            cache,
            options,
        }
    }

    /// Edge classes this lister follows
    pub fn options(&self) -> ListOptions {
        self.options
    }

    /// Fetch a package document, from the cache when fresh
    async fn document(&self, name: &str) -> RegistryResult<Arc<PackageMetadataResponse>> {
        if let Some(cached) = self.cache.get(name) {
            debug!("Cache hit for {}", name);
            return Ok(cached);
        }

        // Abbreviated documents omit dev dependencies
        let document = if self.options.development {
            self.client.fetch_full_metadata(name).await?
        } else {
            self.client.fetch_metadata(name).await?
        };
        let document = Arc::new(document);
        self.cache.insert(name.to_string(), Arc::clone(&document));
        Ok(document)
    }

    /// Resolve a version spec to a concrete version and its metadata
    async fn resolve(&self, name: &str, spec: &str) -> RegistryResult<(String, VersionMetadata)> {
        let document = self.document(name).await?;

        let no_match = || NodextError::NoMatchingVersion {
            name: name.to_string(),
            spec: spec.to_string(),
        };

        let version = range::select_version(&document, spec).ok_or_else(no_match)?;
        let metadata = document.versions.get(&version).cloned().ok_or_else(no_match)?;
        Ok((version, metadata))
    }

    async fn list_from_root(&self, name: &str, spec: &str, flatten: bool) -> RegistryResult<Vec<String>> {
        let (root_version, root) = self.resolve(name, spec).await?;

        let mut listed = IndexSet::new();
        listed.insert(format!("{}@{}", name, root_version));

        let mut seen_specs: HashSet<(String, String)> = HashSet::new();
        let mut frontier: Vec<(String, String)> = root.edges(&self.options, true);

        while !frontier.is_empty() {
            frontier.retain(|edge| seen_specs.insert(edge.clone()));

            // One level at a time; any failure aborts the whole listing
            let resolved = try_join_all(frontier.iter().map(|(dep, dep_spec)| self.resolve(dep, dep_spec))).await?;

            let mut next = Vec::new();
            for ((dep, _), (version, metadata)) in frontier.iter().zip(resolved) {
                let first_visit = listed.insert(format!("{}@{}", dep, version));
                if first_visit && flatten {
                    next.extend(metadata.edges(&self.options, false));
                }
            }
            frontier = next;
        }

        let stats = self.cache.stats();
        debug!(
            "Listed {} packages for {}@{} (cache: {} hits, {} misses)",
            listed.len(),
            name,
            root_version,
            stats.hits,
            stats.misses
        );
        Ok(listed.into_iter().collect())
    }

    /// Statistics of the shared document cache
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl RemoteLister for RegistryLister {
    fn list(
        &self,
        name: &str,
        version: &str,
        flatten: bool,
    ) -> impl Future<Output = RegistryResult<Vec<String>>> + Send {
        self.list_from_root(name, version, flatten)
    }
}
