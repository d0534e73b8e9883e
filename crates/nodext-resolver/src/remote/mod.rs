//! Registry-driven closure resolution.
//!
//! Each seed's declared version is looked up in the manifest and its
//! flattened dependency listing is requested from a [`RemoteLister`]. All
//! listings run concurrently and the first failure aborts the batch.

use futures_util::future::try_join_all;
use nodext_core::error::NodextError;
use nodext_core::types::name_from_token;
use nodext_registry::RemoteLister;
use tracing::info;

use crate::source::ManifestSource;
use crate::ResolverResult;

/// Expands seeds through a remote listing service
#[derive(Debug, Clone)]
pub struct RemoteClosureResolver<L> {
    lister: L,
}

impl<L: RemoteLister> RemoteClosureResolver<L> {
    /// Create a resolver over a configured lister
    pub fn new(lister: L) -> Self {
        Self { lister }
    }

    /// Listing service in use
    pub fn lister(&self) -> &L {
        &self.lister
    }

    /// Seeds followed by the names in every seed's flattened listing.
    ///
    /// Every seed must be declared in the manifest; versions are resolved
    /// before any query is sent. The result is not deduplicated.
    pub async fn expand(&self, seeds: &[String], source: &ManifestSource) -> ResolverResult<Vec<String>> {
        let queries = seeds
            .iter()
            .map(|seed| source.version_of(seed).map(|version| (seed.as_str(), version)))
            .collect::<ResolverResult<Vec<_>>>()?;

        if queries.is_empty() {
            return Ok(Vec::new());
        }

        info!("Fetching dependencies for {} modules", queries.len());

        let listings = try_join_all(queries.iter().map(|&(name, version)| async move {
            self.lister
                .list(name, version, true)
                .await
                .map_err(|e| NodextError::remote(name, version, e))
        }))
        .await?;

        let mut found = seeds.to_vec();
        for listing in &listings {
            found.extend(listing.iter().map(|token| name_from_token(token).to_string()));
        }

        info!("Fetched {} listings", listings.len());
        Ok(found)
    }
}
