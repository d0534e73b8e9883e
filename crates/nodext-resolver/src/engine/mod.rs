//! Closure engine: seed normalization, strategy dispatch, filtering.
//!
//! The engine is the only entry point hosts need. One call reads the
//! metadata it needs, expands the seeds with exactly one strategy and
//! returns the sorted closure, or the first error encountered.

use std::collections::HashSet;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use nodext_config::{
    load_externals_file, ExternalsSettings, ResolverStrategy, EXTERNALS_FILE_NAME, LOCK_FILE_NAME,
    MANIFEST_FILE_NAME,
};
use nodext_core::error::NodextError;
use nodext_registry::{RegistryLister, RemoteLister};
use serde::Serialize;
use tracing::{debug, info};

use crate::local::LocalGraphResolver;
use crate::remote::RemoteClosureResolver;
use crate::source::MetadataSource;
use crate::ResolverResult;

/// Inputs of one resolution beyond the seed list
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Extra seeds file; a missing file is ignored
    pub externals_file: Option<Utf8PathBuf>,
    /// Names removed from the closure
    pub exclude: Option<Vec<String>>,
    /// Expansion strategy
    pub strategy: ResolverStrategy,
    /// Lock file read by the lock-graph strategy
    pub lock_file: Utf8PathBuf,
    /// Manifest read by the remote-listing strategy
    pub manifest: Utf8PathBuf,
    /// Abort the whole call after this long
    pub timeout: Option<Duration>,
}

/// Sorted, deduplicated package names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Closure {
    names: Vec<String>,
}

/// Expands externals into their dependency closure
#[derive(Debug, Clone)]
pub struct ClosureEngine<L = RegistryLister> {
    local: LocalGraphResolver,
    remote: Option<RemoteClosureResolver<L>>,
}

impl ResolveOptions {
    /// Defaults for a project rooted at `root`
    pub fn for_project(root: &Utf8Path) -> Self {
        Self {
            externals_file: Some(root.join(EXTERNALS_FILE_NAME)),
            exclude: None,
            strategy: ResolverStrategy::default(),
            lock_file: root.join(LOCK_FILE_NAME),
            manifest: root.join(MANIFEST_FILE_NAME),
            timeout: None,
        }
    }

    /// Options described by project settings, paths relative to `root`
    pub fn from_settings(root: &Utf8Path, settings: &ExternalsSettings) -> Self {
        let defaults = Self::for_project(root);
        Self {
            externals_file: settings.file.as_deref().map(|file| root.join(file)).or(defaults.externals_file),
            exclude: settings.exclude.clone(),
            strategy: settings.resolver,
            lock_file: settings.lock_file.as_deref().map(|file| root.join(file)).unwrap_or(defaults.lock_file),
            manifest: settings.manifest.as_deref().map(|file| root.join(file)).unwrap_or(defaults.manifest),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Replace the exclusion set
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Select a strategy
    pub fn strategy(mut self, strategy: ResolverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the extra seeds file
    pub fn externals_file(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.externals_file = path;
        self
    }

    /// Bound the whole call
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Closure {
    /// Empty entries dropped, first occurrence kept, `exclude` removed, sorted
    pub fn from_candidates<I>(candidates: I, exclude: &HashSet<&str>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let unique: IndexSet<String> = candidates.into_iter().filter(|name| !name.is_empty()).collect();
        let mut names: Vec<String> = unique
            .into_iter()
            .filter(|name| !exclude.contains(name.as_str()))
            .collect();
        names.sort();
        Self { names }
    }

    /// Names in the closure
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a package is part of the closure
    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl IntoIterator for Closure {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl ClosureEngine<RegistryLister> {
    /// Engine that only supports the lock-graph strategy
    pub fn local() -> Self {
        Self {
            local: LocalGraphResolver::new(),
            remote: None,
        }
    }
}

impl<L: RemoteLister> ClosureEngine<L> {
    /// Engine supporting both strategies
    pub fn new(lister: L) -> Self {
        Self {
            local: LocalGraphResolver::new(),
            remote: Some(RemoteClosureResolver::new(lister)),
        }
    }

    /// Resolve the closure of `seeds`, bounded by `options.timeout`
    pub async fn resolve(&self, seeds: &[String], options: &ResolveOptions) -> ResolverResult<Closure> {
        match options.timeout {
            Some(limit) => tokio::time::timeout(limit, self.resolve_unbounded(seeds, options))
                .await
                .map_err(|_| NodextError::Timeout { limit })?,
            None => self.resolve_unbounded(seeds, options).await,
        }
    }

    async fn resolve_unbounded(&self, seeds: &[String], options: &ResolveOptions) -> ResolverResult<Closure> {
        let mut externals = seeds.to_vec();
        if let Some(path) = &options.externals_file {
            if let Some(extra) = load_externals_file(path).await? {
                debug!("Read {} externals from {}", extra.len(), path);
                externals.extend(extra);
            }
        }

        if externals.is_empty() && options.exclude.is_none() {
            return Err(NodextError::NoExternalsConfigured);
        }

        let exclude: HashSet<&str> = options
            .exclude
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();

        // Excluded seeds are never expanded
        externals.retain(|name| !exclude.contains(name.as_str()));
        info!("Listed externals: {}", externals.join(", "));

        if externals.is_empty() {
            return Ok(Closure::default());
        }

        let candidates = match MetadataSource::load(options.strategy, &options.lock_file, &options.manifest).await? {
            MetadataSource::LockGraph(source) => self.local.expand(&externals, &source)?,
            MetadataSource::Manifest(source) => {
                let remote = self.remote.as_ref().ok_or_else(|| NodextError::ConfigValidation {
                    field: "resolver".to_string(),
                    reason: format!("{} is not available in this engine", ResolverStrategy::RemoteListing),
                })?;
                remote.expand(&externals, &source).await?
            },
        };

        if !exclude.is_empty() {
            let mut excluded: Vec<&str> = exclude.iter().copied().collect();
            excluded.sort_unstable();
            info!("Not including in package: {}", excluded.join(", "));
        }

        let closure = Closure::from_candidates(candidates, &exclude);
        info!(
            "Externals with dependencies (these modules will be included in the package): {}",
            closure.names().join(", ")
        );
        Ok(closure)
    }
}
