//! Read-only access to the dependency metadata a strategy walks.
//!
//! Lookups return typed errors naming the package and the file it was
//! expected in, so resolvers never inspect raw JSON shapes themselves.

use camino::{Utf8Path, Utf8PathBuf};
use nodext_config::{load_lock_graph, load_manifest, ResolverStrategy};
use nodext_core::error::NodextError;
use nodext_core::types::{DependencyLockGraph, LockEntry, LockSlot, ManifestDependencies, ManifestDependency};

use crate::ResolverResult;

/// Lock graph together with the path it was read from
#[derive(Debug, Clone)]
pub struct LockGraphSource {
    path: Utf8PathBuf,
    graph: DependencyLockGraph,
}

/// Manifest dependencies together with the path they were read from
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: Utf8PathBuf,
    dependencies: ManifestDependencies,
}

/// Metadata backing one resolution
#[derive(Debug, Clone)]
pub enum MetadataSource {
    /// Pinned graph from the lock file
    LockGraph(LockGraphSource),
    /// Declared versions from the manifest, for registry queries
    Manifest(ManifestSource),
}

impl LockGraphSource {
    /// Wrap an already decoded graph
    pub fn new(path: impl Into<Utf8PathBuf>, graph: DependencyLockGraph) -> Self {
        Self {
            path: path.into(),
            graph,
        }
    }

    /// Read and decode a lock file
    pub async fn load(path: &Utf8Path) -> ResolverResult<Self> {
        let graph = load_lock_graph(path).await?;
        Ok(Self::new(path, graph))
    }

    /// Path of the lock file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Underlying graph
    pub fn graph(&self) -> &DependencyLockGraph {
        &self.graph
    }

    /// Entry for a seed, which must be declared in the graph
    pub fn seed(&self, name: &str) -> ResolverResult<&LockEntry> {
        self.lookup(name)?.ok_or_else(|| NodextError::UnlistedDependency {
            name: name.to_string(),
            path: self.path.to_string(),
        })
    }

    /// Entry for a transitive dependency, `None` when the graph lacks it
    pub fn lookup(&self, name: &str) -> ResolverResult<Option<&LockEntry>> {
        match self.graph.get(name) {
            Some(LockSlot::Entry(entry)) => Ok(Some(entry)),
            Some(LockSlot::Corrupt { found }) => Err(NodextError::CorruptLockFile {
                name: name.to_string(),
                path: self.path.to_string(),
                found: found.to_string(),
            }),
            None => Ok(None),
        }
    }
}

impl ManifestSource {
    /// Wrap already decoded manifest dependencies
    pub fn new(path: impl Into<Utf8PathBuf>, dependencies: ManifestDependencies) -> Self {
        Self {
            path: path.into(),
            dependencies,
        }
    }

    /// Read and decode a manifest
    pub async fn load(path: &Utf8Path) -> ResolverResult<Self> {
        let dependencies = load_manifest(path).await?;
        Ok(Self::new(path, dependencies))
    }

    /// Path of the manifest
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Declared version of a seed
    pub fn version_of(&self, name: &str) -> ResolverResult<&str> {
        match self.dependencies.get(name) {
            Some(ManifestDependency::Unsupported(found)) => Err(NodextError::InvalidDependencySpec {
                name: name.to_string(),
                path: self.path.to_string(),
                reason: format!("expected a version string or an object with `version`, found {}", found),
            }),
            Some(dependency) => dependency.version().ok_or_else(|| NodextError::InvalidDependencySpec {
                name: name.to_string(),
                path: self.path.to_string(),
                reason: "no version declared".to_string(),
            }),
            None => Err(NodextError::UnlistedDependency {
                name: name.to_string(),
                path: self.path.to_string(),
            }),
        }
    }
}

impl MetadataSource {
    /// Load the metadata a strategy needs
    pub async fn load(
        strategy: ResolverStrategy,
        lock_file: &Utf8Path,
        manifest: &Utf8Path,
    ) -> ResolverResult<Self> {
        match strategy {
            ResolverStrategy::LockGraph => LockGraphSource::load(lock_file).await.map(MetadataSource::LockGraph),
            ResolverStrategy::RemoteListing => ManifestSource::load(manifest).await.map(MetadataSource::Manifest),
        }
    }

    /// Path the metadata was read from
    pub fn path(&self) -> &Utf8Path {
        match self {
            MetadataSource::LockGraph(source) => source.path(),
            MetadataSource::Manifest(source) => source.path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_source() -> LockGraphSource {
        let mut graph = DependencyLockGraph::new()
            .with_entry("a", LockEntry::new(["b"]))
            .with_entry("b", LockEntry::default());
        graph.insert("broken", LockSlot::Corrupt { found: "string" });
        LockGraphSource::new("/srv/app/package-lock.json", graph)
    }

    #[test]
    fn test_seed_lookup() {
        let source = lock_source();
        assert!(source.seed("a").is_ok());

        let err = source.seed("z").unwrap_err();
        assert!(matches!(err, NodextError::UnlistedDependency { ref name, .. } if name == "z"));
        assert_eq!(
            err.to_string(),
            "External module z not listed in /srv/app/package-lock.json dependencies"
        );
    }

    #[test]
    fn test_transitive_lookup() {
        let source = lock_source();
        assert!(source.lookup("b").unwrap().is_some());
        assert!(source.lookup("missing").unwrap().is_none());
        assert!(matches!(
            source.lookup("broken"),
            Err(NodextError::CorruptLockFile { ref name, ref found, .. }) if name == "broken" && found == "string"
        ));
        assert!(matches!(source.seed("broken"), Err(NodextError::CorruptLockFile { .. })));
    }

    #[test]
    fn test_manifest_versions() {
        let manifest: ManifestDependencies = serde_json::from_value(serde_json::json!({
            "dependencies": {
                "a": "1.0.0",
                "b": { "version": "^2.0.0" },
                "c": true
            }
        }))
        .unwrap();
        let source = ManifestSource::new("package.json", manifest);

        assert_eq!(source.version_of("a").unwrap(), "1.0.0");
        assert_eq!(source.version_of("b").unwrap(), "^2.0.0");
        assert!(matches!(source.version_of("c"), Err(NodextError::InvalidDependencySpec { .. })));
        assert!(matches!(source.version_of("d"), Err(NodextError::UnlistedDependency { .. })));
    }

    #[tokio::test]
    async fn test_load_by_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let lock_file = root.join("package-lock.json");
        let manifest = root.join("package.json");
        std::fs::write(&lock_file, r#"{"dependencies":{"a":{"version":"1.0.0"}}}"#).unwrap();
        std::fs::write(&manifest, r#"{"dependencies":{"a":"1.0.0"}}"#).unwrap();

        let lock = MetadataSource::load(ResolverStrategy::LockGraph, &lock_file, &manifest)
            .await
            .unwrap();
        assert!(matches!(lock, MetadataSource::LockGraph(_)));
        assert_eq!(lock.path(), lock_file.as_path());

        let remote = MetadataSource::load(ResolverStrategy::RemoteListing, &lock_file, &manifest)
            .await
            .unwrap();
        assert!(matches!(remote, MetadataSource::Manifest(_)));
        assert_eq!(remote.path(), manifest.as_path());
    }
}
