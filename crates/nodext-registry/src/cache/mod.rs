//! Package document caching with TTL support

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;

use crate::api::PackageMetadataResponse;

/// Default lifetime of a cached document
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    metadata: Arc<PackageMetadataResponse>,
    stored_at: SystemTime,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory package document cache with TTL.
///
/// Shared between concurrent listings; documents are handed out as `Arc`s.
/// Hits and misses are counted so a listing can report how much of the
/// registry traffic the cache absorbed.
#[derive(Debug)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl MetadataCache {
    /// Cache with the default TTL (5 minutes)
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose entries expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Get cached document if fresh
    pub fn get(&self, package_name: &str) -> Option<Arc<PackageMetadataResponse>> {
        let fresh = self
            .cache
            .get(package_name)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.metadata));

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            // Remove stale entry; the read guard above is already dropped
            self.cache.remove_if(package_name, |_, entry| !entry.is_fresh(self.ttl));
        }
        fresh
    }

    /// Store a document
    pub fn insert(&self, package_name: String, metadata: Arc<PackageMetadataResponse>) {
        let entry = CacheEntry {
            metadata,
            stored_at: SystemTime::now(),
        };
        self.cache.insert(package_name, entry);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Documents currently stored
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that went to the registry
    pub misses: usize,
}

#[cfg(test)]
mod tests;
