//! npm registry client for nodext
//!
//! This crate provides the remote listing service used by the
//! `remote-listing` resolver: an HTTP client for registry package documents
//! with connection pooling, retry logic and caching, npm range matching, and
//! a flattened dependency listing built on top of them.

pub mod client;
pub mod api;
pub mod cache;
pub mod listing;

// Re-export main types
pub use client::{RegistryClient, RetryConfig, AuthConfig, DEFAULT_REGISTRY};
pub use api::{PackageMetadataResponse, VersionMetadata, DistInfo};
pub use cache::{MetadataCache, CacheStats};
pub use listing::{RemoteLister, RegistryLister};
pub use nodext_core::types::ListOptions;

use nodext_core::error::NodextError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, NodextError>;
