//! Dependency closure resolution for nodext
//!
//! Expands a list of external modules into every package they need at
//! runtime. Two strategies are available: a walk over the lock graph of the
//! project, and a registry-driven listing of each external's flattened
//! dependency tree. [`ClosureEngine`] normalizes seeds, runs one strategy,
//! then filters, deduplicates and sorts the result.

pub mod source;
pub mod local;
pub mod remote;
pub mod engine;
pub mod adapters;

// Re-export main types
pub use source::{LockGraphSource, ManifestSource, MetadataSource};
pub use local::LocalGraphResolver;
pub use remote::RemoteClosureResolver;
pub use engine::{Closure, ClosureEngine, ResolveOptions};
pub use adapters::{ExternalsMatcher, PackagePatterns};
pub use nodext_config::ResolverStrategy;

use nodext_core::error::NodextError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, NodextError>;
