//! Core data types for nodext.
//!
//! This module provides the data model read at the start of a resolution:
//! - The lock graph from `package-lock.json`
//! - Manifest dependencies from `package.json`
//! - Package name helpers
//! - Remote listing edge options

pub mod listing;
pub mod lock;
pub mod manifest;
pub mod package;

// Re-export all public types
pub use listing::ListOptions;
pub use lock::{DependencyLockGraph, LockEntry, LockSlot};
pub use manifest::{ManifestDependencies, ManifestDependency};
pub use package::{is_scoped, name_from_token, PackageName};
