//! # nodext-core
//!
//! Core types and errors shared across all nodext crates.
//!
//! This crate provides:
//! - `NodextError` enum for unified error handling
//! - The lock graph model read from `package-lock.json`
//! - The manifest dependency model read from `package.json`
//! - Helpers for npm package names and `name@version` tokens
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Lock graph, manifest and package name types
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{NodextError, NodextResult};
pub use types::{
    DependencyLockGraph, ListOptions, LockEntry, LockSlot, ManifestDependencies, ManifestDependency,
    PackageName,
};
