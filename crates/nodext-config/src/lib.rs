//! Configuration parsing for nodext
//!
//! This crate reads everything a resolution needs from disk: the externals
//! settings (`nodext.toml`, or the `externals` key of `package.json`), the
//! lock graph, the manifest dependencies and the optional externals file.

pub mod toml;
pub mod json;
pub mod merge;

// Re-export main types
pub use toml::{ExternalsSettings, ResolverStrategy};
pub use json::{load_externals_file, load_lock_graph, load_manifest};
pub use merge::{ConfigLoader, ConfigSource};

use nodext_core::error::NodextError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, NodextError>;

/// Default lock file name, relative to the project root
pub const LOCK_FILE_NAME: &str = "package-lock.json";

/// Default manifest file name, relative to the project root
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Default externals file name, relative to the project root
pub const EXTERNALS_FILE_NAME: &str = "node-externals.json";

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "nodext.toml";
