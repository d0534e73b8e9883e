//! Error types and result aliases for nodext operations.
//!
//! Every error names the offending package and, where one is involved, the
//! file it was read from, so an operator can fix configuration without
//! reading source.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for all nodext operations
#[derive(Error, Debug)]
pub enum NodextError {
    // Configuration errors
    #[error("No externals listed: configure at least one external module or an exclude list")]
    NoExternalsConfigured,

    #[error("Failed to parse {path}: {message} at line {line}, column {column}")]
    TomlParse {
        path: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse {path}: {message}")]
    JsonParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Metadata errors
    #[error("External module {name} not listed in {path} dependencies")]
    UnlistedDependency { name: String, path: String },

    #[error("Package lock file {path} invalid: entry for {name} is not a well-formed object (found {found})")]
    CorruptLockFile {
        name: String,
        path: String,
        found: String,
    },

    #[error("Dependency {name} in {path} has no usable version: {reason}")]
    InvalidDependencySpec {
        name: String,
        path: String,
        reason: String,
    },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("No version of {name} matches '{spec}'")]
    NoMatchingVersion { name: String, spec: String },

    #[error("Registry returned status {status} for {name}")]
    Registry { name: String, status: u16 },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to list dependencies of {name}@{version}")]
    RemoteResolution {
        name: String,
        version: String,
        #[source]
        source: Box<NodextError>,
    },

    #[error("Resolution did not finish within {limit:?}")]
    Timeout { limit: Duration },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for nodext operations
pub type NodextResult<T> = Result<T, NodextError>;

impl NodextError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Wrap a listing failure for `name@version`
    pub fn remote(name: &str, version: &str, source: NodextError) -> Self {
        Self::RemoteResolution {
            name: name.to_string(),
            version: version.to_string(),
            source: Box::new(source),
        }
    }

    /// Check if this error is a transient transport or server failure
    pub fn is_recoverable(&self) -> bool {
        match self {
            NodextError::Network { .. } | NodextError::Io { .. } => true,
            NodextError::Registry { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            NodextError::NoExternalsConfigured => {
                Some("List external modules under `modules` in nodext.toml or pass them to `nodext resolve`")
            },
            NodextError::UnlistedDependency { .. } => {
                Some("Add the module to your dependencies and reinstall, or remove it from the externals list")
            },
            NodextError::CorruptLockFile { .. } => {
                Some("Regenerate the lock file with `npm install`")
            },
            NodextError::InvalidDependencySpec { .. } => {
                Some("Use a version string or an object with a `version` field")
            },
            NodextError::PackageNotFound { .. } => {
                Some("Check the package name spelling and the configured registry")
            },
            NodextError::Registry { status: 401 | 403, .. } => {
                Some("Check the registry token in .npmrc or NPM_TOKEN")
            },
            NodextError::Registry { .. } => Some("The registry may be unavailable, try again later"),
            NodextError::Network { .. } => Some("Check your internet connection and try again"),
            NodextError::RemoteResolution { source, .. } => source.suggestion(),
            NodextError::Timeout { .. } => Some("Raise --timeout or use the lock-graph resolver"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unlisted_dependency_message() {
        let err = NodextError::UnlistedDependency {
            name: "Z".to_string(),
            path: "/srv/app/package-lock.json".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Z"));
        assert!(message.contains("/srv/app/package-lock.json"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_remote_error_keeps_source() {
        let err = NodextError::remote(
            "left-pad",
            "^1.0.0",
            NodextError::PackageNotFound { name: "left-pad".to_string() },
        );
        assert_eq!(err.to_string(), "Failed to list dependencies of left-pad@^1.0.0");
        let source = err.source().expect("source should be kept");
        assert!(source.to_string().contains("left-pad"));
    }

    #[test]
    fn test_recoverable() {
        let io = NodextError::io(
            "read failed".to_string(),
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(io.is_recoverable());
        assert!(!NodextError::NoExternalsConfigured.is_recoverable());

        let registry = |status| NodextError::Registry {
            name: "left-pad".to_string(),
            status,
        };
        assert!(registry(503).is_recoverable());
        assert!(!registry(401).is_recoverable());
        assert!(!registry(429).is_recoverable());
    }

    #[test]
    fn test_rejected_credentials_point_at_token() {
        let err = NodextError::remote(
            "private",
            "1.0.0",
            NodextError::Registry {
                name: "private".to_string(),
                status: 401,
            },
        );
        assert_eq!(err.suggestion(), Some("Check the registry token in .npmrc or NPM_TOKEN"));
    }

    #[test]
    fn test_corrupt_lock_file_names_what_was_found() {
        let err = NodextError::CorruptLockFile {
            name: "b".to_string(),
            path: "package-lock.json".to_string(),
            found: "malformed object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package lock file package-lock.json invalid: entry for b is not a well-formed object (found malformed object)"
        );
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = NodextError::Timeout {
            limit: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Resolution did not finish within 250ms");
    }
}
