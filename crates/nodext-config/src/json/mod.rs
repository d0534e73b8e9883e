//! JSON metadata loading: lock file, manifest, externals file and the
//! `externals` key of package.json

use camino::Utf8Path;
use nodext_core::error::NodextError;
use nodext_core::types::{DependencyLockGraph, ManifestDependencies};
use serde::Deserialize;
use tracing::debug;

use crate::toml::{validate_settings, ExternalsSettings};
use crate::ConfigResult;

/// `externals` key of package.json: a bare module list or full settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExternalsField {
    /// `"externals": ["sharp", "knex"]`
    List(Vec<String>),
    /// `"externals": { "modules": [...], "exclude": [...] }`
    Settings(ExternalsSettings),
}

#[derive(Deserialize)]
struct PackageJsonExternals {
    #[serde(default)]
    externals: Option<ExternalsField>,
}

impl From<ExternalsField> for ExternalsSettings {
    fn from(field: ExternalsField) -> Self {
        match field {
            ExternalsField::List(modules) => ExternalsSettings::with_modules(modules),
            ExternalsField::Settings(settings) => settings,
        }
    }
}

/// Parse a lock file document
pub fn parse_lock_graph(path: &str, content: &str) -> ConfigResult<DependencyLockGraph> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| json_error(path, e))?;

    DependencyLockGraph::from_value(value).map_err(|message| NodextError::JsonParse {
        path: path.to_string(),
        message,
    })
}

/// Parse manifest dependencies from a package.json document
pub fn parse_manifest(path: &str, content: &str) -> ConfigResult<ManifestDependencies> {
    serde_json::from_str(content).map_err(|e| json_error(path, e))
}

/// Parse an externals file (JSON array of module names)
pub fn parse_externals_file(path: &str, content: &str) -> ConfigResult<Vec<String>> {
    serde_json::from_str(content).map_err(|e| json_error(path, e))
}

/// Parse the `externals` key of a package.json document
pub fn parse_package_json_settings(path: &str, content: &str) -> ConfigResult<Option<ExternalsSettings>> {
    let document: PackageJsonExternals = serde_json::from_str(content).map_err(|e| json_error(path, e))?;

    match document.externals {
        Some(field) => {
            let settings = ExternalsSettings::from(field);
            validate_settings(&settings)?;
            Ok(Some(settings))
        },
        None => Ok(None),
    }
}

/// Load the lock graph from a lock file
pub async fn load_lock_graph(path: &Utf8Path) -> ConfigResult<DependencyLockGraph> {
    let content = read(path).await?;
    let graph = parse_lock_graph(path.as_str(), &content)?;
    debug!("Read {} lock entries from {}", graph.len(), path);
    Ok(graph)
}

/// Load manifest dependencies from a package.json
pub async fn load_manifest(path: &Utf8Path) -> ConfigResult<ManifestDependencies> {
    let content = read(path).await?;
    parse_manifest(path.as_str(), &content)
}

/// Load the externals file. A missing file is not an error.
pub async fn load_externals_file(path: &Utf8Path) -> ConfigResult<Option<Vec<String>>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_externals_file(path.as_str(), &content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No externals file at {}", path);
            Ok(None)
        },
        Err(e) => Err(NodextError::io(format!("Failed to read {}", path), e)),
    }
}

/// Load externals settings from the `externals` key of a package.json
pub async fn load_package_json_settings(path: &Utf8Path) -> ConfigResult<Option<ExternalsSettings>> {
    let content = read(path).await?;
    parse_package_json_settings(path.as_str(), &content)
}

async fn read(path: &Utf8Path) -> ConfigResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NodextError::io(format!("Failed to read {}", path), e))
}

fn json_error(path: &str, error: serde_json::Error) -> NodextError {
    NodextError::JsonParse {
        path: path.to_string(),
        message: format!("JSON parsing error: {}", error),
    }
}
