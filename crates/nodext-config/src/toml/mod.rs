//! nodext.toml settings parsing and validation

use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use indexmap::IndexMap;
use nodext_core::error::NodextError;
use nodext_core::types::ListOptions;
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Strategy used to expand externals into their dependency closure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverStrategy {
    /// Walk the `package-lock.json` graph
    #[default]
    #[serde(alias = "package-lock")]
    LockGraph,
    /// Query the registry for flattened dependency listings
    #[serde(alias = "npm-remote-ls")]
    RemoteListing,
}

/// Externals settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalsSettings {
    /// External modules needed at runtime
    pub modules: Vec<String>,

    /// Extra externals file (JSON array), relative to the project root
    pub file: Option<String>,

    /// Modules never included, even when required transitively
    pub exclude: Option<Vec<String>>,

    /// Per-module subpath used in package patterns (default `**`)
    #[serde(alias = "moduleSubpaths")]
    pub module_subpaths: IndexMap<String, String>,

    /// Emit include patterns instead of negated exclude patterns
    #[serde(alias = "useInclude")]
    pub use_include: bool,

    /// Resolution strategy
    pub resolver: ResolverStrategy,

    /// Edge classes followed by the remote listing
    pub ls: ListOptions,

    /// Registry base URL for the remote listing
    pub registry: Option<String>,

    /// Lock file path, relative to the project root
    #[serde(alias = "packagePath")]
    pub lock_file: Option<String>,

    /// Manifest path, relative to the project root
    pub manifest: Option<String>,

    /// Give up on a resolution after this many seconds
    #[serde(alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

impl ResolverStrategy {
    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverStrategy::LockGraph => "lock-graph",
            ResolverStrategy::RemoteListing => "remote-listing",
        }
    }
}

impl fmt::Display for ResolverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverStrategy {
    type Err = NodextError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "lock-graph" | "package-lock" => Ok(ResolverStrategy::LockGraph),
            "remote-listing" | "npm-remote-ls" => Ok(ResolverStrategy::RemoteListing),
            other => Err(NodextError::ConfigValidation {
                field: "resolver".to_string(),
                reason: format!(
                    "Unknown resolver '{}', expected 'lock-graph' or 'remote-listing'",
                    other
                ),
            }),
        }
    }
}

impl ExternalsSettings {
    /// Settings listing the given modules and nothing else
    pub fn with_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Subpath for a module in package patterns
    pub fn subpath_for(&self, module: &str) -> &str {
        self.module_subpaths
            .get(module)
            .map(String::as_str)
            .unwrap_or("**")
    }
}

/// Parse a nodext.toml document
pub fn parse_settings(path: &str, content: &str) -> ConfigResult<ExternalsSettings> {
    // First try with toml_edit for better error reporting
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| toml_error(path, content, e.message(), e.span()))?;

    // Then parse with serde for type safety
    let settings: ExternalsSettings = ::toml::from_str(content)
        .map_err(|e| toml_error(path, content, e.message(), e.span()))?;

    validate_settings(&settings)?;

    Ok(settings)
}

/// Validate settings completeness
pub fn validate_settings(settings: &ExternalsSettings) -> ConfigResult<()> {
    for module in &settings.modules {
        validate_module_name("modules", module)?;
    }

    for module in settings.exclude.iter().flatten() {
        validate_module_name("exclude", module)?;
    }

    for (module, subpath) in &settings.module_subpaths {
        validate_module_name("module_subpaths", module)?;
        if subpath.is_empty() || subpath.starts_with('/') {
            return Err(NodextError::ConfigValidation {
                field: "module_subpaths".to_string(),
                reason: format!("Subpath for '{}' must be a relative glob, got '{}'", module, subpath),
            });
        }
    }

    if settings.timeout_secs == Some(0) {
        return Err(NodextError::ConfigValidation {
            field: "timeout_secs".to_string(),
            reason: "Timeout must be at least one second".to_string(),
        });
    }

    Ok(())
}

/// Load and parse nodext.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ExternalsSettings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NodextError::io(format!("Failed to read {}", path), e))?;

    parse_settings(path.as_str(), &content)
}

fn validate_module_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() || name != name.trim() {
        return Err(NodextError::ConfigValidation {
            field: field.to_string(),
            reason: format!("Invalid module name '{}'", name),
        });
    }
    Ok(())
}

fn toml_error(
    path: &str,
    content: &str,
    message: &str,
    span: Option<std::ops::Range<usize>>,
) -> NodextError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((0, 0));
    NodextError::TomlParse {
        path: path.to_string(),
        message: message.trim().to_string(),
        line,
        column,
    }
}

/// One-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
    (line, column)
}
