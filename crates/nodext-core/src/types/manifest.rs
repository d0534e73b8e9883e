//! Manifest dependency types.
//!
//! The remote strategy only needs to know which version of each seed to
//! query. A `package.json` dependency value is either a version string or an
//! object carrying `version`; anything else is kept as `Unsupported` and
//! reported when a seed refers to it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Declared version of one manifest dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestDependency {
    /// `"name": "^1.0.0"`
    Version(String),
    /// `"name": { "version": "^1.0.0", ... }`
    Detailed { version: String },
    /// Any other shape, with a short description of what was found
    Unsupported(String),
}

/// `dependencies` section of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManifestDependencies {
    /// Package name from the manifest
    #[serde(default)]
    pub name: Option<String>,
    /// Dependency name to declared version
    #[serde(default)]
    pub dependencies: IndexMap<String, ManifestDependency>,
}

impl ManifestDependency {
    /// Decode one dependency value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(version) => ManifestDependency::Version(version),
            Value::Object(mut object) => match object.remove("version") {
                Some(Value::String(version)) => ManifestDependency::Detailed { version },
                Some(_) => ManifestDependency::Unsupported("object with a non-string version".to_string()),
                None => ManifestDependency::Unsupported("object without a version".to_string()),
            },
            Value::Null => ManifestDependency::Unsupported("null".to_string()),
            Value::Bool(_) => ManifestDependency::Unsupported("boolean".to_string()),
            Value::Number(_) => ManifestDependency::Unsupported("number".to_string()),
            Value::Array(_) => ManifestDependency::Unsupported("array".to_string()),
        }
    }

    /// Version to query, if the value had a usable shape
    pub fn version(&self) -> Option<&str> {
        match self {
            ManifestDependency::Version(version) => Some(version),
            ManifestDependency::Detailed { version } => Some(version),
            ManifestDependency::Unsupported(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for ManifestDependency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(ManifestDependency::from_value)
    }
}

impl ManifestDependencies {
    /// Create manifest dependencies from `(name, version)` pairs
    pub fn from_versions<I, N, V>(versions: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: None,
            dependencies: versions
                .into_iter()
                .map(|(name, version)| (name.into(), ManifestDependency::Version(version.into())))
                .collect(),
        }
    }

    /// Look up a declared dependency
    pub fn get(&self, name: &str) -> Option<&ManifestDependency> {
        self.dependencies.get(name)
    }
}
