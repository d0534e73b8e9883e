//! Lock graph types.
//!
//! Models the `dependencies` section of an npm `package-lock.json`. Entries
//! are decoded one by one so that a single malformed entry is kept as a
//! [`LockSlot::Corrupt`] and only reported when the traversal reaches it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used for the traversal root when the lock file has no `name`
pub const DEFAULT_ROOT_LABEL: &str = "root";

/// A single package recorded in the lock graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Pinned version
    #[serde(default)]
    pub version: Option<String>,
    /// Installed only as a development dependency
    #[serde(default)]
    pub dev: bool,
    /// Installed only as an optional dependency
    #[serde(default)]
    pub optional: bool,
    /// Required package name to version requirement
    #[serde(default)]
    pub requires: Option<IndexMap<String, String>>,
}

/// Decoded value stored under a package name in the lock graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockSlot {
    /// Well-formed entry
    Entry(LockEntry),
    /// Present but not an object (or an object of the wrong shape)
    Corrupt {
        /// JSON type that was found
        found: &'static str,
    },
}

/// Dependency lock graph read from a lock file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyLockGraph {
    /// Project name from the lock file, used as the traversal root label
    pub name: Option<String>,
    /// Lock file format version
    pub lockfile_version: Option<u64>,
    /// Package name to entry, in lock file order
    pub entries: IndexMap<String, LockSlot>,
}

impl LockEntry {
    /// Create an entry with the given requirements
    pub fn new<I, S>(requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: None,
            dev: false,
            optional: false,
            requires: Some(requires.into_iter().map(|name| (name.into(), "*".to_string())).collect()),
        }
    }

    /// Mark this entry as a development dependency
    pub fn dev(mut self) -> Self {
        self.dev = true;
        self
    }

    /// Names this entry requires, in recorded order
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.requires
            .iter()
            .flat_map(|requires| requires.keys())
            .map(String::as_str)
    }
}

impl LockSlot {
    /// Decode one lock graph value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => match serde_json::from_value::<LockEntry>(value) {
                Ok(entry) => LockSlot::Entry(entry),
                Err(_) => LockSlot::Corrupt { found: "malformed object" },
            },
            other => LockSlot::Corrupt {
                found: json_type_name(&other),
            },
        }
    }

    /// Decode one `packages` value of a v2/v3 lock file
    fn from_package_value(value: Value) -> Self {
        #[derive(Deserialize)]
        struct PackageEntry {
            #[serde(default)]
            version: Option<String>,
            #[serde(default)]
            dev: bool,
            #[serde(default)]
            optional: bool,
            #[serde(default)]
            dependencies: Option<IndexMap<String, String>>,
            #[serde(default, rename = "optionalDependencies")]
            optional_dependencies: Option<IndexMap<String, String>>,
        }

        match value {
            Value::Object(_) => match serde_json::from_value::<PackageEntry>(value) {
                Ok(entry) => {
                    let requires = match (entry.dependencies, entry.optional_dependencies) {
                        (None, None) => None,
                        (deps, optional) => {
                            let mut merged = deps.unwrap_or_default();
                            merged.extend(optional.unwrap_or_default());
                            Some(merged)
                        },
                    };
                    LockSlot::Entry(LockEntry {
                        version: entry.version,
                        dev: entry.dev,
                        optional: entry.optional,
                        requires,
                    })
                },
                Err(_) => LockSlot::Corrupt { found: "malformed object" },
            },
            other => LockSlot::Corrupt {
                found: json_type_name(&other),
            },
        }
    }
}

impl DependencyLockGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a parsed lock file document.
    ///
    /// Reads the `dependencies` section when present (lock file v1, and v2
    /// which carries both). Otherwise reads top-level `node_modules/<name>`
    /// entries of the `packages` section (lock file v3).
    pub fn from_value(value: Value) -> Result<Self, String> {
        let mut document = match value {
            Value::Object(document) => document,
            other => {
                return Err(format!("expected a JSON object, found {}", json_type_name(&other)));
            },
        };

        let name = document
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let lockfile_version = document.get("lockfileVersion").and_then(Value::as_u64);

        let mut entries = IndexMap::new();
        match (document.remove("dependencies"), document.remove("packages")) {
            (Some(Value::Object(dependencies)), _) => {
                for (dep_name, dep_value) in dependencies {
                    entries.insert(dep_name, LockSlot::from_value(dep_value));
                }
            },
            (Some(other), _) => {
                return Err(format!(
                    "`dependencies` must be an object, found {}",
                    json_type_name(&other)
                ));
            },
            (None, Some(Value::Object(packages))) => {
                for (key, package_value) in packages {
                    if let Some(dep_name) = top_level_package_name(&key) {
                        entries.insert(dep_name.to_string(), LockSlot::from_package_value(package_value));
                    }
                }
            },
            (None, Some(other)) => {
                return Err(format!(
                    "`packages` must be an object, found {}",
                    json_type_name(&other)
                ));
            },
            (None, None) => {},
        }

        Ok(Self {
            name,
            lockfile_version,
            entries,
        })
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, slot: LockSlot) {
        self.entries.insert(name.into(), slot);
    }

    /// Builder form of [`DependencyLockGraph::insert`] for well-formed entries
    pub fn with_entry(mut self, name: impl Into<String>, entry: LockEntry) -> Self {
        self.insert(name, LockSlot::Entry(entry));
        self
    }

    /// Look up a package
    pub fn get(&self, name: &str) -> Option<&LockSlot> {
        self.entries.get(name)
    }

    /// Label for the root of every traversal stack
    pub fn root_label(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_ROOT_LABEL)
    }

    /// Number of recorded packages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the graph records no packages
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `node_modules/foo` -> `foo`, `node_modules/@s/foo` -> `@s/foo`, nested paths -> None
fn top_level_package_name(key: &str) -> Option<&str> {
    let name = key.strip_prefix("node_modules/")?;
    if name.is_empty() || name.contains("/node_modules/") {
        None
    } else {
        Some(name)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_v1_lock() {
        let graph = DependencyLockGraph::from_value(json!({
            "name": "service",
            "lockfileVersion": 1,
            "dependencies": {
                "a": { "version": "1.0.0", "requires": { "b": "^2.0.0" } },
                "b": { "version": "2.1.0", "dev": true },
                "c": "1.0.0"
            }
        }))
        .unwrap();

        assert_eq!(graph.root_label(), "service");
        assert_eq!(graph.lockfile_version, Some(1));
        assert_eq!(graph.len(), 3);

        match graph.get("a") {
            Some(LockSlot::Entry(entry)) => {
                assert_eq!(entry.version.as_deref(), Some("1.0.0"));
                assert_eq!(entry.required_names().collect::<Vec<_>>(), vec!["b"]);
            },
            other => panic!("unexpected slot {:?}", other),
        }
        match graph.get("b") {
            Some(LockSlot::Entry(entry)) => {
                assert!(entry.dev);
                assert!(entry.requires.is_none());
            },
            other => panic!("unexpected slot {:?}", other),
        }
        assert_eq!(graph.get("c"), Some(&LockSlot::Corrupt { found: "string" }));
        assert!(graph.get("d").is_none());
    }

    #[test]
    fn test_decode_v3_packages() {
        let graph = DependencyLockGraph::from_value(json!({
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "service", "dependencies": { "a": "^1.0.0" } },
                "node_modules/a": {
                    "version": "1.0.0",
                    "dependencies": { "b": "^2.0.0" },
                    "optionalDependencies": { "fsevents": "^2.3.0" }
                },
                "node_modules/a/node_modules/b": { "version": "1.0.0" },
                "node_modules/@scope/b": { "version": "2.0.0", "dev": true }
            }
        }))
        .unwrap();

        assert_eq!(graph.root_label(), DEFAULT_ROOT_LABEL);
        assert_eq!(graph.len(), 2);
        match graph.get("a") {
            Some(LockSlot::Entry(entry)) => {
                assert_eq!(entry.required_names().collect::<Vec<_>>(), vec!["b", "fsevents"]);
            },
            other => panic!("unexpected slot {:?}", other),
        }
        assert!(matches!(graph.get("@scope/b"), Some(LockSlot::Entry(entry)) if entry.dev));
    }

    #[test]
    fn test_wrong_shaped_object_is_corrupt() {
        let slot = LockSlot::from_value(json!({ "requires": "b" }));
        assert_eq!(slot, LockSlot::Corrupt { found: "malformed object" });
    }

    #[test]
    fn test_reject_non_object_document() {
        assert!(DependencyLockGraph::from_value(json!([1, 2])).is_err());
        assert!(DependencyLockGraph::from_value(json!({ "dependencies": [] })).is_err());
    }

    #[test]
    fn test_missing_sections_yield_empty_graph() {
        let graph = DependencyLockGraph::from_value(json!({ "name": "x" })).unwrap();
        assert!(graph.is_empty());
    }
}
