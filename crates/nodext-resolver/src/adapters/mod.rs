//! Consumers of a resolved closure: packaging patterns and bundler externals

use indexmap::IndexMap;
use nodext_config::ExternalsSettings;
use serde::Serialize;

use crate::engine::Closure;

/// Default subpath kept under each module directory
pub const DEFAULT_SUBPATH: &str = "**";

/// Packaging include/exclude entries for a closure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackagePatterns {
    /// Paths to add to the package
    pub include: Vec<String>,
    /// Negated paths, keeping modules out of the exclude list
    pub exclude: Vec<String>,
}

impl PackagePatterns {
    /// Patterns for every closure member.
    ///
    /// Each name becomes `./node_modules/<name>/<subpath>`, as an include
    /// entry when `use_include` is set and as a negated exclude entry
    /// otherwise.
    pub fn from_closure(closure: &Closure, subpaths: &IndexMap<String, String>, use_include: bool) -> Self {
        let mut patterns = Self::default();

        for name in closure.iter() {
            let subpath = subpaths.get(name).map(String::as_str).unwrap_or(DEFAULT_SUBPATH);
            let path = format!("./node_modules/{}/{}", name, subpath);
            if use_include {
                patterns.include.push(path);
            } else {
                patterns.exclude.push(format!("!{}", path));
            }
        }

        patterns
    }

    /// Patterns as configured by project settings
    pub fn from_settings(closure: &Closure, settings: &ExternalsSettings) -> Self {
        Self::from_closure(closure, &settings.module_subpaths, settings.use_include)
    }

    /// All entries, includes first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.include.iter().chain(&self.exclude).map(String::as_str)
    }
}

/// Answers bundler questions about module requests
#[derive(Debug, Clone)]
pub struct ExternalsMatcher {
    closure: Closure,
}

impl ExternalsMatcher {
    pub fn new(closure: Closure) -> Self {
        Self { closure }
    }

    /// Whether `request` is a closure member or a path inside one
    pub fn is_external(&self, request: &str) -> bool {
        self.closure.iter().any(|name| {
            request == name
                || request
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// `commonjs <request>` for external requests, `None` for bundled ones
    pub fn classify(&self, request: &str) -> Option<String> {
        self.is_external(request).then(|| format!("commonjs {}", request))
    }
}
