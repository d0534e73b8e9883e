//! Registry URL and credentials from `.npmrc` files.
//!
//! Only the `registry` key and `//host/path/:_authToken` entries are read.
//! The project file wins over the one in the home directory, and
//! `NPM_TOKEN` wins over both.

use std::collections::HashMap;

use camino::Utf8Path;
use nodext_registry::AuthConfig;
use tracing::debug;

const NPMRC_FILE_NAME: &str = ".npmrc";
const TOKEN_ENV: &str = "NPM_TOKEN";

/// Settings read from one or more `.npmrc` files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Npmrc {
    /// Default registry
    pub registry: Option<String>,
    /// Registry host and path (no scheme, no trailing slash) to token
    tokens: HashMap<String, String>,
}

impl Npmrc {
    /// Read the project and user files; unreadable files are skipped
    pub fn load(project_root: &Utf8Path) -> Self {
        let mut npmrc = Self::default();

        let home = dirs::home_dir().map(|home| home.join(NPMRC_FILE_NAME));
        let files = [Some(project_root.join(NPMRC_FILE_NAME).into_std_path_buf()), home];
        for path in files.into_iter().flatten() {
            if let Ok(content) = std::fs::read_to_string(&path) {
                debug!("Reading registry settings from {}", path.display());
                npmrc.merge_missing(Self::parse(&content));
            }
        }

        npmrc
    }

    /// Parse one file
    pub fn parse(content: &str) -> Self {
        let mut npmrc = Self::default();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = expand_env(value.trim().trim_matches('"'));

            match key.trim() {
                "registry" => npmrc.registry = Some(value),
                key => {
                    if let Some(scope) = key.strip_suffix(":_authToken") {
                        npmrc.tokens.insert(registry_key(scope), value);
                    }
                },
            }
        }

        npmrc
    }

    /// Take entries from `other` that are not set yet
    fn merge_missing(&mut self, other: Self) {
        if self.registry.is_none() {
            self.registry = other.registry;
        }
        for (key, token) in other.tokens {
            self.tokens.entry(key).or_insert(token);
        }
    }

    /// Credentials for a registry URL
    pub fn auth_for(&self, registry: &str) -> Option<AuthConfig> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| self.tokens.get(&registry_key(registry)).cloned())?;

        Some(AuthConfig {
            token: Some(token),
            ..AuthConfig::default()
        })
    }
}

/// `https://host/path/` and `//host/path` both become `host/path`
fn registry_key(url: &str) -> String {
    let without_scheme = url.split_once("//").map(|(_, rest)| rest).unwrap_or(url);
    without_scheme.trim_end_matches('/').to_string()
}

/// Replace a whole-value `${VAR}` reference
fn expand_env(value: &str) -> String {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .map(|name| std::env::var(name).unwrap_or_default())
        .unwrap_or_else(|| value.to_string())
}
