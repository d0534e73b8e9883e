//! Settings discovery, fallback logic, and environment overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::toml::{ExternalsSettings, ResolverStrategy};
use crate::{ConfigResult, MANIFEST_FILE_NAME, SETTINGS_FILE_NAME};

/// Overrides the resolver strategy
pub const ENV_RESOLVER: &str = "NODEXT_RESOLVER";
/// Overrides the registry base URL
pub const ENV_REGISTRY: &str = "NODEXT_REGISTRY";
/// Replaces the exclude list (comma separated)
pub const ENV_EXCLUDE: &str = "NODEXT_EXCLUDE";

/// Main settings loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Where the settings came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Project nodext.toml file
    SettingsToml(Utf8PathBuf),
    /// `externals` key of the project package.json (fallback)
    PackageJson(Utf8PathBuf),
    /// Nothing found, built-in defaults
    Defaults,
}

impl ConfigSource {
    /// Directory that relative paths in the settings are resolved against
    pub fn project_root(&self) -> Option<&Utf8Path> {
        match self {
            ConfigSource::SettingsToml(path) | ConfigSource::PackageJson(path) => path.parent(),
            ConfigSource::Defaults => None,
        }
    }
}

impl ConfigLoader {
    /// Create a new settings loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Load project settings with fallbacks
    pub async fn load_settings(&self) -> ConfigResult<(ExternalsSettings, ConfigSource)> {
        // First, try to find nodext.toml
        if let Some(settings_path) = self.find_config_path(SETTINGS_FILE_NAME) {
            let settings = crate::toml::load_from_file(&settings_path).await?;
            debug!("Loaded settings from {}", settings_path);
            return Ok((settings, ConfigSource::SettingsToml(settings_path)));
        }

        // Fall back to the externals key of package.json
        if let Some(package_json_path) = self.find_config_path(MANIFEST_FILE_NAME) {
            if let Some(settings) = crate::json::load_package_json_settings(&package_json_path).await? {
                debug!("Loaded settings from {}", package_json_path);
                return Ok((settings, ConfigSource::PackageJson(package_json_path)));
            }
        }

        debug!("No settings found from {}, using defaults", self.cwd);
        Ok((ExternalsSettings::default(), ConfigSource::Defaults))
    }

    /// Find a file in the project (walks up directory tree)
    pub fn find_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }
            current = dir.parent();
        }

        None
    }

    /// Project root for a given settings source
    pub fn project_root(&self, source: &ConfigSource) -> Utf8PathBuf {
        source
            .project_root()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }
}

/// Apply environment overrides on top of loaded settings
pub fn apply_env_overrides(
    mut settings: ExternalsSettings,
    env: &HashMap<String, String>,
) -> ConfigResult<ExternalsSettings> {
    if let Some(resolver) = env.get(ENV_RESOLVER) {
        settings.resolver = resolver.parse::<ResolverStrategy>()?;
    }

    if let Some(registry) = env.get(ENV_REGISTRY) {
        settings.registry = Some(registry.clone());
    }

    if let Some(exclude) = env.get(ENV_EXCLUDE) {
        settings.exclude = Some(
            exclude
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }

    crate::toml::validate_settings(&settings)?;
    Ok(settings)
}

/// Collect the nodext variables from the process environment
pub fn process_env_overrides() -> HashMap<String, String> {
    [ENV_RESOLVER, ENV_REGISTRY, ENV_EXCLUDE]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_settings_toml_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        std::fs::write(root.join("nodext.toml"), "modules = [\"sharp\"]\n").unwrap();
        std::fs::write(root.join("package.json"), r#"{"externals":["knex"]}"#).unwrap();

        let loader = ConfigLoader::new(root.clone());
        let (settings, source) = loader.load_settings().await.unwrap();
        assert_eq!(settings.modules, vec!["sharp"]);
        assert_eq!(source, ConfigSource::SettingsToml(root.join("nodext.toml")));
        assert_eq!(loader.project_root(&source), root);
    }

    #[tokio::test]
    async fn test_package_json_fallback_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        std::fs::write(root.join("package.json"), r#"{"externals":["knex"]}"#).unwrap();
        let nested = root.join("src").join("handlers");
        std::fs::create_dir_all(&nested).unwrap();

        let loader = ConfigLoader::new(nested);
        let (settings, source) = loader.load_settings().await.unwrap();
        assert_eq!(settings.modules, vec!["knex"]);
        assert_eq!(loader.project_root(&source), root);
    }

    #[tokio::test]
    async fn test_defaults_when_nothing_configured() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        std::fs::write(root.join("package.json"), r#"{"name":"svc"}"#).unwrap();

        let loader = ConfigLoader::new(root.clone());
        let (settings, source) = loader.load_settings().await.unwrap();
        assert!(settings.modules.is_empty());
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(loader.project_root(&source), root);
    }

    #[test]
    fn test_env_overrides() {
        let mut env = HashMap::new();
        env.insert(ENV_RESOLVER.to_string(), "remote-listing".to_string());
        env.insert(ENV_EXCLUDE.to_string(), "aws-sdk, ,sharp".to_string());
        env.insert(ENV_REGISTRY.to_string(), "http://localhost:4873".to_string());

        let settings = apply_env_overrides(ExternalsSettings::default(), &env).unwrap();
        assert_eq!(settings.resolver, ResolverStrategy::RemoteListing);
        assert_eq!(settings.exclude, Some(vec!["aws-sdk".to_string(), "sharp".to_string()]));
        assert_eq!(settings.registry.as_deref(), Some("http://localhost:4873"));
    }

    #[test]
    fn test_invalid_env_resolver() {
        let mut env = HashMap::new();
        env.insert(ENV_RESOLVER.to_string(), "pnpm".to_string());
        assert!(apply_env_overrides(ExternalsSettings::default(), &env).is_err());
    }
}
