//! Command implementations and dispatch logic.
//!
//! Every command that needs a closure goes through [`resolve_project`],
//! which loads the project settings, applies overrides and runs the engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use nodext_config::merge::{apply_env_overrides, process_env_overrides};
use nodext_config::{ConfigLoader, ExternalsSettings};
use nodext_core::error::{NodextError, NodextResult};
use nodext_registry::{MetadataCache, RegistryClient, RegistryLister, RetryConfig, DEFAULT_REGISTRY};
use nodext_resolver::{Closure, ClosureEngine, ResolveOptions, ResolverStrategy};
use tracing::{debug, info};

pub mod check;
pub mod patterns;
pub mod resolve;


use crate::npmrc::Npmrc;
use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub timeout: Option<u64>,
    pub output: OutputHandler,
}

/// Loaded project settings and where they apply
pub struct Project {
    pub root: Utf8PathBuf,
    pub settings: ExternalsSettings,
}

/// Command line values that take precedence over project settings
#[derive(Debug, Default)]
pub struct Overrides {
    pub seeds: Vec<String>,
    pub exclude: Option<Vec<String>>,
    pub strategy: Option<ResolverStrategy>,
    pub file: Option<PathBuf>,
}

impl CommandContext {
    /// Context rooted at `root`, or the current directory
    pub fn new(root: Option<PathBuf>, timeout: Option<u64>) -> NodextResult<Self> {
        let cwd = match root {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| NodextError::io("Failed to get current directory".to_string(), e))?,
        };

        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| NodextError::ConfigValidation {
            field: "root".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;

        Ok(Self {
            cwd,
            timeout,
            output: OutputHandler::new(),
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> NodextResult<()> {
    match command {
        Commands::Resolve {
            seeds,
            exclude,
            strategy,
            file,
            json,
        } => {
            debug!("Resolving {} seeds from the command line", seeds.len());
            let overrides = Overrides {
                seeds,
                exclude,
                strategy,
                file,
            };
            resolve::execute(overrides, json, ctx).await
        },
        Commands::Patterns { json } => {
            debug!("Printing package patterns (json: {})", json);
            patterns::execute(json, ctx).await
        },
        Commands::Check { request } => {
            debug!("Checking module request: {}", request);
            check::execute(&request, ctx).await
        },
        Commands::Version => show_version(ctx),
    }
}

/// Load settings for the project containing `ctx.cwd`
pub async fn load_project(ctx: &CommandContext) -> NodextResult<Project> {
    let loader = ConfigLoader::new(ctx.cwd.clone());
    let (settings, source) = loader.load_settings().await?;
    let settings = apply_env_overrides(settings, &process_env_overrides())?;
    let root = loader.project_root(&source);

    debug!("Project root {} ({:?})", root, source);
    Ok(Project { root, settings })
}

/// Resolve the closure for the project, with command line overrides applied
pub async fn resolve_project(ctx: &CommandContext, overrides: Overrides) -> NodextResult<(Project, Closure)> {
    let mut project = load_project(ctx).await?;

    if let Some(strategy) = overrides.strategy {
        project.settings.resolver = strategy;
    }
    if overrides.exclude.is_some() {
        project.settings.exclude = overrides.exclude;
    }

    let seeds = if overrides.seeds.is_empty() {
        project.settings.modules.clone()
    } else {
        overrides.seeds
    };

    let mut options = ResolveOptions::from_settings(&project.root, &project.settings);
    if let Some(file) = overrides.file {
        let file = Utf8PathBuf::from_path_buf(file).map_err(|path| NodextError::ConfigValidation {
            field: "file".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;
        options = options.externals_file(Some(ctx.cwd.join(file)));
    }
    if let Some(seconds) = ctx.timeout {
        options = options.timeout(Some(Duration::from_secs(seconds)));
    }

    info!("Resolving with the {} strategy", options.strategy);
    let engine = build_engine(&project)?;
    let closure = engine.resolve(&seeds, &options).await?;
    Ok((project, closure))
}

/// Engine for the configured strategy
fn build_engine(project: &Project) -> NodextResult<ClosureEngine<RegistryLister>> {
    if project.settings.resolver == ResolverStrategy::LockGraph {
        return Ok(ClosureEngine::local());
    }

    let npmrc = Npmrc::load(&project.root);
    let registry = project
        .settings
        .registry
        .as_deref()
        .or(npmrc.registry.as_deref())
        .unwrap_or(DEFAULT_REGISTRY);

    let client = RegistryClient::with_config(registry, npmrc.auth_for(registry), RetryConfig::default())?;
    let lister = RegistryLister::new(client, Arc::new(MetadataCache::new()), project.settings.ls);
    Ok(ClosureEngine::new(lister))
}

fn show_version(ctx: &CommandContext) -> NodextResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.print(&format!("nodext {}", env!("CARGO_PKG_VERSION")));
    ctx.output.print(&format!("Built: {}", env!("NODEXT_BUILD_DATE")));
    ctx.output.print(&format!("Target: {}", target));
    ctx.output.print(&format!("Rust: {}", env!("NODEXT_RUSTC_VERSION")));

    Ok(())
}
