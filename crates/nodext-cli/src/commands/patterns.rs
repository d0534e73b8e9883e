//! `nodext patterns` command implementation.
//!
//! Prints `./node_modules/<name>/<subpath>` entries for the packaging step:
//! include entries when `use_include` is set, negated exclude entries
//! otherwise.

use nodext_core::error::{NodextError, NodextResult};
use nodext_resolver::PackagePatterns;

use super::{resolve_project, CommandContext, Overrides};

/// Execute the `nodext patterns` command
pub async fn execute(json: bool, ctx: &CommandContext) -> NodextResult<()> {
    let (project, closure) = resolve_project(ctx, Overrides::default()).await?;
    let patterns = PackagePatterns::from_settings(&closure, &project.settings);

    if json {
        let rendered = serde_json::to_string_pretty(&patterns)
            .map_err(|e| NodextError::io("Failed to render JSON".to_string(), e.into()))?;
        ctx.output.print(&rendered);
    } else {
        for entry in patterns.entries() {
            ctx.output.print(entry);
        }
    }

    Ok(())
}
