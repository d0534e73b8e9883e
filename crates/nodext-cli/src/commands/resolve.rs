//! `nodext resolve` command implementation.
//!
//! Prints the closure one name per line, or as a JSON array.

use nodext_core::error::{NodextError, NodextResult};

use super::{resolve_project, CommandContext, Overrides};

/// Execute the `nodext resolve` command
pub async fn execute(overrides: Overrides, json: bool, ctx: &CommandContext) -> NodextResult<()> {
    let (_project, closure) = resolve_project(ctx, overrides).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&closure)
            .map_err(|e| NodextError::io("Failed to render JSON".to_string(), e.into()))?;
        ctx.output.print(&rendered);
        return Ok(());
    }

    if closure.is_empty() {
        ctx.output.warn("No externals to include");
        return Ok(());
    }

    for name in closure.iter() {
        ctx.output.print(name);
    }
    ctx.output.success(&format!("{} modules in closure", closure.len()));
    Ok(())
}
