//! `nodext check` command implementation.
//!
//! Answers the bundler question for one module request: is it provided by
//! the packaged `node_modules`, or must it be bundled?

use nodext_core::error::NodextResult;
use nodext_resolver::ExternalsMatcher;

use super::{resolve_project, CommandContext, Overrides};

/// Execute the `nodext check` command
pub async fn execute(request: &str, ctx: &CommandContext) -> NodextResult<()> {
    let (_project, closure) = resolve_project(ctx, Overrides::default()).await?;
    let matcher = ExternalsMatcher::new(closure);

    match matcher.classify(request) {
        Some(external) => ctx.output.print(&external),
        None => ctx.output.info(&format!("{} is bundled", request)),
    }

    Ok(())
}
