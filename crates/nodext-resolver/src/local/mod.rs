//! Lock graph traversal.
//!
//! Expands each seed by following `requires` edges through the lock graph.
//! A name already on the current traversal path is not entered again, so
//! cyclic lock files terminate while a package reached through two
//! different parents is still reported for both.

use std::collections::HashSet;

use nodext_core::types::LockEntry;
use tracing::{debug, info, warn};

use crate::source::LockGraphSource;
use crate::ResolverResult;

/// Walks a lock graph from seed names
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGraphResolver;

/// State of one `expand` call
struct Walk<'a> {
    source: &'a LockGraphSource,
    /// Names on the path from the current seed to the node being expanded
    stack: Vec<&'a str>,
    /// Names whose whole subtree has already been emitted
    expanded: HashSet<&'a str>,
    found: Vec<String>,
}

impl LocalGraphResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Seeds followed by every name they transitively require.
    ///
    /// The result is not deduplicated. Seeds must be declared in the graph;
    /// transitive names missing from it are emitted as leaves.
    pub fn expand(&self, seeds: &[String], source: &LockGraphSource) -> ResolverResult<Vec<String>> {
        let mut walk = Walk {
            source,
            stack: Vec::new(),
            expanded: HashSet::new(),
            found: seeds.to_vec(),
        };

        for seed in seeds {
            let entry = source.seed(seed)?;
            debug!("Expanding {} from {}", seed, source.graph().root_label());

            walk.stack.push(seed);
            walk.visit(entry)?;
            walk.stack.pop();
            walk.expanded.insert(seed);
        }

        Ok(walk.found)
    }
}

impl<'a> Walk<'a> {
    fn visit(&mut self, entry: &'a LockEntry) -> ResolverResult<()> {
        let source = self.source;

        for name in entry.required_names() {
            if self.stack.contains(&name) {
                debug!("Cycle through {} at {}", name, self.path());
                continue;
            }

            self.found.push(name.to_string());

            // Everything below an expanded name is already in `found`
            if self.expanded.contains(name) {
                continue;
            }

            let Some(dependency) = source.lookup(name)? else {
                info!("{} is not in {}, assuming it is installed higher up", name, source.path());
                self.expanded.insert(name);
                continue;
            };

            if dependency.dev {
                warn!("Dev dependency {} required by {}", name, self.path());
            }

            self.stack.push(name);
            self.visit(dependency)?;
            self.stack.pop();
            self.expanded.insert(name);
        }

        Ok(())
    }

    fn path(&self) -> String {
        self.stack.join(" -> ")
    }
}
