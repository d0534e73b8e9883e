//! Edge classes followed by a remote listing.

use serde::{Deserialize, Serialize};

/// Which dependency edges a remote listing follows besides `dependencies`.
///
/// All switches default to off, so only strict production edges are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Follow `devDependencies` of the queried root package
    pub development: bool,
    /// Follow `optionalDependencies`
    pub optional: bool,
    /// Follow `peerDependencies`
    pub peer: bool,
}

impl ListOptions {
    /// Production edges only
    pub fn production() -> Self {
        Self::default()
    }
}
