//! Schema versioning for serialized snapshots.

use crate::SCHEMA_VERSION;

/// Schema version embedded in every snapshot, so a reader of a file output
/// can tell which layout it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SchemaVersion {
    /// Bumped on breaking layout changes.
    pub major: u32,

    /// Bumped on additive changes.
    pub minor: u32,
}

impl SchemaVersion {
    /// The version written by this library.
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}
