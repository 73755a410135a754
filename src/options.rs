//! Options controlling how documents are loaded into a [`crate::Localizer`].

use serde::{Deserialize, Serialize};

/// Load behavior options for [`crate::Localizer`] loading APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Keep existing entries and contexts, overwriting only colliding keys.
    /// When `false` the node's maps are cleared before loading.
    pub merge: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { merge: true }
    }
}

impl LoadOptions {
    /// Creates default load options (merging).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reset the node before loading.
    pub fn replace() -> Self {
        Self { merge: false }
    }

    /// Enables/disables merging.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }
}
