//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Reject links whose endpoints are not registered yet. When false,
    /// such links are stored and stay inert until the panel arrives.
    pub require_link_endpoints: bool,
}

impl RegistryConfig {
    /// Create the default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint strictness
    #[must_use]
    pub fn with_require_link_endpoints(mut self, require: bool) -> Self {
        self.require_link_endpoints = require;
        self
    }
}
