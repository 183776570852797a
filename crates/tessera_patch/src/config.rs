//! Patch and composition configuration.

use serde::{Deserialize, Serialize};
use tessera_registry::RegistryConfig;

/// Patch engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatchConfig {
    /// Halt on a missing or duplicate panel instead of skipping the op
    pub halt_on_registry_error: bool,
}

impl PatchConfig {
    /// Create default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether registry errors halt the patch
    #[must_use]
    pub fn with_halt_on_registry_error(mut self, halt: bool) -> Self {
        self.halt_on_registry_error = halt;
        self
    }
}

/// Composition session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositionConfig {
    /// Registry settings
    pub registry: RegistryConfig,
    /// Patch settings
    pub patch: PatchConfig,
    /// Apply delivered `update` events to target content
    pub apply_update_events: bool,
    /// Record selections and re-evaluate show conditions
    pub track_selection: bool,
}

impl CompositionConfig {
    /// Create default config
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RegistryConfig::default(),
            patch: PatchConfig::default(),
            apply_update_events: true,
            track_selection: true,
        }
    }

    /// Set registry config
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Set patch config
    #[must_use]
    pub fn with_patch(mut self, patch: PatchConfig) -> Self {
        self.patch = patch;
        self
    }

    /// Toggle update-event application
    #[must_use]
    pub fn with_apply_update_events(mut self, apply: bool) -> Self {
        self.apply_update_events = apply;
        self
    }

    /// Toggle selection tracking
    #[must_use]
    pub fn with_track_selection(mut self, track: bool) -> Self {
        self.track_selection = track;
        self
    }
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self::new()
    }
}
