//! Ordered application of patch operations.

use crate::config::PatchConfig;
use serde_json::Value;
use std::sync::Arc;
use tessera_bus::CompositionBus;
use tessera_core::{CompositionError, CompositionResult};
use tessera_link::LinkFilter;
use tessera_registry::PanelRegistry;
use tessera_schema::{PatchEnvelope, PatchOp, SchemaValidator};
use tracing::{debug, info, warn};

/// An op that took effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOp {
    /// Position in the patch
    pub index: usize,
    /// Op discriminator
    pub op: &'static str,
}

/// An op that did not take effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOp {
    /// Position in the patch
    pub index: usize,
    /// Op discriminator as received
    pub op: String,
    /// Why it was rejected
    pub error: CompositionError,
}

/// Result of applying one patch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Ops that took effect, in order
    pub applied: Vec<AppliedOp>,
    /// Ops skipped over a missing or duplicate panel
    pub skipped: Vec<RejectedOp>,
    /// The op that stopped processing, if any
    pub halted: Option<RejectedOp>,
    /// Number of filter recompilations
    pub recompiled: usize,
}

impl PatchOutcome {
    /// Every op took effect
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.halted.is_none()
    }

    /// Processing stopped early
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Every rejection, skipped ones first, then the halting one
    pub fn errors(&self) -> impl Iterator<Item = &RejectedOp> {
        self.skipped.iter().chain(self.halted.iter())
    }
}

struct Decoded {
    name: String,
    op: CompositionResult<PatchOp>,
}

/// Applies patch operations to a registry and keeps the bus filter current
#[derive(Debug, Clone)]
pub struct PatchEngine {
    config: PatchConfig,
    validator: SchemaValidator,
}

impl PatchEngine {
    /// Create a new engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PatchConfig::default(),
            validator: SchemaValidator::default(),
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: PatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Create with a custom validator
    #[must_use]
    pub fn with_validator(mut self, validator: SchemaValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Apply typed ops strictly in order
    pub fn apply<I>(&self, registry: &mut PanelRegistry, bus: &mut CompositionBus, ops: I) -> PatchOutcome
    where
        I: IntoIterator<Item = PatchOp>,
    {
        let decoded = ops.into_iter().map(|op| Decoded {
            name: op.name().to_string(),
            op: Ok(op),
        });
        self.run(registry, bus, decoded)
    }

    /// Apply raw ops, decoding each one only when its turn comes
    pub fn apply_values(&self, registry: &mut PanelRegistry, bus: &mut CompositionBus, ops: &[Value]) -> PatchOutcome {
        let decoded = ops.iter().map(|raw| Decoded {
            name: raw
                .get("op")
                .and_then(Value::as_str)
                .unwrap_or("<missing>")
                .to_string(),
            op: PatchOp::decode(raw),
        });
        self.run(registry, bus, decoded)
    }

    /// Apply a whole `ui_patch` message
    ///
    /// # Errors
    ///
    /// Returns error if the envelope itself is malformed; op-level failures
    /// are reported in the outcome
    pub fn apply_message(
        &self,
        registry: &mut PanelRegistry,
        bus: &mut CompositionBus,
        message: &Value,
    ) -> CompositionResult<PatchOutcome> {
        let envelope = PatchEnvelope::from_value(message)?;
        Ok(self.apply_values(registry, bus, &envelope.ops))
    }

    fn run<I>(&self, registry: &mut PanelRegistry, bus: &mut CompositionBus, ops: I) -> PatchOutcome
    where
        I: Iterator<Item = Decoded>,
    {
        let mut outcome = PatchOutcome::default();

        for (index, Decoded { name, op }) in ops.enumerate() {
            let checked = op.and_then(|op| {
                self.validator.validate_op(&op)?;
                Ok(op)
            });
            let op = match checked {
                Ok(op) => op,
                Err(error) => {
                    warn!(index, op = %name, %error, "patch halted on malformed op");
                    outcome.halted = Some(RejectedOp { index, op: name, error });
                    break;
                }
            };

            match apply_op(registry, bus, &op) {
                Ok(()) => {
                    debug!(index, op = op.name(), "op applied");
                    outcome.applied.push(AppliedOp { index, op: op.name() });
                    if op.reshapes_routes() {
                        bus.set_filter(Arc::new(live_filter(registry)));
                        outcome.recompiled += 1;
                    }
                }
                Err(error) if error.is_registry_error() && !self.config.halt_on_registry_error => {
                    warn!(index, op = %name, %error, "op skipped");
                    outcome.skipped.push(RejectedOp { index, op: name, error });
                }
                Err(error) => {
                    warn!(index, op = %name, %error, "patch halted");
                    outcome.halted = Some(RejectedOp { index, op: name, error });
                    break;
                }
            }
        }

        info!(
            applied = outcome.applied.len(),
            skipped = outcome.skipped.len(),
            halted = outcome.is_halted(),
            "patch processed"
        );
        outcome
    }
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile the registry's links, leaving links to absent panels inert
#[must_use]
pub fn live_filter(registry: &PanelRegistry) -> LinkFilter {
    LinkFilter::compile_live(registry.links(), |id| registry.contains(id.as_str()))
}

fn apply_op(registry: &mut PanelRegistry, bus: &mut CompositionBus, op: &PatchOp) -> CompositionResult<()> {
    match op {
        PatchOp::AddPanel { panel, after } => {
            let state = registry.insert_panel(panel.clone(), after.as_ref())?;
            bus.register_panel(state.id);
        }
        PatchOp::RemovePanel { panel_id } => {
            registry.remove_panel(panel_id)?;
            bus.unregister_panel(panel_id.as_str());
        }
        PatchOp::UpdatePanel {
            panel_id,
            action,
            data,
            target_field,
        } => {
            registry.update_panel(panel_id, Value::Object(data.clone()), *action, target_field.as_deref())?;
        }
        PatchOp::ShowPanel { panel_id, visible } => {
            registry.set_visible(panel_id, *visible)?;
        }
        PatchOp::CollapsePanel { panel_id, collapsed } => {
            registry.set_collapsed(panel_id, *collapsed)?;
        }
        PatchOp::SetLoading { panel_id, loading } => {
            registry.set_loading(panel_id, *loading)?;
        }
        PatchOp::SetError { panel_id, error } => {
            registry.set_error(panel_id, error.clone())?;
        }
        PatchOp::UpdateLayout { layout } => {
            registry.set_layout(layout.clone());
        }
        PatchOp::AddLink { link } => {
            registry.add_link(link.clone())?;
        }
        PatchOp::RemoveLink { source, target } => {
            registry.remove_links(source, target);
        }
    }
    Ok(())
}
