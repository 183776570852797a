//! A live composition: registry, compiled filter and bus behind one writer.
//!
//! Panels never touch the registry. They publish through
//! [`Composition::publish`] and react in their inbound handlers; the
//! composition applies the registry side effects of a dispatch once it has
//! run to completion.

use crate::config::CompositionConfig;
use crate::engine::{PatchEngine, PatchOutcome, live_filter};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tessera_bus::{CompositionBus, Dispatch, DispatchReport, Inbound, InboundHandler};
use tessera_core::{CompositionError, CompositionResult, PanelId};
use tessera_link::{Event, EventKind, InitialState, LinkFilter, PanelOverlay, propagate};
use tessera_registry::{CompositionSnapshot, PanelRegistry, RegistryDiff};
use tessera_schema::{Dashboard, Layout, PatchOp, SchemaValidator};
use tracing::{debug, info, warn};

/// Registry, filter and bus owned together
#[derive(Debug)]
pub struct Composition {
    config: CompositionConfig,
    registry: PanelRegistry,
    bus: CompositionBus,
    engine: PatchEngine,
    overlays: IndexMap<PanelId, PanelOverlay>,
}

impl Composition {
    /// Create an empty composition
    #[must_use]
    pub fn new(layout: Layout, config: CompositionConfig) -> Self {
        let registry = PanelRegistry::new(layout).with_config(config.registry.clone());
        let engine = PatchEngine::new().with_config(config.patch.clone());
        Self {
            config,
            registry,
            bus: CompositionBus::new(),
            engine,
            overlays: IndexMap::new(),
        }
    }

    /// Seed from an initial dashboard payload of any supported version
    ///
    /// # Errors
    ///
    /// Returns the first structural problem in the payload, or a
    /// registry error while seeding
    pub fn from_dashboard(dashboard: Dashboard, config: CompositionConfig) -> CompositionResult<Self> {
        Self::from_dashboard_with_state(dashboard, &InitialState::default(), config)
    }

    /// Seed from a dashboard payload plus explicit initial state, carried
    /// across the links once before any event is published.
    ///
    /// Propagated selections are recorded on the registry when selection
    /// tracking is on, so show conditions see them.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem in the payload, or a
    /// registry error while seeding
    pub fn from_dashboard_with_state(
        dashboard: Dashboard,
        state: &InitialState,
        config: CompositionConfig,
    ) -> CompositionResult<Self> {
        let version = dashboard.version();
        let dashboard = dashboard.into_v2();
        if let Err(errors) = SchemaValidator::new().validate_dashboard(&dashboard) {
            for error in &errors {
                warn!(%error, "dashboard rejected");
            }
            if let Some(first) = errors.into_iter().next() {
                return Err(first);
            }
        }

        let mut registry = PanelRegistry::from_dashboard(dashboard, config.registry.clone())?;
        let mut bus = CompositionBus::new().with_filter(live_filter(&registry));
        let panel_ids = registry.panel_ids();
        for id in &panel_ids {
            bus.register_panel(id.clone());
        }

        let overlays = propagate(&panel_ids, registry.links(), state);
        if config.track_selection {
            for (id, overlay) in &overlays {
                if overlay.selected_ids.is_empty() {
                    continue;
                }
                let field = registry.get(id.as_str()).and_then(|panel| panel.selection_field.clone());
                let ids = overlay.selected_ids.iter().cloned().map(Value::String).collect();
                registry.record_selection(id, field, Value::Array(ids))?;
            }
        }
        info!(
            %version,
            panels = registry.len(),
            links = registry.links().len(),
            live = bus.filter().link_count(),
            overlays = overlays.len(),
            "composition seeded"
        );

        let engine = PatchEngine::new().with_config(config.patch.clone());
        Ok(Self {
            config,
            registry,
            bus,
            engine,
            overlays,
        })
    }

    /// Seed from a JSON dashboard payload
    ///
    /// # Errors
    ///
    /// Returns error if the payload does not decode or fails validation
    pub fn from_value(value: &Value, config: CompositionConfig) -> CompositionResult<Self> {
        Self::from_dashboard(Dashboard::from_value(value)?, config)
    }

    /// Mount a panel's inbound handler
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the panel is not in the registry
    pub fn mount(&mut self, id: &PanelId, handler: Arc<dyn InboundHandler>) -> CompositionResult<()> {
        if !self.registry.contains(id.as_str()) {
            return Err(CompositionError::not_found(id));
        }
        self.bus.set_handler(id.clone(), handler);
        Ok(())
    }

    /// Mount a closure as a panel's inbound handler
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the panel is not in the registry
    pub fn on<F>(&mut self, id: &PanelId, handler: F) -> CompositionResult<()>
    where
        F: Fn(&Inbound, &mut Dispatch<'_>) + Send + Sync + 'static,
    {
        self.mount(id, Arc::new(handler))
    }

    /// Drop a panel's handler; the panel stays registered. Safe to repeat.
    pub fn unmount(&mut self, id: &PanelId) {
        self.bus.unregister_panel(id.as_str());
        if self.registry.contains(id.as_str()) {
            self.bus.register_panel(id.clone());
        }
    }

    /// Publish an event from `source`, then record selections and apply
    /// delivered updates
    pub fn publish(&mut self, source: &PanelId, event: Event) -> DispatchReport {
        let report = self.bus.publish(source.clone(), event);

        if self.config.track_selection {
            for published in &report.published {
                if published.event.kind != EventKind::Selection
                    || !self.registry.contains(published.source.as_str())
                {
                    continue;
                }
                let recorded = self.registry.record_selection(
                    &published.source,
                    published.event.field.clone(),
                    published.event.value.clone(),
                );
                if let Err(error) = recorded {
                    warn!(panel = %published.source, %error, "selection not recorded");
                }
            }
        }

        if self.config.apply_update_events {
            for delivery in &report.deliveries {
                if delivery.event.kind != EventKind::Update || !self.registry.contains(delivery.target.as_str()) {
                    continue;
                }
                let applied = self.registry.apply_routed_update(
                    &delivery.target,
                    delivery.event.field.as_deref(),
                    delivery.event.value.clone(),
                );
                match applied {
                    Ok(state) => debug!(panel = %state.id, fingerprint = %state.fingerprint, "update applied"),
                    Err(error) => warn!(panel = %delivery.target, %error, "update not applied"),
                }
            }
        }

        report
    }

    /// Apply typed patch ops in order
    pub fn apply_patch(&mut self, ops: Vec<PatchOp>) -> PatchOutcome {
        let outcome = self.engine.apply(&mut self.registry, &mut self.bus, ops);
        self.prune_overlays();
        outcome
    }

    /// Apply raw patch ops in order
    pub fn apply_values(&mut self, ops: &[Value]) -> PatchOutcome {
        let outcome = self.engine.apply_values(&mut self.registry, &mut self.bus, ops);
        self.prune_overlays();
        outcome
    }

    /// Apply a `ui_patch` message
    ///
    /// # Errors
    ///
    /// Returns error if the envelope is malformed
    pub fn apply_message(&mut self, message: &Value) -> CompositionResult<PatchOutcome> {
        let outcome = self.engine.apply_message(&mut self.registry, &mut self.bus, message)?;
        self.prune_overlays();
        Ok(outcome)
    }

    // Overlays only cover panels still in the registry.
    fn prune_overlays(&mut self) {
        let registry = &self.registry;
        self.overlays.retain(|id, _| registry.contains(id.as_str()));
    }

    /// Apply a message and report what changed
    ///
    /// # Errors
    ///
    /// Returns error if the envelope is malformed
    pub fn apply_message_with_diff(&mut self, message: &Value) -> CompositionResult<(PatchOutcome, RegistryDiff)> {
        let before = self.snapshot();
        let outcome = self.apply_message(message)?;
        let diff = RegistryDiff::compute(&before, &self.snapshot());
        Ok((outcome, diff))
    }

    /// Compact view of the current state
    #[must_use]
    pub fn snapshot(&self) -> CompositionSnapshot {
        CompositionSnapshot::capture(&self.registry)
    }

    /// Initial-state overlay of a panel, if any reached it
    #[must_use]
    pub fn overlay(&self, id: &str) -> Option<&PanelOverlay> {
        self.overlays.get(id)
    }

    /// Every initial-state overlay, in panel order
    #[must_use]
    pub fn overlays(&self) -> &IndexMap<PanelId, PanelOverlay> {
        &self.overlays
    }

    /// A panel's content with its overlay attached under `_compose`
    #[must_use]
    pub fn composed_content(&self, id: &str) -> Option<Value> {
        let panel = self.registry.get(id)?;
        Some(match self.overlays.get(id) {
            Some(overlay) => overlay.augment(&panel.id, &panel.content),
            None => panel.content.clone(),
        })
    }

    /// The registry, read-only
    #[must_use]
    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    /// The current compiled filter
    #[must_use]
    pub fn filter(&self) -> &LinkFilter {
        self.bus.filter()
    }

    /// The bus, read-only
    #[must_use]
    pub fn bus(&self) -> &CompositionBus {
        &self.bus
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }
}
