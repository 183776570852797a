//! The composition bus.

use crate::handler::{Inbound, InboundHandler};
use crate::report::{Delivery, DispatchReport, Published, Suppressed};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;
use tessera_core::PanelId;
use tessera_link::{Event, EventKind, LinkFilter};
use tracing::{debug, trace};

/// Routes published events to registered panels
pub struct CompositionBus {
    /// Current compiled filter, swapped whole on every link change
    filter: Arc<LinkFilter>,
    /// Registered panels and their handlers, if mounted
    panels: IndexMap<PanelId, Option<Arc<dyn InboundHandler>>>,
}

impl CompositionBus {
    /// Create a bus with no links
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter: Arc::new(LinkFilter::Empty),
            panels: IndexMap::new(),
        }
    }

    /// Create with a compiled filter
    #[must_use]
    pub fn with_filter(mut self, filter: LinkFilter) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Swap in a freshly compiled filter
    pub fn set_filter(&mut self, filter: Arc<LinkFilter>) {
        debug!(links = filter.link_count(), routes = filter.route_count(), "filter swapped");
        self.filter = filter;
    }

    /// Current filter
    #[must_use]
    pub fn filter(&self) -> &Arc<LinkFilter> {
        &self.filter
    }

    /// Register a panel without a handler. Idempotent; an existing handler
    /// is kept.
    pub fn register_panel(&mut self, id: impl Into<PanelId>) {
        let id = id.into();
        if !self.panels.contains_key(&id) {
            trace!(panel = %id, "panel registered");
            self.panels.insert(id, None);
        }
    }

    /// Register a panel with its inbound handler, replacing any previous one
    pub fn set_handler(&mut self, id: impl Into<PanelId>, handler: Arc<dyn InboundHandler>) {
        let id = id.into();
        debug!(panel = %id, "handler mounted");
        self.panels.insert(id, Some(handler));
    }

    /// Register a closure as a panel's inbound handler
    pub fn on<F>(&mut self, id: impl Into<PanelId>, handler: F)
    where
        F: Fn(&Inbound, &mut Dispatch<'_>) + Send + Sync + 'static,
    {
        self.set_handler(id, Arc::new(handler));
    }

    /// Remove a panel and its handler. Safe on unknown ids.
    pub fn unregister_panel(&mut self, id: &str) {
        if self.panels.shift_remove(id).is_some() {
            debug!(panel = %id, "panel unregistered");
        }
    }

    /// Whether a panel is registered
    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.panels.contains_key(id)
    }

    /// Whether a panel has a handler
    #[must_use]
    pub fn has_handler(&self, id: &str) -> bool {
        self.panels.get(id).is_some_and(Option::is_some)
    }

    /// Registered panel ids in registration order
    pub fn registered(&self) -> impl Iterator<Item = &PanelId> {
        self.panels.keys()
    }

    /// Publish an outbound event from `source` and run every resulting
    /// delivery, including re-entrant publishes, to completion
    pub fn publish(&self, source: impl Into<PanelId>, event: Event) -> DispatchReport {
        let mut dispatch = Dispatch::new(self);
        dispatch.publish(source, event);
        debug!(
            deliveries = dispatch.report.deliveries.len(),
            suppressed = dispatch.report.suppressed.len(),
            "publish complete"
        );
        dispatch.report
    }

    fn handler(&self, id: &str) -> Option<Arc<dyn InboundHandler>> {
        self.panels.get(id).and_then(Clone::clone)
    }
}

impl Default for CompositionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositionBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionBus")
            .field("filter", &self.filter)
            .field("panels", &self.panels.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// State of one publish call, handed to handlers for re-entrant publishes
pub struct Dispatch<'a> {
    bus: &'a CompositionBus,
    visited: IndexSet<(PanelId, EventKind)>,
    report: DispatchReport,
    depth: usize,
}

impl<'a> Dispatch<'a> {
    fn new(bus: &'a CompositionBus) -> Self {
        Self {
            bus,
            visited: IndexSet::new(),
            report: DispatchReport::new(),
            depth: 0,
        }
    }

    /// Publish from inside a handler; runs immediately within this chain
    pub fn publish(&mut self, source: impl Into<PanelId>, event: Event) {
        let source = source.into();
        self.visited.insert((source.clone(), event.kind));
        self.report.published.push(Published {
            source: source.clone(),
            event: event.clone(),
            depth: self.depth,
        });
        self.route(&source, &event);
    }

    /// Whether (panel, kind) has been visited in this chain
    #[must_use]
    pub fn visited(&self, panel: &str, kind: EventKind) -> bool {
        self.visited.contains(&(PanelId::from(panel), kind))
    }

    /// Nesting level of the delivery currently running
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Report accumulated so far
    #[must_use]
    pub fn report(&self) -> &DispatchReport {
        &self.report
    }

    fn route(&mut self, source: &PanelId, event: &Event) {
        let bus = self.bus;
        for found in bus.filter.resolve(source.as_str(), event) {
            let key = (found.target.clone(), found.event.kind);
            if !self.visited.insert(key) {
                debug!(%source, target = %found.target, kind = %found.event.kind, "delivery suppressed");
                self.report.suppressed.push(Suppressed {
                    source: source.clone(),
                    target: found.target,
                    kind: found.event.kind,
                });
                continue;
            }

            let handler = bus.handler(found.target.as_str());
            self.report.deliveries.push(Delivery {
                source: source.clone(),
                target: found.target.clone(),
                event: found.event.clone(),
                delivered: handler.is_some(),
                depth: self.depth,
            });

            let Some(handler) = handler else {
                trace!(target = %found.target, "no handler mounted");
                continue;
            };
            let inbound = Inbound {
                source: source.clone(),
                event: found.event,
            };
            self.depth += 1;
            handler.on_event(&inbound, self);
            self.depth -= 1;
        }
    }
}
