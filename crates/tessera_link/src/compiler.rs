//! Link filter compilation and resolution.

use crate::event::{Event, EventKind};
use crate::projection::{derive_field, project_field};
use indexmap::{IndexMap, IndexSet};
use tessera_core::PanelId;
use tessera_schema::Link;
use tracing::trace;

/// One direction of one declared link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    /// Position of the link in the declared list
    pub declared_at: usize,
    /// Receiving panel
    pub target: PanelId,
    /// Event kind the route carries
    pub kind: EventKind,
    /// Field read on the sending side
    pub source_field: Option<String>,
    /// Field named on the receiving side
    pub target_field: Option<String>,
    /// Whether this is the target-to-source half of a bidirectional link
    pub reversed: bool,
}

/// A resolved delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Receiving panel
    pub target: PanelId,
    /// Event to hand to the target
    pub event: Event,
    /// Position of the link that produced the match
    pub declared_at: usize,
}

/// Immutable routing table compiled from a link list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkFilter {
    /// No links: nothing routes anywhere
    #[default]
    Empty,
    /// Routes grouped by sending panel, each group in declaration order
    Compiled {
        /// Routes keyed by sending panel
        routes: IndexMap<PanelId, Vec<CompiledRoute>>,
        /// Distinct links compiled in
        links: usize,
    },
}

impl LinkFilter {
    /// Compile a link list, trusting every endpoint.
    ///
    /// Never fails. Repeated (source, target, type) keys keep their first
    /// declaration only.
    #[must_use]
    pub fn compile(declared: &[Link]) -> Self {
        Self::compile_live(declared, |_| true)
    }

    /// Compile only the links whose endpoints are both present.
    ///
    /// Links naming an absent panel stay inert until a later compile sees
    /// that panel. `declared_at` still indexes the full declared list.
    #[must_use]
    pub fn compile_live(declared: &[Link], is_present: impl Fn(&PanelId) -> bool) -> Self {
        let mut seen = IndexSet::new();
        let mut routes: IndexMap<PanelId, Vec<CompiledRoute>> = IndexMap::new();

        for (declared_at, link) in declared.iter().enumerate() {
            if !is_present(&link.source) || !is_present(&link.target) {
                trace!(link = %link, "inert link");
                continue;
            }
            if !seen.insert(link.key()) {
                continue;
            }
            routes.entry(link.source.clone()).or_default().push(CompiledRoute {
                declared_at,
                target: link.target.clone(),
                kind: link.link_type,
                source_field: link.source_field.clone(),
                target_field: link.target_field.clone(),
                reversed: false,
            });
            if link.bidirectional {
                routes.entry(link.target.clone()).or_default().push(CompiledRoute {
                    declared_at,
                    target: link.source.clone(),
                    kind: link.link_type,
                    source_field: link.target_field.clone(),
                    target_field: link.source_field.clone(),
                    reversed: true,
                });
            }
        }

        if seen.is_empty() {
            return Self::Empty;
        }
        Self::Compiled {
            routes,
            links: seen.len(),
        }
    }

    /// Resolve an outbound event from `source` into deliveries, in link
    /// declaration order
    #[must_use]
    pub fn resolve(&self, source: &str, event: &Event) -> Vec<RouteMatch> {
        let Self::Compiled { routes, .. } = self else {
            return Vec::new();
        };
        let Some(candidates) = routes.get(source) else {
            return Vec::new();
        };

        let event_field = event.field.as_deref();
        let matches: Vec<RouteMatch> = candidates
            .iter()
            .filter(|route| route.kind == event.kind)
            .map(|route| RouteMatch {
                target: route.target.clone(),
                event: Event {
                    kind: event.kind,
                    panel_id: route.target.clone(),
                    field: derive_field(event_field, route.target_field.as_deref()),
                    value: project_field(&event.value, event_field, route.source_field.as_deref()),
                    timestamp: event.timestamp,
                },
                declared_at: route.declared_at,
            })
            .collect();

        trace!(%source, kind = %event.kind, matches = matches.len(), "resolved");
        matches
    }

    /// Whether nothing can route
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of distinct links compiled in
    #[must_use]
    pub fn link_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Compiled { links, .. } => *links,
        }
    }

    /// Number of directed routes, counting both halves of bidirectional links
    #[must_use]
    pub fn route_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Compiled { routes, .. } => routes.values().map(Vec::len).sum(),
        }
    }

    /// Panels a `kind` event from `source` would reach, in delivery order
    #[must_use]
    pub fn targets_of(&self, source: &str, kind: EventKind) -> Vec<PanelId> {
        match self {
            Self::Empty => Vec::new(),
            Self::Compiled { routes, .. } => routes
                .get(source)
                .map(|candidates| {
                    candidates
                        .iter()
                        .filter(|route| route.kind == kind)
                        .map(|route| route.target.clone())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
