//! Dispatch reports.

use serde::{Deserialize, Serialize};
use tessera_core::PanelId;
use tessera_link::{Event, EventKind};

/// One resolved delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// Publishing panel
    pub source: PanelId,
    /// Receiving panel
    pub target: PanelId,
    /// Derived event
    pub event: Event,
    /// Whether a handler was registered to receive it
    pub delivered: bool,
    /// Nesting level; 0 for the outermost publish
    pub depth: usize,
}

/// A delivery skipped because its (target, kind) pair was already visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suppressed {
    /// Publishing panel
    pub source: PanelId,
    /// Panel that would have received it
    pub target: PanelId,
    /// Event kind
    pub kind: EventKind,
}

/// An outbound event as it entered the bus, including re-entrant publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Published {
    /// Publishing panel
    pub source: PanelId,
    /// Event as published
    pub event: Event,
    /// Nesting level of the publish
    pub depth: usize,
}

/// Everything one publish call did, in depth-first order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    /// Publishes in the order they ran, outermost first
    pub published: Vec<Published>,
    /// Resolved deliveries
    pub deliveries: Vec<Delivery>,
    /// Skipped deliveries
    pub suppressed: Vec<Suppressed>,
}

impl DispatchReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty() && self.suppressed.is_empty()
    }

    /// Deliveries a handler actually received
    pub fn received(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.delivered)
    }

    /// Deliveries addressed to `target`
    pub fn to(&self, target: &str) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(move |d| d.target == target)
    }

    /// Targets in delivery order
    #[must_use]
    pub fn targets(&self) -> Vec<&PanelId> {
        self.deliveries.iter().map(|d| &d.target).collect()
    }
}
