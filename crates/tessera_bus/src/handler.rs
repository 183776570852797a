//! Inbound handler trait

use crate::bus::Dispatch;
use tessera_core::PanelId;
use tessera_link::Event;

/// An event arriving at a panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Panel whose publish produced the event
    pub source: PanelId,
    /// Derived event, addressed to the receiving panel
    pub event: Event,
}

/// A panel's reaction to inbound events.
///
/// The `dispatch` handle lets the handler publish again within the same
/// causal chain. Such publishes run immediately, before the next sibling
/// delivery.
pub trait InboundHandler: Send + Sync {
    /// React to one delivery
    fn on_event(&self, inbound: &Inbound, dispatch: &mut Dispatch<'_>);
}

impl<F> InboundHandler for F
where
    F: Fn(&Inbound, &mut Dispatch<'_>) + Send + Sync,
{
    fn on_event(&self, inbound: &Inbound, dispatch: &mut Dispatch<'_>) {
        self(inbound, dispatch);
    }
}
