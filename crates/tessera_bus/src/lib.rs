//! TESSERA Composition Bus
//!
//! Panels register inbound handlers keyed by id and publish outbound
//! events. Each publish resolves through the current link filter and
//! delivers depth-first; handlers may publish again from inside a
//! delivery. A visited set threaded through one publish call keeps every
//! (panel, kind) pair to a single delivery.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod handler;
pub mod report;

pub use bus::{CompositionBus, Dispatch};
pub use handler::{Inbound, InboundHandler};
pub use report::{Delivery, DispatchReport, Published, Suppressed};
pub use tessera_link::{Event, EventKind};
