//! TESSERA Link Filter
//!
//! Compiles the declared link list into an immutable routing value and
//! resolves outbound events into the derived events each target receives.
//! A filter is never edited; a changed link set means a new compile.
//! [`propagate`] carries a dashboard's initial state across the same links.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod event;
pub mod projection;
pub mod propagate;

pub use compiler::{CompiledRoute, LinkFilter, RouteMatch};
pub use event::{Event, EventKind};
pub use projection::{derive_field, project_field};
pub use propagate::{InitialState, PanelOverlay, propagate};
