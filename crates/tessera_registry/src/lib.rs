//! TESSERA Panel Registry
//!
//! Holds the authoritative panel list, link list, and layout. Every
//! mutation is synchronous and returns an owned snapshot so callers can
//! diff before and after.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diff;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod summary;

pub use config::RegistryConfig;
pub use diff::RegistryDiff;
pub use registry::PanelRegistry;
pub use snapshot::{CompositionSnapshot, PanelSummary};
pub use state::{PanelSelection, PanelState};
pub use summary::summarize;
