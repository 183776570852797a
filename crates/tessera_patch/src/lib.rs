//! TESSERA Patch Engine
//!
//! Applies `ui_patch` operations to a panel registry strictly in order,
//! recompiling the link filter whenever an op can change which links route, and
//! pairs registry, filter and bus into a single-writer [`Composition`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composition;
pub mod config;
pub mod engine;

pub use composition::Composition;
pub use config::{CompositionConfig, PatchConfig};
pub use engine::{AppliedOp, PatchEngine, PatchOutcome, RejectedOp, live_filter};
