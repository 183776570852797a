//! TESSERA Wire Schema
//!
//! Typed shapes for the initial dashboard payload and the `ui_patch`
//! message stream, plus the structural checks applied before anything
//! reaches the registry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dashboard;
pub mod layout;
pub mod link;
pub mod panel;
pub mod patch;
pub mod validate;
pub mod view;

pub use dashboard::{Dashboard, DashboardV1, DashboardV2, PanelV1, LayoutV1};
pub use layout::{GridLayout, Layout, LayoutPreset, NamedPreset, StructuredLayout};
pub use link::{Link, LinkKey, LinkType};
pub use panel::{PanelSpec, ShowCondition};
pub use patch::{PatchEnvelope, PatchOp, UiPatch, UpdateAction};
pub use validate::SchemaValidator;
pub use view::ViewResolver;
