//! TESSERA Core Types
//!
//! Pure types shared by every layer of the composition core.
//! Nothing in this crate performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fingerprint;
pub mod id;
pub mod time;
pub mod version;

// Re-exports
pub use error::{CompositionError, CompositionResult};
pub use fingerprint::Fingerprint;
pub use id::PanelId;
pub use time::Timestamp;
pub use version::{ProtocolVersion, VersionError};
