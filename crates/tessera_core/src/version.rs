//! Wire protocol versions.
//!
//! The dashboard payload is versioned `1.0`/`2.0` and the patch message `3.0`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two-component protocol version (`major.minor`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
}

impl ProtocolVersion {
    /// Legacy dashboard payload
    pub const DASHBOARD_V1: Self = Self::new(1, 0);
    /// Linked dashboard payload
    pub const DASHBOARD_V2: Self = Self::new(2, 0);
    /// Patch message
    pub const PATCH: Self = Self::new(3, 0);

    /// Create a new version
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse from string
    ///
    /// # Errors
    ///
    /// Returns error if format is invalid
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
        let major = major
            .parse()
            .map_err(|_| VersionError::InvalidComponent(major.to_string()))?;
        let minor = minor
            .parse()
            .map_err(|_| VersionError::InvalidComponent(minor.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ProtocolVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ProtocolVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Version parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Not of the form `major.minor`
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
    /// A component is not a number
    #[error("Invalid version component: {0}")]
    InvalidComponent(String),
}
