//! Cross-view link declarations.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_core::PanelId;

/// Kind of interaction a link carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// The user picked a record
    #[serde(alias = "select")]
    Selection,
    /// Restrict visible records by a predicate
    Filter,
    /// Emphasize without changing selection
    Highlight,
    /// Change the target's primary context
    Navigate,
    /// Replace or patch the target's content
    Update,
}

impl LinkType {
    /// All link types in declaration order
    pub const ALL: [LinkType; 5] = [
        Self::Selection,
        Self::Filter,
        Self::Highlight,
        Self::Navigate,
        Self::Update,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Filter => "filter",
            Self::Highlight => "highlight",
            Self::Navigate => "navigate",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative routing rule between two panels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Panel the event originates from
    pub source: PanelId,
    /// Panel the event is delivered to
    pub target: PanelId,
    /// Event kind this link routes
    #[serde(rename = "type")]
    pub link_type: LinkType,
    /// Field projected out of the source event's value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    /// Name the projected value carries at the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    /// Also route target -> source with the fields swapped
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bidirectional: bool,
}

/// Identity of a link for add/remove idempotence
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    /// Source panel
    pub source: PanelId,
    /// Target panel
    pub target: PanelId,
    /// Link type
    pub link_type: LinkType,
}

impl Link {
    /// Create a link with whole-value passthrough
    #[must_use]
    pub fn new(source: impl Into<PanelId>, target: impl Into<PanelId>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
            source_field: None,
            target_field: None,
            bidirectional: false,
        }
    }

    /// Set the projected field names
    #[must_use]
    pub fn with_fields(mut self, source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        self.source_field = Some(source_field.into());
        self.target_field = Some(target_field.into());
        self
    }

    /// Mark bidirectional
    #[must_use]
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    /// The (source, target, type) identity
    #[must_use]
    pub fn key(&self) -> LinkKey {
        LinkKey {
            source: self.source.clone(),
            target: self.target.clone(),
            link_type: self.link_type,
        }
    }

    /// Whether either endpoint is `panel`
    #[must_use]
    pub fn touches(&self, panel: &str) -> bool {
        self.source == panel || self.target == panel
    }

    /// Whether neither field name is declared
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.source_field.is_none() && self.target_field.is_none()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.bidirectional { "<->" } else { "->" };
        write!(f, "{} {} {} ({})", self.source, arrow, self.target, self.link_type)
    }
}
