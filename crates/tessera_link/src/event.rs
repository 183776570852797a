//! Transient events carried across links.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tessera_core::{PanelId, Timestamp};
use tessera_schema::LinkType;

/// Event kinds share their vocabulary with link types
pub type EventKind = LinkType;

/// One event, outbound from a panel or derived for a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Kind of interaction
    pub kind: EventKind,
    /// Panel the event belongs to: the publisher for outbound events, the
    /// recipient for derived ones
    pub panel_id: PanelId,
    /// Field the value refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Payload
    #[serde(default)]
    pub value: Value,
    /// Creation time, carried unchanged across links
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time
    #[must_use]
    pub fn new(kind: EventKind, panel_id: impl Into<PanelId>, value: Value) -> Self {
        Self {
            kind,
            panel_id: panel_id.into(),
            field: None,
            value,
            timestamp: Timestamp::now(),
        }
    }

    /// Selection event
    #[must_use]
    pub fn selection(panel_id: impl Into<PanelId>, field: impl Into<String>, value: Value) -> Self {
        Self::new(EventKind::Selection, panel_id, value).with_field(field)
    }

    /// Update event
    #[must_use]
    pub fn update(panel_id: impl Into<PanelId>, value: Value) -> Self {
        Self::new(EventKind::Update, panel_id, value)
    }

    /// Set the field
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the timestamp
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}@{}.{}={}", self.kind, self.panel_id, field, self.value),
            None => write!(f, "{}@{}={}", self.kind, self.panel_id, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_shape() {
        let event = Event::selection("map", "featureId", json!("F42")).at(Timestamp::from_millis(5));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"kind": "selection", "panelId": "map", "field": "featureId", "value": "F42", "timestamp": 5})
        );
    }

    #[test]
    fn test_event_accepts_select_alias() {
        let event: Event =
            serde_json::from_value(json!({"kind": "select", "panelId": "t", "value": 1})).unwrap();
        assert_eq!(event.kind, EventKind::Selection);
        assert!(event.field.is_none());
    }

    #[test]
    fn test_event_display() {
        let event = Event::update("b", json!(3)).with_field("n");
        assert_eq!(event.to_string(), "update@b.n=3");
    }
}
