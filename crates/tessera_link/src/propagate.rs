//! Initial cross-view state.
//!
//! Explicit per-panel state seeds an overlay for each present panel. One
//! pass over the link list in declaration order then carries overlays to
//! link targets, so a later link sees what an earlier one carried.
//! Only `selection`, `filter` and `highlight` links carry state.

use crate::event::EventKind;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_core::PanelId;
use tessera_schema::Link;
use tracing::debug;

/// Explicit state supplied with a dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitialState {
    /// Selected ids per panel
    pub selections: IndexMap<PanelId, Vec<String>>,
    /// Filter values per panel, keyed by field
    pub filters: IndexMap<PanelId, Map<String, Value>>,
    /// Highlighted id per panel
    pub highlights: IndexMap<PanelId, String>,
}

impl InitialState {
    /// No explicit state at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty() && self.filters.is_empty() && self.highlights.is_empty()
    }

    /// Add a selection
    #[must_use]
    pub fn with_selection(mut self, panel: impl Into<PanelId>, ids: Vec<String>) -> Self {
        self.selections.insert(panel.into(), ids);
        self
    }

    /// Add one filter value
    #[must_use]
    pub fn with_filter(mut self, panel: impl Into<PanelId>, field: impl Into<String>, value: Value) -> Self {
        self.filters.entry(panel.into()).or_default().insert(field.into(), value);
        self
    }

    /// Add a highlight
    #[must_use]
    pub fn with_highlight(mut self, panel: impl Into<PanelId>, id: impl Into<String>) -> Self {
        self.highlights.insert(panel.into(), id.into());
        self
    }
}

/// Derived starting state of one panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelOverlay {
    /// Selected ids, own first, then carried ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_ids: Vec<String>,
    /// Filter values by field
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
    /// Highlighted id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_id: Option<String>,
}

impl PanelOverlay {
    /// Carries nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty() && self.filters.is_empty() && self.highlighted_id.is_none()
    }

    /// Attach the overlay to object content under `_compose`. Content that
    /// is not an object is returned unchanged.
    #[must_use]
    pub fn augment(&self, panel_id: &PanelId, content: &Value) -> Value {
        let Value::Object(map) = content else {
            return content.clone();
        };
        let mut compose = Map::new();
        compose.insert("panelId".to_string(), Value::String(panel_id.to_string()));
        if !self.selected_ids.is_empty() {
            let ids = self.selected_ids.iter().cloned().map(Value::String).collect();
            compose.insert("selectedIds".to_string(), Value::Array(ids));
        }
        if !self.filters.is_empty() {
            compose.insert("filters".to_string(), Value::Object(self.filters.clone()));
        }
        if let Some(id) = &self.highlighted_id {
            compose.insert("highlightedId".to_string(), Value::String(id.clone()));
        }
        let mut augmented = map.clone();
        augmented.insert("_compose".to_string(), Value::Object(compose));
        Value::Object(augmented)
    }
}

/// Seed overlays from `state` and carry them across `links`.
///
/// Panels outside `panel_ids` neither seed nor receive. A bidirectional
/// link carries forward, then back with its fields swapped. Carried
/// selection ids are appended once each.
#[must_use]
pub fn propagate(panel_ids: &[PanelId], links: &[Link], state: &InitialState) -> IndexMap<PanelId, PanelOverlay> {
    let present: IndexSet<&PanelId> = panel_ids.iter().collect();
    let mut overlays: IndexMap<PanelId, PanelOverlay> = IndexMap::new();

    for id in panel_ids {
        let overlay = PanelOverlay {
            selected_ids: state.selections.get(id).cloned().unwrap_or_default(),
            filters: state.filters.get(id).cloned().unwrap_or_default(),
            highlighted_id: state.highlights.get(id).cloned(),
        };
        if !overlay.is_empty() {
            overlays.insert(id.clone(), overlay);
        }
    }
    if overlays.is_empty() {
        return overlays;
    }

    for link in links {
        let forward = Hop {
            source: &link.source,
            target: &link.target,
            kind: link.link_type,
            source_field: link.source_field.as_deref(),
            target_field: link.target_field.as_deref(),
        };
        forward.carry(&present, &mut overlays);
        if link.bidirectional {
            forward.reversed().carry(&present, &mut overlays);
        }
    }

    debug!(links = links.len(), overlays = overlays.len(), "initial state propagated");
    overlays
}

#[derive(Clone, Copy)]
struct Hop<'a> {
    source: &'a PanelId,
    target: &'a PanelId,
    kind: EventKind,
    source_field: Option<&'a str>,
    target_field: Option<&'a str>,
}

impl Hop<'_> {
    fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            kind: self.kind,
            source_field: self.target_field,
            target_field: self.source_field,
        }
    }

    fn carry(&self, present: &IndexSet<&PanelId>, overlays: &mut IndexMap<PanelId, PanelOverlay>) {
        if !present.contains(self.source) || !present.contains(self.target) {
            return;
        }
        if matches!(self.kind, EventKind::Navigate | EventKind::Update) {
            return;
        }
        let Some(from) = overlays.get(self.source).cloned() else {
            return;
        };
        let to = overlays.entry(self.target.clone()).or_default();

        match self.kind {
            EventKind::Selection => {
                for id in from.selected_ids {
                    if !to.selected_ids.contains(&id) {
                        to.selected_ids.push(id);
                    }
                }
            }
            EventKind::Filter => match self.source_field {
                Some(field) => {
                    if let Some(value) = from.filters.get(field) {
                        let key = self.target_field.unwrap_or(field);
                        to.filters.insert(key.to_string(), value.clone());
                    }
                }
                None => to.filters.extend(from.filters),
            },
            EventKind::Highlight => {
                if from.highlighted_id.is_some() {
                    to.highlighted_id = from.highlighted_id;
                }
            }
            EventKind::Navigate | EventKind::Update => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tessera_schema::LinkType;

    fn panels(ids: &[&str]) -> Vec<PanelId> {
        ids.iter().map(|id| PanelId::from(*id)).collect()
    }

    #[test]
    fn test_no_state_no_overlays() {
        let links = [Link::new("a", "b", LinkType::Selection)];
        assert!(propagate(&panels(&["a", "b"]), &links, &InitialState::default()).is_empty());
    }

    #[test]
    fn test_selection_carries_to_target() {
        let state = InitialState::default()
            .with_selection("map", vec!["F1".to_string()])
            .with_selection("table", vec!["F0".to_string()]);
        let links = [Link::new("map", "table", LinkType::Selection)];
        let overlays = propagate(&panels(&["map", "table"]), &links, &state);
        assert_eq!(overlays["table"].selected_ids, vec!["F0", "F1"]);
        assert_eq!(overlays["map"].selected_ids, vec!["F1"]);
    }

    #[test]
    fn test_filter_maps_fields() {
        let state = InitialState::default()
            .with_filter("table", "region", json!("north"))
            .with_filter("table", "year", json!(2024));
        let links = [
            Link::new("table", "chart", LinkType::Filter).with_fields("region", "area"),
            Link::new("table", "list", LinkType::Filter),
        ];
        let overlays = propagate(&panels(&["table", "chart", "list"]), &links, &state);
        assert_eq!(overlays["chart"].filters, json!({"area": "north"}).as_object().cloned().unwrap());
        assert_eq!(overlays["list"].filters, state.filters["table"]);
    }

    #[test]
    fn test_missing_filter_field_still_creates_overlay() {
        let state = InitialState::default().with_filter("a", "x", json!(1));
        let links = [Link::new("a", "b", LinkType::Filter).with_fields("y", "z")];
        let overlays = propagate(&panels(&["a", "b"]), &links, &state);
        assert!(overlays["b"].is_empty());
    }

    #[test]
    fn test_highlight_and_bidirectional() {
        let state = InitialState::default().with_highlight("b", "row-3");
        let links = [Link::new("a", "b", LinkType::Highlight).bidirectional()];
        let overlays = propagate(&panels(&["a", "b"]), &links, &state);
        assert_eq!(overlays["a"].highlighted_id.as_deref(), Some("row-3"));
    }

    #[test]
    fn test_bidirectional_selection_does_not_duplicate() {
        let state = InitialState::default().with_selection("a", vec!["1".to_string()]);
        let links = [Link::new("a", "b", LinkType::Selection).bidirectional()];
        let overlays = propagate(&panels(&["a", "b"]), &links, &state);
        assert_eq!(overlays["a"].selected_ids, vec!["1"]);
        assert_eq!(overlays["b"].selected_ids, vec!["1"]);
    }

    #[test]
    fn test_chain_follows_declaration_order() {
        let state = InitialState::default().with_selection("a", vec!["s".to_string()]);
        let chained = [
            Link::new("a", "b", LinkType::Selection),
            Link::new("b", "c", LinkType::Selection),
        ];
        let overlays = propagate(&panels(&["a", "b", "c"]), &chained, &state);
        assert_eq!(overlays["c"].selected_ids, vec!["s"]);

        let reversed = [chained[1].clone(), chained[0].clone()];
        let overlays = propagate(&panels(&["a", "b", "c"]), &reversed, &state);
        assert!(!overlays.contains_key("c"));
    }

    #[test]
    fn test_absent_panels_ignored() {
        let state = InitialState::default()
            .with_selection("ghost", vec!["g".to_string()])
            .with_selection("a", vec!["1".to_string()]);
        let links = [
            Link::new("ghost", "a", LinkType::Selection),
            Link::new("a", "ghost", LinkType::Selection),
            Link::new("a", "b", LinkType::Navigate),
        ];
        let overlays = propagate(&panels(&["a", "b"]), &links, &state);
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays["a"].selected_ids, vec!["1"]);
    }

    #[test]
    fn test_augment_object_content() {
        let overlay = PanelOverlay {
            selected_ids: vec!["F1".to_string()],
            highlighted_id: Some("F1".to_string()),
            ..PanelOverlay::default()
        };
        let augmented = overlay.augment(&PanelId::from("map"), &json!({"zoom": 4}));
        assert_eq!(
            augmented,
            json!({"zoom": 4, "_compose": {"panelId": "map", "selectedIds": ["F1"], "highlightedId": "F1"}})
        );
        assert_eq!(overlay.augment(&PanelId::from("map"), &json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_initial_state_decodes_camel_case() {
        let state: InitialState = serde_json::from_value(json!({
            "selections": {"map": ["F1"]},
            "highlights": {"table": "r2"}
        }))
        .unwrap();
        assert_eq!(state.selections["map"], vec!["F1"]);
        assert_eq!(state.highlights["table"], "r2");
        assert!(state.filters.is_empty());
    }

    proptest! {
        #[test]
        fn prop_overlays_stay_on_present_panels(
            edges in prop::collection::vec((0usize..5, 0usize..5, any::<bool>()), 0..10),
            seed in 0usize..5,
        ) {
            let all: Vec<PanelId> = (0..5).map(|i| PanelId::from(format!("p{i}"))).collect();
            let present = &all[..3];
            let links: Vec<Link> = edges
                .iter()
                .map(|&(s, t, both)| {
                    let link = Link::new(all[s].clone(), all[t].clone(), LinkType::Selection);
                    if both { link.bidirectional() } else { link }
                })
                .collect();
            let state = InitialState::default().with_selection(all[seed].clone(), vec!["x".to_string()]);
            let overlays = propagate(present, &links, &state);
            prop_assert!(overlays.keys().all(|id| present.contains(id)));
            for overlay in overlays.values() {
                prop_assert!(overlay.selected_ids.len() <= 1);
            }
        }
    }
}
