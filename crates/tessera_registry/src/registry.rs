//! The panel registry.
//!
//! Panels are kept in insertion order (significant only for default grid
//! placement). Links are kept in declaration order (significant for
//! delivery order).

use crate::config::RegistryConfig;
use crate::state::{PanelSelection, PanelState};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tessera_core::{CompositionError, CompositionResult, PanelId};
use tessera_schema::{DashboardV2, Layout, Link, PanelSpec, UpdateAction};
use tracing::debug;

/// Authoritative panel, link, and layout state
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRegistry {
    config: RegistryConfig,
    panels: IndexMap<PanelId, PanelState>,
    links: Vec<Link>,
    layout: Layout,
    revision: u64,
}

impl PanelRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            config: RegistryConfig::default(),
            panels: IndexMap::new(),
            links: Vec::new(),
            layout,
            revision: 0,
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed from an initial dashboard payload
    ///
    /// # Errors
    ///
    /// Returns error on duplicate panel ids, or on dangling links when
    /// endpoints are required
    pub fn from_dashboard(dashboard: DashboardV2, config: RegistryConfig) -> CompositionResult<Self> {
        let mut registry = Self::new(dashboard.layout).with_config(config);
        for spec in dashboard.panels {
            if registry.panels.contains_key(&spec.id) {
                return Err(CompositionError::DuplicateId {
                    id: spec.id.to_string(),
                });
            }
            let state = PanelState::seeded(spec);
            registry.panels.insert(state.id.clone(), state);
        }
        for link in dashboard.links {
            registry.add_link(link)?;
        }
        registry.revision = 0;
        debug!(
            panels = registry.panels.len(),
            links = registry.links.len(),
            "registry seeded"
        );
        Ok(registry)
    }

    /// Add a panel at the end
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is taken
    pub fn add_panel(&mut self, spec: PanelSpec) -> CompositionResult<PanelState> {
        self.insert_panel(spec, None)
    }

    /// Add a panel right after `after`, or at the end if the anchor is absent
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is taken
    pub fn insert_panel(&mut self, spec: PanelSpec, after: Option<&PanelId>) -> CompositionResult<PanelState> {
        if self.panels.contains_key(&spec.id) {
            return Err(CompositionError::DuplicateId {
                id: spec.id.to_string(),
            });
        }

        let state = PanelState::from_spec(spec);
        let snapshot = state.clone();
        match after.and_then(|anchor| self.panels.get_index_of(anchor)) {
            Some(idx) => {
                self.panels.shift_insert(idx + 1, state.id.clone(), state);
            }
            None => {
                self.panels.insert(state.id.clone(), state);
            }
        }
        self.bump();
        debug!(panel = %snapshot.id, view = snapshot.view_kind(), "panel added");
        Ok(snapshot)
    }

    /// Remove a panel and every link touching it
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn remove_panel(&mut self, id: &PanelId) -> CompositionResult<PanelState> {
        let removed = self
            .panels
            .shift_remove(id)
            .ok_or_else(|| CompositionError::not_found(id))?;
        let before = self.links.len();
        self.links.retain(|link| !link.touches(id.as_str()));
        self.bump();
        debug!(panel = %id, pruned_links = before - self.links.len(), "panel removed");
        Ok(removed)
    }

    /// Change a panel's content
    ///
    /// `Replace` overwrites the content, `Merge` shallow-merges object
    /// fragments, `Append` extends an array field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn update_panel(
        &mut self,
        id: &PanelId,
        fragment: Value,
        action: UpdateAction,
        target_field: Option<&str>,
    ) -> CompositionResult<PanelState> {
        let snapshot = self.mutate(id, |panel| panel.update_content(fragment, action, target_field))?;
        debug!(panel = %id, ?action, fingerprint = %snapshot.fingerprint, "panel content updated");
        Ok(snapshot)
    }

    /// Set the visible flag
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn set_visible(&mut self, id: &PanelId, visible: bool) -> CompositionResult<PanelState> {
        self.mutate(id, |panel| panel.visible = visible)
    }

    /// Set the collapsed flag
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn set_collapsed(&mut self, id: &PanelId, collapsed: bool) -> CompositionResult<PanelState> {
        self.mutate(id, |panel| panel.collapsed = collapsed)
    }

    /// Set the loading flag
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn set_loading(&mut self, id: &PanelId, loading: bool) -> CompositionResult<PanelState> {
        self.mutate(id, |panel| panel.loading = loading)
    }

    /// Set or clear the error message
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn set_error(&mut self, id: &PanelId, error: Option<String>) -> CompositionResult<PanelState> {
        self.mutate(id, |panel| panel.error = error)
    }

    /// Replace the layout, returning the previous one
    pub fn set_layout(&mut self, layout: Layout) -> Layout {
        self.bump();
        std::mem::replace(&mut self.layout, layout)
    }

    /// Add a link; returns false if its (source, target, type) already exists
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an absent endpoint when endpoints are required
    pub fn add_link(&mut self, link: Link) -> CompositionResult<bool> {
        if self.config.require_link_endpoints {
            for endpoint in [&link.source, &link.target] {
                if !self.panels.contains_key(endpoint) {
                    return Err(CompositionError::not_found(endpoint));
                }
            }
        }

        let key = link.key();
        if self.links.iter().any(|existing| existing.key() == key) {
            debug!(link = %link, "link already present");
            return Ok(false);
        }

        debug!(link = %link, "link added");
        self.links.push(link);
        self.bump();
        Ok(true)
    }

    /// Remove every link, of any type, from `source` to `target`
    pub fn remove_links(&mut self, source: &PanelId, target: &PanelId) -> Vec<Link> {
        let (removed, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut self.links)
            .into_iter()
            .partition(|link| link.source == *source && link.target == *target);
        self.links = kept;
        if !removed.is_empty() {
            self.bump();
            debug!(%source, %target, removed = removed.len(), "links removed");
        }
        removed
    }

    /// Record (or clear) a panel's selection and re-evaluate show conditions.
    /// Returns the ids whose visibility changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn record_selection(
        &mut self,
        id: &PanelId,
        field: Option<String>,
        value: Value,
    ) -> CompositionResult<Vec<PanelId>> {
        let selection = if PanelSelection::is_empty_value(&value) {
            None
        } else {
            Some(PanelSelection { field, value })
        };
        let has_selection = selection.is_some();
        self.mutate(id, |panel| panel.selection = selection)?;

        let mut toggled = Vec::new();
        for panel in self.panels.values_mut() {
            let gated_on_source = panel
                .show_when
                .as_ref()
                .is_some_and(|cond| cond.linked_panel_has_selection == *id);
            if gated_on_source && panel.visible != has_selection {
                panel.visible = has_selection;
                toggled.push(panel.id.clone());
            }
        }
        if !toggled.is_empty() {
            debug!(panel = %id, ?toggled, "show conditions re-evaluated");
        }
        Ok(toggled)
    }

    /// Apply a routed update: merge `{field: value}`, or replace without a field
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent
    pub fn apply_routed_update(
        &mut self,
        id: &PanelId,
        field: Option<&str>,
        value: Value,
    ) -> CompositionResult<PanelState> {
        match field {
            Some(field) => {
                let mut fragment = Map::new();
                fragment.insert(field.to_string(), value);
                self.update_panel(id, Value::Object(fragment), UpdateAction::Merge, None)
            }
            None => self.update_panel(id, value, UpdateAction::Replace, None),
        }
    }

    /// Look up a panel
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PanelState> {
        self.panels.get(id)
    }

    /// Owned copy of a panel
    #[must_use]
    pub fn snapshot(&self, id: &str) -> Option<PanelState> {
        self.panels.get(id).cloned()
    }

    /// Whether a panel is registered
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.panels.contains_key(id)
    }

    /// Panels in placement order
    pub fn panels(&self) -> impl Iterator<Item = &PanelState> {
        self.panels.values()
    }

    /// Panel ids in placement order
    #[must_use]
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels.keys().cloned().collect()
    }

    /// Links in declaration order
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Current layout
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of panels
    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether there are no panels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Mutation counter, zero right after seeding
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn mutate<F>(&mut self, id: &PanelId, f: F) -> CompositionResult<PanelState>
    where
        F: FnOnce(&mut PanelState),
    {
        let panel = self
            .panels
            .get_mut(id)
            .ok_or_else(|| CompositionError::not_found(id))?;
        f(panel);
        let snapshot = panel.clone();
        self.bump();
        Ok(snapshot)
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

impl Default for PanelRegistry {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tessera_schema::{LayoutPreset, LinkType};

    fn id(s: &str) -> PanelId {
        PanelId::from(s)
    }

    fn registry_with(ids: &[&str]) -> PanelRegistry {
        let mut registry = PanelRegistry::default();
        for panel in ids {
            registry.add_panel(PanelSpec::new(*panel, "chart")).unwrap();
        }
        registry
    }

    #[test]
    fn test_registry_new() {
        let registry = PanelRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.revision(), 0);
    }

    #[test]
    fn test_add_panel_default_flags() {
        let mut registry = PanelRegistry::default();
        let state = registry
            .add_panel(PanelSpec::new("a", "map").shown_when_selected("b"))
            .unwrap();
        assert!(state.visible);
        assert!(!state.loading);
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_add_panel_duplicate() {
        let mut registry = registry_with(&["a"]);
        let err = registry.add_panel(PanelSpec::new("a", "map")).unwrap_err();
        assert_eq!(err, CompositionError::DuplicateId { id: "a".to_string() });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_panel_after_anchor() {
        let mut registry = registry_with(&["a", "b"]);
        registry
            .insert_panel(PanelSpec::new("x", "chart"), Some(&id("a")))
            .unwrap();
        registry
            .insert_panel(PanelSpec::new("y", "chart"), Some(&id("missing")))
            .unwrap();
        assert_eq!(registry.panel_ids(), vec![id("a"), id("x"), id("b"), id("y")]);
    }

    #[test]
    fn test_remove_panel_cascades_links() {
        let mut registry = registry_with(&["a", "b", "c"]);
        registry.add_link(Link::new("a", "b", LinkType::Selection)).unwrap();
        registry.add_link(Link::new("c", "a", LinkType::Filter)).unwrap();
        registry.add_link(Link::new("b", "c", LinkType::Update)).unwrap();

        let removed = registry.remove_panel(&id("a")).unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(registry.links().len(), 1);
        assert!(registry.links().iter().all(|l| !l.touches("a")));
    }

    #[test]
    fn test_remove_panel_not_found() {
        let mut registry = PanelRegistry::default();
        assert!(matches!(
            registry.remove_panel(&id("ghost")),
            Err(CompositionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_flag_setters_touch_only_their_flag() {
        let mut registry = registry_with(&["a"]);
        let before = registry.snapshot("a").unwrap();

        let after = registry.set_visible(&id("a"), false).unwrap();
        assert!(!after.visible);
        assert_eq!(after.collapsed, before.collapsed);
        assert_eq!(after.content, before.content);

        let after = registry.set_collapsed(&id("a"), true).unwrap();
        assert!(after.collapsed);
        assert!(!after.visible);

        let after = registry.set_loading(&id("a"), true).unwrap();
        assert!(after.loading);

        let after = registry.set_error(&id("a"), Some("boom".to_string())).unwrap();
        assert_eq!(after.error.as_deref(), Some("boom"));
        let after = registry.set_error(&id("a"), None).unwrap();
        assert!(after.error.is_none());
    }

    #[test]
    fn test_flag_setters_not_found() {
        let mut registry = PanelRegistry::default();
        assert!(registry.set_visible(&id("x"), true).is_err());
        assert!(registry.set_collapsed(&id("x"), true).is_err());
        assert!(registry.set_loading(&id("x"), true).is_err());
        assert!(registry.set_error(&id("x"), None).is_err());
        assert!(registry
            .update_panel(&id("x"), json!({}), UpdateAction::Merge, None)
            .is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = registry_with(&["a"]);
        let snapshot = registry.set_loading(&id("a"), true).unwrap();
        registry.set_loading(&id("a"), false).unwrap();
        assert!(snapshot.loading);
        assert!(!registry.get("a").unwrap().loading);
    }

    #[test]
    fn test_update_panel_modes() {
        let mut registry = PanelRegistry::default();
        registry
            .add_panel(PanelSpec::new("a", "chart").with_content(json!({"x": 1, "y": 2})))
            .unwrap();

        let merged = registry
            .update_panel(&id("a"), json!({"y": 3}), UpdateAction::Merge, None)
            .unwrap();
        assert_eq!(merged.content, json!({"x": 1, "y": 3}));

        let replaced = registry
            .update_panel(&id("a"), json!({"z": 0}), UpdateAction::Replace, None)
            .unwrap();
        assert_eq!(replaced.content, json!({"z": 0}));
    }

    #[test]
    fn test_add_link_idempotent() {
        let mut registry = registry_with(&["a", "b"]);
        let link = Link::new("a", "b", LinkType::Filter).with_fields("x", "y");
        assert!(registry.add_link(link.clone()).unwrap());
        assert!(!registry.add_link(link).unwrap());
        assert_eq!(registry.links().len(), 1);
    }

    #[test]
    fn test_add_link_strict_endpoints() {
        let mut registry =
            registry_with(&["a"]).with_config(RegistryConfig::new().with_require_link_endpoints(true));
        let err = registry
            .add_link(Link::new("a", "ghost", LinkType::Selection))
            .unwrap_err();
        assert!(matches!(err, CompositionError::NotFound { ref id } if id == "ghost"));

        let mut tolerant = registry_with(&["a"]);
        assert!(tolerant.add_link(Link::new("a", "ghost", LinkType::Selection)).unwrap());
    }

    #[test]
    fn test_remove_links_all_types() {
        let mut registry = registry_with(&["a", "b"]);
        registry.add_link(Link::new("a", "b", LinkType::Filter)).unwrap();
        registry.add_link(Link::new("a", "b", LinkType::Selection)).unwrap();
        registry.add_link(Link::new("b", "a", LinkType::Selection)).unwrap();

        let removed = registry.remove_links(&id("a"), &id("b"));
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.links().len(), 1);
        assert_eq!(registry.links()[0].source, "b");

        let revision = registry.revision();
        assert!(registry.remove_links(&id("a"), &id("b")).is_empty());
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_set_layout_does_not_reorder_panels() {
        let mut registry = registry_with(&["a", "b", "c"]);
        let previous = registry.set_layout(Layout::Preset(LayoutPreset::Tabs));
        assert_eq!(previous, Layout::default());
        assert_eq!(registry.layout(), &Layout::Preset(LayoutPreset::Tabs));
        assert_eq!(registry.panel_ids(), vec![id("a"), id("b"), id("c")]);
    }

    #[test]
    fn test_record_selection_toggles_show_when() {
        let mut registry = PanelRegistry::default();
        registry.add_panel(PanelSpec::new("table", "datatable")).unwrap();
        registry
            .add_panel(PanelSpec::new("detail", "detail").shown_when_selected("table"))
            .unwrap();
        registry.set_visible(&id("detail"), false).unwrap();

        let toggled = registry
            .record_selection(&id("table"), Some("id".to_string()), json!("r1"))
            .unwrap();
        assert_eq!(toggled, vec![id("detail")]);
        assert!(registry.get("detail").unwrap().visible);
        assert!(registry.get("table").unwrap().has_selection());

        let toggled = registry
            .record_selection(&id("table"), Some("id".to_string()), json!([]))
            .unwrap();
        assert_eq!(toggled, vec![id("detail")]);
        assert!(!registry.get("detail").unwrap().visible);
        assert!(!registry.get("table").unwrap().has_selection());
    }

    #[test]
    fn test_apply_routed_update() {
        let mut registry = PanelRegistry::default();
        registry
            .add_panel(PanelSpec::new("b", "chart").with_content(json!({"title": "t"})))
            .unwrap();
        let state = registry
            .apply_routed_update(&id("b"), Some("series"), json!([1, 2]))
            .unwrap();
        assert_eq!(state.content, json!({"title": "t", "series": [1, 2]}));

        let state = registry.apply_routed_update(&id("b"), None, json!(7)).unwrap();
        assert_eq!(state.content, json!(7));
    }

    #[test]
    fn test_from_dashboard_seeding() {
        let dashboard = DashboardV2::new(Layout::grid(2))
            .with_panel(PanelSpec::new("map", "map"))
            .with_panel(PanelSpec::new("detail", "detail").shown_when_selected("map"))
            .with_link(Link::new("map", "detail", LinkType::Selection))
            .with_link(Link::new("map", "detail", LinkType::Selection));
        let registry = PanelRegistry::from_dashboard(dashboard, RegistryConfig::default()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.links().len(), 1);
        assert!(!registry.get("detail").unwrap().visible);
        assert_eq!(registry.revision(), 0);
    }

    #[test]
    fn test_from_dashboard_duplicate_ids() {
        let dashboard = DashboardV2::new(Layout::default())
            .with_panel(PanelSpec::new("a", "map"))
            .with_panel(PanelSpec::new("a", "chart"));
        assert!(matches!(
            PanelRegistry::from_dashboard(dashboard, RegistryConfig::default()),
            Err(CompositionError::DuplicateId { .. })
        ));
    }

    fn link_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, LinkType)>, usize)> {
        (1usize..6).prop_flat_map(|n| {
            let edge = (0..n, 0..n, prop::sample::select(LinkType::ALL.to_vec()));
            (Just(n), prop::collection::vec(edge, 0..12), 0..n)
        })
    }

    proptest! {
        #[test]
        fn prop_links_unique_and_pruned((n, edges, victim) in link_graph()) {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut registry = registry_with(&refs);

            for &(s, t, kind) in &edges {
                let link = Link::new(names[s].clone(), names[t].clone(), kind);
                registry.add_link(link.clone()).unwrap();
                prop_assert!(!registry.add_link(link).unwrap());
            }
            let mut keys: Vec<_> = registry.links().iter().map(Link::key).collect();
            let total = keys.len();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), total);

            let victim = id(&names[victim]);
            let revision = registry.revision();
            registry.remove_panel(&victim).unwrap();
            prop_assert!(registry.revision() > revision);
            prop_assert!(registry.links().iter().all(|link| !link.touches(victim.as_str())));
            prop_assert_eq!(registry.len(), n - 1);
        }
    }
}
