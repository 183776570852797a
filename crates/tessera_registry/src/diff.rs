//! Before/after comparison of two composition snapshots.

use crate::snapshot::CompositionSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_core::PanelId;
use tessera_schema::Link;

/// What changed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryDiff {
    /// Panels only in `after`
    pub added: Vec<PanelId>,
    /// Panels only in `before`
    pub removed: Vec<PanelId>,
    /// Panels whose content fingerprint changed
    pub content_changed: Vec<PanelId>,
    /// Panels whose display flags changed
    pub flags_changed: Vec<PanelId>,
    /// Links only in `after`
    pub links_added: Vec<Link>,
    /// Links only in `before`
    pub links_removed: Vec<Link>,
    /// Whether the layout changed
    pub layout_changed: bool,
}

impl RegistryDiff {
    /// Create an empty diff
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any differences
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.content_changed.is_empty()
            || !self.flags_changed.is_empty()
            || !self.links_added.is_empty()
            || !self.links_removed.is_empty()
            || self.layout_changed
    }

    /// Compute diff between two snapshots
    #[must_use]
    pub fn compute(before: &CompositionSnapshot, after: &CompositionSnapshot) -> Self {
        let mut diff = Self::new();

        for panel in &after.panels {
            match before.panel(panel.id.as_str()) {
                None => diff.added.push(panel.id.clone()),
                Some(old) => {
                    if old.fingerprint != panel.fingerprint {
                        diff.content_changed.push(panel.id.clone());
                    }
                    if old.visible != panel.visible
                        || old.collapsed != panel.collapsed
                        || old.loading != panel.loading
                        || old.error != panel.error
                    {
                        diff.flags_changed.push(panel.id.clone());
                    }
                }
            }
        }

        for panel in &before.panels {
            if after.panel(panel.id.as_str()).is_none() {
                diff.removed.push(panel.id.clone());
            }
        }

        diff.links_added = after
            .links
            .iter()
            .filter(|link| !before.links.contains(link))
            .cloned()
            .collect();
        diff.links_removed = before
            .links
            .iter()
            .filter(|link| !after.links.contains(link))
            .cloned()
            .collect();

        diff.layout_changed = before.layout != after.layout;
        diff
    }
}

impl fmt::Display for RegistryDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "no changes");
        }
        for id in &self.added {
            writeln!(f, "+ panel {id}")?;
        }
        for id in &self.removed {
            writeln!(f, "- panel {id}")?;
        }
        for id in &self.content_changed {
            writeln!(f, "~ content {id}")?;
        }
        for id in &self.flags_changed {
            writeln!(f, "~ flags {id}")?;
        }
        for link in &self.links_added {
            writeln!(f, "+ link {link}")?;
        }
        for link in &self.links_removed {
            writeln!(f, "- link {link}")?;
        }
        if self.layout_changed {
            writeln!(f, "~ layout")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PanelRegistry;
    use serde_json::json;
    use tessera_schema::{LayoutPreset, LinkType, PanelSpec, UpdateAction};

    fn base() -> PanelRegistry {
        let mut registry = PanelRegistry::default();
        registry
            .add_panel(PanelSpec::new("a", "chart").with_content(json!({"v": 1})))
            .unwrap();
        registry.add_panel(PanelSpec::new("b", "map")).unwrap();
        registry
            .add_link(Link::new("a", "b", LinkType::Selection))
            .unwrap();
        registry
    }

    #[test]
    fn test_identical_snapshots() {
        let registry = base();
        let snapshot = CompositionSnapshot::capture(&registry);
        let diff = RegistryDiff::compute(&snapshot, &snapshot);
        assert!(!diff.has_changes());
        assert_eq!(diff.to_string(), "no changes");
    }

    #[test]
    fn test_detects_every_change_kind() {
        let mut registry = base();
        let before = CompositionSnapshot::capture(&registry);

        registry.remove_panel(&PanelId::from("b")).unwrap();
        registry.add_panel(PanelSpec::new("c", "table")).unwrap();
        registry
            .update_panel(&PanelId::from("a"), json!({"v": 2}), UpdateAction::Merge, None)
            .unwrap();
        registry.set_loading(&PanelId::from("a"), true).unwrap();
        registry.set_layout(LayoutPreset::Tabs.into());

        let after = CompositionSnapshot::capture(&registry);
        let diff = RegistryDiff::compute(&before, &after);

        assert_eq!(diff.added, vec![PanelId::from("c")]);
        assert_eq!(diff.removed, vec![PanelId::from("b")]);
        assert_eq!(diff.content_changed, vec![PanelId::from("a")]);
        assert_eq!(diff.flags_changed, vec![PanelId::from("a")]);
        assert!(diff.links_added.is_empty());
        assert_eq!(diff.links_removed.len(), 1);
        assert!(diff.layout_changed);

        let text = diff.to_string();
        assert!(text.contains("+ panel c"));
        assert!(text.contains("- link a -> b (selection)"));
    }

    #[test]
    fn test_equal_content_same_fingerprint() {
        let mut registry = base();
        let before = CompositionSnapshot::capture(&registry);
        registry
            .update_panel(&PanelId::from("a"), json!({"v": 1}), UpdateAction::Replace, None)
            .unwrap();
        let after = CompositionSnapshot::capture(&registry);
        assert!(!RegistryDiff::compute(&before, &after).has_changes());
    }
}
