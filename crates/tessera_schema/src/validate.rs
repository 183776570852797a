//! Structural validation for payloads and patch ops.
//!
//! These checks run before anything touches the registry. They never look
//! at registry contents; missing-panel errors are the registry's concern.

use crate::dashboard::DashboardV2;
use crate::layout::Layout;
use crate::link::Link;
use crate::panel::PanelSpec;
use crate::patch::{PatchOp, UpdateAction};
use indexmap::IndexSet;
use tessera_core::{CompositionError, CompositionResult, PanelId};
use tracing::warn;

/// Validator for wire shapes
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    /// Require `viewType` or `viewUrl` on every panel
    pub require_view: bool,
    /// Maximum panels in a dashboard (0 = no limit)
    pub max_panels: usize,
}

impl SchemaValidator {
    /// Create a validator with default rules
    #[must_use]
    pub fn new() -> Self {
        Self {
            require_view: true,
            max_panels: 0,
        }
    }

    /// Set whether a view reference is required
    #[must_use]
    pub fn with_require_view(mut self, require: bool) -> Self {
        self.require_view = require;
        self
    }

    /// Set maximum panel count
    #[must_use]
    pub fn with_max_panels(mut self, max: usize) -> Self {
        self.max_panels = max;
        self
    }

    /// Validate one panel definition
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or no view reference is given
    pub fn validate_panel(&self, panel: &PanelSpec) -> CompositionResult<()> {
        check_id("panel.id", &panel.id)?;
        if self.require_view && panel.view_type.is_none() && panel.view_url.is_none() {
            return Err(CompositionError::validation(
                format!("panel {}", panel.id),
                "panel must have either viewUrl or viewType",
            ));
        }
        if let Some(cond) = &panel.show_when {
            check_id("showWhen.linkedPanelHasSelection", &cond.linked_panel_has_selection)?;
        }
        Ok(())
    }

    /// Validate one link declaration
    ///
    /// # Errors
    ///
    /// Returns error on empty endpoints or empty field names
    pub fn validate_link(&self, link: &Link) -> CompositionResult<()> {
        check_id("link.source", &link.source)?;
        check_id("link.target", &link.target)?;
        // Loop suppression stops a self link at the origin.
        if link.source == link.target {
            warn!(link = %link, "self link");
        }
        for (name, field) in [("link.sourceField", &link.source_field), ("link.targetField", &link.target_field)] {
            if field.as_deref().is_some_and(|f| f.trim().is_empty()) {
                return Err(CompositionError::validation(name, "field name must not be empty"));
            }
        }
        Ok(())
    }

    /// Validate a layout descriptor
    ///
    /// # Errors
    ///
    /// Returns error if grid bounds are out of range
    pub fn validate_layout(&self, layout: &Layout) -> CompositionResult<()> {
        layout
            .check_bounds()
            .map_err(|reason| CompositionError::validation("layout", reason))
    }

    /// Validate a single patch op
    ///
    /// # Errors
    ///
    /// Returns error if the op's payload fails structural checks
    pub fn validate_op(&self, op: &PatchOp) -> CompositionResult<()> {
        match op {
            PatchOp::AddPanel { panel, after } => {
                self.validate_panel(panel)?;
                if let Some(anchor) = after {
                    check_id("after", anchor)?;
                }
                Ok(())
            }
            PatchOp::RemovePanel { panel_id }
            | PatchOp::ShowPanel { panel_id, .. }
            | PatchOp::CollapsePanel { panel_id, .. }
            | PatchOp::SetLoading { panel_id, .. }
            | PatchOp::SetError { panel_id, .. } => check_id("panelId", panel_id),
            PatchOp::UpdatePanel {
                panel_id,
                action,
                target_field,
                ..
            } => {
                check_id("panelId", panel_id)?;
                if target_field.as_deref().is_some_and(|f| f.trim().is_empty()) {
                    return Err(CompositionError::validation(
                        "targetField",
                        format!("empty target field for {:?}", action),
                    ));
                }
                if *action == UpdateAction::Merge && target_field.is_some() {
                    warn!(panel = %panel_id, "targetField is ignored by merge");
                }
                Ok(())
            }
            PatchOp::UpdateLayout { layout } => self.validate_layout(layout),
            PatchOp::AddLink { link } => self.validate_link(link),
            PatchOp::RemoveLink { source, target } => {
                check_id("source", source)?;
                check_id("target", target)
            }
        }
    }

    /// Validate a whole dashboard, collecting every problem
    ///
    /// # Errors
    ///
    /// Returns all errors found
    pub fn validate_dashboard(&self, dashboard: &DashboardV2) -> Result<(), Vec<CompositionError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.validate_layout(&dashboard.layout) {
            errors.push(e);
        }

        if self.max_panels > 0 && dashboard.panels.len() > self.max_panels {
            errors.push(CompositionError::validation(
                "panels",
                format!("{} panels exceeds max {}", dashboard.panels.len(), self.max_panels),
            ));
        }

        let mut seen: IndexSet<&PanelId> = IndexSet::new();
        for panel in &dashboard.panels {
            if let Err(e) = self.validate_panel(panel) {
                errors.push(e);
            }
            if !seen.insert(&panel.id) {
                errors.push(CompositionError::DuplicateId {
                    id: panel.id.to_string(),
                });
            }
        }

        for link in &dashboard.links {
            if let Err(e) = self.validate_link(link) {
                errors.push(e);
                continue;
            }
            // Dangling links are inert, not invalid.
            if !seen.contains(&link.source) || !seen.contains(&link.target) {
                warn!(link = %link, "link references an undeclared panel");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_id(field: &str, id: &PanelId) -> CompositionResult<()> {
    if id.is_empty() {
        return Err(CompositionError::validation(field, "panel id must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPreset;
    use crate::link::LinkType;
    use serde_json::Map;

    #[test]
    fn test_validator_new() {
        let validator = SchemaValidator::new();
        assert!(validator.require_view);
        assert_eq!(validator.max_panels, 0);
    }

    #[test]
    fn test_validate_panel_requires_view() {
        let validator = SchemaValidator::new();
        let mut panel = PanelSpec::new("a", "map");
        assert!(validator.validate_panel(&panel).is_ok());

        panel.view_type = None;
        assert!(validator.validate_panel(&panel).is_err());
        assert!(validator
            .clone()
            .with_require_view(false)
            .validate_panel(&panel)
            .is_ok());
    }

    #[test]
    fn test_validate_panel_empty_id() {
        let validator = SchemaValidator::new();
        assert!(validator.validate_panel(&PanelSpec::new("", "map")).is_err());
    }

    #[test]
    fn test_validate_link() {
        let validator = SchemaValidator::new();
        assert!(validator
            .validate_link(&Link::new("a", "b", LinkType::Selection))
            .is_ok());
        assert!(validator
            .validate_link(&Link::new("a", "b", LinkType::Selection).with_fields("", "id"))
            .is_err());
    }

    #[test]
    fn test_validate_op_layout_bounds() {
        let validator = SchemaValidator::new();
        let op = PatchOp::UpdateLayout {
            layout: Layout::grid(20),
        };
        assert!(matches!(
            validator.validate_op(&op),
            Err(CompositionError::Validation { .. })
        ));
        let op = PatchOp::UpdateLayout {
            layout: Layout::Preset(LayoutPreset::Tabs),
        };
        assert!(validator.validate_op(&op).is_ok());
    }

    #[test]
    fn test_validate_op_update_panel_empty_target_field() {
        let validator = SchemaValidator::new();
        let op = PatchOp::UpdatePanel {
            panel_id: PanelId::from("a"),
            action: UpdateAction::Replace,
            data: Map::new(),
            target_field: Some(" ".to_string()),
        };
        assert!(validator.validate_op(&op).is_err());
    }

    #[test]
    fn test_validate_dashboard_collects_errors() {
        let validator = SchemaValidator::new().with_max_panels(2);
        let dashboard = DashboardV2::new(Layout::grid(0))
            .with_panel(PanelSpec::new("a", "map"))
            .with_panel(PanelSpec::new("a", "chart"))
            .with_panel(PanelSpec::new("c", "chart"))
            .with_link(Link::new("a", "", LinkType::Filter));

        let errors = validator.validate_dashboard(&dashboard).unwrap_err();
        // layout, panel count, duplicate id, empty link target
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .any(|e| matches!(e, CompositionError::DuplicateId { id } if id == "a")));
    }

    #[test]
    fn test_validate_self_link_is_accepted() {
        let validator = SchemaValidator::new();
        let link = Link::new("a", "a", LinkType::Update);
        assert!(validator.validate_link(&link).is_ok());
        assert!(validator.validate_op(&PatchOp::AddLink { link }).is_ok());

        let dashboard = DashboardV2::new(Layout::default())
            .with_panel(PanelSpec::new("a", "map"))
            .with_link(Link::new("a", "a", LinkType::Selection));
        assert!(validator.validate_dashboard(&dashboard).is_ok());
    }

    #[test]
    fn test_validate_dashboard_tolerates_dangling_links() {
        let validator = SchemaValidator::new();
        let dashboard = DashboardV2::new(Layout::default())
            .with_panel(PanelSpec::new("a", "map"))
            .with_link(Link::new("a", "ghost", LinkType::Selection));
        assert!(validator.validate_dashboard(&dashboard).is_ok());
    }
}
