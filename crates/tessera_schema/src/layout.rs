//! Layout descriptors.
//!
//! The core stores and replaces layouts; it never computes placement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum grid columns
pub const MAX_GRID_COLUMNS: u32 = 12;

/// Layout descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Layout {
    /// One of the string presets
    Preset(LayoutPreset),
    /// A structured grid or named layout
    Structured(StructuredLayout),
}

/// String layout presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPreset {
    /// Host picks an arrangement from the panel count
    Auto,
    /// Two regions, orientation left to the host
    Split,
    /// Panels side by side
    SplitHorizontal,
    /// Panels stacked top to bottom
    SplitVertical,
    /// One panel visible at a time behind a tab strip
    Tabs,
    /// Uniform grid with host-chosen dimensions
    Grid,
}

/// Structured layouts, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuredLayout {
    /// Explicit grid
    Grid(GridLayout),
    /// Named preset arrangement
    Named {
        /// Which arrangement
        preset: NamedPreset,
    },
}

/// Explicit grid dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Columns, 1..=12
    pub columns: u32,
    /// Rows, at least 1 when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// CSS gap, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
}

/// Named arrangements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedPreset {
    /// Large map with a narrow side column
    MapSidebar,
    /// KPI strip above a chart area
    DashboardKpi,
    /// Primary view with supporting detail panels
    Investigation,
    /// Single scrolling column
    Report,
    /// Equal-width panels for side-by-side comparison
    Compare,
}

impl Layout {
    /// A grid with `columns` columns
    #[must_use]
    pub fn grid(columns: u32) -> Self {
        Self::Structured(StructuredLayout::Grid(GridLayout {
            columns,
            rows: None,
            gap: None,
        }))
    }

    /// A named arrangement
    #[must_use]
    pub fn named(preset: NamedPreset) -> Self {
        Self::Structured(StructuredLayout::Named { preset })
    }

    /// Check dimension bounds
    ///
    /// # Errors
    ///
    /// Returns a reason string if grid bounds are out of range
    pub fn check_bounds(&self) -> Result<(), String> {
        if let Self::Structured(StructuredLayout::Grid(grid)) = self {
            if grid.columns == 0 || grid.columns > MAX_GRID_COLUMNS {
                return Err(format!(
                    "grid columns must be within 1..={}, got {}",
                    MAX_GRID_COLUMNS, grid.columns
                ));
            }
            if grid.rows == Some(0) {
                return Err("grid rows must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::Preset(LayoutPreset::Auto)
    }
}

impl From<LayoutPreset> for Layout {
    fn from(preset: LayoutPreset) -> Self {
        Self::Preset(preset)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(p) => write!(f, "{:?}", p),
            Self::Structured(StructuredLayout::Grid(g)) => match g.rows {
                Some(rows) => write!(f, "grid {}x{}", g.columns, rows),
                None => write!(f, "grid {} cols", g.columns),
            },
            Self::Structured(StructuredLayout::Named { preset }) => write!(f, "named {:?}", preset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_preset_string() {
        let layout: Layout = serde_json::from_value(json!("tabs")).unwrap();
        assert_eq!(layout, Layout::Preset(LayoutPreset::Tabs));

        let layout: Layout = serde_json::from_value(json!("split-horizontal")).unwrap();
        assert_eq!(layout, Layout::Preset(LayoutPreset::SplitHorizontal));
    }

    #[test]
    fn test_layout_grid_object() {
        let layout: Layout =
            serde_json::from_value(json!({"type": "grid", "columns": 3, "rows": 2})).unwrap();
        match &layout {
            Layout::Structured(StructuredLayout::Grid(g)) => {
                assert_eq!(g.columns, 3);
                assert_eq!(g.rows, Some(2));
            }
            other => panic!("unexpected layout {:?}", other),
        }
        assert!(layout.check_bounds().is_ok());
    }

    #[test]
    fn test_layout_named_object() {
        let layout: Layout =
            serde_json::from_value(json!({"type": "named", "preset": "map-sidebar"})).unwrap();
        assert_eq!(layout, Layout::named(NamedPreset::MapSidebar));
    }

    #[test]
    fn test_layout_rejects_unknown_preset() {
        assert!(serde_json::from_value::<Layout>(json!("mosaic")).is_err());
        assert!(serde_json::from_value::<Layout>(json!({"type": "named", "preset": "x"})).is_err());
    }

    #[test]
    fn test_layout_grid_bounds() {
        assert!(Layout::grid(0).check_bounds().is_err());
        assert!(Layout::grid(13).check_bounds().is_err());
        assert!(Layout::grid(12).check_bounds().is_ok());
        let zero_rows = Layout::Structured(StructuredLayout::Grid(GridLayout {
            columns: 2,
            rows: Some(0),
            gap: None,
        }));
        assert!(zero_rows.check_bounds().is_err());
    }

    #[test]
    fn test_layout_roundtrip_shape() {
        let value = serde_json::to_value(Layout::grid(4)).unwrap();
        assert_eq!(value, json!({"type": "grid", "columns": 4}));
    }
}
