//! Resolution of a panel's view reference to a renderer URL.
//!
//! Priority: explicit `viewUrl`, then the payload's custom registry, then
//! the built-in table, then a URL derived from the view type.

use crate::panel::PanelSpec;
use indexmap::IndexMap;
use tessera_core::{CompositionError, CompositionResult};

/// Default renderer host
pub const DEFAULT_CDN_BASE: &str = "https://mcp-views.chukai.io";

/// View types shipped with the renderer catalogue
pub const BUILT_IN_VIEWS: &[&str] = &[
    "map", "datatable", "chart", "form", "markdown", "video", "pdf", "dashboard", "split", "tabs",
    "detail", "counter", "code", "progress", "confirm", "json", "status", "compare", "gallery",
    "ranked", "poll", "quiz", "chat", "image", "log", "timeline", "tree", "alert", "diff", "embed",
    "filter", "kanban", "settings", "stepper", "gauge", "heatmap", "crosstab", "scatter", "boxplot",
    "timeseries", "treemap", "sunburst", "pivot", "profile", "audio", "carousel", "terminal",
    "gis-legend", "layers", "minimap", "spectrogram",
];

/// Maps view types to renderer URLs
#[derive(Debug, Clone)]
pub struct ViewResolver {
    cdn_base: String,
    custom: IndexMap<String, String>,
}

impl ViewResolver {
    /// Create a resolver against the default host
    #[must_use]
    pub fn new() -> Self {
        Self {
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            custom: IndexMap::new(),
        }
    }

    /// Use a different renderer host
    #[must_use]
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.cdn_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Add custom viewType -> URL overrides
    #[must_use]
    pub fn with_registry(mut self, registry: &IndexMap<String, String>) -> Self {
        self.custom
            .extend(registry.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Whether a view type ships built in
    #[must_use]
    pub fn is_built_in(view_type: &str) -> bool {
        BUILT_IN_VIEWS.contains(&view_type)
    }

    /// Resolve a panel's renderer URL
    ///
    /// # Errors
    ///
    /// Returns error if the panel has neither `viewUrl` nor `viewType`
    pub fn resolve(&self, panel: &PanelSpec) -> CompositionResult<String> {
        if let Some(url) = &panel.view_url {
            return Ok(url.clone());
        }
        let view_type = panel.view_type.as_deref().ok_or_else(|| {
            CompositionError::validation(
                format!("panel {}", panel.id),
                "panel must have either viewUrl or viewType",
            )
        })?;
        if let Some(url) = self.custom.get(view_type) {
            return Ok(url.clone());
        }
        // Built-in and unknown types share the same URL scheme.
        Ok(format!("{}/{}/v1", self.cdn_base, view_type))
    }
}

impl Default for ViewResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_view_url() {
        let mut panel = PanelSpec::new("a", "map");
        panel.view_url = Some("https://example.test/custom-map".to_string());
        let resolver = ViewResolver::new();
        assert_eq!(resolver.resolve(&panel).unwrap(), "https://example.test/custom-map");
    }

    #[test]
    fn test_resolve_custom_registry() {
        let mut registry = IndexMap::new();
        registry.insert("map".to_string(), "https://example.test/map".to_string());
        let resolver = ViewResolver::new().with_registry(&registry);
        let panel = PanelSpec::new("a", "map");
        assert_eq!(resolver.resolve(&panel).unwrap(), "https://example.test/map");
    }

    #[test]
    fn test_resolve_built_in_and_fallback() {
        let resolver = ViewResolver::new().with_cdn_base("https://cdn.test/");
        assert_eq!(
            resolver.resolve(&PanelSpec::new("a", "gauge")).unwrap(),
            "https://cdn.test/gauge/v1"
        );
        assert!(ViewResolver::is_built_in("gauge"));
        assert!(!ViewResolver::is_built_in("orrery"));
        assert_eq!(
            resolver.resolve(&PanelSpec::new("b", "orrery")).unwrap(),
            "https://cdn.test/orrery/v1"
        );
    }

    #[test]
    fn test_resolve_missing_view() {
        let mut panel = PanelSpec::new("a", "map");
        panel.view_type = None;
        assert!(ViewResolver::new().resolve(&panel).is_err());
    }
}
