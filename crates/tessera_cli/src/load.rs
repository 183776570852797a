//! File loading for the CLI.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tessera_link::{EventKind, InitialState};
use tessera_patch::{Composition, CompositionConfig};
use tessera_schema::Dashboard;
use tracing::debug;

/// Read and parse a JSON file
pub fn read_json(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "reading");
    let text = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}

/// Load session config, or defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<CompositionConfig> {
    match path {
        Some(path) => {
            let value = read_json(path)?;
            serde_json::from_value(value).wrap_err_with(|| format!("invalid config {}", path.display()))
        }
        None => Ok(CompositionConfig::default()),
    }
}

/// Load initial cross-view state, or none when no file is given
pub fn load_state(path: Option<&Path>) -> Result<InitialState> {
    match path {
        Some(path) => {
            let value = read_json(path)?;
            serde_json::from_value(value).wrap_err_with(|| format!("invalid initial state {}", path.display()))
        }
        None => Ok(InitialState::default()),
    }
}

/// Seed a composition from a dashboard file and initial state
pub fn load_composition(path: &Path, state: &InitialState, config: CompositionConfig) -> Result<Composition> {
    let value = read_json(path)?;
    let dashboard = Dashboard::from_value(&value).wrap_err_with(|| format!("not a dashboard {}", path.display()))?;
    Composition::from_dashboard_with_state(dashboard, state, config)
        .wrap_err_with(|| format!("loading dashboard {}", path.display()))
}

/// Parse a command-line value as JSON, falling back to a plain string
#[must_use]
pub fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Parse an event kind name (`select` is accepted for `selection`)
pub fn parse_kind(text: &str) -> Result<EventKind> {
    serde_json::from_value(Value::String(text.to_ascii_lowercase()))
        .wrap_err_with(|| format!("unknown event kind {text:?}"))
}
