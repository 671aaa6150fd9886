// Dashboard loader - reads Grafana dashboard JSON from disk
use crate::domain::dashboard::Dashboard;
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_dashboard(path: &Path) -> Result<Dashboard> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dashboard {}", path.display()))?;

    parse_dashboard(&raw).with_context(|| format!("Failed to parse dashboard {}", path.display()))
}

/// Accepts a bare dashboard or the `{"dashboard": {...}, "meta": {...}}`
/// envelope returned by the Grafana HTTP API.
pub fn parse_dashboard(raw: &str) -> Result<Dashboard> {
    let mut document: serde_json::Value =
        serde_json::from_str(raw).context("Dashboard is not valid JSON")?;

    let body = if document.get("dashboard").is_some_and(|d| d.is_object()) {
        document["dashboard"].take()
    } else {
        document
    };

    serde_json::from_value(body).context("Unexpected dashboard structure")
}
