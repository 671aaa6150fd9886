// Dashboard domain model - the subset of the Grafana document the linter reads
use serde::{Deserialize, Deserializer};

/// Panel kinds known to carry queries worth validating. Anything else is
/// skipped so unfamiliar panel types never produce false positives.
pub const ELIGIBLE_PANEL_TYPES: &[&str] = &[
    "singlestat",
    "graph",
    "table",
    "stat",
    "state-timeline",
    "timeseries",
];

pub const PROMETHEUS: &str = "prometheus";

const DATASOURCE_TEMPLATE: &str = "datasource";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dashboard {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
    /// Pre-5.0 dashboards keep their panels inside rows.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<Row>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub templating: Templating,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Templating {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<Template>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Panel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<Target>,
    /// Children of a collapsed row panel.
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Target {
    #[serde(default, deserialize_with = "null_as_default")]
    pub expr: String,
    #[serde(rename = "panelId", default, deserialize_with = "null_as_default")]
    pub panel_id: i64,
    #[serde(rename = "refId", default, deserialize_with = "null_as_default")]
    pub ref_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Template {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub query: Option<TemplateQuery>,
    #[serde(default)]
    pub current: Option<Current>,
}

/// Variable queries are plain strings in older dashboards and objects in
/// newer ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateQuery {
    Text(String),
    Structured {
        #[serde(default)]
        query: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub value: Option<CurrentValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CurrentValue {
    Single(String),
    Multi(Vec<String>),
    Other(#[allow(dead_code)] serde_json::Value),
}

impl Dashboard {
    /// The first datasource-type template, if the dashboard declares one.
    pub fn template_datasource(&self) -> Option<&Template> {
        self.templating
            .list
            .iter()
            .find(|t| t.kind == DATASOURCE_TEMPLATE)
    }

    /// Every panel in document order: top-level panels followed by their row
    /// children, then panels of legacy rows.
    pub fn all_panels(&self) -> Vec<&Panel> {
        let mut panels = Vec::new();
        for panel in &self.panels {
            collect_panels(panel, &mut panels);
        }
        for row in &self.rows {
            for panel in &row.panels {
                collect_panels(panel, &mut panels);
            }
        }
        panels
    }

    pub fn find_panel(&self, id: i64) -> Option<&Panel> {
        self.all_panels().into_iter().find(|p| p.id == id)
    }
}

fn collect_panels<'a>(panel: &'a Panel, out: &mut Vec<&'a Panel>) {
    out.push(panel);
    for child in &panel.panels {
        collect_panels(child, out);
    }
}

impl Panel {
    pub fn has_queries(&self) -> bool {
        ELIGIBLE_PANEL_TYPES.contains(&self.kind.as_str())
    }
}

impl Template {
    pub fn query_text(&self) -> &str {
        match &self.query {
            Some(TemplateQuery::Text(query)) => query.as_str(),
            Some(TemplateQuery::Structured { query }) => query.as_str(),
            None => "",
        }
    }

    pub fn is_prometheus_datasource(&self) -> bool {
        self.kind == DATASOURCE_TEMPLATE && self.query_text() == PROMETHEUS
    }

    /// The currently selected value when exactly one value is selected.
    pub fn current_value(&self) -> Option<&str> {
        match self.current.as_ref()?.value.as_ref()? {
            CurrentValue::Single(value) => Some(value.as_str()),
            CurrentValue::Multi(values) if values.len() == 1 => Some(values[0].as_str()),
            _ => None,
        }
    }
}

// Grafana writes `null` for absent ids and titles; treat it like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
