use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG: &str = "config/dashlint";
const ENV_PREFIX: &str = "DASHLINT";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LintConfig {
    /// Log filter used when `RUST_LOG` is not set, e.g. "info,dashlint=debug"
    #[serde(default)]
    pub log_level: Option<String>,
    /// Rule names to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Load settings from `path`, or from the optional `config/dashlint` file when
/// no path is given, with `DASHLINT_*` environment variables on top.
pub fn load_lint_config(path: Option<&Path>) -> anyhow::Result<LintConfig> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("exclude"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
