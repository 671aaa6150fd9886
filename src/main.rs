// Main entry point - configuration, logging and the lint loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::application::rule::{LintSummary, RuleSet};
use crate::infrastructure::config::{load_lint_config, LintConfig};
use crate::infrastructure::loader::load_dashboard;
use crate::presentation::cli::CommandLineArgs;
use crate::presentation::report::{render_load_error, render_report, render_rules};

fn main() -> anyhow::Result<()> {
    let args = CommandLineArgs::parse();

    // Load configuration
    let config = load_lint_config(args.config.as_deref())?;
    init_tracing(&config, args.verbose);

    let rules = RuleSet::default().without(&config.exclude);
    if args.list_rules {
        print!("{}", render_rules(&rules));
        return Ok(());
    }

    let (report, failed) = lint_files(&rules, &args.files);
    print!("{}", report);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Lint every file, carrying on past files that cannot be loaded. Returns the
/// rendered report and whether anything failed.
fn lint_files(rules: &RuleSet, paths: &[PathBuf]) -> (String, bool) {
    let mut report = String::new();
    let mut failed = false;

    for path in paths {
        let dashboard = match load_dashboard(path) {
            Ok(dashboard) => dashboard,
            Err(e) => {
                tracing::error!(path = %path.display(), "could not load dashboard: {:#}", e);
                report.push_str(&render_load_error(path, &e));
                failed = true;
                continue;
            }
        };
        tracing::info!(path = %path.display(), title = %dashboard.title, "linting dashboard");

        let results = rules.lint(&dashboard);
        let summary = LintSummary::from_results(&results);
        report.push_str(&render_report(path, &results, &summary));
        failed |= summary.errors > 0;
    }

    (report, failed)
}

fn init_tracing(config: &LintConfig, verbose: bool) {
    let fallback = match (&config.log_level, verbose) {
        (_, true) => "debug".to_string(),
        (Some(level), false) => level.clone(),
        (None, false) => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lint_files_continues_after_unreadable_file() {
        let mut good = tempfile::NamedTempFile::new().unwrap();
        write!(
            good,
            r#"{{ "title": "API Health", "panels": [{{ "id": 1, "title": "Requests", "type": "graph",
                "targets": [{{ "expr": "up" }}] }}],
                "templating": {{ "list": [{{ "name": "ds", "type": "datasource", "query": "prometheus" }}] }} }}"#
        )
        .unwrap();
        let missing = PathBuf::from("/nonexistent/dashboard.json");

        let paths = vec![missing.clone(), good.path().to_path_buf()];
        let (report, failed) = lint_files(&RuleSet::default(), &paths);

        assert!(failed);
        assert!(report.contains("/nonexistent/dashboard.json"));
        assert!(report.contains(&format!("{}: 1 checks, 0 errors", good.path().display())));
    }

    #[test]
    fn test_lint_files_clean_run() {
        let (report, failed) = lint_files(&RuleSet::default(), &[]);
        assert!(!failed);
        assert!(report.is_empty());
    }
}
