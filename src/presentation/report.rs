// Plain-text reporting of lint results
use crate::application::rule::{LintSummary, RuleResult, RuleSet};
use std::fmt::Write;
use std::path::Path;

pub fn render_report(path: &Path, results: &[RuleResult], summary: &LintSummary) -> String {
    let mut out = String::new();
    for entry in results.iter().filter(|r| r.result.is_error()) {
        let _ = writeln!(
            out,
            "[{}] {} ({}): {}",
            entry.result.severity, entry.rule, entry.panel, entry.result.message
        );
    }
    let _ = writeln!(
        out,
        "{}: {} checks, {} errors",
        path.display(),
        summary.checked,
        summary.errors
    );
    out
}

pub fn render_load_error(path: &Path, err: &anyhow::Error) -> String {
    format!("[error] {}: {:#}\n", path.display(), err)
}

pub fn render_rules(rules: &RuleSet) -> String {
    rules
        .rules()
        .map(|rule| format!("{}: {}\n", rule.name(), rule.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lint::LintResult;

    fn result(panel: &str, result: LintResult) -> RuleResult {
        RuleResult {
            rule: "target-promql-rule",
            panel: panel.to_string(),
            result,
        }
    }

    #[test]
    fn test_render_report_lists_only_errors() {
        let results = vec![
            result("Requests", LintResult::success()),
            result("Latency", LintResult::error("invalid panel reference '99'")),
        ];
        let summary = LintSummary::from_results(&results);

        let report = render_report(Path::new("api.json"), &results, &summary);
        assert_eq!(
            report,
            "[error] target-promql-rule (Latency): invalid panel reference '99'\napi.json: 2 checks, 1 errors\n"
        );
    }

    #[test]
    fn test_render_load_error() {
        let err = anyhow::anyhow!("No such file").context("Failed to read dashboard api.json");
        assert_eq!(
            render_load_error(Path::new("api.json"), &err),
            "[error] api.json: Failed to read dashboard api.json: No such file\n"
        );
    }

    #[test]
    fn test_render_rules() {
        let rules = render_rules(&RuleSet::default());
        assert_eq!(
            rules,
            "target-promql-rule: Checks that each target uses a valid PromQL query.\n"
        );
    }
}
