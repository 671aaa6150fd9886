// PromQL target rule - validates every query target of Prometheus dashboards
use crate::application::promql::parse_promql;
use crate::application::rule::TargetRule;
use crate::domain::dashboard::{Dashboard, Panel, Target};
use crate::domain::lint::LintResult;

pub const NAME: &str = "target-promql-rule";
pub const DESCRIPTION: &str = "Checks that each target uses a valid PromQL query.";

/// Checks that a target's query is valid PromQL once dashboard variables are
/// expanded, and that a target reusing another panel's query points at a
/// panel that exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetPromQlRule;

impl TargetRule for TargetPromQlRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn lint_target(&self, dashboard: &Dashboard, panel: &Panel, target: &Target) -> LintResult {
        // A missing or foreign datasource template is reported by another rule
        if !dashboard
            .template_datasource()
            .is_some_and(|t| t.is_prometheus_datasource())
        {
            return LintResult::success();
        }

        if !panel.has_queries() {
            tracing::trace!(panel = %panel.title, kind = %panel.kind, "panel type not checked");
            return LintResult::success();
        }

        if target.expr.trim().is_empty() {
            return check_panel_reference(dashboard, panel, target);
        }

        match parse_promql(&target.expr, &dashboard.templating.list) {
            Ok(_) => LintResult::success(),
            Err(err) => LintResult::error(format!(
                "Dashboard '{}', panel '{}' invalid PromQL query '{}': {}",
                dashboard.title, panel.title, target.expr, err
            )),
        }
    }
}

fn check_panel_reference(dashboard: &Dashboard, panel: &Panel, target: &Target) -> LintResult {
    if target.panel_id <= 0 {
        return LintResult::error(format!(
            "Dashboard '{}', panel '{}' empty PromQL query in target '{}'",
            dashboard.title, panel.title, target.ref_id
        ));
    }

    if dashboard.find_panel(target.panel_id).is_some() {
        return LintResult::success();
    }

    LintResult::error(format!(
        "Dashboard '{}', panel '{}' invalid panel reference in target, reference panel id '{}'",
        dashboard.title, panel.title, target.panel_id
    ))
}
