// Rule registry - pluggable per-target checks and the walk that applies them
use crate::application::target_promql_rule::TargetPromQlRule;
use crate::domain::dashboard::{Dashboard, Panel, Target};
use crate::domain::lint::LintResult;

/// A check evaluated once per (dashboard, panel, target). Rules hold no
/// per-invocation state, so one rule set can be shared across threads.
pub trait TargetRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn lint_target(&self, dashboard: &Dashboard, panel: &Panel, target: &Target) -> LintResult;
}

#[derive(Debug, Clone)]
pub struct RuleResult {
    pub rule: &'static str,
    pub panel: String,
    pub result: LintResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintSummary {
    pub checked: usize,
    pub errors: usize,
}

impl LintSummary {
    pub fn from_results(results: &[RuleResult]) -> Self {
        Self {
            checked: results.len(),
            errors: results.iter().filter(|r| r.result.is_error()).count(),
        }
    }
}

pub struct RuleSet {
    rules: Vec<Box<dyn TargetRule>>,
}

impl Default for RuleSet {
    /// Every built-in rule.
    fn default() -> Self {
        Self {
            rules: vec![Box::new(TargetPromQlRule)],
        }
    }
}

impl RuleSet {
    /// Drop rules whose name appears in `excluded`.
    pub fn without(mut self, excluded: &[String]) -> Self {
        self.rules.retain(|rule| {
            let keep = !excluded.iter().any(|name| name == rule.name());
            if !keep {
                tracing::debug!(rule = rule.name(), "rule disabled by configuration");
            }
            keep
        });
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn TargetRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Apply every rule to every target of the dashboard, in document order.
    pub fn lint(&self, dashboard: &Dashboard) -> Vec<RuleResult> {
        let mut results = Vec::new();

        for panel in dashboard.all_panels() {
            for target in &panel.targets {
                for rule in &self.rules {
                    let result = rule.lint_target(dashboard, panel, target);
                    tracing::debug!(
                        rule = rule.name(),
                        panel = %panel.title,
                        ref_id = %target.ref_id,
                        severity = %result.severity,
                        "evaluated target"
                    );
                    results.push(RuleResult {
                        rule: rule.name(),
                        panel: panel.title.clone(),
                        result,
                    });
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::target_promql_rule;
    use crate::domain::dashboard::{Template, TemplateQuery, Templating};

    struct RejectEverything;

    impl TargetRule for RejectEverything {
        fn name(&self) -> &'static str {
            "reject-everything"
        }

        fn description(&self) -> &'static str {
            "Fails every target."
        }

        fn lint_target(&self, _: &Dashboard, panel: &Panel, _: &Target) -> LintResult {
            LintResult::error(format!("rejected {}", panel.title))
        }
    }

    fn target(expr: &str) -> Target {
        Target {
            expr: expr.to_string(),
            ..Default::default()
        }
    }

    fn sample_dashboard() -> Dashboard {
        let mut row = Panel {
            id: 3,
            title: "Row".to_string(),
            kind: "row".to_string(),
            ..Default::default()
        };
        row.panels = vec![Panel {
            id: 4,
            title: "Nested".to_string(),
            kind: "graph".to_string(),
            targets: vec![target("sum(up")],
            ..Default::default()
        }];

        Dashboard {
            title: "API Health".to_string(),
            panels: vec![
                Panel {
                    id: 1,
                    title: "Requests".to_string(),
                    kind: "graph".to_string(),
                    targets: vec![target("up"), target("rate(x[$__rate_interval])")],
                    ..Default::default()
                },
                Panel {
                    id: 2,
                    title: "Latency".to_string(),
                    kind: "graph".to_string(),
                    targets: vec![Target {
                        panel_id: 1,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                row,
            ],
            rows: Vec::new(),
            templating: Templating {
                list: vec![Template {
                    name: "datasource".to_string(),
                    kind: "datasource".to_string(),
                    query: Some(TemplateQuery::Text("prometheus".to_string())),
                    current: None,
                }],
            },
        }
    }

    #[test]
    fn test_default_rules() {
        let rules = RuleSet::default();
        let names: Vec<&str> = rules.rules().map(|r| r.name()).collect();
        assert_eq!(names, vec![target_promql_rule::NAME]);
        assert!(rules.rules().all(|r| !r.description().is_empty()));
    }

    #[test]
    fn test_without() {
        let rules = RuleSet::default().without(&[target_promql_rule::NAME.to_string()]);
        assert_eq!(rules.rules().count(), 0);

        let rules = RuleSet::default().without(&["unknown-rule".to_string()]);
        assert_eq!(rules.rules().count(), 1);
    }

    #[test]
    fn test_lint_walks_all_targets() {
        let results = RuleSet::default().lint(&sample_dashboard());
        let panels: Vec<&str> = results.iter().map(|r| r.panel.as_str()).collect();
        assert_eq!(panels, vec!["Requests", "Requests", "Latency", "Nested"]);

        let errors: Vec<&RuleResult> = results.iter().filter(|r| r.result.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].panel, "Nested");
        assert!(errors[0].result.message.contains("sum(up"));

        let summary = LintSummary::from_results(&results);
        assert_eq!(summary, LintSummary { checked: 4, errors: 1 });
    }

    #[test]
    fn test_every_rule_runs_per_target() {
        let mut rules = RuleSet::default();
        rules.rules.push(Box::new(RejectEverything));

        let results = rules.lint(&sample_dashboard());
        assert_eq!(results.len(), 8);
        assert_eq!(
            results.iter().filter(|r| r.rule == "reject-everything").count(),
            4
        );
        assert_eq!(LintSummary::from_results(&results).errors, 5);
    }
}
