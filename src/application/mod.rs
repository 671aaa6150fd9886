// Application layer - lint rules and the query checks they rely on
pub mod promql;
pub mod rule;
pub mod target_promql_rule;
pub mod variables;
