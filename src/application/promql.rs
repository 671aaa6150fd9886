// PromQL parsing - expands dashboard variables then checks the grammar
use crate::application::variables::{expand_variables, ExpansionError};
use crate::domain::dashboard::Template;
use promql_parser::parser::{self, Expr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("could not expand variables: {0}")]
    Expansion(#[from] ExpansionError),
    #[error("{0}")]
    Parse(String),
}

/// Parse a target expression as it would be sent to Prometheus. Only the
/// grammar is checked; metric and label names are not inspected.
pub fn parse_promql(expr: &str, templates: &[Template]) -> Result<Expr, QueryError> {
    let expanded = expand_variables(expr, templates)?;
    tracing::trace!(expr, expanded = %expanded, "expanded PromQL query");
    parser::parse(&expanded).map_err(QueryError::Parse)
}
