// Template variable expansion - turns Grafana placeholders into parseable PromQL
use crate::domain::dashboard::Template;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `$name`, `[[name]]`, `[[name:format]]`, `${name}`, `${name.field}` and
/// `${name:format}`, matching the forms Grafana itself interpolates.
static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\w+)|\[\[(\w+?)(?::(\w+))?\]\]|\$\{(\w+)(?:\.([^:\}]+))?(?::([^\}]+))?\}")
        .unwrap()
});

static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(ms|s|m|h|d|w|y))+$").unwrap());

static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").unwrap());

static OFFSET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\boffset\s*-?\s*$").unwrap());

/// Text ending where the first argument of a function or aggregation that
/// takes a scalar parameter begins, or right after an `@` modifier.
static SCALAR_PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\b(topk|bottomk|limitk|limit_ratio|quantile|quantile_over_time|histogram_quantile)\s*((by|without)\s*\([^)]*\)\s*)?\(\s*|@\s*)$",
    )
    .unwrap()
});

// Words that change the meaning of the surrounding expression if a variable
// value is dropped in unquoted
const PROMQL_KEYWORDS: &[&str] = &[
    "and", "or", "unless", "atan2", "by", "without", "on", "ignoring", "group_left",
    "group_right", "bool", "offset", "start", "end",
];

/// Grafana's built-in variables with a fixed stand-in value each.
const GLOBAL_VARIABLES: &[(&str, &str)] = &[
    ("__interval", "1m"),
    ("__interval_ms", "60000"),
    ("__rate_interval", "5m"),
    ("__rate_interval_ms", "300000"),
    ("__range", "1d"),
    ("__range_s", "86400"),
    ("__range_ms", "86400000"),
    ("__from", "1700000000000"),
    ("__to", "1700086400000"),
    ("__org", "1"),
    ("__user", "1"),
    ("__dashboard", "dashboard"),
    ("__name", "name"),
    ("__timezone", "utc"),
];

const AUTO_INTERVAL_PREFIX: &str = "__auto_interval_";
const AUTO_INTERVAL_VALUE: &str = "1m";
const DEFAULT_RANGE: &str = "5m";
const DEFAULT_SCALAR: &str = "1";

/// Where a token sits in the surrounding query, which decides what kind of
/// literal keeps the grammar intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Range,
    Offset,
    Scalar,
    Expression,
}

impl Position {
    fn of(preceding: &str, bracket_depth: usize) -> Self {
        if bracket_depth > 0 {
            Position::Range
        } else if OFFSET_REGEX.is_match(preceding) {
            Position::Offset
        } else if SCALAR_PARAM_REGEX.is_match(preceding) {
            Position::Scalar
        } else {
            Position::Expression
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("unknown global variable '{0}'")]
    UnknownGlobal(String),
    #[error("variable '{0}' is not declared in the dashboard templating")]
    UndeclaredVariable(String),
}

enum Segment<'a> {
    Code(&'a str),
    Literal(&'a str),
}

/// Replace every variable reference outside string literals with a value that
/// keeps the query syntactically valid. The result is built in one pass, so a
/// substituted value is never scanned again.
pub fn expand_variables(expr: &str, templates: &[Template]) -> Result<String, ExpansionError> {
    let mut expanded = String::with_capacity(expr.len());
    let mut bracket_depth = 0usize;

    for segment in split_literals(expr) {
        let code = match segment {
            Segment::Literal(text) => {
                expanded.push_str(text);
                continue;
            }
            Segment::Code(text) => text,
        };

        let mut cursor = 0;
        for caps in VARIABLE_REGEX.captures_iter(code) {
            let Some(token) = caps.get(0) else { continue };
            let before = &code[cursor..token.start()];
            bracket_depth = track_brackets(bracket_depth, before);
            expanded.push_str(before);

            let name = [1, 2, 4]
                .iter()
                .find_map(|&group| caps.get(group))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let position = Position::of(&expanded, bracket_depth);
            expanded.push_str(&substitute(name, position, templates)?);
            cursor = token.end();
        }

        let rest = &code[cursor..];
        bracket_depth = track_brackets(bracket_depth, rest);
        expanded.push_str(rest);
    }

    Ok(expanded)
}

fn substitute(name: &str, position: Position, templates: &[Template]) -> Result<String, ExpansionError> {
    if name.starts_with(AUTO_INTERVAL_PREFIX) {
        return Ok(AUTO_INTERVAL_VALUE.to_string());
    }
    if name.starts_with("__") {
        return GLOBAL_VARIABLES
            .iter()
            .find(|(global, _)| *global == name)
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| ExpansionError::UnknownGlobal(name.to_string()));
    }

    let template = templates
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| ExpansionError::UndeclaredVariable(name.to_string()))?;
    let current = template.current_value();

    let value = match position {
        Position::Range | Position::Offset => current
            .filter(|v| DURATION_REGEX.is_match(v))
            .unwrap_or(DEFAULT_RANGE)
            .to_string(),
        Position::Scalar => current
            .filter(|v| NUMBER_REGEX.is_match(v))
            .unwrap_or(DEFAULT_SCALAR)
            .to_string(),
        Position::Expression => current
            .filter(|v| NUMBER_REGEX.is_match(v) || is_identifier(v))
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_identifier(name)),
    };
    Ok(value)
}

fn is_identifier(s: &str) -> bool {
    IDENTIFIER_REGEX.is_match(s) && !PROMQL_KEYWORDS.contains(&s.to_ascii_lowercase().as_str())
}

fn placeholder_identifier(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("var_{}", name)
    }
}

fn track_brackets(depth: usize, text: &str) -> usize {
    text.chars().fold(depth, |depth, c| match c {
        '[' => depth + 1,
        ']' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Split a query into code and string literals. Literals keep their quotes;
/// an unterminated literal runs to the end of the input.
fn split_literals(expr: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in expr.char_indices() {
        match quote {
            None if matches!(c, '"' | '\'' | '`') => {
                if start < i {
                    segments.push(Segment::Code(&expr[start..i]));
                }
                start = i;
                quote = Some(c);
            }
            None => {}
            Some(_) if escaped => escaped = false,
            Some(q) if c == '\\' && q != '`' => escaped = true,
            Some(q) if c == q => {
                segments.push(Segment::Literal(&expr[start..i + c.len_utf8()]));
                start = i + c.len_utf8();
                quote = None;
            }
            Some(_) => {}
        }
    }

    if start < expr.len() {
        let rest = &expr[start..];
        segments.push(if quote.is_some() {
            Segment::Literal(rest)
        } else {
            Segment::Code(rest)
        });
    }

    segments
}
