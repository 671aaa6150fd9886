// Lint outcome domain model
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one rule evaluated against one target. Successful results
/// carry no message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintResult {
    pub severity: Severity,
    pub message: String,
}

impl LintResult {
    pub fn success() -> Self {
        Self {
            severity: Severity::Success,
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
