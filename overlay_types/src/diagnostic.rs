//! Diagnostics and lint reports

use core::fmt;
use serde::{Deserialize, Serialize};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Advisory finding (e.g. the file is ignored by the engine)
    Warning,
    /// Rule violation
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Rule that produced the finding (`None` for parse errors and notices)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Severity
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates an error-level diagnostic
    ///
    /// Positions are clamped to 1 so a diagnostic always points somewhere.
    pub fn error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: line.max(1),
            column: column.max(1),
            rule_id: None,
            severity: Severity::Error,
        }
    }

    /// Creates a warning-level diagnostic
    pub fn warning(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message, line, column)
        }
    }

    /// Sets the rule id
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {} {}", self.line, self.column, self.severity, self.message)?;
        if let Some(rule) = &self.rule_id {
            write!(f, " ({})", rule)?;
        }
        Ok(())
    }
}

/// Result of a verify-and-fix pass
///
/// `output` is always usable; `diagnostics` lists what the fixer could not
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixReport {
    /// Unresolved findings
    pub diagnostics: Vec<Diagnostic>,
    /// Fixed text
    pub output: String,
}

impl FixReport {
    /// Returns true if the output conforms to every rule
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Result of a verify-only pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every finding; any entry rejects the content
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Returns true if the content may be committed
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Formats diagnostics as one user-facing message
///
/// Each entry is the message followed by `line:column` on its own line;
/// entries are separated by a blank line.
pub fn aggregate_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{}\n{}:{}\n", d.message, d.line, d.column))
        .collect::<Vec<_>>()
        .join("\n")
}
