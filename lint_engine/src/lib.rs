//! # Lint Engine
//!
//! This crate provides the style engine used on both sides of the overlay:
//! auto-fix on read and verify-only on write.
//!
//! ## Philosophy
//!
//! - **One pass, two answers**: the same layout walk produces the fixed
//!   text and the list of findings
//! - **Fixed point**: fixing clean text returns it unchanged, and fixed
//!   text verifies clean
//! - **Explicit configuration**: rules arrive as a [`RuleConfig`] value,
//!   never from files on disk
//! - **Trait seam**: callers depend on [`LintEngine`], not on the concrete
//!   [`StyleEngine`]

pub mod engine;
mod layout;
mod rules;
pub mod token;

pub use engine::{StyleEngine, LINTABLE_EXTENSIONS};

use overlay_types::{Diagnostic, FixReport, RuleConfig};
use serde::{Deserialize, Serialize};

/// Source dialect, derived from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    /// Picks the dialect from a path's extension
    ///
    /// Unknown extensions are treated as TypeScript, which accepts a
    /// superset of JavaScript.
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("js" | "mjs" | "cjs" | "jsx") => Language::JavaScript,
            _ => Language::TypeScript,
        }
    }
}

/// Options for a verify-only run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    /// Path used for ignore matching and dialect selection
    pub file_path: String,
    /// Report ignored files as a warning instead of returning no results
    pub warn_ignored: bool,
    /// Rules to check against
    pub config: RuleConfig,
}

impl LintOptions {
    /// Creates options for `file_path` with the fixed rule set
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            warn_ignored: true,
            config: RuleConfig::FIXED,
        }
    }
}

/// Result of linting one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    /// Path the text was linted as
    pub file_path: String,
    /// Findings
    pub diagnostics: Vec<Diagnostic>,
    /// Fixed text, when the run was asked to fix
    pub output: Option<String>,
}

/// Style engine interface
///
/// Implementations must be deterministic for a given input and
/// configuration.
pub trait LintEngine {
    /// Fixes `text` in memory and reports what could not be fixed
    fn verify_and_fix(&self, text: &str, config: &RuleConfig, filename: &str) -> FixReport;

    /// Checks `text` without modifying it
    ///
    /// Returns one result per linted text. Ignored files yield no results,
    /// or a single warning result when `options.warn_ignored` is set.
    fn lint_text(&self, text: &str, options: &LintOptions) -> Vec<LintResult>;
}
