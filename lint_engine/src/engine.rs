//! Style engine
//!
//! Concrete [`LintEngine`] backed by the lexer and the layout pass.

use crate::layout::layout;
use crate::token::tokenize;
use crate::{Language, LintEngine, LintOptions, LintResult};
use overlay_types::{Diagnostic, FixReport, RuleConfig};

/// Extensions the engine knows how to lint
pub const LINTABLE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts", "cts"];

/// Style engine
pub struct StyleEngine {
    ignore_segments: Vec<String>,
}

impl StyleEngine {
    /// Creates an engine that ignores `node_modules`
    pub fn new() -> Self {
        Self {
            ignore_segments: vec!["node_modules".to_string()],
        }
    }

    /// Adds a directory name whose contents are ignored
    pub fn with_ignored_directory(mut self, name: impl Into<String>) -> Self {
        self.ignore_segments.push(name.into());
        self
    }

    /// Returns the reason `path` is ignored, if it is
    pub fn ignore_reason(&self, path: &str) -> Option<&'static str> {
        let normalized = path.replace('\\', "/");
        let mut segments: Vec<&str> = normalized.split('/').collect();
        let file_name = segments.pop().unwrap_or("");

        if segments
            .iter()
            .any(|segment| self.ignore_segments.iter().any(|ignored| ignored == segment))
        {
            return Some(
                "File ignored because of a matching ignore pattern. Use \"--no-ignore\" to override.",
            );
        }

        let lintable = file_name
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && LINTABLE_EXTENSIONS.contains(&ext));
        if !lintable {
            return Some("File ignored because no matching configuration was supplied.");
        }
        None
    }

    /// Runs the full check and returns fixed text plus findings
    fn check(
        &self,
        text: &str,
        config: &RuleConfig,
        filename: &str,
    ) -> Result<(String, Vec<Diagnostic>), Diagnostic> {
        let language = Language::from_path(filename);
        let lexed = tokenize(text).map_err(|err| {
            Diagnostic::error(format!("Parsing error: {}", err.message), err.line, err.column)
        })?;
        let laid = layout(&lexed, config, language)?;
        let mut findings = laid.findings;
        findings.sort_by_key(|d| (d.line, d.column));
        Ok((laid.output, findings))
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LintEngine for StyleEngine {
    fn verify_and_fix(&self, text: &str, config: &RuleConfig, filename: &str) -> FixReport {
        match self.check(text, config, filename) {
            Ok((output, findings)) => {
                tracing::debug!(
                    target: "lint::engine",
                    file = filename,
                    fixed = findings.len(),
                    "verify_and_fix"
                );
                FixReport {
                    diagnostics: Vec::new(),
                    output,
                }
            }
            Err(parse_error) => {
                tracing::debug!(
                    target: "lint::engine",
                    file = filename,
                    error = %parse_error.message,
                    "verify_and_fix left text unchanged"
                );
                FixReport {
                    diagnostics: vec![parse_error],
                    output: text.to_string(),
                }
            }
        }
    }

    fn lint_text(&self, text: &str, options: &LintOptions) -> Vec<LintResult> {
        if let Some(reason) = self.ignore_reason(&options.file_path) {
            tracing::debug!(target: "lint::engine", file = %options.file_path, reason, "ignored");
            if !options.warn_ignored {
                return Vec::new();
            }
            return vec![LintResult {
                file_path: options.file_path.clone(),
                diagnostics: vec![Diagnostic::warning(reason, 1, 1)],
                output: None,
            }];
        }

        let diagnostics = match self.check(text, &options.config, &options.file_path) {
            Ok((_, findings)) => findings,
            Err(parse_error) => vec![parse_error],
        };
        tracing::debug!(
            target: "lint::engine",
            file = %options.file_path,
            findings = diagnostics.len(),
            "lint_text"
        );
        vec![LintResult {
            file_path: options.file_path.clone(),
            diagnostics,
            output: None,
        }]
    }
}
