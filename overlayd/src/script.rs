//! # Session Script Parser
//!
//! Scripted editor sessions for deterministic demos and tests.
//!
//! ## Format
//!
//! One step per line:
//! - `open <path>`: Open a real file (single-click preview)
//! - `toggle`: Run `toggleRedirect`
//! - `redirect`: Run `redirectActive`
//! - `wait <ms>`: Advance the clock (`550`, `550ms`, or `2s`)
//! - `edit <text>`: Replace the active buffer; `\n`, `\t` and `\\` are unescaped
//! - `save`: Save the active buffer
//! - `close`: Close the active tab
//! - `status`: Record the status labels
//! - `# comment`: Ignored, as are blank lines
//!
//! ## Example
//!
//! ```text
//! open src/a.js
//! toggle
//! wait 600
//! edit let x = 2;\n
//! save
//! ```

use thiserror::Error;

/// Script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown step at line {line}: {step}")]
    UnknownStep { line: usize, step: String },

    #[error("Missing argument for '{step}' at line {line}")]
    MissingArgument { line: usize, step: String },

    #[error("Unexpected argument for '{step}' at line {line}")]
    UnexpectedArgument { line: usize, step: String },

    #[error("Invalid delay at line {line}: {value}")]
    InvalidDelay { line: usize, value: String },

    #[error("Empty script")]
    EmptyScript,
}

/// A single session step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Open(String),
    Toggle,
    Redirect,
    Wait(u64),
    Edit(String),
    Save,
    Close,
    Status,
}

/// Parsed session script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScript {
    steps: Vec<Step>,
}

impl SessionScript {
    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            steps.push(Self::parse_line(trimmed, index + 1)?);
        }

        if steps.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        Ok(Self { steps })
    }

    /// Returns the steps in order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Step, ScriptError> {
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let missing = || ScriptError::MissingArgument {
            line: line_num,
            step: name.to_string(),
        };
        let bare = |step: Step| {
            if rest.is_empty() {
                Ok(step)
            } else {
                Err(ScriptError::UnexpectedArgument {
                    line: line_num,
                    step: name.to_string(),
                })
            }
        };

        match name {
            "open" if rest.is_empty() => Err(missing()),
            "open" => Ok(Step::Open(rest.to_string())),
            "edit" if rest.is_empty() => Err(missing()),
            "edit" => Ok(Step::Edit(unescape(rest))),
            "wait" if rest.is_empty() => Err(missing()),
            "wait" => parse_delay(rest)
                .map(Step::Wait)
                .ok_or_else(|| ScriptError::InvalidDelay {
                    line: line_num,
                    value: rest.to_string(),
                }),
            "toggle" => bare(Step::Toggle),
            "redirect" => bare(Step::Redirect),
            "save" => bare(Step::Save),
            "close" => bare(Step::Close),
            "status" => bare(Step::Status),
            other => Err(ScriptError::UnknownStep {
                line: line_num,
                step: other.to_string(),
            }),
        }
    }
}

/// Parses `550`, `550ms`, or `2s` into milliseconds
fn parse_delay(value: &str) -> Option<u64> {
    let value = value.trim().to_lowercase();
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse().ok();
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.trim().parse::<u64>().ok()?.checked_mul(1000);
    }
    value.parse().ok()
}

/// Expands `\n`, `\t`, and `\\`; other escapes are kept as written
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
