//! Fixed configuration
//!
//! The rule set and the tracked extensions are compile-time constants. They
//! are serializable so the daemon can print them, but nothing reads them
//! from disk.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Extensions eligible for automatic redirection
pub const TRACKED_EXTENSIONS: &[&str] = &["js", "ts", "mjs", "cjs", "mts", "cts"];

/// Period of the redirect poller, in milliseconds
pub const POLL_INTERVAL_MS: u64 = 550;

/// How long a transient status label stays up, in milliseconds
pub const TRANSIENT_LABEL_MS: u64 = 2000;

/// Returns true if `extension` is tracked (case-sensitive)
pub fn is_tracked_extension(extension: &str) -> bool {
    TRACKED_EXTENSIONS.contains(&extension)
}

/// Quote style for string literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `"text"`
    Double,
    /// `'text'`
    Single,
}

impl QuoteStyle {
    /// Returns the quote character
    pub fn quote_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }

    /// Returns the rule name used in messages
    pub fn name(self) -> &'static str {
        match self {
            QuoteStyle::Double => "doublequote",
            QuoteStyle::Single => "singlequote",
        }
    }
}

/// Placement of block braces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceStyle {
    /// Opening brace on its own line
    Allman,
    /// Opening brace on the line of its controlling statement
    #[serde(rename = "1tbs")]
    OneTrueBrace,
}

/// Formatting rule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Spaces per indentation level
    pub indent_width: usize,
    /// Whether statements must end with `;`
    pub semicolons: bool,
    /// Required quote style
    pub quotes: QuoteStyle,
    /// Required brace placement
    pub brace_style: BraceStyle,
    /// Name of the base rule set the overrides apply to
    pub base_rule_set: Cow<'static, str>,
}

impl RuleConfig {
    /// The rule set used by both the read and the write path
    pub const FIXED: RuleConfig = RuleConfig {
        indent_width: 4,
        semicolons: true,
        quotes: QuoteStyle::Double,
        brace_style: BraceStyle::Allman,
        base_rule_set: Cow::Borrowed("standard-with-typescript"),
    };
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::FIXED
    }
}
