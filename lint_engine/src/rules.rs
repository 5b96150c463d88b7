//! Rule tables and finding messages
//!
//! The layout pass decides what whitespace belongs between two tokens and
//! why; this module turns a mismatch into diagnostics.

use crate::token::Token;
use overlay_types::Diagnostic;

/// Canonical whitespace between two tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gap {
    /// Tokens touch
    None,
    /// Exactly one space
    Space,
    /// `n` line breaks followed by indentation
    Newline(usize),
}

/// Why the layout chose a gap; selects the message on mismatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reason {
    FileStart,
    Comment,
    AfterLineComment,
    BeforeSeparator,
    BlockOpen,
    BlockClose,
    BlockStart,
    BlockContinuation,
    AfterBlock,
    StatementEnd,
    LineBreak,
    Generic,
    Operator(String),
    AfterOperator(String),
    Comma,
    Semicolon,
    Colon,
    BeforeColon,
    ObjectBrace,
    Keyword(String),
    FunctionParen,
    ParenInner,
    BracketInner,
    Call,
    Property,
    Unary(String),
    Spread,
    Words,
}

/// Keywords followed by a space before `(`
pub(crate) const PAREN_KEYWORDS: &[&str] = &[
    "async", "if", "for", "while", "switch", "catch", "with", "return", "typeof", "await", "yield",
    "case", "in", "of", "new", "delete", "void", "throw", "instanceof", "else", "do", "extends",
];

/// Words after which an expression operand is expected
pub(crate) const OPERATOR_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "await",
    "yield",
    "else",
    "do",
    "instanceof",
    "extends",
    "implements",
    "as",
    "satisfies",
    "keyof",
    "export",
    "default",
    "import",
    "from",
    "let",
    "const",
    "var",
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "try",
    "finally",
    "function",
    "class",
];

/// Words that can never end a statement
pub(crate) const NON_TERMINAL_KEYWORDS: &[&str] = &[
    "typeof",
    "case",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "await",
    "instanceof",
    "extends",
    "implements",
    "as",
    "satisfies",
    "keyof",
    "export",
    "default",
    "import",
    "from",
    "let",
    "const",
    "var",
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "try",
    "finally",
    "else",
    "do",
    "function",
    "class",
    "interface",
    "enum",
    "type",
    "namespace",
    "declare",
    "abstract",
    "async",
    "public",
    "private",
    "protected",
    "static",
    "readonly",
];

/// Words that continue the previous line's statement
pub(crate) const CONTINUATION_KEYWORDS: &[&str] = &[
    "else",
    "catch",
    "finally",
    "instanceof",
    "in",
    "of",
    "as",
    "extends",
    "implements",
    "satisfies",
];

/// Modifiers that do not decide what a statement is
pub(crate) const MODIFIERS: &[&str] = &[
    "export",
    "default",
    "declare",
    "abstract",
    "async",
    "public",
    "private",
    "protected",
    "static",
    "readonly",
];

/// Statement heads whose `{` opens a block
pub(crate) const BLOCK_HEADS: &[&str] = &["class", "interface", "enum", "namespace", "module"];

/// Binary and assignment operators
pub(crate) const INFIX_OPERATORS: &[&str] = &[
    "=", "==", "===", "!=", "!==", "<=", ">=", "&&", "||", "??", "*", "/", "%", "**", "&", "|",
    "^", "<<", "=>", "+=", "-=", "*=", "/=", "%=", "**=", "&=", "|=", "^=", "<<=", "&&=", "||=",
    "??=",
];

/// Returns `text` re-quoted with `target`, or `None` if it already uses it
pub(crate) fn requote(text: &str, target: char) -> Option<String> {
    let quote = text.chars().next()?;
    if quote == target || text.len() < 2 {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(text.len() + 2);
    out.push(target);
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(n) if n == quote => out.push(n),
                Some(n) => {
                    out.push('\\');
                    out.push(n);
                }
                None => out.push('\\'),
            }
        } else if c == target {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.push(target);
    Some(out)
}

/// A whitespace mismatch in front of a token
pub(crate) struct GapSite<'a> {
    pub token: &'a Token,
    pub prev_end: (usize, usize),
    pub expected: Gap,
    pub indent: usize,
    pub reason: &'a Reason,
}

fn finding(message: impl Into<String>, line: usize, column: usize, rule: &str) -> Diagnostic {
    Diagnostic::error(message, line, column).with_rule(rule)
}

fn shown(token: &Token) -> String {
    let first = token.text.lines().next().unwrap_or("");
    if first.chars().count() > 20 {
        format!("{}...", first.chars().take(20).collect::<String>())
    } else {
        first.to_string()
    }
}

/// Explains why `site.token.gap` differs from its canonical form
pub(crate) fn gap_findings(site: &GapSite<'_>) -> Vec<Diagnostic> {
    let token = site.token;
    let orig = token.gap.as_str();
    let (pl, pc) = site.prev_end;
    let (line, column) = (token.line, token.column);
    let mut out = Vec::new();

    if orig.contains('\r') {
        out.push(finding(
            "Expected linebreaks to be 'LF' but found 'CRLF'.",
            pl,
            pc,
            "linebreak-style",
        ));
    }
    let segments: Vec<&str> = orig.split('\n').collect();
    let newlines = segments.len() - 1;
    if segments[..newlines]
        .iter()
        .any(|s| s.trim_end_matches('\r').contains([' ', '\t']))
    {
        out.push(finding("Trailing spaces not allowed.", pl, pc, "no-trailing-spaces"));
    }

    match site.expected {
        Gap::Newline(lines) => {
            if newlines == 0 {
                out.push(missing_break(site.reason, token));
            } else {
                if newlines > 2 {
                    out.push(finding(
                        "More than 1 blank line not allowed.",
                        line,
                        1,
                        "no-multiple-empty-lines",
                    ));
                } else if newlines > lines {
                    out.push(finding(
                        "Block must not be padded by blank lines.",
                        line,
                        1,
                        "padded-blocks",
                    ));
                }
                let found = segments[newlines];
                if found != " ".repeat(site.indent) {
                    let amount = if found.contains('\t') {
                        let tabs = found.matches('\t').count();
                        format!("{} {}", tabs, if tabs == 1 { "tab" } else { "tabs" })
                    } else {
                        found.len().to_string()
                    };
                    out.push(finding(
                        format!(
                            "Expected indentation of {} spaces but found {}.",
                            site.indent, amount
                        ),
                        line,
                        1,
                        "indent",
                    ));
                }
            }
        }
        Gap::Space => {
            if newlines > 0 {
                out.push(unexpected_break(site.reason, token));
            } else if orig.is_empty() {
                out.push(missing_space(site.reason, token));
            } else if orig != " " {
                if orig.contains('\t') {
                    out.push(finding("Unexpected tab character.", pl, pc, "no-tabs"));
                } else {
                    out.push(finding(
                        format!("Multiple spaces found before '{}'.", shown(token)),
                        pl,
                        pc,
                        "no-multi-spaces",
                    ));
                }
            }
        }
        Gap::None => {
            if *site.reason == Reason::FileStart {
                if newlines > 0 {
                    out.push(finding(
                        "Too many blank lines at the beginning of file. Max of 0 allowed.",
                        1,
                        1,
                        "no-multiple-empty-lines",
                    ));
                } else {
                    out.push(finding(
                        "Unexpected whitespace at the beginning of file.",
                        1,
                        1,
                        "no-trailing-spaces",
                    ));
                }
            } else if newlines > 0 {
                out.push(unexpected_break(site.reason, token));
            } else {
                out.push(unexpected_space(site.reason, token, (pl, pc)));
            }
        }
    }

    if out.is_empty() {
        out.push(finding(
            format!("Unexpected whitespace before '{}'.", shown(token)),
            line,
            column,
            "no-whitespace",
        ));
    }
    out
}

fn missing_break(reason: &Reason, token: &Token) -> Diagnostic {
    let (line, column) = (token.line, token.column);
    match reason {
        Reason::BlockOpen => finding(
            "Opening curly brace appears on the same line as controlling statement.",
            line,
            column,
            "brace-style",
        ),
        Reason::BlockStart => finding(
            "Statement inside of curly braces should be on next line.",
            line,
            column,
            "brace-style",
        ),
        Reason::BlockClose => finding(
            "Closing curly brace should be on the same line as opening curly brace or on the line after the previous block.",
            line,
            column,
            "brace-style",
        ),
        Reason::BlockContinuation => finding(
            "Closing curly brace appears on the same line as the subsequent block.",
            line,
            column,
            "brace-style",
        ),
        Reason::StatementEnd | Reason::AfterBlock => finding(
            "This line has 2 statements. Maximum allowed is 1.",
            line,
            column,
            "max-statements-per-line",
        ),
        _ => finding(
            format!("Expected a line break before '{}'.", shown(token)),
            line,
            column,
            "newline-before",
        ),
    }
}

fn unexpected_break(reason: &Reason, token: &Token) -> Diagnostic {
    let (line, column) = (token.line, token.column);
    match reason {
        Reason::BlockOpen => finding(
            "Opening curly brace does not appear on the same line as controlling statement.",
            line,
            column,
            "brace-style",
        ),
        Reason::BlockContinuation => finding(
            "Closing curly brace does not appear on the same line as the subsequent block.",
            line,
            column,
            "brace-style",
        ),
        Reason::BeforeSeparator if token.text == "," => {
            finding("',' should be placed last.", line, column, "comma-style")
        }
        Reason::BeforeSeparator => finding(
            "Expected this semicolon to be at the end of the previous line.",
            line,
            column,
            "semi-style",
        ),
        _ => finding(
            format!("Unexpected line break before '{}'.", shown(token)),
            line,
            column,
            "no-unexpected-multiline",
        ),
    }
}

fn missing_space(reason: &Reason, token: &Token) -> Diagnostic {
    let (line, column) = (token.line, token.column);
    match reason {
        Reason::Operator(op) | Reason::AfterOperator(op) => finding(
            format!("Operator '{}' must be spaced.", op),
            line,
            column,
            "space-infix-ops",
        ),
        Reason::Comma => finding("A space is required after ','.", line, column, "comma-spacing"),
        Reason::Semicolon => {
            finding("Missing whitespace after semicolon.", line, column, "semi-spacing")
        }
        Reason::Colon => finding(
            "Missing space before value for key.",
            line,
            column,
            "key-spacing",
        ),
        Reason::ObjectBrace if token.text == "}" => finding(
            "A space is required before '}'.",
            line,
            column,
            "object-curly-spacing",
        ),
        Reason::ObjectBrace => finding(
            "A space is required after '{'.",
            line,
            column,
            "object-curly-spacing",
        ),
        Reason::Keyword(kw) => finding(
            format!("Expected space(s) after \"{}\".", kw),
            line,
            column,
            "keyword-spacing",
        ),
        Reason::FunctionParen => finding(
            "Missing space before function parentheses.",
            line,
            column,
            "space-before-function-paren",
        ),
        Reason::BlockOpen => finding(
            "Missing space before opening brace.",
            line,
            column,
            "space-before-blocks",
        ),
        Reason::BlockContinuation => finding(
            format!("Expected space(s) before \"{}\".", token.text),
            line,
            column,
            "keyword-spacing",
        ),
        Reason::Comment => finding(
            "Expected whitespace before comment.",
            line,
            column,
            "spaced-comment",
        ),
        _ => finding(
            format!("Missing whitespace before '{}'.", shown(token)),
            line,
            column,
            "no-whitespace",
        ),
    }
}

fn unexpected_space(reason: &Reason, token: &Token, prev_end: (usize, usize)) -> Diagnostic {
    let (line, column) = prev_end;
    match reason {
        Reason::BeforeSeparator if token.text == "," => finding(
            "There should be no space before ','.",
            line,
            column,
            "comma-spacing",
        ),
        Reason::BeforeSeparator => finding(
            "Unexpected whitespace before semicolon.",
            line,
            column,
            "semi-spacing",
        ),
        Reason::ParenInner if token.text == ")" => finding(
            "There should be no space before this paren.",
            line,
            column,
            "space-in-parens",
        ),
        Reason::ParenInner => finding(
            "There should be no space after this paren.",
            line,
            column,
            "space-in-parens",
        ),
        Reason::BracketInner if token.text == "]" => finding(
            "There should be no space before ']'.",
            line,
            column,
            "array-bracket-spacing",
        ),
        Reason::BracketInner => finding(
            "There should be no space after '['.",
            line,
            column,
            "array-bracket-spacing",
        ),
        Reason::Call => finding(
            "Unexpected whitespace between function name and paren.",
            line,
            column,
            "func-call-spacing",
        ),
        Reason::Property => finding(
            format!("Unexpected whitespace before property {}.", shown(token)),
            line,
            column,
            "no-whitespace-before-property",
        ),
        Reason::Unary(op) => finding(
            format!("Unexpected whitespace after unary operator '{}'.", op),
            line,
            column,
            "space-unary-ops",
        ),
        Reason::ObjectBrace => finding(
            "There should be no space inside empty braces.",
            line,
            column,
            "object-curly-spacing",
        ),
        Reason::Spread => finding(
            "Unexpected whitespace after spread operator.",
            line,
            column,
            "rest-spread-spacing",
        ),
        Reason::BeforeColon => finding(
            "Extra space before ':'.",
            line,
            column,
            "key-spacing",
        ),
        _ => finding(
            format!("Unexpected whitespace before '{}'.", shown(token)),
            line,
            column,
            "no-whitespace",
        ),
    }
}

/// Explains why the whitespace after the last token is not canonical
pub(crate) fn trailing_findings(
    trailing: &str,
    expected: &str,
    end: (usize, usize),
) -> Vec<Diagnostic> {
    if trailing == expected {
        return Vec::new();
    }
    let (line, column) = end;
    let mut out = Vec::new();
    if trailing.contains('\r') {
        out.push(finding(
            "Expected linebreaks to be 'LF' but found 'CRLF'.",
            line,
            column,
            "linebreak-style",
        ));
    }
    let newlines = trailing.matches('\n').count();
    if trailing.contains([' ', '\t']) {
        out.push(finding("Trailing spaces not allowed.", line, column, "no-trailing-spaces"));
    }
    if expected.is_empty() {
        if newlines > 0 {
            out.push(finding(
                "Too many blank lines at the end of file. Max of 0 allowed.",
                line,
                column,
                "no-multiple-empty-lines",
            ));
        }
    } else if newlines == 0 {
        out.push(finding(
            "Newline required at end of file but not found.",
            line,
            column,
            "eol-last",
        ));
    } else if newlines > 1 {
        out.push(finding(
            "Too many blank lines at the end of file. Max of 0 allowed.",
            line + 1,
            1,
            "no-multiple-empty-lines",
        ));
    }
    if out.is_empty() {
        out.push(finding(
            "Unexpected whitespace at the end of file.",
            line,
            column,
            "no-trailing-spaces",
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn token(text: &str, gap: &str) -> Token {
        Token {
            kind: TokenKind::Punct,
            text: text.to_string(),
            gap: gap.to_string(),
            line: 2,
            column: 5,
            end_line: 2,
            end_column: 6,
        }
    }

    #[test]
    fn test_requote_single_to_double() {
        assert_eq!(requote("'abc'", '"').as_deref(), Some("\"abc\""));
        assert_eq!(requote("\"abc\"", '"'), None);
    }

    #[test]
    fn test_requote_escapes() {
        assert_eq!(requote(r"'it\'s'", '"').as_deref(), Some("\"it's\""));
        assert_eq!(requote(r#"'say "hi"'"#, '"').as_deref(), Some(r#""say \"hi\"""#));
        assert_eq!(requote(r"'a\nb'", '"').as_deref(), Some(r#""a\nb""#));
    }

    #[test]
    fn test_requote_is_stable() {
        let once = requote(r#"'x "y" \'z\''"#, '"').unwrap();
        assert_eq!(requote(&once, '"'), None);
    }

    #[test]
    fn test_indent_finding() {
        let tok = token("foo", "\n  ");
        let reason = Reason::LineBreak;
        let site = GapSite {
            token: &tok,
            prev_end: (1, 10),
            expected: Gap::Newline(1),
            indent: 4,
            reason: &reason,
        };
        let diags = gap_findings(&site);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Expected indentation of 4 spaces but found 2.");
        assert_eq!(diags[0].rule_id.as_deref(), Some("indent"));
    }

    #[test]
    fn test_operator_spacing_finding() {
        let tok = token("=", "");
        let reason = Reason::Operator("=".to_string());
        let site = GapSite {
            token: &tok,
            prev_end: (2, 5),
            expected: Gap::Space,
            indent: 0,
            reason: &reason,
        };
        let diags = gap_findings(&site);
        assert_eq!(diags[0].message, "Operator '=' must be spaced.");
    }

    #[test]
    fn test_trailing_spaces_and_blank_lines() {
        let tok = token("x", "   \n\n\n\n");
        let reason = Reason::LineBreak;
        let site = GapSite {
            token: &tok,
            prev_end: (1, 3),
            expected: Gap::Newline(2),
            indent: 0,
            reason: &reason,
        };
        let rules: Vec<String> = gap_findings(&site)
            .into_iter()
            .filter_map(|d| d.rule_id)
            .collect();
        assert!(rules.contains(&"no-trailing-spaces".to_string()));
        assert!(rules.contains(&"no-multiple-empty-lines".to_string()));
    }

    #[test]
    fn test_trailing_eol() {
        assert!(trailing_findings("\n", "\n", (1, 5)).is_empty());
        let diags = trailing_findings("", "\n", (1, 5));
        assert_eq!(diags[0].rule_id.as_deref(), Some("eol-last"));
        let diags = trailing_findings("\n\n\n", "\n", (1, 5));
        assert_eq!(diags[0].rule_id.as_deref(), Some("no-multiple-empty-lines"));
        assert!(!trailing_findings("  ", "", (1, 1)).is_empty());
    }
}
