//! Lexer
//!
//! Splits JavaScript/TypeScript source into tokens. Every token keeps the
//! exact whitespace that preceded it so the layout pass can compare the
//! source against the canonical form without re-reading the text.

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Word,
    /// Numeric literal
    Number,
    /// Quoted string literal
    Str,
    /// Template literal, kept verbatim
    Template,
    /// Regular expression literal
    Regex,
    /// `// ...` comment (also a leading `#!` line)
    LineComment,
    /// `/* ... */` comment
    BlockComment,
    /// Operator or punctuation
    Punct,
}

impl TokenKind {
    /// Returns true for comment kinds
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Category
    pub kind: TokenKind,
    /// Source text
    pub text: String,
    /// Whitespace between the previous token and this one
    pub gap: String,
    /// 1-based start line
    pub line: usize,
    /// 1-based start column
    pub column: usize,
    /// Line of the position just past the token
    pub end_line: usize,
    /// Column of the position just past the token
    pub end_column: usize,
}

impl Token {
    /// Returns true if this is the punctuation `text`
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    /// Returns true if this is the word `text`
    pub fn is_word(&self, text: &str) -> bool {
        self.kind == TokenKind::Word && self.text == text
    }
}

/// Lexer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    /// Tokens in source order
    pub tokens: Vec<Token>,
    /// Whitespace after the last token
    pub trailing: String,
    /// Line of the end of input
    pub end_line: usize,
    /// Column of the end of input
    pub end_column: usize,
}

/// Unrecoverable lexing failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

// Longest first; `>>` and friends are deliberately absent so generic
// closers (`Array<Array<T>>`) lex as single `>` tokens.
const PUNCTUATORS: &[&str] = &[
    "**=", "...", "===", "!==", "&&=", "||=", "??=", "<<=", "=>", "==", "!=", "<=", ">=", "&&",
    "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**", "<<",
];

// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "of",
    "instanceof",
    "new",
    "delete",
    "void",
    "throw",
    "yield",
    "await",
];

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn error(&self, message: &str, line: usize, column: usize) -> LexError {
        LexError {
            message: message.to_string(),
            line,
            column,
        }
    }
}

/// Tokenizes `source`
pub fn tokenize(source: &str) -> Result<Lexed, LexError> {
    let mut cur = Cursor::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    let mut last_code: Option<(TokenKind, String)> = None;

    loop {
        let gap_start = cur.pos;
        while cur.peek().is_some_and(is_space) {
            cur.bump();
        }
        let gap = cur.slice(gap_start);

        let Some(c) = cur.peek() else {
            return Ok(Lexed {
                tokens,
                trailing: gap,
                end_line: cur.line,
                end_column: cur.column,
            });
        };

        let start = cur.pos;
        let (line, column) = (cur.line, cur.column);

        let kind = if start == 0 && cur.starts_with("#!") {
            skip_line(&mut cur);
            TokenKind::LineComment
        } else if cur.starts_with("//") {
            skip_line(&mut cur);
            TokenKind::LineComment
        } else if cur.starts_with("/*") {
            cur.bump();
            cur.bump();
            loop {
                if cur.starts_with("*/") {
                    cur.bump();
                    cur.bump();
                    break;
                }
                if cur.bump().is_none() {
                    return Err(cur.error("Unterminated comment", line, column));
                }
            }
            TokenKind::BlockComment
        } else if c == '"' || c == '\'' {
            scan_string(&mut cur, c, line, column)?;
            TokenKind::Str
        } else if c == '`' {
            cur.bump();
            scan_template(&mut cur, line, column)?;
            TokenKind::Template
        } else if c.is_ascii_digit()
            || (c == '.' && cur.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            scan_number(&mut cur);
            TokenKind::Number
        } else if is_word_start(c) {
            cur.bump();
            while cur.peek().is_some_and(is_word_continue) {
                cur.bump();
            }
            TokenKind::Word
        } else if c == '/' && regex_allowed(last_code.as_ref()) {
            scan_regex(&mut cur, line, column)?;
            TokenKind::Regex
        } else {
            let punct = PUNCTUATORS
                .iter()
                .find(|p| cur.starts_with(p))
                .filter(|p| **p != "?." || !cur.peek_at(2).is_some_and(|n| n.is_ascii_digit()));
            match punct {
                Some(p) => {
                    for _ in 0..p.chars().count() {
                        cur.bump();
                    }
                }
                None => {
                    cur.bump();
                }
            }
            TokenKind::Punct
        };

        let text = cur.slice(start);
        if !kind.is_comment() {
            last_code = Some((kind, text.clone()));
        }
        tokens.push(Token {
            kind,
            text,
            gap,
            line,
            column,
            end_line: cur.line,
            end_column: cur.column,
        });
    }
}

fn skip_line(cur: &mut Cursor) {
    while let Some(c) = cur.peek() {
        if c == '\n' || c == '\r' {
            break;
        }
        cur.bump();
    }
}

fn scan_string(cur: &mut Cursor, quote: char, line: usize, column: usize) -> Result<(), LexError> {
    cur.bump();
    loop {
        match cur.bump() {
            None | Some('\n') => {
                return Err(cur.error("Unterminated string constant", line, column));
            }
            Some('\\') => {
                if cur.bump().is_none() {
                    return Err(cur.error("Unterminated string constant", line, column));
                }
            }
            Some(c) if c == quote => return Ok(()),
            Some(_) => {}
        }
    }
}

// Called after the opening backtick.
fn scan_template(cur: &mut Cursor, line: usize, column: usize) -> Result<(), LexError> {
    loop {
        match cur.bump() {
            None => return Err(cur.error("Unterminated template", line, column)),
            Some('\\') => {
                if cur.bump().is_none() {
                    return Err(cur.error("Unterminated template", line, column));
                }
            }
            Some('`') => return Ok(()),
            Some('$') if cur.peek() == Some('{') => {
                cur.bump();
                scan_template_expression(cur, line, column)?;
            }
            Some(_) => {}
        }
    }
}

// Called after `${`; consumes through the matching `}`.
fn scan_template_expression(
    cur: &mut Cursor,
    line: usize,
    column: usize,
) -> Result<(), LexError> {
    let mut depth = 1usize;
    loop {
        let Some(c) = cur.peek() else {
            return Err(cur.error("Unterminated template", line, column));
        };
        match c {
            '{' => {
                depth += 1;
                cur.bump();
            }
            '}' => {
                depth -= 1;
                cur.bump();
                if depth == 0 {
                    return Ok(());
                }
            }
            '"' | '\'' => {
                let (l, col) = (cur.line, cur.column);
                scan_string(cur, c, l, col)?;
            }
            '`' => {
                let (l, col) = (cur.line, cur.column);
                cur.bump();
                scan_template(cur, l, col)?;
            }
            _ => {
                cur.bump();
            }
        }
    }
}

fn scan_number(cur: &mut Cursor) {
    let start = cur.pos;
    while let Some(c) = cur.peek() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            cur.bump();
            continue;
        }
        let prev = cur.chars[cur.pos - 1];
        let hex = cur.slice(start).to_ascii_lowercase().starts_with("0x");
        if (c == '+' || c == '-') && (prev == 'e' || prev == 'E') && !hex {
            cur.bump();
            continue;
        }
        break;
    }
}

fn scan_regex(cur: &mut Cursor, line: usize, column: usize) -> Result<(), LexError> {
    cur.bump();
    let mut in_class = false;
    loop {
        match cur.bump() {
            None | Some('\n') => {
                return Err(cur.error("Unterminated regular expression", line, column));
            }
            Some('\\') => {
                if matches!(cur.bump(), None | Some('\n')) {
                    return Err(cur.error("Unterminated regular expression", line, column));
                }
            }
            Some('[') => in_class = true,
            Some(']') => in_class = false,
            Some('/') if !in_class => break,
            Some(_) => {}
        }
    }
    while cur.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        cur.bump();
    }
    Ok(())
}

fn regex_allowed(last_code: Option<&(TokenKind, String)>) -> bool {
    match last_code {
        None => true,
        Some((TokenKind::Punct, text)) => !matches!(text.as_str(), ")" | "]" | "}" | "++" | "--"),
        Some((TokenKind::Word, text)) => REGEX_PREFIX_KEYWORDS.contains(&text.as_str()),
        Some(_) => false,
    }
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && !is_space(c))
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || (!c.is_ascii() && !is_space(c))
}
