//! Layout pass
//!
//! Walks the token stream once, tracking open brackets and statement
//! boundaries, and re-emits every token with canonical whitespace. Each
//! place where the canonical text differs from the source produces at
//! least one finding, so a source with no findings is already canonical.

use crate::rules::{
    self, Gap, GapSite, Reason, BLOCK_HEADS, CONTINUATION_KEYWORDS, INFIX_OPERATORS, MODIFIERS,
    NON_TERMINAL_KEYWORDS, OPERATOR_KEYWORDS, PAREN_KEYWORDS,
};
use crate::token::{Lexed, Token, TokenKind};
use crate::Language;
use overlay_types::{BraceStyle, Diagnostic, RuleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockRole {
    Plain,
    Switch,
    DoBody,
    /// Comma-separated members; never holds statements
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Block(BlockRole),
    Object,
    Paren,
    Bracket,
    /// Braceless body of `if`/`for`/`while`/`else`/`do`
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Control,
    Switch,
    Catch,
    Function,
    DoWhile,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    /// Indent level of the line the frame was opened on
    line_indent: usize,
    header: Option<Header>,
    /// Open `?` waiting for their `:`
    ternary: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyTrigger {
    Control,
    Else,
    Do,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emitted {
    Nothing,
    Code,
    LineComment,
    BlockComment,
}

/// What the layout remembers about an emitted code token
#[derive(Debug, Clone)]
struct Code {
    kind: TokenKind,
    text: String,
    end: (usize, usize),
    unary: bool,
    postfix: bool,
    optional: bool,
    ternary_colon: bool,
    /// `<` or `>` delimiting type arguments
    generic: bool,
    stmt_end: bool,
    opened: Option<FrameKind>,
    closed: Option<FrameKind>,
    header: Option<Header>,
}

impl Code {
    fn new(token: &Token) -> Self {
        Self {
            kind: token.kind,
            text: token.text.clone(),
            end: (token.end_line, token.end_column),
            unary: false,
            postfix: false,
            optional: false,
            ternary_colon: false,
            generic: false,
            stmt_end: false,
            opened: None,
            closed: None,
            header: None,
        }
    }

    fn semicolon(end: (usize, usize)) -> Self {
        Self {
            kind: TokenKind::Punct,
            text: ";".to_string(),
            end,
            unary: false,
            postfix: false,
            optional: false,
            ternary_colon: false,
            generic: false,
            stmt_end: true,
            opened: None,
            closed: None,
            header: None,
        }
    }

    fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    fn is_word(&self, text: &str) -> bool {
        self.kind == TokenKind::Word && self.text == text
    }

    fn opened_block(&self) -> bool {
        matches!(self.opened, Some(FrameKind::Block(_)))
    }

    fn closed_block(&self) -> bool {
        matches!(self.closed, Some(FrameKind::Block(_)))
    }

    /// Returns true if the token can be the left side of a binary operator
    fn is_operand(&self) -> bool {
        match self.kind {
            TokenKind::Word => !OPERATOR_KEYWORDS.contains(&self.text.as_str()),
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Punct => match self.text.as_str() {
                ")" => self.header.is_none(),
                "]" => true,
                "}" => self.closed == Some(FrameKind::Object),
                "++" | "--" | "!" => self.postfix,
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns true if a statement may end right after this token
    fn can_end_statement(&self) -> bool {
        if self.stmt_end {
            return false;
        }
        match self.kind {
            TokenKind::Word => !NON_TERMINAL_KEYWORDS.contains(&self.text.as_str()),
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Punct => match self.text.as_str() {
                ")" => matches!(self.header, None | Some(Header::DoWhile)),
                "]" => true,
                "}" => self.closed == Some(FrameKind::Object),
                "++" | "--" | "!" => self.postfix,
                _ => false,
            },
            _ => false,
        }
    }

    fn is_infix(&self) -> bool {
        is_infix_text(&self.text, self.kind, self.unary, self.generic)
            || (self.is_punct("?") && !self.optional)
            || self.ternary_colon
    }
}

// Words that start an expression, so a following `{` is an object.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "throw", "yield", "await", "typeof", "in", "of", "case", "new", "delete",
    "instanceof", "else", "do", "default", "export",
];

fn is_infix_text(text: &str, kind: TokenKind, unary: bool, generic: bool) -> bool {
    if kind != TokenKind::Punct {
        return false;
    }
    INFIX_OPERATORS.contains(&text)
        || ((text == "+" || text == "-") && !unary)
        || (!generic && (text == "<" || text == ">"))
}

fn is_wordish(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Word | TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex
    )
}

/// Returns true if `token` at the start of a line continues the statement above
fn continues_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Punct => !matches!(
            token.text.as_str(),
            "++" | "--" | "!" | "~" | "..." | "@" | "#" | "}"
        ),
        TokenKind::Word => CONTINUATION_KEYWORDS.contains(&token.text.as_str()),
        TokenKind::Template => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Default)]
struct Statement {
    start: bool,
    head: Option<String>,
    brace_seen: bool,
    saw_parens: bool,
}

impl Statement {
    fn fresh() -> Self {
        Self {
            start: true,
            ..Self::default()
        }
    }
}

/// Layout output
pub(crate) struct Laid {
    pub output: String,
    pub findings: Vec<Diagnostic>,
}

/// Lays out `lexed`; a structural error aborts with a parse diagnostic
pub(crate) fn layout(
    lexed: &Lexed,
    config: &RuleConfig,
    language: Language,
) -> Result<Laid, Diagnostic> {
    Layout::new(config, language, &lexed.tokens).run(lexed)
}

struct Layout<'a> {
    config: &'a RuleConfig,
    language: Language,
    tokens: &'a [Token],
    out: String,
    findings: Vec<Diagnostic>,
    stack: Vec<Frame>,
    line_indent: usize,
    emitted: Emitted,
    last_end: (usize, usize),
    prev: Option<Code>,
    prev2: Option<Code>,
    code_end: usize,
    newline_since_code: bool,
    pending_body: Option<BodyTrigger>,
    stmt: Statement,
    operator_flagged: bool,
    /// Open type-argument lists
    generic_depth: usize,
}

impl<'a> Layout<'a> {
    fn new(config: &'a RuleConfig, language: Language, tokens: &'a [Token]) -> Self {
        Self {
            config,
            language,
            tokens,
            out: String::new(),
            findings: Vec::new(),
            stack: vec![Frame {
                kind: FrameKind::Root,
                line_indent: 0,
                header: None,
                ternary: 0,
            }],
            line_indent: 0,
            emitted: Emitted::Nothing,
            last_end: (1, 1),
            prev: None,
            prev2: None,
            code_end: 0,
            newline_since_code: false,
            pending_body: None,
            stmt: Statement::fresh(),
            operator_flagged: false,
            generic_depth: 0,
        }
    }

    fn run(mut self, lexed: &Lexed) -> Result<Laid, Diagnostic> {
        let tokens = self.tokens;
        for (index, token) in tokens.iter().enumerate() {
            if token.kind.is_comment() {
                self.comment(token);
            } else {
                self.code(index, token)?;
            }
        }
        self.finish(lexed)
    }

    fn top(&self) -> &Frame {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn top_non_body(&self) -> FrameKind {
        self.stack
            .iter()
            .rev()
            .map(|f| f.kind)
            .find(|k| *k != FrameKind::Body)
            .unwrap_or(FrameKind::Root)
    }

    fn at_statement_level(&self) -> bool {
        match self.top().kind {
            FrameKind::Block(role) => role != BlockRole::Enum,
            kind => matches!(kind, FrameKind::Root | FrameKind::Body),
        }
    }

    fn push(&mut self, kind: FrameKind, header: Option<Header>) {
        self.stack.push(Frame {
            kind,
            line_indent: self.line_indent,
            header,
            ternary: 0,
        });
    }

    fn pop(&mut self) -> Frame {
        if self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                return frame;
            }
        }
        self.top().clone()
    }

    fn close_bodies(&mut self) {
        while self.top().kind == FrameKind::Body {
            self.stack.pop();
        }
    }

    fn end_statement(&mut self) {
        self.close_bodies();
        self.stmt = Statement::fresh();
    }

    fn next_code(&self, index: usize) -> Option<&'a Token> {
        let tokens = self.tokens;
        tokens[index + 1..].iter().find(|t| !t.kind.is_comment())
    }

    fn comment(&mut self, token: &Token) {
        let newlines = token.gap.matches('\n').count();
        let (gap, reason) = match self.emitted {
            Emitted::Nothing => (Gap::None, Reason::FileStart),
            Emitted::LineComment => (Gap::Newline(newlines.clamp(1, 2)), Reason::AfterLineComment),
            _ if newlines == 0 => match token.kind {
                TokenKind::LineComment => (Gap::Space, Reason::Comment),
                _ => (preserve(token), Reason::Generic),
            },
            _ => (Gap::Newline(newlines.clamp(1, 2)), Reason::LineBreak),
        };
        let indent = content_indent(self.top());
        self.write_gap(token, gap, &reason, indent);

        if token.kind == TokenKind::LineComment {
            let trimmed = token.text.trim_end_matches([' ', '\t']);
            if trimmed.len() != token.text.len() {
                self.findings.push(
                    Diagnostic::error(
                        "Trailing spaces not allowed.",
                        token.line,
                        token.column + trimmed.chars().count(),
                    )
                    .with_rule("no-trailing-spaces"),
                );
            }
            self.out.push_str(trimmed);
            self.emitted = Emitted::LineComment;
        } else {
            self.out.push_str(&token.text);
            self.emitted = Emitted::BlockComment;
            if token.text.contains('\n') {
                self.newline_since_code = true;
            }
        }
        if token.gap.contains('\n') {
            self.newline_since_code = true;
        }
        self.last_end = (token.end_line, token.end_column);
    }

    fn code(&mut self, index: usize, token: &Token) -> Result<(), Diagnostic> {
        let newline_before = self.newline_since_code
            || token.gap.contains('\n')
            || self.emitted == Emitted::LineComment;
        self.maybe_insert_semicolon(token, newline_before);
        self.open_pending_body(token);

        let closing = token.kind == TokenKind::Punct && matches!(token.text.as_str(), ")" | "]" | "}");
        if closing {
            self.close_bodies();
            self.check_closer(token)?;
        }

        let info = self.classify(index, token);
        let (gap, reason) = self.gap_before(token, &info);
        let indent = match gap {
            Gap::Newline(_) => self.indent_for(index, token, &info, closing),
            _ => 0,
        };
        self.write_gap(token, gap, &reason, indent);
        self.write_code(token);
        self.update(token, info);
        Ok(())
    }

    fn maybe_insert_semicolon(&mut self, token: &Token, newline_before: bool) {
        if !self.config.semicolons || !self.at_statement_level() {
            return;
        }
        let Some(prev) = &self.prev else {
            return;
        };
        if !prev.can_end_statement() {
            return;
        }
        let closes_block = token.is_punct("}")
            && matches!(self.top_non_body(), FrameKind::Block(role) if role != BlockRole::Enum);
        // `else` ends a braceless `if` body even though it continues the `if`
        let ends_body = token.is_word("else") && self.top().kind == FrameKind::Body;
        if closes_block || ends_body || (newline_before && !continues_statement(token)) {
            self.insert_semicolon();
        }
    }

    fn insert_semicolon(&mut self) {
        let Some(prev) = &self.prev else {
            return;
        };
        let end = prev.end;
        self.out.insert(self.code_end, ';');
        self.code_end += 1;
        self.findings
            .push(Diagnostic::error("Missing semicolon.", end.0, end.1).with_rule("semi"));
        self.prev2 = self.prev.replace(Code::semicolon(end));
        self.end_statement();
    }

    fn open_pending_body(&mut self, token: &Token) {
        if let Some(trigger) = self.pending_body.take() {
            let braced = token.is_punct("{");
            let chained_if = trigger == BodyTrigger::Else && token.is_word("if");
            if !braced && !chained_if {
                self.push(FrameKind::Body, None);
                self.stmt = Statement::fresh();
            }
        }
    }

    fn check_closer(&self, token: &Token) -> Result<(), Diagnostic> {
        let top = self.top().kind;
        let matched = match token.text.as_str() {
            ")" => top == FrameKind::Paren,
            "]" => top == FrameKind::Bracket,
            _ => matches!(top, FrameKind::Block(_) | FrameKind::Object),
        };
        if matched {
            Ok(())
        } else {
            Err(Diagnostic::error(
                format!("Parsing error: Unexpected token {}", token.text),
                token.line,
                token.column,
            ))
        }
    }

    fn classify(&self, index: usize, token: &Token) -> Code {
        let mut info = Code::new(token);
        if token.kind != TokenKind::Punct {
            return info;
        }
        let prev_operand = self.prev.as_ref().is_some_and(Code::is_operand);
        match token.text.as_str() {
            "{" => info.opened = Some(self.classify_brace()),
            "}" | ")" | "]" => {
                info.closed = Some(self.top().kind);
                info.header = self.top().header;
            }
            "+" | "-" => info.unary = !prev_operand,
            "++" | "--" => info.postfix = prev_operand && !token.gap.contains('\n'),
            "!" => info.postfix = prev_operand && token.gap.is_empty(),
            "?" => {
                info.optional = token.gap.is_empty()
                    && self.next_code(index).is_some_and(|next| {
                        next.kind == TokenKind::Punct
                            && matches!(next.text.as_str(), ":" | ")" | "," | "=")
                    })
            }
            ":" => info.ternary_colon = self.top().ternary > 0,
            "<" => info.generic = self.opens_type_arguments(index),
            ">" => info.generic = self.generic_depth > 0,
            _ => {}
        }
        info
    }

    /// Returns true if the `<` at `index` opens a TypeScript type-argument list
    ///
    /// It must not follow a value that a comparison could apply to, and its
    /// matching `>` must come before any operator, literal, or closer of an
    /// enclosing bracket.
    fn opens_type_arguments(&self, index: usize) -> bool {
        if self.language != Language::TypeScript {
            return false;
        }
        let after_value = self
            .prev
            .as_ref()
            .is_some_and(|p| p.is_operand() && p.kind != TokenKind::Word);
        if after_value {
            return false;
        }

        let mut angles = 0usize;
        let mut brackets = 0usize;
        for token in self.tokens[index..].iter().filter(|t| !t.kind.is_comment()) {
            match token.kind {
                TokenKind::Word | TokenKind::Str => {}
                TokenKind::Punct => match token.text.as_str() {
                    "<" => angles += 1,
                    ">" => {
                        angles -= 1;
                        if angles == 0 {
                            return true;
                        }
                    }
                    "(" | "[" | "{" => brackets += 1,
                    ")" | "]" | "}" => {
                        if brackets == 0 {
                            return false;
                        }
                        brackets -= 1;
                    }
                    "," | "." | "|" | "&" | ":" | "?" | "=>" | "..." => {}
                    _ => return false,
                },
                _ => return false,
            }
        }
        false
    }

    fn classify_brace(&self) -> FrameKind {
        let Some(prev) = &self.prev else {
            return FrameKind::Block(BlockRole::Plain);
        };
        if prev.stmt_end || prev.opened_block() || prev.closed_block() {
            return FrameKind::Block(BlockRole::Plain);
        }
        if prev.is_punct(":")
            && !prev.ternary_colon
            && self.top().kind == FrameKind::Block(BlockRole::Switch)
        {
            return FrameKind::Block(BlockRole::Plain);
        }
        if prev.is_punct(")") {
            let role = if prev.header == Some(Header::Switch) {
                BlockRole::Switch
            } else {
                BlockRole::Plain
            };
            return FrameKind::Block(role);
        }
        if prev.is_punct("=>") || prev.is_word("else") || prev.is_word("try") || prev.is_word("finally") {
            return FrameKind::Block(BlockRole::Plain);
        }
        if prev.is_word("do") {
            return FrameKind::Block(BlockRole::DoBody);
        }
        if self.at_statement_level() {
            let head = self.stmt.head.as_deref();
            let head_opens_block = head.is_some_and(|head| BLOCK_HEADS.contains(&head));
            if head_opens_block && !self.stmt.brace_seen {
                let role = if head == Some("enum") {
                    BlockRole::Enum
                } else {
                    BlockRole::Plain
                };
                return FrameKind::Block(role);
            }
            // `function f(): T {` and method signatures with return types
            let type_end = (prev.kind == TokenKind::Word
                && !EXPRESSION_KEYWORDS.contains(&prev.text.as_str()))
                || prev.is_punct(">")
                || prev.is_punct("]");
            if self.stmt.saw_parens && type_end {
                return FrameKind::Block(BlockRole::Plain);
            }
        }
        FrameKind::Object
    }

    fn paren_header(&self) -> Option<Header> {
        let prev = self.prev.as_ref()?;
        let prev2_is = |word: &str| self.prev2.as_ref().is_some_and(|p| p.is_word(word));
        if prev.kind != TokenKind::Word {
            return None;
        }
        match prev.text.as_str() {
            "while"
                if self
                    .prev2
                    .as_ref()
                    .is_some_and(|p| p.closed == Some(FrameKind::Block(BlockRole::DoBody))) =>
            {
                Some(Header::DoWhile)
            }
            "if" | "for" | "while" | "with" => Some(Header::Control),
            "switch" => Some(Header::Switch),
            "catch" => Some(Header::Catch),
            "function" => Some(Header::Function),
            "await" if prev2_is("for") => Some(Header::Control),
            _ if prev2_is("function") => Some(Header::Function),
            _ => None,
        }
    }

    fn gap_before(&self, token: &Token, info: &Code) -> (Gap, Reason) {
        let newlines = token.gap.matches('\n').count();
        let keep_lines = Gap::Newline(newlines.clamp(1, 2));
        let allman = self.config.brace_style == BraceStyle::Allman;

        match self.emitted {
            Emitted::Nothing => return (Gap::None, Reason::FileStart),
            Emitted::LineComment => return (keep_lines, Reason::AfterLineComment),
            _ => {}
        }
        if token.is_punct(";") || token.is_punct(",") {
            return (Gap::None, Reason::BeforeSeparator);
        }
        if info.opened_block() {
            let gap = if allman { Gap::Newline(1) } else { Gap::Space };
            return (gap, Reason::BlockOpen);
        }
        if token.is_punct("}") && info.closed_block() {
            return (Gap::Newline(1), Reason::BlockClose);
        }
        if self.emitted == Emitted::BlockComment && newlines == 0 {
            return (preserve(token), Reason::Generic);
        }
        let Some(prev) = &self.prev else {
            return (keep_lines, Reason::LineBreak);
        };
        if prev.opened_block() {
            return (Gap::Newline(1), Reason::BlockStart);
        }
        if prev.closed_block() {
            let continuation = token.is_word("else")
                || token.is_word("catch")
                || token.is_word("finally")
                || (token.is_word("while")
                    && prev.closed == Some(FrameKind::Block(BlockRole::DoBody)));
            if continuation {
                let gap = if allman { Gap::Newline(1) } else { Gap::Space };
                return (gap, Reason::BlockContinuation);
            }
            if token.kind == TokenKind::Punct
                && matches!(token.text.as_str(), ")" | "]" | "." | "?.")
            {
                return (Gap::None, Reason::Generic);
            }
            return (keep_lines, Reason::AfterBlock);
        }
        if prev.stmt_end {
            return (keep_lines, Reason::StatementEnd);
        }
        if newlines > 0 {
            return (keep_lines, Reason::LineBreak);
        }
        self.inline_gap(token, info, prev)
    }

    fn inline_gap(&self, token: &Token, info: &Code, prev: &Code) -> (Gap, Reason) {
        let p = prev.text.as_str();
        let c = token.text.as_str();
        let pp = prev.kind == TokenKind::Punct;
        let cp = token.kind == TokenKind::Punct;

        if (pp && prev.generic) || (cp && info.generic) {
            return (preserve(token), Reason::Generic);
        }
        if cp && c == ")" {
            return (Gap::None, Reason::ParenInner);
        }
        if cp && c == "]" {
            return (Gap::None, Reason::BracketInner);
        }
        if cp && c == "}" {
            let gap = if prev.opened == Some(FrameKind::Object) {
                Gap::None
            } else {
                Gap::Space
            };
            return (gap, Reason::ObjectBrace);
        }
        if prev.opened == Some(FrameKind::Object) {
            return (Gap::Space, Reason::ObjectBrace);
        }
        if pp {
            match p {
                "(" => return (Gap::None, Reason::ParenInner),
                "[" => return (Gap::None, Reason::BracketInner),
                "." | "?." => return (Gap::None, Reason::Property),
                "..." => return (Gap::None, Reason::Spread),
                "@" | "#" => return (Gap::None, Reason::Generic),
                "~" => return (Gap::None, Reason::Unary(p.to_string())),
                "!" | "++" | "--" if !prev.postfix => {
                    return (Gap::None, Reason::Unary(p.to_string()))
                }
                "+" | "-" if prev.unary => return (Gap::None, Reason::Unary(p.to_string())),
                _ => {}
            }
        }
        if cp && (c == "." || c == "?.") {
            return (Gap::None, Reason::Property);
        }
        if cp && matches!(c, "++" | "--" | "!") && info.postfix {
            return (Gap::None, Reason::Generic);
        }
        if cp && c == "(" {
            if prev.kind == TokenKind::Word {
                let named_function = self.prev2.as_ref().is_some_and(|p2| p2.is_word("function"));
                if p == "function" || named_function {
                    return (Gap::Space, Reason::FunctionParen);
                }
                if PAREN_KEYWORDS.contains(&p) {
                    return (Gap::Space, Reason::Keyword(p.to_string()));
                }
                return (Gap::None, Reason::Call);
            }
            if (pp && (p == ")" || p == "]" || prev.postfix))
                || matches!(prev.kind, TokenKind::Str | TokenKind::Template)
            {
                return (Gap::None, Reason::Call);
            }
        }
        if cp && c == "[" {
            let indexable = (prev.kind == TokenKind::Word && prev.is_operand())
                || (pp && (p == ")" || p == "]" || prev.postfix))
                || matches!(prev.kind, TokenKind::Str | TokenKind::Template);
            if indexable {
                return (Gap::None, Reason::Generic);
            }
        }
        if token.kind == TokenKind::Template
            && prev.kind == TokenKind::Word
            && prev.is_operand()
            && token.gap.is_empty()
        {
            return (Gap::None, Reason::Generic);
        }
        if cp && c == ":" {
            return if info.ternary_colon {
                (Gap::Space, Reason::Operator(c.to_string()))
            } else {
                (Gap::None, Reason::BeforeColon)
            };
        }
        if pp && p == ":" {
            return if prev.ternary_colon {
                (Gap::Space, Reason::AfterOperator(p.to_string()))
            } else {
                (Gap::Space, Reason::Colon)
            };
        }
        if cp && c == "?" {
            return if info.optional {
                (Gap::None, Reason::Generic)
            } else {
                (Gap::Space, Reason::Operator(c.to_string()))
            };
        }
        if pp && p == "?" && !prev.optional {
            return (Gap::Space, Reason::AfterOperator(p.to_string()));
        }
        if pp && p == "," {
            return (Gap::Space, Reason::Comma);
        }
        if pp && p == ";" {
            return (Gap::Space, Reason::Semicolon);
        }
        if is_infix_text(c, token.kind, info.unary, info.generic) {
            return (Gap::Space, Reason::Operator(c.to_string()));
        }
        if is_infix_text(p, prev.kind, prev.unary, prev.generic) {
            return (Gap::Space, Reason::AfterOperator(p.to_string()));
        }
        if cp && c == "{" {
            return (Gap::Space, Reason::Generic);
        }
        let prev_closes = pp && (matches!(p, ")" | "]" | "}") || prev.postfix);
        if (is_wordish(prev.kind) || prev_closes) && is_wordish(token.kind) {
            let reason = if prev.kind == TokenKind::Word && OPERATOR_KEYWORDS.contains(&p) {
                Reason::Keyword(p.to_string())
            } else {
                Reason::Words
            };
            return (Gap::Space, reason);
        }
        let prefix = cp
            && (info.unary
                || matches!(c, "!" | "~" | "...")
                || (matches!(c, "++" | "--") && !info.postfix));
        if prev.kind == TokenKind::Word && prefix {
            return (Gap::Space, Reason::Keyword(p.to_string()));
        }
        (preserve(token), Reason::Generic)
    }

    fn indent_for(&self, index: usize, token: &Token, info: &Code, closing: bool) -> usize {
        let top = self.top();
        if closing {
            return top.line_indent;
        }
        let mut level = content_indent(top);
        if top.kind == FrameKind::Block(BlockRole::Switch) {
            let label = token.is_word("case")
                || (token.is_word("default")
                    && self.next_code(index).is_some_and(|next| next.is_punct(":")));
            if label {
                level = top.line_indent;
            }
        }
        if token.is_punct(".") || token.is_punct("?.") {
            level += 1;
        } else if !token.is_punct("{") {
            let prev_infix = self
                .prev
                .as_ref()
                .is_some_and(Code::is_infix);
            if prev_infix || info.is_infix() {
                level += 1;
            }
        }
        level
    }

    fn write_gap(&mut self, token: &Token, gap: Gap, reason: &Reason, indent: usize) {
        let width = self.config.indent_width;
        let rendered = match gap {
            Gap::None => String::new(),
            Gap::Space => " ".to_string(),
            Gap::Newline(lines) => {
                self.line_indent = indent;
                format!("{}{}", "\n".repeat(lines), " ".repeat(indent * width))
            }
        };

        let mut flagged = false;
        if rendered != token.gap {
            let site = GapSite {
                token,
                prev_end: self.last_end,
                expected: gap,
                indent: indent * width,
                reason,
            };
            let mut found = rules::gap_findings(&site);
            if matches!(reason, Reason::AfterOperator(_)) && self.operator_flagged {
                found.retain(|d| d.rule_id.as_deref() != Some("space-infix-ops"));
            }
            flagged = found
                .iter()
                .any(|d| d.rule_id.as_deref() == Some("space-infix-ops"));
            self.findings.extend(found);
        }
        self.operator_flagged = flagged && matches!(reason, Reason::Operator(_));
        self.out.push_str(&rendered);
    }

    fn write_code(&mut self, token: &Token) {
        if token.kind == TokenKind::Str {
            let quotes = self.config.quotes;
            if let Some(fixed) = rules::requote(&token.text, quotes.quote_char()) {
                self.findings.push(
                    Diagnostic::error(
                        format!("Strings must use {}.", quotes.name()),
                        token.line,
                        token.column,
                    )
                    .with_rule("quotes"),
                );
                self.out.push_str(&fixed);
                return;
            }
        }
        self.out.push_str(&token.text);
    }

    fn update(&mut self, token: &Token, mut info: Code) {
        if self.stmt.start {
            let modifier = token.kind == TokenKind::Word && MODIFIERS.contains(&token.text.as_str());
            if !modifier {
                self.stmt.start = false;
                if token.kind == TokenKind::Word {
                    self.stmt.head = Some(token.text.clone());
                }
            }
        }

        match (token.kind, token.text.as_str()) {
            (TokenKind::Punct, "(") => {
                let header = self.paren_header();
                self.push(FrameKind::Paren, header);
            }
            (TokenKind::Punct, "[") => self.push(FrameKind::Bracket, None),
            (TokenKind::Punct, "{") => {
                let kind = info.opened.unwrap_or(FrameKind::Object);
                self.push(kind, None);
                if matches!(kind, FrameKind::Block(_)) {
                    self.stmt = Statement::fresh();
                } else {
                    self.stmt.brace_seen = true;
                }
            }
            (TokenKind::Punct, ")") => {
                let frame = self.pop();
                info.header = frame.header;
                if self.at_statement_level() {
                    self.stmt.saw_parens = true;
                }
                if frame.header == Some(Header::Control) {
                    self.pending_body = Some(BodyTrigger::Control);
                }
            }
            (TokenKind::Punct, "]") => {
                self.pop();
            }
            (TokenKind::Punct, "}") => {
                let frame = self.pop();
                if matches!(frame.kind, FrameKind::Block(_)) {
                    self.end_statement();
                }
            }
            (TokenKind::Punct, ";") => {
                if self.at_statement_level() {
                    info.stmt_end = true;
                    self.end_statement();
                }
            }
            (TokenKind::Punct, "<") if info.generic => self.generic_depth += 1,
            (TokenKind::Punct, ">") if info.generic => {
                self.generic_depth = self.generic_depth.saturating_sub(1);
            }
            (TokenKind::Punct, "?") => {
                if !info.optional {
                    self.top_mut().ternary += 1;
                }
            }
            (TokenKind::Punct, ":") => {
                if info.ternary_colon {
                    self.top_mut().ternary -= 1;
                } else {
                    let after_default = self.prev.as_ref().is_some_and(|p| p.is_word("default"));
                    if self.stmt.head.as_deref() == Some("case") || after_default {
                        self.stmt = Statement::fresh();
                    }
                }
            }
            (TokenKind::Word, "else") => self.pending_body = Some(BodyTrigger::Else),
            (TokenKind::Word, "do") => self.pending_body = Some(BodyTrigger::Do),
            _ => {}
        }

        self.code_end = self.out.len();
        self.newline_since_code = false;
        self.emitted = Emitted::Code;
        self.last_end = (token.end_line, token.end_column);
        self.prev2 = self.prev.replace(info);
    }

    fn finish(mut self, lexed: &Lexed) -> Result<Laid, Diagnostic> {
        let unclosed = self
            .stack
            .iter()
            .rev()
            .find(|f| !matches!(f.kind, FrameKind::Root | FrameKind::Body));
        if let Some(frame) = unclosed {
            let expected = match frame.kind {
                FrameKind::Paren => "')'",
                FrameKind::Bracket => "']'",
                _ => "'}'",
            };
            return Err(Diagnostic::error(
                format!("Parsing error: {} expected.", expected),
                lexed.end_line,
                lexed.end_column,
            ));
        }

        let ends = self.prev.as_ref().is_some_and(Code::can_end_statement);
        if self.config.semicolons && self.at_statement_level() && ends {
            self.insert_semicolon();
        }

        let canonical = if self.tokens.is_empty() { "" } else { "\n" };
        self.findings
            .extend(rules::trailing_findings(&lexed.trailing, canonical, self.last_end));
        self.out.push_str(canonical);

        Ok(Laid {
            output: self.out,
            findings: self.findings,
        })
    }
}

fn preserve(token: &Token) -> Gap {
    if token.gap.is_empty() {
        Gap::None
    } else {
        Gap::Space
    }
}

fn content_indent(frame: &Frame) -> usize {
    match frame.kind {
        FrameKind::Root => 0,
        _ => frame.line_indent + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn run(source: &str) -> Laid {
        let lexed = tokenize(source).unwrap();
        layout(&lexed, &RuleConfig::FIXED, Language::TypeScript).unwrap()
    }

    fn fixed(source: &str) -> String {
        run(source).output
    }

    #[test]
    fn test_inserts_semicolon_and_spaces() {
        let laid = run("let x=1");
        assert_eq!(laid.output, "let x = 1;\n");
        let messages: Vec<&str> = laid.findings.iter().map(|d| d.message.as_str()).collect();
        assert!(messages.contains(&"Missing semicolon."));
        assert!(messages.contains(&"Operator '=' must be spaced."));
        assert_eq!(
            messages
                .iter()
                .filter(|m| **m == "Operator '=' must be spaced.")
                .count(),
            1
        );
    }

    #[test]
    fn test_canonical_source_has_no_findings() {
        let source = "let x = 1;\n";
        let laid = run(source);
        assert_eq!(laid.output, source);
        assert!(laid.findings.is_empty());
    }

    #[test]
    fn test_allman_braces() {
        let out = fixed("if (a) {\n  b()\n} else {\n  c()\n}\n");
        assert_eq!(out, "if (a)\n{\n    b();\n}\nelse\n{\n    c();\n}\n");
    }

    #[test]
    fn test_function_declaration() {
        let out = fixed("function add(a,b){return a+b}");
        assert_eq!(out, "function add (a, b)\n{\n    return a + b;\n}\n");
    }

    #[test]
    fn test_object_literal_stays_inline() {
        let out = fixed("const o = {a: 1, b: 'x'}");
        assert_eq!(out, "const o = { a: 1, b: \"x\" };\n");
    }

    #[test]
    fn test_multiline_object() {
        let source = "const o = {\n    a: 1,\n    b: 2\n};\n";
        let laid = run(source);
        assert_eq!(laid.output, source);
        assert!(laid.findings.is_empty());
    }

    #[test]
    fn test_braceless_body_indent() {
        let out = fixed("if (a)\nb()\nc()\n");
        assert_eq!(out, "if (a)\n    b();\nc();\n");
    }

    #[test]
    fn test_switch_cases() {
        let out = fixed("switch (x) {\ncase 1:\nfoo()\nbreak\ndefault:\nbar()\n}\n");
        assert_eq!(
            out,
            "switch (x)\n{\ncase 1:\n    foo();\n    break;\ndefault:\n    bar();\n}\n"
        );
    }

    #[test]
    fn test_class_with_typed_method() {
        let out = fixed("class A {\nrun(): void {\nthis.x = 1\n}\n}\n");
        assert_eq!(
            out,
            "class A\n{\n    run(): void\n    {\n        this.x = 1;\n    }\n}\n"
        );
    }

    #[test]
    fn test_arrow_callback_in_call() {
        let out = fixed("items.forEach((x) => {\nuse(x)\n})\n");
        assert_eq!(
            out,
            "items.forEach((x) =>\n    {\n        use(x);\n    });\n"
        );
    }

    #[test]
    fn test_ternary_and_optional() {
        assert_eq!(fixed("let a = b?c:d"), "let a = b ? c : d;\n");
        assert_eq!(fixed("function f (x?: string) {}"), "function f (x?: string)\n{\n}\n");
    }

    #[test]
    fn test_generics_preserved() {
        let source = "const m: Map<string, Array<number>> = new Map();\n";
        let laid = run(source);
        assert_eq!(laid.output, source);
        assert!(laid.findings.is_empty());
    }

    #[test]
    fn test_comments_kept() {
        let source = "// header\nfoo(); // trailing\n/* block */\nbar();\n";
        let laid = run(source);
        assert_eq!(laid.output, source);
        assert!(laid.findings.is_empty());
    }

    #[test]
    fn test_semicolon_before_trailing_comment() {
        assert_eq!(fixed("foo() // note\nbar()\n"), "foo(); // note\nbar();\n");
    }

    #[test]
    fn test_return_on_its_own_line_ends_statement() {
        assert_eq!(fixed("function f () {\nreturn\n}\n"), "function f ()\n{\n    return;\n}\n");
    }

    #[test]
    fn test_chained_call_continuation() {
        let source = "promise\n    .then(done);\n";
        assert_eq!(fixed(source), source);
    }

    #[test]
    fn test_blank_lines_collapse() {
        assert_eq!(fixed("a();\n\n\n\nb();\n"), "a();\n\nb();\n");
    }

    #[test]
    fn test_unbalanced_closer() {
        let lexed = tokenize("foo());").unwrap();
        let err = layout(&lexed, &RuleConfig::FIXED, Language::TypeScript)
            .err()
            .unwrap();
        assert!(err.message.starts_with("Parsing error"));
        assert_eq!((err.line, err.column), (1, 6));
    }

    #[test]
    fn test_unclosed_block() {
        let lexed = tokenize("if (a) {\nb();\n").unwrap();
        let err = layout(&lexed, &RuleConfig::FIXED, Language::TypeScript)
            .err()
            .unwrap();
        assert_eq!(err.message, "Parsing error: '}' expected.");
    }

    #[test]
    fn test_javascript_spaces_comparisons() {
        let lexed = tokenize("if (a<b) c()").unwrap();
        let laid = layout(&lexed, &RuleConfig::FIXED, Language::JavaScript).unwrap();
        assert_eq!(laid.output, "if (a < b) c();\n");
    }

    #[test]
    fn test_one_true_brace_config() {
        let config = RuleConfig {
            brace_style: BraceStyle::OneTrueBrace,
            ..RuleConfig::FIXED
        };
        let lexed = tokenize("if (a)\n{\nb()\n}\nelse\n{\nc()\n}\n").unwrap();
        let laid = layout(&lexed, &config, Language::TypeScript).unwrap();
        assert_eq!(laid.output, "if (a) {\n    b();\n} else {\n    c();\n}\n");
    }

    #[test]
    fn test_fix_is_idempotent() {
        let sources = [
            "let x=1",
            "function add(a,b){return a+b}",
            "if (a) {\n  b()\n} else if (c) {\n  d()\n}\n",
            "const o = {a: 1, 'b': [1,2,3]}\nexport default o\n",
            "switch (x) {\ncase 1: {\nfoo()\n}\n}\n",
            "class A extends B {\n  private x = 1\n  get y(): number { return this.x }\n}\n",
            "do {\nx++\n} while (x < 3)\n",
            "try { a() } catch (e) { b(e) } finally { c() }",
            "const s = `a ${b} c`\nconst r = /x+/g.test(s)\n",
            "for (let i = 0; i<n; i++) total += i\n",
        ];
        for source in sources {
            let once = fixed(source);
            let second = run(&once);
            assert_eq!(second.output, once, "not idempotent for {:?}", source);
            assert!(
                second.findings.is_empty(),
                "findings on canonical output for {:?}: {:?}",
                source,
                second.findings
            );
        }
    }
}
