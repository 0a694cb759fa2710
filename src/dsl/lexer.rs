//! Lexer (tokenizer) for the VHDL subset.
//!
//! Whitespace is not required around punctuation: `temp;`, `A:` and `port(`
//! each produce two tokens. Keywords and operators must match a whole word,
//! so `inner` is an identifier and never the keyword `in` followed by `ner`.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A reserved word
    Keyword(Keyword),
    /// `:` `;` `'` `.` `,`
    Punctuation(Punctuation),
    /// `(` or `)`
    Paren(Paren),
    /// An operator from one of the operator families
    Operator(Operator),
    /// A signal, type or design unit name
    Identifier(String),
    /// A numeric literal
    Number(f64),
    /// End of file
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword `{}`", kw.as_str()),
            TokenKind::Punctuation(p) => write!(f, "`{}`", p.as_char()),
            TokenKind::Paren(p) => write!(f, "`{}`", p.as_char()),
            TokenKind::Operator(op) => write!(f, "operator `{}`", op),
            TokenKind::Identifier(name) => write!(f, "identifier `{}`", name),
            TokenKind::Number(value) => write!(f, "number {}", value),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Library,
    Use,
    If,
    Then,
    Else,
    Entity,
    Port,
    In,
    Out,
    Of,
    Is,
    Architecture,
    Begin,
    End,
    When,
    Signal,
    Process,
}

impl Keyword {
    /// Look up a keyword by its exact (lowercase) spelling.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "library" => Some(Self::Library),
            "use" => Some(Self::Use),
            "if" => Some(Self::If),
            "then" => Some(Self::Then),
            "else" => Some(Self::Else),
            "entity" => Some(Self::Entity),
            "port" => Some(Self::Port),
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "of" => Some(Self::Of),
            "is" => Some(Self::Is),
            "architecture" => Some(Self::Architecture),
            "begin" => Some(Self::Begin),
            "end" => Some(Self::End),
            "when" => Some(Self::When),
            "signal" => Some(Self::Signal),
            "process" => Some(Self::Process),
            _ => None,
        }
    }

    /// The keyword's source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Use => "use",
            Self::If => "if",
            Self::Then => "then",
            Self::Else => "else",
            Self::Entity => "entity",
            Self::Port => "port",
            Self::In => "in",
            Self::Out => "out",
            Self::Of => "of",
            Self::Is => "is",
            Self::Architecture => "architecture",
            Self::Begin => "begin",
            Self::End => "end",
            Self::When => "when",
            Self::Signal => "signal",
            Self::Process => "process",
        }
    }
}

/// Punctuation marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuation {
    Colon,
    Semicolon,
    Apostrophe,
    Dot,
    Comma,
}

impl Punctuation {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            ':' => Some(Self::Colon),
            ';' => Some(Self::Semicolon),
            '\'' => Some(Self::Apostrophe),
            '.' => Some(Self::Dot),
            ',' => Some(Self::Comma),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Colon => ':',
            Self::Semicolon => ';',
            Self::Apostrophe => '\'',
            Self::Dot => '.',
            Self::Comma => ',',
        }
    }
}

/// Grouping parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paren {
    Left,
    Right,
}

impl Paren {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::Left),
            ')' => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Left => '(',
            Self::Right => ')',
        }
    }
}

/// An operator, tagged with its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Logic(LogicOp),
    Shift(ShiftOp),
    Relational(RelationalOp),
    Assignment(AssignmentOp),
    Misc(MiscOp),
}

impl Operator {
    /// The operator's source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logic(op) => op.as_str(),
            Self::Shift(op) => op.as_str(),
            Self::Relational(op) => op.as_str(),
            Self::Assignment(op) => op.as_str(),
            Self::Misc(op) => op.as_str(),
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Self::Assignment(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Not,
}

impl LogicOp {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "nand" => Some(Self::Nand),
            "nor" => Some(Self::Nor),
            "xor" => Some(Self::Xor),
            "xnor" => Some(Self::Xnor),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
            Self::Not => "not",
        }
    }

    /// Number of operands the operator takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Not => 1,
            _ => 2,
        }
    }
}

/// Shift and rotate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    ShiftLeftLogical,
    ShiftRightLogical,
    ShiftLeftArithmetic,
    ShiftRightArithmetic,
    RotateLeft,
    RotateRight,
}

impl ShiftOp {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "sll" => Some(Self::ShiftLeftLogical),
            "srl" => Some(Self::ShiftRightLogical),
            "sla" => Some(Self::ShiftLeftArithmetic),
            "sra" => Some(Self::ShiftRightArithmetic),
            "rol" => Some(Self::RotateLeft),
            "ror" => Some(Self::RotateRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftLeftLogical => "sll",
            Self::ShiftRightLogical => "srl",
            Self::ShiftLeftArithmetic => "sla",
            Self::ShiftRightArithmetic => "sra",
            Self::RotateLeft => "rol",
            Self::RotateRight => "ror",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl RelationalOp {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "=" => Some(Self::Equal),
            "/=" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            ">" => Some(Self::Greater),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "/=",
            Self::Less => "<",
            Self::Greater => ">",
        }
    }
}

/// Signal (`<=`) and variable (`:=`) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Signal,
    Variable,
}

impl AssignmentOp {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "<=" => Some(Self::Signal),
            ":=" => Some(Self::Variable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signal => "<=",
            Self::Variable => ":=",
        }
    }
}

/// Operators that fit no other family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MiscOp {
    Concatenation,
}

impl MiscOp {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '&' => Some(Self::Concatenation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concatenation => "&",
        }
    }
}

/// The result of one lexer step.
///
/// A word with punctuation glued to its end (`std_logic;`) is recognized in
/// a single step and reported as a bundle of adjacent tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    Single(Token),
    Bundle(Vec<Token>),
}

impl Lexeme {
    /// How many tokens this lexeme stands for.
    pub fn number_of_tokens(&self) -> usize {
        match self {
            Lexeme::Single(_) => 1,
            Lexeme::Bundle(tokens) => tokens.len(),
        }
    }

    fn is_eof(&self) -> bool {
        matches!(self, Lexeme::Single(Token { kind: TokenKind::Eof, .. }))
    }

    fn into_tokens(self) -> Vec<Token> {
        match self {
            Lexeme::Single(token) => vec![token],
            Lexeme::Bundle(tokens) => tokens,
        }
    }
}

/// Lexer for tokenizing source text.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let lexeme = self.next_lexeme();
            let done = lexeme.is_eof();
            tokens.extend(lexeme.into_tokens());
            if done {
                break;
            }
        }
        log::debug!("tokenized {} bytes into {} tokens", self.input.len(), tokens.len());
        tokens
    }

    /// Get the next lexeme.
    pub fn next_lexeme(&mut self) -> Lexeme {
        self.skip_whitespace_and_comments();

        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Lexeme::Single(self.token_here(TokenKind::Eof)),
        };

        if let Some(paren) = Paren::from_char(ch) {
            return Lexeme::Single(self.consume(1, TokenKind::Paren(paren)));
        }
        if let Some(punctuation) = Punctuation::from_char(ch) {
            return Lexeme::Single(self.consume(1, TokenKind::Punctuation(punctuation)));
        }

        if let Some(word) = self.filtered_word() {
            let kind = Keyword::from_word(word)
                .map(TokenKind::Keyword)
                .or_else(|| ShiftOp::from_word(word).map(|op| TokenKind::Operator(Operator::Shift(op))))
                .or_else(|| {
                    RelationalOp::from_word(word).map(|op| TokenKind::Operator(Operator::Relational(op)))
                })
                .or_else(|| LogicOp::from_word(word).map(|op| TokenKind::Operator(Operator::Logic(op))))
                .or_else(|| {
                    AssignmentOp::from_word(word).map(|op| TokenKind::Operator(Operator::Assignment(op)))
                });
            if let Some(kind) = kind {
                return Lexeme::Single(self.consume(word.len(), kind));
            }
        }

        if let Some(op) = MiscOp::from_char(ch) {
            return Lexeme::Single(self.consume(ch.len_utf8(), TokenKind::Operator(Operator::Misc(op))));
        }

        self.identifier_or_number()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn token_here(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            line: self.line,
            column: self.column,
        }
    }

    /// Build a token at the current position, then move past `len` bytes.
    fn consume(&mut self, len: usize, kind: TokenKind) -> Token {
        let token = self.token_here(kind);
        self.advance(len);
        token
    }

    fn advance(&mut self, len: usize) {
        let end = (self.pos + len).min(self.input.len());
        for ch in self.input[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let rest = &self.input[self.pos..];
            if rest.starts_with("--") {
                let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
                self.advance(len);
            } else if let Some(ch) = rest.chars().next().filter(|ch| ch.is_whitespace()) {
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
    }

    /// The run of characters up to the next whitespace, `,` or `.`.
    fn current_word(&self) -> &'a str {
        let input: &'a str = self.input;
        let rest = &input[self.pos..];
        let end = rest.find(is_word_separator).unwrap_or(rest.len());
        &rest[..end]
    }

    /// The current word cut at the first `(`, without trailing punctuation.
    /// Keywords and operators must equal this text exactly.
    fn filtered_word(&self) -> Option<&'a str> {
        let word = self.current_word();
        let word = word.split('(').next().unwrap_or(word);
        let word = word.trim_end_matches(|ch| Punctuation::from_char(ch).is_some() || Paren::from_char(ch).is_some());
        if word.is_empty() {
            None
        } else {
            Some(word)
        }
    }

    /// A `;` ending a word only terminates a statement when followed by
    /// whitespace or the end of input.
    fn terminator_allowed_after(&self, len: usize) -> bool {
        self.input[self.pos + len..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    }

    fn identifier_or_number(&mut self) -> Lexeme {
        let word = self.current_word();
        let mut base = word;
        // (kind, byte offset inside the word), in stripping order
        let mut trailing = Vec::new();

        while let Some(last) = base.chars().last() {
            let kind = if let Some(punctuation) = Punctuation::from_char(last) {
                if punctuation == Punctuation::Semicolon && !self.terminator_allowed_after(base.len()) {
                    break;
                }
                TokenKind::Punctuation(punctuation)
            } else if let Some(paren) = Paren::from_char(last) {
                TokenKind::Paren(paren)
            } else {
                break;
            };
            let offset = base.len() - last.len_utf8();
            trailing.push((kind, offset));
            base = &base[..offset];
        }

        let (line, column) = (self.line, self.column);
        let mut tokens = Vec::with_capacity(trailing.len() + 1);
        if !base.is_empty() {
            tokens.push(Token {
                kind: classify(base),
                line,
                column,
            });
        }
        for (kind, offset) in trailing.into_iter().rev() {
            tokens.push(Token {
                kind,
                line,
                column: column + word[..offset].chars().count(),
            });
        }
        self.advance(word.len());

        if tokens.len() == 1 {
            Lexeme::Single(tokens.remove(0))
        } else {
            Lexeme::Bundle(tokens)
        }
    }
}

fn is_word_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == ',' || ch == '.'
}

/// A word is a numeral if it starts like one and parses as a float;
/// `nan` or `inf` stay identifiers.
fn classify(word: &str) -> TokenKind {
    let mut chars = word.chars();
    let starts_numeric = match chars.next() {
        Some(ch) if ch.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.next().map_or(false, |ch| ch.is_ascii_digit()),
        _ => false,
    };
    match word.parse::<f64>() {
        Ok(value) if starts_numeric => TokenKind::Number(value),
        _ => TokenKind::Identifier(word.to_string()),
    }
}
