use std::fmt;

/// Source location inside a submitted fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the start in the fragment
    pub start: usize,
    /// Byte offset of the end (exclusive) in the fragment
    pub end: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub col: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, col: usize) -> Self {
        Self { start, end, line, col }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            col: if self.line <= other.line { self.col } else { other.col },
        }
    }
}

/// Token types for Go source
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals (kept as written)
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    Str(String),

    Ident(String),

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Operators
    Add,     // +
    Sub,     // -
    Mul,     // *
    Quo,     // /
    Rem,     // %
    And,     // &
    Or,      // |
    Xor,     // ^
    Shl,     // <<
    Shr,     // >>
    AndNot,  // &^
    OpAssign(&'static str), // +=, -=, <<=, ...
    LAnd,    // &&
    LOr,     // ||
    Arrow,   // <-
    Inc,     // ++
    Dec,     // --
    Eql,     // ==
    Lss,     // <
    Gtr,     // >
    Assign,  // =
    Not,     // !
    Neq,     // !=
    Leq,     // <=
    Geq,     // >=
    Define,  // :=
    Ellipsis,
    Tilde,

    // Delimiters
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Period,
    Colon,
    /// `;` written by the user, or inserted at a line end (`auto == true`)
    Semicolon { auto: bool },

    Eof,
}

impl TokenKind {
    /// Maps an identifier-shaped word to its keyword, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "chan" => TokenKind::Chan,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "else" => TokenKind::Else,
            "fallthrough" => TokenKind::Fallthrough,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "package" => TokenKind::Package,
            "range" => TokenKind::Range,
            "return" => TokenKind::Return,
            "select" => TokenKind::Select,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            _ => return None,
        };
        Some(kind)
    }

    /// Binary operator precedence, 0 when the token is not a binary operator.
    pub fn precedence(&self) -> u8 {
        match self {
            TokenKind::LOr => 1,
            TokenKind::LAnd => 2,
            TokenKind::Eql
            | TokenKind::Neq
            | TokenKind::Lss
            | TokenKind::Leq
            | TokenKind::Gtr
            | TokenKind::Geq => 3,
            TokenKind::Add | TokenKind::Sub | TokenKind::Or | TokenKind::Xor => 4,
            TokenKind::Mul
            | TokenKind::Quo
            | TokenKind::Rem
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::And
            | TokenKind::AndNot => 5,
            _ => 0,
        }
    }

    /// Whether a newline directly after this token ends the statement.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::Str(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBrack
                | TokenKind::RBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(s)
            | TokenKind::Float(s)
            | TokenKind::Imag(s)
            | TokenKind::Char(s)
            | TokenKind::Str(s) => write!(f, "literal {}", s),
            TokenKind::Ident(s) => write!(f, "identifier {}", s),
            TokenKind::Break => write!(f, "'break'"),
            TokenKind::Case => write!(f, "'case'"),
            TokenKind::Chan => write!(f, "'chan'"),
            TokenKind::Const => write!(f, "'const'"),
            TokenKind::Continue => write!(f, "'continue'"),
            TokenKind::Default => write!(f, "'default'"),
            TokenKind::Defer => write!(f, "'defer'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::Fallthrough => write!(f, "'fallthrough'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::Func => write!(f, "'func'"),
            TokenKind::Go => write!(f, "'go'"),
            TokenKind::Goto => write!(f, "'goto'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Import => write!(f, "'import'"),
            TokenKind::Interface => write!(f, "'interface'"),
            TokenKind::Map => write!(f, "'map'"),
            TokenKind::Package => write!(f, "'package'"),
            TokenKind::Range => write!(f, "'range'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Select => write!(f, "'select'"),
            TokenKind::Struct => write!(f, "'struct'"),
            TokenKind::Switch => write!(f, "'switch'"),
            TokenKind::Type => write!(f, "'type'"),
            TokenKind::Var => write!(f, "'var'"),
            TokenKind::Add => write!(f, "'+'"),
            TokenKind::Sub => write!(f, "'-'"),
            TokenKind::Mul => write!(f, "'*'"),
            TokenKind::Quo => write!(f, "'/'"),
            TokenKind::Rem => write!(f, "'%'"),
            TokenKind::And => write!(f, "'&'"),
            TokenKind::Or => write!(f, "'|'"),
            TokenKind::Xor => write!(f, "'^'"),
            TokenKind::Shl => write!(f, "'<<'"),
            TokenKind::Shr => write!(f, "'>>'"),
            TokenKind::AndNot => write!(f, "'&^'"),
            TokenKind::OpAssign(op) => write!(f, "'{}'", op),
            TokenKind::LAnd => write!(f, "'&&'"),
            TokenKind::LOr => write!(f, "'||'"),
            TokenKind::Arrow => write!(f, "'<-'"),
            TokenKind::Inc => write!(f, "'++'"),
            TokenKind::Dec => write!(f, "'--'"),
            TokenKind::Eql => write!(f, "'=='"),
            TokenKind::Lss => write!(f, "'<'"),
            TokenKind::Gtr => write!(f, "'>'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Not => write!(f, "'!'"),
            TokenKind::Neq => write!(f, "'!='"),
            TokenKind::Leq => write!(f, "'<='"),
            TokenKind::Geq => write!(f, "'>='"),
            TokenKind::Define => write!(f, "':='"),
            TokenKind::Ellipsis => write!(f, "'...'"),
            TokenKind::Tilde => write!(f, "'~'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrack => write!(f, "'['"),
            TokenKind::RBrack => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Period => write!(f, "'.'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon { auto: true } => write!(f, "newline"),
            TokenKind::Semicolon { auto: false } => write!(f, "';'"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
