//! Go lexer with automatic semicolon insertion.

use crate::tokens::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("{line}:{col}: invalid character {ch:?}")]
    UnexpectedChar { ch: char, line: usize, col: usize },
    #[error("{line}:{col}: string literal not terminated")]
    UnterminatedString { line: usize, col: usize },
    #[error("{line}:{col}: raw string literal not terminated")]
    UnterminatedRawString { line: usize, col: usize },
    #[error("{line}:{col}: rune literal not terminated")]
    UnterminatedRune { line: usize, col: usize },
    #[error("{line}:{col}: comment not terminated")]
    UnterminatedComment { line: usize, col: usize },
    #[error("{line}:{col}: invalid number literal {text:?}")]
    InvalidNumber { text: String, line: usize, col: usize },
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    byte_offset: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self { source: source.chars().collect(), pos: 0, line: 1, col: 1, byte_offset: 0 }
    }

    fn current(&self) -> Option<char> { self.source.get(self.pos).copied() }
    fn peek(&self) -> Option<char> { self.source.get(self.pos + 1).copied() }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' { self.line += 1; self.col = 1; } else { self.col += 1; }
        Some(ch)
    }

    fn span_here(&self) -> Span {
        Span::new(self.byte_offset, self.byte_offset, self.line, self.col)
    }

    fn span_from(&self, so: usize, sl: usize, sc: usize) -> Span {
        Span::new(so, self.byte_offset, sl, sc)
    }

    fn insert_semicolon(tokens: &mut Vec<Token>, span: Span) {
        if tokens.last().is_some_and(|t| t.kind.ends_statement()) {
            tokens.push(Token::new(TokenKind::Semicolon { auto: true }, span));
        }
    }

    fn read_ident(&mut self) -> Token {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' { word.push(ch); self.advance(); } else { break; }
        }
        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Ident(word));
        Token::new(kind, self.span_from(so, sl, sc))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        let mut text = String::new();
        let mut is_float = false;
        let radix_prefix = self.current() == Some('0')
            && matches!(self.peek(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O'));
        if radix_prefix {
            text.push('0'); self.advance();
            if let Some(p) = self.advance() { text.push(p); }
        }
        let hex = radix_prefix && text.ends_with(['x', 'X']);
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() || ch == '_' || (hex && ch.is_ascii_hexdigit()) {
                text.push(ch); self.advance();
            } else if ch == '.' && !is_float && (!radix_prefix || hex) {
                is_float = true; text.push(ch); self.advance();
            } else if (!hex && matches!(ch, 'e' | 'E')) || (hex && matches!(ch, 'p' | 'P')) {
                is_float = true; text.push(ch); self.advance();
                if let Some(sign @ ('+' | '-')) = self.current() { text.push(sign); self.advance(); }
                if !matches!(self.current(), Some(d) if d.is_ascii_digit()) {
                    return Err(LexError::InvalidNumber { text, line: sl, col: sc });
                }
            } else { break; }
        }
        if text.ends_with('_') || (radix_prefix && text.len() == 2) {
            return Err(LexError::InvalidNumber { text, line: sl, col: sc });
        }
        if !hex && !is_float && text.len() > 1 && text.starts_with('0') && !radix_prefix
            && text.chars().any(|c| matches!(c, '8' | '9')) && self.current() != Some('i')
        {
            return Err(LexError::InvalidNumber { text, line: sl, col: sc });
        }
        let kind = if self.current() == Some('i') {
            text.push('i'); self.advance();
            TokenKind::Imag(text)
        } else if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        };
        if matches!(self.current(), Some(c) if c.is_alphanumeric() || c == '_') {
            let mut bad = kind_text(&kind);
            while let Some(c) = self.current().filter(|c| c.is_alphanumeric() || *c == '_') {
                bad.push(c); self.advance();
            }
            return Err(LexError::InvalidNumber { text: bad, line: sl, col: sc });
        }
        Ok(Token::new(kind, self.span_from(so, sl, sc)))
    }

    /// Reads a quoted literal, keeping escapes as written.
    fn read_quoted(&mut self, quote: char) -> Result<String, LexError> {
        let (sl, sc) = (self.line, self.col);
        let unterminated = || if quote == '\'' {
            LexError::UnterminatedRune { line: sl, col: sc }
        } else {
            LexError::UnterminatedString { line: sl, col: sc }
        };
        let mut text = String::new();
        text.push(quote);
        self.advance();
        loop {
            match self.current() {
                None | Some('\n') => return Err(unterminated()),
                Some('\\') => {
                    text.push('\\'); self.advance();
                    match self.advance() {
                        Some('\n') | None => return Err(unterminated()),
                        Some(c) => text.push(c),
                    }
                }
                Some(c) if c == quote => { text.push(c); self.advance(); break; }
                Some(c) => { text.push(c); self.advance(); }
            }
        }
        Ok(text)
    }

    fn read_raw_string(&mut self) -> Result<String, LexError> {
        let (sl, sc) = (self.line, self.col);
        let mut text = String::from('`');
        self.advance();
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedRawString { line: sl, col: sc }),
                Some('`') => { text.push('`'); break; }
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }

    /// Skips a `/* */` comment; returns whether it spanned a newline.
    fn skip_block_comment(&mut self) -> Result<bool, LexError> {
        let (sl, sc) = (self.line, self.col);
        self.advance(); self.advance();
        let mut newline = false;
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedComment { line: sl, col: sc }),
                Some('*') if self.current() == Some('/') => { self.advance(); return Ok(newline); }
                Some('\n') => newline = true,
                Some(_) => {}
            }
        }
    }

    fn operator(&mut self, candidates: &[(&'static str, TokenKind)]) -> Token {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        for (text, kind) in candidates {
            let matches = text.chars().enumerate().all(|(i, c)| self.source.get(self.pos + i) == Some(&c));
            if matches {
                for _ in 0..text.chars().count() { self.advance(); }
                return Token::new(kind.clone(), self.span_from(so, sl, sc));
            }
        }
        unreachable!("operator table always ends with the single-character form")
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();
        while let Some(ch) = self.current() {
            match ch {
                '\n' => { Self::insert_semicolon(&mut tokens, self.span_here()); self.advance(); }
                ' ' | '\t' | '\r' => { self.advance(); }
                '/' if self.peek() == Some('/') => {
                    while matches!(self.current(), Some(c) if c != '\n') { self.advance(); }
                }
                '/' if self.peek() == Some('*') => {
                    let span = self.span_here();
                    if self.skip_block_comment()? { Self::insert_semicolon(&mut tokens, span); }
                }
                '"' | '\'' => {
                    let (so, sl, sc) = (self.byte_offset, self.line, self.col);
                    let text = self.read_quoted(ch)?;
                    let kind = if ch == '"' { TokenKind::Str(text) } else { TokenKind::Char(text) };
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                '`' => {
                    let (so, sl, sc) = (self.byte_offset, self.line, self.col);
                    let text = self.read_raw_string()?;
                    tokens.push(Token::new(TokenKind::Str(text), self.span_from(so, sl, sc)));
                }
                '0'..='9' => tokens.push(self.read_number()?),
                '.' if matches!(self.peek(), Some(d) if d.is_ascii_digit()) => tokens.push(self.read_number()?),
                c if c.is_alphabetic() || c == '_' => tokens.push(self.read_ident()),
                '+' => tokens.push(self.operator(&[("++", TokenKind::Inc), ("+=", TokenKind::OpAssign("+=")), ("+", TokenKind::Add)])),
                '-' => tokens.push(self.operator(&[("--", TokenKind::Dec), ("-=", TokenKind::OpAssign("-=")), ("-", TokenKind::Sub)])),
                '*' => tokens.push(self.operator(&[("*=", TokenKind::OpAssign("*=")), ("*", TokenKind::Mul)])),
                '/' => tokens.push(self.operator(&[("/=", TokenKind::OpAssign("/=")), ("/", TokenKind::Quo)])),
                '%' => tokens.push(self.operator(&[("%=", TokenKind::OpAssign("%=")), ("%", TokenKind::Rem)])),
                '&' => tokens.push(self.operator(&[
                    ("&^=", TokenKind::OpAssign("&^=")), ("&^", TokenKind::AndNot), ("&&", TokenKind::LAnd),
                    ("&=", TokenKind::OpAssign("&=")), ("&", TokenKind::And),
                ])),
                '|' => tokens.push(self.operator(&[("||", TokenKind::LOr), ("|=", TokenKind::OpAssign("|=")), ("|", TokenKind::Or)])),
                '^' => tokens.push(self.operator(&[("^=", TokenKind::OpAssign("^=")), ("^", TokenKind::Xor)])),
                '<' => tokens.push(self.operator(&[
                    ("<<=", TokenKind::OpAssign("<<=")), ("<<", TokenKind::Shl), ("<-", TokenKind::Arrow),
                    ("<=", TokenKind::Leq), ("<", TokenKind::Lss),
                ])),
                '>' => tokens.push(self.operator(&[
                    (">>=", TokenKind::OpAssign(">>=")), (">>", TokenKind::Shr), (">=", TokenKind::Geq), (">", TokenKind::Gtr),
                ])),
                '=' => tokens.push(self.operator(&[("==", TokenKind::Eql), ("=", TokenKind::Assign)])),
                '!' => tokens.push(self.operator(&[("!=", TokenKind::Neq), ("!", TokenKind::Not)])),
                ':' => tokens.push(self.operator(&[(":=", TokenKind::Define), (":", TokenKind::Colon)])),
                '.' => tokens.push(self.operator(&[("...", TokenKind::Ellipsis), (".", TokenKind::Period)])),
                '~' => tokens.push(self.operator(&[("~", TokenKind::Tilde)])),
                ',' => tokens.push(self.operator(&[(",", TokenKind::Comma)])),
                ';' => tokens.push(self.operator(&[(";", TokenKind::Semicolon { auto: false })])),
                '(' => tokens.push(self.operator(&[("(", TokenKind::LParen)])),
                ')' => tokens.push(self.operator(&[(")", TokenKind::RParen)])),
                '[' => tokens.push(self.operator(&[("[", TokenKind::LBrack)])),
                ']' => tokens.push(self.operator(&[("]", TokenKind::RBrack)])),
                '{' => tokens.push(self.operator(&[("{", TokenKind::LBrace)])),
                '}' => tokens.push(self.operator(&[("}", TokenKind::RBrace)])),
                _ => return Err(LexError::UnexpectedChar { ch, line: self.line, col: self.col }),
            }
        }
        Self::insert_semicolon(&mut tokens, self.span_here());
        tokens.push(Token::new(TokenKind::Eof, self.span_here()));
        Ok(tokens)
    }
}

fn kind_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Int(s) | TokenKind::Float(s) | TokenKind::Imag(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_define() {
        let k = kinds("a := 1");
        assert!(matches!(&k[0], TokenKind::Ident(s) if s == "a"));
        assert_eq!(k[1], TokenKind::Define);
        assert!(matches!(&k[2], TokenKind::Int(s) if s == "1"));
        assert_eq!(k[3], TokenKind::Semicolon { auto: true });
        assert_eq!(k[4], TokenKind::Eof);
    }

    #[test]
    fn test_lex_no_semicolon_after_operator() {
        let k = kinds("a +");
        assert_eq!(k, vec![TokenKind::Ident("a".into()), TokenKind::Add, TokenKind::Eof]);
    }

    #[test]
    fn test_lex_maximal_munch() {
        let k = kinds("x &^= y << 2 <- ch");
        assert_eq!(k[1], TokenKind::OpAssign("&^="));
        assert_eq!(k[3], TokenKind::Shl);
        assert_eq!(k[5], TokenKind::Arrow);
    }

    #[test]
    fn test_lex_strings_and_runes() {
        let k = kinds(r#"s := "a\"b" + `raw\n` + string('x')"#);
        assert!(matches!(&k[2], TokenKind::Str(s) if s == r#""a\"b""#));
        assert!(matches!(&k[4], TokenKind::Str(s) if s == "`raw\\n`"));
        assert!(k.iter().any(|t| matches!(t, TokenKind::Char(s) if s == "'x'")));
    }

    #[test]
    fn test_lex_numbers() {
        let k = kinds("0x1F 1_000 3.14 .5 1e9 2i 0b101");
        assert!(matches!(&k[0], TokenKind::Int(s) if s == "0x1F"));
        assert!(matches!(&k[1], TokenKind::Int(s) if s == "1_000"));
        assert!(matches!(&k[2], TokenKind::Float(s) if s == "3.14"));
        assert!(matches!(&k[3], TokenKind::Float(s) if s == ".5"));
        assert!(matches!(&k[4], TokenKind::Float(s) if s == "1e9"));
        assert!(matches!(&k[5], TokenKind::Imag(s) if s == "2i"));
        assert!(matches!(&k[6], TokenKind::Int(s) if s == "0b101"));
    }

    #[test]
    fn test_lex_comments() {
        let k = kinds("x++ // bump\n");
        assert_eq!(k, vec![
            TokenKind::Ident("x".into()), TokenKind::Inc,
            TokenKind::Semicolon { auto: true }, TokenKind::Eof,
        ]);
        let k = kinds("a /* inline */ + b");
        assert_eq!(k[1], TokenKind::Add);
    }

    #[test]
    fn test_lex_errors() {
        assert!(matches!(Lexer::new(r#"s := "open"#).tokenize(), Err(LexError::UnterminatedString { col: 6, .. })));
        assert!(matches!(Lexer::new("r := 'x").tokenize(), Err(LexError::UnterminatedRune { .. })));
        assert!(matches!(Lexer::new("a := 1 /* x").tokenize(), Err(LexError::UnterminatedComment { .. })));
        assert!(matches!(Lexer::new("a := 1 @ 2").tokenize(), Err(LexError::UnexpectedChar { ch: '@', .. })));
        assert!(matches!(Lexer::new("n := 12abc").tokenize(), Err(LexError::InvalidNumber { .. })));
    }
}
