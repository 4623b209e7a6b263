//! Recursive descent parser with precedence climbing for Go statements.
//!
//! The parser accepts one fragment at a time: a single statement (simple,
//! compound or declaration), an import declaration, or a bare expression.
//! Anything left over after the first top-level statement is rejected.

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::tokens::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{line}:{col}: syntax error: unexpected {found}, expected {expected}")]
    Unexpected { found: String, expected: String, line: usize, col: usize },
    #[error("{line}:{col}: syntax error: {message}")]
    Invalid { message: String, line: usize, col: usize },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Nesting level for composite literals: < 0 inside control clause headers
    expr_lev: i32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let span = tokens.last().map(|t| t.span).unwrap_or(crate::tokens::Span::new(0, 0, 1, 1));
            tokens.push(Token::new(TokenKind::Eof, span));
        }
        Self { tokens, pos: 0, expr_lev: 0 }
    }

    pub fn from_source(source: &str) -> Result<Self, ParseError> {
        Ok(Self::new(Lexer::new(source).tokenize()?))
    }

    fn current(&self) -> &Token { &self.tokens[self.pos.min(self.tokens.len() - 1)] }

    fn peek_kind(&self) -> &TokenKind { &self.current().kind }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 { self.pos += 1; }
        tok
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn at_semicolon(&self) -> bool { matches!(self.peek_kind(), TokenKind::Semicolon { .. }) }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) { Ok(self.advance()) } else { Err(self.unexpected(&kind.to_string())) }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => { self.advance(); Ok(name) }
            _ => Err(self.unexpected("name")),
        }
    }

    /// A statement ends at `;`; a closing `)` or `}` also ends it without being consumed.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Semicolon { .. } => { self.advance(); Ok(()) }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("';' or newline")),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        ParseError::Unexpected {
            found: tok.kind.to_string(), expected: expected.to_string(),
            line: tok.span.line, col: tok.span.col,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ParseError {
        let tok = self.current();
        ParseError::Invalid { message: message.into(), line: tok.span.line, col: tok.span.col }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.at_semicolon() { self.advance(); }
        if self.at(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.invalid(format!("unexpected {} after top level statement", self.peek_kind())))
        }
    }

    // ── Entry points ──

    /// Parses exactly one statement, the whole fragment.
    pub fn parse_fragment(&mut self) -> Result<Stmt, ParseError> {
        if self.at(&TokenKind::RBrace) {
            return Err(self.unexpected("statement"));
        }
        let stmt = self.parse_stmt()?;
        self.expect_end()?;
        Ok(stmt)
    }

    /// Parses `import "path"` or a parenthesized import group.
    pub fn parse_import_decl(&mut self) -> Result<Vec<ImportSpec>, ParseError> {
        self.expect(&TokenKind::Import)?;
        let mut specs = Vec::new();
        if self.at(&TokenKind::LParen) {
            self.advance();
            while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
                specs.push(self.parse_import_spec()?);
                self.expect_semi()?;
            }
            self.expect(&TokenKind::RParen)?;
        } else {
            specs.push(self.parse_import_spec()?);
        }
        self.expect_end()?;
        Ok(specs)
    }

    /// Parses a lone expression, the whole fragment.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        self.expect_end()?;
        Ok(expr)
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.peek_kind().clone() {
            TokenKind::Ident(name) => { self.advance(); Some(name) }
            TokenKind::Period => { self.advance(); Some(".".to_string()) }
            _ => None,
        };
        match self.peek_kind().clone() {
            TokenKind::Str(lit) => {
                let path = lit.trim_matches(|c| c == '"' || c == '`').to_string();
                if path.is_empty() {
                    return Err(self.invalid("invalid import path: empty string"));
                }
                self.advance();
                Ok(ImportSpec { name, path })
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    // ── Statements ──

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Const | TokenKind::Type | TokenKind::Var => {
                let decl = self.parse_decl()?;
                self.expect_semi()?;
                Ok(decl)
            }
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imag(_)
            | TokenKind::Char(_)
            | TokenKind::Str(_)
            | TokenKind::Func
            | TokenKind::LParen
            | TokenKind::LBrack
            | TokenKind::Struct
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Interface
            | TokenKind::Add
            | TokenKind::Sub
            | TokenKind::Mul
            | TokenKind::And
            | TokenKind::Xor
            | TokenKind::Arrow
            | TokenKind::Not
            | TokenKind::Tilde => {
                let stmt = self.parse_simple_stmt(true, false)?;
                if !matches!(stmt, Stmt::Labeled(..)) { self.expect_semi()?; }
                Ok(stmt)
            }
            TokenKind::Go | TokenKind::Defer => {
                let go = self.at(&TokenKind::Go);
                self.advance();
                let call = self.parse_expr()?;
                if !matches!(call, Expr::Call(..)) {
                    let keyword = if go { "go" } else { "defer" };
                    return Err(self.invalid(format!("expression in {} must be function call", keyword)));
                }
                self.expect_semi()?;
                Ok(if go { Stmt::Go(call) } else { Stmt::Defer(call) })
            }
            TokenKind::Return => {
                self.advance();
                let results = if self.at_semicolon() || self.at(&TokenKind::RBrace) || self.at(&TokenKind::Eof) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                self.expect_semi()?;
                Ok(Stmt::Return(results))
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                let kind = match self.advance().kind {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    TokenKind::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label = match self.peek_kind().clone() {
                    TokenKind::Ident(name) if kind != BranchKind::Fallthrough => { self.advance(); Some(name) }
                    _ => None,
                };
                self.expect_semi()?;
                Ok(Stmt::Branch(kind, label))
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                self.expect_semi()?;
                Ok(Stmt::Block(block))
            }
            TokenKind::If => { let s = self.parse_if()?; self.expect_semi()?; Ok(s) }
            TokenKind::Switch => { let s = self.parse_switch()?; self.expect_semi()?; Ok(s) }
            TokenKind::Select => { let s = self.parse_select()?; self.expect_semi()?; Ok(s) }
            TokenKind::For => { let s = self.parse_for()?; self.expect_semi()?; Ok(s) }
            TokenKind::Semicolon { .. } => { self.advance(); Ok(Stmt::Empty) }
            TokenKind::RBrace | TokenKind::Eof => Ok(Stmt::Empty),
            _ => Err(self.unexpected("statement")),
        }
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list()?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { stmts })
    }

    fn parse_simple_stmt(&mut self, label_ok: bool, range_ok: bool) -> Result<Stmt, ParseError> {
        let mut lhs = self.parse_expr_list()?;

        let op = match self.peek_kind() {
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::OpAssign(op) => Some(AssignOp::Compound(*op)),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            if range_ok && self.at(&TokenKind::Range) {
                if let AssignOp::Compound(_) = op {
                    return Err(self.unexpected("expression"));
                }
                self.advance();
                let expr = self.parse_expr()?;
                if lhs.len() > 2 {
                    return Err(self.invalid("range clause permits at most two iteration variables"));
                }
                let mut vars = lhs.into_iter();
                return Ok(Stmt::Range {
                    key: vars.next(), value: vars.next(),
                    define: op == AssignOp::Define, expr, body: Block::default(),
                });
            }
            let rhs = self.parse_expr_list()?;
            if let AssignOp::Compound(text) = op {
                if lhs.len() > 1 || rhs.len() > 1 {
                    return Err(self.invalid(format!("assignment operation {} requires single-valued expressions", text)));
                }
            }
            return Ok(Stmt::Assign { lhs, op, rhs });
        }

        if lhs.len() > 1 {
            return Err(self.unexpected("':=' or '=' or comma"));
        }
        let x = lhs.pop().ok_or_else(|| self.unexpected("expression"))?;

        match self.peek_kind() {
            TokenKind::Colon if label_ok => match x {
                Expr::Ident(label) => {
                    self.advance();
                    if self.at(&TokenKind::RBrace) || self.at(&TokenKind::Eof) {
                        return Ok(Stmt::Labeled(label, Box::new(Stmt::Empty)));
                    }
                    let inner = self.parse_stmt()?;
                    Ok(Stmt::Labeled(label, Box::new(inner)))
                }
                x => Ok(Stmt::Expr(x)),
            },
            TokenKind::Arrow => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Send(x, value))
            }
            TokenKind::Inc => { self.advance(); Ok(Stmt::IncDec(x, true)) }
            TokenKind::Dec => { self.advance(); Ok(Stmt::IncDec(x, false)) }
            _ => Ok(Stmt::Expr(x)),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::If)?;
        if self.at(&TokenKind::LBrace) {
            return Err(self.invalid("missing condition in if statement"));
        }
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let mut init = None;
        let mut cond = None;
        if !self.at_semicolon() {
            cond = Some(self.parse_simple_stmt(false, false)?);
        }
        if self.at_semicolon() {
            self.advance();
            init = cond.take();
            if !self.at(&TokenKind::LBrace) {
                cond = Some(self.parse_simple_stmt(false, false)?);
            }
        }
        self.expr_lev = outer;

        let cond = match cond {
            Some(Stmt::Expr(e)) => e,
            Some(_) => return Err(self.invalid("cannot use assignment as value in if condition")),
            None => return Err(self.invalid("missing condition in if statement")),
        };
        let then = self.parse_block()?;
        let els = if self.at(&TokenKind::Else) {
            self.advance();
            match self.peek_kind() {
                TokenKind::If => Some(Box::new(self.parse_if()?)),
                TokenKind::LBrace => Some(Box::new(Stmt::Block(self.parse_block()?))),
                _ => return Err(self.unexpected("if statement or block")),
            }
        } else {
            None
        };
        Ok(Stmt::If { init: init.map(Box::new), cond, then, els })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::For)?;
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let (mut s1, mut s2, mut s3) = (None, None, None);
        let mut is_range = false;
        if !self.at(&TokenKind::LBrace) {
            if !self.at_semicolon() {
                if self.at(&TokenKind::Range) {
                    // for range x
                    self.advance();
                    let expr = self.parse_expr()?;
                    s2 = Some(Stmt::Range { key: None, value: None, define: false, expr, body: Block::default() });
                } else {
                    s2 = Some(self.parse_simple_stmt(false, true)?);
                }
                is_range = matches!(s2, Some(Stmt::Range { .. }));
            }
            if !is_range && self.at_semicolon() {
                self.advance();
                s1 = s2.take();
                if !self.at_semicolon() {
                    s2 = Some(self.parse_simple_stmt(false, false)?);
                }
                if !self.at_semicolon() {
                    return Err(self.unexpected("';' in for clause"));
                }
                self.advance();
                if !self.at(&TokenKind::LBrace) {
                    s3 = Some(self.parse_simple_stmt(false, false)?);
                }
            }
        }
        self.expr_lev = outer;
        let body = self.parse_block()?;

        let cond = match s2 {
            Some(Stmt::Range { key, value, define, expr, .. }) => {
                return Ok(Stmt::Range { key, value, define, expr, body });
            }
            Some(Stmt::Expr(e)) => Some(e),
            Some(_) => return Err(self.invalid("expected for loop condition")),
            None => None,
        };
        Ok(Stmt::For { init: s1.map(Box::new), cond, post: s3.map(Box::new), body })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Switch)?;
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let (mut s1, mut s2) = (None, None);
        if !self.at(&TokenKind::LBrace) {
            if !self.at_semicolon() {
                s2 = Some(self.parse_simple_stmt(false, false)?);
            }
            if self.at_semicolon() {
                self.advance();
                s1 = s2.take();
                if !self.at(&TokenKind::LBrace) {
                    s2 = Some(self.parse_simple_stmt(false, false)?);
                }
            }
        }
        self.expr_lev = outer;

        let type_switch = match &s2 {
            Some(Stmt::Expr(Expr::TypeAssert(_, None))) => true,
            Some(Stmt::Assign { op: AssignOp::Define, rhs, .. }) => {
                matches!(rhs.as_slice(), [Expr::TypeAssert(_, None)])
            }
            _ => false,
        };

        self.expect(&TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let list = match self.peek_kind() {
                TokenKind::Case => { self.advance(); Some(self.parse_expr_list()?) }
                TokenKind::Default => { self.advance(); None }
                _ => return Err(self.unexpected("case or default")),
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CaseClause { list, body });
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::Switch { init: s1.map(Box::new), tag: s2.map(Box::new), type_switch, clauses })
    }

    fn parse_select(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Select)?;
        self.expect(&TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let comm = match self.peek_kind() {
                TokenKind::Case => { self.advance(); Some(Box::new(self.parse_simple_stmt(false, false)?)) }
                TokenKind::Default => { self.advance(); None }
                _ => return Err(self.unexpected("case or default")),
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause { comm, body });
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::Select(clauses))
    }

    // ── Declarations ──

    fn parse_decl(&mut self) -> Result<Stmt, ParseError> {
        let keyword = match self.advance().kind {
            TokenKind::Var => DeclKeyword::Var,
            TokenKind::Const => DeclKeyword::Const,
            _ => DeclKeyword::Type,
        };
        let mut specs = Vec::new();
        if self.at(&TokenKind::LParen) {
            self.advance();
            let mut index = 0;
            while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
                specs.push(self.parse_spec(keyword, index)?);
                self.expect_semi()?;
                index += 1;
            }
            self.expect(&TokenKind::RParen)?;
        } else {
            specs.push(self.parse_spec(keyword, 0)?);
        }
        Ok(Stmt::Decl { keyword, specs })
    }

    fn parse_spec(&mut self, keyword: DeclKeyword, index: usize) -> Result<Spec, ParseError> {
        if keyword == DeclKeyword::Type {
            let name = self.expect_ident()?;
            let alias = self.at(&TokenKind::Assign);
            if alias { self.advance(); }
            let ty = self.parse_type()?;
            return Ok(Spec::Type { name, alias, ty });
        }

        let mut names = vec![self.expect_ident()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_ident()?);
        }
        let ty = if self.at(&TokenKind::Assign)
            || self.at_semicolon()
            || self.at(&TokenKind::RParen)
            || self.at(&TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.at(&TokenKind::Assign) {
            self.advance();
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        match keyword {
            DeclKeyword::Var if ty.is_none() && values.is_empty() => {
                Err(self.invalid("missing variable type or initialization"))
            }
            DeclKeyword::Const if values.is_empty() && (index == 0 || ty.is_some()) => {
                Err(self.invalid("missing init expr for const declaration"))
            }
            _ => Ok(Spec::Value { names, ty, values }),
        }
    }

    // ── Expressions ──

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![self.parse_expr()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> { self.parse_binary(1) }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut x = self.parse_unary()?;
        loop {
            let prec = self.peek_kind().precedence();
            if prec < min_prec {
                return Ok(x);
            }
            let op = self.advance().kind;
            let y = self.parse_binary(prec + 1)?;
            x = Expr::Binary(Box::new(x), op, Box::new(y));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Add | TokenKind::Sub | TokenKind::Not | TokenKind::Xor | TokenKind::And | TokenKind::Tilde => {
                let op = self.advance().kind;
                let x = self.parse_unary()?;
                Ok(Expr::Unary(op, Box::new(x)))
            }
            TokenKind::Arrow => {
                self.advance();
                let x = self.parse_unary()?;
                // <-chan T is a type, not a receive
                match x {
                    Expr::ChanType(ChanDir::Both, elem) => Ok(Expr::ChanType(ChanDir::Recv, elem)),
                    Expr::ChanType(..) => Err(self.invalid("invalid channel direction")),
                    x => Ok(Expr::Unary(TokenKind::Arrow, Box::new(x))),
                }
            }
            TokenKind::Mul => {
                self.advance();
                let x = self.parse_unary()?;
                Ok(Expr::Star(Box::new(x)))
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let mut x = self.parse_operand()?;
        loop {
            match self.peek_kind() {
                TokenKind::Period => {
                    self.advance();
                    match self.peek_kind().clone() {
                        TokenKind::Ident(name) => {
                            self.advance();
                            x = Expr::Selector(Box::new(x), name);
                        }
                        TokenKind::LParen => {
                            self.advance();
                            let ty = if self.at(&TokenKind::Type) {
                                self.advance();
                                None
                            } else {
                                Some(Box::new(self.parse_type()?))
                            };
                            self.expect(&TokenKind::RParen)?;
                            x = Expr::TypeAssert(Box::new(x), ty);
                        }
                        _ => return Err(self.unexpected("selector or type assertion")),
                    }
                }
                TokenKind::LBrack => x = self.parse_index_or_slice(x)?,
                TokenKind::LParen => x = self.parse_call(x)?,
                TokenKind::LBrace => {
                    if x.is_literal_type() && (self.expr_lev >= 0 || !x.is_type_name()) {
                        x = self.parse_composite_lit(Some(x))?;
                    } else {
                        return Ok(x);
                    }
                }
                _ => return Ok(x),
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => { self.advance(); Ok(Expr::Ident(name)) }
            TokenKind::Int(lit)
            | TokenKind::Float(lit)
            | TokenKind::Imag(lit)
            | TokenKind::Char(lit)
            | TokenKind::Str(lit) => { self.advance(); Ok(Expr::BasicLit(lit)) }
            TokenKind::LParen => {
                self.advance();
                self.expr_lev += 1;
                let x = self.parse_expr()?;
                self.expr_lev -= 1;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(x)))
            }
            TokenKind::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                if self.at(&TokenKind::LBrace) {
                    self.expr_lev += 1;
                    let body = self.parse_block()?;
                    self.expr_lev -= 1;
                    Ok(Expr::FuncLit(sig, body))
                } else {
                    Ok(Expr::FuncType(sig))
                }
            }
            TokenKind::LBrack | TokenKind::Struct | TokenKind::Map | TokenKind::Chan | TokenKind::Interface => {
                self.parse_type()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBrack)?;
        self.expr_lev += 1;
        let mut index: [Option<Box<Expr>>; 3] = [None, None, None];
        let mut colons = 0;
        if !self.at(&TokenKind::Colon) {
            index[0] = Some(Box::new(self.parse_expr()?));
        }
        while self.at(&TokenKind::Colon) && colons < 2 {
            self.advance();
            colons += 1;
            if !self.at(&TokenKind::Colon) && !self.at(&TokenKind::RBrack) {
                index[colons] = Some(Box::new(self.parse_expr()?));
            }
        }
        let mut extra = Vec::new();
        if colons == 0 {
            // generic instantiation: f[int, string]
            while self.at(&TokenKind::Comma) {
                self.advance();
                if self.at(&TokenKind::RBrack) { break; }
                extra.push(self.parse_type()?);
            }
        }
        self.expr_lev -= 1;
        self.expect(&TokenKind::RBrack)?;

        if colons == 0 {
            let first = index[0].take().ok_or_else(|| self.invalid("expected operand"))?;
            let mut list = vec![*first];
            list.extend(extra);
            return Ok(Expr::Index(Box::new(x), list));
        }
        if colons == 2 && (index[1].is_none() || index[2].is_none()) {
            return Err(self.invalid("middle and final index required in 3-index slice"));
        }
        Ok(Expr::Slice(Box::new(x), index))
    }

    fn parse_call(&mut self, fun: Expr) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            args.push(self.parse_expr()?);
            if self.at(&TokenKind::Ellipsis) {
                self.advance();
                ellipsis = true;
            }
            if !self.at(&TokenKind::Comma) { break; }
            self.advance();
        }
        self.expr_lev -= 1;
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::Call(Box::new(fun), args, ellipsis))
    }

    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.at(&TokenKind::LBrace) { self.parse_composite_lit(None) } else { self.parse_expr() }
    }

    fn parse_composite_lit(&mut self, ty: Option<Expr>) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        self.expr_lev += 1;
        let mut elts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let mut elt = self.parse_element()?;
            if self.at(&TokenKind::Colon) {
                self.advance();
                let value = self.parse_element()?;
                elt = Expr::KeyValue(Box::new(elt), Box::new(value));
            }
            elts.push(elt);
            if !self.at(&TokenKind::Comma) { break; }
            self.advance();
        }
        self.expr_lev -= 1;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::CompositeLit(ty.map(Box::new), elts))
    }

    // ── Types ──

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_)
                | TokenKind::LBrack
                | TokenKind::Struct
                | TokenKind::Mul
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::LParen
        )
    }

    fn parse_type(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                let mut ty = Expr::Ident(name);
                if self.at(&TokenKind::Period) {
                    self.advance();
                    let sel = self.expect_ident()?;
                    ty = Expr::Selector(Box::new(ty), sel);
                }
                if self.at(&TokenKind::LBrack) && !matches!(self.peek_nth(1), TokenKind::RBrack) {
                    self.advance();
                    let mut args = vec![self.parse_type()?];
                    while self.at(&TokenKind::Comma) {
                        self.advance();
                        args.push(self.parse_type()?);
                    }
                    self.expect(&TokenKind::RBrack)?;
                    ty = Expr::Index(Box::new(ty), args);
                }
                Ok(ty)
            }
            TokenKind::LBrack => {
                self.advance();
                let len = if self.at(&TokenKind::RBrack) {
                    None
                } else if self.at(&TokenKind::Ellipsis) {
                    self.advance();
                    Some(Box::new(Expr::Ellipsis(None)))
                } else {
                    self.expr_lev += 1;
                    let len = self.parse_expr()?;
                    self.expr_lev -= 1;
                    Some(Box::new(len))
                };
                self.expect(&TokenKind::RBrack)?;
                let elem = self.parse_type()?;
                Ok(Expr::ArrayType(len, Box::new(elem)))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::Mul => {
                self.advance();
                Ok(Expr::Star(Box::new(self.parse_type()?)))
            }
            TokenKind::Func => {
                self.advance();
                Ok(Expr::FuncType(self.parse_signature()?))
            }
            TokenKind::Map => {
                self.advance();
                self.expect(&TokenKind::LBrack)?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RBrack)?;
                let value = self.parse_type()?;
                Ok(Expr::MapType(Box::new(key), Box::new(value)))
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.at(&TokenKind::Arrow) {
                    self.advance();
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(Expr::ChanType(dir, Box::new(self.parse_type()?)))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(&TokenKind::Chan)?;
                Ok(Expr::ChanType(ChanDir::Recv, Box::new(self.parse_type()?)))
            }
            TokenKind::LParen => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(ty)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_struct_type(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::Struct)?;
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let embedded = match self.peek_kind() {
                TokenKind::Mul => true,
                TokenKind::Ident(_) => matches!(
                    self.peek_nth(1),
                    TokenKind::Period | TokenKind::Semicolon { .. } | TokenKind::RBrace | TokenKind::Str(_)
                ),
                _ => return Err(self.unexpected("field name or embedded type")),
            };
            let field = if embedded {
                Field { names: Vec::new(), ty: self.parse_type()? }
            } else {
                let mut names = vec![self.expect_ident()?];
                while self.at(&TokenKind::Comma) {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
                Field { names, ty: self.parse_type()? }
            };
            // struct tag
            if let TokenKind::Str(_) = self.peek_kind() { self.advance(); }
            fields.push(field);
            self.expect_semi()?;
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::StructType(fields))
    }

    fn parse_interface_type(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::Interface)?;
        self.expect(&TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let method = matches!(self.peek_nth(1), TokenKind::LParen);
            if let (TokenKind::Ident(name), true) = (self.peek_kind().clone(), method) {
                self.advance();
                elems.push(InterfaceElem::Method(name, self.parse_signature()?));
            } else {
                let mut terms = vec![self.parse_type_term()?];
                while self.at(&TokenKind::Or) {
                    self.advance();
                    terms.push(self.parse_type_term()?);
                }
                elems.push(InterfaceElem::Union(terms));
            }
            self.expect_semi()?;
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::InterfaceType(elems))
    }

    fn parse_type_term(&mut self) -> Result<Expr, ParseError> {
        if self.at(&TokenKind::Tilde) {
            self.advance();
            let ty = self.parse_type()?;
            return Ok(Expr::Unary(TokenKind::Tilde, Box::new(ty)));
        }
        self.parse_type()
    }

    fn parse_signature(&mut self) -> Result<Signature, ParseError> {
        let params = self.parse_parameters()?;
        let results = if self.at(&TokenKind::LParen) {
            self.parse_parameters()?
        } else if self.at_type_start() {
            vec![Field { names: Vec::new(), ty: self.parse_type()? }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    /// Parameter lists are accepted loosely: `a, b int` yields an unnamed `a`
    /// followed by a named `b`; grouping is left to the Go compiler.
    fn parse_parameters(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            let named = matches!(self.peek_kind(), TokenKind::Ident(_))
                && matches!(
                    self.peek_nth(1),
                    TokenKind::Ident(_)
                        | TokenKind::LBrack
                        | TokenKind::Struct
                        | TokenKind::Mul
                        | TokenKind::Func
                        | TokenKind::Interface
                        | TokenKind::Map
                        | TokenKind::Chan
                        | TokenKind::Arrow
                        | TokenKind::LParen
                        | TokenKind::Ellipsis
                );
            let names = if named { vec![self.expect_ident()?] } else { Vec::new() };
            let ty = if self.at(&TokenKind::Ellipsis) {
                self.advance();
                Expr::Ellipsis(Some(Box::new(self.parse_type()?)))
            } else {
                self.parse_type()?
            };
            params.push(Field { names, ty });
            if !self.at(&TokenKind::Comma) { break; }
            self.advance();
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }
}
