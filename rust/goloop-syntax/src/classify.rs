//! Fragment classification: what does one submitted line do to the session?

use crate::ast::{AssignOp, DeclKeyword, Expr, Spec, Stmt};
use crate::parser::{ParseError, Parser};
use crate::tokens::TokenKind;

/// How a bare expression statement behaves when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// `f(x)`, valid as a statement
    Call,
    /// `<-ch`, valid as a statement
    Receive,
    /// `1 + 2`, only meaningful when printed
    Value,
}

/// Semantic shape of one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    /// Unquoted package paths, in order, for an import line
    pub imports: Vec<String>,
    /// Identifiers on the left of `=` or an assignment operator
    pub assigned: Vec<String>,
    /// Identifiers introduced by `:=`, `var` or `const`
    pub declared: Vec<String>,
    /// Set when the fragment is a bare expression statement
    pub expression: Option<ExpressionKind>,
}

impl Shape {
    pub fn is_import(&self) -> bool { !self.imports.is_empty() }
}

/// Whether the trimmed line starts with the `import` keyword.
fn is_import_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("import")
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Classifies a statement-shaped or import-shaped line.
pub fn classify(line: &str) -> Result<Shape, ParseError> {
    if is_import_line(line) {
        classify_import(line)
    } else {
        classify_statement(line)
    }
}

pub fn classify_import(line: &str) -> Result<Shape, ParseError> {
    let specs = Parser::from_source(line)?.parse_import_decl()?;
    Ok(Shape { imports: specs.into_iter().map(|s| s.path).collect(), ..Shape::default() })
}

pub fn classify_statement(line: &str) -> Result<Shape, ParseError> {
    let stmt = Parser::from_source(line)?.parse_fragment()?;
    let mut shape = Shape::default();
    match stmt {
        Stmt::Assign { lhs, op: AssignOp::Define, .. } => shape.declared = names_of(&lhs),
        Stmt::Assign { lhs, .. } => shape.assigned = names_of(&lhs),
        Stmt::Decl { keyword: DeclKeyword::Var | DeclKeyword::Const, specs } => {
            for spec in specs {
                if let Spec::Value { names, .. } = spec {
                    shape.declared.extend(names.into_iter().filter(|n| n != "_"));
                }
            }
        }
        Stmt::Expr(expr) => shape.expression = Some(expression_kind(&expr)),
        _ => {}
    }
    Ok(shape)
}

/// Parses a lone expression, as used by print-once.
pub fn parse_expression(line: &str) -> Result<Expr, ParseError> {
    Parser::from_source(line)?.parse_expression()
}

fn names_of(targets: &[Expr]) -> Vec<String> {
    targets
        .iter()
        .filter_map(|t| match t {
            Expr::Ident(name) if name != "_" => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn expression_kind(expr: &Expr) -> ExpressionKind {
    match expr {
        Expr::Call(..) => ExpressionKind::Call,
        Expr::Unary(TokenKind::Arrow, _) => ExpressionKind::Receive,
        Expr::Paren(inner) => expression_kind(inner),
        _ => ExpressionKind::Value,
    }
}
