//! Syntax tree for the subset of Go that may appear in a single fragment.
//!
//! Types and expressions share [`Expr`], the same way Go's own grammar lets
//! a type appear wherever an operand may (conversions, composite literals,
//! `make`/`new` arguments).

use crate::tokens::TokenKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    BasicLit(String),
    CompositeLit(Option<Box<Expr>>, Vec<Expr>),
    KeyValue(Box<Expr>, Box<Expr>),
    FuncLit(Signature, Block),
    Paren(Box<Expr>),
    Selector(Box<Expr>, String),
    Index(Box<Expr>, Vec<Expr>),
    Slice(Box<Expr>, [Option<Box<Expr>>; 3]),
    /// `x.(T)`; the type is `None` for the `x.(type)` switch guard
    TypeAssert(Box<Expr>, Option<Box<Expr>>),
    Call(Box<Expr>, Vec<Expr>, bool),
    Star(Box<Expr>),
    Unary(TokenKind, Box<Expr>),
    Binary(Box<Expr>, TokenKind, Box<Expr>),

    // Types
    /// `[N]T`, `[...]T` (length is [`Expr::Ellipsis`]) or `[]T` (no length)
    ArrayType(Option<Box<Expr>>, Box<Expr>),
    Ellipsis(Option<Box<Expr>>),
    StructType(Vec<Field>),
    FuncType(Signature),
    InterfaceType(Vec<InterfaceElem>),
    MapType(Box<Expr>, Box<Expr>),
    ChanType(ChanDir, Box<Expr>),
}

impl Expr {
    /// Whether a `{` after this expression may open a composite literal.
    pub fn is_literal_type(&self) -> bool {
        match self {
            Expr::Ident(_) | Expr::ArrayType(..) | Expr::StructType(_) | Expr::MapType(..) => true,
            Expr::Selector(x, _) => matches!(**x, Expr::Ident(_)),
            Expr::Index(x, _) => x.is_literal_type(),
            _ => false,
        }
    }

    /// Bare or package-qualified type name.
    pub fn is_type_name(&self) -> bool {
        match self {
            Expr::Ident(_) => true,
            Expr::Selector(x, _) => matches!(**x, Expr::Ident(_)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Empty for embedded fields and unnamed parameters
    pub names: Vec<String>,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method(String, Signature),
    /// Embedded interface or type-set union (`~int | ~string`)
    Union(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `<<=`, ...
    Compound(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Var,
    Const,
    Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Value { names: Vec<String>, ty: Option<Expr>, values: Vec<Expr> },
    Type { name: String, alias: bool, ty: Expr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// `None` for `default:`
    pub list: Option<Vec<Expr>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    /// `None` for `default:`
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Empty,
    Expr(Expr),
    Assign { lhs: Vec<Expr>, op: AssignOp, rhs: Vec<Expr> },
    Decl { keyword: DeclKeyword, specs: Vec<Spec> },
    IncDec(Expr, bool),
    Send(Expr, Expr),
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch(BranchKind, Option<String>),
    Block(Block),
    Labeled(String, Box<Stmt>),
    If { init: Option<Box<Stmt>>, cond: Expr, then: Block, els: Option<Box<Stmt>> },
    Switch { init: Option<Box<Stmt>>, tag: Option<Box<Stmt>>, type_switch: bool, clauses: Vec<CaseClause> },
    Select(Vec<CommClause>),
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, post: Option<Box<Stmt>>, body: Block },
    Range { key: Option<Expr>, value: Option<Expr>, define: bool, expr: Expr, body: Block },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Local name, `.` or `_`
    pub name: Option<String>,
    pub path: String,
}
