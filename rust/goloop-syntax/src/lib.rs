//! goloop syntax
//!
//! Lexes and parses single Go fragments and reports what each one declares,
//! assigns or imports.

pub mod ast;
pub mod classify;
pub mod lexer;
pub mod parser;
pub mod tokens;

pub use classify::{classify, parse_expression, ExpressionKind, Shape};
pub use lexer::LexError;
pub use parser::ParseError;
