//! Template source and placeholder expression parsing

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse_template;
