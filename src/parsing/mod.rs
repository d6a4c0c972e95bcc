//! EQL parser module
//!
//! This module parses raw entity query strings into a canonical tagged
//! syntax tree. Parsing is purely syntactic: names are not resolved against
//! any entity model, and macros are kept as structure for the consumer to
//! expand.

pub mod ast;
pub mod caching_parser;
mod lexer;
mod parser;
mod stream;

use crate::error::Result;

pub use ast::{Node, NodeKind};
pub use caching_parser::CachingParser;
pub use lexer::{Keyword, Lexer, Span, Token};
pub use parser::Parser;
pub use stream::TokenStream;

/// Parse a query string into a syntax tree
pub fn parse(query: &str) -> Result<Node> {
    Parser::parse(query)
}

/// Parse a string as a standalone value expression
pub fn parse_expression(input: &str) -> Result<Node> {
    Parser::parse_expression_str(input)
}

/// Parse a string as a standalone boolean condition
pub fn parse_condition(input: &str) -> Result<Node> {
    Parser::parse_condition_str(input)
}
