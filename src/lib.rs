//! An entity query language (EQL) parser
//!
//! This crate parses JPQL-style entity queries into a canonical tagged
//! syntax tree that:
//! - Uses one uniform node shape, so consumers walk it generically
//! - Decouples surface syntax from structure through rewrite conventions
//! - Reports failures with the grammar rule and exact source offset
//! - Caches parsed trees for repeated query text

mod error;
mod parsing;

pub use error::{Error, Result};
pub use parsing::{
    parse, parse_condition, parse_expression, CachingParser, Keyword, Lexer, Node, NodeKind,
    Parser, Span, Token, TokenStream,
};
