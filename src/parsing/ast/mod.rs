//! Abstract syntax tree for EQL statements
//!
//! The tree is a single generic node type with a closed kind enumeration,
//! rather than one struct per production: consumers of this crate rewrite
//! queries generically (walking for paths, variables and parameters), and a
//! uniform shape keeps that traversal independent of how a clause was
//! written.

pub mod build;
mod node;

pub use node::{Node, NodeKind};
