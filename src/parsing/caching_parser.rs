//! Caching parser for EQL queries
//!
//! This module provides a caching wrapper around the parser that maintains
//! an LRU cache of parsed trees to avoid redundant parsing. Query text in an
//! application is highly repetitive, so the cache hit rate is usually high.

use super::ast::{Node, NodeKind};
use super::parser::Parser;
use crate::error::Result;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default capacity for the parse cache
const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// A caching wrapper around the parser
pub struct CachingParser {
    /// LRU cache for parsed trees
    cache: LruCache<String, Arc<Node>>,
    /// Parameter counts per cached query, for binding validation
    param_counts: HashMap<String, usize>,
}

impl CachingParser {
    /// Create a new caching parser with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new caching parser with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            param_counts: HashMap::new(),
        }
    }

    /// Parse a query with caching
    pub fn parse(&mut self, query: &str) -> Result<Arc<Node>> {
        // Normalize for better cache hits (trim whitespace)
        let normalized = normalize_query(query);

        // Check cache
        if let Some(root) = self.cache.get(&normalized) {
            return Ok(root.clone());
        }

        // Parse the query
        let root = Parser::parse(query)?;
        let param_count = count_parameters(&root);
        let arc_root = Arc::new(root);

        // Cache the result
        self.cache.put(normalized.clone(), arc_root.clone());
        self.param_counts.insert(normalized, param_count);

        Ok(arc_root)
    }

    /// Number of parameter placeholders in a cached query, if cached
    pub fn param_count(&self, query: &str) -> Option<usize> {
        self.param_counts.get(&normalize_query(query)).copied()
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.param_counts.clear();
    }
}

impl Default for CachingParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a query for consistent caching
#[inline]
fn normalize_query(query: &str) -> String {
    // Parameterized queries are usually already normalized, just trim to
    // avoid unnecessary allocations
    query.trim().to_string()
}

/// Count the parameter placeholders anywhere in a tree. Repeated mentions of
/// the same named parameter count once each mention.
fn count_parameters(root: &Node) -> usize {
    let mut count = 0;
    root.walk(&mut |node| {
        if node.kind() == NodeKind::Parameter {
            count += 1;
        }
        true
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_parses_share_one_tree() {
        let mut parser = CachingParser::new();
        let first = parser.parse("SELECT e FROM Entity e").unwrap();
        let second = parser.parse("  SELECT e FROM Entity e  ").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn parameters_are_counted_across_clauses() {
        let mut parser = CachingParser::new();
        let query = "UPDATE Entity e SET e.name = :n WHERE e.id = :id AND e.group IN (:a, :b)";
        parser.parse(query).unwrap();
        assert_eq!(parser.param_count(query), Some(4));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut parser = CachingParser::new();
        assert!(parser.parse("SELECT FROM Entity e").is_err());
        assert_eq!(parser.param_count("SELECT FROM Entity e"), None);
    }

    #[test]
    fn clear_evicts_everything() {
        let mut parser = CachingParser::new();
        let query = "SELECT e FROM Entity e WHERE e.id = :id";
        parser.parse(query).unwrap();
        parser.clear();
        assert_eq!(parser.param_count(query), None);
    }
}
