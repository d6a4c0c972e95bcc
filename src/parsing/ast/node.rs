//! The canonical AST node
//!
//! Every parse result is a tree of `Node` values: a tagged kind, captured
//! lexemes (the payload), and ordered children. The shape is canonical, not
//! a transcript of the surface syntax: each kind fixes the arity and order
//! of its children, optional clauses are omitted rather than represented by
//! placeholders, and a node is frozen once constructed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of structural roles a tree node can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a statement. SELECT: `[SelectedItems, Sources, Condition?,
    /// GroupBy?, Having?, OrderBy?]`. UPDATE: `[Sources, UpdateSet,
    /// Condition?]`. DELETE: `[Sources, Condition?]`.
    Query,
    /// The select clause: `SelectedItem+`. Payload `["DISTINCT"]` when the
    /// clause was written with DISTINCT.
    SelectedItems,
    /// One select clause entry: `[expression]`. Payload `[alias]` when the
    /// item carries a result alias.
    SelectedItem,
    /// A dotted path selected as a result: `[Path]`.
    SelectedField,
    /// A bare identification variable selected as a result. Payload
    /// `[variable]`.
    SelectedEntity,
    /// The from clause: `Source+`.
    Sources,
    /// One from-clause entry, a synthesized wrapper with no surface token:
    /// `[IdentifiedVariable | CollectionMember, JoinVariable*]`.
    Source,
    /// A range variable declaration. Payload `[alias]` (empty when the
    /// statement form omits it), child `[EntityName]`.
    IdentifiedVariable,
    /// An entity name. Payload `[name]`.
    EntityName,
    /// A join declaration. Payload `[join spec, alias?]`, children
    /// `[Path | EntityName, on-condition?]`.
    JoinVariable,
    /// An `IN(path) alias` collection member declaration. Payload `[alias]`,
    /// child `[Path]`.
    CollectionMember,
    /// A dotted path expression. Payload = the segments in order.
    Path,
    /// The where clause wrapper: `[boolean expression]`.
    Condition,
    /// Boolean conjunction: `[left, right]`.
    And,
    /// Boolean disjunction: `[left, right]`.
    Or,
    /// Boolean negation: `[operand]`.
    Not,
    /// A leaf comparison or predicate. Payload = the echoed operator words
    /// (`["="]`, `["NOT","BETWEEN"]`, `["IS","NOT","NULL"]`, ...), children
    /// = the operands in order.
    SimpleCondition,
    /// The group by clause: grouping expressions.
    GroupBy,
    /// The having clause wrapper: `[boolean expression]`.
    Having,
    /// The order by clause: `OrderByField+`.
    OrderBy,
    /// One ordering entry: `[expression]`. Payload `["ASC"]`/`["DESC"]` only
    /// when a direction keyword was written.
    OrderByField,
    /// An aggregate call, echoed in surface order:
    /// `[Echo(name), Echo("("), Echo("DISTINCT")?, argument, Echo(")")]`.
    AggregateExpr,
    /// A scalar function call. Payload `[name, extra echoes...]`, children =
    /// the arguments.
    FunctionCall,
    /// A case expression: `[operand?, When+, else?]`.
    CaseExpr,
    /// One branch of a case expression: `[condition, result]`.
    When,
    /// An arithmetic binary operation. Payload `[operator]`, children
    /// `[left, right]`.
    BinaryOp,
    /// An arithmetic sign. Payload `[operator]`, child `[operand]`.
    UnaryOp,
    /// A literal. Payload `[lexeme]`, echoed as written (canonical casing
    /// for keyword literals).
    Literal,
    /// A query parameter. Payload = the surface text (`":name"`, `"?1"`).
    Parameter,
    /// An `@enum(...)` macro. Child `[Path]` (the qualified constant).
    EnumMacro,
    /// A date/time `@`-macro. Payload `[name, trailing word args...]`,
    /// children = the structural arguments.
    DateMacro,
    /// A parenthesized nested query: `[Query]`.
    Subquery,
    /// The update clause. Payload `["SET"]` (verbatim keyword echo),
    /// children `UpdateItem+`.
    UpdateSet,
    /// One update assignment: `[Path, value]`.
    UpdateItem,
    /// A verbatim surface token kept for output-shape stability. Payload
    /// `[lexeme]`.
    Echo,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One node of the canonical tree. Fields are private: a node is built
/// through the `build` factories and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    payload: Vec<String>,
    children: Vec<Node>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, payload: Vec<String>, children: Vec<Node>) -> Self {
        Node {
            kind,
            payload,
            children,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn payload(&self) -> &[String] {
        &self.payload
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The `index`th child, if present.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// The first direct child of the given kind.
    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// All descendants (including self) of the given kind, in depth-first
    /// order.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if node.kind == kind {
                found.push(node);
            }
            true
        });
        found
    }

    /// Walks the tree depth-first, calling the visitor for every node.
    /// Halts and returns false if the visitor returns false.
    pub fn walk<'a>(&'a self, visitor: &mut impl FnMut(&'a Node) -> bool) -> bool {
        if !visitor(self) {
            return false;
        }
        self.children.iter().all(|child| child.walk(visitor))
    }
}

/// Renders the canonical shape: `Kind("payload", ...)[children, ...]`, with
/// echo nodes shown as their bare quoted lexeme. This is the format used
/// throughout the parser tests.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.kind == NodeKind::Echo {
            return write!(f, "{:?}", self.payload.first().map_or("", |s| s.as_str()));
        }
        write!(f, "{}", self.kind)?;
        if !self.payload.is_empty() {
            write!(f, "(")?;
            for (i, item) in self.payload.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", item)?;
            }
            write!(f, ")")?;
        }
        if !self.children.is_empty() {
            write!(f, "[")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
