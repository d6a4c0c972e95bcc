//! Node construction: the per-kind factories used by the grammar rules
//!
//! Each factory fixes the arity and child order of its kind, so the rules
//! themselves never assemble a `Node` by hand. This is also where the
//! surface-to-canonical rewrites live: superficially different productions
//! (a range declaration and a collection member declaration, a bare variable
//! and a dotted path in the select clause) come out with a uniform shape.

use super::node::{Node, NodeKind};

/// Root node for a SELECT statement. Absent clauses are omitted children,
/// never placeholders.
pub fn query(
    selected: Node,
    sources: Node,
    condition: Option<Node>,
    group_by: Option<Node>,
    having: Option<Node>,
    order_by: Option<Node>,
) -> Node {
    let children = [Some(selected), Some(sources), condition, group_by, having, order_by]
        .into_iter()
        .flatten()
        .collect();
    Node::new(NodeKind::Query, vec![], children)
}

/// Root node for an UPDATE statement.
pub fn update_query(sources: Node, set: Node, condition: Option<Node>) -> Node {
    let children = [Some(sources), Some(set), condition].into_iter().flatten().collect();
    Node::new(NodeKind::Query, vec![], children)
}

/// Root node for a DELETE statement.
pub fn delete_query(sources: Node, condition: Option<Node>) -> Node {
    let children = [Some(sources), condition].into_iter().flatten().collect();
    Node::new(NodeKind::Query, vec![], children)
}

pub fn selected_items(distinct: bool, items: Vec<Node>) -> Node {
    let payload = if distinct { vec!["DISTINCT".into()] } else { vec![] };
    Node::new(NodeKind::SelectedItems, payload, items)
}

/// Wraps one select clause entry, rewriting the expression to its canonical
/// selected form: a single-segment path was written as a bare identification
/// variable and becomes `SelectedEntity`; a longer path becomes a
/// `SelectedField` wrapping the path; anything else is kept as-is.
pub fn selected_item(expression: Node, alias: Option<String>) -> Node {
    let member = match expression.kind() {
        NodeKind::Path if expression.payload().len() == 1 => Node::new(
            NodeKind::SelectedEntity,
            vec![expression.payload()[0].clone()],
            vec![],
        ),
        NodeKind::Path => Node::new(NodeKind::SelectedField, vec![], vec![expression]),
        _ => expression,
    };
    Node::new(NodeKind::SelectedItem, alias.into_iter().collect(), vec![member])
}

pub fn sources(list: Vec<Node>) -> Node {
    Node::new(NodeKind::Sources, vec![], list)
}

/// The synthesized from-clause wrapper: both declaration forms get the same
/// parent kind so downstream consumers see one shape.
pub fn source(declaration: Node, joins: Vec<Node>) -> Node {
    let mut children = vec![declaration];
    children.extend(joins);
    Node::new(NodeKind::Source, vec![], children)
}

pub fn identified_variable(alias: Option<String>, entity: Node) -> Node {
    Node::new(
        NodeKind::IdentifiedVariable,
        alias.into_iter().collect(),
        vec![entity],
    )
}

pub fn entity_name(name: &str) -> Node {
    Node::new(NodeKind::EntityName, vec![name.into()], vec![])
}

/// A join declaration. `spec` is the echoed join words as written, e.g.
/// `"LEFT JOIN"` or `"JOIN FETCH"`; the alias is payload because consumers
/// resolve variables by name without re-walking the subtree.
pub fn join_variable(spec: String, alias: Option<String>, path: Node, on: Option<Node>) -> Node {
    let mut payload = vec![spec];
    payload.extend(alias);
    let children = [Some(path), on].into_iter().flatten().collect();
    Node::new(NodeKind::JoinVariable, payload, children)
}

pub fn collection_member(alias: String, path: Node) -> Node {
    Node::new(NodeKind::CollectionMember, vec![alias], vec![path])
}

pub fn path(segments: Vec<String>) -> Node {
    Node::new(NodeKind::Path, segments, vec![])
}

pub fn condition(expression: Node) -> Node {
    Node::new(NodeKind::Condition, vec![], vec![expression])
}

pub fn and(left: Node, right: Node) -> Node {
    Node::new(NodeKind::And, vec![], vec![left, right])
}

pub fn or(left: Node, right: Node) -> Node {
    Node::new(NodeKind::Or, vec![], vec![left, right])
}

pub fn not(operand: Node) -> Node {
    Node::new(NodeKind::Not, vec![], vec![operand])
}

/// A leaf predicate. The operator words are echoed verbatim into the payload
/// (`["="]`, `["NOT", "BETWEEN"]`, `["IS", "NOT", "NULL"]`, ...); operands
/// are the children, in surface order.
pub fn simple_condition(operator: Vec<String>, operands: Vec<Node>) -> Node {
    Node::new(NodeKind::SimpleCondition, operator, operands)
}

pub fn group_by(items: Vec<Node>) -> Node {
    Node::new(NodeKind::GroupBy, vec![], items)
}

pub fn having(expression: Node) -> Node {
    Node::new(NodeKind::Having, vec![], vec![expression])
}

pub fn order_by(fields: Vec<Node>) -> Node {
    Node::new(NodeKind::OrderBy, vec![], fields)
}

/// One ordering entry. The direction keyword is echoed only when it was
/// written; its absence means the default ascending order.
pub fn order_by_field(expression: Node, direction: Option<String>) -> Node {
    Node::new(
        NodeKind::OrderByField,
        direction.into_iter().collect(),
        vec![expression],
    )
}

/// An aggregate call. The parts are the surface tokens in order, already
/// wrapped as echo nodes around the argument subtree.
pub fn aggregate_expr(parts: Vec<Node>) -> Node {
    Node::new(NodeKind::AggregateExpr, vec![], parts)
}

pub fn function_call(name: &str, extras: Vec<String>, args: Vec<Node>) -> Node {
    let mut payload = vec![name.to_string()];
    payload.extend(extras);
    Node::new(NodeKind::FunctionCall, payload, args)
}

/// A case expression: optional leading operand, one or more `When` branches,
/// optional trailing else result.
pub fn case_expr(operand: Option<Node>, whens: Vec<Node>, otherwise: Option<Node>) -> Node {
    let mut children: Vec<Node> = operand.into_iter().collect();
    children.extend(whens);
    children.extend(otherwise);
    Node::new(NodeKind::CaseExpr, vec![], children)
}

pub fn when(condition: Node, result: Node) -> Node {
    Node::new(NodeKind::When, vec![], vec![condition, result])
}

pub fn binary_op(operator: &str, left: Node, right: Node) -> Node {
    Node::new(NodeKind::BinaryOp, vec![operator.into()], vec![left, right])
}

pub fn unary_op(operator: &str, operand: Node) -> Node {
    Node::new(NodeKind::UnaryOp, vec![operator.into()], vec![operand])
}

pub fn literal(lexeme: String) -> Node {
    Node::new(NodeKind::Literal, vec![lexeme], vec![])
}

/// A parameter placeholder, kept as its exact surface text (`":name"` or
/// `"?1"`) so the consumer can rebind it without reconstructing the syntax.
pub fn parameter(text: String) -> Node {
    Node::new(NodeKind::Parameter, vec![text], vec![])
}

pub fn enum_macro(constant: Node) -> Node {
    Node::new(NodeKind::EnumMacro, vec![], vec![constant])
}

/// A date macro. Payload is the macro name followed by any word arguments
/// (time unit, timezone flag); structural arguments are children.
pub fn date_macro(name: String, words: Vec<String>, args: Vec<Node>) -> Node {
    let mut payload = vec![name];
    payload.extend(words);
    Node::new(NodeKind::DateMacro, payload, args)
}

pub fn subquery(query: Node) -> Node {
    Node::new(NodeKind::Subquery, vec![], vec![query])
}

/// The update clause. The SET keyword is echoed verbatim in the payload for
/// output-shape stability.
pub fn update_set(items: Vec<Node>) -> Node {
    Node::new(NodeKind::UpdateSet, vec!["SET".into()], items)
}

pub fn update_item(path: Node, value: Node) -> Node {
    Node::new(NodeKind::UpdateItem, vec![], vec![path, value])
}

pub fn echo(lexeme: &str) -> Node {
    Node::new(NodeKind::Echo, vec![lexeme.into()], vec![])
}
