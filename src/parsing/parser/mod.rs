//! Modular EQL parser implementation
//!
//! The parser is split into several modules:
//! - token_helper: base trait for token navigation and trial parses
//! - stmt_parser: statement and clause parsing (SELECT, UPDATE, DELETE)
//! - cond_parser: boolean condition parsing
//! - expr_parser: value expression parsing with precedence tiers
//! - macro_parser: `@`-macro expression parsing

pub mod cond_parser;
pub mod expr_parser;
pub mod macro_parser;
pub mod stmt_parser;
pub mod token_helper;

use self::cond_parser::ConditionParser;
use self::expr_parser::ExpressionParser;
use self::macro_parser::MacroParser;
use self::stmt_parser::StatementParser;
use self::token_helper::TokenHelper;
use super::ast::Node;
use super::lexer::{Span, Token};
use super::stream::{Mark, TokenStream};
use crate::error::Result;

/// The EQL parser takes tokens from the stream and parses them into an
/// abstract syntax tree.
///
/// The tree describes the syntactic structure of a query (select clause,
/// sources, conditions, and so on) in a canonical shape. It only ensures
/// the syntax is well-formed: whether an entity or field actually exists is
/// the job of the consuming layer.
pub struct Parser {
    stream: TokenStream,
}

impl Parser {
    /// Creates a new parser over the given source string. Tokenization
    /// happens eagerly, so lexical errors surface here.
    pub fn new(input: &str) -> Result<Parser> {
        Ok(Parser {
            stream: TokenStream::new(input)?,
        })
    }

    /// Creates a parser over an already tokenized stream.
    pub fn from_stream(stream: TokenStream) -> Parser {
        Parser { stream }
    }

    /// Parses the input string into a statement tree. The entire string
    /// must be consumed by a single statement.
    pub fn parse(input: &str) -> Result<Node> {
        let mut parser = Parser::new(input)?;
        let root = parser.parse_statement()?;
        parser.expect_end()?;
        Ok(root)
    }

    /// Parses one statement from the stream, leaving any remaining tokens
    /// unconsumed.
    pub fn parse_statement(&mut self) -> Result<Node> {
        StatementParser::parse_statement(self)
    }

    /// Parses the input string as a standalone value expression. Used to
    /// re-parse captured fragments, e.g. a function argument.
    pub fn parse_expression_str(input: &str) -> Result<Node> {
        let mut parser = Parser::new(input)?;
        let expression = ExpressionParser::parse_expression(&mut parser)?;
        parser.expect_end()?;
        Ok(expression)
    }

    /// Parses the input string as a standalone boolean condition.
    pub fn parse_condition_str(input: &str) -> Result<Node> {
        let mut parser = Parser::new(input)?;
        let condition = ConditionParser::parse_conditional(&mut parser)?;
        parser.expect_end()?;
        Ok(condition)
    }

    /// The exact span of the tokens consumed so far.
    pub fn consumed_span(&self) -> Span {
        self.stream.consumed_span()
    }

    /// Errors unless every token has been consumed.
    fn expect_end(&mut self) -> Result<()> {
        if self.stream.is_at_end() {
            return Ok(());
        }
        Err(self.mismatch("statement", "end of input"))
    }
}

impl TokenHelper for Parser {
    fn peek(&self) -> &Token {
        self.stream.peek()
    }

    fn lookahead(&self, k: usize) -> &Token {
        self.stream.lookahead(k)
    }

    fn next(&mut self) -> Token {
        self.stream.next()
    }

    fn offset(&self) -> usize {
        self.stream.offset()
    }

    fn mark(&self) -> Mark {
        self.stream.mark()
    }

    fn rewind(&mut self, mark: Mark) {
        self.stream.rewind(mark);
    }
}

impl ExpressionParser for Parser {
    fn parse_subquery_expr(&mut self) -> Result<Node> {
        StatementParser::parse_subquery(self)
    }

    fn parse_conditional_expr(&mut self) -> Result<Node> {
        ConditionParser::parse_conditional(self)
    }

    fn parse_macro_expr(&mut self) -> Result<Node> {
        MacroParser::parse_macro(self)
    }
}

impl ConditionParser for Parser {
    fn parse_expression(&mut self) -> Result<Node> {
        ExpressionParser::parse_expression(self)
    }

    fn parse_subquery(&mut self) -> Result<Node> {
        StatementParser::parse_subquery(self)
    }

    fn parse_path_expr(&mut self) -> Result<Node> {
        ExpressionParser::parse_path(self)
    }
}

impl StatementParser for Parser {
    fn parse_expression(&mut self) -> Result<Node> {
        ExpressionParser::parse_expression(self)
    }

    fn parse_conditional(&mut self) -> Result<Node> {
        ConditionParser::parse_conditional(self)
    }

    fn parse_path_expr(&mut self) -> Result<Node> {
        ExpressionParser::parse_path(self)
    }
}

impl MacroParser for Parser {
    fn parse_path_expr(&mut self) -> Result<Node> {
        ExpressionParser::parse_path(self)
    }

    fn parse_primary_expr(&mut self) -> Result<Node> {
        ExpressionParser::parse_primary(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parsing::ast::NodeKind;
    use crate::parsing::lexer::Keyword;

    fn parse(input: &str) -> Node {
        Parser::parse(input).expect("parse failure")
    }

    #[test]
    fn select_yields_canonical_query_shape() {
        assert_eq!(
            parse("SELECT e FROM Entity e").to_string(),
            concat!(
                r#"Query[SelectedItems[SelectedItem[SelectedEntity("e")]], "#,
                r#"Sources[Source[IdentifiedVariable("e")[EntityName("Entity")]]]]"#
            )
        );
    }

    #[test]
    fn where_clause_wraps_condition() {
        assert_eq!(
            parse("SELECT e FROM Entity e WHERE e.active = true").to_string(),
            concat!(
                r#"Query[SelectedItems[SelectedItem[SelectedEntity("e")]], "#,
                r#"Sources[Source[IdentifiedVariable("e")[EntityName("Entity")]]], "#,
                r#"Condition[SimpleCondition("=")[Path("e", "active"), Literal("TRUE")]]]"#
            )
        );
    }

    #[test]
    fn update_echoes_set_and_has_no_selected_items() {
        let root = parse("UPDATE Entity e SET e.name = :n");
        assert_eq!(
            root.to_string(),
            concat!(
                r#"Query[Sources[Source[IdentifiedVariable("e")[EntityName("Entity")]]], "#,
                r#"UpdateSet("SET")[UpdateItem[Path("e", "name"), Parameter(":n")]]]"#
            )
        );
        assert!(root.find(NodeKind::SelectedItems).is_none());
    }

    #[test]
    fn aggregate_select_item() {
        assert_eq!(
            parse("SELECT COUNT(e) FROM Entity e")
                .find(NodeKind::SelectedItems)
                .unwrap()
                .to_string(),
            r#"SelectedItems[SelectedItem[AggregateExpr["COUNT", "(", Path("e"), ")"]]]"#
        );
    }

    #[test]
    fn missing_select_item_is_no_viable_alternative_at_from() {
        let err = Parser::parse("SELECT FROM Entity e").unwrap_err();
        assert_eq!(
            err,
            Error::NoViableAlternative {
                rule: "expression",
                found: "FROM".into(),
                pos: 7,
            }
        );
    }

    #[test]
    fn omitted_clauses_produce_no_children() {
        let root = parse("SELECT e FROM Entity e");
        for kind in [
            NodeKind::Condition,
            NodeKind::GroupBy,
            NodeKind::Having,
            NodeKind::OrderBy,
        ] {
            assert!(root.find(kind).is_none(), "unexpected {} child", kind);
        }
    }

    #[test]
    fn all_clauses_appear_in_fixed_order() {
        let root = parse(
            "SELECT e.dept FROM Entity e WHERE e.active = true \
             GROUP BY e.dept HAVING COUNT(e) > 3 ORDER BY e.dept DESC",
        );
        let kinds: Vec<NodeKind> = root.children().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::SelectedItems,
                NodeKind::Sources,
                NodeKind::Condition,
                NodeKind::GroupBy,
                NodeKind::Having,
                NodeKind::OrderBy,
            ]
        );
    }

    #[test]
    fn alias_is_payload_not_child() {
        let root = parse("SELECT x FROM Entity AS x");
        let variable = root.find_all(NodeKind::IdentifiedVariable)[0];
        assert_eq!(variable.payload(), ["x"]);
        assert_eq!(variable.children().len(), 1);
        assert_eq!(variable.child(0).unwrap().kind(), NodeKind::EntityName);
        assert_eq!(variable.child(0).unwrap().payload(), ["Entity"]);
    }

    #[test]
    fn delete_statement_shape() {
        assert_eq!(
            parse("DELETE FROM Entity e WHERE e.id = 1").to_string(),
            concat!(
                r#"Query[Sources[Source[IdentifiedVariable("e")[EntityName("Entity")]]], "#,
                r#"Condition[SimpleCondition("=")[Path("e", "id"), Literal("1")]]]"#
            )
        );
    }

    #[test]
    fn joins_attach_to_their_source() {
        let root = parse(
            "SELECT e FROM Entity e LEFT JOIN e.items i ON i.active = true, Other o",
        );
        let sources = root.find(NodeKind::Sources).unwrap();
        assert_eq!(sources.children().len(), 2);
        let join = sources.child(0).unwrap().find(NodeKind::JoinVariable).unwrap();
        assert_eq!(join.payload(), ["LEFT JOIN", "i"]);
        assert_eq!(join.child(0).unwrap().kind(), NodeKind::Path);
        assert_eq!(join.children().len(), 2);
    }

    #[test]
    fn fetch_join_without_alias() {
        let root = parse("SELECT e FROM Entity e JOIN FETCH e.items");
        let join = root.find_all(NodeKind::JoinVariable)[0];
        assert_eq!(join.payload(), ["JOIN FETCH"]);
    }

    #[test]
    fn collection_member_declaration_gets_source_wrapper() {
        let root = parse("SELECT i FROM Entity e, IN(e.items) i");
        let sources = root.find(NodeKind::Sources).unwrap();
        let member = sources.child(1).unwrap().child(0).unwrap();
        assert_eq!(member.kind(), NodeKind::CollectionMember);
        assert_eq!(member.payload(), ["i"]);
        assert_eq!(member.child(0).unwrap().payload(), ["e", "items"]);
    }

    #[test]
    fn subquery_in_condition() {
        let root = parse(
            "SELECT e FROM Entity e WHERE e.id IN \
             (SELECT o.customer FROM Purchase o WHERE o.open = true)",
        );
        let subquery = root.find_all(NodeKind::Subquery)[0];
        assert_eq!(subquery.child(0).unwrap().kind(), NodeKind::Query);
    }

    #[test]
    fn empty_from_clause_terminates_early() {
        let err = Parser::parse("SELECT e FROM WHERE e.id = 1").unwrap_err();
        assert_eq!(
            err,
            Error::EarlyTermination {
                rule: "from clause",
                expected: "source declaration",
                pos: 14,
            }
        );
    }

    #[test]
    fn empty_order_by_terminates_early() {
        let err = Parser::parse("SELECT e FROM Entity e ORDER BY").unwrap_err();
        assert!(matches!(
            err,
            Error::EarlyTermination {
                rule: "order by clause",
                ..
            }
        ));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = Parser::parse("SELECT e FROM Entity e )").unwrap_err();
        assert!(matches!(err, Error::TokenMismatch { rule: "statement", .. }));
    }

    #[test]
    fn repeated_parses_are_identical() {
        let input = "SELECT e FROM Entity e WHERE (e.a + e.b) > 1 OR e.c IS NULL";
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn failed_trial_leaves_stream_position_untouched() {
        let mut parser = Parser::new("( e.a + e.b ) > 1").unwrap();
        parser.next();
        let before = parser.offset();
        let matched = parser.try_rule(|p| p.expect_keyword(Keyword::Select, "subquery"));
        assert!(!matched);
        assert_eq!(parser.offset(), before);
    }

    #[test]
    fn failure_position_never_precedes_last_match() {
        let err = Parser::parse("SELECT e FROM Entity e WHERE e.active AND").unwrap_err();
        // "e.active" ends at offset 37; the missing operator is reported at
        // or after it.
        assert!(err.pos() >= 37, "error at {}", err.pos());
    }

    #[test]
    fn consumed_span_covers_the_statement() {
        let input = "SELECT e FROM Entity e";
        let mut parser = Parser::new(input).unwrap();
        parser.parse_statement().unwrap();
        assert_eq!(parser.consumed_span(), Span::new(0, input.len()));
    }

    #[test]
    fn parser_accepts_prebuilt_token_stream() {
        let stream = TokenStream::new("SELECT e FROM Entity e").unwrap();
        let mut parser = Parser::from_stream(stream);
        let root = parser.parse_statement().unwrap();
        assert_eq!(root.kind(), NodeKind::Query);
    }
}
