//! Conditional expression parser
//!
//! Boolean structure (OR over AND over NOT) above leaf predicates. The
//! interesting case is a leading `(`: it may open a parenthesized boolean
//! expression or the arithmetic left operand of a comparison, and the two
//! share an arbitrarily long prefix. A trial parse of the parenthesized
//! conditional decides which alternative to commit.

use super::token_helper::TokenHelper;
use crate::error::Result;
use crate::parsing::ast::{build, Node, NodeKind};
use crate::parsing::lexer::{Keyword, Token};

/// Parser trait for boolean conditions.
pub trait ConditionParser: TokenHelper + Sized {
    /// Parses an arithmetic/value expression.
    fn parse_expression(&mut self) -> Result<Node>;

    /// Parses a parenthesized nested query.
    fn parse_subquery(&mut self) -> Result<Node>;

    /// Parses a dotted path expression.
    fn parse_path_expr(&mut self) -> Result<Node>;

    /// Parses a conditional expression: `term (OR term)*`.
    fn parse_conditional(&mut self) -> Result<Node> {
        let mut expr = self.parse_conditional_term()?;
        while self.next_is_keyword(Keyword::Or) {
            let rhs = self.parse_conditional_term()?;
            expr = build::or(expr, rhs);
        }
        Ok(expr)
    }

    /// Parses a conditional term: `factor (AND factor)*`.
    fn parse_conditional_term(&mut self) -> Result<Node> {
        let mut term = self.parse_conditional_factor()?;
        while self.next_is_keyword(Keyword::And) {
            let rhs = self.parse_conditional_factor()?;
            term = build::and(term, rhs);
        }
        Ok(term)
    }

    /// Parses a conditional factor: `[NOT] primary`.
    fn parse_conditional_factor(&mut self) -> Result<Node> {
        if self.next_is_keyword(Keyword::Not) {
            let operand = self.parse_conditional_primary()?;
            return Ok(build::not(operand));
        }
        self.parse_conditional_primary()
    }

    /// Parses a conditional primary. On `(` the parenthesized-conditional
    /// alternative is tried speculatively; if the trial fails the paren must
    /// instead open an arithmetic operand, so the simple condition is
    /// committed. Trial order is fixed: parenthesized conditional first.
    fn parse_conditional_primary(&mut self) -> Result<Node> {
        if self.peek() == &Token::OpenParen
            && self.try_rule(|parser| parser.parse_parenthesized_conditional())
        {
            return self.parse_parenthesized_conditional();
        }
        self.parse_simple_condition()
    }

    /// Parses `( conditional )`.
    fn parse_parenthesized_conditional(&mut self) -> Result<Node> {
        self.expect(Token::OpenParen, "condition")?;
        let expr = self.parse_conditional()?;
        self.expect(Token::CloseParen, "condition")?;
        Ok(expr)
    }

    /// Parses a leaf predicate: EXISTS, or an arithmetic left operand
    /// followed by a comparison, BETWEEN, LIKE, IN, IS or MEMBER form. A
    /// date macro stands on its own as a predicate.
    fn parse_simple_condition(&mut self) -> Result<Node> {
        if self.next_is_keyword(Keyword::Exists) {
            let subquery = self.parse_subquery()?;
            return Ok(build::simple_condition(vec!["EXISTS".into()], vec![subquery]));
        }

        let left = self.parse_expression()?;
        match self.peek().clone() {
            Token::Equal
            | Token::LessOrGreaterThan
            | Token::NotEqual
            | Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual => self.parse_comparison(left),
            Token::Keyword(Keyword::Not) => {
                self.next();
                match self.peek() {
                    Token::Keyword(Keyword::Between) => self.parse_between(left, true),
                    Token::Keyword(Keyword::Like) => self.parse_like(left, true),
                    Token::Keyword(Keyword::In) => self.parse_in(left, true),
                    Token::Keyword(Keyword::Member) => self.parse_member(left, true),
                    _ => Err(self.mismatch("simple condition", "BETWEEN, LIKE, IN or MEMBER")),
                }
            }
            Token::Keyword(Keyword::Between) => self.parse_between(left, false),
            Token::Keyword(Keyword::Like) => self.parse_like(left, false),
            Token::Keyword(Keyword::In) => self.parse_in(left, false),
            Token::Keyword(Keyword::Member) => self.parse_member(left, false),
            Token::Keyword(Keyword::Is) => self.parse_is(left),
            _ if left.kind() == NodeKind::DateMacro => Ok(left),
            _ => Err(self.no_viable("simple condition")),
        }
    }

    /// Parses the right-hand side of a comparison: an optional ALL/ANY/SOME
    /// quantified subquery, a plain subquery, or an arithmetic expression.
    fn parse_comparison(&mut self, left: Node) -> Result<Node> {
        let operator = self.next().to_string();
        let quantifier = [Keyword::All, Keyword::Any, Keyword::Some]
            .into_iter()
            .find(|&q| self.next_is_keyword(q));
        let mut words = vec![operator];
        if let Some(quantifier) = quantifier {
            words.push(quantifier.as_str().into());
            let subquery = self.parse_subquery()?;
            return Ok(build::simple_condition(words, vec![left, subquery]));
        }
        let right = if self.peek() == &Token::OpenParen
            && self.lookahead(2) == &Token::Keyword(Keyword::Select)
        {
            self.parse_subquery()?
        } else {
            self.parse_expression()?
        };
        Ok(build::simple_condition(words, vec![left, right]))
    }

    /// Parses `[NOT] BETWEEN low AND high`.
    fn parse_between(&mut self, left: Node, negated: bool) -> Result<Node> {
        self.expect_keyword(Keyword::Between, "simple condition")?;
        let low = self.parse_expression()?;
        self.expect_keyword(Keyword::And, "simple condition")?;
        let high = self.parse_expression()?;
        let words = negate(negated, vec!["BETWEEN".into()]);
        Ok(build::simple_condition(words, vec![left, low, high]))
    }

    /// Parses `[NOT] LIKE pattern [ESCAPE 'char']`. The escape character is
    /// payload, not a child: consumers need the text, not a subtree.
    fn parse_like(&mut self, left: Node, negated: bool) -> Result<Node> {
        self.expect_keyword(Keyword::Like, "simple condition")?;
        let pattern = self.parse_expression()?;
        let mut words = negate(negated, vec!["LIKE".into()]);
        if self.next_is_keyword(Keyword::Escape) {
            if let Token::String(_) = self.peek() {
                words.push("ESCAPE".into());
                words.push(self.next().to_string());
            } else {
                return Err(self.mismatch("simple condition", "escape character"));
            }
        }
        Ok(build::simple_condition(words, vec![left, pattern]))
    }

    /// Parses `[NOT] IN (items...)` or `[NOT] IN (subquery)`.
    fn parse_in(&mut self, left: Node, negated: bool) -> Result<Node> {
        self.expect_keyword(Keyword::In, "simple condition")?;
        let words = negate(negated, vec!["IN".into()]);
        if self.peek() == &Token::OpenParen
            && self.lookahead(2) == &Token::Keyword(Keyword::Select)
        {
            let subquery = self.parse_subquery()?;
            return Ok(build::simple_condition(words, vec![left, subquery]));
        }
        self.expect(Token::OpenParen, "simple condition")?;
        let mut operands = vec![left];
        operands.push(self.parse_expression()?);
        while self.next_is(Token::Comma) {
            operands.push(self.parse_expression()?);
        }
        self.expect(Token::CloseParen, "simple condition")?;
        Ok(build::simple_condition(words, operands))
    }

    /// Parses `[NOT] MEMBER [OF] path`. OF is echoed only when written.
    fn parse_member(&mut self, left: Node, negated: bool) -> Result<Node> {
        self.expect_keyword(Keyword::Member, "simple condition")?;
        let mut words = negate(negated, vec!["MEMBER".into()]);
        if self.next_is_keyword(Keyword::Of) {
            words.push("OF".into());
        }
        let path = self.parse_path_expr()?;
        Ok(build::simple_condition(words, vec![left, path]))
    }

    /// Parses `IS [NOT] NULL` and `IS [NOT] EMPTY`.
    fn parse_is(&mut self, left: Node) -> Result<Node> {
        self.expect_keyword(Keyword::Is, "simple condition")?;
        let mut words = vec!["IS".into()];
        if self.next_is_keyword(Keyword::Not) {
            words.push("NOT".into());
        }
        if self.next_is_keyword(Keyword::Null) {
            words.push("NULL".into());
        } else if self.next_is_keyword(Keyword::Empty) {
            words.push("EMPTY".into());
        } else {
            return Err(self.mismatch("simple condition", "NULL or EMPTY"));
        }
        Ok(build::simple_condition(words, vec![left]))
    }
}

fn negate(negated: bool, mut words: Vec<String>) -> Vec<String> {
    if negated {
        words.insert(0, "NOT".into());
    }
    words
}

#[cfg(test)]
mod tests {
    use crate::parsing::parser::Parser;

    fn parse(input: &str) -> String {
        Parser::parse_condition_str(input).expect("parse failure").to_string()
    }

    #[test]
    fn or_binds_looser_than_and() {
        assert_eq!(
            parse("a = 1 OR b = 2 AND c = 3"),
            concat!(
                r#"Or[SimpleCondition("=")[Path("a"), Literal("1")], "#,
                r#"And[SimpleCondition("=")[Path("b"), Literal("2")], "#,
                r#"SimpleCondition("=")[Path("c"), Literal("3")]]]"#
            )
        );
    }

    #[test]
    fn parenthesized_conditional_commits_after_trial() {
        assert_eq!(
            parse("(a = 1 OR b = 2) AND c = 3"),
            concat!(
                r#"And[Or[SimpleCondition("=")[Path("a"), Literal("1")], "#,
                r#"SimpleCondition("=")[Path("b"), Literal("2")]], "#,
                r#"SimpleCondition("=")[Path("c"), Literal("3")]]"#
            )
        );
    }

    #[test]
    fn parenthesized_arithmetic_operand_survives_failed_trial() {
        assert_eq!(
            parse("(e.a + e.b) > 10"),
            concat!(
                r#"SimpleCondition(">")[BinaryOp("+")[Path("e", "a"), "#,
                r#"Path("e", "b")], Literal("10")]"#
            )
        );
    }

    #[test]
    fn not_wraps_a_primary() {
        assert_eq!(
            parse("NOT e.active = TRUE"),
            r#"Not[SimpleCondition("=")[Path("e", "active"), Literal("TRUE")]]"#
        );
    }

    #[test]
    fn between_consumes_its_own_and() {
        assert_eq!(
            parse("e.age BETWEEN 18 AND 65 AND e.active = TRUE"),
            concat!(
                r#"And[SimpleCondition("BETWEEN")[Path("e", "age"), Literal("18"), "#,
                r#"Literal("65")], SimpleCondition("=")[Path("e", "active"), "#,
                r#"Literal("TRUE")]]"#
            )
        );
    }

    #[test]
    fn negated_forms_echo_not_first() {
        assert_eq!(
            parse("e.status NOT IN (1, 2)"),
            concat!(
                r#"SimpleCondition("NOT", "IN")[Path("e", "status"), "#,
                r#"Literal("1"), Literal("2")]"#
            )
        );
    }

    #[test]
    fn like_with_escape_keeps_escape_in_payload() {
        assert_eq!(
            parse("e.name LIKE :pattern ESCAPE '!'"),
            concat!(
                r#"SimpleCondition("LIKE", "ESCAPE", "'!'")"#,
                r#"[Path("e", "name"), Parameter(":pattern")]"#
            )
        );
    }

    #[test]
    fn date_macro_stands_alone_as_predicate() {
        assert_eq!(
            parse("@today(e.createTs) AND e.active = TRUE"),
            concat!(
                r#"And[DateMacro("today")[Path("e", "createTs")], "#,
                r#"SimpleCondition("=")[Path("e", "active"), Literal("TRUE")]]"#
            )
        );
    }

    #[test]
    fn is_not_null_and_is_empty() {
        assert_eq!(
            parse("e.deleteTs IS NOT NULL"),
            r#"SimpleCondition("IS", "NOT", "NULL")[Path("e", "deleteTs")]"#
        );
        assert_eq!(
            parse("e.items IS EMPTY"),
            r#"SimpleCondition("IS", "EMPTY")[Path("e", "items")]"#
        );
    }

    #[test]
    fn member_of() {
        assert_eq!(
            parse(":item MEMBER OF e.items"),
            concat!(
                r#"SimpleCondition("MEMBER", "OF")[Parameter(":item"), "#,
                r#"Path("e", "items")]"#
            )
        );
    }

    #[test]
    fn dangling_and_fails_at_or_after_operator() {
        let err = Parser::parse_condition_str("e.active = TRUE AND").unwrap_err();
        assert!(err.pos() >= 16, "error at {} should not precede AND", err.pos());
    }
}
