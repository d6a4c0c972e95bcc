//! Statement and clause parser
//!
//! Top-level dispatch (SELECT, UPDATE, DELETE by one token of lookahead) and
//! the clause rules: select items, from-clause sources with joins, where,
//! group by, having, order by, plus subqueries. Each clause rule returns the
//! canonical node for its clause; optional clauses return `None` when absent.

use super::token_helper::TokenHelper;
use crate::error::Result;
use crate::parsing::ast::{build, Node};
use crate::parsing::lexer::{Keyword, Token};

/// Parser trait for statements and clauses.
pub trait StatementParser: TokenHelper + Sized {
    /// Parses an arithmetic/value expression.
    fn parse_expression(&mut self) -> Result<Node>;

    /// Parses a boolean condition.
    fn parse_conditional(&mut self) -> Result<Node>;

    /// Parses a dotted path expression.
    fn parse_path_expr(&mut self) -> Result<Node>;

    /// Parses one top-level statement.
    fn parse_statement(&mut self) -> Result<Node> {
        match self.peek() {
            Token::Keyword(Keyword::Select) => self.parse_select_statement(),
            Token::Keyword(Keyword::Update) => self.parse_update_statement(),
            Token::Keyword(Keyword::Delete) => self.parse_delete_statement(),
            _ => Err(self.no_viable("statement")),
        }
    }

    /// Parses a SELECT statement.
    fn parse_select_statement(&mut self) -> Result<Node> {
        self.expect_keyword(Keyword::Select, "select statement")?;
        let distinct = self.next_is_keyword(Keyword::Distinct);
        let mut items = vec![self.parse_selected_item()?];
        while self.next_is(Token::Comma) {
            items.push(self.parse_selected_item()?);
        }
        self.expect_keyword(Keyword::From, "select statement")?;
        let sources = self.parse_sources()?;
        let condition = self.parse_where_clause()?;
        let group_by = self.parse_group_by_clause()?;
        let having = self.parse_having_clause()?;
        let order_by = self.parse_order_by_clause()?;
        Ok(build::query(
            build::selected_items(distinct, items),
            sources,
            condition,
            group_by,
            having,
            order_by,
        ))
    }

    /// Parses one select clause entry with an optional result alias.
    fn parse_selected_item(&mut self) -> Result<Node> {
        let expression = self.parse_expression()?;
        let alias = if self.next_is_keyword(Keyword::As) {
            Some(self.next_ident("select clause")?)
        } else {
            None
        };
        Ok(build::selected_item(expression, alias))
    }

    /// Parses the from clause: one or more comma-separated sources.
    fn parse_sources(&mut self) -> Result<Node> {
        if !can_start_source(self.peek()) {
            return Err(self.early_termination("from clause", "source declaration"));
        }
        let mut list = vec![self.parse_source()?];
        while self.next_is(Token::Comma) {
            list.push(self.parse_source()?);
        }
        Ok(build::sources(list))
    }

    /// Parses one source: a range variable declaration (`Entity [AS] e`) or
    /// a collection member declaration (`IN(path) [AS] e`), selected by two
    /// tokens of lookahead, followed by any number of joins. Both forms get
    /// the same `Source` wrapper.
    fn parse_source(&mut self) -> Result<Node> {
        let declaration = if self.peek() == &Token::Keyword(Keyword::In)
            && self.lookahead(2) == &Token::OpenParen
        {
            self.next();
            self.next();
            let path = self.parse_path_expr()?;
            self.expect(Token::CloseParen, "source declaration")?;
            self.skip(Token::Keyword(Keyword::As));
            let alias = self.next_ident("source declaration")?;
            build::collection_member(alias, path)
        } else {
            let entity = build::entity_name(&self.next_ident("source declaration")?);
            let alias = self.parse_alias("source declaration")?;
            build::identified_variable(alias, entity)
        };
        let mut joins = Vec::new();
        while matches!(
            self.peek(),
            Token::Keyword(Keyword::Join) | Token::Keyword(Keyword::Left) | Token::Keyword(Keyword::Inner)
        ) {
            joins.push(self.parse_join()?);
        }
        Ok(build::source(declaration, joins))
    }

    /// Parses one join declaration:
    /// `[LEFT [OUTER] | INNER] JOIN [FETCH] path [[AS] alias] [ON condition]`.
    /// The join words are echoed as written.
    fn parse_join(&mut self) -> Result<Node> {
        let mut spec = Vec::new();
        if self.next_is_keyword(Keyword::Left) {
            spec.push("LEFT");
            if self.next_is_keyword(Keyword::Outer) {
                spec.push("OUTER");
            }
        } else if self.next_is_keyword(Keyword::Inner) {
            spec.push("INNER");
        }
        self.expect_keyword(Keyword::Join, "join")?;
        spec.push("JOIN");
        if self.next_is_keyword(Keyword::Fetch) {
            spec.push("FETCH");
        }
        let path = if matches!(self.peek(), Token::Ident(_)) && self.lookahead(2) == &Token::Period
        {
            self.parse_path_expr()?
        } else {
            build::entity_name(&self.next_ident("join")?)
        };
        let alias = self.parse_alias("join")?;
        let on = if self.next_is_keyword(Keyword::On) {
            Some(self.parse_conditional()?)
        } else {
            None
        };
        Ok(build::join_variable(spec.join(" "), alias, path, on))
    }

    /// Parses an optional `[AS] identifier` alias. A written AS makes the
    /// identifier mandatory.
    fn parse_alias(&mut self, rule: &'static str) -> Result<Option<String>> {
        if self.next_is_keyword(Keyword::As) {
            return Ok(Some(self.next_ident(rule)?));
        }
        if matches!(self.peek(), Token::Ident(_)) {
            return Ok(Some(self.next_ident(rule)?));
        }
        Ok(None)
    }

    /// Parses a WHERE clause, if present.
    fn parse_where_clause(&mut self) -> Result<Option<Node>> {
        if !self.next_is_keyword(Keyword::Where) {
            return Ok(None);
        }
        Ok(Some(build::condition(self.parse_conditional()?)))
    }

    /// Parses a GROUP BY clause, if present.
    fn parse_group_by_clause(&mut self) -> Result<Option<Node>> {
        if !self.next_is_keyword(Keyword::Group) {
            return Ok(None);
        }
        self.expect_keyword(Keyword::By, "group by clause")?;
        if !can_start_expression(self.peek()) {
            return Err(self.early_termination("group by clause", "grouping expression"));
        }
        let mut items = vec![self.parse_expression()?];
        while self.next_is(Token::Comma) {
            items.push(self.parse_expression()?);
        }
        Ok(Some(build::group_by(items)))
    }

    /// Parses a HAVING clause, if present.
    fn parse_having_clause(&mut self) -> Result<Option<Node>> {
        if !self.next_is_keyword(Keyword::Having) {
            return Ok(None);
        }
        Ok(Some(build::having(self.parse_conditional()?)))
    }

    /// Parses an ORDER BY clause, if present. A direction keyword is echoed
    /// only when written.
    fn parse_order_by_clause(&mut self) -> Result<Option<Node>> {
        if !self.next_is_keyword(Keyword::Order) {
            return Ok(None);
        }
        self.expect_keyword(Keyword::By, "order by clause")?;
        if !can_start_expression(self.peek()) {
            return Err(self.early_termination("order by clause", "ordering field"));
        }
        let mut fields = vec![self.parse_order_by_field()?];
        while self.next_is(Token::Comma) {
            fields.push(self.parse_order_by_field()?);
        }
        Ok(Some(build::order_by(fields)))
    }

    fn parse_order_by_field(&mut self) -> Result<Node> {
        let expression = self.parse_expression()?;
        let direction = if self.next_is_keyword(Keyword::Asc) {
            Some("ASC".into())
        } else if self.next_is_keyword(Keyword::Desc) {
            Some("DESC".into())
        } else {
            None
        };
        Ok(build::order_by_field(expression, direction))
    }

    /// Parses an UPDATE statement. The entity being updated is wrapped in
    /// the same `Sources`/`Source` shape as a from clause, so consumers see
    /// one way of declaring variables.
    fn parse_update_statement(&mut self) -> Result<Node> {
        self.expect_keyword(Keyword::Update, "update statement")?;
        let entity = build::entity_name(&self.next_ident("update statement")?);
        let alias = self.parse_alias("update statement")?;
        let sources = build::sources(vec![build::source(
            build::identified_variable(alias, entity),
            vec![],
        )]);
        self.expect_keyword(Keyword::Set, "update statement")?;
        if !matches!(self.peek(), Token::Ident(_)) {
            return Err(self.early_termination("update clause", "update item"));
        }
        let mut items = vec![self.parse_update_item()?];
        while self.next_is(Token::Comma) {
            items.push(self.parse_update_item()?);
        }
        let condition = self.parse_where_clause()?;
        Ok(build::update_query(sources, build::update_set(items), condition))
    }

    fn parse_update_item(&mut self) -> Result<Node> {
        let path = self.parse_path_expr()?;
        self.expect(Token::Equal, "update clause")?;
        let value = self.parse_expression()?;
        Ok(build::update_item(path, value))
    }

    /// Parses a DELETE statement.
    fn parse_delete_statement(&mut self) -> Result<Node> {
        self.expect_keyword(Keyword::Delete, "delete statement")?;
        self.expect_keyword(Keyword::From, "delete statement")?;
        let entity = build::entity_name(&self.next_ident("delete statement")?);
        let alias = self.parse_alias("delete statement")?;
        let sources = build::sources(vec![build::source(
            build::identified_variable(alias, entity),
            vec![],
        )]);
        let condition = self.parse_where_clause()?;
        Ok(build::delete_query(sources, condition))
    }

    /// Parses a parenthesized nested query: `( select-statement )`.
    fn parse_subquery(&mut self) -> Result<Node> {
        self.expect(Token::OpenParen, "subquery")?;
        let query = self.parse_select_statement()?;
        self.expect(Token::CloseParen, "subquery")?;
        Ok(build::subquery(query))
    }
}

/// Whether a token can begin a from-clause source declaration.
fn can_start_source(token: &Token) -> bool {
    matches!(token, Token::Ident(_) | Token::Keyword(Keyword::In))
}

/// Whether a token can begin a value expression. Used to turn an empty
/// required list into an early-termination error at the list head.
fn can_start_expression(token: &Token) -> bool {
    match token {
        Token::Ident(_)
        | Token::Integer(_)
        | Token::Float(_)
        | Token::String(_)
        | Token::OpenParen
        | Token::Colon
        | Token::Question
        | Token::At
        | Token::Plus
        | Token::Minus => true,
        Token::Keyword(keyword) => matches!(
            keyword,
            Keyword::True
                | Keyword::False
                | Keyword::Null
                | Keyword::Count
                | Keyword::Avg
                | Keyword::Max
                | Keyword::Min
                | Keyword::Sum
                | Keyword::Case
                | Keyword::Coalesce
                | Keyword::Nullif
                | Keyword::Concat
                | Keyword::Substring
                | Keyword::Trim
                | Keyword::Lower
                | Keyword::Upper
                | Keyword::Length
                | Keyword::Locate
                | Keyword::Abs
                | Keyword::Sqrt
                | Keyword::Mod
                | Keyword::Size
                | Keyword::CurrentDate
                | Keyword::CurrentTime
                | Keyword::CurrentTimestamp
        ),
        _ => false,
    }
}
