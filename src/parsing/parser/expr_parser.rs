//! Arithmetic and value expression parser
//!
//! Implements the fixed precedence tiers (expression over terms, terms over
//! factors) and the primaries: paths, literals, parameters, parenthesized
//! expressions, subqueries, aggregates, case expressions, scalar functions
//! and macros. Binary operations fold left-to-right within a tier.

use super::token_helper::TokenHelper;
use crate::error::Result;
use crate::parsing::ast::{build, Node};
use crate::parsing::lexer::{Keyword, Token};

/// Parser trait for value expressions.
pub trait ExpressionParser: TokenHelper + Sized {
    /// Parses a parenthesized nested query.
    fn parse_subquery_expr(&mut self) -> Result<Node>;

    /// Parses a boolean condition (needed inside general case expressions).
    fn parse_conditional_expr(&mut self) -> Result<Node>;

    /// Parses an `@`-macro expression.
    fn parse_macro_expr(&mut self) -> Result<Node>;

    /// Parses an additive expression: `term (('+'|'-') term)*`.
    fn parse_expression(&mut self) -> Result<Node> {
        let mut expr = self.parse_term()?;
        loop {
            let operator = match self.peek() {
                Token::Plus => "+",
                Token::Minus => "-",
                _ => return Ok(expr),
            };
            self.next();
            let rhs = self.parse_term()?;
            expr = build::binary_op(operator, expr, rhs);
        }
    }

    /// Parses a multiplicative expression: `factor (('*'|'/') factor)*`.
    fn parse_term(&mut self) -> Result<Node> {
        let mut term = self.parse_factor()?;
        loop {
            let operator = match self.peek() {
                Token::Asterisk => "*",
                Token::Slash => "/",
                _ => return Ok(term),
            };
            self.next();
            let rhs = self.parse_factor()?;
            term = build::binary_op(operator, term, rhs);
        }
    }

    /// Parses an optionally signed primary.
    fn parse_factor(&mut self) -> Result<Node> {
        let sign = match self.peek() {
            Token::Plus => Some("+"),
            Token::Minus => Some("-"),
            _ => None,
        };
        if let Some(sign) = sign {
            self.next();
            let operand = self.parse_primary()?;
            return Ok(build::unary_op(sign, operand));
        }
        self.parse_primary()
    }

    /// Parses a primary expression, dispatching on the next token kind.
    fn parse_primary(&mut self) -> Result<Node> {
        match self.peek().clone() {
            Token::OpenParen => {
                if self.lookahead(2) == &Token::Keyword(Keyword::Select) {
                    return self.parse_subquery_expr();
                }
                self.next();
                let expr = self.parse_expression()?;
                self.expect(Token::CloseParen, "expression")?;
                Ok(expr)
            }
            Token::Integer(n) => {
                self.next();
                Ok(build::literal(n))
            }
            Token::Float(n) => {
                self.next();
                Ok(build::literal(n))
            }
            Token::String(_) => {
                let lexeme = self.next().to_string();
                Ok(build::literal(lexeme))
            }
            Token::Colon => self.parse_parameter(),
            Token::Question => self.parse_parameter(),
            Token::At => self.parse_macro_expr(),
            Token::Ident(_) => Ok(self.parse_path()?),
            Token::Keyword(keyword) => match keyword {
                Keyword::True | Keyword::False | Keyword::Null => {
                    self.next();
                    Ok(build::literal(keyword.as_str().into()))
                }
                Keyword::Count
                | Keyword::Avg
                | Keyword::Max
                | Keyword::Min
                | Keyword::Sum => self.parse_aggregate(keyword),
                Keyword::Case => self.parse_case(),
                Keyword::CurrentDate | Keyword::CurrentTime | Keyword::CurrentTimestamp => {
                    self.next();
                    Ok(build::function_call(keyword.as_str(), vec![], vec![]))
                }
                Keyword::Trim => self.parse_trim(),
                Keyword::Concat
                | Keyword::Substring
                | Keyword::Lower
                | Keyword::Upper
                | Keyword::Length
                | Keyword::Locate
                | Keyword::Abs
                | Keyword::Sqrt
                | Keyword::Mod
                | Keyword::Size
                | Keyword::Coalesce
                | Keyword::Nullif => self.parse_function(keyword),
                _ => Err(self.no_viable("expression")),
            },
            _ => Err(self.no_viable("expression")),
        }
    }

    /// Parses a dotted path expression. The root is a plain identifier;
    /// later segments may be reserved-word-shaped.
    fn parse_path(&mut self) -> Result<Node> {
        let mut segments = vec![self.next_ident("path")?];
        while self.next_is(Token::Period) {
            segments.push(self.next_ident_or_keyword("path")?);
        }
        Ok(build::path(segments))
    }

    /// Parses a named (`:name`) or positional (`?1`) parameter, keeping the
    /// exact surface text as payload.
    fn parse_parameter(&mut self) -> Result<Node> {
        if self.next_is(Token::Colon) {
            let name = self.next_ident_or_keyword("parameter")?;
            return Ok(build::parameter(format!(":{}", name)));
        }
        self.expect(Token::Question, "parameter")?;
        if let Token::Integer(n) = self.peek() {
            let text = format!("?{}", n);
            self.next();
            return Ok(build::parameter(text));
        }
        Err(self.mismatch("parameter", "parameter position"))
    }

    /// Parses an aggregate call. The surface tokens are echoed into the
    /// tree in order, around the argument subtree.
    fn parse_aggregate(&mut self, keyword: Keyword) -> Result<Node> {
        self.next();
        let mut parts = vec![build::echo(keyword.as_str())];
        self.expect(Token::OpenParen, "aggregate")?;
        parts.push(build::echo("("));
        if self.next_is_keyword(Keyword::Distinct) {
            parts.push(build::echo("DISTINCT"));
        }
        parts.push(self.parse_expression()?);
        self.expect(Token::CloseParen, "aggregate")?;
        parts.push(build::echo(")"));
        Ok(build::aggregate_expr(parts))
    }

    /// Parses a case expression, either form:
    /// `CASE operand (WHEN value THEN result)+ [ELSE result] END` or
    /// `CASE (WHEN condition THEN result)+ [ELSE result] END`.
    fn parse_case(&mut self) -> Result<Node> {
        self.expect_keyword(Keyword::Case, "case expression")?;
        let operand = if self.peek() == &Token::Keyword(Keyword::When) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let mut whens = Vec::new();
        while self.next_is_keyword(Keyword::When) {
            let condition = if operand.is_some() {
                self.parse_expression()?
            } else {
                self.parse_conditional_expr()?
            };
            self.expect_keyword(Keyword::Then, "case expression")?;
            let result = self.parse_expression()?;
            whens.push(build::when(condition, result));
        }
        if whens.is_empty() {
            return Err(self.early_termination("case expression", "WHEN branch"));
        }
        let otherwise = if self.next_is_keyword(Keyword::Else) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect_keyword(Keyword::End, "case expression")?;
        Ok(build::case_expr(operand, whens, otherwise))
    }

    /// Parses a scalar function call with a plain argument list.
    fn parse_function(&mut self, keyword: Keyword) -> Result<Node> {
        self.next();
        self.expect(Token::OpenParen, "function")?;
        let mut args = vec![self.parse_expression()?];
        while self.next_is(Token::Comma) {
            args.push(self.parse_expression()?);
        }
        self.expect(Token::CloseParen, "function")?;
        Ok(build::function_call(keyword.as_str(), vec![], args))
    }

    /// Parses a TRIM call: `TRIM([LEADING|TRAILING|BOTH] [char] [FROM] s)`.
    /// The trim specification words are echoed into the payload.
    fn parse_trim(&mut self) -> Result<Node> {
        self.expect_keyword(Keyword::Trim, "function")?;
        self.expect(Token::OpenParen, "function")?;
        let mut extras = Vec::new();
        for spec in [Keyword::Leading, Keyword::Trailing, Keyword::Both] {
            if self.next_is_keyword(spec) {
                extras.push(spec.as_str().to_string());
                break;
            }
        }
        let mut args = Vec::new();
        if let Token::String(_) = self.peek() {
            args.push(build::literal(self.next().to_string()));
        }
        if self.next_is_keyword(Keyword::From) {
            extras.push("FROM".into());
        } else if !extras.is_empty() || !args.is_empty() {
            self.expect_keyword(Keyword::From, "function")?;
        }
        args.push(self.parse_expression()?);
        self.expect(Token::CloseParen, "function")?;
        Ok(build::function_call("TRIM", extras, args))
    }
}
