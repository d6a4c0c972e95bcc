//! Macro expression parser
//!
//! `@`-macros are language extensions with fixed argument shapes: `@enum`
//! wraps a qualified enum constant, and the date macros (`@between`,
//! `@today`, `@dateEquals`, `@dateBefore`, `@dateAfter`) describe date-range
//! filters over a field. Only the syntax is parsed here; what a macro
//! evaluates to is the consumer's business.

use super::token_helper::TokenHelper;
use crate::error::{Error, Result};
use crate::parsing::ast::{build, Node};
use crate::parsing::lexer::Token;

/// Parser trait for `@`-macro expressions.
pub trait MacroParser: TokenHelper + Sized {
    /// Parses a dotted path expression.
    fn parse_path_expr(&mut self) -> Result<Node>;

    /// Parses a primary value expression (parameter, literal, path).
    fn parse_primary_expr(&mut self) -> Result<Node>;

    /// Parses one macro expression, dispatching on the macro name.
    /// Names are matched case-insensitively but echoed as written.
    fn parse_macro(&mut self) -> Result<Node> {
        self.expect(Token::At, "macro")?;
        let pos = self.offset();
        let name = self.next_ident_or_keyword("macro")?;
        match name.to_lowercase().as_str() {
            "enum" => self.parse_enum_macro(),
            "between" => self.parse_between_macro(name),
            "today" => self.parse_today_macro(name),
            "dateequals" | "datebefore" | "dateafter" => self.parse_date_compare_macro(name),
            _ => Err(Error::NoViableAlternative {
                rule: "macro",
                found: format!("@{}", name),
                pos,
            }),
        }
    }

    /// Parses `@enum(qualified.Constant)`.
    fn parse_enum_macro(&mut self) -> Result<Node> {
        self.expect(Token::OpenParen, "macro")?;
        let constant = self.parse_path_expr()?;
        self.expect(Token::CloseParen, "macro")?;
        Ok(build::enum_macro(constant))
    }

    /// Parses `@between(path, now±n, now±n, unit [, USER_TIMEZONE])`.
    fn parse_between_macro(&mut self, name: String) -> Result<Node> {
        self.expect(Token::OpenParen, "macro")?;
        let path = self.parse_path_expr()?;
        self.expect(Token::Comma, "macro")?;
        let low = self.parse_now_expr()?;
        self.expect(Token::Comma, "macro")?;
        let high = self.parse_now_expr()?;
        self.expect(Token::Comma, "macro")?;
        let mut words = vec![self.next_ident("macro")?];
        if let Some(timezone) = self.parse_timezone_flag()? {
            words.push(timezone);
        }
        self.expect(Token::CloseParen, "macro")?;
        Ok(build::date_macro(name, words, vec![path, low, high]))
    }

    /// Parses `@today(path [, USER_TIMEZONE])`.
    fn parse_today_macro(&mut self, name: String) -> Result<Node> {
        self.expect(Token::OpenParen, "macro")?;
        let path = self.parse_path_expr()?;
        let words = self.parse_timezone_flag()?.into_iter().collect();
        self.expect(Token::CloseParen, "macro")?;
        Ok(build::date_macro(name, words, vec![path]))
    }

    /// Parses `@dateEquals/@dateBefore/@dateAfter(path, value
    /// [, USER_TIMEZONE])` where value is a parameter, a now-expression or
    /// a path.
    fn parse_date_compare_macro(&mut self, name: String) -> Result<Node> {
        self.expect(Token::OpenParen, "macro")?;
        let path = self.parse_path_expr()?;
        self.expect(Token::Comma, "macro")?;
        let value = if matches!(self.peek(), Token::Ident(word) if word.eq_ignore_ascii_case("now"))
        {
            self.parse_now_expr()?
        } else {
            self.parse_primary_expr()?
        };
        let words = self.parse_timezone_flag()?.into_iter().collect();
        self.expect(Token::CloseParen, "macro")?;
        Ok(build::date_macro(name, words, vec![path, value]))
    }

    /// Parses a now-expression: `now` optionally offset by an integer,
    /// e.g. `now-1` or `now+2`.
    fn parse_now_expr(&mut self) -> Result<Node> {
        let word = self.next_ident("date macro")?;
        if !word.eq_ignore_ascii_case("now") {
            return Err(self.mismatch("date macro", "now"));
        }
        let base = build::echo("now");
        let operator = match self.peek() {
            Token::Plus => "+",
            Token::Minus => "-",
            _ => return Ok(base),
        };
        self.next();
        if let Token::Integer(n) = self.peek() {
            let offset = build::literal(n.clone());
            self.next();
            return Ok(build::binary_op(operator, base, offset));
        }
        Err(self.mismatch("date macro", "integer offset"))
    }

    /// Parses the optional trailing `, USER_TIMEZONE` argument, returning
    /// the word as written.
    fn parse_timezone_flag(&mut self) -> Result<Option<String>> {
        if self.peek() != &Token::Comma {
            return Ok(None);
        }
        self.next();
        Ok(Some(self.next_ident("macro")?))
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::parser::Parser;

    fn parse(input: &str) -> String {
        Parser::parse_expression_str(input).expect("parse failure").to_string()
    }

    #[test]
    fn enum_macro_wraps_qualified_constant() {
        assert_eq!(
            parse("@enum(com.app.Status.ACTIVE)"),
            r#"EnumMacro[Path("com", "app", "Status", "ACTIVE")]"#
        );
    }

    #[test]
    fn between_macro_with_offsets_and_unit() {
        assert_eq!(
            parse("@between(e.createTs, now-1, now+2, day)"),
            concat!(
                r#"DateMacro("between", "day")[Path("e", "createTs"), "#,
                r#"BinaryOp("-")["now", Literal("1")], "#,
                r#"BinaryOp("+")["now", Literal("2")]]"#
            )
        );
    }

    #[test]
    fn between_macro_with_timezone() {
        assert_eq!(
            parse("@between(e.ts, now, now+1, hour, user_timezone)"),
            concat!(
                r#"DateMacro("between", "hour", "user_timezone")"#,
                r#"[Path("e", "ts"), "now", BinaryOp("+")["now", Literal("1")]]"#
            )
        );
    }

    #[test]
    fn today_macro() {
        assert_eq!(
            parse("@today(e.createTs)"),
            r#"DateMacro("today")[Path("e", "createTs")]"#
        );
    }

    #[test]
    fn date_compare_macro_name_is_echoed_as_written() {
        assert_eq!(
            parse("@dateEquals(e.createTs, :d)"),
            r#"DateMacro("dateEquals")[Path("e", "createTs"), Parameter(":d")]"#
        );
        assert_eq!(
            parse("@dateBefore(e.createTs, now)"),
            r#"DateMacro("dateBefore")[Path("e", "createTs"), "now"]"#
        );
    }

    #[test]
    fn unknown_macro_is_rejected_by_name() {
        let err = Parser::parse_expression_str("@bogus(e.x)").unwrap_err();
        assert_eq!(err.rule(), Some("macro"));
        assert_eq!(err.pos(), 1);
    }
}
