//! Lexer for EQL source text
//!
//! Splits a query string into typed tokens with byte spans. The lexer is
//! deliberately dumb: it classifies lexical units and leaves all structure
//! to the parser. Keywords are recognized case-insensitively; identifiers
//! keep their original spelling.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The smallest span covering both spans.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Lexer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// A numeric literal without a fractional part, e.g. `42`.
    Integer(String),
    /// A numeric literal with a fractional part or exponent, e.g. `3.14`.
    Float(String),
    /// A single-quoted string literal, with quotes and escapes resolved.
    String(String),
    /// An identifier: entity names, variables, field names.
    Ident(String),
    /// A reserved word.
    Keyword(Keyword),
    Period,
    Comma,
    OpenParen,
    CloseParen,
    Equal,
    /// `<>`
    LessOrGreaterThan,
    /// `!=`
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Colon,
    Question,
    At,
    /// Distinguished end-of-input token.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Integer(n) => n,
            Self::Float(n) => n,
            Self::String(s) => return write!(f, "'{}'", s.replace('\'', "''")),
            Self::Ident(s) => s,
            Self::Keyword(k) => return k.fmt(f),
            Self::Period => ".",
            Self::Comma => ",",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::Equal => "=",
            Self::LessOrGreaterThan => "<>",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Colon => ":",
            Self::Question => "?",
            Self::At => "@",
            Self::Eof => "end of input",
        })
    }
}

impl From<Keyword> for Token {
    fn from(keyword: Keyword) -> Self {
        Self::Keyword(keyword)
    }
}

/// Reserved words. These can't be used as identifiers in most positions,
/// but the parser accepts them as path segments (fields are allowed to be
/// reserved-word-shaped, e.g. `e.count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Abs,
    All,
    And,
    Any,
    As,
    Asc,
    Avg,
    Between,
    Both,
    By,
    Case,
    Coalesce,
    Concat,
    Count,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    Delete,
    Desc,
    Distinct,
    Else,
    Empty,
    End,
    Escape,
    Exists,
    False,
    Fetch,
    From,
    Group,
    Having,
    In,
    Inner,
    Is,
    Join,
    Leading,
    Left,
    Length,
    Like,
    Locate,
    Lower,
    Max,
    Member,
    Min,
    Mod,
    Not,
    Null,
    Nullif,
    Of,
    On,
    Or,
    Order,
    Outer,
    Select,
    Set,
    Size,
    Some,
    Sqrt,
    Substring,
    Sum,
    Then,
    Trailing,
    Trim,
    True,
    Update,
    Upper,
    When,
    Where,
}

impl Keyword {
    /// Looks up the keyword corresponding to the given identifier, if any.
    /// Matching is case-insensitive.
    pub fn from_str(ident: &str) -> Option<Self> {
        Some(match ident.to_uppercase().as_str() {
            "ABS" => Self::Abs,
            "ALL" => Self::All,
            "AND" => Self::And,
            "ANY" => Self::Any,
            "AS" => Self::As,
            "ASC" => Self::Asc,
            "AVG" => Self::Avg,
            "BETWEEN" => Self::Between,
            "BOTH" => Self::Both,
            "BY" => Self::By,
            "CASE" => Self::Case,
            "COALESCE" => Self::Coalesce,
            "CONCAT" => Self::Concat,
            "COUNT" => Self::Count,
            "CURRENT_DATE" => Self::CurrentDate,
            "CURRENT_TIME" => Self::CurrentTime,
            "CURRENT_TIMESTAMP" => Self::CurrentTimestamp,
            "DELETE" => Self::Delete,
            "DESC" => Self::Desc,
            "DISTINCT" => Self::Distinct,
            "ELSE" => Self::Else,
            "EMPTY" => Self::Empty,
            "END" => Self::End,
            "ESCAPE" => Self::Escape,
            "EXISTS" => Self::Exists,
            "FALSE" => Self::False,
            "FETCH" => Self::Fetch,
            "FROM" => Self::From,
            "GROUP" => Self::Group,
            "HAVING" => Self::Having,
            "IN" => Self::In,
            "INNER" => Self::Inner,
            "IS" => Self::Is,
            "JOIN" => Self::Join,
            "LEADING" => Self::Leading,
            "LEFT" => Self::Left,
            "LENGTH" => Self::Length,
            "LIKE" => Self::Like,
            "LOCATE" => Self::Locate,
            "LOWER" => Self::Lower,
            "MAX" => Self::Max,
            "MEMBER" => Self::Member,
            "MIN" => Self::Min,
            "MOD" => Self::Mod,
            "NOT" => Self::Not,
            "NULL" => Self::Null,
            "NULLIF" => Self::Nullif,
            "OF" => Self::Of,
            "ON" => Self::On,
            "OR" => Self::Or,
            "ORDER" => Self::Order,
            "OUTER" => Self::Outer,
            "SELECT" => Self::Select,
            "SET" => Self::Set,
            "SIZE" => Self::Size,
            "SOME" => Self::Some,
            "SQRT" => Self::Sqrt,
            "SUBSTRING" => Self::Substring,
            "SUM" => Self::Sum,
            "THEN" => Self::Then,
            "TRAILING" => Self::Trailing,
            "TRIM" => Self::Trim,
            "TRUE" => Self::True,
            "UPDATE" => Self::Update,
            "UPPER" => Self::Upper,
            "WHEN" => Self::When,
            "WHERE" => Self::Where,
            _ => return None,
        })
    }

    /// The canonical (uppercase) spelling, used for display and for echoing
    /// keywords into the tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abs => "ABS",
            Self::All => "ALL",
            Self::And => "AND",
            Self::Any => "ANY",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::Avg => "AVG",
            Self::Between => "BETWEEN",
            Self::Both => "BOTH",
            Self::By => "BY",
            Self::Case => "CASE",
            Self::Coalesce => "COALESCE",
            Self::Concat => "CONCAT",
            Self::Count => "COUNT",
            Self::CurrentDate => "CURRENT_DATE",
            Self::CurrentTime => "CURRENT_TIME",
            Self::CurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::Delete => "DELETE",
            Self::Desc => "DESC",
            Self::Distinct => "DISTINCT",
            Self::Else => "ELSE",
            Self::Empty => "EMPTY",
            Self::End => "END",
            Self::Escape => "ESCAPE",
            Self::Exists => "EXISTS",
            Self::False => "FALSE",
            Self::Fetch => "FETCH",
            Self::From => "FROM",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::In => "IN",
            Self::Inner => "INNER",
            Self::Is => "IS",
            Self::Join => "JOIN",
            Self::Leading => "LEADING",
            Self::Left => "LEFT",
            Self::Length => "LENGTH",
            Self::Like => "LIKE",
            Self::Locate => "LOCATE",
            Self::Lower => "LOWER",
            Self::Max => "MAX",
            Self::Member => "MEMBER",
            Self::Min => "MIN",
            Self::Mod => "MOD",
            Self::Not => "NOT",
            Self::Null => "NULL",
            Self::Nullif => "NULLIF",
            Self::Of => "OF",
            Self::On => "ON",
            Self::Or => "OR",
            Self::Order => "ORDER",
            Self::Outer => "OUTER",
            Self::Select => "SELECT",
            Self::Set => "SET",
            Self::Size => "SIZE",
            Self::Some => "SOME",
            Self::Sqrt => "SQRT",
            Self::Substring => "SUBSTRING",
            Self::Sum => "SUM",
            Self::Then => "THEN",
            Self::Trailing => "TRAILING",
            Self::Trim => "TRIM",
            Self::True => "TRUE",
            Self::Update => "UPDATE",
            Self::Upper => "UPPER",
            Self::When => "WHEN",
            Self::Where => "WHERE",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexer tokenizes an input string as an iterator of spanned tokens.
pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl Iterator for Lexer<'_> {
    type Item = Result<(Token, Span)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let &(start, c) = self.chars.peek()?;
        let result = match c {
            '\'' => self.scan_string(start),
            '0'..='9' => Ok(self.scan_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_ident_or_keyword()),
            _ => {
                self.chars.next();
                self.scan_symbol(start, c)
            }
        };
        Some(result.map(|token| (token, Span::new(start, self.offset()))))
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source string.
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            chars: input.char_indices().peekable(),
            len: input.len(),
        }
    }

    /// The byte offset just past the last consumed character.
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |&(i, _)| i)
    }

    /// Consumes the next character if it satisfies the predicate.
    fn next_if(&mut self, predicate: impl Fn(char) -> bool) -> Option<char> {
        self.chars.next_if(|&(_, c)| predicate(c)).map(|(_, c)| c)
    }

    /// Skips any whitespace.
    fn skip_whitespace(&mut self) {
        while self.next_if(|c| c.is_whitespace()).is_some() {}
    }

    /// Scans an identifier or keyword.
    fn scan_ident_or_keyword(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.next_if(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            name.push(c);
        }
        match Keyword::from_str(&name) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Ident(name),
        }
    }

    /// Scans a numeric literal. A period only belongs to the number when a
    /// digit follows it, so `e.id` and `1.5` both lex as expected.
    fn scan_number(&mut self) -> Token {
        let mut number = String::new();
        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            number.push(c);
        }
        let mut float = false;
        if let Some(&(_, '.')) = self.chars.peek() {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(&(_, c)) if c.is_ascii_digit()) {
                float = true;
                self.chars.next();
                number.push('.');
                while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                    number.push(c);
                }
            }
        }
        if let Some(exp) = self.next_if(|c| c == 'e' || c == 'E') {
            float = true;
            number.push(exp);
            if let Some(sign) = self.next_if(|c| c == '+' || c == '-') {
                number.push(sign);
            }
            while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
                number.push(c);
            }
        }
        if float {
            Token::Float(number)
        } else {
            Token::Integer(number)
        }
    }

    /// Scans a single-quoted string literal. A doubled quote `''` escapes a
    /// literal quote character.
    fn scan_string(&mut self, start: usize) -> Result<Token> {
        self.chars.next();
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\'')) => {
                    if self.next_if(|c| c == '\'').is_some() {
                        s.push('\'');
                    } else {
                        break;
                    }
                }
                Some((_, c)) => s.push(c),
                None => return Err(Error::UnexpectedCharacter('\'', start)),
            }
        }
        Ok(Token::String(s))
    }

    /// Scans a punctuation token, combining two-character operators. The
    /// first character has already been consumed.
    fn scan_symbol(&mut self, pos: usize, c: char) -> Result<Token> {
        Ok(match c {
            '.' => Token::Period,
            ',' => Token::Comma,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '=' => Token::Equal,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            ':' => Token::Colon,
            '?' => Token::Question,
            '@' => Token::At,
            '<' => {
                if self.next_if(|c| c == '=').is_some() {
                    Token::LessThanOrEqual
                } else if self.next_if(|c| c == '>').is_some() {
                    Token::LessOrGreaterThan
                } else {
                    Token::LessThan
                }
            }
            '>' => {
                if self.next_if(|c| c == '=').is_some() {
                    Token::GreaterThanOrEqual
                } else {
                    Token::GreaterThan
                }
            }
            '!' => {
                if self.next_if(|c| c == '=').is_some() {
                    Token::NotEqual
                } else {
                    return Err(Error::UnexpectedCharacter('!', pos));
                }
            }
            c => return Err(Error::UnexpectedCharacter(c, pos)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .map(|result| result.map(|(token, _)| token))
            .collect::<Result<_>>()
            .expect("lex failure")
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            tokens("select SELECT SeLeCt"),
            vec![
                Token::Keyword(Keyword::Select),
                Token::Keyword(Keyword::Select),
                Token::Keyword(Keyword::Select),
            ]
        );
    }

    #[test]
    fn identifiers_keep_their_case() {
        assert_eq!(
            tokens("Customer customer_Name app$Order"),
            vec![
                Token::Ident("Customer".into()),
                Token::Ident("customer_Name".into()),
                Token::Ident("app$Order".into()),
            ]
        );
    }

    #[test]
    fn paths_do_not_swallow_periods() {
        assert_eq!(
            tokens("e.id 1.5 2.x"),
            vec![
                Token::Ident("e".into()),
                Token::Period,
                Token::Ident("id".into()),
                Token::Float("1.5".into()),
                Token::Integer("2".into()),
                Token::Period,
                Token::Ident("x".into()),
            ]
        );
    }

    #[test]
    fn strings_unescape_doubled_quotes() {
        assert_eq!(
            tokens("'it''s'"),
            vec![Token::String("it's".into())]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        let result: Result<Vec<_>> = Lexer::new("'oops").collect();
        assert!(matches!(result, Err(Error::UnexpectedCharacter('\'', 0))));
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            tokens("<= >= <> != < >"),
            vec![
                Token::LessThanOrEqual,
                Token::GreaterThanOrEqual,
                Token::LessOrGreaterThan,
                Token::NotEqual,
                Token::LessThan,
                Token::GreaterThan,
            ]
        );
    }

    #[test]
    fn spans_cover_lexemes() {
        let spans: Vec<Span> = Lexer::new("SELECT e")
            .map(|r| r.map(|(_, span)| span))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(spans, vec![Span::new(0, 6), Span::new(7, 8)]);
    }

    #[test]
    fn macro_and_parameter_punctuation() {
        assert_eq!(
            tokens("@enum(:p) ?1"),
            vec![
                Token::At,
                Token::Ident("enum".into()),
                Token::OpenParen,
                Token::Colon,
                Token::Ident("p".into()),
                Token::CloseParen,
                Token::Question,
                Token::Integer("1".into()),
            ]
        );
    }

    #[test]
    fn stray_character_errors() {
        let result: Result<Vec<_>> = Lexer::new("a # b").collect();
        assert!(matches!(result, Err(Error::UnexpectedCharacter('#', 2))));
    }
}
