//! Token navigation trait
//!
//! Base trait for all parser traits: lookahead, consumption, expectation,
//! and the trial-parse primitive used to choose between alternatives that
//! share an ambiguous prefix. Every error constructor takes the name of the
//! enclosing rule so failures report their grammar context.

use crate::error::{Error, Result};
use crate::parsing::lexer::{Keyword, Token};
use crate::parsing::stream::Mark;

pub trait TokenHelper {
    /// The next unconsumed token, without consuming it.
    fn peek(&self) -> &Token;

    /// The token `k` positions ahead (1-based), clamping to `Eof`.
    fn lookahead(&self, k: usize) -> &Token;

    /// Consumes and returns the next token.
    fn next(&mut self) -> Token;

    /// Byte offset of the next unconsumed token.
    fn offset(&self) -> usize;

    /// Saves the current stream position.
    fn mark(&self) -> Mark;

    /// Restores a previously saved stream position.
    fn rewind(&mut self, mark: Mark);

    /// Runs a rule speculatively: marks the stream, attempts a full match,
    /// rewinds unconditionally, and reports whether the rule matched. The
    /// speculatively built output is dropped, so a trial has no observable
    /// effect beyond the answer.
    fn try_rule<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> bool
    where
        Self: Sized,
    {
        let mark = self.mark();
        let matched = rule(self).is_ok();
        self.rewind(mark);
        matched
    }

    /// Consumes the next token if it is an identifier, or errors.
    fn next_ident(&mut self, rule: &'static str) -> Result<String> {
        if let Token::Ident(name) = self.peek() {
            let name = name.clone();
            self.next();
            return Ok(name);
        }
        Err(self.mismatch(rule, "identifier"))
    }

    /// Consumes the next token as an identifier, also accepting keywords
    /// (fields are allowed to be reserved-word-shaped, e.g. `e.count`).
    fn next_ident_or_keyword(&mut self, rule: &'static str) -> Result<String> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.next();
                Ok(name)
            }
            Token::Keyword(keyword) => {
                let name = keyword.as_str().to_lowercase();
                self.next();
                Ok(name)
            }
            _ => Err(self.mismatch(rule, "identifier")),
        }
    }

    /// Consumes the next token if it equals the given one, returning whether
    /// it did.
    fn next_is(&mut self, token: Token) -> bool {
        if self.peek() == &token {
            self.next();
            return true;
        }
        false
    }

    /// Consumes the next token if it is the given keyword.
    fn next_is_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_is(Token::Keyword(keyword))
    }

    /// Consumes the next token if it is the given one. Equivalent to
    /// `next_is`, but expresses intent better.
    fn skip(&mut self, token: Token) {
        self.next_is(token);
    }

    /// Consumes the next token if it's the expected one, or errors.
    fn expect(&mut self, expect: Token, rule: &'static str) -> Result<()> {
        if self.peek() == &expect {
            self.next();
            return Ok(());
        }
        Err(self.mismatch(rule, expect.to_string()))
    }

    /// Consumes the next token if it's the expected keyword, or errors.
    fn expect_keyword(&mut self, keyword: Keyword, rule: &'static str) -> Result<()> {
        self.expect(Token::Keyword(keyword), rule)
    }

    /// A token-mismatch error at the current position.
    fn mismatch(&self, rule: &'static str, expected: impl Into<String>) -> Error {
        Error::TokenMismatch {
            rule,
            expected: expected.into(),
            found: self.peek().to_string(),
            pos: self.offset(),
        }
    }

    /// A no-viable-alternative error at the current position.
    fn no_viable(&self, rule: &'static str) -> Error {
        Error::NoViableAlternative {
            rule,
            found: self.peek().to_string(),
            pos: self.offset(),
        }
    }

    /// An early-termination error: a required one-or-more repetition matched
    /// zero times.
    fn early_termination(&self, rule: &'static str, expected: &'static str) -> Error {
        Error::EarlyTermination {
            rule,
            expected,
            pos: self.offset(),
        }
    }
}
