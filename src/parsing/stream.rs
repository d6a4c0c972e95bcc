//! Token stream consumed by the parser
//!
//! Wraps the finite token sequence of one statement and tracks a single
//! position. Lookahead never consumes; `mark`/`rewind` restore position for
//! trial parses. Reading past the end keeps returning the `Eof` token, so
//! rules never have to special-case exhaustion.

use super::lexer::{Lexer, Span, Token};
use crate::error::Result;

/// A saved stream position. Rewinding to a mark restores the stream exactly;
/// marks have no other effect, so an abandoned mark costs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// An ordered, fully materialized token sequence with one cursor.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl TokenStream {
    /// Tokenizes the given source text. Lexical errors surface here, before
    /// any parsing starts.
    pub fn new(input: &str) -> Result<Self> {
        let mut tokens: Vec<(Token, Span)> = Lexer::new(input).collect::<Result<_>>()?;
        let end = tokens.last().map_or(input.len(), |(_, span)| span.end);
        tokens.push((Token::Eof, Span::new(end, end)));
        Ok(TokenStream { tokens, pos: 0 })
    }

    /// Builds a stream from an already tokenized sequence. A trailing `Eof`
    /// is appended if the caller didn't supply one.
    pub fn from_tokens(mut tokens: Vec<(Token, Span)>) -> Self {
        if !matches!(tokens.last(), Some((Token::Eof, _))) {
            let end = tokens.last().map_or(0, |(_, span)| span.end);
            tokens.push((Token::Eof, Span::new(end, end)));
        }
        TokenStream { tokens, pos: 0 }
    }

    /// The next unconsumed token, without consuming it.
    pub fn peek(&self) -> &Token {
        self.lookahead(1)
    }

    /// The token `k` positions ahead (1-based: `lookahead(1)` is the next
    /// token). Positions past the end all read as `Eof`.
    pub fn lookahead(&self, k: usize) -> &Token {
        let index = (self.pos + k - 1).min(self.tokens.len() - 1);
        &self.tokens[index].0
    }

    /// Consumes and returns the next token. At the end of input this keeps
    /// returning `Eof` without advancing further.
    pub fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// The span of the next unconsumed token.
    pub fn span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Byte offset of the next unconsumed token, for error positions.
    pub fn offset(&self) -> usize {
        self.span().start
    }

    /// Saves the current position.
    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Restores a previously saved position.
    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    /// The exact span of everything consumed so far.
    pub fn consumed_span(&self) -> Span {
        if self.pos == 0 {
            return Span::new(0, 0);
        }
        let start = self.tokens[0].1;
        start.union(self.tokens[self.pos - 1].1)
    }

    /// Whether every token except the trailing `Eof` has been consumed.
    pub fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::lexer::Keyword;

    #[test]
    fn lookahead_is_one_based_and_clamps_to_eof() {
        let stream = TokenStream::new("SELECT e").unwrap();
        assert_eq!(stream.lookahead(1), &Token::Keyword(Keyword::Select));
        assert_eq!(stream.lookahead(2), &Token::Ident("e".into()));
        assert_eq!(stream.lookahead(3), &Token::Eof);
        assert_eq!(stream.lookahead(99), &Token::Eof);
    }

    #[test]
    fn next_sticks_at_eof() {
        let mut stream = TokenStream::new("e").unwrap();
        assert_eq!(stream.next(), Token::Ident("e".into()));
        assert_eq!(stream.next(), Token::Eof);
        assert_eq!(stream.next(), Token::Eof);
        assert!(stream.is_at_end());
    }

    #[test]
    fn rewind_restores_position_exactly() {
        let mut stream = TokenStream::new("a . b").unwrap();
        let mark = stream.mark();
        stream.next();
        stream.next();
        stream.rewind(mark);
        assert_eq!(stream.peek(), &Token::Ident("a".into()));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn consumed_span_tracks_committed_tokens() {
        let mut stream = TokenStream::new("SELECT e").unwrap();
        assert_eq!(stream.consumed_span(), Span::new(0, 0));
        stream.next();
        assert_eq!(stream.consumed_span(), Span::new(0, 6));
        stream.next();
        assert_eq!(stream.consumed_span(), Span::new(0, 8));
    }

    #[test]
    fn empty_input_is_just_eof() {
        let stream = TokenStream::new("   ").unwrap();
        assert!(stream.is_at_end());
        assert_eq!(stream.offset(), 3);
    }
}
