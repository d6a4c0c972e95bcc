//! Error types for the EQL parser
//!
//! All errors are syntactic. A failed rule propagates its error up to the
//! caller; the only place an error is caught instead of propagated is a
//! trial parse, which converts it into a match/no-match decision.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// None of a rule's alternatives matched the upcoming tokens.
    #[error("{rule}: no viable alternative at {found} (offset {pos})")]
    NoViableAlternative {
        rule: &'static str,
        found: String,
        pos: usize,
    },

    /// A specific terminal was required mid-production and something else
    /// was found.
    #[error("{rule}: expected {expected}, found {found} (offset {pos})")]
    TokenMismatch {
        rule: &'static str,
        expected: String,
        found: String,
        pos: usize,
    },

    /// A one-or-more repetition matched zero times.
    #[error("{rule}: expected at least one {expected} (offset {pos})")]
    EarlyTermination {
        rule: &'static str,
        expected: &'static str,
        pos: usize,
    },

    /// The scanner hit a character that cannot start any token.
    #[error("unexpected character {0:?} (offset {1})")]
    UnexpectedCharacter(char, usize),
}

impl Error {
    /// Byte offset of the failure in the source text.
    pub fn pos(&self) -> usize {
        match self {
            Self::NoViableAlternative { pos, .. }
            | Self::TokenMismatch { pos, .. }
            | Self::EarlyTermination { pos, .. }
            | Self::UnexpectedCharacter(_, pos) => *pos,
        }
    }

    /// Name of the grammar rule that failed, if the error carries one.
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            Self::NoViableAlternative { rule, .. }
            | Self::TokenMismatch { rule, .. }
            | Self::EarlyTermination { rule, .. } => Some(rule),
            Self::UnexpectedCharacter(..) => None,
        }
    }
}
