//! # Error Types
//!
//! Validation errors for shared entities.

use thiserror::Error;

/// Errors from validating an identity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Identity is the empty string.
    #[error("Identity must not be empty")]
    Empty,

    /// Identity exceeds the length limit.
    #[error("Identity longer than {max} characters")]
    TooLong { max: usize },

    /// Identity contains a character outside `[A-Za-z0-9_.-]`.
    #[error("Identity contains invalid character {0:?}")]
    InvalidCharacter(char),
}
