//! Encoding errors for PostgreSQL wire protocol.
//!
//! Shared by `PgEncoder` and `AstEncoder`.

use std::fmt;

/// Errors that can occur during wire protocol encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A string value contains a literal NULL byte (0x00).
    NullByte,
    /// Too many parameters for the protocol (limit is i16::MAX = 32767).
    TooManyParameters(usize),
    /// `CREATE MATERIALIZED VIEW` built without a `source_query`.
    MissingSourceQuery,
    /// `IN`/`NOT IN` built against an empty value array (spec.md ss4.2:
    /// "empty in-set is a validation error, not `IN ()`").
    EmptyInSet,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NullByte => {
                write!(f, "Value contains NULL byte (0x00) which is invalid in PostgreSQL")
            }
            EncodeError::TooManyParameters(count) => {
                write!(f, "Too many parameters: {} (Limit is 32767)", count)
            }
            EncodeError::MissingSourceQuery => {
                write!(f, "command requires a source_query but none was set")
            }
            EncodeError::EmptyInSet => {
                write!(f, "IN/NOT IN requires a non-empty value array")
            }
        }
    }
}

impl std::error::Error for EncodeError {}
