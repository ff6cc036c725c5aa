//! Error types for expression construction and rendering.

use thiserror::Error;

use crate::expr::Operator;

/// Errors raised while building or rendering expressions.
///
/// Arity errors are raised when an expression is constructed, never during
/// rendering, so they point at the call site that built the bad value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClauseError {
    /// A comparison received a value count its operator cannot take.
    #[error("operator `{operator}` takes {expected} value(s), got {found}")]
    InvalidExpression {
        /// The offending operator.
        operator: Operator,
        /// Human readable arity the operator accepts.
        expected: &'static str,
        /// Number of values supplied.
        found: usize,
    },

    /// A raw fragment's `?` count does not match its argument count.
    #[error("raw SQL has {expected} placeholder(s) but {found} argument(s) were given")]
    RawArity {
        /// Placeholders found in the SQL text.
        expected: usize,
        /// Arguments supplied.
        found: usize,
    },

    /// A column referenced the current table but no scope was supplied.
    #[error("column refers to the current table but no table is in scope")]
    MissingTable,

    /// The primary column was referenced on a table without a primary key.
    #[error("table `{table}` has no primary key")]
    MissingPrimaryKey {
        /// Table in scope.
        table: String,
    },
}

/// Result type alias for clause operations.
pub type Result<T> = std::result::Result<T, ClauseError>;
