//! Error types for the ORM.

use oxide_clause::ClauseError;
use thiserror::Error;

/// Two callbacks whose ordering constraints cannot both hold.
///
/// Raised for a directly contradictory pair and for longer cycles; in the
/// latter case `other` is one unplaced predecessor of `callback`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting callback ordering between `{callback}` and `{other}`")]
pub struct ConstraintConflict {
    /// Callback whose constraints could not be satisfied.
    pub callback: String,
    /// The callback it conflicts with.
    pub other: String,
}

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Callback ordering constraints are contradictory or cyclic.
    #[error(transparent)]
    ConstraintConflict(#[from] ConstraintConflict),

    /// Expression construction or rendering error.
    #[error("clause error: {0}")]
    Clause(#[from] ClauseError),

    /// UPDATE or DELETE without conditions while global updates are disabled.
    #[error("WHERE conditions required")]
    MissingWhereClause,

    /// A callback handler failed.
    #[error("callback `{name}` failed: {message}")]
    Callback {
        /// Callback name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// A plugin with the same name is already installed.
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl OrmError {
    /// Creates a [`OrmError::Callback`].
    pub fn callback(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Callback {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
