//! Fallback dialect.

use super::Dialect;

/// Standard SQL: double-quoted identifiers and `?` placeholders.
///
/// Used when no database is configured, e.g. for logging or tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates the fallback dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}
