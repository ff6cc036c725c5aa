//! PostgreSQL dialect.

use std::fmt::Write;

use super::Dialect;

/// PostgreSQL dialect: double-quoted identifiers, numbered `$N` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_placeholder(&self, out: &mut String, position: usize) {
        let _ = write!(out, "${position}");
    }
}
