//! SQLite.

use super::Dialect;

/// SQLite: double-quoted identifiers, `?` placeholders.
///
/// SQLite also accepts backticks, so raw fragments would run unchanged, but
/// they are normalized like every other non-MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates the SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}
