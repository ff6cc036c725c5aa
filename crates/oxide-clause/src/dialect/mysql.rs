//! MySQL dialect.

use super::Dialect;

/// MySQL dialect: backtick identifiers, `?` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }
}
