//! SQL dialect support.
//!
//! The renderer needs only two things from a database dialect: how to quote
//! an identifier and how to spell the placeholder for the N-th argument.
//! Everything else (type names, DDL, driver glue) lives outside this crate.

mod generic;
mod mysql;
mod postgres;
mod sqlite;

use std::borrow::Cow;
use std::fmt;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Appends the placeholder for the argument at `position` (1-based).
    fn write_placeholder(&self, out: &mut String, position: usize) {
        let _ = position;
        out.push('?');
    }

    /// Returns the placeholder for the argument at `position` (1-based).
    fn placeholder(&self, position: usize) -> String {
        let mut out = String::new();
        self.write_placeholder(&mut out, position);
        out
    }

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Rewrites backtick-quoted identifiers in hand-written SQL to this
    /// dialect's quote character.
    ///
    /// Application code conventionally writes raw fragments MySQL style;
    /// dialects quoting with backticks get the text back untouched.
    fn normalize_quotes<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let quote = self.identifier_quote();
        if quote == '`' || !sql.contains('`') {
            Cow::Borrowed(sql)
        } else {
            Cow::Owned(sql.replace('`', &quote.to_string()))
        }
    }
}
