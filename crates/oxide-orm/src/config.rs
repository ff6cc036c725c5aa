//! Session configuration.

use std::sync::Arc;

use oxide_clause::dialect::{GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect};
use oxide_clause::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The SQL dialects a session can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Double-quoted identifiers, `?` placeholders.
    #[default]
    Generic,
    /// Backtick-quoted identifiers, `?` placeholders.
    #[serde(alias = "mariadb")]
    MySql,
    /// Double-quoted identifiers, `$N` placeholders.
    #[serde(alias = "postgresql")]
    Postgres,
    /// Double-quoted identifiers, `?` placeholders.
    Sqlite,
}

impl DialectKind {
    /// Returns the dialect implementation.
    #[must_use]
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Generic => Arc::new(GenericDialect::new()),
            Self::MySql => Arc::new(MySqlDialect::new()),
            Self::Postgres => Arc::new(PostgresDialect::new()),
            Self::Sqlite => Arc::new(SqliteDialect::new()),
        }
    }
}

/// Settings for a [`Db`](crate::Db).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use oxide_orm::{Config, DialectKind};
///
/// let config = Config::from_json(r#"{ "dialect": "postgres" }"#).unwrap();
/// assert_eq!(config.dialect, DialectKind::Postgres);
/// assert!(!config.allow_global_update);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQL dialect used to render statements.
    pub dialect: DialectKind,
    /// Allow UPDATE and DELETE without WHERE conditions.
    pub allow_global_update: bool,
    /// Log every built statement at debug level.
    pub log_sql: bool,
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the dialect.
    #[must_use]
    pub const fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Allows UPDATE and DELETE without conditions.
    #[must_use]
    pub const fn allow_global_update(mut self, allow: bool) -> Self {
        self.allow_global_update = allow;
        self
    }

    /// Enables SQL logging.
    #[must_use]
    pub const fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }
}
