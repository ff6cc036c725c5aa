//! The schema seam consulted while rendering.
//!
//! Struct reflection lives elsewhere; the renderer only asks which table is
//! in scope, what its primary key is called, and how a field maps to a
//! database column.

use std::fmt;

/// Table metadata the renderer needs.
pub trait Scope: fmt::Debug + Send + Sync {
    /// The SQL table name.
    fn table(&self) -> &str;

    /// The primary key column name, if any.
    fn primary_key(&self) -> Option<&str>;

    /// Maps a struct field name to its database column name.
    ///
    /// `None` means the name is used as written.
    fn column_name(&self, field: &str) -> Option<&str> {
        let _ = field;
        None
    }
}

/// A hand-built [`Scope`].
///
/// ```rust
/// use oxide_clause::{Scope, TableSchema};
///
/// let users = TableSchema::new("users")
///     .primary_key("id")
///     .field("DeletedAt", "deleted_at");
///
/// assert_eq!(users.column_name("DeletedAt"), Some("deleted_at"));
/// assert_eq!(users.column_name("age"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
    primary_key: Option<String>,
    fields: Vec<(String, String)>,
}

impl TableSchema {
    /// Creates a schema for `table` with no primary key.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: None,
            fields: Vec::new(),
        }
    }

    /// Sets the primary key column.
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// Maps a struct field to a database column.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.push((field.into(), column.into()));
        self
    }
}

impl Scope for TableSchema {
    fn table(&self) -> &str {
        &self.table
    }

    fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    fn column_name(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| column.as_str())
    }
}
