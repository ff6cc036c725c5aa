//! Column references.

/// The table part of a column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// Whatever table the statement being rendered targets.
    Current,
    /// An explicit table name.
    Named(String),
}

/// The name part of a column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnName {
    /// The primary key of the table in scope.
    PrimaryKey,
    /// An explicit column (or struct field) name.
    Named(String),
}

/// A column reference.
///
/// Named columns are resolved through the [`Scope`](crate::Scope) at render
/// time, so a struct field name may be used where the schema knows its
/// database name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Optional table qualifier.
    pub table: Option<TableRef>,
    /// Column name.
    pub name: ColumnName,
    /// Written verbatim, without quoting or name resolution.
    pub raw: bool,
}

impl Column {
    /// Creates an unqualified column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: ColumnName::Named(name.into()),
            raw: false,
        }
    }

    /// Creates a column qualified by an explicit table.
    #[must_use]
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(TableRef::Named(table.into())),
            name: ColumnName::Named(name.into()),
            raw: false,
        }
    }

    /// Creates a column qualified by the table in scope.
    #[must_use]
    pub fn current(name: impl Into<String>) -> Self {
        Self {
            table: Some(TableRef::Current),
            name: ColumnName::Named(name.into()),
            raw: false,
        }
    }

    /// The primary key of the table in scope, rendered as `table.pk`.
    #[must_use]
    pub const fn primary() -> Self {
        Self {
            table: Some(TableRef::Current),
            name: ColumnName::PrimaryKey,
            raw: false,
        }
    }

    /// Creates a column written exactly as given.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            table: None,
            name: ColumnName::Named(sql.into()),
            raw: true,
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
