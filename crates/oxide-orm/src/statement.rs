//! The mutable context callbacks operate on.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use oxide_clause::dialect::GenericDialect;
use oxide_clause::expr::Expression;
use oxide_clause::{
    Clause, ClauseKind, Column, ColumnName, Dialect, Scope, SqlValue, SqlWriter, TableSchema,
};

use crate::error::{OrmError, Result};

/// One database operation being assembled.
///
/// Callbacks add conditions and assignments, and the SQL-building callbacks
/// render them into [`Statement::sql`] and [`Statement::vars`].
#[derive(Debug, Clone)]
pub struct Statement {
    schema: Arc<dyn Scope>,
    dialect: Arc<dyn Dialect>,
    where_clause: Clause,
    having: Clause,
    selects: Vec<Column>,
    assignments: Vec<(Column, SqlValue)>,
    raw: Option<(String, Vec<SqlValue>)>,
    unscoped: bool,
    allow_global_update: bool,
    settings: HashMap<String, serde_json::Value>,
    sql: String,
    vars: Vec<SqlValue>,
    rows_affected: u64,
}

impl Statement {
    /// Creates a statement on `table` using the generic dialect.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_schema(
            Arc::new(TableSchema::new(table)),
            Arc::new(GenericDialect::new()),
        )
    }

    /// Creates a statement on the table described by `schema`.
    #[must_use]
    pub fn with_schema(schema: Arc<dyn Scope>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            schema,
            dialect,
            where_clause: Clause::new(ClauseKind::Where),
            having: Clause::new(ClauseKind::Having),
            selects: Vec::new(),
            assignments: Vec::new(),
            raw: None,
            unscoped: false,
            allow_global_update: false,
            settings: HashMap::new(),
            sql: String::new(),
            vars: Vec::new(),
            rows_affected: 0,
        }
    }

    /// Replaces the dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    /// Appends WHERE conditions.
    #[must_use]
    pub fn where_(mut self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.where_clause.extend(exprs);
        self
    }

    /// Appends HAVING conditions.
    #[must_use]
    pub fn having(mut self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.having.extend(exprs);
        self
    }

    /// Selects columns; nothing selected means `*`.
    #[must_use]
    pub fn select<C: Into<Column>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.selects.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a column assignment for INSERT or UPDATE.
    #[must_use]
    pub fn set(mut self, column: impl Into<Column>, value: impl Into<SqlValue>) -> Self {
        self.assign(column, value);
        self
    }

    /// Sets hand-written SQL for the raw and row phases.
    #[must_use]
    pub fn raw(mut self, sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        self.raw = Some((sql.into(), args));
        self
    }

    /// Skips scoping callbacks such as soft delete.
    #[must_use]
    pub const fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    /// Allows UPDATE and DELETE without conditions.
    #[must_use]
    pub const fn allow_global_update(mut self, allow: bool) -> Self {
        self.allow_global_update = allow;
        self
    }

    /// Appends a condition to the clause of `kind`.
    pub fn add_clause_expr(&mut self, kind: ClauseKind, expr: Expression) {
        match kind {
            ClauseKind::Where => self.where_clause.push(expr),
            ClauseKind::Having => self.having.push(expr),
        }
    }

    /// Returns the value assigned to the database column `column`, whether
    /// the assignment named the column or the field mapped to it.
    #[must_use]
    pub fn assigned(&self, column: &str) -> Option<&SqlValue> {
        self.assignments
            .iter()
            .find(|(c, _)| match &c.name {
                ColumnName::Named(name) => {
                    self.schema.column_name(name).unwrap_or(name.as_str()) == column
                }
                ColumnName::PrimaryKey => false,
            })
            .map(|(_, value)| value)
    }

    /// Fails with [`OrmError::MissingWhereClause`] when the WHERE clause holds
    /// no conditions and global updates are not allowed.
    pub fn require_conditions(&self) -> Result<()> {
        if self.where_clause.is_empty() && !self.allow_global_update {
            return Err(OrmError::MissingWhereClause);
        }
        Ok(())
    }

    /// Adds or overrides a column assignment.
    pub fn assign(&mut self, column: impl Into<Column>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((column, value)),
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        self.schema.table()
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<dyn Scope> {
        &self.schema
    }

    /// Returns the SQL dialect.
    #[must_use]
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Returns the WHERE clause.
    #[must_use]
    pub const fn where_clause(&self) -> &Clause {
        &self.where_clause
    }

    /// Returns the WHERE clause for in-place changes.
    pub fn where_mut(&mut self) -> &mut Clause {
        &mut self.where_clause
    }

    /// Returns the HAVING clause.
    #[must_use]
    pub const fn having_clause(&self) -> &Clause {
        &self.having
    }

    /// Returns the selected columns.
    #[must_use]
    pub fn selects(&self) -> &[Column] {
        &self.selects
    }

    /// Returns the column assignments.
    #[must_use]
    pub fn assignments(&self) -> &[(Column, SqlValue)] {
        &self.assignments
    }

    /// Returns the hand-written SQL and its arguments.
    #[must_use]
    pub fn raw_sql(&self) -> Option<(&str, &[SqlValue])> {
        self.raw
            .as_ref()
            .map(|(sql, args)| (sql.as_str(), args.as_slice()))
    }

    /// Returns true when scoping callbacks must not apply.
    #[must_use]
    pub const fn is_unscoped(&self) -> bool {
        self.unscoped
    }

    /// Returns true when UPDATE and DELETE may run without conditions.
    #[must_use]
    pub const fn global_update_allowed(&self) -> bool {
        self.allow_global_update
    }

    /// Stores plugin state.
    pub fn set_setting(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.settings.insert(key.into(), value);
    }

    /// Returns plugin state.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Returns a writer over this statement's dialect and schema.
    #[must_use]
    pub fn writer(&self) -> SqlWriter<'_> {
        SqlWriter::new(self.dialect.as_ref(), Some(self.schema.as_ref()))
    }

    /// Writes the listed clauses, in order, that hold conditions.
    pub fn build_clauses(&self, w: &mut SqlWriter<'_>, kinds: &[ClauseKind]) -> Result<()> {
        for kind in kinds {
            match kind {
                ClauseKind::Where => self.where_clause.build(w)?,
                ClauseKind::Having => self.having.build(w)?,
            }
        }
        Ok(())
    }

    /// Stores rendered SQL, replacing anything built before.
    pub fn set_sql(&mut self, (sql, vars): (String, Vec<SqlValue>)) {
        self.sql = sql;
        self.vars = vars;
    }

    /// Returns true once SQL has been built.
    #[must_use]
    pub fn has_sql(&self) -> bool {
        !self.sql.is_empty()
    }

    /// Returns the rendered SQL.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments bound to the rendered SQL.
    #[must_use]
    pub fn vars(&self) -> &[SqlValue] {
        &self.vars
    }

    /// Returns the number of rows the driver reported.
    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Records the number of rows the driver reported.
    pub fn set_rows_affected(&mut self, rows: u64) {
        self.rows_affected = rows;
    }

    /// Returns the SQL with arguments inlined, for logs.
    ///
    /// **Warning**: never execute this string, it is not escaped for every
    /// dialect.
    #[must_use]
    pub fn explain(&self) -> String {
        let mut vars = self.vars.iter();
        let mut out = String::with_capacity(self.sql.len());
        let mut chars = self.sql.chars().peekable();
        while let Some(c) = chars.next() {
            let placeholder = match c {
                '?' => true,
                '$' => {
                    let mut digits = false;
                    while chars.next_if(char::is_ascii_digit).is_some() {
                        digits = true;
                    }
                    digits
                }
                _ => false,
            };
            if !placeholder {
                out.push(c);
                continue;
            }
            match vars.next() {
                Some(value) => {
                    let _ = write!(out, "{value}");
                }
                None => out.push('?'),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_clause::dialect::PostgresDialect;
    use oxide_clause::expr::eq;

    #[test]
    fn assign_overrides_same_column() {
        let stmt = Statement::new("users").set("name", "a").set("age", 3).set("name", "b");
        assert_eq!(stmt.assignments().len(), 2);
        assert_eq!(stmt.assignments()[0].1, SqlValue::from("b"));
    }

    #[test]
    fn explain_inlines_question_marks() {
        let mut stmt = Statement::new("users");
        stmt.set_sql((
            "SELECT * FROM \"users\" WHERE \"name\" = ? AND \"age\" > ?".into(),
            vec!["O'Brien".into(), 18.into()],
        ));
        assert_eq!(
            stmt.explain(),
            "SELECT * FROM \"users\" WHERE \"name\" = 'O''Brien' AND \"age\" > 18"
        );
    }

    #[test]
    fn explain_inlines_numbered_placeholders() {
        let stmt = Statement::new("users")
            .with_dialect(Arc::new(PostgresDialect::new()))
            .where_([eq("a", 1), eq("b", "x")]);
        let mut w = stmt.writer();
        stmt.where_clause().build(&mut w).unwrap();
        let rendered = w.finish();
        let mut stmt = stmt;
        stmt.set_sql(rendered);
        assert_eq!(stmt.sql(), " WHERE \"a\" = $1 AND \"b\" = $2");
        assert_eq!(stmt.explain(), " WHERE \"a\" = 1 AND \"b\" = 'x'");
    }

    #[test]
    fn assigned_resolves_field_names() {
        let schema = TableSchema::new("users").field("DeletedAt", "deleted_at");
        let stmt = Statement::with_schema(Arc::new(schema), Arc::new(GenericDialect::new()))
            .set("DeletedAt", 42);
        assert_eq!(stmt.assigned("deleted_at"), Some(&SqlValue::Int(42)));
        assert_eq!(stmt.assigned("DeletedAt"), None);

        let stmt = Statement::new("users").set("age", 3);
        assert_eq!(stmt.assigned("age"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn settings_hold_plugin_state() {
        let mut stmt = Statement::new("users");
        stmt.set_setting("soft_delete:applied", serde_json::Value::Bool(true));
        assert_eq!(
            stmt.setting("soft_delete:applied"),
            Some(&serde_json::Value::Bool(true))
        );
        assert!(stmt.setting("missing").is_none());
    }
}
