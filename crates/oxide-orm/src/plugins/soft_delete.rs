//! Soft delete: rows are flagged as deleted instead of being removed.
//!
//! The flag column holds `0` for live rows, or `NULL` when the plugin is
//! [`nullable`](SoftDelete::nullable). The plugin applies to every statement
//! whose schema maps the configured field to a column:
//!
//! - create: the column is set to `0` unless assigned explicitly
//! - query, row, update: `<table>.<column> = 0` is added to WHERE
//! - delete: the statement becomes
//!   `UPDATE <table> SET <column>=<deleted> WHERE ... AND <table>.<column> = 0`
//!
//! The deleted value is a timestamp or `1`, per [`SoftDeleteMode`]. With a
//! [`deleted_at_field`](SoftDelete::deleted_at_field) the delete also stamps
//! that column with the deletion time in seconds.
//!
//! An [`unscoped`](crate::Statement::unscoped) statement bypasses all of it,
//! so an unscoped delete removes the row.

use chrono::Utc;
use oxide_clause::expr::eq;
use oxide_clause::{ClauseKind, Column, SqlValue};
use tracing::debug;

use crate::callbacks::{self, Phase};
use crate::db::Db;
use crate::error::Result;
use crate::statement::Statement;

use super::Plugin;

/// What a delete writes into the flag column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftDeleteMode {
    /// Unix seconds.
    #[default]
    Seconds,
    /// Unix milliseconds.
    Milliseconds,
    /// The constant `1`.
    Flag,
}

impl SoftDeleteMode {
    /// Returns the value marking a row deleted now.
    #[must_use]
    pub fn deleted_value(self) -> i64 {
        let now = Utc::now();
        match self {
            Self::Seconds => now.timestamp(),
            Self::Milliseconds => now.timestamp_millis(),
            Self::Flag => 1,
        }
    }
}

/// The soft delete plugin.
///
/// ```rust
/// use std::sync::Arc;
/// use oxide_orm::{Config, Db, SoftDelete, TableSchema};
/// use oxide_orm::expr::eq;
///
/// let mut db = Db::new(Config::default());
/// db.use_plugin(SoftDelete::new()).unwrap();
///
/// let users = Arc::new(
///     TableSchema::new("users")
///         .primary_key("id")
///         .field("DeletedAt", "deleted_at"),
/// );
/// let stmt = db.query(db.statement_for(users).where_([eq("name", "x")])).unwrap();
/// assert_eq!(
///     stmt.sql(),
///     "SELECT * FROM \"users\" WHERE \"name\" = ? AND \"users\".\"deleted_at\" = ?"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDelete {
    field: String,
    mode: SoftDeleteMode,
    deleted_at_field: Option<String>,
    nullable: bool,
}

impl Default for SoftDelete {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftDelete {
    /// Plugin name.
    pub const NAME: &'static str = "soft_delete";

    /// Creates the plugin for the `DeletedAt` field in seconds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            field: String::from("DeletedAt"),
            mode: SoftDeleteMode::Seconds,
            deleted_at_field: None,
            nullable: false,
        }
    }

    /// Uses another struct field as the flag.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Sets what a delete writes into the flag column.
    #[must_use]
    pub const fn mode(mut self, mode: SoftDeleteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Also stamps `field` with the deletion time (Unix seconds) on delete.
    ///
    /// Used with [`SoftDeleteMode::Flag`] when the table keeps both a flag
    /// and a deletion time.
    #[must_use]
    pub fn deleted_at_field(mut self, field: impl Into<String>) -> Self {
        self.deleted_at_field = Some(field.into());
        self
    }

    /// Live rows hold `NULL` instead of `0`.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    fn live_value(&self) -> SqlValue {
        if self.nullable {
            SqlValue::Null
        } else {
            SqlValue::Int(0)
        }
    }

    fn column(&self, stmt: &Statement) -> Option<String> {
        if stmt.is_unscoped() {
            return None;
        }
        stmt.schema().column_name(&self.field).map(str::to_owned)
    }

    fn add_scope(&self, stmt: &mut Statement) {
        let Some(column) = self.column(stmt) else {
            return;
        };
        stmt.where_mut().group_or();
        stmt.add_clause_expr(
            ClauseKind::Where,
            eq(Column::current(column), self.live_value()),
        );
    }

    fn scope_update(&self, stmt: &mut Statement) -> Result<()> {
        if self.column(stmt).is_none() || stmt.has_sql() {
            return Ok(());
        }
        // The scope is a condition too; check the caller's own first.
        if !stmt.assignments().is_empty() {
            stmt.require_conditions()?;
        }
        self.add_scope(stmt);
        Ok(())
    }

    fn mark_live(&self, stmt: &mut Statement) {
        if self.nullable {
            return;
        }
        let Some(column) = self.column(stmt) else {
            return;
        };
        if stmt.assigned(&column).is_none() {
            stmt.assign(Column::new(column), self.live_value());
        }
    }

    fn soft_delete(&self, stmt: &mut Statement) -> Result<()> {
        let Some(column) = self.column(stmt) else {
            return Ok(());
        };
        if stmt.has_sql() {
            return Ok(());
        }
        stmt.require_conditions()?;

        let deleted = self.mode.deleted_value();
        self.add_scope(stmt);
        let mut w = stmt.writer();
        w.write_str("UPDATE ");
        w.write_identifier(stmt.table());
        w.write_str(" SET ");
        w.write_column(&Column::new(column.as_str()))?;
        w.write_char('=');
        w.add_var(deleted.into());
        if let Some(field) = &self.deleted_at_field {
            w.write_char(',');
            w.write_column(&Column::new(field.as_str()))?;
            w.write_char('=');
            w.add_var(Utc::now().timestamp().into());
        }
        stmt.build_clauses(&mut w, &[ClauseKind::Where])?;
        let rendered = w.finish();
        stmt.set_sql(rendered);
        debug!(table = %stmt.table(), column = %column, mode = ?self.mode, "Soft deleting");
        Ok(())
    }
}

impl Plugin for SoftDelete {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&self, db: &mut Db) -> Result<()> {
        let registry = db.callback_mut();

        let plugin = self.clone();
        registry
            .create()
            .before(callbacks::CREATE)
            .register("soft_delete:create", move |stmt| {
                plugin.mark_live(stmt);
                Ok(())
            });

        for (phase, anchor) in [
            (Phase::Query, callbacks::QUERY),
            (Phase::Row, callbacks::ROW),
        ] {
            let plugin = self.clone();
            registry
                .processor_mut(phase)
                .before(anchor)
                .matching(|stmt| stmt.raw_sql().is_none())
                .register(format!("soft_delete:{phase}"), move |stmt| {
                    plugin.add_scope(stmt);
                    Ok(())
                });
        }

        let plugin = self.clone();
        registry
            .update()
            .before(callbacks::UPDATE)
            .matching(|stmt| stmt.raw_sql().is_none())
            .register("soft_delete:update", move |stmt| plugin.scope_update(stmt));

        let plugin = self.clone();
        registry
            .delete()
            .before(callbacks::DELETE)
            .register("soft_delete:delete", move |stmt| plugin.soft_delete(stmt));

        Ok(())
    }
}
