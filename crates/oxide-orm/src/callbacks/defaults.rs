//! SQL-building callbacks installed by [`Callbacks::with_defaults`].
//!
//! Each handler leaves a statement alone when SQL was already built for it,
//! so a plugin registered ahead of it can take over the whole statement.

use oxide_clause::expr::Expression;
use oxide_clause::{ClauseKind, Raw};

use crate::error::{OrmError, Result};
use crate::statement::Statement;

use super::Callbacks;

/// Name of the INSERT builder.
pub const CREATE: &str = "oxide:create";
/// Name of the SELECT builder.
pub const QUERY: &str = "oxide:query";
/// Name of the UPDATE builder.
pub const UPDATE: &str = "oxide:update";
/// Name of the DELETE builder.
pub const DELETE: &str = "oxide:delete";
/// Name of the row builder.
pub const ROW: &str = "oxide:row";
/// Name of the raw statement builder.
pub const RAW: &str = "oxide:raw";

pub(super) fn register(callbacks: &mut Callbacks) {
    callbacks.create().register(CREATE, build_create);
    callbacks.query().register(QUERY, build_query);
    callbacks.update().register(UPDATE, build_update);
    callbacks.delete().register(DELETE, build_delete);
    callbacks.row().register(ROW, build_row);
    callbacks.raw().register(RAW, build_raw);
}

fn build_create(stmt: &mut Statement) -> Result<()> {
    if stmt.has_sql() {
        return Ok(());
    }
    let mut w = stmt.writer();
    w.write_str("INSERT INTO ");
    w.write_identifier(stmt.table());
    if stmt.assignments().is_empty() {
        w.write_str(" DEFAULT VALUES");
    } else {
        w.write_str(" (");
        for (idx, (column, _)) in stmt.assignments().iter().enumerate() {
            if idx > 0 {
                w.write_char(',');
            }
            w.write_column(column)?;
        }
        w.write_str(") VALUES (");
        for (idx, (_, value)) in stmt.assignments().iter().enumerate() {
            if idx > 0 {
                w.write_char(',');
            }
            w.add_var(value.clone());
        }
        w.write_char(')');
    }
    let rendered = w.finish();
    stmt.set_sql(rendered);
    Ok(())
}

fn build_query(stmt: &mut Statement) -> Result<()> {
    if stmt.has_sql() {
        return Ok(());
    }
    let mut w = stmt.writer();
    w.write_str("SELECT ");
    if stmt.selects().is_empty() {
        w.write_char('*');
    } else {
        for (idx, column) in stmt.selects().iter().enumerate() {
            if idx > 0 {
                w.write_char(',');
            }
            w.write_column(column)?;
        }
    }
    w.write_str(" FROM ");
    w.write_identifier(stmt.table());
    stmt.build_clauses(&mut w, &[ClauseKind::Where, ClauseKind::Having])?;
    let rendered = w.finish();
    stmt.set_sql(rendered);
    Ok(())
}

fn build_update(stmt: &mut Statement) -> Result<()> {
    if stmt.has_sql() {
        return Ok(());
    }
    if stmt.assignments().is_empty() {
        return Err(OrmError::callback(UPDATE, "no columns to update"));
    }
    stmt.require_conditions()?;

    let mut w = stmt.writer();
    w.write_str("UPDATE ");
    w.write_identifier(stmt.table());
    w.write_str(" SET ");
    for (idx, (column, value)) in stmt.assignments().iter().enumerate() {
        if idx > 0 {
            w.write_char(',');
        }
        w.write_column(column)?;
        w.write_char('=');
        w.add_var(value.clone());
    }
    stmt.build_clauses(&mut w, &[ClauseKind::Where])?;
    let rendered = w.finish();
    stmt.set_sql(rendered);
    Ok(())
}

fn build_delete(stmt: &mut Statement) -> Result<()> {
    if stmt.has_sql() {
        return Ok(());
    }
    stmt.require_conditions()?;

    let mut w = stmt.writer();
    w.write_str("DELETE FROM ");
    w.write_identifier(stmt.table());
    stmt.build_clauses(&mut w, &[ClauseKind::Where])?;
    let rendered = w.finish();
    stmt.set_sql(rendered);
    Ok(())
}

fn build_row(stmt: &mut Statement) -> Result<()> {
    if stmt.raw_sql().is_some() {
        build_raw(stmt)
    } else {
        build_query(stmt)
    }
}

fn build_raw(stmt: &mut Statement) -> Result<()> {
    if stmt.has_sql() {
        return Ok(());
    }
    let Some((sql, args)) = stmt.raw_sql() else {
        return Err(OrmError::callback(RAW, "no SQL to run"));
    };
    if sql.trim().is_empty() {
        return Err(OrmError::callback(RAW, "no SQL to run"));
    }
    let raw = Expression::Raw(Raw::new(sql, args.to_vec())?);
    let mut w = stmt.writer();
    raw.build(&mut w)?;
    let rendered = w.finish();
    stmt.set_sql(rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oxide_clause::dialect::{MySqlDialect, PostgresDialect};
    use oxide_clause::expr::{eq, gt};
    use oxide_clause::{Column, SqlValue, TableSchema};

    use super::*;

    fn users() -> Statement {
        Statement::with_schema(
            Arc::new(TableSchema::new("users").primary_key("id")),
            Arc::new(MySqlDialect::new()),
        )
    }

    #[test]
    fn create_lists_columns_in_assignment_order() {
        let mut stmt = users().set("name", "jinzhu").set("age", 18);
        build_create(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO `users` (`name`,`age`) VALUES (?,?)");
        assert_eq!(stmt.vars(), [SqlValue::from("jinzhu"), SqlValue::from(18)]);
    }

    #[test]
    fn query_selects_star_by_default() {
        let mut stmt = users().where_([eq(Column::primary(), 1)]);
        build_query(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM `users` WHERE `users`.`id` = ?");

        let mut stmt = users()
            .select(["name", "age"])
            .having([gt(Column::raw("COUNT(*)"), 1)]);
        build_query(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "SELECT `name`,`age` FROM `users` HAVING COUNT(*) > ?");
    }

    #[test]
    fn update_numbers_set_before_where() {
        let mut stmt = users()
            .with_dialect(Arc::new(PostgresDialect::new()))
            .set("name", "x")
            .where_([eq(Column::primary(), 1)]);
        build_update(&mut stmt).unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE \"users\" SET \"name\"=$1 WHERE \"users\".\"id\" = $2"
        );
    }

    #[test]
    fn update_and_delete_require_conditions() {
        let mut stmt = users().set("name", "x");
        assert!(matches!(
            build_update(&mut stmt),
            Err(OrmError::MissingWhereClause)
        ));
        let mut stmt = users();
        assert!(matches!(
            build_delete(&mut stmt),
            Err(OrmError::MissingWhereClause)
        ));

        let mut stmt = users().allow_global_update(true);
        build_delete(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM `users`");
    }

    #[test]
    fn raw_normalizes_quotes_and_checks_arity() {
        let mut stmt = users()
            .with_dialect(Arc::new(PostgresDialect::new()))
            .raw("SELECT `name` FROM `users` WHERE `age` > ?", vec![18.into()]);
        build_raw(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "SELECT \"name\" FROM \"users\" WHERE \"age\" > $1");

        let mut stmt = users().raw("SELECT ?", vec![]);
        assert!(matches!(build_raw(&mut stmt), Err(OrmError::Clause(_))));

        let mut stmt = users();
        assert!(matches!(build_raw(&mut stmt), Err(OrmError::Callback { .. })));
    }

    #[test]
    fn row_falls_back_to_query() {
        let mut stmt = users().where_([eq("name", "x")]);
        build_row(&mut stmt).unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM `users` WHERE `name` = ?");
    }
}
