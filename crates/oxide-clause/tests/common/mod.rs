#![allow(dead_code)]

use oxide_clause::dialect::{MySqlDialect, PostgresDialect};
use oxide_clause::expr::Expression;
use oxide_clause::{Clause, SqlValue, TableSchema};

pub fn users() -> TableSchema {
    TableSchema::new("users")
        .primary_key("id")
        .field("Name", "name")
        .field("DeletedAt", "deleted_at")
}

/// Renders the concatenation of every group as one WHERE clause body,
/// the way repeated `where` calls on a statement accumulate.
pub fn render_where(groups: Vec<Vec<Expression>>) -> (String, Vec<SqlValue>) {
    let mut clause = Clause::where_clause();
    for group in groups {
        clause.extend(group);
    }
    let scope = users();
    clause
        .render(&MySqlDialect::new(), Some(&scope))
        .unwrap_or_else(|e| panic!("Failed to render {clause:?}\nError: {e}"))
}

pub fn render_pg(exprs: Vec<Expression>) -> (String, Vec<SqlValue>) {
    let scope = users();
    Clause::where_clause()
        .with(exprs)
        .render(&PostgresDialect::new(), Some(&scope))
        .unwrap_or_else(|e| panic!("Failed to render\nError: {e}"))
}

/// Asserts SQL and arguments, then renders again to check the output is
/// stable.
pub fn assert_where(groups: Vec<Vec<Expression>>, sql: &str, args: Vec<SqlValue>) {
    let first = render_where(groups.clone());
    assert_eq!(first.0, sql);
    assert_eq!(first.1, args, "argument order for {sql}");
    let second = render_where(groups);
    assert_eq!(first, second, "re-render differs for {sql}");
}

pub fn s(value: &str) -> SqlValue {
    SqlValue::from(value)
}

pub fn i(value: i64) -> SqlValue {
    SqlValue::from(value)
}
