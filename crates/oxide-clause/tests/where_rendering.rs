//! Golden-string tests for WHERE clause rendering: join rules,
//! parenthesization, NOT handling and argument order.

mod common;
use common::*;

use oxide_clause::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
use oxide_clause::expr::{
    and, eq, gt, in_list, is_not_null, like, lt, neq, not, or, raw, Expression,
};
use oxide_clause::{Clause, ClauseError, Column, Dialect, Raw, SqlValue, SqlWriter};

fn score_raw() -> Expression {
    raw("`score` <= ?", vec![i(100)]).unwrap()
}

// ===================================================================
// AND / OR joins
// ===================================================================

#[test]
fn trailing_or_joins_left_neighbour() {
    assert_where(
        vec![vec![
            eq(Column::primary(), "1"),
            gt("age", 18),
            or([neq("name", "jinzhu")]),
        ]],
        "`users`.`id` = ? AND `age` > ? OR `name` <> ?",
        vec![s("1"), i(18), s("jinzhu")],
    );
}

#[test]
fn leading_or_keeps_append_order() {
    assert_where(
        vec![vec![
            or([neq("name", "jinzhu")]),
            eq(Column::primary(), "1"),
            gt("age", 18),
        ]],
        "`name` <> ? AND `users`.`id` = ? AND `age` > ?",
        vec![s("jinzhu"), s("1"), i(18)],
    );
}

#[test]
fn two_or_entries() {
    assert_where(
        vec![vec![
            or([eq(Column::primary(), "1")]),
            or([neq("name", "jinzhu")]),
        ]],
        "`users`.`id` = ? OR `name` <> ?",
        vec![s("1"), s("jinzhu")],
    );
}

#[test]
fn second_where_group_is_and_joined() {
    assert_where(
        vec![
            vec![
                eq(Column::primary(), "1"),
                gt("age", 18),
                or([neq("name", "jinzhu")]),
            ],
            vec![or([gt("score", 100), like("name", "%linus%")])],
        ],
        "`users`.`id` = ? AND `age` > ? OR `name` <> ? AND (`score` > ? OR `name` LIKE ?)",
        vec![s("1"), i(18), s("jinzhu"), i(100), s("%linus%")],
    );
}

#[test]
fn and_with_or_tagged_child() {
    assert_where(
        vec![vec![and([eq("age", 18), or([neq("name", "jinzhu")])])]],
        "`age` = ? OR `name` <> ?",
        vec![i(18), s("jinzhu")],
    );
}

// ===================================================================
// NOT
// ===================================================================

#[test]
fn not_over_two_comparisons_inverts_each() {
    assert_where(
        vec![
            vec![
                not([eq(Column::primary(), "1"), gt("age", 18)]),
                or([neq("name", "jinzhu")]),
            ],
            vec![or([not([gt("score", 100)]), like("name", "%linus%")])],
        ],
        "(`users`.`id` <> ? AND `age` <= ?) OR `name` <> ? AND (`score` <= ? OR `name` LIKE ?)",
        vec![s("1"), i(18), s("jinzhu"), i(100), s("%linus%")],
    );
}

#[test]
fn single_not_prefers_inversion() {
    assert_where(
        vec![vec![not([gt("score", 100)])]],
        "`score` <= ?",
        vec![i(100)],
    );
}

#[test]
fn not_followed_by_raw() {
    let expected = "(`users`.`id` <> ? AND `age` <= ?) AND `score` <= ?";
    assert_where(
        vec![vec![
            not([eq(Column::primary(), "1"), gt("age", 18)]),
            and([score_raw()]),
        ]],
        expected,
        vec![s("1"), i(18), i(100)],
    );
    assert_where(
        vec![vec![
            not([eq(Column::primary(), "1"), gt("age", 18)]),
            score_raw(),
        ]],
        expected,
        vec![s("1"), i(18), i(100)],
    );
}

#[test]
fn not_followed_by_or_raw() {
    assert_where(
        vec![vec![
            not([eq(Column::primary(), "1"), gt("age", 18)]),
            or([score_raw()]),
        ]],
        "(`users`.`id` <> ? AND `age` <= ?) OR `score` <= ?",
        vec![s("1"), i(18), i(100)],
    );
}

#[test]
fn and_of_single_not_and_raw() {
    assert_where(
        vec![vec![and([
            not([eq(Column::primary(), "1")]),
            and([score_raw()]),
        ])]],
        "`users`.`id` <> ? AND `score` <= ?",
        vec![s("1"), i(100)],
    );
}

#[test]
fn not_mixing_comparison_and_raw() {
    assert_where(
        vec![vec![not([eq(Column::primary(), "1"), and([score_raw()])])]],
        "(`users`.`id` <> ? AND NOT `score` <= ?)",
        vec![s("1"), i(100)],
    );
}

#[test]
fn not_over_raw_fragments() {
    assert_where(
        vec![vec![not([
            score_raw(),
            raw("`age` <= ?", vec![i(60)]).unwrap(),
        ])]],
        "NOT (`score` <= ? AND `age` <= ?)",
        vec![i(100), i(60)],
    );
}

#[test]
fn not_over_compound_children() {
    assert_where(
        vec![vec![not([
            Expression::And(vec![eq(Column::primary(), "1"), gt("age", 18)]),
            Expression::Or(vec![lt("score", 100)]),
        ])]],
        "(NOT (`users`.`id` = ? AND `age` > ?) AND `score` >= ?)",
        vec![s("1"), i(18), i(100)],
    );
}

#[test]
fn not_over_single_child_or_inverts() {
    assert_where(
        vec![vec![not([or([gt("score", 100)])]), eq("name", "x")]],
        "`score` <= ? AND `name` = ?",
        vec![i(100), s("x")],
    );
}

#[test]
fn not_over_single_compound() {
    assert_where(
        vec![vec![not([or([eq("a", 1), eq("b", 2)])]), eq("c", 3)]],
        "NOT (`a` = ? OR `b` = ?) AND `c` = ?",
        vec![i(1), i(2), i(3)],
    );
}

// ===================================================================
// Values, columns and dialects
// ===================================================================

#[test]
fn empty_in_list_matches_nothing() {
    assert_where(
        vec![vec![in_list("id", Vec::<i64>::new()), eq("age", 1)]],
        "`id` IN (NULL) AND `age` = ?",
        vec![i(1)],
    );
    assert_where(
        vec![vec![not([in_list("id", Vec::<i64>::new())])]],
        "`id` IS NOT NULL",
        vec![],
    );
}

#[test]
fn field_names_resolve_through_schema() {
    assert_where(
        vec![vec![eq("Name", "x"), is_not_null("DeletedAt")]],
        "`name` = ? AND `deleted_at` IS NOT NULL",
        vec![s("x")],
    );
}

#[test]
fn postgres_placeholders_and_backticks() {
    let (sql, args) = render_pg(vec![
        eq(Column::primary(), 7),
        raw("`score` <= ? OR `age` > ?", vec![i(1), i(2)]).unwrap(),
        in_list("role", ["a", "b"]),
    ]);
    assert_eq!(
        sql,
        "\"users\".\"id\" = $1 AND (\"score\" <= $2 OR \"age\" > $3) AND \"role\" IN ($4,$5)"
    );
    assert_eq!(args, vec![i(7), i(1), i(2), s("a"), s("b")]);
}

#[test]
fn sqlite_quotes_with_double_quotes() {
    let scope = users();
    let (sql, _) = Clause::where_clause()
        .with([eq(Column::primary(), 1)])
        .render(&SqliteDialect::new(), Some(&scope))
        .unwrap();
    assert_eq!(sql, "\"users\".\"id\" = ?");
}

#[test]
fn where_and_having_share_numbering() {
    let dialect = PostgresDialect::new();
    let scope = users();
    let mut w = SqlWriter::new(&dialect, Some(&scope));
    w.write_str("SELECT * FROM ");
    w.write_identifier("users");
    Clause::where_clause()
        .with([gt("age", 18)])
        .build(&mut w)
        .unwrap();
    Clause::having()
        .with([gt(Column::raw("COUNT(*)"), 1)])
        .build(&mut w)
        .unwrap();
    let (sql, args) = w.finish();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE \"age\" > $1 HAVING COUNT(*) > $2"
    );
    assert_eq!(args, vec![i(18), i(1)]);
    assert_eq!(dialect.placeholder(3), "$3");
}

// ===================================================================
// Errors
// ===================================================================

#[test]
fn raw_arity_is_checked_at_construction() {
    let err = Raw::new("a = ? AND b = ?", vec![SqlValue::from(1)]).unwrap_err();
    assert_eq!(
        err,
        ClauseError::RawArity {
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn primary_column_without_key_fails() {
    let scope = oxide_clause::TableSchema::new("events");
    let err = Clause::where_clause()
        .with([eq(Column::primary(), 1)])
        .render(&MySqlDialect::new(), Some(&scope))
        .unwrap_err();
    assert_eq!(
        err,
        ClauseError::MissingPrimaryKey {
            table: "events".into()
        }
    );
    assert!(err.to_string().contains("events"));
}
