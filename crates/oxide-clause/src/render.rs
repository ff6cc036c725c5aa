//! Expression rendering.
//!
//! [`SqlWriter`] accumulates SQL text and positional arguments. Several
//! clauses can be written into one writer, so placeholder numbering stays
//! consistent across a whole statement.

use crate::column::{Column, ColumnName, TableRef};
use crate::dialect::Dialect;
use crate::error::{ClauseError, Result};
use crate::expr::Expression;
use crate::schema::Scope;
use crate::value::SqlValue;

/// SQL text plus the arguments bound to its placeholders.
#[derive(Debug)]
pub struct SqlWriter<'a> {
    dialect: &'a dyn Dialect,
    scope: Option<&'a dyn Scope>,
    sql: String,
    args: Vec<SqlValue>,
}

impl<'a> SqlWriter<'a> {
    /// Creates an empty writer.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect, scope: Option<&'a dyn Scope>) -> Self {
        Self {
            dialect,
            scope,
            sql: String::new(),
            args: Vec::new(),
        }
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Returns the schema in scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&'a dyn Scope> {
        self.scope
    }

    /// Appends SQL text.
    pub fn write_str(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a single character.
    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Binds a value and appends its placeholder.
    pub fn add_var(&mut self, value: SqlValue) {
        self.args.push(value);
        self.dialect.write_placeholder(&mut self.sql, self.args.len());
    }

    /// Appends a quoted identifier. `*` is written as is.
    pub fn write_identifier(&mut self, name: &str) {
        if name == "*" {
            self.sql.push('*');
        } else {
            let quoted = self.dialect.quote_identifier(name);
            self.sql.push_str(&quoted);
        }
    }

    /// Appends a quoted table name, resolving [`TableRef::Current`].
    pub fn write_table(&mut self, table: &TableRef) -> Result<()> {
        let name = match table {
            TableRef::Current => self.scope.ok_or(ClauseError::MissingTable)?.table(),
            TableRef::Named(name) => name.as_str(),
        };
        self.write_identifier(name);
        Ok(())
    }

    /// Appends a column reference.
    ///
    /// Named columns go through [`Scope::column_name`] first; a dotted name
    /// is quoted one segment at a time.
    pub fn write_column(&mut self, column: &Column) -> Result<()> {
        let name = match &column.name {
            ColumnName::PrimaryKey => {
                let scope = self.scope.ok_or(ClauseError::MissingTable)?;
                scope
                    .primary_key()
                    .ok_or_else(|| ClauseError::MissingPrimaryKey {
                        table: scope.table().to_owned(),
                    })?
            }
            ColumnName::Named(name) => self
                .scope
                .and_then(|scope| scope.column_name(name))
                .unwrap_or(name),
        };

        if column.raw {
            self.sql.push_str(name);
            return Ok(());
        }

        if let Some(table) = &column.table {
            self.write_table(table)?;
            self.sql.push('.');
        }
        for (idx, segment) in name.split('.').enumerate() {
            if idx > 0 {
                self.sql.push('.');
            }
            self.write_identifier(segment);
        }
        Ok(())
    }

    /// Returns the SQL written so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments bound so far.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Consumes the writer.
    #[must_use]
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    And,
    Or,
}

impl Join {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Which joins appear between the entries of one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Joins {
    and: bool,
    or: bool,
}

impl Joins {
    fn of(entries: &[&Expression], base: Join) -> Self {
        let mut joins = Self::default();
        for entry in entries.iter().skip(1) {
            match join_before(entry, base) {
                Join::And => joins.and = true,
                Join::Or => joins.or = true,
            }
        }
        joins
    }

    const fn only(self) -> Option<Join> {
        match (self.and, self.or) {
            (true, false) => Some(Join::And),
            (false, true) => Some(Join::Or),
            _ => None,
        }
    }

    /// Whether a list using `inner` joins must be parenthesized when placed
    /// in a list using `self`.
    fn needs_parens(self, inner: Self) -> bool {
        match (self.only(), inner.only()) {
            (Some(outer), Some(inner)) => outer != inner,
            _ => true,
        }
    }
}

fn live(children: &[Expression]) -> Vec<&Expression> {
    children.iter().filter(|child| !child.is_empty()).collect()
}

/// Returns the payload of an Or-tagged entry: an `Or` with one live child.
fn or_tagged(expr: &Expression) -> Option<&Expression> {
    match expr {
        Expression::Or(children) => match live(children).as_slice() {
            [only] => Some(*only),
            _ => None,
        },
        _ => None,
    }
}

fn join_before(expr: &Expression, base: Join) -> Join {
    if or_tagged(expr).is_some() {
        Join::Or
    } else {
        base
    }
}

/// Writes a standalone expression: a whole clause body or a lone list entry.
pub(crate) fn build_expression(w: &mut SqlWriter<'_>, expr: &Expression) -> Result<()> {
    match expr {
        Expression::Comparison(comparison) => comparison.build(w, false),
        Expression::Raw(raw) => {
            raw.build(w);
            Ok(())
        }
        Expression::And(children) => build_list(w, &live(children), Join::And),
        Expression::Or(children) => build_list(w, &live(children), Join::Or),
        Expression::Not(children) => build_not(w, children),
    }
}

/// Writes the entries of a clause, AND-joined except before Or-tagged entries.
pub(crate) fn build_clause(w: &mut SqlWriter<'_>, exprs: &[Expression]) -> Result<()> {
    build_list(w, &live(exprs), Join::And)
}

/// Writes the entries of one list, joined by `base` except where an entry is
/// Or-tagged.
fn build_list(w: &mut SqlWriter<'_>, entries: &[&Expression], base: Join) -> Result<()> {
    if let [only] = entries {
        return build_expression(w, only);
    }

    let context = Joins::of(entries, base);
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            w.write_str(join_before(entry, base).as_sql());
        }
        build_entry(w, entry, context, false)?;
    }
    Ok(())
}

fn build_entry(w: &mut SqlWriter<'_>, expr: &Expression, context: Joins, tagged: bool) -> Result<()> {
    match expr {
        Expression::Comparison(comparison) => comparison.build(w, false),
        Expression::Raw(raw) => {
            let wrap = if tagged {
                raw.contains_and_or()
            } else {
                raw.contains_or()
            };
            if wrap {
                w.write_char('(');
                raw.build(w);
                w.write_char(')');
            } else {
                raw.build(w);
            }
            Ok(())
        }
        Expression::Not(children) => build_not(w, children),
        Expression::And(children) | Expression::Or(children) => {
            let base = if matches!(expr, Expression::And(_)) {
                Join::And
            } else {
                Join::Or
            };
            let children = live(children);
            match children.as_slice() {
                [] => Ok(()),
                [only] => build_entry(w, only, context, tagged || base == Join::Or),
                _ if context.needs_parens(Joins::of(&children, base)) => {
                    w.write_char('(');
                    build_list(w, &children, base)?;
                    w.write_char(')');
                    Ok(())
                }
                _ => build_list(w, &children, base),
            }
        }
    }
}

/// Writes `NOT` over the conjunction of `children`.
///
/// When a comparison is among the children each child is negated on its own
/// (comparisons by inverting the operator) and the results are AND-ed.
fn build_not(w: &mut SqlWriter<'_>, children: &[Expression]) -> Result<()> {
    let children: Vec<&Expression> = live(children)
        .into_iter()
        .map(|child| match child {
            Expression::And(inner) | Expression::Or(inner) => match live(inner).as_slice() {
                [only] => *only,
                _ => child,
            },
            _ => child,
        })
        .collect();

    if children
        .iter()
        .any(|child| matches!(child, Expression::Comparison(_)))
    {
        let wrap = children.len() > 1;
        if wrap {
            w.write_char('(');
        }
        for (idx, child) in children.iter().enumerate() {
            if idx > 0 {
                w.write_str(Join::And.as_sql());
            }
            if let Expression::Comparison(comparison) = child {
                comparison.build(w, true)?;
            } else {
                w.write_str("NOT ");
                build_grouped(w, child)?;
            }
        }
        if wrap {
            w.write_char(')');
        }
        return Ok(());
    }

    match children.as_slice() {
        [] => Ok(()),
        [only] => {
            w.write_str("NOT ");
            build_grouped(w, only)
        }
        _ => {
            w.write_str("NOT (");
            build_list(w, &children, Join::And)?;
            w.write_char(')');
            Ok(())
        }
    }
}

/// Writes an expression that must read as a single operand, as after `NOT`.
fn build_grouped(w: &mut SqlWriter<'_>, expr: &Expression) -> Result<()> {
    match expr {
        Expression::Comparison(comparison) => comparison.build(w, false),
        Expression::Raw(raw) if raw.contains_and_or() => {
            w.write_char('(');
            raw.build(w);
            w.write_char(')');
            Ok(())
        }
        Expression::Raw(raw) => {
            raw.build(w);
            Ok(())
        }
        Expression::Not(children) => build_not(w, children),
        Expression::And(children) | Expression::Or(children) => {
            let base = if matches!(expr, Expression::And(_)) {
                Join::And
            } else {
                Join::Or
            };
            match live(children).as_slice() {
                [] => Ok(()),
                [only] => build_grouped(w, only),
                children => {
                    w.write_char('(');
                    build_list(w, children, base)?;
                    w.write_char(')');
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::expr::{and, eq, gt, in_list, like, lt, neq, not, not_in, or, raw};
    use crate::schema::TableSchema;

    fn users() -> TableSchema {
        TableSchema::new("users").primary_key("id")
    }

    fn render(expr: &Expression) -> (String, Vec<SqlValue>) {
        let scope = users();
        expr.to_sql(&MySqlDialect::new(), Some(&scope)).unwrap()
    }

    #[test]
    fn single_not_inverts_operator() {
        assert_eq!(render(&not([gt("score", 100)])).0, "`score` <= ?");
        assert_eq!(render(&not([like("name", "%a%")])).0, "`name` NOT LIKE ?");
    }

    #[test]
    fn not_sees_through_single_child_groups() {
        assert_eq!(render(&not([or([gt("score", 100)])])).0, "`score` <= ?");
        assert_eq!(render(&not([and([gt("score", 100)])])).0, "`score` <= ?");

        let (sql, args) = render(&not([or([gt("score", 100)]), and([eq("a", 1), eq("b", 2)])]));
        assert_eq!(sql, "(`score` <= ? AND NOT (`a` = ? AND `b` = ?))");
        assert_eq!(args, vec![SqlValue::from(100), SqlValue::from(1), SqlValue::from(2)]);
    }

    #[test]
    fn not_over_comparisons_distributes() {
        let (sql, args) = render(&not([eq(Column::primary(), "1"), gt("age", 18)]));
        assert_eq!(sql, "(`users`.`id` <> ? AND `age` <= ?)");
        assert_eq!(args, vec![SqlValue::from("1"), SqlValue::from(18)]);
    }

    #[test]
    fn not_over_compounds_keeps_not() {
        let expr = not([
            and([eq("a", 1), eq("b", 2)]),
            or([lt("c", 3), eq("d", 4)]),
        ]);
        assert_eq!(
            render(&expr).0,
            "NOT (`a` = ? AND `b` = ? AND (`c` < ? OR `d` = ?))"
        );

        let expr = not([or([eq("a", 1), eq("b", 2)])]);
        assert_eq!(render(&expr).0, "NOT (`a` = ? OR `b` = ?)");
    }

    #[test]
    fn nested_and_flattens_into_and_list() {
        let expr = and([eq("a", 1), and([eq("b", 2), eq("c", 3)])]);
        assert_eq!(render(&expr).0, "`a` = ? AND `b` = ? AND `c` = ?");
    }

    #[test]
    fn or_inside_and_is_wrapped() {
        let expr = and([eq("a", 1), or([eq("b", 2), eq("c", 3)])]);
        assert_eq!(render(&expr).0, "`a` = ? AND (`b` = ? OR `c` = ?)");

        let expr = or([eq("a", 1), or([eq("b", 2), eq("c", 3)])]);
        assert_eq!(render(&expr).0, "`a` = ? OR `b` = ? OR `c` = ?");
    }

    #[test]
    fn raw_with_or_is_wrapped_in_lists_only() {
        let fragment = raw("a = ? OR b = ?", vec![1.into(), 2.into()]).unwrap();
        assert_eq!(render(&fragment).0, "a = ? OR b = ?");

        let expr = and([eq("c", 3), fragment]);
        assert_eq!(render(&expr).0, "`c` = ? AND (a = ? OR b = ?)");
    }

    #[test]
    fn parenthesized_raw_is_never_wrapped() {
        let fragment = crate::expr::Raw::new("(a = ? OR b = ?)", vec![1.into(), 2.into()])
            .unwrap()
            .parenthesized();
        let expr = and([eq("c", 3), fragment.into()]);
        assert_eq!(render(&expr).0, "`c` = ? AND (a = ? OR b = ?)");
    }

    #[test]
    fn in_lists() {
        let (sql, args) = render(&in_list("id", [1, 2, 3]));
        assert_eq!(sql, "`id` IN (?,?,?)");
        assert_eq!(args.len(), 3);

        assert_eq!(render(&in_list("id", Vec::<i64>::new())).0, "`id` IN (NULL)");
        assert_eq!(render(&not_in("id", Vec::<i64>::new())).0, "`id` IS NOT NULL");
        assert_eq!(render(&not([in_list("id", [1])])).0, "`id` NOT IN (?)");
    }

    #[test]
    fn null_comparisons_bind_nothing() {
        let (sql, args) = render(&and([eq("deleted_at", SqlValue::Null), neq("name", "x")]));
        assert_eq!(sql, "`deleted_at` IS NULL AND `name` <> ?");
        assert_eq!(args, vec![SqlValue::from("x")]);
    }

    #[test]
    fn dotted_columns_quote_each_segment() {
        assert_eq!(render(&eq("users.age", 1)).0, "`users`.`age` = ?");
        assert_eq!(render(&eq(Column::raw("LOWER(name)"), "x")).0, "LOWER(name) = ?");
        assert_eq!(render(&eq(Column::current("age"), 1)).0, "`users`.`age` = ?");
    }

    #[test]
    fn primary_column_needs_scope() {
        let err = eq(Column::primary(), 1)
            .to_sql(&MySqlDialect::new(), None)
            .unwrap_err();
        assert_eq!(err, ClauseError::MissingTable);

        let scope = TableSchema::new("logs");
        let err = eq(Column::primary(), 1)
            .to_sql(&MySqlDialect::new(), Some(&scope))
            .unwrap_err();
        assert_eq!(
            err,
            ClauseError::MissingPrimaryKey {
                table: "logs".into()
            }
        );
    }

    #[test]
    fn postgres_numbers_placeholders() {
        let scope = users();
        let expr = and([eq(Column::primary(), 1), in_list("role", ["a", "b"])]);
        let (sql, _) = expr.to_sql(&PostgresDialect::new(), Some(&scope)).unwrap();
        assert_eq!(sql, "\"users\".\"id\" = $1 AND \"role\" IN ($2,$3)");
    }

    #[test]
    fn writer_continues_numbering() {
        let dialect = PostgresDialect::new();
        let mut w = SqlWriter::new(&dialect, None);
        w.write_str("UPDATE t SET x = ");
        w.add_var(1.into());
        w.write_str(" WHERE ");
        eq("y", 2).build(&mut w).unwrap();
        let (sql, args) = w.finish();
        assert_eq!(sql, "UPDATE t SET x = $1 WHERE \"y\" = $2");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }
}
