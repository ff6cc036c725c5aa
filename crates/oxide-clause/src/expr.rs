//! The expression model.
//!
//! [`Expression`] is a closed sum type: atomic predicates ([`Comparison`],
//! [`Raw`]) and the `AND` / `OR` / `NOT` combinators. The free functions in
//! this module are the intended way to build expressions; they normalize the
//! tree the same way the renderer expects it.
//!
//! # Example
//!
//! ```rust
//! use oxide_clause::dialect::MySqlDialect;
//! use oxide_clause::expr::{gt, like, not, or};
//!
//! let expr = or([not([gt("score", 100)]), like("name", "%linus%")]);
//! let (sql, args) = expr.to_sql(&MySqlDialect::new(), None).unwrap();
//!
//! assert_eq!(sql, "`score` <= ? OR `name` LIKE ?");
//! assert_eq!(args.len(), 2);
//! ```

use std::fmt;

use crate::column::Column;
use crate::dialect::Dialect;
use crate::error::{ClauseError, Result};
use crate::render::{self, SqlWriter};
use crate::schema::Scope;
use crate::value::SqlValue;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Not equal (<>)
    Neq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Pattern match (LIKE)
    Like,
    /// Negated pattern match (NOT LIKE)
    NotLike,
    /// Set membership (IN)
    In,
    /// Negated set membership (NOT IN)
    NotIn,
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
}

impl Operator {
    /// Returns the operator that selects exactly the rows this one rejects.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Neq,
            Self::Neq => Self::Eq,
            Self::Gt => Self::Lte,
            Self::Gte => Self::Lt,
            Self::Lt => Self::Gte,
            Self::Lte => Self::Gt,
            Self::Like => Self::NotLike,
            Self::NotLike => Self::Like,
            Self::In => Self::NotIn,
            Self::NotIn => Self::In,
            Self::IsNull => Self::IsNotNull,
            Self::IsNotNull => Self::IsNull,
        }
    }

    /// Returns the SQL spelling.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns true when `count` values satisfy this operator.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::IsNull | Self::IsNotNull => count == 0,
            Self::In | Self::NotIn => true,
            _ => count == 1,
        }
    }

    const fn arity(self) -> &'static str {
        match self {
            Self::IsNull | Self::IsNotNull => "0",
            Self::In | Self::NotIn => "any number of",
            _ => "exactly 1",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An atomic `column <op> value(s)` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    column: Column,
    operator: Operator,
    values: Vec<SqlValue>,
}

impl Comparison {
    /// Creates a comparison, checking the value count against the operator.
    pub fn new(column: impl Into<Column>, operator: Operator, values: Vec<SqlValue>) -> Result<Self> {
        if !operator.accepts(values.len()) {
            return Err(ClauseError::InvalidExpression {
                operator,
                expected: operator.arity(),
                found: values.len(),
            });
        }
        Ok(Self {
            column: column.into(),
            operator,
            values,
        })
    }

    /// Returns the column.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the bound values.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Writes the comparison, with its operator inverted when `negated`.
    pub(crate) fn build(&self, w: &mut SqlWriter<'_>, negated: bool) -> Result<()> {
        let operator = if negated {
            self.operator.negate()
        } else {
            self.operator
        };
        w.write_column(&self.column)?;
        match operator {
            Operator::IsNull | Operator::IsNotNull => {
                w.write_char(' ');
                w.write_str(operator.as_sql());
            }
            Operator::In if self.values.is_empty() => w.write_str(" IN (NULL)"),
            Operator::NotIn if self.values.is_empty() => w.write_str(" IS NOT NULL"),
            Operator::In | Operator::NotIn => {
                w.write_char(' ');
                w.write_str(operator.as_sql());
                w.write_str(" (");
                for (idx, value) in self.values.iter().enumerate() {
                    if idx > 0 {
                        w.write_char(',');
                    }
                    w.add_var(value.clone());
                }
                w.write_char(')');
            }
            _ => {
                w.write_char(' ');
                w.write_str(operator.as_sql());
                w.write_char(' ');
                w.add_var(self.values[0].clone());
            }
        }
        Ok(())
    }
}

/// A hand-written SQL fragment with `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    sql: String,
    args: Vec<SqlValue>,
    parenthesized: bool,
}

impl Raw {
    /// Creates a raw fragment; the number of `?` must equal `args.len()`.
    ///
    /// **Warning**: Only use this for SQL text that doesn't contain user input.
    pub fn new(sql: impl Into<String>, args: Vec<SqlValue>) -> Result<Self> {
        let sql = sql.into();
        let expected = sql.matches('?').count();
        if expected != args.len() {
            return Err(ClauseError::RawArity {
                expected,
                found: args.len(),
            });
        }
        Ok(Self {
            sql,
            args,
            parenthesized: false,
        })
    }

    /// Declares the fragment a closed unit that never needs wrapping.
    #[must_use]
    pub const fn parenthesized(mut self) -> Self {
        self.parenthesized = true;
        self
    }

    /// Returns the SQL text as written.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Returns true when the fragment was declared self-delimited.
    #[must_use]
    pub const fn is_parenthesized(&self) -> bool {
        self.parenthesized
    }

    pub(crate) fn contains_or(&self) -> bool {
        !self.parenthesized && self.sql.to_uppercase().contains(" OR ")
    }

    pub(crate) fn contains_and_or(&self) -> bool {
        if self.parenthesized {
            return false;
        }
        let upper = self.sql.to_uppercase();
        upper.contains(" AND ") || upper.contains(" OR ")
    }

    pub(crate) fn build(&self, w: &mut SqlWriter<'_>) {
        let sql = w.dialect().normalize_quotes(&self.sql);
        let mut args = self.args.iter().peekable();
        for c in sql.chars() {
            match (c, args.next_if(|_| c == '?')) {
                (_, Some(value)) => w.add_var(value.clone()),
                (c, None) => w.write_char(c),
            }
        }
    }
}

/// A predicate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `column <op> value(s)`.
    Comparison(Comparison),
    /// Hand-written SQL.
    Raw(Raw),
    /// Children joined by `AND`; single-child `Or` children join with `OR`.
    And(Vec<Expression>),
    /// Children joined by `OR`. With exactly one child this is an Or-tagged
    /// entry: it joins its left neighbour with `OR`.
    Or(Vec<Expression>),
    /// Negation of the children.
    Not(Vec<Expression>),
}

impl Expression {
    /// Returns true when rendering would produce no SQL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Comparison(_) | Self::Raw(_) => false,
            Self::And(children) | Self::Or(children) | Self::Not(children) => {
                children.iter().all(Self::is_empty)
            }
        }
    }

    /// Writes this expression as a standalone predicate.
    pub fn build(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        render::build_expression(w, self)
    }

    /// Renders this expression on its own.
    pub fn to_sql(
        &self,
        dialect: &dyn Dialect,
        scope: Option<&dyn Scope>,
    ) -> Result<(String, Vec<SqlValue>)> {
        let mut w = SqlWriter::new(dialect, scope);
        self.build(&mut w)?;
        Ok(w.finish())
    }
}

impl From<Comparison> for Expression {
    fn from(comparison: Comparison) -> Self {
        Self::Comparison(comparison)
    }
}

impl From<Raw> for Expression {
    fn from(raw: Raw) -> Self {
        Self::Raw(raw)
    }
}

fn compare(column: impl Into<Column>, operator: Operator, value: SqlValue) -> Expression {
    Expression::Comparison(Comparison {
        column: column.into(),
        operator,
        values: vec![value],
    })
}

fn null_check(column: impl Into<Column>, operator: Operator) -> Expression {
    Expression::Comparison(Comparison {
        column: column.into(),
        operator,
        values: Vec::new(),
    })
}

/// `column = value`; a NULL value yields `column IS NULL`.
#[must_use]
pub fn eq(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    match value.into() {
        SqlValue::Null => null_check(column, Operator::IsNull),
        value => compare(column, Operator::Eq, value),
    }
}

/// `column <> value`; a NULL value yields `column IS NOT NULL`.
#[must_use]
pub fn neq(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    match value.into() {
        SqlValue::Null => null_check(column, Operator::IsNotNull),
        value => compare(column, Operator::Neq, value),
    }
}

/// `column > value`.
#[must_use]
pub fn gt(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::Gt, value.into())
}

/// `column >= value`.
#[must_use]
pub fn gte(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::Gte, value.into())
}

/// `column < value`.
#[must_use]
pub fn lt(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::Lt, value.into())
}

/// `column <= value`.
#[must_use]
pub fn lte(column: impl Into<Column>, value: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::Lte, value.into())
}

/// `column LIKE pattern`.
#[must_use]
pub fn like(column: impl Into<Column>, pattern: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::Like, pattern.into())
}

/// `column NOT LIKE pattern`.
#[must_use]
pub fn not_like(column: impl Into<Column>, pattern: impl Into<SqlValue>) -> Expression {
    compare(column, Operator::NotLike, pattern.into())
}

/// `column IN (values...)`; an empty list renders `column IN (NULL)`.
#[must_use]
pub fn in_list<V: Into<SqlValue>>(
    column: impl Into<Column>,
    values: impl IntoIterator<Item = V>,
) -> Expression {
    Expression::Comparison(Comparison {
        column: column.into(),
        operator: Operator::In,
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// `column NOT IN (values...)`; an empty list renders `column IS NOT NULL`.
#[must_use]
pub fn not_in<V: Into<SqlValue>>(
    column: impl Into<Column>,
    values: impl IntoIterator<Item = V>,
) -> Expression {
    Expression::Comparison(Comparison {
        column: column.into(),
        operator: Operator::NotIn,
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// `column IS NULL`.
#[must_use]
pub fn is_null(column: impl Into<Column>) -> Expression {
    null_check(column, Operator::IsNull)
}

/// `column IS NOT NULL`.
#[must_use]
pub fn is_not_null(column: impl Into<Column>) -> Expression {
    null_check(column, Operator::IsNotNull)
}

/// A raw SQL fragment with positional `?` arguments.
pub fn raw(sql: impl Into<String>, args: Vec<SqlValue>) -> Result<Expression> {
    Raw::new(sql, args).map(Expression::Raw)
}

/// Joins expressions with `AND`.
///
/// A single child that is not an Or-tagged entry is returned as is.
#[must_use]
pub fn and(exprs: impl IntoIterator<Item = Expression>) -> Expression {
    let mut exprs: Vec<Expression> = exprs.into_iter().collect();
    if exprs.len() == 1 && !matches!(exprs[0], Expression::Or(_)) {
        return exprs.remove(0);
    }
    Expression::And(exprs)
}

/// Joins expressions with `OR`.
///
/// With one child the result is an Or-tagged entry, which joins whatever
/// precedes it in its list with `OR` instead of `AND`.
#[must_use]
pub fn or(exprs: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Or(exprs.into_iter().collect())
}

/// Negates expressions.
///
/// A single `And` child is unwrapped so its children are negated directly.
#[must_use]
pub fn not(exprs: impl IntoIterator<Item = Expression>) -> Expression {
    let mut exprs: Vec<Expression> = exprs.into_iter().collect();
    if exprs.len() == 1 {
        if let Expression::And(children) = &mut exprs[0] {
            return Expression::Not(std::mem::take(children));
        }
    }
    Expression::Not(exprs)
}
