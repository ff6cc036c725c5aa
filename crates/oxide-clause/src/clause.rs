//! Statement clauses holding predicate lists.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::expr::Expression;
use crate::render::{self, SqlWriter};
use crate::schema::Scope;
use crate::value::SqlValue;

/// The clauses that hold predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    /// WHERE
    Where,
    /// HAVING
    Having,
}

impl ClauseKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::Having => "HAVING",
        }
    }
}

/// An ordered list of predicates under one keyword.
///
/// Appending never replaces: two groups pushed one after the other are
/// AND-joined, unless the second was built with a single-child `or`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    kind: ClauseKind,
    exprs: Vec<Expression>,
}

impl Clause {
    /// Creates an empty clause.
    #[must_use]
    pub const fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            exprs: Vec::new(),
        }
    }

    /// Creates an empty WHERE clause.
    #[must_use]
    pub const fn where_clause() -> Self {
        Self::new(ClauseKind::Where)
    }

    /// Creates an empty HAVING clause.
    #[must_use]
    pub const fn having() -> Self {
        Self::new(ClauseKind::Having)
    }

    /// Appends expressions, builder style.
    #[must_use]
    pub fn with(mut self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.extend(exprs);
        self
    }

    /// Appends one expression.
    pub fn push(&mut self, expr: Expression) {
        self.exprs.push(expr);
    }

    /// Appends expressions.
    pub fn extend(&mut self, exprs: impl IntoIterator<Item = Expression>) {
        self.exprs.extend(exprs);
    }

    /// Appends every expression of `other`.
    pub fn merge(&mut self, other: Self) {
        self.exprs.extend(other.exprs);
    }

    /// Folds the entries into one `And` group when any of them is an `Or`,
    /// so that a condition appended afterwards applies to all of them.
    ///
    /// `a OR b` followed by `c` renders `a OR b AND c`; after grouping it
    /// renders `(a OR b) AND c`.
    pub fn group_or(&mut self) {
        let has_or = self
            .exprs
            .iter()
            .any(|expr| matches!(expr, Expression::Or(_)) && !expr.is_empty());
        if has_or && self.exprs.len() > 1 {
            let exprs = std::mem::take(&mut self.exprs);
            self.exprs.push(Expression::And(exprs));
        }
    }

    /// Returns the clause kind.
    #[must_use]
    pub const fn kind(&self) -> ClauseKind {
        self.kind
    }

    /// Returns the expressions in append order.
    #[must_use]
    pub fn exprs(&self) -> &[Expression] {
        &self.exprs
    }

    /// Returns true when the clause would render nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exprs.iter().all(Expression::is_empty)
    }

    /// Writes ` WHERE <body>` (or ` HAVING <body>`); nothing when empty.
    pub fn build(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        w.write_char(' ');
        w.write_str(self.kind.keyword());
        w.write_char(' ');
        self.build_body(w)
    }

    /// Writes the predicate body only.
    pub fn build_body(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        render::build_clause(w, &self.exprs)
    }

    /// Renders the body to SQL and its arguments.
    pub fn render(
        &self,
        dialect: &dyn Dialect,
        scope: Option<&dyn Scope>,
    ) -> Result<(String, Vec<SqlValue>)> {
        let mut w = SqlWriter::new(dialect, scope);
        self.build_body(&mut w)?;
        Ok(w.finish())
    }
}
