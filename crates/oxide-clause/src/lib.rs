//! # oxide-clause
//!
//! Composable SQL predicates with precedence-aware rendering.
//!
//! This crate provides:
//! - A closed expression model: comparisons, raw fragments and the
//!   `AND` / `OR` / `NOT` combinators
//! - A renderer that flattens an expression list into a single SQL string
//!   plus an ordered argument list, inserting parentheses only where SQL
//!   precedence requires them
//! - Narrow `Dialect` and `Scope` traits through which identifier quoting,
//!   placeholder style and primary-key lookup are supplied
//!
//! ## Rendering a WHERE clause
//!
//! ```rust
//! use oxide_clause::dialect::MySqlDialect;
//! use oxide_clause::expr::{eq, gt, neq, or};
//! use oxide_clause::{Clause, Column, SqlValue, TableSchema};
//!
//! let users = TableSchema::new("users").primary_key("id");
//! let clause = Clause::where_clause().with([
//!     eq(Column::primary(), "1"),
//!     gt("age", 18),
//!     or([neq("name", "jinzhu")]),
//! ]);
//!
//! let (sql, args) = clause.render(&MySqlDialect::new(), Some(&users)).unwrap();
//! assert_eq!(sql, "`users`.`id` = ? AND `age` > ? OR `name` <> ?");
//! assert_eq!(
//!     args,
//!     vec![SqlValue::from("1"), SqlValue::from(18), SqlValue::from("jinzhu")]
//! );
//! ```
//!
//! ## Join rule
//!
//! Entries of a clause are joined with `AND`, except that an entry built
//! with a single-child [`expr::or`] joins its left neighbour with `OR`.
//! Appending to a clause concatenates; nothing is ever replaced or reordered,
//! so argument order always equals append order.

pub mod clause;
pub mod column;
pub mod dialect;
mod error;
pub mod expr;
pub mod render;
pub mod schema;
pub mod value;

pub use clause::{Clause, ClauseKind};
pub use column::{Column, ColumnName, TableRef};
pub use dialect::Dialect;
pub use error::{ClauseError, Result};
pub use expr::{Comparison, Expression, Operator, Raw};
pub use render::SqlWriter;
pub use schema::{Scope, TableSchema};
pub use value::SqlValue;
