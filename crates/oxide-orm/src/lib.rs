//! # oxide-orm
//!
//! The statement-building core of an ORM: ordered callback chains per
//! operation and predicate rendering through `oxide-clause`.
//!
//! This crate provides:
//! - `Callbacks`: one `Processor` per phase (create, query, update, delete,
//!   row, raw) holding named callbacks with `before` / `after` constraints
//! - Deterministic chain compilation: a stable topological sort that keeps
//!   registration order wherever the constraints allow it
//! - `Statement`: the context callbacks mutate and the default callbacks
//!   render to SQL
//! - `Plugin`s, including the `SoftDelete` plugin
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_orm::expr::{eq, gt};
//! use oxide_orm::{Config, Db, DialectKind};
//!
//! let mut db = Db::new(Config::default().dialect(DialectKind::Postgres));
//!
//! // Tag every update; runs before the built-in UPDATE builder.
//! db.callback_mut()
//!     .update()
//!     .before("oxide:update")
//!     .register("audit:touch", |stmt| {
//!         stmt.assign("updated_by", "system");
//!         Ok(())
//!     });
//!
//! let stmt = db
//!     .update(db.statement("users").set("age", 30).where_([eq("id", 1)]))
//!     .unwrap();
//! assert_eq!(
//!     stmt.sql(),
//!     "UPDATE \"users\" SET \"age\"=$1,\"updated_by\"=$2 WHERE \"id\" = $3"
//! );
//!
//! let stmt = db.query(db.statement("users").where_([gt("age", 18)])).unwrap();
//! assert_eq!(stmt.sql(), "SELECT * FROM \"users\" WHERE \"age\" > $1");
//! ```
//!
//! ## Callback ordering
//!
//! Callbacks run in registration order unless a constraint says otherwise.
//! `before("*")` moves a callback ahead of every callback that does not also
//! claim `before("*")`; `after("*")` does the same at the end. Contradictory
//! constraints surface as [`ConstraintConflict`] when the chain is compiled.

pub mod callbacks;
mod config;
mod db;
mod error;
pub mod plugins;
mod statement;

pub use callbacks::{Callbacks, Phase, Processor};
pub use config::{Config, DialectKind};
pub use db::Db;
pub use error::{ConstraintConflict, OrmError, Result};
pub use plugins::{Plugin, SoftDelete, SoftDeleteMode};
pub use statement::Statement;

pub use oxide_clause::{
    dialect, expr, Clause, ClauseError, ClauseKind, Column, Dialect, Scope, SqlValue,
    TableSchema,
};
