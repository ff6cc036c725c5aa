//! Plugins extend a [`Db`] by registering callbacks.

mod soft_delete;

use std::fmt;

use crate::db::Db;
use crate::error::Result;

pub use soft_delete::{SoftDelete, SoftDeleteMode};

/// A bundle of callbacks installed into a session.
///
/// # Example
///
/// ```rust
/// use oxide_orm::{Config, Db, Plugin, Result};
///
/// #[derive(Debug)]
/// struct Audit;
///
/// impl Plugin for Audit {
///     fn name(&self) -> &str {
///         "audit"
///     }
///
///     fn initialize(&self, db: &mut Db) -> Result<()> {
///         db.callback_mut()
///             .update()
///             .after("*")
///             .register("audit:record", |_stmt| Ok(()));
///         Ok(())
///     }
/// }
///
/// let mut db = Db::new(Config::default());
/// db.use_plugin(Audit).unwrap();
/// assert!(db.use_plugin(Audit).is_err());
/// ```
pub trait Plugin: fmt::Debug + Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Registers the plugin's callbacks.
    fn initialize(&self, db: &mut Db) -> Result<()>;
}
