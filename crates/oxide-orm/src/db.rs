//! The session object tying configuration, dialect and callbacks together.

use std::collections::BTreeMap;
use std::sync::Arc;

use oxide_clause::{Dialect, Scope, TableSchema};
use tracing::{debug, warn};

use crate::callbacks::{Callbacks, Phase};
use crate::config::Config;
use crate::error::{OrmError, Result};
use crate::plugins::Plugin;
use crate::statement::Statement;

/// A configured session.
///
/// `Db` owns its callback registries; install plugins and custom callbacks
/// while setting up, then share it (e.g. behind an `Arc`) for concurrent
/// statement building.
///
/// ```rust
/// use oxide_orm::expr::{eq, gt, or};
/// use oxide_orm::{Config, Db, DialectKind};
///
/// let db = Db::new(Config::default().dialect(DialectKind::MySql));
/// let stmt = db
///     .query(
///         db.statement("users")
///             .where_([gt("age", 18)])
///             .where_([or([eq("role", "admin")])]),
///     )
///     .unwrap();
///
/// assert_eq!(stmt.sql(), "SELECT * FROM `users` WHERE `age` > ? OR `role` = ?");
/// ```
#[derive(Debug)]
pub struct Db {
    config: Config,
    dialect: Arc<dyn Dialect>,
    callbacks: Callbacks,
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl Db {
    /// Creates a session with the default callbacks.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let dialect = config.dialect.dialect();
        Self::with_dialect(config, dialect)
    }

    /// Creates a session with a custom dialect implementation.
    #[must_use]
    pub fn with_dialect(config: Config, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            config,
            dialect,
            callbacks: Callbacks::with_defaults(),
            plugins: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Returns the callback registries.
    #[must_use]
    pub const fn callback(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Returns the callback registries for registration.
    pub fn callback_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Installs a plugin.
    ///
    /// Fails with [`OrmError::DuplicatePlugin`] when a plugin of the same
    /// name is already installed.
    pub fn use_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> Result<()> {
        let name = plugin.name().to_owned();
        if self.plugins.contains_key(&name) {
            warn!(plugin = %name, "Plugin already registered");
            return Err(OrmError::DuplicatePlugin(name));
        }
        plugin.initialize(self)?;
        debug!(plugin = %name, "Plugin registered");
        self.plugins.insert(name, Arc::new(plugin));
        Ok(())
    }

    /// Returns an installed plugin.
    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(name)
    }

    /// Starts a statement on `table`.
    #[must_use]
    pub fn statement(&self, table: impl Into<String>) -> Statement {
        self.statement_for(Arc::new(TableSchema::new(table)))
    }

    /// Starts a statement on the table described by `schema`.
    #[must_use]
    pub fn statement_for(&self, schema: Arc<dyn Scope>) -> Statement {
        Statement::with_schema(schema, Arc::clone(&self.dialect))
            .allow_global_update(self.config.allow_global_update)
    }

    /// Builds an INSERT.
    pub fn create(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Create, stmt)
    }

    /// Builds a SELECT.
    pub fn query(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Query, stmt)
    }

    /// Builds an UPDATE.
    pub fn update(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Update, stmt)
    }

    /// Builds a DELETE.
    pub fn delete(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Delete, stmt)
    }

    /// Builds a single-row read.
    pub fn row(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Row, stmt)
    }

    /// Builds a hand-written statement.
    pub fn raw(&self, stmt: Statement) -> Result<Statement> {
        self.run(Phase::Raw, stmt)
    }

    /// Runs the callback chain of `phase`.
    pub fn run(&self, phase: Phase, mut stmt: Statement) -> Result<Statement> {
        self.callbacks.execute(phase, &mut stmt)?;
        if self.config.log_sql {
            debug!(
                phase = %phase,
                table = %stmt.table(),
                sql = %stmt.explain(),
                "Built statement"
            );
        }
        Ok(stmt)
    }
}
