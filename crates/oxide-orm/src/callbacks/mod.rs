//! Lifecycle callbacks.
//!
//! Every database operation runs the compiled callback chain of its
//! [`Phase`]. Callbacks are registered by name with optional ordering
//! constraints:
//!
//! ```rust
//! use oxide_orm::callbacks::Callbacks;
//!
//! let mut callbacks = Callbacks::with_defaults();
//! callbacks
//!     .query()
//!     .before("oxide:query")
//!     .register("audit:scope", |_stmt| Ok(()));
//! callbacks.query().after("*").register("audit:log", |_stmt| Ok(()));
//!
//! assert_eq!(
//!     callbacks.query().names().unwrap(),
//!     ["audit:scope", "oxide:query", "audit:log"]
//! );
//! ```
//!
//! Registries are plain values owned by a [`Db`](crate::Db); there is no
//! process-wide callback store.

mod defaults;
mod processor;
mod sort;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::statement::Statement;

pub use defaults::{CREATE, DELETE, QUERY, RAW, ROW, UPDATE};
pub use processor::{Callback, CallbackBuilder, ChainEntry, CompiledChain, Processor};
pub use sort::WILDCARD;

/// A callback body.
pub type Handler = Arc<dyn Fn(&mut Statement) -> Result<()> + Send + Sync>;

/// A runtime filter deciding whether a callback runs for a statement.
pub type Matcher = Arc<dyn Fn(&Statement) -> bool + Send + Sync>;

/// Lifecycle phases, each with an independent registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// INSERT
    Create,
    /// SELECT
    Query,
    /// UPDATE
    Update,
    /// DELETE
    Delete,
    /// Single-row reads.
    Row,
    /// Hand-written statements.
    Raw,
}

impl Phase {
    /// All phases.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Query,
        Self::Update,
        Self::Delete,
        Self::Row,
        Self::Raw,
    ];

    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Query => "query",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Row => "row",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a callback name from a handler's type: the last path segment.
///
/// For a function item `my_app::hooks::touch_updated_at` this is
/// `touch_updated_at`. Closures all map to `{{closure}}`, so name them
/// explicitly.
#[must_use]
pub fn handler_name<F: ?Sized>() -> &'static str {
    let full = std::any::type_name::<F>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// One callback registry per phase.
#[derive(Debug)]
pub struct Callbacks {
    create: Processor,
    query: Processor,
    update: Processor,
    delete: Processor,
    row: Processor,
    raw: Processor,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl Callbacks {
    /// Creates empty registries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            create: Processor::new(Phase::Create),
            query: Processor::new(Phase::Query),
            update: Processor::new(Phase::Update),
            delete: Processor::new(Phase::Delete),
            row: Processor::new(Phase::Row),
            raw: Processor::new(Phase::Raw),
        }
    }

    /// Creates registries holding the SQL-building callbacks
    /// (`oxide:create`, `oxide:query`, ...).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut callbacks = Self::new();
        defaults::register(&mut callbacks);
        callbacks
    }

    /// Returns the registry of `phase`.
    #[must_use]
    pub const fn processor(&self, phase: Phase) -> &Processor {
        match phase {
            Phase::Create => &self.create,
            Phase::Query => &self.query,
            Phase::Update => &self.update,
            Phase::Delete => &self.delete,
            Phase::Row => &self.row,
            Phase::Raw => &self.raw,
        }
    }

    /// Returns the registry of `phase` for mutation.
    pub fn processor_mut(&mut self, phase: Phase) -> &mut Processor {
        match phase {
            Phase::Create => &mut self.create,
            Phase::Query => &mut self.query,
            Phase::Update => &mut self.update,
            Phase::Delete => &mut self.delete,
            Phase::Row => &mut self.row,
            Phase::Raw => &mut self.raw,
        }
    }

    /// The create registry.
    pub fn create(&mut self) -> &mut Processor {
        &mut self.create
    }

    /// The query registry.
    pub fn query(&mut self) -> &mut Processor {
        &mut self.query
    }

    /// The update registry.
    pub fn update(&mut self) -> &mut Processor {
        &mut self.update
    }

    /// The delete registry.
    pub fn delete(&mut self) -> &mut Processor {
        &mut self.delete
    }

    /// The row registry.
    pub fn row(&mut self) -> &mut Processor {
        &mut self.row
    }

    /// The raw registry.
    pub fn raw(&mut self) -> &mut Processor {
        &mut self.raw
    }

    /// Runs the chain of `phase` against `stmt`.
    pub fn execute(&self, phase: Phase, stmt: &mut Statement) -> Result<()> {
        self.processor(phase).execute(stmt)
    }
}
