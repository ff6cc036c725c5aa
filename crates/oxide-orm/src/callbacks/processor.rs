//! Per-phase callback registry.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace, warn};

use crate::error::{ConstraintConflict, Result};
use crate::statement::Statement;

use super::sort;
use super::{handler_name, Handler, Matcher, Phase};

/// A named handler with its ordering constraints.
#[derive(Clone)]
pub struct Callback {
    /// Unique name within the phase.
    pub name: String,
    /// The handler.
    pub handler: Handler,
    /// Names this callback must run before (`"*"` for all).
    pub before: BTreeSet<String>,
    /// Names this callback must run after (`"*"` for all).
    pub after: BTreeSet<String>,
    /// Runtime filter; the handler is skipped when it returns false.
    pub matcher: Option<Matcher>,
}

impl Callback {
    /// Creates an unconstrained callback.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            matcher: None,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("matcher", &self.matcher.is_some())
            .finish_non_exhaustive()
    }
}

/// One entry of a [`CompiledChain`].
#[derive(Clone)]
pub struct ChainEntry {
    /// Callback name.
    pub name: String,
    /// The handler.
    pub handler: Handler,
    /// Runtime filter.
    pub matcher: Option<Matcher>,
}

/// The linear execution order of a phase. Immutable once built.
#[derive(Clone, Default)]
pub struct CompiledChain {
    entries: Vec<ChainEntry>,
}

impl CompiledChain {
    /// Returns the entries in execution order.
    #[must_use]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Returns the callback names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the number of callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there is nothing to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every matching handler in order, stopping at the first error.
    pub fn execute(&self, stmt: &mut Statement) -> Result<()> {
        for entry in &self.entries {
            if let Some(matcher) = &entry.matcher {
                if !matcher(stmt) {
                    trace!(callback = %entry.name, "Skipping unmatched callback");
                    continue;
                }
            }
            trace!(callback = %entry.name, "Running callback");
            (entry.handler)(stmt)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompiledChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type Compiled = std::result::Result<Arc<CompiledChain>, ConstraintConflict>;

/// The callbacks of one phase, in registration order.
///
/// Mutation takes `&mut self` and is meant for setup time; the compiled chain
/// is built on first use and shared until the next mutation.
pub struct Processor {
    phase: Phase,
    callbacks: Vec<Callback>,
    compiled: OnceLock<Compiled>,
}

impl Processor {
    /// Creates an empty registry for `phase`.
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self {
            phase,
            callbacks: Vec::new(),
            compiled: OnceLock::new(),
        }
    }

    /// Returns the phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Starts a registration that must run before `name`.
    pub fn before(&mut self, name: impl Into<String>) -> CallbackBuilder<'_> {
        CallbackBuilder::new(self).before(name)
    }

    /// Starts a registration that must run after `name`.
    pub fn after(&mut self, name: impl Into<String>) -> CallbackBuilder<'_> {
        CallbackBuilder::new(self).after(name)
    }

    /// Starts a registration with a runtime filter.
    pub fn matching<M>(&mut self, matcher: M) -> CallbackBuilder<'_>
    where
        M: Fn(&Statement) -> bool + Send + Sync + 'static,
    {
        CallbackBuilder::new(self).matching(matcher)
    }

    /// Registers an unconstrained callback.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(Callback::new(name, handler), false);
    }

    /// Registers a callback named after the handler's type.
    pub fn register_fn<F>(&mut self, handler: F)
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        self.register(handler_name::<F>(), handler);
    }

    /// Swaps the handler of an existing callback, keeping its position.
    ///
    /// Returns false, changing nothing, when `name` is not registered.
    pub fn replace<F>(&mut self, name: impl Into<String>, handler: F) -> bool
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(Callback::new(name, handler), true)
    }

    /// Inserts or merges a callback.
    ///
    /// An existing entry of the same name keeps its position: the handler is
    /// swapped and the constraints are unioned. Returns whether anything
    /// changed.
    pub fn insert(&mut self, callback: Callback, replace: bool) -> bool {
        match self.callbacks.iter_mut().find(|c| c.name == callback.name) {
            Some(existing) => {
                if !replace {
                    warn!(
                        phase = %self.phase,
                        callback = %callback.name,
                        "Callback already registered, merging"
                    );
                }
                existing.handler = callback.handler;
                existing.before.extend(callback.before);
                existing.after.extend(callback.after);
                if callback.matcher.is_some() {
                    existing.matcher = callback.matcher;
                }
            }
            None if replace => return false,
            None => self.callbacks.push(callback),
        }
        self.compiled.take();
        true
    }

    /// Removes a callback. Returns false when `name` is not registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.callbacks.len();
        self.callbacks.retain(|c| c.name != name);
        if self.callbacks.len() == len {
            return false;
        }
        self.compiled.take();
        true
    }

    /// Returns the handler registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.callbacks
            .iter()
            .find(|c| c.name == name)
            .map(|c| Arc::clone(&c.handler))
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.iter().any(|c| c.name == name)
    }

    /// Returns the callbacks in registration order.
    #[must_use]
    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Returns the execution order, compiling it on first use.
    pub fn compile(&self) -> std::result::Result<Arc<CompiledChain>, ConstraintConflict> {
        self.compiled
            .get_or_init(|| {
                let order = sort::sort(&self.callbacks).inspect_err(|err| {
                    warn!(phase = %self.phase, error = %err, "Callback ordering failed");
                })?;
                let entries: Vec<ChainEntry> = order
                    .into_iter()
                    .map(|idx| {
                        let cb = &self.callbacks[idx];
                        ChainEntry {
                            name: cb.name.clone(),
                            handler: Arc::clone(&cb.handler),
                            matcher: cb.matcher.clone(),
                        }
                    })
                    .collect();
                let chain = CompiledChain { entries };
                debug!(phase = %self.phase, order = ?chain.names(), "Compiled callbacks");
                Ok(Arc::new(chain))
            })
            .clone()
    }

    /// Returns the compiled callback names.
    pub fn names(&self) -> std::result::Result<Vec<String>, ConstraintConflict> {
        Ok(self
            .compile()?
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// Runs the compiled chain against `stmt`.
    pub fn execute(&self, stmt: &mut Statement) -> Result<()> {
        self.compile()?.execute(stmt)
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("phase", &self.phase)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

/// Collects constraints for a callback about to be registered.
///
/// ```rust
/// use oxide_orm::callbacks::{Phase, Processor};
///
/// let mut create = Processor::new(Phase::Create);
/// create.register("save", |_| Ok(()));
/// create.before("save").register("validate", |_| Ok(()));
///
/// assert_eq!(create.names().unwrap(), ["validate", "save"]);
/// ```
pub struct CallbackBuilder<'a> {
    processor: &'a mut Processor,
    before: BTreeSet<String>,
    after: BTreeSet<String>,
    matcher: Option<Matcher>,
}

impl<'a> CallbackBuilder<'a> {
    fn new(processor: &'a mut Processor) -> Self {
        Self {
            processor,
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            matcher: None,
        }
    }

    /// Runs before `name` (`"*"` for every other callback).
    #[must_use]
    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before.insert(name.into());
        self
    }

    /// Runs after `name` (`"*"` for every other callback).
    #[must_use]
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after.insert(name.into());
        self
    }

    /// Runs only for statements accepted by `matcher`.
    #[must_use]
    pub fn matching<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&Statement) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Registers the callback; an existing one of the same name is merged.
    pub fn register<F>(self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        let (processor, callback) = self.finish(name, handler);
        processor.insert(callback, false);
    }

    /// Registers the callback under the handler's type name.
    pub fn register_fn<F>(self, handler: F)
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        self.register(handler_name::<F>(), handler);
    }

    /// Replaces an existing callback; see [`Processor::replace`].
    pub fn replace<F>(self, name: impl Into<String>, handler: F) -> bool
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        let (processor, callback) = self.finish(name, handler);
        processor.insert(callback, true)
    }

    fn finish<F>(self, name: impl Into<String>, handler: F) -> (&'a mut Processor, Callback)
    where
        F: Fn(&mut Statement) -> Result<()> + Send + Sync + 'static,
    {
        let mut callback = Callback::new(name, handler);
        callback.before = self.before;
        callback.after = self.after;
        callback.matcher = self.matcher;
        (self.processor, callback)
    }
}
