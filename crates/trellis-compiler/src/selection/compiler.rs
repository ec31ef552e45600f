//! The per-type selection compiler protocol and its registry.

use indexmap::IndexMap;

use super::interval::IntervalCompiler;
use super::multi::MultiCompiler;
use super::single::SingleCompiler;
use super::{SelectionComponent, UnitContext};
use crate::vega::{Mark, Signal};
use crate::{Error, Result};

/// Compiles one kind of selection.
///
/// Adding an interaction type means implementing this trait and
/// registering it; nothing else dispatches on the type tag.
pub trait SelectionCompiler {
    /// Signals tracking the selection's current value within one view.
    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal>;

    /// Arguments to `modify(store, ...)` run whenever the tuple changes.
    fn modify_expr(&self, ctx: &UnitContext, sel: &SelectionComponent) -> String;

    /// Name of the expression function testing a datum against the store.
    fn predicate(&self) -> &str;

    /// Name of the expression function reading a domain from the store.
    fn scale_domain(&self) -> &str;

    /// Signals that must live at the top level rather than in the view.
    fn top_level_signals(
        &self,
        _ctx: &UnitContext,
        _sel: &SelectionComponent,
        signals: Vec<Signal>,
    ) -> Vec<Signal> {
        signals
    }

    /// Marks wrapping or extending the view's marks.
    fn marks(&self, _ctx: &UnitContext, _sel: &SelectionComponent, marks: Vec<Mark>) -> Vec<Mark> {
        marks
    }
}

/// Selection compilers keyed by type tag.
pub struct SelectionRegistry {
    compilers: IndexMap<String, Box<dyn SelectionCompiler>>,
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SelectionRegistry {
    /// Registry without any compiler.
    pub fn empty() -> Self {
        Self {
            compilers: IndexMap::new(),
        }
    }

    /// Registry with `single`, `multi` and `interval`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("single", SingleCompiler);
        registry.register("multi", MultiCompiler);
        registry.register("interval", IntervalCompiler);
        registry
    }

    /// Register `compiler` for `tag`, returning any compiler it replaces.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        compiler: impl SelectionCompiler + 'static,
    ) -> Option<Box<dyn SelectionCompiler>> {
        self.compilers.insert(tag.into(), Box::new(compiler))
    }

    pub fn get(&self, tag: &str) -> Option<&dyn SelectionCompiler> {
        self.compilers.get(tag).map(|c| c.as_ref())
    }

    /// Compiler for `selection`'s type tag.
    pub fn lookup(&self, selection: &str, tag: &str) -> Result<&dyn SelectionCompiler> {
        self.get(tag).ok_or_else(|| Error::UnsupportedSelectionType {
            selection: selection.to_owned(),
            ty: tag.to_owned(),
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.compilers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for SelectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}
