//! Named dataset boundaries and the demand counts that decide whether
//! they are materialized.

use indexmap::IndexMap;
use tracing::trace;

/// Demand per logical output name, scoped to one compilation.
///
/// Counts only grow while the graph is built; the assembler reads them.
#[derive(Clone, Debug, Default)]
pub struct DemandTable {
    counts: IndexMap<String, u32>,
}

impl DemandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `name` has an entry, starting at zero.
    pub fn register(&mut self, name: &str) {
        if !self.counts.contains_key(name) {
            self.counts.insert(name.to_owned(), 0);
        }
    }

    /// Record one more consumer of `name`. Returns the new count.
    pub fn request(&mut self, name: &str) -> u32 {
        let count = self.counts.entry(name.to_owned()).or_insert(0);
        *count += 1;
        trace!(output = name, count = *count, "output requested");
        *count
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Pre-aggregation data of a view.
    Raw,
    /// Data the view's marks draw.
    Main,
}

/// Payload of an output node.
///
/// `name` keys the demand table and never changes. `source` starts equal
/// to `name` and is rebound to the final dataset name during assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputNode {
    name: String,
    source: String,
    kind: OutputKind,
}

impl OutputNode {
    pub fn new(name: impl Into<String>, kind: OutputKind, demand: &mut DemandTable) -> Self {
        let name = name.into();
        demand.register(&name);
        Self {
            source: name.clone(),
            name,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Dataset name to reference this output by. Marks the output as
    /// needed.
    ///
    /// Before assembly this is the provisional name.
    pub fn get_source(&self, demand: &mut DemandTable) -> &str {
        demand.request(&self.name);
        &self.source
    }

    pub fn is_required(&self, demand: &DemandTable) -> bool {
        demand.is_required(&self.name)
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Current source without recording demand. Diagnostics only.
    pub(crate) fn peek_source(&self) -> &str {
        &self.source
    }

    pub(crate) fn clone_node(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_starts_at_zero() {
        let mut demand = DemandTable::new();
        let out = OutputNode::new("main", OutputKind::Main, &mut demand);

        assert_eq!(demand.count("main"), 0);
        assert!(!out.is_required(&demand));
    }

    #[test]
    fn get_source_increments_by_one() {
        let mut demand = DemandTable::new();
        let out = OutputNode::new("main", OutputKind::Main, &mut demand);

        assert_eq!(out.get_source(&mut demand), "main");
        assert_eq!(demand.count("main"), 1);
        out.get_source(&mut demand);
        assert_eq!(demand.count("main"), 2);
        assert!(out.is_required(&demand));
    }

    #[test]
    fn shared_name_shares_counter() {
        let mut demand = DemandTable::new();
        let a = OutputNode::new("raw", OutputKind::Raw, &mut demand);
        let b = OutputNode::new("raw", OutputKind::Raw, &mut demand);

        a.get_source(&mut demand);
        assert!(b.is_required(&demand));
        b.get_source(&mut demand);
        assert_eq!(demand.count("raw"), 2);
    }

    #[test]
    fn registering_again_keeps_count() {
        let mut demand = DemandTable::new();
        let a = OutputNode::new("raw", OutputKind::Raw, &mut demand);
        a.get_source(&mut demand);
        let _b = OutputNode::new("raw", OutputKind::Raw, &mut demand);

        assert_eq!(demand.count("raw"), 1);
    }

    #[test]
    fn set_source_leaves_demand_alone() {
        let mut demand = DemandTable::new();
        let mut out = OutputNode::new("main", OutputKind::Main, &mut demand);

        out.set_source("data_0");

        assert_eq!(demand.count("main"), 0);
        assert_eq!(out.get_source(&mut demand), "data_0");
        assert_eq!(out.name(), "main");
    }

    #[test]
    fn clone_shares_name_and_source() {
        let mut demand = DemandTable::new();
        let mut out = OutputNode::new("main", OutputKind::Main, &mut demand);
        out.set_source("cars");

        let copy = out.clone_node();
        copy.get_source(&mut demand);

        assert_eq!(copy.name(), "main");
        assert_eq!(copy.peek_source(), "cars");
        assert!(out.is_required(&demand));
    }
}
