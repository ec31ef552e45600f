//! Serializes the optimized forest into dataset descriptors.
//!
//! Walks each root depth-first, accumulating transforms into a pending
//! dataset. A dataset is closed at a required output (named after it) or at
//! a branch point (named `data_<n>`); children continue in a fresh dataset
//! deriving from it. Outputs nobody requested are walked through as if
//! absent.

use indexmap::IndexSet;
use tracing::{debug, instrument};

use super::graph::{DataflowGraph, NodeId};
use super::nodes::NodeKind;
use super::output::DemandTable;
use crate::model::DataRef;
use crate::vega::{DataDescriptor, FormatDescriptor};

pub struct GraphAssembler<'a> {
    graph: &'a mut DataflowGraph,
    demand: &'a DemandTable,
    data: Vec<DataDescriptor>,
    names: IndexSet<String>,
    counter: usize,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(graph: &'a mut DataflowGraph, demand: &'a DemandTable) -> Self {
        Self {
            graph,
            demand,
            data: Vec::new(),
            names: IndexSet::new(),
            counter: 0,
        }
    }

    /// Emit datasets in dependency order: every dataset follows its source.
    #[instrument(skip_all)]
    pub fn assemble(mut self) -> Vec<DataDescriptor> {
        for root in self.graph.roots().to_vec() {
            let pending = match self.graph.kind(root) {
                NodeKind::Source { data } => source_descriptor(data),
                _ => DataDescriptor::default(),
            };
            self.walk(root, pending);
        }
        debug!(datasets = self.data.len(), "assembled dataflow");
        self.data
    }

    fn walk(&mut self, id: NodeId, mut pending: DataDescriptor) {
        match self.graph.kind(id) {
            NodeKind::Source { .. } => {}
            NodeKind::Parse { fields } if self.folds_into_format(id, &pending) => {
                let format = pending.format.get_or_insert_with(FormatDescriptor::default);
                for (field, ty) in fields {
                    format.parse.insert(field.clone(), ty.as_str().to_owned());
                }
            }
            NodeKind::Output(output) if !output.is_required(self.demand) => {
                debug!(output = output.name(), "pruned unused output");
            }
            NodeKind::Output(output) => {
                let name = output.name().to_owned();
                pending = self.close_at_output(id, &name, pending);
            }
            kind => pending.transform.extend(kind.assemble()),
        }

        let children = self.graph.children(id).to_vec();
        match children.as_slice() {
            [] => {
                if !pending.transform.is_empty() {
                    debug!(node = %id, "dropping transforms below the last output");
                }
            }
            [child] => self.walk(*child, pending),
            _ => {
                let source = self.materialize(pending, None);
                for child in children {
                    self.walk(child, DataDescriptor::derived(source.clone()));
                }
            }
        }
    }

    /// Whether a parse node can become the source's `format.parse`.
    fn folds_into_format(&self, id: NodeId, pending: &DataDescriptor) -> bool {
        let under_source = self
            .graph
            .parent(id)
            .is_some_and(|p| self.graph.kind(p).is_source());
        under_source && pending.source.is_none() && pending.transform.is_empty()
    }

    fn close_at_output(&mut self, id: NodeId, name: &str, pending: DataDescriptor) -> DataDescriptor {
        let final_name = self.materialize(pending, Some(name));
        self.graph.output_mut(id).set_source(final_name.clone());
        DataDescriptor::derived(final_name)
    }

    /// Push `pending` as a dataset and return the name to derive from.
    ///
    /// A pending dataset that only aliases another one is not emitted; its
    /// source name is returned instead.
    fn materialize(&mut self, mut pending: DataDescriptor, preferred: Option<&str>) -> String {
        if pending.name.is_empty() && pending.transform.is_empty() && pending.format.is_none() {
            if let Some(source) = &pending.source {
                return source.clone();
            }
        }
        if pending.name.is_empty() {
            pending.name = match preferred {
                Some(name) => self.unique_name(name),
                None => self.next_generated_name(),
            };
        }
        self.names.insert(pending.name.clone());
        let name = pending.name.clone();
        self.data.push(pending);
        name
    }

    fn unique_name(&mut self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_owned();
        }
        (1..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_owned())
    }

    fn next_generated_name(&mut self) -> String {
        loop {
            let name = format!("data_{}", self.counter);
            self.counter += 1;
            if !self.names.contains(&name) {
                return name;
            }
        }
    }
}

fn source_descriptor(data: &DataRef) -> DataDescriptor {
    match data {
        DataRef::Url { url, format } => DataDescriptor {
            url: Some(url.clone()),
            format: format.as_ref().and_then(|f| f.ty.clone()).map(|ty| FormatDescriptor {
                ty: Some(ty),
                ..FormatDescriptor::default()
            }),
            ..DataDescriptor::default()
        },
        DataRef::Values { values } => DataDescriptor {
            values: Some(values.clone()),
            ..DataDescriptor::default()
        },
        DataRef::Named { name } => DataDescriptor::derived(name.clone()),
    }
}
