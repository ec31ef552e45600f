//! Dump helpers for graph inspection and testing.

use std::fmt::Write;

use super::graph::{DataflowGraph, NodeId};
use super::nodes::NodeKind;
use super::output::DemandTable;

/// Printer for `DataflowGraph` as an indented forest.
pub struct GraphPrinter<'a> {
    graph: &'a DataflowGraph,
    demand: Option<&'a DemandTable>,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(graph: &'a DataflowGraph) -> Self {
        Self {
            graph,
            demand: None,
        }
    }

    /// Annotate outputs with their demand count.
    pub fn with_demand(mut self, demand: &'a DemandTable) -> Self {
        self.demand = Some(demand);
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        for &root in self.graph.roots() {
            self.format_node(w, root, 0)?;
        }
        Ok(())
    }

    fn format_node(&self, w: &mut String, id: NodeId, depth: usize) -> std::fmt::Result {
        write!(w, "{:indent$}{id} ", "", indent = depth * 2)?;
        self.format_kind(w, self.graph.kind(id))?;
        writeln!(w)?;
        for &child in self.graph.children(id) {
            self.format_node(w, child, depth + 1)?;
        }
        Ok(())
    }

    fn format_kind(&self, w: &mut String, kind: &NodeKind) -> std::fmt::Result {
        match kind {
            NodeKind::Source { data } => write!(w, "source {}", data.label()),
            NodeKind::Parse { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(f, ty)| format!("{f}:{}", ty.as_str()))
                    .collect();
                write!(w, "parse {}", parts.join(", "))
            }
            NodeKind::Formula { expr, r#as } => write!(w, "formula {} = {expr}", r#as),
            NodeKind::Filter { expr, .. } => write!(w, "filter {expr}"),
            NodeKind::Bin { field, r#as, .. } => {
                write!(w, "bin {field} -> {}, {}", r#as[0], r#as[1])
            }
            NodeKind::TimeUnit { field, unit, r#as } => {
                write!(w, "timeunit {unit}({field}) -> {}", r#as)
            }
            NodeKind::Aggregate { groupby, measures } => {
                let measures: Vec<String> = measures
                    .iter()
                    .map(|m| {
                        let field = m.field.as_deref().unwrap_or("*");
                        format!("{}({field}) -> {}", m.op, m.r#as)
                    })
                    .collect();
                write!(w, "aggregate [{}] {}", groupby.join(", "), measures.join(", "))
            }
            NodeKind::Identifier => write!(w, "identifier"),
            NodeKind::Output(output) => {
                write!(w, "output {}", output.name())?;
                if output.peek_source() != output.name() {
                    write!(w, " => {}", output.peek_source())?;
                }
                match self.demand {
                    Some(demand) => write!(w, " ({})", demand.count(output.name())),
                    None => Ok(()),
                }
            }
        }
    }
}

impl DataflowGraph {
    pub fn dump(&self) -> String {
        GraphPrinter::new(self).dump()
    }
}
