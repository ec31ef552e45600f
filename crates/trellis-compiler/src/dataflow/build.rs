//! Parse phase: lowers unit views into the dataflow forest.
//!
//! Each view becomes a chain under its data source:
//!
//! ```text
//! Source → transforms → Parse → Identifier → Output(raw) → Bin/TimeUnit → Aggregate → Output(main)
//! ```
//!
//! Views reading the same data share one source root.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::graph::{DataflowGraph, NodeId};
use super::nodes::{AggregateMeasure, NodeKind, ParseType, expr_fields, is_time_unit};
use super::output::{DemandTable, OutputKind, OutputNode};
use crate::{Error, Result};
use crate::model::{DEFAULT_MAXBINS, FieldType, FilterDef, TransformDef, UnitView, bin_field};
use crate::selection::{SELECTION_ID, SelectionResolver};

/// Output nodes created for one view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewOutputs {
    pub raw: NodeId,
    pub main: NodeId,
}

pub struct GraphBuilder<'a> {
    graph: &'a mut DataflowGraph,
    demand: &'a mut DemandTable,
    sources: IndexMap<String, NodeId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(graph: &'a mut DataflowGraph, demand: &'a mut DemandTable) -> Self {
        Self {
            graph,
            demand,
            sources: IndexMap::new(),
        }
    }

    /// Source root for the view's data, created on first use.
    pub fn source(&mut self, view: &UnitView) -> NodeId {
        let key = view.data.key();
        if let Some(&id) = self.sources.get(&key) {
            return id;
        }
        let id = self.graph.add_root(
            "source",
            NodeKind::Source {
                data: view.data.clone(),
            },
        );
        self.sources.insert(key, id);
        id
    }

    /// Build the chain for one view.
    ///
    /// Filters over selections are expanded through `resolver`, so every
    /// selection must already be parsed.
    pub fn build_view(&mut self, view: &UnitView, resolver: &SelectionResolver) -> Result<ViewOutputs> {
        let unit = view.unit_name();
        let first_new = self.graph.len();
        let mut head = self.source(view);

        for transform in &view.transform {
            head = match transform {
                TransformDef::Calculate { calculate, r#as } => self.graph.add_under(
                    head,
                    "formula",
                    NodeKind::Formula {
                        expr: calculate.clone(),
                        r#as: r#as.clone(),
                    },
                ),
                TransformDef::Filter { filter } => {
                    let expr = match filter {
                        FilterDef::Expr(expr) => expr.clone(),
                        FilterDef::Selection { selection } => resolver.predicate(selection)?,
                    };
                    let fields = expr_fields(&expr);
                    self.graph
                        .add_under(head, "filter", NodeKind::Filter { expr, fields })
                }
            };
        }

        let parse = parse_fields(view);
        if !parse.is_empty() {
            head = self
                .graph
                .add_under(head, "parse", NodeKind::Parse { fields: parse });
        }

        let needs_id = resolver
            .index()
            .in_view(&unit)
            .any(|sel| sel.project.iter().any(|p| p.field() == SELECTION_ID));
        if needs_id {
            head = self.graph.add_under(head, "identifier", NodeKind::Identifier);
        }

        let raw = OutputNode::new(format!("{unit}_raw"), OutputKind::Raw, self.demand);
        let raw = self.graph.add_under(head, "raw", NodeKind::Output(raw));
        head = raw;

        for def in view.encoding.values() {
            let Some(field) = &def.field else { continue };
            if def.aggregate.is_some() {
                continue;
            }
            if def.bin {
                let start = bin_field(field);
                let end = format!("{start}_end");
                head = self.graph.add_under(
                    head,
                    "bin",
                    NodeKind::Bin {
                        field: field.clone(),
                        r#as: [start, end],
                        maxbins: DEFAULT_MAXBINS,
                    },
                );
            } else if let Some(unit) = &def.time_unit {
                if !is_time_unit(unit) {
                    return Err(Error::InvalidModel(format!(
                        "unknown time unit `{unit}` on field `{field}`"
                    )));
                }
                head = self.graph.add_under(
                    head,
                    "timeunit",
                    NodeKind::TimeUnit {
                        field: field.clone(),
                        unit: unit.clone(),
                        r#as: def.output_field(),
                    },
                );
            }
        }

        if view.encoding.values().any(|def| def.aggregate.is_some()) {
            let mut groupby = Vec::new();
            let mut measures = Vec::new();
            for def in view.encoding.values() {
                match &def.aggregate {
                    Some(op) => measures.push(AggregateMeasure {
                        op: op.clone(),
                        field: if op == "count" { None } else { def.field.clone() },
                        r#as: def.output_field(),
                    }),
                    None if def.field.is_some() => {
                        let out = def.output_field();
                        let end = def.bin.then(|| format!("{out}_end"));
                        groupby.push(out);
                        groupby.extend(end);
                    }
                    None => {}
                }
            }
            head = self
                .graph
                .add_under(head, "aggregate", NodeKind::Aggregate { groupby, measures });
        }

        let main = OutputNode::new(format!("{unit}_main"), OutputKind::Main, self.demand);
        let main = self.graph.add_under(head, "main", NodeKind::Output(main));

        debug!(
            view = %unit,
            nodes = self.graph.len() - first_new,
            "built view dataflow"
        );
        Ok(ViewOutputs { raw, main })
    }
}

/// Coercions for encoded fields the data does not type itself.
///
/// Fields produced by `calculate` are already typed.
fn parse_fields(view: &UnitView) -> IndexMap<String, ParseType> {
    let calculated: IndexSet<&str> = view.calculated_fields().collect();
    let mut parse = IndexMap::new();
    for def in view.encoding.values() {
        let Some(field) = &def.field else { continue };
        if calculated.contains(field.as_str()) || def.aggregate.as_deref() == Some("count") {
            continue;
        }
        let ty = match def.ty {
            FieldType::Quantitative => ParseType::Number,
            FieldType::Temporal => ParseType::Date,
            FieldType::Ordinal | FieldType::Nominal => continue,
        };
        parse.entry(field.clone()).or_insert(ty);
    }
    parse
}
