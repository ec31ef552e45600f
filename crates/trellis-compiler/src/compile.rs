//! The compilation pipeline.
//!
//! ```text
//! parse selections → build dataflow → request outputs → optimize → assemble
//!                  → selection signals/marks/stores → predicates, scale domains
//! ```
//!
//! Everything mutable (graph, demand table, selection index) is created
//! per call, so two compilations never share state.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use trellis_core::LogicalOperand;

use crate::config::CompileConfig;
use crate::dataflow::{
    DataflowGraph, DemandTable, GraphAssembler, GraphBuilder, GraphOptimizer, ViewOutputs,
};
use crate::model::NormalizedSpec;
use crate::selection::{
    SelectionComponent, SelectionIndex, SelectionRegistry, SelectionResolver, SignalRange,
    UnitContext, assemble_top_level_signals, assemble_unit_selection_data,
    assemble_unit_selection_marks, assemble_unit_selection_signals, channel_signal_name,
    parse_unit_selection, raw_selection_domain,
};
use crate::vega::{DataDescriptor, Mark, Signal};
use crate::Result;

/// Everything the engine needs from one compilation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompiledSpec {
    pub data: Vec<DataDescriptor>,
    pub signals: Vec<Signal>,
    pub marks: Vec<Mark>,
    /// Predicate expression per selection name.
    pub predicates: IndexMap<String, String>,
    /// Domain override per scale name.
    pub scale_domains: IndexMap<String, Value>,
}

/// Compiles normalized specs with a fixed configuration and registry.
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompileConfig,
    registry: SelectionRegistry,
}

impl Compiler {
    pub fn new(config: CompileConfig) -> Self {
        Self {
            config,
            registry: SelectionRegistry::with_defaults(),
        }
    }

    pub fn with_registry(config: CompileConfig, registry: SelectionRegistry) -> Self {
        Self { config, registry }
    }

    pub fn registry_mut(&mut self) -> &mut SelectionRegistry {
        &mut self.registry
    }

    #[instrument(skip_all, fields(views = spec.views.len()))]
    pub fn compile(&self, spec: &NormalizedSpec) -> Result<CompiledSpec> {
        let composed = spec.views.len() > 1;

        let mut index = SelectionIndex::new();
        let mut selections = Vec::with_capacity(spec.views.len());
        for view in &spec.views {
            let ctx = UnitContext::new(view, composed);
            let parsed = parse_unit_selection(
                &ctx,
                &view.selection,
                &self.registry,
                &self.config.selection,
            )?;
            for sel in parsed.values() {
                index.insert(ctx.unit_name(), sel.clone());
            }
            selections.push(parsed);
        }
        let resolver = SelectionResolver::new(&self.registry, &index);

        let mut graph = DataflowGraph::new();
        let mut demand = DemandTable::new();
        let outputs = {
            let mut builder = GraphBuilder::new(&mut graph, &mut demand);
            spec.views
                .iter()
                .map(|view| builder.build_view(view, &resolver))
                .collect::<Result<Vec<ViewOutputs>>>()?
        };
        // Each view's marks draw from its main output.
        for out in &outputs {
            graph.output(out.main).get_source(&mut demand);
        }
        debug!(nodes = graph.len(), roots = graph.roots().len(), "built dataflow");

        if self.config.optimize {
            GraphOptimizer::new(&mut graph, &demand)
                .max_iterations(self.config.max_optimize_iterations)
                .run();
        }
        let mut data = GraphAssembler::new(&mut graph, &demand).assemble();

        let mut top_signals = Vec::new();
        let mut unit_signals = Vec::new();
        let mut marks = Vec::new();
        for ((view, sels), out) in spec.views.iter().zip(&selections).zip(&outputs) {
            let ctx = UnitContext::new(view, composed);
            let from = graph.output(out.main).get_source(&mut demand).to_owned();
            let primary = Mark::new(ctx.get_name("marks"), view.mark.clone()).from_data(from);

            let view_marks = assemble_unit_selection_marks(&ctx, sels, &self.registry, vec![primary])?;
            let view_signals = assemble_unit_selection_signals(&ctx, sels, &self.registry, Vec::new())?;
            top_signals = assemble_top_level_signals(&ctx, sels, &self.registry, top_signals)?;
            data = assemble_unit_selection_data(sels, data);

            if composed {
                let mut group = Mark::new(ctx.get_name("group"), "group");
                group.signals = view_signals;
                group.marks = view_marks;
                marks.push(group);
            } else {
                unit_signals.extend(view_signals);
                marks.extend(view_marks);
            }
        }

        let mut predicates = IndexMap::new();
        for name in index.names() {
            let expr = resolver.predicate(&LogicalOperand::leaf(name.to_owned()))?;
            predicates.insert(name.to_owned(), expr);
        }

        let scale_domains = self.scale_domains(spec, &selections, &resolver)?;

        top_signals.extend(unit_signals);
        debug!(
            datasets = data.len(),
            signals = top_signals.len(),
            marks = marks.len(),
            "compiled"
        );
        Ok(CompiledSpec {
            data,
            signals: top_signals,
            marks,
            predicates,
            scale_domains,
        })
    }

    /// Domains driven by selections: scales bound to an interval, and
    /// channels whose `scale.domain` names a selection.
    fn scale_domains(
        &self,
        spec: &NormalizedSpec,
        selections: &[IndexMap<String, SelectionComponent>],
        resolver: &SelectionResolver,
    ) -> Result<IndexMap<String, Value>> {
        let composed = spec.views.len() > 1;
        let mut domains = IndexMap::new();
        for (view, sels) in spec.views.iter().zip(selections) {
            let ctx = UnitContext::new(view, composed);
            for sel in sels.values() {
                for &channel in &sel.scales {
                    let signal = channel_signal_name(sel, channel, SignalRange::Data);
                    domains.insert(ctx.scale_name(channel), serde_json::json!({ "signal": signal }));
                }
            }
            for (&channel, def) in &view.encoding {
                let Some(domain) = def.selection_domain() else { continue };
                let raw = raw_selection_domain(domain);
                let resolved = resolver.selection_scale_domain(&ctx.unit_name(), &raw)?;
                domains.insert(ctx.scale_name(channel), resolved);
            }
        }
        Ok(domains)
    }
}

/// Compile `spec` with the default selection types.
pub fn compile(spec: &NormalizedSpec, config: &CompileConfig) -> Result<CompiledSpec> {
    Compiler::new(config.clone()).compile(spec)
}
