//! Point selection holding at most one tuple.

use trellis_core::utils::{access_path_with_datum, string_value};

use super::compiler::SelectionCompiler;
use super::transforms::nearest;
use super::{SelectionComponent, UnitContext};
use crate::model::ResolveMode;
use crate::vega::{Signal, SignalHandler};

pub struct SingleCompiler;

impl SelectionCompiler for SingleCompiler {
    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal> {
        point_signals(ctx, sel)
    }

    fn modify_expr(&self, ctx: &UnitContext, sel: &SelectionComponent) -> String {
        format!("{}, {}", sel.tuple(), remove_arg(ctx, sel, "true"))
    }

    fn predicate(&self) -> &str {
        "vlSingle"
    }

    fn scale_domain(&self) -> &str {
        "vlSingleDomain"
    }
}

/// Tuple signal capturing the projected values of the clicked datum.
pub(super) fn point_signals(ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal> {
    let datum = if nearest::applies(sel) {
        "(item().isVoronoi ? datum.datum : datum)"
    } else {
        "datum"
    };
    let encodings: Vec<String> = sel
        .project
        .iter()
        .map(|p| p.encoding().map_or_else(|| "null".to_owned(), |c| string_value(c.as_str())))
        .collect();
    let fields: Vec<String> = sel.project.iter().map(|p| string_value(p.field())).collect();
    let values: Vec<String> = sel
        .project
        .iter()
        .map(|p| access_path_with_datum(p.field(), datum))
        .collect();

    let update = format!(
        "datum && item().mark.marktype !== 'group' ? {{unit: {}, encodings: [{}], fields: [{}], values: [{}]}} : null",
        string_value(&ctx.unit_name()),
        encodings.join(", "),
        fields.join(", "),
        values.join(", "),
    );

    vec![
        Signal::new(sel.tuple())
            .value(serde_json::json!({}))
            .on(SignalHandler::new(sel.events.clone(), update).force()),
    ]
}

/// The `remove` argument of `modify`: everything for global selections,
/// otherwise only the tuples of this unit.
pub(super) fn remove_arg(ctx: &UnitContext, sel: &SelectionComponent, global: &str) -> String {
    match sel.resolve {
        ResolveMode::Global => global.to_owned(),
        _ => format!("{{unit: {}}}", string_value(&ctx.unit_name())),
    }
}
