//! Binding single selections to input widgets.

use serde_json::Value;
use trellis_core::utils::{access_path_with_datum, string_value, var_name};

use super::{SelectionTransform, find_signal, nearest};
use crate::model::ResolveMode;
use crate::selection::{ProjectComponent, SelectionBind, SelectionComponent, UnitContext};
use crate::vega::{Signal, SignalHandler};

pub struct Inputs;

impl SelectionTransform for Inputs {
    fn name(&self) -> &'static str {
        "inputs"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.ty == "single"
            && sel.resolve == ResolveMode::Global
            && matches!(
                sel.bind,
                Some(SelectionBind::Input(_) | SelectionBind::PerField(_))
            )
    }

    /// One widget-bound signal per projected field.
    fn top_level_signals(
        &self,
        _ctx: &UnitContext,
        sel: &SelectionComponent,
        mut signals: Vec<Signal>,
    ) -> Vec<Signal> {
        let datum = if nearest::applies(sel) {
            "(item().isVoronoi ? datum.datum : datum)"
        } else {
            "datum"
        };
        for p in &sel.project {
            let name = input_signal_name(sel, p);
            if find_signal(&signals, &name).is_some() {
                continue;
            }
            let update = format!(
                "datum && item().mark.marktype !== 'group' ? {} : null",
                access_path_with_datum(p.field(), datum)
            );
            let signal = Signal::new(name)
                .value(Value::String(String::new()))
                .on(SignalHandler::new(sel.events.clone(), update))
                .bind(widget_for(sel, p));
            signals.insert(0, signal);
        }
        signals
    }

    /// The tuple follows the widgets instead of pointer events.
    fn signals(&self, _ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        let Some(i) = find_signal(&signals, &sel.tuple()) else {
            return signals;
        };
        let fields: Vec<String> = sel.project.iter().map(|p| string_value(p.field())).collect();
        let values: Vec<String> = sel.project.iter().map(|p| input_signal_name(sel, p)).collect();

        let update = if values.is_empty() {
            "null".to_owned()
        } else {
            format!(
                "{} ? {{fields: [{}], values: [{}]}} : null",
                values.join(" && "),
                fields.join(", "),
                values.join(", ")
            )
        };
        let tuple = &mut signals[i];
        tuple.update = Some(update);
        tuple.value = None;
        tuple.on.clear();
        signals
    }
}

fn input_signal_name(sel: &SelectionComponent, p: &ProjectComponent) -> String {
    var_name(&format!("{}_{}", sel.name, p.field()))
}

fn widget_for(sel: &SelectionComponent, p: &ProjectComponent) -> Value {
    match &sel.bind {
        Some(SelectionBind::PerField(map)) => map
            .get(p.field())
            .or_else(|| p.encoding().and_then(|c| map.get(c.as_str())))
            .cloned()
            .unwrap_or_else(|| Value::Object(map.clone().into_iter().collect())),
        Some(SelectionBind::Input(widget)) => widget.clone(),
        Some(SelectionBind::Scales) | None => Value::Null,
    }
}
