//! Rectangular brush selection over positional channels.
//!
//! Each projected channel gets a visual signal holding the brush's pixel
//! extent and a data signal holding its inverse through the channel's
//! scale. The tuple signal collects the data extents once all are set.

use serde_json::{Map, Value, json};
use tracing::warn;
use trellis_core::Channel;
use trellis_core::utils::string_value;

use super::compiler::SelectionCompiler;
use super::events::{Between, streams};
use super::single::remove_arg;
use super::{
    SelectionComponent, SignalRange, UnitContext, channel_signal_name, positional_projections,
};
use crate::model::ResolveMode;
use crate::vega::{Mark, Signal, SignalHandler};

pub const BRUSH: &str = "_brush";
pub const SCALE_TRIGGER: &str = "_scale_trigger";

pub struct IntervalCompiler;

impl SelectionCompiler for IntervalCompiler {
    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent) -> Vec<Signal> {
        let name = &sel.name;
        let has_scales = sel.binds_scales();
        let trigger = format!("{name}{SCALE_TRIGGER}");

        let mut signals = Vec::new();
        let mut intervals = Vec::new();
        let mut tuple_triggers = Vec::new();
        let mut scale_triggers = Vec::new();

        for p in &sel.project {
            let Some(channel) = p.encoding().filter(|c| c.is_positional()) else {
                warn!(selection = %name, field = p.field(), "interval selections only project x and y");
                continue;
            };
            let dname = channel_signal_name(sel, channel, SignalRange::Data);
            let vname = channel_signal_name(sel, channel, SignalRange::Visual);
            let scale = string_value(&ctx.scale_name(channel));
            let to_num = if ctx.is_continuous(channel) { "+" } else { "" };

            signals.extend(channel_signals(ctx, sel, channel));
            intervals.push(format!(
                "{{encoding: {}, field: {}, extent: {dname}}}",
                string_value(channel.as_str()),
                string_value(p.field()),
            ));
            scale_triggers.push(format!(
                "(!isArray({dname}) || ({to_num}invert({scale}, {vname})[0] === {to_num}{dname}[0] && \
                 {to_num}invert({scale}, {vname})[1] === {to_num}{dname}[1]))"
            ));
            tuple_triggers.push(dname);
        }

        // With no x or y projection there is no brush to track.
        if tuple_triggers.is_empty() {
            if !has_scales {
                signals.push(Signal::new(&trigger).value(json!({})));
            }
            signals.push(Signal::new(sel.tuple()).value(Value::Null));
            return signals;
        }

        if !has_scales {
            signals.push(Signal::new(&trigger).update(format!(
                "{} ? {trigger} : {{}}",
                scale_triggers.join(" && ")
            )));
        }

        let events: Vec<Value> = tuple_triggers.iter().map(|t| json!({ "signal": t })).collect();
        let update = format!(
            "{} ? {{unit: {}, intervals: [{}]}} : null",
            tuple_triggers.join(" && "),
            string_value(&ctx.unit_name()),
            intervals.join(", "),
        );
        signals.push(Signal::new(sel.tuple()).on(SignalHandler::new(events, update)));
        signals
    }

    fn modify_expr(&self, ctx: &UnitContext, sel: &SelectionComponent) -> String {
        format!("{}, {}", sel.tuple(), remove_arg(ctx, sel, "true"))
    }

    fn predicate(&self) -> &str {
        "vlInterval"
    }

    fn scale_domain(&self) -> &str {
        "vlIntervalDomain"
    }

    /// Wrap the view's marks with a background brush and a foreground brush
    /// that stays draggable. Scale-bound selections draw no brush.
    fn marks(&self, ctx: &UnitContext, sel: &SelectionComponent, marks: Vec<Mark>) -> Vec<Mark> {
        if sel.binds_scales() {
            return marks;
        }
        let name = &sel.name;
        let proj = positional_projections(sel);
        let store = format!("data({})", string_value(&sel.store()));

        let mut update = Map::new();
        update.insert(
            "x".into(),
            proj.x.map_or(json!({"value": 0}), |_| json!({"signal": format!("{name}_x[0]")})),
        );
        update.insert(
            "y".into(),
            proj.y.map_or(json!({"value": 0}), |_| json!({"signal": format!("{name}_y[0]")})),
        );
        update.insert(
            "x2".into(),
            proj.x.map_or(json!({"field": {"group": "width"}}), |_| {
                json!({"signal": format!("{name}_x[1]")})
            }),
        );
        update.insert(
            "y2".into(),
            proj.y.map_or(json!({"field": {"group": "height"}}), |_| {
                json!({"signal": format!("{name}_y[1]")})
            }),
        );

        // A global store holds one interval; hide the brush in other units.
        if sel.resolve == ResolveMode::Global {
            let test = format!(
                "{store}.length && {store}[0].unit === {}",
                string_value(&ctx.unit_name())
            );
            for value in update.values_mut() {
                let mut rule = json!({ "test": test });
                if let (Some(fields), Value::Object(enc)) = (rule.as_object_mut(), value.take()) {
                    fields.extend(enc);
                }
                *value = json!([rule, {"value": 0}]);
            }
        }

        let style = sel.mark.as_ref().and_then(Value::as_object).cloned().unwrap_or_default();
        let fill = style.get("fill").cloned().unwrap_or(Value::Null);
        let fill_opacity = style.get("fillOpacity").cloned().unwrap_or(Value::Null);

        let stroke_test = [
            proj.x.map(|_| format!("{name}_x[0] !== {name}_x[1]")),
            proj.y.map(|_| format!("{name}_y[0] !== {name}_y[1]")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" && ");

        let mut fg_update = update.clone();
        for (key, value) in &style {
            if key == "fill" || key == "fillOpacity" {
                continue;
            }
            fg_update.insert(
                key.clone(),
                json!([{ "test": stroke_test, "value": value }, { "value": null }]),
            );
        }

        let mut background = Mark::new(format!("{name}{BRUSH}_bg"), "rect");
        background.clip = true;
        background.encode = Some(json!({
            "enter": { "fill": {"value": fill}, "fillOpacity": {"value": fill_opacity} },
            "update": update,
        }));

        let mut foreground = Mark::new(format!("{name}{BRUSH}"), "rect");
        foreground.clip = true;
        foreground.encode = Some(json!({
            "enter": { "fill": {"value": "transparent"} },
            "update": fg_update,
        }));

        let mut out = Vec::with_capacity(marks.len() + 2);
        out.push(background);
        out.extend(marks);
        out.push(foreground);
        out
    }
}

/// Visual and data signals for one projected channel.
fn channel_signals(ctx: &UnitContext, sel: &SelectionComponent, channel: Channel) -> Vec<Signal> {
    let vname = channel_signal_name(sel, channel, SignalRange::Visual);
    let dname = channel_signal_name(sel, channel, SignalRange::Data);
    if sel.binds_scales() {
        return vec![Signal::new(dname)];
    }

    let scale = string_value(&ctx.scale_name(channel));
    let size = channel.size_signal().unwrap_or("width");
    let coord = format!("{channel}(unit)");

    // Dragging an existing brush translates it instead of starting anew.
    let brush_filter = sel.translate.as_ref().map(|_| {
        format!(
            "!event.item || event.item.mark.name !== {}",
            string_value(&format!("{}{BRUSH}", sel.name))
        )
    });

    let mut vsignal = Signal::new(&vname).value(json!([]));
    for stream in streams(&sel.events) {
        let Some(mut between) = Between::parse(&stream) else {
            warn!(selection = %sel.name, stream = %stream, "interval events must be a between stream");
            continue;
        };
        if let Some(filter) = &brush_filter {
            between = between.filter_start(filter);
        }
        vsignal = vsignal
            .on(SignalHandler::new(between.start.clone(), format!("[{coord}, {coord}]")))
            .on(SignalHandler::new(
                between.to_stream(),
                format!("[{vname}[0], clamp({coord}, 0, {size})]"),
            ));
    }

    // Pan/zoom of a continuous scale moves the brush; any other domain
    // change clears it.
    let rescale = if ctx.is_continuous(channel) {
        format!("[scale({scale}, {dname}[0]), scale({scale}, {dname}[1])]")
    } else {
        "[0, 0]".to_owned()
    };
    vsignal = vsignal.on(SignalHandler::on_signal(
        &format!("{}{SCALE_TRIGGER}", sel.name),
        rescale,
    ));

    let dsignal = Signal::new(dname).on(SignalHandler::on_signal(
        &vname,
        format!("{vname}[0] === {vname}[1] ? null : invert({scale}, {vname})"),
    ));

    vec![vsignal, dsignal]
}
