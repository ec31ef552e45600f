//! Wheel zooming of a brush, or of bound scales.

use trellis_core::Channel;
use trellis_core::utils::string_value;

use super::scales::domain;
use super::{SelectionTransform, find_signal};
use crate::selection::events::on_mark;
use crate::selection::interval::BRUSH;
use crate::selection::{
    SelectionComponent, SignalRange, UnitContext, channel_signal_name, positional_projections,
};
use crate::vega::{Signal, SignalHandler};

pub const ANCHOR: &str = "_zoom_anchor";
pub const DELTA: &str = "_zoom_delta";

pub struct Zoom;

impl SelectionTransform for Zoom {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.ty == "interval" && sel.zoom.is_some()
    }

    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        let name = &sel.name;
        let has_scales = sel.binds_scales();
        let proj = positional_projections(sel);

        let events: Vec<String> = sel
            .zoom
            .iter()
            .map(|s| if has_scales { s.clone() } else { on_mark(s, &format!("{name}{BRUSH}")) })
            .collect();

        let anchor_update = if has_scales {
            let parts: Vec<String> = [(Channel::X, proj.x), (Channel::Y, proj.y)]
                .into_iter()
                .filter(|(_, p)| p.is_some())
                .map(|(c, _)| {
                    format!("{c}: invert({}, {c}(unit))", string_value(&ctx.scale_name(c)))
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        } else {
            "{x: x(unit), y: y(unit)}".to_owned()
        };

        signals.push(
            Signal::new(format!("{name}{ANCHOR}"))
                .on(SignalHandler::new(events.clone(), anchor_update)),
        );
        signals.push(Signal::new(format!("{name}{DELTA}")).on(
            SignalHandler::new(events, "pow(1.001, event.deltaY * pow(16, event.deltaMode))")
                .force(),
        ));

        if proj.x.is_some() {
            on_delta(ctx, sel, Channel::X, &mut signals);
        }
        if proj.y.is_some() {
            on_delta(ctx, sel, Channel::Y, &mut signals);
        }
        signals
    }
}

fn on_delta(ctx: &UnitContext, sel: &SelectionComponent, channel: Channel, signals: &mut [Signal]) {
    let has_scales = sel.binds_scales();
    let range = if has_scales { SignalRange::Data } else { SignalRange::Visual };
    let signal_name = channel_signal_name(sel, channel, range);
    let Some(i) = find_signal(signals, &signal_name) else {
        return;
    };
    let size = channel.size_signal().unwrap_or("width");
    let base = if has_scales { domain(ctx, channel) } else { signal_name };
    let delta = format!("{}{DELTA}", sel.name);
    let anchor = format!("{}{ANCHOR}.{channel}", sel.name);
    let zoom = format!("zoomLinear({base}, {anchor}, {delta})");
    let update = if has_scales { zoom } else { format!("clampRange({zoom}, 0, {size})") };

    signals[i].on.push(SignalHandler::on_signal(&delta, update));
}
