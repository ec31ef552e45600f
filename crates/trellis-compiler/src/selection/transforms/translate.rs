//! Dragging a brush, or panning bound scales.

use serde_json::json;
use trellis_core::Channel;

use super::scales::domain;
use super::{SelectionTransform, find_signal};
use crate::selection::events::Between;
use crate::selection::interval::BRUSH;
use crate::selection::{
    SelectionComponent, SignalRange, UnitContext, channel_signal_name, positional_projections,
};
use crate::vega::{Signal, SignalHandler};

pub const ANCHOR: &str = "_translate_anchor";
pub const DELTA: &str = "_translate_delta";

pub struct Translate;

impl SelectionTransform for Translate {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.ty == "interval" && sel.translate.is_some()
    }

    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        let name = &sel.name;
        let has_scales = sel.binds_scales();
        let anchor = format!("{name}{ANCHOR}");
        let delta = format!("{name}{DELTA}");
        let proj = positional_projections(sel);

        let events: Vec<Between> = sel
            .translate
            .iter()
            .filter_map(|s| Between::parse(s))
            .map(|b| if has_scales { b } else { b.start_on_mark(&format!("{name}{BRUSH}")) })
            .collect();

        let extent = |channel: Channel| {
            if has_scales {
                domain(ctx, channel)
            } else {
                format!("slice({})", channel_signal_name(sel, channel, SignalRange::Visual))
            }
        };
        let mut update = "{x: x(unit), y: y(unit)".to_owned();
        if proj.x.is_some() {
            update.push_str(&format!(", extent_x: {}", extent(Channel::X)));
        }
        if proj.y.is_some() {
            update.push_str(&format!(", extent_y: {}", extent(Channel::Y)));
        }
        update.push('}');

        let starts: Vec<String> = events.iter().map(|b| b.start.clone()).collect();
        let drags: Vec<String> = events.iter().map(Between::to_stream).collect();
        signals.push(
            Signal::new(&anchor)
                .value(json!({}))
                .on(SignalHandler::new(starts, update)),
        );
        signals.push(Signal::new(&delta).value(json!({})).on(SignalHandler::new(
            drags,
            format!("{{x: {anchor}.x - x(unit), y: {anchor}.y - y(unit)}}"),
        )));

        if proj.x.is_some() {
            on_delta(sel, Channel::X, &mut signals);
        }
        if proj.y.is_some() {
            on_delta(sel, Channel::Y, &mut signals);
        }
        signals
    }
}

fn on_delta(sel: &SelectionComponent, channel: Channel, signals: &mut [Signal]) {
    let has_scales = sel.binds_scales();
    let range = if has_scales { SignalRange::Data } else { SignalRange::Visual };
    let Some(i) = find_signal(signals, &channel_signal_name(sel, channel, range)) else {
        return;
    };
    let size = channel.size_signal().unwrap_or("width");
    let anchor = format!("{}{ANCHOR}", sel.name);
    let delta = format!("{}{DELTA}", sel.name);
    // Panning a scale moves its domain against the drag along x.
    let sign = if has_scales && channel == Channel::X { "-" } else { "" };
    let extent = format!("{anchor}.extent_{channel}");
    let offset = if has_scales {
        format!("{sign}{delta}.{channel} / {size}")
    } else {
        format!("{sign}{delta}.{channel} / span({extent})")
    };
    let pan = format!("panLinear({extent}, {offset})");
    let update = if has_scales { pan } else { format!("clampRange({pan}, 0, {size})") };

    signals[i].on.push(SignalHandler::on_signal(&delta, update));
}
