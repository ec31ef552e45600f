//! Binding an interval selection to its view's scales (pan and zoom).

use tracing::warn;
use trellis_core::Channel;
use trellis_core::utils::string_value;

use super::{SelectionTransform, find_signal};
use crate::Result;
use crate::model::{ResolveMode, SelectionDef};
use crate::selection::{SelectionComponent, SignalRange, UnitContext, channel_signal_name};
use crate::vega::Signal;

pub struct Scales;

impl SelectionTransform for Scales {
    fn name(&self) -> &'static str {
        "scales"
    }

    fn has(&self, sel: &SelectionComponent) -> bool {
        sel.ty == "interval" && sel.resolve == ResolveMode::Global && sel.binds_scales()
    }

    fn parse(&self, ctx: &UnitContext, _def: &SelectionDef, sel: &mut SelectionComponent) -> Result<()> {
        let mut bound = Vec::new();
        for p in &sel.project {
            let Some(channel) = p.encoding() else { continue };
            if !ctx.is_continuous(channel) {
                warn!(
                    selection = %sel.name,
                    channel = %channel,
                    "scale bindings require continuous, unbinned scales"
                );
                continue;
            }
            bound.push(channel);
        }
        sel.scales = bound;
        Ok(())
    }

    /// In composed views the bound data signals push to the top level.
    fn signals(&self, ctx: &UnitContext, sel: &SelectionComponent, mut signals: Vec<Signal>) -> Vec<Signal> {
        if !ctx.composed {
            return signals;
        }
        for &channel in &sel.scales {
            let name = channel_signal_name(sel, channel, SignalRange::Data);
            if let Some(i) = find_signal(&signals, &name) {
                let signal = &mut signals[i];
                signal.push = Some("outer".to_owned());
                signal.value = None;
                signal.update = None;
            }
        }
        signals
    }

    fn top_level_signals(
        &self,
        ctx: &UnitContext,
        sel: &SelectionComponent,
        mut signals: Vec<Signal>,
    ) -> Vec<Signal> {
        if !ctx.composed {
            return signals;
        }
        for &channel in &sel.scales {
            let name = channel_signal_name(sel, channel, SignalRange::Data);
            if find_signal(&signals, &name).is_none() {
                signals.push(Signal::new(name));
            }
        }
        signals
    }
}

/// Current domain of the channel's scale.
pub fn domain(ctx: &UnitContext, channel: Channel) -> String {
    format!("domain({})", string_value(&ctx.scale_name(channel)))
}
