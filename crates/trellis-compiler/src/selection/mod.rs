//! Selection compilation.
//!
//! A selection is a named interaction declared on a unit view. Parsing
//! turns its definition into a `SelectionComponent`; the compiler
//! registered for its type then produces signals, a store-modify
//! expression, predicate and domain templates, and optional marks.
//! Selection transforms (toggle, scale binding, translate, zoom, ...)
//! refine that output in a fixed order.

mod assemble;
mod compiler;
mod events;
mod interval;
mod multi;
mod parse;
mod resolve;
mod single;
pub mod transforms;

#[cfg(test)]
mod compiler_tests;

use indexmap::IndexMap;
use serde_json::Value;
use trellis_core::Channel;
use trellis_core::utils::var_name;

use crate::model::{EmptyMode, FieldDef, ResolveMode, UnitView};

pub use assemble::{
    assemble_top_level_signals, assemble_unit_selection_data, assemble_unit_selection_marks,
    assemble_unit_selection_signals,
};
pub use compiler::{SelectionCompiler, SelectionRegistry};
pub use events::Between;
pub use interval::IntervalCompiler;
pub use multi::MultiCompiler;
pub use parse::parse_unit_selection;
pub use resolve::{
    SelectionIndex, SelectionInstance, SelectionResolver, is_raw_selection_domain,
    raw_selection_domain,
};
pub use single::SingleCompiler;

pub const STORE: &str = "_store";
pub const TUPLE: &str = "_tuple";
pub const MODIFY: &str = "_modify";
pub const SELECTION_DOMAIN: &str = "_selection_domain_";
/// Field holding the unique tuple id point selections project by default.
pub const SELECTION_ID: &str = "_vgsid_";

/// A parsed selection, one per declared name per view.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionComponent {
    pub name: String,
    pub ty: String,
    pub events: Value,
    pub bind: Option<SelectionBind>,
    pub resolve: ResolveMode,
    pub empty: EmptyMode,
    pub project: Vec<ProjectComponent>,
    /// Field projected for each encoding channel.
    pub fields: IndexMap<Channel, String>,
    /// Channels whose scales this selection drives.
    pub scales: Vec<Channel>,
    pub toggle: Option<String>,
    pub translate: Option<String>,
    pub zoom: Option<String>,
    pub nearest: bool,
    pub mark: Option<Value>,
}

impl SelectionComponent {
    pub fn new(name: &str, ty: impl Into<String>) -> Self {
        Self {
            name: var_name(name),
            ty: ty.into(),
            events: Value::Null,
            bind: None,
            resolve: ResolveMode::Global,
            empty: EmptyMode::All,
            project: Vec::new(),
            fields: IndexMap::new(),
            scales: Vec::new(),
            toggle: None,
            translate: None,
            zoom: None,
            nearest: false,
            mark: None,
        }
    }

    pub fn store(&self) -> String {
        format!("{}{STORE}", self.name)
    }

    pub fn tuple(&self) -> String {
        format!("{}{TUPLE}", self.name)
    }

    pub fn binds_scales(&self) -> bool {
        matches!(self.bind, Some(SelectionBind::Scales))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectionBind {
    /// Drive the view's scale domains.
    Scales,
    /// One widget definition for every projected field.
    Input(Value),
    /// Widget definition per field or channel name.
    PerField(IndexMap<String, Value>),
}

impl SelectionBind {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "scales" => SelectionBind::Scales,
            Value::Object(map) if map.contains_key("input") => SelectionBind::Input(value.clone()),
            Value::Object(map) => SelectionBind::PerField(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
            other => SelectionBind::Input(other.clone()),
        }
    }
}

/// One dimension of a selection's tuples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectComponent {
    Field(String),
    Encoding { channel: Channel, field: String },
}

impl ProjectComponent {
    pub fn field(&self) -> &str {
        match self {
            ProjectComponent::Field(field) | ProjectComponent::Encoding { field, .. } => field,
        }
    }

    pub fn encoding(&self) -> Option<Channel> {
        match self {
            ProjectComponent::Field(_) => None,
            ProjectComponent::Encoding { channel, .. } => Some(*channel),
        }
    }
}

/// The unit view a selection is compiled for.
#[derive(Clone, Copy, Debug)]
pub struct UnitContext<'a> {
    pub view: &'a UnitView,
    /// The view is one of several, so its signals live in a group.
    pub composed: bool,
}

impl<'a> UnitContext<'a> {
    pub fn new(view: &'a UnitView, composed: bool) -> Self {
        Self { view, composed }
    }

    pub fn unit_name(&self) -> String {
        self.view.unit_name()
    }

    /// Name prefixed with the unit name, e.g. `marks` → `view_1_marks`.
    pub fn get_name(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.unit_name())
    }

    pub fn scale_name(&self, channel: Channel) -> String {
        self.get_name(channel.as_str())
    }

    pub fn field_def(&self, channel: Channel) -> Option<&'a FieldDef> {
        self.view.field_def(channel)
    }

    /// Whether the channel's scale is continuous and not binned.
    pub fn is_continuous(&self, channel: Channel) -> bool {
        self.field_def(channel).is_some_and(FieldDef::is_continuous)
    }

    pub fn mark(&self) -> &str {
        &self.view.mark
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalRange {
    /// Pixel coordinates.
    Visual,
    /// Data values.
    Data,
}

pub fn channel_signal_name(sel: &SelectionComponent, channel: Channel, range: SignalRange) -> String {
    let suffix = match range {
        SignalRange::Visual => channel.as_str(),
        SignalRange::Data => sel.fields.get(&channel).map_or(channel.as_str(), String::as_str),
    };
    var_name(&format!("{}_{suffix}", sel.name))
}

/// Indices of the `x` and `y` projections, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionalProjections {
    pub x: Option<usize>,
    pub y: Option<usize>,
}

pub fn positional_projections(sel: &SelectionComponent) -> PositionalProjections {
    let mut out = PositionalProjections::default();
    for (i, p) in sel.project.iter().enumerate() {
        match p.encoding() {
            Some(Channel::X) => out.x = Some(i),
            Some(Channel::Y) => out.y = Some(i),
            _ => {}
        }
    }
    out
}
