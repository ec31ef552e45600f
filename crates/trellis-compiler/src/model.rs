//! Normalized model handed to the compiler.
//!
//! The upstream normalizer resolves composite marks, defaults and
//! shorthands. What arrives here is a flat list of unit views, each with
//! its data reference, explicit transforms, channel bindings, and
//! selection definitions.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use trellis_core::utils::{stringify, var_name};
use trellis_core::{Channel, LogicalOperand};

/// A whole normalized specification.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NormalizedSpec {
    pub views: Vec<UnitView>,
}

/// A single unit view: one mark over one data stream.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitView {
    pub name: String,
    pub data: DataRef,
    #[serde(default)]
    pub transform: Vec<TransformDef>,
    #[serde(default)]
    pub encoding: IndexMap<Channel, FieldDef>,
    #[serde(default)]
    pub selection: IndexMap<String, SelectionDef>,
    #[serde(default = "default_mark")]
    pub mark: String,
}

fn default_mark() -> String {
    "point".to_owned()
}

impl UnitView {
    /// Sanitized name used as the prefix of every generated identifier.
    pub fn unit_name(&self) -> String {
        var_name(&self.name)
    }

    pub fn field_def(&self, channel: Channel) -> Option<&FieldDef> {
        self.encoding.get(&channel)
    }

    /// Fields introduced by `calculate` transforms.
    pub fn calculated_fields(&self) -> impl Iterator<Item = &str> {
        self.transform.iter().filter_map(|t| match t {
            TransformDef::Calculate { r#as, .. } => Some(r#as.as_str()),
            TransformDef::Filter { .. } => None,
        })
    }
}

/// Where a view's data comes from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DataRef {
    Url {
        url: String,
        #[serde(default)]
        format: Option<DataFormat>,
    },
    Values {
        values: Vec<Value>,
    },
    Named {
        name: String,
    },
}

impl DataRef {
    /// Identity used to share one source root between views.
    pub fn key(&self) -> String {
        match self {
            DataRef::Url { url, .. } => format!("url:{url}"),
            DataRef::Values { values } => format!("values:{}", stringify(&Value::Array(values.clone()))),
            DataRef::Named { name } => format!("named:{name}"),
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            DataRef::Url { url, .. } => url.clone(),
            DataRef::Values { values } => format!("values({})", values.len()),
            DataRef::Named { name } => format!("named:{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataFormat {
    #[serde(rename = "type")]
    pub ty: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransformDef {
    Calculate { calculate: String, r#as: String },
    Filter { filter: FilterDef },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterDef {
    /// Keep data items the named selections select.
    Selection { selection: LogicalOperand<String> },
    /// A raw expression over `datum`.
    Expr(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Temporal,
    Ordinal,
    Nominal,
}

impl FieldType {
    pub fn is_continuous(self) -> bool {
        matches!(self, FieldType::Quantitative | FieldType::Temporal)
    }
}

/// A channel binding.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub aggregate: Option<String>,
    #[serde(default)]
    pub bin: bool,
    #[serde(default)]
    pub time_unit: Option<String>,
    #[serde(default)]
    pub scale: Option<ScaleDef>,
}

pub const DEFAULT_MAXBINS: u32 = 10;

impl FieldDef {
    /// Name of the field the view's marks read for this channel.
    pub fn output_field(&self) -> String {
        let field = self.field.as_deref().unwrap_or("*");
        if let Some(op) = &self.aggregate {
            return if op == "count" {
                "count_*".to_owned()
            } else {
                var_name(&format!("{op}_{field}"))
            };
        }
        if self.bin {
            return bin_field(field);
        }
        if let Some(unit) = &self.time_unit {
            return var_name(&format!("{unit}_{field}"));
        }
        field.to_owned()
    }

    /// Continuous domain after binning and aggregation are applied.
    pub fn is_continuous(&self) -> bool {
        self.ty.is_continuous() && !self.bin
    }

    pub fn selection_domain(&self) -> Option<&SelectionDomain> {
        match self.scale.as_ref()?.domain.as_ref()? {
            DomainDef::Selection(d) => Some(d),
            DomainDef::Literal(_) => None,
        }
    }
}

/// Start field produced by binning `field`.
pub fn bin_field(field: &str) -> String {
    var_name(&format!("bin_maxbins_{DEFAULT_MAXBINS}_{field}"))
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ScaleDef {
    #[serde(default)]
    pub domain: Option<DomainDef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DomainDef {
    Selection(SelectionDomain),
    Literal(Value),
}

/// A scale domain driven by a selection's current extent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct SelectionDomain {
    pub selection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// How instances of one selection across views combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    #[default]
    Global,
    Union,
    Intersect,
    /// Only the most recently updated instance is active.
    Single,
}

impl ResolveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolveMode::Global => "global",
            ResolveMode::Union => "union",
            ResolveMode::Intersect => "intersect",
            ResolveMode::Single => "single",
        }
    }
}

/// What an empty selection selects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyMode {
    #[default]
    All,
    None,
}

/// A declared selection as written by the user, before defaults apply.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionDef {
    #[serde(rename = "type")]
    pub ty: String,
    pub on: Option<Value>,
    pub bind: Option<Value>,
    pub resolve: Option<ResolveMode>,
    pub empty: Option<EmptyMode>,
    pub fields: Option<Vec<String>>,
    pub encodings: Option<Vec<Channel>>,
    pub project: Option<Vec<ProjectDef>>,
    /// `true`, `false` or an expression.
    pub toggle: Option<Value>,
    /// `true`, `false` or an event stream.
    pub translate: Option<Value>,
    /// `true`, `false` or an event stream.
    pub zoom: Option<Value>,
    pub nearest: Option<bool>,
    pub mark: Option<Value>,
}

/// One explicit projection entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectDef {
    pub field: Option<String>,
    pub encoding: Option<Channel>,
}
