//! Node payloads and their field dependencies.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde_json::json;
use trellis_core::utils::{access_path_with_datum, var_name};

use super::output::OutputNode;
use crate::model::DataRef;
use crate::selection::SELECTION_ID;
use crate::vega::TransformDescriptor;

/// Ordered set of field names.
pub type FieldSet = IndexSet<String>;

/// Behavior every node payload provides.
pub trait DataflowNode {
    /// Copy of the payload, without any structural links.
    ///
    /// Output payloads keep their logical name and thus share demand.
    fn clone_node(&self) -> Self;

    /// Fields this node introduces.
    fn produced_fields(&self) -> FieldSet;

    /// Fields this node reads.
    fn dependent_fields(&self) -> FieldSet;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseType {
    Number,
    Boolean,
    Date,
    String,
}

impl ParseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseType::Number => "number",
            ParseType::Boolean => "boolean",
            ParseType::Date => "date",
            ParseType::String => "string",
        }
    }

    fn coercion(self) -> &'static str {
        match self {
            ParseType::Number => "toNumber",
            ParseType::Boolean => "toBoolean",
            ParseType::Date => "toDate",
            ParseType::String => "toString",
        }
    }
}

/// One aggregate output column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateMeasure {
    pub op: String,
    /// `None` for `count`.
    pub field: Option<String>,
    pub r#as: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Root dataset.
    Source { data: DataRef },
    /// Type coercion per field.
    Parse { fields: IndexMap<String, ParseType> },
    Formula { expr: String, r#as: String },
    /// `fields` are the fields `expr` reads.
    Filter { expr: String, fields: FieldSet },
    Bin {
        field: String,
        r#as: [String; 2],
        maxbins: u32,
    },
    TimeUnit {
        field: String,
        unit: String,
        r#as: String,
    },
    Aggregate {
        groupby: Vec<String>,
        measures: Vec<AggregateMeasure>,
    },
    /// Adds a unique tuple id for point selections.
    Identifier,
    Output(OutputNode),
}

impl NodeKind {
    pub fn as_output(&self) -> Option<&OutputNode> {
        match self {
            NodeKind::Output(output) => Some(output),
            _ => None,
        }
    }

    pub fn as_output_mut(&mut self) -> Option<&mut OutputNode> {
        match self {
            NodeKind::Output(output) => Some(output),
            _ => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, NodeKind::Source { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, NodeKind::Parse { .. })
    }

    /// Transforms this node contributes to its dataset.
    ///
    /// Sources and outputs contribute none. Parse nodes emit formulas here;
    /// directly under a source the assembler folds them into the format.
    pub fn assemble(&self) -> Vec<TransformDescriptor> {
        match self {
            NodeKind::Source { .. } | NodeKind::Output(_) => Vec::new(),
            NodeKind::Parse { fields } => fields
                .iter()
                .map(|(field, ty)| TransformDescriptor::Formula {
                    expr: format!("{}({})", ty.coercion(), access_path_with_datum(field, "datum")),
                    r#as: field.clone(),
                })
                .collect(),
            NodeKind::Formula { expr, r#as } => vec![TransformDescriptor::Formula {
                expr: expr.clone(),
                r#as: r#as.clone(),
            }],
            NodeKind::Filter { expr, .. } => vec![TransformDescriptor::Filter { expr: expr.clone() }],
            NodeKind::Bin {
                field,
                r#as,
                maxbins,
            } => {
                let prefix = var_name(&r#as[0]);
                let extent = format!("{prefix}_extent");
                vec![
                    TransformDescriptor::Extent {
                        field: field.clone(),
                        signal: extent.clone(),
                    },
                    TransformDescriptor::Bin {
                        field: field.clone(),
                        r#as: r#as.clone(),
                        signal: format!("{prefix}_bins"),
                        extent: json!({ "signal": extent }),
                        maxbins: *maxbins,
                    },
                ]
            }
            NodeKind::TimeUnit { field, unit, r#as } => vec![TransformDescriptor::Formula {
                expr: time_unit_expr(unit, field),
                r#as: r#as.clone(),
            }],
            NodeKind::Aggregate { groupby, measures } => vec![TransformDescriptor::Aggregate {
                groupby: groupby.clone(),
                ops: measures.iter().map(|m| m.op.clone()).collect(),
                fields: measures.iter().map(|m| m.field.clone()).collect(),
                r#as: measures.iter().map(|m| m.r#as.clone()).collect(),
            }],
            NodeKind::Identifier => vec![TransformDescriptor::Identifier {
                r#as: SELECTION_ID.to_owned(),
            }],
        }
    }
}

impl DataflowNode for NodeKind {
    fn clone_node(&self) -> Self {
        match self {
            NodeKind::Source { data } => NodeKind::Source { data: data.clone() },
            NodeKind::Parse { fields } => NodeKind::Parse {
                fields: fields.clone(),
            },
            NodeKind::Formula { expr, r#as } => NodeKind::Formula {
                expr: expr.clone(),
                r#as: r#as.clone(),
            },
            NodeKind::Filter { expr, fields } => NodeKind::Filter {
                expr: expr.clone(),
                fields: fields.clone(),
            },
            NodeKind::Bin {
                field,
                r#as,
                maxbins,
            } => NodeKind::Bin {
                field: field.clone(),
                r#as: r#as.clone(),
                maxbins: *maxbins,
            },
            NodeKind::TimeUnit { field, unit, r#as } => NodeKind::TimeUnit {
                field: field.clone(),
                unit: unit.clone(),
                r#as: r#as.clone(),
            },
            NodeKind::Aggregate { groupby, measures } => NodeKind::Aggregate {
                groupby: groupby.clone(),
                measures: measures.clone(),
            },
            NodeKind::Identifier => NodeKind::Identifier,
            NodeKind::Output(output) => NodeKind::Output(output.clone_node()),
        }
    }

    fn produced_fields(&self) -> FieldSet {
        match self {
            NodeKind::Source { .. } | NodeKind::Filter { .. } | NodeKind::Output(_) => {
                FieldSet::new()
            }
            NodeKind::Parse { fields } => fields.keys().cloned().collect(),
            NodeKind::Formula { r#as, .. } | NodeKind::TimeUnit { r#as, .. } => {
                FieldSet::from([r#as.clone()])
            }
            NodeKind::Bin { r#as, .. } => r#as.iter().cloned().collect(),
            NodeKind::Aggregate { groupby, measures } => groupby
                .iter()
                .cloned()
                .chain(measures.iter().map(|m| m.r#as.clone()))
                .collect(),
            NodeKind::Identifier => FieldSet::from([SELECTION_ID.to_owned()]),
        }
    }

    fn dependent_fields(&self) -> FieldSet {
        match self {
            NodeKind::Source { .. } | NodeKind::Identifier | NodeKind::Output(_) => {
                FieldSet::new()
            }
            NodeKind::Parse { fields } => fields.keys().cloned().collect(),
            NodeKind::Formula { expr, .. } => expr_fields(expr),
            NodeKind::Filter { fields, .. } => fields.clone(),
            NodeKind::Bin { field, .. } | NodeKind::TimeUnit { field, .. } => {
                FieldSet::from([field.clone()])
            }
            NodeKind::Aggregate { groupby, measures } => groupby
                .iter()
                .cloned()
                .chain(measures.iter().filter_map(|m| m.field.clone()))
                .collect(),
        }
    }
}

/// `datum.name`, `datum["name"]` or `datum['name']`, not preceded by an
/// identifier or member access.
static DATUM_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[^\w$.])datum(?:\.([A-Za-z_$][\w$]*)|\[\s*(?:"([^"]*)"|'([^']*)')\s*\])"#,
    )
    .expect("datum field pattern is valid")
});

/// Fields an expression reads from `datum`.
pub fn expr_fields(expr: &str) -> FieldSet {
    DATUM_FIELD_RE
        .captures_iter(expr)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Time units a `timeUnit` encoding may name, without the `utc` prefix.
pub const TIME_UNITS: &[&str] = &[
    "year",
    "quarter",
    "month",
    "day",
    "date",
    "hours",
    "minutes",
    "seconds",
    "milliseconds",
    "yearquarter",
    "yearquartermonth",
    "yearmonth",
    "yearmonthdate",
    "yearmonthdatehours",
    "yearmonthdatehoursminutes",
    "yearmonthdatehoursminutesseconds",
    "quartermonth",
    "monthdate",
    "hoursminutes",
    "hoursminutesseconds",
    "minutesseconds",
    "secondsmilliseconds",
];

pub fn is_time_unit(unit: &str) -> bool {
    TIME_UNITS.contains(&unit.strip_prefix("utc").unwrap_or(unit))
}

fn contains_time_unit(full: &str, unit: &str) -> bool {
    match full.find(unit) {
        // `seconds` inside `milliseconds` does not count.
        Some(index) => unit != "seconds" || index == 0 || !full[..index].ends_with('i'),
        None => false,
    }
}

/// Expression truncating `field` to `unit` (e.g. `yearmonth`).
///
/// Parts the unit omits fall back to a fixed date in 2012 so that
/// truncated values stay comparable. Day of week maps onto the first week
/// of 2006, which starts on a Sunday. `unit` must pass [`is_time_unit`].
pub fn time_unit_expr(unit: &str, field: &str) -> String {
    let utc = if unit.starts_with("utc") { "utc" } else { "" };
    let field_ref = access_path_with_datum(field, "datum");
    let part = |p: &str| contains_time_unit(unit, p).then(|| format!("{utc}{p}({field_ref})"));

    let day = part("day");
    let year = match (&day, part("year")) {
        (Some(_), _) => "2006".to_owned(),
        (None, Some(year)) => year,
        (None, None) => "2012".to_owned(),
    };
    let month = match (part("quarter"), part("month")) {
        (_, Some(month)) => month,
        (Some(_), None) => format!("({utc}quarter({field_ref})-1)*3"),
        (None, None) => "0".to_owned(),
    };
    let date = match (day, part("date")) {
        (Some(day), _) => format!("{day}+1"),
        (None, Some(date)) => date,
        (None, None) => "1".to_owned(),
    };
    let rest = ["hours", "minutes", "seconds", "milliseconds"]
        .map(|p| part(p).unwrap_or_else(|| "0".to_owned()));

    let ctor = if utc.is_empty() { "datetime" } else { "utcdatetime" };
    format!("{ctor}({year}, {month}, {date}, {})", rest.join(", "))
}
