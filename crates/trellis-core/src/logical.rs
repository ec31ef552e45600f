//! Logical operand trees over named operands.
//!
//! Deserializes from the JSON shapes `"name"`, `{"not": op}`,
//! `{"and": [op, ...]}` and `{"or": [op, ...]}`.

use serde::Deserialize;

/// A boolean combination of leaf operands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOperand<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub enum LogicalOperand<T> {
    Leaf(T),
    Not(Box<LogicalOperand<T>>),
    And(Vec<LogicalOperand<T>>),
    Or(Vec<LogicalOperand<T>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
enum RawOperand<T> {
    Not { not: Box<RawOperand<T>> },
    And { and: Vec<RawOperand<T>> },
    Or { or: Vec<RawOperand<T>> },
    Leaf(T),
}

impl<T> From<RawOperand<T>> for LogicalOperand<T> {
    fn from(raw: RawOperand<T>) -> Self {
        match raw {
            RawOperand::Not { not } => Self::Not(Box::new((*not).into())),
            RawOperand::And { and } => Self::And(and.into_iter().map(Into::into).collect()),
            RawOperand::Or { or } => Self::Or(or.into_iter().map(Into::into).collect()),
            RawOperand::Leaf(leaf) => Self::Leaf(leaf),
        }
    }
}

impl<T> LogicalOperand<T> {
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Self) -> Self {
        Self::Not(Box::new(operand))
    }

    pub fn and(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(operands.into_iter().collect())
    }

    /// Visit every leaf, left to right.
    pub fn for_each_leaf(&self, f: &mut impl FnMut(&T)) {
        match self {
            Self::Leaf(leaf) => f(leaf),
            Self::Not(inner) => inner.for_each_leaf(f),
            Self::And(ops) | Self::Or(ops) => ops.iter().for_each(|op| op.for_each_leaf(f)),
        }
    }
}

/// Render an operand tree as expression text, expanding each leaf with `cb`.
///
/// Operands are parenthesized so the result is safe to embed anywhere:
/// `!(a)`, `(a) && (b)`, `(a) || (b)`. An empty `and` is `true`, an empty
/// `or` is `false`.
pub fn try_logical_expr<T, E>(
    op: &LogicalOperand<T>,
    cb: &mut impl FnMut(&T) -> Result<String, E>,
) -> Result<String, E> {
    match op {
        LogicalOperand::Leaf(leaf) => cb(leaf),
        LogicalOperand::Not(inner) => Ok(format!("!({})", try_logical_expr(inner, cb)?)),
        LogicalOperand::And(ops) => join(ops, " && ", "true", cb),
        LogicalOperand::Or(ops) => join(ops, " || ", "false", cb),
    }
}

/// Infallible form of [`try_logical_expr`].
pub fn logical_expr<T>(op: &LogicalOperand<T>, cb: &mut impl FnMut(&T) -> String) -> String {
    let result: Result<String, std::convert::Infallible> =
        try_logical_expr(op, &mut |leaf| Ok(cb(leaf)));
    match result {
        Ok(expr) => expr,
        Err(never) => match never {},
    }
}

fn join<T, E>(
    ops: &[LogicalOperand<T>],
    sep: &str,
    empty: &str,
    cb: &mut impl FnMut(&T) -> Result<String, E>,
) -> Result<String, E> {
    if ops.is_empty() {
        return Ok(empty.to_owned());
    }
    let parts = ops
        .iter()
        .map(|op| try_logical_expr(op, cb).map(|expr| format!("({expr})")))
        .collect::<Result<Vec<_>, E>>()?;
    Ok(parts.join(sep))
}
