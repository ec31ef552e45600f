//! String helpers for field names and expression text.
//!
//! Field references may be nested access paths (`foo.bar`, `foo["bar"]`).
//! A backslash escapes a literal `.` inside a single path segment.

use serde_json::Value;

/// Replace every character that is not `[A-Za-z0-9_]` with `_`.
///
/// Names that start with a digit are prefixed with `_` so the result is a
/// valid identifier in the engine's expression language.
///
/// # Examples
/// ```
/// use trellis_core::utils::var_name;
/// assert_eq!(var_name("bin-mpg"), "bin_mpg");
/// assert_eq!(var_name("1a"), "_1a");
/// ```
pub fn var_name(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// JSON-quote a string for embedding in an expression.
pub fn string_value(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

/// Compact JSON form of a value.
pub fn stringify(value: &Value) -> String {
    value.to_string()
}

/// Key form of a value: numbers stay numbers, strings stay as-is, and
/// everything else becomes its JSON text.
pub fn hash(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(_) => value.clone(),
        Value::Bool(b) => Value::String(b.to_string()),
        other => Value::String(stringify(other)),
    }
}

/// Split an access path into its segments.
///
/// Handles `.` separators, bracketed segments with optional quotes, and
/// backslash escapes.
pub fn split_access_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                let unquoted = inner
                    .strip_prefix(['"', '\''])
                    .and_then(|s| s.strip_suffix(['"', '\'']))
                    .unwrap_or(&inner);
                segments.push(unquoted.to_owned());
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Guarded nested access: `foo.bar` becomes
/// `datum["foo"] && datum["foo"]["bar"]`.
pub fn access_path_with_datum(path: &str, datum: &str) -> String {
    let segments = split_access_path(path);
    let mut prefix = datum.to_owned();
    let mut guards = Vec::with_capacity(segments.len());
    for segment in &segments {
        prefix.push('[');
        prefix.push_str(&string_value(segment));
        prefix.push(']');
        guards.push(prefix.clone());
    }
    guards.join(" && ")
}

/// Flat access treating the whole path as one key: `datum["foo.bar"]`.
pub fn flat_access_with_datum(path: &str, datum: &str) -> String {
    format!("{datum}[{}]", string_value(&split_access_path(path).join(".")))
}

/// Number of segments in an access path.
pub fn count_access_path(path: &str) -> usize {
    split_access_path(path).len()
}

/// Flatten a nested path into a single escaped field name:
/// `foo["bar"].baz` becomes `foo\.bar\.baz`.
pub fn remove_path_from_field(path: &str) -> String {
    split_access_path(path)
        .iter()
        .map(|segment| segment.replace('.', "\\."))
        .collect::<Vec<_>>()
        .join("\\.")
}
