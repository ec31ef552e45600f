//! Compilation errors.

/// Configuration errors surfaced to the caller.
///
/// Broken tree invariants are caller bugs and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A selection names a type with no registered compiler.
    #[error("unsupported selection type `{ty}` for selection `{selection}`")]
    UnsupportedSelectionType { selection: String, ty: String },

    /// A projection entry names neither (or both) of `field` and `encoding`.
    #[error("selection `{selection}`: projection {index} must set exactly one of `field` or `encoding`")]
    MalformedProjection { selection: String, index: usize },

    /// A predicate or domain references a selection no view declares.
    #[error("unknown selection `{name}`")]
    UnknownSelection { name: String },

    /// The normalized model is inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, Error>;
