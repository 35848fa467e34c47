use std::num::{ParseFloatError, ParseIntError};

use remap_api::{Kind, Shape, ValueError};

/// Why a string could not be parsed into the target kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Int(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),

    #[error("invalid boolean literal")]
    Bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("{}unsupported conversion from {from} to {to}", in_field(.field))]
    UnsupportedType {
        field: Option<String>,
        from: Kind,
        to: Kind,
    },

    #[error("{}cannot convert {value:?} to {to}: {source}", in_field(.field))]
    ConversionFailed {
        field: Option<String>,
        value: String,
        to: Kind,
        #[source]
        source: ParseError,
    },

    #[error("unknown field name '{name}' in {container}")]
    UnknownField { name: String, container: String },

    #[error("type mismatch: expected {expected_first} or {expected_second}, got {found}")]
    TypeMismatch {
        expected_first: Shape,
        expected_second: Shape,
        found: Shape,
    },

    #[error("cannot link position {left} to position {right}: index-to-index links are ambiguous")]
    AmbiguousMapping { left: i64, right: i64 },

    #[error("tag '{tag}' needs a record on one side, provide an explicit link table")]
    TagsUnsupported { tag: String },

    #[error("cannot create {shape}: field count is unknown")]
    CannotCreate { shape: Shape },

    #[error("mapper needs two containers, got {configured}")]
    InsufficientConfiguration { configured: usize },

    #[error("both container slots are already filled")]
    SlotsFilled,

    #[error("config error: {0}")]
    Config(String),
}

fn in_field(field: &Option<String>) -> String {
    match field {
        Some(name) => format!("could not convert '{name}': "),
        None => String::new(),
    }
}

impl RemapError {
    /// Attach the name of the field being converted.
    ///
    /// Only conversion errors carry a field; a name already set is kept.
    pub fn with_field(self, name: &str) -> Self {
        match self {
            RemapError::UnsupportedType {
                field: None,
                from,
                to,
            } => RemapError::UnsupportedType {
                field: Some(name.to_string()),
                from,
                to,
            },
            RemapError::ConversionFailed {
                field: None,
                value,
                to,
                source,
            } => RemapError::ConversionFailed {
                field: Some(name.to_string()),
                value,
                to,
                source,
            },
            other => other,
        }
    }

    /// Add context to the error.
    ///
    /// For `Config`, context is prepended to the message. Other variants are
    /// returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            RemapError::Config(msg) => RemapError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<ValueError> for RemapError {
    fn from(e: ValueError) -> Self {
        match e {
            ValueError::Mismatch { expected, found } => RemapError::UnsupportedType {
                field: None,
                from: found,
                to: expected,
            },
            ValueError::NoSuchPosition(position) => RemapError::UnknownField {
                name: position.to_string(),
                container: "record".to_string(),
            },
        }
    }
}
