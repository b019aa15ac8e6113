use std::fmt;

use thiserror::Error;

/// Classification of a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The requested type name has no descriptor in the registry.
    UnknownType(String),
    /// A field references an enum with no descriptor in the registry.
    UnknownEnum(String),
    /// The JSON value has the wrong shape for the field kind.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A date field holds a string that is not an ISO-8601 timestamp.
    InvalidDate(String),
    /// An enum field holds a name that is not in the enum's table.
    UnknownEnumName { enum_name: String, name: String },
    /// An enum field holds a value outside the table (strict mode only).
    UnknownEnumValue { enum_name: String, value: i32 },
    /// A numeric enum value does not fit the 32-bit wire range.
    ValueOutOfRange(String),
    /// Two keys of an enum-keyed dictionary name the same member.
    DuplicateKey(String),
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::UnknownType(name) => write!(f, "unknown type {name}"),
            DecodeErrorKind::UnknownEnum(name) => write!(f, "unknown enum {name}"),
            DecodeErrorKind::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            DecodeErrorKind::InvalidDate(raw) => write!(f, "invalid date {raw:?}"),
            DecodeErrorKind::UnknownEnumName { enum_name, name } => {
                write!(f, "{name:?} is not a member of {enum_name}")
            }
            DecodeErrorKind::UnknownEnumValue { enum_name, value } => {
                write!(f, "{value} is not a member of {enum_name}")
            }
            DecodeErrorKind::ValueOutOfRange(raw) => write!(f, "enum value {raw} out of range"),
            DecodeErrorKind::DuplicateKey(key) => {
                write!(f, "dictionary key {key:?} repeats an earlier member")
            }
        }
    }
}

/// Decoding failure with the JSON path where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// JSON-path style location, e.g. `$.logs[2].createdOn`.
    pub path: String,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(path: impl Into<String>, kind: DecodeErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

impl std::error::Error for DecodeError {}

/// A field descriptor that points at a type or enum the registry does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub owner: String,
    pub field: String,
    pub target: String,
    pub is_enum: bool,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = if self.is_enum { "enum" } else { "type" };
        write!(
            f,
            "{}.{} references unknown {} {}",
            self.owner, self.field, what, self.target
        )
    }
}

/// Registry validation failure listing every dangling reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub dangling: Vec<DanglingReference>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dangling.first() {
            Some(first) if self.dangling.len() > 1 => write!(
                f,
                "{} (and {} more dangling references)",
                first,
                self.dangling.len() - 1
            ),
            Some(first) => write!(f, "{first}"),
            None => write!(f, "schema is invalid"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Convenience alias for fallible results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
