use std::fmt;

use crate::value::Kind;

/// Error returned when a raw value is written into a container slot.
///
/// Raised by `Record::set`, `Sequence::set` and `Mapping::insert`. Engines
/// usually translate it into their own error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value's concrete kind cannot be stored in the slot.
    Mismatch { expected: Kind, found: Kind },
    /// The record has no field at this position.
    NoSuchPosition(usize),
}

impl ValueError {
    pub fn mismatch(expected: Kind, found: Kind) -> Self {
        Self::Mismatch { expected, found }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, found } => {
                write!(f, "cannot store a {found} value in a {expected} slot")
            }
            Self::NoSuchPosition(position) => write!(f, "no field at position {position}"),
        }
    }
}

impl std::error::Error for ValueError {}
