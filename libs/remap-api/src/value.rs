use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar kind of a field slot or of a concrete value.
///
/// Widths matter only on write: values are carried in the widest
/// representation (`i64`, `u64`, `f64`) and narrowed when they land in a
/// slot of a smaller kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Untyped slot, holds whatever concrete value is written into it.
    Any,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
}

impl Kind {
    pub fn is_signed(self) -> bool {
        matches!(self, Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64 | Kind::Isize)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Kind::U8 | Kind::U16 | Kind::U32 | Kind::U64 | Kind::Usize)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::F32 | Kind::F64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_signed() || self.is_unsigned() || self.is_float()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Any => "any",
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::String => "string",
        };
        f.write_str(name)
    }
}

/// Dynamic scalar value.
///
/// Strategy by type:
/// - Integers: signed and unsigned are kept apart, both at full 64-bit width
/// - Floats: always `f64`, `f32` slots round-trip through `f32` on write
/// - `Null`: the zero value of an untyped slot, converts to "no value"
///
/// Serializes as a plain JSON scalar (`null`, `true`, `-1`, `1.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Concrete kind of this value. `Null` has no concrete kind and reports `Any`.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::I64,
            Value::UInt(_) => Kind::U64,
            Value::Float(_) => Kind::F64,
            Value::Str(_) => Kind::String,
        }
    }

    /// Zero value of a slot of `kind`.
    pub fn zero(kind: Kind) -> Value {
        match kind {
            Kind::Any => Value::Null,
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::Str(String::new()),
            k if k.is_signed() => Value::Int(0),
            k if k.is_unsigned() => Value::UInt(0),
            _ => Value::Float(0.0),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if this value can be stored as-is in a slot of `kind`.
    pub fn fits(&self, kind: Kind) -> bool {
        match (self, kind) {
            (_, Kind::Any) => true,
            (Value::Bool(_), Kind::Bool) => true,
            (Value::Str(_), Kind::String) => true,
            (Value::Int(_), k) => k.is_signed(),
            (Value::UInt(_), k) => k.is_unsigned(),
            (Value::Float(_), k) => k.is_float(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $repr:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $repr)
                }
            }
        )+
    };
}

value_from!(Int as i64: i8, i16, i32, i64, isize);
value_from!(UInt as u64: u8, u16, u32, u64, usize);
value_from!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
