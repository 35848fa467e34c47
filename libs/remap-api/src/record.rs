use std::any::Any;
use std::fmt;

use crate::error::ValueError;
use crate::value::{Kind, Value};

/// Static description of one record field: name, scalar kind and tags.
///
/// Tags are `(tag_name, text)` pairs declared with
/// `#[remap(tag_name = "text")]` on the field, the way a field carries
/// several annotation strings at once:
///
/// ```ignore
/// #[derive(Record, Default, Debug)]
/// struct Quote {
///     #[remap(remapper = "0", db = "quote_id")]
///     id: u64,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: Kind,
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldInfo {
    /// Text of tag `tag_name`, if the field declares it.
    pub fn tag(&self, tag_name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == tag_name)
            .map(|(_, text)| *text)
    }
}

/// A type that can sit in a record field.
///
/// Implemented for every supported primitive and for [`Value`] itself
/// (an untyped field).
pub trait Scalar: Sized {
    const KIND: Kind;

    fn into_value(self) -> Value;

    /// Take a value of a compatible kind. Integers are narrowed with `as`.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! scalar_int {
    ($variant:ident: $($ty:ty => $kind:ident),+) => {
        $(
            impl Scalar for $ty {
                const KIND: Kind = Kind::$kind;

                fn into_value(self) -> Value {
                    Value::from(self)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(v) => Ok(v as $ty),
                        other => Err(ValueError::mismatch(Kind::$kind, other.kind())),
                    }
                }
            }
        )+
    };
}

scalar_int!(Int: i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
scalar_int!(UInt: u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);
scalar_int!(Float: f32 => F32, f64 => F64);

impl Scalar for bool {
    const KIND: Kind = Kind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(ValueError::mismatch(Kind::Bool, other.kind())),
        }
    }
}

impl Scalar for String {
    const KIND: Kind = Kind::String;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(ValueError::mismatch(Kind::String, other.kind())),
        }
    }
}

impl Scalar for Value {
    const KIND: Kind = Kind::Any;

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

/// Downcasting support for record trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Fixed-shape container with named, positionally ordered scalar fields.
///
/// Usually derived with `#[derive(Record)]`, which also requires the type to
/// implement `Default` (used by [`Record::empty`]).
pub trait Record: AsAny + fmt::Debug + Send + Sync {
    /// Field table of the implementing type, in declaration order.
    fn schema() -> &'static [FieldInfo]
    where
        Self: Sized;

    /// Same table, reachable through a trait object.
    fn fields(&self) -> &'static [FieldInfo];

    /// Fresh zero-valued instance of the same type.
    fn empty(&self) -> Box<dyn Record>;

    fn get(&self, position: usize) -> Option<Value>;

    fn set(&mut self, position: usize, value: Value) -> Result<(), ValueError>;
}
