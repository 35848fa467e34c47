use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValueError;
use crate::record::Record;
use crate::value::{Kind, Value};

/// Ordered sequence of scalars addressed by position.
///
/// `element` is the declared slot kind: a typed sequence (`Kind::String`)
/// only accepts values of that kind, an untyped one (`Kind::Any`) keeps
/// whatever is written into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub element: Kind,
    pub items: Vec<Value>,
}

impl Sequence {
    pub fn new(element: Kind) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// `len` zero values of `element`.
    pub fn with_len(element: Kind, len: usize) -> Self {
        Self {
            element,
            items: vec![Value::zero(element); len],
        }
    }

    pub fn from_values<I, V>(element: Kind, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            element,
            items: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Typed string sequence, the usual shape of a text row.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_values(Kind::String, values.into_iter().map(Into::into))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.items.get(position)
    }

    /// Store `value` at `position`.
    ///
    /// Returns `Ok(false)` without writing when `position` is past the end.
    pub fn set(&mut self, position: usize, value: Value) -> Result<bool, ValueError> {
        if !value.fits(self.element) {
            return Err(ValueError::mismatch(self.element, value.kind()));
        }
        match self.items.get_mut(position) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Keyed mapping of scalars addressed by string key.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub value: Kind,
    pub entries: BTreeMap<String, Value>,
}

impl Mapping {
    pub fn new(value: Kind) -> Self {
        Self {
            value,
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<I, K, V>(value: Kind, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            value,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value under `key`, or the zero value of the mapping's value kind.
    pub fn get_or_zero(&self, key: &str) -> Value {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::zero(self.value))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), ValueError> {
        if !value.fits(self.value) {
            return Err(ValueError::mismatch(self.value, value.kind()));
        }
        self.entries.insert(key.into(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concrete shape of a container, used to tell the two sides of a mapper apart.
///
/// Records are identified by their Rust type, sequences and mappings by their
/// slot kind, so a `Sequence` of strings and an untyped `Sequence` are
/// different shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Record {
        type_id: TypeId,
        type_name: &'static str,
    },
    Sequence(Kind),
    Mapping(Kind),
}

impl Shape {
    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record { .. })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record { type_name, .. } => write!(f, "record {type_name}"),
            Shape::Sequence(kind) => write!(f, "sequence<{kind}>"),
            Shape::Mapping(kind) => write!(f, "mapping<{kind}>"),
        }
    }
}

/// Any container the mapper can read from or write into.
#[derive(Debug)]
pub enum Container {
    Record(Box<dyn Record>),
    Sequence(Sequence),
    Mapping(Mapping),
}

impl Container {
    pub fn record<T: Record>(record: T) -> Self {
        Container::Record(Box::new(record))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Container::Record(record) => {
                let record: &dyn Record = record.as_ref();
                Shape::Record {
                    type_id: record.as_any().type_id(),
                    type_name: record.type_name(),
                }
            }
            Container::Sequence(seq) => Shape::Sequence(seq.element),
            Container::Mapping(map) => Shape::Mapping(map.value),
        }
    }

    pub fn as_record<T: Record>(&self) -> Option<&T> {
        match self {
            Container::Record(record) => {
                let record: &dyn Record = record.as_ref();
                record.as_any().downcast_ref::<T>()
            }
            _ => None,
        }
    }

    pub fn as_record_mut<T: Record>(&mut self) -> Option<&mut T> {
        match self {
            Container::Record(record) => {
                let record: &mut dyn Record = record.as_mut();
                record.as_any_mut().downcast_mut::<T>()
            }
            _ => None,
        }
    }

    /// Unwrap a record of type `T`.
    pub fn into_record<T: Record>(self) -> Option<T> {
        match self {
            Container::Record(record) => record.into_any().downcast::<T>().ok().map(|r| *r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Container::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn into_sequence(self) -> Option<Sequence> {
        match self {
            Container::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Container::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            Container::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Sequence> for Container {
    fn from(seq: Sequence) -> Self {
        Container::Sequence(seq)
    }
}

impl From<Mapping> for Container {
    fn from(map: Mapping) -> Self {
        Container::Mapping(map)
    }
}
