use std::collections::HashMap;
use std::fmt;

use remap_api::{Container, FieldInfo, Kind, Mapping, Record, Sequence, Shape, Value};

use crate::convert::{ConvertFn, convert};
use crate::error::RemapError;
use crate::options::Options;

/// Field names supplied for a sequence or mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNames {
    /// No fields: the container can only be addressed through links by position.
    Unnamed,
    /// Named fields, one per position.
    Names(Vec<String>),
    /// `n` fields named `"0"` to `"n-1"`.
    Count(usize),
}

enum SpecShape {
    Record(Box<dyn Record>),
    Sequence(Kind),
    Mapping(Kind),
}

/// Description of one side of a mapper.
///
/// ```ignore
/// let row = ContainerSpec::sequence(Kind::String).names(["_f1", "int_val", "float_val"]);
/// let quote = ContainerSpec::record::<Quote>();
/// ```
pub struct ContainerSpec {
    shape: SpecShape,
    names: FieldNames,
    overrides: Vec<(String, ConvertFn)>,
}

impl ContainerSpec {
    pub fn record<T: Record + Default>() -> Self {
        Self::from_shape(SpecShape::Record(Box::new(T::default())))
    }

    pub fn sequence(element: Kind) -> Self {
        Self::from_shape(SpecShape::Sequence(element))
    }

    pub fn mapping(value: Kind) -> Self {
        Self::from_shape(SpecShape::Mapping(value))
    }

    /// Shape of an existing container. Sequences and mappings get no field names.
    pub fn of(container: &Container) -> Self {
        match container {
            Container::Record(record) => Self::from_shape(SpecShape::Record(record.empty())),
            Container::Sequence(seq) => Self::sequence(seq.element),
            Container::Mapping(map) => Self::mapping(map.value),
        }
    }

    fn from_shape(shape: SpecShape) -> Self {
        Self {
            shape,
            names: FieldNames::Unnamed,
            overrides: Vec::new(),
        }
    }

    /// Field names by position. Ignored for records.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = FieldNames::Names(names.into_iter().map(Into::into).collect());
        self
    }

    /// Field count, fields are named by their decimal position. Ignored for records.
    pub fn len(mut self, len: usize) -> Self {
        self.names = FieldNames::Count(len);
        self
    }

    pub fn field_names(&self) -> &FieldNames {
        &self.names
    }

    /// Replace the converter of field `name`.
    pub fn convert_with(mut self, name: impl Into<String>, convert: ConvertFn) -> Self {
        self.overrides.push((name.into(), convert));
        self
    }
}

impl fmt::Debug for ContainerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.shape {
            SpecShape::Record(record) => {
                let record: &dyn Record = record.as_ref();
                format!("record {}", record.type_name())
            }
            SpecShape::Sequence(kind) => format!("sequence<{kind}>"),
            SpecShape::Mapping(kind) => format!("mapping<{kind}>"),
        };
        f.debug_struct("ContainerSpec")
            .field("shape", &shape)
            .field("names", &self.names)
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

/// Per-field link and conversion state.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) position: usize,
    pub(crate) kind: Kind,
    pub(crate) counterpart_position: Option<usize>,
    pub(crate) counterpart_name: Option<String>,
    pub(crate) skip: bool,
    pub(crate) convert: ConvertFn,
}

impl FieldDescriptor {
    fn new(name: String, position: usize, kind: Kind) -> Self {
        Self {
            name,
            position,
            kind,
            counterpart_position: None,
            counterpart_name: None,
            skip: false,
            convert,
        }
    }

    /// Normalized field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Position of the linked field in the other container.
    pub fn counterpart_position(&self) -> Option<usize> {
        self.counterpart_position
    }

    /// Normalized name of the linked field, when the link was made by name.
    pub fn counterpart_name(&self) -> Option<&str> {
        self.counterpart_name.as_deref()
    }

    /// Excluded from whole-container copies.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Convert `value` to this field's kind.
    pub fn convert(&self, value: &Value) -> Result<Option<Value>, RemapError> {
        (self.convert)(value, self.kind)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("kind", &self.kind)
            .field("counterpart_position", &self.counterpart_position)
            .field("counterpart_name", &self.counterpart_name)
            .field("skip", &self.skip)
            .finish()
    }
}

enum Access {
    Record(Box<dyn Record>),
    Sequence { element: Kind, len: usize },
    Mapping(Kind),
}

/// One side of a mapper: the container shape and its fields.
pub struct Descriptor {
    shape: Shape,
    access: Access,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("shape", &self.shape)
            .field("fields", &self.fields)
            .finish()
    }
}

impl Descriptor {
    /// Build the field table of `spec`, normalizing names with `options`.
    pub fn build(spec: ContainerSpec, options: &Options) -> Result<Self, RemapError> {
        let ContainerSpec {
            shape,
            names,
            overrides,
        } = spec;

        let (shape, access, raw_fields) = match shape {
            SpecShape::Record(prototype) => {
                let record: &dyn Record = prototype.as_ref();
                let shape = Shape::Record {
                    type_id: record.as_any().type_id(),
                    type_name: record.type_name(),
                };
                let fields: Vec<(String, Kind)> = record
                    .fields()
                    .iter()
                    .map(|info| (info.name.to_string(), info.kind))
                    .collect();
                (shape, Access::Record(prototype), fields)
            }
            SpecShape::Sequence(element) => {
                let fields = named_fields(names, element);
                let access = Access::Sequence {
                    element,
                    len: fields.len(),
                };
                (Shape::Sequence(element), access, fields)
            }
            SpecShape::Mapping(value) => (
                Shape::Mapping(value),
                Access::Mapping(value),
                named_fields(names, value),
            ),
        };

        let mut descriptor = Self {
            shape,
            access,
            fields: Vec::with_capacity(raw_fields.len()),
            index: HashMap::new(),
        };

        for (position, (name, kind)) in raw_fields.into_iter().enumerate() {
            let name = options.normalize.apply(&name);
            if descriptor.index.contains_key(&name) {
                tracing::warn!(shape = %descriptor.shape, field = %name, position, "duplicate field name ignored");
                continue;
            }
            descriptor.index.insert(name.clone(), descriptor.fields.len());
            descriptor.fields.push(FieldDescriptor::new(name, position, kind));
        }

        for (name, convert) in overrides {
            let normalized = options.normalize.apply(&name);
            let shape = descriptor.shape;
            let field = descriptor
                .field_mut(&normalized)
                .ok_or_else(|| RemapError::UnknownField {
                    name: normalized.clone(),
                    container: shape.to_string(),
                })?;
            field.convert = convert;
        }

        tracing::debug!(shape = %descriptor.shape, fields = descriptor.fields.len(), "descriptor built");
        Ok(descriptor)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_record(&self) -> bool {
        self.shape.is_record()
    }

    /// Fields in position order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field by normalized name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.index.get(name).map(|&i| &mut self.fields[i])
    }

    pub(crate) fn field_at_mut(&mut self, position: usize) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.position == position)
    }

    /// Declared field table when this side is a record.
    pub fn record_fields(&self) -> Option<&'static [FieldInfo]> {
        match &self.access {
            Access::Record(prototype) => Some(prototype.fields()),
            _ => None,
        }
    }

    /// Fresh, empty container of this shape.
    pub fn create(&self) -> Result<Container, RemapError> {
        match &self.access {
            Access::Record(prototype) => Ok(Container::Record(prototype.empty())),
            Access::Sequence { element, len } => {
                if *len == 0 {
                    return Err(RemapError::CannotCreate { shape: self.shape });
                }
                Ok(Container::Sequence(Sequence::with_len(*element, *len)))
            }
            Access::Mapping(value) => Ok(Container::Mapping(Mapping::new(*value))),
        }
    }

    /// Read the slot at `position` (records, sequences) or under `name` (mappings).
    ///
    /// `None` when the slot does not exist.
    pub fn get(&self, container: &Container, position: usize, name: Option<&str>) -> Option<Value> {
        match container {
            Container::Record(record) => record.get(position),
            Container::Sequence(seq) => seq.get(position).cloned(),
            Container::Mapping(map) => {
                let name = name?;
                self.index.contains_key(name).then(|| map.get_or_zero(name))
            }
        }
    }

    /// Write the slot at `position` (records, sequences) or under `name` (mappings).
    ///
    /// Writes past the end of a sequence and to names this side does not
    /// declare are skipped.
    pub fn set(
        &self,
        container: &mut Container,
        position: usize,
        name: &str,
        value: Value,
    ) -> Result<(), RemapError> {
        match container {
            Container::Record(record) => record.set(position, value)?,
            Container::Sequence(seq) => {
                if !seq.set(position, value)? {
                    tracing::warn!(shape = %self.shape, position, len = seq.len(), "write past end of sequence skipped");
                }
            }
            Container::Mapping(map) => {
                if self.index.contains_key(name) {
                    map.insert(name, value)?;
                }
            }
        }
        Ok(())
    }
}

fn named_fields(names: FieldNames, kind: Kind) -> Vec<(String, Kind)> {
    match names {
        FieldNames::Unnamed => Vec::new(),
        FieldNames::Names(names) => names.into_iter().map(|n| (n, kind)).collect(),
        FieldNames::Count(len) => (0..len).map(|i| (i.to_string(), kind)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remap_api::Record;

    #[derive(Record, Default, Debug, PartialEq)]
    struct Sample {
        int_val: i32,
        uint_val: u16,
        str_val: String,
        float_val: f64,
        bool_val: bool,
    }

    fn build(spec: ContainerSpec) -> Descriptor {
        Descriptor::build(spec, &Options::default()).unwrap()
    }

    #[test]
    fn record_fields_in_declaration_order() {
        let desc = build(ContainerSpec::record::<Sample>());
        let names: Vec<_> = desc.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["int_val", "uint_val", "str_val", "float_val", "bool_val"]);
        assert_eq!(desc.field("float_val").unwrap().kind(), Kind::F64);
        assert_eq!(desc.field("uint_val").unwrap().position(), 1);
        assert!(desc.is_record());
    }

    #[test]
    fn record_get_set() {
        let desc = build(ContainerSpec::record::<Sample>());
        let mut target = desc.create().unwrap();
        assert_eq!(desc.get(&target, 0, None), Some(Value::Int(0)));
        desc.set(&mut target, 0, "int_val", Value::Int(-1)).unwrap();
        desc.set(&mut target, 3, "float_val", Value::Float(1.2345)).unwrap();
        assert_eq!(desc.get(&target, 0, None), Some(Value::Int(-1)));
        assert_eq!(
            target.as_record::<Sample>(),
            Some(&Sample {
                int_val: -1,
                float_val: 1.2345,
                ..Default::default()
            })
        );
    }

    #[test]
    fn typed_sequence_by_names() {
        let desc = build(
            ContainerSpec::sequence(Kind::String)
                .names(["IntVal", "UintVal", "StrVal", "FloatVal", "BoolVal"]),
        );
        assert!(desc.field("floatval").is_some());
        let mut target = desc.create().unwrap();
        assert_eq!(desc.get(&target, 2, None), Some(Value::from("")));
        desc.set(&mut target, 2, "strval", Value::from("test string")).unwrap();
        assert_eq!(desc.get(&target, 2, None), Some(Value::from("test string")));

        let err = desc.set(&mut target, 0, "intval", Value::Int(-1)).unwrap_err();
        assert!(matches!(err, RemapError::UnsupportedType { .. }));
    }

    #[test]
    fn untyped_sequence_by_count() {
        let desc = build(ContainerSpec::sequence(Kind::Any).len(5));
        let names: Vec<_> = desc.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["0", "1", "2", "3", "4"]);

        let mut target = desc.create().unwrap();
        assert_eq!(desc.get(&target, 1, None), Some(Value::Null));
        desc.set(&mut target, 1, "1", Value::UInt(100)).unwrap();
        assert_eq!(desc.get(&target, 1, None), Some(Value::UInt(100)));

        desc.set(&mut target, 9, "9", Value::Bool(true)).unwrap();
        assert_eq!(desc.get(&target, 9, None), None);
    }

    #[test]
    fn unnamed_sequence_cannot_be_created() {
        let desc = build(ContainerSpec::sequence(Kind::Any));
        assert!(matches!(desc.create(), Err(RemapError::CannotCreate { .. })));
    }

    #[test]
    fn mapping_by_name() {
        let desc = build(ContainerSpec::mapping(Kind::String).names(["StrVal", "FloatVal"]));
        let mut target = desc.create().unwrap();
        assert_eq!(desc.get(&target, 1, Some("floatval")), Some(Value::from("")));
        desc.set(&mut target, 1, "floatval", Value::from("1.2345")).unwrap();
        assert_eq!(desc.get(&target, 1, Some("floatval")), Some(Value::from("1.2345")));

        desc.set(&mut target, 7, "other", Value::from("x")).unwrap();
        assert_eq!(target.as_mapping().unwrap().len(), 1);
        assert_eq!(desc.get(&target, 7, Some("other")), None);
        assert_eq!(desc.get(&target, 1, None), None);
    }

    #[test]
    fn duplicate_names_keep_first_position() {
        let desc = build(ContainerSpec::sequence(Kind::String).names(["a", "A", "b"]));
        assert_eq!(desc.fields().len(), 2);
        assert_eq!(desc.field("a").unwrap().position(), 0);
        assert_eq!(desc.field("b").unwrap().position(), 2);
    }

    #[test]
    fn sequence_length_counts_every_declared_name() {
        let desc = build(ContainerSpec::sequence(Kind::String).names(["a", "A", "b"]));
        let mut target = desc.create().unwrap();
        assert_eq!(target.as_sequence().unwrap().len(), 3);
        desc.set(&mut target, 2, "b", Value::from("2")).unwrap();
        assert_eq!(desc.get(&target, 2, None), Some(Value::from("2")));
    }

    #[test]
    fn convert_override() {
        fn always_one(_: &Value, _: Kind) -> Result<Option<Value>, RemapError> {
            Ok(Some(Value::Int(1)))
        }
        let desc = build(ContainerSpec::record::<Sample>().convert_with("Int_Val", always_one));
        let field = desc.field("int_val").unwrap();
        assert_eq!(field.convert(&Value::from("7")).unwrap(), Some(Value::Int(1)));
    }

    #[test]
    fn convert_override_unknown_field() {
        fn noop(_: &Value, _: Kind) -> Result<Option<Value>, RemapError> {
            Ok(None)
        }
        let err = Descriptor::build(
            ContainerSpec::record::<Sample>().convert_with("missing", noop),
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RemapError::UnknownField { name, .. } if name == "missing"));
    }
}
