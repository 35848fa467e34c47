use std::any::TypeId;

use remap_api::{Container, Record, Shape, Value};

use crate::descriptor::{ContainerSpec, Descriptor};
use crate::error::RemapError;
use crate::options::Options;
use crate::resolve::{Correspondence, resolve};

/// Bidirectional mapper between two container shapes.
///
/// Built once; every operation takes `&self`, so one mapper can be shared
/// between threads.
#[derive(Debug)]
pub struct Mapper {
    types: [Descriptor; 2],
    options: Options,
}

impl Mapper {
    /// Mapper with default [`Options`]. Without a correspondence, links are
    /// read from the default tag.
    pub fn new(
        first: ContainerSpec,
        second: ContainerSpec,
        correspondence: Option<Correspondence>,
    ) -> Result<Self, RemapError> {
        Self::with_options(first, second, correspondence, Options::default())
    }

    pub fn with_options(
        first: ContainerSpec,
        second: ContainerSpec,
        correspondence: Option<Correspondence>,
        options: Options,
    ) -> Result<Self, RemapError> {
        let mut first = Descriptor::build(first, &options)?;
        let mut second = Descriptor::build(second, &options)?;

        let correspondence =
            correspondence.unwrap_or_else(|| Correspondence::Tag(options.tag.clone()));
        resolve(&mut first, &mut second, &correspondence, &options)?;

        tracing::debug!(first = %first.shape(), second = %second.shape(), "mapper ready");
        Ok(Self {
            types: [first, second],
            options,
        })
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn descriptors(&self) -> (&Descriptor, &Descriptor) {
        (&self.types[0], &self.types[1])
    }

    /// Index of the side whose shape matches `container`.
    ///
    /// When both sides share a shape, the first one wins.
    fn side_of(&self, shape: Shape) -> Result<usize, RemapError> {
        self.types
            .iter()
            .position(|d| d.shape() == shape)
            .ok_or_else(|| self.mismatch(shape))
    }

    fn mismatch(&self, found: Shape) -> RemapError {
        RemapError::TypeMismatch {
            expected_first: self.types[0].shape(),
            expected_second: self.types[1].shape(),
            found,
        }
    }

    /// Copy every linked, non-skipped field of `source` into a fresh
    /// container of the other side.
    ///
    /// Returns `Ok(None)` when no field received a value.
    pub fn map(&self, source: &Container) -> Result<Option<Container>, RemapError> {
        let from_side = self.side_of(source.shape())?;
        let from = &self.types[from_side];
        let to = &self.types[1 - from_side];

        let mut target = to.create()?;
        let mut written = false;

        for field in to.fields() {
            let Some(position) = field.counterpart_position() else {
                continue;
            };
            if field.is_skipped() {
                continue;
            }
            let Some(value) = from.get(source, position, field.counterpart_name()) else {
                continue;
            };

            let converted = field
                .convert(&value)
                .map_err(|e| e.with_field(field.name()))?;
            if let Some(converted) = converted {
                tracing::trace!(field = field.name(), position, value = %converted, "field copied");
                to.set(&mut target, field.position(), field.name(), converted)
                    .map_err(|e| e.with_field(field.name()))?;
                written = true;
            }
        }

        Ok(written.then_some(target))
    }

    /// [`Mapper::map`] into a record of type `T`.
    pub fn map_record<T: Record>(&self, source: &Container) -> Result<Option<T>, RemapError> {
        let Some(target) = self.map(source)? else {
            return Ok(None);
        };
        let found = target.shape();
        target.into_record::<T>().map(Some).ok_or_else(|| {
            tracing::debug!(expected = std::any::type_name::<T>(), found = %found, "unexpected destination");
            self.mismatch(Shape::Record {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            })
        })
    }

    /// Raw value of `field` in `target`, without conversion.
    ///
    /// A declared sequence field past the end of `target` reads as `Null`.
    pub fn get_by_name(&self, target: &Container, field: &str) -> Result<Value, RemapError> {
        let descriptor = &self.types[self.side_of(target.shape())?];
        let name = self.options.normalize.apply(field);
        let field = descriptor
            .field(&name)
            .ok_or_else(|| unknown_field(&name, descriptor))?;
        Ok(descriptor
            .get(target, field.position(), Some(&name))
            .unwrap_or_default())
    }

    /// Write `value` into `field` of `target` as-is.
    ///
    /// The value must fit the slot's kind, otherwise `UnsupportedType`.
    pub fn set_by_name(
        &self,
        target: &mut Container,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), RemapError> {
        let descriptor = &self.types[self.side_of(target.shape())?];
        let name = self.options.normalize.apply(field);
        let field = descriptor
            .field(&name)
            .ok_or_else(|| unknown_field(&name, descriptor))?;
        descriptor
            .set(target, field.position(), &name, value.into())
            .map_err(|e| e.with_field(&name))
    }

    /// Name of the field linked to `field` on the other side.
    ///
    /// Fails with `UnknownField` when the field is unknown or was linked
    /// only by position.
    pub fn name_by_name(&self, target: &Container, field: &str) -> Result<String, RemapError> {
        let descriptor = &self.types[self.side_of(target.shape())?];
        let name = self.options.normalize.apply(field);
        descriptor
            .field(&name)
            .filter(|f| f.counterpart_position().is_some())
            .and_then(|f| f.counterpart_name())
            .map(str::to_string)
            .ok_or_else(|| unknown_field(&name, descriptor))
    }
}

fn unknown_field(name: &str, descriptor: &Descriptor) -> RemapError {
    RemapError::UnknownField {
        name: name.to_string(),
        container: descriptor.shape().to_string(),
    }
}

/// Step-by-step mapper construction.
///
/// ```ignore
/// let mapper = Mapper::builder()
///     .container(ContainerSpec::record::<Quote>())
///     .container(ContainerSpec::sequence(Kind::String).len(4))
///     .options(Options::default().with_tag("db"))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct MapperBuilder {
    slots: Vec<ContainerSpec>,
    correspondence: Option<Correspondence>,
    options: Options,
}

impl MapperBuilder {
    /// Fill the next container slot. There are two.
    pub fn container(mut self, spec: ContainerSpec) -> Self {
        self.slots.push(spec);
        self
    }

    pub fn correspondence(mut self, correspondence: impl Into<Correspondence>) -> Self {
        self.correspondence = Some(correspondence.into());
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Mapper, RemapError> {
        let configured = self.slots.len();
        if configured > 2 {
            return Err(RemapError::SlotsFilled);
        }
        let mut slots = self.slots.into_iter();
        match (slots.next(), slots.next()) {
            (Some(first), Some(second)) => {
                Mapper::with_options(first, second, self.correspondence, self.options)
            }
            _ => Err(RemapError::InsufficientConfiguration { configured }),
        }
    }
}
