//! Bidirectional field mapping between records, sequences and mappings.
//!
//! A [`Mapper`] links the fields of two container shapes once, from record
//! field tags or from an explicit [`MappingTable`], and then copies values
//! between containers of those shapes in either direction, converting each
//! scalar to the kind of the destination slot.

pub mod convert;
pub mod descriptor;
pub mod error;
pub mod mapper;
pub mod options;
pub mod resolve;

pub use convert::{ConvertFn, convert};
pub use descriptor::{ContainerSpec, Descriptor, FieldDescriptor, FieldNames};
pub use error::{ParseError, RemapError};
pub use mapper::{Mapper, MapperBuilder};
pub use options::{NameCase, Options};
pub use resolve::{Correspondence, Counterpart, FieldKey, Link, LinkOptions, MappingTable};

pub use remap_api;
