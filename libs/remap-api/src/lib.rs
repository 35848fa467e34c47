// Lets code generated by `#[derive(Record)]` resolve `::remap_api` inside this crate too.
extern crate self as remap_api;

pub mod container;
pub mod error;
pub mod record;
pub mod value;

pub use remap_derive::Record;

pub use container::{Container, Mapping, Sequence, Shape};
pub use error::ValueError;
pub use record::{AsAny, FieldInfo, Record, Scalar};
pub use value::{Kind, Value};
