//! Field correspondence between the two sides of a mapper.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::descriptor::Descriptor;
use crate::error::RemapError;
use crate::options::Options;

/// Field reference: a position, or a field name.
///
/// A negative position refers to no slot: a field linked to it stays unlinked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    Index(i64),
    Name(String),
}

impl FieldKey {
    /// Text that parses as an integer is a position.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(i) => FieldKey::Index(i),
            Err(_) => FieldKey::Name(s.to_string()),
        }
    }
}

impl From<usize> for FieldKey {
    fn from(i: usize) -> Self {
        FieldKey::Index(i as i64)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        FieldKey::parse(s)
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        FieldKey::parse(&s)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Index(i) => write!(f, "{i}"),
            FieldKey::Name(name) => f.write_str(name),
        }
    }
}

/// Options written after the counterpart, e.g. `"float_val,omit"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// `omit` or `-`: linked, but left out of whole-container copies.
    pub skip: bool,
}

impl LinkOptions {
    pub fn parse(options: &str) -> Self {
        Self {
            skip: options
                .split(',')
                .map(str::trim)
                .any(|o| o == "omit" || o == "-"),
        }
    }
}

/// Right-hand side of a link: the counterpart field and the link options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterpart {
    pub key: FieldKey,
    pub options: LinkOptions,
}

impl From<&str> for Counterpart {
    fn from(s: &str) -> Self {
        let (key, options) = match s.split_once(',') {
            Some((key, options)) => (key, LinkOptions::parse(options)),
            None => (s, LinkOptions::default()),
        };
        Counterpart {
            key: FieldKey::parse(key),
            options,
        }
    }
}

impl From<String> for Counterpart {
    fn from(s: String) -> Self {
        Counterpart::from(s.as_str())
    }
}

impl From<usize> for Counterpart {
    fn from(i: usize) -> Self {
        Counterpart {
            key: FieldKey::from(i),
            options: LinkOptions::default(),
        }
    }
}

/// One table entry. `left` refers to the first container, `right` to the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub left: FieldKey,
    pub right: FieldKey,
    pub options: LinkOptions,
}

/// Explicit field correspondence.
///
/// ```ignore
/// let table = MappingTable::new()
///     .link("IntVal", "int_val")
///     .link("FloatVal", 5usize)
///     .link(2, "StrVal,omit");
/// ```
///
/// From TOML, keys are left-hand fields and values are either a position or
/// a `"name[,options]"` string:
///
/// ```toml
/// int_val = "0"
/// str_val = "2,omit"
/// float_val = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    links: Vec<Link>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(mut self, left: impl Into<FieldKey>, right: impl Into<Counterpart>) -> Self {
        let right = right.into();
        self.links.push(Link {
            left: left.into(),
            right: right.key,
            options: right.options,
        });
        self
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MappingTable
where
    K: Into<FieldKey>,
    V: Into<Counterpart>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MappingTable::new(), |table, (left, right)| table.link(left, right))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCounterpart {
    Index(i64),
    Text(String),
}

impl From<RawCounterpart> for Counterpart {
    fn from(raw: RawCounterpart) -> Self {
        match raw {
            RawCounterpart::Index(i) => Counterpart {
                key: FieldKey::Index(i),
                options: LinkOptions::default(),
            },
            RawCounterpart::Text(s) => Counterpart::from(s),
        }
    }
}

impl<'de> Deserialize<'de> for MappingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, RawCounterpart>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(left, right)| (left, Counterpart::from(right)))
            .collect())
    }
}

/// How the two sides are linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correspondence {
    /// Read links from the record field attribute with this tag name.
    Tag(String),
    Table(MappingTable),
}

impl From<MappingTable> for Correspondence {
    fn from(table: MappingTable) -> Self {
        Correspondence::Table(table)
    }
}

impl From<&str> for Correspondence {
    fn from(tag: &str) -> Self {
        Correspondence::Tag(tag.to_string())
    }
}

/// Link the fields of `first` and `second`.
///
/// Runs once, before the descriptors are handed to a mapper. Fields that no
/// link mentions stay unlinked.
pub fn resolve(
    first: &mut Descriptor,
    second: &mut Descriptor,
    correspondence: &Correspondence,
    options: &Options,
) -> Result<(), RemapError> {
    let derived;
    let table = match correspondence {
        Correspondence::Table(table) => table,
        Correspondence::Tag(tag) => {
            derived = tag_table(first, second, tag)?;
            &derived
        }
    };

    for link in table.links() {
        apply_link(first, second, link, options)?;
    }
    Ok(())
}

/// Links declared on record fields under `tag`.
///
/// The first record among the two sides supplies the tags. When it is the
/// second side, each tag becomes the left-hand key.
fn tag_table(first: &Descriptor, second: &Descriptor, tag: &str) -> Result<MappingTable, RemapError> {
    let (fields, reverse) = match (first.record_fields(), second.record_fields()) {
        (Some(fields), _) => (fields, false),
        (None, Some(fields)) => (fields, true),
        (None, None) => {
            return Err(RemapError::TagsUnsupported {
                tag: tag.to_string(),
            });
        }
    };

    let mut links = Vec::new();
    for info in fields {
        let Some(text) = info.tag(tag).map(str::trim) else {
            continue;
        };
        if text.is_empty() || text == "-" {
            continue;
        }
        let counterpart = Counterpart::from(text);
        let own = FieldKey::Name(info.name.to_string());
        let (left, right) = if reverse {
            (counterpart.key, own)
        } else {
            (own, counterpart.key)
        };
        links.push(Link {
            left,
            right,
            options: counterpart.options,
        });
    }
    Ok(MappingTable { links })
}

fn apply_link(
    first: &mut Descriptor,
    second: &mut Descriptor,
    link: &Link,
    options: &Options,
) -> Result<(), RemapError> {
    match (&link.left, &link.right) {
        (FieldKey::Name(name), to) => link_field(first, name, second, to, link.options, options),
        (from, FieldKey::Name(name)) => link_field(second, name, first, from, link.options, options),
        (FieldKey::Index(left), FieldKey::Index(right)) => Err(RemapError::AmbiguousMapping {
            left: *left,
            right: *right,
        }),
    }
}

/// Link field `from_name` of `from` to `to_key` in `to`.
///
/// A name on both sides links both fields to each other. A position links
/// `from_name` to that slot and back-links the field declared there, if any.
fn link_field(
    from: &mut Descriptor,
    from_name: &str,
    to: &mut Descriptor,
    to_key: &FieldKey,
    link_options: LinkOptions,
    options: &Options,
) -> Result<(), RemapError> {
    let from_name = options.normalize.apply(from_name);
    let from_shape = from.shape();
    let from_field = from
        .field_mut(&from_name)
        .ok_or_else(|| RemapError::UnknownField {
            name: from_name.clone(),
            container: from_shape.to_string(),
        })?;
    let from_position = from_field.position;

    let to_field = match to_key {
        FieldKey::Index(position) => {
            let position = usize::try_from(*position).ok();
            from_field.counterpart_position = position;
            from_field.counterpart_name = None;
            from_field.skip = link_options.skip;
            position.and_then(|position| to.field_at_mut(position))
        }
        FieldKey::Name(name) => {
            let to_name = options.normalize.apply(name);
            let to_shape = to.shape();
            let to_field = to
                .field_mut(&to_name)
                .ok_or_else(|| RemapError::UnknownField {
                    name: to_name.clone(),
                    container: to_shape.to_string(),
                })?;
            from_field.counterpart_position = Some(to_field.position);
            from_field.counterpart_name = Some(to_name);
            from_field.skip = link_options.skip;
            Some(to_field)
        }
    };

    if let Some(to_field) = to_field {
        to_field.counterpart_position = Some(from_position);
        to_field.counterpart_name = Some(from_name.clone());
        to_field.skip = link_options.skip;
    }

    tracing::debug!(
        from = %from_shape,
        field = %from_name,
        to = %to.shape(),
        counterpart = %to_key,
        skip = link_options.skip,
        "fields linked"
    );
    Ok(())
}
