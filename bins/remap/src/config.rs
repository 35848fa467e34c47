use remap_api::Kind;
use remap_engine::{ContainerSpec, Correspondence, Mapper, MappingTable, Options, RemapError};
use serde::Deserialize;

/// Root configuration, parsed from TOML.
///
/// ```toml
/// [first]
/// shape = "sequence"
/// element = "string"
/// fields = ["_skip", "id", "qty"]
///
/// [second]
/// shape = "mapping"
/// value = "i64"
/// fields = ["id", "qty"]
///
/// [links]
/// id = "id"
/// qty = "qty"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    /// Mapper options (tag name, name normalization).
    #[serde(default)]
    pub options: Options,

    pub first: ContainerConfig,
    pub second: ContainerConfig,

    /// Left keys name fields of `first`, values name fields of `second`.
    #[serde(default)]
    pub links: Option<MappingTable>,
}

/// Runtime container description.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ContainerConfig {
    Sequence {
        #[serde(default = "any_kind")]
        element: Kind,
        #[serde(default)]
        fields: Vec<String>,
        /// Field count when `fields` is empty.
        #[serde(default)]
        len: Option<usize>,
    },
    Mapping {
        #[serde(default = "any_kind")]
        value: Kind,
        fields: Vec<String>,
    },
}

fn any_kind() -> Kind {
    Kind::Any
}

impl ContainerConfig {
    pub fn spec(&self) -> ContainerSpec {
        match self {
            ContainerConfig::Sequence {
                element,
                fields,
                len,
            } => {
                let spec = ContainerSpec::sequence(*element);
                match (fields.is_empty(), len) {
                    (false, _) => spec.names(fields.iter().cloned()),
                    (true, Some(len)) => spec.len(*len),
                    (true, None) => spec,
                }
            }
            ContainerConfig::Mapping { value, fields } => {
                ContainerSpec::mapping(*value).names(fields.iter().cloned())
            }
        }
    }
}

impl MapConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, RemapError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RemapError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, RemapError> {
        toml::from_str(toml_str).map_err(|e| RemapError::Config(e.to_string()))
    }

    pub fn build(&self) -> Result<Mapper, RemapError> {
        let mut builder = Mapper::builder()
            .container(self.first.spec())
            .container(self.second.spec())
            .options(self.options.clone());
        if let Some(links) = &self.links {
            builder = builder.correspondence(Correspondence::Table(links.clone()));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [options]
        normalize = "exact"

        [first]
        shape = "mapping"
        value = "f64"
        fields = ["Bid", "Ask"]

        [second]
        shape = "sequence"
        element = "string"
        len = 3

        [links]
        Bid = 1
        Ask = "2,omit"
    "#;

    #[test]
    fn parse_full_config() {
        let config = MapConfig::parse(CONFIG).unwrap();
        assert!(matches!(
            &config.first,
            ContainerConfig::Mapping { value: Kind::F64, fields } if fields == &["Bid", "Ask"]
        ));
        assert!(matches!(
            config.second,
            ContainerConfig::Sequence {
                element: Kind::String,
                len: Some(3),
                ..
            }
        ));
        assert_eq!(config.links.as_ref().map(MappingTable::len), Some(2));
    }

    #[test]
    fn build_links_by_table() {
        let mapper = MapConfig::parse(CONFIG).unwrap().build().unwrap();
        let (first, second) = mapper.descriptors();
        assert_eq!(second.fields().len(), 3);
        assert_eq!(first.field("Bid").unwrap().counterpart_position(), Some(1));
        assert!(first.field("Ask").unwrap().is_skipped());
        assert_eq!(second.field("1").unwrap().counterpart_name(), Some("Bid"));
    }

    #[test]
    fn element_defaults_to_any() {
        let config = MapConfig::parse(
            r#"
            first = { shape = "mapping", fields = ["a"] }
            second = { shape = "sequence", len = 2 }
            links = { a = 0 }
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.second,
            ContainerConfig::Sequence {
                element: Kind::Any,
                ..
            }
        ));
        assert!(matches!(
            config.first,
            ContainerConfig::Mapping {
                value: Kind::Any,
                ..
            }
        ));
    }

    #[test]
    fn runtime_containers_need_links() {
        let config = MapConfig::parse(
            r#"
            first = { shape = "sequence", len = 2 }
            second = { shape = "sequence", len = 2 }
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build(),
            Err(RemapError::TagsUnsupported { .. })
        ));
    }

    #[test]
    fn unknown_shape_is_config_error() {
        let err = MapConfig::parse(
            r#"
            first = { shape = "tree" }
            second = { shape = "sequence" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RemapError::Config(_)));
    }
}
