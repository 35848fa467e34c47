use serde::Deserialize;

use crate::error::RemapError;

/// Mapper configuration.
///
/// ```toml
/// tag = "db"
/// normalize = "exact"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Field attribute tag read when links are derived from a record.
    pub tag: String,

    /// How field names are normalized before lookup.
    pub normalize: NameCase,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            normalize: NameCase::default(),
        }
    }
}

fn default_tag() -> String {
    "remapper".to_string()
}

impl Options {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_normalize(mut self, normalize: NameCase) -> Self {
        self.normalize = normalize;
        self
    }

    /// Load options from a TOML file.
    pub fn load(path: &str) -> Result<Self, RemapError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RemapError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse options from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, RemapError> {
        toml::from_str(toml_str).map_err(|e| RemapError::Config(e.to_string()))
    }
}

/// Field name normalization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    #[default]
    Lower,
    Upper,
    Exact,
    /// Programmatic normalizer, not available from configuration.
    #[serde(skip)]
    Custom(fn(&str) -> String),
}

impl NameCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameCase::Lower => name.to_lowercase(),
            NameCase::Upper => name.to_uppercase(),
            NameCase::Exact => name.to_string(),
            NameCase::Custom(f) => f(name),
        }
    }
}
