use crate::error::{BrowserError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::path::Path;

/// Width every snapshot is normalized to
pub const DEFAULT_REFERENCE_WIDTH: f64 = 800.0;

/// Environment variable naming a YAML config file for [`SnapshotConfig::load`]
pub const CONFIG_FILE_ENV: &str = "PAGE_SNAPSHOT_CONFIG";

const HTML_ATTRIBUTES_KEY: &str = "htmlAttributes";
const ALL_VALUE: &str = "all";

/// Which raw HTML attributes are copied into attribute records
///
/// In YAML this is either the literal `all` or a list of names; `null`
/// means no raw attributes at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HtmlAttributes {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl HtmlAttributes {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            HtmlAttributes::All => true,
            HtmlAttributes::Only(names) => names.contains(name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHtmlAttributes {
    Keyword(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for HtmlAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<RawHtmlAttributes>::deserialize(deserializer)? {
            None => Ok(HtmlAttributes::Only(BTreeSet::new())),
            Some(RawHtmlAttributes::Keyword(value)) if value == ALL_VALUE => Ok(HtmlAttributes::All),
            Some(RawHtmlAttributes::Keyword(value)) => Err(D::Error::custom(format!(
                "'{}' is an invalid value for '{}'",
                value, HTML_ATTRIBUTES_KEY
            ))),
            Some(RawHtmlAttributes::List(names)) => Ok(HtmlAttributes::Only(names.into_iter().collect())),
        }
    }
}

impl Serialize for HtmlAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            HtmlAttributes::All => serializer.serialize_str(ALL_VALUE),
            HtmlAttributes::Only(names) => names.serialize(serializer),
        }
    }
}

/// Parameters of one extraction call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotConfig {
    /// Width absolute geometry is rescaled to
    pub reference_width: f64,

    /// Computed style properties to sample, in order
    pub css_properties: Vec<String>,

    /// Raw HTML attributes to copy
    pub html_attributes: HtmlAttributes,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            reference_width: DEFAULT_REFERENCE_WIDTH,
            css_properties: Vec::new(),
            html_attributes: HtmlAttributes::All,
        }
    }
}

impl SnapshotConfig {
    /// Config sampling the given CSS properties
    pub fn new<I, S>(css_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            css_properties: css_properties.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Builder method: set the reference width
    pub fn with_reference_width(mut self, reference_width: f64) -> Self {
        self.reference_width = reference_width;
        self
    }

    /// Builder method: restrict copied HTML attributes
    pub fn with_html_attributes(mut self, html_attributes: HtmlAttributes) -> Self {
        self.html_attributes = html_attributes;
        self
    }

    /// Reject configs that cannot produce a finite scale
    pub fn validate(&self) -> Result<()> {
        if !self.reference_width.is_finite() || self.reference_width <= 0.0 {
            return Err(BrowserError::Config(format!(
                "reference width must be a positive number, got {}",
                self.reference_width
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| BrowserError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading snapshot config '{}'", path.display());
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| BrowserError::Config(format!("Cannot read config file '{}': {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Load the file named by `PAGE_SNAPSHOT_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_FILE_ENV) {
            Some(path) => Self::from_yaml_file(path),
            None => {
                log::debug!("{} not set, using default snapshot config", CONFIG_FILE_ENV);
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.reference_width, 800.0);
        assert!(config.css_properties.is_empty());
        assert_eq!(config.html_attributes, HtmlAttributes::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_all_attributes() {
        let config = SnapshotConfig::from_yaml_str("htmlAttributes: all\ncssProperties: [color, display]").unwrap();
        assert_eq!(config.html_attributes, HtmlAttributes::All);
        assert_eq!(config.css_properties, vec!["color", "display"]);
        assert_eq!(config.reference_width, 800.0);
    }

    #[test]
    fn test_yaml_attribute_list() {
        let config = SnapshotConfig::from_yaml_str("htmlAttributes:\n  - id\n  - class\n").unwrap();
        assert!(config.html_attributes.includes("id"));
        assert!(config.html_attributes.includes("class"));
        assert!(!config.html_attributes.includes("href"));
    }

    #[test]
    fn test_yaml_null_attributes() {
        let config = SnapshotConfig::from_yaml_str("htmlAttributes: ~").unwrap();
        assert_eq!(config.html_attributes, HtmlAttributes::Only(BTreeSet::new()));
        assert!(!config.html_attributes.includes("id"));
    }

    #[test]
    fn test_yaml_invalid_keyword() {
        let err = SnapshotConfig::from_yaml_str("htmlAttributes: some").unwrap_err();
        assert!(matches!(err, BrowserError::Config(ref msg) if msg.contains("'some'")));
    }

    #[test]
    fn test_invalid_reference_width() {
        assert!(SnapshotConfig::from_yaml_str("referenceWidth: 0").is_err());
        assert!(SnapshotConfig::default().with_reference_width(-1.0).validate().is_err());
        assert!(SnapshotConfig::default().with_reference_width(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "referenceWidth: 1024\ncssProperties:\n  - font-size").unwrap();

        let config = SnapshotConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.reference_width, 1024.0);
        assert_eq!(config.css_properties, vec!["font-size"]);

        let err = SnapshotConfig::from_yaml_file("/nonexistent/snapshot.yaml").unwrap_err();
        assert!(matches!(err, BrowserError::Config(_)));
    }

    #[test]
    fn test_serialize_html_attributes() {
        let config = SnapshotConfig::new(["color"]);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["htmlAttributes"], "all");

        let only = HtmlAttributes::Only(["id".to_string()].into_iter().collect());
        assert_eq!(serde_json::to_value(&only).unwrap(), serde_json::json!(["id"]));
    }
}
