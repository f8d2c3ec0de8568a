//! Editor configuration: extra or overriding tags and render options.
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "tags": {
//!     "underline": { "open": "<u>", "close": "</u>" },
//!     "quote": { "open": "> {value}\n", "block": true, "validator": "^\\w+$" }
//!   },
//!   "render": { "escape_text": true }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::{OpenTemplate, TagDefinition, TagRegistry, Validator};
use crate::render::RenderOptions;

/// Placeholder in a [`TagSpec::open`] template replaced by the tag argument.
pub const VALUE_PLACEHOLDER: &str = "{value}";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tags added on top of the defaults; same-named entries replace them.
    pub tags: BTreeMap<String, TagSpec>,
    pub render: RenderOptions,
}

/// Data form of a [`TagDefinition`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    /// Opening token; a template when it contains `{value}`.
    pub open: String,
    #[serde(default)]
    pub close: String,
    #[serde(default)]
    pub block: bool,
    /// Regex the argument must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl TagSpec {
    pub fn to_definition(&self, name: &str) -> Result<TagDefinition, ConfigError> {
        let open = if self.open.contains(VALUE_PLACEHOLDER) {
            let template = self.open.clone();
            OpenTemplate::computed(move |value| template.replace(VALUE_PLACEHOLDER, value))
        } else {
            OpenTemplate::literal(self.open.clone())
        };

        let mut definition = if self.block {
            TagDefinition::block(name, open)
        } else {
            TagDefinition::inline(name, open, self.close.clone())
        };

        if let Some(pattern) = &self.validator {
            let validator =
                Validator::pattern(pattern).map_err(|source| ConfigError::InvalidValidator {
                    tag: name.into(),
                    source,
                })?;
            definition = definition.with_validator(validator);
        }
        Ok(definition)
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            target: "richtag::config",
            path = %path.display(),
            tags = config.tags.len(),
            "loaded editor config"
        );
        Ok(config)
    }

    /// Default tags overlaid with the configured ones.
    pub fn registry(&self) -> Result<TagRegistry, ConfigError> {
        let definitions = self
            .tags
            .iter()
            .map(|(name, spec)| spec.to_definition(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TagRegistry::builder().tags(definitions).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_defaults() {
        let config = EditorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.registry().unwrap().len(), 6);
    }

    #[test]
    fn test_config_adds_and_overrides_tags() {
        let config = EditorConfig::from_json_str(
            r#"{
                "tags": {
                    "underline": { "open": "<u>", "close": "</u>" },
                    "bold": { "open": "**", "close": "**" }
                },
                "render": { "escape_text": true }
            }"#,
        )
        .unwrap();
        assert!(config.render.escape_text);

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 7);
        let bold = registry.resolve("bold", None).unwrap();
        assert_eq!((bold.open.as_str(), bold.close.as_str()), ("**", "**"));
        assert!(registry.resolve("underline", None).is_ok());
    }

    #[test]
    fn test_value_placeholder_and_validator() {
        let config = EditorConfig::from_json_str(
            r#"{ "tags": { "quote": { "open": "> {value}\n", "block": true, "validator": "^\\w+$" } } }"#,
        )
        .unwrap();
        let registry = config.registry().unwrap();
        let quote = registry.resolve("quote", Some("alice")).unwrap();
        assert_eq!(quote.open, "> alice\n");
        assert!(quote.is_block);
        assert!(registry.resolve("quote", Some("two words")).is_err());
    }

    #[test]
    fn test_bad_validator_is_reported() {
        let config = EditorConfig::from_json_str(
            r#"{ "tags": { "broken": { "open": "<x>", "close": "</x>", "validator": "(" } } }"#,
        )
        .unwrap();
        let err = config.registry().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValidator { ref tag, .. } if tag.as_str() == "broken"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EditorConfig::from_json_str("{ tags: }"),
            Err(ConfigError::Json(_))
        ));
    }
}
