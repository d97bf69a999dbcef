//! Template configuration files
//!
//! A configuration bundles a template, the values to resolve it with and the
//! replacers to run afterwards:
//!
//! ```toml
//! max-depth = 8
//! template = """
//! ## $RELEASE_NAME
//! $CHANGES
//! """
//!
//! [metadata]
//! name = "release notes"
//!
//! [values]
//! "$RELEASE_NAME" = "v2.1.0"
//!
//! [[replacers]]
//! search = '/\bJENKINS-(\d+)\b/g'
//! replace = "[JENKINS-$1](https://issues.jenkins.io/browse/JENKINS-$1)"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ReplacerError;
use crate::replacer::ReplacerChain;
use crate::template::{Resolver, Value, ValueMap};
use crate::{render_with_config, RenderConfig, RenderError};

/// Errors that can occur when loading or using a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse values JSON: {0}")]
    ValuesError(#[from] serde_json::Error),
    #[error("Invalid replacer: {0}")]
    Replacer(#[from] ReplacerError),
    #[error("No template given")]
    MissingTemplate,
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A template together with its values and replacers
#[derive(Debug, Clone, Default)]
pub struct TemplateConfig {
    /// Optional name for the configuration
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    pub template: Option<String>,
    /// Maximum depth of nested templates; the resolver default when unset
    pub max_depth: Option<usize>,
    pub values: ValueMap,
    /// Replacer entries as written, validated by [`TemplateConfig::replacer_chain`]
    pub replacers: Vec<serde_json::Value>,
}

/// TOML structure for deserializing configurations
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TomlConfig {
    metadata: Option<TomlMetadata>,
    template: Option<String>,
    max_depth: Option<usize>,
    #[serde(default)]
    values: ValueMap,
    #[serde(default)]
    replacers: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

impl TemplateConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;

        Ok(TemplateConfig {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            template: parsed.template,
            max_depth: parsed.max_depth,
            values: parsed.values,
            replacers: parsed.replacers,
        })
    }

    /// Overlay values from a JSON object onto the configured ones
    pub fn merge_values_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let values: ValueMap = serde_json::from_str(json)?;
        self.values.merge(values);
        Ok(())
    }

    /// Bind a single token, replacing any configured value
    pub fn set_value(&mut self, token: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(token, value);
    }

    /// Validate the configured replacers
    ///
    /// With `lenient`, entries that fail validation are dropped with a
    /// warning instead of failing the whole chain.
    pub fn replacer_chain(&self, lenient: bool) -> Result<ReplacerChain, ReplacerError> {
        if lenient {
            Ok(ReplacerChain::from_entries_lenient(&self.replacers))
        } else {
            ReplacerChain::from_entries(&self.replacers)
        }
    }

    /// Build the render pipeline this configuration describes
    pub fn render_config(&self, lenient: bool) -> Result<RenderConfig, ReplacerError> {
        let mut resolver = Resolver::new();
        if let Some(depth) = self.max_depth {
            resolver = resolver.with_max_depth(depth);
        }
        Ok(RenderConfig {
            resolver,
            replacers: self.replacer_chain(lenient)?,
        })
    }

    /// Render the configured template
    pub fn render(&self) -> Result<String, ConfigError> {
        let template = self.template.as_deref().ok_or(ConfigError::MissingTemplate)?;
        self.render_template(template, false)
    }

    /// Render `template` with this configuration's values and replacers
    pub fn render_template(&self, template: &str, lenient: bool) -> Result<String, ConfigError> {
        let config = self.render_config(lenient)?;
        Ok(render_with_config(template, &self.values, &config)?)
    }
}
