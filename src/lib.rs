//! Release Template - placeholder templating for release notes
//!
//! This library resolves `$TOKEN` placeholders against a mapping of values
//! (values may carry nested templates of their own) and then runs the result
//! through an ordered chain of custom find/replace rules.
//!
//! # Example
//!
//! ```rust
//! use release_template::{render, ReplacerChain, ReplacerSpec, ValueMap};
//!
//! let values = ValueMap::new()
//!     .with("$RELEASE_TAG", "v2.0.0")
//!     .with("$CHANGES", "- JENKINS-42 fix startup");
//! let replacers = ReplacerChain::validate(&[ReplacerSpec::new(
//!     r"/\bJENKINS-(\d+)\b/g",
//!     "[JENKINS-$1](https://issues.jenkins.io/browse/JENKINS-$1)",
//! )])
//! .unwrap();
//!
//! let notes = render("# $RELEASE_TAG\n$CHANGES", &values, Some(&replacers)).unwrap();
//! assert_eq!(
//!     notes,
//!     "# v2.0.0\n- [JENKINS-42](https://issues.jenkins.io/browse/JENKINS-42) fix startup"
//! );
//! ```

pub mod config;
pub mod error;
pub mod replacer;
pub mod template;

pub use config::{ConfigError, TemplateConfig};
pub use error::ReplacerError;
pub use replacer::{validate_replacers, ReplacerChain, ReplacerSpec};
pub use template::{resolve, NestedValue, Resolver, TemplateError, Value, ValueMap};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while resolving placeholders
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Error while validating replacers
    #[error("replacer error: {0}")]
    Replacer(#[from] ReplacerError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Placeholder resolution settings
    pub resolver: Resolver,
    /// Replacers applied after resolution
    pub replacers: ReplacerChain,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum depth of nested templates
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.resolver = self.resolver.with_max_depth(max_depth);
        self
    }

    /// Set an already validated replacer chain
    pub fn with_replacers(mut self, replacers: ReplacerChain) -> Self {
        self.replacers = replacers;
        self
    }

    /// Validate `specs` and use them as the replacer chain
    pub fn with_replacer_specs(self, specs: &[ReplacerSpec]) -> Result<Self, RenderError> {
        Ok(self.with_replacers(ReplacerChain::validate(specs)?))
    }
}

/// Resolve `template` against `values`, then apply `replacers` if given
///
/// This is the main entry point for the library.
pub fn render(
    template: &str,
    values: &ValueMap,
    replacers: Option<&ReplacerChain>,
) -> Result<String, RenderError> {
    let resolved = resolve(template, values)?;
    Ok(match replacers {
        Some(chain) => chain.apply(&resolved),
        None => resolved,
    })
}

/// Render with custom configuration
///
/// # Example
///
/// ```rust
/// use release_template::{render_with_config, RenderConfig, ReplacerSpec, ValueMap};
///
/// let config = RenderConfig::new()
///     .with_max_depth(4)
///     .with_replacer_specs(&[ReplacerSpec::new("TBD", "to be announced")])
///     .unwrap();
///
/// let values = ValueMap::new().with("$DATE", "TBD");
/// let out = render_with_config("Release date: $DATE", &values, &config).unwrap();
/// assert_eq!(out, "Release date: to be announced");
/// ```
pub fn render_with_config(
    template: &str,
    values: &ValueMap,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let resolved = config.resolver.resolve(template, values)?;
    Ok(config.replacers.apply(&resolved))
}
