//! Error types for token resolution

use thiserror::Error;

/// Errors that can occur while resolving a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A nested mapping has no `template` key and no direct string form
    #[error("malformed value for '{token}': nested mapping has no `template` key")]
    MalformedValue { token: String },

    /// Nested templates went deeper than the configured limit
    #[error("recursion limit of {limit} exceeded while resolving '{}'", path.join(" -> "))]
    RecursionLimit { path: Vec<String>, limit: usize },
}

impl TemplateError {
    /// Create a malformed value error
    pub fn malformed(token: impl Into<String>) -> Self {
        Self::MalformedValue {
            token: token.into(),
        }
    }

    /// The token whose value could not be rendered
    pub fn token(&self) -> &str {
        match self {
            Self::MalformedValue { token } => token,
            Self::RecursionLimit { path, .. } => path.last().map(String::as_str).unwrap_or(""),
        }
    }
}
