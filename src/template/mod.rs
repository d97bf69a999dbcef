//! Placeholder resolution for release note templates
//!
//! A template is plain text carrying `$TOKEN` placeholders. Resolution swaps
//! every bound token for its value; a value may itself be a nested mapping
//! with its own `template`, which is resolved first against the rest of that
//! mapping.
//!
//! # Example
//!
//! ```text
//! template: "## $RELEASE_NAME\n$CHANGES"
//! values:   { "$RELEASE_NAME": "v2.1.0", "$CHANGES": "- fix crash on empty input" }
//! output:   "## v2.1.0\n- fix crash on empty input"
//! ```

mod error;
mod resolver;
mod value;

pub use error::TemplateError;
pub use resolver::{resolve, ResolutionContext, Resolver, DEFAULT_MAX_DEPTH};
pub use value::{NestedValue, Value, ValueMap, TEMPLATE_KEY};
