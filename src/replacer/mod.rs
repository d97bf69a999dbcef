//! Custom find/replace rules applied to rendered text
//!
//! A replacer's `search` is either a plain substring or a regex written as a
//! `/pattern/flags` literal. Replacers are validated up front into a
//! [`ReplacerChain`] and then applied in list order, each one working on the
//! previous one's output.

mod chain;
mod literal;
mod replacement;

pub use chain::{validate_replacers, CompiledReplacer, ReplacerChain, ReplacerSpec};
pub use literal::{FlagError, RegexFlags, RegexLiteral, SearchPattern, SUPPORTED_FLAGS};
pub use replacement::Replacement;
