//! Compiled replacer chains

use std::borrow::Cow;

use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::{debug, warn};

use super::literal::SearchPattern;
use super::replacement::Replacement;
use crate::error::ReplacerError;

/// One `{ search, replace }` entry as written in a configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplacerSpec {
    pub search: String,
    pub replace: String,
}

impl ReplacerSpec {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal {
        needle: String,
        replace: String,
    },
    Regex {
        regex: Regex,
        replacement: Replacement,
    },
}

/// A validated replacer, ready to run
///
/// Every occurrence of the search is replaced; there is no first-match-only
/// mode.
#[derive(Debug, Clone)]
pub struct CompiledReplacer {
    search: String,
    matcher: Matcher,
}

impl CompiledReplacer {
    /// Validate and compile the entry at `index` of a replacer list
    pub fn compile(index: usize, spec: &ReplacerSpec) -> Result<Self, ReplacerError> {
        if spec.search.is_empty() {
            return Err(ReplacerError::EmptySearch { index });
        }

        let pattern = SearchPattern::parse(&spec.search).map_err(|e| {
            ReplacerError::InvalidFlags {
                index,
                search: spec.search.clone(),
                flag: e.flag,
                span: e.span,
            }
        })?;

        let matcher = match pattern {
            SearchPattern::Literal(needle) => Matcher::Literal {
                needle,
                replace: spec.replace.clone(),
            },
            SearchPattern::Regex(literal) => {
                let regex = literal
                    .compile()
                    .map_err(|e| ReplacerError::InvalidRegex {
                        index,
                        search: spec.search.clone(),
                        message: e.to_string(),
                        span: literal.pattern_span.clone(),
                    })?;
                let replacement = Replacement::parse(&spec.replace, &regex);
                Matcher::Regex { regex, replacement }
            }
        };

        Ok(Self {
            search: spec.search.clone(),
            matcher,
        })
    }

    /// The `search` string this replacer was compiled from
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_regex(&self) -> bool {
        matches!(self.matcher, Matcher::Regex { .. })
    }

    /// Replace every non-overlapping match in `text`
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.matcher {
            Matcher::Literal { needle, replace } => {
                if text.contains(needle.as_str()) {
                    Cow::Owned(text.replace(needle.as_str(), replace))
                } else {
                    Cow::Borrowed(text)
                }
            }
            Matcher::Regex { regex, replacement } => {
                regex.replace_all(text, |caps: &Captures<'_>| {
                    let mut out = String::new();
                    replacement.expand(caps, text, &mut out);
                    out
                })
            }
        }
    }
}

/// An ordered, validated list of replacers
///
/// Replacers run in list order and each one sees the output of the one
/// before it, so a later replacer may rewrite what an earlier one produced.
/// A chain is immutable once built and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use release_template::replacer::{ReplacerChain, ReplacerSpec};
///
/// let chain = ReplacerChain::validate(&[
///     ReplacerSpec::new(r"/\bGH-(\d+)\b/g", "#$1"),
///     ReplacerSpec::new("#", "issue "),
/// ])
/// .unwrap();
///
/// assert_eq!(chain.apply("fixes GH-12"), "fixes issue 12");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplacerChain {
    replacers: Vec<CompiledReplacer>,
}

impl ReplacerChain {
    /// Create an empty chain, which leaves text unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and compile every entry, failing on the first bad one
    pub fn validate(specs: &[ReplacerSpec]) -> Result<Self, ReplacerError> {
        let replacers = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| CompiledReplacer::compile(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = replacers.len(), "validated replacer chain");
        Ok(Self { replacers })
    }

    /// Validate every entry, dropping the ones that fail with a warning
    pub fn validate_lenient(specs: &[ReplacerSpec]) -> Self {
        Self::keep_valid(
            specs
                .iter()
                .enumerate()
                .map(|(index, spec)| CompiledReplacer::compile(index, spec)),
        )
    }

    /// Validate a loosely typed replacer list, e.g. the `replacers` array of
    /// a JSON or TOML configuration
    pub fn from_entries(entries: &[serde_json::Value]) -> Result<Self, ReplacerError> {
        let replacers = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| compile_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = replacers.len(), "validated replacer chain");
        Ok(Self { replacers })
    }

    /// Like [`ReplacerChain::from_entries`], dropping bad entries with a warning
    pub fn from_entries_lenient(entries: &[serde_json::Value]) -> Self {
        Self::keep_valid(
            entries
                .iter()
                .enumerate()
                .map(|(index, entry)| compile_entry(index, entry)),
        )
    }

    fn keep_valid(
        compiled: impl Iterator<Item = Result<CompiledReplacer, ReplacerError>>,
    ) -> Self {
        let replacers: Vec<_> = compiled
            .filter_map(|result| match result {
                Ok(replacer) => Some(replacer),
                Err(e) => {
                    warn!(error = %e, "dropping replacer");
                    None
                }
            })
            .collect();
        debug!(count = replacers.len(), "validated replacer chain");
        Self { replacers }
    }

    pub fn len(&self) -> usize {
        self.replacers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledReplacer> {
        self.replacers.iter()
    }

    /// Run every replacer in order, threading the text through
    pub fn apply(&self, text: &str) -> String {
        self.replacers
            .iter()
            .fold(text.to_string(), |acc, replacer| replacer.apply(&acc).into_owned())
    }
}

/// Validate a `{ "replacers": [ { "search": ..., "replace": ... }, ... ] }`
/// document
pub fn validate_replacers(spec: &serde_json::Value) -> Result<ReplacerChain, ReplacerError> {
    let entries = spec
        .get("replacers")
        .and_then(serde_json::Value::as_array)
        .ok_or(ReplacerError::NotAList)?;
    ReplacerChain::from_entries(entries)
}

fn compile_entry(index: usize, entry: &serde_json::Value) -> Result<CompiledReplacer, ReplacerError> {
    let table = entry
        .as_object()
        .ok_or(ReplacerError::NotATable { index })?;

    let field = |name: &'static str| match table.get(name) {
        None | Some(serde_json::Value::Null) => Err(ReplacerError::MissingField { index, field: name }),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ReplacerError::NotAString { index, field: name }),
    };

    let spec = ReplacerSpec {
        search: field("search")?,
        replace: field("replace")?,
    };
    CompiledReplacer::compile(index, &spec)
}
