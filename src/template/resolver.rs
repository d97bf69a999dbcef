//! Token resolution - substitutes placeholder tokens with their values

use std::borrow::Cow;

use tracing::{debug, trace};

use super::error::TemplateError;
use super::value::{Value, ValueMap};

/// Default maximum nesting of templates inside values
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Context for one resolution pass
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// Tokens whose nested templates are currently being resolved, outermost first
    pub path: Vec<String>,
}

impl ResolutionContext {
    /// Create a new top-level context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the context for the nested template bound to `token`
    pub fn nested(&self, token: &str) -> Self {
        let mut path = self.path.clone();
        path.push(token.to_string());
        Self { path }
    }

    /// Current nesting depth (0 at the top level)
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Resolves `$TOKEN` placeholders against a [`ValueMap`]
///
/// Each bound token is replaced at every exact occurrence in the text. An
/// occurrence only counts when it is not part of a longer word: with `$A`
/// bound, `$AB` is left alone. Tokens without a binding (or bound to
/// [`Value::Null`]) stay verbatim so a later pass can fill them.
///
/// Substitution is a single left-to-right pass. Text inserted for one token
/// is never scanned again, so the order of bindings does not matter.
///
/// # Example
///
/// ```rust
/// use release_template::template::{NestedValue, Resolver, ValueMap};
///
/// let values = ValueMap::new()
///     .with("$NAME", "Beta")
///     .with("$VERSION", NestedValue::new("$MAJOR.$MINOR").with("$MAJOR", 2).with("$MINOR", 1));
///
/// let out = Resolver::new().resolve("$NAME ($VERSION) $TODO", &values).unwrap();
/// assert_eq!(out, "Beta (2.1) $TODO");
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    max_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Resolver {
    /// Create a resolver with the default depth limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many levels of nested templates may be entered
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve every bound token in `template`
    pub fn resolve(&self, template: &str, values: &ValueMap) -> Result<String, TemplateError> {
        self.resolve_in(template, values, &ResolutionContext::new())
    }

    fn resolve_in(
        &self,
        template: &str,
        values: &ValueMap,
        ctx: &ResolutionContext,
    ) -> Result<String, TemplateError> {
        debug!(depth = ctx.depth(), tokens = values.len(), "resolving template");
        let substitutions = self.substitutions(values, ctx)?;
        Ok(substitute(template, &substitutions))
    }

    /// Render every binding to its substitution text, longest token first
    fn substitutions<'v>(
        &self,
        values: &'v ValueMap,
        ctx: &ResolutionContext,
    ) -> Result<Vec<(&'v str, Cow<'v, str>)>, TemplateError> {
        let mut substitutions = Vec::with_capacity(values.len());

        for (token, value) in values.iter() {
            if token.is_empty() {
                continue;
            }
            let text = match value {
                Value::Null => continue,
                Value::Text(s) => Cow::Borrowed(s.as_str()),
                Value::Nested(nested) => {
                    let inner = nested
                        .template
                        .as_deref()
                        .ok_or_else(|| TemplateError::malformed(token))?;
                    let nested_ctx = ctx.nested(token);
                    if nested_ctx.depth() > self.max_depth {
                        return Err(TemplateError::RecursionLimit {
                            path: nested_ctx.path,
                            limit: self.max_depth,
                        });
                    }
                    Cow::Owned(self.resolve_in(inner, &nested.values, &nested_ctx)?)
                }
                primitive => Cow::Owned(primitive.to_string()),
            };
            substitutions.push((token, text));
        }

        // Longest first so `$AB` wins over `$A` at the same position
        substitutions.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(substitutions)
    }
}

/// Resolve `template` against `values` with the default resolver
pub fn resolve(template: &str, values: &ValueMap) -> Result<String, TemplateError> {
    Resolver::new().resolve(template, values)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `c` right after `token` would make the occurrence part of a
/// longer token
///
/// `$` placeholders are spelled `$[A-Z_]+`, so only those characters extend
/// one: `$A` is found in `$A1` and `$Ab` but not in `$AB` or `$A_B`.
fn extends_token(token: &str, c: char) -> bool {
    if token.starts_with('$') {
        c.is_ascii_uppercase() || c == '_'
    } else {
        is_word_char(c)
    }
}

/// Whether the occurrence of `token` at `start` stands on its own, i.e. is
/// not glued to a surrounding word
fn is_bounded(text: &str, start: usize, token: &str) -> bool {
    let end = start + token.len();
    let open = !token.starts_with(is_word_char)
        || !text[..start].chars().next_back().is_some_and(is_word_char);
    let close = !token.ends_with(is_word_char)
        || !text[end..].chars().next().is_some_and(|c| extends_token(token, c));
    open && close
}

fn substitute(template: &str, substitutions: &[(&str, Cow<'_, str>)]) -> String {
    if substitutions.is_empty() {
        return template.to_string();
    }

    let mut output = String::with_capacity(template.len());
    // Start of the pending run of unmatched text
    let mut copied = 0;
    let mut pos = 0;

    while pos < template.len() {
        let remaining = &template[pos..];
        let hit = substitutions
            .iter()
            .find(|(token, _)| remaining.starts_with(token) && is_bounded(template, pos, token));

        match hit {
            Some((token, text)) => {
                trace!(token = *token, "substituting token");
                output.push_str(&template[copied..pos]);
                output.push_str(text);
                pos += token.len();
                copied = pos;
            }
            None => {
                pos += remaining.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    output.push_str(&template[copied..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::NestedValue;

    #[test]
    fn test_replaces_single_token() {
        let values = ValueMap::new().with("$A", "B");
        assert_eq!(resolve("$A", &values).unwrap(), "B");
    }

    #[test]
    fn test_replaces_numeric_values() {
        let values = ValueMap::new()
            .with("$MAJOR", 1)
            .with("$MINOR", 0)
            .with("$PATCH", 0);
        assert_eq!(resolve("$MAJOR.$MINOR.$PATCH", &values).unwrap(), "1.0.0");
    }

    #[test]
    fn test_leaves_unbound_tokens() {
        let input = "# v$NEXT_PATCH_VERSION\n## CHANGES\n\n$CHANGES\n";
        let values = ValueMap::new().with("$CHANGES", "NO CHANGES");
        let output = resolve(input, &values).unwrap();
        assert!(output.contains("v$NEXT_PATCH_VERSION"));
        assert!(output.contains("NO CHANGES"));
        assert!(!output.contains("$CHANGES"));
    }

    #[test]
    fn test_no_prefix_match() {
        let values = ValueMap::new().with("$NEXT", "X");
        assert_eq!(
            resolve("$NEXT $NEXT_PATCH_VERSION $NEXT.", &values).unwrap(),
            "X $NEXT_PATCH_VERSION X."
        );
    }

    #[test]
    fn test_lowercase_and_digits_end_a_placeholder() {
        let values = ValueMap::new().with("$A", "B");
        assert_eq!(resolve("$A1 $Ab $A_B", &values).unwrap(), "B1 Bb $A_B");
    }

    #[test]
    fn test_longest_token_wins() {
        let values = ValueMap::new().with("$A", "short").with("$A_B", "long");
        assert_eq!(resolve("$A_B $A", &values).unwrap(), "long short");
    }

    #[test]
    fn test_bare_key_needs_word_boundary() {
        let values = ValueMap::new().with("NAME", "x");
        assert_eq!(resolve("NAME RENAME NAMES", &values).unwrap(), "x RENAME NAMES");
    }

    #[test]
    fn test_substituted_text_not_rescanned() {
        let values = ValueMap::new().with("$A", "$B").with("$B", "b");
        assert_eq!(resolve("$A $B", &values).unwrap(), "$B b");
    }

    #[test]
    fn test_null_leaves_token() {
        let values = ValueMap::new().with("$A", Value::Null);
        assert_eq!(resolve("[$A]", &values).unwrap(), "[$A]");
    }

    #[test]
    fn test_multibyte_text_preserved() {
        let values = ValueMap::new().with("$WHO", "wörld");
        assert_eq!(resolve("héllo → $WHO ✓", &values).unwrap(), "héllo → wörld ✓");
    }

    #[test]
    fn test_nested_template() {
        let values = ValueMap::new().with(
            "$NEXT_MAJOR_VERSION",
            NestedValue::new("$MAJOR.$MINOR.$PATCH.$THIRD")
                .with("$MAJOR", 1)
                .with("$MINOR", 0)
                .with("$PATCH", 0)
                .with("$THIRD", NestedValue::new("$NEST").with("$NEST", "THIRD LEVEL")),
        );
        assert_eq!(
            resolve("$NEXT_MAJOR_VERSION", &values).unwrap(),
            "1.0.0.THIRD LEVEL"
        );
    }

    #[test]
    fn test_nested_scope_excludes_outer_values() {
        let values = ValueMap::new()
            .with("$OUTER", "o")
            .with("$X", NestedValue::new("$OUTER-$INNER").with("$INNER", "i"));
        assert_eq!(resolve("$X", &values).unwrap(), "$OUTER-i");
    }

    #[test]
    fn test_nested_without_template_is_malformed() {
        let values = ValueMap::new().with("$X", NestedValue::without_template().with("$A", 1));
        let result = resolve("$X", &values);
        assert_eq!(result, Err(TemplateError::malformed("$X")));
    }

    #[test]
    fn test_recursion_limit() {
        let mut value = NestedValue::new("leaf");
        for _ in 0..4 {
            value = NestedValue::new("$N").with("$N", value);
        }
        let values = ValueMap::new().with("$N", value);

        let result = Resolver::new().with_max_depth(3).resolve("$N", &values);
        match result {
            Err(TemplateError::RecursionLimit { path, limit }) => {
                assert_eq!(limit, 3);
                assert_eq!(path.len(), 4);
            }
            other => panic!("Expected RecursionLimit, got {:?}", other),
        }

        let ok = Resolver::new().with_max_depth(5).resolve("$N", &values);
        assert_eq!(ok.unwrap(), "leaf");
    }

    #[test]
    fn test_zero_depth_forbids_nested_templates() {
        let values = ValueMap::new().with("$X", NestedValue::new("a"));
        let result = Resolver::new().with_max_depth(0).resolve("$X", &values);
        assert_eq!(
            result,
            Err(TemplateError::RecursionLimit {
                path: vec!["$X".to_string()],
                limit: 0,
            })
        );

        let flat = ValueMap::new().with("$X", "a");
        assert_eq!(Resolver::new().with_max_depth(0).resolve("$X", &flat).unwrap(), "a");
    }

    #[test]
    fn test_context_depth() {
        let ctx = ResolutionContext::new();
        assert_eq!(ctx.depth(), 0);
        let inner = ctx.nested("$A").nested("$B");
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.path, vec!["$A".to_string(), "$B".to_string()]);
    }
}
