//! Parsing of `search` strings: plain substrings or `/pattern/flags` literals

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::error::Span;

/// Flags accepted after the closing slash of a regex literal
pub const SUPPORTED_FLAGS: &str = "gimsu";

/// Flags of a regex literal
///
/// `g` is accepted for compatibility but carries no meaning: compiled
/// replacers always replace every occurrence. `u` is likewise accepted while
/// matching is always Unicode-aware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub unicode: bool,
}

impl RegexFlags {
    /// Parse a flag string, failing on the first repeated flag
    ///
    /// Callers only pass strings made of [`SUPPORTED_FLAGS`].
    fn parse(flags: &str) -> Result<Self, (usize, char)> {
        let mut parsed = Self::default();
        for (offset, flag) in flags.char_indices() {
            let slot = match flag {
                'g' => &mut parsed.global,
                'i' => &mut parsed.case_insensitive,
                'm' => &mut parsed.multi_line,
                's' => &mut parsed.dot_matches_new_line,
                _ => &mut parsed.unicode,
            };
            if *slot {
                return Err((offset, flag));
            }
            *slot = true;
        }
        Ok(parsed)
    }
}

/// A `/pattern/flags` literal split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexLiteral {
    pub pattern: String,
    pub flags: RegexFlags,
    /// Location of the pattern inside the original search string
    pub pattern_span: Span,
}

impl RegexLiteral {
    /// Compile the pattern with its flags applied
    ///
    /// `\d`, `\w` and `\b` keep their ASCII-only meaning, so `\d` does not
    /// match digits of other scripts.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&ascii_classes(&self.pattern))
            .case_insensitive(self.flags.case_insensitive)
            .multi_line(self.flags.multi_line)
            .dot_matches_new_line(self.flags.dot_matches_new_line)
            .build()
    }
}

/// A repeated flag in a regex literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagError {
    pub flag: char,
    pub span: Span,
}

/// What a replacer's `search` string asks to match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    Literal(String),
    Regex(RegexLiteral),
}

impl SearchPattern {
    /// Classify a `search` string
    ///
    /// Only the exact form `/pattern/flags` is a regex: a leading slash, a
    /// later closing slash, a non-empty pattern between them and nothing but
    /// supported flags after. Anything else, including text that merely
    /// contains slashes, is a literal substring.
    pub fn parse(search: &str) -> Result<Self, FlagError> {
        let Some((pattern, flags)) = split_regex_literal(search) else {
            return Ok(SearchPattern::Literal(search.to_string()));
        };

        let parsed = RegexFlags::parse(&search[flags.clone()]).map_err(|(offset, flag)| {
            let at = flags.start + offset;
            FlagError {
                flag,
                span: at..at + flag.len_utf8(),
            }
        })?;

        Ok(SearchPattern::Regex(RegexLiteral {
            pattern: search[pattern.clone()].to_string(),
            flags: parsed,
            pattern_span: pattern,
        }))
    }
}

/// Locate the pattern and flags of a regex literal, if `search` is one
fn split_regex_literal(search: &str) -> Option<(Span, Span)> {
    let body = search.strip_prefix('/')?;
    let close = body.rfind('/')?;
    if close == 0 {
        return None;
    }
    let flags = &body[close + 1..];
    if !flags.chars().all(|c| SUPPORTED_FLAGS.contains(c)) {
        return None;
    }
    Some((1..1 + close, 2 + close..search.len()))
}

/// Rewrite the Perl classes `\d`, `\D`, `\w`, `\W` and the word boundary
/// `\b` into their ASCII forms, inside and outside bracket classes
fn ascii_classes(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len() + 16);
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push(c);
                    break;
                };
                let class = match escaped {
                    'd' => Some("digit"),
                    'D' => Some("^digit"),
                    'w' => Some("word"),
                    'W' => Some("^word"),
                    _ => None,
                };
                match (class, escaped) {
                    (Some(name), _) if in_class => {
                        out.push_str("[:");
                        out.push_str(name);
                        out.push_str(":]");
                    }
                    (Some(name), _) => {
                        out.push_str("[[:");
                        out.push_str(name);
                        out.push_str(":]]");
                    }
                    (None, 'b') if !in_class => out.push_str("(?-u:\\b)"),
                    _ => {
                        out.push(c);
                        out.push(escaped);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
