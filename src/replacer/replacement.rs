//! Replacement strings for regex replacers
//!
//! Existing replacer configurations write replacements in the `$1` / `$&`
//! style, where a digit run is cut short as soon as it stops naming a group
//! (`$1x` is group 1 then `x`). That differs from the `regex` crate's own
//! expansion syntax, so replacements are parsed into parts once, at
//! validation time, against the compiled pattern's groups.

use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Group(usize),
    Named(String),
    /// `$&`
    WholeMatch,
    /// `` $` ``
    Before,
    /// `$'`
    After,
}

/// A parsed replacement string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    parts: Vec<Part>,
}

impl Replacement {
    /// Parse `replace` for use with matches of `regex`
    ///
    /// Markers that refer to a group the pattern does not have are kept as
    /// literal text.
    pub fn parse(replace: &str, regex: &Regex) -> Self {
        let groups = regex.captures_len() - 1;
        let has_names = regex.capture_names().flatten().next().is_some();

        let mut parts = Vec::new();
        let mut text = String::new();
        let mut rest = replace;

        while let Some(dollar) = rest.find('$') {
            text.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            let (part, consumed) = parse_marker(after, groups, has_names);
            match part {
                Some(part) => {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(part);
                }
                None => text.push_str(&rest[dollar..dollar + 1 + consumed]),
            }
            rest = &after[consumed..];
        }
        text.push_str(rest);
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Self { parts }
    }

    /// Append the replacement for one match to `out`
    ///
    /// Groups that did not take part in the match expand to nothing.
    pub fn expand(&self, caps: &Captures<'_>, haystack: &str, out: &mut String) {
        let Some(whole) = caps.get(0) else {
            return;
        };
        for part in &self.parts {
            match part {
                Part::Text(s) => out.push_str(s),
                Part::Group(i) => out.push_str(caps.get(*i).map_or("", |m| m.as_str())),
                Part::Named(name) => out.push_str(caps.name(name).map_or("", |m| m.as_str())),
                Part::WholeMatch => out.push_str(whole.as_str()),
                Part::Before => out.push_str(&haystack[..whole.start()]),
                Part::After => out.push_str(&haystack[whole.end()..]),
            }
        }
    }
}

/// Parse the marker following a `$`
///
/// Returns the part (or `None` for literal text) and how many bytes after the
/// `$` it covers.
fn parse_marker(after: &str, groups: usize, has_names: bool) -> (Option<Part>, usize) {
    let bytes = after.as_bytes();
    match bytes.first() {
        Some(b'$') => (Some(Part::Text("$".to_string())), 1),
        Some(b'&') => (Some(Part::WholeMatch), 1),
        Some(b'`') => (Some(Part::Before), 1),
        Some(b'\'') => (Some(Part::After), 1),
        Some(d) if d.is_ascii_digit() => {
            let first = usize::from(d - b'0');
            if let Some(d2) = bytes.get(1).filter(|d| d.is_ascii_digit()) {
                let two = first * 10 + usize::from(d2 - b'0');
                if (1..=groups).contains(&two) {
                    return (Some(Part::Group(two)), 2);
                }
            }
            if (1..=groups).contains(&first) {
                (Some(Part::Group(first)), 1)
            } else {
                (None, 0)
            }
        }
        Some(b'<') if has_names => match after.find('>') {
            Some(close) => (Some(Part::Named(after[1..close].to_string())), close + 1),
            None => (None, 0),
        },
        _ => (None, 0),
    }
}
