//! Error types for replacer validation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in a replacer's `search` string
pub type Span = std::ops::Range<usize>;

/// A replacer specification that cannot be compiled
///
/// Raised by validation before any text is processed, so a chain with a bad
/// entry is never built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplacerError {
    #[error("replacer specification must contain a `replacers` list")]
    NotAList,

    #[error("replacer {index}: entry must be a table with `search` and `replace`")]
    NotATable { index: usize },

    #[error("replacer {index}: missing `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("replacer {index}: `{field}` must be a string")]
    NotAString { index: usize, field: &'static str },

    #[error("replacer {index}: `search` must not be empty")]
    EmptySearch { index: usize },

    #[error("replacer {index}: repeated flag '{flag}' in '{search}'")]
    InvalidFlags {
        index: usize,
        search: String,
        flag: char,
        span: Span,
    },

    #[error("replacer {index}: bad replacer regex '{search}': {message}")]
    InvalidRegex {
        index: usize,
        search: String,
        message: String,
        span: Span,
    },
}

impl ReplacerError {
    /// Position of the offending entry in the replacer list
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NotAList => None,
            Self::NotATable { index }
            | Self::MissingField { index, .. }
            | Self::NotAString { index, .. }
            | Self::EmptySearch { index }
            | Self::InvalidFlags { index, .. }
            | Self::InvalidRegex { index, .. } => Some(*index),
        }
    }

    /// Format the error with the offending `search` string underlined
    ///
    /// Errors without a search string to point into fall back to their
    /// plain message.
    pub fn format(&self, filename: &str) -> String {
        let (search, span, note) = match self {
            Self::InvalidRegex {
                search,
                span,
                message,
                ..
            } => (search, span, message.clone()),
            Self::InvalidFlags {
                search, span, flag, ..
            } => (search, span, format!("'{}' appears more than once", flag)),
            _ => return self.to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(note)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(search.as_str())), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
