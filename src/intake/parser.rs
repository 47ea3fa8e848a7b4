//! Strict single-field answer parser.
//!
//! A turn must be exactly one non-blank line of the form `Label: value`, and
//! the label must resolve to the field currently being asked. Nothing is
//! inferred from free text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FormatError, IntakeError};

use super::fields::FieldKey;

/// Label up to the first colon, then a non-empty value.
static LABELED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^:]+?)\s*:\s*(.*?)\s*$").expect("labeled-line pattern is valid")
});

/// A turn accepted by the parser; committing it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub key: FieldKey,
    pub value: String,
}

/// Parse one turn of user input against the field currently expected.
///
/// `expected` is `None` once every field is collected.
pub fn parse(raw: &str, expected: Option<FieldKey>) -> Result<ParsedAnswer, IntakeError> {
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines.next().ok_or(FormatError::Malformed)?;
    if lines.next().is_some() {
        return Err(FormatError::MultipleLines.into());
    }

    let caps = LABELED_LINE.captures(line).ok_or(FormatError::Malformed)?;
    let label = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    if label.is_empty() || value.is_empty() {
        return Err(FormatError::Malformed.into());
    }

    let key = FieldKey::from_label(label).ok_or_else(|| FormatError::UnknownField {
        label: label.to_string(),
    })?;

    match expected {
        None => Err(IntakeError::Complete),
        Some(expected) if expected != key => Err(IntakeError::Sequence { expected }),
        Some(_) => Ok(ParsedAnswer {
            key,
            value: value.to_string(),
        }),
    }
}
