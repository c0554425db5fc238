//! Field-pattern application and capture-group assignment.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::error::{Result, SiftError};
use crate::template::FieldPattern;
use crate::text::{ConversionMode, DocumentContext, PageTextCache};
use crate::tools::DocumentTools;

/// Value captured by one regex match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MatchValue {
    /// First capture group of a pattern without a capture assignment.
    Single(String),
    /// Named capture values of a pattern with a capture assignment.
    Named(BTreeMap<String, String>),
}

impl MatchValue {
    fn is_empty(&self) -> bool {
        match self {
            MatchValue::Single(value) => value.is_empty(),
            MatchValue::Named(values) => values.is_empty(),
        }
    }
}

/// Result of applying one field pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// The pattern matched nowhere. An explicit sentinel, distinct from an
    /// empty string or an empty sequence.
    #[default]
    NoMatch,
    /// The first match of a single-match pattern.
    One(MatchValue),
    /// Every match of a multi-match pattern, in match order.
    Many(Vec<MatchValue>),
}

impl FieldValue {
    /// True when result merging should treat this value as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::NoMatch => true,
            FieldValue::One(value) => value.is_empty(),
            FieldValue::Many(values) => values.is_empty(),
        }
    }

    fn into_matches(self) -> Vec<MatchValue> {
        match self {
            FieldValue::NoMatch => Vec::new(),
            FieldValue::One(value) => vec![value],
            FieldValue::Many(values) => values,
        }
    }

    /// Concatenate the match sequences of two values.
    pub fn merge(self, other: FieldValue) -> FieldValue {
        let mut matches = self.into_matches();
        matches.extend(other.into_matches());
        FieldValue::Many(matches)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::NoMatch => serializer.serialize_none(),
            FieldValue::One(value) => value.serialize(serializer),
            FieldValue::Many(values) => values.serialize(serializer),
        }
    }
}

pub(crate) fn compile_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SiftError::PatternConfigInvalid(e.to_string()))
}

/// Apply one field pattern to the text selected by its page selector.
///
/// The pattern configuration is validated before any text is fetched: a
/// capture assignment must name exactly the regex's capture groups, and a
/// pattern without an assignment needs at least one group to take a value
/// from.
pub fn extract_field<T: DocumentTools>(
    cache: &PageTextCache<'_, T>,
    ctx: &mut DocumentContext,
    document: &Path,
    pattern: &FieldPattern,
    mode: ConversionMode,
    language: &str,
) -> Result<FieldValue> {
    let regex = compile_regex(&pattern.regex)?;
    let groups = regex.captures_len() - 1;
    match &pattern.capture_assignment {
        Some(names) if names.len() != groups => {
            return Err(SiftError::PatternConfigInvalid(format!(
                "pattern {:?} has {} capture groups but {} capture assignments",
                pattern.title,
                groups,
                names.len()
            )));
        }
        None if groups == 0 => {
            return Err(SiftError::PatternConfigInvalid(format!(
                "pattern {:?} needs at least one capture group",
                pattern.title
            )));
        }
        _ => {}
    }

    let page = cache.text(ctx, document, pattern.page_detection, mode, language)?;
    let value = apply(pattern, &regex, &page.text);
    trace!(pattern = %pattern.title, matched = !matches!(value, FieldValue::NoMatch), "applied field pattern");
    Ok(value)
}

/// Pure application of an already compiled pattern against page text.
fn apply(pattern: &FieldPattern, regex: &Regex, text: &str) -> FieldValue {
    let mut matches = Vec::new();
    for caps in regex.captures_iter(text) {
        let value = match &pattern.capture_assignment {
            // only the first group is kept; further groups are discarded
            None => MatchValue::Single(group_value(&caps, 1)),
            Some(names) => {
                let mut named = BTreeMap::new();
                for (i, name) in names.iter().enumerate() {
                    named.insert(name.clone(), group_value(&caps, i + 1));
                }
                MatchValue::Named(named)
            }
        };
        if !pattern.multi_matches {
            return FieldValue::One(value);
        }
        matches.push(value);
    }
    if matches.is_empty() {
        return FieldValue::NoMatch;
    }
    FieldValue::Many(matches)
}

/// A group's matched text; unmatched optional groups yield the empty string.
fn group_value(caps: &regex::Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
