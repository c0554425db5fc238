//! Template definitions: a layout-identifying regex plus ordered field
//! patterns, persisted one JSON file per template id.

pub mod store;

pub use store::{JsonTemplateStore, TemplateStore};

use serde::{Deserialize, Serialize};

use crate::selector::PageSelector;

/// A named regex rule scoped to a page selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPattern {
    /// Key of the field in the output record.
    pub title: String,

    /// Regex applied to the selected page text.
    pub regex: String,

    /// Pages to look up when applying the regex.
    pub page_detection: PageSelector,

    /// Collect every match instead of only the first.
    #[serde(default)]
    pub multi_matches: bool,

    /// Names for the capture groups, in group order. When absent only the
    /// first group's value is kept per match.
    #[serde(default)]
    pub capture_assignment: Option<Vec<String>>,
}

/// A document layout definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique id, taken from the definition file stem; never serialized.
    #[serde(skip)]
    pub id: String,

    /// Human-readable title, e.g. the merchant behind an invoice layout.
    pub title: String,

    /// Regex whose non-overlapping match count scores this template
    /// against a document.
    pub regex: String,

    /// OCR traineddata language (ISO 639-3) for documents of this layout.
    pub language: String,

    /// Pages to look up when scoring the template.
    pub page_detection: PageSelector,

    /// Ordered field patterns applied after classification.
    #[serde(default)]
    pub pattern: Vec<FieldPattern>,
}
