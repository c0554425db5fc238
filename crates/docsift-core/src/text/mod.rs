//! Per-document page text: provenance, blankness and the mutable context.

pub mod cache;

pub use cache::PageTextCache;

use std::collections::HashMap;

use crate::selector::PageSelector;
use crate::template::Template;

/// Where a piece of page text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSource {
    /// Direct extraction from the document's text layer.
    Direct,
    /// Optical character recognition of rasterized pages.
    Ocr,
}

/// How text acquisition chooses its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// Direct extraction first, OCR when the direct text is blank.
    Auto,
    /// Direct extraction only.
    Text,
    /// OCR only.
    Ocr,
}

impl ConversionMode {
    /// The source tried first under this mode.
    pub fn preferred_source(self) -> TextSource {
        match self {
            ConversionMode::Ocr => TextSource::Ocr,
            ConversionMode::Auto | ConversionMode::Text => TextSource::Direct,
        }
    }
}

/// Text of one page selection plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub text: String,
    pub source: TextSource,
}

/// True for text that is empty or whitespace-only.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Mutable per-document state.
///
/// Created fresh per document and discarded after conversion. Must never be
/// shared across overlapping conversions; a host running documents in
/// parallel gives each its own context.
#[derive(Debug, Default)]
pub struct DocumentContext {
    texts: HashMap<(PageSelector, TextSource), String>,
    page_count: Option<u32>,

    /// Set once classification succeeds.
    pub template: Option<Template>,
}

impl DocumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for a (selector, source) pair, if any.
    pub fn cached(&self, selector: PageSelector, source: TextSource) -> Option<&str> {
        self.texts.get(&(selector, source)).map(String::as_str)
    }

    /// Any cached in-range selection on `source`. On a one-page document
    /// every in-range selector resolves to the same text, so any such hit
    /// can stand in for any other. Entries cached for dropped selectors
    /// hold empty text and must not be reused.
    pub(crate) fn any_cached_for(&self, source: TextSource, page_count: u32) -> Option<&str> {
        self.texts
            .iter()
            .find(|((selector, cached_source), _)| {
                *cached_source == source && selector.resolve(page_count).is_some()
            })
            .map(|(_, text)| text.as_str())
    }

    pub(crate) fn insert(&mut self, selector: PageSelector, source: TextSource, text: String) {
        self.texts.insert((selector, source), text);
    }

    pub(crate) fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub(crate) fn set_page_count(&mut self, pages: u32) {
        self.page_count = Some(pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \n\t  "));
        assert!(!is_blank("  x  "));
    }

    #[test]
    fn test_preferred_source() {
        assert_eq!(ConversionMode::Auto.preferred_source(), TextSource::Direct);
        assert_eq!(ConversionMode::Text.preferred_source(), TextSource::Direct);
        assert_eq!(ConversionMode::Ocr.preferred_source(), TextSource::Ocr);
    }

    #[test]
    fn test_context_cache() {
        let mut ctx = DocumentContext::new();
        assert!(ctx.cached(PageSelector::All, TextSource::Direct).is_none());

        ctx.insert(PageSelector::All, TextSource::Direct, "hello".to_string());
        assert_eq!(
            ctx.cached(PageSelector::All, TextSource::Direct),
            Some("hello")
        );
        assert!(ctx.cached(PageSelector::All, TextSource::Ocr).is_none());
        assert_eq!(ctx.any_cached_for(TextSource::Direct, 1), Some("hello"));
        assert!(ctx.any_cached_for(TextSource::Ocr, 1).is_none());
    }

    #[test]
    fn test_any_cached_for_skips_dropped_selectors() {
        let mut ctx = DocumentContext::new();
        ctx.insert(PageSelector::Page(3), TextSource::Direct, String::new());
        assert!(ctx.any_cached_for(TextSource::Direct, 1).is_none());

        ctx.insert(PageSelector::Page(1), TextSource::Direct, "hello".to_string());
        assert_eq!(ctx.any_cached_for(TextSource::Direct, 1), Some("hello"));
    }
}
