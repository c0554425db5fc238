//! Lazy per-document text acquisition with source fallback and caching.

use std::path::Path;

use tempfile::Builder;
use tracing::{debug, trace};

use super::{ConversionMode, DocumentContext, PageText, TextSource, is_blank};
use crate::error::Result;
use crate::selector::{PageSelector, sort_selectors};
use crate::tools::{DocumentTools, OcrOptions, PageRange};

/// Resolves page text against the per-document context, invoking the
/// external collaborators at most once per (source, selector) pair.
pub struct PageTextCache<'a, T: DocumentTools> {
    tools: &'a T,
    ocr: &'a OcrOptions,
}

impl<'a, T: DocumentTools> PageTextCache<'a, T> {
    pub fn new(tools: &'a T, ocr: &'a OcrOptions) -> Self {
        Self { tools, ocr }
    }

    /// Text for one selector under `mode`.
    ///
    /// Under [`ConversionMode::Auto`] a blank direct-extraction result is
    /// retried via OCR; the blank result stays cached so it is never
    /// recomputed. Out-of-range selectors resolve to empty text on every
    /// source, so they are returned as-is instead of escalating to OCR.
    pub fn text(
        &self,
        ctx: &mut DocumentContext,
        document: &Path,
        selector: PageSelector,
        mode: ConversionMode,
        language: &str,
    ) -> Result<PageText> {
        let first = self.fetch(ctx, document, selector, mode.preferred_source(), language)?;
        if mode == ConversionMode::Auto && is_blank(&first.text) {
            let pages = self.page_count(ctx, document)?;
            if selector.resolve(pages).is_some() {
                debug!(?selector, "direct text is blank, falling back to OCR");
                return self.fetch(ctx, document, selector, TextSource::Ocr, language);
            }
        }
        Ok(first)
    }

    /// Resolve a batch of selectors, in the deterministic order given by
    /// [`sort_selectors`]. The order decides which selector triggers the
    /// whole-document collaborator call first and thus what the single-page
    /// short-circuit can reuse.
    pub fn warm(
        &self,
        ctx: &mut DocumentContext,
        document: &Path,
        selectors: Vec<PageSelector>,
        mode: ConversionMode,
        language: &str,
    ) -> Result<()> {
        for selector in sort_selectors(selectors) {
            self.text(ctx, document, selector, mode, language)?;
        }
        Ok(())
    }

    fn fetch(
        &self,
        ctx: &mut DocumentContext,
        document: &Path,
        selector: PageSelector,
        source: TextSource,
        language: &str,
    ) -> Result<PageText> {
        if let Some(text) = ctx.cached(selector, source) {
            trace!(?selector, ?source, "cache hit");
            return Ok(PageText {
                text: text.to_string(),
                source,
            });
        }

        let pages = self.page_count(ctx, document)?;

        // Out of range: silently dropped, never an error. Dropped
        // selectors take no part in the short-circuit below, in either
        // direction.
        let Some(range) = selector.resolve(pages) else {
            ctx.insert(selector, source, String::new());
            return Ok(PageText {
                text: String::new(),
                source,
            });
        };

        // On a one-page document every in-range selector covers the same
        // page, so any cached in-range selection on this source stands in
        // for this one.
        if pages == 1 {
            let reused = ctx.any_cached_for(source, pages).map(str::to_string);
            if let Some(text) = reused {
                trace!(?selector, ?source, "single-page short-circuit");
                ctx.insert(selector, source, text.clone());
                return Ok(PageText { text, source });
            }
        }

        let text = match source {
            TextSource::Direct => self.tools.extract_text(document, range)?,
            TextSource::Ocr => self.ocr_pages(document, selector.pages(pages), language)?,
        };

        ctx.insert(selector, source, text.clone());
        Ok(PageText { text, source })
    }

    fn page_count(&self, ctx: &mut DocumentContext, document: &Path) -> Result<u32> {
        if let Some(pages) = ctx.page_count() {
            return Ok(pages);
        }
        let pages = self.tools.page_count(document)?;
        debug!(pages, "queried page count");
        ctx.set_page_count(pages);
        Ok(pages)
    }

    /// OCR a list of physical pages, joining page texts with a blank line.
    /// The rasterized artifact lives exactly for the duration of one OCR
    /// call; it is removed on success and on failure alike.
    fn ocr_pages(&self, document: &Path, pages: Vec<u32>, language: &str) -> Result<String> {
        let mut text = String::new();
        for page in pages {
            let image = Builder::new()
                .prefix("docsift-page-")
                .suffix(".png")
                .tempfile()?;
            self.tools
                .rasterize(document, page, self.ocr.density, image.path())?;
            let page_text = self
                .tools
                .ocr(image.path(), language, self.ocr.psm, self.ocr.oem)?;
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&page_text);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tools::fake::FakeTools;

    fn doc() -> std::path::PathBuf {
        std::path::PathBuf::from("sample.pdf")
    }

    fn cache_for<'a>(tools: &'a FakeTools, ocr: &'a OcrOptions) -> PageTextCache<'a, FakeTools> {
        PageTextCache::new(tools, ocr)
    }

    #[test]
    fn test_single_page_all_then_page_one_invokes_once() {
        let tools = FakeTools::new(&["hello"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let all = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Text, "eng")
            .unwrap();
        let page = cache
            .text(&mut ctx, &doc(), PageSelector::Page(1), ConversionMode::Text, "eng")
            .unwrap();

        assert_eq!(all.text, "hello");
        assert_eq!(page.text, "hello");
        assert_eq!(tools.calls().extract, 1);
    }

    #[test]
    fn test_single_page_short_circuit_is_symmetric() {
        let tools = FakeTools::new(&["hello"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        cache
            .text(&mut ctx, &doc(), PageSelector::Page(1), ConversionMode::Text, "eng")
            .unwrap();
        let all = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Text, "eng")
            .unwrap();

        assert_eq!(all.text, "hello");
        assert_eq!(tools.calls().extract, 1);
    }

    #[test]
    fn test_blank_direct_falls_back_to_ocr_in_auto() {
        let tools = FakeTools::new(&["   \n  "], &["scanned text"]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Auto, "eng")
            .unwrap();

        assert_eq!(page.source, TextSource::Ocr);
        assert_eq!(page.text, "scanned text");
        // the blank direct result is cached, not recomputed
        assert_eq!(ctx.cached(PageSelector::All, TextSource::Direct), Some("   \n  "));
        assert_eq!(tools.calls().extract, 1);
        assert_eq!(tools.calls().ocr, 1);

        // a second request is served entirely from the cache
        cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Auto, "eng")
            .unwrap();
        assert_eq!(tools.calls().extract, 1);
        assert_eq!(tools.calls().ocr, 1);
    }

    #[test]
    fn test_non_blank_direct_never_falls_back() {
        let tools = FakeTools::new(&["INVOICE 42"], &["should not be used"]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Auto, "eng")
            .unwrap();

        assert_eq!(page.source, TextSource::Direct);
        assert_eq!(tools.calls().ocr, 0);
    }

    #[test]
    fn test_text_mode_never_falls_back() {
        let tools = FakeTools::new(&["  "], &["scanned"]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Text, "eng")
            .unwrap();

        assert_eq!(page.source, TextSource::Direct);
        assert!(is_blank(&page.text));
        assert_eq!(tools.calls().ocr, 0);
    }

    #[test]
    fn test_out_of_range_selector_is_dropped() {
        let tools = FakeTools::new(&["one", "two", "three"], &["x", "y", "z"]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::Page(5), ConversionMode::Auto, "eng")
            .unwrap();

        assert_eq!(page.text, "");
        // dropped selectors never reach a collaborator, not even for OCR
        assert_eq!(tools.calls().extract, 0);
        assert_eq!(tools.calls().ocr, 0);
    }

    #[test]
    fn test_out_of_range_selector_does_not_alias_cached_text() {
        let tools = FakeTools::new(&["hello"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        cache
            .text(&mut ctx, &doc(), PageSelector::Page(1), ConversionMode::Text, "eng")
            .unwrap();
        let dropped = cache
            .text(&mut ctx, &doc(), PageSelector::Page(3), ConversionMode::Text, "eng")
            .unwrap();

        assert_eq!(dropped.text, "");
        assert_eq!(tools.calls().extract, 1);
    }

    #[test]
    fn test_dropped_selector_does_not_poison_in_range_ones() {
        let tools = FakeTools::new(&["hello"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let dropped = cache
            .text(&mut ctx, &doc(), PageSelector::Page(3), ConversionMode::Auto, "eng")
            .unwrap();
        assert_eq!(dropped.text, "");

        let all = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Auto, "eng")
            .unwrap();
        assert_eq!(all.text, "hello");
        assert_eq!(all.source, TextSource::Direct);
    }

    #[test]
    fn test_ocr_mode_joins_pages() {
        let tools = FakeTools::new(&["", ""], &["page one", "page two"]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::All, ConversionMode::Ocr, "eng")
            .unwrap();

        assert_eq!(page.text, "page one\n\npage two");
        assert_eq!(tools.calls().rasterize, 2);
        assert_eq!(tools.calls().ocr, 2);
        assert_eq!(tools.calls().extract, 0);
    }

    #[test]
    fn test_last_selector_resolves_highest_page() {
        let tools = FakeTools::new(&["one", "two", "three"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        let page = cache
            .text(&mut ctx, &doc(), PageSelector::Last, ConversionMode::Text, "eng")
            .unwrap();

        assert_eq!(page.text, "three");
    }

    #[test]
    fn test_warm_resolves_in_sorted_order() {
        let tools = FakeTools::new(&["only page"], &[]);
        let ocr = OcrOptions::default();
        let cache = cache_for(&tools, &ocr);
        let mut ctx = DocumentContext::new();

        // "a" sorts first, so the whole-document call happens once and the
        // single-page short-circuit covers the rest
        cache
            .warm(
                &mut ctx,
                &doc(),
                vec![PageSelector::Last, PageSelector::Page(1), PageSelector::All],
                ConversionMode::Text,
                "eng",
            )
            .unwrap();

        assert_eq!(tools.calls().extract, 1);
        assert_eq!(ctx.cached(PageSelector::Last, TextSource::Direct), Some("only page"));
    }
}
