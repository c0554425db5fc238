//! Template scoring and selection.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, SiftError};
use crate::extract::compile_regex;
use crate::template::Template;
use crate::text::{ConversionMode, DocumentContext, PageTextCache};
use crate::tools::DocumentTools;

/// Score every template against the document and select the single best
/// unambiguous match, storing it in the context.
///
/// A template's score is the number of non-overlapping matches of its
/// regex in the text of its page selection. The top score must be nonzero
/// and strictly higher than the runner-up; ties below the top two ranks
/// are irrelevant.
pub fn classify<T: DocumentTools>(
    cache: &PageTextCache<'_, T>,
    ctx: &mut DocumentContext,
    document: &Path,
    mut templates: Vec<Template>,
    mode: ConversionMode,
    language: &str,
) -> Result<String> {
    if templates.is_empty() {
        return Err(SiftError::NoTemplatesAvailable);
    }

    // resolve the distinct page selections up front, in deterministic order
    let selectors: BTreeSet<_> = templates.iter().map(|t| t.page_detection).collect();
    cache.warm(ctx, document, selectors.into_iter().collect(), mode, language)?;

    let mut scores = Vec::with_capacity(templates.len());
    for template in &templates {
        let regex = compile_regex(&template.regex)?;
        let page = cache.text(ctx, document, template.page_detection, mode, language)?;
        let score = regex.find_iter(&page.text).count();
        debug!(template = %template.id, score, "scored template");
        scores.push(score);
    }

    let mut ranked: Vec<usize> = (0..templates.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]));

    let best = ranked[0];
    if scores[best] == 0 {
        return Err(SiftError::NoTemplateFound);
    }
    if ranked.len() > 1 && scores[ranked[1]] == scores[best] {
        return Err(SiftError::AmbiguousTemplate);
    }

    let winner = templates.swap_remove(best);
    let id = winner.id.clone();
    info!(template = %id, score = scores[best], "selected template");
    ctx.template = Some(winner);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::selector::PageSelector;
    use crate::tools::OcrOptions;
    use crate::tools::fake::FakeTools;

    fn template(id: &str, regex: &str, page_detection: PageSelector) -> Template {
        Template {
            id: id.to_string(),
            title: id.to_uppercase(),
            regex: regex.to_string(),
            language: "eng".to_string(),
            page_detection,
            pattern: Vec::new(),
        }
    }

    fn run(
        tools: &FakeTools,
        templates: Vec<Template>,
        mode: ConversionMode,
    ) -> (Result<String>, DocumentContext) {
        let ocr = OcrOptions::default();
        let cache = PageTextCache::new(tools, &ocr);
        let mut ctx = DocumentContext::new();
        let result = classify(
            &cache,
            &mut ctx,
            Path::new("sample.pdf"),
            templates,
            mode,
            "eng",
        );
        (result, ctx)
    }

    #[test]
    fn test_highest_score_wins() {
        let tools = FakeTools::new(&["INVOICE one INVOICE two INVOICE"], &[]);
        let templates = vec![
            template("t1", "INVOICE", PageSelector::All),
            template("t2", "RECEIPT", PageSelector::All),
        ];

        let (result, ctx) = run(&tools, templates, ConversionMode::Text);
        assert_eq!(result.unwrap(), "t1");
        assert_eq!(ctx.template.unwrap().id, "t1");
    }

    #[test]
    fn test_order_of_candidates_does_not_matter() {
        let tools = FakeTools::new(&["INVOICE one INVOICE"], &[]);
        let templates = vec![
            template("t2", "RECEIPT", PageSelector::All),
            template("t1", "INVOICE", PageSelector::All),
        ];

        let (result, _) = run(&tools, templates, ConversionMode::Text);
        assert_eq!(result.unwrap(), "t1");
    }

    #[test]
    fn test_all_zero_scores_is_no_template_found() {
        let tools = FakeTools::new(&["nothing to see here"], &[]);
        let templates = vec![
            template("t1", "INVOICE", PageSelector::All),
            template("t2", "RECEIPT", PageSelector::All),
        ];

        let (result, ctx) = run(&tools, templates, ConversionMode::Text);
        assert!(matches!(result, Err(SiftError::NoTemplateFound)));
        assert!(ctx.template.is_none());
    }

    #[test]
    fn test_tied_top_scores_are_ambiguous() {
        let tools = FakeTools::new(&["INVOICE RECEIPT INVOICE RECEIPT"], &[]);
        let templates = vec![
            template("t1", "INVOICE", PageSelector::All),
            template("t2", "RECEIPT", PageSelector::All),
        ];

        let (result, _) = run(&tools, templates, ConversionMode::Text);
        assert!(matches!(result, Err(SiftError::AmbiguousTemplate)));
    }

    #[test]
    fn test_tie_below_the_top_is_fine() {
        let tools = FakeTools::new(&["INVOICE INVOICE RECEIPT STATEMENT"], &[]);
        let templates = vec![
            template("t1", "INVOICE", PageSelector::All),
            template("t2", "RECEIPT", PageSelector::All),
            template("t3", "STATEMENT", PageSelector::All),
        ];

        let (result, _) = run(&tools, templates, ConversionMode::Text);
        assert_eq!(result.unwrap(), "t1");
    }

    #[test]
    fn test_empty_store_is_an_error() {
        let tools = FakeTools::new(&["INVOICE"], &[]);
        let (result, _) = run(&tools, Vec::new(), ConversionMode::Text);
        assert!(matches!(result, Err(SiftError::NoTemplatesAvailable)));
    }

    #[test]
    fn test_invalid_template_regex() {
        let tools = FakeTools::new(&["INVOICE"], &[]);
        let templates = vec![template("t1", "(unclosed", PageSelector::All)];
        let (result, _) = run(&tools, templates, ConversionMode::Text);
        assert!(matches!(result, Err(SiftError::PatternConfigInvalid(_))));
    }

    #[test]
    fn test_shared_selector_is_fetched_once() {
        let tools = FakeTools::new(&["INVOICE", "other"], &[]);
        let templates = vec![
            template("t1", "INVOICE", PageSelector::Page(1)),
            template("t2", "RECEIPT", PageSelector::Page(1)),
        ];

        let (result, _) = run(&tools, templates, ConversionMode::Text);
        assert_eq!(result.unwrap(), "t1");
        assert_eq!(tools.calls().extract, 1);
    }
}
