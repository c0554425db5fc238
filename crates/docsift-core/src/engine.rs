//! Conversion pipeline: classify a document, then run the winning
//! template's field patterns over it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::classify::classify;
use crate::config::SiftConfig;
use crate::error::{Result, SiftError};
use crate::extract::{FieldValue, extract_field};
use crate::logsink::ConversionLog;
use crate::selector::PageSelector;
use crate::template::{JsonTemplateStore, TemplateStore};
use crate::text::{ConversionMode, DocumentContext, PageText, PageTextCache};
use crate::tools::{DocumentTools, OcrOptions, ShellTools};

/// Structured result of one conversion: the matched template's display
/// title plus one value per distinct field title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub title: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Per-conversion knobs.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub mode: ConversionMode,
    /// Remove the input document after conversion, successful or not.
    pub delete_file: bool,
    pub ocr: OcrOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: ConversionMode::Auto,
            delete_file: false,
            ocr: OcrOptions::default(),
        }
    }
}

/// One failed document in a directory run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub file: String,
    pub error: String,
}

/// Outcome of a directory run; failures never abort the remaining files.
#[derive(Debug, Default, Serialize)]
pub struct DirectoryReport {
    pub records: BTreeMap<String, DocumentRecord>,
    pub errors: Vec<BatchError>,
}

/// The conversion engine, generic over template storage and the external
/// collaborators so the pipeline is testable without any of the shell
/// tools installed.
pub struct Engine<S = JsonTemplateStore, T = ShellTools> {
    store: S,
    tools: T,
    log: ConversionLog,
}

impl Engine {
    /// Engine over the flat-file store and the shell collaborators.
    pub fn from_config(config: &SiftConfig) -> Result<Self> {
        Ok(Self {
            store: JsonTemplateStore::new(&config.templates_dir)?,
            tools: ShellTools::new(),
            log: ConversionLog::new(&config.log_dir)?,
        })
    }
}

impl<S: TemplateStore, T: DocumentTools> Engine<S, T> {
    pub fn new(store: S, tools: T, log: ConversionLog) -> Self {
        Self { store, tools, log }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Convert a single document and log the outcome.
    ///
    /// With `delete_file` set the input is removed on success and on
    /// failure alike, after the outcome has been logged.
    pub fn convert_document(&self, path: &Path, opts: &ConvertOptions) -> Result<DocumentRecord> {
        let name = file_name(path);
        let result = match self.convert_inner(path, opts) {
            Ok(record) => {
                let rendered = serde_json::to_string_pretty(&record)?;
                self.log
                    .append(&format!("Conversion of {name} successful:\n{rendered}"))?;
                Ok(record)
            }
            Err(e) => {
                self.log
                    .append(&format!("Error while converting {name}: {e}"))?;
                Err(e)
            }
        };
        if opts.delete_file && path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("could not remove {}: {}", path.display(), e);
            }
        }
        result
    }

    fn convert_inner(&self, path: &Path, opts: &ConvertOptions) -> Result<DocumentRecord> {
        check_document_path(path)?;

        // Templates are re-read per conversion so edits take effect
        // without a restart.
        let templates = self.store.list()?;

        let mut ctx = DocumentContext::new();
        let cache = PageTextCache::new(&self.tools, &opts.ocr);
        classify(
            &cache,
            &mut ctx,
            path,
            templates,
            opts.mode,
            &opts.ocr.language,
        )?;
        let template = match ctx.template.take() {
            Some(template) => template,
            None => return Err(SiftError::NoTemplateFound),
        };
        info!(
            template = %template.id,
            document = %file_name(path),
            "converting document"
        );

        let mut fields = BTreeMap::new();
        for pattern in &template.pattern {
            let value = extract_field(&cache, &mut ctx, path, pattern, opts.mode, &template.language)?;
            merge_field(&mut fields, &pattern.title, value);
        }

        Ok(DocumentRecord {
            title: template.title,
            fields,
        })
    }

    /// Convert every PDF in a directory, in file-name order. A failing
    /// document is recorded and the run continues.
    pub fn convert_directory(&self, dir: &Path, opts: &ConvertOptions) -> Result<DirectoryReport> {
        if !dir.is_dir() {
            return Err(SiftError::PathInvalid(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        files.sort();

        let mut report = DirectoryReport::default();
        for path in files {
            let name = file_name(&path);
            match self.convert_document(&path, opts) {
                Ok(record) => {
                    report.records.insert(name, record);
                }
                Err(e) => {
                    warn!("conversion of {} failed: {}", path.display(), e);
                    report.errors.push(BatchError {
                        file: name,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Raw page text for one selector, without touching any template.
    pub fn peek_text(
        &self,
        path: &Path,
        selector: PageSelector,
        opts: &ConvertOptions,
    ) -> Result<PageText> {
        check_document_path(path)?;
        let mut ctx = DocumentContext::new();
        let cache = PageTextCache::new(&self.tools, &opts.ocr);
        cache.text(&mut ctx, path, selector, opts.mode, &opts.ocr.language)
    }
}

fn check_document_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(SiftError::PathInvalid(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(SiftError::PathInvalid(format!(
            "{} is not a PDF document",
            path.display()
        )));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Fold a field value into the record under its title. Duplicate titles
/// merge: an empty later value never clobbers an earlier one, otherwise
/// the match sequences are concatenated.
fn merge_field(fields: &mut BTreeMap<String, FieldValue>, title: &str, value: FieldValue) {
    match fields.remove(title) {
        None => {
            fields.insert(title.to_string(), value);
        }
        Some(existing) => {
            let merged = if value.is_empty() {
                existing
            } else if existing.is_empty() {
                value
            } else {
                existing.merge(value)
            };
            fields.insert(title.to_string(), merged);
        }
    }
}
