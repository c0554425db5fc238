//! Core library for template-based document classification and extraction.
//!
//! This crate provides:
//! - flat-file template definitions with ordered field patterns
//! - lazy per-page text acquisition with OCR fallback and caching
//! - regex scoring of templates against a document
//! - field extraction with capture-group assignment

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod logsink;
pub mod selector;
pub mod template;
pub mod text;
pub mod tools;

pub use config::SiftConfig;
pub use engine::{BatchError, ConvertOptions, DirectoryReport, DocumentRecord, Engine};
pub use error::{Result, SiftError};
pub use extract::{FieldValue, MatchValue};
pub use logsink::ConversionLog;
pub use selector::{PageSelector, sort_selectors};
pub use template::{FieldPattern, JsonTemplateStore, Template, TemplateStore};
pub use text::{ConversionMode, DocumentContext, PageText, TextSource};
pub use tools::{DocumentTools, OcrOptions, PageRange, ShellTools};
