//! External collaborator contracts.
//!
//! Page counting, direct text extraction, rasterization and OCR are
//! delegated to external tools behind the [`DocumentTools`] trait. Calls
//! block the calling thread; the engine defines no timeouts.

pub mod shell;

pub use shell::ShellTools;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Physical page range handed to the text-extraction collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRange {
    /// The whole document.
    Whole,
    /// A single 1-based page.
    Single(u32),
}

/// Options forwarded to the rasterization and OCR collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrOptions {
    /// Rasterization density in DPI; higher is more accurate and slower.
    pub density: u32,

    /// Tesseract page segmentation mode (0-13).
    pub psm: u32,

    /// Tesseract OCR engine mode; tesseract's own default when unset.
    pub oem: Option<u32>,

    /// Traineddata language (ISO 639-3) used before a template is selected;
    /// after classification the template's language takes over.
    pub language: String,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            density: 150,
            psm: 6,
            oem: None,
            language: "eng".to_string(),
        }
    }
}

/// The external tools the engine delegates to.
pub trait DocumentTools {
    /// Number of physical pages in the document.
    fn page_count(&self, path: &Path) -> Result<u32>;

    /// Direct text extraction for a page range.
    fn extract_text(&self, path: &Path, range: PageRange) -> Result<String>;

    /// Rasterize one 1-based page to `out` as a PNG.
    fn rasterize(&self, path: &Path, page: u32, density: u32, out: &Path) -> Result<()>;

    /// Recognize text in a rasterized page.
    fn ocr(&self, image: &Path, language: &str, psm: u32, oem: Option<u32>) -> Result<String>;
}
