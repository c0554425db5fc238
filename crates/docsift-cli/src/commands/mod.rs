//! CLI subcommands.

pub mod batch;
pub mod convert;
pub mod peek;
pub mod template;

use clap::Args;

use docsift_core::{ConversionMode, ConvertOptions, SiftConfig};

/// Text-acquisition mode.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// Direct extraction, with OCR fallback on blank text
    Auto,
    /// Direct extraction only
    Txt,
    /// OCR only
    Ocr,
}

impl From<ModeArg> for ConversionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => ConversionMode::Auto,
            ModeArg::Txt => ConversionMode::Text,
            ModeArg::Ocr => ConversionMode::Ocr,
        }
    }
}

/// OCR overrides shared by the conversion commands.
#[derive(Args, Debug)]
pub struct OcrArgs {
    /// Rasterization density in DPI
    #[arg(long)]
    density: Option<u32>,

    /// Tesseract page segmentation mode
    #[arg(long)]
    psm: Option<u32>,

    /// Tesseract OCR engine mode
    #[arg(long)]
    oem: Option<u32>,

    /// OCR language used before a template is selected
    #[arg(short, long)]
    language: Option<String>,
}

impl OcrArgs {
    /// Conversion options: config values with command-line overrides on top.
    pub fn options(&self, config: &SiftConfig, mode: ModeArg, delete_file: bool) -> ConvertOptions {
        let mut ocr = config.ocr.clone();
        if let Some(density) = self.density {
            ocr.density = density;
        }
        if let Some(psm) = self.psm {
            ocr.psm = psm;
        }
        if self.oem.is_some() {
            ocr.oem = self.oem;
        }
        if let Some(language) = &self.language {
            ocr.language = language.clone();
        }
        ConvertOptions {
            mode: mode.into(),
            delete_file,
            ocr,
        }
    }
}
