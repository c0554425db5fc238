//! Configuration for the conversion pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tools::OcrOptions;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Directory holding the template definitions.
    pub templates_dir: PathBuf,

    /// Directory the conversion log is written to.
    pub log_dir: PathBuf,

    /// OCR fallback settings.
    pub ocr: OcrOptions,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            log_dir: PathBuf::from("logs"),
            ocr: OcrOptions::default(),
        }
    }
}

impl SiftConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
