//! Production collaborators backed by Poppler, ImageMagick and Tesseract.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::{DocumentTools, PageRange};
use crate::error::{Result, SiftError};

lazy_static! {
    static ref PAGES_LINE: Regex = Regex::new(r"(?m)^Pages:\s+(\d+)").unwrap();
}

/// Shell-command implementations of the collaborator contracts.
///
/// Each binary is located on `$PATH` on first use and the resolved path is
/// reused for the lifetime of the value.
#[derive(Debug, Default)]
pub struct ShellTools {
    pdfinfo: OnceLock<PathBuf>,
    pdftotext: OnceLock<PathBuf>,
    convert: OnceLock<PathBuf>,
    tesseract: OnceLock<PathBuf>,
}

impl ShellTools {
    pub fn new() -> Self {
        Self::default()
    }

    fn locate(cache: &OnceLock<PathBuf>, tool: &'static str, hint: &'static str) -> Result<PathBuf> {
        if let Some(path) = cache.get() {
            return Ok(path.clone());
        }
        let found = env::var_os("PATH")
            .and_then(|paths| {
                env::split_paths(&paths)
                    .map(|dir| dir.join(tool))
                    .find(|candidate| candidate.is_file())
            })
            .ok_or(SiftError::CollaboratorUnavailable { tool, hint })?;
        debug!("located {} at {}", tool, found.display());
        Ok(cache.get_or_init(|| found).clone())
    }

    fn run(mut command: Command, tool: &'static str) -> Result<String> {
        trace!(?command, "running collaborator");
        let output = command
            .output()
            .map_err(|e| SiftError::CollaboratorExecutionFailed {
                tool,
                stderr: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(SiftError::CollaboratorExecutionFailed {
                tool,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    PAGES_LINE
        .captures(pdfinfo_output)
        .and_then(|caps| caps[1].parse().ok())
}

impl DocumentTools for ShellTools {
    fn page_count(&self, path: &Path) -> Result<u32> {
        let pdfinfo = Self::locate(
            &self.pdfinfo,
            "pdfinfo",
            "install the Poppler utilities (e.g. 'apt install poppler-utils' or 'brew install poppler')",
        )?;
        let mut command = Command::new(pdfinfo);
        command.arg(path);
        let output = Self::run(command, "pdfinfo")?;
        parse_page_count(&output).ok_or(SiftError::CollaboratorExecutionFailed {
            tool: "pdfinfo",
            stderr: "number of pages could not be detected".to_string(),
        })
    }

    fn extract_text(&self, path: &Path, range: PageRange) -> Result<String> {
        let pdftotext = Self::locate(
            &self.pdftotext,
            "pdftotext",
            "install the Poppler utilities (e.g. 'apt install poppler-utils' or 'brew install poppler')",
        )?;
        let mut command = Command::new(pdftotext);
        command.arg("-layout");
        if let PageRange::Single(page) = range {
            command
                .arg("-f")
                .arg(page.to_string())
                .arg("-l")
                .arg(page.to_string());
        }
        command.arg(path).arg("-");
        Self::run(command, "pdftotext")
    }

    fn rasterize(&self, path: &Path, page: u32, density: u32, out: &Path) -> Result<()> {
        let convert = Self::locate(
            &self.convert,
            "convert",
            "install the ImageMagick suite (e.g. 'apt install imagemagick' or 'brew install imagemagick')",
        )?;
        // ImageMagick addresses pages with a zero-based [n] suffix.
        let mut input = OsString::from(path);
        input.push(format!("[{}]", page - 1));
        let mut command = Command::new(convert);
        command
            .arg("-density")
            .arg(density.to_string())
            .arg("-trim")
            .arg(input)
            .arg(out);
        Self::run(command, "convert").map(|_| ())
    }

    fn ocr(&self, image: &Path, language: &str, psm: u32, oem: Option<u32>) -> Result<String> {
        let tesseract = Self::locate(
            &self.tesseract,
            "tesseract",
            "install TesseractOCR (e.g. 'apt install tesseract-ocr' or 'brew install tesseract')",
        )?;
        let mut command = Command::new(tesseract);
        command
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg(psm.to_string());
        if let Some(oem) = oem {
            command.arg("--oem").arg(oem.to_string());
        }
        Self::run(command, "tesseract")
    }
}
