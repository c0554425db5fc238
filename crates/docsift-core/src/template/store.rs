//! Flat-file template persistence.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{FieldPattern, Template};
use crate::error::{Result, SiftError};
use crate::selector::PageSelector;

/// Abstract template storage so the backing technology is swappable
/// without touching classification or extraction.
pub trait TemplateStore {
    /// All stored templates, re-read from the backing store. Callers run
    /// this before every classification so external edits take effect
    /// without a restart.
    fn list(&self) -> Result<Vec<Template>>;

    /// A single template by id.
    fn get(&self, id: &str) -> Result<Option<Template>>;

    /// Create a fresh definition under `id`. An existing definition is only
    /// replaced when `override_if_exists` is set; otherwise the call is a
    /// no-op and the stored definition wins.
    fn upsert(
        &self,
        id: &str,
        title: &str,
        regex: &str,
        page_detection: PageSelector,
        language: &str,
        override_if_exists: bool,
    ) -> Result<()>;

    /// Append a field pattern to the end of a template's ordered sequence.
    fn append_field_pattern(&self, id: &str, pattern: FieldPattern) -> Result<()>;

    /// Remove a definition.
    fn delete(&self, id: &str) -> Result<()>;
}

/// Template store over a directory of `<id>.json` files, one addressable
/// unit per template; there are no partial updates.
#[derive(Debug, Clone)]
pub struct JsonTemplateStore {
    dir: PathBuf,
}

impl JsonTemplateStore {
    /// Store over `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, path: &Path) -> Result<Template> {
        let content = fs::read_to_string(path)?;
        let mut template: Template = serde_json::from_str(&content)?;
        template.id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(template)
    }

    fn write(&self, template: &Template) -> Result<()> {
        let content = serde_json::to_string_pretty(template)?;
        fs::write(self.file(&template.id), content)?;
        Ok(())
    }
}

impl TemplateStore for JsonTemplateStore {
    fn list(&self) -> Result<Vec<Template>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        files.sort();

        let mut templates = Vec::with_capacity(files.len());
        for path in files {
            templates.push(self.read(&path)?);
        }
        debug!("loaded {} template definitions", templates.len());
        Ok(templates)
    }

    fn get(&self, id: &str) -> Result<Option<Template>> {
        let path = self.file(id);
        if !path.is_file() {
            return Ok(None);
        }
        self.read(&path).map(Some)
    }

    fn upsert(
        &self,
        id: &str,
        title: &str,
        regex: &str,
        page_detection: PageSelector,
        language: &str,
        override_if_exists: bool,
    ) -> Result<()> {
        if self.file(id).exists() && !override_if_exists {
            debug!("template {} exists, keeping the stored definition", id);
            return Ok(());
        }
        self.write(&Template {
            id: id.to_string(),
            title: title.to_string(),
            regex: regex.to_string(),
            language: language.to_string(),
            page_detection,
            pattern: Vec::new(),
        })
    }

    fn append_field_pattern(&self, id: &str, pattern: FieldPattern) -> Result<()> {
        let mut template = self
            .get(id)?
            .ok_or_else(|| SiftError::TemplateNotFound(id.to_string()))?;
        template.pattern.push(pattern);
        self.write(&template)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.file(id);
        if !path.is_file() {
            return Err(SiftError::TemplateNotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
