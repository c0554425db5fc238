//! Append-only conversion log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Result;

const LOG_FILE: &str = "conversions.log";

/// Durable record of every conversion outcome, kept separate from the
/// diagnostic tracing output.
#[derive(Debug, Clone)]
pub struct ConversionLog {
    file: PathBuf,
}

impl ConversionLog {
    /// Log under `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            file: dir.join(LOG_FILE),
        })
    }

    /// Append one entry, framed by a separator rule and a UTC timestamp.
    pub fn append(&self, entry: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        writeln!(
            file,
            "+{:-<80}+\n{}\n\n{}\n",
            "",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            entry
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_framed_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversionLog::new(dir.path()).unwrap();

        log.append("first entry").unwrap();
        log.append("second entry").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches(&format!("+{:-<80}+", "")).count(), 2);
        assert!(content.contains("first entry"));
        assert!(content.contains("second entry"));
        assert!(content.find("first entry").unwrap() < content.find("second entry").unwrap());
    }
}
