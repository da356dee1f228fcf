use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File name offered for the downloaded summary.
pub const SUMMARY_FILE_NAME: &str = "summary.txt";

/// MIME type of the downloaded summary.
pub const SUMMARY_MIME: &str = "text/plain";

/// The final summary packaged as a downloadable plain-text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryArtifact {
    contents: String,
}

impl SummaryArtifact {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            contents: summary.into(),
        }
    }

    pub fn file_name(&self) -> &'static str {
        SUMMARY_FILE_NAME
    }

    pub fn mime(&self) -> &'static str {
        SUMMARY_MIME
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Write `summary.txt` into `dir`, replacing any previous file.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.contents)?;
        Ok(())
    }
}
