use std::{fmt::Display, path::PathBuf};

use convert::PageSelector;

/// Identifies a conversion job within a session.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JobId(pub u64);

impl JobId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job #{}", self.0)
    }
}

/// A single requested conversion. Page numbers are not checked against the document here.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionJob {
    pub id: JobId,
    pub input_pdf: PathBuf,
    pub output_dir: PathBuf,
    /// `None` converts all pages.
    pub pages: Option<PageSelector>,
}

/// Outcome of a [ConversionJob], produced exactly once per job.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConversionResult {
    pub success: bool,
    pub message: String,
}

impl ConversionResult {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
