use std::path::{Path, PathBuf};

use convert::{PageRangeError, parse_pages_arg};

use crate::job::{ConversionJob, JobId};

pub const NOT_SELECTED: &str = "<not selected>";

/// Reasons that the current [Selection] cannot become a [ConversionJob].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Select a PDF file first.")]
    MissingInputPdf,
    #[error("Select an output directory first.")]
    MissingOutputDir,
    #[error("Invalid page range: {0}.")]
    Pages(#[from] PageRangeError),
}

/// What the user has chosen so far.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    input_pdf: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    pages_text: String,
}

impl Selection {
    pub fn input_pdf(&self) -> Option<&Path> {
        self.input_pdf.as_deref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn pages_text(&self) -> &str {
        &self.pages_text
    }

    pub fn set_input_pdf(&mut self, path: PathBuf) {
        self.input_pdf = Some(path);
    }

    pub fn set_output_dir(&mut self, path: PathBuf) {
        self.output_dir = Some(path);
    }

    pub fn set_pages_text(&mut self, text: String) {
        self.pages_text = text;
    }

    /// Validates the selection and creates a job from it. Blank page text means all pages.
    pub fn build_job(&self, id: JobId) -> Result<ConversionJob, SelectionError> {
        let input_pdf = self
            .input_pdf
            .clone()
            .ok_or(SelectionError::MissingInputPdf)?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or(SelectionError::MissingOutputDir)?;

        let pages_text = self.pages_text.trim();
        let pages = if pages_text.is_empty() {
            None
        } else {
            Some(parse_pages_arg(pages_text)?)
        };

        Ok(ConversionJob {
            id,
            input_pdf,
            output_dir,
            pages,
        })
    }
}

/// Text for a label showing a selected file or directory: its base name.
pub fn display_name(path: Option<&Path>) -> String {
    match path {
        None => NOT_SELECTED.to_string(),
        Some(path) => match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            // e.g. "/" has no base name.
            None => path.to_string_lossy().into_owned(),
        },
    }
}
