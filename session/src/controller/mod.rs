//! State behind the conversion UI, independent of any widget toolkit.
//!
//! The GUI forwards user actions and worker events into [Controller], and renders whatever it
//! reports back: [Status], [Progress], and [Notice]s to show as dialogs.

use std::path::PathBuf;

use crate::{
    job::{ConversionJob, ConversionResult, JobId},
    selection::{Selection, SelectionError, display_name},
};


/// Reasons that a conversion could not be started.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StartError {
    #[error("A conversion is already running.")]
    AlreadyRunning,
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Status {
    #[default]
    Ready,
    Running,
    Succeeded,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Running => "Converting...",
            Status::Succeeded => "Conversion succeeded",
            Status::Failed => "Conversion failed",
        }
    }
}

/// What the progress indicator should show.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Progress {
    #[default]
    Idle,
    /// Running, with no page finished yet.
    Indeterminate,
    /// Fraction of pages completed, in `0.0..=1.0`.
    Fraction(f64),
    Full,
}

/// A message for the user, to be shown modally.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    Info(String),
    /// Something the user can fix before trying again.
    Warning(String),
    Error(String),
}

impl From<StartError> for Notice {
    fn from(err: StartError) -> Self {
        Notice::Warning(err.to_string())
    }
}

#[derive(Debug, Default)]
pub struct Controller {
    selection: Selection,
    status: Status,
    progress: Progress,
    running: Option<JobId>,
    last_job: JobId,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn running_job(&self) -> Option<JobId> {
        self.running
    }

    /// Whether the convert action should be available.
    pub fn can_start(&self) -> bool {
        self.running.is_none()
    }

    pub fn select_input_pdf(&mut self, path: PathBuf) {
        log::debug!("Selected input PDF {:?}.", path);
        self.selection.set_input_pdf(path);
    }

    pub fn select_output_dir(&mut self, path: PathBuf) {
        log::debug!("Selected output directory {:?}.", path);
        self.selection.set_output_dir(path);
    }

    pub fn set_pages_text(&mut self, text: String) {
        self.selection.set_pages_text(text);
    }

    pub fn input_pdf_label(&self) -> String {
        display_name(self.selection.input_pdf())
    }

    pub fn output_dir_label(&self) -> String {
        display_name(self.selection.output_dir())
    }

    /// Validates the selection and, if valid, creates the job to hand to the worker. The
    /// controller then considers the job to be running until [Self::on_conversion_complete].
    pub fn start_conversion(&mut self) -> Result<ConversionJob, StartError> {
        if let Some(id) = self.running {
            log::warn!("Not starting a conversion, {} is still running.", id);
            return Err(StartError::AlreadyRunning);
        }

        let id = self.last_job.next();
        let job = self.selection.build_job(id)?;
        self.last_job = id;
        self.running = Some(id);
        self.status = Status::Running;
        self.progress = Progress::Indeterminate;
        log::info!("Created {} for {}.", id, describe_job(&job));
        Ok(job)
    }

    pub fn on_progress(&mut self, completed: usize, total: usize) {
        if self.running.is_none() {
            log::debug!("Ignoring progress with no conversion running.");
            return;
        }
        if total > 0 {
            self.progress = Progress::Fraction((completed as f64 / total as f64).clamp(0.0, 1.0));
        }
    }

    /// Records the end of the running job. Returns the notice to show, or `None` if `job` is not
    /// the running job.
    pub fn on_conversion_complete(
        &mut self,
        job: JobId,
        result: ConversionResult,
    ) -> Option<Notice> {
        let Some(id) = self.running.filter(|id| *id == job) else {
            log::warn!(
                "Ignoring result of {}, running {:?}: {}",
                job,
                self.running,
                result.message
            );
            return None;
        };
        self.running = None;

        self.progress = Progress::Full;
        if result.success {
            log::info!("{} succeeded.", id);
            self.status = Status::Succeeded;
            Some(Notice::Info(result.message))
        } else {
            log::info!("{} failed: {}", id, result.message);
            self.status = Status::Failed;
            Some(Notice::Error(result.message))
        }
    }
}

fn describe_job(job: &ConversionJob) -> String {
    let pages = match &job.pages {
        None => "all pages".to_string(),
        Some(pages) => format!("pages {}", pages),
    };
    format!(
        "{} of {} into {:?}",
        pages,
        display_name(Some(&job.input_pdf)),
        job.output_dir
    )
}
