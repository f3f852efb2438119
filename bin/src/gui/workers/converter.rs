use convert::PageProgress;
use relm4::{ComponentSender, Worker};
use session::{
    job::{ConversionJob, ConversionResult, JobId},
    worker::{Work, WorkChannel, WorkHandle, WorkSink},
};

use crate::gui::util;

/// Initialisation data for [ConverterWorker].
pub struct Init {
    pub work_channel: WorkChannel,
}

/// Input messages for [ConverterWorker].
#[derive(Debug)]
pub enum Input {
    // External:
    Start(ConversionJob),
    Cancel,
    // Internal:
    Ended,
}

/// Output messages for [ConverterWorker].
#[derive(Debug)]
pub enum Output {
    Progress { completed: usize, total: usize },
    /// Emitted exactly once for each accepted [Input::Start]. A `Start` that arrives while a
    /// conversion is running is logged and dropped.
    Completed { job: JobId, result: ConversionResult },
}

/// Hands conversion jobs to the [session::worker::JobRunner], so that the GUI thread never waits
/// on a conversion.
pub struct ConverterWorker {
    work_channel: WorkChannel,
    work_handle: Option<WorkHandle>,
}

impl Worker for ConverterWorker {
    type Init = Init;
    type Input = Input;
    type Output = Output;

    fn init(init: Self::Init, _sender: ComponentSender<Self>) -> Self {
        Self {
            work_channel: init.work_channel,
            work_handle: None,
        }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match (message, &mut self.work_handle) {
            (Input::Start(job), Some(_)) => {
                log::warn!("Dropping {}, a conversion is already in progress.", job.id);
            }
            (Input::Start(job), work_handle_opt @ None) => {
                let sink = ComponentSink {
                    job: job.id,
                    sender: sender.clone(),
                };
                let work = Work::new(job, Box::new(sink));
                *work_handle_opt = Some(work.handle());
                self.work_channel.submit(work);
            }
            (Input::Cancel, Some(work_handle)) => {
                log::info!("Cancelling conversion.");
                work_handle.cancel();
            }
            (Input::Cancel, None) => {
                log::debug!("Received cancel request, but no conversion is running.");
            }
            (Input::Ended, None) => {
                log::warn!("Received conversion ended message, but was not running.");
            }
            (Input::Ended, work_handle_opt) => {
                *work_handle_opt = None;
            }
        }
    }
}

impl Drop for ConverterWorker {
    fn drop(&mut self) {
        // Nothing will receive the result, so stop at the next page.
        if let Some(work_handle) = &self.work_handle {
            work_handle.cancel();
        }
    }
}

struct ComponentSink {
    job: JobId,
    sender: ComponentSender<ConverterWorker>,
}

impl WorkSink for ComponentSink {
    fn on_progress(&mut self, progress: PageProgress) {
        util::send_output_or_log(
            Output::Progress {
                completed: progress.completed,
                total: progress.total,
            },
            "conversion progress",
            &self.sender,
        );
    }

    fn on_complete(self: Box<Self>, result: ConversionResult) {
        self.sender.input(Input::Ended);
        util::send_output_or_log(
            Output::Completed {
                job: self.job,
                result,
            },
            "conversion result",
            &self.sender,
        );
    }
}
