//! Runs conversion jobs away from the UI thread.
//!
//! [JobRunner] owns a dedicated thread that performs conversions one at a time. UI code submits
//! [Work] over a [WorkChannel], keeps the [WorkHandle] to request cancellation, and receives
//! progress and exactly one [ConversionResult] through its [WorkSink].

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use anyhow::Result;
use convert::{ConversionSummary, ConvertError, ConvertEvents, ConvertOptions, PageProgress};
use utils::mpscutil;

use crate::job::{ConversionJob, ConversionResult};


pub const SUCCEEDED_MESSAGE: &str = "Conversion succeeded";
pub const CANCELLED_MESSAGE: &str = "Conversion cancelled";

/// Performs the conversion for a job. Implementations block until the conversion is complete.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        job: &ConversionJob,
        events: &mut dyn ConvertEvents,
    ) -> Result<ConversionSummary>;
}

/// [Converter] that writes DXF files with [convert::extract_and_convert].
pub struct DxfConverter {
    options: ConvertOptions,
}

impl DxfConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }
}

impl Converter for DxfConverter {
    fn convert(
        &self,
        job: &ConversionJob,
        events: &mut dyn ConvertEvents,
    ) -> Result<ConversionSummary> {
        let summary = convert::extract_and_convert(
            &job.input_pdf,
            &job.output_dir,
            job.pages.as_ref(),
            &self.options,
            events,
        )?;
        Ok(summary)
    }
}

/// Runs `job` on the current thread, turning every outcome (including a panic inside the
/// converter) into a single [ConversionResult].
pub fn run_job(
    converter: &dyn Converter,
    job: &ConversionJob,
    events: &mut dyn ConvertEvents,
) -> ConversionResult {
    log::info!(
        "Starting {}: {:?} into {:?}.",
        job.id,
        job.input_pdf,
        job.output_dir
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| converter.convert(job, events)));

    let result = match outcome {
        Ok(Ok(summary)) => {
            log::info!(
                "{} wrote {} DXF files: {:?}",
                job.id,
                summary.outputs.len(),
                summary.outputs
            );
            ConversionResult::succeeded(SUCCEEDED_MESSAGE)
        }
        Ok(Err(err)) if is_cancelled(&err) => ConversionResult::failed(CANCELLED_MESSAGE),
        Ok(Err(err)) => ConversionResult::failed(format!("{:#}", err)),
        Err(payload) => {
            ConversionResult::failed(format!("conversion panicked: {}", panic_text(&*payload)))
        }
    };

    if result.success {
        log::info!("Finished {}: {}", job.id, result.message);
    } else {
        log::warn!("Failed {}: {}", job.id, result.message);
    }
    result
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ConvertError>(),
            Some(ConvertError::Cancelled)
        )
    })
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

/// Receives the events for a single piece of [Work].
pub trait WorkSink: Send {
    fn on_progress(&mut self, progress: PageProgress);

    /// Called exactly once, after which the sink is dropped.
    fn on_complete(self: Box<Self>, result: ConversionResult);
}

/// A [ConversionJob] paired with where its events go.
pub struct Work {
    job: ConversionJob,
    sink: Box<dyn WorkSink>,
    continue_intent: Arc<AtomicBool>,
}

impl Work {
    pub fn new(job: ConversionJob, sink: Box<dyn WorkSink>) -> Self {
        Self {
            job,
            sink,
            continue_intent: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn job(&self) -> &ConversionJob {
        &self.job
    }

    pub fn handle(&self) -> WorkHandle {
        WorkHandle {
            continue_intent: self.continue_intent.clone(),
        }
    }

    /// Completes the work as failed without running it.
    pub fn abandon(self, message: &str) {
        log::warn!("Abandoning {}: {}", self.job.id, message);
        self.sink.on_complete(ConversionResult::failed(message));
    }

    fn run(self, converter: &dyn Converter) {
        let Work {
            job,
            sink,
            continue_intent,
        } = self;
        let mut events = WorkEvents {
            sink,
            continue_intent,
        };
        let result = run_job(converter, &job, &mut events);
        events.sink.on_complete(result);
    }
}

struct WorkEvents {
    sink: Box<dyn WorkSink>,
    continue_intent: Arc<AtomicBool>,
}

impl ConvertEvents for WorkEvents {
    fn on_page_converted(&mut self, progress: PageProgress) {
        log::debug!(
            "Converted page {} ({}/{}) to {:?}.",
            progress.page,
            progress.completed,
            progress.total,
            progress.output
        );
        self.sink.on_progress(progress);
    }

    fn do_continue(&self) -> bool {
        self.continue_intent.load(Ordering::Relaxed)
    }
}

/// Requests cancellation of submitted [Work].
#[derive(Clone, Debug)]
pub struct WorkHandle {
    continue_intent: Arc<AtomicBool>,
}

impl WorkHandle {
    /// Conversion stops before starting the next page.
    pub fn cancel(&self) {
        self.continue_intent.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        !self.continue_intent.load(Ordering::Relaxed)
    }
}

enum Request {
    Run(Work),
    Shutdown,
}

/// Submits [Work] to a [JobRunner].
#[derive(Clone)]
pub struct WorkChannel {
    sender: mpsc::SyncSender<Request>,
}

impl WorkChannel {
    /// Blocks until the runner accepts the work, which only happens between jobs. If the runner
    /// has stopped, the work is completed as failed.
    pub fn submit(&self, work: Work) {
        if let Err(mpsc::SendError(Request::Run(work))) = self.sender.send(Request::Run(work)) {
            work.abandon("Could not start conversion, the conversion worker has stopped.");
        }
    }

    /// Asks the runner to stop once any current job has finished.
    pub fn shutdown(&self) {
        mpscutil::send_or_log_warning(
            &self.sender,
            "conversion worker shutdown",
            Request::Shutdown,
        );
    }
}

/// Performs submitted [Work] serially on the thread that calls [JobRunner::run].
pub struct JobRunner<'a> {
    converter: &'a dyn Converter,

    request_sender: mpsc::SyncSender<Request>,
    request_receiver: mpsc::Receiver<Request>,
}

impl<'a> JobRunner<'a> {
    pub fn new(converter: &'a dyn Converter) -> Self {
        let (request_sender, request_receiver) = mpsc::sync_channel(0);
        Self {
            converter,
            request_sender,
            request_receiver,
        }
    }

    pub fn work_channel(&self) -> WorkChannel {
        WorkChannel {
            sender: self.request_sender.clone(),
        }
    }

    /// Blocks until every [WorkChannel] is dropped, or one requests shutdown. Consumes `self`.
    pub fn run(self) {
        // Ensure that the loop terminates when all external channels are dropped.
        drop(self.request_sender);

        loop {
            match self.request_receiver.recv() {
                Ok(Request::Run(work)) => work.run(self.converter),
                Ok(Request::Shutdown) => {
                    log::info!("Conversion worker shutdown requested.");
                    return;
                }
                Err(_) => {
                    log::info!("Conversion request channel closed; terminating worker loop.");
                    return;
                }
            }
        }
    }
}
