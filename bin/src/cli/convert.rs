use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use convert::{ConvertEvents, PageProgress};
use session::{
    job::{ConversionJob, JobId},
    selection::Selection,
    worker::{self, Converter, DxfConverter},
};
use simple_bar::ProgressBar;

use crate::settings::SettingsArgs;

/// Converts pages of a PDF file into DXF drawings, one file per page.
#[derive(Args, Debug)]
pub struct Command {
    /// Path to input PDF.
    input_pdf: PathBuf,

    /// Directory to write the DXF files into. It must already exist.
    output_dir: PathBuf,

    /// Pages to convert, such as "1,3-5". Converts all pages by default.
    #[arg(long)]
    pages: Option<String>,

    /// Do not show a progress bar.
    #[arg(long, default_value = "false")]
    no_progress: bool,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// Runs the subcommand.
pub fn run(cmd: &Command, xdg_dirs: &xdg::BaseDirectories) -> Result<()> {
    let options = cmd.settings.resolve(xdg_dirs)?;
    let converter = DxfConverter::new(options);

    let continue_intent = Arc::new(AtomicBool::new(true));
    let mut events = EventDisplayer::new(!cmd.no_progress, continue_intent.clone());
    ctrlc::set_handler(move || continue_intent.store(false, Ordering::SeqCst))
        .with_context(|| "installing interrupt handler")?;

    let message = convert_with(&converter, cmd, &mut events)?;
    println!("{}", message);
    Ok(())
}

/// Converts as requested by `cmd`, returning the success message.
fn convert_with(
    converter: &dyn Converter,
    cmd: &Command,
    events: &mut dyn ConvertEvents,
) -> Result<String> {
    let job = build_job(cmd)?;
    let result = worker::run_job(converter, &job, events);
    if result.success {
        Ok(result.message)
    } else {
        Err(anyhow!(result.message))
    }
}

fn build_job(cmd: &Command) -> Result<ConversionJob> {
    let mut selection = Selection::default();
    selection.set_input_pdf(cmd.input_pdf.clone());
    selection.set_output_dir(cmd.output_dir.clone());
    if let Some(pages) = &cmd.pages {
        selection.set_pages_text(pages.clone());
    }
    let job = selection
        .build_job(JobId(1))
        .with_context(|| "checking --pages")?;
    Ok(job)
}

struct EventDisplayer {
    show_progress: bool,
    progress_bar: Option<ProgressBar>,
    continue_intent: Arc<AtomicBool>,
}

impl EventDisplayer {
    fn new(show_progress: bool, continue_intent: Arc<AtomicBool>) -> Self {
        Self {
            show_progress,
            progress_bar: None,
            continue_intent,
        }
    }
}

impl ConvertEvents for EventDisplayer {
    fn on_page_converted(&mut self, progress: PageProgress) {
        if !self.show_progress {
            return;
        }

        let progress_bar = self
            .progress_bar
            .get_or_insert_with(|| ProgressBar::cargo_style(progress.total as u32, 80, true));
        progress_bar.update();
    }

    fn do_continue(&self) -> bool {
        let do_continue = self.continue_intent.load(Ordering::SeqCst);
        if !do_continue {
            eprintln!("Interrupted, stopping after the current page.");
        }
        do_continue
    }
}
