use std::{path::PathBuf, time::Duration};

use gtk::{
    glib,
    prelude::{BoxExt, ButtonExt, EditableExt, FrameExt, GridExt, OrientableExt, WidgetExt},
};
use relm4::{
    Component, ComponentParts, ComponentSender, RelmWidgetExt, SimpleComponent, WorkerController,
    gtk,
};
use session::{
    controller::{Controller, Notice, Progress, Status},
    worker::WorkChannel,
};

use crate::gui::{util, workers::converter};

const PULSE_INTERVAL: Duration = Duration::from_millis(100);

/// Input messages for [ConvertPanel].
#[derive(Debug)]
pub enum Input {
    #[allow(clippy::enum_variant_names)]
    InputPdf(PathBuf),
    OutputDir(PathBuf),
    PagesText(String),
    Start,
    Cancel,
    // Internal:
    Worker(converter::Output),
    Pulse,
}

/// Output messages for [ConvertPanel].
#[derive(Debug)]
pub enum Output {
    Notice(Notice),
}

/// Initialisation parameters for [ConvertPanel].
pub struct Init {
    pub work_channel: WorkChannel,
}

/// Relm4 component that takes the page range, starts and cancels conversions, and shows their
/// progress.
pub struct ConvertPanel {
    controller: Controller,
    worker: WorkerController<converter::ConverterWorker>,
    progress_bar: gtk::ProgressBar,
    pulse_timer: Option<glib::SourceId>,
}

impl ConvertPanel {
    fn start(&mut self, sender: &ComponentSender<Self>) {
        match self.controller.start_conversion() {
            Ok(job) => self.worker.emit(converter::Input::Start(job)),
            Err(err) => {
                util::send_output_or_log(Output::Notice(err.into()), "start error", sender);
            }
        }
    }

    fn render_progress(&mut self, sender: &ComponentSender<Self>) {
        match self.controller.progress() {
            Progress::Indeterminate => {
                if self.pulse_timer.is_none() {
                    let sender = sender.clone();
                    self.pulse_timer = Some(glib::timeout_add_local(PULSE_INTERVAL, move || {
                        sender.input(Input::Pulse);
                        glib::ControlFlow::Continue
                    }));
                }
                return;
            }
            Progress::Idle => self.progress_bar.set_fraction(0.0),
            Progress::Fraction(fraction) => self.progress_bar.set_fraction(fraction),
            Progress::Full => self.progress_bar.set_fraction(1.0),
        }
        if let Some(pulse_timer) = self.pulse_timer.take() {
            pulse_timer.remove();
        }
    }
}

fn status_css_class(status: Status) -> &'static str {
    match status {
        Status::Ready | Status::Running => "status",
        Status::Succeeded => "status-succeeded",
        Status::Failed => "status-failed",
    }
}

#[relm4::component(pub)]
impl SimpleComponent for ConvertPanel {
    type Init = Init;

    type Input = Input;
    type Output = Output;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 5,

            gtk::Frame {
                set_label: Some("Conversion"),

                gtk::Grid {
                    set_margin_all: 5,
                    set_column_spacing: 5,
                    set_row_spacing: 5,

                    attach[0, 0, 1, 1] = &gtk::Label {
                        set_label: "Input PDF:",
                        set_halign: gtk::Align::Start,
                    },
                    attach[1, 0, 1, 1] = &gtk::Label {
                        set_halign: gtk::Align::Start,
                        #[watch]
                        set_label: &model.controller.input_pdf_label(),
                    },

                    attach[0, 1, 1, 1] = &gtk::Label {
                        set_label: "Output folder:",
                        set_halign: gtk::Align::Start,
                    },
                    attach[1, 1, 1, 1] = &gtk::Label {
                        set_halign: gtk::Align::Start,
                        #[watch]
                        set_label: &model.controller.output_dir_label(),
                    },

                    attach[0, 2, 1, 1] = &gtk::Label {
                        set_label: "Pages:",
                        set_halign: gtk::Align::Start,
                    },
                    attach[1, 2, 1, 1] = &gtk::Entry {
                        set_hexpand: true,
                        set_placeholder_text: Some("All pages, or a list such as 1,3-5"),
                        #[watch]
                        set_sensitive: model.controller.can_start(),
                        connect_changed[sender] => move |entry| {
                            sender.input(Input::PagesText(entry.text().to_string()));
                        },
                    },
                },
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_homogeneous: true,
                set_spacing: 5,

                gtk::Button::with_label("Convert") {
                    #[watch]
                    set_sensitive: model.controller.can_start(),
                    connect_clicked => Input::Start,
                },
                gtk::Button::with_label("Cancel") {
                    #[watch]
                    set_sensitive: !model.controller.can_start(),
                    connect_clicked => Input::Cancel,
                },
            },

            #[local_ref]
            progress_bar -> gtk::ProgressBar {
                set_pulse_step: 0.1,
            },

            gtk::Label {
                set_halign: gtk::Align::Start,
                #[watch]
                set_label: model.controller.status().label(),
                #[watch]
                set_css_classes: &[status_css_class(model.controller.status())],
            },
        }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            Input::InputPdf(path) => self.controller.select_input_pdf(path),
            Input::OutputDir(path) => self.controller.select_output_dir(path),
            Input::PagesText(text) => self.controller.set_pages_text(text),
            Input::Start => self.start(&sender),
            Input::Cancel => self.worker.emit(converter::Input::Cancel),
            Input::Worker(converter::Output::Progress { completed, total }) => {
                self.controller.on_progress(completed, total);
            }
            Input::Worker(converter::Output::Completed { job, result }) => {
                if let Some(notice) = self.controller.on_conversion_complete(job, result) {
                    util::send_output_or_log(Output::Notice(notice), "conversion result", &sender);
                }
            }
            Input::Pulse => {
                if self.controller.progress() == Progress::Indeterminate {
                    self.progress_bar.pulse();
                }
            }
        }
        self.render_progress(&sender);
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = Self {
            controller: Controller::new(),
            worker: converter::ConverterWorker::builder()
                .detach_worker(converter::Init {
                    work_channel: init.work_channel,
                })
                .forward(sender.input_sender(), Input::Worker),
            progress_bar: gtk::ProgressBar::new(),
            pulse_timer: None,
        };

        let progress_bar = &model.progress_bar;
        let widgets = view_output!();

        ComponentParts { model, widgets }
    }
}
