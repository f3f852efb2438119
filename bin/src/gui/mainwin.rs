use std::sync::Arc;

use gtk::prelude::*;
use relm4::prelude::*;
use session::{controller::Notice, worker::WorkChannel};

use super::{
    components::{
        errordialog::{self, Severity},
        infodialog,
    },
    convertpanel, inputpdf, mainmenu, outputselect,
};

const ABOUT_TEXT: &str = concat!(
    "Converts the vector line work of PDF pages into DXF drawings, one file per page.\n\nVersion ",
    env!("CARGO_PKG_VERSION"),
);

/// Input messages for [MainWindow].
#[derive(Debug)]
pub enum Input {
    // Internal:
    ShowNotice(Notice),
    ConvertInput(convertpanel::Input),
    MenuItem(mainmenu::MenuItem),
}

/// Initialisation parameters for [MainWindow].
pub struct Init {
    pub xdg_dirs: Arc<xdg::BaseDirectories>,
    pub work_channel: WorkChannel,
}

/// Relm4 window component that acts as the main window of the converter.
pub struct MainWindow {
    error_dialog: Controller<errordialog::ErrorDialog>,
    info_dialog: Controller<infodialog::InfoDialog>,
    input_pdf_selector: Controller<inputpdf::InputPdfSelector>,
    output_selector: Controller<outputselect::OutputSelector>,
    convert_panel: Controller<convertpanel::ConvertPanel>,
}

#[relm4::component(pub)]
impl SimpleComponent for MainWindow {
    type Init = Init;

    type Input = Input;
    type Output = ();

    view! {
        window = gtk::ApplicationWindow {
            set_title: Some("PDF to DXF"),
            set_default_width: 420,
            set_show_menubar: true,

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 5,
                set_margin_all: 5,

                model.input_pdf_selector.widget(),
                model.output_selector.widget(),
                model.convert_panel.widget(),
            }
        }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            Input::ShowNotice(notice) => self.show_notice(notice),
            Input::ConvertInput(input) => self.convert_panel.emit(input),
            Input::MenuItem(item) => self.handle_menu_item(item),
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = Self {
            error_dialog: errordialog::ErrorDialog::builder()
                .transient_for(&root)
                .launch(())
                .detach(),
            info_dialog: infodialog::InfoDialog::builder()
                .transient_for(&root)
                .launch(())
                .detach(),
            input_pdf_selector: inputpdf::InputPdfSelector::builder()
                .launch(inputpdf::Init {
                    xdg_dirs: init.xdg_dirs.clone(),
                })
                .forward(sender.input_sender(), |msg| match msg {
                    inputpdf::Output::SelectedInputPdf(path) => {
                        Input::ConvertInput(convertpanel::Input::InputPdf(path))
                    }
                }),
            output_selector: outputselect::OutputSelector::builder()
                .launch(outputselect::Init {
                    xdg_dirs: init.xdg_dirs.clone(),
                })
                .forward(sender.input_sender(), |msg| match msg {
                    outputselect::Output::SelectedOutputDir(path) => {
                        Input::ConvertInput(convertpanel::Input::OutputDir(path))
                    }
                }),
            convert_panel: convertpanel::ConvertPanel::builder()
                .launch(convertpanel::Init {
                    work_channel: init.work_channel,
                })
                .forward(sender.input_sender(), |msg| match msg {
                    convertpanel::Output::Notice(notice) => Input::ShowNotice(notice),
                }),
        };

        let widgets = view_output!();

        {
            let sender = sender.clone();
            mainmenu::attach(&widgets.window, move |item| {
                sender.input(Input::MenuItem(item));
            });
        }

        ComponentParts { model, widgets }
    }
}

impl MainWindow {
    fn show_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Info(message) => self.info_dialog.emit(infodialog::Input::Show {
                heading: "Conversion finished".to_string(),
                message,
            }),
            Notice::Warning(message) => self.error_dialog.emit(errordialog::Input::Show {
                severity: Severity::Warning,
                message,
            }),
            Notice::Error(message) => self.error_dialog.emit(errordialog::Input::Show {
                severity: Severity::Error,
                message,
            }),
        }
    }

    fn handle_menu_item(&mut self, item: mainmenu::MenuItem) {
        use mainmenu::MenuItem;
        match item {
            MenuItem::Convert => self.convert_panel.emit(convertpanel::Input::Start),
            MenuItem::CancelConversion => self.convert_panel.emit(convertpanel::Input::Cancel),
            MenuItem::Quit => relm4::main_application().quit(),
            MenuItem::About => self.info_dialog.emit(infodialog::Input::Show {
                heading: "PDF to DXF".to_string(),
                message: ABOUT_TEXT.to_string(),
            }),
        }
    }
}
