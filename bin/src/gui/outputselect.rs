use std::{path::PathBuf, sync::Arc};

use gtk::prelude::{FrameExt, GridExt, WidgetExt};
use relm4::{
    Component, ComponentController, ComponentParts, ComponentSender, Controller, SimpleComponent,
    gtk,
};
use relm4_components::{
    open_button::{OpenButton, OpenButtonSettings},
    open_dialog::OpenDialogSettings,
};

use crate::gui::util;

/// Input messages for [OutputSelector].
#[derive(Debug)]
pub enum Input {
    /// Specifies the currently selected output directory.
    OutputDir(PathBuf),
}

/// Output messages for [OutputSelector].
#[derive(Debug)]
pub enum Output {
    SelectedOutputDir(PathBuf),
}

/// Initialisation parameters for [OutputSelector].
pub struct Init {
    pub xdg_dirs: Arc<xdg::BaseDirectories>,
}

/// Relm4 component to select the folder that DXF files are written into.
pub struct OutputSelector {
    output_dir_open: Controller<OpenButton>,
    output_dir: Option<PathBuf>,
}

#[relm4::component(pub)]
impl SimpleComponent for OutputSelector {
    type Init = Init;

    type Input = Input;
    type Output = Output;

    view! {
        gtk::Frame {
            set_label: Some("Output"),

            gtk::Grid {
                set_margin_start: 5,
                set_margin_end: 5,
                set_margin_top: 5,
                set_margin_bottom: 5,
                set_column_spacing: 5,
                set_row_spacing: 5,

                attach[0, 0, 1, 1] = &gtk::Label {
                    set_label: "Select folder:",
                    set_halign: gtk::Align::Start,
                },
                attach[1, 0, 1, 1] = model.output_dir_open.widget(),

                attach[0, 1, 2, 1] = &gtk::Label {
                    add_css_class: "selected-path",
                    set_halign: gtk::Align::Start,
                    set_selectable: true,
                    #[watch]
                    set_label: &util::format_opt_path(model.output_dir.as_deref()),
                },
            },
        }
    }

    fn update(&mut self, message: Self::Input, sender: ComponentSender<Self>) {
        match message {
            Input::OutputDir(path) => {
                self.output_dir = Some(path.clone());
                util::send_output_or_log(
                    Output::SelectedOutputDir(path),
                    "output directory",
                    &sender,
                );
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let recent_output_dirs = util::xdg_cfg_static_str(&init.xdg_dirs, "recent_output_dirs.txt");

        let model = Self {
            output_dir_open: OpenButton::builder()
                .launch(OpenButtonSettings {
                    dialog_settings: OpenDialogSettings {
                        folder_mode: true,
                        cancel_label: "Cancel".to_string(),
                        accept_label: "Output Folder".to_string(),
                        create_folders: true,
                        is_modal: true,
                        filters: vec![],
                    },
                    text: "Output Folder",
                    icon: None,
                    recently_opened_files: recent_output_dirs,
                    max_recent_files: 10,
                })
                .forward(sender.input_sender(), Input::OutputDir),
            output_dir: None,
        };

        let widgets = view_output!();

        ComponentParts { model, widgets }
    }
}
