use anyhow::Result;
use clap::Args;
use session::worker::DxfConverter;

use crate::{gui, settings::SettingsArgs};

/// Runs a GUI to convert PDF files into DXF drawings.
#[derive(Args, Debug, Default)]
pub struct Command {
    #[command(flatten)]
    settings: SettingsArgs,

    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    gtk_options: Vec<String>,
}

pub fn run(cmd: &Command, xdg_dirs: xdg::BaseDirectories) -> Result<()> {
    let options = cmd.settings.resolve(&xdg_dirs)?;
    let converter = DxfConverter::new(options);
    gui::main::run(&converter, &cmd.gtk_options, xdg_dirs);
    Ok(())
}
