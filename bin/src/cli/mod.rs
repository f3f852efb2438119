use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

mod convert;
mod gui;

/// Converts the line work of PDF pages into DXF drawings.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Logging level.
    #[arg(long, default_value = "Warn")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    Convert(convert::Command),
    Gui(gui::Command),
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())
        .with_context(|| "configuring logging")?;

    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdf2dxf");

    use Command::*;
    match &args.command {
        Convert(cmd) => convert::run(cmd, &xdg_dirs),
        Gui(cmd) => gui::run(cmd, xdg_dirs),
    }
}
