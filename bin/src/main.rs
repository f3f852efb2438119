use anyhow::Result;

mod cli;
mod gui;
mod settings;

fn main() -> Result<()> {
    cli::run()
}
