//! The command-line interface for Trainer Desk.
use clap::Parser;
use desk::Cli;
use framework::prelude::*;
use tui::Tui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let log_path = desk::init_logging(&cli)?;
    tracing::info!(log = %log_path.display(), "starting trainer desk");

    let mut context = desk::build_context(&cli)?;

    match context.execute(&cli.command_line()?) {
        Ok(response) => {
            if let Some(text) = response.text() {
                println!("{text}");
            }
        }
        Err(Error::Command(message)) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    if context.has_resource::<Tui>() {
        tui::run_tui(&mut context)?;
    }
    Ok(())
}
