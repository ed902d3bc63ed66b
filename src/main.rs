// CLI binary entry point for id3rs
//
// This is the main entry point for the id3rs command-line tool.

use std::process;

use clap::Parser;
use env_logger::Env;
use log::debug;

mod cli;

use cli::{commands, Commands, Config, OutputFormatter};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    configure_logging(&config);

    let formatter = OutputFormatter::new(config.format.clone(), config.quiet);

    match &config.command {
        Commands::Show { files } => {
            let failures = commands::command_show(files, &formatter)?;
            if failures > 0 {
                process::exit(1);
            }
        }
        Commands::Rate {
            file,
            email,
            rating,
            output,
        } => {
            commands::command_rate(file, email, *rating, output.as_deref(), &formatter)?;
        }
        Commands::Text { file, id, value } => {
            commands::command_text(file, id, value.as_deref(), &formatter)?;
        }
    }

    Ok(())
}

fn configure_logging(config: &Config) {
    let filter = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();
    debug!("Debug logging");
}
