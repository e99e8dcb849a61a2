//! Projpack CLI - Command-line utility for packaging filtered project trees.

mod cli;
mod commands;
mod error;
mod logging;
mod open;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use output::OutputFormatter;
use projpack_core::ProjectStore;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.format_error(operation_name(&cli.command), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let store = ProjectStore::new(
        cli.config
            .clone()
            .unwrap_or_else(ProjectStore::default_path),
    );

    match &cli.command {
        cli::Commands::Pack(args) => {
            commands::pack::execute(args, &store, formatter, !cli.quiet && !cli.json)
        }
        cli::Commands::Projects(command) => commands::projects::execute(command, &store, formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}

const fn operation_name(command: &cli::Commands) -> &'static str {
    match command {
        cli::Commands::Pack(_) => "pack",
        cli::Commands::Projects(_) => "projects",
        cli::Commands::Completion { .. } => "completion",
    }
}
