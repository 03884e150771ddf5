mod cli;
mod error;
mod files;
mod parse;
mod print;
mod scan;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use cli::Commands;
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Files(args) => files::files(args),
        Commands::Parse(args) => parse::parse(args),
        Commands::Scan(args) => scan::scan(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // The reader of the output went away, e.g. `cuplogger scan ... | head`.
        Err(CliError::Output(error)) if error.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
