use clap::Parser;
use std::process::ExitCode;
use uidriver_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match commands::dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The failure envelope has already been printed to stdout.
            tracing::debug!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}
