use clap::Parser;
use std::process::ExitCode;

use linkhut_cli::cli::Cli;
use linkhut_cli::{config, display, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so clap's env fallbacks see values from .env
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    logging::init(cli.verbose);
    config::report_dotenv(&dotenv);

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::failure(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
